pub mod features;
pub mod historical;
pub mod holidays;
pub mod series;
pub mod weather;

pub use features::*;
pub use series::*;
