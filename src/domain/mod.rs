pub mod prediction;
pub mod time;
pub mod weather;

pub use prediction::*;
pub use time::*;
pub use weather::*;
