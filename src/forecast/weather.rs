//! Synthetic weather forecast for the site
//!
//! Produces hourly observations from season-dependent daily curves with
//! Gaussian noise. The noise source is injected so callers that need
//! reproducible output can pass a seeded RNG.

use std::f64::consts::PI;

use chrono::{Datelike, Duration, NaiveDateTime, Timelike};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;

use crate::domain::{BlockTime, WeatherObservation};

/// Climate band the curves are chosen from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    /// December - February
    Winter,
    /// March - May
    Summer,
    /// June - September
    Monsoon,
    /// October - November
    PostMonsoon,
}

impl Season {
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Summer,
            6..=9 => Season::Monsoon,
            _ => Season::PostMonsoon,
        }
    }
}

/// `base + amplitude * sin(2*pi*hour/24) + N(0, std_dev)`
#[derive(Debug, Clone, Copy, PartialEq)]
struct DailyCurve {
    base: f64,
    amplitude: f64,
    std_dev: f64,
}

impl DailyCurve {
    const fn new(base: f64, amplitude: f64, std_dev: f64) -> Self {
        Self {
            base,
            amplitude,
            std_dev,
        }
    }
}

fn temperature_curve(season: Season) -> DailyCurve {
    match season {
        Season::Winter => DailyCurve::new(15.0, 5.0, 1.0),
        Season::Summer => DailyCurve::new(35.0, 8.0, 2.0),
        Season::Monsoon => DailyCurve::new(28.0, 6.0, 1.0),
        Season::PostMonsoon => DailyCurve::new(25.0, 7.0, 1.0),
    }
}

fn humidity_curve(season: Season) -> DailyCurve {
    match season {
        Season::Monsoon => DailyCurve::new(70.0, 20.0, 3.0),
        _ => DailyCurve::new(50.0, 15.0, 3.0),
    }
}

const WIND_CURVE: DailyCurve = DailyCurve::new(2.0, 1.5, 0.3);

fn cloud_curve(season: Season) -> DailyCurve {
    match season {
        Season::Monsoon => DailyCurve::new(60.0, 30.0, 5.0),
        _ => DailyCurve::new(30.0, 25.0, 5.0),
    }
}

const TEMPERATURE_RANGE: (f64, f64) = (5.0, 45.0);
const HUMIDITY_RANGE: (f64, f64) = (10.0, 95.0);
const WIND_RANGE: (f64, f64) = (0.0, 20.0);
const CLOUD_RANGE: (f64, f64) = (0.0, 100.0);

/// Hourly synthetic weather generator
pub struct SyntheticWeather<R: Rng> {
    rng: R,
}

impl<R: Rng> SyntheticWeather<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// `hours` consecutive hourly observations starting at `start`.
    pub fn forecast(&mut self, start: NaiveDateTime, hours: u32) -> Vec<WeatherObservation> {
        (0..hours)
            .map(|i| self.observe(start + Duration::hours(i as i64)))
            .collect()
    }

    /// A single observation for wall-clock time `at`.
    pub fn observe(&mut self, at: NaiveDateTime) -> WeatherObservation {
        let season = Season::from_month(at.month());
        let phase = (2.0 * PI * at.hour() as f64 / 24.0).sin();

        let temperature = self.sample(temperature_curve(season), phase);
        let humidity = self.sample(humidity_curve(season), phase);
        let wind_speed = self.sample(WIND_CURVE, phase);
        let cloud_cover = self.sample(cloud_curve(season), phase);

        WeatherObservation {
            temperature: temperature.clamp(TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1),
            humidity: humidity.clamp(HUMIDITY_RANGE.0, HUMIDITY_RANGE.1),
            wind_speed: wind_speed.clamp(WIND_RANGE.0, WIND_RANGE.1),
            cloud_cover: Some(cloud_cover.clamp(CLOUD_RANGE.0, CLOUD_RANGE.1)),
            datetime: BlockTime::naive(at),
        }
    }

    fn sample(&mut self, curve: DailyCurve, phase: f64) -> f64 {
        let noise = Normal::new(0.0, curve.std_dev)
            .map(|n| n.sample(&mut self.rng))
            .unwrap_or(0.0);
        curve.base + curve.amplitude * phase + noise
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::{rngs::StdRng, SeedableRng};
    use rstest::rstest;

    fn start(month: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, month, 10)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[rstest]
    #[case(1, Season::Winter)]
    #[case(2, Season::Winter)]
    #[case(4, Season::Summer)]
    #[case(7, Season::Monsoon)]
    #[case(9, Season::Monsoon)]
    #[case(10, Season::PostMonsoon)]
    #[case(12, Season::Winter)]
    fn test_season_from_month(#[case] month: u32, #[case] season: Season) {
        assert_eq!(Season::from_month(month), season);
    }

    #[test]
    fn test_forecast_is_hourly_and_bounded() {
        let mut gen = SyntheticWeather::new(StdRng::seed_from_u64(42));
        let obs = gen.forecast(start(5), 48);

        assert_eq!(obs.len(), 48);
        for (i, o) in obs.iter().enumerate() {
            assert_eq!(o.datetime.local(), start(5) + Duration::hours(i as i64));
            assert!((5.0..=45.0).contains(&o.temperature));
            assert!((10.0..=95.0).contains(&o.humidity));
            assert!((0.0..=20.0).contains(&o.wind_speed));
            let cloud = o.cloud_cover.unwrap();
            assert!((0.0..=100.0).contains(&cloud));
        }
    }

    #[test]
    fn test_seeded_generator_is_reproducible() {
        let a = SyntheticWeather::new(StdRng::seed_from_u64(3)).forecast(start(8), 24);
        let b = SyntheticWeather::new(StdRng::seed_from_u64(3)).forecast(start(8), 24);
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_hours() {
        let mut gen = SyntheticWeather::new(StdRng::seed_from_u64(1));
        assert!(gen.forecast(start(1), 0).is_empty());
    }

    #[test]
    fn test_monsoon_is_humid() {
        // Noise is small relative to the gap between the monsoon and dry-season bands at 6am.
        let mut gen = SyntheticWeather::new(StdRng::seed_from_u64(11));
        let at = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap().and_hms_opt(6, 0, 0).unwrap();
        let humid = gen.observe(at);
        assert!(humid.humidity > 75.0);
    }
}
