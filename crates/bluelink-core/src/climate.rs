//! Climate Advisor: outdoor temperature → cabin target and seat setting.
//!
//! Pure functions, no I/O. Temperatures are degrees Fahrenheit, the unit
//! the gateway's `airTemp.unit = 1` expects.

use serde::Serialize;
use strum::Display;

/// Warmest cabin target the curve produces.
pub const UPPER_CABIN_TEMP: f64 = 82.0;
/// Coolest cabin target the curve produces.
pub const LOWER_CABIN_TEMP: f64 = 62.0;

/// Outdoor temperature separating heated from cooled seats.
pub const SEAT_CUTOFF_TEMP: f64 = 70.0;
/// Width of each seat-climate band.
pub const SEAT_BAND_WIDTH: f64 = 5.0;

/// Seat heater/ventilation level. Serializes to the gateway's code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum SeatClimate {
    #[serde(rename = "2")]
    Off,
    #[serde(rename = "6")]
    HeatLow,
    #[serde(rename = "7")]
    HeatMedium,
    #[serde(rename = "8")]
    HeatHigh,
    #[serde(rename = "3")]
    CoolLow,
    #[serde(rename = "4")]
    CoolMedium,
    #[serde(rename = "5")]
    CoolHigh,
}

impl SeatClimate {
    /// The gateway's wire code for this level.
    pub fn code(self) -> &'static str {
        match self {
            Self::Off => "2",
            Self::CoolLow => "3",
            Self::CoolMedium => "4",
            Self::CoolHigh => "5",
            Self::HeatLow => "6",
            Self::HeatMedium => "7",
            Self::HeatHigh => "8",
        }
    }
}

/// Sigmoid mapping outdoor temperature to a cabin target:
///
/// ```text
///                 upper - lower
///   upper  -  ----------------------
///              1 + e^(6 - 0.09 * t)
/// ```
///
/// Cold weather approaches `upper`, hot weather approaches `lower`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CabinCurve {
    pub upper: f64,
    pub lower: f64,
}

impl Default for CabinCurve {
    fn default() -> Self {
        Self {
            upper: UPPER_CABIN_TEMP,
            lower: LOWER_CABIN_TEMP,
        }
    }
}

impl CabinCurve {
    pub fn target(&self, outdoor_temp: f64) -> f64 {
        let exponent = 6.0 - 0.09 * outdoor_temp;
        self.upper - (self.upper - self.lower) / (1.0 + exponent.exp())
    }
}

/// Cabin temperature target for the given outdoor temperature, using the
/// stock 62–82 curve.
pub fn recommend_cabin_temperature(outdoor_temp: f64) -> f64 {
    CabinCurve::default().target(outdoor_temp)
}

/// Seat bands, checked top to bottom. Bounds are inclusive on both ends
/// and neighbours share their edge, so order decides the edges: 70 is
/// `HeatLow`, 65 is `HeatLow`, 75 is `CoolLow`.
const SEAT_BANDS: [(f64, f64, SeatClimate); 6] = [
    (
        SEAT_CUTOFF_TEMP - SEAT_BAND_WIDTH,
        SEAT_CUTOFF_TEMP,
        SeatClimate::HeatLow,
    ),
    (
        SEAT_CUTOFF_TEMP - 2.0 * SEAT_BAND_WIDTH,
        SEAT_CUTOFF_TEMP - SEAT_BAND_WIDTH,
        SeatClimate::HeatMedium,
    ),
    (
        f64::NEG_INFINITY,
        SEAT_CUTOFF_TEMP - 2.0 * SEAT_BAND_WIDTH,
        SeatClimate::HeatHigh,
    ),
    (
        SEAT_CUTOFF_TEMP,
        SEAT_CUTOFF_TEMP + SEAT_BAND_WIDTH,
        SeatClimate::CoolLow,
    ),
    (
        SEAT_CUTOFF_TEMP + SEAT_BAND_WIDTH,
        SEAT_CUTOFF_TEMP + 2.0 * SEAT_BAND_WIDTH,
        SeatClimate::CoolMedium,
    ),
    (
        SEAT_CUTOFF_TEMP + 2.0 * SEAT_BAND_WIDTH,
        f64::INFINITY,
        SeatClimate::CoolHigh,
    ),
];

/// Seat setting for the given outdoor temperature. First matching band
/// wins; only NaN falls through to `Off`.
pub fn recommend_seat_climate(outdoor_temp: f64) -> SeatClimate {
    SEAT_BANDS
        .iter()
        .find(|(low, high, _)| *low <= outdoor_temp && outdoor_temp <= *high)
        .map_or(SeatClimate::Off, |(_, _, level)| *level)
}

/// Cabin target plus seat level for one outdoor reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClimateRecommendation {
    pub cabin_temperature: f64,
    pub seat_level: SeatClimate,
}

pub fn recommend(outdoor_temp: f64) -> ClimateRecommendation {
    ClimateRecommendation {
        cabin_temperature: recommend_cabin_temperature(outdoor_temp),
        seat_level: recommend_seat_climate(outdoor_temp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cabin_target_stays_inside_bounds() {
        for t in (-60..=160).map(f64::from) {
            let c = recommend_cabin_temperature(t);
            assert!(c > LOWER_CABIN_TEMP && c < UPPER_CABIN_TEMP, "t={t} c={c}");
        }
    }

    #[test]
    fn cabin_target_is_non_increasing() {
        let mut prev = recommend_cabin_temperature(-100.0);
        for step in -999..=1600 {
            let t = f64::from(step) / 10.0;
            let c = recommend_cabin_temperature(t);
            assert!(c <= prev, "curve rose between {} and {t}", t - 0.1);
            prev = c;
        }
    }

    #[test]
    fn cabin_target_saturates_at_the_extremes() {
        for t in [-40.0, -10.0, 0.0] {
            let c = recommend_cabin_temperature(t);
            assert!(c > 81.0 && c <= 82.0, "t={t} c={c}");
        }
        for t in [130.0, 150.0, 200.0] {
            let c = recommend_cabin_temperature(t);
            assert!((62.0..63.0).contains(&c), "t={t} c={c}");
        }
    }

    #[test]
    fn cabin_target_matches_reference_points() {
        // 6 - 0.09 * 66.67 ≈ 0: the curve's midpoint.
        let mid = recommend_cabin_temperature(200.0 / 3.0);
        assert!((mid - 72.0).abs() < 1e-9, "mid={mid}");
        assert_eq!(recommend_cabin_temperature(50.0).round(), 78.0);
        assert_eq!(recommend_cabin_temperature(90.0).round(), 64.0);
    }

    #[test]
    fn custom_curve_bounds() {
        let curve = CabinCurve {
            upper: 30.0,
            lower: 16.0,
        };
        assert!((curve.target(-100.0) - 30.0).abs() < 1e-3);
        assert!((curve.target(300.0) - 16.0).abs() < 1e-3);
    }

    #[test]
    fn seat_band_edges_resolve_to_first_match() {
        assert_eq!(recommend_seat_climate(70.0), SeatClimate::HeatLow);
        assert_eq!(recommend_seat_climate(65.0), SeatClimate::HeatLow);
        assert_eq!(recommend_seat_climate(60.0), SeatClimate::HeatMedium);
        assert_eq!(recommend_seat_climate(75.0), SeatClimate::CoolLow);
        assert_eq!(recommend_seat_climate(80.0), SeatClimate::CoolMedium);
    }

    #[test]
    fn seat_band_interiors() {
        assert_eq!(recommend_seat_climate(68.0), SeatClimate::HeatLow);
        assert_eq!(recommend_seat_climate(62.5), SeatClimate::HeatMedium);
        assert_eq!(recommend_seat_climate(59.9), SeatClimate::HeatHigh);
        assert_eq!(recommend_seat_climate(-20.0), SeatClimate::HeatHigh);
        assert_eq!(recommend_seat_climate(70.1), SeatClimate::CoolLow);
        assert_eq!(recommend_seat_climate(77.0), SeatClimate::CoolMedium);
        assert_eq!(recommend_seat_climate(80.1), SeatClimate::CoolHigh);
        assert_eq!(recommend_seat_climate(120.0), SeatClimate::CoolHigh);
    }

    #[test]
    fn seat_climate_off_only_for_nan() {
        assert_eq!(recommend_seat_climate(f64::NAN), SeatClimate::Off);
    }

    #[test]
    fn seat_codes_match_gateway() {
        assert_eq!(SeatClimate::HeatHigh.code(), "8");
        assert_eq!(SeatClimate::CoolLow.code(), "3");
        assert_eq!(
            serde_json::to_value(SeatClimate::HeatMedium).ok(),
            Some(serde_json::Value::from("7"))
        );
        assert_eq!(SeatClimate::CoolMedium.to_string(), "cool-medium");
    }

    #[test]
    fn recommendation_bundles_both() {
        let rec = recommend(40.0);
        assert_eq!(rec.seat_level, SeatClimate::HeatHigh);
        assert!(rec.cabin_temperature > 79.0);
    }
}
