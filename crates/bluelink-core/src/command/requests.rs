// ── Command request types ──
//
// Each command becomes one `CommandRequest` carrying the service and its
// service-specific parameters. The identity half of the body (and the
// gateway headers) is added by the dispatcher at send time.

use bluelink_api::Service;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use strum::{Display, EnumString};

use crate::climate::{self, SEAT_CUTOFF_TEMP, SeatClimate};
use crate::error::CoreError;

/// Engine-on duration, in minutes, requested with every start.
const IGNITION_DURATION_MINUTES: u8 = 10;

/// Named climate bundle that bypasses the advisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ClimatePreset {
    /// Full heat, heated seats.
    Winter,
    /// Full heat, heated seats, defrost.
    Winter2,
    /// Full cooling, ventilated seats.
    Summer,
}

/// Fixed values a preset sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetSettings {
    pub air_temp: &'static str,
    pub defrost: bool,
    pub heating: bool,
    pub seats: SeatClimate,
}

impl ClimatePreset {
    pub fn settings(self) -> PresetSettings {
        match self {
            Self::Winter => PresetSettings {
                air_temp: "HI",
                defrost: false,
                heating: true,
                seats: SeatClimate::HeatHigh,
            },
            Self::Winter2 => PresetSettings {
                air_temp: "HI",
                defrost: true,
                heating: true,
                seats: SeatClimate::HeatHigh,
            },
            Self::Summer => PresetSettings {
                air_temp: "LO",
                defrost: false,
                heating: false,
                seats: SeatClimate::CoolHigh,
            },
        }
    }
}

/// How `start` picks its climate parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StartMode {
    /// Ask the climate advisor, given the outdoor temperature (°F).
    Climate { outdoor_temp: f64, defrost: bool },
    /// Send a fixed preset.
    Preset(ClimatePreset),
}

impl StartMode {
    /// Reject a climate start without a usable outdoor temperature.
    pub fn validate(self) -> Result<(), CoreError> {
        match self {
            Self::Climate { outdoor_temp, .. } if !outdoor_temp.is_finite() => {
                Err(CoreError::ValidationFailed {
                    message: format!("outdoor temperature must be finite, got {outdoor_temp}"),
                })
            }
            _ => Ok(()),
        }
    }
}

impl Default for StartMode {
    fn default() -> Self {
        Self::Climate {
            outdoor_temp: SEAT_CUTOFF_TEMP,
            defrost: false,
        }
    }
}

/// One remote command ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest {
    pub service: Service,
    pub params: Map<String, Value>,
}

impl CommandRequest {
    pub fn lock(username: &str, vin: &str) -> Self {
        Self::door(Service::Lock, username, vin)
    }

    pub fn unlock(username: &str, vin: &str) -> Self {
        Self::door(Service::Unlock, username, vin)
    }

    fn door(service: Service, username: &str, vin: &str) -> Self {
        let mut params = Map::new();
        params.insert("userName".into(), username.into());
        params.insert("vin".into(), vin.into());
        Self { service, params }
    }

    /// Remote start with climate control.
    pub fn start(mode: StartMode, username: &str, vin: &str) -> Self {
        let (air_temp, defrost, heating, seats) = match mode {
            StartMode::Climate {
                outdoor_temp,
                defrost,
            } => {
                let advice = climate::recommend(outdoor_temp);
                (
                    format!("{:.0}", advice.cabin_temperature.round()),
                    defrost,
                    outdoor_temp < SEAT_CUTOFF_TEMP,
                    advice.seat_level,
                )
            }
            StartMode::Preset(preset) => {
                let s = preset.settings();
                (s.air_temp.to_owned(), s.defrost, s.heating, s.seats)
            }
        };

        let body = json!({
            "Ims": 0,
            "airCtrl": 1,
            "airTemp": { "unit": 1, "value": air_temp },
            "defrost": defrost,
            "heating1": u8::from(heating),
            "igniOnDuration": IGNITION_DURATION_MINUTES,
            "seatHeaterVentInfo": {
                "drvSeatHeatState": seats.code(),
                "astSeatHeatState": seats.code(),
            },
            "username": username,
            "vin": vin,
        });
        let params = match body {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            service: Service::Start,
            params,
        }
    }

    pub fn stop() -> Self {
        Self {
            service: Service::Stop,
            params: Map::new(),
        }
    }

    pub fn find() -> Self {
        Self {
            service: Service::Find,
            params: Map::new(),
        }
    }
}

/// Vehicle position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Returned by `find` whenever the position is unavailable.
    pub const UNKNOWN: Self = Self {
        latitude: -1.0,
        longitude: -1.0,
    };

    /// Truncate both axes toward zero to 3 decimal places. A non-finite
    /// axis yields [`Coordinates::UNKNOWN`].
    pub fn truncated(latitude: f64, longitude: f64) -> Self {
        if !(latitude.is_finite() && longitude.is_finite()) {
            return Self::UNKNOWN;
        }
        Self {
            latitude: truncate_3dp(latitude),
            longitude: truncate_3dp(longitude),
        }
    }

    pub fn is_known(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite() && *self != Self::UNKNOWN
    }
}

// Scaling by 1000 introduces float noise (37.123 * 1000 = 37122.99..), so
// snap to 6 places before dropping the fraction.
fn truncate_3dp(value: f64) -> f64 {
    let scaled = ((value * 1000.0) * 1e6).round() / 1e6;
    scaled.trunc() / 1000.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn door_commands_carry_username_and_vin() {
        let req = CommandRequest::lock("driver", "VIN1");
        assert_eq!(req.service, Service::Lock);
        assert_eq!(Value::Object(req.params), json!({ "userName": "driver", "vin": "VIN1" }));
        assert_eq!(CommandRequest::unlock("driver", "VIN1").service, Service::Unlock);
    }

    #[test]
    fn stop_and_find_have_no_params() {
        assert!(CommandRequest::stop().params.is_empty());
        assert!(CommandRequest::find().params.is_empty());
    }

    #[test]
    fn climate_start_uses_advisor() {
        let req = CommandRequest::start(
            StartMode::Climate {
                outdoor_temp: 30.0,
                defrost: true,
            },
            "driver",
            "VIN1",
        );
        let expected_temp = format!("{:.0}", climate::recommend_cabin_temperature(30.0).round());
        assert_eq!(
            Value::Object(req.params),
            json!({
                "Ims": 0,
                "airCtrl": 1,
                "airTemp": { "unit": 1, "value": expected_temp },
                "defrost": true,
                "heating1": 1,
                "igniOnDuration": 10,
                "seatHeaterVentInfo": { "drvSeatHeatState": "8", "astSeatHeatState": "8" },
                "username": "driver",
                "vin": "VIN1",
            })
        );
    }

    #[test]
    fn warm_day_turns_heating_off() {
        let req = CommandRequest::start(
            StartMode::Climate {
                outdoor_temp: 90.0,
                defrost: false,
            },
            "driver",
            "VIN1",
        );
        assert_eq!(req.params["heating1"], json!(0));
        assert_eq!(req.params["seatHeaterVentInfo"]["drvSeatHeatState"], json!("5"));
    }

    #[test]
    fn heating_boundary_is_exclusive() {
        let req = CommandRequest::start(StartMode::default(), "driver", "VIN1");
        assert_eq!(req.params["heating1"], json!(0));
        assert_eq!(req.params["seatHeaterVentInfo"]["astSeatHeatState"], json!("6"));
    }

    #[test]
    fn preset_tables() {
        let winter = ClimatePreset::Winter.settings();
        let winter2 = ClimatePreset::Winter2.settings();
        let summer = ClimatePreset::Summer.settings();
        assert!(!winter.defrost && winter.heating);
        assert!(winter2.defrost && winter2.heating);
        assert!(!summer.heating);
        assert_eq!(summer.seats, SeatClimate::CoolHigh);
        assert_eq!(winter.seats, SeatClimate::HeatHigh);

        let req = CommandRequest::start(StartMode::Preset(ClimatePreset::Summer), "d", "V");
        assert_eq!(req.params["airTemp"]["value"], json!("LO"));
        assert_eq!(req.params["Ims"], json!(0));
        assert_eq!(req.params["igniOnDuration"], json!(10));
    }

    #[test]
    fn preset_names_parse() {
        assert_eq!(ClimatePreset::from_str("WINTER2").unwrap(), ClimatePreset::Winter2);
        assert_eq!(ClimatePreset::Summer.to_string(), "summer");
        assert!(ClimatePreset::from_str("spring").is_err());
    }

    #[test]
    fn coordinates_truncate_toward_zero() {
        let c = Coordinates::truncated(37.12349, -122.98765);
        assert_eq!(c.latitude, 37.123);
        assert_eq!(c.longitude, -122.987);
        assert!(c.is_known());
    }

    #[test]
    fn coordinates_keep_exact_thousandths() {
        let c = Coordinates::truncated(37.123, -0.001);
        assert_eq!(c.latitude, 37.123);
        assert_eq!(c.longitude, -0.001);
        assert!(!Coordinates::UNKNOWN.is_known());
    }

    #[test]
    fn non_finite_coordinates_are_unknown() {
        assert_eq!(Coordinates::truncated(f64::NAN, 1.0), Coordinates::UNKNOWN);
        assert_eq!(Coordinates::truncated(1.0, f64::INFINITY), Coordinates::UNKNOWN);
        let raw = Coordinates {
            latitude: f64::NAN,
            longitude: 1.0,
        };
        assert!(!raw.is_known());
    }

    #[test]
    fn climate_start_needs_finite_temperature() {
        for outdoor_temp in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mode = StartMode::Climate {
                outdoor_temp,
                defrost: false,
            };
            assert!(matches!(
                mode.validate(),
                Err(CoreError::ValidationFailed { .. })
            ));
        }
        assert!(StartMode::default().validate().is_ok());
        assert!(StartMode::Preset(ClimatePreset::Winter).validate().is_ok());
    }
}
