// Wire types for the Blue Link gateway
//
// Shapes follow the gateway's JSON exactly (camelCase, the odd all-caps
// envelope of the session portal). Only fields the client reads are
// modelled; everything else is ignored by serde.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result marker field carried by session-portal responses.
pub const RESULT_FIELD: &str = "E_IFRESULT";
/// Failure message accompanying a non-success marker.
pub const FAILURE_MESSAGE_FIELD: &str = "E_IFFAILMSG";
/// Payload wrapper used by the session portal.
pub const RESPONSE_FIELD: &str = "RESPONSE_STRING";
/// Marker prefix meaning "accepted".
pub const SUCCESS_MARKER: &str = "Z:Success";

// ── Authentication ──────────────────────────────────────────────────

/// OAuth token endpoint response (token dialect).
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
}

/// Anti-forgery token response (session dialect).
#[derive(Debug, Deserialize)]
pub(crate) struct CsrfResponse {
    pub jwt_id: Option<String>,
}

/// What a successful login yields before vehicle discovery.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: SecretString,
    /// Registration id reported by the session portal's login call.
    /// Token-dialect logins leave this empty; discovery fills it in.
    pub registration_id: Option<String>,
}

// ── Enrollment ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnrollmentResponse {
    #[serde(default)]
    pub enrolled_vehicle_details: Vec<EnrolledVehicle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnrolledVehicle {
    pub vehicle_details: VehicleDetails,
}

/// One enrolled vehicle as reported by the enrollment endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDetails {
    #[serde(rename = "regid")]
    pub registration_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub vehicle_generation: String,
    pub vin: String,
    pub brand_indicator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick_name: Option<String>,
}

/// Some gateway builds send `vehicleGeneration` as a number.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

// ── Identity ────────────────────────────────────────────────────────

/// The authenticated session context every remote action requires.
#[derive(Debug, Clone)]
pub struct Identity {
    pub access_token: SecretString,
    pub registration_id: String,
    pub vehicle_generation: String,
    pub brand_indicator: String,
    pub vin: String,
}

impl Identity {
    /// Combine a login grant with the discovered vehicle.
    pub fn new(grant: TokenGrant, vehicle: VehicleDetails) -> Self {
        Self {
            access_token: grant.access_token,
            registration_id: vehicle.registration_id,
            vehicle_generation: vehicle.vehicle_generation,
            brand_indicator: vehicle.brand_indicator,
            vin: vehicle.vin,
        }
    }
}

/// Per-call context for authenticated requests: the identity plus the
/// account fields the gateway wants repeated in headers.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub identity: &'a Identity,
    pub username: &'a str,
    pub pin: &'a SecretString,
    pub client_id: Option<&'a str>,
}

// ── Remote actions ──────────────────────────────────────────────────

/// The gateway's verdict on a remote action, read from the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultStatus {
    /// Marker present and success-class.
    Success,
    /// Marker present and anything else, with the best available message.
    Failure(String),
    /// No marker in the body.
    Absent,
}

impl ResultStatus {
    /// Inspect a response body for the result marker.
    pub fn from_body(body: &Value) -> Self {
        let Some(marker) = body.get(RESULT_FIELD) else {
            return Self::Absent;
        };
        let marker = match marker {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if marker.starts_with(SUCCESS_MARKER) {
            return Self::Success;
        }

        let message = body
            .get(FAILURE_MESSAGE_FIELD)
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .map(str::to_owned)
            .or_else(|| {
                response_payload(body)
                    .as_ref()
                    .and_then(|p| p.get("errorMessage"))
                    .and_then(Value::as_str)
                    .map(str::to_owned)
            })
            .unwrap_or(marker);
        Self::Failure(message)
    }
}

/// A remote-action response: verdict plus raw body.
#[derive(Debug, Clone)]
pub struct ActionResponse {
    pub status: ResultStatus,
    pub body: Value,
}

impl ActionResponse {
    pub fn from_body(body: Value) -> Self {
        Self {
            status: ResultStatus::from_body(&body),
            body,
        }
    }

    /// Raw `(latitude, longitude)` from a locate response, if present.
    ///
    /// Looks at top-level `coord` first, then inside `RESPONSE_STRING`.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let read = |v: &Value| -> Option<(f64, f64)> {
            let coord = v.get("coord")?;
            Some((as_f64(coord.get("lat")?)?, as_f64(coord.get("lon")?)?))
        };
        read(&self.body).or_else(|| response_payload(&self.body).as_ref().and_then(read))
    }
}

/// `RESPONSE_STRING` as JSON. The portal sometimes sends it as an
/// embedded JSON string rather than an object.
pub(crate) fn response_payload(body: &Value) -> Option<Value> {
    match body.get(RESPONSE_FIELD)? {
        Value::String(s) => serde_json::from_str(s).ok(),
        other => Some(other.clone()),
    }
}

fn as_f64(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}
