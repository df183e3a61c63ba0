#![allow(clippy::unwrap_used)]
// Integration tests for `BlueLinkClient` using wiremock.

use secrecy::SecretString;
use serde_json::{Map, Value, json};
use url::Url;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bluelink_api::{
    ActionContext, ActionEncoding, BlueLinkClient, Dialect, Error, Identity, ResultStatus,
    Service,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(dialect: Dialect) -> (MockServer, BlueLinkClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = BlueLinkClient::with_client(reqwest::Client::new(), base_url, dialect);
    (server, client)
}

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_owned())
}

fn identity() -> Identity {
    Identity {
        access_token: secret("tok-123"),
        registration_id: "REG-9".into(),
        vehicle_generation: "2".into(),
        brand_indicator: "H".into(),
        vin: "KM8J33A49LU000001".into(),
    }
}

// ── Token dialect ───────────────────────────────────────────────────

#[tokio::test]
async fn test_exchange_token_success() {
    let (server, client) = setup(Dialect::Token).await;

    Mock::given(method("POST"))
        .and(path("/v2/ac/oauth/token"))
        .and(header("client_id", "app-id"))
        .and(header("client_secret", "app-secret"))
        .and(body_string_contains("username=driver"))
        .and(body_string_contains("password=hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-123",
            "expires_in": "1799"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let grant = client
        .exchange_token("driver", &secret("hunter2"), "app-id", &secret("app-secret"))
        .await
        .unwrap();

    assert!(grant.registration_id.is_none());
}

#[tokio::test]
async fn test_exchange_token_rejected() {
    let (server, client) = setup(Dialect::Token).await;

    Mock::given(method("POST"))
        .and(path("/v2/ac/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .mount(&server)
        .await;

    let result = client
        .exchange_token("driver", &secret("wrong"), "app-id", &secret("app-secret"))
        .await;

    match result {
        Err(Error::Authentication { ref message }) => {
            assert!(message.contains("invalid_grant"), "got: {message}");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_enrolled_vehicles() {
    let (server, client) = setup(Dialect::Token).await;

    Mock::given(method("GET"))
        .and(path("/ac/v2/enrollment/details/driver"))
        .and(header("access_token", "tok-123"))
        .and(header("includeNonConnectedVehicles", "N"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "enrolledVehicleDetails": [
                { "vehicleDetails": {
                    "regid": "REG-9", "vehicleGeneration": "2",
                    "vin": "KM8J33A49LU000001", "brandIndicator": "H",
                    "nickName": "Santa Fe"
                } },
                { "vehicleDetails": {
                    "regid": "REG-10", "vehicleGeneration": 3,
                    "vin": "KM8J33A49LU000002", "brandIndicator": "H"
                } }
            ]
        })))
        .mount(&server)
        .await;

    let vehicles = client
        .enrolled_vehicles("driver", &secret("tok-123"), Some("app-id"))
        .await
        .unwrap();

    assert_eq!(vehicles.len(), 2);
    assert_eq!(vehicles[0].registration_id, "REG-9");
    assert_eq!(vehicles[0].nick_name.as_deref(), Some("Santa Fe"));
    assert_eq!(vehicles[1].vehicle_generation, "3");
}

#[tokio::test]
async fn test_remote_action_sends_gateway_headers() {
    let (server, client) = setup(Dialect::Token).await;

    Mock::given(method("POST"))
        .and(path("/ac/v2/rcs/rdo/off"))
        .and(header("access_token", "tok-123"))
        .and(header("client_id", "app-id"))
        .and(header("regestrationId", "REG-9"))
        .and(header("gen", "2"))
        .and(header("username", "driver"))
        .and(header("vin", "KM8J33A49LU000001"))
        .and(header("APPCLOUD-VIN", "KM8J33A49LU000001"))
        .and(header("Language", "0"))
        .and(header("from", "SPA"))
        .and(header("to", "ISS"))
        .and(header("encryptFlag", "false"))
        .and(header("brandIndicator", "H"))
        .and(header("bluelinkservicepin", "1234"))
        .and(header("offset", "-4"))
        .and(header("user-agent", "okhttp/3.12.0"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("userName=driver"))
        .and(body_string_contains("vin=KM8J33A49LU000001"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let id = identity();
    let pin = secret("1234");
    let ctx = ActionContext {
        identity: &id,
        username: "driver",
        pin: &pin,
        client_id: Some("app-id"),
    };
    let mut params = Map::new();
    params.insert("userName".into(), Value::from("driver"));
    params.insert("vin".into(), Value::from(id.vin.clone()));

    let resp = client.remote_action(&ctx, Service::Lock, params).await.unwrap();
    assert_eq!(resp.status, ResultStatus::Absent);
}

#[tokio::test]
async fn test_token_start_is_sent_as_json() {
    let (server, client) = setup(Dialect::Token).await;

    Mock::given(method("POST"))
        .and(path("/ac/v2/rcs/rsc/start"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "airCtrl": 1,
            "airTemp": { "unit": 1, "value": "72" }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let id = identity();
    let pin = secret("1234");
    let ctx = ActionContext {
        identity: &id,
        username: "driver",
        pin: &pin,
        client_id: Some("app-id"),
    };
    let mut params = Map::new();
    params.insert("airCtrl".into(), Value::from(1));
    params.insert("airTemp".into(), json!({ "unit": 1, "value": "72" }));

    let resp = client.remote_action(&ctx, Service::Start, params).await.unwrap();
    assert_eq!(resp.status, ResultStatus::Absent);
}

#[tokio::test]
async fn test_remote_action_unauthorized_is_auth_error() {
    let (server, client) = setup(Dialect::Token).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .mount(&server)
        .await;

    let id = identity();
    let pin = secret("1234");
    let ctx = ActionContext {
        identity: &id,
        username: "driver",
        pin: &pin,
        client_id: None,
    };
    let err = client
        .remote_action(&ctx, Service::Stop, Map::new())
        .await
        .unwrap_err();

    assert!(err.is_auth_rejection(), "got: {err:?}");
}

#[tokio::test]
async fn test_remote_action_server_error_is_status() {
    let (server, client) = setup(Dialect::Token).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let id = identity();
    let pin = secret("1234");
    let ctx = ActionContext {
        identity: &id,
        username: "driver",
        pin: &pin,
        client_id: None,
    };
    let err = client
        .remote_action(&ctx, Service::Unlock, Map::new())
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::Status { status: 502, .. }),
        "got: {err:?}"
    );
}

// ── Session dialect ─────────────────────────────────────────────────

#[tokio::test]
async fn test_session_login_flow() {
    let (server, client) = setup(Dialect::Session).await;

    Mock::given(method("GET"))
        .and(path("/etc/designs/ownercommon/us/token.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "jwt_id": "HT-abc" })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/libs/granite/csrf/validate.json"))
        .and(body_string_contains("token=HT-abc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "E_IFRESULT": "Z:Success" })),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/bin/common/connectCar"))
        .and(body_string_contains("service=userProfile"))
        .and(body_string_contains("token=HT-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "E_IFRESULT": "Z:Success",
            "RESPONSE_STRING": { "accessToken": "sess-tok", "regId": "REG-9" }
        })))
        .mount(&server)
        .await;

    let csrf = client.fetch_csrf_token().await.unwrap();
    client.validate_csrf_token(&csrf).await.unwrap();
    let grant = client
        .establish_session("driver", &secret("hunter2"), &csrf)
        .await
        .unwrap();

    assert_eq!(grant.registration_id.as_deref(), Some("REG-9"));
}

#[tokio::test]
async fn test_session_csrf_rejected() {
    let (server, client) = setup(Dialect::Session).await;

    Mock::given(method("POST"))
        .and(path("/libs/granite/csrf/validate.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "E_IFRESULT": "Z:Failure",
            "E_IFFAILMSG": "token expired"
        })))
        .mount(&server)
        .await;

    let result = client.validate_csrf_token(&secret("HT-old")).await;

    match result {
        Err(Error::Authentication { ref message }) => {
            assert!(message.contains("token expired"), "got: {message}");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_session_action_carries_service_envelope() {
    let (server, client) = setup(Dialect::Session).await;

    Mock::given(method("POST"))
        .and(path("/bin/common/remoteAction"))
        .and(body_string_contains("service=remoteunlock"))
        .and(body_string_contains("regId=REG-9"))
        .and(body_string_contains("pin=1234"))
        .and(body_string_contains("gen=2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "E_IFRESULT": "Z:Failure",
            "E_IFFAILMSG": "Door open"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = identity();
    let pin = secret("1234");
    let ctx = ActionContext {
        identity: &id,
        username: "driver",
        pin: &pin,
        client_id: None,
    };
    let resp = client
        .remote_action(&ctx, Service::Unlock, Map::new())
        .await
        .unwrap();

    assert_eq!(resp.status, ResultStatus::Failure("Door open".into()));
}

#[tokio::test]
async fn test_json_encoding_override_for_session_dialect() {
    let (server, client) = setup(Dialect::Session).await;
    let client = client.with_encoding(ActionEncoding::Json);

    Mock::given(method("POST"))
        .and(path("/bin/common/remoteAction"))
        .and(body_partial_json(json!({ "service": "ignitionstop", "regId": "REG-9" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "E_IFRESULT": "Z:Success" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let id = identity();
    let pin = secret("1234");
    let ctx = ActionContext {
        identity: &id,
        username: "driver",
        pin: &pin,
        client_id: None,
    };
    let resp = client
        .remote_action(&ctx, Service::Stop, Map::new())
        .await
        .unwrap();

    assert_eq!(resp.status, ResultStatus::Success);
}
