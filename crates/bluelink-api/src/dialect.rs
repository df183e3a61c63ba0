use reqwest::Method;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Which upstream protocol flavour the gateway speaks.
///
/// Both dialects share the enrollment/command model; they differ in how a
/// session is established and how remote actions are addressed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Dialect {
    /// OAuth-style token exchange with client id/secret (mobile app API).
    #[default]
    Token,
    /// Anti-forgery token + cookie session (owners web portal).
    Session,
}

impl Dialect {
    /// Default gateway root for this dialect.
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Token => "https://api.telematics.hyundaiusa.com",
            Self::Session => "https://owners.hyundaiusa.com",
        }
    }

    /// Stock body encoding for one remote action.
    ///
    /// The token gateway takes lock and unlock as form posts but the
    /// climate start payload as JSON. The session portal is form-only.
    pub fn encoding_for(self, service: Service) -> ActionEncoding {
        match (self, service) {
            (Self::Token, Service::Start) => ActionEncoding::Json,
            _ => ActionEncoding::Form,
        }
    }

    /// Whether login needs an API client id and secret.
    pub fn requires_client_credentials(self) -> bool {
        matches!(self, Self::Token)
    }

    /// Whether the HTTP client must carry a cookie jar.
    pub fn uses_cookies(self) -> bool {
        matches!(self, Self::Session)
    }

    /// Whether a 2xx action response without a result marker counts as
    /// accepted. The token gateway reports failures through the status
    /// code alone; the session gateway always answers with a marker.
    pub fn implicit_success(self) -> bool {
        matches!(self, Self::Token)
    }

    /// HTTP method for a remote action.
    pub fn method_for(self, service: Service) -> Method {
        match (self, service) {
            (Self::Token, Service::Find) => Method::GET,
            _ => Method::POST,
        }
    }
}

/// How remote-action bodies are encoded.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ActionEncoding {
    /// `application/json`
    Json,
    /// `application/x-www-form-urlencoded`; nested values become JSON strings.
    Form,
}

/// Vehicle-affecting remote actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum Service {
    #[strum(serialize = "remotelock")]
    Lock,
    #[strum(serialize = "remoteunlock")]
    Unlock,
    #[strum(serialize = "ignitionstart")]
    Start,
    #[strum(serialize = "ignitionstop")]
    Stop,
    #[strum(serialize = "getFindMyCar")]
    Find,
}

impl Service {
    /// The `service` field value the gateway expects.
    pub fn wire_name(self) -> &'static str {
        self.into()
    }
}

/// Endpoint paths for one dialect, relative to the gateway root.
///
/// Paths are vendor-specific and change between app releases, so every
/// entry can be overridden from configuration. `{username}` in
/// `enrollment` is substituted at call time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Token exchange (token dialect) or identity-establishing login
    /// (session dialect).
    pub login: String,
    /// Anti-forgery token fetch. Session dialect only.
    pub csrf: Option<String>,
    /// Anti-forgery token validation. Session dialect only.
    pub csrf_validate: Option<String>,
    pub enrollment: String,
    pub lock: String,
    pub unlock: String,
    pub start: String,
    pub stop: String,
    pub find: String,
    /// Optional server-side logout.
    pub logout: Option<String>,
}

impl Endpoints {
    /// Stock endpoint table for a dialect.
    pub fn for_dialect(dialect: Dialect) -> Self {
        match dialect {
            Dialect::Token => Self {
                login: "/v2/ac/oauth/token".into(),
                csrf: None,
                csrf_validate: None,
                enrollment: "/ac/v2/enrollment/details/{username}".into(),
                lock: "/ac/v2/rcs/rdo/off".into(),
                unlock: "/ac/v2/rcs/rdo/on".into(),
                start: "/ac/v2/rcs/rsc/start".into(),
                stop: "/ac/v2/rcs/rsc/stop".into(),
                find: "/ac/v2/rcs/rfc/findMyCar".into(),
                logout: None,
            },
            Dialect::Session => {
                let remote = "/bin/common/remoteAction".to_owned();
                Self {
                    login: "/bin/common/connectCar".into(),
                    csrf: Some("/etc/designs/ownercommon/us/token.json".into()),
                    csrf_validate: Some("/libs/granite/csrf/validate.json".into()),
                    enrollment: "/bin/common/enrollmentDetails/{username}".into(),
                    lock: remote.clone(),
                    unlock: remote.clone(),
                    start: remote.clone(),
                    stop: remote.clone(),
                    find: remote,
                    logout: None,
                }
            }
        }
    }

    /// Path for a remote action.
    pub fn action_path(&self, service: Service) -> &str {
        match service {
            Service::Lock => &self.lock,
            Service::Unlock => &self.unlock,
            Service::Start => &self.start,
            Service::Stop => &self.stop,
            Service::Find => &self.find,
        }
    }

    /// Enrollment path for a user.
    pub fn enrollment_path(&self, username: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(username.as_bytes()).collect();
        self.enrollment.replace("{username}", &encoded)
    }
}
