// ── Account credentials ──
//
// Everything the gateway needs to identify the account owner. Secrets
// are `SecretString` so they are redacted in `Debug` and zeroized on
// drop. The password is single-use: login takes it out and drops it as
// soon as the exchange call has been sent.

use bluelink_api::Dialect;
use secrecy::{ExposeSecret, SecretString};

use crate::error::CoreError;

#[derive(Debug, Clone)]
pub struct Credentials {
    username: String,
    password: Option<SecretString>,
    pin: SecretString,
    vin: String,
    client_id: Option<String>,
    client_secret: Option<SecretString>,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: SecretString,
        pin: SecretString,
        vin: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: Some(password),
            pin,
            vin: vin.into(),
            client_id: None,
            client_secret: None,
        }
    }

    /// Attach the API client id/secret the token dialect requires.
    pub fn with_api_client(
        mut self,
        client_id: impl Into<String>,
        client_secret: SecretString,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret);
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn pin(&self) -> &SecretString {
        &self.pin
    }

    pub fn vin(&self) -> &str {
        &self.vin
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn client_secret(&self) -> Option<&SecretString> {
        self.client_secret.as_ref()
    }

    /// `false` once a login has consumed the password.
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Remove the password. The caller owns the only copy from here on.
    pub(crate) fn take_password(&mut self) -> Option<SecretString> {
        self.password.take()
    }

    /// Check that every field the dialect needs is present and non-empty.
    pub fn validate(&self, dialect: Dialect) -> Result<(), CoreError> {
        let mut missing = Vec::new();
        if self.username.trim().is_empty() {
            missing.push("username");
        }
        match &self.password {
            None => {
                return Err(CoreError::ValidationFailed {
                    message: "password was already used by a previous login; \
                              supply credentials again"
                        .into(),
                });
            }
            Some(pw) if pw.expose_secret().is_empty() => missing.push("password"),
            Some(_) => {}
        }
        if self.pin.expose_secret().trim().is_empty() {
            missing.push("pin");
        }
        if self.vin.trim().is_empty() {
            missing.push("vin");
        }
        if dialect.requires_client_credentials() {
            if self.client_id.as_deref().is_none_or(|id| id.trim().is_empty()) {
                missing.push("clientId");
            }
            if self
                .client_secret
                .as_ref()
                .is_none_or(|s| s.expose_secret().trim().is_empty())
            {
                missing.push("clientSecret");
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::ValidationFailed {
                message: format!(
                    "missing credential fields for {dialect} login: {}",
                    missing.join(", ")
                ),
            })
        }
    }
}
