// Gateway authentication
//
// Two dialects establish a session differently:
// - token: a single OAuth-style password grant with the app's client
//   id/secret in headers;
// - session: fetch an anti-forgery token, have the portal validate it,
//   then log in with it. The portal's session cookies ride along in the
//   client's cookie jar.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use crate::client::BlueLinkClient;
use crate::error::{Error, preview};
use crate::models::{
    ActionContext, CsrfResponse, ResultStatus, TokenGrant, TokenResponse, response_payload,
};

/// User agent the token endpoint expects on the password grant.
const TOKEN_USER_AGENT: &str = "PostmanRuntime/7.26.10";

impl BlueLinkClient {
    /// Exchange username/password for an access token (token dialect).
    ///
    /// `POST {login}` with `client_id`/`client_secret` headers and a
    /// form body of `username` + `password`.
    pub async fn exchange_token(
        &self,
        username: &str,
        password: &SecretString,
        client_id: &str,
        client_secret: &SecretString,
    ) -> Result<TokenGrant, Error> {
        let url = self.url(&self.endpoints().login)?;
        debug!("requesting access token at {}", url);

        let resp = self
            .http()
            .post(url)
            .header(reqwest::header::USER_AGENT, TOKEN_USER_AGENT)
            .header("client_id", client_id)
            .header("client_secret", client_secret.expose_secret())
            .form(&[
                ("username", username),
                ("password", password.expose_secret()),
            ])
            .send()
            .await
            .map_err(Error::Http)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("token exchange failed (HTTP {status}): {}", preview(&body)),
            });
        }

        let token: TokenResponse = resp.json().await.map_err(|e| Error::Deserialization {
            message: format!("token response: {e}"),
            body: String::new(),
        })?;
        let access_token = token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Authentication {
                message: "token response carried no access_token".into(),
            })?;

        debug!("access token acquired");
        Ok(TokenGrant {
            access_token: SecretString::from(access_token),
            registration_id: None,
        })
    }

    /// Fetch the portal's anti-forgery token (session dialect).
    ///
    /// `GET {csrf}` returning `{"jwt_id": "..."}`.
    pub async fn fetch_csrf_token(&self) -> Result<SecretString, Error> {
        let path = self
            .endpoints()
            .csrf
            .as_deref()
            .ok_or(Error::MissingField("endpoints.csrf"))?;
        let url = self.url(path)?;
        debug!("fetching anti-forgery token at {}", url);

        let body = self.send_auth_json(self.http().get(url)).await?;
        let csrf: CsrfResponse =
            serde_json::from_value(body.clone()).map_err(|e| Error::Deserialization {
                message: format!("anti-forgery response: {e}"),
                body: body.to_string(),
            })?;

        csrf.jwt_id
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
            .ok_or_else(|| Error::Authentication {
                message: "portal returned no anti-forgery token".into(),
            })
    }

    /// Ask the portal to validate an anti-forgery token (session dialect).
    ///
    /// `POST {csrf_validate}` with form `token`; the body must carry a
    /// success marker.
    pub async fn validate_csrf_token(&self, token: &SecretString) -> Result<(), Error> {
        let path = self
            .endpoints()
            .csrf_validate
            .as_deref()
            .ok_or(Error::MissingField("endpoints.csrf_validate"))?;
        let url = self.url(path)?;
        debug!("validating anti-forgery token at {}", url);

        let body = self
            .send_auth_json(
                self.http()
                    .post(url)
                    .form(&[("token", token.expose_secret())]),
            )
            .await?;

        match ResultStatus::from_body(&body) {
            ResultStatus::Success => Ok(()),
            ResultStatus::Failure(message) => Err(Error::Authentication {
                message: format!("anti-forgery token rejected: {message}"),
            }),
            ResultStatus::Absent => Err(Error::Authentication {
                message: "anti-forgery validation returned no result".into(),
            }),
        }
    }

    /// Log in to the portal with a validated anti-forgery token
    /// (session dialect).
    ///
    /// `POST {login}` with form `username`, `password`, `token`,
    /// `service=userProfile`. Yields `RESPONSE_STRING.accessToken` and
    /// `RESPONSE_STRING.regId`.
    pub async fn establish_session(
        &self,
        username: &str,
        password: &SecretString,
        csrf_token: &SecretString,
    ) -> Result<TokenGrant, Error> {
        let url = self.url(&self.endpoints().login)?;
        debug!("establishing portal session at {}", url);

        let body = self
            .send_auth_json(self.http().post(url).form(&[
                ("username", username),
                ("password", password.expose_secret()),
                ("token", csrf_token.expose_secret()),
                ("service", "userProfile"),
            ]))
            .await?;

        if let ResultStatus::Failure(message) = ResultStatus::from_body(&body) {
            return Err(Error::Authentication { message });
        }

        let payload = response_payload(&body).unwrap_or(Value::Null);
        let access_token = payload
            .get("accessToken")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Authentication {
                message: "portal login returned no access token".into(),
            })?;
        let registration_id = payload
            .get("regId")
            .and_then(Value::as_str)
            .filter(|r| !r.is_empty())
            .map(str::to_owned);

        debug!(has_registration = registration_id.is_some(), "portal session established");
        Ok(TokenGrant {
            access_token: SecretString::from(access_token.to_owned()),
            registration_id,
        })
    }

    /// End the session server-side, if the dialect has a logout endpoint.
    ///
    /// Returns `Ok(false)` when no logout endpoint is configured.
    pub async fn logout(&self, ctx: &ActionContext<'_>) -> Result<bool, Error> {
        let Some(path) = self.endpoints().logout.as_deref() else {
            return Ok(false);
        };
        let url = self.url(path)?;
        debug!("logging out at {}", url);

        let _ = self
            .send_json(self.authenticated(self.http().post(url), ctx))
            .await?;

        debug!("logout complete");
        Ok(true)
    }

    /// Like `send_json`, but every non-2xx is an authentication failure:
    /// during login there is no identity to blame a transport error on.
    async fn send_auth_json(&self, builder: reqwest::RequestBuilder) -> Result<Value, Error> {
        match self.send_json(builder).await {
            Err(Error::Status { status, body }) => Err(Error::Authentication {
                message: format!("login step failed (HTTP {status}): {body}"),
            }),
            other => other,
        }
    }
}
