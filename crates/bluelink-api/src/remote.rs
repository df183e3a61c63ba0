// Remote-action endpoint
//
// Lock, unlock, start, stop and locate all go through here. The token
// dialect addresses each action by path; the session dialect posts every
// action to one endpoint and names it in a `service` field alongside the
// identity.

use secrecy::ExposeSecret;
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::BlueLinkClient;
use crate::dialect::{Dialect, Service};
use crate::error::Error;
use crate::models::{ActionContext, ActionResponse};

impl BlueLinkClient {
    /// Send one remote action and return the gateway's verdict.
    ///
    /// Non-2xx statuses surface as errors (`Authentication` for 401,
    /// `Status` otherwise); a 2xx response is returned with its parsed
    /// result marker for the caller to interpret.
    pub async fn remote_action(
        &self,
        ctx: &ActionContext<'_>,
        service: Service,
        params: Map<String, Value>,
    ) -> Result<ActionResponse, Error> {
        let dialect = self.dialect();
        let method = dialect.method_for(service);
        let url = self.url(self.endpoints().action_path(service))?;
        debug!(service = service.wire_name(), %method, "sending remote action to {}", url);

        let body = self.action_body(ctx, service, params);
        let mut builder = self.authenticated(self.http().request(method.clone(), url), ctx);
        if method != reqwest::Method::GET && !body.is_empty() {
            builder = self.encode_body(builder, service, &body);
        }

        let body = self.send_json(builder).await?;
        let response = ActionResponse::from_body(body);
        debug!(service = service.wire_name(), status = ?response.status, "remote action answered");
        Ok(response)
    }

    /// Assemble the request body for the active dialect.
    pub(crate) fn action_body(
        &self,
        ctx: &ActionContext<'_>,
        service: Service,
        params: Map<String, Value>,
    ) -> Map<String, Value> {
        match self.dialect() {
            Dialect::Token => params,
            Dialect::Session => {
                let identity = ctx.identity;
                let mut body = params;
                body.insert("service".into(), service.wire_name().into());
                body.insert("regId".into(), identity.registration_id.clone().into());
                body.insert("vin".into(), identity.vin.clone().into());
                body.insert("username".into(), ctx.username.into());
                body.insert("pin".into(), ctx.pin.expose_secret().into());
                body.insert(
                    "token".into(),
                    identity.access_token.expose_secret().into(),
                );
                body.insert("gen".into(), identity.vehicle_generation.clone().into());
                body
            }
        }
    }
}
