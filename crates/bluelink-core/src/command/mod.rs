// ── Command dispatch ──
//
// Every remote command is one upstream call. The dispatcher sends a
// `CommandRequest` with the caller's identity and turns the gateway's
// answer into a `CommandReply`. Nothing is retried.

pub mod requests;

pub use requests::{ClimatePreset, CommandRequest, Coordinates, PresetSettings, StartMode};

use bluelink_api::{ActionContext, BlueLinkClient, Dialect, ResultStatus, Service};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::CoreError;

/// Outcome of a command the gateway accepted at the HTTP level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "message", rename_all = "lowercase")]
pub enum CommandOutcome {
    Success,
    Failure(String),
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// A dispatched command's verdict and the raw gateway body.
#[must_use]
#[derive(Debug, Clone)]
pub struct CommandReply {
    pub service: Service,
    pub outcome: CommandOutcome,
    pub body: Value,
}

impl CommandReply {
    /// `Ok(self)` on success, `CommandFailed` otherwise.
    pub fn into_result(self) -> Result<Self, CoreError> {
        match &self.outcome {
            CommandOutcome::Success => Ok(self),
            CommandOutcome::Failure(message) => Err(CoreError::CommandFailed {
                service: self.service.to_string(),
                message: message.clone(),
            }),
        }
    }
}

/// Sends commands over one client.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    client: &'a BlueLinkClient,
}

impl<'a> Dispatcher<'a> {
    pub fn new(client: &'a BlueLinkClient) -> Self {
        Self { client }
    }

    /// Send one command.
    ///
    /// Transport failures are errors (401 becomes `AuthenticationFailed`);
    /// a 2xx answer always yields a `CommandReply`, successful or not.
    pub async fn send(
        &self,
        ctx: &ActionContext<'_>,
        request: CommandRequest,
    ) -> Result<CommandReply, CoreError> {
        let service = request.service;
        debug!(%service, vin = %ctx.identity.vin, "dispatching command");

        let response = self
            .client
            .remote_action(ctx, service, request.params)
            .await
            .map_err(|e| {
                warn!(%service, error = %e, "command transport failed");
                CoreError::from(e)
            })?;

        let outcome = interpret(self.client.dialect(), response.status);
        if let CommandOutcome::Failure(ref message) = outcome {
            warn!(%service, reason = %message, "vehicle rejected command");
        }
        Ok(CommandReply {
            service,
            outcome,
            body: response.body,
        })
    }
}

/// Map the gateway's result marker to an outcome.
///
/// The token dialect reports failure through the HTTP status, so a 2xx
/// without a marker counts as success there. The session dialect always
/// sends a marker; its absence is a failure.
pub(crate) fn interpret(dialect: Dialect, status: ResultStatus) -> CommandOutcome {
    match status {
        ResultStatus::Success => CommandOutcome::Success,
        ResultStatus::Failure(message) => CommandOutcome::Failure(message),
        ResultStatus::Absent if dialect.implicit_success() => CommandOutcome::Success,
        ResultStatus::Absent => {
            CommandOutcome::Failure("gateway response carried no result marker".into())
        }
    }
}
