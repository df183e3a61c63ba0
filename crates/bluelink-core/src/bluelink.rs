// ── BlueLink facade ──
//
// One account, one vehicle, one session. Operations take `&mut self` and
// await each gateway round-trip in turn, so commands never overlap and
// run in caller order.

use bluelink_api::{
    ActionContext, ActionResponse, BlueLinkClient, Identity, TlsMode, TransportConfig,
};
use tracing::{debug, info, warn};

use crate::command::{CommandReply, CommandRequest, Coordinates, Dispatcher, StartMode};
use crate::config::{BlueLinkConfig, TlsVerification};
use crate::credentials::Credentials;
use crate::error::CoreError;
use crate::session::{SessionManager, SessionPhase};

/// High-level handle for remote control of one vehicle.
///
/// Commands use the identity cached by the last successful [`login`];
/// they never re-authenticate on their own.
///
/// [`login`]: BlueLink::login
#[derive(Debug)]
pub struct BlueLink {
    client: BlueLinkClient,
    credentials: Credentials,
    session: SessionManager,
}

impl BlueLink {
    /// Build a facade (and its HTTP client) from configuration.
    pub fn new(config: &BlueLinkConfig, credentials: Credentials) -> Result<Self, CoreError> {
        let transport = build_transport(config);
        let client = BlueLinkClient::new(
            config.base_url.clone(),
            config.dialect,
            config.endpoints.clone(),
            config.encoding,
            &transport,
        )?;
        debug!(dialect = %config.dialect, base_url = %config.base_url, "client ready");
        Ok(Self::with_client(client, credentials))
    }

    /// Wrap an existing client.
    pub fn with_client(client: BlueLinkClient, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
            session: SessionManager::new(),
        }
    }

    pub fn client(&self) -> &BlueLinkClient {
        &self.client
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    pub fn identity(&self) -> Result<&Identity, CoreError> {
        self.session.identity()
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Log in with the stored credentials. Consumes their password.
    pub async fn login(&mut self) -> Result<Identity, CoreError> {
        self.session.login(&self.client, &mut self.credentials).await
    }

    /// Replace the stored credentials, then log in.
    pub async fn login_with(&mut self, credentials: Credentials) -> Result<Identity, CoreError> {
        self.credentials = credentials;
        self.login().await
    }

    pub async fn logout(&mut self) {
        self.session.logout(&self.client, &self.credentials).await;
    }

    // ── Commands ─────────────────────────────────────────────────────
    //
    // A reply from these is always a success: a rejection reported in the
    // response body comes back as `CoreError::CommandFailed`.

    pub async fn lock(&mut self) -> Result<CommandReply, CoreError> {
        self.dispatch(CommandRequest::lock).await?.into_result()
    }

    pub async fn unlock(&mut self) -> Result<CommandReply, CoreError> {
        self.dispatch(CommandRequest::unlock).await?.into_result()
    }

    /// Remote start with climate control.
    ///
    /// A climate start needs a finite outdoor temperature; anything else
    /// fails with `ValidationFailed` before the session is consulted.
    pub async fn start(&mut self, mode: StartMode) -> Result<CommandReply, CoreError> {
        mode.validate()?;
        self.dispatch(|username, vin| CommandRequest::start(mode, username, vin))
            .await?
            .into_result()
    }

    pub async fn stop(&mut self) -> Result<CommandReply, CoreError> {
        self.dispatch(|_, _| CommandRequest::stop()).await?.into_result()
    }

    /// Locate the vehicle.
    ///
    /// Only a missing session is an error. Any other failure, including a
    /// rejected command or a body without coordinates, yields
    /// [`Coordinates::UNKNOWN`].
    pub async fn find(&mut self) -> Result<Coordinates, CoreError> {
        let reply = match self.dispatch(|_, _| CommandRequest::find()).await {
            Ok(reply) => reply,
            Err(CoreError::NotAuthenticated) => return Err(CoreError::NotAuthenticated),
            Err(e) => {
                warn!(error = %e, "vehicle location unavailable");
                return Ok(Coordinates::UNKNOWN);
            }
        };
        if !reply.outcome.is_success() {
            return Ok(Coordinates::UNKNOWN);
        }

        let coordinates = ActionResponse::from_body(reply.body)
            .coordinates()
            .map_or(Coordinates::UNKNOWN, |(lat, lon)| {
                Coordinates::truncated(lat, lon)
            });
        if coordinates.is_known() {
            info!(
                latitude = coordinates.latitude,
                longitude = coordinates.longitude,
                "vehicle located"
            );
        } else {
            warn!("location response carried no coordinates");
        }
        Ok(coordinates)
    }

    /// Build and send one command against the Ready identity.
    ///
    /// Fails with `NotAuthenticated` before any network call when there
    /// is no session. An authentication rejection clears the identity.
    async fn dispatch<F>(&mut self, build: F) -> Result<CommandReply, CoreError>
    where
        F: FnOnce(&str, &str) -> CommandRequest,
    {
        let identity = self.session.identity()?;
        let request = build(self.credentials.username(), &identity.vin);
        let ctx = ActionContext {
            identity,
            username: self.credentials.username(),
            pin: self.credentials.pin(),
            client_id: self.credentials.client_id(),
        };

        let result = Dispatcher::new(&self.client).send(&ctx, request).await;
        if let Err(ref e) = result {
            if e.is_auth_rejection() {
                warn!("gateway rejected the session; log in again");
                self.session.invalidate();
            }
        }
        result
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn build_transport(config: &BlueLinkConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
        ..TransportConfig::default()
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
