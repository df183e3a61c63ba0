// ── Session Manager ──
//
// Owns the authentication state machine:
//
//   Unauthenticated → TokenAcquired → VehicleDiscovered → Ready
//   Ready → Unauthenticated   (logout, or any auth rejection)
//
// A failed step drops back to Unauthenticated; nothing is retried.

use bluelink_api::{
    ActionContext, BlueLinkClient, Dialect, Identity, TokenGrant, VehicleDetails,
};
use secrecy::SecretString;
use strum::Display;
use tracing::{debug, info, warn};

use crate::credentials::Credentials;
use crate::error::CoreError;

/// Observable session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum SessionPhase {
    Unauthenticated,
    TokenAcquired,
    VehicleDiscovered,
    Ready,
}

#[derive(Debug, Default)]
enum SessionState {
    #[default]
    Unauthenticated,
    TokenAcquired(TokenGrant),
    VehicleDiscovered {
        grant: TokenGrant,
        vehicle: VehicleDetails,
    },
    Ready(Identity),
}

/// Converts credentials into a live [`Identity`] and holds it.
#[derive(Debug, Default)]
pub struct SessionManager {
    state: SessionState,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        match self.state {
            SessionState::Unauthenticated => SessionPhase::Unauthenticated,
            SessionState::TokenAcquired(_) => SessionPhase::TokenAcquired,
            SessionState::VehicleDiscovered { .. } => SessionPhase::VehicleDiscovered,
            SessionState::Ready(_) => SessionPhase::Ready,
        }
    }

    /// The Ready identity, or `NotAuthenticated`.
    pub fn identity(&self) -> Result<&Identity, CoreError> {
        match &self.state {
            SessionState::Ready(identity) => Ok(identity),
            _ => Err(CoreError::NotAuthenticated),
        }
    }

    /// Authenticate and discover the vehicle.
    ///
    /// Any previous identity is dropped first. The password is taken out
    /// of `credentials` and zeroized once the exchange call is done.
    pub async fn login(
        &mut self,
        client: &BlueLinkClient,
        credentials: &mut Credentials,
    ) -> Result<Identity, CoreError> {
        self.state = SessionState::Unauthenticated;
        let dialect = client.dialect();
        credentials.validate(dialect)?;

        info!(%dialect, "logging in to Blue Link");
        let grant = Self::acquire_token(client, credentials).await?;
        self.state = SessionState::TokenAcquired(grant);

        self.discover_vehicle(client, credentials).await?;
        self.promote()?;

        let identity = self.identity()?;
        info!(vin = %identity.vin, "session ready");
        Ok(identity.clone())
    }

    async fn acquire_token(
        client: &BlueLinkClient,
        credentials: &mut Credentials,
    ) -> Result<TokenGrant, CoreError> {
        let password: SecretString = credentials.take_password().ok_or_else(|| {
            CoreError::ValidationFailed {
                message: "password was already used by a previous login".into(),
            }
        })?;

        let result = match client.dialect() {
            Dialect::Token => {
                let (Some(client_id), Some(client_secret)) =
                    (credentials.client_id(), credentials.client_secret())
                else {
                    return Err(CoreError::ValidationFailed {
                        message: "token login needs clientId and clientSecret".into(),
                    });
                };
                client
                    .exchange_token(credentials.username(), &password, client_id, client_secret)
                    .await
            }
            Dialect::Session => {
                establish_portal_session(client, credentials.username(), &password).await
            }
        };
        drop(password);
        debug!("password consumed and cleared");

        result.map_err(|e| {
            warn!(error = %e, "login rejected");
            match CoreError::from(e) {
                CoreError::Transport { status, message } => CoreError::AuthenticationFailed {
                    message: format!("HTTP {status}: {message}"),
                },
                other => other,
            }
        })
    }

    /// Fetch enrollment details and pick the vehicle to control.
    ///
    /// Requires `TokenAcquired`. Prefers the vehicle whose registration id
    /// the login already reported, otherwise the first enrolled one. Any
    /// failure ends the session.
    pub async fn discover_vehicle(
        &mut self,
        client: &BlueLinkClient,
        credentials: &Credentials,
    ) -> Result<VehicleDetails, CoreError> {
        let grant = match std::mem::take(&mut self.state) {
            SessionState::TokenAcquired(grant) => grant,
            other => {
                self.state = other;
                return Err(CoreError::NotAuthenticated);
            }
        };

        debug!("discovering enrolled vehicle");
        let vehicles = client
            .enrolled_vehicles(
                credentials.username(),
                &grant.access_token,
                credentials.client_id(),
            )
            .await
            .map_err(|e| {
                warn!(error = %e, "enrollment lookup failed");
                CoreError::DiscoveryFailed {
                    message: e.to_string(),
                }
            })?;

        let vehicle = select_vehicle(vehicles, grant.registration_id.as_deref()).ok_or_else(
            || CoreError::DiscoveryFailed {
                message: format!("no vehicles enrolled for {}", credentials.username()),
            },
        )?;

        if !credentials.vin().eq_ignore_ascii_case(&vehicle.vin) {
            warn!(
                configured = credentials.vin(),
                enrolled = %vehicle.vin,
                "configured VIN differs from the enrolled vehicle; using the enrolled one"
            );
        }

        self.state = SessionState::VehicleDiscovered {
            grant,
            vehicle: vehicle.clone(),
        };
        Ok(vehicle)
    }

    /// `VehicleDiscovered → Ready`, once the identity is complete.
    fn promote(&mut self) -> Result<(), CoreError> {
        let (grant, vehicle) = match std::mem::take(&mut self.state) {
            SessionState::VehicleDiscovered { grant, vehicle } => (grant, vehicle),
            other => {
                self.state = other;
                return Err(CoreError::NotAuthenticated);
            }
        };
        if vehicle.registration_id.is_empty() || vehicle.vin.is_empty() {
            return Err(CoreError::DiscoveryFailed {
                message: "enrolled vehicle has no registration id or VIN".into(),
            });
        }
        self.state = SessionState::Ready(Identity::new(grant, vehicle));
        Ok(())
    }

    /// End the session. Calls the dialect's logout endpoint if it has
    /// one; the identity is cleared regardless of the outcome.
    pub async fn logout(&mut self, client: &BlueLinkClient, credentials: &Credentials) {
        if let SessionState::Ready(identity) = &self.state {
            let ctx = ActionContext {
                identity,
                username: credentials.username(),
                pin: credentials.pin(),
                client_id: credentials.client_id(),
            };
            if let Err(e) = client.logout(&ctx).await {
                warn!(error = %e, "server-side logout failed");
            }
        }
        self.invalidate();
        info!("logged out");
    }

    /// Drop the identity without contacting the gateway.
    pub fn invalidate(&mut self) {
        if !matches!(self.state, SessionState::Unauthenticated) {
            debug!("session invalidated");
        }
        self.state = SessionState::Unauthenticated;
    }
}

async fn establish_portal_session(
    client: &BlueLinkClient,
    username: &str,
    password: &SecretString,
) -> Result<TokenGrant, bluelink_api::Error> {
    let csrf = client.fetch_csrf_token().await?;
    client.validate_csrf_token(&csrf).await?;
    client.establish_session(username, password, &csrf).await
}

fn select_vehicle(
    vehicles: Vec<VehicleDetails>,
    registration_hint: Option<&str>,
) -> Option<VehicleDetails> {
    if let Some(hint) = registration_hint {
        if let Some(found) = vehicles.iter().find(|v| v.registration_id == hint) {
            return Some(found.clone());
        }
        debug!(hint, "login registration id not enrolled; using first vehicle");
    }
    vehicles.into_iter().next()
}
