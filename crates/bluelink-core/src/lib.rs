// bluelink-core: Session lifecycle and remote commands on top of bluelink-api.

pub mod bluelink;
pub mod climate;
pub mod command;
pub mod config;
pub mod credentials;
pub mod error;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bluelink::BlueLink;
pub use climate::{ClimateRecommendation, SeatClimate};
pub use command::{
    ClimatePreset, CommandOutcome, CommandReply, CommandRequest, Coordinates, Dispatcher,
    StartMode,
};
pub use config::{BlueLinkConfig, TlsVerification};
pub use credentials::Credentials;
pub use error::CoreError;
pub use session::{SessionManager, SessionPhase};

// Transport-level types consumers need without depending on bluelink-api.
pub use bluelink_api::{ActionEncoding, Dialect, Endpoints, Identity, Service};
