// bluelink-api: Async Rust client for the Hyundai Blue Link telematics gateway

pub mod client;
pub mod dialect;
pub mod enrollment;
pub mod error;
pub mod models;
pub mod remote;
pub mod session;
pub mod transport;

pub use client::BlueLinkClient;
pub use dialect::{ActionEncoding, Dialect, Endpoints, Service};
pub use error::Error;
pub use models::{
    ActionContext, ActionResponse, Identity, ResultStatus, TokenGrant, VehicleDetails,
};
pub use transport::{TlsMode, TransportConfig};
