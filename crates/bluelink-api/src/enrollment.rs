// Enrollment (vehicle discovery) endpoint
//
// Lists the vehicles enrolled under an account. Called once per login,
// right after the token is acquired.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::BlueLinkClient;
use crate::error::Error;
use crate::models::{EnrollmentResponse, VehicleDetails};

impl BlueLinkClient {
    /// List the account's enrolled vehicles, in gateway order.
    ///
    /// `GET {enrollment}` with `access_token`, `client_id` (when known)
    /// and `includeNonConnectedVehicles: N`.
    pub async fn enrolled_vehicles(
        &self,
        username: &str,
        access_token: &SecretString,
        client_id: Option<&str>,
    ) -> Result<Vec<VehicleDetails>, Error> {
        let url = self.url(&self.endpoints().enrollment_path(username))?;
        debug!("fetching enrollment details at {}", url);

        let mut builder = self
            .http()
            .get(url)
            .header("access_token", access_token.expose_secret())
            .header("includeNonConnectedVehicles", "N");
        if let Some(client_id) = client_id {
            builder = builder.header("client_id", client_id);
        }

        let body = self.send_json(builder).await?;
        let enrollment: EnrollmentResponse =
            serde_json::from_value(body.clone()).map_err(|e| Error::Deserialization {
                message: format!("enrollment response: {e}"),
                body: body.to_string(),
            })?;

        let vehicles: Vec<VehicleDetails> = enrollment
            .enrolled_vehicle_details
            .into_iter()
            .map(|v| v.vehicle_details)
            .collect();
        debug!(count = vehicles.len(), "enrollment details received");
        Ok(vehicles)
    }
}
