//! Session creation against `com.atproto.server.createSession`.

use log::{debug, info};
use reqwest::Client;
use serde_json::json;

use crate::config::{mask_secret, Credentials, SyncConfig};
use crate::error::AuthError;
use crate::http::{send_json_request, BodyPolicy, Operation};

use super::types::Session;

pub const CREATE_SESSION_METHOD: &str = "com.atproto.server.createSession";

/// Builds the Authorization header value for an access JWT.
///
/// # Example
///
/// ```rust
/// use skysync::build_bearer_header;
///
/// let header = build_bearer_header("your_access_jwt");
/// assert_eq!(header, "Bearer your_access_jwt");
/// ```
pub fn build_bearer_header(access_jwt: &str) -> String {
    format!("Bearer {}", access_jwt)
}

/// Exchanges the account credentials for a session.
///
/// One attempt is made. The session is scoped to the current run and is
/// never stored.
///
/// # Parameters
///
/// - `client`: HTTP client shared by the run
/// - `config`: Provides the service URL
/// - `credentials`: Identifier and app password
///
/// # Returns
///
/// - `Ok(Session)`: Access JWT, refresh JWT and account identity
/// - `Err(AuthError)`: If a credential is empty, the service rejects the
///   login, or the response body is not a session
pub async fn create_session(
    client: &Client,
    config: &SyncConfig,
    credentials: &Credentials,
) -> Result<Session, AuthError> {
    if credentials.identifier.is_empty() || credentials.secret.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    let url = config.xrpc_url(CREATE_SESSION_METHOD);
    info!("Creating session for {}", credentials.identifier);
    debug!(
        "Request URL: {}, password (masked): {}",
        url,
        mask_secret(&credentials.secret)
    );

    let payload = json!({
        "identifier": credentials.identifier,
        "password": credentials.secret,
    });

    let request_builder = client.post(&url).json(&payload);
    let response = send_json_request(
        request_builder,
        Operation::upstream("create_session"),
        BodyPolicy::RequireJson,
    )
    .await?;

    let session: Session = response.parse()?;

    info!(
        "Session created successfully for @{} ({})",
        session.handle, session.did
    );
    Ok(session)
}
