//! Turning a raw `(status, body)` pair into a value or a typed error.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use svcreg_http_client::{CallOutcome, StatusCode};
use tracing::debug;

use crate::{RegistryError, Result};

const UNKNOWN_ERROR: &str = "unknown error";

/// Error body returned by the registry for rejected calls.
///
/// A `null` body or a `null` message reads as no message.
#[derive(Debug, Default, Deserialize)]
struct ErrorMessage {
    #[serde(default)]
    message: Option<String>,
}

/// Classify a response, decoding a success body into `T`.
///
/// A blank body or a JSON `null` on success yields `Ok(None)`.
pub fn classify<T: DeserializeOwned>(outcome: &CallOutcome) -> Result<Option<T>> {
    let status = outcome.status();

    if outcome.is_success() {
        if outcome.is_blank() {
            return Ok(None);
        }
        return serde_json::from_slice::<Option<T>>(outcome.bytes()).map_err(|e| {
            debug!(status = %status, error = %e, "Undecodable success body");
            RegistryError::InvalidResponse(e.to_string())
        });
    }

    Err(classify_failure(status, outcome))
}

fn classify_failure(status: StatusCode, outcome: &CallOutcome) -> RegistryError {
    match status {
        StatusCode::NOT_FOUND => RegistryError::ResourceNotFound,
        StatusCode::INTERNAL_SERVER_ERROR => {
            RegistryError::InvalidResponse(format!("server failure: {}", outcome.text()))
        }
        _ => match serde_json::from_slice::<Option<ErrorMessage>>(outcome.bytes()) {
            Ok(body) => {
                let message = body
                    .unwrap_or_default()
                    .message
                    .filter(|message| !message.is_empty())
                    .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
                RegistryError::ServerError {
                    status: status.as_u16(),
                    message,
                }
            }
            Err(e) => {
                debug!(status = %status, error = %e, "Undecodable error body");
                RegistryError::InvalidResponse(format!("status {}: {}", status.as_u16(), e))
            }
        },
    }
}
