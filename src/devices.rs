//! Push notification device registration.
//!
//! The push server keeps the list of devices to notify. Registering is a
//! single `POST {"ID": "<hex token>"}`; the server answers `201 Created`.

use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::{Error, Result};

#[derive(Serialize)]
struct Registration<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
}

/// Lowercase hex, two digits per byte.
pub fn encode_token(token: &[u8]) -> String {
    token.iter().map(|b| format!("{b:02x}")).collect()
}

/// Parse a hex token string (either case) back into bytes.
pub fn decode_token(hex: &str) -> Result<Vec<u8>> {
    // ---
    let hex = hex.trim();
    if hex.is_empty() || hex.len() % 2 != 0 || !hex.is_ascii() {
        return Err(Error::Config(format!("device token '{hex}' is not a hex string")));
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| Error::Config(format!("device token '{hex}': {e}")))
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct DeviceRegistrar {
    client: Client,
    url: String,
}

impl DeviceRegistrar {
    // ---
    pub fn new(url: impl Into<String>) -> Self {
        DeviceRegistrar {
            client: Client::new(),
            url: url.into(),
        }
    }

    /// Register `token` with the push server.
    ///
    /// Returns `true` only for `201 Created`. Every other outcome is logged
    /// and never retried.
    pub async fn register(&self, token: &[u8]) -> bool {
        // ---
        let id = encode_token(token);
        info!("Registering device token {}", id);

        let response = match self
            .client
            .post(&self.url)
            .json(&Registration { id: &id })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Error sending device token to {}: {}", self.url, e);
                return false;
            }
        };

        if response.status() != StatusCode::CREATED {
            warn!(
                "Invalid response from push server {}: {}",
                self.url,
                response.status()
            );
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_encode_token() {
        // ---
        assert_eq!(encode_token(&[0x00, 0x0f, 0xab, 0xff]), "000fabff");
        assert_eq!(encode_token(&[]), "");
    }

    #[test]
    fn test_decode_token() {
        // ---
        assert_eq!(decode_token("000FabFF").unwrap(), vec![0x00, 0x0f, 0xab, 0xff]);
        assert_eq!(encode_token(&decode_token(" 0a1b ").unwrap()), "0a1b");
    }

    #[test]
    fn test_decode_token_rejects_garbage() {
        // ---
        assert!(decode_token("").is_err());
        assert!(decode_token("abc").is_err());
        assert!(decode_token("zz").is_err());
        assert!(decode_token("éé").is_err());
    }

    #[test]
    fn test_registration_body() {
        // ---
        let body = serde_json::to_string(&Registration { id: "0a1b" }).unwrap();
        assert_eq!(body, r#"{"ID":"0a1b"}"#);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_not_registered() {
        // ---
        let registrar = DeviceRegistrar::new("http://127.0.0.1:9/");
        assert!(!registrar.register(&[1, 2, 3]).await);
    }
}
