// Unit token authentication
//
// Units hand out a session token from `PUT /auth` in exchange for the
// SHA-256 of their password. The token is cached per unit and dropped as
// soon as the unit answers 401; the next call re-authenticates.

use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::client::{UnitClient, UnitEndpoint, classify_transport, parse_body};
use crate::error::Error;
use crate::models::{AuthRequest, AuthResponse, STATUS_OK};

const AUTH_PATH: &str = "/auth";

/// Hex-encoded SHA-256 digest of a unit password, as `PUT /auth` expects.
pub fn password_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

impl UnitClient {
    /// Return the cached token for a unit, authenticating first if needed.
    pub(crate) async fn token(&self, endpoint: &UnitEndpoint) -> Result<String, Error> {
        if let Some(token) = self.tokens.get(&endpoint.authority()) {
            return Ok(token.value().clone());
        }
        self.authenticate(endpoint).await
    }

    /// Run the token handshake against one unit and cache the result.
    pub async fn authenticate(&self, endpoint: &UnitEndpoint) -> Result<String, Error> {
        let url = self.unit_url(endpoint, AUTH_PATH)?;
        debug!("authenticating at {}", url);

        let body = AuthRequest {
            auth: password_digest(endpoint.password.expose_secret()),
        };

        let resp = self
            .http()
            .put(url)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;

        let reply: AuthResponse = match parse_body(resp).await {
            Ok(reply) => reply,
            Err(Error::Rejected { status, message }) => {
                return Err(Error::Authentication {
                    message: format!("auth failed (HTTP {status}): {message}"),
                });
            }
            Err(e) => return Err(e),
        };

        if reply.status != STATUS_OK {
            return Err(Error::Authentication {
                message: reply
                    .message
                    .unwrap_or_else(|| format!("auth status {}", reply.status)),
            });
        }

        let token = match reply.token {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => {
                return Err(Error::Authentication {
                    message: "auth response carried no token".into(),
                });
            }
        };

        self.tokens.insert(endpoint.authority(), token.clone());
        debug!(unit = %endpoint.authority(), "authenticated");
        Ok(token)
    }

    /// Forget every cached token.
    pub fn clear_tokens(&self) {
        self.tokens.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_lowercase_hex_sha256() {
        assert_eq!(
            password_digest("password"),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
    }
}
