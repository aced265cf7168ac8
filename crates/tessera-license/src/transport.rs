//! License verification transport.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TransportError;
use crate::tier::LicenseTier;

/// Endpoint used when the host does not configure one.
pub const DEFAULT_VERIFICATION_ENDPOINT: &str = "https://license.tessera.dev/api/verify";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub key: String,
}

/// `{valid, type}` as returned by the verification endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResponse {
    pub valid: bool,
    #[serde(rename = "type")]
    pub tier: String,
}

impl VerificationResponse {
    pub fn new(valid: bool, tier: impl Into<String>) -> Self {
        Self {
            valid,
            tier: tier.into(),
        }
    }

    /// PRO only for a valid response whose type is `pro` in any case.
    pub fn granted_tier(&self) -> LicenseTier {
        if self.valid && self.tier.trim().eq_ignore_ascii_case("pro") {
            LicenseTier::Pro
        } else {
            LicenseTier::Free
        }
    }
}

/// Sends a key to whatever decides whether it is good.
#[async_trait]
pub trait VerificationTransport: Send + Sync {
    async fn verify(&self, key: &str) -> Result<VerificationResponse, TransportError>;
}

/// JSON-over-HTTP transport: POSTs `{key}` and expects `{valid, type}`.
///
/// No timeout is applied here; wrap the client if one is needed.
#[derive(Clone, Debug)]
pub struct HttpVerificationTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpVerificationTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for HttpVerificationTransport {
    fn default() -> Self {
        Self::new(DEFAULT_VERIFICATION_ENDPOINT)
    }
}

#[async_trait]
impl VerificationTransport for HttpVerificationTransport {
    async fn verify(&self, key: &str) -> Result<VerificationResponse, TransportError> {
        debug!(endpoint = %self.endpoint, "posting license key for verification");
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&VerificationRequest { key: key.to_string() })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(TransportError::Status(resp.status().as_u16()));
        }

        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| TransportError::Malformed(e.to_string()))
    }
}
