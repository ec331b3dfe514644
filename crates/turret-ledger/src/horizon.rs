//! Production gateway over the ledger's HTTP query/submit API.

use crate::account::{AccountRecord, SignerEntry, Thresholds};
use crate::gateway::LedgerGateway;
use crate::tx::TransactionEnvelope;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use turret_core::{AccountId, Result, SignerKey, TurretError, TxFunctionHash, TxHash};

/// HTTP implementation of [`LedgerGateway`].
#[derive(Debug, Clone)]
pub struct HorizonGateway {
    client: reqwest::Client,
    base_url: String,
}

/// Account JSON as served by the query API. Data entry values arrive
/// base64-encoded.
#[derive(Debug, Deserialize)]
struct AccountResponse {
    id: AccountId,
    sequence: i64,
    signers: Vec<SignerEntry>,
    #[serde(default)]
    data: BTreeMap<String, String>,
    #[serde(default)]
    thresholds: Thresholds,
    #[serde(default)]
    home_domain: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    hash: TxHash,
}

#[derive(Debug, Deserialize)]
struct TxFunctionResponse {
    signer: SignerKey,
}

impl HorizonGateway {
    /// Build a gateway for `base_url` with a bounded per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| TurretError::config(format!("http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn unavailable(context: &str, e: reqwest::Error) -> TurretError {
        TurretError::unavailable(format!("{context}: {e}"))
    }
}

#[async_trait]
impl LedgerGateway for HorizonGateway {
    async fn get_account(&self, id: &AccountId) -> Result<AccountRecord> {
        let url = format!("{}/accounts/{id}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::unavailable("account fetch", e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(TurretError::not_found(format!("account {id} not found")));
        }
        let response = response
            .error_for_status()
            .map_err(|e| Self::unavailable("account fetch", e))?;
        let body: AccountResponse = response
            .json()
            .await
            .map_err(|e| Self::unavailable("account decode", e))?;

        let mut data = BTreeMap::new();
        for (key, value) in body.data {
            let value = BASE64.decode(&value).map_err(|_| {
                TurretError::unavailable(format!("account {id} data entry {key} is not base64"))
            })?;
            data.insert(key, value);
        }

        Ok(AccountRecord {
            id: body.id,
            sequence: body.sequence,
            signers: body.signers,
            data,
            thresholds: body.thresholds,
            home_domain: body.home_domain,
        })
    }

    async fn transaction_exists(&self, hash: &TxHash) -> Result<bool> {
        let url = format!("{}/transactions/{hash}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::unavailable("transaction probe", e))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            reqwest::StatusCode::NOT_FOUND => Ok(false),
            status => Err(TurretError::unavailable(format!(
                "transaction probe returned {status}"
            ))),
        }
    }

    async fn submit(&self, envelope: &TransactionEnvelope) -> Result<TxHash> {
        let url = format!("{}/transactions", self.base_url);
        let response = self
            .client
            .post(&url)
            .form(&[("tx", envelope.to_base64()?)])
            .send()
            .await
            .map_err(|e| Self::unavailable("transaction submit", e))?;

        let status = response.status();
        if status.is_client_error() {
            let reason = response.text().await.unwrap_or_default();
            return Err(TurretError::validation(format!(
                "transaction rejected by ledger: {reason}"
            )));
        }
        let response = response
            .error_for_status()
            .map_err(|e| Self::unavailable("transaction submit", e))?;
        let body: SubmitResponse = response
            .json()
            .await
            .map_err(|e| Self::unavailable("submit decode", e))?;
        Ok(body.hash)
    }

    async fn resolve_tx_function_signer(
        &self,
        home_domain: &str,
        hash: &TxFunctionHash,
    ) -> Option<SignerKey> {
        let url = format!("https://{home_domain}/tx-functions/{hash}");
        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(%home_domain, %hash, error = %e, "peer turret unreachable");
                return None;
            }
        };
        if !response.status().is_success() {
            tracing::debug!(%home_domain, %hash, status = %response.status(), "peer turret lookup failed");
            return None;
        }
        match response.json::<TxFunctionResponse>().await {
            Ok(body) => Some(body.signer),
            Err(e) => {
                tracing::debug!(%home_domain, %hash, error = %e, "peer turret response malformed");
                None
            }
        }
    }
}
