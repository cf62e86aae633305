//! Blockfrost HTTP client implementing [`ChainQuery`].
//!
//! Every request carries the `project_id` header. Responses are decoded into
//! the raw service shapes from the parent module and validated before they
//! leave this file, so the pipeline only ever sees checked values.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::error::ChainQueryError;
use super::{
    ChainParameters, ChainQuery, ChainTip, RawProtocolParameters, RawUnspentOutput, UnspentOutput,
};
use crate::config::UTXO_PAGE_SIZE;
use crate::transaction::address::Address;
use crate::transaction::types::TransactionId;

/// Header Blockfrost reads the project credential from.
const PROJECT_ID_HEADER: &str = "project_id";

#[derive(Debug, Deserialize)]
struct LatestBlock {
    slot: Option<u64>,
}

/// HTTP client for the Blockfrost API.
#[derive(Debug, Clone)]
pub struct BlockfrostClient {
    base_url: String,
    project_id: String,
    client: reqwest::Client,
}

impl BlockfrostClient {
    pub fn new(base_url: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a JSON document. `Ok(None)` means the service answered 404.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<Option<T>, ChainQueryError> {
        let resp = self
            .client
            .get(self.url(endpoint))
            .header(PROJECT_ID_HEADER, &self.project_id)
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = ensure_success(endpoint, resp).await?;
        Ok(Some(resp.json::<T>().await?))
    }

    async fn get_required<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ChainQueryError> {
        self.get_json(endpoint).await?.ok_or_else(|| ChainQueryError::Status {
            endpoint: endpoint.to_string(),
            status: StatusCode::NOT_FOUND.as_u16(),
            body: String::new(),
        })
    }
}

/// Turns a non-2xx response into [`ChainQueryError::Status`] with its body.
async fn ensure_success(endpoint: &str, resp: Response) -> Result<Response, ChainQueryError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ChainQueryError::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl ChainQuery for BlockfrostClient {
    async fn latest_parameters(&self) -> Result<ChainParameters, ChainQueryError> {
        let endpoint = "/epochs/latest/parameters";
        let raw: RawProtocolParameters = self.get_required(endpoint).await?;
        let params = ChainParameters::from_raw(&raw).map_err(|source| {
            ChainQueryError::MalformedResponse {
                endpoint: endpoint.to_string(),
                source,
            }
        })?;
        tracing::debug!(
            min_fee_a = params.min_fee_a,
            min_fee_b = params.min_fee_b.as_u64(),
            max_tx_size = params.max_tx_size,
            "fetched protocol parameters"
        );
        Ok(params)
    }

    async fn latest_tip(&self) -> Result<ChainTip, ChainQueryError> {
        let endpoint = "/blocks/latest";
        let block: LatestBlock = self.get_required(endpoint).await?;
        let slot = block.slot.ok_or(ChainQueryError::MissingField {
            endpoint: endpoint.to_string(),
            field: "slot",
        })?;
        tracing::debug!(slot, "fetched chain tip");
        Ok(ChainTip { slot })
    }

    async fn spendable_outputs(
        &self,
        address: &Address,
    ) -> Result<Vec<UnspentOutput>, ChainQueryError> {
        let mut utxos = Vec::new();
        for page in 1.. {
            let endpoint = format!(
                "/addresses/{}/utxos?count={}&page={}",
                address.as_bech32(),
                UTXO_PAGE_SIZE,
                page
            );
            // Blockfrost answers 404 for addresses that never appeared on chain.
            let Some(batch) = self.get_json::<Vec<RawUnspentOutput>>(&endpoint).await? else {
                break;
            };
            let batch_len = batch.len();
            for raw in &batch {
                let utxo = UnspentOutput::from_raw(raw).map_err(|source| {
                    ChainQueryError::MalformedResponse {
                        endpoint: endpoint.clone(),
                        source,
                    }
                })?;
                utxos.push(utxo);
            }
            if batch_len < UTXO_PAGE_SIZE {
                break;
            }
        }
        tracing::debug!(count = utxos.len(), address = %address, "fetched spendable outputs");
        Ok(utxos)
    }

    async fn submit(&self, signed_tx: &[u8]) -> Result<TransactionId, ChainQueryError> {
        let endpoint = "/tx/submit";
        let resp = self
            .client
            .post(self.url(endpoint))
            .header(PROJECT_ID_HEADER, &self.project_id)
            .header(CONTENT_TYPE, "application/cbor")
            .body(signed_tx.to_vec())
            .send()
            .await?;
        let resp = ensure_success(endpoint, resp).await?;
        let id: String = resp.json().await?;
        Ok(TransactionId::new(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::KeyHash;
    use crate::transaction::types::Lovelace;
    use wiremock::matchers::{body_bytes, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sender() -> Address {
        Address::enterprise(&KeyHash::from_bytes([0x07; 28]), false).unwrap()
    }

    fn utxo_json(index: u32, lovelace: u64) -> serde_json::Value {
        serde_json::json!({
            "tx_hash": "cd".repeat(32),
            "output_index": index,
            "amount": [{ "unit": "lovelace", "quantity": lovelace.to_string() }],
        })
    }

    #[tokio::test]
    async fn fetches_parameters_with_project_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/epochs/latest/parameters"))
            .and(header("project_id", "preprod-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "min_fee_a": 44,
                "min_fee_b": 155381,
                "pool_deposit": "500000000",
                "key_deposit": "2000000",
                "max_val_size": "5000",
                "max_tx_size": 16384,
                "coins_per_utxo_size": "4310",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BlockfrostClient::new(server.uri(), "preprod-test");
        let params = client.latest_parameters().await.unwrap();
        assert_eq!(params.min_fee_a, 44);
        assert_eq!(params.max_tx_size, 16384);
    }

    #[tokio::test]
    async fn fetches_tip_slot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blocks/latest"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "slot": 71_234_567, "height": 1 })),
            )
            .mount(&server)
            .await;

        let client = BlockfrostClient::new(server.uri(), "id");
        assert_eq!(client.latest_tip().await.unwrap().slot, 71_234_567);
    }

    #[tokio::test]
    async fn missing_slot_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blocks/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "slot": null })))
            .mount(&server)
            .await;

        let client = BlockfrostClient::new(server.uri(), "id");
        let err = client.latest_tip().await.unwrap_err();
        assert!(matches!(err, ChainQueryError::MissingField { field: "slot", .. }));
    }

    #[tokio::test]
    async fn unknown_address_has_no_outputs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/addresses/{}/utxos", sender())))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "status_code": 404,
                "error": "Not Found",
            })))
            .mount(&server)
            .await;

        let client = BlockfrostClient::new(server.uri(), "id");
        assert!(client.spendable_outputs(&sender()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn follows_utxo_pagination() {
        let server = MockServer::start().await;
        let full_page: Vec<_> = (0..UTXO_PAGE_SIZE as u32).map(|i| utxo_json(i, 1_000_000)).collect();
        Mock::given(method("GET"))
            .and(path(format!("/addresses/{}/utxos", sender())))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(full_page))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/addresses/{}/utxos", sender())))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(vec![utxo_json(500, 2_000_000)]),
            )
            .mount(&server)
            .await;

        let client = BlockfrostClient::new(server.uri(), "id");
        let utxos = client.spendable_outputs(&sender()).await.unwrap();
        assert_eq!(utxos.len(), UTXO_PAGE_SIZE + 1);
        assert_eq!(utxos.last().unwrap().lovelace, Lovelace::new(2_000_000));
    }

    #[tokio::test]
    async fn submit_posts_cbor_and_returns_id() {
        let server = MockServer::start().await;
        let payload = vec![0x84, 0xa0, 0xa0, 0xf5, 0xf6];
        Mock::given(method("POST"))
            .and(path("/tx/submit"))
            .and(header("content-type", "application/cbor"))
            .and(body_bytes(payload.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json("abc123"))
            .expect(1)
            .mount(&server)
            .await;

        let client = BlockfrostClient::new(format!("{}/", server.uri()), "id");
        let id = client.submit(&payload).await.unwrap();
        assert_eq!(id.as_str(), "abc123");
    }

    #[tokio::test]
    async fn rejected_submission_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tx/submit"))
            .respond_with(ResponseTemplate::new(400).set_body_string("BadInputsUTxO"))
            .mount(&server)
            .await;

        let client = BlockfrostClient::new(server.uri(), "id");
        let err = client.submit(&[0x80]).await.unwrap_err();
        match err {
            ChainQueryError::Status { status, body, .. } => {
                assert_eq!(status, 400);
                assert!(body.contains("BadInputsUTxO"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }
}
