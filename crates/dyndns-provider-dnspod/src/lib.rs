// # dyndns-provider-dnspod
//
// Tencent Cloud DNSPod binding for the dyndns engine.
//
// Implements the engine's `DnsProvider` trait over the DNSPod v3 API
// (service "dnspod", version 2021-03-23): `DescribeRecordList`,
// `CreateRecord`, `ModifyRecord` and `DeleteRecord`, with TC3-HMAC-SHA256
// request signing.

mod sign;
mod types;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dyndns_core::config::{AccountCredentials, RecordType};
use dyndns_core::error::{Error, Result};
use dyndns_core::traits::{DnsProvider, DnsProviderFactory, RemoteRecord};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use types::{
    CreateRecordRequest, CreateRecordResponse, DeleteRecordRequest, DescribeRecordListRequest,
    EmptyResponse, ModifyRecordRequest, RecordListResponse, TencentError, TencentResponse,
};

pub(crate) const DNSPOD_API_HOST: &str = "dnspod.tencentcloudapi.com";
pub(crate) const DNSPOD_SERVICE: &str = "dnspod";
pub(crate) const DNSPOD_VERSION: &str = "2021-03-23";

/// API timeout per request
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Error code DNSPod returns for a record query with no matches
const CODE_NO_RECORDS: &str = "ResourceNotFound.NoDataOfRecord";

/// DNSPod client for one credential pair
pub struct DnspodProvider {
    client: reqwest::Client,
    secret_id: String,
    secret_key: String,
}

impl DnspodProvider {
    /// Create a client for the given credential pair
    pub fn new(secret_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Execute one signed API call and decode its payload
    async fn request<T: DeserializeOwned, B: Serialize>(&self, action: &str, body: &B) -> Result<T> {
        let payload = serde_json::to_string(body)
            .map_err(|e| Error::provider("dnspod", format!("request serialization: {e}")))?;

        let timestamp = Utc::now().timestamp();
        let authorization =
            sign::sign_request(&self.secret_id, &self.secret_key, action, &payload, timestamp);

        debug!(action, "dnspod request");

        let response = self
            .client
            .post(format!("https://{DNSPOD_API_HOST}"))
            .header("Content-Type", "application/json; charset=utf-8")
            .header("Host", DNSPOD_API_HOST)
            .header("X-TC-Action", action)
            .header("X-TC-Version", DNSPOD_VERSION)
            .header("X-TC-Timestamp", timestamp.to_string())
            .header("Authorization", authorization)
            .body(payload)
            .send()
            .await
            .map_err(|e| Error::http(format!("{action}: {e}")))?;

        let text = response
            .text()
            .await
            .map_err(|e| Error::http(format!("{action}: reading response: {e}")))?;

        decode_envelope(action, &text)
    }
}

/// Unwrap the Tencent response envelope, mapping API errors
fn decode_envelope<T: DeserializeOwned>(action: &str, text: &str) -> Result<T> {
    let envelope: TencentResponse = serde_json::from_str(text)
        .map_err(|e| Error::provider("dnspod", format!("{action}: malformed response: {e}")))?;

    if let Some(error_value) = envelope.response.get("Error") {
        let error: TencentError = serde_json::from_value(error_value.clone())
            .map_err(|e| Error::provider("dnspod", format!("{action}: malformed error: {e}")))?;
        return Err(map_api_error(&error));
    }

    serde_json::from_value(envelope.response)
        .map_err(|e| Error::provider("dnspod", format!("{action}: unexpected payload: {e}")))
}

fn map_api_error(error: &TencentError) -> Error {
    if error.code == CODE_NO_RECORDS {
        return Error::not_found(error.message.clone());
    }
    if error.code.starts_with("AuthFailure") {
        return Error::auth(format!("{}: {}", error.code, error.message));
    }
    Error::provider("dnspod", format!("{}: {}", error.code, error.message))
}

fn parse_record_id(record_id: &str) -> Result<u64> {
    record_id
        .parse()
        .map_err(|_| Error::provider("dnspod", format!("invalid record id: {record_id}")))
}

#[async_trait]
impl DnsProvider for DnspodProvider {
    async fn list_records(&self, domain: &str, subdomain: &str) -> Result<Vec<RemoteRecord>> {
        let response: RecordListResponse = self
            .request(
                "DescribeRecordList",
                &DescribeRecordListRequest { domain, subdomain },
            )
            .await?;

        Ok(response
            .record_list
            .unwrap_or_default()
            .into_iter()
            .map(|r| RemoteRecord {
                id: r.record_id.to_string(),
                name: r.name,
                record_type: r.record_type,
                value: r.value,
                line: r.line.unwrap_or_default(),
            })
            .collect())
    }

    async fn create_record(
        &self,
        domain: &str,
        subdomain: &str,
        record_type: RecordType,
        line: &str,
        value: &str,
    ) -> Result<String> {
        let response: CreateRecordResponse = self
            .request(
                "CreateRecord",
                &CreateRecordRequest {
                    domain,
                    sub_domain: subdomain,
                    record_type: record_type.as_str(),
                    record_line: line,
                    value,
                },
            )
            .await?;

        Ok(response.record_id.to_string())
    }

    async fn modify_record(
        &self,
        record_id: &str,
        domain: &str,
        subdomain: &str,
        record_type: RecordType,
        line: &str,
        value: &str,
    ) -> Result<()> {
        let _: EmptyResponse = self
            .request(
                "ModifyRecord",
                &ModifyRecordRequest {
                    domain,
                    sub_domain: subdomain,
                    record_type: record_type.as_str(),
                    record_line: line,
                    value,
                    record_id: parse_record_id(record_id)?,
                },
            )
            .await?;

        Ok(())
    }

    async fn delete_record(&self, domain: &str, record_id: &str) -> Result<()> {
        let _: EmptyResponse = self
            .request(
                "DeleteRecord",
                &DeleteRecordRequest {
                    domain,
                    record_id: parse_record_id(record_id)?,
                },
            )
            .await?;

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "dnspod"
    }
}

/// Factory constructing one DNSPod client per credential pair
pub struct DnspodFactory;

impl DnsProviderFactory for DnspodFactory {
    fn create(&self, credentials: &AccountCredentials) -> Result<Arc<dyn DnsProvider>> {
        if credentials.secret_id.is_empty() || credentials.secret_key.is_empty() {
            return Err(Error::config(format!(
                "Account '{}' has empty DNSPod credentials",
                credentials.id
            )));
        }

        Ok(Arc::new(DnspodProvider::new(
            credentials.secret_id.clone(),
            credentials.secret_key.clone(),
        )))
    }
}
