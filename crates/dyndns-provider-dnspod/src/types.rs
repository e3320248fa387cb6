//! Tencent Cloud DNSPod API wire types

use serde::{Deserialize, Serialize};

// ============ Response envelope ============

/// Generic Tencent Cloud response envelope
///
/// Every response nests its payload (or an error) under `Response`; the
/// payload shape varies per action, so it is held as raw JSON and decoded
/// after the error check.
#[derive(Debug, Deserialize)]
pub(crate) struct TencentResponse {
    #[serde(rename = "Response")]
    pub response: serde_json::Value,
}

/// Error payload nested inside Tencent Cloud responses
#[derive(Debug, Deserialize)]
pub(crate) struct TencentError {
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Message")]
    pub message: String,
}

// ============ Requests ============

/// `DescribeRecordList` request
///
/// Note the casing quirk: this action spells the filter "Subdomain" while
/// the mutation actions spell it "SubDomain".
#[derive(Debug, Serialize)]
pub(crate) struct DescribeRecordListRequest<'a> {
    #[serde(rename = "Domain")]
    pub domain: &'a str,
    #[serde(rename = "Subdomain")]
    pub subdomain: &'a str,
}

/// `CreateRecord` request
#[derive(Debug, Serialize)]
pub(crate) struct CreateRecordRequest<'a> {
    #[serde(rename = "Domain")]
    pub domain: &'a str,
    #[serde(rename = "SubDomain")]
    pub sub_domain: &'a str,
    #[serde(rename = "RecordType")]
    pub record_type: &'a str,
    #[serde(rename = "RecordLine")]
    pub record_line: &'a str,
    #[serde(rename = "Value")]
    pub value: &'a str,
}

/// `ModifyRecord` request
#[derive(Debug, Serialize)]
pub(crate) struct ModifyRecordRequest<'a> {
    #[serde(rename = "Domain")]
    pub domain: &'a str,
    #[serde(rename = "SubDomain")]
    pub sub_domain: &'a str,
    #[serde(rename = "RecordType")]
    pub record_type: &'a str,
    #[serde(rename = "RecordLine")]
    pub record_line: &'a str,
    #[serde(rename = "Value")]
    pub value: &'a str,
    #[serde(rename = "RecordId")]
    pub record_id: u64,
}

/// `DeleteRecord` request
#[derive(Debug, Serialize)]
pub(crate) struct DeleteRecordRequest<'a> {
    #[serde(rename = "Domain")]
    pub domain: &'a str,
    #[serde(rename = "RecordId")]
    pub record_id: u64,
}

// ============ Response payloads ============

/// `DescribeRecordList` response payload
#[derive(Debug, Deserialize)]
pub(crate) struct RecordListResponse {
    #[serde(rename = "RecordList")]
    pub record_list: Option<Vec<DnspodRecord>>,
}

/// DNS record item returned by DNSPod record APIs
#[derive(Debug, Deserialize)]
pub(crate) struct DnspodRecord {
    #[serde(rename = "RecordId")]
    pub record_id: u64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub record_type: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "Line")]
    pub line: Option<String>,
}

/// `CreateRecord` response payload
#[derive(Debug, Deserialize)]
pub(crate) struct CreateRecordResponse {
    #[serde(rename = "RecordId")]
    pub record_id: u64,
}

/// `ModifyRecord` / `DeleteRecord` response payload (request id only)
#[derive(Debug, Deserialize)]
pub(crate) struct EmptyResponse {}
