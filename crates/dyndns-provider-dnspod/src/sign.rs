//! TC3-HMAC-SHA256 request signing for the Tencent Cloud API

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::{DNSPOD_API_HOST, DNSPOD_SERVICE};

type HmacSha256 = Hmac<Sha256>;

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Build the `Authorization` header value for one API call
pub(crate) fn sign_request(
    secret_id: &str,
    secret_key: &str,
    action: &str,
    payload: &str,
    timestamp: i64,
) -> String {
    let date = DateTime::from_timestamp(timestamp, 0)
        .unwrap_or_else(Utc::now)
        .format("%Y-%m-%d")
        .to_string();

    // 1. Canonical request
    let http_request_method = "POST";
    let canonical_uri = "/";
    let canonical_query_string = "";
    let canonical_headers = format!(
        "content-type:application/json; charset=utf-8\nhost:{}\nx-tc-action:{}\n",
        DNSPOD_API_HOST,
        action.to_lowercase()
    );
    let signed_headers = "content-type;host;x-tc-action";
    let hashed_payload = hex::encode(Sha256::digest(payload.as_bytes()));
    let canonical_request = format!(
        "{http_request_method}\n{canonical_uri}\n{canonical_query_string}\n{canonical_headers}\n{signed_headers}\n{hashed_payload}"
    );

    // 2. String to sign
    let algorithm = "TC3-HMAC-SHA256";
    let credential_scope = format!("{date}/{DNSPOD_SERVICE}/tc3_request");
    let hashed_canonical_request = hex::encode(Sha256::digest(canonical_request.as_bytes()));
    let string_to_sign =
        format!("{algorithm}\n{timestamp}\n{credential_scope}\n{hashed_canonical_request}");

    // 3. Signature from the derived key chain
    let secret_date = hmac_sha256(format!("TC3{secret_key}").as_bytes(), date.as_bytes());
    let secret_service = hmac_sha256(&secret_date, DNSPOD_SERVICE.as_bytes());
    let secret_signing = hmac_sha256(&secret_service, b"tc3_request");
    let signature = hex::encode(hmac_sha256(&secret_signing, string_to_sign.as_bytes()));

    // 4. Authorization header
    format!(
        "{algorithm} Credential={secret_id}/{credential_scope}, SignedHeaders={signed_headers}, Signature={signature}"
    )
}

#[cfg(test)]
mod tests {
    use super::sign_request;

    fn sign(action: &str, payload: &str, timestamp: i64) -> String {
        sign_request("test_secret_id", "test_secret_key", action, payload, timestamp)
    }

    #[test]
    fn output_format() {
        let result = sign("DescribeRecordList", "{}", 1_705_305_600);

        assert!(result.starts_with("TC3-HMAC-SHA256 "));
        assert!(result.contains("Credential="));
        assert!(result.contains("SignedHeaders=content-type;host;x-tc-action"));
        assert!(result.contains("Signature="));
    }

    #[test]
    fn credential_contains_secret_id_and_date_path() {
        // timestamp 1705305600 = 2024-01-15 08:00:00 UTC
        let result = sign("DescribeRecordList", "{}", 1_705_305_600);

        assert!(result.contains("Credential=test_secret_id/2024-01-15/dnspod/tc3_request"));
    }

    #[test]
    fn deterministic_for_equal_inputs() {
        let a = sign("DescribeRecordList", r#"{"Domain":"example.com"}"#, 1_705_305_600);
        let b = sign("DescribeRecordList", r#"{"Domain":"example.com"}"#, 1_705_305_600);
        assert_eq!(a, b);
    }

    #[test]
    fn different_action_changes_signature() {
        let a = sign("DescribeRecordList", "{}", 1_705_305_600);
        let b = sign("CreateRecord", "{}", 1_705_305_600);

        assert_ne!(
            a.rsplit("Signature=").next(),
            b.rsplit("Signature=").next()
        );
    }

    #[test]
    fn different_payload_changes_signature() {
        let a = sign("DescribeRecordList", r#"{"Domain":"a.com"}"#, 1_705_305_600);
        let b = sign("DescribeRecordList", r#"{"Domain":"b.com"}"#, 1_705_305_600);

        assert_ne!(
            a.rsplit("Signature=").next(),
            b.rsplit("Signature=").next()
        );
    }

    #[test]
    fn different_secret_changes_signature() {
        let a = sign_request("id", "key_alpha", "DescribeRecordList", "{}", 1_705_305_600);
        let b = sign_request("id", "key_beta", "DescribeRecordList", "{}", 1_705_305_600);

        assert_ne!(
            a.rsplit("Signature=").next(),
            b.rsplit("Signature=").next()
        );
    }

    #[test]
    fn date_derived_from_timestamp() {
        // Same UTC day, same credential date
        let morning = sign("DescribeRecordList", "{}", 1_705_305_600);
        let evening = sign("DescribeRecordList", "{}", 1_705_348_800);
        assert!(morning.contains("/2024-01-15/"));
        assert!(evening.contains("/2024-01-15/"));

        // Next day rolls the date
        let next_day = sign("DescribeRecordList", "{}", 1_705_392_000);
        assert!(next_day.contains("/2024-01-16/"));
    }
}
