//! Request signing for the remote asset store API.
//!
//! Signed parameters are sorted by name, joined as `name=value` pairs with `&`,
//! suffixed with the API secret and hashed with SHA-256 (lower-case hex).
//! `file`, `api_key`, `resource_type` and `signature_algorithm` are never
//! signed; empty values are skipped.

use sha2::{Digest, Sha256};

pub const SIGNATURE_ALGORITHM: &str = "sha256";

const UNSIGNED_PARAMS: &[&str] = &["file", "api_key", "resource_type", "signature_algorithm"];

pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut signed: Vec<&(&str, String)> = params
        .iter()
        .filter(|(name, value)| !UNSIGNED_PARAMS.contains(name) && !value.is_empty())
        .collect();
    signed.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = signed
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_sorts_parameters() {
        let params = [
            ("use_filename", "true".to_string()),
            ("timestamp", "1700000000".to_string()),
            ("unique_filename", "true".to_string()),
            ("folder", "leadership".to_string()),
        ];
        assert_eq!(
            sign_params(&params, "s3cret"),
            "dfab0b6b6bcbbdf912b0f5833a0392692dbcdff7113c5e2aebbad790e6115124"
        );
    }

    #[test]
    fn signature_ignores_unsigned_and_empty_parameters() {
        let base = [
            ("type", "upload".to_string()),
            ("public_id", "leadership/john.jpg".to_string()),
            ("timestamp", "1700000000".to_string()),
        ];
        let noisy = [
            ("type", "upload".to_string()),
            ("api_key", "1234".to_string()),
            ("public_id", "leadership/john.jpg".to_string()),
            ("signature_algorithm", "sha256".to_string()),
            ("timestamp", "1700000000".to_string()),
            ("context", String::new()),
        ];
        let expected = "79d5f13fcaedcb3cf4e0e5d6db70ef04d468d675c99dc4ab9423af8126988952";
        assert_eq!(sign_params(&base, "s3cret"), expected);
        assert_eq!(sign_params(&noisy, "s3cret"), expected);
    }
}
