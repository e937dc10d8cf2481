//! The response envelope wrapped around every storefront API payload.

use serde::{Deserialize, Serialize};

/// `{data, success, message}` as returned by the storefront API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse<T> {
    /// Payload, absent on failure.
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    /// Older servers spell this field `sucsess`.
    #[serde(default, alias = "sucsess")]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_count() {
        let resp: ServiceResponse<i32> =
            serde_json::from_str(r#"{"data": 4, "success": true, "message": ""}"#).unwrap();
        assert_eq!(resp.data, Some(4));
        assert!(resp.success);
    }

    #[test]
    fn test_accepts_legacy_success_spelling() {
        let resp: ServiceResponse<i32> =
            serde_json::from_str(r#"{"data": 1, "sucsess": true}"#).unwrap();
        assert!(resp.success);
    }

    #[test]
    fn test_null_data() {
        let resp: ServiceResponse<Vec<i32>> =
            serde_json::from_str(r#"{"data": null, "success": false, "message": "No cart"}"#)
                .unwrap();
        assert_eq!(resp.data, None);
        assert!(!resp.success);
        assert_eq!(resp.message, "No cart");
    }
}
