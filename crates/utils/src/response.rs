use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Envelope for every JSON response the API returns.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_shape() {
        let json = serde_json::to_value(ApiResponse::success(3)).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": 3, "message": null}));
    }

    #[test]
    fn test_error_shape() {
        let response: ApiResponse<()> = ApiResponse::error("not found");
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("not found"));
        assert!(response.data.is_none());
    }
}
