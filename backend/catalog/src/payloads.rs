//! # Payloads
//!
//! JSON bodies shared by the server and its clients.
//!
//! ### Toggle
//! - Request: `{"locationId": <integer>}`, any signed 64-bit integer
//! - 201: record created with `completed: true`
//! - 200: existing record flipped
//!
//! ### Errors
//! - `{"error": "<message>"}`
use serde::{Deserialize, Serialize};

pub type UserId = u64;

/// At most one per (user, location). No record means not completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub user_id: UserId,
    pub location_id: u32,
    pub completed: bool,
}

impl CompletionRecord {
    pub fn created(user_id: UserId, location_id: u32) -> Self {
        Self {
            user_id,
            location_id,
            completed: true,
        }
    }

    pub fn flipped(self) -> Self {
        Self {
            completed: !self.completed,
            ..self
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub location_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub message: String,
    pub marker: CompletionRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub user_id: UserId,
    pub created: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_cycle() {
        let record = CompletionRecord::created(7, 1);
        assert!(record.completed);

        let record = record.flipped();
        assert!(!record.completed);
        assert_eq!((record.user_id, record.location_id), (7, 1));

        assert!(record.flipped().completed);
    }

    #[test]
    fn test_toggle_request_accepts_only_integers() {
        assert!(serde_json::from_str::<ToggleRequest>(r#"{"locationId": 4}"#).is_ok());
        assert!(serde_json::from_str::<ToggleRequest>(r#"{"locationId": "abc"}"#).is_err());
        assert!(serde_json::from_str::<ToggleRequest>(r#"{"locationId": 1.5}"#).is_err());
        assert!(serde_json::from_str::<ToggleRequest>(r#"{"locationId": true}"#).is_err());
        assert_eq!(
            serde_json::from_str::<ToggleRequest>(r#"{"locationId": -1}"#).unwrap().location_id,
            -1
        );
        assert_eq!(
            serde_json::from_str::<ToggleRequest>(r#"{"locationId": 4294967296}"#)
                .unwrap()
                .location_id,
            4_294_967_296
        );
        assert!(serde_json::from_str::<ToggleRequest>(r#"{}"#).is_err());
    }
}
