//! The `{success, msg, data}` wrapper every backend response uses.

use serde::{Deserialize, Serialize};

use crate::client::error::ClientError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub msg: String,
    /// Absent `data` deserializes as `None` without requiring `T: Default`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Envelope used for bodiless 2xx responses such as 204.
    pub fn empty_success() -> Self {
        Self {
            success: true,
            msg: String::new(),
            data: None,
        }
    }

    /// Unwrap the payload, turning `success: false` into an error.
    pub fn into_data(self) -> Result<Option<T>, ClientError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(ClientError::Rejected(self.msg))
        }
    }

    /// Like [`into_data`](Self::into_data) but also requires a payload.
    pub fn require_data(self) -> Result<T, ClientError> {
        self.into_data()?
            .ok_or_else(|| ClientError::InvalidResponse("response has no data".to_string()))
    }
}
