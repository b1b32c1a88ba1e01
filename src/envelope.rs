use serde::Serialize;

use crate::errors::ControllerError;

pub const STATUS_OK: u16 = 200;
pub const STATUS_NOT_MODIFIED: u16 = 304;
pub const STATUS_NOT_FOUND: u16 = 404;

/// Response handed back to the function URL gateway verbatim.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub body: String,
    pub is_base64_encoded: bool,
}

#[derive(Serialize)]
struct MessageBody<'a> {
    message: &'a str,
}

impl ResponseEnvelope {
    /// Serializes `payload` as the JSON body. Bodies are never binary.
    pub fn json<T: Serialize>(status_code: u16, payload: &T) -> Result<Self, ControllerError> {
        Ok(ResponseEnvelope {
            status_code,
            body: serde_json::to_string(payload)?,
            is_base64_encoded: false,
        })
    }

    pub fn message(status_code: u16, message: &str) -> Result<Self, ControllerError> {
        Self::json(status_code, &MessageBody { message })
    }

    pub fn not_found() -> Result<Self, ControllerError> {
        Self::message(STATUS_NOT_FOUND, "Invalid URL")
    }
}
