use axum::{
    extract::FromRequest,
    Json,
};
use serde::Serialize;

use crate::error::ApiError;

/// Success envelope: `{"status": 1, "msg"?: ..., ...payload}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<&'static str>,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            status: 1,
            msg: None,
            data,
        })
    }
}

impl Envelope<NoData> {
    pub fn message(msg: &'static str) -> Json<Self> {
        Json(Self {
            status: 1,
            msg: Some(msg),
            data: NoData {},
        })
    }
}

#[derive(Debug, Serialize)]
pub struct NoData {}

pub type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

/// `Json` whose rejection is reported through the status envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Payload<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Items {
        items: Vec<u8>,
    }

    #[test]
    fn payload_is_flattened_next_to_status() {
        let Json(env) = Envelope::ok(Items { items: vec![1, 2] });
        let json = serde_json::to_value(env).unwrap();
        assert_eq!(json, serde_json::json!({"status": 1, "items": [1, 2]}));
    }

    #[test]
    fn message_only_envelope() {
        let Json(env) = Envelope::message("User authorized");
        let json = serde_json::to_value(env).unwrap();
        assert_eq!(json, serde_json::json!({"status": 1, "msg": "User authorized"}));
    }
}
