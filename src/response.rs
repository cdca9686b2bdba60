use axum::{http::StatusCode, Json};
use serde::Serialize;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Uniform response body: `{status, message?, data?}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: Status::Success,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: Some(message.into()),
            data: None,
        }
    }
}

pub type ApiResult<T> = Result<(StatusCode, Json<Envelope<T>>), AppError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(Envelope::success(data))))
}

pub fn updated<T>(data: T, message: impl Into<String>) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(Envelope::success(data).with_message(message))))
}

pub fn created<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(Envelope::success(data))))
}

pub fn message(message: impl Into<String>) -> ApiResult<()> {
    Ok((StatusCode::OK, Json(Envelope::message(message))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_omits_message() {
        let json = serde_json::to_value(Envelope::success(vec![1, 2])).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "data": [1, 2]}));
    }

    #[test]
    fn message_only_envelope() {
        let json = serde_json::to_value(Envelope::message("Task deleted successfully")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "success", "message": "Task deleted successfully"})
        );
    }
}
