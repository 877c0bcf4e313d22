use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub status: &'static str,
    pub message: String,
}

pub fn success<T>(data: T) -> impl IntoResponse
where
    T: Serialize,
{
    let body = ApiResponse {
        status: "success",
        data: Some(data),
    };
    (StatusCode::OK, Json(body))
}

pub fn empty_success() -> impl IntoResponse {
    let body: ApiResponse<()> = ApiResponse {
        status: "success",
        data: None,
    };
    (StatusCode::OK, Json(body))
}

pub fn error(message: impl Into<String>, status: StatusCode) -> Response {
    let body = ApiErrorResponse {
        status: "error",
        message: message.into(),
    };

    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_success_omits_data() {
        let body: ApiResponse<()> = ApiResponse {
            status: "success",
            data: None,
        };
        let json = serde_json::to_value(&body).expect("serializes");
        assert_eq!(json, serde_json::json!({ "status": "success" }));
    }
}
