//! Response envelope
//!
//! Every JSON response is `{status, data?, error?: {code, desc}}`.

use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;
use tracing::{debug, error};

use crate::errors::LinkmeterError;

#[derive(Serialize, Debug)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[derive(Serialize, Debug)]
pub struct ApiError {
    pub code: &'static str,
    pub desc: String,
}

/// Build a JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: ApiResponse<T>) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(body)
}

pub fn success_response<T: Serialize>(status: StatusCode, data: T) -> HttpResponse {
    json_response(
        status,
        ApiResponse {
            status: "ok",
            data: Some(data),
            error: None,
        },
    )
}

/// Map an error onto its status and code.
///
/// Store, cache and internal failures are logged in full here and reach
/// the client only as a generic description.
pub fn error_response(err: &LinkmeterError) -> HttpResponse {
    if err.is_client_error() {
        debug!("Request rejected: {}", err);
    } else {
        error!("Request failed: {}", err);
    }

    json_response::<()>(
        err.http_status(),
        ApiResponse {
            status: "error",
            data: None,
            error: Some(ApiError {
                code: err.code(),
                desc: err.public_message().to_string(),
            }),
        },
    )
}

/// Unified Result -> HttpResponse conversion
pub fn api_result<T: Serialize>(
    status: StatusCode,
    result: Result<T, LinkmeterError>,
) -> HttpResponse {
    match result {
        Ok(data) => success_response(status, data),
        Err(e) => error_response(&e),
    }
}

/// Malformed JSON bodies answer with `FIELD_BADFORMAT` in the envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            let response =
                error_response(&LinkmeterError::bad_format(format!("Invalid request body: {}", err)));
            InternalError::from_response(err, response).into()
        })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
        let response =
            error_response(&LinkmeterError::bad_format(format!("Invalid query string: {}", err)));
        InternalError::from_response(err, response).into()
    })
}
