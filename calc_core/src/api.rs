//! # Request Layer
//!
//! Transport-agnostic JSON front end: route by calculator name, check the
//! internal key, decode the body, run the calculator and wrap the output in
//! the response envelope. Any HTTP server or the CLI can sit on top of
//! [`handle`].
//!
//! ## Responses
//!
//! | Outcome                        | Status | `error_code`       |
//! |--------------------------------|--------|--------------------|
//! | Success                        | 200    | -                  |
//! | Body or calculation rejected   | 400    | `validation_error` |
//! | Key missing or wrong           | 401    | `unauthorized`     |
//! | Unknown calculator             | 404    | `not_found`        |
//! | No key configured              | 500    | `server_error`     |
//!
//! ## Example
//!
//! ```rust
//! use calc_core::api::handle;
//! use calc_core::config::EngineConfig;
//! use calc_core::fitment::FitmentCatalog;
//! use calc_core::security::Credentials;
//!
//! let config = EngineConfig::new(Some("secret".into()), FitmentCatalog::builtin().unwrap());
//! let body = r#"{"unit_system": "metric", "inputs": {"bore": 58, "stroke": 50, "cylinders": 4}}"#;
//!
//! let response = handle("displacement", body, &Credentials::internal_key("secret"), &config);
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body["results"]["displacement_cc"], 528.42);
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::calculations::{displacement, rod_ratio, sprocket, tires, CalcOutput, CalcRequest, Calculator};
use crate::config::EngineConfig;
use crate::errors::{CalcError, CalcResult};
use crate::security::{authorize, AuthFailure, Credentials};

/// API version reported in every response
pub const API_VERSION: &str = "v1";

/// Response source tag
pub const RESPONSE_SOURCE: &str = "legacy-compatible";

/// Message attached to every validation failure
pub const VALIDATION_MESSAGE: &str = "Invalid request payload.";

/// Route answering without authentication
pub const HEALTH_ROUTE: &str = "health";

/// Response metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub version: String,
    /// RFC 3339 UTC time the response was produced
    pub timestamp: String,
    pub source: String,
}

impl Meta {
    pub fn now() -> Self {
        Meta {
            version: API_VERSION.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            source: RESPONSE_SOURCE.to_string(),
        }
    }
}

/// Successful response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<N, R> {
    #[serde(flatten)]
    pub output: CalcOutput<N, R>,
    pub meta: Meta,
}

/// One field-level problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
    /// Lowercase error kind (`invalid_input`, `invalid_geometry`, ...)
    pub kind: String,
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error_code: String,
    pub message: String,
    #[serde(default)]
    pub field_errors: Vec<FieldError>,
}

impl ErrorResponse {
    /// 400 body for a rejected calculation
    pub fn validation(err: &CalcError) -> Self {
        ErrorResponse {
            error_code: "validation_error".to_string(),
            message: VALIDATION_MESSAGE.to_string(),
            field_errors: vec![FieldError {
                field: err.field().unwrap_or("body").to_string(),
                reason: err.reason(),
                kind: err.error_code().to_ascii_lowercase(),
            }],
        }
    }

    /// 400 body for a payload that could not be decoded
    pub fn malformed_body(err: &serde_json::Error) -> Self {
        ErrorResponse {
            error_code: "validation_error".to_string(),
            message: VALIDATION_MESSAGE.to_string(),
            field_errors: vec![FieldError {
                field: "body".to_string(),
                reason: err.to_string(),
                kind: "invalid_format".to_string(),
            }],
        }
    }

    pub fn auth(failure: AuthFailure) -> Self {
        ErrorResponse {
            error_code: failure.error_code().to_string(),
            message: failure.message().to_string(),
            field_errors: Vec::new(),
        }
    }

    pub fn not_found(route: &str) -> Self {
        ErrorResponse {
            error_code: "not_found".to_string(),
            message: format!("Unknown calculator '{route}'."),
            field_errors: Vec::new(),
        }
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        ErrorResponse {
            error_code: "server_error".to_string(),
            message: message.into(),
            field_errors: Vec::new(),
        }
    }
}

/// Status code plus JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ApiResponse {
    fn json(status: u16, body: &impl Serialize) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => ApiResponse { status, body },
            Err(e) => {
                error!(error = %e, "failed to encode response");
                ApiResponse {
                    status: 500,
                    body: serde_json::json!({
                        "error_code": "server_error",
                        "message": "Failed to encode response.",
                        "field_errors": [],
                    }),
                }
            }
        }
    }

    fn error(status: u16, body: ErrorResponse) -> Self {
        Self::json(status, &body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Handle one request.
///
/// `route` is the calculator name (`displacement`, `rl`, `sprocket`,
/// `tires`) or `health`; `body` is the raw JSON request body.
pub fn handle(route: &str, body: &str, credentials: &Credentials, config: &EngineConfig) -> ApiResponse {
    if route == HEALTH_ROUTE {
        return ApiResponse::json(200, &serde_json::json!({ "status": "ok" }));
    }

    let Some(calculator) = Calculator::from_name(route) else {
        debug!(route, "unknown calculator");
        return ApiResponse::error(404, ErrorResponse::not_found(route));
    };

    if let Err(failure) = authorize(config.internal_key.as_deref(), credentials) {
        return ApiResponse::error(failure.status(), ErrorResponse::auth(failure));
    }

    let response = match calculator {
        Calculator::Displacement => run(body, displacement::calculate),
        Calculator::RodRatio => run(body, rod_ratio::calculate),
        Calculator::Sprocket => run(body, sprocket::calculate),
        Calculator::Tires => run(body, |request| tires::calculate(request, &config.catalog)),
    };

    debug!(%calculator, status = response.status, "request handled");
    response
}

/// Decode, calculate and wrap
fn run<I, N, R>(body: &str, calculate: impl FnOnce(&CalcRequest<I>) -> CalcResult<CalcOutput<N, R>>) -> ApiResponse
where
    I: DeserializeOwned,
    N: Serialize,
    R: Serialize,
{
    let request: CalcRequest<I> = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(e) => {
            debug!(error = %e, "malformed request body");
            return ApiResponse::error(400, ErrorResponse::malformed_body(&e));
        }
    };

    match calculate(&request) {
        Ok(output) => ApiResponse::json(
            200,
            &Envelope {
                output,
                meta: Meta::now(),
            },
        ),
        Err(e) if e.is_validation_error() => {
            debug!(error = %e, "calculation rejected");
            ApiResponse::error(400, ErrorResponse::validation(&e))
        }
        Err(e) => {
            error!(error = %e, "calculation failed");
            ApiResponse::error(500, ErrorResponse::server_error(e.to_string()))
        }
    }
}
