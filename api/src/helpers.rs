//! Fairings and error responses shared by every route.

use quiniela_common::QuinielaError;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::Response;
use rocket::response::status as rocket_status;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Clone, Copy)]
pub struct RequestTimingFairing;

#[rocket::async_trait]
impl Fairing for RequestTimingFairing {
    fn info(&self) -> Info {
        Info {
            name: "Request timing",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _data: &mut rocket::Data<'_>) {
        request.local_cache(Instant::now);
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let started_at = request.local_cache(Instant::now);
        let status = response.status().code;

        tracing::info!(
            method = %request.method(),
            path = %request.uri(),
            status = status,
            elapsed_ms = started_at.elapsed().as_millis(),
            "Request completed"
        );
    }
}

#[derive(Clone, Copy)]
pub struct CorsFairing;

#[rocket::async_trait]
impl Fairing for CorsFairing {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Max-Age", "86400"));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    NotFound,
    Conflict,
    UnprocessableEntity,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ApiErrorBody {
    error: ApiErrorKind,
    /// The contest error kind, when the failure came from a contest operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    message: String,
}

pub type ApiError = rocket_status::Custom<Json<ApiErrorBody>>;
pub type ApiResult<T> = Result<Json<T>, ApiError>;

fn api_error(
    status: Status,
    kind: ApiErrorKind,
    code: Option<&str>,
    message: impl Into<String>,
) -> ApiError {
    rocket_status::Custom(
        status,
        Json(ApiErrorBody {
            error: kind,
            code: code.map(str::to_string),
            message: message.into(),
        }),
    )
}

pub fn not_found_error(message: impl Into<String>) -> ApiError {
    api_error(Status::NotFound, ApiErrorKind::NotFound, None, message)
}

/// Status and category a contest error is reported with.
fn classify(err: &QuinielaError) -> (Status, ApiErrorKind) {
    match err {
        QuinielaError::RoundNotFound { .. } | QuinielaError::NoExistingPrediction { .. } => {
            (Status::NotFound, ApiErrorKind::NotFound)
        }
        QuinielaError::DuplicateRound { .. } | QuinielaError::RoundLocked { .. } => {
            (Status::Conflict, ApiErrorKind::Conflict)
        }
        QuinielaError::Store(_) => (Status::InternalServerError, ApiErrorKind::Internal),
        _ => (Status::UnprocessableEntity, ApiErrorKind::UnprocessableEntity),
    }
}

/// Turn a contest error into a JSON error response.
pub fn quiniela_error(err: QuinielaError) -> ApiError {
    let (status, kind) = classify(&err);
    if status == Status::InternalServerError {
        tracing::error!(error = %err, "Contest operation failed");
    }
    api_error(status, kind, Some(err.kind()), err.to_string())
}
