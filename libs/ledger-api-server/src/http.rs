use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;

use ledger_engine::QueryError;

use super::AppState;

const INDEX_HTML: &str = include_str!("../static/index.html");

// ═══════════════════════════════════════════════════════════════
//  GET /
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

// ═══════════════════════════════════════════════════════════════
//  POST /store  (form: ledger_code, ledger_meter | ledger_mtrs)
// ═══════════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub(crate) struct StoreForm {
    #[serde(default)]
    ledger_code: String,
    #[serde(default, alias = "ledger_mtrs")]
    ledger_meter: String,
}

pub(crate) async fn handle_store(
    State(state): State<AppState>,
    Form(form): Form<StoreForm>,
) -> Response {
    match state.service.create(&form.ledger_code, &form.ledger_meter).await {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(e) => error_response(e),
    }
}

// ═══════════════════════════════════════════════════════════════
//  GET /inquiry?ledger_code=N
// ═══════════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub(crate) struct InquiryParams {
    ledger_code: Option<String>,
}

pub(crate) async fn handle_inquiry(
    State(state): State<AppState>,
    Query(params): Query<InquiryParams>,
) -> Response {
    match state.service.find(params.ledger_code.as_deref()).await {
        Ok(records) => axum::Json(records).into_response(),
        Err(e) => error_response(e),
    }
}

// ═══════════════════════════════════════════════════════════════
//  POST /delete  (form: ledger_code)
// ═══════════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub(crate) struct DeleteForm {
    #[serde(default)]
    ledger_code: String,
}

pub(crate) async fn handle_delete(
    State(state): State<AppState>,
    Form(form): Form<DeleteForm>,
) -> Response {
    match state.service.delete(&form.ledger_code).await {
        Ok(summary) => axum::Json(summary).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(e: QueryError) -> Response {
    let status = if e.is_client_error() {
        StatusCode::BAD_REQUEST
    } else if e.is_timeout() {
        StatusCode::GATEWAY_TIMEOUT
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    if status.is_server_error() {
        tracing::error!(status = %status, error = %e, "request failed");
    }
    (status, format!("error: {e}")).into_response()
}
