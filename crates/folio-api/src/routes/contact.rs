//! Contact form submissions from site visitors.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use folio_common::error::FolioResult;
use folio_common::models::NewMessage;
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/contact", post(submit_message))
}

#[derive(Serialize)]
struct ContactResponse {
    id: String,
}

/// POST /api/v1/contact: store a message for the admin inbox.
async fn submit_message(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewMessage>,
) -> FolioResult<(StatusCode, Json<ContactResponse>)> {
    let message = state.contexts.messages.submit(body).await?;
    Ok((StatusCode::CREATED, Json(ContactResponse { id: message.id })))
}
