//! Experience timeline, latest position first.

use axum::{Json, Router, extract::State, routing::get};
use folio_common::error::FolioResult;
use folio_common::models::{Document, Experience};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/experience", get(list_experience))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExperienceResponse {
    #[serde(flatten)]
    experience: Document<Experience>,
    logo_url: Option<String>,
}

/// GET /api/v1/experience
async fn list_experience(
    State(state): State<Arc<AppState>>,
) -> FolioResult<Json<Vec<ExperienceResponse>>> {
    let ctx = &state.contexts.experience;
    let items = ctx.fetch_all().await?;
    Ok(Json(
        items
            .into_iter()
            .map(|experience| ExperienceResponse {
                logo_url: experience.company_logo.as_deref().map(|id| ctx.logo_url(id)),
                experience,
            })
            .collect(),
    ))
}
