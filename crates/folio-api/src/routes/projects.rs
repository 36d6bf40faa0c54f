//! Project routes: the public portfolio grid and detail pages.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use folio_common::error::FolioResult;
use folio_common::models::{Document, Project};
use folio_store::ProjectContext;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/projects", get(list_projects))
        .route("/projects/{project_id}", get(get_project))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    search: Option<String>,
}

/// A project with its storage IDs resolved to viewable URLs.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    #[serde(flatten)]
    project: Document<Project>,
    cover_url: Option<String>,
    image_urls: Vec<String>,
}

impl ProjectResponse {
    fn new(ctx: &ProjectContext, project: Document<Project>) -> Self {
        Self {
            cover_url: project.cover_image.as_deref().map(|id| ctx.image_url(id)),
            image_urls: project.images.iter().map(|id| ctx.image_url(id)).collect(),
            project,
        }
    }
}

/// GET /api/v1/projects[?search=term], newest first.
async fn list_projects(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> FolioResult<Json<Vec<ProjectResponse>>> {
    let ctx = &state.contexts.projects;
    let mut projects = ctx.fetch_all().await?;
    if let Some(term) = query.search.as_deref() {
        projects.retain(|p| p.matches(term));
    }
    Ok(Json(projects.into_iter().map(|p| ProjectResponse::new(ctx, p)).collect()))
}

/// GET /api/v1/projects/{project_id}
async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
) -> FolioResult<Json<ProjectResponse>> {
    let ctx = &state.contexts.projects;
    let project = ctx.get(&project_id).await?;
    Ok(Json(ProjectResponse::new(ctx, project)))
}

#[cfg(test)]
mod tests {
    use crate::testing::{app, body_json};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn list_filters_by_search_term() {
        let (backend, app) = app();
        backend.seed(
            "projects",
            "p1",
            json!({ "name": "Folio", "description": "CMS", "technologies": ["Rust"], "coverImage": "c1" }),
        );
        backend.seed("projects", "p2", json!({ "name": "Blog", "description": "Static site" }));

        let response = app
            .oneshot(Request::get("/api/v1/projects?search=rust").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["$id"], "p1");
        assert_eq!(items[0]["coverUrl"], "memory://images/c1/view");
        assert_eq!(items[0]["imageUrls"], json!([]));
    }

    #[tokio::test]
    async fn missing_project_is_404() {
        let (_, app) = app();
        let response = app
            .oneshot(Request::get("/api/v1/projects/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "NOT_FOUND");
        assert_eq!(body["message"], "Project not found");
    }
}
