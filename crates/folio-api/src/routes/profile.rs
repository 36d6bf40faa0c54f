//! The site owner's public profile.

use axum::{Json, Router, extract::State, routing::get};
use folio_common::error::{FolioError, FolioResult};
use folio_common::models::{Document, Profile};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/profile", get(get_profile))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    #[serde(flatten)]
    profile: Document<Profile>,
    avatar_url: Option<String>,
}

/// GET /api/v1/profile. 404 until the profile has been saved once.
async fn get_profile(State(state): State<Arc<AppState>>) -> FolioResult<Json<ProfileResponse>> {
    let ctx = &state.contexts.profile;
    let profile = ctx.load().await?.ok_or_else(|| FolioError::not_found("Profile"))?;
    Ok(Json(ProfileResponse { avatar_url: ctx.avatar_url().await, profile }))
}

#[cfg(test)]
mod tests {
    use crate::testing::{app, body_json};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    fn request() -> Request<Body> {
        Request::get("/api/v1/profile").body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn not_found_before_first_save() {
        let (_, app) = app();
        let response = app.oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn returns_profile_with_avatar_url() {
        let (backend, app) = app();
        backend.seed(
            "personal",
            "me",
            json!({ "name": "Ada", "title": "Engineer", "email": "ada@example.com", "avatar": "a1" }),
        );

        let response = app.oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["name"], "Ada");
        assert_eq!(body["avatarUrl"], "memory://images/a1/view");
    }
}
