use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::{
    db::models::Project,
    error::Result,
    services::projects::{self, LikeState, NewProject, ProjectPatch},
    AppState,
};

use super::{ApiJson, ApiQuery, MessageResponse};

/// Header carrying the caller-chosen identity used for like de-duplication.
pub const USER_IDENTIFIER_HEADER: &str = "x-user-identifier";
const ANONYMOUS_IDENTIFIER: &str = "anonymous";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route(
            "/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/:id/like", post(toggle_like))
        .merge(super::comments::router())
}

#[derive(Debug, Deserialize)]
pub struct ListProjectsQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggleRequest {
    pub is_liking: bool,
}

async fn list_projects(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListProjectsQuery>,
) -> Result<Json<Vec<Project>>> {
    let projects = projects::list(&state.db, query.category.as_deref()).await?;
    Ok(Json(projects))
}

async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Project>> {
    Ok(Json(projects::get(&state.db, &id).await?))
}

async fn create_project(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewProject>,
) -> Result<Json<Project>> {
    Ok(Json(projects::create(&state.db, body).await?))
}

async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ProjectPatch>,
) -> Result<Json<Project>> {
    Ok(Json(projects::update(&state.db, &id, body).await?))
}

async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    projects::delete(&state.db, &id).await?;
    Ok(Json(MessageResponse::ok("Project deleted")))
}

async fn toggle_like(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<LikeToggleRequest>,
) -> Result<Json<LikeState>> {
    let user_identifier = headers
        .get(USER_IDENTIFIER_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .unwrap_or(ANONYMOUS_IDENTIFIER);

    let like = projects::toggle_like(&state.db, &id, user_identifier, body.is_liking).await?;
    Ok(Json(like))
}
