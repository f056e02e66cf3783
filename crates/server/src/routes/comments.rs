use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{db::models::Comment, error::Result, services::comments, AppState};

use super::{ApiJson, MessageResponse};

/// Mounted under `/projects`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id/comments", get(list_comments).post(create_comment))
        .route(
            "/:id/comments/:comment_id",
            axum::routing::delete(delete_comment),
        )
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    #[serde(rename = "author")]
    pub author_name: Option<String>,
}

async fn list_comments(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<Comment>>> {
    Ok(Json(comments::list(&state.db, &project_id).await?))
}

async fn create_comment(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    ApiJson(body): ApiJson<CreateCommentRequest>,
) -> Result<Json<Comment>> {
    let comment = comments::create(
        &state.db,
        &project_id,
        body.content,
        body.author_name.as_deref(),
    )
    .await?;

    Ok(Json(comment))
}

async fn delete_comment(
    State(state): State<AppState>,
    Path((project_id, comment_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>> {
    comments::delete(&state.db, &project_id, &comment_id).await?;
    Ok(Json(MessageResponse::ok("Comment deleted")))
}
