use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::{
    db::models::{Discussion, Reply},
    error::Result,
    services::{
        discussions::{self, DiscussionSort, NewDiscussion},
        replies::{self, NewReply},
        stats::{self, Overview},
    },
    AppState,
};

use super::{page, ApiJson, ApiQuery, LikesCountResponse, MessageResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_discussions).post(create_discussion))
        .route("/stats/overview", get(discussion_stats))
        .route(
            "/:id",
            get(get_discussion)
                .patch(moderate_discussion)
                .delete(delete_discussion),
        )
        .route("/:id/like", post(like_discussion))
        .route("/:id/replies", get(list_replies).post(create_reply))
        .route(
            "/:id/replies/:reply_id",
            axum::routing::delete(delete_reply),
        )
        .route("/:id/replies/:reply_id/like", post(like_reply))
}

#[derive(Debug, Deserialize)]
pub struct ListDiscussionsQuery {
    pub category: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ListRepliesQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiscussionRequest {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub author_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerateDiscussionRequest {
    pub is_pinned: Option<bool>,
    pub is_closed: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReplyRequest {
    pub content: String,
    pub author_name: Option<String>,
    pub reply_to_id: Option<String>,
}

async fn list_discussions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListDiscussionsQuery>,
) -> Result<Json<Vec<Discussion>>> {
    let (limit, offset) = page(query.limit, query.offset, 20, 100)?;
    let category = query.category.as_deref().filter(|c| !c.is_empty());
    let sort = DiscussionSort::parse(query.sort.as_deref());

    let discussions = discussions::list(&state.db, category, sort, limit, offset).await?;
    Ok(Json(discussions))
}

async fn get_discussion(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Discussion>> {
    Ok(Json(discussions::get(&state.db, &id).await?))
}

async fn create_discussion(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateDiscussionRequest>,
) -> Result<Json<Discussion>> {
    let discussion = discussions::create(
        &state.db,
        NewDiscussion {
            title: body.title,
            content: body.content,
            category: body.category,
            author_name: body.author_name,
        },
    )
    .await?;

    Ok(Json(discussion))
}

async fn moderate_discussion(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ModerateDiscussionRequest>,
) -> Result<Json<Discussion>> {
    let discussion =
        discussions::moderate(&state.db, &id, body.is_pinned, body.is_closed).await?;
    Ok(Json(discussion))
}

async fn like_discussion(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LikesCountResponse>> {
    let likes_count = discussions::like(&state.db, &id).await?;
    Ok(Json(LikesCountResponse { likes_count }))
}

async fn delete_discussion(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    discussions::delete(&state.db, &id).await?;
    Ok(Json(MessageResponse::ok("Discussion deleted")))
}

async fn list_replies(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<ListRepliesQuery>,
) -> Result<Json<Vec<Reply>>> {
    let (limit, offset) = page(query.limit, query.offset, 50, 200)?;
    Ok(Json(replies::list(&state.db, &id, limit, offset).await?))
}

async fn create_reply(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<CreateReplyRequest>,
) -> Result<Json<Reply>> {
    let reply = replies::create(
        &state.db,
        &id,
        NewReply {
            content: body.content,
            author_name: body.author_name,
            reply_to_id: body.reply_to_id,
        },
    )
    .await?;

    Ok(Json(reply))
}

async fn like_reply(
    State(state): State<AppState>,
    Path((id, reply_id)): Path<(String, String)>,
) -> Result<Json<LikesCountResponse>> {
    let likes_count = replies::like(&state.db, &id, &reply_id).await?;
    Ok(Json(LikesCountResponse { likes_count }))
}

async fn delete_reply(
    State(state): State<AppState>,
    Path((id, reply_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>> {
    replies::delete(&state.db, &id, &reply_id).await?;
    Ok(Json(MessageResponse::ok("Reply deleted")))
}

async fn discussion_stats(State(state): State<AppState>) -> Result<Json<Overview>> {
    Ok(Json(stats::overview(&state.db).await?))
}
