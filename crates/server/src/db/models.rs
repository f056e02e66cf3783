use serde::Serialize;
use sqlx::types::Json;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub category: String,
    pub short_description: String,
    pub full_description: String,
    pub background_story: String,
    pub usage_instructions: String,
    pub thumbnail_url: String,
    pub banner_url: String,
    pub external_link: String,
    pub tags: Json<Vec<String>>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub project_id: String,
    pub author_name: String,
    pub author_avatar: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: String,
    pub project_id: String,
    pub user_identifier: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Discussion {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub author_name: String,
    pub author_avatar: String,
    pub views_count: i64,
    pub likes_count: i64,
    pub replies_count: i64,
    pub is_pinned: bool,
    pub is_closed: bool,
    pub created_at: String,
    pub updated_at: String,
    pub last_reply_at: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: String,
    pub discussion_id: String,
    pub content: String,
    pub author_name: String,
    pub author_avatar: String,
    pub likes_count: i64,
    pub reply_to_id: Option<String>,
    pub created_at: String,
}

pub const PROJECT_COLUMNS: &str = "id, title, category, short_description, full_description, \
     background_story, usage_instructions, thumbnail_url, banner_url, external_link, tags, \
     likes_count, comments_count, created_at, updated_at";

pub const COMMENT_COLUMNS: &str =
    "id, project_id, author_name, author_avatar, content, created_at";

pub const DISCUSSION_COLUMNS: &str = "id, title, content, category, author_name, author_avatar, \
     views_count, likes_count, replies_count, is_pinned, is_closed, created_at, updated_at, \
     last_reply_at";

pub const REPLY_COLUMNS: &str = "id, discussion_id, content, author_name, author_avatar, \
     likes_count, reply_to_id, created_at";
