use serde::{Deserialize, Serialize};
use sqlx::types::Json;

use crate::{
    db::{
        id_prefix, new_id,
        models::{Like, Project, PROJECT_COLUMNS},
        timestamp, Database,
    },
    error::{AppError, Result},
};

use super::require_text;

pub const DEFAULT_CATEGORY: &str = "Other";

pub const ALL_CATEGORIES: &str = "All";

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub title: String,
    #[serde(default = "default_category")]
    pub category: String,
    pub short_description: String,
    pub full_description: String,
    pub background_story: String,
    pub usage_instructions: String,
    pub thumbnail_url: String,
    pub banner_url: String,
    pub external_link: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub background_story: Option<String>,
    pub usage_instructions: Option<String>,
    pub thumbnail_url: Option<String>,
    pub banner_url: Option<String>,
    pub external_link: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeState {
    pub new_likes_count: i64,
    pub is_liked: bool,
}

pub(crate) fn not_found() -> AppError {
    AppError::NotFound("Project not found".to_string())
}

pub async fn list(db: &Database, category: Option<&str>) -> Result<Vec<Project>> {
    let category = category.filter(|c| *c != ALL_CATEGORIES && !c.is_empty());

    let sql = format!(
        "SELECT {PROJECT_COLUMNS} FROM projects WHERE (?1 IS NULL OR category = ?1) \
         ORDER BY created_at DESC, rowid DESC"
    );

    let projects = sqlx::query_as::<_, Project>(&sql)
        .bind(category)
        .fetch_all(&db.pool)
        .await?;

    Ok(projects)
}

pub async fn get(db: &Database, id: &str) -> Result<Project> {
    let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?");
    sqlx::query_as::<_, Project>(&sql)
        .bind(id)
        .fetch_optional(&db.pool)
        .await?
        .ok_or_else(not_found)
}

pub async fn create(db: &Database, new: NewProject) -> Result<Project> {
    require_text(&new.title, "Project title")?;

    let now = timestamp();
    let project = Project {
        id: new_id(id_prefix::PROJECT),
        title: new.title,
        category: new.category,
        short_description: new.short_description,
        full_description: new.full_description,
        background_story: new.background_story,
        usage_instructions: new.usage_instructions,
        thumbnail_url: new.thumbnail_url,
        banner_url: new.banner_url,
        external_link: new.external_link,
        tags: Json(new.tags),
        likes_count: 0,
        comments_count: 0,
        created_at: now.clone(),
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO projects (id, title, category, short_description, full_description, \
         background_story, usage_instructions, thumbnail_url, banner_url, external_link, tags, \
         likes_count, comments_count, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, 0, ?, ?)",
    )
    .bind(&project.id)
    .bind(&project.title)
    .bind(&project.category)
    .bind(&project.short_description)
    .bind(&project.full_description)
    .bind(&project.background_story)
    .bind(&project.usage_instructions)
    .bind(&project.thumbnail_url)
    .bind(&project.banner_url)
    .bind(&project.external_link)
    .bind(&project.tags)
    .bind(&project.created_at)
    .bind(&project.updated_at)
    .execute(&db.pool)
    .await?;

    tracing::info!(project_id = %project.id, category = %project.category, "project created");
    Ok(project)
}

pub async fn update(db: &Database, id: &str, patch: ProjectPatch) -> Result<Project> {
    if let Some(title) = &patch.title {
        require_text(title, "Project title")?;
    }

    let sql = format!(
        "UPDATE projects SET title = COALESCE(?, title), category = COALESCE(?, category), \
         short_description = COALESCE(?, short_description), \
         full_description = COALESCE(?, full_description), \
         background_story = COALESCE(?, background_story), \
         usage_instructions = COALESCE(?, usage_instructions), \
         thumbnail_url = COALESCE(?, thumbnail_url), banner_url = COALESCE(?, banner_url), \
         external_link = COALESCE(?, external_link), tags = COALESCE(?, tags), updated_at = ? \
         WHERE id = ? RETURNING {PROJECT_COLUMNS}"
    );

    let project = sqlx::query_as::<_, Project>(&sql)
        .bind(patch.title)
        .bind(patch.category)
        .bind(patch.short_description)
        .bind(patch.full_description)
        .bind(patch.background_story)
        .bind(patch.usage_instructions)
        .bind(patch.thumbnail_url)
        .bind(patch.banner_url)
        .bind(patch.external_link)
        .bind(patch.tags.map(Json))
        .bind(timestamp())
        .bind(id)
        .fetch_optional(&db.pool)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(project_id = %id, "project updated");
    Ok(project)
}

pub async fn delete(db: &Database, id: &str) -> Result<()> {
    let mut tx = db.pool.begin().await?;

    sqlx::query("DELETE FROM comments WHERE project_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM likes WHERE project_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let deleted = sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(not_found());
    }

    tx.commit().await?;

    tracing::info!(project_id = %id, "project deleted");
    Ok(())
}

pub async fn toggle_like(
    db: &Database,
    id: &str,
    user_identifier: &str,
    is_liking: bool,
) -> Result<LikeState> {
    let mut tx = db.pool.begin().await?;

    // Insert or delete the like row first; rows_affected tells whether the
    // counter moves, and the write lock is held before any read.
    if is_liking {
        let inserted = sqlx::query(
            "INSERT INTO likes (id, project_id, user_identifier, created_at) \
             SELECT ?, id, ?, ? FROM projects WHERE id = ? \
             ON CONFLICT (project_id, user_identifier) DO NOTHING",
        )
        .bind(new_id(id_prefix::LIKE))
        .bind(user_identifier)
        .bind(timestamp())
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted > 0 {
            sqlx::query("UPDATE projects SET likes_count = likes_count + 1 WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
    } else {
        let removed = sqlx::query_as::<_, Like>(
            "DELETE FROM likes WHERE project_id = ? AND user_identifier = ? \
             RETURNING id, project_id, user_identifier, created_at",
        )
        .bind(id)
        .bind(user_identifier)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(like) = removed {
            sqlx::query("UPDATE projects SET likes_count = MAX(likes_count - 1, 0) WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            tracing::debug!(project_id = %id, liked_at = %like.created_at, "like withdrawn");
        }
    }

    let new_likes_count =
        sqlx::query_scalar::<_, i64>("SELECT likes_count FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(not_found)?;

    tx.commit().await?;

    Ok(LikeState {
        new_likes_count,
        is_liked: is_liking,
    })
}
