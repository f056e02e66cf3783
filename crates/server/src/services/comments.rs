use crate::{
    db::{
        id_prefix, new_id,
        models::{Comment, COMMENT_COLUMNS},
        timestamp, Database,
    },
    error::{AppError, Result},
};

use super::{author_or, comment_avatar, projects, require_text};

pub const DEFAULT_AUTHOR: &str = "Anonymous Visitor";

async fn project_exists(db: &Database, project_id: &str) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects WHERE id = ?")
        .bind(project_id)
        .fetch_one(&db.pool)
        .await?;
    Ok(count > 0)
}

pub async fn list(db: &Database, project_id: &str) -> Result<Vec<Comment>> {
    if !project_exists(db, project_id).await? {
        return Err(projects::not_found());
    }

    let sql = format!(
        "SELECT {COMMENT_COLUMNS} FROM comments WHERE project_id = ? \
         ORDER BY created_at DESC, rowid DESC"
    );

    let comments = sqlx::query_as::<_, Comment>(&sql)
        .bind(project_id)
        .fetch_all(&db.pool)
        .await?;

    Ok(comments)
}

pub async fn create(
    db: &Database,
    project_id: &str,
    content: String,
    author: Option<&str>,
) -> Result<Comment> {
    require_text(&content, "Comment content")?;

    let id = new_id(id_prefix::COMMENT);
    let now = timestamp();
    let author_name = author_or(author, DEFAULT_AUTHOR);
    let author_avatar = comment_avatar(&author_name);

    let mut tx = db.pool.begin().await?;

    let updated =
        sqlx::query("UPDATE projects SET comments_count = comments_count + 1 WHERE id = ?")
            .bind(project_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
    if updated == 0 {
        return Err(projects::not_found());
    }

    sqlx::query(
        "INSERT INTO comments (id, project_id, author_name, author_avatar, content, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(project_id)
    .bind(&author_name)
    .bind(&author_avatar)
    .bind(&content)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(project_id = %project_id, comment_id = %id, "comment created");

    Ok(Comment {
        id,
        project_id: project_id.to_string(),
        author_name,
        author_avatar,
        content,
        created_at: now,
    })
}

pub async fn delete(db: &Database, project_id: &str, comment_id: &str) -> Result<()> {
    let mut tx = db.pool.begin().await?;

    let deleted = sqlx::query("DELETE FROM comments WHERE id = ? AND project_id = ?")
        .bind(comment_id)
        .bind(project_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::NotFound("Comment not found".to_string()));
    }

    sqlx::query("UPDATE projects SET comments_count = MAX(comments_count - 1, 0) WHERE id = ?")
        .bind(project_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(project_id = %project_id, comment_id = %comment_id, "comment deleted");
    Ok(())
}
