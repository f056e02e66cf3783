use crate::{
    db::{
        id_prefix, new_id,
        models::{Reply, REPLY_COLUMNS},
        timestamp, Database,
    },
    error::{AppError, Result},
};

use super::{author_or, community_avatar, discussions, require_text};

pub const DEFAULT_AUTHOR: &str = "Anonymous";

#[derive(Debug, Clone)]
pub struct NewReply {
    pub content: String,
    pub author_name: Option<String>,
    pub reply_to_id: Option<String>,
}

fn not_found() -> AppError {
    AppError::NotFound("Reply not found".to_string())
}

async fn discussion_exists(db: &Database, discussion_id: &str) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM discussions WHERE id = ?")
        .bind(discussion_id)
        .fetch_one(&db.pool)
        .await?;
    Ok(count > 0)
}

pub async fn list(
    db: &Database,
    discussion_id: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<Reply>> {
    if !discussion_exists(db, discussion_id).await? {
        return Err(discussions::not_found());
    }

    let sql = format!(
        "SELECT {REPLY_COLUMNS} FROM replies WHERE discussion_id = ? \
         ORDER BY created_at ASC, rowid ASC LIMIT ? OFFSET ?"
    );

    let replies = sqlx::query_as::<_, Reply>(&sql)
        .bind(discussion_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&db.pool)
        .await?;

    Ok(replies)
}

pub async fn create(db: &Database, discussion_id: &str, new: NewReply) -> Result<Reply> {
    require_text(&new.content, "Content")?;

    let id = new_id(id_prefix::REPLY);
    let now = timestamp();
    let author_name = author_or(new.author_name.as_deref(), DEFAULT_AUTHOR);
    let author_avatar = community_avatar(&author_name);
    let reply_to_id = new.reply_to_id.filter(|r| !r.trim().is_empty());

    let mut tx = db.pool.begin().await?;

    // The guarded counter bump is the first statement so the transaction
    // holds the write lock before it reads anything.
    let updated = sqlx::query(
        "UPDATE discussions SET replies_count = replies_count + 1, last_reply_at = MAX(last_reply_at, ?) \
         WHERE id = ? AND is_closed = 0",
    )
    .bind(&now)
    .bind(discussion_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if updated == 0 {
        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM discussions WHERE id = ?")
            .bind(discussion_id)
            .fetch_one(&mut *tx)
            .await?;
        return Err(if exists == 0 {
            discussions::not_found()
        } else {
            AppError::InvalidState("Discussion is closed and no longer accepts replies".to_string())
        });
    }

    if let Some(target) = &reply_to_id {
        let same_discussion = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM replies WHERE id = ? AND discussion_id = ?",
        )
        .bind(target)
        .bind(discussion_id)
        .fetch_one(&mut *tx)
        .await?;

        if same_discussion == 0 {
            return Err(AppError::Validation(
                "replyToId must reference a reply in the same discussion".to_string(),
            ));
        }
    }

    sqlx::query(
        "INSERT INTO replies (id, discussion_id, content, author_name, author_avatar, likes_count, reply_to_id, created_at) \
         VALUES (?, ?, ?, ?, ?, 0, ?, ?)",
    )
    .bind(&id)
    .bind(discussion_id)
    .bind(&new.content)
    .bind(&author_name)
    .bind(&author_avatar)
    .bind(&reply_to_id)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(discussion_id = %discussion_id, reply_id = %id, "reply created");

    Ok(Reply {
        id,
        discussion_id: discussion_id.to_string(),
        content: new.content,
        author_name,
        author_avatar,
        likes_count: 0,
        reply_to_id,
        created_at: now,
    })
}

pub async fn like(db: &Database, discussion_id: &str, reply_id: &str) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "UPDATE replies SET likes_count = likes_count + 1 \
         WHERE id = ? AND discussion_id = ? RETURNING likes_count",
    )
    .bind(reply_id)
    .bind(discussion_id)
    .fetch_optional(&db.pool)
    .await?
    .ok_or_else(not_found)
}

pub async fn delete(db: &Database, discussion_id: &str, reply_id: &str) -> Result<()> {
    let mut tx = db.pool.begin().await?;

    let deleted = sqlx::query("DELETE FROM replies WHERE id = ? AND discussion_id = ?")
        .bind(reply_id)
        .bind(discussion_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(not_found());
    }

    sqlx::query("UPDATE replies SET reply_to_id = NULL WHERE reply_to_id = ?")
        .bind(reply_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "UPDATE discussions SET replies_count = MAX(replies_count - 1, 0), \
         last_reply_at = COALESCE( \
             (SELECT MAX(created_at) FROM replies WHERE discussion_id = ?1), created_at) \
         WHERE id = ?1",
    )
    .bind(discussion_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(discussion_id = %discussion_id, reply_id = %reply_id, "reply deleted");
    Ok(())
}
