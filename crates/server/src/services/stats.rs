use serde::Serialize;

use crate::{db::Database, error::Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryBreakdown {
    pub general: i64,
    pub tech: i64,
    pub idea: i64,
    pub help: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_discussions: i64,
    pub total_replies: i64,
    pub categories: CategoryBreakdown,
}

/// A parent whose stored counter disagrees with its live children.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CounterDrift {
    pub id: String,
    pub stored: i64,
    pub actual: i64,
}

pub async fn overview(db: &Database) -> Result<Overview> {
    let total_discussions = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM discussions")
        .fetch_one(&db.pool)
        .await?;
    let total_replies = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM replies")
        .fetch_one(&db.pool)
        .await?;

    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT category, COUNT(*) FROM discussions GROUP BY category",
    )
    .fetch_all(&db.pool)
    .await?;

    // Categories outside the fixed four are left out of the breakdown.
    let mut categories = CategoryBreakdown::default();
    for (category, count) in rows {
        match category.as_str() {
            "general" => categories.general = count,
            "tech" => categories.tech = count,
            "idea" => categories.idea = count,
            "help" => categories.help = count,
            _ => {}
        }
    }

    Ok(Overview {
        total_discussions,
        total_replies,
        categories,
    })
}

pub async fn reply_count_drift(db: &Database) -> Result<Vec<CounterDrift>> {
    let drift = sqlx::query_as::<_, CounterDrift>(
        r#"
        SELECT d.id AS id, d.replies_count AS stored, COUNT(r.id) AS actual
        FROM discussions d
        LEFT JOIN replies r ON r.discussion_id = d.id
        GROUP BY d.id
        HAVING d.replies_count != COUNT(r.id)
        "#,
    )
    .fetch_all(&db.pool)
    .await?;

    if !drift.is_empty() {
        tracing::warn!(count = drift.len(), "discussion reply counters out of sync");
    }
    Ok(drift)
}

pub async fn comment_count_drift(db: &Database) -> Result<Vec<CounterDrift>> {
    let drift = sqlx::query_as::<_, CounterDrift>(
        r#"
        SELECT p.id AS id, p.comments_count AS stored, COUNT(c.id) AS actual
        FROM projects p
        LEFT JOIN comments c ON c.project_id = p.id
        GROUP BY p.id
        HAVING p.comments_count != COUNT(c.id)
        "#,
    )
    .fetch_all(&db.pool)
    .await?;

    if !drift.is_empty() {
        tracing::warn!(count = drift.len(), "project comment counters out of sync");
    }
    Ok(drift)
}
