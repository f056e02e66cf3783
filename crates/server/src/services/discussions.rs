use crate::{
    db::{
        id_prefix, new_id,
        models::{Discussion, DISCUSSION_COLUMNS},
        timestamp, Database,
    },
    error::{AppError, Result},
};

use super::{author_or, community_avatar, require_text};

pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_AUTHOR: &str = "Anonymous";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscussionSort {
    #[default]
    Latest,
    Popular,
    Active,
}

impl DiscussionSort {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("popular") => Self::Popular,
            Some("active") => Self::Active,
            _ => Self::Latest,
        }
    }

    // Pinned discussions always come first; rowid breaks timestamp ties.
    fn order_by(self) -> &'static str {
        match self {
            Self::Latest => "is_pinned DESC, created_at DESC, rowid DESC",
            Self::Popular => "is_pinned DESC, likes_count DESC, created_at DESC, rowid DESC",
            Self::Active => "is_pinned DESC, last_reply_at DESC, rowid DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewDiscussion {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub author_name: Option<String>,
}

pub(crate) fn not_found() -> AppError {
    AppError::NotFound("Discussion not found".to_string())
}

pub async fn list(
    db: &Database,
    category: Option<&str>,
    sort: DiscussionSort,
    limit: i64,
    offset: i64,
) -> Result<Vec<Discussion>> {
    let sql = format!(
        "SELECT {DISCUSSION_COLUMNS} FROM discussions \
         WHERE (?1 IS NULL OR category = ?1) \
         ORDER BY {} LIMIT ?2 OFFSET ?3",
        sort.order_by()
    );

    let discussions = sqlx::query_as::<_, Discussion>(&sql)
        .bind(category)
        .bind(limit)
        .bind(offset)
        .fetch_all(&db.pool)
        .await?;

    Ok(discussions)
}

/// Returns the discussion after counting this read as a view.
pub async fn get(db: &Database, id: &str) -> Result<Discussion> {
    let sql = format!(
        "UPDATE discussions SET views_count = views_count + 1 WHERE id = ? \
         RETURNING {DISCUSSION_COLUMNS}"
    );

    let discussion = sqlx::query_as::<_, Discussion>(&sql)
        .bind(id)
        .fetch_optional(&db.pool)
        .await?
        .ok_or_else(not_found)?;

    tracing::debug!(discussion_id = %id, views = discussion.views_count, "discussion viewed");
    Ok(discussion)
}

pub async fn find(db: &Database, id: &str) -> Result<Option<Discussion>> {
    let sql = format!("SELECT {DISCUSSION_COLUMNS} FROM discussions WHERE id = ?");
    let discussion = sqlx::query_as::<_, Discussion>(&sql)
        .bind(id)
        .fetch_optional(&db.pool)
        .await?;
    Ok(discussion)
}

pub async fn create(db: &Database, new: NewDiscussion) -> Result<Discussion> {
    require_text(&new.title, "Title")?;
    require_text(&new.content, "Content")?;

    let id = new_id(id_prefix::DISCUSSION);
    let now = timestamp();
    let category = new
        .category
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    let author_name = author_or(new.author_name.as_deref(), DEFAULT_AUTHOR);
    let author_avatar = community_avatar(&author_name);

    sqlx::query(
        "INSERT INTO discussions (id, title, content, category, author_name, author_avatar, \
         views_count, likes_count, replies_count, is_pinned, is_closed, created_at, updated_at, last_reply_at) \
         VALUES (?, ?, ?, ?, ?, ?, 0, 0, 0, 0, 0, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&new.title)
    .bind(&new.content)
    .bind(&category)
    .bind(&author_name)
    .bind(&author_avatar)
    .bind(&now)
    .bind(&now)
    .bind(&now)
    .execute(&db.pool)
    .await?;

    tracing::info!(discussion_id = %id, %category, "discussion created");

    Ok(Discussion {
        id,
        title: new.title,
        content: new.content,
        category,
        author_name,
        author_avatar,
        views_count: 0,
        likes_count: 0,
        replies_count: 0,
        is_pinned: false,
        is_closed: false,
        created_at: now.clone(),
        updated_at: now.clone(),
        last_reply_at: now,
    })
}

/// Unconditional increment; discussion likes are not de-duplicated.
pub async fn like(db: &Database, id: &str) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "UPDATE discussions SET likes_count = likes_count + 1 WHERE id = ? RETURNING likes_count",
    )
    .bind(id)
    .fetch_optional(&db.pool)
    .await?
    .ok_or_else(not_found)
}

pub async fn moderate(
    db: &Database,
    id: &str,
    is_pinned: Option<bool>,
    is_closed: Option<bool>,
) -> Result<Discussion> {
    let sql = format!(
        "UPDATE discussions SET is_pinned = COALESCE(?1, is_pinned), \
         is_closed = COALESCE(?2, is_closed), updated_at = ?3 WHERE id = ?4 \
         RETURNING {DISCUSSION_COLUMNS}"
    );

    let discussion = sqlx::query_as::<_, Discussion>(&sql)
        .bind(is_pinned)
        .bind(is_closed)
        .bind(timestamp())
        .bind(id)
        .fetch_optional(&db.pool)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(
        discussion_id = %id,
        is_pinned = discussion.is_pinned,
        is_closed = discussion.is_closed,
        "discussion moderated"
    );
    Ok(discussion)
}

pub async fn delete(db: &Database, id: &str) -> Result<()> {
    let mut tx = db.pool.begin().await?;

    let removed_replies = sqlx::query("DELETE FROM replies WHERE discussion_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let deleted = sqlx::query("DELETE FROM discussions WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(not_found());
    }

    tx.commit().await?;

    tracing::info!(discussion_id = %id, removed_replies, "discussion deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_discussion(title: &str, category: &str) -> NewDiscussion {
        NewDiscussion {
            title: title.to_string(),
            content: format!("{title} body"),
            category: Some(category.to_string()),
            author_name: Some("Alice".to_string()),
        }
    }

    #[tokio::test]
    async fn create_initializes_counters_and_timestamps() {
        let db = Database::connect_in_memory().await.unwrap();
        let created = create(
            &db,
            NewDiscussion {
                title: "T".to_string(),
                content: "C".to_string(),
                category: None,
                author_name: Some("Alice".to_string()),
            },
        )
        .await
        .unwrap();

        assert!(created.id.starts_with("dsc_"));
        assert_eq!(created.category, "general");
        assert_eq!(created.replies_count, 0);
        assert_eq!(created.views_count, 0);
        assert!(!created.is_closed && !created.is_pinned);
        assert_eq!(created.created_at, created.last_reply_at);
        assert_eq!(created.author_avatar, community_avatar("Alice"));

        let stored = find(&db, &created.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "T");
        assert_eq!(stored.created_at, created.created_at);
    }

    #[tokio::test]
    async fn create_rejects_blank_title() {
        let db = Database::connect_in_memory().await.unwrap();
        let err = create(&db, new_discussion("  ", "tech")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn every_get_counts_one_view() {
        let db = Database::connect_in_memory().await.unwrap();
        let created = create(&db, new_discussion("Views", "tech")).await.unwrap();

        for expected in 1..=3 {
            let seen = get(&db, &created.id).await.unwrap();
            assert_eq!(seen.views_count, expected);
            assert_eq!(seen.likes_count, 0);
            assert_eq!(seen.title, "Views");
        }

        assert!(matches!(
            get(&db, "dsc_missing").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn likes_are_not_deduplicated() {
        let db = Database::connect_in_memory().await.unwrap();
        let created = create(&db, new_discussion("Likes", "idea")).await.unwrap();

        assert_eq!(like(&db, &created.id).await.unwrap(), 1);
        assert_eq!(like(&db, &created.id).await.unwrap(), 2);
        assert!(matches!(
            like(&db, "dsc_missing").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn popular_keeps_pinned_first() {
        let db = Database::connect_in_memory().await.unwrap();
        let quiet = create(&db, new_discussion("quiet pinned", "tech")).await.unwrap();
        let loud = create(&db, new_discussion("loud", "tech")).await.unwrap();
        let medium = create(&db, new_discussion("medium", "tech")).await.unwrap();

        for _ in 0..5 {
            like(&db, &loud.id).await.unwrap();
        }
        for _ in 0..2 {
            like(&db, &medium.id).await.unwrap();
        }
        moderate(&db, &quiet.id, Some(true), None).await.unwrap();

        let listed = list(&db, None, DiscussionSort::Popular, 20, 0).await.unwrap();
        let titles: Vec<&str> = listed.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["quiet pinned", "loud", "medium"]);
    }

    #[tokio::test]
    async fn active_and_latest_keep_pinned_first() {
        use crate::services::replies::{self, NewReply};

        let db = Database::connect_in_memory().await.unwrap();
        let oldest = create(&db, new_discussion("oldest", "general")).await.unwrap();
        let middle = create(&db, new_discussion("middle", "general")).await.unwrap();
        create(&db, new_discussion("newest", "general")).await.unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));

        replies::create(
            &db,
            &oldest.id,
            NewReply {
                content: "bump".to_string(),
                author_name: None,
                reply_to_id: None,
            },
        )
        .await
        .unwrap();
        moderate(&db, &middle.id, Some(true), None).await.unwrap();

        let titles = |listed: Vec<Discussion>| -> Vec<String> {
            listed.into_iter().map(|d| d.title).collect()
        };

        let active = list(&db, None, DiscussionSort::Active, 20, 0).await.unwrap();
        assert_eq!(titles(active), vec!["middle", "oldest", "newest"]);

        let latest = list(&db, None, DiscussionSort::Latest, 20, 0).await.unwrap();
        assert_eq!(titles(latest), vec!["middle", "newest", "oldest"]);
    }

    #[tokio::test]
    async fn latest_filters_and_paginates() {
        let db = Database::connect_in_memory().await.unwrap();
        for i in 0..4 {
            create(&db, new_discussion(&format!("tech {i}"), "tech"))
                .await
                .unwrap();
        }
        create(&db, new_discussion("help me", "help")).await.unwrap();

        let help = list(&db, Some("help"), DiscussionSort::Latest, 20, 0)
            .await
            .unwrap();
        assert_eq!(help.len(), 1);
        assert_eq!(help[0].title, "help me");

        let page = list(&db, Some("tech"), DiscussionSort::Latest, 2, 1)
            .await
            .unwrap();
        let titles: Vec<&str> = page.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["tech 2", "tech 1"]);
    }

    #[tokio::test]
    async fn moderation_keeps_views() {
        let db = Database::connect_in_memory().await.unwrap();
        let created = create(&db, new_discussion("Mod", "general")).await.unwrap();
        get(&db, &created.id).await.unwrap();

        let closed = moderate(&db, &created.id, None, Some(true)).await.unwrap();
        assert!(closed.is_closed);
        assert!(!closed.is_pinned);
        assert_eq!(closed.views_count, 1);

        let reopened = moderate(&db, &created.id, Some(true), Some(false))
            .await
            .unwrap();
        assert!(reopened.is_pinned && !reopened.is_closed);

        assert!(matches!(
            moderate(&db, "dsc_missing", Some(true), None).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_removes_discussion() {
        let db = Database::connect_in_memory().await.unwrap();
        let created = create(&db, new_discussion("Gone", "general")).await.unwrap();

        delete(&db, &created.id).await.unwrap();
        assert!(find(&db, &created.id).await.unwrap().is_none());
        assert!(matches!(
            delete(&db, &created.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn unknown_sort_falls_back_to_latest() {
        assert_eq!(DiscussionSort::parse(Some("popular")), DiscussionSort::Popular);
        assert_eq!(DiscussionSort::parse(Some("active")), DiscussionSort::Active);
        assert_eq!(DiscussionSort::parse(Some("random")), DiscussionSort::Latest);
        assert_eq!(DiscussionSort::parse(None), DiscussionSort::Latest);
    }
}
