pub mod comments;
pub mod discussions;
pub mod insight;
pub mod projects;
pub mod replies;
pub mod seed;
pub mod stats;

pub fn community_avatar(author_name: &str) -> String {
    format!("https://api.dicebear.com/7.x/avataaars/svg?seed={author_name}")
}

pub fn comment_avatar(author_name: &str) -> String {
    format!("https://picsum.photos/seed/{author_name}/100/100")
}

pub(crate) fn author_or(name: Option<&str>, default: &str) -> String {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => default.to_string(),
    }
}

pub(crate) fn require_text(value: &str, what: &str) -> crate::error::Result<()> {
    if value.trim().is_empty() {
        return Err(crate::error::AppError::Validation(format!(
            "{what} is required"
        )));
    }
    Ok(())
}
