pub mod ai;
pub mod comments;
pub mod discussions;
pub mod projects;

use axum::extract::{FromRequest, FromRequestParts};
use serde::Serialize;

use crate::error::{AppError, Result};

/// JSON body whose rejections render as `AppError::Validation`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string whose rejections render as `AppError::Validation`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    pub success: bool,
}

impl MessageResponse {
    pub fn ok(message: &str) -> Self {
        Self {
            message: message.to_string(),
            success: true,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikesCountResponse {
    pub likes_count: i64,
}

/// Validates `limit`/`offset` query parameters, applying defaults.
pub(crate) fn page(
    limit: Option<i64>,
    offset: Option<i64>,
    default_limit: i64,
    max_limit: i64,
) -> Result<(i64, i64)> {
    let limit = limit.unwrap_or(default_limit);
    if !(1..=max_limit).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {max_limit}"
        )));
    }

    let offset = offset.unwrap_or(0);
    if offset < 0 {
        return Err(AppError::Validation(
            "offset must be greater than or equal to 0".to_string(),
        ));
    }

    Ok((limit, offset))
}
