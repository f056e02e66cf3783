use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::AppState;

use super::ApiJson;

pub fn router() -> Router<AppState> {
    Router::new().route("/insights", post(project_insight))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightRequest {
    pub title: String,
    pub background_story: String,
    pub short_description: String,
}

#[derive(Debug, Serialize)]
pub struct InsightResponse {
    pub insight: String,
}

// Always 200: the generator substitutes a fallback on upstream failure.
async fn project_insight(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<InsightRequest>,
) -> Json<InsightResponse> {
    let insight = state
        .insights
        .project_insight(&body.title, &body.background_story, &body.short_description)
        .await;

    Json(InsightResponse { insight })
}
