use std::sync::Arc;

use axum::extract::Path;
use axum::{Extension, Json};
use sqlx::SqlitePool;

use crate::authentication::AuthUser;
use crate::data_formats::{MessageResponse, ReviewRequest, ReviewResponse};
use crate::db_helpers::{add_review_in_db, delete_review_in_db};
use crate::errors::RequestError;
use crate::models::ReviewWithAuthor;

pub async fn add_review(
    AuthUser(user): AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(novel_id): Path<i64>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<ReviewResponse>, RequestError> {
    if !(1..=5).contains(&request.score) {
        return Err(RequestError::Validation("Score must be between 1 and 5."));
    }
    if request.body.trim().is_empty() {
        return Err(RequestError::Validation("The review cannot be empty."));
    }
    let review = add_review_in_db(&pool, novel_id, user.id, request.score, &request.body).await?;
    Ok(Json(ReviewResponse::new(ReviewWithAuthor {
        id: review.id,
        novel_id: review.novel_id,
        author_id: review.author_id,
        author_username: user.username,
        score: review.score,
        body: review.body,
        created_at: review.created_at,
    })))
}

pub async fn delete_review(
    AuthUser(user): AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, RequestError> {
    delete_review_in_db(&pool, id, user.id).await?;
    Ok(Json(MessageResponse::new("Review deleted.")))
}
