use std::sync::Arc;

use axum::extract::Path;
use axum::{Extension, Json};
use sqlx::SqlitePool;

use crate::authentication::AuthUser;
use crate::data_formats::{CommentRequest, CommentResponse, MessageResponse};
use crate::db_helpers::{add_comment_in_db, delete_comment_in_db};
use crate::errors::RequestError;

pub async fn add_comment(
    AuthUser(user): AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(chapter_id): Path<i64>,
    Json(request): Json<CommentRequest>,
) -> Result<Json<CommentResponse>, RequestError> {
    if request.content.trim().is_empty() {
        return Err(RequestError::Validation("The comment cannot be empty."));
    }
    let comment = add_comment_in_db(&pool, chapter_id, user.id, &request.content).await?;
    Ok(Json(CommentResponse::new(comment)))
}

pub async fn delete_comment(
    AuthUser(user): AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, RequestError> {
    delete_comment_in_db(&pool, id, user.id).await?;
    Ok(Json(MessageResponse::new("Comment deleted.")))
}
