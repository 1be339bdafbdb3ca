use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::{Extension, Json};
use sqlx::SqlitePool;

use crate::authentication::AuthUser;
use crate::data_formats::{
    BookmarkResponse, FollowedUserResponse, MessageResponse, NovelResponse, PageParams, Paginated,
    ProgressRequest,
};
use crate::db_helpers::{
    follow_novel_in_db, follow_user_in_db, list_bookmarks_in_db, list_following_in_db,
    record_progress_in_db, unfollow_novel_in_db, unfollow_user_in_db,
};
use crate::errors::RequestError;

// ----------------- Novel Follows -----------------

pub async fn follow_novel(
    AuthUser(user): AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(novel_id): Path<i64>,
) -> Result<Json<MessageResponse>, RequestError> {
    follow_novel_in_db(&pool, novel_id, user.id).await?;
    Ok(Json(MessageResponse::new("Following.")))
}

pub async fn unfollow_novel(
    AuthUser(user): AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(novel_id): Path<i64>,
) -> Result<Json<MessageResponse>, RequestError> {
    unfollow_novel_in_db(&pool, novel_id, user.id).await?;
    Ok(Json(MessageResponse::new("No longer following.")))
}

pub async fn record_progress(
    AuthUser(user): AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(novel_id): Path<i64>,
    Json(request): Json<ProgressRequest>,
) -> Result<Json<BookmarkResponse>, RequestError> {
    let bookmark = record_progress_in_db(&pool, novel_id, user.id, request.chapter_id).await?;
    Ok(Json(BookmarkResponse::new(bookmark)))
}

pub async fn my_bookmarks(
    AuthUser(user): AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<NovelResponse>>, RequestError> {
    let (novels, page) =
        list_bookmarks_in_db(&pool, user.id, params.page, params.page_size).await?;
    Ok(Json(Paginated::new(
        novels.into_iter().map(NovelResponse::new).collect(),
        page,
    )))
}

// ----------------- User Follows -----------------

pub async fn follow_user(
    AuthUser(user): AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(followed_id): Path<i64>,
) -> Result<Json<MessageResponse>, RequestError> {
    follow_user_in_db(&pool, user.id, followed_id).await?;
    Ok(Json(MessageResponse::new("Following.")))
}

pub async fn unfollow_user(
    AuthUser(user): AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(followed_id): Path<i64>,
) -> Result<Json<MessageResponse>, RequestError> {
    unfollow_user_in_db(&pool, user.id, followed_id).await?;
    Ok(Json(MessageResponse::new("No longer following.")))
}

pub async fn following(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<FollowedUserResponse>>, RequestError> {
    let followed = list_following_in_db(&pool, user_id).await?;
    Ok(Json(
        followed.into_iter().map(FollowedUserResponse::new).collect(),
    ))
}
