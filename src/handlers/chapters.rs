use std::sync::Arc;

use axum::extract::Path;
use axum::{Extension, Json};
use sqlx::SqlitePool;

use crate::authentication::AuthUser;
use crate::data_formats::{
    ChapterDetailResponse, ChapterResponse, CommentResponse, CreateChapterRequest,
    MessageResponse, UpdateChapterRequest,
};
use crate::db_helpers::{
    create_chapter_in_db, delete_chapter_in_db, get_chapter_detail_in_db, update_chapter_in_db,
    ChapterDetail,
};
use crate::errors::RequestError;

pub async fn create_chapter(
    AuthUser(user): AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(novel_id): Path<i64>,
    Json(request): Json<CreateChapterRequest>,
) -> Result<Json<ChapterResponse>, RequestError> {
    if request.title.trim().is_empty() || request.content.trim().is_empty() {
        return Err(RequestError::Validation(
            "Chapter title and content are required.",
        ));
    }
    let chapter = create_chapter_in_db(&pool, novel_id, user.id, request).await?;
    Ok(Json(ChapterResponse::new(chapter)))
}

pub async fn chapter_detail(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
) -> Result<Json<ChapterDetailResponse>, RequestError> {
    let ChapterDetail {
        chapter,
        novel_title,
        previous_chapter_id,
        next_chapter_id,
        comments,
    } = get_chapter_detail_in_db(&pool, id).await?;
    Ok(Json(ChapterDetailResponse {
        id: chapter.id,
        novel_id: chapter.novel_id,
        novel_title,
        number: chapter.number,
        title: chapter.title,
        content: chapter.content,
        words: chapter.words,
        published_at: chapter.created_at.to_string(),
        previous_chapter_id,
        next_chapter_id,
        comments: comments.into_iter().map(CommentResponse::new).collect(),
    }))
}

pub async fn update_chapter(
    AuthUser(user): AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateChapterRequest>,
) -> Result<Json<ChapterResponse>, RequestError> {
    if let Some(title) = &request.title {
        if title.trim().is_empty() {
            return Err(RequestError::Validation("Chapter title is required."));
        }
    }
    if let Some(content) = &request.content {
        if content.trim().is_empty() {
            return Err(RequestError::Validation("Chapter content is required."));
        }
    }
    let chapter = update_chapter_in_db(&pool, id, user.id, request).await?;
    Ok(Json(ChapterResponse::new(chapter)))
}

pub async fn delete_chapter(
    AuthUser(user): AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, RequestError> {
    delete_chapter_in_db(&pool, id, user.id).await?;
    Ok(Json(MessageResponse::new("Chapter deleted.")))
}
