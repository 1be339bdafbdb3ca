use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::{Extension, Json};
use sqlx::SqlitePool;

use crate::authentication::{AuthUser, MaybeUser, StaffUser};
use crate::data_formats::{
    AuthorResponse, BookmarkResponse, ChapterPageParams, ChapterSummaryResponse,
    CreateNovelRequest, MessageResponse, NovelDetailResponse, NovelQueryParams, NovelResponse,
    Paginated, ReviewResponse, TagResponse, UpdateNovelRequest,
};
use crate::db_helpers::{
    create_novel_in_db, delete_novel_in_db, featured_novels_in_db, get_novel_detail_in_db,
    get_novel_listing_in_db, list_novels_in_db, update_novel_in_db, NovelDetail,
};
use crate::errors::RequestError;
use crate::models::NOVEL_STATUSES;
use crate::pagination::DEFAULT_PAGE_SIZE;

fn validate_status(status: &str) -> Result<(), RequestError> {
    if NOVEL_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(RequestError::Validation(
            "Status must be Ongoing, Completed or Hiatus.",
        ))
    }
}

fn detail_response(detail: NovelDetail) -> NovelDetailResponse {
    let NovelDetail {
        novel,
        tags,
        chapters,
        chapter_page,
        reviews,
        bookmark,
    } = detail;
    NovelDetailResponse {
        id: novel.id,
        title: novel.title,
        synopsis: novel.synopsis,
        cover_url: novel.cover_url,
        genre: novel.genre,
        status: novel.status,
        author: AuthorResponse {
            id: novel.author_id,
            username: novel.author_username,
        },
        total_words: novel.total_words,
        review_count: novel.review_count,
        avg_score: novel.avg_score,
        published_at: novel.created_at.to_string(),
        tags: tags.into_iter().map(TagResponse::new).collect(),
        chapters: Paginated::new(
            chapters.into_iter().map(ChapterSummaryResponse::new).collect(),
            chapter_page,
        ),
        reviews: reviews.into_iter().map(ReviewResponse::new).collect(),
        bookmark: bookmark.map(BookmarkResponse::new),
    }
}

pub async fn list_novels(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<NovelQueryParams>,
) -> Result<Json<Paginated<NovelResponse>>, RequestError> {
    let (novels, page) = list_novels_in_db(&pool, &params).await?;
    Ok(Json(Paginated::new(
        novels.into_iter().map(NovelResponse::new).collect(),
        page,
    )))
}

pub async fn featured_novels(
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> Result<Json<Vec<NovelResponse>>, RequestError> {
    let novels = featured_novels_in_db(&pool).await?;
    Ok(Json(novels.into_iter().map(NovelResponse::new).collect()))
}

pub async fn novel_detail(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(id): Path<i64>,
    Query(params): Query<ChapterPageParams>,
) -> Result<Json<NovelDetailResponse>, RequestError> {
    let detail = get_novel_detail_in_db(
        &pool,
        id,
        maybe_user.get_id(),
        params.chapter_page,
        params.chapter_page_size,
    )
    .await?;
    Ok(Json(detail_response(detail)))
}

pub async fn create_novel(
    AuthUser(user): AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<CreateNovelRequest>,
) -> Result<Json<NovelDetailResponse>, RequestError> {
    if request.title.trim().is_empty() {
        return Err(RequestError::Validation("Title is required."));
    }
    if request.tag_ids.is_empty() {
        return Err(RequestError::Validation("Select at least one tag."));
    }
    if request.first_chapter_title.trim().is_empty()
        || request.first_chapter_content.trim().is_empty()
    {
        return Err(RequestError::Validation(
            "The first chapter needs a title and content.",
        ));
    }
    validate_status(&request.status)?;

    let novel_id = create_novel_in_db(&pool, user.id, request).await?;
    let detail = get_novel_detail_in_db(&pool, novel_id, Some(user.id), 1, DEFAULT_PAGE_SIZE).await?;
    Ok(Json(detail_response(detail)))
}

pub async fn update_novel(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateNovelRequest>,
) -> Result<Json<NovelResponse>, RequestError> {
    if let Some(title) = &request.title {
        if title.trim().is_empty() {
            return Err(RequestError::Validation("Title is required."));
        }
    }
    if let Some(status) = &request.status {
        validate_status(status)?;
    }
    let novel = update_novel_in_db(&pool, id, request).await?;
    let listing = get_novel_listing_in_db(&pool, novel.id).await?;
    Ok(Json(NovelResponse::new(listing)))
}

pub async fn delete_novel(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, RequestError> {
    delete_novel_in_db(&pool, id).await?;
    Ok(Json(MessageResponse::new("Novel deleted.")))
}
