use std::sync::Arc;

use axum::extract::Path;
use axum::{Extension, Json};
use sqlx::SqlitePool;

use crate::authentication::StaffUser;
use crate::data_formats::{AssignTagsRequest, MessageResponse, TagRequest, TagResponse};
use crate::db_helpers::{
    assign_tags_in_db, create_tag_in_db, delete_tag_in_db, list_tags_in_db, update_tag_in_db,
};
use crate::errors::RequestError;

pub async fn list_tags(
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> Result<Json<Vec<TagResponse>>, RequestError> {
    let tags = list_tags_in_db(&pool).await?;
    Ok(Json(tags.into_iter().map(TagResponse::new).collect()))
}

pub async fn create_tag(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<TagRequest>,
) -> Result<Json<TagResponse>, RequestError> {
    if request.name.trim().is_empty() {
        return Err(RequestError::Validation("Tag name is required."));
    }
    let tag = create_tag_in_db(&pool, &request.name).await?;
    Ok(Json(TagResponse::new(tag)))
}

pub async fn update_tag(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
    Json(request): Json<TagRequest>,
) -> Result<Json<TagResponse>, RequestError> {
    if request.name.trim().is_empty() {
        return Err(RequestError::Validation("Tag name is required."));
    }
    let tag = update_tag_in_db(&pool, id, &request.name).await?;
    Ok(Json(TagResponse::new(tag)))
}

pub async fn delete_tag(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, RequestError> {
    delete_tag_in_db(&pool, id).await?;
    Ok(Json(MessageResponse::new("Tag deleted.")))
}

pub async fn assign_tags(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(novel_id): Path<i64>,
    Json(request): Json<AssignTagsRequest>,
) -> Result<Json<Vec<TagResponse>>, RequestError> {
    let tags = assign_tags_in_db(&pool, novel_id, &request.tag_ids).await?;
    Ok(Json(tags.into_iter().map(TagResponse::new).collect()))
}
