use std::sync::Arc;

use axum::extract::Path;
use axum::{Extension, Json};
use sqlx::SqlitePool;

use crate::authentication::AuthUser;
use crate::data_formats::{
    CreateListRequest, ListNovelEntryResponse, ListNovelRequest, ListResponse, MessageResponse,
};
use crate::db_helpers::{
    add_novel_to_list_in_db, create_list_in_db, delete_list_in_db, get_list_in_db, my_lists_in_db,
    remove_novel_from_list_in_db, ListWithNovels,
};
use crate::errors::RequestError;

fn list_response(ListWithNovels { list, novels }: ListWithNovels) -> ListResponse {
    ListResponse {
        id: list.id,
        name: list.name,
        description: list.description,
        created_at: list.created_at.to_string(),
        novels: novels
            .into_iter()
            .map(ListNovelEntryResponse::new)
            .collect(),
    }
}

pub async fn my_lists(
    AuthUser(user): AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> Result<Json<Vec<ListResponse>>, RequestError> {
    let lists = my_lists_in_db(&pool, user.id).await?;
    Ok(Json(lists.into_iter().map(list_response).collect()))
}

pub async fn create_list(
    AuthUser(user): AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<CreateListRequest>,
) -> Result<Json<ListResponse>, RequestError> {
    if request.name.trim().is_empty() {
        return Err(RequestError::Validation("The list needs a name."));
    }
    let list = create_list_in_db(&pool, user.id, &request.name, request.description.as_deref())
        .await?;
    Ok(Json(list_response(ListWithNovels {
        list,
        novels: Vec::new(),
    })))
}

pub async fn list_detail(
    AuthUser(user): AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
) -> Result<Json<ListResponse>, RequestError> {
    let list = get_list_in_db(&pool, id, user.id).await?;
    Ok(Json(list_response(list)))
}

pub async fn delete_list(
    AuthUser(user): AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, RequestError> {
    delete_list_in_db(&pool, id, user.id).await?;
    Ok(Json(MessageResponse::new("List deleted.")))
}

pub async fn add_novel_to_list(
    AuthUser(user): AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(list_id): Path<i64>,
    Json(request): Json<ListNovelRequest>,
) -> Result<Json<MessageResponse>, RequestError> {
    add_novel_to_list_in_db(&pool, list_id, user.id, request.novel_id).await?;
    Ok(Json(MessageResponse::new("Novel added to the list.")))
}

pub async fn remove_novel_from_list(
    AuthUser(user): AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path((list_id, novel_id)): Path<(i64, i64)>,
) -> Result<Json<MessageResponse>, RequestError> {
    remove_novel_from_list_in_db(&pool, list_id, user.id, novel_id).await?;
    Ok(Json(MessageResponse::new("Novel removed from the list.")))
}
