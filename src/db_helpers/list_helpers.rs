use std::collections::HashMap;

use sqlx::{Sqlite, SqlitePool};

use crate::errors::RequestError;
use crate::models::{List, ListNovelRow};

pub struct ListWithNovels {
    pub list: List,
    pub novels: Vec<ListNovelRow>,
}

pub async fn create_list_in_db(
    pool: &SqlitePool,
    owner_id: i64,
    name: &str,
    description: Option<&str>,
) -> Result<List, RequestError> {
    let mut tx = pool.begin().await?;
    let list = sqlx::query_as::<Sqlite, List>(
        r#"
        INSERT INTO lists (owner_id, name, description)
        VALUES ($1, $2, $3)
        RETURNING id, owner_id, name, description, created_at
        "#,
    )
    .bind(owner_id)
    .bind(name.trim())
    .bind(description)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(list)
}

async fn get_owned_list(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    id: i64,
    owner_id: i64,
) -> Result<List, RequestError> {
    // A list owned by someone else reads as absent, like the original.
    sqlx::query_as::<Sqlite, List>(
        r#"
        SELECT id, owner_id, name, description, created_at
        FROM lists WHERE id = $1 AND owner_id = $2
        "#,
    )
    .bind(id)
    .bind(owner_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(RequestError::NotFound("List not found."))
}

pub async fn delete_list_in_db(
    pool: &SqlitePool,
    id: i64,
    owner_id: i64,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    get_owned_list(&mut tx, id, owner_id).await?;
    sqlx::query("DELETE FROM lists WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

const LIST_NOVELS_QUERY: &str = r#"
        SELECT listnovels.list_id,
               listnovels.novel_id,
               novels.title  AS novel_title,
               novels.status AS novel_status,
               listnovels.added_at
        FROM listnovels
            JOIN novels ON novels.id = listnovels.novel_id
            JOIN lists ON lists.id = listnovels.list_id
"#;

pub async fn my_lists_in_db(
    pool: &SqlitePool,
    owner_id: i64,
) -> Result<Vec<ListWithNovels>, RequestError> {
    let mut tx = pool.begin().await?;

    let lists = sqlx::query_as::<Sqlite, List>(
        r#"
        SELECT id, owner_id, name, description, created_at
        FROM lists
        WHERE owner_id = $1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(owner_id)
    .fetch_all(&mut tx)
    .await?;

    let query = format!(
        "{LIST_NOVELS_QUERY} WHERE lists.owner_id = $1 ORDER BY listnovels.added_at DESC"
    );
    let rows = sqlx::query_as::<Sqlite, ListNovelRow>(&query)
        .bind(owner_id)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;

    let mut by_list: HashMap<i64, Vec<ListNovelRow>> = HashMap::new();
    for row in rows {
        by_list.entry(row.list_id).or_default().push(row);
    }
    Ok(lists
        .into_iter()
        .map(|list| {
            let novels = by_list.remove(&list.id).unwrap_or_default();
            ListWithNovels { list, novels }
        })
        .collect())
}

pub async fn get_list_in_db(
    pool: &SqlitePool,
    id: i64,
    owner_id: i64,
) -> Result<ListWithNovels, RequestError> {
    let mut tx = pool.begin().await?;
    let list = get_owned_list(&mut tx, id, owner_id).await?;
    let query = format!(
        "{LIST_NOVELS_QUERY} WHERE listnovels.list_id = $1 ORDER BY listnovels.added_at DESC"
    );
    let novels = sqlx::query_as::<Sqlite, ListNovelRow>(&query)
        .bind(id)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(ListWithNovels { list, novels })
}

pub async fn add_novel_to_list_in_db(
    pool: &SqlitePool,
    list_id: i64,
    owner_id: i64,
    novel_id: i64,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    get_owned_list(&mut tx, list_id, owner_id).await?;

    let novel = super::get_novel_by_id(&mut tx, novel_id).await?;
    if novel.is_none() {
        return Err(RequestError::NotFound("Novel not found."));
    }

    // Membership is a set; re-adding is a no-op.
    sqlx::query("INSERT OR IGNORE INTO listnovels (list_id, novel_id) VALUES ($1, $2)")
        .bind(list_id)
        .bind(novel_id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

pub async fn remove_novel_from_list_in_db(
    pool: &SqlitePool,
    list_id: i64,
    owner_id: i64,
    novel_id: i64,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    get_owned_list(&mut tx, list_id, owner_id).await?;
    sqlx::query("DELETE FROM listnovels WHERE list_id = $1 AND novel_id = $2")
        .bind(list_id)
        .bind(novel_id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(())
}
