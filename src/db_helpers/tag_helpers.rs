use sqlx::{Sqlite, SqlitePool};

use crate::errors::RequestError;
use crate::models::Tag;

pub async fn list_tags_in_db(pool: &SqlitePool) -> Result<Vec<Tag>, RequestError> {
    let result = sqlx::query_as::<Sqlite, Tag>("SELECT id, name FROM tags ORDER BY name ASC")
        .fetch_all(pool)
        .await?;
    Ok(result)
}

pub async fn create_tag_in_db(pool: &SqlitePool, name: &str) -> Result<Tag, RequestError> {
    let mut tx = pool.begin().await?;
    let tag = sqlx::query_as::<Sqlite, Tag>(
        "INSERT INTO tags (name) VALUES ($1) RETURNING id, name",
    )
    .bind(name.trim())
    .fetch_one(&mut tx)
    .await
    .map_err(|e| RequestError::DatabaseError(e).or_conflict("A tag with that name already exists."))?;
    tx.commit().await?;
    Ok(tag)
}

pub async fn update_tag_in_db(pool: &SqlitePool, id: i64, name: &str) -> Result<Tag, RequestError> {
    let mut tx = pool.begin().await?;
    let tag = sqlx::query_as::<Sqlite, Tag>(
        "UPDATE tags SET name = $1 WHERE id = $2 RETURNING id, name",
    )
    .bind(name.trim())
    .bind(id)
    .fetch_optional(&mut tx)
    .await
    .map_err(|e| RequestError::DatabaseError(e).or_conflict("A tag with that name already exists."))?
    .ok_or(RequestError::NotFound("Tag not found."))?;
    tx.commit().await?;
    Ok(tag)
}

/// Assignment rows cascade away with the tag; novels themselves are never
/// touched.
pub async fn delete_tag_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM tags WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Tag not found."));
    }
    tx.commit().await?;
    Ok(())
}

/// Replaces the novel's whole tag set: clear, then re-add. Unknown tag ids
/// are skipped rather than rejected.
pub async fn assign_tags_in_db(
    pool: &SqlitePool,
    novel_id: i64,
    tag_ids: &[i64],
) -> Result<Vec<Tag>, RequestError> {
    let mut tx = pool.begin().await?;

    let novel = super::get_novel_by_id(&mut tx, novel_id).await?;
    if novel.is_none() {
        return Err(RequestError::NotFound("Novel not found."));
    }

    sqlx::query("DELETE FROM noveltags WHERE novel_id = $1")
        .bind(novel_id)
        .execute(&mut tx)
        .await?;

    for tag_id in tag_ids {
        let known = sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM tags WHERE id = $1")
            .bind(tag_id)
            .fetch_one(&mut tx)
            .await?;
        if known == 0 {
            continue;
        }
        sqlx::query("INSERT OR IGNORE INTO noveltags (novel_id, tag_id) VALUES ($1, $2)")
            .bind(novel_id)
            .bind(tag_id)
            .execute(&mut tx)
            .await?;
    }

    let tags = sqlx::query_as::<Sqlite, Tag>(
        r#"
        SELECT tags.id, tags.name
        FROM tags
            JOIN noveltags ON noveltags.tag_id = tags.id
        WHERE noveltags.novel_id = $1
        ORDER BY tags.name ASC
        "#,
    )
    .bind(novel_id)
    .fetch_all(&mut tx)
    .await?;

    tx.commit().await?;
    Ok(tags)
}
