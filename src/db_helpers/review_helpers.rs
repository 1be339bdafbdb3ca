use sqlx::{Sqlite, SqlitePool};

use crate::errors::RequestError;
use crate::models::Review;

pub async fn add_review_in_db(
    pool: &SqlitePool,
    novel_id: i64,
    author_id: i64,
    score: i64,
    body: &str,
) -> Result<Review, RequestError> {
    let mut tx = pool.begin().await?;

    let novel = super::get_novel_by_id(&mut tx, novel_id).await?;
    if novel.is_none() {
        return Err(RequestError::NotFound("Novel not found."));
    }

    let existing = sqlx::query_scalar::<Sqlite, i64>(
        "SELECT COUNT(*) FROM reviews WHERE novel_id = $1 AND author_id = $2",
    )
    .bind(novel_id)
    .bind(author_id)
    .fetch_one(&mut tx)
    .await?;
    if existing > 0 {
        return Err(RequestError::Conflict(
            "You have already reviewed this novel.",
        ));
    }

    // The (novel_id, author_id) unique index resolves the concurrent case.
    let review = sqlx::query_as::<Sqlite, Review>(
        r#"
        INSERT INTO reviews (novel_id, author_id, score, body)
        VALUES ($1, $2, $3, $4)
        RETURNING id, novel_id, author_id, score, body, created_at
        "#,
    )
    .bind(novel_id)
    .bind(author_id)
    .bind(score)
    .bind(body.trim())
    .fetch_one(&mut tx)
    .await
    .map_err(|e| {
        RequestError::DatabaseError(e).or_conflict("You have already reviewed this novel.")
    })?;

    tx.commit().await?;
    Ok(review)
}

pub async fn delete_review_in_db(
    pool: &SqlitePool,
    id: i64,
    user_id: i64,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;

    let review = sqlx::query_as::<Sqlite, Review>(
        "SELECT id, novel_id, author_id, score, body, created_at FROM reviews WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut tx)
    .await?
    .ok_or(RequestError::NotFound("Review not found."))?;

    if review.author_id != user_id {
        return Err(RequestError::Forbidden(
            "You may not delete another user's review.",
        ));
    }

    sqlx::query("DELETE FROM reviews WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(())
}
