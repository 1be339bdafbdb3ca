use sqlx::{Sqlite, SqlitePool};

use crate::errors::RequestError;
use crate::models::{Comment, CommentWithAuthor};

pub async fn add_comment_in_db(
    pool: &SqlitePool,
    chapter_id: i64,
    author_id: i64,
    content: &str,
) -> Result<CommentWithAuthor, RequestError> {
    let mut tx = pool.begin().await?;

    let chapter = super::get_chapter_by_id(&mut tx, chapter_id).await?;
    if chapter.is_none() {
        return Err(RequestError::NotFound("Chapter not found."));
    }

    let comment = sqlx::query_as::<Sqlite, Comment>(
        r#"
        INSERT INTO comments (chapter_id, author_id, content)
        VALUES ($1, $2, $3)
        RETURNING id, chapter_id, author_id, content, created_at
        "#,
    )
    .bind(chapter_id)
    .bind(author_id)
    .bind(content.trim())
    .fetch_one(&mut tx)
    .await?;

    let author_username =
        sqlx::query_scalar::<Sqlite, String>("SELECT username FROM users WHERE id = $1")
            .bind(author_id)
            .fetch_one(&mut tx)
            .await?;

    tx.commit().await?;
    Ok(CommentWithAuthor {
        id: comment.id,
        chapter_id: comment.chapter_id,
        author_id: comment.author_id,
        author_username,
        content: comment.content,
        created_at: comment.created_at,
    })
}

pub async fn delete_comment_in_db(
    pool: &SqlitePool,
    id: i64,
    user_id: i64,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;

    let comment = sqlx::query_as::<Sqlite, Comment>(
        "SELECT id, chapter_id, author_id, content, created_at FROM comments WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut tx)
    .await?
    .ok_or(RequestError::NotFound("Comment not found."))?;

    if comment.author_id != user_id {
        return Err(RequestError::Forbidden(
            "You may not delete another user's comment.",
        ));
    }

    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(())
}
