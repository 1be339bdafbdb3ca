use sqlx::{Sqlite, SqlitePool};

use crate::errors::RequestError;
use crate::models::{Bookmark, NovelListing};
use crate::pagination::Page;

const BOOKMARKED_NOVELS_QUERY: &str = r#"
        SELECT novels.id                                       AS "id",
               novels.title                                    AS "title",
               novels.synopsis                                 AS "synopsis",
               novels.cover_url                                AS "cover_url",
               novels.genre                                    AS "genre",
               novels.status                                   AS "status",
               novels.author_id                                AS "author_id",
               users.username                                  AS "author_username",
               novels.total_words                              AS "total_words",
               novels.created_at                               AS "created_at",
               (SELECT COUNT(*)
                FROM   chapters
                WHERE  chapters.novel_id = novels.id)          AS "chapter_count",
               (SELECT COUNT(*)
                FROM   reviews
                WHERE  reviews.novel_id = novels.id)           AS "review_count",
               (SELECT AVG(reviews.score)
                FROM   reviews
                WHERE  reviews.novel_id = novels.id)           AS "avg_score",
               COALESCE((SELECT MAX(chapters.created_at)
                         FROM   chapters
                         WHERE  chapters.novel_id = novels.id),
                        novels.created_at)                     AS "last_update"
        FROM   bookmarks
            JOIN novels
                ON novels.id = bookmarks.novel_id
            JOIN users
                ON users.id = novels.author_id
        WHERE  bookmarks.user_id = $1
        ORDER  BY bookmarks.last_read_at DESC, novels.id DESC
        LIMIT  $2 OFFSET $3
"#;

/// Following is an insert-if-absent: a second follow leaves the single
/// existing row untouched, even when two follows race.
pub async fn follow_novel_in_db(
    pool: &SqlitePool,
    novel_id: i64,
    user_id: i64,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;

    let novel = super::get_novel_by_id(&mut tx, novel_id).await?;
    if novel.is_none() {
        return Err(RequestError::NotFound("Novel not found."));
    }

    sqlx::query("INSERT OR IGNORE INTO bookmarks (user_id, novel_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(novel_id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

pub async fn unfollow_novel_in_db(
    pool: &SqlitePool,
    novel_id: i64,
    user_id: i64,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND novel_id = $2")
        .bind(user_id)
        .bind(novel_id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

/// Recording progress is an implicit follow: the row is created when absent,
/// otherwise its progress marker moves forward.
pub async fn record_progress_in_db(
    pool: &SqlitePool,
    novel_id: i64,
    user_id: i64,
    chapter_id: i64,
) -> Result<Bookmark, RequestError> {
    let mut tx = pool.begin().await?;

    let chapter = super::get_chapter_by_id(&mut tx, chapter_id)
        .await?
        .ok_or(RequestError::NotFound("Chapter not found."))?;
    if chapter.novel_id != novel_id {
        return Err(RequestError::Validation(
            "Chapter does not belong to this novel.",
        ));
    }

    let bookmark = sqlx::query_as::<Sqlite, Bookmark>(
        r#"
        INSERT INTO bookmarks (user_id, novel_id, last_chapter_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, novel_id) DO UPDATE
            SET last_chapter_id = excluded.last_chapter_id,
                last_read_at = CURRENT_TIMESTAMP
        RETURNING user_id, novel_id, last_chapter_id, last_read_at
        "#,
    )
    .bind(user_id)
    .bind(novel_id)
    .bind(chapter_id)
    .fetch_one(&mut tx)
    .await?;

    tx.commit().await?;
    Ok(bookmark)
}

pub async fn list_bookmarks_in_db(
    pool: &SqlitePool,
    user_id: i64,
    page: i64,
    page_size: i64,
) -> Result<(Vec<NovelListing>, Page), RequestError> {
    let mut tx = pool.begin().await?;

    let total = sqlx::query_scalar::<Sqlite, i64>(
        "SELECT COUNT(*) FROM bookmarks WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(&mut tx)
    .await?;
    let page = Page::clamp(total, page, page_size);

    let novels = sqlx::query_as::<Sqlite, NovelListing>(BOOKMARKED_NOVELS_QUERY)
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut tx)
        .await?;

    tx.commit().await?;
    Ok((novels, page))
}
