use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::data_formats::{CreateChapterRequest, UpdateChapterRequest};
use crate::errors::RequestError;
use crate::models::{Chapter, CommentWithAuthor};

/// Word count is the number of whitespace-separated tokens, fixed at
/// create/edit time.
pub fn count_words(content: &str) -> i64 {
    content.split_whitespace().count() as i64
}

/// Re-derives a novel's total word count from its chapters. Runs inside the
/// caller's transaction so the invariant holds at commit.
pub(super) async fn recompute_total_words(
    tx: &mut Transaction<'_, Sqlite>,
    novel_id: i64,
) -> Result<(), RequestError> {
    sqlx::query(
        r#"
        UPDATE novels
        SET total_words = (SELECT COALESCE(SUM(words), 0) FROM chapters WHERE novel_id = $1)
        WHERE id = $1
        "#,
    )
    .bind(novel_id)
    .execute(&mut *tx)
    .await?;
    Ok(())
}

pub struct ChapterDetail {
    pub chapter: Chapter,
    pub novel_title: String,
    pub previous_chapter_id: Option<i64>,
    pub next_chapter_id: Option<i64>,
    pub comments: Vec<CommentWithAuthor>,
}

pub async fn create_chapter_in_db(
    pool: &SqlitePool,
    novel_id: i64,
    author_id: i64,
    CreateChapterRequest {
        number,
        title,
        content,
    }: CreateChapterRequest,
) -> Result<Chapter, RequestError> {
    let mut tx = pool.begin().await?;

    let novel = super::get_novel_by_id(&mut tx, novel_id)
        .await?
        .ok_or(RequestError::NotFound("Novel not found."))?;
    if novel.author_id != author_id {
        return Err(RequestError::Forbidden(
            "Only the novel's author may add chapters.",
        ));
    }

    let max_number = sqlx::query_scalar::<Sqlite, i64>(
        "SELECT COALESCE(MAX(number), 0) FROM chapters WHERE novel_id = $1",
    )
    .bind(novel_id)
    .fetch_one(&mut tx)
    .await?;

    // Numbering is append-only and gapless: the only valid number is max + 1.
    if number < 1 {
        return Err(RequestError::Validation("Chapter number must be positive."));
    }
    if number <= max_number {
        return Err(RequestError::Conflict("Duplicate chapter number."));
    }
    if number > max_number + 1 {
        return Err(RequestError::Conflict("Chapter number out of sequence."));
    }

    let words = count_words(&content);
    let chapter = sqlx::query_as::<Sqlite, Chapter>(
        r#"
        INSERT INTO chapters (novel_id, number, title, content, words)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, novel_id, number, title, content, words, created_at
        "#,
    )
    .bind(novel_id)
    .bind(number)
    .bind(title.trim())
    .bind(content)
    .bind(words)
    .fetch_one(&mut tx)
    .await
    .map_err(|e| RequestError::DatabaseError(e).or_conflict("Duplicate chapter number."))?;

    recompute_total_words(&mut tx, novel_id).await?;
    tx.commit().await?;
    Ok(chapter)
}

pub async fn get_chapter_detail_in_db(
    pool: &SqlitePool,
    id: i64,
) -> Result<ChapterDetail, RequestError> {
    let mut tx = pool.begin().await?;

    let chapter = super::get_chapter_by_id(&mut tx, id)
        .await?
        .ok_or(RequestError::NotFound("Chapter not found."))?;

    let novel_title =
        sqlx::query_scalar::<Sqlite, String>("SELECT title FROM novels WHERE id = $1")
            .bind(chapter.novel_id)
            .fetch_optional(&mut tx)
            .await?
            .ok_or(RequestError::NotFound("Novel not found."))?;

    let previous_chapter_id = sqlx::query_scalar::<Sqlite, i64>(
        "SELECT id FROM chapters WHERE novel_id = $1 AND number = $2",
    )
    .bind(chapter.novel_id)
    .bind(chapter.number - 1)
    .fetch_optional(&mut tx)
    .await?;
    let next_chapter_id = sqlx::query_scalar::<Sqlite, i64>(
        "SELECT id FROM chapters WHERE novel_id = $1 AND number = $2",
    )
    .bind(chapter.novel_id)
    .bind(chapter.number + 1)
    .fetch_optional(&mut tx)
    .await?;

    let comments = sqlx::query_as::<Sqlite, CommentWithAuthor>(
        r#"
        SELECT comments.id,
               comments.chapter_id,
               comments.author_id,
               users.username AS author_username,
               comments.content,
               comments.created_at
        FROM comments
            JOIN users ON users.id = comments.author_id
        WHERE comments.chapter_id = $1
        ORDER BY comments.created_at DESC, comments.id DESC
        "#,
    )
    .bind(id)
    .fetch_all(&mut tx)
    .await?;

    tx.commit().await?;
    Ok(ChapterDetail {
        chapter,
        novel_title,
        previous_chapter_id,
        next_chapter_id,
        comments,
    })
}

pub async fn update_chapter_in_db(
    pool: &SqlitePool,
    id: i64,
    user_id: i64,
    UpdateChapterRequest { title, content }: UpdateChapterRequest,
) -> Result<Chapter, RequestError> {
    let mut tx = pool.begin().await?;

    let chapter = super::get_chapter_by_id(&mut tx, id)
        .await?
        .ok_or(RequestError::NotFound("Chapter not found."))?;
    let novel = super::get_novel_by_id(&mut tx, chapter.novel_id)
        .await?
        .ok_or(RequestError::NotFound("Novel not found."))?;
    if novel.author_id != user_id {
        return Err(RequestError::Forbidden(
            "Only the novel's author may edit chapters.",
        ));
    }

    let title = title.unwrap_or(chapter.title);
    let content = content.unwrap_or(chapter.content);
    let words = count_words(&content);

    let updated = sqlx::query_as::<Sqlite, Chapter>(
        r#"
        UPDATE chapters
        SET title = $1, content = $2, words = $3
        WHERE id = $4
        RETURNING id, novel_id, number, title, content, words, created_at
        "#,
    )
    .bind(title.trim())
    .bind(content)
    .bind(words)
    .bind(id)
    .fetch_one(&mut tx)
    .await?;

    recompute_total_words(&mut tx, chapter.novel_id).await?;
    tx.commit().await?;
    Ok(updated)
}

pub async fn delete_chapter_in_db(
    pool: &SqlitePool,
    id: i64,
    user_id: i64,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;

    let chapter = super::get_chapter_by_id(&mut tx, id)
        .await?
        .ok_or(RequestError::NotFound("Chapter not found."))?;
    let novel = super::get_novel_by_id(&mut tx, chapter.novel_id)
        .await?
        .ok_or(RequestError::NotFound("Novel not found."))?;
    if novel.author_id != user_id {
        return Err(RequestError::Forbidden(
            "Only the novel's author may delete chapters.",
        ));
    }

    sqlx::query("DELETE FROM chapters WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await
        .map_err(|e| {
            RequestError::DatabaseError(e)
                .or_dependency("Could not delete the chapter, check dependencies.")
        })?;

    recompute_total_words(&mut tx, chapter.novel_id).await?;
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::count_words;

    #[test]
    fn counts_whitespace_separated_tokens() {
        assert_eq!(count_words("Hello world"), 2);
        assert_eq!(count_words("  leading   and\ttrailing \n"), 3);
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   "), 0);
        assert_eq!(count_words("one"), 1);
    }
}
