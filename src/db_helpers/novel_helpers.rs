use sqlx::{Sqlite, SqlitePool};

use crate::data_formats::{CreateNovelRequest, NovelQueryParams, UpdateNovelRequest};
use crate::errors::RequestError;
use crate::models::{Bookmark, ChapterSummary, Novel, NovelListing, ReviewWithAuthor, Tag};
use crate::pagination::Page;

use super::count_words;

const NOVEL_LISTING_QUERY: &str = r#"
        SELECT * FROM (
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
            FROM   novels
                JOIN users
                    ON users.id = novels.author_id
            WHERE  ( $1 IS NULL
                     OR LOWER(novels.title) LIKE '%' || LOWER($1) || '%'
                     OR LOWER(COALESCE(novels.synopsis, '')) LIKE '%' || LOWER($1) || '%'
                     OR LOWER(users.username) LIKE '%' || LOWER($1) || '%' )
               AND ( $2 IS NULL OR novels.genre = $2 )
               AND ( $3 IS NULL OR novels.status = $3 )
        )
        WHERE ( $4 IS NULL OR ( review_count > 0 AND avg_score >= $4 ) )
"#;

const SINGLE_NOVEL_QUERY: &str = r#"
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
        FROM   novels
            JOIN users
                ON users.id = novels.author_id
        WHERE  novels.id = $1
"#;

/// Everything the novel page shows, read in one transaction.
pub struct NovelDetail {
    pub novel: NovelListing,
    pub tags: Vec<Tag>,
    pub chapters: Vec<ChapterSummary>,
    pub chapter_page: Page,
    pub reviews: Vec<ReviewWithAuthor>,
    pub bookmark: Option<Bookmark>,
}

pub async fn list_novels_in_db(
    pool: &SqlitePool,
    params: &NovelQueryParams,
) -> Result<(Vec<NovelListing>, Page), RequestError> {
    let mut tx = pool.begin().await?;

    let count_query = format!("SELECT COUNT(*) FROM ({NOVEL_LISTING_QUERY})");
    let total = sqlx::query_scalar::<Sqlite, i64>(&count_query)
        .bind(&params.search)
        .bind(&params.genre)
        .bind(&params.status)
        .bind(params.min_rating)
        .fetch_one(&mut tx)
        .await?;

    let page = Page::clamp(total, params.page, params.page_size);
    let order = match params.sort.as_deref() {
        Some("recent") => "last_update DESC, id DESC",
        _ => "title ASC, id ASC",
    };
    let page_query = format!("{NOVEL_LISTING_QUERY} ORDER BY {order} LIMIT $5 OFFSET $6");
    let novels = sqlx::query_as::<Sqlite, NovelListing>(&page_query)
        .bind(&params.search)
        .bind(&params.genre)
        .bind(&params.status)
        .bind(params.min_rating)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut tx)
        .await?;

    tx.commit().await?;
    Ok((novels, page))
}

pub async fn featured_novels_in_db(pool: &SqlitePool) -> Result<Vec<NovelListing>, RequestError> {
    let query = format!("{NOVEL_LISTING_QUERY} ORDER BY review_count DESC, title ASC LIMIT 5");
    let novels = sqlx::query_as::<Sqlite, NovelListing>(&query)
        .bind(Option::<String>::None)
        .bind(Option::<String>::None)
        .bind(Option::<String>::None)
        .bind(Option::<f64>::None)
        .fetch_all(pool)
        .await?;
    Ok(novels)
}

pub async fn get_novel_listing_in_db(
    pool: &SqlitePool,
    id: i64,
) -> Result<NovelListing, RequestError> {
    let novel = sqlx::query_as::<Sqlite, NovelListing>(SINGLE_NOVEL_QUERY)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    novel.ok_or(RequestError::NotFound("Novel not found."))
}

pub async fn get_novel_detail_in_db(
    pool: &SqlitePool,
    id: i64,
    viewer_id: Option<i64>,
    chapter_page: i64,
    chapter_page_size: i64,
) -> Result<NovelDetail, RequestError> {
    let mut tx = pool.begin().await?;

    let novel = sqlx::query_as::<Sqlite, NovelListing>(SINGLE_NOVEL_QUERY)
        .bind(id)
        .fetch_optional(&mut tx)
        .await?
        .ok_or(RequestError::NotFound("Novel not found."))?;

    let tags = sqlx::query_as::<Sqlite, Tag>(
        r#"
        SELECT tags.id, tags.name
        FROM tags
            JOIN noveltags ON noveltags.tag_id = tags.id
        WHERE noveltags.novel_id = $1
        ORDER BY tags.name ASC
        "#,
    )
    .bind(id)
    .fetch_all(&mut tx)
    .await?;

    let chapter_total =
        sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM chapters WHERE novel_id = $1")
            .bind(id)
            .fetch_one(&mut tx)
            .await?;
    let chapter_page = Page::clamp(chapter_total, chapter_page, chapter_page_size);
    let chapters = sqlx::query_as::<Sqlite, ChapterSummary>(
        r#"
        SELECT id, number, title, words, created_at
        FROM chapters
        WHERE novel_id = $1
        ORDER BY number ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(id)
    .bind(chapter_page.limit())
    .bind(chapter_page.offset())
    .fetch_all(&mut tx)
    .await?;

    let reviews = sqlx::query_as::<Sqlite, ReviewWithAuthor>(
        r#"
        SELECT reviews.id,
               reviews.novel_id,
               reviews.author_id,
               users.username AS author_username,
               reviews.score,
               reviews.body,
               reviews.created_at
        FROM reviews
            JOIN users ON users.id = reviews.author_id
        WHERE reviews.novel_id = $1
        ORDER BY reviews.created_at DESC, reviews.id DESC
        "#,
    )
    .bind(id)
    .fetch_all(&mut tx)
    .await?;

    let bookmark = match viewer_id {
        Some(viewer_id) => {
            sqlx::query_as::<Sqlite, Bookmark>(
                r#"
                SELECT user_id, novel_id, last_chapter_id, last_read_at
                FROM bookmarks
                WHERE user_id = $1 AND novel_id = $2
                "#,
            )
            .bind(viewer_id)
            .bind(id)
            .fetch_optional(&mut tx)
            .await?
        }
        None => None,
    };

    tx.commit().await?;
    Ok(NovelDetail {
        novel,
        tags,
        chapters,
        chapter_page,
        reviews,
        bookmark,
    })
}

/// Creates the novel, its tag links and chapter #1 as one unit; readers never
/// observe a novel without its first chapter.
pub async fn create_novel_in_db(
    pool: &SqlitePool,
    author_id: i64,
    CreateNovelRequest {
        title,
        synopsis,
        cover_url,
        genre,
        status,
        tag_ids,
        first_chapter_title,
        first_chapter_content,
    }: CreateNovelRequest,
) -> Result<i64, RequestError> {
    let mut tx = pool.begin().await?;

    let novel_id = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        INSERT INTO novels (title, synopsis, cover_url, genre, status, author_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(title.trim())
    .bind(synopsis)
    .bind(cover_url)
    .bind(genre)
    .bind(status)
    .bind(author_id)
    .fetch_one(&mut tx)
    .await?;

    for tag_id in tag_ids {
        let known = sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM tags WHERE id = $1")
            .bind(tag_id)
            .fetch_one(&mut tx)
            .await?;
        if known == 0 {
            return Err(RequestError::Validation(
                "One or more selected tags do not exist.",
            ));
        }
        sqlx::query("INSERT OR IGNORE INTO noveltags (novel_id, tag_id) VALUES ($1, $2)")
            .bind(novel_id)
            .bind(tag_id)
            .execute(&mut tx)
            .await?;
    }

    let words = count_words(&first_chapter_content);
    sqlx::query(
        r#"
        INSERT INTO chapters (novel_id, number, title, content, words)
        VALUES ($1, 1, $2, $3, $4)
        "#,
    )
    .bind(novel_id)
    .bind(first_chapter_title.trim())
    .bind(first_chapter_content)
    .bind(words)
    .execute(&mut tx)
    .await?;

    sqlx::query("UPDATE novels SET total_words = $1 WHERE id = $2")
        .bind(words)
        .bind(novel_id)
        .execute(&mut tx)
        .await?;

    tx.commit().await?;
    Ok(novel_id)
}

pub async fn update_novel_in_db(
    pool: &SqlitePool,
    id: i64,
    UpdateNovelRequest {
        title,
        synopsis,
        cover_url,
        genre,
        status,
    }: UpdateNovelRequest,
) -> Result<Novel, RequestError> {
    let mut tx = pool.begin().await?;
    let novel = sqlx::query_as::<Sqlite, Novel>(
        r#"
        UPDATE novels
        SET title     = COALESCE($1, title),
            synopsis  = COALESCE($2, synopsis),
            cover_url = COALESCE($3, cover_url),
            genre     = COALESCE($4, genre),
            status    = COALESCE($5, status)
        WHERE id = $6
        RETURNING id, title, synopsis, cover_url, genre, status, author_id, total_words, created_at
        "#,
    )
    .bind(title)
    .bind(synopsis)
    .bind(cover_url)
    .bind(genre)
    .bind(status)
    .bind(id)
    .fetch_optional(&mut tx)
    .await?
    .ok_or(RequestError::NotFound("Novel not found."))?;
    tx.commit().await?;
    Ok(novel)
}

pub async fn delete_novel_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM novels WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await
        .map_err(|e| {
            RequestError::DatabaseError(e)
                .or_dependency("Could not delete the novel, check dependencies.")
        })?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Novel not found."));
    }
    tx.commit().await?;
    Ok(())
}
