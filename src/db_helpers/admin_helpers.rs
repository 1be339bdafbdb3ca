use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::{Sqlite, SqlitePool};

use crate::errors::RequestError;
use crate::models::{
    CommentAdminRow, MonthCount, NovelListing, ReviewAdminRow, Role, StatusCount, Tag, TopNovelRow,
    UserWithRole,
};

// ----------------- Entity Listings -----------------
//
// Uniform shape per entity: optional search over its natural text columns,
// LIMIT/OFFSET paging (LIMIT -1 = everything, for the export endpoints), and
// the total for pagination controls.

pub async fn list_users_admin_in_db(
    pool: &SqlitePool,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<UserWithRole>, i64), RequestError> {
    let mut tx = pool.begin().await?;
    let total = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        SELECT COUNT(*) FROM users
        WHERE ( $1 IS NULL
                OR LOWER(username) LIKE '%' || LOWER($1) || '%'
                OR LOWER(email) LIKE '%' || LOWER($1) || '%' )
        "#,
    )
    .bind(search)
    .fetch_one(&mut tx)
    .await?;
    let users = sqlx::query_as::<Sqlite, UserWithRole>(
        r#"
        SELECT users.id, users.username, users.email, roles.name AS role_name, users.created_at
        FROM users
            JOIN roles ON roles.id = users.role_id
        WHERE ( $1 IS NULL
                OR LOWER(users.username) LIKE '%' || LOWER($1) || '%'
                OR LOWER(users.email) LIKE '%' || LOWER($1) || '%' )
        ORDER BY users.username ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(search)
    .bind(limit)
    .bind(offset)
    .fetch_all(&mut tx)
    .await?;
    tx.commit().await?;
    Ok((users, total))
}

pub async fn delete_user_admin_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await
        .map_err(|e| {
            RequestError::DatabaseError(e)
                .or_dependency("Could not delete the user, check dependencies.")
        })?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("User not found."));
    }
    tx.commit().await?;
    Ok(())
}

pub async fn list_novels_admin_in_db(
    pool: &SqlitePool,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<NovelListing>, i64), RequestError> {
    let mut tx = pool.begin().await?;
    let total = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        SELECT COUNT(*)
        FROM novels
            JOIN users ON users.id = novels.author_id
        WHERE ( $1 IS NULL
                OR LOWER(novels.title) LIKE '%' || LOWER($1) || '%'
                OR LOWER(users.username) LIKE '%' || LOWER($1) || '%' )
        "#,
    )
    .bind(search)
    .fetch_one(&mut tx)
    .await?;
    let novels = sqlx::query_as::<Sqlite, NovelListing>(
        r#"
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
        WHERE ( $1 IS NULL
                OR LOWER(novels.title) LIKE '%' || LOWER($1) || '%'
                OR LOWER(users.username) LIKE '%' || LOWER($1) || '%' )
        ORDER BY novels.title ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(search)
    .bind(limit)
    .bind(offset)
    .fetch_all(&mut tx)
    .await?;
    tx.commit().await?;
    Ok((novels, total))
}

pub async fn list_comments_admin_in_db(
    pool: &SqlitePool,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<CommentAdminRow>, i64), RequestError> {
    let mut tx = pool.begin().await?;
    let total = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        SELECT COUNT(*)
        FROM comments
            JOIN users ON users.id = comments.author_id
        WHERE ( $1 IS NULL
                OR LOWER(comments.content) LIKE '%' || LOWER($1) || '%'
                OR LOWER(users.username) LIKE '%' || LOWER($1) || '%' )
        "#,
    )
    .bind(search)
    .fetch_one(&mut tx)
    .await?;
    let comments = sqlx::query_as::<Sqlite, CommentAdminRow>(
        r#"
        SELECT comments.id,
               comments.content,
               users.username AS author_username,
               comments.chapter_id,
               chapters.title AS chapter_title,
               comments.created_at
        FROM comments
            JOIN users ON users.id = comments.author_id
            JOIN chapters ON chapters.id = comments.chapter_id
        WHERE ( $1 IS NULL
                OR LOWER(comments.content) LIKE '%' || LOWER($1) || '%'
                OR LOWER(users.username) LIKE '%' || LOWER($1) || '%' )
        ORDER BY comments.created_at DESC, comments.id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(search)
    .bind(limit)
    .bind(offset)
    .fetch_all(&mut tx)
    .await?;
    tx.commit().await?;
    Ok((comments, total))
}

pub async fn delete_comment_admin_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Comment not found."));
    }
    tx.commit().await?;
    Ok(())
}

pub async fn list_reviews_admin_in_db(
    pool: &SqlitePool,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<ReviewAdminRow>, i64), RequestError> {
    let mut tx = pool.begin().await?;
    let total = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        SELECT COUNT(*)
        FROM reviews
            JOIN users ON users.id = reviews.author_id
            JOIN novels ON novels.id = reviews.novel_id
        WHERE ( $1 IS NULL
                OR LOWER(reviews.body) LIKE '%' || LOWER($1) || '%'
                OR LOWER(users.username) LIKE '%' || LOWER($1) || '%'
                OR LOWER(novels.title) LIKE '%' || LOWER($1) || '%' )
        "#,
    )
    .bind(search)
    .fetch_one(&mut tx)
    .await?;
    let reviews = sqlx::query_as::<Sqlite, ReviewAdminRow>(
        r#"
        SELECT reviews.id,
               reviews.score,
               reviews.body,
               users.username AS author_username,
               reviews.novel_id,
               novels.title AS novel_title,
               reviews.created_at
        FROM reviews
            JOIN users ON users.id = reviews.author_id
            JOIN novels ON novels.id = reviews.novel_id
        WHERE ( $1 IS NULL
                OR LOWER(reviews.body) LIKE '%' || LOWER($1) || '%'
                OR LOWER(users.username) LIKE '%' || LOWER($1) || '%'
                OR LOWER(novels.title) LIKE '%' || LOWER($1) || '%' )
        ORDER BY reviews.created_at DESC, reviews.id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(search)
    .bind(limit)
    .bind(offset)
    .fetch_all(&mut tx)
    .await?;
    tx.commit().await?;
    Ok((reviews, total))
}

pub async fn delete_review_admin_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Review not found."));
    }
    tx.commit().await?;
    Ok(())
}

pub async fn list_tags_admin_in_db(
    pool: &SqlitePool,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Tag>, i64), RequestError> {
    let mut tx = pool.begin().await?;
    let total = sqlx::query_scalar::<Sqlite, i64>(
        "SELECT COUNT(*) FROM tags WHERE ( $1 IS NULL OR LOWER(name) LIKE '%' || LOWER($1) || '%' )",
    )
    .bind(search)
    .fetch_one(&mut tx)
    .await?;
    let tags = sqlx::query_as::<Sqlite, Tag>(
        r#"
        SELECT id, name FROM tags
        WHERE ( $1 IS NULL OR LOWER(name) LIKE '%' || LOWER($1) || '%' )
        ORDER BY name ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(search)
    .bind(limit)
    .bind(offset)
    .fetch_all(&mut tx)
    .await?;
    tx.commit().await?;
    Ok((tags, total))
}

pub async fn list_roles_admin_in_db(
    pool: &SqlitePool,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Role>, i64), RequestError> {
    let mut tx = pool.begin().await?;
    let total = sqlx::query_scalar::<Sqlite, i64>(
        "SELECT COUNT(*) FROM roles WHERE ( $1 IS NULL OR LOWER(name) LIKE '%' || LOWER($1) || '%' )",
    )
    .bind(search)
    .fetch_one(&mut tx)
    .await?;
    let roles = sqlx::query_as::<Sqlite, Role>(
        r#"
        SELECT id, name FROM roles
        WHERE ( $1 IS NULL OR LOWER(name) LIKE '%' || LOWER($1) || '%' )
        ORDER BY name ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(search)
    .bind(limit)
    .bind(offset)
    .fetch_all(&mut tx)
    .await?;
    tx.commit().await?;
    Ok((roles, total))
}

pub async fn delete_role_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM roles WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await
        .map_err(|e| {
            RequestError::DatabaseError(e)
                .or_dependency("Could not delete the role, check dependencies.")
        })?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Role not found."));
    }
    tx.commit().await?;
    Ok(())
}

// ----------------- Dashboard -----------------

pub struct DashboardMetrics {
    pub total_users: i64,
    pub total_novels: i64,
    pub total_chapters: i64,
    pub total_comments: i64,
    pub total_reviews: i64,
    pub total_tags: i64,
    pub users_registered_today: i64,
    pub novels_last_7_days: i64,
    pub comments_today: i64,
    pub reviews_last_7_days: i64,
    pub monthly_novels: Vec<MonthCount>,
    pub status_counts: Vec<StatusCount>,
    pub top_novels: Vec<TopNovelRow>,
    pub recent_users: Vec<UserWithRole>,
}

/// First day of the month five months before `today`'s month: the start of
/// the trailing six-month growth window.
fn month_window_start(today: NaiveDate) -> NaiveDate {
    let months = today.year() * 12 + today.month0() as i32 - 5;
    let (year, month0) = (months.div_euclid(12), months.rem_euclid(12));
    NaiveDate::from_ymd_opt(year, month0 as u32 + 1, 1).unwrap_or(today)
}

pub async fn dashboard_metrics_in_db(
    pool: &SqlitePool,
    now: NaiveDateTime,
) -> Result<DashboardMetrics, RequestError> {
    let today_start = now.date().and_time(NaiveTime::MIN);
    let week_ago = now - chrono::Duration::days(7);
    let period_start = month_window_start(now.date()).and_time(NaiveTime::MIN);

    let mut tx = pool.begin().await?;

    let total_users = sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(&mut tx)
        .await?;
    let total_novels = sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM novels")
        .fetch_one(&mut tx)
        .await?;
    let total_chapters = sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM chapters")
        .fetch_one(&mut tx)
        .await?;
    let total_comments = sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM comments")
        .fetch_one(&mut tx)
        .await?;
    let total_reviews = sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM reviews")
        .fetch_one(&mut tx)
        .await?;
    let total_tags = sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM tags")
        .fetch_one(&mut tx)
        .await?;

    let users_registered_today =
        sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM users WHERE created_at >= $1")
            .bind(today_start)
            .fetch_one(&mut tx)
            .await?;
    let novels_last_7_days =
        sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM novels WHERE created_at >= $1")
            .bind(week_ago)
            .fetch_one(&mut tx)
            .await?;
    let comments_today =
        sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM comments WHERE created_at >= $1")
            .bind(today_start)
            .fetch_one(&mut tx)
            .await?;
    let reviews_last_7_days =
        sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM reviews WHERE created_at >= $1")
            .bind(week_ago)
            .fetch_one(&mut tx)
            .await?;

    let monthly_novels = sqlx::query_as::<Sqlite, MonthCount>(
        r#"
        SELECT strftime('%Y-%m', created_at) AS month, COUNT(*) AS count
        FROM novels
        WHERE created_at >= $1
        GROUP BY month
        ORDER BY month ASC
        "#,
    )
    .bind(period_start)
    .fetch_all(&mut tx)
    .await?;

    let status_counts = sqlx::query_as::<Sqlite, StatusCount>(
        r#"
        SELECT status, COUNT(*) AS count
        FROM novels
        GROUP BY status
        ORDER BY count DESC, status ASC
        "#,
    )
    .fetch_all(&mut tx)
    .await?;

    let top_novels = sqlx::query_as::<Sqlite, TopNovelRow>(
        r#"
        SELECT novels.id,
               novels.title,
               (SELECT COUNT(*)
                FROM chapters
                WHERE chapters.novel_id = novels.id) AS chapter_count
        FROM novels
        ORDER BY chapter_count DESC, novels.title ASC
        LIMIT 5
        "#,
    )
    .fetch_all(&mut tx)
    .await?;

    let recent_users = sqlx::query_as::<Sqlite, UserWithRole>(
        r#"
        SELECT users.id, users.username, users.email, roles.name AS role_name, users.created_at
        FROM users
            JOIN roles ON roles.id = users.role_id
        ORDER BY users.created_at DESC, users.id DESC
        LIMIT 8
        "#,
    )
    .fetch_all(&mut tx)
    .await?;

    tx.commit().await?;
    Ok(DashboardMetrics {
        total_users,
        total_novels,
        total_chapters,
        total_comments,
        total_reviews,
        total_tags,
        users_registered_today,
        novels_last_7_days,
        comments_today,
        reviews_last_7_days,
        monthly_novels,
        status_counts,
        top_novels,
        recent_users,
    })
}

#[cfg(test)]
mod tests {
    use super::month_window_start;
    use chrono::NaiveDate;

    #[test]
    fn six_month_window_starts_on_the_first() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(month_window_start(date(2026, 8, 6)), date(2026, 3, 1));
        assert_eq!(month_window_start(date(2026, 3, 31)), date(2025, 10, 1));
        assert_eq!(month_window_start(date(2026, 1, 1)), date(2025, 8, 1));
    }
}
