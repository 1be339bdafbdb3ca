use sqlx::{Sqlite, SqlitePool};

use crate::errors::RequestError;
use crate::models::{FollowedUser, LoginUser, User};

pub async fn insert_user_in_db(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
    role_id: i64,
) -> Result<User, RequestError> {
    let mut tx = pool.begin().await?;
    let taken = sqlx::query_scalar::<Sqlite, i64>(
        "SELECT COUNT(*) FROM users WHERE username = $1 OR email = $2",
    )
    .bind(username)
    .bind(email)
    .fetch_one(&mut tx)
    .await?;
    if taken > 0 {
        return Err(RequestError::Conflict("Username or email already in use."));
    }

    // The unique indexes still back this up when two registrations race.
    let user = sqlx::query_as::<Sqlite, User>(
        r#"
        INSERT INTO users (username, email, password, role_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, username, email, password, role_id, bio, avatar_url, created_at
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role_id)
    .fetch_one(&mut tx)
    .await
    .map_err(|e| RequestError::DatabaseError(e).or_conflict("Username or email already in use."))?;
    tx.commit().await?;
    Ok(user)
}

pub async fn get_login_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<LoginUser>, RequestError> {
    let result = sqlx::query_as::<Sqlite, LoginUser>(
        r#"
        SELECT users.id, users.username, users.password, roles.name AS role_name
        FROM users
            JOIN roles ON roles.id = users.role_id
        WHERE users.email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(result)
}

// ----------------- Social Follows -----------------

pub async fn follow_user_in_db(
    pool: &SqlitePool,
    follower_id: i64,
    followed_id: i64,
) -> Result<(), RequestError> {
    if follower_id == followed_id {
        return Err(RequestError::Validation("You cannot follow yourself."));
    }
    let mut tx = pool.begin().await?;
    let followed = super::get_user_by_id(&mut tx, followed_id).await?;
    if followed.is_none() {
        return Err(RequestError::NotFound("User not found."));
    }
    sqlx::query("INSERT OR IGNORE INTO userfollows (follower_id, followed_id) VALUES ($1, $2)")
        .bind(follower_id)
        .bind(followed_id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

pub async fn unfollow_user_in_db(
    pool: &SqlitePool,
    follower_id: i64,
    followed_id: i64,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM userfollows WHERE follower_id = $1 AND followed_id = $2")
        .bind(follower_id)
        .bind(followed_id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

pub async fn list_following_in_db(
    pool: &SqlitePool,
    follower_id: i64,
) -> Result<Vec<FollowedUser>, RequestError> {
    let result = sqlx::query_as::<Sqlite, FollowedUser>(
        r#"
        SELECT users.id, users.username, userfollows.created_at AS followed_at
        FROM userfollows
            JOIN users ON users.id = userfollows.followed_id
        WHERE userfollows.follower_id = $1
        ORDER BY userfollows.created_at DESC, users.username ASC
        "#,
    )
    .bind(follower_id)
    .fetch_all(pool)
    .await?;
    Ok(result)
}
