use sqlx::{Executor, Sqlite};

use crate::models::{Chapter, Novel, Role, User};

mod admin_helpers;
mod chapter_helpers;
mod comment_helpers;
mod follow_helpers;
mod list_helpers;
mod novel_helpers;
mod review_helpers;
mod tag_helpers;
mod user_helpers;

pub use admin_helpers::*;
pub use chapter_helpers::*;
pub use comment_helpers::*;
pub use follow_helpers::*;
pub use list_helpers::*;
pub use novel_helpers::*;
pub use review_helpers::*;
pub use tag_helpers::*;
pub use user_helpers::*;

// ----------------- Shared Lookups -----------------
//
// Generic over the executor so they run either on the pool or inside an
// enclosing transaction.

pub(crate) async fn get_user_by_id<'e, E>(executor: E, id: i64) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<Sqlite, User>(
        r#"
        SELECT id, username, email, password, role_id, bio, avatar_url, created_at
        FROM users WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn get_role_by_name<'e, E>(
    executor: E,
    name: &str,
) -> Result<Option<Role>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<Sqlite, Role>("SELECT id, name FROM roles WHERE name = $1")
        .bind(name)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn get_novel_by_id<'e, E>(
    executor: E,
    id: i64,
) -> Result<Option<Novel>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<Sqlite, Novel>(
        r#"
        SELECT id, title, synopsis, cover_url, genre, status, author_id, total_words, created_at
        FROM novels WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn get_chapter_by_id<'e, E>(
    executor: E,
    id: i64,
) -> Result<Option<Chapter>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<Sqlite, Chapter>(
        r#"
        SELECT id, novel_id, number, title, content, words, created_at
        FROM chapters WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}
