mod authentication;
mod data_formats;
mod db_helpers;
mod errors;
mod export;
mod handlers;
mod models;
mod pagination;

use anyhow::Context;
pub use anyhow::Result;
pub use data_formats::*;
use axum::{middleware, routing::*, Extension, Router};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::str::FromStr;
use std::{
    net::{SocketAddr, TcpListener},
    sync::Arc,
};

use authentication::{csrf_guard, ROLE_ADMINISTRATOR, ROLE_MODERATOR, ROLE_READER};
use handlers::*;

const DEFAULT_ROLES: [&str; 3] = [ROLE_ADMINISTRATOR, ROLE_MODERATOR, ROLE_READER];

pub async fn run_app(app: Router, address: SocketAddr, db_url: &str) -> Result<()> {
    let db = init_db(db_url).await?;
    let app = app.layer(Extension(Arc::new(db)));
    tracing::info!("listening on {address}");
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub async fn init_db(db_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        tracing::info!("creating database {db_url}");
        Sqlite::create_database(db_url)
            .await
            .context("Failed to create database")?;
    }
    // Referential integrity is load-bearing here: dependent rows must block
    // deletes, and join rows must cascade.
    let options = SqliteConnectOptions::from_str(db_url)
        .context("Invalid database URL")?
        .foreign_keys(true);
    let pool = SqlitePool::connect_with(options).await?;
    tracing::info!("running migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    seed_roles(&pool).await?;
    Ok(pool)
}

/// Inserts any of the default roles that are missing; registration depends on
/// the Reader row existing.
pub async fn seed_roles(pool: &SqlitePool) -> Result<()> {
    for role in DEFAULT_ROLES {
        sqlx::query("INSERT OR IGNORE INTO roles (name) VALUES ($1)")
            .bind(role)
            .execute(pool)
            .await
            .context("Failed to seed roles")?;
    }
    Ok(())
}

pub fn get_random_free_port() -> (u16, SocketAddr) {
    let listener = TcpListener::bind("localhost:0").unwrap();
    match listener.local_addr() {
        Ok(addr) => (addr.port(), addr),
        Err(_) => panic!("Could not get a free port"),
    }
}

pub fn make_router() -> Router {
    Router::new()
        .route("/check_health", get(alive))
        // Identity
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        // Catalog
        .route("/novels", get(list_novels).post(create_novel))
        .route("/novels/featured", get(featured_novels))
        .route(
            "/novels/:id",
            get(novel_detail).put(update_novel).delete(delete_novel),
        )
        // Reading
        .route("/novels/:id/chapters", post(create_chapter))
        .route(
            "/chapters/:id",
            get(chapter_detail).put(update_chapter).delete(delete_chapter),
        )
        // Engagement
        .route("/chapters/:id/comments", post(add_comment))
        .route("/comments/:id", delete(delete_comment))
        .route("/novels/:id/reviews", post(add_review))
        .route("/reviews/:id", delete(delete_review))
        .route("/novels/:id/follow", post(follow_novel))
        .route("/novels/:id/unfollow", post(unfollow_novel))
        .route("/novels/:id/progress", post(record_progress))
        .route("/bookmarks", get(my_bookmarks))
        .route("/lists", get(my_lists).post(create_list))
        .route("/lists/:id", get(list_detail).delete(delete_list))
        .route("/lists/:id/novels", post(add_novel_to_list))
        .route("/lists/:id/novels/:novel_id", delete(remove_novel_from_list))
        .route("/users/:id/follow", post(follow_user))
        .route("/users/:id/unfollow", post(unfollow_user))
        .route("/users/:id/following", get(following))
        // Tagging
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/:id", put(update_tag).delete(delete_tag))
        .route("/novels/:id/tags", put(assign_tags))
        // Back office
        .route("/admin/dashboard", get(admin_dashboard))
        .route("/admin/dashboard/export.csv", get(admin_export_dashboard_csv))
        .route(
            "/admin/dashboard/export.print",
            get(admin_export_dashboard_print),
        )
        .route("/admin/users", get(admin_list_users))
        .route("/admin/users/:id", delete(admin_delete_user))
        .route("/admin/users/export.csv", get(admin_export_users))
        .route("/admin/novels", get(admin_list_novels))
        .route("/admin/novels/:id", delete(admin_delete_novel))
        .route("/admin/novels/export.csv", get(admin_export_novels))
        .route("/admin/comments", get(admin_list_comments))
        .route("/admin/comments/:id", delete(admin_delete_comment))
        .route("/admin/comments/export.csv", get(admin_export_comments))
        .route("/admin/reviews", get(admin_list_reviews))
        .route("/admin/reviews/:id", delete(admin_delete_review))
        .route("/admin/reviews/export.csv", get(admin_export_reviews))
        .route("/admin/tags", get(admin_list_tags))
        .route("/admin/tags/:id", delete(admin_delete_tag))
        .route("/admin/tags/export.csv", get(admin_export_tags))
        .route("/admin/roles", get(admin_list_roles))
        .route("/admin/roles/:id", delete(admin_delete_role))
        .route("/admin/roles/export.csv", get(admin_export_roles))
        .layer(middleware::from_fn(csrf_guard))
        .fallback(not_found)
}
