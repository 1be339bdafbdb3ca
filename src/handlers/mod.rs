use axum::http::{StatusCode, Uri};

mod admin;
mod auth;
mod chapters;
mod comments;
mod follows;
mod lists;
mod novels;
mod reviews;
mod tags;

pub use admin::*;
pub use auth::*;
pub use chapters::*;
pub use comments::*;
pub use follows::*;
pub use lists::*;
pub use novels::*;
pub use reviews::*;
pub use tags::*;

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> Result<(), (StatusCode, String)> {
    Err((
        StatusCode::NOT_FOUND,
        format!("URL {} provided was not found", uri),
    ))
}
