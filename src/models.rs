use chrono::NaiveDateTime;

pub const NOVEL_STATUSES: [&str; 3] = ["Ongoing", "Completed", "Hiatus"];

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role_id: i64,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Novel {
    pub id: i64,
    pub title: String,
    pub synopsis: Option<String>,
    pub cover_url: Option<String>,
    pub genre: Option<String>,
    pub status: String,
    pub author_id: i64,
    pub total_words: i64,
    pub created_at: NaiveDateTime,
}

/// Listing row: a novel joined with its author plus the derived aggregates
/// the catalog pages sort and filter on.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NovelListing {
    pub id: i64,
    pub title: String,
    pub synopsis: Option<String>,
    pub cover_url: Option<String>,
    pub genre: Option<String>,
    pub status: String,
    pub author_id: i64,
    pub author_username: String,
    pub total_words: i64,
    pub created_at: NaiveDateTime,
    pub chapter_count: i64,
    pub review_count: i64,
    pub avg_score: Option<f64>,
    pub last_update: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Chapter {
    pub id: i64,
    pub novel_id: i64,
    pub number: i64,
    pub title: String,
    pub content: String,
    pub words: i64,
    pub created_at: NaiveDateTime,
}

/// Chapter row without its content, for tables of contents.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChapterSummary {
    pub id: i64,
    pub number: i64,
    pub title: String,
    pub words: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub chapter_id: i64,
    pub author_id: i64,
    pub content: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentWithAuthor {
    pub id: i64,
    pub chapter_id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub content: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Review {
    pub id: i64,
    pub novel_id: i64,
    pub author_id: i64,
    pub score: i64,
    pub body: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewWithAuthor {
    pub id: i64,
    pub novel_id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub score: i64,
    pub body: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Bookmark {
    pub user_id: i64,
    pub novel_id: i64,
    pub last_chapter_id: Option<i64>,
    pub last_read_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct List {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Membership row joined with the novel it points at.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ListNovelRow {
    pub list_id: i64,
    pub novel_id: i64,
    pub novel_title: String,
    pub novel_status: String,
    pub added_at: NaiveDateTime,
}

/// Credential row for the login check.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LoginUser {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub role_name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserWithRole {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role_name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentAdminRow {
    pub id: i64,
    pub content: String,
    pub author_username: String,
    pub chapter_id: i64,
    pub chapter_title: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewAdminRow {
    pub id: i64,
    pub score: i64,
    pub body: String,
    pub author_username: String,
    pub novel_id: i64,
    pub novel_title: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MonthCount {
    pub month: String,
    pub count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TopNovelRow {
    pub id: i64,
    pub title: String,
    pub chapter_count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FollowedUser {
    pub id: i64,
    pub username: String,
    pub followed_at: NaiveDateTime,
}
