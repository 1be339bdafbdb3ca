use serde::{Deserialize, Serialize};

use crate::models::{
    Bookmark, ChapterSummary, CommentAdminRow, CommentWithAuthor, FollowedUser, ListNovelRow,
    MonthCount, NovelListing, ReviewAdminRow, ReviewWithAuthor, Role, StatusCount, Tag,
    TopNovelRow, UserWithRole,
};

#[derive(Deserialize, Serialize, Debug)]
pub struct SessionResponse {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub csrf_token: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        MessageResponse {
            message: message.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct NovelResponse {
    pub id: i64,
    pub title: String,
    pub synopsis: Option<String>,
    pub cover_url: Option<String>,
    pub genre: Option<String>,
    pub status: String,
    pub author_id: i64,
    pub author_username: String,
    pub total_words: i64,
    pub chapter_count: i64,
    pub review_count: i64,
    pub avg_score: Option<f64>,
    pub published_at: String,
    pub last_update: String,
}

impl NovelResponse {
    pub fn new(
        NovelListing {
            id,
            title,
            synopsis,
            cover_url,
            genre,
            status,
            author_id,
            author_username,
            total_words,
            created_at,
            chapter_count,
            review_count,
            avg_score,
            last_update,
        }: NovelListing,
    ) -> Self {
        NovelResponse {
            id,
            title,
            synopsis,
            cover_url,
            genre,
            status,
            author_id,
            author_username,
            total_words,
            chapter_count,
            review_count,
            avg_score,
            published_at: created_at.to_string(),
            last_update: last_update.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
}

impl TagResponse {
    pub fn new(Tag { id, name }: Tag) -> Self {
        TagResponse { id, name }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ChapterSummaryResponse {
    pub id: i64,
    pub number: i64,
    pub title: String,
    pub words: i64,
    pub published_at: String,
}

impl ChapterSummaryResponse {
    pub fn new(
        ChapterSummary {
            id,
            number,
            title,
            words,
            created_at,
        }: ChapterSummary,
    ) -> Self {
        ChapterSummaryResponse {
            id,
            number,
            title,
            words,
            published_at: created_at.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ReviewResponse {
    pub id: i64,
    pub novel_id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub score: i64,
    pub body: String,
    pub created_at: String,
}

impl ReviewResponse {
    pub fn new(
        ReviewWithAuthor {
            id,
            novel_id,
            author_id,
            author_username,
            score,
            body,
            created_at,
        }: ReviewWithAuthor,
    ) -> Self {
        ReviewResponse {
            id,
            novel_id,
            author_id,
            author_username,
            score,
            body,
            created_at: created_at.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct BookmarkResponse {
    pub novel_id: i64,
    pub last_chapter_id: Option<i64>,
    pub last_read_at: String,
}

impl BookmarkResponse {
    pub fn new(
        Bookmark {
            novel_id,
            last_chapter_id,
            last_read_at,
            ..
        }: Bookmark,
    ) -> Self {
        BookmarkResponse {
            novel_id,
            last_chapter_id,
            last_read_at: last_read_at.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct AuthorResponse {
    pub id: i64,
    pub username: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct NovelDetailResponse {
    pub id: i64,
    pub title: String,
    pub synopsis: Option<String>,
    pub cover_url: Option<String>,
    pub genre: Option<String>,
    pub status: String,
    pub author: AuthorResponse,
    pub total_words: i64,
    pub review_count: i64,
    pub avg_score: Option<f64>,
    pub published_at: String,
    pub tags: Vec<TagResponse>,
    pub chapters: super::Paginated<ChapterSummaryResponse>,
    pub reviews: Vec<ReviewResponse>,
    pub bookmark: Option<BookmarkResponse>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ChapterResponse {
    pub id: i64,
    pub novel_id: i64,
    pub number: i64,
    pub title: String,
    pub content: String,
    pub words: i64,
    pub published_at: String,
}

impl ChapterResponse {
    pub fn new(
        crate::models::Chapter {
            id,
            novel_id,
            number,
            title,
            content,
            words,
            created_at,
        }: crate::models::Chapter,
    ) -> Self {
        ChapterResponse {
            id,
            novel_id,
            number,
            title,
            content,
            words,
            published_at: created_at.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct CommentResponse {
    pub id: i64,
    pub chapter_id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub content: String,
    pub created_at: String,
}

impl CommentResponse {
    pub fn new(
        CommentWithAuthor {
            id,
            chapter_id,
            author_id,
            author_username,
            content,
            created_at,
        }: CommentWithAuthor,
    ) -> Self {
        CommentResponse {
            id,
            chapter_id,
            author_id,
            author_username,
            content,
            created_at: created_at.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ChapterDetailResponse {
    pub id: i64,
    pub novel_id: i64,
    pub novel_title: String,
    pub number: i64,
    pub title: String,
    pub content: String,
    pub words: i64,
    pub published_at: String,
    pub previous_chapter_id: Option<i64>,
    pub next_chapter_id: Option<i64>,
    pub comments: Vec<CommentResponse>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ListNovelEntryResponse {
    pub novel_id: i64,
    pub title: String,
    pub status: String,
    pub added_at: String,
}

impl ListNovelEntryResponse {
    pub fn new(
        ListNovelRow {
            novel_id,
            novel_title,
            novel_status,
            added_at,
            ..
        }: ListNovelRow,
    ) -> Self {
        ListNovelEntryResponse {
            novel_id,
            title: novel_title,
            status: novel_status,
            added_at: added_at.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ListResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub novels: Vec<ListNovelEntryResponse>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct FollowedUserResponse {
    pub id: i64,
    pub username: String,
    pub followed_at: String,
}

impl FollowedUserResponse {
    pub fn new(
        FollowedUser {
            id,
            username,
            followed_at,
        }: FollowedUser,
    ) -> Self {
        FollowedUserResponse {
            id,
            username,
            followed_at: followed_at.to_string(),
        }
    }
}

// ----------------- Admin Responses -----------------

#[derive(Deserialize, Serialize, Debug)]
pub struct AdminUserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub registered_at: String,
}

impl AdminUserResponse {
    pub fn new(
        UserWithRole {
            id,
            username,
            email,
            role_name,
            created_at,
        }: UserWithRole,
    ) -> Self {
        AdminUserResponse {
            id,
            username,
            email,
            role: role_name,
            registered_at: created_at.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct AdminCommentResponse {
    pub id: i64,
    pub content: String,
    pub author_username: String,
    pub chapter_id: i64,
    pub chapter_title: String,
    pub created_at: String,
}

impl AdminCommentResponse {
    pub fn new(
        CommentAdminRow {
            id,
            content,
            author_username,
            chapter_id,
            chapter_title,
            created_at,
        }: CommentAdminRow,
    ) -> Self {
        AdminCommentResponse {
            id,
            content,
            author_username,
            chapter_id,
            chapter_title,
            created_at: created_at.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct AdminReviewResponse {
    pub id: i64,
    pub score: i64,
    pub body: String,
    pub author_username: String,
    pub novel_id: i64,
    pub novel_title: String,
    pub created_at: String,
}

impl AdminReviewResponse {
    pub fn new(
        ReviewAdminRow {
            id,
            score,
            body,
            author_username,
            novel_id,
            novel_title,
            created_at,
        }: ReviewAdminRow,
    ) -> Self {
        AdminReviewResponse {
            id,
            score,
            body,
            author_username,
            novel_id,
            novel_title,
            created_at: created_at.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RoleResponse {
    pub id: i64,
    pub name: String,
}

impl RoleResponse {
    pub fn new(Role { id, name }: Role) -> Self {
        RoleResponse { id, name }
    }
}

// ----------------- Dashboard Responses -----------------

#[derive(Deserialize, Serialize, Debug)]
pub struct MonthCountResponse {
    pub month: String,
    pub count: i64,
}

impl MonthCountResponse {
    pub fn new(MonthCount { month, count }: MonthCount) -> Self {
        MonthCountResponse { month, count }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct StatusCountResponse {
    pub status: String,
    pub count: i64,
}

impl StatusCountResponse {
    pub fn new(StatusCount { status, count }: StatusCount) -> Self {
        StatusCountResponse { status, count }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct TopNovelResponse {
    pub id: i64,
    pub title: String,
    pub chapter_count: i64,
}

impl TopNovelResponse {
    pub fn new(
        TopNovelRow {
            id,
            title,
            chapter_count,
        }: TopNovelRow,
    ) -> Self {
        TopNovelResponse {
            id,
            title,
            chapter_count,
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RecentUserResponse {
    pub id: i64,
    pub username: String,
    pub registered_at: String,
}

impl RecentUserResponse {
    pub fn new(
        UserWithRole {
            id,
            username,
            created_at,
            ..
        }: UserWithRole,
    ) -> Self {
        RecentUserResponse {
            id,
            username,
            registered_at: created_at.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct DashboardResponse {
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
    pub monthly_novels: Vec<MonthCountResponse>,
    pub status_counts: Vec<StatusCountResponse>,
    pub top_novels: Vec<TopNovelResponse>,
    pub recent_users: Vec<RecentUserResponse>,
}
