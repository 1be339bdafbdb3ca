use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::header::{HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::{Extension, Json};
use chrono::Utc;
use sqlx::SqlitePool;

use crate::authentication::StaffUser;
use crate::data_formats::{
    AdminCommentResponse, AdminListParams, AdminReviewResponse, AdminUserResponse,
    DashboardResponse, MessageResponse, MonthCountResponse, NovelResponse, Paginated,
    RecentUserResponse, RoleResponse, StatusCountResponse, TagResponse, TopNovelResponse,
};
use crate::db_helpers::{
    dashboard_metrics_in_db, delete_comment_admin_in_db, delete_novel_in_db,
    delete_review_admin_in_db, delete_role_in_db, delete_tag_in_db, delete_user_admin_in_db,
    list_comments_admin_in_db, list_novels_admin_in_db, list_reviews_admin_in_db,
    list_roles_admin_in_db, list_tags_admin_in_db, list_users_admin_in_db, DashboardMetrics,
};
use crate::errors::RequestError;
use crate::export::{delimited_document, printable_document, PrintSection};
use crate::pagination::Page;

const EXPORT_ALL: i64 = -1;

type DocumentResponse = ([(HeaderName, String); 2], String);

fn csv_response(filename: &str, body: String) -> DocumentResponse {
    (
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
}

fn html_response(body: String) -> DocumentResponse {
    (
        [
            (CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, "inline".to_string()),
        ],
        body,
    )
}

fn search_term(params: &AdminListParams) -> Option<&str> {
    params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

// ----------------- Users -----------------

pub async fn admin_list_users(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<AdminListParams>,
) -> Result<Json<Paginated<AdminUserResponse>>, RequestError> {
    let search = search_term(&params);
    let (_, total) = list_users_admin_in_db(&pool, search, 0, 0).await?;
    let page = Page::clamp(total, params.page, params.page_size);
    let (users, _) = list_users_admin_in_db(&pool, search, page.limit(), page.offset()).await?;
    Ok(Json(Paginated::new(
        users.into_iter().map(AdminUserResponse::new).collect(),
        page,
    )))
}

pub async fn admin_delete_user(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, RequestError> {
    delete_user_admin_in_db(&pool, id).await?;
    Ok(Json(MessageResponse::new("User deleted.")))
}

pub async fn admin_export_users(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<AdminListParams>,
) -> Result<DocumentResponse, RequestError> {
    let (users, _) = list_users_admin_in_db(&pool, search_term(&params), EXPORT_ALL, 0).await?;
    let rows: Vec<Vec<String>> = users
        .into_iter()
        .map(|u| {
            vec![
                u.id.to_string(),
                u.username,
                u.email,
                u.role_name,
                u.created_at.to_string(),
            ]
        })
        .collect();
    let body = delimited_document(&["id", "username", "email", "role", "registered"], &rows);
    Ok(csv_response("users.csv", body))
}

// ----------------- Novels -----------------

pub async fn admin_list_novels(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<AdminListParams>,
) -> Result<Json<Paginated<NovelResponse>>, RequestError> {
    let search = search_term(&params);
    let (_, total) = list_novels_admin_in_db(&pool, search, 0, 0).await?;
    let page = Page::clamp(total, params.page, params.page_size);
    let (novels, _) = list_novels_admin_in_db(&pool, search, page.limit(), page.offset()).await?;
    Ok(Json(Paginated::new(
        novels.into_iter().map(NovelResponse::new).collect(),
        page,
    )))
}

pub async fn admin_delete_novel(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, RequestError> {
    delete_novel_in_db(&pool, id).await?;
    Ok(Json(MessageResponse::new("Novel deleted.")))
}

pub async fn admin_export_novels(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<AdminListParams>,
) -> Result<DocumentResponse, RequestError> {
    let (novels, _) = list_novels_admin_in_db(&pool, search_term(&params), EXPORT_ALL, 0).await?;
    let rows: Vec<Vec<String>> = novels
        .into_iter()
        .map(|n| {
            vec![
                n.id.to_string(),
                n.title,
                n.author_username,
                n.genre.unwrap_or_default(),
                n.status,
                n.total_words.to_string(),
                n.chapter_count.to_string(),
                n.review_count.to_string(),
                n.created_at.to_string(),
            ]
        })
        .collect();
    let body = delimited_document(
        &[
            "id",
            "title",
            "author",
            "genre",
            "status",
            "total_words",
            "chapters",
            "reviews",
            "published",
        ],
        &rows,
    );
    Ok(csv_response("novels.csv", body))
}

// ----------------- Comments -----------------

pub async fn admin_list_comments(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<AdminListParams>,
) -> Result<Json<Paginated<AdminCommentResponse>>, RequestError> {
    let search = search_term(&params);
    let (_, total) = list_comments_admin_in_db(&pool, search, 0, 0).await?;
    let page = Page::clamp(total, params.page, params.page_size);
    let (comments, _) =
        list_comments_admin_in_db(&pool, search, page.limit(), page.offset()).await?;
    Ok(Json(Paginated::new(
        comments.into_iter().map(AdminCommentResponse::new).collect(),
        page,
    )))
}

pub async fn admin_delete_comment(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, RequestError> {
    delete_comment_admin_in_db(&pool, id).await?;
    Ok(Json(MessageResponse::new("Comment deleted.")))
}

pub async fn admin_export_comments(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<AdminListParams>,
) -> Result<DocumentResponse, RequestError> {
    let (comments, _) =
        list_comments_admin_in_db(&pool, search_term(&params), EXPORT_ALL, 0).await?;
    let rows: Vec<Vec<String>> = comments
        .into_iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.chapter_title,
                c.author_username,
                c.content,
                c.created_at.to_string(),
            ]
        })
        .collect();
    let body = delimited_document(&["id", "chapter", "author", "content", "posted"], &rows);
    Ok(csv_response("comments.csv", body))
}

// ----------------- Reviews -----------------

pub async fn admin_list_reviews(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<AdminListParams>,
) -> Result<Json<Paginated<AdminReviewResponse>>, RequestError> {
    let search = search_term(&params);
    let (_, total) = list_reviews_admin_in_db(&pool, search, 0, 0).await?;
    let page = Page::clamp(total, params.page, params.page_size);
    let (reviews, _) = list_reviews_admin_in_db(&pool, search, page.limit(), page.offset()).await?;
    Ok(Json(Paginated::new(
        reviews.into_iter().map(AdminReviewResponse::new).collect(),
        page,
    )))
}

pub async fn admin_delete_review(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, RequestError> {
    delete_review_admin_in_db(&pool, id).await?;
    Ok(Json(MessageResponse::new("Review deleted.")))
}

pub async fn admin_export_reviews(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<AdminListParams>,
) -> Result<DocumentResponse, RequestError> {
    let (reviews, _) = list_reviews_admin_in_db(&pool, search_term(&params), EXPORT_ALL, 0).await?;
    let rows: Vec<Vec<String>> = reviews
        .into_iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.novel_title,
                r.author_username,
                r.score.to_string(),
                r.body,
                r.created_at.to_string(),
            ]
        })
        .collect();
    let body = delimited_document(&["id", "novel", "author", "score", "body", "posted"], &rows);
    Ok(csv_response("reviews.csv", body))
}

// ----------------- Tags -----------------

pub async fn admin_list_tags(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<AdminListParams>,
) -> Result<Json<Paginated<TagResponse>>, RequestError> {
    let search = search_term(&params);
    let (_, total) = list_tags_admin_in_db(&pool, search, 0, 0).await?;
    let page = Page::clamp(total, params.page, params.page_size);
    let (tags, _) = list_tags_admin_in_db(&pool, search, page.limit(), page.offset()).await?;
    Ok(Json(Paginated::new(
        tags.into_iter().map(TagResponse::new).collect(),
        page,
    )))
}

pub async fn admin_delete_tag(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, RequestError> {
    delete_tag_in_db(&pool, id).await?;
    Ok(Json(MessageResponse::new("Tag deleted.")))
}

pub async fn admin_export_tags(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<AdminListParams>,
) -> Result<DocumentResponse, RequestError> {
    let (tags, _) = list_tags_admin_in_db(&pool, search_term(&params), EXPORT_ALL, 0).await?;
    let rows: Vec<Vec<String>> = tags
        .into_iter()
        .map(|t| vec![t.id.to_string(), t.name])
        .collect();
    let body = delimited_document(&["id", "name"], &rows);
    Ok(csv_response("tags.csv", body))
}

// ----------------- Roles -----------------

pub async fn admin_list_roles(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<AdminListParams>,
) -> Result<Json<Paginated<RoleResponse>>, RequestError> {
    let search = search_term(&params);
    let (_, total) = list_roles_admin_in_db(&pool, search, 0, 0).await?;
    let page = Page::clamp(total, params.page, params.page_size);
    let (roles, _) = list_roles_admin_in_db(&pool, search, page.limit(), page.offset()).await?;
    Ok(Json(Paginated::new(
        roles.into_iter().map(RoleResponse::new).collect(),
        page,
    )))
}

pub async fn admin_delete_role(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, RequestError> {
    delete_role_in_db(&pool, id).await?;
    Ok(Json(MessageResponse::new("Role deleted.")))
}

pub async fn admin_export_roles(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<AdminListParams>,
) -> Result<DocumentResponse, RequestError> {
    let (roles, _) = list_roles_admin_in_db(&pool, search_term(&params), EXPORT_ALL, 0).await?;
    let rows: Vec<Vec<String>> = roles
        .into_iter()
        .map(|r| vec![r.id.to_string(), r.name])
        .collect();
    let body = delimited_document(&["id", "name"], &rows);
    Ok(csv_response("roles.csv", body))
}

// ----------------- Dashboard -----------------

fn dashboard_response(metrics: DashboardMetrics) -> DashboardResponse {
    DashboardResponse {
        total_users: metrics.total_users,
        total_novels: metrics.total_novels,
        total_chapters: metrics.total_chapters,
        total_comments: metrics.total_comments,
        total_reviews: metrics.total_reviews,
        total_tags: metrics.total_tags,
        users_registered_today: metrics.users_registered_today,
        novels_last_7_days: metrics.novels_last_7_days,
        comments_today: metrics.comments_today,
        reviews_last_7_days: metrics.reviews_last_7_days,
        monthly_novels: metrics
            .monthly_novels
            .into_iter()
            .map(MonthCountResponse::new)
            .collect(),
        status_counts: metrics
            .status_counts
            .into_iter()
            .map(StatusCountResponse::new)
            .collect(),
        top_novels: metrics
            .top_novels
            .into_iter()
            .map(TopNovelResponse::new)
            .collect(),
        recent_users: metrics
            .recent_users
            .into_iter()
            .map(RecentUserResponse::new)
            .collect(),
    }
}

fn metric_rows(metrics: &DashboardMetrics) -> Vec<Vec<String>> {
    vec![
        vec!["Total users".to_string(), metrics.total_users.to_string()],
        vec!["Total novels".to_string(), metrics.total_novels.to_string()],
        vec![
            "Total chapters".to_string(),
            metrics.total_chapters.to_string(),
        ],
        vec![
            "Total comments".to_string(),
            metrics.total_comments.to_string(),
        ],
        vec![
            "Total reviews".to_string(),
            metrics.total_reviews.to_string(),
        ],
        vec!["Total tags".to_string(), metrics.total_tags.to_string()],
        vec![
            "Users registered today".to_string(),
            metrics.users_registered_today.to_string(),
        ],
        vec![
            "Novels created last 7 days".to_string(),
            metrics.novels_last_7_days.to_string(),
        ],
        vec![
            "Comments today".to_string(),
            metrics.comments_today.to_string(),
        ],
        vec![
            "Reviews last 7 days".to_string(),
            metrics.reviews_last_7_days.to_string(),
        ],
    ]
}

pub async fn admin_dashboard(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> Result<Json<DashboardResponse>, RequestError> {
    let metrics = dashboard_metrics_in_db(&pool, Utc::now().naive_utc()).await?;
    Ok(Json(dashboard_response(metrics)))
}

pub async fn admin_export_dashboard_csv(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> Result<DocumentResponse, RequestError> {
    let metrics = dashboard_metrics_in_db(&pool, Utc::now().naive_utc()).await?;
    let body = delimited_document(&["Metric", "Value"], &metric_rows(&metrics));
    Ok(csv_response("dashboard.csv", body))
}

pub async fn admin_export_dashboard_print(
    StaffUser(_): StaffUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> Result<DocumentResponse, RequestError> {
    let now = Utc::now().naive_utc();
    let metrics = dashboard_metrics_in_db(&pool, now).await?;

    let top_rows: Vec<Vec<String>> = metrics
        .top_novels
        .iter()
        .enumerate()
        .map(|(i, n)| {
            vec![
                (i + 1).to_string(),
                n.title.clone(),
                n.chapter_count.to_string(),
            ]
        })
        .collect();
    let recent_rows: Vec<Vec<String>> = metrics
        .recent_users
        .iter()
        .map(|u| vec![u.username.clone(), u.created_at.to_string()])
        .collect();

    let sections = [
        PrintSection {
            title: "General metrics".to_string(),
            headers: vec!["Metric".to_string(), "Value".to_string()],
            rows: metric_rows(&metrics),
        },
        PrintSection {
            title: "Top 5 novels by chapter count".to_string(),
            headers: vec!["#".to_string(), "Novel".to_string(), "Chapters".to_string()],
            rows: top_rows,
        },
        PrintSection {
            title: "Most recent users".to_string(),
            headers: vec!["Username".to_string(), "Registered".to_string()],
            rows: recent_rows,
        },
    ];
    let body = printable_document("Dashboard report", &now.to_string(), &sections);
    Ok(html_response(body))
}
