use serde::{Deserialize, Serialize};

// ----------------- Identity Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// ----------------- Novel Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct CreateNovelRequest {
    pub title: String,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    pub tag_ids: Vec<i64>,
    pub first_chapter_title: String,
    pub first_chapter_content: String,
}

fn default_status() -> String {
    "Ongoing".to_string()
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct UpdateNovelRequest {
    pub title: Option<String>,
    pub synopsis: Option<String>,
    pub cover_url: Option<String>,
    pub genre: Option<String>,
    pub status: Option<String>,
}

// ----------------- Chapter Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct CreateChapterRequest {
    pub number: i64,
    pub title: String,
    pub content: String,
}

// Chapter numbers are append-only; edits may not renumber.
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct UpdateChapterRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

// ----------------- Engagement Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct CommentRequest {
    pub content: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ReviewRequest {
    pub score: i64,
    #[serde(default)]
    pub body: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ProgressRequest {
    pub chapter_id: i64,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct CreateListRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ListNovelRequest {
    pub novel_id: i64,
}

// ----------------- Tag Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct TagRequest {
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct AssignTagsRequest {
    pub tag_ids: Vec<i64>,
}
