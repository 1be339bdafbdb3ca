mod request;
mod response;

pub use request::*;
pub use response::*;

use serde::{Deserialize, Serialize};

use crate::pagination::Page;

#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: Page) -> Self {
        Paginated {
            items,
            total: page.total,
            page: page.page,
            total_pages: page.total_pages,
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct NovelQueryParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub min_rating: Option<f64>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ChapterPageParams {
    #[serde(default = "default_page")]
    pub chapter_page: i64,
    #[serde(default = "default_page_size")]
    pub chapter_page_size: i64,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct AdminListParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    crate::pagination::DEFAULT_PAGE_SIZE
}
