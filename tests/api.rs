use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use novelry::{
    CreateChapterRequest, CreateNovelRequest, LoginRequest, RegisterRequest, SessionResponse,
};
use serde_json::{json, Value};

static DB_COUNTER: AtomicU32 = AtomicU32::new(0);

const CSRF_HEADER: &str = "x-csrf-token";

struct TestApp {
    base: String,
    db_url: String,
}

/// A signed-in client: cookie jar plus the session's anti-forgery token.
struct Session {
    base: String,
    client: reqwest::Client,
    csrf: String,
    user_id: i64,
}

fn unique_db_url() -> String {
    let n = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!("novelry-test-{}-{}.db", std::process::id(), n));
    let _ = std::fs::remove_file(&path);
    format!("sqlite:{}", path.display())
}

fn new_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

async fn spawn_app() -> TestApp {
    std::env::set_var("JWT_SECRET", "integration-test-secret");
    let db_url = unique_db_url();
    let (_, addr) = novelry::get_random_free_port();
    let router = novelry::make_router();
    {
        let db_url = db_url.clone();
        tokio::spawn(async move {
            novelry::run_app(router, addr, &db_url).await.unwrap();
        });
    }

    let base = format!("http://{addr}");
    let probe = reqwest::Client::new();
    for _ in 0..50 {
        if let Ok(response) = probe.get(format!("{base}/check_health")).send().await {
            if response.status().is_success() {
                return TestApp { base, db_url };
            }
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("server did not come up");
}

impl TestApp {
    async fn register(&self, username: &str, email: &str) -> Session {
        let client = new_client();
        let response = client
            .post(format!("{}/auth/register", self.base))
            .json(&RegisterRequest {
                username: username.to_string(),
                email: email.to_string(),
                password: "secret-password".to_string(),
            })
            .send()
            .await
            .unwrap();
        assert!(
            response.status().is_success(),
            "registration failed: {}",
            response.status()
        );
        let session: SessionResponse = response.json().await.unwrap();
        Session {
            base: self.base.clone(),
            client,
            csrf: session.csrf_token,
            user_id: session.id,
        }
    }

    /// Registers a user, flips their role in the store, and signs in again so
    /// the session claims pick up the new role.
    async fn register_staff(&self, username: &str, email: &str, role: &str) -> Session {
        let session = self.register(username, email).await;
        let pool = sqlx::SqlitePool::connect(&self.db_url).await.unwrap();
        sqlx::query(
            "UPDATE users SET role_id = (SELECT id FROM roles WHERE name = $1) WHERE username = $2",
        )
        .bind(role)
        .bind(username)
        .execute(&pool)
        .await
        .unwrap();

        let response = session
            .client
            .post(format!("{}/auth/login", self.base))
            .header(CSRF_HEADER, &session.csrf)
            .json(&LoginRequest {
                email: email.to_string(),
                password: "secret-password".to_string(),
            })
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
        let refreshed: SessionResponse = response.json().await.unwrap();
        assert_eq!(refreshed.role, role);
        Session {
            base: self.base.clone(),
            client: session.client,
            csrf: refreshed.csrf_token,
            user_id: refreshed.id,
        }
    }
}

impl Session {
    async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.base, path))
            .send()
            .await
            .unwrap()
    }

    async fn post(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.base, path))
            .header(CSRF_HEADER, &self.csrf)
            .json(body)
            .send()
            .await
            .unwrap()
    }

    async fn put(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .put(format!("{}{}", self.base, path))
            .header(CSRF_HEADER, &self.csrf)
            .json(body)
            .send()
            .await
            .unwrap()
    }

    async fn delete(&self, path: &str) -> reqwest::Response {
        self.client
            .delete(format!("{}{}", self.base, path))
            .header(CSRF_HEADER, &self.csrf)
            .send()
            .await
            .unwrap()
    }

    async fn create_tag(&self, name: &str) -> i64 {
        let response = self.post("/tags", &json!({ "name": name })).await;
        assert!(response.status().is_success(), "creating tag {name} failed");
        response.json::<Value>().await.unwrap()["id"].as_i64().unwrap()
    }

    async fn create_novel(&self, title: &str, tag_ids: &[i64], chapter_content: &str) -> i64 {
        let response = self
            .client
            .post(format!("{}/novels", self.base))
            .header(CSRF_HEADER, &self.csrf)
            .json(&CreateNovelRequest {
                title: title.to_string(),
                synopsis: Some("A story.".to_string()),
                cover_url: None,
                genre: Some("Fantasy".to_string()),
                status: "Ongoing".to_string(),
                tag_ids: tag_ids.to_vec(),
                first_chapter_title: "Intro".to_string(),
                first_chapter_content: chapter_content.to_string(),
            })
            .send()
            .await
            .unwrap();
        assert!(
            response.status().is_success(),
            "creating novel {title} failed: {}",
            response.status()
        );
        response.json::<Value>().await.unwrap()["id"].as_i64().unwrap()
    }

    async fn add_chapter(&self, novel_id: i64, number: i64, content: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/novels/{novel_id}/chapters", self.base))
            .header(CSRF_HEADER, &self.csrf)
            .json(&CreateChapterRequest {
                number,
                title: format!("Chapter {number}"),
                content: content.to_string(),
            })
            .send()
            .await
            .unwrap()
    }
}

async fn staff_with_tag(app: &TestApp) -> (Session, i64) {
    let staff = app
        .register_staff("librarian", "librarian@example.com", "Administrator")
        .await;
    let tag_id = staff.create_tag("Fantasy").await;
    (staff, tag_id)
}

// ----------------- Identity -----------------

#[tokio::test]
async fn registering_the_same_username_or_email_twice_conflicts() {
    let app = spawn_app().await;
    app.register("ana", "ana@x.com").await;

    let client = new_client();
    let response = client
        .post(format!("{}/auth/register", app.base))
        .json(&json!({ "username": "ana", "email": "other@x.com", "password": "pw-123456" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    let response = client
        .post(format!("{}/auth/register", app.base))
        .json(&json!({ "username": "other", "email": "ana@x.com", "password": "pw-123456" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn login_with_wrong_credentials_is_generic() {
    let app = spawn_app().await;
    app.register("ana", "ana@x.com").await;

    let client = new_client();
    let wrong_password = client
        .post(format!("{}/auth/login", app.base))
        .json(&json!({ "email": "ana@x.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    let unknown_email = client
        .post(format!("{}/auth/login", app.base))
        .json(&json!({ "email": "nobody@x.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong_password.status(), 401);
    assert_eq!(unknown_email.status(), 401);
    let a: Value = wrong_password.json().await.unwrap();
    let b: Value = unknown_email.json().await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn mutations_without_the_csrf_token_are_rejected() {
    let app = spawn_app().await;
    let session = app.register("ana", "ana@x.com").await;

    // Same cookie jar, no token header.
    let response = session
        .client
        .post(format!("{}/lists", app.base))
        .json(&json!({ "name": "Favorites" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}

// ----------------- Catalog & Reading -----------------

#[tokio::test]
async fn scenario_a_register_create_novel_and_see_word_count() {
    let app = spawn_app().await;
    let (_, tag_id) = staff_with_tag(&app).await;

    let ana = app.register("ana", "ana@x.com").await;
    let novel_id = ana.create_novel("Dawn", &[tag_id], "Hello world").await;

    let detail: Value = ana
        .get(&format!("/novels/{novel_id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(detail["total_words"], 2);
    assert_eq!(detail["title"], "Dawn");
    assert_eq!(detail["author"]["username"], "ana");
    assert_eq!(detail["tags"][0]["name"], "Fantasy");
    assert_eq!(detail["chapters"]["items"][0]["number"], 1);
    assert_eq!(detail["chapters"]["items"][0]["words"], 2);
}

#[tokio::test]
async fn creating_a_novel_requires_a_tag() {
    let app = spawn_app().await;
    let ana = app.register("ana", "ana@x.com").await;

    let response = ana
        .post(
            "/novels",
            &json!({
                "title": "Dawn",
                "status": "Ongoing",
                "tag_ids": [],
                "first_chapter_title": "Intro",
                "first_chapter_content": "Hello world"
            }),
        )
        .await;
    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn scenario_c_chapter_numbers_are_strictly_sequential() {
    let app = spawn_app().await;
    let (_, tag_id) = staff_with_tag(&app).await;
    let ana = app.register("ana", "ana@x.com").await;
    let novel_id = ana.create_novel("Dawn", &[tag_id], "Hello world").await;

    // Chapter 1 exists from creation.
    let duplicate = ana.add_chapter(novel_id, 1, "again").await;
    assert_eq!(duplicate.status(), 409);
    let duplicate_body: Value = duplicate.json().await.unwrap();
    assert!(duplicate_body["errors"]["body"][0]
        .as_str()
        .unwrap()
        .contains("Duplicate"));

    let out_of_sequence = ana.add_chapter(novel_id, 3, "too far ahead").await;
    assert_eq!(out_of_sequence.status(), 409);
    let sequence_body: Value = out_of_sequence.json().await.unwrap();
    assert!(sequence_body["errors"]["body"][0]
        .as_str()
        .unwrap()
        .contains("out of sequence"));

    let accepted = ana.add_chapter(novel_id, 2, "the next part").await;
    assert!(accepted.status().is_success());

    let detail: Value = ana
        .get(&format!("/novels/{novel_id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(detail["chapters"]["total"], 2);
}

#[tokio::test]
async fn total_word_count_tracks_chapter_writes() {
    let app = spawn_app().await;
    let (_, tag_id) = staff_with_tag(&app).await;
    let ana = app.register("ana", "ana@x.com").await;
    let novel_id = ana.create_novel("Dawn", &[tag_id], "Hello world").await; // 2 words

    let response = ana.add_chapter(novel_id, 2, "one two three").await; // 3 words
    assert!(response.status().is_success());
    let chapter: Value = response.json().await.unwrap();
    let chapter_id = chapter["id"].as_i64().unwrap();

    let detail: Value = ana
        .get(&format!("/novels/{novel_id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(detail["total_words"], 5);

    let response = ana
        .put(
            &format!("/chapters/{chapter_id}"),
            &json!({ "content": "a b c d e" }), // 5 words
        )
        .await;
    assert!(response.status().is_success());

    let detail: Value = ana
        .get(&format!("/novels/{novel_id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(detail["total_words"], 7);

    let response = ana.delete(&format!("/chapters/{chapter_id}")).await;
    assert!(response.status().is_success());
    let detail: Value = ana
        .get(&format!("/novels/{novel_id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(detail["total_words"], 2);
}

#[tokio::test]
async fn only_the_author_may_touch_chapters() {
    let app = spawn_app().await;
    let (_, tag_id) = staff_with_tag(&app).await;
    let ana = app.register("ana", "ana@x.com").await;
    let novel_id = ana.create_novel("Dawn", &[tag_id], "Hello world").await;

    let rival = app.register("rival", "rival@x.com").await;
    let response = rival.add_chapter(novel_id, 2, "mine now").await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn chapter_detail_links_previous_and_next() {
    let app = spawn_app().await;
    let (_, tag_id) = staff_with_tag(&app).await;
    let ana = app.register("ana", "ana@x.com").await;
    let novel_id = ana.create_novel("Dawn", &[tag_id], "Hello world").await;
    let second: Value = ana
        .add_chapter(novel_id, 2, "more words here")
        .await
        .json()
        .await
        .unwrap();
    let second_id = second["id"].as_i64().unwrap();

    let detail: Value = ana
        .get(&format!("/chapters/{second_id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(detail["number"], 2);
    assert_eq!(detail["novel_title"], "Dawn");
    assert!(detail["previous_chapter_id"].as_i64().is_some());
    assert!(detail["next_chapter_id"].is_null());

    let first_id = detail["previous_chapter_id"].as_i64().unwrap();
    let first: Value = ana
        .get(&format!("/chapters/{first_id}"))
        .await
        .json()
        .await
        .unwrap();
    assert!(first["previous_chapter_id"].is_null());
    assert_eq!(first["next_chapter_id"].as_i64(), Some(second_id));
}

#[tokio::test]
async fn listing_pages_clamp_and_filter() {
    let app = spawn_app().await;
    let (_, tag_id) = staff_with_tag(&app).await;
    let ana = app.register("ana", "ana@x.com").await;
    for title in ["Alpha", "Beta", "Gamma"] {
        ana.create_novel(title, &[tag_id], "Hello world").await;
    }

    let listing: Value = ana
        .get("/novels?page=99&page_size=2")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(listing["total"], 3);
    assert_eq!(listing["total_pages"], 2);
    assert_eq!(listing["page"], 2);
    assert_eq!(listing["items"].as_array().unwrap().len(), 1);

    let search: Value = ana
        .get("/novels?search=bet")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(search["total"], 1);
    assert_eq!(search["items"][0]["title"], "Beta");

    // Nothing reviewed yet, so a rating floor filters everything out but
    // still reports one (empty) page.
    let rated: Value = ana
        .get("/novels?min_rating=3")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(rated["total"], 0);
    assert_eq!(rated["total_pages"], 1);

    let featured: Value = ana.get("/novels/featured").await.json().await.unwrap();
    assert_eq!(featured.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn logout_drops_the_session() {
    let app = spawn_app().await;
    let ana = app.register("ana", "ana@x.com").await;

    let response = ana.get("/bookmarks").await;
    assert!(response.status().is_success());

    let response = ana.post("/auth/logout", &json!({})).await;
    assert!(response.status().is_success());

    let response = ana.get("/bookmarks").await;
    assert_eq!(response.status(), 401);
}

// ----------------- Engagement -----------------

#[tokio::test]
async fn scenario_b_one_review_per_user_per_novel() {
    let app = spawn_app().await;
    let (_, tag_id) = staff_with_tag(&app).await;
    let author = app.register("author", "author@x.com").await;
    let novel_id = author.create_novel("Dawn", &[tag_id], "Hello world").await;

    let ana = app.register("ana", "ana@x.com").await;
    let first = ana
        .post(
            &format!("/novels/{novel_id}/reviews"),
            &json!({ "score": 4, "body": "Lovely." }),
        )
        .await;
    assert!(first.status().is_success());

    let second = ana
        .post(
            &format!("/novels/{novel_id}/reviews"),
            &json!({ "score": 5, "body": "Changed my mind." }),
        )
        .await;
    assert_eq!(second.status(), 409);

    let detail: Value = ana
        .get(&format!("/novels/{novel_id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(detail["reviews"].as_array().unwrap().len(), 1);
    assert_eq!(detail["reviews"][0]["score"], 4);
}

#[tokio::test]
async fn review_score_and_body_are_validated() {
    let app = spawn_app().await;
    let (_, tag_id) = staff_with_tag(&app).await;
    let author = app.register("author", "author@x.com").await;
    let novel_id = author.create_novel("Dawn", &[tag_id], "Hello world").await;
    let ana = app.register("ana", "ana@x.com").await;

    for body in [
        json!({ "score": 0, "body": "Too low." }),
        json!({ "score": 6, "body": "Too high." }),
        json!({ "score": 3, "body": "   " }),
    ] {
        let response = ana
            .post(&format!("/novels/{novel_id}/reviews"), &body)
            .await;
        assert_eq!(response.status(), 422);
    }
}

#[tokio::test]
async fn follow_and_unfollow_are_idempotent() {
    let app = spawn_app().await;
    let (_, tag_id) = staff_with_tag(&app).await;
    let author = app.register("author", "author@x.com").await;
    let novel_id = author.create_novel("Dawn", &[tag_id], "Hello world").await;

    let ana = app.register("ana", "ana@x.com").await;
    for _ in 0..2 {
        let response = ana
            .post(&format!("/novels/{novel_id}/follow"), &json!({}))
            .await;
        assert!(response.status().is_success());
    }
    let bookmarks: Value = ana.get("/bookmarks").await.json().await.unwrap();
    assert_eq!(bookmarks["total"], 1);

    for _ in 0..2 {
        let response = ana
            .post(&format!("/novels/{novel_id}/unfollow"), &json!({}))
            .await;
        assert!(response.status().is_success());
    }
    let bookmarks: Value = ana.get("/bookmarks").await.json().await.unwrap();
    assert_eq!(bookmarks["total"], 0);
}

#[tokio::test]
async fn recording_progress_is_an_upsert_and_an_implicit_follow() {
    let app = spawn_app().await;
    let (_, tag_id) = staff_with_tag(&app).await;
    let author = app.register("author", "author@x.com").await;
    let novel_id = author.create_novel("Dawn", &[tag_id], "Hello world").await;
    let second: Value = author
        .add_chapter(novel_id, 2, "more")
        .await
        .json()
        .await
        .unwrap();
    let second_id = second["id"].as_i64().unwrap();

    let ana = app.register("ana", "ana@x.com").await;
    let detail: Value = ana
        .get(&format!("/novels/{novel_id}"))
        .await
        .json()
        .await
        .unwrap();
    let first_id = detail["chapters"]["items"][0]["id"].as_i64().unwrap();

    // No follow beforehand: progress creates the row.
    let response = ana
        .post(
            &format!("/novels/{novel_id}/progress"),
            &json!({ "chapter_id": first_id }),
        )
        .await;
    assert!(response.status().is_success());

    let response = ana
        .post(
            &format!("/novels/{novel_id}/progress"),
            &json!({ "chapter_id": second_id }),
        )
        .await;
    let bookmark: Value = response.json().await.unwrap();
    assert_eq!(bookmark["last_chapter_id"].as_i64(), Some(second_id));

    let bookmarks: Value = ana.get("/bookmarks").await.json().await.unwrap();
    assert_eq!(bookmarks["total"], 1);

    let detail: Value = ana
        .get(&format!("/novels/{novel_id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(detail["bookmark"]["last_chapter_id"].as_i64(), Some(second_id));
}

#[tokio::test]
async fn comments_are_validated_and_owner_gated() {
    let app = spawn_app().await;
    let (_, tag_id) = staff_with_tag(&app).await;
    let author = app.register("author", "author@x.com").await;
    let novel_id = author.create_novel("Dawn", &[tag_id], "Hello world").await;
    let detail: Value = author
        .get(&format!("/novels/{novel_id}"))
        .await
        .json()
        .await
        .unwrap();
    let chapter_id = detail["chapters"]["items"][0]["id"].as_i64().unwrap();

    let ana = app.register("ana", "ana@x.com").await;
    let blank = ana
        .post(
            &format!("/chapters/{chapter_id}/comments"),
            &json!({ "content": "   " }),
        )
        .await;
    assert_eq!(blank.status(), 422);

    let created: Value = ana
        .post(
            &format!("/chapters/{chapter_id}/comments"),
            &json!({ "content": "Great opening." }),
        )
        .await
        .json()
        .await
        .unwrap();
    let comment_id = created["id"].as_i64().unwrap();

    let response = author.delete(&format!("/comments/{comment_id}")).await;
    assert_eq!(response.status(), 403);

    let response = ana.delete(&format!("/comments/{comment_id}")).await;
    assert!(response.status().is_success());

    let chapter: Value = ana
        .get(&format!("/chapters/{chapter_id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(chapter["comments"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn lists_hold_each_novel_at_most_once() {
    let app = spawn_app().await;
    let (_, tag_id) = staff_with_tag(&app).await;
    let ana = app.register("ana", "ana@x.com").await;
    let novel_id = ana.create_novel("Dawn", &[tag_id], "Hello world").await;

    let list: Value = ana
        .post("/lists", &json!({ "name": "Favorites" }))
        .await
        .json()
        .await
        .unwrap();
    let list_id = list["id"].as_i64().unwrap();

    for _ in 0..2 {
        let response = ana
            .post(
                &format!("/lists/{list_id}/novels"),
                &json!({ "novel_id": novel_id }),
            )
            .await;
        assert!(response.status().is_success());
    }
    let detail: Value = ana
        .get(&format!("/lists/{list_id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(detail["novels"].as_array().unwrap().len(), 1);

    // Another user cannot see or delete it.
    let rival = app.register("rival", "rival@x.com").await;
    assert_eq!(rival.get(&format!("/lists/{list_id}")).await.status(), 404);
    assert_eq!(rival.delete(&format!("/lists/{list_id}")).await.status(), 404);

    let response = ana
        .delete(&format!("/lists/{list_id}/novels/{novel_id}"))
        .await;
    assert!(response.status().is_success());
    let response = ana.delete(&format!("/lists/{list_id}")).await;
    assert!(response.status().is_success());
    let lists: Value = ana.get("/lists").await.json().await.unwrap();
    assert_eq!(lists.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn users_can_follow_each_other_idempotently() {
    let app = spawn_app().await;
    let ana = app.register("ana", "ana@x.com").await;
    let bea = app.register("bea", "bea@x.com").await;

    for _ in 0..2 {
        let response = ana
            .post(&format!("/users/{}/follow", bea.user_id), &json!({}))
            .await;
        assert!(response.status().is_success());
    }
    let following: Value = ana
        .get(&format!("/users/{}/following", ana.user_id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(following.as_array().unwrap().len(), 1);
    assert_eq!(following[0]["username"], "bea");

    let response = ana
        .post(&format!("/users/{}/follow", ana.user_id), &json!({}))
        .await;
    assert_eq!(response.status(), 422);
}

// ----------------- Tagging & Back Office -----------------

#[tokio::test]
async fn scenario_d_deleting_an_assigned_tag_keeps_the_novel() {
    let app = spawn_app().await;
    let (staff, tag_id) = staff_with_tag(&app).await;
    let ana = app.register("ana", "ana@x.com").await;
    let novel_id = ana.create_novel("Dawn", &[tag_id], "Hello world").await;

    let response = staff.delete(&format!("/admin/tags/{tag_id}")).await;
    assert!(response.status().is_success());

    let detail: Value = ana
        .get(&format!("/novels/{novel_id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(detail["title"], "Dawn");
    assert_eq!(detail["tags"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn tag_names_are_unique_and_staff_only() {
    let app = spawn_app().await;
    let (staff, _) = staff_with_tag(&app).await;

    let duplicate = staff.post("/tags", &json!({ "name": "Fantasy" })).await;
    assert_eq!(duplicate.status(), 409);

    let reader = app.register("ana", "ana@x.com").await;
    let response = reader.post("/tags", &json!({ "name": "Romance" })).await;
    assert_eq!(response.status(), 303);
}

#[tokio::test]
async fn assigning_tags_replaces_the_whole_set() {
    let app = spawn_app().await;
    let (staff, fantasy) = staff_with_tag(&app).await;
    let drama = staff.create_tag("Drama").await;
    let mystery = staff.create_tag("Mystery").await;

    let ana = app.register("ana", "ana@x.com").await;
    let novel_id = ana.create_novel("Dawn", &[fantasy], "Hello world").await;

    let tags: Value = staff
        .put(
            &format!("/novels/{novel_id}/tags"),
            &json!({ "tag_ids": [drama, mystery] }),
        )
        .await
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = tags
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Drama", "Mystery"]);
}

#[tokio::test]
async fn back_office_is_denied_to_readers_with_a_redirect() {
    let app = spawn_app().await;
    let reader = app.register("ana", "ana@x.com").await;

    let response = reader.get("/admin/users").await;
    assert_eq!(response.status(), 303);
    assert_eq!(response.headers()["location"], "/");

    // No session at all gets the same treatment.
    let anonymous = new_client();
    let response = anonymous
        .get(format!("{}/admin/dashboard", app.base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);
}

#[tokio::test]
async fn moderators_can_use_the_back_office() {
    let app = spawn_app().await;
    let moderator = app
        .register_staff("mod", "mod@x.com", "Moderator")
        .await;
    let response = moderator.get("/admin/users").await;
    assert!(response.status().is_success());
}

#[tokio::test]
async fn deleting_a_user_with_content_reports_dependencies() {
    let app = spawn_app().await;
    let (staff, tag_id) = staff_with_tag(&app).await;
    let ana = app.register("ana", "ana@x.com").await;
    let novel_id = ana.create_novel("Dawn", &[tag_id], "Hello world").await;

    let response = staff.delete(&format!("/admin/users/{}", ana.user_id)).await;
    assert_eq!(response.status(), 409);

    // The novel blocks its author's deletion, and its chapters block its own.
    let response = staff.delete(&format!("/admin/novels/{novel_id}")).await;
    assert_eq!(response.status(), 409);

    let response = staff.delete("/admin/users/99999").await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn dashboard_counts_and_exports_reflect_the_data() {
    let app = spawn_app().await;
    let (staff, tag_id) = staff_with_tag(&app).await;
    let ana = app.register("ana", "ana@x.com").await;
    let novel_id = ana.create_novel("Dawn", &[tag_id], "Hello world").await;
    let response = ana.add_chapter(novel_id, 2, "more words").await;
    assert!(response.status().is_success());
    let response = ana
        .post(
            &format!("/novels/{novel_id}/reviews"),
            &json!({ "score": 5, "body": "Great." }),
        )
        .await;
    assert!(response.status().is_success());

    let dashboard: Value = staff.get("/admin/dashboard").await.json().await.unwrap();
    assert_eq!(dashboard["total_users"], 2);
    assert_eq!(dashboard["total_novels"], 1);
    assert_eq!(dashboard["total_chapters"], 2);
    assert_eq!(dashboard["total_reviews"], 1);
    assert_eq!(dashboard["users_registered_today"], 2);
    assert_eq!(dashboard["novels_last_7_days"], 1);
    assert_eq!(dashboard["top_novels"][0]["title"], "Dawn");
    assert_eq!(dashboard["top_novels"][0]["chapter_count"], 2);
    assert_eq!(dashboard["status_counts"][0]["status"], "Ongoing");
    assert_eq!(dashboard["monthly_novels"].as_array().unwrap().len(), 1);

    let response = staff.get("/admin/dashboard/export.csv").await;
    assert_eq!(response.headers()["content-type"], "text/csv; charset=utf-8");
    let body = response.text().await.unwrap();
    assert!(body.contains("Metric;Value"));
    assert!(body.contains("Total novels;1"));

    let response = staff.get("/admin/users/export.csv").await;
    let body = response.text().await.unwrap();
    assert!(body.starts_with("id;username;email;role;registered"));
    assert!(body.contains("ana"));

    let response = staff.get("/admin/dashboard/export.print").await;
    assert_eq!(
        response.headers()["content-type"],
        "text/html; charset=utf-8"
    );
    let body = response.text().await.unwrap();
    assert!(body.contains("Top 5 novels by chapter count"));
    assert!(body.contains("Dawn"));
}

#[tokio::test]
async fn admin_listings_search_and_paginate() {
    let app = spawn_app().await;
    let (staff, tag_id) = staff_with_tag(&app).await;
    let ana = app.register("ana", "ana@x.com").await;
    let bea = app.register("bea", "bea@x.com").await;
    ana.create_novel("Dawn", &[tag_id], "Hello world").await;
    bea.create_novel("Dusk", &[tag_id], "Good night moon").await;

    let users: Value = staff
        .get("/admin/users?search=ana")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(users["total"], 1);
    assert_eq!(users["items"][0]["username"], "ana");

    let novels: Value = staff
        .get("/admin/novels?search=dusk")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(novels["total"], 1);
    assert_eq!(novels["items"][0]["author_username"], "bea");

    let paged: Value = staff
        .get("/admin/users?page=99&page_size=2")
        .await
        .json()
        .await
        .unwrap();
    // librarian + ana + bea
    assert_eq!(paged["total"], 3);
    assert_eq!(paged["page"], 2);
    assert_eq!(paged["items"].as_array().unwrap().len(), 1);
}
