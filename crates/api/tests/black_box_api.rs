use std::net::SocketAddr;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use kinoteka_auth::{JwtClaims, PrincipalId, Role};
use kinoteka_infra::Settings;
use reqwest::StatusCode;
use serde_json::{Value, json};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod over the in-memory store, on an ephemeral port.
        let settings = Settings::from_lookup(|name| match name {
            "JWT_SECRET" => Some(JWT_SECRET.to_string()),
            _ => None,
        })
        .expect("settings");
        let app = kinoteka_api::app::build_app(&settings).await.expect("app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
                .await
                .unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).send().await.unwrap();
        read(res).await
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self.client.post(self.url(path)).json(&body).send().await.unwrap();
        read(res).await
    }

    async fn admin_get(&self, token: &str, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).bearer_auth(token).send().await.unwrap();
        read(res).await
    }

    async fn admin_post(&self, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        read(res).await
    }

    async fn admin_delete(&self, token: &str, path: &str) -> StatusCode {
        self.client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
            .status()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn read(res: reqwest::Response) -> (StatusCode, Value) {
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    let body = serde_json::from_str(&text).unwrap_or(Value::Null);
    (status, body)
}

fn mint_jwt(roles: &[&'static str]) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: PrincipalId::new(),
        roles: roles.iter().map(|r| Role::new(*r)).collect(),
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

struct Catalog {
    category: i64,
    drama: i64,
    comedy: i64,
}

/// Category, two genres and star levels 1..=5.
async fn seed(srv: &TestServer, token: &str) -> Catalog {
    let (status, category) = srv
        .admin_post(token, "/admin/categories", json!({
            "name": "Feature films", "description": "Full-length", "url": "films"
        }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{category}");
    let (_, drama) = srv
        .admin_post(token, "/admin/genres", json!({ "name": "Drama", "description": "d", "url": "drama" }))
        .await;
    let (_, comedy) = srv
        .admin_post(token, "/admin/genres", json!({ "name": "Comedy", "description": "c", "url": "comedy" }))
        .await;
    for value in 1..=5 {
        let (status, _) = srv.admin_post(token, "/admin/rating-stars", json!({ "value": value })).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    Catalog {
        category: category["id"].as_i64().unwrap(),
        drama: drama["id"].as_i64().unwrap(),
        comedy: comedy["id"].as_i64().unwrap(),
    }
}

fn movie_body(title: &str, url: &str, year: i64, genre: i64, category: Option<i64>, draft: bool) -> Value {
    json!({
        "title": title,
        "description": "A movie",
        "poster": "poster.jpg",
        "year": year,
        "country": "Ukraine",
        "genres": [genre],
        "world_premiere": format!("{year}-06-01"),
        "budget": 1000,
        "category": category,
        "url": url,
        "draft": draft,
    })
}

#[tokio::test]
async fn health_is_public_and_admin_requires_a_token() {
    let srv = TestServer::spawn().await;

    let (status, _) = srv.get("/health").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = srv.get("/admin/whoami").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let res = srv
        .client
        .get(srv.url("/admin/whoami"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let (status, body) = srv.admin_get(&mint_jwt(&["editor"]), "/admin/whoami").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["roles"].as_array().unwrap().iter().any(|r| r == "editor"));
    assert!(body["permissions"].as_array().unwrap().iter().any(|p| p == "movie.change"));
}

#[tokio::test]
async fn drafts_stay_hidden_until_published() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(&["admin"]);
    let seeded = seed(&srv, &token).await;

    let (status, movie) = srv
        .admin_post(&token, "/admin/movies", movie_body("Quiet Dawn", "quiet-dawn", 2020, seeded.drama, Some(seeded.category), true))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{movie}");
    assert_eq!(movie["poster_url"], "/media/movies/poster.jpg");
    let id = movie["id"].as_i64().unwrap();

    let (_, list) = srv.get("/movies").await;
    assert!(list["items"].as_array().unwrap().is_empty());
    let (status, _) = srv.get("/movies/quiet-dawn").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, admin_list) = srv.admin_get(&token, "/admin/movies?draft=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(admin_list["items"].as_array().unwrap().len(), 1);

    let (status, outcome) = srv.admin_post(&token, "/admin/movies/publish", json!({ "ids": [id] })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["message"], "1 record updated");

    let (_, list) = srv.get("/movies").await;
    assert_eq!(list["items"].as_array().unwrap().len(), 1);
    assert_eq!(list["sidebar"]["years"], json!([2020]));
    let (status, page) = srv.get("/movies/quiet-dawn").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["movie"]["title"], "Quiet Dawn");
    assert_eq!(page["category"]["name"], "Feature films");
}

#[tokio::test]
async fn filter_is_a_union_of_genres_and_years() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(&["admin"]);
    let c = seed(&srv, &token).await;

    for (title, url, year, genre, draft) in [
        ("Drama 2019", "drama-2019", 2019, c.drama, false),
        ("Comedy 2020", "comedy-2020", 2020, c.comedy, false),
        ("Comedy 2018", "comedy-2018", 2018, c.comedy, false),
        ("Drama 2020", "drama-2020", 2020, c.drama, true),
    ] {
        let (status, body) = srv
            .admin_post(&token, "/admin/movies", movie_body(title, url, year, genre, None, draft))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let (status, body) = srv.get(&format!("/movies/filter?genre={}&year=2020", c.drama)).await;
    assert_eq!(status, StatusCode::OK);
    let mut titles: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["title"].as_str().unwrap())
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["Comedy 2020", "Drama 2019"]);

    let (status, body) = srv.get("/movies/filter?year=twenty").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (_, body) = srv.get("/movies/search?q=COMEDY").await;
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn ratings_are_one_per_address_and_reviews_thread() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(&["admin"]);
    let c = seed(&srv, &token).await;
    let (_, movie) = srv
        .admin_post(&token, "/admin/movies", movie_body("Long Road", "long-road", 2017, c.drama, None, false))
        .await;
    let id = movie["id"].as_i64().unwrap();

    let rate = |star: i64| {
        srv.client
            .post(srv.url("/movies/add-rating"))
            .header("x-forwarded-for", "198.51.100.4, 10.0.0.1")
            .json(&json!({ "movie": id, "star": star }))
            .send()
    };
    assert_eq!(rate(5).await.unwrap().status(), StatusCode::CREATED);
    assert_eq!(rate(2).await.unwrap().status(), StatusCode::OK);
    assert_eq!(rate(9).await.unwrap().status(), StatusCode::BAD_REQUEST);

    let (_, ratings) = srv.admin_get(&token, &format!("/admin/ratings?movie={id}")).await;
    assert_eq!(ratings["items"].as_array().unwrap().len(), 1);

    let (status, root) = srv
        .post(&format!("/movies/review/{id}"), json!({
            "name": "Olena", "email": "olena@example.com", "text": "Great"
        }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{root}");
    let (status, _) = srv
        .post(&format!("/movies/review/{id}"), json!({
            "parent": root["id"], "name": "Taras", "email": "taras@example.com", "text": "Agreed"
        }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = srv
        .post(&format!("/movies/review/{id}"), json!({
            "name": "Olena", "email": "olena@example.com", "text": "x".repeat(5001)
        }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["text"].is_array());

    let res = srv
        .client
        .get(srv.url("/movies/long-road"))
        .header("x-forwarded-for", "198.51.100.4")
        .send()
        .await
        .unwrap();
    let (_, page) = read(res).await;
    assert_eq!(page["current_rating"], 2);
    let reviews = page["reviews"].as_array().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["replies"][0]["name"], "Taras");
    assert_eq!(page["stars"][0]["value"], 5);
}

#[tokio::test]
async fn store_errors_map_to_status_codes() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(&["admin"]);
    let c = seed(&srv, &token).await;

    let (status, _) = srv
        .admin_post(&token, "/admin/movies", movie_body("First", "same-slug", 2001, c.drama, None, false))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = srv
        .admin_post(&token, "/admin/movies", movie_body("Second", "same-slug", 2002, c.drama, None, false))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["url"].is_array());

    let (status, body) = srv
        .admin_post(&token, "/admin/movies", movie_body("Orphan", "orphan", 2003, c.drama, Some(999), false))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "integrity_error");

    let (status, _) = srv.admin_get(&token, "/admin/movies/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_category_keeps_its_movies() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(&["admin"]);
    let c = seed(&srv, &token).await;
    let (_, movie) = srv
        .admin_post(&token, "/admin/movies", movie_body("Kept", "kept", 2010, c.comedy, Some(c.category), false))
        .await;

    let status = srv.admin_delete(&token, &format!("/admin/categories/{}", c.category)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, detail) = srv.admin_get(&token, &format!("/admin/movies/{}", movie["id"])).await;
    assert_eq!(status, StatusCode::OK);
    assert!(detail["movie"]["category"].is_null());
}

#[tokio::test]
async fn roles_limit_admin_actions() {
    let srv = TestServer::spawn().await;
    let admin = mint_jwt(&["admin"]);
    let editor = mint_jwt(&["editor"]);
    let moderator = mint_jwt(&["moderator"]);
    let c = seed(&srv, &admin).await;

    let (status, movie) = srv
        .admin_post(&editor, "/admin/movies", movie_body("By Editor", "by-editor", 2012, c.drama, None, false))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = movie["id"].as_i64().unwrap();

    let status = srv.admin_delete(&editor, &format!("/admin/movies/{id}")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = srv
        .admin_post(&moderator, "/admin/movies", movie_body("By Moderator", "by-moderator", 2012, c.drama, None, false))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = srv.admin_get(&moderator, "/admin/genres").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = srv.admin_get(&moderator, "/admin/reviews").await;
    assert_eq!(status, StatusCode::OK);

    let status = srv.admin_delete(&admin, &format!("/admin/movies/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
