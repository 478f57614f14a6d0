use inkstream_backend::api;
use inkstream_backend::config::{AuthConfig, InkstreamConfig, InkstreamPaths};
use inkstream_backend::database::Database;
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tokio::time::{sleep, Duration};

struct TestServer {
    _dir: TempDir,
    server: tokio::task::JoinHandle<()>,
    base_url: String,
    client: reqwest::Client,
}

impl TestServer {
    async fn start() -> Self {
        let temp = tempdir().expect("tempdir");
        let port = next_port();
        let config = InkstreamConfig::new(
            port,
            InkstreamPaths::from_base_dir(temp.path()).expect("paths"),
            AuthConfig::default(),
        );

        let database = Database::connect(&config.paths).expect("connect");
        database.ensure_migrations().expect("migrations");

        let server = tokio::spawn(async move {
            let _ = api::serve_http(config, database).await;
        });

        let base_url = format!("http://127.0.0.1:{port}");
        wait_for_health(&base_url).await;

        Self {
            _dir: temp,
            server,
            base_url,
            client: reqwest::Client::new(),
        }
    }

    async fn shutdown(self) {
        self.server.abort();
        let _ = self.server.await;
    }

    /// Registers a user and returns (token, user id).
    async fn register(&self, name: &str, email: &str) -> (String, String) {
        let resp = self
            .client
            .post(format!("{}/auth/register", self.base_url))
            .json(&json!({
                "name": name,
                "username": name,
                "email": email,
                "password": "secret123",
            }))
            .send()
            .await
            .expect("register request");
        assert_eq!(resp.status(), 201, "register {name}");
        let body: Value = resp.json().await.expect("register body");
        (
            body["token"].as_str().expect("token").to_string(),
            body["user"]["id"].as_str().expect("user id").to_string(),
        )
    }

    async fn create_post(&self, token: &str, title: &str) -> String {
        let resp = self
            .client
            .post(format!("{}/posts", self.base_url))
            .bearer_auth(token)
            .json(&json!({ "title": title, "body": "body text" }))
            .send()
            .await
            .expect("create post request");
        assert_eq!(resp.status(), 201, "create post");
        let body: Value = resp.json().await.expect("post body");
        body["id"].as_str().expect("post id").to_string()
    }
}

fn next_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .expect("bind ephemeral port")
        .local_addr()
        .unwrap()
        .port()
}

async fn wait_for_health(base_url: &str) {
    let client = reqwest::Client::new();
    for _ in 0..50 {
        if let Ok(resp) = client.get(format!("{base_url}/health")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        sleep(Duration::from_millis(100)).await;
    }
    panic!("server did not become healthy in time");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn engagement_roundtrip() {
    let server = TestServer::start().await;
    let (alice_token, alice_id) = server.register("alice", "alice@example.com").await;
    let (bob_token, _bob_id) = server.register("bob", "bob@example.com").await;

    let post_id = server.create_post(&alice_token, "First post").await;

    // Bob likes the post; the count comes back and a second like conflicts.
    let resp = server
        .client
        .post(format!("{}/posts/{post_id}/like", server.base_url))
        .bearer_auth(&bob_token)
        .send()
        .await
        .expect("like");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("like body");
    assert_eq!(body["likesCount"], 1);

    let resp = server
        .client
        .post(format!("{}/posts/{post_id}/like", server.base_url))
        .bearer_auth(&bob_token)
        .send()
        .await
        .expect("double like");
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("conflict body");
    assert_eq!(body["error"], "Post already liked");

    // Bob comments.
    let resp = server
        .client
        .post(format!("{}/posts/{post_id}/comments", server.base_url))
        .bearer_auth(&bob_token)
        .json(&json!({ "text": "hello" }))
        .send()
        .await
        .expect("comment");
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.expect("comment body");
    assert_eq!(body["commentsCount"], 1);
    assert_eq!(body["comment"]["text"], "hello");

    // Alice sees both notifications, newest first, none from herself.
    let resp = server
        .client
        .get(format!("{}/notifications", server.base_url))
        .bearer_auth(&alice_token)
        .send()
        .await
        .expect("notifications");
    assert_eq!(resp.status(), 200);
    let inbox: Value = resp.json().await.expect("inbox");
    assert_eq!(inbox["unreadCount"], 2);
    let items = inbox["notifications"].as_array().expect("items");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["type"], "comment");
    assert_eq!(items[0]["commentExcerpt"], "hello");
    assert_eq!(items[1]["type"], "like");
    assert_eq!(items[1]["post"]["title"], "First post");

    // Reading one leaves one unread.
    let first_id = items[0]["id"].as_str().expect("notification id");
    let resp = server
        .client
        .put(format!(
            "{}/notifications/{first_id}/read",
            server.base_url
        ))
        .bearer_auth(&alice_token)
        .send()
        .await
        .expect("mark read");
    assert_eq!(resp.status(), 200);

    let inbox: Value = server
        .client
        .get(format!("{}/notifications?unreadOnly=true", server.base_url))
        .bearer_auth(&alice_token)
        .send()
        .await
        .expect("unread list")
        .json()
        .await
        .expect("unread body");
    assert_eq!(inbox["unreadCount"], 1);
    assert_eq!(inbox["notifications"].as_array().expect("items").len(), 1);

    // The public feed shows the post with its counts.
    let feed: Value = server
        .client
        .get(format!("{}/posts", server.base_url))
        .send()
        .await
        .expect("feed")
        .json()
        .await
        .expect("feed body");
    assert_eq!(feed["total"], 1);
    assert_eq!(feed["data"][0]["likesCount"], 1);
    assert_eq!(feed["data"][0]["commentsCount"], 1);
    assert_eq!(feed["data"][0]["author"]["id"], alice_id.as_str());

    server.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn follow_lifecycle_over_http() {
    let server = TestServer::start().await;
    let (alice_token, alice_id) = server.register("alice2", "alice2@example.com").await;
    let (bob_token, _bob_id) = server.register("bob2", "bob2@example.com").await;

    // Bob follows Alice.
    let resp = server
        .client
        .post(format!("{}/users/{alice_id}/follow", server.base_url))
        .bearer_auth(&bob_token)
        .send()
        .await
        .expect("follow");
    assert_eq!(resp.status(), 200);
    let status: Value = resp.json().await.expect("follow body");
    assert_eq!(status["followersCount"], 1);
    assert_eq!(status["isFollowing"], true);

    // Alice's profile reflects the relation from Bob's point of view.
    let profile: Value = server
        .client
        .get(format!("{}/users/{alice_id}", server.base_url))
        .bearer_auth(&bob_token)
        .send()
        .await
        .expect("profile")
        .json()
        .await
        .expect("profile body");
    assert_eq!(profile["followersCount"], 1);
    assert_eq!(profile["isFollowing"], true);

    // Alice got exactly one follow notification.
    let inbox: Value = server
        .client
        .get(format!("{}/notifications", server.base_url))
        .bearer_auth(&alice_token)
        .send()
        .await
        .expect("inbox")
        .json()
        .await
        .expect("inbox body");
    assert_eq!(inbox["unreadCount"], 1);
    assert_eq!(inbox["notifications"][0]["type"], "follow");

    // Self-follow is rejected.
    let resp = server
        .client
        .post(format!("{}/users/{alice_id}/follow", server.base_url))
        .bearer_auth(&alice_token)
        .send()
        .await
        .expect("self follow");
    assert_eq!(resp.status(), 400);

    // Unfollow retracts the notification.
    let resp = server
        .client
        .post(format!("{}/users/{alice_id}/unfollow", server.base_url))
        .bearer_auth(&bob_token)
        .send()
        .await
        .expect("unfollow");
    assert_eq!(resp.status(), 200);
    let status: Value = resp.json().await.expect("unfollow body");
    assert_eq!(status["followersCount"], 0);
    assert_eq!(status["isFollowing"], false);

    let inbox: Value = server
        .client
        .get(format!("{}/notifications", server.base_url))
        .bearer_auth(&alice_token)
        .send()
        .await
        .expect("inbox after unfollow")
        .json()
        .await
        .expect("inbox body");
    assert_eq!(inbox["unreadCount"], 0);
    assert_eq!(inbox["notifications"].as_array().expect("items").len(), 0);

    server.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn auth_is_enforced() {
    let server = TestServer::start().await;

    // Unauthenticated writes are rejected.
    let resp = server
        .client
        .post(format!("{}/posts", server.base_url))
        .json(&json!({ "title": "t", "body": "b" }))
        .send()
        .await
        .expect("anonymous post");
    assert_eq!(resp.status(), 401);

    let (token, _id) = server.register("carol", "carol@example.com").await;

    // Wrong password fails with 401, correct one succeeds.
    let resp = server
        .client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "emailOrUsername": "carol@example.com", "password": "wrong" }))
        .send()
        .await
        .expect("bad login");
    assert_eq!(resp.status(), 401);

    let resp = server
        .client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "emailOrUsername": "carol@example.com", "password": "secret123" }))
        .send()
        .await
        .expect("login");
    assert_eq!(resp.status(), 200);

    // Duplicate registration conflicts.
    let resp = server
        .client
        .post(format!("{}/auth/register", server.base_url))
        .json(&json!({
            "name": "carol",
            "email": "carol@example.com",
            "password": "secret123",
        }))
        .send()
        .await
        .expect("duplicate register");
    assert_eq!(resp.status(), 400);

    // Admin routes are forbidden for regular users.
    let resp = server
        .client
        .get(format!("{}/admin/stats", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .expect("admin stats");
    assert_eq!(resp.status(), 403);

    server.shutdown().await;
}
