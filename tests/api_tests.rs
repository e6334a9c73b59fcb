use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use taskdesk::{
    app::build_app,
    config::AppConfig,
    state::AppState,
    store::{MemoryStore, Store},
};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
}

fn spawn_app_with(owner_scoped: bool) -> TestApp {
    let config = AppConfig::from_lookup(|key| {
        let value = match key {
            "IS_DEV_MODE" => "1",
            "JWT_SECRET_KEY" => "test-secret",
            "STORE_BACKEND" => "memory",
            "OWNER_SCOPED_MUTATIONS" if owner_scoped => "true",
            _ => return None,
        };
        Some(value.to_string())
    })
    .expect("test config");

    let store = Arc::new(MemoryStore::new());
    let state = AppState::from_parts(store.clone(), Arc::new(config));
    TestApp {
        router: build_app(state).expect("router"),
        store,
    }
}

fn spawn_app() -> TestApp {
    spawn_app_with(false)
}

impl TestApp {
    async fn call(&self, method: Method, uri: &str, body: Value) -> Value {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn post(&self, uri: &str, body: Value) -> Value {
        self.call(Method::POST, uri, body).await
    }

    async fn delete(&self, uri: &str, body: Value) -> Value {
        self.call(Method::DELETE, uri, body).await
    }

    async fn register(&self, username: &str, password: &str) -> Value {
        self.post(
            "/register-user",
            json!({
                "username": username,
                "password": password,
                "first_name": "Ada",
                "last_name": "Lovelace",
            }),
        )
        .await
    }

    async fn login_token(&self, username: &str, password: &str) -> String {
        let res = self
            .post("/user-login", json!({"username": username, "password": password}))
            .await;
        assert_eq!(res["status"], 1, "{res}");
        res["token"].as_str().expect("token").to_string()
    }

    /// Registers a fresh user and returns a token for it.
    async fn user(&self, username: &str) -> String {
        let res = self.register(username, "pw").await;
        assert_eq!(res["status"], 1, "{res}");
        self.login_token(username, "pw").await
    }
}

fn task_ids(res: &Value) -> Vec<i64> {
    res["tasks"]
        .as_array()
        .expect("tasks array")
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn register_then_login_passes_the_gate() {
    let app = spawn_app();

    let res = app.register("ada", "s3cret").await;
    assert_eq!(res, json!({"status": 1, "msg": "User has been registered successfully"}));

    let res = app
        .post("/user-login", json!({"username": "ada", "password": "s3cret"}))
        .await;
    assert_eq!(res["status"], 1);
    assert_eq!(res["msg"], "User Found");
    let token = res["token"].as_str().unwrap();

    let res = app
        .post("/authorize-user-to-proceed", json!({"token": token}))
        .await;
    assert_eq!(res, json!({"status": 1, "msg": "User authorized"}));

    let res = app.post("/logout", json!({"token": token})).await;
    assert_eq!(res, json!({"status": 1, "msg": "Logged out successfully"}));
}

#[tokio::test]
async fn registration_accepts_zero_and_rejects_empty_strings() {
    let app = spawn_app();

    let res = app
        .post(
            "/register-user",
            json!({"username": "zero", "password": "pw", "first_name": 0, "last_name": "0"}),
        )
        .await;
    assert_eq!(res["status"], 1, "{res}");

    for missing in ["username", "password", "first_name", "last_name"] {
        let mut body = json!({
            "username": format!("user-{missing}"),
            "password": "pw",
            "first_name": "A",
            "last_name": "B",
        });
        body[missing] = json!("");
        let res = app.post("/register-user", body).await;
        assert_eq!(
            res,
            json!({"status": 0, "msg": "An empty value has been received"}),
            "{missing}"
        );
    }

    let res = app
        .post("/register-user", json!({"username": "only"}))
        .await;
    assert_eq!(res["msg"], "An empty value has been received");
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let app = spawn_app();
    assert_eq!(app.register("ada", "pw").await["status"], 1);

    let res = app.register("ada", "other").await;
    assert_eq!(res, json!({"status": 0, "msg": "The username already exists"}));
}

#[tokio::test]
async fn login_failures_are_reported() {
    let app = spawn_app();
    app.register("ada", "right").await;

    let res = app
        .post("/user-login", json!({"username": "ada", "password": "wrong"}))
        .await;
    assert_eq!(res, json!({"status": 0, "msg": "Wrong password"}));

    let res = app
        .post("/user-login", json!({"username": "nobody", "password": "right"}))
        .await;
    assert_eq!(res, json!({"status": 0, "msg": "No such username"}));

    let res = app.post("/user-login", json!({"username": "ada"})).await;
    assert_eq!(res["msg"], "An empty value has been received");
}

#[tokio::test]
async fn gate_rejects_missing_or_garbled_tokens() {
    let app = spawn_app();
    let token = app.user("ada").await;
    let expected = json!({"status": 0, "tokenError": true, "msg": "User is not authorized"});

    let gated: [(Method, &str); 12] = [
        (Method::POST, "/authorize-user-to-proceed"),
        (Method::POST, "/logout"),
        (Method::POST, "/get-user-info"),
        (Method::POST, "/add-category"),
        (Method::POST, "/get-categories"),
        (Method::DELETE, "/delete-category"),
        (Method::POST, "/add-task"),
        (Method::POST, "/get-tasks"),
        (Method::POST, "/complete-task"),
        (Method::DELETE, "/delete-task"),
        (Method::POST, "/undo-task"),
        (Method::POST, "/edit-task"),
    ];
    for (method, uri) in gated {
        let body = json!({"category": "x", "task": "x", "due": "", "id": 1});
        let res = app.call(method.clone(), uri, body).await;
        assert_eq!(res, expected, "{uri} without token");

        let body = json!({"token": "garbled.token.value", "category": "x", "task": "x", "due": "", "id": 1});
        let res = app.call(method.clone(), uri, body).await;
        assert_eq!(res, expected, "{uri} with garbled token");
    }

    let res = app.post("/get-tasks", json!({"token": 12345})).await;
    assert_eq!(res, expected);

    // Nothing was written by the rejected calls.
    let user_id = app.store.find_user_by_username("ada").await.unwrap().unwrap().id;
    assert!(app.store.list_categories(user_id).await.unwrap().is_empty());
    assert!(app.store.list_tasks(user_id).await.unwrap().is_empty());

    let res = app.post("/get-tasks", json!({"token": token})).await;
    assert_eq!(res, json!({"status": 1, "tasks": []}));
}

#[tokio::test]
async fn token_from_another_secret_is_rejected() {
    let app = spawn_app();
    app.user("ada").await;

    let keys = taskdesk::auth::jwt::JwtKeys::new(&taskdesk::config::JwtConfig {
        secret: "not-the-server-secret".into(),
        ttl_minutes: None,
    });
    let forged = keys.sign(1).unwrap();
    let res = app.post("/get-user-info", json!({"token": forged})).await;
    assert_eq!(res["tokenError"], true);
}

#[tokio::test]
async fn user_info_returns_single_row_without_hash() {
    let app = spawn_app();
    let token = app.user("ada").await;

    let res = app.post("/get-user-info", json!({"token": token})).await;
    assert_eq!(res["status"], 1);
    let rows = res["userInfo"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["username"], "ada");
    assert_eq!(rows[0]["first_name"], "Ada");
    assert!(rows[0]["account_created"].is_string());
    assert!(rows[0].get("password").is_none());
}

#[tokio::test]
async fn category_round_trip() {
    let app = spawn_app();
    let token = app.user("ada").await;

    let res = app
        .post("/add-category", json!({"token": token, "category": "home"}))
        .await;
    assert_eq!(res["status"], 1);
    let categories = res["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["category"], "home");
    let id = categories[0]["id"].as_i64().unwrap();

    let res = app.post("/get-categories", json!({"token": token})).await;
    assert_eq!(res["categories"].as_array().unwrap().len(), 1);

    let res = app
        .delete("/delete-category", json!({"token": token, "id": id}))
        .await;
    assert_eq!(res, json!({"status": 1, "categories": []}));

    let res = app
        .delete("/delete-category", json!({"token": token, "id": id}))
        .await;
    assert_eq!(res, json!({"status": 0, "msg": "Unable to delete the category"}));

    let res = app.post("/get-categories", json!({"token": token})).await;
    assert_eq!(res, json!({"status": 1, "categories": []}));

    let res = app
        .post("/add-category", json!({"token": token, "category": ""}))
        .await;
    assert_eq!(res["msg"], "An empty value has been received");
}

#[tokio::test]
async fn add_task_normalises_due() {
    let app = spawn_app();
    let token = app.user("ada").await;

    let res = app
        .post(
            "/add-task",
            json!({"token": token, "category_id": null, "task": "no due", "due": ""}),
        )
        .await;
    assert_eq!(res["status"], 1);
    assert!(res["tasks"][0]["due"].is_null());
    assert_eq!(res["tasks"][0]["status"], "pending");

    let res = app
        .post(
            "/add-task",
            json!({"token": token, "category_id": null, "task": "new year", "due": "2024-01-01T00:00:00Z"}),
        )
        .await;
    assert_eq!(res["tasks"][1]["due"], "2024-01-01T00:00:00Z");

    let res = app
        .post(
            "/add-task",
            json!({"token": token, "task": "bad", "due": "someday"}),
        )
        .await;
    assert_eq!(res, json!({"status": 0, "msg": "Invalid due date"}));
}

#[tokio::test]
async fn due_accepts_millis_fractions_and_space_separator() {
    let app = spawn_app();
    let token = app.user("ada").await;

    for due in [
        json!(1704067200000_i64),
        json!("2024-01-01T00:00:00.000"),
        json!("2024-01-01 00:00:00"),
    ] {
        let res = app
            .post("/add-task", json!({"token": token, "task": "new year", "due": due}))
            .await;
        assert_eq!(res["status"], 1, "{due}");
    }

    let res = app.post("/get-tasks", json!({"token": token})).await;
    let tasks = res["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 3);
    assert!(tasks.iter().all(|t| t["due"] == "2024-01-01T00:00:00Z"));

    let id = tasks[0]["id"].clone();
    let res = app
        .post(
            "/edit-task",
            json!({"token": token, "id": id, "task": "later", "due": "2024-06-30 18:45"}),
        )
        .await;
    assert_eq!(res["tasks"][0]["due"], "2024-06-30T18:45:00Z");
}

#[tokio::test]
async fn malformed_ids_are_refused_not_dropped() {
    let app = spawn_app();
    let token = app.user("ada").await;

    for category_id in [json!("abc"), json!(1.5)] {
        let res = app
            .post(
                "/add-task",
                json!({"token": token, "category_id": category_id, "task": "t"}),
            )
            .await;
        assert_eq!(res, json!({"status": 0, "msg": "Invalid id"}), "{category_id}");
    }
    let res = app.post("/get-tasks", json!({"token": token})).await;
    assert_eq!(res, json!({"status": 1, "tasks": []}));

    let res = app
        .post("/complete-task", json!({"token": token, "id": "seven"}))
        .await;
    assert_eq!(res, json!({"status": 0, "msg": "Invalid id"}));

    let res = app
        .delete("/delete-category", json!({"token": token, "id": ""}))
        .await;
    assert_eq!(res["msg"], "An empty value has been received");
}

#[tokio::test]
async fn deleting_a_category_keeps_its_tasks_uncategorised() {
    let app = spawn_app();
    let token = app.user("ada").await;

    let cat = app
        .post("/add-category", json!({"token": token, "category": "home"}))
        .await;
    let cat_id = cat["categories"][0]["id"].clone();
    let res = app
        .post(
            "/add-task",
            json!({"token": token, "category_id": cat_id, "task": "dishes"}),
        )
        .await;
    assert_eq!(res["tasks"][0]["category_id"], cat_id);

    let res = app
        .delete("/delete-category", json!({"token": token, "id": cat_id}))
        .await;
    assert_eq!(res["status"], 1);

    let res = app.post("/get-tasks", json!({"token": token})).await;
    assert_eq!(res["tasks"].as_array().unwrap().len(), 1);
    assert_eq!(res["tasks"][0]["task"], "dishes");
    assert!(res["tasks"][0]["category_id"].is_null());
}

#[tokio::test]
async fn tasks_are_listed_in_creation_order_and_stable() {
    let app = spawn_app();
    let token = app.user("ada").await;

    let cat = app
        .post("/add-category", json!({"token": token, "category": "work"}))
        .await;
    let cat_id = cat["categories"][0]["id"].clone();

    for text in ["one", "two", "three"] {
        let res = app
            .post(
                "/add-task",
                json!({"token": token, "category_id": cat_id, "task": text, "due": ""}),
            )
            .await;
        assert_eq!(res["status"], 1);
    }

    let first = app.post("/get-tasks", json!({"token": token})).await;
    let second = app.post("/get-tasks", json!({"token": token})).await;
    assert_eq!(first, second);

    let ids = task_ids(&first);
    assert_eq!(ids.len(), 3);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(first["tasks"][0]["task"], "one");
    assert_eq!(first["tasks"][2]["category_id"], cat_id);
}

#[tokio::test]
async fn complete_then_undo_returns_to_pending() {
    let app = spawn_app();
    let token = app.user("ada").await;

    let res = app
        .post("/add-task", json!({"token": token, "task": "laundry", "due": ""}))
        .await;
    let id = res["tasks"][0]["id"].as_i64().unwrap();

    let res = app
        .post("/complete-task", json!({"token": token, "id": id}))
        .await;
    assert_eq!(res["tasks"][0]["status"], "finished");

    let res = app
        .post("/undo-task", json!({"token": token, "id": id.to_string()}))
        .await;
    assert_eq!(res["tasks"][0]["status"], "pending");

    let res = app
        .post("/complete-task", json!({"token": token, "id": 9999}))
        .await;
    assert_eq!(res, json!({"status": 0, "msg": "Unable to update the task"}));

    let res = app.post("/undo-task", json!({"token": token})).await;
    assert_eq!(res["msg"], "An empty value has been received");
}

#[tokio::test]
async fn edit_and_delete_tasks() {
    let app = spawn_app();
    let token = app.user("ada").await;

    let res = app
        .post(
            "/add-task",
            json!({"token": token, "task": "draft", "due": "2024-06-01T09:00:00Z"}),
        )
        .await;
    let id = res["tasks"][0]["id"].as_i64().unwrap();

    let res = app
        .post(
            "/edit-task",
            json!({"token": token, "id": id, "task": "final", "due": ""}),
        )
        .await;
    assert_eq!(res["status"], 1);
    assert_eq!(res["tasks"][0]["task"], "final");
    assert!(res["tasks"][0]["due"].is_null());

    let res = app
        .post(
            "/edit-task",
            json!({"token": token, "id": 424242, "task": "x", "due": ""}),
        )
        .await;
    assert_eq!(res, json!({"status": 0, "msg": "Unable to edit the task"}));

    let res = app.delete("/delete-task", json!({"token": token, "id": id})).await;
    assert_eq!(res, json!({"status": 1, "tasks": []}));

    let res = app.delete("/delete-task", json!({"token": token, "id": id})).await;
    assert_eq!(res, json!({"status": 0, "msg": "Unable to delete the task"}));
}

#[tokio::test]
async fn collections_are_private_to_their_owner() {
    let app = spawn_app();
    let ada = app.user("ada").await;
    let bob = app.user("bob").await;

    app.post("/add-category", json!({"token": ada, "category": "ada's"}))
        .await;
    app.post("/add-task", json!({"token": ada, "task": "ada's task", "due": ""}))
        .await;

    let res = app.post("/get-categories", json!({"token": bob})).await;
    assert_eq!(res, json!({"status": 1, "categories": []}));
    let res = app.post("/get-tasks", json!({"token": bob})).await;
    assert_eq!(res, json!({"status": 1, "tasks": []}));
}

#[tokio::test]
async fn record_mutations_match_on_id_by_default() {
    let app = spawn_app();
    let ada = app.user("ada").await;
    let bob = app.user("bob").await;

    let res = app
        .post("/add-task", json!({"token": ada, "task": "ada's task", "due": ""}))
        .await;
    let id = res["tasks"][0]["id"].as_i64().unwrap();

    // Bob's response only shows Bob's (empty) list, but Ada's task changed.
    let res = app.post("/complete-task", json!({"token": bob, "id": id})).await;
    assert_eq!(res, json!({"status": 1, "tasks": []}));

    let res = app.post("/get-tasks", json!({"token": ada})).await;
    assert_eq!(res["tasks"][0]["status"], "finished");
}

#[tokio::test]
async fn owner_scoped_mutations_protect_other_users_records() {
    let app = spawn_app_with(true);
    let ada = app.user("ada").await;
    let bob = app.user("bob").await;

    let res = app
        .post("/add-category", json!({"token": ada, "category": "mine"}))
        .await;
    let cat_id = res["categories"][0]["id"].as_i64().unwrap();
    let res = app
        .post("/add-task", json!({"token": ada, "task": "ada's task", "due": ""}))
        .await;
    let task_id = res["tasks"][0]["id"].as_i64().unwrap();

    let res = app
        .delete("/delete-category", json!({"token": bob, "id": cat_id}))
        .await;
    assert_eq!(res["msg"], "Unable to delete the category");
    let res = app
        .delete("/delete-task", json!({"token": bob, "id": task_id}))
        .await;
    assert_eq!(res["msg"], "Unable to delete the task");

    let res = app
        .post("/complete-task", json!({"token": ada, "id": task_id}))
        .await;
    assert_eq!(res["tasks"][0]["status"], "finished");
}

#[tokio::test]
async fn malformed_body_still_answers_with_envelope() {
    let app = spawn_app();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/register-user")
                .header("Content-Type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let res: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(res, json!({"status": 0, "msg": "An empty value has been received"}));
}

#[tokio::test]
async fn health_is_public() {
    let app = spawn_app();
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
