//! End-to-end tests driving connected applications through `TestClient`.

use std::sync::Arc;
use std::time::Duration;

use resourceful::auth::BcryptHasher;
use resourceful::prelude::*;
use resourceful_test::{TestClient, TestResponse};
use serde_json::{json, Value};

fn posts() -> Resource {
    let mut posts = Resource::new(ResourceOptions::new("Post")).unwrap();
    posts
        .add_permission("find", access::is_anyone())
        .unwrap()
        .add_permission("create", access::is_user())
        .unwrap()
        .add_pre_hook(
            "create",
            Hook::from_fn(|ctx| match ctx.body().get("title") {
                Some(Value::String(_)) => Ok(()),
                _ => Err(ResourceError::validation("A post needs a title.")),
            }),
        )
        .unwrap();
    posts
}

fn client_with(options: ConnectOptions, extra: Vec<Resource>) -> TestClient {
    let users =
        Resource::user_with_hasher(ResourceOptions::new("User"), Arc::new(BcryptHasher::new(4))).unwrap();
    let mut resources = vec![users, posts()];
    resources.extend(extra);
    TestClient::new(App::connect(options, resources).unwrap())
}

fn client() -> TestClient {
    client_with(ConnectOptions::new("e2e-secret"), Vec::new())
}

async fn register(client: &TestClient, email: &str) -> TestResponse {
    client
        .post("/users/register")
        .json(&json!({ "email": email, "password": "hunter2", "name": "Ada" }))
        .send()
        .await
}

fn bearer(response: &TestResponse) -> String {
    response
        .data_at("auth.token")
        .and_then(Value::as_str)
        .expect("response carries a bearer token")
        .to_string()
}

#[tokio::test]
async fn test_health_reports_environment() {
    let response = client().get("/").send().await;
    response.assert_status_code(200).assert_success();
    assert!(response.data_at("environment").is_some());
}

#[tokio::test]
async fn test_unknown_route_is_a_fail_envelope() {
    let response = client().get("/nowhere").send().await;
    response.assert_fail(404);
    assert_eq!(response.message(), Some(resourceful::core::ROUTE_NOT_FOUND_MESSAGE));
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let response = client().post("/users/login").body("{ email: ").send().await;
    response.assert_fail(400);
    assert_eq!(response.message(), Some(resourceful::server::MALFORMED_BODY_MESSAGE));
}

#[tokio::test]
async fn test_register_then_login() {
    let client = client();

    let registered = register(&client, "ada@example.com").await;
    registered.assert_success();
    assert_eq!(registered.data_at("user.email"), Some(&json!("ada@example.com")));
    assert!(registered.data_at("user.password").is_none());
    assert!(registered.data_at("auth.token").is_some());

    let logged_in = client
        .post("/users/login")
        .json(&json!({ "email": "ada@example.com", "password": "hunter2" }))
        .send()
        .await;
    logged_in.assert_success();
    assert_ne!(bearer(&logged_in), bearer(&registered));
}

#[tokio::test]
async fn test_register_validation_and_conflicts() {
    let client = client();

    let missing = client
        .post("/users/register")
        .json(&json!({ "email": "ada@example.com" }))
        .send()
        .await;
    missing.assert_fail(400);
    assert_eq!(missing.message(), Some("Both an email and a password are required."));

    register(&client, "ada@example.com").await.assert_success();
    let duplicate = register(&client, "ada@example.com").await;
    duplicate.assert_fail(409);
}

#[tokio::test]
async fn test_login_failures() {
    let client = client();
    register(&client, "ada@example.com").await.assert_success();

    let unknown = client
        .post("/users/login")
        .json(&json!({ "email": "bob@example.com", "password": "hunter2" }))
        .send()
        .await;
    unknown.assert_fail(404);

    let wrong = client
        .post("/users/login")
        .json(&json!({ "email": "ada@example.com", "password": "nope" }))
        .send()
        .await;
    wrong.assert_fail(400);
    assert_eq!(wrong.message(), Some("Password is incorrect."));
}

#[tokio::test]
async fn test_permissions_follow_the_bearer_token() {
    let client = client();
    let token = bearer(&register(&client, "ada@example.com").await);

    let anonymous = client.post("/posts").json(&json!({ "title": "hi" })).send().await;
    anonymous.assert_fail(401);

    let forged = client
        .post("/posts")
        .bearer("not.a-token")
        .json(&json!({ "title": "hi" }))
        .send()
        .await;
    forged.assert_fail(401);

    let created = client
        .post("/posts")
        .bearer(&token)
        .json(&json!({ "title": "hi" }))
        .send()
        .await;
    created.assert_success();
    assert_eq!(created.data_at("post.title"), Some(&json!("hi")));

    let untitled = client.post("/posts").bearer(&token).json(&json!({ "body": "x" })).send().await;
    untitled.assert_fail(400);
    assert_eq!(untitled.message(), Some("A post needs a title."));

    let listed = client.get("/posts").send().await;
    listed.assert_success();
    assert_eq!(listed.data_at("posts.0.title"), Some(&json!("hi")));
}

#[tokio::test]
async fn test_logout_revokes_the_token() {
    let client = client();
    let token = bearer(&register(&client, "ada@example.com").await);

    let logged_out = client.post("/users/logout").bearer(&token).send().await;
    logged_out.assert_success();
    assert_eq!(logged_out.data_at("auth"), Some(&Value::Null));

    let after = client
        .post("/posts")
        .bearer(&token)
        .json(&json!({ "title": "late" }))
        .send()
        .await;
    after.assert_fail(401);

    client.post("/users/logout").bearer(&token).send().await.assert_fail(401);
}

#[tokio::test]
async fn test_secured_default_endpoint_without_predicates_is_denied() {
    let response = client().get("/users").send().await;
    response.assert_fail(401);
}

fn failing_resource() -> Resource {
    let mut broken = Resource::new(
        ResourceOptions::new("Broken")
            .address("/broken")
            .disable(resourceful::resource::DEFAULT_ENDPOINT_IDS),
    )
    .unwrap();
    broken
        .add_endpoint(
            "explode",
            EndpointSpec::new(
                "get",
                "/explode",
                Handler::from_fn(|_| -> ResourceResult<Value> {
                    Err(ResourceError::internal_with_source(
                        "Something went wrong.",
                        std::io::Error::other("disk on fire"),
                    ))
                }),
            )
            .open(true),
        )
        .unwrap();
    broken
}

#[tokio::test]
async fn test_debug_toggles_error_detail() {
    let quiet = client_with(ConnectOptions::new("s"), vec![failing_resource()]);
    let response = quiet.get("/broken/explode").send().await;
    response.assert_error(500);
    assert_eq!(response.message(), Some("Something went wrong."));
    assert!(response.detail().is_none());

    let loud = client_with(ConnectOptions::new("s").debug(true), vec![failing_resource()]);
    let response = loud.get("/broken/explode").send().await;
    response.assert_error(500);
    assert!(response.detail().unwrap().contains("disk on fire"));
}

#[tokio::test]
async fn test_slow_stage_times_out() {
    let mut slow = Resource::new(
        ResourceOptions::new("Slow")
            .address("/slow")
            .disable(resourceful::resource::DEFAULT_ENDPOINT_IDS)
            .stage_timeout(Duration::from_millis(20)),
    )
    .unwrap();
    slow.add_endpoint(
        "wait",
        EndpointSpec::new(
            "get",
            "/wait",
            Handler::new(|_| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Ok::<_, ResourceError>(json!({ "done": true }))
            }),
        )
        .open(true),
    )
    .unwrap();

    let client = client_with(ConnectOptions::new("s"), vec![slow]);
    let response = client.get("/slow/wait").send().await;
    response.assert_error(504);
}

#[tokio::test]
async fn test_static_route_wins_over_parameter() {
    let mut posts = Resource::new(ResourceOptions::new("Article").unsecure(true)).unwrap();
    posts
        .add_endpoint(
            "count",
            EndpointSpec::new(
                "get",
                "/count",
                Handler::new(|ctx| async move {
                    let count = ctx.model().count(&ctx.query_filter()).await?;
                    Ok::<_, ResourceError>(json!({ "count": count }))
                }),
            ),
        )
        .unwrap();

    let client = client_with(ConnectOptions::new("s"), vec![posts]);
    client.post("/articles").json(&json!({ "title": "a" })).send().await.assert_success();

    let response = client.get("/articles/count").send().await;
    response.assert_success();
    assert_eq!(response.data_at("count"), Some(&json!(1)));
}
