use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use runauth_api::middleware::AdminAuth;
use runauth_auth::GrantSigner;
use runauth_infra::{Backend, GitHubRunOracle, InMemoryStorage};

const RUN_PATH: &str = "/repos/acme/widgets/actions/runs/12345";
const ADMIN_TOKEN: &str = "admin-test-token";
const SIGNING_KEY: &[u8] = b"black-box-signing-key-0123456789";

struct TestServer {
    base_url: String,
    github: MockServer,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let github = MockServer::start().await;
        let oracle = GitHubRunOracle::new(Url::parse(&github.uri()).unwrap()).unwrap();
        let backend = Arc::new(Backend::new(
            Arc::new(InMemoryStorage::new()),
            Arc::new(oracle),
            Duration::from_secs(2),
            GrantSigner::new(SIGNING_KEY).unwrap(),
        ));

        // Same router as prod, bound to an ephemeral port.
        let app = runauth_api::app::build_app(backend, AdminAuth::new(ADMIN_TOKEN));
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
            github,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn run_is(&self, status: &str, run_number: i64) {
        Mock::given(method("GET"))
            .and(path(RUN_PATH))
            .and(header("authorization", "Bearer ghs_job"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": status, "run_number": run_number })),
            )
            .mount(&self.github)
            .await;
    }

    /// Public surface: no credentials.
    async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client.post(self.url(path)).json(&body).send().await.unwrap()
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    /// Administrative surface: carries the operator bearer token.
    async fn admin_post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(ADMIN_TOKEN)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn admin_get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(ADMIN_TOKEN)
            .send()
            .await
            .unwrap()
    }

    async fn admin_delete(&self, path: &str) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(ADMIN_TOKEN)
            .send()
            .await
            .unwrap()
    }

    async fn login(&self) -> reqwest::Response {
        self.post("/login", login_body()).await
    }

    async fn oracle_calls(&self) -> usize {
        self.github.received_requests().await.unwrap_or_default().len()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn login_body() -> Value {
    json!({
        "token": "ghs_job",
        "owner": "acme",
        "repository": "widgets",
        "run_id": "12345",
        "run_number": 7,
    })
}

fn policy_names(body: &Value) -> Vec<String> {
    body["policies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn health_is_ok() {
    let server = TestServer::spawn().await;
    assert_eq!(server.get("/health").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_issues_grant_with_merged_policies() {
    let server = TestServer::spawn().await;
    server.run_is("in_progress", 7).await;

    let res = server
        .admin_post("/organizations/acme", json!({ "policies": "org-read, shared" }))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let res = server
        .admin_post("/repositories/acme/widgets", json!({ "policies": ["deploy", "shared"] }))
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server.login().await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let auth = &body["auth"];

    assert_eq!(policy_names(auth), vec!["org-read", "shared", "deploy"]);
    assert_eq!(auth["alias"]["name"], "acme/widgets");
    assert_eq!(auth["lease"]["ttl"], 30);
    assert_eq!(auth["lease"]["max_ttl"], 3600);
    assert_eq!(auth["lease"]["renewable"], true);
    assert_eq!(auth["state"], "issued");

    let issued: DateTime<Utc> = auth["issued_at"].as_str().unwrap().parse().unwrap();
    let expires: DateTime<Utc> = auth["expires_at"].as_str().unwrap().parse().unwrap();
    assert_eq!((expires - issued).num_seconds(), 30);
}

#[tokio::test]
async fn login_accepts_qualified_repository_name() {
    let server = TestServer::spawn().await;
    server.run_is("in_progress", 7).await;

    let mut body = login_body();
    body["repository"] = json!("acme/widgets");
    let res = server.post("/login", body).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["auth"]["alias"]["name"], "acme/widgets");
}

#[tokio::test]
async fn login_with_no_policies_still_issues_grant() {
    let server = TestServer::spawn().await;
    server.run_is("in_progress", 7).await;

    let res = server.login().await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert!(policy_names(&body["auth"]).is_empty());
}

#[tokio::test]
async fn completed_run_with_matching_number_is_accepted() {
    let server = TestServer::spawn().await;
    server.run_is("completed", 7).await;

    assert_eq!(server.login().await.status(), StatusCode::OK);
}

#[tokio::test]
async fn completed_run_with_other_number_is_denied() {
    let server = TestServer::spawn().await;
    server.run_is("completed", 8).await;

    let res = server.login().await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "run_not_eligible");
    assert!(body["message"].as_str().unwrap().contains("completed"));
}

#[tokio::test]
async fn oracle_failure_is_bad_gateway() {
    let server = TestServer::spawn().await;
    Mock::given(method("GET"))
        .and(path(RUN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad credentials" })))
        .mount(&server.github)
        .await;

    let res = server.login().await;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "run_lookup_failed");
}

#[tokio::test]
async fn malformed_run_id_is_bad_request() {
    let server = TestServer::spawn().await;

    let mut body = login_body();
    body["run_id"] = json!("not-a-number");
    let res = server.post("/login", body).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(server.oracle_calls().await, 0);
}

#[tokio::test]
async fn bound_cidrs_refuse_other_origins_before_oracle() {
    let server = TestServer::spawn().await;
    server.run_is("in_progress", 7).await;

    let res = server
        .admin_post("/config", json!({ "bound_cidrs": "10.0.0.0/8" }))
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server.login().await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "permission_denied");
    assert_eq!(server.oracle_calls().await, 0);
}

#[tokio::test]
async fn bound_cidrs_admit_matching_origin() {
    let server = TestServer::spawn().await;
    server.run_is("in_progress", 7).await;

    let res = server
        .admin_post("/config", json!({ "bound_cidrs": ["127.0.0.0/8"] }))
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    assert_eq!(server.login().await.status(), StatusCode::OK);
}

#[tokio::test]
async fn config_round_trips_and_rejects_bad_cidr() {
    let server = TestServer::spawn().await;

    let res = server.admin_get("/config").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["bound_cidrs"], json!([]));

    let res = server
        .admin_post(
            "/config",
            json!({ "bound_cidrs": "10.0.0.0/8, 192.168.1.5", "base_url": server.github.uri() }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = server.admin_get("/config").await.json().await.unwrap();
    assert_eq!(body["bound_cidrs"], json!(["10.0.0.0/8", "192.168.1.5/32"]));
    assert!(body["base_url"].as_str().unwrap().starts_with("http://127.0.0.1"));

    let res = server
        .admin_post("/config", json!({ "bound_cidrs": "not-a-cidr" }))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn policy_entries_crud() {
    let server = TestServer::spawn().await;

    let res = server.admin_get("/repositories/acme/widgets").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    server
        .admin_post("/repositories/acme/widgets", json!({ "policies": "deploy" }))
        .await;
    server
        .admin_post("/repositories/acme/gadgets", json!({ "policies": "read" }))
        .await;
    server
        .admin_post("/organizations/acme", json!({ "policies": "org" }))
        .await;

    let body: Value = server.admin_get("/repositories/acme/widgets").await.json().await.unwrap();
    assert_eq!(policy_names(&body), vec!["deploy"]);

    let body: Value = server.admin_get("/repositories").await.json().await.unwrap();
    assert_eq!(body["keys"], json!(["acme/gadgets", "acme/widgets"]));
    let body: Value = server.admin_get("/organizations").await.json().await.unwrap();
    assert_eq!(body["keys"], json!(["acme"]));

    let res = server.admin_delete("/repositories/acme/widgets").await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        server.admin_get("/repositories/acme/widgets").await.status(),
        StatusCode::NOT_FOUND
    );

    // Deleting again is not an error.
    let res = server.admin_delete("/repositories/acme/widgets").await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn malformed_entry_names_are_rejected() {
    let server = TestServer::spawn().await;

    let res = server
        .admin_post("/repositories/widgets", json!({ "policies": "deploy" }))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .admin_post("/repositories/a/b/c", json!({ "policies": "deploy" }))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn renew_extends_live_grant() {
    let server = TestServer::spawn().await;
    server.run_is("in_progress", 7).await;

    let body: Value = server.login().await.json().await.unwrap();
    let grant = body["auth"].clone();

    let res = server.post("/renew", json!({ "auth": grant })).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["auth"]["state"], "renewed");
    assert_eq!(body["auth"]["lease_id"], grant["lease_id"]);
    assert_eq!(server.oracle_calls().await, 2);
}

#[tokio::test]
async fn renew_rejects_finished_run() {
    let server = TestServer::spawn().await;
    server.run_is("in_progress", 7).await;
    let body: Value = server.login().await.json().await.unwrap();
    let grant = body["auth"].clone();

    server.github.reset().await;
    server.run_is("completed", 9).await;

    let res = server.post("/renew", json!({ "auth": grant })).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "run_not_eligible");
}

#[tokio::test]
async fn renew_without_auth_is_bad_request() {
    let server = TestServer::spawn().await;

    let res = server.post("/renew", json!({})).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_renewal_request");
    assert_eq!(server.oracle_calls().await, 0);
}

#[tokio::test]
async fn non_json_body_gets_json_error() {
    let server = TestServer::spawn().await;

    let res = server
        .client
        .post(server.url("/login"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_body");
}

#[tokio::test]
async fn admin_routes_require_bearer_token() {
    let server = TestServer::spawn().await;

    let attempts = [
        server.get("/config").await,
        server.post("/config", json!({ "bound_cidrs": "0.0.0.0/0" })).await,
        server.get("/organizations").await,
        server.post("/organizations/acme", json!({ "policies": "root" })).await,
        server.get("/repositories").await,
        server.post("/repositories/acme/widgets", json!({ "policies": "root" })).await,
        server
            .client
            .delete(server.url("/repositories/acme/widgets"))
            .send()
            .await
            .unwrap(),
    ];
    for res in attempts {
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], "unauthorized");
    }

    // Nothing was written by the refused calls.
    let body: Value = server.admin_get("/repositories").await.json().await.unwrap();
    assert_eq!(body["keys"], json!([]));
}

#[tokio::test]
async fn wrong_admin_token_is_refused() {
    let server = TestServer::spawn().await;

    let res = server
        .client
        .post(server.url("/config"))
        .bearer_auth("admin-test-tokeN")
        .json(&json!({ "bound_cidrs": "0.0.0.0/0" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .client
        .get(server.url("/organizations"))
        .header("authorization", format!("Basic {ADMIN_TOKEN}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_and_renew_do_not_need_admin_token() {
    let server = TestServer::spawn().await;
    server.run_is("in_progress", 7).await;

    let res = server.login().await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();

    let res = server.post("/renew", json!({ "auth": body["auth"] })).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn renew_ignores_edited_grant_fields() {
    let server = TestServer::spawn().await;
    server.run_is("in_progress", 7).await;
    server
        .admin_post("/repositories/acme/widgets", json!({ "policies": "deploy" }))
        .await;

    let body: Value = server.login().await.json().await.unwrap();
    let issued = body["auth"].clone();

    let mut edited = issued.clone();
    edited["policies"] = json!(["root"]);
    edited["issued_at"] = json!("2099-01-01T00:00:00Z");
    edited["state"] = json!("issued");
    edited["lease"]["max_ttl"] = json!(999_999);

    let res = server.post("/renew", json!({ "auth": edited })).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let renewed = &body["auth"];
    assert_eq!(policy_names(renewed), vec!["deploy"]);
    assert_eq!(renewed["issued_at"], issued["issued_at"]);
    assert_eq!(renewed["lease"]["max_ttl"], 3600);
}

#[tokio::test]
async fn renew_with_forged_token_is_bad_request() {
    let server = TestServer::spawn().await;
    server.run_is("in_progress", 7).await;

    let res = server
        .post("/renew", json!({ "auth": { "client_token": "garbage" } }))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_renewal_request");
    assert_eq!(server.oracle_calls().await, 0);
}

#[tokio::test]
async fn grant_responses_never_echo_the_job_token() {
    let server = TestServer::spawn().await;
    server.run_is("in_progress", 7).await;

    let res = server.login().await;
    assert_eq!(res.status(), StatusCode::OK);
    let raw = res.text().await.unwrap();
    assert!(!raw.contains("ghs_job"));
    assert!(!raw.contains("internal_data"));

    let grant: Value = serde_json::from_str(&raw).unwrap();
    let res = server.post("/renew", json!({ "auth": grant["auth"] })).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(!res.text().await.unwrap().contains("ghs_job"));
}

#[tokio::test]
async fn policy_names_are_stored_lowercase() {
    let server = TestServer::spawn().await;
    server.run_is("in_progress", 7).await;

    server
        .admin_post("/organizations/acme", json!({ "policies": "Shared, ORG-Read" }))
        .await;
    server
        .admin_post("/repositories/acme/widgets", json!({ "policies": ["shared", "Deploy"] }))
        .await;

    let body: Value = server.admin_get("/organizations/acme").await.json().await.unwrap();
    assert_eq!(policy_names(&body), vec!["shared", "org-read"]);

    let body: Value = server.login().await.json().await.unwrap();
    assert_eq!(policy_names(&body["auth"]), vec!["shared", "org-read", "deploy"]);
}
