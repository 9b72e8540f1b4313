//! In-process harness for driving the full router in unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::{Argon2Verifier, CallerId, JwtTokenService, TokenService};
use crate::config::AppConfig;
use crate::database::{
    Article, ArticleGateway, DatabaseError, MemoryArticleGateway, MemoryUserGateway, User, UserGateway,
};
use crate::error::ResponseTranslator;
use crate::server::router;
use crate::services::AuthService;
use crate::state::AppState;

pub const TEST_SECRET: &str = "test-secret";

/// Router wired to memory gateways, with handles kept for assertions
pub struct TestContext {
    pub users: Arc<MemoryUserGateway>,
    pub articles: Arc<MemoryArticleGateway>,
    pub tokens: Arc<JwtTokenService>,
    translator: ResponseTranslator,
    router: Router,
}

/// Status and decoded body of one response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_translator(ResponseTranslator::default())
    }

    pub fn with_translator(translator: ResponseTranslator) -> Self {
        let users = Arc::new(MemoryUserGateway::new());
        let articles = Arc::new(MemoryArticleGateway::new());
        let tokens = Arc::new(JwtTokenService::new(TEST_SECRET, Duration::hours(24)));

        let router = build_router(users.clone(), tokens.clone(), articles.clone(), translator);

        Self {
            users,
            articles,
            tokens,
            translator,
            router,
        }
    }

    /// Route article traffic to `gateway` instead of the memory store.
    ///
    /// Users and tokens stay shared, so seeded callers keep working.
    pub fn with_article_gateway(mut self, gateway: Arc<dyn ArticleGateway>) -> Self {
        self.router = build_router(self.users.clone(), self.tokens.clone(), gateway, self.translator);
        self
    }

    /// Store a user directly and return it with a valid bearer token
    pub async fn seed_user(&self, email: &str) -> (User, String) {
        let now = Utc::now();
        let user = self
            .users
            .save(User {
                id: 0,
                username: "test".to_string(),
                email: email.to_string(),
                password: "not-a-real-hash".to_string(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        let token = self.tokens.issue(CallerId::new(user.id)).unwrap();
        (user, token)
    }

    pub async fn seed_article(&self, owner: i64, title: &str) -> Article {
        let now = Utc::now();
        self.articles
            .save(Article {
                id: 0,
                slug: String::new(),
                title: title.to_string(),
                body: "random body".to_string(),
                user_id: owner,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap()
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&bytes).to_string();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body, text }
    }
}

fn build_router(
    users: Arc<MemoryUserGateway>,
    tokens: Arc<JwtTokenService>,
    articles: Arc<dyn ArticleGateway>,
    translator: ResponseTranslator,
) -> Router {
    let auth = AuthService::new(users, Arc::new(Argon2Verifier), tokens);
    let state = AppState::new(auth, articles, translator);
    router(state, &AppConfig::from_source(|_| None).security)
}

/// Article store whose every call fails the way an unreachable database does
#[derive(Default)]
pub struct FailingArticleGateway {
    calls: AtomicUsize,
    mutations: AtomicUsize,
}

impl FailingArticleGateway {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Save, update and delete invocations
    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn fail(&self) -> DatabaseError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        DatabaseError::Sqlx(sqlx::Error::PoolTimedOut)
    }
}

#[async_trait]
impl ArticleGateway for FailingArticleGateway {
    async fn get_all(&self) -> Result<Vec<Article>, DatabaseError> {
        Err(self.fail())
    }

    async fn get_by_slug(&self, _slug: &str) -> Result<Article, DatabaseError> {
        Err(self.fail())
    }

    async fn save(&self, _article: Article) -> Result<Article, DatabaseError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Err(self.fail())
    }

    async fn update(&self, _article: Article) -> Result<Article, DatabaseError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Err(self.fail())
    }

    async fn delete(&self, _slug: &str) -> Result<(), DatabaseError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Err(self.fail())
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn health_answers_plain_text() {
        let ctx = TestContext::new();
        let response = ctx.request(Method::GET, "/health", None, None).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.text, "healthy");
    }

    #[tokio::test]
    async fn create_without_token_never_reaches_store() {
        let ctx = TestContext::new();
        let response = ctx
            .request(Method::POST, "/articles", None, Some(json!({"title": "t", "body": "b"})))
            .await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body, json!({"message": "Unauthorized"}));
        assert_eq!(ctx.articles.save_calls(), 0);
    }

    #[tokio::test]
    async fn malformed_authorization_header_is_unauthorized() {
        let ctx = TestContext::new();
        let (_, token) = ctx.seed_user("test@test.com").await;

        for header_value in [token.clone(), format!("Token {}", token), format!("Bearer {} extra", token)] {
            let request = Request::builder()
                .method(Method::GET)
                .uri("/auth/me")
                .header(header::AUTHORIZATION, header_value)
                .body(Body::empty())
                .unwrap();
            let response = ctx.router.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn create_assigns_caller_as_owner() {
        let ctx = TestContext::new();
        let (user, token) = ctx.seed_user("test@test.com").await;

        let response = ctx
            .request(
                Method::POST,
                "/articles",
                Some(&token),
                Some(json!({"title": "random title", "body": "random body", "user_id": 999})),
            )
            .await;

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.body["user_id"], user.id);
        assert!(response.body["slug"].as_str().unwrap().starts_with("random-title-"));
        assert_eq!(ctx.articles.save_calls(), 1);
    }

    #[tokio::test]
    async fn create_with_missing_title_is_bad_request() {
        let ctx = TestContext::new();
        let (_, token) = ctx.seed_user("test@test.com").await;

        let response = ctx
            .request(Method::POST, "/articles", Some(&token), Some(json!({"body": "random body"})))
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body, json!({"message": "Invalid request.", "error": "required title"}));
        assert_eq!(ctx.articles.save_calls(), 0);
    }

    #[tokio::test]
    async fn non_owner_cannot_mutate_article() {
        let ctx = TestContext::new();
        let (owner, _) = ctx.seed_user("owner@test.com").await;
        let (_, intruder_token) = ctx.seed_user("intruder@test.com").await;
        let article = ctx.seed_article(owner.id, "owned title").await;
        let uri = format!("/articles/{}", article.slug);

        let patched = ctx
            .request(Method::PATCH, &uri, Some(&intruder_token), Some(json!({"title": "x", "body": "y"})))
            .await;
        assert_eq!(patched.status, StatusCode::UNAUTHORIZED);

        let deleted = ctx.request(Method::DELETE, &uri, Some(&intruder_token), None).await;
        assert_eq!(deleted.status, StatusCode::UNAUTHORIZED);

        assert_eq!(ctx.articles.update_calls(), 0);
        assert_eq!(ctx.articles.delete_calls(), 0);
        assert_eq!(ctx.articles.get_by_slug(&article.slug).await.unwrap(), article);
    }

    #[tokio::test]
    async fn owner_updates_and_deletes_article() {
        let ctx = TestContext::new();
        let (owner, token) = ctx.seed_user("owner@test.com").await;
        let article = ctx.seed_article(owner.id, "old title").await;

        let updated = ctx
            .request(
                Method::PATCH,
                &format!("/articles/{}", article.slug),
                Some(&token),
                Some(json!({"title": "new title", "body": "new body"})),
            )
            .await;
        assert_eq!(updated.status, StatusCode::OK);
        assert_eq!(updated.body["id"], article.id);
        assert_eq!(updated.body["body"], "new body");
        let new_slug = updated.body["slug"].as_str().unwrap().to_string();
        assert!(new_slug.starts_with("new-title-"));

        let deleted = ctx
            .request(Method::DELETE, &format!("/articles/{}", new_slug), Some(&token), None)
            .await;
        assert_eq!(deleted.status, StatusCode::NO_CONTENT);
        assert!(deleted.text.is_empty());
        assert!(ctx.articles.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found() {
        let ctx = TestContext::new();
        let (_, token) = ctx.seed_user("test@test.com").await;

        let response = ctx.request(Method::GET, "/articles/nothing-here", None, None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body, json!({"message": "Resource not found."}));

        let response = ctx
            .request(Method::DELETE, "/articles/nothing-here", Some(&token), None)
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(ctx.articles.delete_calls(), 0);
    }

    #[tokio::test]
    async fn slug_mutations_authenticate_before_resolving() {
        let ctx = TestContext::new();
        let (owner, _) = ctx.seed_user("owner@test.com").await;
        let article = ctx.seed_article(owner.id, "owned title").await;

        for uri in [format!("/articles/{}", article.slug), "/articles/nothing-here".to_string()] {
            let patched = ctx
                .request(Method::PATCH, &uri, None, Some(json!({"title": "x", "body": "y"})))
                .await;
            assert_eq!(patched.status, StatusCode::UNAUTHORIZED, "PATCH {uri}");
            assert_eq!(patched.body, json!({"message": "Unauthorized"}));

            let deleted = ctx.request(Method::DELETE, &uri, None, None).await;
            assert_eq!(deleted.status, StatusCode::UNAUTHORIZED, "DELETE {uri}");
        }

        assert_eq!(ctx.articles.update_calls(), 0);
        assert_eq!(ctx.articles.delete_calls(), 0);
        assert_eq!(ctx.articles.get_by_slug(&article.slug).await.unwrap(), article);
    }

    #[tokio::test]
    async fn store_failure_while_resolving_is_server_error() {
        let failing = Arc::new(FailingArticleGateway::default());
        let ctx = TestContext::new().with_article_gateway(failing.clone());
        let (_, token) = ctx.seed_user("test@test.com").await;

        let response = ctx.request(Method::GET, "/articles/x", None, None).await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body["message"], "Server Error");

        let hidden = TestContext::with_translator(ResponseTranslator::new(false)).with_article_gateway(failing.clone());
        let response = hidden.request(Method::GET, "/articles/x", None, None).await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body, json!({"message": "Server Error"}));

        for method in [Method::PATCH, Method::DELETE] {
            let response = ctx
                .request(method, "/articles/x", Some(&token), Some(json!({"title": "t", "body": "b"})))
                .await;
            assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        }

        assert_eq!(failing.calls(), 4);
        assert_eq!(failing.mutations(), 0);
    }

    #[tokio::test]
    async fn undecodable_slug_is_bad_request_json() {
        let ctx = TestContext::new();
        let response = ctx.request(Method::GET, "/articles/%FF", None, None).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body["message"], "Invalid request.");
        assert!(response.body["error"].is_string());
        assert_eq!(ctx.articles.get_all().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn token_for_unknown_user_is_not_found_on_me() {
        let ctx = TestContext::new();
        let token = ctx.tokens.issue(CallerId::new(77)).unwrap();

        let response = ctx.request(Method::GET, "/auth/me", Some(&token), None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn signup_then_me() {
        let ctx = TestContext::new();
        let signup = ctx
            .request(
                Method::POST,
                "/auth/signup",
                None,
                Some(json!({"username": "test", "email": "test@test.com", "password": "random"})),
            )
            .await;

        assert_eq!(signup.status, StatusCode::CREATED);
        assert!(signup.body.get("password").is_none());
        let token = signup.body["token"].as_str().unwrap().to_string();

        let me = ctx.request(Method::GET, "/auth/me", Some(&token), None).await;
        assert_eq!(me.status, StatusCode::OK);
        assert_eq!(me.body["email"], "test@test.com");
        assert!(me.body.get("token").is_none());
        assert!(me.body.get("password").is_none());
    }

    fn token_with_claim(user_id: Value) -> String {
        let claims = json!({"userId": user_id, "exp": (Utc::now() + Duration::hours(1)).timestamp()});
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn non_numeric_claim_is_server_error() {
        let ctx = TestContext::new();
        let token = token_with_claim(json!("abc"));

        let response = ctx.request(Method::GET, "/auth/me", Some(&token), None).await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body["message"], "Server Error");
        assert!(response.body.get("error").is_some());
    }

    #[tokio::test]
    async fn hidden_error_details_strip_fatal_text_only() {
        let ctx = TestContext::with_translator(ResponseTranslator::new(false));
        let token = token_with_claim(json!("abc"));

        let response = ctx.request(Method::GET, "/auth/me", Some(&token), None).await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body, json!({"message": "Server Error"}));

        let (_, token) = ctx.seed_user("test@test.com").await;
        let response = ctx.request(Method::POST, "/articles", Some(&token), Some(json!({}))).await;
        assert_eq!(
            response.body,
            json!({"message": "Invalid request.", "error": "missing required Article fields"})
        );
    }
}
