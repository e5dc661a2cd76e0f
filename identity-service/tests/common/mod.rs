//! Shared setup for the router-level integration suites.
//!
//! Everything runs in-process: the store is `InMemoryRepository`, OTPs live in
//! `MockOtpCache` and outbound email lands in `MockEmailProvider`.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use identity_service::{
    build_router,
    config::{
        DatabaseConfig, EmailConfig, Environment, IdentityConfig, JwtConfig, OtpConfig,
        RateLimitConfig, RedisConfig, SecurityConfig, SwaggerConfig, SwaggerMode,
    },
    models::{Admin, AdminRole, Permissions, User, UserType},
    services::{
        InMemoryRepository, MockEmailProvider, MockOtpCache, OtpPurpose, Repository, TokenKind,
        TokenSubject,
    },
    utils::{hash_password, Password},
    AppState,
};
use secrecy::SecretString;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

pub const SUPERUSER_SECRET: &str = "bootstrap-secret";
pub const PASSWORD: &str = "correct-horse-battery";
pub const PIN: &str = "2468";

pub fn test_config() -> IdentityConfig {
    IdentityConfig {
        common: service_core::config::Config::default(),
        environment: Environment::Dev,
        service_name: "identity-service".to_string(),
        service_version: "test".to_string(),
        log_level: "error".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        redis: RedisConfig {
            url: "redis://unused".to_string(),
        },
        jwt: JwtConfig {
            secret: SecretString::new("integration-test-signing-secret".to_string()),
            admin_token_expiry_minutes: 60,
            user_password_token_expiry_minutes: 5,
            user_pin_token_expiry_minutes: 60,
        },
        otp: OtpConfig {
            ttl_seconds: 600,
            max_attempts: 5,
        },
        email: EmailConfig {
            api_url: "http://localhost/unused".to_string(),
            api_key: SecretString::new("unused".to_string()),
            from_address: "noreply@example.com".to_string(),
            from_name: "Identity".to_string(),
            max_attempts: 2,
            retry_delay_seconds: 0,
            request_timeout_seconds: 1,
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            superuser_secret: SecretString::new(SUPERUSER_SECRET.to_string()),
        },
        swagger: SwaggerConfig {
            enabled: SwaggerMode::Public,
        },
        rate_limit: RateLimitConfig {
            login_attempts: 1000,
            login_window_seconds: 60,
            otp_attempts: 1000,
            otp_window_seconds: 60,
            global_ip_limit: 1000,
            global_ip_window_seconds: 60,
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub repo: Arc<InMemoryRepository>,
    pub cache: Arc<MockOtpCache>,
    pub email: Arc<MockEmailProvider>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: IdentityConfig) -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        let cache = Arc::new(MockOtpCache::new());
        let email = Arc::new(MockEmailProvider::new());

        let state = AppState::new(config, repo.clone(), cache.clone(), email.clone())
            .expect("Failed to build app state");
        let router = build_router(state.clone());

        Self {
            router,
            state,
            repo,
            cache,
            email,
        }
    }

    /// Send a request and decode the JSON body (`Value::Null` when not JSON).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        self.send(request).await
    }

    pub async fn form(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn seed_admin(&self, username: &str, role: AdminRole, permissions: Permissions) -> Admin {
        let hash = hash_password(&Password::new(PASSWORD)).unwrap();
        let admin = Admin::new(
            username.to_string(),
            format!("{}@example.com", username),
            hash.into_string(),
            role,
            permissions,
        );
        self.repo.insert_admin(&admin).await.unwrap();
        admin
    }

    pub fn admin_token(&self, admin: &Admin) -> String {
        self.state
            .tokens
            .issue(
                TokenKind::Admin,
                &TokenSubject {
                    id: admin.admin_id,
                    email: admin.email.clone(),
                },
            )
            .unwrap()
            .token
    }

    pub fn user_token(&self, user: &User, kind: TokenKind) -> String {
        self.state
            .tokens
            .issue(
                kind,
                &TokenSubject {
                    id: user.user_id,
                    email: user.email.clone(),
                },
            )
            .unwrap()
            .token
    }

    /// Verified user with password and PIN already set.
    pub async fn seed_user(&self, email: &str) -> User {
        let mut user = User::new(email.to_string(), UserType::Startup);
        user.is_verified = true;
        user.password_hash = Some(hash_password(&Password::new(PASSWORD)).unwrap().into_string());
        user.pin_hash = Some(hash_password(&Password::new(PIN)).unwrap().into_string());
        self.repo.insert_user(&user).await.unwrap();
        user
    }

    /// Replace the live code so the test knows it.
    pub async fn set_otp(&self, purpose: OtpPurpose, email: &str, code: &str) {
        self.state.otp.store(purpose, email, code).await.unwrap();
    }

    /// Background email tasks finish shortly after the response.
    pub async fn wait_for_emails(&self, count: usize) -> usize {
        for _ in 0..100 {
            if self.email.delivered().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.email.delivered().len()
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
