pub mod config;
pub mod db;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use service_core::axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    rate_limit::{create_ip_rate_limiter, ip_rate_limit_middleware, IpRateLimiter},
    security_headers::security_headers_middleware,
    tracing::{request_id_middleware, REQUEST_ID_HEADER},
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{Environment, IdentityConfig, SwaggerMode};
use crate::services::{
    AuthorizationGate, EmailProvider, NotificationDispatcher, OtpCache, OtpService, Repository,
    TokenService,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        handlers::auth::superuser_signup,
        handlers::auth::admin_signup,
        handlers::auth::admin_login,
        handlers::admins::get_me,
        handlers::admins::get_my_status,
        handlers::admins::list_admins,
        handlers::admins::activate_admin,
        handlers::admins::deactivate_admin,
        handlers::admins::change_role,
        handlers::users::send_otp,
        handlers::users::verify_otp,
        handlers::users::set_password,
        handlers::users::set_pin,
        handlers::users::login,
        handlers::users::login_pin,
        handlers::users::request_password_reset,
        handlers::users::reset_password,
        handlers::users::request_pin_reset,
        handlers::users::reset_pin,
        handlers::users::get_me,
        handlers::blogs::create_blog,
        handlers::blogs::list_published,
        handlers::blogs::list_drafts,
        handlers::blogs::list_deleted,
        handlers::blogs::get_blog,
        handlers::blogs::update_blog,
        handlers::blogs::delete_blog,
        handlers::companies::create_company,
        handlers::companies::update_contact_info,
        handlers::companies::update_overview,
        handlers::companies::update_products_services,
        handlers::companies::get_company,
        handlers::companies::list_companies,
    ),
    components(
        schemas(
            dtos::ErrorResponse,
            dtos::admin::SuperuserSignupRequest,
            dtos::admin::AdminSignupRequest,
            dtos::admin::AdminLoginForm,
            dtos::admin::ChangeRoleRequest,
            dtos::user::SendOtpRequest,
            dtos::user::VerifyOtpRequest,
            dtos::user::SetPasswordRequest,
            dtos::user::SetPinRequest,
            dtos::user::UserLoginRequest,
            dtos::user::PinLoginRequest,
            dtos::user::EmailRequest,
            dtos::user::ResetPasswordRequest,
            dtos::user::ResetPinRequest,
            dtos::blog::CreateBlogRequest,
            dtos::blog::UpdateBlogRequest,
            dtos::company::CreateCompanyRequest,
            dtos::company::CompanyContactRequest,
            dtos::company::CompanyOverviewRequest,
            dtos::company::CompanyOfferingRequest,
            models::AdminRole,
            models::Permissions,
            models::AdminResponse,
            models::UserType,
            models::UserResponse,
            models::BlogStatus,
            models::BlogResponse,
            models::BlogList,
            models::CompanyResponse,
            models::CompanyList,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Admin bootstrap, registration and login"),
        (name = "Admins", description = "Admin accounts"),
        (name = "Users", description = "User onboarding and sessions"),
        (name = "Blogs", description = "Blog publishing"),
        (name = "Companies", description = "Company profiles owned by users"),
        (name = "Observability", description = "Service health and monitoring"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "password_stage_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
                    middleware::PASSWORD_TOKEN_HEADER,
                ))),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: IdentityConfig,
    pub repo: Arc<dyn Repository>,
    pub cache: Arc<dyn OtpCache>,
    pub tokens: TokenService,
    pub otp: OtpService,
    pub gate: AuthorizationGate,
    pub notifier: NotificationDispatcher,
    pub login_rate_limiter: IpRateLimiter,
    pub otp_rate_limiter: IpRateLimiter,
    pub ip_rate_limiter: IpRateLimiter,
}

impl AppState {
    /// Wire the services around the given store, cache and email provider.
    pub fn new(
        config: IdentityConfig,
        repo: Arc<dyn Repository>,
        cache: Arc<dyn OtpCache>,
        provider: Arc<dyn EmailProvider>,
    ) -> Result<Self, AppError> {
        let tokens = TokenService::new(&config.jwt).map_err(AppError::ConfigError)?;
        let otp = OtpService::new(
            cache.clone(),
            config.otp.ttl_seconds,
            config.otp.max_attempts,
        );
        let gate = AuthorizationGate::new(repo.clone());
        let notifier = NotificationDispatcher::from_config(provider, &config.email);

        let limits = &config.rate_limit;
        let login_rate_limiter =
            create_ip_rate_limiter(limits.login_attempts, limits.login_window_seconds);
        let otp_rate_limiter = create_ip_rate_limiter(limits.otp_attempts, limits.otp_window_seconds);
        let ip_rate_limiter =
            create_ip_rate_limiter(limits.global_ip_limit, limits.global_ip_window_seconds);

        Ok(Self {
            config,
            repo,
            cache,
            tokens,
            otp,
            gate,
            notifier,
            login_rate_limiter,
            otp_rate_limiter,
            ip_rate_limiter,
        })
    }
}

fn cors_layer(config: &IdentityConfig) -> CorsLayer {
    let allowed = &config.security.allowed_origins;
    let origins: AllowOrigin = if allowed.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        allowed
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e);
                    None
                }
            })
            .collect::<Vec<HeaderValue>>()
            .into()
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(middleware::PASSWORD_TOKEN_HEADER),
            HeaderName::from_static(handlers::auth::SUPERUSER_SECRET_HEADER),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

pub fn build_router(state: AppState) -> Router {
    let login_routes = Router::new()
        .route("/auth/admins/login", post(handlers::auth::admin_login))
        .route("/users/login", post(handlers::users::login))
        .route("/users/login/pin", post(handlers::users::login_pin))
        .layer(from_fn_with_state(
            state.login_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ));

    let otp_routes = Router::new()
        .route("/users/send-otp", post(handlers::users::send_otp))
        .route(
            "/users/password-reset/request",
            post(handlers::users::request_password_reset),
        )
        .route(
            "/users/pin-reset/request",
            post(handlers::users::request_pin_reset),
        )
        .layer(from_fn_with_state(
            state.otp_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ));

    let mut app = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(handlers::metrics::metrics));

    let swagger_enabled = match state.config.environment {
        Environment::Dev => true,
        Environment::Prod => state.config.swagger.enabled == SwaggerMode::Public,
    };
    if swagger_enabled {
        app = app.merge(SwaggerUi::new("/docs").url("/.well-known/openapi.json", ApiDoc::openapi()));
    } else {
        app = app.route(
            "/.well-known/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        );
    }

    app
        // Authentication
        .route("/auth/superuser/signup", post(handlers::auth::superuser_signup))
        .route("/auth/admins/signup", post(handlers::auth::admin_signup))
        // Admins
        .route("/admins/me", get(handlers::admins::get_me))
        .route("/admins/me/status", get(handlers::admins::get_my_status))
        .route("/admins/all", get(handlers::admins::list_admins))
        .route("/admins/:id/activate", put(handlers::admins::activate_admin))
        .route("/admins/:id/deactivate", put(handlers::admins::deactivate_admin))
        .route("/admins/:id/role", put(handlers::admins::change_role))
        // Users
        .route("/users/verify-otp", put(handlers::users::verify_otp))
        .route("/users/set-password", put(handlers::users::set_password))
        .route("/users/set-pin", put(handlers::users::set_pin))
        .route("/users/reset-password", put(handlers::users::reset_password))
        .route("/users/reset-pin", put(handlers::users::reset_pin))
        .route("/users/me", get(handlers::users::get_me))
        // Blogs
        .route("/blogs/new", post(handlers::blogs::create_blog))
        .route("/blogs/published/all", get(handlers::blogs::list_published))
        .route("/blogs/drafts/all", get(handlers::blogs::list_drafts))
        .route("/blogs/deleted/all", get(handlers::blogs::list_deleted))
        .route("/blogs/:id", get(handlers::blogs::get_blog))
        .route("/blogs/:id/update", put(handlers::blogs::update_blog))
        .route("/blogs/:id/delete", delete(handlers::blogs::delete_blog))
        // Companies
        .route("/companies", get(handlers::companies::list_companies))
        .route("/companies/new", post(handlers::companies::create_company))
        .route(
            "/companies/update-company-contact-info",
            put(handlers::companies::update_contact_info),
        )
        .route(
            "/companies/update-company-overview",
            put(handlers::companies::update_overview),
        )
        .route(
            "/companies/update-company-products-services",
            put(handlers::companies::update_products_services),
        )
        .route("/companies/:id", get(handlers::companies::get_company))
        .merge(login_routes)
        .merge(otp_routes)
        .with_state(state.clone())
        .layer(from_fn_with_state(
            state.ip_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ))
        .layer(from_fn(middleware::metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &service_core::axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            },
        ))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors_layer(&state.config))
}

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 503, description = "A dependency is down")
    ),
    tag = "Observability"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match state.repo.health_check().await {
        Ok(()) => "up",
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            "down"
        }
    };
    let redis = match state.cache.health_check().await {
        Ok(()) => "up",
        Err(e) => {
            tracing::error!(error = %e, "Redis health check failed");
            "down"
        }
    };

    let healthy = database == "up" && redis == "up";
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "status": if healthy { "healthy" } else { "unhealthy" },
            "service": state.config.service_name,
            "version": state.config.service_version,
            "environment": format!("{:?}", state.config.environment),
            "checks": {
                "database": database,
                "redis": redis
            }
        })),
    )
}
