//! Blog publishing. Listings of published posts are public; everything else
//! goes through the policy table.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use service_core::error::AppError;
use uuid::Uuid;

use crate::{
    dtos::{
        blog::{CreateBlogRequest, UpdateBlogRequest},
        ApiResponse, ErrorResponse,
    },
    middleware::AdminClaims,
    models::{Blog, BlogList, BlogResponse, BlogStatus},
    services::{Action, Target},
    utils::ValidatedJson,
    AppState,
};

fn bad_request(message: &'static str) -> AppError {
    AppError::BadRequest(anyhow::anyhow!(message))
}

fn ensure_publishable(title: &str, content: &str) -> Result<(), AppError> {
    if title.trim().is_empty() || content.trim().is_empty() {
        return Err(bad_request(
            "To publish a blog, the title and content fields need to be filled",
        ));
    }
    Ok(())
}

async fn load_blog(state: &AppState, blog_id: Uuid) -> Result<Blog, AppError> {
    state
        .repo
        .find_blog_by_id(blog_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Blog not found")))
}

async fn list_by_status(state: &AppState, status: BlogStatus) -> Result<BlogList, AppError> {
    let blogs = state.repo.list_blogs_by_status(status).await?;
    Ok(BlogList::from_blogs(&blogs))
}

/// Create a blog post
#[utoipa::path(
    post,
    path = "/blogs/new",
    request_body = CreateBlogRequest,
    responses(
        (status = 201, description = "Blog created", body = BlogResponse),
        (status = 400, description = "Invalid status or missing fields", body = ErrorResponse),
        (status = 403, description = "Missing create permission", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Blogs"
)]
pub async fn create_blog(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
    ValidatedJson(req): ValidatedJson<CreateBlogRequest>,
) -> Result<impl IntoResponse, AppError> {
    let author = state.gate.admit(&claims, Action::CreateBlog).await?;

    match req.status {
        BlogStatus::Deleted => return Err(bad_request("You cannot create a deleted blog")),
        BlogStatus::Published => ensure_publishable(&req.title, &req.content)?,
        BlogStatus::Draft => {}
    }

    let blog = Blog::new(
        author.admin_id,
        author.username.clone(),
        req.title,
        req.content,
        req.tags,
        req.status,
    );
    state.repo.insert_blog(&blog).await?;

    tracing::info!(blog_id = %blog.blog_id, author_id = %author.admin_id, "Blog created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Blog created successfully", BlogResponse::from(&blog))),
    ))
}

/// Published posts (public)
#[utoipa::path(
    get,
    path = "/blogs/published/all",
    responses((status = 200, description = "Published posts", body = BlogList)),
    tag = "Blogs"
)]
pub async fn list_published(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let list = list_by_status(&state, BlogStatus::Published).await?;
    Ok(Json(ApiResponse::ok("Blogs retrieved successfully", list)))
}

/// Draft posts
#[utoipa::path(
    get,
    path = "/blogs/drafts/all",
    responses(
        (status = 200, description = "Draft posts", body = BlogList),
        (status = 403, description = "Missing read permission", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Blogs"
)]
pub async fn list_drafts(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
) -> Result<impl IntoResponse, AppError> {
    state.gate.admit(&claims, Action::ReadDrafts).await?;
    let list = list_by_status(&state, BlogStatus::Draft).await?;
    Ok(Json(ApiResponse::ok("Blogs retrieved successfully", list)))
}

/// Soft-deleted posts
#[utoipa::path(
    get,
    path = "/blogs/deleted/all",
    responses(
        (status = 200, description = "Deleted posts", body = BlogList),
        (status = 403, description = "Missing read permission", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Blogs"
)]
pub async fn list_deleted(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
) -> Result<impl IntoResponse, AppError> {
    state.gate.admit(&claims, Action::ReadDrafts).await?;
    let list = list_by_status(&state, BlogStatus::Deleted).await?;
    Ok(Json(ApiResponse::ok("Blogs retrieved successfully", list)))
}

/// A single post. Unpublished posts need an admin token with read permission.
#[utoipa::path(
    get,
    path = "/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog id")),
    responses(
        (status = 200, description = "Blog", body = BlogResponse),
        (status = 404, description = "Unknown blog", body = ErrorResponse)
    ),
    tag = "Blogs"
)]
pub async fn get_blog(
    State(state): State<AppState>,
    Path(blog_id): Path<Uuid>,
    claims: Option<AdminClaims>,
) -> Result<impl IntoResponse, AppError> {
    let blog = load_blog(&state, blog_id).await?;

    if blog.status() != BlogStatus::Published {
        match claims {
            Some(AdminClaims(claims)) => {
                state.gate.admit(&claims, Action::ReadDrafts).await?;
            }
            // Unpublished posts do not exist for anonymous readers.
            None => return Err(AppError::NotFound(anyhow::anyhow!("Blog not found"))),
        }
    }

    Ok(Json(ApiResponse::ok(
        "Blog retrieved successfully",
        BlogResponse::from(&blog),
    )))
}

/// Update a post (author, admin or superuser)
#[utoipa::path(
    put,
    path = "/blogs/{id}/update",
    params(("id" = Uuid, Path, description = "Blog id")),
    request_body = UpdateBlogRequest,
    responses(
        (status = 200, description = "Blog updated", body = BlogResponse),
        (status = 400, description = "Illegal status change", body = ErrorResponse),
        (status = 403, description = "Not permitted", body = ErrorResponse),
        (status = 404, description = "Unknown blog", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Blogs"
)]
#[tracing::instrument(skip(state, claims, req), fields(blog_id = %blog_id))]
pub async fn update_blog(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
    Path(blog_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateBlogRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.gate.resolve_admin(&claims).await?;
    let mut blog = load_blog(&state, blog_id).await?;

    state.gate.authorize(
        &actor,
        Action::UpdateBlog,
        Target::Authored {
            author_id: blog.author_id,
        },
    )?;
    if blog.status() == BlogStatus::Deleted {
        return Err(bad_request("Blog has been deleted"));
    }

    match req.status {
        Some(BlogStatus::Deleted) => {
            return Err(bad_request("To delete a blog, use the delete endpoint"));
        }
        Some(BlogStatus::Draft) if blog.status() == BlogStatus::Published => {
            return Err(bad_request(
                "You cannot convert an already published blog into a draft",
            ));
        }
        _ => {}
    }

    if let Some(title) = req.title {
        blog.title = title;
    }
    if let Some(content) = req.content {
        blog.content = content;
    }
    if let Some(tags) = req.tags {
        blog.tags = tags;
    }
    if let Some(status) = req.status {
        blog.set_status(status);
    }
    if blog.status() == BlogStatus::Published {
        ensure_publishable(&blog.title, &blog.content)?;
    }

    blog.updated_utc = Utc::now();
    state.repo.update_blog(&blog).await?;

    tracing::info!(blog_id = %blog.blog_id, updated_by = %actor.admin_id, "Blog updated");

    Ok(Json(ApiResponse::ok(
        "Blog updated successfully",
        BlogResponse::from(&blog),
    )))
}

/// Soft-delete a post (author or superuser)
#[utoipa::path(
    delete,
    path = "/blogs/{id}/delete",
    params(("id" = Uuid, Path, description = "Blog id")),
    responses(
        (status = 200, description = "Blog deleted", body = BlogResponse),
        (status = 400, description = "Already deleted", body = ErrorResponse),
        (status = 403, description = "Not permitted", body = ErrorResponse),
        (status = 404, description = "Unknown blog", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Blogs"
)]
#[tracing::instrument(skip(state, claims), fields(blog_id = %blog_id))]
pub async fn delete_blog(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
    Path(blog_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.gate.resolve_admin(&claims).await?;
    let mut blog = load_blog(&state, blog_id).await?;

    state.gate.authorize(
        &actor,
        Action::DeleteBlog,
        Target::Authored {
            author_id: blog.author_id,
        },
    )?;
    if blog.status() == BlogStatus::Deleted {
        return Err(bad_request("Blog has been deleted"));
    }

    blog.set_status(BlogStatus::Deleted);
    blog.updated_utc = Utc::now();
    state.repo.update_blog(&blog).await?;

    tracing::info!(blog_id = %blog.blog_id, deleted_by = %actor.admin_id, "Blog deleted");

    Ok(Json(ApiResponse::ok(
        "Blog deleted successfully",
        BlogResponse::from(&blog),
    )))
}
