//! JSON API. Every response uses the `ApiResponse` envelope.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_shared::dto::{PageQuery, SearchQuery};
use quill_shared::{ApiResponse, Pagination};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 100;

/// GET /api/posts?page=&limit=
pub async fn posts(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = query.page();
    let limit = query.limit_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);

    let listing = state.content.list_published(page, limit).await?;
    let pagination = Pagination::new(listing.page, listing.page_size, listing.total);

    Ok(HttpResponse::Ok().json(ApiResponse::ok(listing.posts).with_pagination(pagination)))
}

/// GET /api/posts/{slug}
pub async fn post_by_slug(
    state: web::Data<AppState>,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = state.content.get_by_slug(&slug).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// GET /api/search?q=
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let q = query.q.trim();
    let posts = state.content.search(q).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts).with_query(q)))
}

/// GET /api/tags
pub async fn tags(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let tags = state.content.all_tags().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(tags)))
}

/// GET /api/categories
pub async fn categories(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories = state.content.categories().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(categories)))
}

/// GET /api/archives - `{ "2024": [summary, ...], ... }`
pub async fn archives(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let archives = state.content.archives().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(archives)))
}

/// GET /api/stats
pub async fn stats(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let stats = state.content.stats().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(stats)))
}

/// POST /api/posts/{id}/views
pub async fn record_view(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = Uuid::parse_str(&id).map_err(|_| AppError::NotFound("Post not found".to_string()))?;
    state.content.record_view(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_message("View recorded")))
}
