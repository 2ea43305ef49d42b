//! Public pages.

use actix_web::{HttpResponse, web};
use serde::Serialize;
use tera::Context;

use quill_core::DomainError;
use quill_core::domain::PostSummary;
use quill_shared::dto::{PageQuery, SearchQuery};

use crate::middleware::{AdminSession, OptionalSession};
use crate::state::AppState;

/// One year of the archive page.
#[derive(Debug, Serialize)]
struct YearGroup {
    year: i32,
    posts: Vec<PostSummary>,
}

/// GET /
pub async fn home(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
    session: OptionalSession,
) -> HttpResponse {
    let user = session.as_ref();
    match render_home(&state, query.page(), user).await {
        Ok(response) => response,
        Err(e) => state.views.failure(&e, "Failed to load posts", user),
    }
}

async fn render_home(
    state: &AppState,
    page: u64,
    user: Option<&AdminSession>,
) -> Result<HttpResponse, DomainError> {
    let config = state.settings.current();
    let listing = state
        .content
        .list_published(page, config.posts_per_page())
        .await?;
    let tags = state.content.all_tags().await?;

    let mut context = Context::new();
    context.insert("posts", &listing.posts);
    context.insert("current_page", &listing.page);
    context.insert("total_pages", &listing.total_pages());
    context.insert("has_next_page", &listing.has_next_page());
    context.insert("has_prev_page", &listing.has_prev_page());
    context.insert("next_page", &listing.page.saturating_add(1));
    context.insert("prev_page", &listing.page.saturating_sub(1));
    context.insert("tags", &tags);

    Ok(state
        .views
        .page("index.html", &config.site.title, user, context))
}

/// GET /post/{slug}
pub async fn post(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    session: OptionalSession,
) -> HttpResponse {
    let user = session.as_ref();
    match state.content.get_by_slug(&slug).await {
        Ok(post) => {
            let mut context = Context::new();
            context.insert("post", &post);
            state.views.page("post.html", &post.title, user, context)
        }
        Err(e) => state.views.failure(&e, "Failed to load post", user),
    }
}

/// GET /archives
pub async fn archives(state: web::Data<AppState>, session: OptionalSession) -> HttpResponse {
    let user = session.as_ref();
    match state.content.archives().await {
        Ok(archives) => {
            let groups: Vec<YearGroup> = archives
                .into_iter()
                .rev()
                .map(|(year, posts)| YearGroup { year, posts })
                .collect();

            let mut context = Context::new();
            context.insert("archives", &groups);
            state.views.page("archives.html", "Archives", user, context)
        }
        Err(e) => state.views.failure(&e, "Failed to load archives", user),
    }
}

/// GET /tags
pub async fn tags(state: web::Data<AppState>, session: OptionalSession) -> HttpResponse {
    let user = session.as_ref();
    match state.content.all_tags().await {
        Ok(tags) => {
            let mut context = Context::new();
            context.insert("tags", &tags);
            state.views.page("tags.html", "Tags", user, context)
        }
        Err(e) => state.views.failure(&e, "Failed to load tags", user),
    }
}

/// GET /categories
pub async fn categories(state: web::Data<AppState>, session: OptionalSession) -> HttpResponse {
    let user = session.as_ref();
    match state.content.categories().await {
        Ok(categories) => {
            let mut context = Context::new();
            context.insert("categories", &categories);
            state.views.page("categories.html", "Categories", user, context)
        }
        Err(e) => state.views.failure(&e, "Failed to load categories", user),
    }
}

/// GET /search?q=
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
    session: OptionalSession,
) -> HttpResponse {
    let user = session.as_ref();
    let q = query.q.trim();
    match state.content.search(q).await {
        Ok(posts) => {
            let mut context = Context::new();
            context.insert("posts", &posts);
            context.insert("query", q);
            state
                .views
                .page("search.html", &format!("Search: {q}"), user, context)
        }
        Err(e) => state.views.failure(&e, "Search failed", user),
    }
}

/// GET /about
pub async fn about(state: web::Data<AppState>, session: OptionalSession) -> HttpResponse {
    state
        .views
        .page("about.html", "About", session.as_ref(), Context::new())
}

/// Fallback for unmatched routes.
pub async fn not_found(state: web::Data<AppState>, session: OptionalSession) -> HttpResponse {
    state.views.not_found(session.as_ref())
}
