//! Admin area: login, post management and site settings.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, http::StatusCode, http::header, web};
use tera::Context;
use uuid::Uuid;

use quill_core::DomainError;
use quill_shared::dto::{LoginForm, SettingsForm};

use super::post_form::PostForm;
use crate::middleware::auth::{
    ADMIN_ROLE, LOGIN_PATH, expired_session_cookie, redirect, session_cookie,
};
use crate::middleware::{AdminSession, OptionalSession};
use crate::state::AppState;
use crate::uploads::UploadError;

const DASHBOARD_PATH: &str = "/admin/dashboard";
const POSTS_PATH: &str = "/admin/posts";
const SETTINGS_PATH: &str = "/admin/settings";
const RECENT_POSTS: usize = 5;
const LOGIN_FAILED: &str = "Invalid username or password";

/// GET /admin
pub async fn index() -> HttpResponse {
    redirect(LOGIN_PATH)
}

/// GET /admin/login
pub async fn login_page(state: web::Data<AppState>, session: OptionalSession) -> HttpResponse {
    if session.0.is_some() {
        return redirect(DASHBOARD_PATH);
    }
    state
        .views
        .page("admin/login.html", "Admin Login", None, Context::new())
}

/// POST /admin/login
pub async fn login(state: web::Data<AppState>, form: web::Form<LoginForm>) -> HttpResponse {
    let form = form.into_inner();

    let Some(admin) = state.admin.as_ref() else {
        tracing::warn!("Login attempted but no admin account is configured");
        return login_failed(&state, &form.username);
    };

    // Verify before comparing names so both failure paths cost the same.
    let password_ok = match state.passwords.verify(&form.password, &admin.password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::error!(error = %e, "Admin password hash could not be checked");
            false
        }
    };

    if !password_ok || form.username != admin.username {
        tracing::info!(username = %form.username, "Failed admin login");
        return login_failed(&state, &form.username);
    }

    let token = match state.tokens.generate_token(&admin.username, ADMIN_ROLE) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "Failed to issue session token");
            return state.views.error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Login failed",
                None,
            );
        }
    };

    tracing::info!(username = %admin.username, "Admin signed in");
    HttpResponse::Found()
        .insert_header((header::LOCATION, DASHBOARD_PATH))
        .cookie(session_cookie(token, state.tokens.expiration_seconds()))
        .finish()
}

fn login_failed(state: &AppState, username: &str) -> HttpResponse {
    let mut context = Context::new();
    context.insert("error", LOGIN_FAILED);
    context.insert("username", username);
    state
        .views
        .page("admin/login.html", "Admin Login", None, context)
}

/// GET /admin/logout
pub async fn logout() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, LOGIN_PATH))
        .cookie(expired_session_cookie())
        .finish()
}

/// GET /admin/dashboard
pub async fn dashboard(state: web::Data<AppState>, session: AdminSession) -> HttpResponse {
    let loaded = async {
        let stats = state.content.stats().await?;
        let mut posts = state.content.list_all().await?;
        posts.truncate(RECENT_POSTS);
        Ok::<_, DomainError>((stats, posts))
    }
    .await;

    match loaded {
        Ok((stats, posts)) => {
            let mut context = Context::new();
            context.insert("stats", &stats);
            context.insert("posts", &posts);
            state
                .views
                .page("admin/dashboard.html", "Dashboard", Some(&session), context)
        }
        Err(e) => state
            .views
            .failure(&e, "Failed to load statistics", Some(&session)),
    }
}

/// GET /admin/posts
pub async fn posts(state: web::Data<AppState>, session: AdminSession) -> HttpResponse {
    match state.content.list_all().await {
        Ok(posts) => {
            let mut context = Context::new();
            context.insert("posts", &posts);
            state
                .views
                .page("admin/posts.html", "Posts", Some(&session), context)
        }
        Err(e) => state
            .views
            .failure(&e, "Failed to load posts", Some(&session)),
    }
}

/// GET /admin/posts/new
pub async fn new_post(state: web::Data<AppState>, session: AdminSession) -> HttpResponse {
    let mut context = Context::new();
    context.insert("post", &None::<()>);
    state
        .views
        .page("admin/edit_post.html", "New Post", Some(&session), context)
}

/// GET /admin/posts/edit/{id}
pub async fn edit_post(
    state: web::Data<AppState>,
    session: AdminSession,
    id: web::Path<String>,
) -> HttpResponse {
    let Ok(id) = Uuid::parse_str(&id) else {
        return state.views.not_found(Some(&session));
    };

    match state.content.get_by_id(id).await {
        Ok(post) => {
            let mut context = Context::new();
            context.insert("post", &post);
            state
                .views
                .page("admin/edit_post.html", "Edit Post", Some(&session), context)
        }
        Err(e) => state
            .views
            .failure(&e, "Failed to load post", Some(&session)),
    }
}

/// POST /admin/posts/save
///
/// Creates a post when the form carries no id, updates it otherwise.
pub async fn save_post(
    state: web::Data<AppState>,
    session: AdminSession,
    payload: Multipart,
) -> HttpResponse {
    let form = match PostForm::read(payload, &state.uploads).await {
        Ok(form) => form,
        Err(e) => {
            let status = match e {
                UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            };
            tracing::warn!(error = %e, "Rejected post form");
            return state.views.error(status, &e.to_string(), Some(&session));
        }
    };

    let uploaded = form.featured_image.clone();
    let saved = async {
        match form.post_id()? {
            Some(id) => {
                let changes = form.into_changes(&session.username)?;
                state.content.update(id, changes).await
            }
            None => {
                let draft = form.into_draft(&session.username)?;
                state.content.create(draft).await
            }
        }
    }
    .await;

    match saved {
        Ok(_) => redirect(POSTS_PATH),
        Err(e) => {
            if let Some(path) = uploaded {
                state.uploads.discard(&path).await;
            }
            state
                .views
                .failure(&e, "Failed to save post", Some(&session))
        }
    }
}

/// POST /admin/posts/delete/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    session: AdminSession,
    id: web::Path<String>,
) -> HttpResponse {
    let Ok(id) = Uuid::parse_str(&id) else {
        tracing::debug!(id = %id, "Delete of malformed id ignored");
        return redirect(POSTS_PATH);
    };

    match state.content.delete(id).await {
        Ok(()) => redirect(POSTS_PATH),
        Err(e) => state
            .views
            .failure(&e, "Failed to delete post", Some(&session)),
    }
}

/// GET /admin/settings
pub async fn settings(state: web::Data<AppState>, session: AdminSession) -> HttpResponse {
    let config = match state.settings.reload().await {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Could not re-read settings, showing loaded copy");
            state.settings.current()
        }
    };

    let mut context = Context::new();
    context.insert("config", config.as_ref());
    state
        .views
        .page("admin/settings.html", "Site Settings", Some(&session), context)
}

/// POST /admin/settings/save
pub async fn save_settings(
    state: web::Data<AppState>,
    session: AdminSession,
    form: web::Form<SettingsForm>,
) -> HttpResponse {
    let form = form.into_inner();

    if form.site_title.trim().is_empty() {
        return state.views.error(
            StatusCode::BAD_REQUEST,
            "Site title is required",
            Some(&session),
        );
    }

    let mut config = state.settings.current().as_ref().clone();
    config.site.title = form.site_title.trim().to_string();
    config.site.subtitle = form.site_subtitle.trim().to_string();
    config.footer.html = Some(form.footer_html.trim().to_string()).filter(|html| !html.is_empty());
    if let Some(per_page) = form.posts_per_page() {
        config.blog.posts_per_page = per_page;
    }

    match state.settings.replace(config).await {
        Ok(_) => {
            tracing::info!(username = %session.username, "Site settings saved");
            redirect(SETTINGS_PATH)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to save settings");
            state.views.error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save settings",
                Some(&session),
            )
        }
    }
}
