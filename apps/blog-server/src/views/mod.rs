//! Server-rendered pages.
//!
//! All templates are embedded in the binary and extend `layout.html`. Every
//! render gets the site globals (`site`, `theme`, `menu`, `social`,
//! `footer`) and the signed-in `user`, if any.

mod helpers;
mod markdown;

use std::sync::Arc;

use actix_web::{HttpResponse, http::StatusCode};
use quill_core::DomainError;
use quill_core::ports::SettingsStore;
use tera::{Context, Tera};

use crate::middleware::AdminSession;

/// Template renderer with the embedded theme.
pub struct Views {
    tera: Tera,
    settings: Arc<dyn SettingsStore>,
}

impl Views {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Result<Self, tera::Error> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("../../templates/layout.html")),
            ("index.html", include_str!("../../templates/index.html")),
            ("post.html", include_str!("../../templates/post.html")),
            ("archives.html", include_str!("../../templates/archives.html")),
            ("tags.html", include_str!("../../templates/tags.html")),
            ("categories.html", include_str!("../../templates/categories.html")),
            ("search.html", include_str!("../../templates/search.html")),
            ("about.html", include_str!("../../templates/about.html")),
            ("404.html", include_str!("../../templates/404.html")),
            ("error.html", include_str!("../../templates/error.html")),
            // Admin
            ("admin/login.html", include_str!("../../templates/admin/login.html")),
            (
                "admin/dashboard.html",
                include_str!("../../templates/admin/dashboard.html"),
            ),
            ("admin/posts.html", include_str!("../../templates/admin/posts.html")),
            (
                "admin/edit_post.html",
                include_str!("../../templates/admin/edit_post.html"),
            ),
            (
                "admin/settings.html",
                include_str!("../../templates/admin/settings.html"),
            ),
            // Partials
            (
                "partials/post_list.html",
                include_str!("../../templates/partials/post_list.html"),
            ),
        ])?;

        tera.register_filter("format_date", helpers::format_date);
        tera.register_filter("excerpt", helpers::excerpt);
        tera.register_filter("markdown", helpers::markdown);
        tera.register_function("config", helpers::config_function(settings.clone()));
        tera.register_function("footer_html", helpers::footer_function(settings.clone()));

        Ok(Self { tera, settings })
    }

    /// Render `template` with the site globals merged into `context`.
    pub fn render(
        &self,
        template: &str,
        title: &str,
        user: Option<&AdminSession>,
        mut context: Context,
    ) -> tera::Result<String> {
        let config = self.settings.current();

        context.insert("title", title);
        context.insert("site", &config.site);
        context.insert("theme", &config.theme);
        context.insert("menu", &config.menu);
        context.insert("social", &config.social);
        context.insert("footer", &config.footer);
        context.insert("user", &user);

        self.tera.render(template, &context)
    }

    /// `200 OK` page.
    pub fn page(
        &self,
        template: &str,
        title: &str,
        user: Option<&AdminSession>,
        context: Context,
    ) -> HttpResponse {
        self.respond(StatusCode::OK, template, title, user, context)
    }

    fn respond(
        &self,
        status: StatusCode,
        template: &str,
        title: &str,
        user: Option<&AdminSession>,
        context: Context,
    ) -> HttpResponse {
        match self.render(template, title, user, context) {
            Ok(body) => HttpResponse::build(status)
                .content_type("text/html; charset=utf-8")
                .body(body),
            Err(e) => {
                tracing::error!(template, error = ?e, "Template rendering failed");
                HttpResponse::InternalServerError()
                    .content_type("text/plain; charset=utf-8")
                    .body("Internal Server Error")
            }
        }
    }

    pub fn not_found(&self, user: Option<&AdminSession>) -> HttpResponse {
        self.respond(
            StatusCode::NOT_FOUND,
            "404.html",
            "Page Not Found",
            user,
            Context::new(),
        )
    }

    pub fn error(
        &self,
        status: StatusCode,
        message: &str,
        user: Option<&AdminSession>,
    ) -> HttpResponse {
        let mut context = Context::new();
        context.insert("message", message);
        context.insert("status", &status.as_u16());
        self.respond(status, "error.html", "Error", user, context)
    }

    /// Page for a failed operation: 404 for missing posts, 400/409 for bad
    /// input, and a logged 500 carrying `message` for everything else.
    pub fn failure(
        &self,
        err: &DomainError,
        message: &str,
        user: Option<&AdminSession>,
    ) -> HttpResponse {
        match err {
            DomainError::NotFound { .. } => self.not_found(user),
            DomainError::Validation(msg) => self.error(StatusCode::BAD_REQUEST, msg, user),
            DomainError::Duplicate(msg) => self.error(StatusCode::CONFLICT, msg, user),
            DomainError::Repository(e) => {
                tracing::error!(error = %e, "{}", message);
                self.error(StatusCode::INTERNAL_SERVER_ERROR, message, user)
            }
        }
    }
}
