//! HTTP handlers and route configuration.

mod admin;
mod api;
mod health;
mod pages;
mod post_form;

use actix_web::web;

use crate::middleware::security::api_cors;

pub use pages::not_found;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .wrap(api_cors())
            .route("/health", web::get().to(health::health_check))
            .route("/posts", web::get().to(api::posts))
            .route("/posts/{slug}", web::get().to(api::post_by_slug))
            .route("/posts/{id}/views", web::post().to(api::record_view))
            .route("/search", web::get().to(api::search))
            .route("/tags", web::get().to(api::tags))
            .route("/categories", web::get().to(api::categories))
            .route("/archives", web::get().to(api::archives))
            .route("/stats", web::get().to(api::stats)),
    )
    .service(
        web::scope("/admin")
            .route("", web::get().to(admin::index))
            .route("/", web::get().to(admin::index))
            .route("/login", web::get().to(admin::login_page))
            .route("/login", web::post().to(admin::login))
            .route("/logout", web::get().to(admin::logout))
            .route("/dashboard", web::get().to(admin::dashboard))
            .route("/posts", web::get().to(admin::posts))
            .route("/posts/new", web::get().to(admin::new_post))
            .route("/posts/edit/{id}", web::get().to(admin::edit_post))
            .route("/posts/save", web::post().to(admin::save_post))
            .route("/posts/delete/{id}", web::post().to(admin::delete_post))
            .route("/settings", web::get().to(admin::settings))
            .route("/settings/save", web::post().to(admin::save_settings)),
    )
    .route("/", web::get().to(pages::home))
    .route("/post/{slug}", web::get().to(pages::post))
    .route("/archives", web::get().to(pages::archives))
    .route("/tags", web::get().to(pages::tags))
    .route("/categories", web::get().to(pages::categories))
    .route("/search", web::get().to(pages::search))
    .route("/about", web::get().to(pages::about));
}
