use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::Value;
use tempfile::TempDir;

use quill_core::domain::{PostDraft, PostStatus};
use quill_core::ports::{PasswordService, SettingsStore};
use quill_infra::{
    Argon2PasswordService, InMemoryPostRepository, JwtConfig, JwtTokenService, YamlSettingsStore,
};
use quill_shared::dto::LoginForm;

use crate::config::{AdminCredentials, AppConfig};
use crate::handlers;
use crate::middleware::auth::SESSION_COOKIE;
use crate::state::AppState;

const PASSWORD: &str = "s3cret-Pa55";
const BOUNDARY: &str = "XquillBOUNDARY";

struct Fixture {
    state: AppState,
    settings: Arc<YamlSettingsStore>,
    dir: TempDir,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let password_hash = Argon2PasswordService::new().hash(PASSWORD).unwrap();

    let config = AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        #[cfg(feature = "postgres")]
        database: None,
        #[cfg(feature = "postgres")]
        auto_migrate: false,
        site_config_path: dir.path().join("_config.yml"),
        public_dir: dir.path().to_path_buf(),
        upload_dir: dir.path().join("uploads"),
        upload_max_bytes: 1024,
        admin: Some(AdminCredentials {
            username: "admin".into(),
            password_hash,
        }),
    };

    let settings = Arc::new(YamlSettingsStore::open(&config.site_config_path).unwrap());
    let state = AppState::from_parts(
        Arc::new(InMemoryPostRepository::new()),
        settings.clone(),
        Arc::new(JwtTokenService::new(JwtConfig::default())),
        &config,
    )
    .unwrap();

    Fixture {
        state,
        settings,
        dir,
    }
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(crate::middleware::security::security_headers())
                .wrap(actix_web::middleware::Compress::default())
                .app_data(web::Data::new($state.clone()))
                .configure(handlers::configure_routes)
                .default_service(web::to(handlers::not_found)),
        )
        .await
    };
}

async fn publish(state: &AppState, title: &str, content: &str) -> uuid::Uuid {
    state
        .content
        .create(PostDraft {
            title: title.into(),
            content: content.into(),
            status: Some(PostStatus::Published),
            tags: Some(vec!["rust".into()]),
            ..Default::default()
        })
        .await
        .unwrap()
        .id
}

fn admin_cookie(state: &AppState) -> Cookie<'static> {
    let token = state.tokens.generate_token("admin", "admin").unwrap();
    Cookie::new(SESSION_COOKIE, token)
}

fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"featuredImage\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn location<B>(resp: &actix_web::dev::ServiceResponse<B>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[actix_web::test]
async fn test_api_posts_envelope() {
    let fx = fixture();
    publish(&fx.state, "First", "one").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    publish(&fx.state, "Second", "two").await;
    let app = app!(fx.state);

    let req = test::TestRequest::get().uri("/api/posts?page=1&limit=1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "Second");
    assert_eq!(body["pagination"]["currentPage"], 1);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["pagination"]["hasNextPage"], true);
    assert_eq!(body["pagination"]["hasPrevPage"], false);
}

#[actix_web::test]
async fn test_api_posts_oversized_paging() {
    let fx = fixture();
    for i in 0..101 {
        publish(&fx.state, &format!("Post {i}"), "body").await;
    }
    let app = app!(fx.state);

    let req = test::TestRequest::get()
        .uri("/api/posts?limit=18446744073709551615")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 100);
    assert_eq!(body["pagination"]["totalPages"], 2);

    let req = test::TestRequest::get()
        .uri("/api/posts?page=9223372036854775807&limit=100")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["pagination"]["total"], 101);

    let req = test::TestRequest::get()
        .uri("/?page=18446744073709551615")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_security_headers_cors_and_compression() {
    let fx = fixture();
    publish(&fx.state, "Headers", "body").await;
    let app = app!(fx.state);

    let req = test::TestRequest::get()
        .uri("/")
        .insert_header((header::ACCEPT_ENCODING, "gzip"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers();
    let csp = headers
        .get(header::CONTENT_SECURITY_POLICY)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(csp.contains("script-src 'self' https://cdn.jsdelivr.net 'unsafe-inline'"));
    assert!(csp.contains("object-src 'none'"));
    assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
    assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "SAMEORIGIN");
    assert_eq!(headers.get(header::REFERRER_POLICY).unwrap(), "no-referrer");
    assert_eq!(headers.get(header::CONTENT_ENCODING).unwrap(), "gzip");
    assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());

    let req = test::TestRequest::get()
        .uri("/api/tags")
        .insert_header((header::ORIGIN, "https://reader.example"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    assert_eq!(resp.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/posts")
        .insert_header((header::ORIGIN, "https://reader.example"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "GET"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert!(resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[actix_web::test]
async fn test_api_unknown_slug_is_404_envelope() {
    let fx = fixture();
    let app = app!(fx.state);

    let req = test::TestRequest::get().uri("/api/posts/missing").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Post not found");
    assert!(body.get("data").is_none());
}

#[actix_web::test]
async fn test_api_search_echoes_query() {
    let fx = fixture();
    publish(&fx.state, "Learning Rust", "ownership").await;
    let app = app!(fx.state);

    let req = test::TestRequest::get().uri("/api/search?q=RUST").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["query"], "RUST");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::get().uri("/api/search").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["query"], "");
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_api_tags_and_stats() {
    let fx = fixture();
    publish(&fx.state, "A", "a").await;
    publish(&fx.state, "B", "b").await;
    let app = app!(fx.state);

    let req = test::TestRequest::get().uri("/api/tags").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["rust"], 2);

    let req = test::TestRequest::get().uri("/api/stats").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["published"], 2);
    assert_eq!(body["data"]["draft"], 0);
}

#[actix_web::test]
async fn test_api_record_view() {
    let fx = fixture();
    let id = publish(&fx.state, "Counted", "body").await;
    let app = app!(fx.state);

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{id}/views"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(fx.state.content.get_by_id(id).await.unwrap().views, 1);

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/views", uuid::Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_health() {
    let fx = fixture();
    let app = app!(fx.state);

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
    assert_eq!(body["posts"], 0);
}

#[actix_web::test]
async fn test_home_lists_published_posts_only() {
    let fx = fixture();
    publish(&fx.state, "Visible Post", "hello").await;
    fx.state
        .content
        .create(PostDraft {
            title: "Hidden Draft".into(),
            content: "secret".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let app = app!(fx.state);

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.contains("Visible Post"));
    assert!(!html.contains("Hidden Draft"));
    assert!(html.contains("Quill"));
}

#[actix_web::test]
async fn test_post_page_renders_markdown() {
    let fx = fixture();
    publish(&fx.state, "Markdown Post", "Some **bold** words").await;
    let app = app!(fx.state);

    let req = test::TestRequest::get().uri("/post/markdown-post").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.contains("<strong>bold</strong>"));
}

#[actix_web::test]
async fn test_missing_pages_are_404() {
    let fx = fixture();
    let app = app!(fx.state);

    for uri in ["/post/nope", "/no/such/route"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_web::test]
async fn test_public_pages_render() {
    let fx = fixture();
    publish(&fx.state, "Page Check", "text").await;
    let app = app!(fx.state);

    for uri in ["/archives", "/tags", "/categories", "/search?q=page", "/about"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    }
}

#[actix_web::test]
async fn test_admin_requires_session() {
    let fx = fixture();
    let app = app!(fx.state);

    for uri in ["/admin", "/admin/dashboard", "/admin/posts", "/admin/settings"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND, "{uri}");
        assert_eq!(location(&resp), "/admin/login", "{uri}");
    }

    let req = test::TestRequest::get()
        .uri("/admin/dashboard")
        .cookie(Cookie::new(SESSION_COOKIE, "garbage"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/admin/login");
}

#[actix_web::test]
async fn test_login_flow() {
    let fx = fixture();
    let app = app!(fx.state);

    let req = test::TestRequest::post()
        .uri("/admin/login")
        .set_form(LoginForm {
            username: "admin".into(),
            password: PASSWORD.into(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/admin/dashboard");

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .expect("session cookie")
        .into_owned();
    assert_eq!(cookie.http_only(), Some(true));

    let req = test::TestRequest::get()
        .uri("/admin/dashboard")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/admin/login")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/admin/dashboard");
}

#[actix_web::test]
async fn test_login_failures_are_indistinguishable() {
    let fx = fixture();
    let app = app!(fx.state);

    for (username, password) in [("admin", "wrong"), ("nobody", PASSWORD)] {
        let req = test::TestRequest::post()
            .uri("/admin/login")
            .set_form(LoginForm {
                username: username.into(),
                password: password.into(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.response().cookies().next().is_none());
        let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(html.contains("Invalid username or password"));
    }
}

#[actix_web::test]
async fn test_logout_clears_cookie() {
    let fx = fixture();
    let app = app!(fx.state);

    let req = test::TestRequest::get().uri("/admin/logout").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/admin/login");

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .expect("removal cookie");
    assert_eq!(cookie.value(), "");
}

#[actix_web::test]
async fn test_save_post_creates_and_updates() {
    let fx = fixture();
    let cookie = admin_cookie(&fx.state);
    let app = app!(fx.state);

    let body = multipart_body(
        &[
            ("title", "Hello Multipart"),
            ("content", "Body text"),
            ("excerpt", ""),
            ("tags", "rust, web,"),
            ("category", "tech"),
            ("status", "published"),
        ],
        Some(("", "application/octet-stream", &b""[..])),
    );
    let req = test::TestRequest::post()
        .uri("/admin/posts/save")
        .cookie(cookie.clone())
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/admin/posts");

    let post = fx.state.content.get_by_slug("hello-multipart").await.unwrap();
    assert_eq!(post.author, "admin");
    assert_eq!(post.tags, vec!["rust", "web"]);
    assert_eq!(post.category.as_deref(), Some("tech"));
    assert!(post.featured_image.is_none());

    let id = post.id.to_string();
    let body = multipart_body(
        &[
            ("id", id.as_str()),
            ("title", "Hello Again"),
            ("content", "Edited"),
            ("tags", ""),
            ("status", "draft"),
        ],
        Some(("cover.PNG", "image/png", &b"\x89PNG fake"[..])),
    );
    let req = test::TestRequest::post()
        .uri("/admin/posts/save")
        .cookie(cookie)
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let updated = fx.state.content.get_by_id(post.id).await.unwrap();
    assert_eq!(updated.title, "Hello Again");
    assert_eq!(updated.slug, "hello-multipart");
    assert_eq!(updated.status, PostStatus::Draft);
    assert!(updated.tags.is_empty());

    let image = updated.featured_image.expect("image stored");
    assert!(image.starts_with("/uploads/featuredImage-"));
    assert!(image.ends_with(".png"));
    let stored = fx.dir.path().join("uploads").join(image.trim_start_matches("/uploads/"));
    assert!(stored.exists());
}

#[actix_web::test]
async fn test_save_post_rejects_bad_uploads() {
    let fx = fixture();
    let cookie = admin_cookie(&fx.state);
    let app = app!(fx.state);

    let too_big = vec![0u8; 4096];
    let cases: [(&str, &str, &[u8]); 2] = [
        ("logo.svg", "image/svg+xml", &b"<svg/>"[..]),
        ("big.gif", "image/gif", too_big.as_slice()),
    ];

    for (filename, content_type, bytes) in cases {
        let body = multipart_body(
            &[("title", "Rejected"), ("content", "x")],
            Some((filename, content_type, bytes)),
        );
        let req = test::TestRequest::post()
            .uri("/admin/posts/save")
            .cookie(cookie.clone())
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{filename}");
    }

    assert!(fx.state.content.list_all().await.unwrap().is_empty());
    let leftovers = std::fs::read_dir(fx.dir.path().join("uploads"))
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(leftovers, 0);
}

#[actix_web::test]
async fn test_failed_save_discards_uploaded_image() {
    let fx = fixture();
    publish(&fx.state, "Taken", "first").await;
    let cookie = admin_cookie(&fx.state);
    let app = app!(fx.state);

    let cases = [
        ("   ", StatusCode::BAD_REQUEST),
        ("Taken", StatusCode::CONFLICT),
        ("Bad status", StatusCode::BAD_REQUEST),
    ];

    for (title, expected) in cases {
        let status = if title == "Bad status" { "archived" } else { "draft" };
        let body = multipart_body(
            &[("title", title), ("content", "x"), ("status", status)],
            Some(("cover.png", "image/png", &b"\x89PNG fake"[..])),
        );
        let req = test::TestRequest::post()
            .uri("/admin/posts/save")
            .cookie(cookie.clone())
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected, "{title:?}");
    }

    let missing = uuid::Uuid::new_v4().to_string();
    let body = multipart_body(
        &[("id", missing.as_str()), ("title", "Ghost"), ("content", "x")],
        Some(("cover.gif", "image/gif", &b"GIF89a"[..])),
    );
    let req = test::TestRequest::post()
        .uri("/admin/posts/save")
        .cookie(cookie)
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    assert_eq!(fx.state.content.list_all().await.unwrap().len(), 1);
    let leftovers = std::fs::read_dir(fx.dir.path().join("uploads"))
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(leftovers, 0);
}

#[actix_web::test]
async fn test_delete_post_is_idempotent() {
    let fx = fixture();
    let id = publish(&fx.state, "Doomed", "bye").await;
    let cookie = admin_cookie(&fx.state);
    let app = app!(fx.state);

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri(&format!("/admin/posts/delete/{id}"))
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(location(&resp), "/admin/posts");
    }
    assert!(fx.state.content.get_by_id(id).await.is_err());
}

#[actix_web::test]
async fn test_save_settings_rewrites_config() {
    let fx = fixture();
    let cookie = admin_cookie(&fx.state);
    let app = app!(fx.state);

    let req = test::TestRequest::post()
        .uri("/admin/settings/save")
        .cookie(cookie.clone())
        .set_form([
            ("site_title", "My Notebook"),
            ("site_subtitle", "notes"),
            ("footer_html", "<b>hi</b>"),
            ("posts_per_page", "3"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/admin/settings");

    let current = fx.settings.current();
    assert_eq!(current.site.title, "My Notebook");
    assert_eq!(current.footer.html.as_deref(), Some("<b>hi</b>"));
    assert_eq!(current.blog.posts_per_page, 3);

    let written = std::fs::read_to_string(fx.dir.path().join("_config.yml")).unwrap();
    assert!(written.contains("My Notebook"));

    let req = test::TestRequest::get().uri("/").to_request();
    let html = String::from_utf8(test::call_and_read_body(&app, req).await.to_vec()).unwrap();
    assert!(html.contains("My Notebook"));
    assert!(html.contains("<b>hi</b>"));
}
