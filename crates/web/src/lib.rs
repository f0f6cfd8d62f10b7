//! Inkpost blog library.
//!
//! The router, services and stores live here so the binary stays a thin
//! wiring layer and the whole request path can be tested without a database.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, middleware::from_fn, routing::get};
use tower_http::services::ServeDir;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::middleware::security_headers_middleware;
use crate::state::AppState;

/// Build the application router.
///
/// Tracing, request IDs and Sentry are layered on by the binary; this covers
/// routes, static files, sessions and security headers.
pub fn build_router<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    let static_dir = ServeDir::new(&state.config().static_dir);

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .nest_service("/static", static_dir)
        .fallback(error::not_found)
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{
            HeaderValue, Request, Response, StatusCode,
            header::{CONTENT_SECURITY_POLICY, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        },
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::config::BlogConfig;
    use crate::db::UserStore;
    use crate::db::memory::{MemoryPostStore, MemoryUserStore};
    use crate::middleware::create_session_layer;

    /// Drives the router like a browser: remembers the session cookie.
    struct TestClient {
        app: Router,
        cookie: Option<String>,
        users: MemoryUserStore,
        posts: MemoryPostStore,
    }

    impl TestClient {
        fn new() -> Self {
            let config = BlogConfig::from_lookup(|key| {
                (key == "DATABASE_URL").then(|| "postgres://localhost/inkpost_test".to_owned())
            })
            .unwrap();

            let users = MemoryUserStore::new();
            let posts = MemoryPostStore::new(users.clone());
            let state = AppState::new(
                config.clone(),
                Arc::new(users.clone()),
                Arc::new(posts.clone()),
            );
            let session_layer = create_session_layer(MemoryStore::default(), &config);

            Self {
                app: build_router(state, session_layer),
                cookie: None,
                users,
                posts,
            }
        }

        async fn send(&mut self, mut request: Request<Body>) -> Response<Body> {
            if let Some(cookie) = &self.cookie {
                request
                    .headers_mut()
                    .insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
            }

            let response = self.app.clone().oneshot(request).await.unwrap();

            if let Some(set_cookie) = response.headers().get(SET_COOKIE) {
                let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
                let (_, value) = pair.split_once('=').unwrap();
                self.cookie = (!value.is_empty()).then(|| pair.to_owned());
            }

            response
        }

        async fn get(&mut self, uri: &str) -> Response<Body> {
            self.send(Request::get(uri).body(Body::empty()).unwrap())
                .await
        }

        async fn post_form(&mut self, uri: &str, body: &str) -> Response<Body> {
            let request = Request::post(uri)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_owned()))
                .unwrap();
            self.send(request).await
        }

        async fn page(&mut self, uri: &str) -> String {
            let response = self.get(uri).await;
            assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
            body_text(response).await
        }

        async fn register(&mut self, name: &str, email: &str, password: &str) -> Response<Body> {
            let body = format!("name={name}&email={email}&password={password}");
            self.post_form("/register", &body).await
        }
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response<Body>) -> &str {
        response.headers()[LOCATION].to_str().unwrap()
    }

    const POST_FORM: &str = "title=Hello+World&subtitle=First+post\
                             &img_url=https%3A%2F%2Fimg.example.com%2Fa.png\
                             &body=%3Cp%3EHi%3C%2Fp%3E";

    #[tokio::test]
    async fn test_health() {
        let mut client = TestClient::new();
        let response = client.get("/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_security_headers_present() {
        let mut client = TestClient::new();
        let response = client.get("/about").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(CONTENT_SECURITY_POLICY));
        assert_eq!(response.headers()["x-frame-options"], "DENY");
    }

    #[tokio::test]
    async fn test_static_pages_render() {
        let mut client = TestClient::new();
        assert!(client.page("/about").await.contains("<h1>About</h1>"));
        assert!(client.page("/contact").await.contains("<h1>Contact</h1>"));
    }

    #[tokio::test]
    async fn test_register_post_and_logout_flow() {
        let mut client = TestClient::new();

        let response = client.register("Alice", "a%40x.com", "pw1").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        let home = client.page("/").await;
        assert!(home.contains("Signed in as Alice"));

        let response = client.post_form("/make-post", POST_FORM).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        assert_eq!(client.posts.len(), 1);

        let mine = client.page("/user-posts").await;
        assert_eq!(mine.matches("class=\"post-preview\"").count(), 1);
        assert!(mine.contains("Hello World"));
        assert!(mine.contains("Posted by Alice"));

        let post = client.page("/post/1").await;
        assert!(post.contains("<p>Hi</p>"));

        let response = client.get("/logout").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        let home = client.page("/").await;
        assert!(!home.contains("Signed in as"));
        assert!(!home.contains("Hello World"));
    }

    #[tokio::test]
    async fn test_protected_page_redirects_to_login_with_flash() {
        let mut client = TestClient::new();

        let response = client.get("/make-post").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");

        let login = client.page("/login").await;
        assert!(login.contains("Please log in to access this page."));

        // The flash is shown once.
        let login = client.page("/login").await;
        assert!(!login.contains("Please log in to access this page."));
    }

    #[tokio::test]
    async fn test_anonymous_post_submission_is_rejected() {
        let mut client = TestClient::new();

        let response = client.post_form("/make-post", POST_FORM).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
        assert_eq!(client.posts.len(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let mut client = TestClient::new();
        client.register("Alice", "a%40x.com", "pw1").await;
        client.get("/logout").await;

        let response = client.register("Mallory", "a%40x.com", "pw2").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");

        let login = client.page("/login").await;
        assert!(login.contains("Email already registered"));
        assert!(!login.contains("Signed in as"));
        assert_eq!(client.users.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_login_failures() {
        let mut client = TestClient::new();
        client.register("Alice", "a%40x.com", "pw1").await;
        client.get("/logout").await;

        let response = client
            .post_form("/login", "email=a%40x.com&password=nope")
            .await;
        assert_eq!(location(&response), "/login");
        assert!(client.page("/login").await.contains("Wrong password"));

        let response = client
            .post_form("/login", "email=b%40x.com&password=pw1")
            .await;
        assert_eq!(location(&response), "/login");
        assert!(client.page("/login").await.contains("User does not exist"));

        let response = client
            .post_form("/login", "email=a%40x.com&password=pw1")
            .await;
        assert_eq!(location(&response), "/");
        assert!(client.page("/").await.contains("Signed in as Alice"));
    }

    #[tokio::test]
    async fn test_invalid_forms_rerender() {
        let mut client = TestClient::new();

        let response = client.register("", "not-an-email", "").await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_text(response).await;
        assert!(body.contains("This field is required."));
        assert!(body.contains("value=\"not-an-email\""));

        client.register("Alice", "a%40x.com", "pw1").await;
        let response = client
            .post_form("/make-post", "title=&subtitle=s&img_url=nope&body=b")
            .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(client.posts.len(), 0);

        let too_long = format!(
            "title={}&subtitle=s&img_url=http%3A%2F%2Fimg.example.com%2Fa.png&body=b",
            "t".repeat(300)
        );
        let response = client.post_form("/make-post", &too_long).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(
            body_text(response)
                .await
                .contains("Field cannot be longer than 250 characters.")
        );
        assert_eq!(client.posts.len(), 0);
    }

    #[tokio::test]
    async fn test_session_id_rotates_on_login_and_registration() {
        let mut client = TestClient::new();

        // The login-required flash gives the anonymous visitor a session.
        client.get("/make-post").await;
        let anonymous = client.cookie.clone().unwrap();

        let response = client.register("Alice", "a%40x.com", "pw1").await;
        assert_eq!(location(&response), "/");
        let registered = client.cookie.clone().unwrap();
        assert_ne!(registered, anonymous);

        // The pre-registration ID no longer resolves to anyone.
        client.cookie = Some(anonymous);
        let response = client.get("/make-post").await;
        assert_eq!(location(&response), "/login");

        client.cookie = Some(registered);
        assert!(client.page("/").await.contains("Signed in as Alice"));
        client.get("/logout").await;

        client.get("/make-post").await;
        let anonymous = client.cookie.clone().unwrap();

        let response = client
            .post_form("/login", "email=a%40x.com&password=pw1")
            .await;
        assert_eq!(location(&response), "/");
        let logged_in = client.cookie.clone().unwrap();
        assert_ne!(logged_in, anonymous);

        client.cookie = Some(anonymous);
        let response = client.get("/make-post").await;
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn test_unknown_paths_are_not_found() {
        let mut client = TestClient::new();

        let response = client.get("/no-such-page").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("Page not found"));

        let response = client.get("/post/abc").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        client.register("Alice", "a%40x.com", "pw1").await;
        let response = client.get("/edit-post/abc").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = client.post_form("/delete-post/abc", "").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_post_redirects_home_with_flash() {
        let mut client = TestClient::new();

        let response = client.get("/post/42").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        assert!(client.page("/").await.contains("Post not found"));

        client.register("Alice", "a%40x.com", "pw1").await;
        let response = client.post_form("/edit-post/42", POST_FORM).await;
        assert_eq!(location(&response), "/");
        let response = client.get("/delete-post/42").await;
        assert_eq!(location(&response), "/");
        assert_eq!(client.posts.len(), 0);
    }

    #[tokio::test]
    async fn test_edit_and_delete_by_another_user() {
        let mut client = TestClient::new();
        client.register("Alice", "a%40x.com", "pw1").await;
        client.post_form("/make-post", POST_FORM).await;
        client.get("/logout").await;

        client.register("Bob", "b%40x.com", "pw2").await;
        let form = client.page("/edit-post/1").await;
        assert!(form.contains("value=\"Hello World\""));

        let edited = "title=Rewritten&subtitle=s\
                      &img_url=http%3A%2F%2Fimg.example.com%2Fb.png&body=b";
        let response = client.post_form("/edit-post/1", edited).await;
        assert_eq!(location(&response), "/");

        let post = client.page("/post/1").await;
        assert!(post.contains("Rewritten"));
        assert!(post.contains("Posted by Bob"));

        let response = client.post_form("/delete-post/1", "").await;
        assert_eq!(location(&response), "/");
        assert_eq!(client.posts.len(), 0);
    }
}
