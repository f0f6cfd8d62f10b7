//! Static page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};

use crate::filters;
use crate::middleware::Layout;
use crate::state::AppState;

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub layout: Layout,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub layout: Layout,
    pub contact_email: Option<String>,
}

/// Display the about page.
pub async fn about(layout: Layout) -> impl IntoResponse {
    AboutTemplate { layout }
}

/// Display the contact page.
pub async fn contact(State(state): State<AppState>, layout: Layout) -> impl IntoResponse {
    ContactTemplate {
        layout,
        contact_email: state.config().contact_email.clone(),
    }
}
