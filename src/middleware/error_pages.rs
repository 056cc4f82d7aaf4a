//! Pre-rendered bodies for bodiless 401 / 403 / 500 responses.
//!
//! Responses that already carry a body are left as they are.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, HttpBody},
    extract::State,
    http::{HeaderValue, Request, StatusCode, header},
    middleware::{self, Next},
    response::Response,
};

#[derive(Debug, Clone)]
pub struct ErrorPages {
    pub unauthorized: String,
    pub forbidden: String,
    pub internal_error: String,
}

fn page(title: &str) -> String {
    format!("<h1>{title}</h1><br /><a href='/'>Home</a>")
}

impl Default for ErrorPages {
    fn default() -> Self {
        Self {
            unauthorized: page("unauthorized"),
            forbidden: page("forbidden"),
            internal_error: page("internal error"),
        }
    }
}

impl ErrorPages {
    pub fn page_for(&self, status: StatusCode) -> Option<&str> {
        match status {
            StatusCode::UNAUTHORIZED => Some(&self.unauthorized),
            StatusCode::FORBIDDEN => Some(&self.forbidden),
            StatusCode::INTERNAL_SERVER_ERROR => Some(&self.internal_error),
            _ => None,
        }
    }
}

pub fn apply(router: Router, pages: ErrorPages) -> Router {
    router.layer(middleware::from_fn_with_state(
        Arc::new(pages),
        error_pages_middleware,
    ))
}

async fn error_pages_middleware(
    State(pages): State<Arc<ErrorPages>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let res = next.run(req).await;

    let Some(page) = pages.page_for(res.status()) else {
        return res;
    };
    if res.body().size_hint().exact() != Some(0) {
        return res;
    }

    let (mut parts, _) = res.into_parts();
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(page.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body, routing::get};
    use tower::ServiceExt;

    fn app() -> Router {
        let router = Router::new()
            .route("/401", get(|| async { StatusCode::UNAUTHORIZED }))
            .route("/403-body", get(|| async { (StatusCode::FORBIDDEN, "custom") }))
            .route("/404", get(|| async { StatusCode::NOT_FOUND }));
        apply(router, ErrorPages::default())
    }

    async fn call(uri: &str) -> (StatusCode, String) {
        let res = app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn fills_empty_error_bodies() {
        let (status, body) = call("/401").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, "<h1>unauthorized</h1><br /><a href='/'>Home</a>");
    }

    #[tokio::test]
    async fn leaves_existing_bodies_and_other_statuses_alone() {
        assert_eq!(call("/403-body").await, (StatusCode::FORBIDDEN, "custom".to_string()));
        assert_eq!(call("/404").await, (StatusCode::NOT_FOUND, String::new()));
    }
}
