use crate::{
    error::{MissingStudentSnafu, RosterError, RosterResult},
    routes::{
        health::get_health,
        index::get_index_route,
        roster_ui::{
            internal_delete_student, internal_get_edit_form, internal_get_students,
            internal_post_student, internal_put_student,
        },
        students::{delete_student, get_student, get_students, post_student, put_student},
    },
    state::RosterState,
};
use axum::{
    Router,
    http::{Method, Uri},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use snafu::OptionExt;
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

pub mod health;
pub mod index;
pub mod roster_ui;
pub mod students;

pub fn router(state: RosterState) -> Router {
    with_layers(routes(), state)
}

fn routes() -> Router<RosterState> {
    Router::new()
        .route("/", get(get_index_route))
        .route("/health", get(get_health))
        .route("/students", get(get_students).post(post_student))
        .route(
            "/students/{id}",
            get(get_student).put(put_student).delete(delete_student),
        )
        .route(
            "/internal/students",
            get(internal_get_students).post(internal_post_student),
        )
        .route(
            "/internal/students/{id}",
            put(internal_put_student).delete(internal_delete_student),
        )
        .route("/internal/students/{id}/edit", get(internal_get_edit_form))
}

fn with_layers(routes: Router<RosterState>, state: RosterState) -> Router {
    routes
        .fallback(route_not_found)
        .method_not_allowed_fallback(route_not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn route_not_found(method: Method, uri: Uri) -> RosterError {
    RosterError::RouteNotFound {
        method,
        path: uri.path().to_string(),
    }
}

#[allow(clippy::needless_pass_by_value)] //signature is fixed by `CatchPanicLayer`
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };

    RosterError::Unhandled { message }.into_response()
}

///anything that isn't a valid id can't name a student either
pub fn parse_id(raw: &str) -> RosterResult<i64> {
    raw.parse().ok().context(MissingStudentSnafu { id: raw })
}

#[cfg(test)]
pub mod test_utils {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    pub async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn call_for_text(router: &Router, request: Request<Body>) -> (StatusCode, String) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{test_utils::call, *};
    use axum::http::StatusCode;

    async fn explode() -> &'static str {
        panic!("something deep went wrong")
    }

    #[tokio::test]
    async fn unknown_routes_are_described() {
        let app = router(RosterState::in_memory().await);

        let (status, body) = call(&app, "GET", "/courses", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Route GET /courses not found");

        let (status, body) = call(&app, "PATCH", "/students", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Route PATCH /students not found");

        let (status, body) = call(&app, "POST", "/health", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Route POST /health not found");
    }

    #[tokio::test]
    async fn panics_become_generic_server_errors() {
        let app = with_layers(
            routes().route("/explode", get(explode)),
            RosterState::in_memory().await,
        );

        let (status, body) = call(&app, "GET", "/explode", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[test]
    fn ids_must_be_numbers() {
        assert_eq!(parse_id("12").unwrap(), 12);
        assert!(matches!(
            parse_id("twelve"),
            Err(RosterError::MissingStudent { .. })
        ));
    }
}
