use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use posturator::catalog::{self, Product};
use posturator::questionnaire::{questionnaire_router, QuestionnaireService, SessionRepository};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub(crate) struct ProductView {
    #[serde(flatten)]
    pub(crate) product: Product,
    pub(crate) price: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            product: product.clone(),
            price: product.price_label(),
        }
    }
}

pub(crate) fn with_questionnaire_routes<R>(service: Arc<QuestionnaireService<R>>) -> axum::Router
where
    R: SessionRepository + 'static,
{
    questionnaire_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/products", axum::routing::get(products_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn products_endpoint() -> Json<Vec<ProductView>> {
    Json(catalog::products().iter().map(ProductView::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{default_eligibility_config, InMemorySessionRepository};
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app(ready: bool) -> (axum::Router, Arc<InMemorySessionRepository>) {
        let repository = Arc::new(InMemorySessionRepository::default());
        let service = Arc::new(QuestionnaireService::new(
            repository.clone(),
            default_eligibility_config(),
        ));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        let router = with_questionnaire_routes(service).layer(Extension(state));
        (router, repository)
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    fn post_json(uri: &str, payload: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request builds")
    }

    #[tokio::test]
    async fn products_endpoint_lists_catalog() {
        let Json(products) = products_endpoint().await;

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].price, "$130.00");
        let payload = serde_json::to_value(&products[1]).expect("serializes");
        assert_eq!(payload["name"], json!("Posturator Sofa"));
        assert_eq!(payload["price_cents"], json!(12_000));
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let (router, _) = app(false);
        let response = router
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let (router, _) = app(true);
        let response = router
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        let (router, _) = app(false);
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn questionnaire_runs_to_completion_over_http() {
        let (router, repository) = app(true);

        let response = router
            .clone()
            .oneshot(
                Request::post("/api/v1/questionnaire/sessions")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = read_json(response).await["session_id"]
            .as_str()
            .expect("session id")
            .to_string();
        let uri = format!("/api/v1/questionnaire/sessions/{id}/answers");

        let answers = [
            json!({"step": "age", "value": "25"}),
            json!({"step": "height", "input": {"unit": "centimetres", "value": "175"}}),
            json!({"step": "weight", "input": {"unit": "kilograms", "value": "70"}}),
            json!({"step": "waist", "input": {"unit": "centimetres", "value": "80"}}),
            json!({"step": "spine_history", "choice": "no"}),
        ];
        for answer in answers {
            let response = router
                .clone()
                .oneshot(post_json(&uri, answer))
                .await
                .expect("route executes");
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert_eq!(repository.len(), 1);

        let response = router
            .oneshot(post_json(
                &uri,
                json!({"step": "back_pain", "has_pain": "yes", "level": 5}),
            ))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json(response).await;
        assert_eq!(payload["session"]["terminal"]["id"], json!("complete"));
        assert_eq!(payload["session"]["terminal"]["pain"]["severity"], json!("moderate"));
        assert_eq!(repository.len(), 0);
    }
}
