use crate::controller::{health_check_controller, topic_controller};
use crate::sse::handler as sse_handler;
use crate::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use log::*;
use service::config::Config;
use tower_http::cors::{AllowOrigin, CorsLayer};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI document. To be a part
// of the rendered document, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "SSE Broker API"
        ),
        paths(
            health_check_controller::health_check,
            sse_handler::subscribe,
            topic_controller::publish,
        ),
        tags(
            (name = "sse_broker", description = "Topic publish/subscribe over Server-Sent Events")
        )
    )]
struct ApiDoc;

/// All routes. `health` and `rapidoc` are static segments and take priority over topic names.
pub fn define_routes(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.config);

    Router::new()
        .merge(health_routes())
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
        .merge(topic_routes(app_state))
        .layer(cors)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn topic_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/{topic}",
            get(sse_handler::subscribe).post(topic_controller::publish),
        )
        .with_state(app_state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin}: {e}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use clap::Parser;
    use http_body_util::BodyExt;
    use sse::Broker;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_app_state() -> AppState {
        let config = Config::try_parse_from(["sse_broker"])
            .unwrap()
            .set_subscription_timeout(Duration::from_millis(10));
        AppState::new(config, &Arc::new(Broker::default()))
    }

    fn publish_request(topic: &str, message: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/{topic}"))
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from(message.to_string()))
            .unwrap()
    }

    fn subscribe_request(topic: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(format!("/{topic}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = define_routes(test_app_state());

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"healthy");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_not_found() {
        let state = test_app_state();
        let app = define_routes(state.clone());

        let response = app
            .oneshot(publish_request("testtopic", "test"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(state.broker.topic_count(), 0);
    }

    #[tokio::test]
    async fn test_pub_sub_responses() {
        let state = test_app_state();
        let app = define_routes(state.clone());

        let response = app
            .clone()
            .oneshot(subscribe_request("testtopic"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/event-stream"
        );

        let published = app
            .oneshot(publish_request("testtopic", "test"))
            .await
            .unwrap();
        assert_eq!(published.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_stream_delivers_events_then_times_out() {
        let state = test_app_state();
        let app = define_routes(state.clone());

        let stream_response = app
            .clone()
            .oneshot(subscribe_request("alerts"))
            .await
            .unwrap();
        for message in ["fire", "flood"] {
            let response = app
                .clone()
                .oneshot(publish_request("alerts", message))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
        }

        let body = stream_response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes();
        let text = String::from_utf8(body.to_vec()).unwrap();

        let fire = text.find("data: fire\n").unwrap();
        let flood = text.find("data: flood\n").unwrap();
        let timeout = text.find("event: timeout\n").unwrap();
        assert!(fire < flood && flood < timeout);
        assert!(text.contains("id: 1\n"));
        assert!(text.contains("id: 2\n"));
        assert_eq!(text.matches("event: msg\n").count(), 2);
        assert_eq!(text.matches("event: timeout\n").count(), 1);
        assert!(text.contains("data: 10ms\n"));

        assert_eq!(state.broker.subscriber_count("alerts"), Some(0));
    }

    #[tokio::test]
    async fn test_publish_after_stream_ended_still_succeeds() {
        let state = test_app_state();
        let app = define_routes(state.clone());

        let stream_response = app
            .clone()
            .oneshot(subscribe_request("expired"))
            .await
            .unwrap();
        stream_response.into_body().collect().await.unwrap();

        let response = app
            .oneshot(publish_request("expired", "late"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(state.broker.subscriber_count("expired"), Some(0));
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let app = define_routes(test_app_state());

        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "http://localhost:3000"
        );
    }

    #[tokio::test]
    async fn test_openapi_document_lists_topic_route() {
        let app = define_routes(test_app_state());

        let request = Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("/{topic}"));
        assert!(text.contains("/health"));
    }
}
