pub mod health;
pub mod landing;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::config::AllowedOrigins;
use crate::rate_limit::rate_limit_middleware;
use crate::report::handlers as report_handlers;
use crate::risk::handlers as risk_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Only the scoring endpoints count against the per-client quota.
    let limited = Router::new()
        .route("/analyze", post(risk_handlers::handle_analyze))
        .route(
            "/generate-report",
            post(report_handlers::handle_generate_report),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .route("/", get(landing::landing_handler))
        .route("/health", get(health::health_handler))
        .merge(limited)
        .layer(DefaultBodyLimit::max(state.config.max_content_length))
        .with_state(state)
}

/// Builds the CORS layer from the configured origin policy.
/// Origins that are not valid header values are skipped with a warning.
pub fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    match origins {
        AllowedOrigins::Any => layer.allow_origin(Any),
        AllowedOrigins::List(list) => {
            let parsed: Vec<HeaderValue> = list
                .iter()
                .filter_map(|o| match o.parse::<HeaderValue>() {
                    Ok(v) => Some(v),
                    Err(_) => {
                        warn!("Ignoring invalid CORS origin '{o}'");
                        None
                    }
                })
                .collect();
            layer.allow_origin(parsed)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use axum::{
        body::Body,
        extract::ConnectInfo,
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::explain::FallbackExplainer;
    use crate::rate_limit::RateLimiter;
    use crate::report::default_page_config;
    use crate::risk::{RiskEngine, RiskProfile};

    fn app_with(vars: &[(&str, &str)]) -> Router {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let config = Config::from_vars(|key| {
            vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })
        .unwrap();

        let engine = RiskEngine::new(RiskProfile::by_name(&config.risk_profile).unwrap())
            .with_hospital_map(config.include_hospital_map);

        let state = AppState {
            engine: Arc::new(engine),
            explainer: Arc::new(FallbackExplainer),
            rate_limiter: Arc::new(RateLimiter::new(config.rate_limit)),
            page_config: default_page_config(),
            config,
        };
        build_router(state)
    }

    fn app() -> Router {
        app_with(&[("RATE_LIMIT", "1000 per minute")])
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_landing_page() {
        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains("CareBridge AI"));
    }

    #[tokio::test]
    async fn test_health_reports_profile() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "carebridge-api");
        assert_eq!(body["profile"], "canonical");
        assert_eq!(body["profile_version"], 2);
        assert_eq!(body["explainer"], "static");
    }

    #[tokio::test]
    async fn test_analyze_low_risk() {
        let response = app()
            .oneshot(post_json("/analyze", r#"{"symptoms":"fever, cough","age":30}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["risk"], "Low");
        assert_eq!(body["confidence"], 75.0);
        assert_eq!(
            body["explanation"],
            "Fever detected | Cough detected. Rest, hydrate and monitor symptoms"
        );
        assert_eq!(
            body["hospital_map"],
            "https://www.google.com/search?q=home+care+tips"
        );
    }

    #[tokio::test]
    async fn test_analyze_string_age() {
        let response = app()
            .oneshot(post_json("/analyze", r#"{"symptoms":"","age":"61"}"#))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["risk"], "Low");
        assert_eq!(body["confidence"], 75.0);
        assert_eq!(
            body["explanation"],
            "Senior age risk factor. Rest, hydrate and monitor symptoms"
        );
    }

    #[tokio::test]
    async fn test_analyze_emergency() {
        let response = app()
            .oneshot(post_json("/analyze", r#"{"symptoms":"Emergency","age":30,"location":"Pune"}"#))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["risk"], "EMERGENCY");
        assert_eq!(body["confidence"], 95.0);
    }

    #[tokio::test]
    async fn test_analyze_empty_object_defaults() {
        let response = app().oneshot(post_json("/analyze", "{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["risk"], "Low");
        assert_eq!(body["confidence"], 65.0);
        assert_eq!(body["explanation"], "Rest, hydrate and monitor symptoms");
    }

    #[tokio::test]
    async fn test_analyze_invalid_age_is_400() {
        for body in [
            r#"{"symptoms":"fever","age":"abc"}"#,
            r#"{"symptoms":"fever","age":-4}"#,
        ] {
            let response = app().oneshot(post_json("/analyze", body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body = body_json(response).await;
            assert_eq!(body["risk"], "Error");
            assert_eq!(body["confidence"], 0);
        }
    }

    #[tokio::test]
    async fn test_analyze_malformed_body_is_400() {
        let response = app()
            .oneshot(post_json("/analyze", "{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["risk"], "Error");

        let missing_content_type = Request::builder()
            .method("POST")
            .uri("/analyze")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(missing_content_type).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_without_hospital_map() {
        let app = app_with(&[("INCLUDE_HOSPITAL_MAP", "false")]);
        let response = app
            .oneshot(post_json("/analyze", r#"{"symptoms":"fever","age":30}"#))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert!(body.get("hospital_map").is_none());
    }

    #[tokio::test]
    async fn test_legacy_profile_is_selectable() {
        let app = app_with(&[("RISK_PROFILE", "legacy")]);
        let response = app
            .oneshot(post_json("/analyze", r#"{"symptoms":"fever, cough","age":30}"#))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["risk"], "Moderate");
        assert_eq!(body["confidence"], 82.0);
    }

    #[tokio::test]
    async fn test_generate_report_returns_pdf() {
        let response = app()
            .oneshot(post_json(
                "/generate-report",
                r#"{"symptoms":"fever, vomiting","age":42,"location":"Pune"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/pdf");
        assert_eq!(
            response.headers()["content-disposition"],
            "attachment; filename=\"CareBridge_Report.pdf\""
        );
        let bytes = body_bytes(response).await;
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_generate_report_invalid_age_is_400() {
        let response = app()
            .oneshot(post_json("/generate-report", r#"{"age":"old"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    fn analyze_from(peer: &str, forwarded: Option<&str>) -> Request<Body> {
        let mut req = post_json("/analyze", r#"{"symptoms":"fever","age":30}"#);
        if let Some(f) = forwarded {
            req.headers_mut()
                .insert("x-forwarded-for", f.parse().unwrap());
        }
        let addr: SocketAddr = peer.parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        req
    }

    #[tokio::test]
    async fn test_rate_limit_keys_on_peer_address() {
        let app = app_with(&[("RATE_LIMIT", "2 per minute")]);

        // Rotating X-Forwarded-For does not escape the quota when the proxy is not trusted.
        for (i, expected) in [StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]
            .into_iter()
            .enumerate()
        {
            let forwarded = format!("203.0.113.{i}");
            let response = app
                .clone()
                .oneshot(analyze_from("198.51.100.4:5000", Some(&forwarded)))
                .await
                .unwrap();
            assert_eq!(response.status(), expected);
            if expected == StatusCode::TOO_MANY_REQUESTS {
                assert_eq!(body_json(response).await["risk"], "Error");
            }
        }

        // Another peer has its own bucket.
        let response = app
            .clone()
            .oneshot(analyze_from("198.51.100.5:5000", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Health checks are not rate limited.
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rate_limit_trusts_forwarded_for_behind_proxy() {
        let app = app_with(&[("RATE_LIMIT", "2 per minute"), ("TRUST_PROXY", "true")]);
        let proxy = "10.0.0.1:8000";

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(analyze_from(proxy, Some("203.0.113.7")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        let response = app
            .clone()
            .oneshot(analyze_from(proxy, Some("203.0.113.7")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        // A different client behind the same proxy is still served.
        let response = app
            .oneshot(analyze_from(proxy, Some("203.0.113.8")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_body_limit() {
        let app = app_with(&[("MAX_CONTENT_LENGTH", "64")]);
        let body = format!(r#"{{"symptoms":"{}","age":30}}"#, "fever ".repeat(50));
        let response = app.oneshot(post_json("/analyze", &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = app()
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_cors_layer_builds_for_both_policies() {
        let _ = cors_layer(&AllowedOrigins::Any);
        let _ = cors_layer(&AllowedOrigins::List(vec![
            "https://anshkunj.github.io".to_string(),
            "bad\norigin".to_string(),
        ]));
    }
}
