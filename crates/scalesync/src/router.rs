//! HTTP router configuration

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::access::require_allowed_host;
use crate::api::{notifications, status, system};
use crate::state::AppState;

/// Create the application router
///
/// Notification intake and status are gated by the access policy; health and
/// the OpenAPI document are not.
pub fn create_router(state: Arc<AppState>) -> Router {
    let gated = Router::new()
        .route(
            &state.config.listener.notification_path,
            post(notifications::receive),
        )
        .route("/status", get(status::status))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_allowed_host,
        ));

    Router::new()
        // System endpoints
        .route("/health", get(system::health))
        .route("/openapi.json", get(system::openapi))
        .merge(gated)
        // State
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::body::Body;
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::{Request, StatusCode};
    use scalesync_core::ScaleDownAction;
    use scalesync_zabbix::HostStatus;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::test_support::{FakeMonitoring, spawn_reconciler};

    const CONFIG: &str = r#"
[listener]
hosts_allow = "^127\\."

[autoscale]
group_name = "my-asg"
region = "eu-west-1"

[zabbix]
url = "https://zabbix.example/api_jsonrpc.php"
user = "api"
password = "secret"
scale_down_action = "DISABLE"
restrict_to_group_id = 12
"#;

    const TERMINATION: &str = r#"{"Type":"Notification","Message":"{\"Event\":\"autoscaling:EC2_INSTANCE_TERMINATE\",\"EC2InstanceId\":\"host-b\",\"AutoScalingGroupName\":\"my-asg\"}"}"#;

    async fn app_state(action: ScaleDownAction) -> (Arc<AppState>, Arc<FakeMonitoring>) {
        let config = Config::from_toml(CONFIG).unwrap();
        let (actor, monitoring) = spawn_reconciler(action).await;
        let state = AppState::new(actor, Arc::new(config)).unwrap();
        (Arc::new(state), monitoring)
    }

    fn app_from(state: &Arc<AppState>, peer: [u8; 4]) -> Router {
        create_router(state.clone()).layer(MockConnectInfo(SocketAddr::from((peer, 40000))))
    }

    fn post_notification(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "text/plain; charset=UTF-8")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_termination_disables_host() {
        let (state, monitoring) = app_state(ScaleDownAction::Disable).await;

        let response = app_from(&state, [127, 0, 0, 1])
            .oneshot(post_notification(TERMINATION))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({"disposition": "reconciled", "outcome": "disabled"})
        );
        assert_eq!(
            *monitoring.updates.lock().unwrap(),
            vec![("11".to_string(), HostStatus::Disabled)]
        );

        let response = app_from(&state, [127, 0, 0, 1])
            .oneshot(get("/status"))
            .await
            .unwrap();
        let status = json_body(response).await;
        assert_eq!(status["notifications"], 1);
        assert_eq!(status["zabbixHosts"], 2);
        assert_eq!(status["errors"], 0);
    }

    #[tokio::test]
    async fn test_denied_caller_counts_warning() {
        let (state, monitoring) = app_state(ScaleDownAction::Delete).await;

        let response = app_from(&state, [192, 0, 2, 1])
            .oneshot(post_notification(TERMINATION))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Not authorized");
        assert!(monitoring.deletes.lock().unwrap().is_empty());

        let response = app_from(&state, [127, 0, 0, 1])
            .oneshot(get("/status"))
            .await
            .unwrap();
        let status = json_body(response).await;
        assert_eq!(status["warnings"], 1);
        assert_eq!(status["notifications"], 0);
    }

    #[tokio::test]
    async fn test_malformed_notification_is_counted() {
        let (state, _monitoring) = app_state(ScaleDownAction::Delete).await;

        let response = app_from(&state, [127, 0, 0, 1])
            .oneshot(post_notification(r#"{"Type":"Bogus"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "INVALID_NOTIFICATION");

        let status = json_body(
            app_from(&state, [127, 0, 0, 1])
                .oneshot(get("/status"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(status["errors"], 1);
    }

    #[tokio::test]
    async fn test_subscription_confirmation_reconciles_nothing() {
        let (state, monitoring) = app_state(ScaleDownAction::Delete).await;
        let body = r#"{"Type":"SubscriptionConfirmation","SubscribeURL":"https://sns.example/confirm"}"#;

        let response = app_from(&state, [127, 0, 0, 1])
            .oneshot(post_notification(body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await["disposition"],
            "subscription_confirmation"
        );
        assert!(monitoring.deletes.lock().unwrap().is_empty());
        let status = json_body(
            app_from(&state, [127, 0, 0, 1])
                .oneshot(get("/status"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(status["notifications"], 0);
    }

    #[tokio::test]
    async fn test_custom_notification_path_is_routed() {
        let content = CONFIG.replace(
            "[listener]\n",
            "[listener]\nnotification_path = \"/sns/asg-events\"\n",
        );
        let config = Config::from_toml(&content).unwrap();
        let (actor, monitoring) = spawn_reconciler(ScaleDownAction::Disable).await;
        let state = Arc::new(AppState::new(actor, Arc::new(config)).unwrap());
        let mut request = post_notification(TERMINATION);
        *request.uri_mut() = "/sns/asg-events".parse().unwrap();

        let response = app_from(&state, [127, 0, 0, 1])
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(monitoring.updates.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_health_and_openapi_are_not_gated() {
        let (state, _monitoring) = app_state(ScaleDownAction::Delete).await;

        let health = app_from(&state, [192, 0, 2, 1])
            .oneshot(get("/health"))
            .await
            .unwrap();
        let openapi = app_from(&state, [192, 0, 2, 1])
            .oneshot(get("/openapi.json"))
            .await
            .unwrap();

        assert_eq!(health.status(), StatusCode::OK);
        assert_eq!(json_body(health).await["status"], "ok");
        assert_eq!(openapi.status(), StatusCode::OK);
        assert!(json_body(openapi).await["paths"].get("/status").is_some());
    }
}
