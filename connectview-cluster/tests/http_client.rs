//! HTTP client and failover tests against a mock connect REST API

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{basic_auth, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use connectview_cluster::client::http::build_http_client;
use connectview_cluster::discovery::{Endpoint, EndpointHealth, EndpointSet};
use connectview_cluster::{ClientError, ConnectClient, FailoverSelector, HttpConnectClient};
use connectview_core::models::{ConnectorConfig, ConnectorState, NewConnector, TaskState};
use connectview_core::resilience::timeout::TimeoutConfig;
use connectview_core::Error;

fn client(server: &MockServer) -> HttpConnectClient {
    HttpConnectClient::new(&server.uri(), reqwest::Client::new()).unwrap()
}

#[tokio::test]
async fn test_list_connectors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/connectors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["sink-1", "src-2"])))
        .expect(1)
        .mount(&server)
        .await;

    let names = client(&server).list_connectors().await.unwrap();
    assert_eq!(names, vec!["sink-1".to_string(), "src-2".to_string()]);
}

#[tokio::test]
async fn test_status_and_task_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/connectors/sink-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "sink-1",
            "connector": {"state": "RUNNING", "worker_id": "10.0.0.1:8083"},
            "tasks": [{"id": 0, "state": "FAILED", "worker_id": "10.0.0.1:8083", "trace": "boom"}],
            "type": "sink"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/connectors/sink-1/tasks/0/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 0, "state": "FAILED", "worker_id": "10.0.0.1:8083", "trace": "boom"
        })))
        .mount(&server)
        .await;

    let http = client(&server);
    let status = http.get_connector_status("sink-1").await.unwrap();
    assert_eq!(status.connector.state, ConnectorState::Running);
    assert_eq!(status.connector_type.as_deref(), Some("sink"));

    let task = http.get_task_status("sink-1", 0).await.unwrap();
    assert_eq!(task.state, TaskState::Failed);
    assert_eq!(task.trace.as_deref(), Some("boom"));
}

#[tokio::test]
async fn test_remote_error_message_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/connectors/missing/config"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error_code": 404,
            "message": "Connector missing not found"
        })))
        .mount(&server)
        .await;

    let err = client(&server).get_connector_config("missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(!err.is_endpoint_failure());
    assert_eq!(err.to_string(), "HTTP error 404 Not Found: Connector missing not found");
}

#[tokio::test]
async fn test_create_sends_body() {
    let server = MockServer::start().await;
    let mut config = ConnectorConfig::new();
    config.insert("connector.class".to_string(), "FileStreamSink".to_string());

    Mock::given(method("POST"))
        .and(path("/connectors"))
        .and(body_json(json!({"name": "sink-1", "config": {"connector.class": "FileStreamSink"}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "sink-1",
            "config": {"connector.class": "FileStreamSink", "name": "sink-1"},
            "tasks": [],
            "type": "sink"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = client(&server)
        .create_connector(&NewConnector { name: "sink-1".to_string(), config })
        .await
        .unwrap();
    assert_eq!(created.name, "sink-1");
    assert!(created.tasks.is_empty());
}

#[tokio::test]
async fn test_restart_passes_flags() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/connectors/sink-1/restart"))
        .and(query_param("includeTasks", "false"))
        .and(query_param("onlyFailed", "false"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).restart_connector("sink-1", false, false).await.unwrap();
}

#[tokio::test]
async fn test_lifecycle_calls_use_put() {
    let server = MockServer::start().await;
    for action in ["pause", "stop", "resume"] {
        Mock::given(method("PUT"))
            .and(path(format!("/connectors/sink-1/{action}")))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;
    }

    let http = client(&server);
    http.pause_connector("sink-1").await.unwrap();
    http.stop_connector("sink-1").await.unwrap();
    http.resume_connector("sink-1").await.unwrap();
}

#[tokio::test]
async fn test_topics_and_offsets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/connectors/sink-1/topics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sink-1": {"topics": ["orders", "payments"]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/connectors/sink-1/offsets"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error_code": 400,
            "message": "Connectors must be in the STOPPED state before their offsets can be modified"
        })))
        .mount(&server)
        .await;

    let http = client(&server);
    let topics = http.get_connector_topics("sink-1").await.unwrap();
    assert_eq!(topics["sink-1"].topics, vec!["orders".to_string(), "payments".to_string()]);

    let err = http.reset_connector_offsets("sink-1").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_basic_auth_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/connector-plugins"))
        .and(basic_auth("admin", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"class": "org.apache.kafka.connect.file.FileStreamSinkConnector", "type": "sink", "version": "3.7.0"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let plugins = client(&server)
        .with_basic_auth("admin", Some("secret".to_string()))
        .list_plugins()
        .await
        .unwrap();
    assert_eq!(plugins.len(), 1);
    assert_eq!(plugins[0].plugin_type.as_deref(), Some("sink"));
}

#[tokio::test]
async fn test_response_size_is_bounded() {
    let server = MockServer::start().await;
    let names: Vec<String> = (0..100).map(|i| format!("connector-{i}")).collect();
    Mock::given(method("GET"))
        .and(path("/connectors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(names)))
        .mount(&server)
        .await;

    let err = client(&server)
        .with_max_response_bytes(64)
        .list_connectors()
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::ResponseTooLarge { max: 64, .. }));
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/connectors"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let timeouts = TimeoutConfig::new().with_request_timeout(Duration::from_millis(200));
    let http = HttpConnectClient::new(&server.uri(), build_http_client(timeouts).unwrap()).unwrap();

    let err = http.list_connectors().await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout(_)));
    assert!(err.is_endpoint_failure());
}

#[tokio::test]
async fn test_failover_skips_dead_and_failing_workers() {
    let failing = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/connectors"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&failing)
        .await;

    let healthy = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/connectors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["sink-1"])))
        .expect(2)
        .mount(&healthy)
        .await;

    let pool = reqwest::Client::new();
    // Nothing listens on port 1
    let dead = HttpConnectClient::new("http://127.0.0.1:1", pool.clone()).unwrap();
    let endpoints = EndpointSet::new(vec![
        Endpoint::new("http://127.0.0.1:1", Arc::new(dead)),
        Endpoint::new(failing.uri(), Arc::new(HttpConnectClient::new(&failing.uri(), pool.clone()).unwrap())),
        Endpoint::new(healthy.uri(), Arc::new(HttpConnectClient::new(&healthy.uri(), pool).unwrap())),
    ]);
    let selector = FailoverSelector::new("first", endpoints).with_cooldown(Duration::from_secs(60));

    for _ in 0..2 {
        let names = selector
            .call_list(|c| async move { c.list_connectors().await })
            .await
            .unwrap();
        assert_eq!(names, vec!["sink-1".to_string()]);
    }

    let states = selector.endpoint_states();
    assert!(matches!(states[0].health, EndpointHealth::Suspected { .. }));
    assert!(matches!(states[1].health, EndpointHealth::Suspected { .. }));
    assert_eq!(states[2].health, EndpointHealth::Healthy);
}

#[tokio::test]
async fn test_failover_gives_up_when_all_unreachable() {
    let pool = reqwest::Client::new();
    let endpoints = EndpointSet::new(vec![Endpoint::new(
        "http://127.0.0.1:1",
        Arc::new(HttpConnectClient::new("http://127.0.0.1:1", pool).unwrap()),
    )]);
    let selector = FailoverSelector::new("first", endpoints);

    let err = selector
        .call(|c| async move { c.get_connector("sink-1").await })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoReachableEndpoint(ref name) if name == "first"));
}
