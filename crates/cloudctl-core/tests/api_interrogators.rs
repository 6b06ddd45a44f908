//! Integration tests for the API-backed interrogators using a mock server

use std::time::Duration;

use cloudctl_core::{
    AlwaysConfirm, ApiClient, BulkMutator, Check, CompletionModel, CoreError, Interrogator,
    PollConfig, Poller, RequestCompletion, RequestState, RequestStatusApi, RequestStatusSource,
    ResourceApi, ResourceKind,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(&server.uri(), Some("test-token".to_string())).unwrap()
}

fn lb_kind() -> ResourceKind {
    ResourceKind::NetworkLoadBalancer {
        datacenter_id: "dc-1".to_string(),
    }
}

fn status_body(status: &str) -> serde_json::Value {
    json!({ "metadata": { "status": status, "message": null } })
}

fn fast(timeout: Duration) -> PollConfig {
    PollConfig::new(true, timeout).with_interval(Duration::from_millis(10))
}

// ============================================================================
// Request status
// ============================================================================

#[tokio::test]
async fn test_request_status_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cloudapi/v6/requests/req-1/status"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "req-1/status",
            "metadata": { "status": "FAILED", "message": "quota exceeded" }
        })))
        .mount(&server)
        .await;

    let status = RequestStatusApi::new(client(&server))
        .request_status("req-1")
        .await
        .unwrap();

    assert_eq!(status.state, RequestState::Failed);
    assert_eq!(status.message.as_deref(), Some("quota exceeded"));
}

#[tokio::test]
async fn test_unknown_request_state_stays_pending() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cloudapi/v6/requests/req-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("PAUSED")))
        .mount(&server)
        .await;

    let interrogator = RequestCompletion::new(RequestStatusApi::new(client(&server)));
    let check = interrogator.check("req-1").await.unwrap();
    assert!(!check.is_terminal());
}

#[tokio::test]
async fn test_request_poll_runs_until_done() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cloudapi/v6/requests/req-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("RUNNING")))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cloudapi/v6/requests/req-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("DONE")))
        .expect(1)
        .mount(&server)
        .await;

    let interrogator = RequestCompletion::new(RequestStatusApi::new(client(&server)));
    Poller::new(fast(Duration::from_secs(10)))
        .poll(&interrogator, "req-1")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_request_poll_surfaces_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cloudapi/v6/requests/req-1/status"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;

    let interrogator = RequestCompletion::new(RequestStatusApi::new(client(&server)));
    let err = Poller::new(fast(Duration::from_secs(10)))
        .poll(&interrogator, "req-1")
        .await
        .unwrap_err();

    assert!(err.is_server_error());
    assert!(err.to_string().contains("maintenance"));
}

// ============================================================================
// Resource state and existence
// ============================================================================

#[tokio::test]
async fn test_state_interrogator_reads_metadata_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/databases/postgresql/clusters/c-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "c-1",
            "metadata": { "state": "BUSY" },
            "properties": { "displayName": "orders" }
        })))
        .mount(&server)
        .await;

    let api = ResourceApi::new(client(&server), ResourceKind::PostgresCluster);
    let interrogator = api.state_interrogator();

    assert_eq!(interrogator.model(), CompletionModel::State);
    assert_eq!(
        interrogator.check("c-1").await.unwrap(),
        Check::Pending {
            status: "BUSY".to_string()
        }
    );
}

#[tokio::test]
async fn test_failed_cluster_state_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/databases/postgresql/clusters/c-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": "c-1", "metadata": { "state": "FAILED" } })),
        )
        .mount(&server)
        .await;

    let api = ResourceApi::new(client(&server), ResourceKind::PostgresCluster);
    let err = Poller::new(fast(Duration::from_secs(10)))
        .poll(&api.state_interrogator(), "c-1")
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::OperationFailed { ref status, .. } if status == "FAILED"));
}

#[tokio::test]
async fn test_existence_interrogator_treats_404_as_gone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/databases/postgresql/clusters/c-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "c-1" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/databases/postgresql/clusters/c-1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let api = ResourceApi::new(client(&server), ResourceKind::PostgresCluster);
    let interrogator = api.delete_interrogator().unwrap();
    assert_eq!(interrogator.model(), CompletionModel::Existence);

    assert!(!interrogator.check("c-1").await.unwrap().is_terminal());
    assert_eq!(interrogator.check("c-1").await.unwrap(), Check::Succeeded);
}

// ============================================================================
// Resource API
// ============================================================================

#[tokio::test]
async fn test_list_parses_compute_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cloudapi/v6/datacenters/dc-1/networkloadbalancers"))
        .and(query_param("depth", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "id": "lb-1",
                    "properties": { "name": "edge" },
                    "metadata": { "state": "AVAILABLE" }
                },
                { "id": "lb-2", "properties": { "name": "internal" } }
            ]
        })))
        .mount(&server)
        .await;

    let items = ResourceApi::new(client(&server), lb_kind())
        .list()
        .await
        .unwrap();

    let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["lb-1", "lb-2"]);
    assert_eq!(items[0].name.as_deref(), Some("edge"));
    assert_eq!(items[0].state.as_deref(), Some("AVAILABLE"));
}

#[tokio::test]
async fn test_list_parses_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/tokens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tokens": [ { "id": "t-1" }, { "id": "t-2" } ]
        })))
        .mount(&server)
        .await;

    let items = ResourceApi::new(client(&server), ResourceKind::Token)
        .list()
        .await
        .unwrap();
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn test_delete_returns_request_from_location() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/cloudapi/v6/datacenters/dc-1/networkloadbalancers/lb-1"))
        .respond_with(ResponseTemplate::new(202).insert_header(
            "Location",
            format!("{}/cloudapi/v6/requests/req-42/status", server.uri()).as_str(),
        ))
        .mount(&server)
        .await;

    let request = ResourceApi::new(client(&server), lb_kind())
        .delete("lb-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(request.request_id, "req-42");
}

#[tokio::test]
async fn test_delete_of_missing_resource_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/auth/v1/tokens/t-9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = ResourceApi::new(client(&server), ResourceKind::Token)
        .delete("t-9")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_update_wraps_properties() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/databases/postgresql/clusters/c-1"))
        .and(body_json(json!({ "properties": { "instances": 3 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "c-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let api = ResourceApi::new(client(&server), ResourceKind::PostgresCluster);
    let request = api.update("c-1", &json!({ "instances": 3 })).await.unwrap();
    assert!(request.is_none());
}

#[tokio::test]
async fn test_update_without_properties_is_rejected() {
    let server = MockServer::start().await;
    let api = ResourceApi::new(client(&server), ResourceKind::PostgresCluster);

    let err = api.update("c-1", &json!({})).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

// ============================================================================
// Bulk delete end to end
// ============================================================================

#[tokio::test]
async fn test_bulk_delete_waits_for_each_request_and_reports_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cloudapi/v6/datacenters/dc-1/networkloadbalancers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [ { "id": "lb-1" }, { "id": "lb-2" }, { "id": "lb-3" } ]
        })))
        .mount(&server)
        .await;
    for id in ["lb-1", "lb-3"] {
        Mock::given(method("DELETE"))
            .and(path(format!(
                "/cloudapi/v6/datacenters/dc-1/networkloadbalancers/{id}"
            )))
            .respond_with(ResponseTemplate::new(202).insert_header(
                "Location",
                format!("/cloudapi/v6/requests/req-{id}/status").as_str(),
            ))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/cloudapi/v6/requests/req-{id}/status")))
            .respond_with(ResponseTemplate::new(200).set_body_json(status_body("DONE")))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("DELETE"))
        .and(path("/cloudapi/v6/datacenters/dc-1/networkloadbalancers/lb-2"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "messages": [ { "message": "load balancer is in use" } ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = ResourceApi::new(client(&server), lb_kind());
    let items = api.list().await.unwrap();
    let interrogator = api.delete_interrogator();
    let poller = Poller::new(fast(Duration::from_secs(5)));

    let outcome = BulkMutator::new(api.kind().noun(), &AlwaysConfirm, &poller)
        .run(&items, &api, interrogator.as_deref())
        .await
        .unwrap();

    let err = outcome.into_result().unwrap_err();
    let CoreError::Bulk(failure) = &err else {
        panic!("expected bulk failure, got {err:?}");
    };
    assert_eq!(failure.failed_ids().collect::<Vec<_>>(), vec!["lb-2"]);
    assert!(err.to_string().contains("load balancer is in use"));
}
