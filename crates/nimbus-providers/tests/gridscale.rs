//! gridscale dialect against the scripted server

#[path = "../../nimbus-core/tests/support/mod.rs"]
mod support;

use std::env;
use std::time::Duration;

use nimbus_core::{Context, ErrorKind};
use nimbus_providers::gridscale::{
    self, GridscaleClient, NetworkCreateRequest, PaaSServiceUpdateRequest, ServerCreateRequest,
    ServerUpdateRequest,
};
use serde_json::{json, Value};
use serial_test::serial;
use support::{MockServer, Scripted};

const SERVER_ID: &str = "2e2a3ae6-6f1c-4d8b-9a32-6a1d3c0f1e11";
const REQUEST_ID: &str = "7f0c1b2a-4c3d-4e5f-8a9b-0c1d2e3f4a5b";

fn client(server: &MockServer) -> GridscaleClient {
    let config = gridscale::default_config("user-42", "secret-token")
        .base_url(server.url())
        .delay(Duration::from_millis(10))
        .build()
        .unwrap();
    GridscaleClient::new(config).unwrap()
}

fn server_body(power: bool) -> Value {
    json!({
        "server": {
            "object_uuid": SERVER_ID,
            "name": "node-1",
            "cores": 2,
            "memory": 4,
            "power": power,
            "status": "active"
        }
    })
}

fn request_status(state: &str) -> Value {
    json!({ REQUEST_ID: { "status": state, "create_time": "2024-03-01T10:00:00Z" } })
}

#[tokio::test]
async fn test_create_server_waits_and_mirrors_uuid() {
    let server = MockServer::start().await;
    server.on(
        "POST",
        "/objects/servers",
        Scripted::json(202, json!({"object_uuid": SERVER_ID, "request_uuid": REQUEST_ID})),
    );
    let status_path = format!("/requests/{}", REQUEST_ID);
    server
        .on("GET", &status_path, Scripted::json(200, request_status("pending")))
        .on("GET", &status_path, Scripted::json(200, request_status("done")));

    let body = ServerCreateRequest {
        name: "node-1".to_string(),
        memory: 4,
        cores: 2,
        ..Default::default()
    };
    let created = client(&server)
        .create_server(&Context::background(), &body)
        .await
        .unwrap();

    assert_eq!(created.server_uuid, SERVER_ID);
    assert_eq!(created.object_uuid, SERVER_ID);
    assert_eq!(server.count("GET", &status_path), 2);

    let post = &server.requests()[0];
    assert_eq!(post.header("x-auth-userid"), Some("user-42"));
    assert_eq!(post.header("x-auth-token"), Some("secret-token"));
    assert!(post
        .header("user-agent")
        .unwrap()
        .starts_with("nimbus-gridscale/"));
    let sent: Value = serde_json::from_slice(&post.body).unwrap();
    assert_eq!(sent, json!({"name": "node-1", "memory": 4, "cores": 2}));
}

#[tokio::test]
async fn test_failed_provisioning_is_internal() {
    let server = MockServer::start().await;
    server.on(
        "POST",
        "/objects/networks",
        Scripted::json(202, json!({"object_uuid": SERVER_ID, "request_uuid": REQUEST_ID})),
    );
    server.on(
        "GET",
        &format!("/requests/{}", REQUEST_ID),
        Scripted::json(
            200,
            json!({ REQUEST_ID: { "status": "failed", "message": "no capacity" } }),
        ),
    );

    let err = client(&server)
        .create_network(
            &Context::background(),
            &NetworkCreateRequest {
                name: "private".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(err.to_string().contains("no capacity"));
}

#[tokio::test]
async fn test_start_server_waits_for_power() {
    let server = MockServer::start().await;
    let path = format!("/objects/servers/{}", SERVER_ID);
    let power_path = format!("{}/power", path);
    server
        .on("GET", &path, Scripted::json(200, server_body(false)))
        .on("GET", &path, Scripted::json(200, server_body(false)))
        .on("GET", &path, Scripted::json(200, server_body(true)));
    server.on("PATCH", &power_path, Scripted::empty(204));

    client(&server)
        .start_server(&Context::background(), SERVER_ID)
        .await
        .unwrap();

    assert_eq!(server.count("PATCH", &power_path), 1);
    assert_eq!(server.count("GET", &path), 3);
    let patch = server
        .requests()
        .into_iter()
        .find(|r| r.method == "PATCH")
        .unwrap();
    let sent: Value = serde_json::from_slice(&patch.body).unwrap();
    assert_eq!(sent, json!({"power": true}));
}

#[tokio::test]
async fn test_stop_server_already_off_is_noop() {
    let server = MockServer::start().await;
    let path = format!("/objects/servers/{}", SERVER_ID);
    server.on("GET", &path, Scripted::json(200, server_body(false)));

    client(&server)
        .stop_server(&Context::background(), SERVER_ID)
        .await
        .unwrap();

    assert_eq!(server.count("PATCH", &format!("{}/power", path)), 0);
    assert_eq!(server.count("GET", &path), 1);
}

#[tokio::test]
async fn test_power_wait_bounded_by_deadline() {
    let server = MockServer::start().await;
    let path = format!("/objects/servers/{}", SERVER_ID);
    server.on("GET", &path, Scripted::json(200, server_body(false)));

    let ctx = Context::background().with_timeout(Duration::from_millis(150));
    let err = client(&server)
        .wait_for_server_power(&ctx, SERVER_ID, true)
        .await
        .unwrap_err();

    assert!(err.is(ErrorKind::Timeout));
    assert!(server.count("GET", &path) >= 2);
}

#[tokio::test]
async fn test_ids_validated_before_dispatch() {
    let server = MockServer::start().await;
    let client = client(&server);
    let ctx = Context::background();

    let err = client.get_server(&ctx, "").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IdEmpty);

    let err = client.delete_storage(&ctx, "not-a-uuid").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);

    let err = client
        .update_server(&ctx, "xyz", &ServerUpdateRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);

    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_server_list_and_not_found() {
    let server = MockServer::start().await;
    let other = "0b7d1e9c-2f3a-4b5c-8d6e-7f8091a2b3c4";
    server.on(
        "GET",
        "/objects/servers",
        Scripted::json(
            200,
            json!({"servers": {
                SERVER_ID: {"object_uuid": SERVER_ID, "name": "node-1", "power": true},
                other: {"object_uuid": other, "name": "node-2"}
            }}),
        ),
    );
    server.on(
        "GET",
        &format!("/objects/servers/{}", other),
        Scripted::json(404, json!({"status": 404, "message": "Object not found"}))
            .header("x-request-id", "req-404"),
    );

    let client = client(&server);
    let ctx = Context::background();

    let servers = client.get_server_list(&ctx).await.unwrap();
    assert_eq!(servers.len(), 2);
    assert!(servers.iter().any(|s| s.name == "node-1" && s.power));

    let err = client.get_server(&ctx, other).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.to_string().contains("Request UUID: req-404"));
}

#[tokio::test]
async fn test_delete_server_skips_wait_without_request_uuid() {
    let server = MockServer::start().await;
    let path = format!("/objects/servers/{}", SERVER_ID);
    server.on("DELETE", &path, Scripted::empty(204));

    client(&server)
        .delete_server(&Context::background(), SERVER_ID)
        .await
        .unwrap();

    assert_eq!(server.requests().len(), 1);
}

const PAAS_ID: &str = "5c1e9a7b-3d2f-4e6a-9b8c-1d2e3f4a5b6c";

fn paas_body(workers: f64) -> Value {
    json!({
        "paas_service": {
            "object_uuid": PAAS_ID,
            "name": "k8s-prod",
            "status": "active",
            "service_template_category": "kubernetes",
            "parameters": {
                "k8s_worker_node_count": workers,
                "k8s_worker_node_cores": 2,
                "k8s_worker_node_ram": 4
            }
        }
    })
}

#[tokio::test]
async fn test_shutdown_server_waits_for_power_off() {
    let server = MockServer::start().await;
    let path = format!("/objects/servers/{}", SERVER_ID);
    let shutdown_path = format!("{}/shutdown", path);
    server
        .on("GET", &path, Scripted::json(200, server_body(true)))
        .on("GET", &path, Scripted::json(200, server_body(true)))
        .on("GET", &path, Scripted::json(200, server_body(false)));
    server.on("PATCH", &shutdown_path, Scripted::empty(204));

    client(&server)
        .shutdown_server(&Context::background(), SERVER_ID)
        .await
        .unwrap();

    assert_eq!(server.count("PATCH", &shutdown_path), 1);
    assert_eq!(server.count("GET", &path), 3);
    let patch = server
        .requests()
        .into_iter()
        .find(|r| r.method == "PATCH")
        .unwrap();
    let sent: Value = serde_json::from_slice(&patch.body).unwrap();
    assert_eq!(sent, json!({}));
}

#[tokio::test]
async fn test_shutdown_server_already_off_is_noop() {
    let server = MockServer::start().await;
    let path = format!("/objects/servers/{}", SERVER_ID);
    server.on("GET", &path, Scripted::json(200, server_body(false)));

    client(&server)
        .shutdown_server(&Context::background(), SERVER_ID)
        .await
        .unwrap();

    assert_eq!(server.count("PATCH", &format!("{}/shutdown", path)), 0);
}

#[tokio::test]
async fn test_paas_service_list_and_get() {
    let server = MockServer::start().await;
    let other = "6d2f0b8c-4e3a-4f7b-8c9d-2e3f4a5b6c7d";
    server.on(
        "GET",
        "/objects/paas/services",
        Scripted::json(
            200,
            json!({"paas_services": {
                PAAS_ID: {"object_uuid": PAAS_ID, "name": "k8s-prod"},
                other: {"object_uuid": other, "name": "postgres", "resource_limits": []}
            }}),
        ),
    );
    server.on(
        "GET",
        &format!("/objects/paas/services/{}", PAAS_ID),
        Scripted::json(200, paas_body(3.0)),
    );
    let client = client(&server);
    let ctx = Context::background();

    let services = client.get_paas_service_list(&ctx).await.unwrap();
    assert_eq!(services.len(), 2);
    assert!(services.iter().any(|s| s.name == "postgres"));

    let service = client.get_paas_service(&ctx, PAAS_ID).await.unwrap();
    assert_eq!(service.service_template_category, "kubernetes");
    assert_eq!(service.worker_node_count(), Some(3));

    let err = client.get_paas_service(&ctx, "k8s-prod").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    assert_eq!(server.requests().len(), 2);
}

#[tokio::test]
async fn test_update_paas_service_sends_only_set_fields() {
    let server = MockServer::start().await;
    let path = format!("/objects/paas/services/{}", PAAS_ID);
    server.on("PATCH", &path, Scripted::empty(204));

    let body = PaaSServiceUpdateRequest {
        name: Some("k8s-renamed".to_string()),
        ..Default::default()
    };
    client(&server)
        .update_paas_service(&Context::background(), PAAS_ID, &body)
        .await
        .unwrap();

    let sent: Value = serde_json::from_slice(&server.requests()[0].body).unwrap();
    assert_eq!(sent, json!({"name": "k8s-renamed"}));
}

#[tokio::test]
async fn test_set_paas_worker_node_count_keeps_other_parameters() {
    let server = MockServer::start().await;
    let path = format!("/objects/paas/services/{}", PAAS_ID);
    server.on("GET", &path, Scripted::json(200, paas_body(3.0)));
    server.on("PATCH", &path, Scripted::empty(204));

    client(&server)
        .set_paas_worker_node_count(&Context::background(), PAAS_ID, 5)
        .await
        .unwrap();

    let patch = server
        .requests()
        .into_iter()
        .find(|r| r.method == "PATCH")
        .unwrap();
    let sent: Value = serde_json::from_slice(&patch.body).unwrap();
    assert_eq!(
        sent,
        json!({"parameters": {
            "k8s_worker_node_count": 5,
            "k8s_worker_node_cores": 2,
            "k8s_worker_node_ram": 4
        }})
    );
}

#[test]
#[serial]
fn test_client_from_env() {
    env::set_var("GRIDSCALE_API_URL", "https://gridscale.example.com/");
    env::set_var("GRIDSCALE_USER_ID", "env-user");
    env::set_var("GRIDSCALE_API_TOKEN", "env-token");
    env::set_var("GRIDSCALE_SYNC", "false");

    let client = GridscaleClient::from_env().unwrap();
    let config = client.http().config();
    assert_eq!(config.base_url(), "https://gridscale.example.com");
    assert_eq!(config.principal(), "env-user");
    assert!(!client.synchronous());
    assert_eq!(config.max_retries(), 5);

    for suffix in ["API_URL", "USER_ID", "API_TOKEN", "SYNC"] {
        env::remove_var(format!("GRIDSCALE_{}", suffix));
    }
}
