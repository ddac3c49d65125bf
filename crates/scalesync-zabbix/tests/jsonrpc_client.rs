use std::sync::{Arc, Mutex};

use axum::{Json, Router, extract::State, routing::post};
use serde_json::{Value, json};

use scalesync_zabbix::{HostFilter, HostStatus, MonitoringApi, ZabbixClient, ZabbixError};

/// Minimal stand-in for `api_jsonrpc.php`
#[derive(Default)]
struct FakeZabbix {
    requests: Mutex<Vec<Value>>,
    logins: Mutex<u32>,
    extra_hosts: Vec<Value>,
}

impl FakeZabbix {
    fn requests_for(&self, method: &str) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r["method"] == method)
            .cloned()
            .collect()
    }

    fn login_count(&self) -> u32 {
        *self.logins.lock().unwrap()
    }
}

fn rpc_error(id: &Value, code: i64, data: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "error": { "code": code, "message": "Invalid params.", "data": data },
        "id": id
    })
}

// Body is taken as a string: the client sends `application/json-rpc`.
async fn handle(State(fake): State<Arc<FakeZabbix>>, body: String) -> Json<Value> {
    let request: Value = serde_json::from_str(&body).unwrap();
    fake.requests.lock().unwrap().push(request.clone());
    let id = &request["id"];

    let method = request["method"].as_str().unwrap_or_default();
    if method != "user.login" && request["auth"].as_str().is_none() {
        return Json(rpc_error(id, -32602, "Not authorised."));
    }

    let reply = match method {
        "user.login" => {
            if request["params"]["password"] != "secret" {
                return Json(rpc_error(id, -32602, "Login name or password is incorrect."));
            }
            let mut logins = fake.logins.lock().unwrap();
            *logins += 1;
            json!(format!("token-{}", *logins))
        }
        "host.get" => {
            let mut hosts = vec![
                json!({ "hostid": "10", "host": "i-aaa", "status": "0", "name": "i-aaa" }),
                json!({ "hostid": "11", "host": "i-bbb", "status": "1", "name": "i-bbb" }),
            ];
            hosts.extend(fake.extra_hosts.iter().cloned());
            Value::Array(hosts)
        }
        "host.delete" => json!({ "hostids": request["params"] }),
        "host.update" => {
            if request["params"]["hostid"] == "666" {
                return Json(rpc_error(id, -32500, "No permissions to referred object."));
            }
            json!({ "hostids": [request["params"]["hostid"]] })
        }
        other => panic!("unexpected method {other}"),
    };

    Json(json!({ "jsonrpc": "2.0", "result": reply, "id": id }))
}

async fn spawn_fake(fake: Arc<FakeZabbix>) -> String {
    let app = Router::new()
        .route("/api_jsonrpc.php", post(handle))
        .with_state(fake);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api_jsonrpc.php")
}

#[tokio::test]
async fn test_get_hosts_sends_only_configured_filter() {
    let fake = Arc::new(FakeZabbix::default());
    let url = spawn_fake(fake.clone()).await;
    let client = ZabbixClient::new(url, "api", "secret").unwrap();

    let hosts = client.get_hosts(&HostFilter::group(12)).await.unwrap();

    assert_eq!(hosts.len(), 2);
    assert_eq!(hosts["i-aaa"].id, "10");
    assert_eq!(hosts["i-aaa"].status, HostStatus::Active);
    assert_eq!(hosts["i-bbb"].status, HostStatus::Disabled);

    let get = fake.requests_for("host.get");
    assert_eq!(get.len(), 1);
    assert_eq!(get[0]["jsonrpc"], "2.0");
    assert_eq!(get[0]["auth"], "token-1");
    assert_eq!(get[0]["params"]["output"], "extend");
    assert_eq!(get[0]["params"]["groupids"], "12");
    assert!(get[0]["params"].get("templateids").is_none());
}

#[tokio::test]
async fn test_host_with_unknown_status_is_skipped() {
    let fake = Arc::new(FakeZabbix {
        extra_hosts: vec![json!({ "hostid": "12", "host": "i-ccc", "status": "3" })],
        ..FakeZabbix::default()
    });
    let url = spawn_fake(fake).await;
    let client = ZabbixClient::new(url, "api", "secret").unwrap();

    let hosts = client.get_hosts(&HostFilter::group(12)).await.unwrap();

    assert_eq!(hosts.len(), 2);
    assert!(hosts.contains_key("i-aaa"));
    assert!(hosts.contains_key("i-bbb"));
    assert!(!hosts.contains_key("i-ccc"));
}

#[tokio::test]
async fn test_every_operation_opens_its_own_session() {
    let fake = Arc::new(FakeZabbix::default());
    let url = spawn_fake(fake.clone()).await;
    let client = ZabbixClient::new(url, "api", "secret").unwrap();

    client.get_hosts(&HostFilter::template(7)).await.unwrap();
    client.delete_host("10").await.unwrap();
    client.disable_host("11").await.unwrap();

    assert_eq!(fake.login_count(), 3);

    let delete = fake.requests_for("host.delete");
    assert_eq!(delete[0]["params"], json!(["10"]));
    assert_eq!(delete[0]["auth"], "token-2");

    let update = fake.requests_for("host.update");
    assert_eq!(update[0]["params"], json!({ "hostid": "11", "status": 1 }));
    assert_eq!(update[0]["auth"], "token-3");
}

#[tokio::test]
async fn test_wrong_password_is_auth_failure() {
    let fake = Arc::new(FakeZabbix::default());
    let url = spawn_fake(fake.clone()).await;
    let client = ZabbixClient::new(url, "api", "wrong").unwrap();

    let err = client.delete_host("10").await.unwrap_err();

    assert!(matches!(err, ZabbixError::AuthFailed(_)));
    assert!(fake.requests_for("host.delete").is_empty());
}

#[tokio::test]
async fn test_rejected_update_surfaces_error_code() {
    let fake = Arc::new(FakeZabbix::default());
    let url = spawn_fake(fake).await;
    let client = ZabbixClient::new(url, "api", "secret").unwrap();

    let err = client.disable_host("666").await.unwrap_err();

    match err {
        ZabbixError::Rejected { method, code, .. } => {
            assert_eq!(method, "host.update");
            assert_eq!(code, -32500);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_closed_port_is_unreachable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ZabbixClient::new(format!("http://{addr}/api_jsonrpc.php"), "api", "secret")
        .unwrap();

    let err = client.get_hosts(&HostFilter::group(1)).await.unwrap_err();

    assert!(matches!(err, ZabbixError::Unreachable(_)));
}
