use devreg_core::{Account, AccountStore, Device, MemoryStore, StoreResult};
use devreg_server::{AccountResponse, ErrorBody, Server, ServerConfig, ServerError};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

/// Spin up the HTTP server on an OS-assigned port, returning the base URL.
async fn spawn_test_server(store: Arc<MemoryStore>) -> String {
    let server = Server::new(ServerConfig::default(), store);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        server
            .serve(listener, std::future::pending::<()>())
            .await
            .unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

async fn seeded() -> (Arc<MemoryStore>, String) {
    let store = Arc::new(MemoryStore::testing());
    let base = spawn_test_server(Arc::clone(&store)).await;
    (store, base)
}

#[tokio::test]
async fn health_returns_200() {
    let (_, base) = seeded().await;
    let resp = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn validate_active_account() {
    let (_, base) = seeded().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/v1/accounts/abc/validate", base))
        .json(&json!({ "key": "xyz" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn validate_inactive_account_returns_402() {
    let (_, base) = seeded().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/v1/accounts/go/validate", base))
        .json(&json!({ "key": "095" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 402);
}

#[tokio::test]
async fn validate_wrong_key_and_unknown_account_are_indistinguishable() {
    let (_, base) = seeded().await;
    let client = reqwest::Client::new();

    let wrong_key = client
        .post(format!("{}/v1/accounts/abc/validate", base))
        .json(&json!({ "key": "wrong" }))
        .send()
        .await
        .unwrap();
    let unknown = client
        .post(format!("{}/v1/accounts/nobody/validate", base))
        .json(&json!({ "key": "wrong" }))
        .send()
        .await
        .unwrap();

    assert_eq!(wrong_key.status(), 401);
    assert_eq!(unknown.status(), 401);

    let wrong_key: ErrorBody = wrong_key.json().await.unwrap();
    let unknown: ErrorBody = unknown.json().await.unwrap();
    assert_eq!(wrong_key, unknown);
}

#[tokio::test]
async fn validate_missing_key_returns_400() {
    let (_, base) = seeded().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/v1/accounts/abc/validate", base))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn validate_malformed_body_returns_400() {
    let (_, base) = seeded().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/v1/accounts/abc/validate", base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn validate_without_body_returns_400() {
    let (_, base) = seeded().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/v1/accounts/abc/validate", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn account_endpoint_hides_key() {
    let (_, base) = seeded().await;
    let resp = reqwest::Client::new()
        .get(format!("{}/v1/accounts/abc", base))
        .json(&json!({ "key": "xyz" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let text = resp.text().await.unwrap();
    assert!(!text.contains("xyz"));
    let body: AccountResponse = serde_json::from_str(&text).unwrap();
    assert_eq!(
        body,
        AccountResponse {
            id: "abc".into(),
            active: true
        }
    );
}

#[tokio::test]
async fn devices_endpoint_lists_devices() {
    let (_, base) = seeded().await;
    let resp = reqwest::Client::new()
        .get(format!("{}/v1/accounts/abc/devices", base))
        .json(&json!({ "key": "xyz" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let devices: Vec<Device> = resp.json().await.unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].id, "device-a");
}

#[tokio::test]
async fn device_endpoint_unknown_device_returns_404() {
    let (_, base) = seeded().await;
    let resp = reqwest::Client::new()
        .get(format!("{}/v1/accounts/abc/devices/missing", base))
        .json(&json!({ "key": "xyz" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn register_then_fetch_device() {
    let (store, base) = seeded().await;
    let client = reqwest::Client::new();

    let resp = client
        .put(format!("{}/v1/accounts/abc/device", base))
        .json(&json!({ "key": "xyz", "device": { "id": "laptop", "hostname": "h1" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .get(format!("{}/v1/accounts/abc/devices/laptop", base))
        .json(&json!({ "key": "xyz" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let device: Device = resp.json().await.unwrap();
    assert_eq!(device, Device::new("abc", "laptop", "h1"));

    assert_eq!(store.devices("abc").unwrap().len(), 3);
}

#[tokio::test]
async fn register_with_wrong_key_returns_401_and_stores_nothing() {
    let (store, base) = seeded().await;
    let resp = reqwest::Client::new()
        .put(format!("{}/v1/accounts/abc/device", base))
        .json(&json!({ "key": "wrong", "device": { "id": "laptop", "hostname": "h1" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    assert!(store.device("abc", "laptop").is_err());
}

#[tokio::test]
async fn register_for_inactive_account_returns_402() {
    let (store, base) = seeded().await;
    let resp = reqwest::Client::new()
        .put(format!("{}/v1/accounts/go/device", base))
        .json(&json!({ "key": "095", "device": { "id": "phone", "hostname": "p" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 402);
    assert!(store.devices("go").is_err());
}

#[tokio::test]
async fn register_without_device_id_returns_400() {
    let (_, base) = seeded().await;
    let resp = reqwest::Client::new()
        .put(format!("{}/v1/accounts/abc/device", base))
        .json(&json!({ "key": "xyz", "device": { "hostname": "h1" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let (_, base) = seeded().await;
    let resp = reqwest::get(format!("{}/v1/nonexistent", base)).await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let store = Arc::new(MemoryStore::testing());
    let server = Server::new(ServerConfig::default().with_max_body_size(64), store);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        server
            .serve(listener, std::future::pending::<()>())
            .await
            .unwrap();
    });

    let resp = reqwest::Client::new()
        .post(format!("http://127.0.0.1:{}/v1/accounts/abc/validate", port))
        .json(&json!({ "key": "x".repeat(1024) }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 413);
}

/// A store whose credential check panics.
struct PanickingStore;

impl AccountStore for PanickingStore {
    fn validate_account(&self, _account_id: &str, _key: &str) -> StoreResult<Account> {
        panic!("store unavailable")
    }

    fn check_subscription(&self, _account_id: &str, _key: &str) -> StoreResult<()> {
        panic!("store unavailable")
    }

    fn register_device(&self, _account_id: &str, _key: &str, _device: Device) -> StoreResult<()> {
        panic!("store unavailable")
    }

    fn account(&self, _account_id: &str) -> StoreResult<Account> {
        panic!("store unavailable")
    }

    fn devices(&self, _account_id: &str) -> StoreResult<Vec<Device>> {
        panic!("store unavailable")
    }

    fn device(&self, _account_id: &str, _device_id: &str) -> StoreResult<Device> {
        panic!("store unavailable")
    }
}

/// Spawns `server` on an OS-assigned port and returns its address, the
/// shutdown trigger and the task running it.
async fn spawn_controlled(
    server: Server,
) -> (
    SocketAddr,
    oneshot::Sender<()>,
    tokio::task::JoinHandle<devreg_server::ServerResult<()>>,
) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.serve(listener, async {
        let _ = rx.await;
    }));
    (addr, tx, handle)
}

/// Writes `request` and returns the response head.
async fn raw_exchange(stream: &mut TcpStream, request: &[u8]) -> String {
    stream.write_all(request).await.unwrap();

    let mut response = Vec::new();
    let mut buf = [0u8; 1024];
    let read = async {
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            response.extend_from_slice(&buf[..n]);
            if n == 0 || response.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(5), read)
        .await
        .expect("no response from server");
    String::from_utf8_lossy(&response).into_owned()
}

/// Headers of a validate request promising a 100 byte body.
const PARTIAL_VALIDATE: &[u8] = b"POST /v1/accounts/abc/validate HTTP/1.1\r\n\
Host: localhost\r\n\
Content-Type: application/json\r\n\
Content-Length: 100\r\n\
\r\n\
{\"key\"";

#[tokio::test]
async fn slow_request_returns_408() {
    let config = ServerConfig::default().with_request_timeout(Duration::from_millis(200));
    let server = Server::new(config, Arc::new(MemoryStore::testing()));
    let (addr, _shutdown, _handle) = spawn_controlled(server).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    let head = raw_exchange(&mut stream, PARTIAL_VALIDATE).await;
    assert!(head.starts_with("HTTP/1.1 408"), "{head}");
}

#[tokio::test]
async fn handler_panic_returns_500_and_server_keeps_serving() {
    let server = Server::new(ServerConfig::default(), Arc::new(PanickingStore));
    let (addr, _shutdown, _handle) = spawn_controlled(server).await;
    let base = format!("http://{addr}");

    let resp = reqwest::Client::new()
        .post(format!("{}/v1/accounts/abc/validate", base))
        .json(&json!({ "key": "xyz" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);

    let resp = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn stalled_request_exceeds_shutdown_timeout() {
    let config = ServerConfig::default().with_shutdown_timeout(Duration::from_millis(300));
    let server = Server::new(config, Arc::new(MemoryStore::testing()));
    let (addr, shutdown, handle) = spawn_controlled(server).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(PARTIAL_VALIDATE).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    shutdown.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();

    match result {
        Err(ServerError::ShutdownTimeout(timeout)) => {
            assert_eq!(timeout, Duration::from_millis(300));
        }
        other => panic!("expected shutdown timeout, got {other:?}"),
    }
    drop(stream);
}

#[tokio::test]
async fn oversized_chunked_body_returns_413() {
    let config = ServerConfig::default().with_max_body_size(64);
    let server = Server::new(config, Arc::new(MemoryStore::testing()));
    let (addr, _shutdown, _handle) = spawn_controlled(server).await;

    let payload = format!("{{\"key\":\"{}\"}}", "x".repeat(1024));
    let mut request = format!(
        "POST /v1/accounts/abc/validate HTTP/1.1\r\n\
         Host: localhost\r\n\
         Content-Type: application/json\r\n\
         Transfer-Encoding: chunked\r\n\
         \r\n\
         {:x}\r\n",
        payload.len()
    )
    .into_bytes();
    request.extend_from_slice(payload.as_bytes());
    request.extend_from_slice(b"\r\n0\r\n\r\n");

    let mut stream = TcpStream::connect(addr).await.unwrap();
    let head = raw_exchange(&mut stream, &request).await;
    assert!(head.starts_with("HTTP/1.1 413"), "{head}");
}
