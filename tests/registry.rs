//! End-to-end registry behavior against mock registry servers.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use svcreg::prelude::*;
use svcreg::{ClusterMembership, HttpCluster, HttpExecutor, LogConfig};
use svcreg::svcreg_cluster::ClusterError;
use svcreg::svcreg_log::Level;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A local port nothing is listening on.
fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// An address nothing is listening on.
fn dead_endpoint() -> String {
    format!("http://127.0.0.1:{}", free_port())
}

/// Start a registry on `port` answering health checks and an empty listing.
async fn registry_on(port: u16) -> MockServer {
    let listener = std::net::TcpListener::bind(("127.0.0.1", port)).unwrap();
    let server = MockServer::builder().listener(listener).start().await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/services"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    server
}

fn client_for(url: &str) -> RegistryClient {
    let config = Config::builder().url(url).log(LogOutput::Discard).build();
    RegistryClient::new(config).unwrap()
}

/// Counts how often members are marked unhealthy.
struct CountingMembership {
    inner: HttpCluster,
    marks: AtomicUsize,
}

impl ClusterMembership for CountingMembership {
    fn select_member(&self) -> Result<String, ClusterError> {
        self.inner.select_member()
    }

    fn mark_unhealthy(&self, member: &str) {
        self.marks.fetch_add(1, Ordering::SeqCst);
        self.inner.mark_unhealthy(member);
    }

    fn members(&self) -> Vec<String> {
        self.inner.members()
    }

    fn healthy_members(&self) -> Vec<String> {
        self.inner.healthy_members()
    }
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_create_then_list() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/services"))
        .and(header("content-type", "application/json"))
        .and(header("accept", "application/json"))
        .and(body_json(json!({"id": "billing", "acl": "allow:ops"})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": "billing", "acl": "allow:ops"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/services"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "billing": {"id": "billing", "acl": "allow:ops"}
        })))
        .mount(&server)
        .await;

    let registry = client_for(&server.uri());

    let created = registry
        .create_service(&Service::new("billing", "allow:ops"))
        .await
        .unwrap();
    assert_eq!(created, Service::new("billing", "allow:ops"));

    let services = registry.all_services().await.unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services["billing"], created);
    assert!(registry.has_service("billing").await.unwrap());
    assert!(!registry.has_service("payroll").await.unwrap());
}

#[tokio::test]
async fn test_has_service_rejects_mismatched_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "billing": {"id": "payroll", "acl": ""}
        })))
        .mount(&server)
        .await;

    let registry = client_for(&server.uri());
    assert!(!registry.has_service("billing").await.unwrap());
}

#[tokio::test]
async fn test_empty_collection() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/services"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let registry = client_for(&server.uri());
    assert!(registry.all_services().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_and_delete_use_literal_item_path() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/servicesbilling"))
        .and(body_json(json!({"id": "billing", "acl": "deny:all"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/servicesbilling"))
        .and(header("content-type", "application/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "billing", "acl": "deny:all"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let registry = client_for(&server.uri());

    let updated = registry
        .update_service(&Service::new("billing", "deny:all"))
        .await
        .unwrap();
    assert_eq!(updated, None);

    let deleted = registry.delete_service("billing").await.unwrap();
    assert_eq!(deleted, Some(Service::new("billing", "deny:all")));
}

#[tokio::test]
async fn test_error_statuses() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/servicesghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/servicescrash"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "disk full"})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/servicesquota"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "quota exceeded"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/servicessilent"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": ""})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/serviceshtml"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<h1>Bad Gateway</h1>"))
        .mount(&server)
        .await;

    let registry = client_for(&server.uri());

    assert_eq!(
        registry.delete_service("ghost").await.unwrap_err(),
        RegistryError::ResourceNotFound
    );
    assert!(matches!(
        registry.delete_service("crash").await.unwrap_err(),
        RegistryError::InvalidResponse(_)
    ));
    assert_eq!(
        registry.delete_service("quota").await.unwrap_err(),
        RegistryError::ServerError {
            status: 409,
            message: "quota exceeded".into()
        }
    );
    assert_eq!(
        registry.delete_service("silent").await.unwrap_err(),
        RegistryError::ServerError {
            status: 400,
            message: "unknown error".into()
        }
    );
    assert!(matches!(
        registry.delete_service("html").await.unwrap_err(),
        RegistryError::InvalidResponse(_)
    ));
}

#[tokio::test]
async fn test_status_responses_are_not_retried() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"message": "draining"})))
        .expect(1)
        .mount(&first)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(0)
        .mount(&second)
        .await;

    let registry = client_for(&format!("{},{}", first.uri(), second.uri()));

    let err = registry.all_services().await.unwrap_err();
    assert_eq!(err.server_message(), Some("draining"));
}

#[tokio::test]
async fn test_failover_marks_dead_member_once() {
    let server = MockServer::start().await;
    let dead = dead_endpoint();

    Mock::given(method("GET"))
        .and(path("/api/services"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let membership = Arc::new(CountingMembership {
        inner: HttpCluster::from_members([dead.clone(), server.uri()], "").unwrap(),
        marks: AtomicUsize::new(0),
    });
    let config = Config::builder().log(LogOutput::Discard).build();
    let executor: Arc<dyn HttpExecutor> =
        Arc::new(svcreg::svcreg_http_client::ReqwestExecutor::new(&config.http).unwrap());
    let registry = RegistryClient::with_parts(membership.clone(), executor, config);

    assert!(registry.all_services().await.unwrap().is_empty());
    assert_eq!(membership.marks.load(Ordering::SeqCst), 1);
    assert_eq!(membership.healthy_members(), vec![server.uri()]);

    // The dead member is no longer selected.
    assert!(registry.all_services().await.unwrap().is_empty());
    assert_eq!(membership.marks.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_all_members_unreachable() {
    let registry = client_for(&format!("{},{}", dead_endpoint(), dead_endpoint()));

    let err = registry.has_service("billing").await.unwrap_err();
    assert!(matches!(err, RegistryError::ClusterUnavailable(_)));
    assert!(registry.membership().healthy_members().is_empty());

    let err = registry.all_services().await.unwrap_err();
    assert!(matches!(err, RegistryError::ClusterUnavailable(_)));
}

#[tokio::test]
async fn test_recovers_without_health_checks() {
    let port = free_port();
    let registry = client_for(&format!("http://127.0.0.1:{}", port));
    assert!(!registry.is_probing());

    let err = registry.all_services().await.unwrap_err();
    assert!(matches!(err, RegistryError::ClusterUnavailable(_)));
    assert!(registry.membership().healthy_members().is_empty());

    let server = registry_on(port).await;

    assert!(registry.all_services().await.unwrap().is_empty());
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_health_checker_revives_member() {
    let port = free_port();
    let member = format!("http://127.0.0.1:{}", port);
    let config = Config::builder()
        .url(&member)
        .health_check_path("status")
        .health_check_interval(Duration::from_millis(50))
        .log(LogOutput::Discard)
        .build();
    let registry = RegistryClient::new(config).unwrap();
    assert!(registry.is_probing());

    let err = registry.all_services().await.unwrap_err();
    assert!(matches!(err, RegistryError::ClusterUnavailable(_)));

    let cluster = registry.cluster().unwrap().clone();
    assert!(!cluster.is_healthy(&member));

    let _server = registry_on(port).await;

    let mut revived = false;
    for _ in 0..100 {
        if cluster.is_healthy(&member) {
            revived = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(revived, "member should be back after answering health checks");

    assert!(registry.all_services().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_call_deadline() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let config = Config::builder()
        .url(server.uri())
        .call_deadline(Duration::from_millis(200))
        .log(LogOutput::Discard)
        .build();
    let registry = RegistryClient::new(config).unwrap();

    let err = registry.all_services().await.unwrap_err();
    assert_eq!(err, RegistryError::Timeout(Duration::from_millis(200)));
}

#[tokio::test]
async fn test_log_output_is_scoped_to_client() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let buffer = SharedBuffer::default();
    let sink = buffer.clone();
    let log_config = LogConfig::default()
        .with_level(Level::Debug)
        .with_color(false);
    let loud = RegistryClient::new(
        Config::builder()
            .url(server.uri())
            .log(LogOutput::writer(&log_config, move || sink.clone()))
            .build(),
    )
    .unwrap();
    let quiet = client_for(&server.uri());

    quiet.all_services().await.unwrap();
    assert!(buffer.contents().is_empty());

    loud.all_services().await.unwrap();
    let captured = buffer.contents();
    assert!(captured.contains("Listed services"), "captured: {captured}");
}
