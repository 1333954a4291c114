//! Active health probing against live HTTP servers.

use std::sync::Arc;
use std::time::Duration;

use svcreg_cluster::{ClusterMembership, HttpCluster};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_probe_revives_members_answering_health_check() {
    let healthy = MockServer::start().await;
    let failing = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&healthy)
        .await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&failing)
        .await;

    let cluster = HttpCluster::from_members([healthy.uri(), failing.uri()], "/status").unwrap();
    cluster.mark_unhealthy(&healthy.uri());
    cluster.mark_unhealthy(&failing.uri());
    assert!(cluster.select_member().is_err());

    let revived = cluster.probe(&reqwest::Client::new()).await;

    assert_eq!(revived, 1);
    assert_eq!(cluster.healthy_members(), vec![healthy.uri()]);
    assert_eq!(cluster.select_member().unwrap(), healthy.uri());
}

#[tokio::test]
async fn test_probe_skips_healthy_members() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let cluster = HttpCluster::from_members([server.uri()], "status").unwrap();

    assert_eq!(cluster.probe(&reqwest::Client::new()).await, 0);
}

#[tokio::test]
async fn test_background_health_checker() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let cluster = Arc::new(HttpCluster::from_members([server.uri()], "status").unwrap());
    cluster.mark_unhealthy(&server.uri());

    let handle = cluster
        .spawn_health_checker(reqwest::Client::new(), Duration::from_millis(20))
        .expect("health-check path is configured");

    let mut revived = false;
    for _ in 0..100 {
        if cluster.is_healthy(&server.uri()) {
            revived = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    handle.abort();

    assert!(revived, "background checker should revive the member");
}

#[tokio::test]
async fn test_health_checker_stops_with_cluster() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let cluster = Arc::new(HttpCluster::from_members([server.uri()], "status").unwrap());
    let handle = cluster
        .spawn_health_checker(reqwest::Client::new(), Duration::from_millis(20))
        .expect("health-check path is configured");

    drop(cluster);

    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("checker should stop once the cluster is gone")
        .unwrap();
}
