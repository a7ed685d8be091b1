//! End-to-end knock runs against loopback listeners.

use std::time::Duration;

use knocker_core::{envelope, parse_inline_targets, Error, KeySource, PortKnocker};
use tokio::net::{TcpListener, UdpSocket};

async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn encrypted_config_knocks_every_target() {
    let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let udp = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let tcp_port = tcp.local_addr().unwrap().port();
    let udp_port = udp.local_addr().unwrap().port();

    let yaml = format!(
        "targets:\n\
         \x20 - host: 127.0.0.1\n\
         \x20   ports: [{tcp_port}, {tcp_port}]\n\
         \x20   protocol: tcp\n\
         \x20   delay: 20ms\n\
         \x20   wait_connection: true\n\
         \x20 - host: 127.0.0.1\n\
         \x20   ports: [{udp_port}]\n\
         \x20   protocol: UDP\n"
    );

    let dir = tempfile::tempdir().unwrap();
    let key_path = dir.path().join("knock.key");
    std::fs::write(&key_path, b"integration secret").unwrap();
    let sealed = envelope::seal(yaml.as_bytes(), &envelope::derive_key(b"integration secret")).unwrap();
    let config_path = dir.path().join("knock.enc");
    std::fs::write(&config_path, sealed).unwrap();

    let report = PortKnocker::new()
        .execute(&config_path, KeySource::File(key_path), false)
        .await
        .unwrap();

    assert_eq!(report.sent(), 3);
    assert_eq!(report.failed(), 0);

    for _ in 0..2 {
        tokio::time::timeout(Duration::from_secs(2), tcp.accept())
            .await
            .unwrap()
            .unwrap();
    }

    let mut buf = [0u8; 8];
    let (len, _) = tokio::time::timeout(Duration::from_secs(2), udp.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(len, 0);
}

#[tokio::test]
async fn wait_mode_stops_at_closed_port() {
    let reachable = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let reachable_port = reachable.local_addr().unwrap().port();
    let closed = closed_port().await;

    let inline = format!("tcp:127.0.0.1:{closed};tcp:127.0.0.1:{reachable_port}");
    let config = parse_inline_targets(&inline, "0s").unwrap();

    let err = PortKnocker::new().execute_config(&config, true).await.unwrap_err();
    assert!(matches!(err, Error::Knock { ref host, .. } if host == "127.0.0.1"));

    // The second target must never have been knocked.
    let accepted = tokio::time::timeout(Duration::from_millis(300), reachable.accept()).await;
    assert!(accepted.is_err());
}

#[tokio::test]
async fn best_effort_mode_completes_past_closed_port() {
    let reachable = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let reachable_port = reachable.local_addr().unwrap().port();
    let closed = closed_port().await;

    let inline = format!("tcp:127.0.0.1:{closed};tcp:127.0.0.1:{reachable_port}");
    let config = parse_inline_targets(&inline, "0s").unwrap();

    PortKnocker::new().execute_config(&config, false).await.unwrap();

    tokio::time::timeout(Duration::from_secs(2), reachable.accept())
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn best_effort_udp_failure_is_reported_and_run_continues() {
    let reachable = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let reachable_port = reachable.local_addr().unwrap().port();
    let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let udp_port = receiver.local_addr().unwrap().port();

    let inline = format!("udp:127.0.0.1:{udp_port};tcp:127.0.0.1:{reachable_port}");
    let mut config = parse_inline_targets(&inline, "0s").unwrap();
    config.targets[0].gateway = Some("192.0.2.1".to_string());

    let report = PortKnocker::new().execute_config(&config, false).await.unwrap();

    assert_eq!(report.failed(), 1);
    assert_eq!(report.targets[0].failures[0].port, udp_port);
    assert_eq!(report.targets[1].sent, vec![reachable_port]);
    tokio::time::timeout(Duration::from_secs(2), reachable.accept())
        .await
        .unwrap()
        .unwrap();
}
