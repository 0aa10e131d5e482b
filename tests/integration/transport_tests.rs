//! HTTP transport retry accounting (§6): a tile source that always fails
//! must exhaust its retry budget and report one cause per attempt.

use std::time::Duration;

use dzrip::error::FetchError;
use dzrip::source::HttpDziSource;
use dzrip::{CancellationToken, TileFetcher};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

/// Spawns a TCP server that answers every connection with an HTTP 500 and
/// keeps running until the test ends (the listener is dropped on test
/// teardown along with its spawned task's `JoinHandle`, which aborts it).
async fn spawn_always_failing_server() -> (Url, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                // Drain whatever the client sent so it doesn't block on a
                // full write buffer; we don't need the request itself.
                let _ = socket.read(&mut buf).await;
                let body = "server always fails";
                let response = format!(
                    "HTTP/1.1 500 Internal Server Error\r\n\
                     Content-Length: {}\r\n\
                     Connection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    let url = Url::parse(&format!("http://{addr}/slides/sample.dzi")).unwrap();
    (url, handle)
}

#[tokio::test]
async fn exhausts_retries_and_reports_one_cause_per_attempt() {
    let (manifest_uri, server) = spawn_always_failing_server().await;
    let max_retries = 3;
    let source = HttpDziSource::new(
        &manifest_uri,
        "jpg".to_string(),
        max_retries,
        Duration::from_millis(5),
    );
    let cancel = CancellationToken::new();

    let result = source.fetch(0, 0, 0, &cancel).await;
    match result {
        Err(FetchError::RetriesExhausted { attempts, causes, .. }) => {
            assert_eq!(attempts, max_retries);
            assert_eq!(causes.len(), max_retries as usize);
            for cause in &causes {
                assert!(cause.contains("500"), "unexpected cause: {cause}");
            }
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }

    server.abort();
}
