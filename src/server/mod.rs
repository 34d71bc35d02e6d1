// Server module entry point
// Listener setup, accept loop, connection handling, and shutdown signals.

pub mod connection;
pub mod listener;
pub mod shutdown;

pub use listener::bind_listener;

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Notify;

use crate::config::Config;
use crate::logger;

/// Accept loop: serve connections until the shutdown signal fires.
///
/// Every accepted connection runs in its own task; all request handling is
/// read-only, so tasks share nothing but the immutable config.
pub async fn run(
    listener: TcpListener,
    config: Arc<Config>,
    shutdown: Arc<Notify>,
) -> std::io::Result<()> {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connection::accept_connection(
                            stream,
                            peer_addr,
                            &config,
                            &active_connections,
                        );
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => {
                logger::log_shutdown();
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LoggingConfig, PerformanceConfig, ServerConfig};
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn test_config(root: &std::path::Path, keep_alive_timeout: u64) -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                environment: "test".to_string(),
                root: root.to_string_lossy().into_owned(),
                index_file: "index.html".to_string(),
                workers: None,
            },
            logging: LoggingConfig { access_log: false },
            performance: PerformanceConfig {
                keep_alive_timeout,
                read_timeout: 2,
                write_timeout: 2,
                max_connections: None,
            },
        }
    }

    #[tokio::test]
    async fn shutdown_signaled_before_polling_still_stops_the_loop() {
        let dir = TempDir::new().expect("tempdir");
        let listener =
            bind_listener("127.0.0.1:0".parse().expect("addr")).expect("ephemeral bind");
        let shutdown = Arc::new(Notify::new());

        // The signal can land before the accept loop registers a waiter;
        // the stored permit must still stop the loop
        shutdown.notify_one();

        let result = tokio::time::timeout(
            Duration::from_secs(1),
            run(listener, Arc::new(test_config(dir.path(), 75)), shutdown),
        )
        .await;
        assert!(result.is_ok(), "accept loop should observe the stored permit");
    }

    #[tokio::test]
    async fn serves_request_and_closes_when_keep_alive_disabled() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("index.html"), "<p>hi</p>").expect("write");

        let listener =
            bind_listener("127.0.0.1:0".parse().expect("addr")).expect("ephemeral bind");
        let addr = listener.local_addr().expect("local addr");
        let shutdown = Arc::new(Notify::new());
        let config = Arc::new(test_config(dir.path(), 0));
        let server = tokio::spawn(run(listener, config, Arc::clone(&shutdown)));

        let mut stream = tokio::net::TcpStream::connect(addr).await.expect("connect");
        stream
            .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .expect("send request");

        // With keep-alive off the server must close after one exchange,
        // so reading to EOF terminates without waiting on a timeout
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.expect("read response");
        let text = String::from_utf8_lossy(&buf).to_lowercase();
        assert!(text.starts_with("http/1.1 200"), "got: {text}");
        assert!(text.contains("connection: close"), "got: {text}");
        assert!(text.ends_with("<p>hi</p>"), "got: {text}");

        shutdown.notify_one();
        server
            .await
            .expect("server task")
            .expect("accept loop exits cleanly");
    }
}
