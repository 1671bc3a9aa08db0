use std::sync::Arc;
use std::time::Duration;

use boring::ssl::SslAcceptor;
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::timeout;

/// HTTPS/1.1 server answering every request with `200 Hello`.
///
/// The raw request heads it receives are kept for inspection.
pub struct MockTlsServer {
    listener: TcpListener,
    port: u16,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockTlsServer {
    pub async fn new() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        Ok(Self {
            listener,
            port,
            requests: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn url(&self, path: &str) -> String {
        format!("https://127.0.0.1:{}{}", self.port, path)
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<String>>> {
        self.requests.clone()
    }

    /// Serve connections in the background until the runtime shuts down.
    pub fn start(self, acceptor: SslAcceptor) -> tokio::task::JoinHandle<()> {
        let acceptor = Arc::new(acceptor);
        tokio::spawn(async move {
            loop {
                let Ok((tcp, _)) = self.listener.accept().await else {
                    break;
                };
                let acceptor = acceptor.clone();
                let requests = self.requests.clone();
                tokio::spawn(async move {
                    let Ok(mut stream) = tokio_boring::accept(&acceptor, tcp).await else {
                        return;
                    };

                    let mut head = Vec::new();
                    let mut buf = [0u8; 4096];
                    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                        match timeout(Duration::from_secs(5), stream.read(&mut buf)).await {
                            Ok(Ok(n)) if n > 0 => head.extend_from_slice(&buf[..n]),
                            _ => return,
                        }
                    }
                    requests.lock().push(String::from_utf8_lossy(&head).into_owned());

                    let response = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 5\r\nConnection: close\r\n\r\nHello";
                    let _ = stream.write_all(response).await;
                    let _ = stream.shutdown().await;
                });
            }
        })
    }
}
