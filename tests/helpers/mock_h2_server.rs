use std::sync::Arc;

use boring::ssl::SslAcceptor;
use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;

const PREFACE: &[u8] = b"PRI * HTTP/2.0\r\n\r\nSM\r\n\r\n";

const DATA: u8 = 0x0;
const HEADERS: u8 = 0x1;
const SETTINGS: u8 = 0x4;
const PING: u8 = 0x6;
const GOAWAY: u8 = 0x7;

const END_STREAM: u8 = 0x1;
const ACK: u8 = 0x1;
const END_HEADERS: u8 = 0x4;

/// HPACK static-table index 8, `:status: 200`.
const STATUS_200: u8 = 0x88;

/// HTTPS server speaking just enough HTTP/2 to answer every stream with
/// `200 Hello`.
///
/// The SETTINGS pairs each client sends are kept for inspection.
pub struct MockH2Server {
    listener: TcpListener,
    port: u16,
    client_settings: Arc<Mutex<Vec<(u16, u32)>>>,
}

impl MockH2Server {
    pub async fn new() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        Ok(Self {
            listener,
            port,
            client_settings: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn url(&self, path: &str) -> String {
        format!("https://127.0.0.1:{}{}", self.port, path)
    }

    pub fn client_settings(&self) -> Arc<Mutex<Vec<(u16, u32)>>> {
        self.client_settings.clone()
    }

    /// Serve connections in the background until the runtime shuts down.
    pub fn start(self, acceptor: SslAcceptor) -> tokio::task::JoinHandle<()> {
        let acceptor = Arc::new(acceptor);
        tokio::spawn(async move {
            while let Ok((tcp, _)) = self.listener.accept().await {
                let acceptor = acceptor.clone();
                let settings = self.client_settings.clone();
                tokio::spawn(async move {
                    let Ok(stream) = tokio_boring::accept(&acceptor, tcp).await else {
                        return;
                    };
                    let _ = serve(stream, settings).await;
                });
            }
        })
    }
}

async fn serve<S>(mut stream: S, client_settings: Arc<Mutex<Vec<(u16, u32)>>>) -> std::io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut preface = [0u8; 24];
    stream.read_exact(&mut preface).await?;
    if preface.as_slice() != PREFACE {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "Invalid HTTP/2 preface",
        ));
    }
    send_frame(&mut stream, SETTINGS, 0, 0, &[]).await?;

    loop {
        let (frame_type, flags, stream_id, payload) = read_frame(&mut stream).await?;
        match frame_type {
            SETTINGS if flags & ACK == 0 => {
                client_settings.lock().extend(payload.chunks_exact(6).map(|pair| {
                    (
                        u16::from_be_bytes([pair[0], pair[1]]),
                        u32::from_be_bytes([pair[2], pair[3], pair[4], pair[5]]),
                    )
                }));
                send_frame(&mut stream, SETTINGS, ACK, 0, &[]).await?;
            }
            PING if flags & ACK == 0 => {
                send_frame(&mut stream, PING, ACK, 0, &payload).await?;
            }
            HEADERS if stream_id != 0 => {
                send_frame(&mut stream, HEADERS, END_HEADERS, stream_id, &[STATUS_200]).await?;
                send_frame(&mut stream, DATA, END_STREAM, stream_id, b"Hello").await?;
            }
            GOAWAY => return Ok(()),
            _ => {}
        }
    }
}

async fn read_frame<S: AsyncRead + Unpin>(stream: &mut S) -> std::io::Result<(u8, u8, u32, Vec<u8>)> {
    let mut header = [0u8; 9];
    stream.read_exact(&mut header).await?;

    let length = u32::from_be_bytes([0, header[0], header[1], header[2]]);
    let stream_id = u32::from_be_bytes([header[5] & 0x7F, header[6], header[7], header[8]]);
    let mut payload = vec![0u8; length as usize];
    stream.read_exact(&mut payload).await?;
    Ok((header[3], header[4], stream_id, payload))
}

async fn send_frame<S: AsyncWrite + Unpin>(
    stream: &mut S,
    frame_type: u8,
    flags: u8,
    stream_id: u32,
    payload: &[u8],
) -> std::io::Result<()> {
    let length = payload.len() as u32;
    let mut frame = Vec::with_capacity(9 + payload.len());
    frame.extend_from_slice(&length.to_be_bytes()[1..]);
    frame.push(frame_type);
    frame.push(flags);
    frame.extend_from_slice(&stream_id.to_be_bytes());
    frame.extend_from_slice(payload);
    stream.write_all(&frame).await?;
    stream.flush().await
}
