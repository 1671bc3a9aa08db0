//! HTTP/1.1 and HTTP/2 exchanges over hyper client connections.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::client::conn::{http1, http2};
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo};

use crate::error::{Error, Result};
use crate::fingerprint::http2::Http2Settings;
use crate::transport::connector::MaybeHttpsStream;

/// Send one request over a fresh HTTP/1.1 connection.
pub async fn send_http1(
    stream: MaybeHttpsStream,
    request: Request<Full<Bytes>>,
) -> Result<hyper::Response<Incoming>> {
    let io = TokioIo::new(stream);
    let (mut sender, conn) = http1::handshake(io)
        .await
        .map_err(|e| Error::http_protocol(format!("HTTP/1.1 handshake failed: {}", e)))?;

    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::error!("HTTP/1.1 connection error: {}", e);
        }
    });

    sender
        .send_request(request)
        .await
        .map_err(|e| Error::http_protocol(format!("HTTP/1.1 request failed: {}", e)))
}

/// Send one request over a fresh HTTP/2 connection using `settings`'
/// flow-control and frame-size values.
pub async fn send_http2(
    stream: MaybeHttpsStream,
    request: Request<Full<Bytes>>,
    settings: &Http2Settings,
) -> Result<hyper::Response<Incoming>> {
    let mut builder = http2::Builder::new(TokioExecutor::new());
    builder
        .initial_stream_window_size(settings.initial_window_size)
        .initial_connection_window_size(settings.window_update)
        .max_frame_size(settings.max_frame_size)
        .max_header_list_size(settings.max_header_list_size);

    let io = TokioIo::new(stream);
    let (mut sender, conn) = builder
        .handshake(io)
        .await
        .map_err(|e| Error::http_protocol(format!("HTTP/2 handshake failed: {}", e)))?;

    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::error!("HTTP/2 connection error: {}", e);
        }
    });

    sender
        .send_request(request)
        .await
        .map_err(|e| Error::http_protocol(format!("HTTP/2 request failed: {}", e)))
}
