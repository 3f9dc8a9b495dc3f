//! Raw JSON-RPC transport over a persistent HTTP/1 or HTTP/2 connection.
//!
//! Requests are plain JSON strings POSTed to the endpoint; responses are
//! parsed lazily with an extractor function, so only the fields a caller
//! cares about are ever deserialized.

use app_core::types::{ConnectionType, HarnessResult, Url};
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use http_body_util::BodyExt;
use hyper::body::{Bytes, Incoming};
use hyper::client::conn::http1::SendRequest as Http1Sender;
use hyper::client::conn::http2::SendRequest as Http2Sender;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Method, Request, Response, Uri};
use hyper_util::rt::{TokioExecutor, TokioIo};
use json::{JsonValueTrait, LazyValue};
use tokio::net::TcpStream;
use tokio_native_tls::native_tls::TlsConnector;

/// # Inner Connection
///
/// An enum that abstracts over the different types of HTTP connections (HTTP/1 and HTTP/2).
enum InnerConnection {
    Http1(Http1Sender<String>),
    Http2(Http2Sender<String>),
}

/// # Connection
///
/// A single persistent HTTP connection to one RPC endpoint, capable of
/// sending requests and parsing their responses.
pub struct Connection {
    inner: InnerConnection,
    uri: Uri,
}

impl Connection {
    /// # New Connection
    ///
    /// Establishes a new HTTP connection to the specified URL, wrapping the
    /// stream in TLS when the endpoint requires it.
    pub async fn new(url: &Url, ty: ConnectionType) -> HarnessResult<Self> {
        let stream = TcpStream::connect(url.address()).await?;
        stream.set_nodelay(true).expect("failed to set TCP nodelay");

        let inner = if url.is_tls() {
            let connector = tokio_native_tls::TlsConnector::from(TlsConnector::new()?);
            let stream = connector.connect(url.host(), stream).await?;
            handshake(TokioIo::new(stream), ty).await?
        } else {
            handshake(TokioIo::new(stream), ty).await?
        };

        Ok(Self {
            inner,
            uri: url.0.clone(),
        })
    }

    /// # Send Request
    ///
    /// Sends an HTTP request and returns a `ParsedResponse` that can be used
    /// to resolve the response and extract the desired value.
    pub fn send<F>(&mut self, mut request: Request<String>, extractor: F) -> ParsedResponse<F> {
        *request.uri_mut() = self.uri.clone();
        *request.method_mut() = Method::POST;
        let ct = HeaderValue::from_static("application/json");
        request.headers_mut().insert(CONTENT_TYPE, ct);
        match &mut self.inner {
            InnerConnection::Http1(sender) => ParsedResponse {
                pending: Box::pin(sender.send_request(request)),
                extractor,
            },
            InnerConnection::Http2(sender) => ParsedResponse {
                pending: Box::pin(sender.send_request(request)),
                extractor,
            },
        }
    }
}

async fn handshake<T>(io: T, ty: ConnectionType) -> HarnessResult<InnerConnection>
where
    T: hyper::rt::Read + hyper::rt::Write + Unpin + Send + 'static,
{
    let inner = match ty {
        ConnectionType::Http1 => {
            let (sender, con) = hyper::client::conn::http1::handshake(io).await?;
            tokio::spawn(con);
            InnerConnection::Http1(sender)
        }
        ConnectionType::Http2 => {
            let (sender, con) = hyper::client::conn::http2::Builder::new(TokioExecutor::new())
                .handshake(io)
                .await?;
            tokio::spawn(con);
            InnerConnection::Http2(sender)
        }
    };
    Ok(inner)
}

/// JSON-RPC level rejection returned by the node. Anything else that goes
/// wrong while resolving a response is a transport failure.
#[derive(Debug)]
pub struct RpcError(pub String);

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "rpc error: {}", self.0)
    }
}

impl std::error::Error for RpcError {}

/// # Parsed Response
///
/// A future that resolves to the parsed response of an HTTP request, with a
/// generic extractor function `F` to extract the desired value `V`.
pub struct ParsedResponse<F> {
    pending: Pin<Box<dyn Future<Output = hyper::Result<Response<Incoming>>> + Send>>,
    extractor: F,
}

impl<F, V> ParsedResponse<F>
where
    F: FnOnce(LazyValue) -> Option<V>,
{
    /// # Resolve Response
    ///
    /// Asynchronously resolves the HTTP response and applies the extractor
    /// function to the `result` field of the body. A body carrying an
    /// `error` object instead is surfaced as an [`RpcError`].
    pub async fn resolve(self) -> HarnessResult<Option<V>> {
        let mut response = self.pending.await?;
        let mut data = Data::Empty;
        while let Some(next) = response.frame().await {
            let Ok(chunk) = next?.into_data() else {
                continue;
            };
            match &mut data {
                Data::Empty => data = Data::SingleChunk(chunk),
                Data::SingleChunk(first) => {
                    let mut buffer = Vec::with_capacity(first.len() + chunk.len());
                    buffer.extend_from_slice(first);
                    buffer.extend_from_slice(&chunk);
                    data = Data::MultiChunk(buffer);
                }
                Data::MultiChunk(buffer) => {
                    buffer.extend_from_slice(&chunk);
                }
            }
        }
        let body = data.as_ref();
        match json::get(body, ["result"]) {
            Ok(result) => Ok((self.extractor)(result)),
            Err(_) => {
                let reason = json::get(body, ["error", "message"])
                    .ok()
                    .and_then(|m| m.as_str().map(str::to_owned))
                    .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());
                Err(RpcError(reason).into())
            }
        }
    }
}

enum Data {
    Empty,
    SingleChunk(Bytes),
    MultiChunk(Vec<u8>),
}

impl AsRef<[u8]> for Data {
    fn as_ref(&self) -> &[u8] {
        match self {
            Data::Empty => &[],
            Data::SingleChunk(chunk) => chunk,
            Data::MultiChunk(chunk) => chunk,
        }
    }
}
