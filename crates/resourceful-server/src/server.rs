//! HTTP/1.1 server for an [`App`].
//!
//! Each accepted connection is served by hyper on its own task. A request's
//! body is collected up to the app's size limit and handed to
//! [`App::handle_http`]; the envelope it
//! returns becomes the JSON response. Reading plus handling is bounded by
//! the configured request timeout.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Request, Response};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use resourceful_core::{ResourceError, ResponseEnvelope};
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::app::{body_too_large, App};
use crate::config::ServerConfig;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Response type produced by the server.
pub type HttpResponse = Response<Full<Bytes>>;

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured address does not parse.
    #[error("invalid address '{addr}': {source}")]
    InvalidAddress {
        /// The configured address.
        addr: String,
        /// Parse failure.
        source: std::net::AddrParseError,
    },

    /// Binding the listener failed.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The address.
        addr: SocketAddr,
        /// I/O failure.
        source: std::io::Error,
    },
}

/// Serves an [`App`] over HTTP/1.1.
#[derive(Debug)]
pub struct Server {
    app: Arc<App>,
    config: ServerConfig,
}

impl Server {
    /// Creates a server for `app`.
    #[must_use]
    pub fn new(app: App, config: ServerConfig) -> Self {
        Self {
            app: Arc::new(app),
            config,
        }
    }

    /// The application being served.
    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }

    /// The server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Binds the configured address and serves until SIGINT or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be parsed or bound.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals()).await
    }

    /// Binds the configured address and serves until `shutdown` triggers.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be parsed or bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|source| ServerError::InvalidAddress {
                addr: self.config.http_addr().to_string(),
                source,
            })?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        self.serve(listener, shutdown).await;
        Ok(())
    }

    /// Serves connections from `listener` until `shutdown` triggers, then
    /// waits up to the shutdown timeout for open connections to finish.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) {
        match listener.local_addr() {
            Ok(addr) => info!(%addr, "server listening"),
            Err(e) => warn!(error = %e, "server listening on an unknown address"),
        }

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote)) => {
                        let server = Arc::clone(&server);
                        let guard = tracker.acquire();
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            if let Err(e) = server.serve_connection(stream, shutdown).await {
                                debug!(%remote, error = %e, "connection closed with error");
                            }
                            drop(guard);
                        });
                    }
                    Err(e) => error!(error = %e, "failed to accept connection"),
                },
                () = shutdown.triggered() => {
                    info!("shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        let grace = server.config.shutdown_timeout();
        info!(
            open = tracker.active_connections(),
            grace_ms = u64::try_from(grace.as_millis()).unwrap_or(u64::MAX),
            "draining connections"
        );
        if tokio::time::timeout(grace, tracker.drained()).await.is_err() {
            warn!(open = tracker.active_connections(), "shutdown timeout reached");
        }
        info!("server stopped");
    }

    async fn serve_connection(
        self: Arc<Self>,
        stream: TcpStream,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(&self);
        let service = service_fn(move |request: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.respond(request).await) }
        });

        let connection = http1::Builder::new()
            .keep_alive(self.config.keep_alive())
            .serve_connection(io, service);
        tokio::pin!(connection);

        tokio::select! {
            result = connection.as_mut() => result,
            () = shutdown.triggered() => {
                connection.as_mut().graceful_shutdown();
                connection.await
            }
        }
    }

    async fn respond(&self, request: Request<Incoming>) -> HttpResponse {
        let limit = self.config.request_timeout();
        let app = Arc::clone(&self.app);
        let envelope = match tokio::time::timeout(limit, handle(app, request)).await {
            Ok(envelope) => envelope,
            Err(_) => {
                let error = ResourceError::timeout(format!(
                    "Request did not finish within {}ms.",
                    limit.as_millis()
                ));
                warn!(%error, "request timed out");
                ResponseEnvelope::from_error(&error, false)
            }
        };
        render(&envelope)
    }
}

async fn handle(app: Arc<App>, request: Request<Incoming>) -> ResponseEnvelope {
    let (parts, body) = request.into_parts();
    let limit = app.options().max_body_size;
    let body = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => {
            debug!(limit, "request body over the size limit");
            return ResponseEnvelope::from_error(&body_too_large(limit), false);
        }
        Err(e) => {
            debug!(error = %e, "failed to read request body");
            let error = ResourceError::validation("Failed to read request body.");
            return ResponseEnvelope::from_error(&error, false);
        }
    };
    app.handle_http(parts.method, &parts.uri, parts.headers, &body)
        .await
}

/// Renders an envelope as a JSON response carrying the envelope's code.
pub fn render(envelope: &ResponseEnvelope) -> HttpResponse {
    let mut response = Response::new(Full::new(envelope.to_bytes()));
    *response.status_mut() = envelope.status_code();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ConnectOptions;
    use http::StatusCode;
    use resourceful_resource::{Resource, ResourceOptions};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn raw_exchange(addr: SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[test]
    fn test_render_uses_envelope_code() {
        let response = render(&ResponseEnvelope::route_not_found());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_invalid_address() {
        let app = App::connect(ConnectOptions::new("s"), Vec::new()).unwrap();
        let server = Server::new(app, ServerConfig::builder().http_addr("nowhere").build());
        let err = server
            .run_with_shutdown(ShutdownSignal::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::InvalidAddress { .. }));
    }

    #[tokio::test]
    async fn test_serves_over_tcp_and_shuts_down() {
        let posts = Resource::new(ResourceOptions::new("Post").unsecure(true)).unwrap();
        let app = App::connect(ConnectOptions::new("s"), vec![posts]).unwrap();
        let server = Server::new(
            app,
            ServerConfig::builder()
                .shutdown_timeout(Duration::from_secs(1))
                .build(),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = ShutdownSignal::new();
        let running = tokio::spawn(server.serve(listener, shutdown.clone()));

        let health = raw_exchange(
            addr,
            "GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(health.starts_with("HTTP/1.1 200"), "{health}");
        assert!(health.contains("application/json"));
        assert!(health.contains(r#""environment""#));

        let body = r#"{"comments":15}"#;
        let created = raw_exchange(
            addr,
            &format!(
                "POST /posts HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            ),
        )
        .await;
        assert!(created.starts_with("HTTP/1.1 200"), "{created}");
        assert!(created.contains(r#""comments":15"#));

        let malformed = raw_exchange(
            addr,
            "POST /posts HTTP/1.1\r\nHost: localhost\r\nContent-Length: 3\r\nConnection: close\r\n\r\n{x:",
        )
        .await;
        assert!(malformed.starts_with("HTTP/1.1 400"), "{malformed}");

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(2), running)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_oversized_body_gets_413() {
        let posts = Resource::new(ResourceOptions::new("Post").unsecure(true)).unwrap();
        let app = App::connect(ConnectOptions::new("s").max_body_size(8), vec![posts]).unwrap();
        let server = Server::new(app, ServerConfig::builder().build());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = ShutdownSignal::new();
        let running = tokio::spawn(server.serve(listener, shutdown.clone()));

        let body = r#"{"title":"longer than eight"}"#;
        let response = raw_exchange(
            addr,
            &format!(
                "POST /posts HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            ),
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 413"), "{response}");
        assert!(response.contains(r#""status":"fail""#));

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(2), running)
            .await
            .unwrap()
            .unwrap();
    }
}
