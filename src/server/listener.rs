//! HTTP listener.
//!
//! Accepts connections and serves each one on its own task.

use crate::server::handle_request;
use crate::state::AppState;
use crate::util::RequestId;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};

/// Backend HTTP server.
pub struct HttpServer {
    /// Shared state handed to every request.
    state: Arc<AppState>,
    /// TCP listener.
    listener: TcpListener,
    /// Bound address.
    local_addr: SocketAddr,
}

impl HttpServer {
    /// Bind the server.
    pub async fn bind(address: SocketAddr, state: AppState) -> std::io::Result<Self> {
        let listener = TcpListener::bind(address).await?;
        let local_addr = listener.local_addr()?;

        info!(address = %local_addr, "HTTP server bound");

        Ok(Self {
            state: Arc::new(state),
            listener,
            local_addr,
        })
    }

    /// Address the server is listening on.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Run the server, accepting connections until shutdown.
    #[instrument(skip_all, fields(address = %self.local_addr))]
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        info!("Backend server is running on http://{}", self.local_addr);

        loop {
            tokio::select! {
                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok((stream, addr)) => {
                            self.handle_connection(stream, addr);
                        }
                        Err(e) => {
                            error!(error = %e, "failed to accept connection");
                        }
                    }
                }

                _ = shutdown.recv() => {
                    info!("HTTP server shutting down");
                    break;
                }
            }
        }
    }

    /// Serve a connection on a new task.
    fn handle_connection(&self, stream: TcpStream, client_addr: SocketAddr) {
        if let Err(e) = stream.set_nodelay(true) {
            warn!(error = %e, "failed to set TCP_NODELAY on client connection");
        }

        let state = Arc::clone(&self.state);
        let connection_id = RequestId::short();

        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            let service = service_fn(move |req| {
                let state = Arc::clone(&state);
                async move { handle_request(req, &state).await }
            });

            // Serve HTTP/1.1 with keep-alive support
            if let Err(e) = http1::Builder::new()
                .keep_alive(true)
                .serve_connection(io, service)
                .await
            {
                debug!(
                    connection_id = %connection_id,
                    client = %client_addr,
                    error = %e,
                    "connection error"
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::metrics::MetricsCollector;

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let state = AppState::new(&Config::default(), MetricsCollector::new()).unwrap();
        let server = HttpServer::bind("127.0.0.1:0".parse().unwrap(), state)
            .await
            .unwrap();
        assert_ne!(server.local_addr().port(), 0);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let state = AppState::new(&Config::default(), MetricsCollector::new()).unwrap();
        let server = HttpServer::bind("127.0.0.1:0".parse().unwrap(), state)
            .await
            .unwrap();
        let (tx, rx) = broadcast::channel(1);

        let handle = tokio::spawn(server.run(rx));
        tx.send(()).unwrap();

        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
