#![cfg(test)]
#![allow(dead_code)]

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ServerBuilder;

/// Serves one PAC script on every path and counts the downloads.
pub struct TestPacServer {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    _server_handle: JoinHandle<()>,
}

impl TestPacServer {
    pub async fn start(script: &str) -> Result<Self, Box<dyn std::error::Error>> {
        Self::start_with_status(StatusCode::OK, script).await
    }

    pub async fn start_with_status(status: StatusCode, script: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let hits = Arc::new(AtomicUsize::new(0));
        let body = Bytes::from(script.to_string());

        let server_hits = hits.clone();
        let server_handle = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, _)) => {
                        let io = TokioIo::new(stream);
                        let hits = server_hits.clone();
                        let body = body.clone();

                        tokio::spawn(async move {
                            let service = service_fn(move |_req: Request<Incoming>| {
                                hits.fetch_add(1, Ordering::SeqCst);
                                let mut response = Response::new(Full::new(body.clone()));
                                *response.status_mut() = status;
                                async move { Ok::<_, Infallible>(response) }
                            });

                            if let Err(_err) = ServerBuilder::new(TokioExecutor::new())
                                .serve_connection(io, service)
                                .await
                            {
                                // Silently handle errors in test
                            }
                        });
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            addr,
            hits,
            _server_handle: server_handle,
        })
    }

    pub fn pac_url(&self) -> String {
        format!("http://{}/proxy.pac", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}
