//! Local HTTP stub used by tests that need a real socket on the other end.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub body: String,
}

pub struct StubServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Starts a server that answers every request with `status` after `delay`.
pub async fn spawn_stub(status: u16, delay: Duration) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();
    let status = StatusCode::from_u16(status).unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let recorded = recorded.clone();
            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let recorded = recorded.clone();
                    async move {
                        let path = req.uri().path().to_string();
                        let body = match req.into_body().collect().await {
                            Ok(collected) => collected.to_bytes(),
                            Err(_) => Bytes::new(),
                        };
                        recorded.lock().unwrap().push(RecordedRequest {
                            path,
                            body: String::from_utf8_lossy(&body).into_owned(),
                        });
                        tokio::time::sleep(delay).await;
                        let mut response = Response::new(Full::new(Bytes::from_static(b"stub")));
                        *response.status_mut() = status;
                        Ok::<_, Infallible>(response)
                    }
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    StubServer { addr, requests }
}

/// Returns an address on which nothing is listening.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub mod doubles {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use crate::cert_probe::CertificateInfo;
    use crate::http_probe::prelude::*;
    use crate::notifier::{Notifier, NotifyError};
    use crate::probe::{Probe, Target};

    #[derive(Debug, Clone)]
    pub enum Scripted {
        Status { code: u16, latency_millis: u64 },
        Error(&'static str),
        Panic,
    }

    /// HTTP probe double answering from a per-target script after a per-target delay.
    #[derive(Default)]
    pub struct ScriptedHttp {
        scripts: HashMap<String, (Scripted, Duration)>,
        calls: Mutex<HashMap<String, usize>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedHttp {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn on(mut self, target: &str, scripted: Scripted, delay: Duration) -> Self {
            self.scripts.insert(target.to_string(), (scripted, delay));
            self
        }

        pub fn calls(&self, target: &str) -> usize {
            self.calls.lock().unwrap().get(target).copied().unwrap_or(0)
        }

        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Probe for ScriptedHttp {
        type Output = ProbeResult;

        async fn probe(&self, target: &Target) -> ProbeResult {
            *self
                .calls
                .lock()
                .unwrap()
                .entry(target.to_string())
                .or_default() += 1;

            let (scripted, delay) = self
                .scripts
                .get(target.as_str())
                .cloned()
                .unwrap_or((Scripted::Status { code: 200, latency_millis: 100 }, Duration::ZERO));

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match scripted {
                Scripted::Status { code, latency_millis } => {
                    ProbeResult::response(target.clone(), code, latency_millis)
                }
                Scripted::Error(error) => ProbeResult::failed(target.clone(), error),
                Scripted::Panic => panic!("scripted probe panic for {target}"),
            }
        }
    }

    /// Certificate probe double; unscripted targets get a certificate valid for 90 days.
    #[derive(Default)]
    pub struct ScriptedCert {
        expiries: HashMap<String, Result<DateTime<Utc>, &'static str>>,
    }

    impl ScriptedCert {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn expires(mut self, target: &str, at: DateTime<Utc>) -> Self {
            self.expiries.insert(target.to_string(), Ok(at));
            self
        }

        pub fn fails(mut self, target: &str, error: &'static str) -> Self {
            self.expiries.insert(target.to_string(), Err(error));
            self
        }
    }

    #[async_trait]
    impl Probe for ScriptedCert {
        type Output = CertificateInfo;

        async fn probe(&self, target: &Target) -> CertificateInfo {
            match self.expiries.get(target.as_str()) {
                Some(Ok(at)) => CertificateInfo::expiring(target.clone(), *at),
                Some(Err(error)) => CertificateInfo::failed(target.clone(), *error),
                None => CertificateInfo::expiring(
                    target.clone(),
                    Utc::now() + chrono::Duration::days(90),
                ),
            }
        }
    }

    #[derive(Default)]
    pub struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        /// Delivered messages, sorted so concurrent pipelines compare deterministically.
        pub fn messages(&self) -> Vec<String> {
            let mut messages = self.messages.lock().unwrap().clone();
            messages.sort();
            messages
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, message: &str) -> Result<(), NotifyError> {
            self.messages.lock().unwrap().push(message.to_string());
            if self.fail {
                return Err(NotifyError::Rejected {
                    status: 500,
                    body: "unavailable".to_string(),
                });
            }
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }
}
