use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::net::TcpStream;
use tokio_native_tls::TlsConnector as TokioTlsConnector;
use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::error::ResolveError;
use url::{Host, Url};
use x509_parser::parse_x509_certificate;

use super::result::CertificateInfo;
use crate::http_probe::report;
use crate::probe::{Probe, Target};

const HTTPS_PORT: u16 = 443;

#[derive(Debug, thiserror::Error)]
pub enum CertificateError {
    #[error("invalid target url")]
    InvalidUrl(#[from] url::ParseError),

    #[error("target url has no host")]
    MissingHost,

    #[error("dns lookup failed")]
    Resolve(#[from] ResolveError),

    #[error("no address found for {0}")]
    NoAddress(String),

    #[error("tcp connect failed")]
    Connect(#[source] std::io::Error),

    #[error("tls handshake failed")]
    Handshake(#[source] native_tls::Error),

    #[error("server presented no certificate")]
    NoPeerCertificate,

    #[error("certificate could not be parsed: {0}")]
    Parse(String),

    #[error("certificate expiry {0} is out of range")]
    InvalidTimestamp(i64),

    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

/// Builds a TLS connector that accepts any chain and any hostname.
///
/// Only for reading the certificate a server presents. Never hand this
/// connector to anything that carries real data.
pub fn insecure_diagnostic_connector() -> Result<TokioTlsConnector, native_tls::Error> {
    let mut builder = native_tls::TlsConnector::builder();
    builder.danger_accept_invalid_certs(true);
    builder.danger_accept_invalid_hostnames(true);
    let connector = builder.build()?;
    Ok(TokioTlsConnector::from(connector))
}

/// Reads the expiry of the leaf certificate served on the target host's HTTPS port.
#[derive(Clone)]
pub struct CertificateProbe {
    connector: TokioTlsConnector,
    resolver: TokioAsyncResolver,
    port: u16,
    timeout: Duration,
}

impl CertificateProbe {
    pub fn new(connector: TokioTlsConnector, resolver: TokioAsyncResolver, timeout: Duration) -> Self {
        Self {
            connector,
            resolver,
            port: HTTPS_PORT,
            timeout,
        }
    }

    #[cfg(test)]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    async fn fetch_expiry(&self, url: &str) -> Result<DateTime<Utc>, CertificateError> {
        let parsed = Url::parse(url)?;
        let (server_name, ip) = match parsed.host() {
            Some(Host::Domain(domain)) => {
                let ip = self
                    .resolver
                    .lookup_ip(domain)
                    .await?
                    .iter()
                    .next()
                    .ok_or_else(|| CertificateError::NoAddress(domain.to_string()))?;
                (domain.to_string(), ip)
            }
            Some(Host::Ipv4(ip)) => (ip.to_string(), IpAddr::V4(ip)),
            Some(Host::Ipv6(ip)) => (ip.to_string(), IpAddr::V6(ip)),
            None => return Err(CertificateError::MissingHost),
        };

        let stream = TcpStream::connect(SocketAddr::new(ip, self.port))
            .await
            .map_err(CertificateError::Connect)?;

        let tls_stream = self
            .connector
            .connect(&server_name, stream)
            .await
            .map_err(CertificateError::Handshake)?;

        let cert = tls_stream
            .get_ref()
            .peer_certificate()
            .map_err(CertificateError::Handshake)?
            .ok_or(CertificateError::NoPeerCertificate)?;
        let der = cert.to_der().map_err(CertificateError::Handshake)?;

        expiry_from_der(&der)
    }
}

fn expiry_from_der(der: &[u8]) -> Result<DateTime<Utc>, CertificateError> {
    let (_, parsed) =
        parse_x509_certificate(der).map_err(|e| CertificateError::Parse(e.to_string()))?;
    let not_after = parsed.validity().not_after.timestamp();
    DateTime::from_timestamp(not_after, 0).ok_or(CertificateError::InvalidTimestamp(not_after))
}

#[async_trait]
impl Probe for CertificateProbe {
    type Output = CertificateInfo;

    async fn probe(&self, target: &Target) -> CertificateInfo {
        let fetched = match tokio::time::timeout(self.timeout, self.fetch_expiry(target.as_str())).await {
            Ok(fetched) => fetched,
            Err(_) => Err(CertificateError::TimedOut(self.timeout)),
        };

        match fetched {
            Ok(expires_at) => CertificateInfo::expiring(target.clone(), expires_at),
            Err(e) => CertificateInfo::failed(target.clone(), report(&e)),
        }
    }
}
