use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;

use super::prelude::*;
use crate::probe::{Probe, Target};

const USER_AGENT: &str = "sitewatch-probe/1.0";

/// Issues one GET per target and classifies the outcome.
///
/// Certificate validation stays enabled here: an invalid chain is a transport
/// failure for this probe. Expiry is measured separately by the certificate probe.
#[derive(Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Probe for HttpProbe {
    type Output = ProbeResult;

    async fn probe(&self, target: &Target) -> ProbeResult {
        let start = Instant::now();
        match self.client.get(target.as_str()).send().await {
            Ok(resp) => {
                let latency_millis = start.elapsed().as_millis() as u64;
                ProbeResult::response(target.clone(), resp.status().as_u16(), latency_millis)
            }
            Err(e) => ProbeResult::failed(target.clone(), report(&e)),
        }
    }
}
