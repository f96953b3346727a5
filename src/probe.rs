use std::net::IpAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use surge_ping::{Client, Config, IcmpPacket, PingIdentifier, PingSequence};

/// Matches the 32-byte payload conventional ping sends.
const PING_PAYLOAD: [u8; 32] = [0; 32];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestType {
    IcmpPing,
    DnsResolution,
}

impl TestType {
    pub fn as_str(self) -> &'static str {
        match self {
            TestType::IcmpPing => "ICMP_PING",
            TestType::DnsResolution => "DNS_RESOLUTION",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub timestamp: DateTime<Local>,
    pub target: String,
    pub response_time_ms: Option<f64>,
    pub success: bool,
    pub test_type: TestType,
}

impl ProbeResult {
    pub fn success(
        timestamp: DateTime<Local>,
        target: impl Into<String>,
        response_time_ms: Option<f64>,
        test_type: TestType,
    ) -> Self {
        Self {
            timestamp,
            target: target.into(),
            response_time_ms,
            success: true,
            test_type,
        }
    }

    pub fn failure(
        timestamp: DateTime<Local>,
        target: impl Into<String>,
        test_type: TestType,
    ) -> Self {
        Self {
            timestamp,
            target: target.into(),
            response_time_ms: None,
            success: false,
            test_type,
        }
    }
}

/// Narrow capability interface for reachability checks. The rest of the
/// crate never sees how a probe is carried out, only its outcome.
#[allow(async_fn_in_trait)]
pub trait ProbeSource {
    async fn ping(&self, target: &str) -> ProbeResult;
    async fn resolve(&self, domain: &str) -> ProbeResult;
}

pub struct Prober {
    client: Client,
    timeout: Duration,
    sequence: AtomicU16,
}

impl Prober {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::new(&Config::default()).context("Failed to create ICMP client")?;
        Ok(Self {
            client,
            timeout,
            sequence: AtomicU16::new(0),
        })
    }

    /// Resolve a target to an IP address, accepting literal addresses as-is.
    async fn resolve_target(target: &str) -> Option<IpAddr> {
        if let Ok(ip) = target.parse::<IpAddr>() {
            return Some(ip);
        }

        match tokio::net::lookup_host((target, 80)).await {
            Ok(mut addrs) => addrs.next().map(|addr| addr.ip()),
            Err(_) => None,
        }
    }

    async fn execute_ping(
        &self,
        target_ip: IpAddr,
        target: &str,
        timestamp: DateTime<Local>,
    ) -> ProbeResult {
        let mut pinger = self.client.pinger(target_ip, PingIdentifier(1)).await;
        pinger.timeout(self.timeout);

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        match pinger.ping(PingSequence(sequence), &PING_PAYLOAD).await {
            Ok((IcmpPacket::V4(_), duration)) | Ok((IcmpPacket::V6(_), duration)) => {
                let response_time_ms = duration.as_secs_f64() * 1000.0;
                ProbeResult::success(timestamp, target, Some(response_time_ms), TestType::IcmpPing)
            }
            Err(_) => ProbeResult::failure(timestamp, target, TestType::IcmpPing),
        }
    }
}

impl ProbeSource for Prober {
    async fn ping(&self, target: &str) -> ProbeResult {
        let timestamp = Local::now();

        match Self::resolve_target(target).await {
            Some(ip) => self.execute_ping(ip, target, timestamp).await,
            None => ProbeResult::failure(timestamp, target, TestType::IcmpPing),
        }
    }

    async fn resolve(&self, domain: &str) -> ProbeResult {
        let timestamp = Local::now();

        match tokio::time::timeout(self.timeout, tokio::net::lookup_host((domain, 80))).await {
            Ok(Ok(mut addrs)) => {
                if addrs.next().is_some() {
                    ProbeResult::success(timestamp, domain, None, TestType::DnsResolution)
                } else {
                    ProbeResult::failure(timestamp, domain, TestType::DnsResolution)
                }
            }
            _ => ProbeResult::failure(timestamp, domain, TestType::DnsResolution),
        }
    }
}
