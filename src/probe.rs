//! Connectivity probing for candidate proxy configurations.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::proxy::{build_http_client, ProxyConfig};
use crate::{ClientError, Result};

/// Coarse latency bucket for a successful probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyClass {
    /// Under 300 ms.
    Fast,
    /// 300 ms to under 1500 ms.
    Acceptable,
    /// 1500 ms and above.
    Slow,
}

/// Outcome of a connectivity probe.
///
/// `proxy_used` is `None` when the direct connection was selected. The
/// selected configuration is only carried here; callers pass it on
/// explicitly to the search client.
#[derive(Debug, Clone)]
pub struct ConnectivityResult {
    /// Whether any candidate (or direct) reached the target.
    pub reachable: bool,
    /// The winning proxy configuration, if any.
    pub proxy_used: Option<ProxyConfig>,
    /// Round-trip time of the winning attempt in milliseconds.
    pub latency_ms: Option<u64>,
    /// The last attempt's error when nothing was reachable.
    pub error: Option<String>,
}

impl ConnectivityResult {
    /// Buckets the measured latency, when the probe succeeded.
    pub fn latency_class(&self) -> Option<LatencyClass> {
        self.latency_ms.map(|ms| match ms {
            0..=299 => LatencyClass::Fast,
            300..=1499 => LatencyClass::Acceptable,
            _ => LatencyClass::Slow,
        })
    }
}

/// Probes candidate proxy configurations against a target endpoint.
///
/// Candidates are tried in resolver order, the direct connection last.
/// The first candidate to answer with a success status wins and probing
/// stops.
pub struct ConnectivityProbe {
    target_url: String,
    user_agent: String,
    timeout: Duration,
}

impl ConnectivityProbe {
    /// Creates a probe against the given target URL.
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            user_agent: "Mozilla/5.0 (compatible; trendscope/0.1)".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Sets the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Tries each candidate in order, then the direct connection.
    pub async fn test_connection(&self, candidates: &[ProxyConfig]) -> ConnectivityResult {
        let mut last_error = None;

        for candidate in candidates {
            match self.attempt(Some(candidate)).await {
                Ok(latency_ms) => {
                    debug!(
                        "Proxy {} reached {} in {}ms",
                        candidate.sanitized_url(),
                        self.target_url,
                        latency_ms
                    );
                    return ConnectivityResult {
                        reachable: true,
                        proxy_used: Some(candidate.clone()),
                        latency_ms: Some(latency_ms),
                        error: None,
                    };
                }
                Err(e) => {
                    warn!("Proxy {} failed: {}", candidate.sanitized_url(), e);
                    last_error = Some(e.to_string());
                }
            }
        }

        match self.attempt(None).await {
            Ok(latency_ms) => {
                debug!("Direct connection reached {} in {}ms", self.target_url, latency_ms);
                ConnectivityResult {
                    reachable: true,
                    proxy_used: None,
                    latency_ms: Some(latency_ms),
                    error: None,
                }
            }
            Err(e) => {
                warn!("Direct connection failed: {}", e);
                last_error = Some(e.to_string());
                ConnectivityResult {
                    reachable: false,
                    proxy_used: None,
                    latency_ms: None,
                    error: last_error,
                }
            }
        }
    }

    async fn attempt(&self, proxy: Option<&ProxyConfig>) -> Result<u64> {
        let client = build_http_client(proxy, &self.user_agent, self.timeout)?;

        let start = Instant::now();
        let response = client.get(&self.target_url).send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(start.elapsed().as_millis() as u64)
        } else {
            Err(ClientError::Status {
                code: status.as_u16(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves canned HTTP responses on a loopback port, counting requests.
    async fn spawn_server(response: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 4096];
                let mut seen = Vec::new();
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            seen.extend_from_slice(&buf[..n]);
                            if seen.windows(4).any(|w| w == b"\r\n\r\n") {
                                break;
                            }
                        }
                    }
                }
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}", addr), hits)
    }

    const OK: &str =
        "HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok";
    const SERVER_ERROR: &str =
        "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";

    /// Binds a port and releases it so connections to it are refused.
    async fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/ping", addr)
    }

    #[test]
    fn test_latency_class_buckets() {
        let result = |ms| ConnectivityResult {
            reachable: true,
            proxy_used: None,
            latency_ms: Some(ms),
            error: None,
        };
        assert_eq!(result(10).latency_class(), Some(LatencyClass::Fast));
        assert_eq!(result(299).latency_class(), Some(LatencyClass::Fast));
        assert_eq!(result(300).latency_class(), Some(LatencyClass::Acceptable));
        assert_eq!(result(1499).latency_class(), Some(LatencyClass::Acceptable));
        assert_eq!(result(1500).latency_class(), Some(LatencyClass::Slow));
    }

    #[test]
    fn test_latency_class_unreachable() {
        let result = ConnectivityResult {
            reachable: false,
            proxy_used: None,
            latency_ms: None,
            error: Some("refused".to_string()),
        };
        assert!(result.latency_class().is_none());
    }

    #[tokio::test]
    async fn test_direct_connection_succeeds() {
        let (url, _) = spawn_server(OK).await;
        let probe = ConnectivityProbe::new(format!("{}/ping", url));

        let result = probe.test_connection(&[]).await;

        assert!(result.reachable);
        assert!(result.proxy_used.is_none());
        assert!(result.latency_ms.is_some());
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_failing_proxy_falls_back_to_direct() {
        let (proxy_url, proxy_hits) = spawn_server(SERVER_ERROR).await;
        let (target_url, _) = spawn_server(OK).await;

        let proxy = ProxyConfig::from_url(&proxy_url).unwrap();
        let probe = ConnectivityProbe::new(format!("{}/ping", target_url));

        let result = probe.test_connection(&[proxy]).await;

        assert!(result.reachable);
        assert!(result.proxy_used.is_none(), "direct connection should win");
        assert!(
            proxy_hits.load(Ordering::SeqCst) >= 1,
            "proxy candidate must be attempted before direct"
        );
    }

    #[tokio::test]
    async fn test_working_proxy_short_circuits() {
        // A plain-HTTP proxy answers the absolute-form GET itself, so a
        // 200-serving listener doubles as a working proxy.
        let (proxy_url, proxy_hits) = spawn_server(OK).await;
        let target = closed_port_url().await;

        let proxy = ProxyConfig::from_url(&proxy_url).unwrap();
        let probe = ConnectivityProbe::new(target);

        let result = probe.test_connection(&[proxy.clone()]).await;

        assert!(result.reachable);
        assert_eq!(result.proxy_used, Some(proxy));
        assert!(proxy_hits.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_all_candidates_fail() {
        let (proxy_url, _) = spawn_server(SERVER_ERROR).await;
        let target = closed_port_url().await;

        let proxy = ProxyConfig::from_url(&proxy_url).unwrap();
        let probe = ConnectivityProbe::new(target).with_timeout(Duration::from_secs(2));

        let result = probe.test_connection(&[proxy]).await;

        assert!(!result.reachable);
        assert!(result.proxy_used.is_none());
        assert!(result.latency_ms.is_none());
        // The captured error is from the final (direct) attempt.
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn test_probe_builder() {
        let probe = ConnectivityProbe::new("http://example.invalid")
            .with_timeout(Duration::from_secs(1))
            .with_user_agent("probe-test");
        assert_eq!(probe.timeout, Duration::from_secs(1));
        assert_eq!(probe.user_agent, "probe-test");
    }
}
