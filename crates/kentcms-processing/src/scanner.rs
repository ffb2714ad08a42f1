//! Threat scanning of stored upload bytes.

use async_trait::async_trait;
use clamav_client::{clean, Tcp};
use std::str;
use std::time::{Duration, Instant};

/// Result of a threat scan. `Unavailable` means the scan did not complete;
/// it is never conflated with `Clean` and callers must reject the upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Clean,
    Infected(String),
    Unavailable(String),
}

/// Synchronous (from the request's point of view) signature/heuristic scan
/// over the final stored bytes.
#[async_trait]
pub trait ThreatScanner: Send + Sync {
    async fn scan(&self, data: &[u8]) -> ScanOutcome;
}

/// ClamAV daemon scanner over TCP.
#[derive(Clone)]
pub struct ClamAvScanner {
    host: String,
    port: u16,
    timeout_secs: u64,
}

impl ClamAvScanner {
    /// # Arguments
    /// * `host` - ClamAV daemon hostname
    /// * `port` - ClamAV daemon port (typically 3310)
    /// * `timeout_secs` - per-scan timeout, for large files or slow daemons
    pub fn new(host: String, port: u16, timeout_secs: u64) -> Self {
        Self {
            host,
            port,
            timeout_secs,
        }
    }
}

/// Extract the virus name from a "stream: Name FOUND" daemon response.
fn parse_virus_name(response: &[u8]) -> String {
    let text = str::from_utf8(response).unwrap_or("").trim();
    if text.contains("FOUND") {
        text.split(':')
            .nth(1)
            .unwrap_or("unknown")
            .split_whitespace()
            .next()
            .unwrap_or("unknown")
            .to_string()
    } else {
        "unknown".to_string()
    }
}

#[async_trait]
impl ThreatScanner for ClamAvScanner {
    /// Scan using the sync client inside `spawn_blocking` to avoid !Send
    /// tokio futures from the socket API.
    async fn scan(&self, data: &[u8]) -> ScanOutcome {
        let start = Instant::now();
        tracing::debug!(host = %self.host, port = %self.port, "Starting ClamAV scan");

        let data = data.to_vec();
        let host = self.host.clone();
        let port = self.port;

        let result = tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            tokio::task::spawn_blocking(move || {
                let address = format!("{}:{}", host, port);
                let connection = Tcp {
                    host_address: address.as_str(),
                };
                match clamav_client::scan_buffer(data.as_slice(), connection, None) {
                    Ok(response) => match clean(&response) {
                        Ok(true) => {
                            tracing::info!(
                                duration_ms = start.elapsed().as_millis(),
                                "File scan completed: clean"
                            );
                            ScanOutcome::Clean
                        }
                        Ok(false) => {
                            let virus_name = parse_virus_name(&response);
                            tracing::warn!(
                                duration_ms = start.elapsed().as_millis(),
                                threat = %virus_name,
                                "File scan detected threat"
                            );
                            ScanOutcome::Infected(virus_name)
                        }
                        Err(e) => {
                            let msg = format!("Failed to parse ClamAV response: {}", e);
                            tracing::error!(error = %msg, "ClamAV response unparseable");
                            ScanOutcome::Unavailable(msg)
                        }
                    },
                    Err(e) => {
                        let msg = format!("ClamAV scan error: {}", e);
                        tracing::error!(error = %msg, "ClamAV scan failed");
                        ScanOutcome::Unavailable(msg)
                    }
                }
            }),
        )
        .await;

        match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                let msg = format!("ClamAV scan task join error: {}", e);
                tracing::error!(error = %msg, "ClamAV scan panicked");
                ScanOutcome::Unavailable(msg)
            }
            Err(_) => {
                let msg = format!(
                    "ClamAV scan timeout (exceeded {} seconds)",
                    self.timeout_secs
                );
                tracing::error!(error = %msg, "ClamAV scan timeout");
                ScanOutcome::Unavailable(msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_virus_name_from_found_response() {
        assert_eq!(
            parse_virus_name(b"stream: Eicar-Test-Signature FOUND\0"),
            "Eicar-Test-Signature"
        );
        assert_eq!(parse_virus_name(b"stream: OK"), "unknown");
        assert_eq!(parse_virus_name(&[0xFF, 0xFE]), "unknown");
    }

    #[test]
    fn scanner_constructor() {
        let _scanner = ClamAvScanner::new("localhost".to_string(), 3310, 30);
    }
}
