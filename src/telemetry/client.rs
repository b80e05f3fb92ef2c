//! # Backend Client
//!
//! HTTP client for the local ground backend that owns the serial link to the
//! drone. The dashboard only polls it; all protocol work happens behind it.
//!
//! Endpoints:
//! - `GET  /telemetry?drone=<id>`: latest [`TelemetrySnapshot`]
//! - `GET  /status`, `GET /ports`: link state
//! - `POST /connect`, `POST /disconnect`: open or close the serial link
//! - `POST /ping`: ping the drone through the link

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::snapshot::TelemetrySnapshot;
use crate::error::{DashboardError, Result};

/// Source of telemetry snapshots, abstracted so polling can be tested.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Fetches the latest snapshot for `drone`.
    async fn fetch(&self, drone: &str) -> Result<TelemetrySnapshot>;
}

/// Link state reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct LinkStatus {
    pub connection_port: String,
    pub connection_status: String,
}

impl LinkStatus {
    #[must_use]
    pub fn is_online(&self) -> bool {
        !self.connection_port.is_empty()
    }

    /// Header text of the link indicator.
    #[must_use]
    pub fn describe(&self) -> String {
        if self.is_online() {
            format!("Link online ({})", self.connection_port)
        } else {
            "Link offline".to_string()
        }
    }
}

/// Serial ports the backend can open.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct PortList {
    pub ports: Vec<String>,
    pub connection_port: String,
    pub connection_status: String,
    /// Set when the backend cannot enumerate ports at all.
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ConnectRequest<'a> {
    port: &'a str,
    baud_rate: u32,
}

/// HTTP client for the ground backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Creates a client for `base_url` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_json<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Backend(format!("{} returned {}", path, status)));
        }
        Ok(response.json().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("GET {}", path);
        let response = self.http.get(self.url(path)).send().await?;
        Self::read_json(path, response).await
    }

    /// Latest telemetry for `drone`.
    pub async fn telemetry(&self, drone: &str) -> Result<TelemetrySnapshot> {
        debug!("GET /telemetry (drone={})", drone);
        let response = self
            .http
            .get(self.url("/telemetry"))
            .query(&[("drone", drone)])
            .send()
            .await?;
        Self::read_json("/telemetry", response).await
    }

    /// Current link state.
    pub async fn status(&self) -> Result<LinkStatus> {
        self.get_json("/status").await
    }

    /// Available serial ports and the port in use.
    pub async fn ports(&self) -> Result<PortList> {
        self.get_json("/ports").await
    }

    /// Opens the serial link on `port` at `baud_rate`.
    pub async fn connect(&self, port: &str, baud_rate: u32) -> Result<LinkStatus> {
        debug!("POST /connect ({} @ {} baud)", port, baud_rate);
        let response = self
            .http
            .post(self.url("/connect"))
            .json(&ConnectRequest { port, baud_rate })
            .send()
            .await?;
        Self::read_json("/connect", response).await
    }

    /// Closes the serial link.
    pub async fn disconnect(&self) -> Result<LinkStatus> {
        debug!("POST /disconnect");
        let response = self.http.post(self.url("/disconnect")).send().await?;
        Self::read_json("/disconnect", response).await
    }

    /// Pings the drone through the link. The response body is ignored.
    pub async fn ping(&self) -> Result<()> {
        debug!("POST /ping");
        let response = self.http.post(self.url("/ping")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Backend(format!("/ping returned {}", status)));
        }
        Ok(())
    }
}

#[async_trait]
impl TelemetrySource for BackendClient {
    async fn fetch(&self, drone: &str) -> Result<TelemetrySnapshot> {
        self.telemetry(drone).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serves one HTTP response on a loopback port and returns the raw request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];

            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);

                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();

            String::from_utf8_lossy(&request).to_string()
        });

        (url, handle)
    }

    fn client(url: &str) -> BackendClient {
        BackendClient::new(url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = client("http://127.0.0.1:8002/");
        assert_eq!(client.base_url(), "http://127.0.0.1:8002");
        assert_eq!(client.url("/status"), "http://127.0.0.1:8002/status");
    }

    #[test]
    fn test_link_status_describe() {
        let online = LinkStatus {
            connection_port: "COM3".to_string(),
            connection_status: "Connected to COM3".to_string(),
        };
        assert!(online.is_online());
        assert_eq!(online.describe(), "Link online (COM3)");
        assert_eq!(LinkStatus::default().describe(), "Link offline");
    }

    #[tokio::test]
    async fn test_fetch_telemetry_sends_drone_query() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"tlm_rate": 20.0, "orientation": {"roll": 1.5, "pitch": 0, "yaw": 0}}"#,
        )
        .await;

        let snapshot = client(&url).fetch("talon").await.unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("GET /telemetry?drone=talon "));
        assert!(snapshot.is_drone_online());
        assert_eq!(snapshot.orientation.roll, 1.5);
    }

    #[tokio::test]
    async fn test_connect_posts_port_and_baud() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"connection_port": "COM4", "connection_status": "Connected to COM4"}"#,
        )
        .await;

        let status = client(&url).connect("COM4", 115200).await.unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("POST /connect "));
        assert!(request.contains(r#""port":"COM4""#));
        assert!(request.contains(r#""baud_rate":115200"#));
        assert_eq!(status.describe(), "Link online (COM4)");
    }

    #[tokio::test]
    async fn test_ports_decodes_list() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"ports": ["COM3", "COM4"], "connection_port": "", "connection_status": "Disconnected"}"#,
        )
        .await;

        let ports = client(&url).ports().await.unwrap();
        server.await.unwrap();

        assert_eq!(ports.ports, vec!["COM3", "COM4"]);
        assert!(ports.error.is_none());
        assert_eq!(ports.connection_status, "Disconnected");
    }

    #[tokio::test]
    async fn test_disconnect_reports_offline() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"connection_port": "", "connection_status": "Disconnected"}"#,
        )
        .await;

        let status = client(&url).disconnect().await.unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("POST /disconnect "));
        assert!(!status.is_online());
    }

    #[tokio::test]
    async fn test_error_status_maps_to_backend_error() {
        let (url, server) = serve_once("HTTP/1.1 503 Service Unavailable", "{}").await;

        let result = client(&url).status().await;
        server.await.unwrap();

        match result {
            Err(DashboardError::Backend(msg)) => {
                assert!(msg.contains("/status"));
                assert!(msg.contains("503"));
            }
            other => panic!("Expected Backend error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ping_ignores_body() {
        let (url, server) = serve_once("HTTP/1.1 200 OK", "null").await;

        client(&url).ping().await.unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("POST /ping "));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let result = client(&url).status().await;
        assert!(matches!(result, Err(DashboardError::Http(_))));
    }
}
