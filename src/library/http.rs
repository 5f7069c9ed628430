//! Network seam for the synchronization pass.
//!
//! One `HttpSource` is shared by the feed request and every artwork download
//! of a pass, so connections to the CDN are reused between games.

use crate::library::SyncError;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

const USER_AGENT: &str = concat!("steamlib/", env!("CARGO_PKG_VERSION"));

/// Upper bound for establishing any connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound for a whole artwork download, body included.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpSource: Send + Sync {
    /// Performs a GET and returns the whole response body.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, SyncError>;

    /// Streams the body of a GET into `dest`, returning the number of bytes written.
    async fn download_to(&self, url: &str, dest: &Path) -> Result<u64, SyncError>;
}

/// `HttpSource` backed by a single `reqwest::Client`.
pub struct ReqwestSource {
    client: Client,
    download_timeout: Duration,
}

fn client_builder() -> ClientBuilder {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
}

impl ReqwestSource {
    pub fn new() -> Self {
        let client = client_builder().build().unwrap_or_else(|_| Client::new());

        Self {
            client,
            download_timeout: DOWNLOAD_TIMEOUT,
        }
    }
}

impl Default for ReqwestSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpSource for ReqwestSource {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, SyncError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.bytes().await?.to_vec())
    }

    async fn download_to(&self, url: &str, dest: &Path) -> Result<u64, SyncError> {
        let mut response = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await?
            .error_for_status()?;

        let mut file = File::create(dest).await?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    const LOGO: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x80];

    fn source(download_timeout: Duration) -> ReqwestSource {
        ReqwestSource {
            client: client_builder().no_proxy().build().unwrap(),
            download_timeout,
        }
    }

    async fn read_request_path(stream: &mut tokio::net::TcpStream) -> String {
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        String::from_utf8_lossy(&request)
            .split_whitespace()
            .nth(1)
            .unwrap_or("/")
            .to_string()
    }

    /// Serves `LOGO` at `/logo.jpg` and 404 everywhere else.
    async fn serve_logo() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let (mut stream, _) = listener.accept().await.unwrap();
                tokio::spawn(async move {
                    let path = read_request_path(&mut stream).await;
                    let (status, body): (&str, &[u8]) = if path == "/logo.jpg" {
                        ("200 OK", LOGO)
                    } else {
                        ("404 Not Found", b"not found")
                    };
                    let head = format!(
                        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        status,
                        body.len()
                    );
                    stream.write_all(head.as_bytes()).await.unwrap();
                    stream.write_all(body).await.unwrap();
                    stream.flush().await.unwrap();
                });
            }
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let base = serve_logo().await;
        let body = source(DOWNLOAD_TIMEOUT)
            .fetch(&format!("{}/logo.jpg", base), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(body, LOGO);
    }

    #[tokio::test]
    async fn test_download_to_writes_exact_bytes() {
        let base = serve_logo().await;
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("game_570_logo_1.jpg");

        let written = source(DOWNLOAD_TIMEOUT)
            .download_to(&format!("{}/logo.jpg", base), &dest)
            .await
            .unwrap();

        assert_eq!(written, LOGO.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), LOGO);
    }

    #[tokio::test]
    async fn test_not_found_is_an_error() {
        let base = serve_logo().await;
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("game_1_logo_1.jpg");
        let http = source(DOWNLOAD_TIMEOUT);
        let url = format!("{}/missing.jpg", base);

        assert!(http.fetch(&url, Duration::from_secs(5)).await.is_err());
        assert!(http.download_to(&url, &dest).await.is_err());
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_download_to_gives_up_on_stalled_body() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_request_path(&mut stream).await;
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 4096\r\n\r\nabc")
                .await
                .unwrap();
            stream.flush().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("game_570_logo_1.jpg");
        let start = std::time::Instant::now();

        let result = source(Duration::from_millis(300))
            .download_to(&format!("http://{}/logo.jpg", addr), &dest)
            .await;

        assert!(result.is_err());
        assert!(start.elapsed() < Duration::from_secs(10));
    }
}
