//! One-shot local receiver for the OAuth provider redirect.

use anyhow::Context;
use connectors::OAuthPhase;
use connectors::oauth::normalize_callback_path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::debug;

// ── Browser opener ────────────────────────────────────────────────────────────

/// Attempts to open `url` in the default system browser (best-effort).
#[cfg(not(test))]
pub fn open_browser(url: &str) {
    #[cfg(target_os = "macos")]
    let _ = std::process::Command::new("open").arg(url).spawn();
    #[cfg(target_os = "linux")]
    let _ = std::process::Command::new("xdg-open").arg(url).spawn();
    #[cfg(target_os = "windows")]
    let _ = std::process::Command::new("cmd")
        .args(["/C", "start", "", url])
        .spawn();
}

// ── Local callback server ─────────────────────────────────────────────────────

/// Listener bound before the browser is opened so the redirect cannot race
/// the bind.
pub struct CallbackListener {
    listener: TcpListener,
    path: String,
}

impl CallbackListener {
    /// Binds `host:port`; `port` 0 picks a free port. `path` is matched
    /// the way [`connectors::OAuthSettings::callback_url`] renders it.
    pub async fn bind(host: &str, port: u16, path: &str) -> anyhow::Result<Self> {
        let listener = TcpListener::bind((host, port))
            .await
            .with_context(|| format!("failed to bind OAuth callback port {host}:{port}"))?;
        Ok(Self {
            listener,
            path: normalize_callback_path(path),
        })
    }

    pub fn port(&self) -> anyhow::Result<u16> {
        Ok(self.listener.local_addr()?.port())
    }

    /// Waits for a request on the callback path and returns its raw query.
    ///
    /// Requests for other paths (e.g. `/favicon.ico`) get a 404 and are
    /// skipped.
    pub async fn accept_query(&self) -> anyhow::Result<String> {
        loop {
            let (mut stream, peer) = self
                .listener
                .accept()
                .await
                .context("failed to accept callback connection")?;

            let mut buf = vec![0u8; 8192];
            let n = stream
                .read(&mut buf)
                .await
                .context("failed to read callback request")?;
            let request = String::from_utf8_lossy(&buf[..n]);
            let target = request_target(&request);
            let (path, query) = target.split_once('?').unwrap_or((target, ""));
            debug!(peer = %peer, path = %path, "Callback request received");

            if path != self.path {
                let _ = stream
                    .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                    .await;
                continue;
            }

            let response = callback_page(query);
            let _ = stream.write_all(response.as_bytes()).await;
            return Ok(query.to_string());
        }
    }
}

/// Request target (path and query) from the first line of an HTTP request.
pub fn request_target(request: &str) -> &str {
    let first_line = request.lines().next().unwrap_or("");

    // "GET /oauth/callback?code=X&state=Y HTTP/1.1"
    first_line
        .strip_prefix("GET ")
        .unwrap_or(first_line)
        .split_whitespace()
        .next()
        .unwrap_or("")
}

/// HTTP response shown in the browser for a callback query.
fn callback_page(query: &str) -> String {
    let body = match OAuthPhase::from_callback_query(query) {
        OAuthPhase::Failed { message, .. } => format!(
            "<html><body><h2>&#10007; Authorization failed</h2>\
             <p>{}</p><p>You may close this tab.</p></body></html>",
            escape_html(&message)
        ),
        _ => "<html><body><h2>&#10003; Authorization received</h2>\
              <p>You may close this tab and return to the terminal.</p></body></html>"
            .to_string(),
    };
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\n\
         Connection: close\r\n\r\n{body}"
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OAuthConfig;
    use std::time::Duration;
    use tokio::net::TcpStream;

    async fn send(port: u16, target: &str) -> String {
        let mut stream = TcpStream::connect(("127.0.0.1", port))
            .await
            .expect("connect");
        stream
            .write_all(format!("GET {target} HTTP/1.1\r\nHost: localhost\r\n\r\n").as_bytes())
            .await
            .expect("write");
        let mut response = String::new();
        stream.read_to_string(&mut response).await.expect("read");
        response
    }

    #[test]
    fn request_target_extracts_path_and_query() {
        let req = "GET /oauth/callback?connector_id=jira&code=abc HTTP/1.1\r\nHost: x\r\n\r\n";
        assert_eq!(
            request_target(req),
            "/oauth/callback?connector_id=jira&code=abc"
        );
        assert_eq!(request_target(""), "");
    }

    #[test]
    fn callback_page_reports_missing_code() {
        let page = callback_page("connector_id=jira");
        assert!(page.contains("Authorization failed"));
        assert!(page.contains("Missing OAuth code"));

        let ok = callback_page("connector_id=jira&code=abc");
        assert!(ok.contains("Authorization received"));
    }

    #[tokio::test]
    async fn listener_skips_other_paths_and_returns_callback_query() {
        let listener = CallbackListener::bind("127.0.0.1", 0, "/oauth/callback")
            .await
            .expect("bind");
        let port = listener.port().expect("port");

        let client = tokio::spawn(async move {
            let favicon = send(port, "/favicon.ico").await;
            let callback = send(port, "/oauth/callback?connector_id=jira&code=abc&state=s").await;
            (favicon, callback)
        });

        let query = listener.accept_query().await.expect("query");
        assert_eq!(query, "connector_id=jira&code=abc&state=s");

        let (favicon, callback) = client.await.expect("client task");
        assert!(favicon.starts_with("HTTP/1.1 404"));
        assert!(callback.contains("Authorization received"));
    }

    #[tokio::test]
    async fn listener_accepts_advertised_url_for_relative_path() {
        let oauth = OAuthConfig {
            callback_port: 0,
            callback_path: "oauth/callback".to_string(),
            ..OAuthConfig::default()
        };
        let listener =
            CallbackListener::bind(&oauth.callback_host, oauth.callback_port, &oauth.callback_path)
                .await
                .expect("bind");
        let port = listener.port().expect("port");
        let advertised = oauth.settings_for_port(port).callback_url("jira");
        let url = url::Url::parse(&advertised).expect("advertised url");
        assert_eq!(url.port(), Some(port));

        let target = format!("{}?{}&code=abc", url.path(), url.query().unwrap_or_default());
        let client = tokio::spawn(async move { send(port, &target).await });

        let query = tokio::time::timeout(Duration::from_secs(2), listener.accept_query())
            .await
            .expect("callback accepted in time")
            .expect("query");
        assert_eq!(query, "connector_id=jira&code=abc");
        assert!(client.await.expect("client task").starts_with("HTTP/1.1 200"));
    }
}
