use async_trait::async_trait;
use reqwest::{Client, Proxy};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use widgetlink_core::config::TransportConfig;
use widgetlink_core::{Error, Result};

use crate::{HttpRequest, HttpResponse, Method, Transport, TransportAcquirer};

/// Outcome of proxy resolution for one base URI.
#[derive(Debug, PartialEq, Eq)]
enum ProxyResolution {
    UseProxy(String),
    /// `proxy = ""`, or the host is listed in `noProxy`.
    ForceDirectConnect,
    /// Not configured; reqwest reads HTTP(S)_PROXY itself.
    None,
}

/// Exact host, `*.example.com` (subdomains only) and `.example.com`
/// (domain and subdomains) rules.
fn is_no_proxy(host: &str, no_proxy_list: &[String]) -> bool {
    let host_lower = host.to_lowercase();
    for rule in no_proxy_list {
        let r = rule.trim().to_lowercase();
        if r.is_empty() {
            continue;
        }
        if let Some(suffix) = r.strip_prefix("*.") {
            if host_lower.ends_with(&format!(".{}", suffix)) {
                return true;
            }
        } else if let Some(suffix) = r.strip_prefix('.') {
            if host_lower == suffix || host_lower.ends_with(&format!(".{}", suffix)) {
                return true;
            }
        } else if host_lower == r {
            return true;
        }
    }
    false
}

fn extract_host(url: &str) -> Option<String> {
    let without_scheme = match url.find("://") {
        Some(pos) => &url[pos + 3..],
        None => url,
    };
    let authority = without_scheme.split(['/', ';', '?', '#']).next()?;
    let host = authority.rsplit('@').next()?;
    let host = if host.starts_with('[') {
        host.split(']').next().map(|s| s.trim_start_matches('['))?.to_string()
    } else {
        host.split(':').next()?.to_string()
    };
    Some(host)
}

fn resolve_proxy(proxy: Option<&str>, no_proxy: &[String], base_uri: &str) -> ProxyResolution {
    match proxy {
        None => ProxyResolution::None,
        Some(p) if p.trim().is_empty() => ProxyResolution::ForceDirectConnect,
        Some(p) => {
            if let Some(host) = extract_host(base_uri) {
                if is_no_proxy(&host, no_proxy) {
                    return ProxyResolution::ForceDirectConnect;
                }
            }
            ProxyResolution::UseProxy(p.trim().to_string())
        }
    }
}

/// Builds the reqwest client for requests against `base_uri`.
pub fn build_http_client(config: &TransportConfig, base_uri: &str) -> Result<Client> {
    let redirect_policy = if config.follow_redirects {
        reqwest::redirect::Policy::limited(10)
    } else {
        reqwest::redirect::Policy::none()
    };

    let mut builder = Client::builder()
        .redirect(redirect_policy)
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.clone());

    match resolve_proxy(config.proxy.as_deref(), &config.no_proxy, base_uri) {
        ProxyResolution::UseProxy(proxy_url) => match Proxy::all(&proxy_url) {
            Ok(p) => {
                info!(proxy = %proxy_url, base_uri = %base_uri, "Widget transport using proxy");
                builder = builder.proxy(p);
            }
            Err(e) => {
                warn!(error = %e, proxy = %proxy_url, "Invalid proxy URL, falling back to direct connect");
                builder = builder.no_proxy();
            }
        },
        ProxyResolution::ForceDirectConnect => {
            debug!(base_uri = %base_uri, "Widget transport forced to direct connect");
            builder = builder.no_proxy();
        }
        ProxyResolution::None => {}
    }

    builder
        .build()
        .map_err(|e| Error::TransportUnavailable(format!("Failed to create HTTP client: {}", e)))
}

/// [`Transport`] backed by a shared reqwest client.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Transport(format!("Request timed out: {}", e))
            } else if e.is_connect() {
                Error::Transport(format!("Connection failed: {}", e))
            } else {
                Error::Transport(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read response body: {}", e)))?;

        Ok(HttpResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).to_string(),
        })
    }
}

/// Probes for an HTTP client once and hands out the result.
pub struct HttpAcquirer {
    transport: Option<Arc<HttpTransport>>,
}

impl HttpAcquirer {
    pub fn new(config: &TransportConfig, base_uri: &str) -> Self {
        let transport = match build_http_client(config, base_uri) {
            Ok(client) => Some(Arc::new(HttpTransport::new(client))),
            Err(e) => {
                warn!(error = %e, "HTTP transport unavailable");
                None
            }
        };
        Self { transport }
    }
}

impl TransportAcquirer for HttpAcquirer {
    fn acquire(&self) -> Option<Arc<dyn Transport>> {
        self.transport
            .as_ref()
            .map(|t| Arc::clone(t) as Arc<dyn Transport>)
    }
}
