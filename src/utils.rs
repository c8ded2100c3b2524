use url::Url;

use crate::error::TransportError;

pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Split a backend base URL into the socket.io WebSocket endpoint and the
/// namespace. The URL path is the namespace, so `https://host/api` connects
/// to `wss://host/socket.io/` on namespace `/api`.
pub fn socket_endpoint(base_url: &str) -> Result<(Url, String), TransportError> {
    let mut url = Url::parse(&normalize_url(base_url))?;
    let namespace = match url.path().trim_end_matches('/') {
        "" => "/".to_string(),
        path => path.to_string(),
    };
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(TransportError::UnsupportedScheme(other.to_string())),
    };
    url.set_scheme(scheme)
        .map_err(|_| TransportError::UnsupportedScheme(scheme.to_string()))?;
    url.set_path("/socket.io/");
    url.set_query(Some("EIO=4&transport=websocket"));
    url.set_fragment(None);
    Ok((url, namespace))
}
