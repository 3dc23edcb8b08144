//! URL helpers for RPC endpoints and metadata locations.

/// Masks a URL down to scheme and host so RPC URLs with embedded API keys
/// can be logged.
///
/// # Examples
/// - `https://solana-mainnet.g.alchemy.com/v2/abc123` → `https://solana-mainnet.g.alchemy.com/***`
/// - `http://localhost:8899` → `http://localhost:8899`
/// - `invalid-url` → `***`
pub fn mask_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return "***".to_string();
    };

    let host_start = scheme_end + 3;
    let rest = &url[host_start..];

    if let Some(path_start) = rest.find('/') {
        let path_and_beyond = &rest[path_start..];
        if path_and_beyond.len() > 1 || url.contains('?') {
            let host_end = host_start + path_start;
            format!("{}/***", &url[..host_end])
        } else {
            url.to_string()
        }
    } else if let Some(query_start) = url.find('?') {
        format!("{}?***", &url[..query_start])
    } else {
        url.to_string()
    }
}

/// True for `http://` and `https://` URLs.
pub fn is_absolute_http_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Resolves the URI stored in on-chain metadata.
///
/// Absolute `http(s)` URIs are kept as they are; anything else is treated
/// as a path under `base_url`.
pub fn resolve_metadata_uri(base_url: &str, uri: &str) -> String {
    let uri = uri.trim();
    if is_absolute_http_url(uri) {
        return uri.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim().trim_end_matches('/'),
        uri.trim_start_matches('/')
    )
}
