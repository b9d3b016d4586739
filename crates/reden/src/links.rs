use reqwest::Url;

/// Marker the site appends to URLs for servlet sessions.
pub const SESSION_MARKER: &str = ";jsessionid";

/// Strip the session id (and anything after it) from a detail page URL.
pub fn canonical_link(url: &str) -> &str {
    match url.find(SESSION_MARKER) {
        Some(idx) => &url[..idx],
        None => url,
    }
}

/// Resolve an `href` attribute against the page it was found on.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    match base.join(href) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::debug!(href, error = %e, "skipping unresolvable link");
            None
        }
    }
}

/// True if `url` lives on one of `allowed` or a subdomain of it.
/// An empty list allows everything.
pub fn is_allowed(url: &Url, allowed: &[String]) -> bool {
    if allowed.is_empty() {
        return true;
    }
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    allowed.iter().any(|domain| {
        let domain = domain.trim().trim_start_matches('.').to_ascii_lowercase();
        host == domain || host.ends_with(&format!(".{}", domain))
    })
}
