use url::Url;

/// True iff `text` parses as an absolute `http` or `https` URL with a
/// non-empty host. Never touches the network.
pub fn is_valid_url(text: &str) -> bool {
    match Url::parse(text) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}
