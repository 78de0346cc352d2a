mod http;
mod in_memory;

pub use http::HttpRemoteClient;
pub use in_memory::InMemoryRemoteClient;

use crate::domain::models::UrlOptions;

/// Encode URL options (transform spec + download disposition) into a query
/// string, deterministically ordered. Empty options produce an empty string.
pub(crate) fn url_query(options: &UrlOptions) -> String {
    let mut pairs: Vec<(String, String)> = Vec::new();

    if let Some(transform) = &options.transform {
        for (key, value) in transform.to_query_pairs() {
            pairs.push((key.to_string(), value));
        }
    }
    if let Some(download) = &options.download {
        pairs.push(("download".to_string(), download.clone()));
    }

    if pairs.is_empty() {
        return String::new();
    }

    let joined = pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");
    format!("?{}", joined)
}
