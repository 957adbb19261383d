//! Endpoint resolution.
//!
//! Endpoints are derived values. They are recomputed from the host and API
//! version on every call and never cached.

use crate::types::ApiVersion;

/// Path prefix shared by every SOAP endpoint.
const SOAP_PREFIX: &str = "/services/Soap/";

/// Partner endpoint for a host: `https://{host}/services/Soap/u/{version}`.
///
/// A host that already carries a scheme (`http://127.0.0.1:8080`) is used
/// as-is; a bare host gets `https://`.
pub fn resolve(host: &str, api_version: &ApiVersion) -> String {
    format!(
        "{}{}u/{}",
        base_url(host),
        SOAP_PREFIX,
        api_version.as_str()
    )
}

/// Replace the version segment of a SOAP endpoint URL.
///
/// `https://na1.salesforce.com/services/Soap/m/49.0/00D...` becomes
/// `.../services/Soap/m/50.0/00D...`. URLs that are not SOAP endpoints are
/// returned unchanged.
pub fn with_version(url: &str, api_version: &ApiVersion) -> String {
    let Some(start) = url.find(SOAP_PREFIX) else {
        return url.to_string();
    };
    let (head, tail) = url.split_at(start + SOAP_PREFIX.len());

    let mut segments: Vec<&str> = tail.split('/').collect();
    let has_version = segments
        .get(1)
        .is_some_and(|segment| ApiVersion::parse(segment).is_ok());
    if !has_version {
        return url.to_string();
    }

    segments[1] = api_version.as_str();
    format!("{}{}", head, segments.join("/"))
}

/// `scheme://host[:port]` of an absolute URL.
pub fn origin(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    })
}

fn base_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("https://") || host.starts_with("http://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}
