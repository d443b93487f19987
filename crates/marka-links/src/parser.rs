//! Tracking URL decomposition
//!
//! A submitted URL is broken into its scheme, domain, path, destination
//! (the URL with UTM parameters stripped), and the five UTM fields. The
//! full normalized URL is hashed for deduplication.

use marka_core::{ServiceError, ServiceResult};
use sha2::{Digest, Sha256};
use url::Url;

pub const URL_MAX_LEN: usize = 2048;
pub const UTM_VALUE_MAX_LEN: usize = 255;

const UTM_PARAMS: [&str; 5] = [
    "utm_campaign",
    "utm_medium",
    "utm_source",
    "utm_content",
    "utm_term",
];

/// The parts of a tracking URL after server-side decomposition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    /// Normalized full URL as stored
    pub url: String,
    /// SHA-256 hex digest of the normalized URL
    pub url_hash: String,
    pub scheme: String,
    pub domain: String,
    /// URL with UTM parameters removed; other query params remain
    pub destination: String,
    pub url_path: String,
    pub utm_campaign: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_source: Option<String>,
    pub utm_content: Option<String>,
    pub utm_term: Option<String>,
}

fn utm_value(parsed: &Url, name: &str) -> ServiceResult<Option<String>> {
    // Last occurrence wins; empty values count as absent
    let value = parsed
        .query_pairs()
        .filter(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .last()
        .filter(|value| !value.is_empty());

    if let Some(value) = &value {
        if value.len() > UTM_VALUE_MAX_LEN {
            return Err(ServiceError::validation(format!(
                "{} must not exceed {} characters",
                name, UTM_VALUE_MAX_LEN
            )));
        }
    }

    Ok(value)
}

/// Parses a submitted tracking URL into its stored parts.
///
/// URLs without a scheme are assumed to be https. Invalid or non-http(s)
/// URLs are rejected as validation errors.
pub fn parse_tracking_url(raw: &str) -> ServiceResult<ParsedUrl> {
    let raw = raw.trim();
    if raw.is_empty() || raw.len() > URL_MAX_LEN {
        return Err(ServiceError::validation(format!(
            "URL must be between 1 and {} characters",
            URL_MAX_LEN
        )));
    }

    let parsed = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{}", raw))
            .map_err(|e| ServiceError::validation(format!("Invalid URL: {}", e)))?,
        Err(e) => return Err(ServiceError::validation(format!("Invalid URL: {}", e))),
    };

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ServiceError::validation(format!(
            "Unsupported URL scheme '{}'",
            parsed.scheme()
        )));
    }

    let domain = parsed
        .host_str()
        .ok_or_else(|| ServiceError::validation("URL must have a host"))?
        .to_string();

    let utm_campaign = utm_value(&parsed, "utm_campaign")?;
    let utm_medium = utm_value(&parsed, "utm_medium")?;
    let utm_source = utm_value(&parsed, "utm_source")?;
    let utm_content = utm_value(&parsed, "utm_content")?;
    let utm_term = utm_value(&parsed, "utm_term")?;

    let mut destination = parsed.clone();
    let remaining: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !UTM_PARAMS.contains(&key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if remaining.is_empty() {
        destination.set_query(None);
    } else {
        destination
            .query_pairs_mut()
            .clear()
            .extend_pairs(remaining);
    }

    let url = parsed.to_string();
    let url_hash = hex::encode(Sha256::digest(url.as_bytes()));

    Ok(ParsedUrl {
        url,
        url_hash,
        scheme: parsed.scheme().to_string(),
        domain,
        destination: destination.to_string(),
        url_path: parsed.path().to_string(),
        utm_campaign,
        utm_medium,
        utm_source,
        utm_content,
        utm_term,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_all_utm_fields() {
        let parsed = parse_tracking_url(
            "https://shop.example.com/sale?utm_source=newsletter&utm_medium=email\
             &utm_campaign=spring&utm_content=banner&utm_term=shoes",
        )
        .unwrap();

        assert_eq!(parsed.scheme, "https");
        assert_eq!(parsed.domain, "shop.example.com");
        assert_eq!(parsed.url_path, "/sale");
        assert_eq!(parsed.destination, "https://shop.example.com/sale");
        assert_eq!(parsed.utm_source.as_deref(), Some("newsletter"));
        assert_eq!(parsed.utm_medium.as_deref(), Some("email"));
        assert_eq!(parsed.utm_campaign.as_deref(), Some("spring"));
        assert_eq!(parsed.utm_content.as_deref(), Some("banner"));
        assert_eq!(parsed.utm_term.as_deref(), Some("shoes"));
    }

    #[test]
    fn test_missing_utm_params_stay_none() {
        let parsed = parse_tracking_url("https://example.com/page").unwrap();
        assert!(parsed.utm_source.is_none());
        assert!(parsed.utm_campaign.is_none());
        assert_eq!(parsed.destination, "https://example.com/page");
    }

    #[test]
    fn test_empty_utm_values_are_absent() {
        let parsed =
            parse_tracking_url("https://example.com/?utm_source=&utm_medium=email").unwrap();
        assert!(parsed.utm_source.is_none());
        assert_eq!(parsed.utm_medium.as_deref(), Some("email"));
    }

    #[test]
    fn test_non_utm_params_survive_in_destination() {
        let parsed =
            parse_tracking_url("https://example.com/p?id=42&utm_source=ads&ref=abc").unwrap();
        assert_eq!(parsed.destination, "https://example.com/p?id=42&ref=abc");
        assert_eq!(parsed.utm_source.as_deref(), Some("ads"));
    }

    #[test]
    fn test_scheme_defaults_to_https() {
        let parsed = parse_tracking_url("example.com/page?utm_source=x").unwrap();
        assert_eq!(parsed.scheme, "https");
        assert_eq!(parsed.domain, "example.com");
    }

    #[test]
    fn test_invalid_urls_rejected() {
        assert!(parse_tracking_url("").is_err());
        assert!(parse_tracking_url("ftp://example.com/file").is_err());
        assert!(parse_tracking_url("https://").is_err());
        assert!(parse_tracking_url(&format!(
            "https://example.com/{}",
            "x".repeat(URL_MAX_LEN)
        ))
        .is_err());
    }

    #[test]
    fn test_hash_is_stable_per_url() {
        let first = parse_tracking_url("https://example.com/a?utm_source=x").unwrap();
        let second = parse_tracking_url("https://example.com/a?utm_source=x").unwrap();
        let different = parse_tracking_url("https://example.com/a?utm_source=y").unwrap();

        assert_eq!(first.url_hash, second.url_hash);
        assert_ne!(first.url_hash, different.url_hash);
        assert_eq!(first.url_hash.len(), 64);
    }
}
