/*!
 * URL Canonicalization
 * Parses and normalizes outbound request targets before pattern matching
 */

use super::types::{ResolveError, ResolveResult};
use reqwest::Url;
use std::fmt;

/// A parsed URL reduced to `scheme://host[:port]/path`
///
/// The parser lowercases scheme and host, drops default ports and removes
/// dot segments. Query and fragment never take part in matching. Path
/// segments are percent-decoded so `%61dmin` cannot slip past an `admin` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalUrl {
    url: Url,
    scheme: String,
    authority: String,
    segments: Vec<String>,
}

impl CanonicalUrl {
    pub fn parse(raw: &str) -> ResolveResult<Self> {
        let url = Url::parse(raw).map_err(|e| ResolveError::invalid_url(raw, e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ResolveError::invalid_url(
                raw,
                format!("unsupported scheme {}", url.scheme()),
            ));
        }
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ResolveError::invalid_url(raw, "missing host"))?;

        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let mut segments = Vec::new();
        for segment in url.path().split('/').skip(1) {
            let decoded = percent_decode(segment)
                .ok_or_else(|| ResolveError::invalid_url(raw, "path is not valid UTF-8 after decoding"))?;
            // An encoded separator or dot segment would match as one segment but route as several
            let dot_segment = segment != decoded && matches!(decoded.as_str(), "." | "..");
            if decoded.contains(['/', '\\']) || dot_segment {
                return Err(ResolveError::invalid_url(
                    raw,
                    format!("path segment {:?} decodes to a separator or dot segment", segment),
                ));
            }
            segments.push(decoded);
        }

        Ok(Self {
            scheme: url.scheme().to_string(),
            authority,
            segments,
            url,
        })
    }

    /// The parsed URL, including query, as it will be requested
    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// Segments in the same shape a `/`-split pattern has:
    /// `["https:", "", "host", path...]`
    pub fn match_segments(&self) -> Vec<String> {
        let mut parts = Vec::with_capacity(self.segments.len() + 3);
        parts.push(format!("{}:", self.scheme));
        parts.push(String::new());
        parts.push(self.authority.clone());
        parts.extend(self.segments.iter().cloned());
        parts
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)?;
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

fn percent_decode(segment: &str) -> Option<String> {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(value) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(value);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).ok()
}
