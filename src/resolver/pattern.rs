/*!
 * Glob Patterns
 * Segment-anchored matching for canonical paths and URLs
 *
 * `**` as a whole segment matches zero or more whole segments. Any other
 * segment may contain `*`, matching any run of characters inside that one
 * segment. Patterns are anchored at both ends.
 */

use super::canonical::{canonicalize_lossy, normalize_separators, CanonicalPath};
use super::types::{ResolveError, ResolveResult};
use super::url::CanonicalUrl;
use super::variables::PathVariables;
use path_clean::PathClean;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Exact text
    Literal(String),
    /// Text containing `*`, confined to one segment
    Wildcard(String),
    /// `**`
    AnyDepth,
}

impl Segment {
    fn parse(text: &str, pattern: &str) -> ResolveResult<Self> {
        if text == "**" {
            Ok(Segment::AnyDepth)
        } else if text.contains("**") {
            Err(ResolveError::invalid_pattern(
                pattern,
                "`**` must be a whole segment",
            ))
        } else if text.contains('*') {
            Ok(Segment::Wildcard(text.to_string()))
        } else {
            Ok(Segment::Literal(text.to_string()))
        }
    }

    fn matches(&self, segment: &str) -> bool {
        match self {
            Segment::Literal(lit) => lit == segment,
            Segment::Wildcard(pat) => wildcard_match(pat.as_bytes(), segment.as_bytes()),
            Segment::AnyDepth => true,
        }
    }
}

/// A compiled, immutable glob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobPattern {
    source: String,
    compiled: String,
    segments: Vec<Segment>,
}

impl GlobPattern {
    /// Compile a raw segment pattern without any expansion
    pub fn new(pattern: &str) -> ResolveResult<Self> {
        if pattern.is_empty() {
            return Err(ResolveError::invalid_pattern(pattern, "empty pattern"));
        }
        let segments = pattern
            .split('/')
            .map(|s| Segment::parse(s, pattern))
            .collect::<ResolveResult<Vec<_>>>()?;

        Ok(Self {
            source: pattern.to_string(),
            compiled: pattern.to_string(),
            segments,
        })
    }

    /// Compile a filesystem pattern
    ///
    /// Expands the leading path variable, cleans the pattern lexically and
    /// canonicalizes the longest wildcard-free prefix when it exists, so that
    /// symlinked bases (e.g. a temp dir behind a link) line up with canonical
    /// request paths.
    pub fn for_path(pattern: &str, variables: &PathVariables) -> ResolveResult<Self> {
        let expanded = variables.expand(pattern)?;
        let cleaned = PathBuf::from(&expanded).clean();
        if !cleaned.is_absolute() {
            return Err(ResolveError::invalid_pattern(
                pattern,
                "filesystem patterns must be absolute or start with a path variable",
            ));
        }
        let cleaned = cleaned
            .to_str()
            .map(normalize_separators)
            .ok_or_else(|| ResolveError::NotUtf8(cleaned.clone()))?;

        let mut compiled = Self::new(&cleaned)?;
        compiled.source = pattern.to_string();
        compiled.canonicalize_prefix();
        Ok(compiled)
    }

    /// Compile a URL pattern
    ///
    /// Scheme and authority are lowercased to line up with parsed URLs; the
    /// path part is kept verbatim.
    pub fn for_url(pattern: &str) -> ResolveResult<Self> {
        let Some(scheme_end) = pattern.find("://") else {
            return Err(ResolveError::invalid_pattern(
                pattern,
                "url patterns must start with a scheme, e.g. https://",
            ));
        };
        let authority_start = scheme_end + 3;
        let authority_end = pattern[authority_start..]
            .find('/')
            .map(|i| i + authority_start)
            .unwrap_or(pattern.len());
        if authority_end == authority_start {
            return Err(ResolveError::invalid_pattern(pattern, "missing host"));
        }

        // Parsed urls never carry their scheme's default port, so neither may the rule
        let mut prefix = pattern[..authority_end].to_ascii_lowercase();
        let default_port = match &prefix[..scheme_end] {
            "https" => Some(":443"),
            "http" => Some(":80"),
            _ => None,
        };
        if let Some(port) = default_port {
            if prefix.ends_with(port) {
                prefix.truncate(prefix.len() - port.len());
            }
        }
        let normalized = format!("{}{}", prefix, &pattern[authority_end..]);
        let mut compiled = Self::new(&normalized)?;
        compiled.source = pattern.to_string();
        Ok(compiled)
    }

    /// The pattern as declared
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The pattern after expansion and prefix canonicalization
    pub fn compiled(&self) -> &str {
        &self.compiled
    }

    /// Match a `/`-separated string
    pub fn matches_str(&self, candidate: &str) -> bool {
        let parts: Vec<&str> = candidate.split('/').collect();
        match_segments(&self.segments, &parts)
    }

    /// Match a canonical path
    pub fn matches_path(&self, path: &CanonicalPath) -> bool {
        match path.to_match_string() {
            Ok(text) => self.matches_str(&text),
            Err(_) => false,
        }
    }

    /// Match a canonical URL
    pub fn matches_url(&self, url: &CanonicalUrl) -> bool {
        let parts = url.match_segments();
        let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
        match_segments(&self.segments, &parts)
    }

    fn canonicalize_prefix(&mut self) {
        let prefix: Vec<&str> = self
            .segments
            .iter()
            .map_while(|s| match s {
                Segment::Literal(lit) => Some(lit.as_str()),
                _ => None,
            })
            .collect();
        let literal_len = prefix.len();
        if literal_len < 2 {
            return;
        }

        let prefix_path = PathBuf::from(prefix.join("/"));
        let canonical = canonicalize_lossy(&prefix_path);
        if canonical == prefix_path {
            return;
        }

        let Some(canonical_text) = canonical.to_str().map(normalize_separators) else {
            return;
        };
        let mut segments: Vec<Segment> = canonical_text
            .split('/')
            .map(|s| Segment::Literal(s.to_string()))
            .collect();
        segments.extend(self.segments.drain(literal_len..));
        self.segments = segments;
        self.compiled = render(&self.segments);
    }
}

impl fmt::Display for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// One-shot helper: does `pattern` match `candidate` (both `/`-separated)?
pub fn glob_match(pattern: &str, candidate: &str) -> ResolveResult<bool> {
    Ok(GlobPattern::new(pattern)?.matches_str(candidate))
}

fn render(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| match s {
            Segment::Literal(t) | Segment::Wildcard(t) => t.as_str(),
            Segment::AnyDepth => "**",
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Segment-level matching with `**` backtracking
fn match_segments(pattern: &[Segment], parts: &[&str]) -> bool {
    let (mut p, mut s) = (0, 0);
    let mut resume: Option<(usize, usize)> = None;

    while s < parts.len() {
        if p < pattern.len() {
            if pattern[p] == Segment::AnyDepth {
                resume = Some((p, s));
                p += 1;
                continue;
            }
            if pattern[p].matches(parts[s]) {
                p += 1;
                s += 1;
                continue;
            }
        }
        match resume {
            Some((star_p, star_s)) => {
                p = star_p + 1;
                s = star_s + 1;
                resume = Some((star_p, star_s + 1));
            }
            None => return false,
        }
    }

    pattern[p..].iter().all(|seg| *seg == Segment::AnyDepth)
}

/// Byte-level `*` matching inside one segment
fn wildcard_match(pattern: &[u8], text: &[u8]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut resume: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            resume = Some((p, t));
            p += 1;
        } else if p < pattern.len() && pattern[p] == text[t] {
            p += 1;
            t += 1;
        } else if let Some((star_p, star_t)) = resume {
            p = star_p + 1;
            t = star_t + 1;
            resume = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&b| b == b'*')
}
