/*!
 * Network Rules
 * Deny patterns are consulted first and always win
 */

use crate::permissions::config::HttpConfig;
use crate::permissions::types::{Denial, PermissionResult, RuleSet};
use crate::resolver::{CanonicalUrl, GlobPattern, ResolveResult};

#[derive(Debug, Clone, Default)]
pub(super) struct NetRules {
    allow: Vec<GlobPattern>,
    deny: Vec<GlobPattern>,
}

impl NetRules {
    pub(super) fn compile(config: Option<&HttpConfig>) -> ResolveResult<Self> {
        let Some(config) = config else {
            return Ok(Self::default());
        };
        let compile_list = |list: &[String]| {
            list.iter()
                .map(|p| GlobPattern::for_url(p))
                .collect::<ResolveResult<Vec<_>>>()
        };

        Ok(Self {
            allow: compile_list(&config.allow)?,
            deny: compile_list(&config.deny)?,
        })
    }

    pub(super) fn check(&self, url: &CanonicalUrl) -> PermissionResult<()> {
        // First pass: deny rules
        if let Some(pattern) = self.deny.iter().find(|p| p.matches_url(url)) {
            return Err(Denial::new(
                RuleSet::HttpDeny,
                url.to_string(),
                format!(
                    "{} matches deny pattern `{}`; deny rules take precedence over permissions.http.allow",
                    url, pattern
                ),
            ));
        }

        // Second pass: allow rules
        if self.allow.iter().any(|p| p.matches_url(url)) {
            return Ok(());
        }

        let reason = if self.allow.is_empty() {
            format!(
                "no http.allow patterns are declared; add one matching {} to permissions.http.allow",
                url
            )
        } else {
            format!(
                "{} does not match any permissions.http.allow pattern; add a matching pattern",
                url
            )
        };
        Err(Denial::new(RuleSet::HttpAllow, url.to_string(), reason))
    }
}
