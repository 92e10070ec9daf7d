/*!
 * Filesystem Rules
 */

use crate::permissions::config::FsConfig;
use crate::permissions::types::{Denial, FsAction, PermissionResult, RuleSet};
use crate::resolver::{CanonicalPath, GlobPattern, PathVariable, PathVariables, ResolveResult};

/// Compiled read and write lists
///
/// The two lists are independent: a write pattern never grants a read.
#[derive(Debug, Clone)]
pub(super) struct FsRules {
    read: Vec<GlobPattern>,
    write: Vec<GlobPattern>,
    /// Built from the path-variable roots rather than a declared section
    implicit: bool,
}

impl FsRules {
    pub(super) fn compile(config: Option<&FsConfig>, variables: &PathVariables) -> ResolveResult<Self> {
        let compile_list = |list: &[String]| {
            list.iter()
                .map(|p| GlobPattern::for_path(p, variables))
                .collect::<ResolveResult<Vec<_>>>()
        };

        let (read, write) = match config {
            Some(fs) => (compile_list(&fs.read)?, compile_list(&fs.write)?),
            None => (Vec::new(), Vec::new()),
        };

        Ok(Self {
            read,
            write,
            implicit: false,
        })
    }

    /// One `$VAR/**` rule per path variable, shared by read and write
    pub(super) fn implicit(variables: &PathVariables) -> ResolveResult<Self> {
        let roots = PathVariable::ALL
            .into_iter()
            .map(|v| GlobPattern::for_path(&format!("{}/**", v.token()), variables))
            .collect::<ResolveResult<Vec<_>>>()?;

        Ok(Self {
            read: roots.clone(),
            write: roots,
            implicit: true,
        })
    }

    pub(super) fn patterns(&self, action: FsAction) -> &[GlobPattern] {
        match action {
            FsAction::Read => &self.read,
            FsAction::Write => &self.write,
        }
    }

    pub(super) fn authorize(
        &self,
        action: FsAction,
        path: &CanonicalPath,
        target: &str,
    ) -> PermissionResult<()> {
        match path.to_match_string() {
            Ok(text) => self.authorize_str(action, &text, target),
            Err(e) => Err(Denial::unresolvable(target, &e)),
        }
    }

    /// Match an already normalized `/`-separated path
    pub(super) fn authorize_str(&self, action: FsAction, text: &str, target: &str) -> PermissionResult<()> {
        let patterns = self.patterns(action);
        if patterns.iter().any(|p| p.matches_str(text)) {
            return Ok(());
        }
        Err(Denial::new(
            RuleSet::for_fs(action),
            target,
            self.explain(action, text),
        ))
    }

    fn explain(&self, action: FsAction, text: &str) -> String {
        let rule_set = RuleSet::for_fs(action);
        if self.implicit {
            return format!(
                "{} is outside $APPDATA, $HOME, $TEMP and $RESOURCE; declare permissions.{} to reach it",
                text, rule_set
            );
        }
        let patterns = self.patterns(action);
        if patterns.is_empty() {
            format!(
                "no {} patterns are declared; add one matching {} to permissions.{}",
                rule_set, text, rule_set
            )
        } else {
            format!(
                "{} does not match any of the {} {} patterns; add a matching pattern to permissions.{}",
                text,
                patterns.len(),
                rule_set,
                rule_set
            )
        }
    }
}
