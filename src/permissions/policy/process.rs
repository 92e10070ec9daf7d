/*!
 * Process Execution Rules
 */

use crate::permissions::config::ProcessConfig;
use crate::permissions::types::{Denial, PermissionResult, RuleSet};
use crate::resolver::{ResolveError, ResolveResult};

#[derive(Debug, Clone, PartialEq, Eq)]
enum ArgFilter {
    /// No list, or a lone `*`
    Any,
    /// The first argument must be one of these
    FirstOf(Vec<String>),
}

#[derive(Debug, Clone)]
struct ExecRule {
    cmd: String,
    args: ArgFilter,
}

#[derive(Debug, Clone, Default)]
pub(super) struct ExecRules {
    rules: Vec<ExecRule>,
}

impl ExecRules {
    pub(super) fn compile(config: Option<&ProcessConfig>) -> ResolveResult<Self> {
        let Some(config) = config else {
            return Ok(Self::default());
        };

        let rules = config
            .exec
            .iter()
            .map(|rule| {
                if rule.cmd.trim().is_empty() {
                    return Err(ResolveError::invalid_pattern(&rule.cmd, "empty command name"));
                }
                let args = match rule.args.as_deref() {
                    None => ArgFilter::Any,
                    Some([only]) if only == "*" => ArgFilter::Any,
                    Some(list) => ArgFilter::FirstOf(list.to_vec()),
                };
                Ok(ExecRule {
                    cmd: rule.cmd.clone(),
                    args,
                })
            })
            .collect::<ResolveResult<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// Allow iff some rule for `command` admits `args`
    pub(super) fn check(&self, command: &str, args: &[String]) -> PermissionResult<()> {
        let mut candidates = self.rules.iter().filter(|r| r.cmd == command).peekable();
        if candidates.peek().is_none() {
            return Err(Denial::new(
                RuleSet::ProcessExec,
                command,
                format!(
                    "command `{}` is not declared; add {{\"cmd\": \"{}\"}} to permissions.process.exec",
                    command, command
                ),
            ));
        }

        let mut allowed_first: Vec<&str> = Vec::new();
        for rule in candidates {
            match &rule.args {
                ArgFilter::Any => return Ok(()),
                ArgFilter::FirstOf(list) => {
                    if let Some(first) = args.first() {
                        if list.iter().any(|a| a == first) {
                            return Ok(());
                        }
                    }
                    allowed_first.extend(list.iter().map(String::as_str));
                }
            }
        }

        let reason = match args.first() {
            Some(first) => format!(
                "first argument `{}` is not allowed for `{}`; permissions.process.exec allows [{}]",
                first,
                command,
                allowed_first.join(", ")
            ),
            None => format!(
                "`{}` requires a first argument from [{}] in permissions.process.exec",
                command,
                allowed_first.join(", ")
            ),
        };
        Err(Denial::new(RuleSet::ProcessExec, command, reason))
    }
}
