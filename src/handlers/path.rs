/*!
 * Path Handler
 * path.resolve: expose a path variable's directory
 */

use super::params::parse;
use crate::resolver::{PathVariable, PathVariables};
use crate::router::{HandlerError, HandlerResult, RouterBuilder, RouterResult};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct ResolveParams {
    variable: String,
}

#[derive(Clone)]
pub struct PathHandler {
    variables: PathVariables,
}

impl PathHandler {
    pub fn new(variables: PathVariables) -> Self {
        Self { variables }
    }

    pub fn register(self, builder: RouterBuilder) -> RouterResult<RouterBuilder> {
        builder.register_fn("path.resolve", move |_ctx, params| {
            let h = self.clone();
            async move { h.resolve(params) }
        })
    }

    pub fn resolve(&self, params: Value) -> HandlerResult {
        let ResolveParams { variable } = parse(params)?;
        let var = PathVariable::from_token(&variable).ok_or_else(|| {
            let known: Vec<&str> = PathVariable::ALL.iter().map(|v| v.token()).collect();
            HandlerError::invalid_params(format!(
                "unknown path variable {:?}; expected one of {}",
                variable,
                known.join(", ")
            ))
        })?;

        let dir = self.variables.resolve(var);
        dir.to_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| HandlerError::failed(format!("{} is not valid UTF-8", var)))
    }
}
