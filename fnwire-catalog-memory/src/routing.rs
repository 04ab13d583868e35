use crate::catalog::MemoryCatalog;
use async_trait::async_trait;
use fnwire_core::catalog::{constituents, FunctionCatalog, ROUTING_FUNCTION_NAME};
use fnwire_core::error::HandlerError;
use fnwire_core::handler::{FunctionHandler, Message};
use fnwire_core::shape::{Msg, TypeShape};

/// Header naming the target function when no routing expression is set.
pub const ROUTE_HEADER: &str = "function.definition";

/// Where the routing handler reads the target definition from.
///
/// Accepted forms: `headers['name']`, `headers.name`, or a bare header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingExpression {
    header: String,
}

impl RoutingExpression {
    /// Parse an expression into the header it reads.
    pub fn parse(expression: &str) -> Self {
        let expr = expression.trim();
        let header = expr
            .strip_prefix("headers[")
            .and_then(|rest| rest.strip_suffix(']'))
            .map(|quoted| quoted.trim_matches(|c: char| c == '\'' || c == '"'))
            .or_else(|| expr.strip_prefix("headers."))
            .unwrap_or(expr);
        Self {
            header: header.to_owned(),
        }
    }

    /// Header name holding the target definition.
    pub fn header(&self) -> &str {
        &self.header
    }
}

impl Default for RoutingExpression {
    fn default() -> Self {
        Self {
            header: ROUTE_HEADER.to_owned(),
        }
    }
}

/// The reserved routing handler: forwards each message to the function
/// named by a header.
pub struct RoutingHandler {
    catalog: MemoryCatalog,
    expression: RoutingExpression,
    shape: TypeShape,
}

impl RoutingHandler {
    /// Route through `catalog` using `expression`.
    pub fn new(catalog: MemoryCatalog, expression: RoutingExpression) -> Self {
        Self {
            catalog,
            expression,
            shape: TypeShape::of_function::<Msg<serde_json::Value>, Msg<serde_json::Value>>(),
        }
    }
}

#[async_trait]
impl FunctionHandler for RoutingHandler {
    fn shape(&self) -> &TypeShape {
        &self.shape
    }

    async fn apply(&self, input: Option<Message>) -> Result<Option<Message>, HandlerError> {
        let message = input.ok_or_else(|| HandlerError::InvalidInput {
            handler: ROUTING_FUNCTION_NAME.into(),
            message: "an input message is required".into(),
        })?;
        let target = message
            .header(self.expression.header())
            .map(str::to_owned)
            .ok_or_else(|| {
                HandlerError::RouteNotFound(format!("header {} not set", self.expression.header()))
            })?;
        let invocation = self
            .catalog
            .lookup(&target)
            .ok_or_else(|| HandlerError::RouteNotFound(target.clone()))?;
        // Aliases resolve to their target's definition, so this also catches
        // an alias of the router or a composition containing it.
        if constituents(invocation.function_definition()).contains(&ROUTING_FUNCTION_NAME) {
            return Err(HandlerError::RouteNotFound(format!(
                "{target}: the router cannot route to itself"
            )));
        }
        tracing::debug!(target = %target, "routing message");
        invocation.apply(Some(message)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_expression_forms() {
        assert_eq!(RoutingExpression::parse("headers['route']").header(), "route");
        assert_eq!(RoutingExpression::parse("headers[\"route\"]").header(), "route");
        assert_eq!(RoutingExpression::parse("headers.route").header(), "route");
        assert_eq!(RoutingExpression::parse(" route ").header(), "route");
        assert_eq!(RoutingExpression::default().header(), ROUTE_HEADER);
    }
}
