//! Rule matching logic.
//!
//! # Responsibilities
//! - Match request method (exact, only when the rule restricts it)
//! - Match request path against the rule's glob pattern (case-sensitive)
//! - Combine both conditions with AND semantics
//!
//! # Design Decisions
//! - The rule list is already specificity-sorted; first match wins
//! - No match is returned explicitly; a catch-all rule is the caller's job
//! - No regex to keep matching linear in the number of segments for non-`**` patterns

use std::sync::Arc;

use axum::http::Method;

use crate::routing::pattern::PathVars;
use crate::routing::rule::Rule;

/// A matched rule together with the variables its pattern captured.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub rule: Arc<Rule>,
    pub path_vars: PathVars,
}

/// Find the first rule in `rules` accepting `method` and `path`.
pub fn match_rule(method: &Method, path: &str, rules: &[Arc<Rule>]) -> Option<RouteMatch> {
    rules.iter().find_map(|rule| {
        rule.matches(method, path).map(|path_vars| RouteMatch {
            rule: rule.clone(),
            path_vars,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::table::RuleTableBuilder;

    #[test]
    fn test_literal_beats_earlier_catch_all() {
        let mut builder = RuleTableBuilder::new();
        builder.add("/**").forward("/all");
        builder.add("/a/*").forward("/star");
        builder.add("/a/b").forward("/literal");
        let table = builder.build().unwrap();

        let hit = match_rule(&Method::GET, "/a/b", table.rules()).unwrap();
        assert_eq!(hit.rule.pattern().as_str(), "/a/b");

        let hit = match_rule(&Method::GET, "/a/c", table.rules()).unwrap();
        assert_eq!(hit.rule.pattern().as_str(), "/a/*");

        let hit = match_rule(&Method::GET, "/z", table.rules()).unwrap();
        assert_eq!(hit.rule.pattern().as_str(), "/**");
    }

    #[test]
    fn test_method_restriction_falls_through() {
        let mut builder = RuleTableBuilder::new();
        builder.add_with_method(Method::DELETE, "/restapi").rest();
        builder.add("/**/*").forward_with_status("/notfound", 404);
        let table = builder.build().unwrap();

        let hit = match_rule(&Method::DELETE, "/restapi", table.rules()).unwrap();
        assert_eq!(hit.rule.method(), Some(&Method::DELETE));

        let hit = match_rule(&Method::GET, "/restapi", table.rules()).unwrap();
        assert_eq!(hit.rule.pattern().as_str(), "/**/*");
    }

    #[test]
    fn test_no_match_without_catch_all() {
        let mut builder = RuleTableBuilder::new();
        builder.add("/index").forward("/index.html");
        let table = builder.build().unwrap();
        assert!(match_rule(&Method::GET, "/missing", table.rules()).is_none());
    }
}
