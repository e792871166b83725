//! SCIM filter expression parser and evaluator (RFC 7644 Section 3.4.2.2).
//!
//! The filter grammar is handled by an independently testable pair: a
//! recursive descent [`FilterParser`] producing a [`FilterExpr`] tree, and an
//! evaluator that applies the tree to a JSON resource document as a boolean
//! predicate.
//!
//! Evaluation rules:
//! - attribute paths are dotted (`name.givenName`) and matched
//!   case-insensitively;
//! - a comparison over a multi-valued attribute is true when any element
//!   matches;
//! - a comparison referencing an attribute absent from the resource is
//!   false, never an error;
//! - string comparison is case-insensitive unless the attribute path is in
//!   the caller's [`CaseExactPaths`], and ordering operators compare RFC 3339
//!   timestamps chronologically when both sides parse as such.

use crate::error::{ScimError, ScimResult};
use chrono::DateTime;
use serde_json::Value;
use std::cmp::Ordering;

/// SCIM filter comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equal
    Eq,
    /// Not equal
    Ne,
    /// Contains
    Co,
    /// Starts with
    Sw,
    /// Ends with
    Ew,
    /// Present (has a non-empty value)
    Pr,
    /// Greater than
    Gt,
    /// Greater than or equal
    Ge,
    /// Less than
    Lt,
    /// Less than or equal
    Le,
}

impl CompareOp {
    fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "eq" => Some(CompareOp::Eq),
            "ne" => Some(CompareOp::Ne),
            "co" => Some(CompareOp::Co),
            "sw" => Some(CompareOp::Sw),
            "ew" => Some(CompareOp::Ew),
            "pr" => Some(CompareOp::Pr),
            "gt" => Some(CompareOp::Gt),
            "ge" => Some(CompareOp::Ge),
            "lt" => Some(CompareOp::Lt),
            "le" => Some(CompareOp::Le),
            _ => None,
        }
    }
}

/// Attribute paths whose string comparisons are case-sensitive.
///
/// Built from a resource type's effective attribute set (see
/// [`ResourceType::case_exact_paths`](crate::schema::ResourceType::case_exact_paths))
/// so the evaluator can honour `caseExact` declarations without holding a
/// schema reference itself. Paths are matched case-insensitively, like every
/// attribute name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseExactPaths(Vec<String>);

impl CaseExactPaths {
    pub fn from_paths<I: IntoIterator<Item = String>>(paths: I) -> Self {
        Self(paths.into_iter().map(|p| p.to_lowercase()).collect())
    }

    pub fn contains(&self, path: &str) -> bool {
        let path = path.to_lowercase();
        self.0.iter().any(|p| *p == path)
    }
}

/// A parsed filter expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// Comparison expression: attribute op [value]
    Compare {
        attribute: String,
        op: CompareOp,
        value: Option<Value>,
    },
    /// Conjunction
    And(Box<FilterExpr>, Box<FilterExpr>),
    /// Disjunction
    Or(Box<FilterExpr>, Box<FilterExpr>),
    /// Negation
    Not(Box<FilterExpr>),
}

impl FilterExpr {
    /// Parse a filter string into an expression tree.
    pub fn parse(input: &str) -> ScimResult<Self> {
        FilterParser::new(input).parse()
    }

    /// Evaluate this filter against a resource document with every string
    /// comparison case-insensitive.
    pub fn matches(&self, resource: &Value) -> bool {
        self.matches_with(resource, &CaseExactPaths::default())
    }

    /// Evaluate this filter, comparing case-exactly for the attribute paths
    /// the schema declares `caseExact`.
    pub fn matches_with(&self, resource: &Value, case_exact: &CaseExactPaths) -> bool {
        match self {
            FilterExpr::Compare {
                attribute,
                op,
                value,
            } => {
                let candidates = lookup_path(resource, attribute);
                let exact = case_exact.contains(attribute);
                match op {
                    CompareOp::Pr => candidates.iter().any(|v| is_present(v)),
                    _ => candidates
                        .iter()
                        .any(|actual| compare(*op, actual, value.as_ref(), exact)),
                }
            }
            FilterExpr::And(left, right) => {
                left.matches_with(resource, case_exact) && right.matches_with(resource, case_exact)
            }
            FilterExpr::Or(left, right) => {
                left.matches_with(resource, case_exact) || right.matches_with(resource, case_exact)
            }
            FilterExpr::Not(inner) => !inner.matches_with(resource, case_exact),
        }
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        _ => true,
    }
}

/// Resolve a dotted attribute path to candidate leaf values.
///
/// Arrays along the path fan out, so `emails.value` yields the `value` of
/// every element of `emails`. An unresolvable path yields no candidates.
fn lookup_path<'v>(resource: &'v Value, path: &str) -> Vec<&'v Value> {
    let mut current = vec![resource];
    for segment in path.split('.') {
        let mut next = Vec::new();
        for value in current {
            match value {
                Value::Object(map) => {
                    if let Some((_, v)) = map.iter().find(|(k, _)| k.eq_ignore_ascii_case(segment))
                    {
                        next.push(v);
                    }
                }
                Value::Array(items) => {
                    for item in items {
                        if let Value::Object(map) = item {
                            if let Some((_, v)) =
                                map.iter().find(|(k, _)| k.eq_ignore_ascii_case(segment))
                            {
                                next.push(v);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        current = next;
        if current.is_empty() {
            return current;
        }
    }
    // Fan out one more time so "emails pr" and "members.value eq x" both see
    // individual elements.
    let mut leaves = Vec::new();
    for value in current {
        match value {
            Value::Array(items) if !items.is_empty() => leaves.extend(items.iter()),
            other => leaves.push(other),
        }
    }
    leaves
}

fn compare(op: CompareOp, actual: &Value, operand: Option<&Value>, exact: bool) -> bool {
    let Some(operand) = operand else {
        return false;
    };
    match op {
        CompareOp::Eq => values_equal(actual, operand, exact),
        CompareOp::Ne => !values_equal(actual, operand, exact),
        CompareOp::Co => with_strings(actual, operand, exact, |a, b| a.contains(b)),
        CompareOp::Sw => with_strings(actual, operand, exact, |a, b| a.starts_with(b)),
        CompareOp::Ew => with_strings(actual, operand, exact, |a, b| a.ends_with(b)),
        CompareOp::Gt => matches!(order(actual, operand, exact), Some(Ordering::Greater)),
        CompareOp::Ge => matches!(
            order(actual, operand, exact),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        CompareOp::Lt => matches!(order(actual, operand, exact), Some(Ordering::Less)),
        CompareOp::Le => matches!(
            order(actual, operand, exact),
            Some(Ordering::Less | Ordering::Equal)
        ),
        CompareOp::Pr => is_present(actual),
    }
}

fn values_equal(a: &Value, b: &Value, exact: bool) -> bool {
    match (a, b) {
        (Value::String(a), Value::String(b)) => {
            if exact {
                a == b
            } else {
                a.eq_ignore_ascii_case(b)
            }
        }
        (Value::Number(a), Value::Number(b)) => {
            a.as_f64().zip(b.as_f64()).is_some_and(|(a, b)| a == b)
        }
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Null, Value::Null) => true,
        _ => false,
    }
}

fn with_strings(a: &Value, b: &Value, exact: bool, test: impl Fn(&str, &str) -> bool) -> bool {
    match (a, b) {
        (Value::String(a), Value::String(b)) => {
            if exact {
                test(a, b)
            } else {
                test(&a.to_lowercase(), &b.to_lowercase())
            }
        }
        _ => false,
    }
}

/// Type-aware ordering for `gt`/`ge`/`lt`/`le`.
fn order(a: &Value, b: &Value, exact: bool) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => {
            match (
                DateTime::parse_from_rfc3339(a),
                DateTime::parse_from_rfc3339(b),
            ) {
                (Ok(a), Ok(b)) => Some(a.cmp(&b)),
                _ if exact => Some(a.cmp(b)),
                _ => Some(a.to_lowercase().cmp(&b.to_lowercase())),
            }
        }
        _ => None,
    }
}

/// Recursive descent parser over the filter grammar.
pub struct FilterParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> FilterParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Parse the complete input as a single filter expression.
    pub fn parse(&mut self) -> ScimResult<FilterExpr> {
        self.skip_whitespace();
        if self.pos >= self.input.len() {
            return Err(ScimError::InvalidFilter("empty filter".to_string()));
        }
        let expr = self.parse_or()?;
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(ScimError::InvalidFilter(format!(
                "unexpected characters at position {}: '{}'",
                self.pos,
                &self.input[self.pos..]
            )));
        }
        Ok(expr)
    }

    fn parse_or(&mut self) -> ScimResult<FilterExpr> {
        let mut left = self.parse_and()?;
        loop {
            self.skip_whitespace();
            if self.try_consume_keyword("or") {
                self.skip_whitespace();
                let right = self.parse_and()?;
                left = FilterExpr::Or(Box::new(left), Box::new(right));
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ScimResult<FilterExpr> {
        let mut left = self.parse_unary()?;
        loop {
            self.skip_whitespace();
            if self.try_consume_keyword("and") {
                self.skip_whitespace();
                let right = self.parse_unary()?;
                left = FilterExpr::And(Box::new(left), Box::new(right));
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ScimResult<FilterExpr> {
        self.skip_whitespace();
        if self.try_consume_keyword("not") {
            self.skip_whitespace();
            if !self.try_consume_char('(') {
                return Err(ScimError::InvalidFilter(
                    "expected '(' after 'not'".to_string(),
                ));
            }
            let expr = self.parse_or()?;
            self.skip_whitespace();
            if !self.try_consume_char(')') {
                return Err(ScimError::InvalidFilter(
                    "expected ')' to close 'not' expression".to_string(),
                ));
            }
            return Ok(FilterExpr::Not(Box::new(expr)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ScimResult<FilterExpr> {
        self.skip_whitespace();
        if self.try_consume_char('(') {
            let expr = self.parse_or()?;
            self.skip_whitespace();
            if !self.try_consume_char(')') {
                return Err(ScimError::InvalidFilter(
                    "expected ')' to close grouped expression".to_string(),
                ));
            }
            return Ok(expr);
        }
        self.parse_attr_expr()
    }

    fn parse_attr_expr(&mut self) -> ScimResult<FilterExpr> {
        let attribute = self.parse_attribute()?;
        self.skip_whitespace();

        let op_str = self.parse_operator()?;
        let op = CompareOp::from_str(&op_str)
            .ok_or_else(|| ScimError::InvalidFilter(format!("unknown operator: {op_str}")))?;

        // 'pr' takes no value
        if op == CompareOp::Pr {
            return Ok(FilterExpr::Compare {
                attribute,
                op,
                value: None,
            });
        }

        self.skip_whitespace();
        let value = self.parse_value()?;
        Ok(FilterExpr::Compare {
            attribute,
            op,
            value: Some(value),
        })
    }

    fn parse_attribute(&mut self) -> ScimResult<String> {
        let start = self.pos;
        while self.pos < self.input.len() {
            let c = self.current_char();
            if c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | '$') {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(ScimError::InvalidFilter(
                "expected attribute name".to_string(),
            ));
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_operator(&mut self) -> ScimResult<String> {
        let start = self.pos;
        while self.pos < self.input.len() {
            let c = self.current_char();
            if c.is_alphabetic() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(ScimError::InvalidFilter("expected operator".to_string()));
        }
        Ok(self.input[start..self.pos].to_lowercase())
    }

    fn parse_value(&mut self) -> ScimResult<Value> {
        self.skip_whitespace();

        if self.try_consume_char('"') {
            let mut value = String::new();
            loop {
                if self.pos >= self.input.len() {
                    return Err(ScimError::InvalidFilter("unterminated string".to_string()));
                }
                let c = self.current_char();
                self.pos += c.len_utf8();
                match c {
                    '"' => break,
                    '\\' => {
                        if self.pos >= self.input.len() {
                            return Err(ScimError::InvalidFilter(
                                "unterminated escape sequence".to_string(),
                            ));
                        }
                        let escaped = self.current_char();
                        self.pos += escaped.len_utf8();
                        match escaped {
                            'n' => value.push('\n'),
                            't' => value.push('\t'),
                            other => value.push(other),
                        }
                    }
                    other => value.push(other),
                }
            }
            return Ok(Value::String(value));
        }

        // Unquoted token: boolean, null or number
        let start = self.pos;
        while self.pos < self.input.len() {
            let c = self.current_char();
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '+') {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(ScimError::InvalidFilter("expected value".to_string()));
        }
        let token = &self.input[start..self.pos];
        match token {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" => Ok(Value::Null),
            _ => serde_json::from_str::<serde_json::Number>(token)
                .map(Value::Number)
                .map_err(|_| ScimError::InvalidFilter(format!("invalid literal: {token}"))),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && self.current_char().is_whitespace() {
            self.pos += self.current_char().len_utf8();
        }
    }

    fn current_char(&self) -> char {
        self.input[self.pos..].chars().next().unwrap_or('\0')
    }

    fn try_consume_char(&mut self, c: char) -> bool {
        if self.pos < self.input.len() && self.current_char() == c {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn try_consume_keyword(&mut self, keyword: &str) -> bool {
        let remaining = &self.input[self.pos..];
        // `get` returns None on a non-char-boundary, so multibyte input is
        // treated as "keyword not present" instead of slicing mid-character.
        let Some(prefix) = remaining.get(..keyword.len()) else {
            return false;
        };
        if prefix.eq_ignore_ascii_case(keyword) {
            let after = self.pos + keyword.len();
            let next = self.input[after..].chars().next();
            if next.is_none_or(|c| !c.is_alphanumeric()) {
                self.pos = after;
                return true;
            }
        }
        false
    }
}
