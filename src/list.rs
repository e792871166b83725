//! Listing pipeline shared by every resource type.
//!
//! Handlers produce a candidate set in stable insertion order and hand it to
//! [`apply`], which runs the fixed pipeline: filter, then sort, then
//! paginate. The endpoint layer wraps the result in the standard
//! [`ListResponse`] envelope.

use crate::error::ScimResult;
use crate::filter::{CaseExactPaths, FilterExpr};
use chrono::DateTime;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

/// URN identifying the list response envelope.
pub const LIST_RESPONSE_URN: &str = "urn:ietf:params:scim:api:messages:2.0:ListResponse";

/// Sort direction for list requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Parse the wire value, defaulting to ascending for anything else.
    pub fn from_wire(value: &str) -> Self {
        if value.eq_ignore_ascii_case("descending") {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }
}

/// Parameters of a list request.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    /// 1-based index of the first result. Values below 1 are clamped to 1.
    pub start_index: Option<i64>,
    /// Maximum number of resources in the page. Zero returns no resources
    /// while still reporting the total.
    pub count: Option<i64>,
    /// Filter expression applied before sorting and pagination.
    pub filter: Option<String>,
    /// Dotted attribute path to sort by.
    pub sort_by: Option<String>,
    /// Sort direction, meaningful only with `sort_by`.
    pub sort_order: SortOrder,
    /// Attribute paths whose string comparisons are case-sensitive. The
    /// endpoint layer fills this from the resource type descriptor before
    /// dispatching to the handler.
    pub case_exact: CaseExactPaths,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start_index(mut self, start_index: i64) -> Self {
        self.start_index = Some(start_index);
        self
    }

    pub fn with_count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_sort(mut self, sort_by: impl Into<String>, sort_order: SortOrder) -> Self {
        self.sort_by = Some(sort_by.into());
        self.sort_order = sort_order;
        self
    }

    pub fn with_case_exact(mut self, case_exact: CaseExactPaths) -> Self {
        self.case_exact = case_exact;
        self
    }
}

/// A handler's list result before envelope assembly.
///
/// `total_results` counts everything that matched the filter, not just the
/// page that was returned.
#[derive(Debug, Clone, Default)]
pub struct PartialListResponse {
    pub resources: Vec<Value>,
    pub total_results: i64,
}

/// Run the list pipeline over a candidate set.
///
/// The order is fixed: the filter narrows the candidates, the narrowed set is
/// sorted, and pagination windows the sorted set. `total_results` is the
/// post-filter count, so a page past the end still reports how many matched.
pub fn apply(candidates: Vec<Value>, params: &ListParams) -> ScimResult<PartialListResponse> {
    let mut matched = match &params.filter {
        Some(filter) => {
            let expr = FilterExpr::parse(filter)?;
            candidates
                .into_iter()
                .filter(|doc| expr.matches_with(doc, &params.case_exact))
                .collect()
        }
        None => candidates,
    };

    if let Some(sort_by) = &params.sort_by {
        sort_resources(&mut matched, sort_by, params.sort_order);
    }

    let total_results = matched.len() as i64;

    let start_index = params.start_index.unwrap_or(1).max(1);
    let skip = (start_index - 1) as usize;
    let resources = match params.count {
        Some(count) if count <= 0 => Vec::new(),
        Some(count) => matched.into_iter().skip(skip).take(count as usize).collect(),
        None => matched.into_iter().skip(skip).collect(),
    };

    Ok(PartialListResponse {
        resources,
        total_results,
    })
}

/// Stable sort by a dotted attribute path.
///
/// Resources missing the sort attribute collect at the end for ascending
/// order and at the beginning for descending, and ties keep their relative
/// candidate order.
fn sort_resources(resources: &mut [Value], sort_by: &str, order: SortOrder) {
    resources.sort_by(|a, b| {
        let ka = sort_key(a, sort_by);
        let kb = sort_key(b, sort_by);
        let cmp = match (ka, kb) {
            (Some(a), Some(b)) => compare_keys(a, b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
}

/// Resolve the sort key for one resource. Multi-valued attributes sort by
/// their first element.
fn sort_key<'v>(resource: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = resource;
    for segment in path.split('.') {
        let map = current.as_object()?;
        current = map
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(segment))
            .map(|(_, v)| v)?;
    }
    match current {
        Value::Null => None,
        Value::Array(items) => items.first().filter(|v| !v.is_null()),
        other => Some(other),
    }
}

fn compare_keys(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .zip(b.as_f64())
            .and_then(|(a, b)| a.partial_cmp(&b))
            .unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => {
            match (
                DateTime::parse_from_rfc3339(a),
                DateTime::parse_from_rfc3339(b),
            ) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => a.to_lowercase().cmp(&b.to_lowercase()),
            }
        }
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

/// The list response envelope returned from every list operation.
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    pub schemas: Vec<String>,
    #[serde(rename = "totalResults")]
    pub total_results: i64,
    #[serde(rename = "startIndex")]
    pub start_index: i64,
    #[serde(rename = "itemsPerPage")]
    pub items_per_page: i64,
    #[serde(rename = "Resources")]
    pub resources: Vec<Value>,
}

impl ListResponse {
    /// Assemble the envelope from a handler's partial result and the request
    /// parameters it answered.
    pub fn from_partial(partial: PartialListResponse, params: &ListParams) -> Self {
        let items_per_page = partial.resources.len() as i64;
        Self {
            schemas: vec![LIST_RESPONSE_URN.to_string()],
            total_results: partial.total_results,
            start_index: params.start_index.unwrap_or(1).max(1),
            items_per_page,
            resources: partial.resources,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users() -> Vec<Value> {
        vec![
            json!({"id": "1", "userName": "carol", "loginCount": 5}),
            json!({"id": "2", "userName": "alice", "loginCount": 9}),
            json!({"id": "3", "userName": "bob"}),
            json!({"id": "4", "userName": "dave", "loginCount": 2}),
        ]
    }

    fn names(partial: &PartialListResponse) -> Vec<&str> {
        partial
            .resources
            .iter()
            .map(|r| r["userName"].as_str().unwrap())
            .collect()
    }

    #[test]
    fn filter_runs_before_pagination() {
        let params = ListParams::new()
            .with_filter(r#"loginCount pr"#)
            .with_start_index(2)
            .with_count(10);
        let result = apply(users(), &params).unwrap();
        assert_eq!(result.total_results, 3);
        assert_eq!(names(&result), vec!["alice", "dave"]);
    }

    #[test]
    fn case_exact_paths_narrow_the_filter() {
        let relaxed = ListParams::new().with_filter(r#"userName eq "Carol""#);
        let result = apply(users(), &relaxed).unwrap();
        assert_eq!(result.total_results, 1);

        let strict = relaxed
            .clone()
            .with_case_exact(CaseExactPaths::from_paths(vec!["userName".to_string()]));
        let result = apply(users(), &strict).unwrap();
        assert_eq!(result.total_results, 0);

        let strict = strict.with_filter(r#"userName eq "carol""#);
        let result = apply(users(), &strict).unwrap();
        assert_eq!(result.total_results, 1);
    }

    #[test]
    fn count_zero_is_a_total_probe() {
        let params = ListParams::new().with_count(0);
        let result = apply(users(), &params).unwrap();
        assert_eq!(result.total_results, 4);
        assert!(result.resources.is_empty());
    }

    #[test]
    fn start_index_below_one_clamps_to_one() {
        let params = ListParams::new().with_start_index(-3).with_count(2);
        let result = apply(users(), &params).unwrap();
        assert_eq!(names(&result), vec!["carol", "alice"]);
    }

    #[test]
    fn page_past_the_end_is_empty_with_total_intact() {
        let params = ListParams::new().with_start_index(100).with_count(10);
        let result = apply(users(), &params).unwrap();
        assert_eq!(result.total_results, 4);
        assert!(result.resources.is_empty());
    }

    #[test]
    fn ascending_sort_places_missing_values_last() {
        let params = ListParams::new().with_sort("loginCount", SortOrder::Ascending);
        let result = apply(users(), &params).unwrap();
        assert_eq!(names(&result), vec!["dave", "carol", "alice", "bob"]);
    }

    #[test]
    fn descending_sort_places_missing_values_first() {
        let params = ListParams::new().with_sort("loginCount", SortOrder::Descending);
        let result = apply(users(), &params).unwrap();
        assert_eq!(names(&result), vec!["bob", "alice", "carol", "dave"]);
    }

    #[test]
    fn no_params_returns_everything_in_candidate_order() {
        let result = apply(users(), &ListParams::new()).unwrap();
        assert_eq!(result.total_results, 4);
        assert_eq!(names(&result), vec!["carol", "alice", "bob", "dave"]);
    }

    #[test]
    fn sort_order_parses_its_wire_values() {
        assert_eq!(SortOrder::from_wire("descending"), SortOrder::Descending);
        assert_eq!(SortOrder::from_wire("DESCENDING"), SortOrder::Descending);
        assert_eq!(SortOrder::from_wire("ascending"), SortOrder::Ascending);
        assert_eq!(SortOrder::from_wire("anything else"), SortOrder::Ascending);
    }

    #[test]
    fn envelope_reports_the_served_page() {
        let params = ListParams::new().with_start_index(2).with_count(2);
        let partial = apply(users(), &params).unwrap();
        let response = ListResponse::from_partial(partial, &params);
        assert_eq!(response.schemas, vec![LIST_RESPONSE_URN.to_string()]);
        assert_eq!(response.total_results, 4);
        assert_eq!(response.start_index, 2);
        assert_eq!(response.items_per_page, 2);
    }
}
