//! Structural and complexity metrics of a workbook.
//!
//! Seven independent queries run against the parsed tree:
//!
//! | field | rule |
//! |---|---|
//! | `custom_sql` | any `relation` element named exactly `Custom SQL Query` |
//! | `dashboards` | `dashboard` elements at any depth |
//! | `datasources` | top-level data sources that carry a `caption` |
//! | `views` | `worksheet` elements at any depth, hidden ones included |
//! | `max_calc_len` | most lines in any `calculation/@formula` |
//! | `max_field_count` | most direct `column` children of a captioned top-level data source |
//! | `max_quick_filter_count` | most `zone[@type='filter']` under a dashboard's `zones` |
//!
//! Missing elements never fail; they leave the field at zero (or `false`).

use serde::{Deserialize, Serialize};

use crate::document::{Element, WorkbookDocument};

/// `name` of the relation Tableau writes for a custom SQL query.
pub const CUSTOM_SQL_RELATION: &str = "Custom SQL Query";

/// Metrics extracted from one workbook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// Whether any data source relation is a custom SQL query
    pub custom_sql: bool,
    /// Number of dashboards
    pub dashboards: usize,
    /// Number of top-level data sources with a caption
    pub datasources: usize,
    /// Number of worksheets, including hidden ones
    pub views: usize,
    /// Maximum number of lines in any calculated field formula
    pub max_calc_len: usize,
    /// Maximum number of columns in any captioned top-level data source
    pub max_field_count: usize,
    /// Maximum number of quick filters on any dashboard
    pub max_quick_filter_count: usize,
}

/// Extract the metrics record from a parsed workbook.
///
/// Pure: the same document always yields the same record.
pub fn extract(doc: &WorkbookDocument) -> MetricsRecord {
    let root = doc.root();

    let record = MetricsRecord {
        custom_sql: has_custom_sql(root),
        dashboards: root.descendants_named("dashboard").count(),
        datasources: count_captioned_datasources(doc),
        views: root.descendants_named("worksheet").count(),
        max_calc_len: max_calc_len(root),
        max_field_count: max_field_count(doc),
        max_quick_filter_count: max_quick_filter_count(root),
    };

    log::debug!("extracted metrics: {:?}", record);
    record
}

/// Exact, case-sensitive match on the relation name.
pub fn has_custom_sql(root: &Element) -> bool {
    root.descendants_named("relation")
        .any(|relation| relation.attribute_equals("name", CUSTOM_SQL_RELATION))
}

/// Top-level data sources that carry a `caption` attribute.
///
/// Uncaptioned entries, such as the `Parameters` pseudo data source, are
/// skipped.
pub fn captioned_datasources(doc: &WorkbookDocument) -> impl Iterator<Item = &Element> {
    doc.top_level_datasources()
        .filter(|datasource| datasource.has_attribute("caption"))
}

/// Top-level data sources without a `caption` attribute are not counted.
pub fn count_captioned_datasources(doc: &WorkbookDocument) -> usize {
    captioned_datasources(doc).count()
}

/// Longest calculated field, in lines.
pub fn max_calc_len(root: &Element) -> usize {
    root.descendants_named("calculation")
        .filter_map(|calculation| calculation.attribute("formula"))
        .map(formula_line_count)
        .max()
        .unwrap_or(0)
}

/// Number of lines in a formula: one more than its newline count.
#[inline]
pub fn formula_line_count(formula: &str) -> usize {
    1 + memchr::memchr_iter(b'\n', formula.as_bytes()).count()
}

/// Widest captioned top-level data source, in direct `column` children.
pub fn max_field_count(doc: &WorkbookDocument) -> usize {
    captioned_datasources(doc)
        .map(|datasource| datasource.children_named("column").count())
        .max()
        .unwrap_or(0)
}

/// Most quick filters placed on a single dashboard.
pub fn max_quick_filter_count(root: &Element) -> usize {
    root.descendants_named("dashboard")
        .map(quick_filter_count)
        .max()
        .unwrap_or(0)
}

/// Filter zones anywhere below the dashboard's direct `zones` children.
pub fn quick_filter_count(dashboard: &Element) -> usize {
    dashboard
        .children_named("zones")
        .flat_map(|zones| zones.descendants_named("zone"))
        .filter(|zone| zone.attribute_equals("type", "filter"))
        .count()
}
