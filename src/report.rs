// Trend report presentation
// Orders open-complaint counts so the busiest categories come first

use std::collections::HashMap;

use crate::state::IssueCategory;

/// Categories with more open complaints than this are flagged
pub const HOTSPOT_THRESHOLD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendRow {
    pub category: IssueCategory,
    pub count: usize,
    pub hotspot: bool,
}

/// Sort a trend report by descending count, ties in category order
pub fn rank(trend: &HashMap<IssueCategory, usize>) -> Vec<TrendRow> {
    let mut rows: Vec<TrendRow> = trend
        .iter()
        .map(|(&category, &count)| TrendRow {
            category,
            count,
            hotspot: count > HOTSPOT_THRESHOLD,
        })
        .collect();

    rows.sort_by(|a, b| b.count.cmp(&a.count).then(a.category.cmp(&b.category)));
    rows
}
