/// Summary statistics over daily gage-height history.
///
/// The median is the baseline every station's risk is measured against, so
/// it has to behave on the degenerate inputs an upstream outage produces:
/// an empty history yields `None`, never zero.

use crate::model::HistoryPoint;

/// Median of a set of values. Even-length input averages the two middle
/// values. NaN entries are ignored.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Median gage height over a station's history window.
pub fn history_median(history: &[HistoryPoint]) -> Option<f64> {
    let values: Vec<f64> = history.iter().map(|p| p.value).collect();
    median(&values)
}
