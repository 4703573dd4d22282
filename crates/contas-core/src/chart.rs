//! Monthly chart preparation with a deterministic degraded fallback.
//!
//! The primary renderer is a pluggable strategy that may fail (missing GPU
//! surface, library panic caught at the boundary, unsupported device). A
//! failure is logged and converted into the data-only fallback; it never
//! reaches the caller as an error.

use thiserror::Error;
use tracing::warn;

use crate::{format::CurrencyFormatter, summary::MonthlyBucket};

/// How many of the most recent monthly buckets the chart shows.
pub const CHART_MONTHS: usize = 6;

/// Widest fallback bar, in percent of the available width. The remainder
/// is kept free for labels.
pub const FALLBACK_MAX_WIDTH: f64 = 80.0;

/// Geometry handed to the primary renderer: two adjacent bars per month,
/// heights scaled to a shared maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub months: Vec<MonthBars>,
    /// The shared scale: the largest income or expense across the shown
    /// months, floored at 1 so all-zero data stays renderable.
    pub scale_max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthBars {
    pub month: String,
    pub income: f64,
    pub expense: f64,
    /// Fraction of the shared chart height, in `0.0..=1.0`.
    pub income_height: f64,
    pub expense_height: f64,
}

impl ChartSpec {
    /// Builds geometry for the last [`CHART_MONTHS`] buckets of an
    /// ascending bucket list.
    pub fn from_buckets(buckets: &[MonthlyBucket]) -> Self {
        let window = last_window(buckets);
        let scale_max = scale_max(window);
        let months = window
            .iter()
            .map(|bucket| MonthBars {
                month: bucket.month.clone(),
                income: bucket.income,
                expense: bucket.expense,
                income_height: bucket.income / scale_max,
                expense_height: bucket.expense / scale_max,
            })
            .collect();
        Self { months, scale_max }
    }
}

/// One row of the degraded, data-only rendering. Everything here is
/// deterministic, so tests assert widths and strings rather than pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackRow {
    /// `MM/YYYY`, as shown under each group of bars.
    pub month_label: String,
    /// Proportional widths in percent, `0.0..=FALLBACK_MAX_WIDTH`.
    pub income_width: f64,
    pub expense_width: f64,
    pub income_label: String,
    pub expense_label: String,
}

/// Error reported by a failing primary renderer.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct RenderError(pub String);

/// Strategy interface for the primary chart path.
pub trait ChartRenderer: Send + Sync {
    type Output;

    fn render(&self, spec: &ChartSpec) -> Result<Self::Output, RenderError>;
}

/// Result of one render cycle.
#[derive(Debug)]
pub enum ChartOutcome<R> {
    /// The primary renderer succeeded.
    Rendered(R),
    /// The primary renderer failed; the same data, rendered as
    /// proportional rows.
    Degraded(Vec<FallbackRow>),
    /// Nothing to show yet.
    Empty,
}

/// Runs one render cycle over an ascending bucket list.
pub fn render_monthly<R: ChartRenderer>(
    renderer: &R,
    buckets: &[MonthlyBucket],
    currency: &dyn CurrencyFormatter,
) -> ChartOutcome<R::Output> {
    if buckets.is_empty() {
        return ChartOutcome::Empty;
    }
    let spec = ChartSpec::from_buckets(buckets);
    match renderer.render(&spec) {
        Ok(output) => ChartOutcome::Rendered(output),
        Err(err) => {
            warn!("primary chart renderer failed, falling back to text bars: {err}");
            ChartOutcome::Degraded(fallback_rows(buckets, currency))
        }
    }
}

/// Computes the degraded representation for the same last-months window
/// the primary path shows.
pub fn fallback_rows(
    buckets: &[MonthlyBucket],
    currency: &dyn CurrencyFormatter,
) -> Vec<FallbackRow> {
    let window = last_window(buckets);
    let scale_max = scale_max(window);
    window
        .iter()
        .map(|bucket| FallbackRow {
            month_label: month_label(&bucket.month),
            income_width: bucket.income / scale_max * FALLBACK_MAX_WIDTH,
            expense_width: bucket.expense / scale_max * FALLBACK_MAX_WIDTH,
            income_label: currency.format_amount(bucket.income),
            expense_label: currency.format_amount(bucket.expense),
        })
        .collect()
}

fn last_window(buckets: &[MonthlyBucket]) -> &[MonthlyBucket] {
    let start = buckets.len().saturating_sub(CHART_MONTHS);
    &buckets[start..]
}

fn scale_max(buckets: &[MonthlyBucket]) -> f64 {
    buckets
        .iter()
        .map(|bucket| bucket.income.max(bucket.expense))
        .fold(1.0_f64, f64::max)
}

/// Turns a `YYYY-MM` key into the `MM/YYYY` label users see.
fn month_label(month: &str) -> String {
    let mut parts: Vec<&str> = month.split('-').collect();
    parts.reverse();
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::SymbolFormatter;

    struct FixedRenderer;

    impl ChartRenderer for FixedRenderer {
        type Output = usize;

        fn render(&self, spec: &ChartSpec) -> Result<usize, RenderError> {
            Ok(spec.months.len())
        }
    }

    struct BrokenRenderer;

    impl ChartRenderer for BrokenRenderer {
        type Output = usize;

        fn render(&self, _spec: &ChartSpec) -> Result<usize, RenderError> {
            Err(RenderError("no drawing surface".into()))
        }
    }

    fn bucket(month: &str, income: f64, expense: f64) -> MonthlyBucket {
        MonthlyBucket {
            month: month.into(),
            income,
            expense,
        }
    }

    #[test]
    fn empty_buckets_short_circuit() {
        let outcome = render_monthly(&FixedRenderer, &[], &SymbolFormatter::default());
        assert!(matches!(outcome, ChartOutcome::Empty));
    }

    #[test]
    fn primary_path_wins_when_it_renders() {
        let buckets = vec![bucket("2024-01", 100.0, 40.0)];
        let outcome = render_monthly(&FixedRenderer, &buckets, &SymbolFormatter::default());
        assert!(matches!(outcome, ChartOutcome::Rendered(1)));
    }

    #[test]
    fn renderer_failure_degrades_instead_of_propagating() {
        let buckets = vec![bucket("2024-01", 100.0, 40.0)];
        let outcome = render_monthly(&BrokenRenderer, &buckets, &SymbolFormatter::default());
        let rows = match outcome {
            ChartOutcome::Degraded(rows) => rows,
            other => panic!("expected degraded outcome, got {other:?}"),
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].month_label, "01/2024");
        assert_eq!(rows[0].income_width, 80.0);
        assert_eq!(rows[0].expense_width, 40.0 / 100.0 * 80.0);
        assert_eq!(rows[0].income_label, "R$ 100.00");
        assert_eq!(rows[0].expense_label, "R$ 40.00");
    }

    #[test]
    fn only_the_last_six_months_are_shown() {
        let buckets: Vec<MonthlyBucket> = (1..=8)
            .map(|month| bucket(&format!("2024-{month:02}"), month as f64, 0.0))
            .collect();

        let spec = ChartSpec::from_buckets(&buckets);
        assert_eq!(spec.months.len(), CHART_MONTHS);
        assert_eq!(spec.months[0].month, "2024-03");
        assert_eq!(spec.scale_max, 8.0);

        let rows = fallback_rows(&buckets, &SymbolFormatter::default());
        assert_eq!(rows.len(), CHART_MONTHS);
        assert_eq!(rows[0].month_label, "03/2024");
    }

    #[test]
    fn all_zero_buckets_produce_zero_widths() {
        let buckets = vec![bucket("2024-01", 0.0, 0.0), bucket("2024-02", 0.0, 0.0)];
        let rows = fallback_rows(&buckets, &SymbolFormatter::default());
        assert!(rows
            .iter()
            .all(|row| row.income_width == 0.0 && row.expense_width == 0.0));

        // The shared scale floors at 1, so the geometry stays finite too.
        let spec = ChartSpec::from_buckets(&buckets);
        assert_eq!(spec.scale_max, 1.0);
        assert!(spec.months.iter().all(|m| m.income_height == 0.0));
    }
}
