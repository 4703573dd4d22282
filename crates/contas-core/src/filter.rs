//! Predicate construction for narrowing fetched transactions.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use contas_domain::TransactionKind;

use crate::{backend::TransactionRecord, error::CoreError};

/// How many rows a fetch returns when the caller does not override it.
pub const DEFAULT_FETCH_LIMIT: usize = 200;

/// Narrows by transaction kind. `All` always passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindFilter {
    #[default]
    All,
    Income,
    Expense,
}

impl KindFilter {
    pub fn matches(self, kind: TransactionKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Income => kind == TransactionKind::Income,
            KindFilter::Expense => kind == TransactionKind::Expense,
        }
    }
}

/// Conjunction of kind, category, and inclusive calendar-day bounds.
///
/// The same filter drives the backend query and local narrowing, so a fetch
/// result never needs a second pass before aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFilter {
    pub kind: KindFilter,
    pub category_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub limit: usize,
}

impl Default for TransactionFilter {
    fn default() -> Self {
        Self {
            kind: KindFilter::All,
            category_id: None,
            date_from: None,
            date_to: None,
            limit: DEFAULT_FETCH_LIMIT,
        }
    }
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kind(mut self, kind: KindFilter) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Parses raw `YYYY-MM-DD` bounds as typed on the filter form. Blank
    /// input means "no bound"; anything else malformed fails construction
    /// so the caller aborts the fetch instead of silently matching all.
    pub fn with_date_range(
        mut self,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> Result<Self, CoreError> {
        self.date_from = parse_bound(date_from)?;
        self.date_to = parse_bound(date_to)?;
        Ok(self)
    }

    /// Start of the first included instant: `date_from` at 00:00:00 UTC.
    pub fn lower_bound(&self) -> Option<DateTime<Utc>> {
        self.date_from
            .map(|date| date.and_hms_opt(0, 0, 0).unwrap().and_utc())
    }

    /// Last included instant: `date_to` at 23:59:59 UTC, so the range
    /// covers the entire end day.
    pub fn upper_bound(&self) -> Option<DateTime<Utc>> {
        self.date_to
            .map(|date| date.and_hms_opt(23, 59, 59).unwrap().and_utc())
    }

    pub fn matches(&self, record: &TransactionRecord) -> bool {
        let txn = &record.transaction;
        if !self.kind.matches(txn.kind) {
            return false;
        }
        if let Some(category_id) = self.category_id {
            if txn.category_id != Some(category_id) {
                return false;
            }
        }
        if let Some(lower) = self.lower_bound() {
            if txn.created_at < lower {
                return false;
            }
        }
        if let Some(upper) = self.upper_bound() {
            if txn.created_at > upper {
                return false;
            }
        }
        true
    }
}

fn parse_bound(raw: Option<&str>) -> Result<Option<NaiveDate>, CoreError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| CoreError::InvalidFilter(format!("`{trimmed}` is not a YYYY-MM-DD date")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use contas_domain::Transaction;

    fn record_at(timestamp: DateTime<Utc>) -> TransactionRecord {
        TransactionRecord::new(
            Transaction::new(TransactionKind::Expense, 10.0, timestamp),
            None,
        )
    }

    #[test]
    fn malformed_date_fails_construction() {
        let err = TransactionFilter::new()
            .with_date_range(Some("2024-13-40"), None)
            .expect_err("bad date must fail");
        assert!(
            matches!(err, CoreError::InvalidFilter(ref message) if message.contains("2024-13-40")),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn blank_dates_mean_no_bound() {
        let filter = TransactionFilter::new()
            .with_date_range(Some("  "), Some(""))
            .expect("blank bounds are fine");
        assert_eq!(filter.date_from, None);
        assert_eq!(filter.date_to, None);
    }

    #[test]
    fn range_includes_the_entire_end_day() {
        let filter = TransactionFilter::new()
            .with_date_range(Some("2024-01-01"), Some("2024-01-31"))
            .expect("valid range");

        let late_january = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 0).unwrap();
        let early_february = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 1).unwrap();
        assert!(filter.matches(&record_at(late_january)));
        assert!(!filter.matches(&record_at(early_february)));
    }

    #[test]
    fn kind_and_category_narrow_together() {
        let category_id = Uuid::new_v4();
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let mut record = record_at(timestamp);
        record.transaction.category_id = Some(category_id);

        let filter = TransactionFilter::new()
            .with_kind(KindFilter::Expense)
            .with_category(category_id);
        assert!(filter.matches(&record));

        let other_category = TransactionFilter::new().with_category(Uuid::new_v4());
        assert!(!other_category.matches(&record));

        let income_only = TransactionFilter::new().with_kind(KindFilter::Income);
        assert!(!income_only.matches(&record));
    }
}
