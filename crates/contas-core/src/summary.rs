//! Aggregation of a transaction snapshot into dashboard figures.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, FixedOffset, Offset, Utc};

use contas_domain::TransactionKind;

use crate::backend::TransactionRecord;

/// Income and expense sums for one calendar month. Produced only for
/// months that have at least one transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyBucket {
    /// `YYYY-MM`, zero-padded. Lexicographic order is chronological order.
    pub month: String,
    pub income: f64,
    pub expense: f64,
}

/// The single largest expense in a snapshot, with its category's display
/// name when it has one.
#[derive(Debug, Clone, PartialEq)]
pub struct LargestExpense {
    pub amount: f64,
    pub category_name: Option<String>,
}

/// Everything the dashboard derives from one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    /// Income total minus expense total. Signed.
    pub balance: f64,
    pub total_income: f64,
    pub total_expense: f64,
    /// Sorted ascending by month key.
    pub monthly: Vec<MonthlyBucket>,
    pub largest_expense: Option<LargestExpense>,
    pub transaction_count: usize,
}

/// Derives dashboard figures from a snapshot. Pure; input order does not
/// matter except as the final tie-break for [`LargestExpense`].
pub struct SummaryService;

impl SummaryService {
    /// Aggregates with month keys taken from the UTC calendar.
    pub fn aggregate(records: &[TransactionRecord]) -> DashboardSummary {
        Self::aggregate_with_offset(records, Utc.fix())
    }

    /// Aggregates with month keys taken from the calendar at `offset`,
    /// letting a caller bucket by device-local time.
    ///
    /// Among expenses sharing the maximum amount, the earliest `created_at`
    /// wins; an exact timestamp tie keeps the first one encountered.
    pub fn aggregate_with_offset(
        records: &[TransactionRecord],
        offset: FixedOffset,
    ) -> DashboardSummary {
        let mut total_income = 0.0;
        let mut total_expense = 0.0;
        let mut buckets: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        let mut largest: Option<&TransactionRecord> = None;

        for record in records {
            let txn = &record.transaction;
            let entry = buckets
                .entry(month_key(txn.created_at, offset))
                .or_insert((0.0, 0.0));
            match txn.kind {
                TransactionKind::Income => {
                    total_income += txn.amount;
                    entry.0 += txn.amount;
                }
                TransactionKind::Expense => {
                    total_expense += txn.amount;
                    entry.1 += txn.amount;
                    largest = match largest {
                        None => Some(record),
                        Some(best) => {
                            let current = &best.transaction;
                            if txn.amount > current.amount
                                || (txn.amount == current.amount
                                    && txn.created_at < current.created_at)
                            {
                                Some(record)
                            } else {
                                Some(best)
                            }
                        }
                    };
                }
            }
        }

        DashboardSummary {
            balance: total_income - total_expense,
            total_income,
            total_expense,
            monthly: buckets
                .into_iter()
                .map(|(month, (income, expense))| MonthlyBucket {
                    month,
                    income,
                    expense,
                })
                .collect(),
            largest_expense: largest.map(|record| LargestExpense {
                amount: record.transaction.amount,
                category_name: record.category_name.clone(),
            }),
            transaction_count: records.len(),
        }
    }
}

fn month_key(created_at: DateTime<Utc>, offset: FixedOffset) -> String {
    let local = created_at.with_timezone(&offset);
    format!("{:04}-{:02}", local.year(), local.month())
}
