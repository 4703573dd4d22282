//! Validated submission of new transactions, with best-effort receipt
//! upload.

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use contas_domain::TransactionKind;

use crate::{
    backend::{FinanceBackend, NewTransaction},
    error::CoreError,
    session::Session,
};

/// Receipt image captured for a draft, not yet uploaded.
#[derive(Debug, Clone)]
pub struct ReceiptImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Raw input collected from the entry form. The amount stays a string
/// until validation so the form can round-trip exactly what was typed.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub amount: String,
    pub category_id: Option<Uuid>,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub receipt: Option<ReceiptImage>,
}

impl TransactionDraft {
    pub fn new(kind: TransactionKind, amount: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            kind,
            amount: amount.into(),
            category_id: None,
            description: String::new(),
            created_at,
            receipt: None,
        }
    }
}

/// Validates drafts and writes them through the backend.
pub struct TransactionService;

impl TransactionService {
    /// Parses the raw amount field. Accepts a comma as the decimal
    /// separator and requires a finite value strictly greater than zero.
    pub fn parse_amount(raw: &str) -> Result<f64, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidAmount("amount is required".into()));
        }
        let normalized = trimmed.replace(',', ".");
        let value: f64 = normalized
            .parse()
            .map_err(|_| CoreError::InvalidAmount(format!("`{trimmed}` is not a number")))?;
        if !value.is_finite() || value <= 0.0 {
            return Err(CoreError::InvalidAmount(
                "amount must be greater than zero".into(),
            ));
        }
        Ok(value)
    }

    /// Validates and persists a draft, returning the new transaction id.
    ///
    /// Validation stops at the first failure and nothing is sent to the
    /// backend: amount syntax, then amount range, then identity. A receipt,
    /// when present, is uploaded before the row is written; an upload
    /// failure downgrades the submission to "no receipt" rather than
    /// aborting it. The draft itself is never mutated, so on any error the
    /// caller still holds the typed input for retry; on success the caller
    /// resets its own form state.
    pub fn submit(
        backend: &dyn FinanceBackend,
        session: &Session,
        draft: &TransactionDraft,
    ) -> Result<Uuid, CoreError> {
        let amount = Self::parse_amount(&draft.amount)?;
        let user_id = session.current_user().ok_or(CoreError::Unauthenticated)?;

        let receipt_path = draft.receipt.as_ref().and_then(|image| {
            match backend.upload_receipt(user_id, &image.bytes, &image.content_type) {
                Ok(path) => Some(path),
                Err(err) => {
                    warn!("receipt upload failed, recording without receipt: {err}");
                    None
                }
            }
        });

        let description = draft.description.trim();
        backend.insert_transaction(NewTransaction {
            kind: draft.kind,
            amount,
            category_id: draft.category_id,
            description: (!description.is_empty()).then(|| description.to_string()),
            created_at: draft.created_at,
            receipt_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ChangeListener, SubscriptionId, Table, TransactionRecord};
    use crate::filter::TransactionFilter;
    use chrono::TimeZone;
    use contas_domain::Category;
    use std::sync::Mutex;

    /// Minimal backend stub recording what reaches it.
    #[derive(Default)]
    struct StubBackend {
        fail_upload: bool,
        uploaded: Mutex<Vec<String>>,
        inserted: Mutex<Vec<NewTransaction>>,
    }

    impl StubBackend {
        fn failing_upload() -> Self {
            Self {
                fail_upload: true,
                ..Self::default()
            }
        }
    }

    impl FinanceBackend for StubBackend {
        fn list_transactions(
            &self,
            _filter: &TransactionFilter,
        ) -> Result<Vec<TransactionRecord>, CoreError> {
            Ok(Vec::new())
        }

        fn list_categories(&self) -> Result<Vec<Category>, CoreError> {
            Ok(Vec::new())
        }

        fn insert_transaction(&self, fields: NewTransaction) -> Result<Uuid, CoreError> {
            self.inserted.lock().unwrap().push(fields);
            Ok(Uuid::new_v4())
        }

        fn insert_category(&self, _name: &str) -> Result<Uuid, CoreError> {
            Ok(Uuid::new_v4())
        }

        fn delete_category(&self, _id: Uuid) -> Result<(), CoreError> {
            Ok(())
        }

        fn upload_receipt(
            &self,
            user_id: Uuid,
            _bytes: &[u8],
            _content_type: &str,
        ) -> Result<String, CoreError> {
            if self.fail_upload {
                return Err(CoreError::Upload("bucket unavailable".into()));
            }
            let path = format!("{user_id}/receipt.jpg");
            self.uploaded.lock().unwrap().push(path.clone());
            Ok(path)
        }

        fn subscribe(&self, _table: Table, _listener: ChangeListener) -> SubscriptionId {
            SubscriptionId(0)
        }

        fn unsubscribe(&self, _id: SubscriptionId) {}

        fn current_user(&self) -> Option<Uuid> {
            None
        }
    }

    fn draft(amount: &str) -> TransactionDraft {
        let created_at = Utc.with_ymd_and_hms(2024, 4, 2, 10, 30, 0).unwrap();
        TransactionDraft::new(TransactionKind::Expense, amount, created_at)
    }

    fn signed_in_session() -> Session {
        Session::authenticated(Uuid::new_v4())
    }

    #[test]
    fn comma_amounts_are_normalized() {
        assert_eq!(TransactionService::parse_amount("12,50").unwrap(), 12.50);
        assert_eq!(TransactionService::parse_amount(" 7.25 ").unwrap(), 7.25);
    }

    #[test]
    fn empty_zero_and_negative_amounts_are_rejected() {
        for raw in ["", "   ", "0", "-5", "abc", "NaN"] {
            let err = TransactionService::parse_amount(raw)
                .expect_err(&format!("`{raw}` should be rejected"));
            assert!(matches!(err, CoreError::InvalidAmount(_)), "raw = {raw:?}");
        }
    }

    #[test]
    fn validation_runs_before_any_backend_call() {
        let backend = StubBackend::default();
        let err = TransactionService::submit(&backend, &signed_in_session(), &draft("zero"))
            .expect_err("bad amount");
        assert!(matches!(err, CoreError::InvalidAmount(_)));
        assert!(backend.inserted.lock().unwrap().is_empty());
        assert!(backend.uploaded.lock().unwrap().is_empty());
    }

    #[test]
    fn anonymous_submission_is_rejected_after_amount_checks() {
        let backend = StubBackend::default();
        let session = Session::anonymous();
        let err = TransactionService::submit(&backend, &session, &draft("10"))
            .expect_err("not signed in");
        assert!(matches!(err, CoreError::Unauthenticated));
        assert!(backend.inserted.lock().unwrap().is_empty());
    }

    #[test]
    fn description_is_trimmed_and_emptied_to_absent() {
        let backend = StubBackend::default();
        let mut input = draft("3,30");
        input.description = "   ".into();
        TransactionService::submit(&backend, &signed_in_session(), &input).expect("submit");

        let mut input = draft("3,30");
        input.description = "  padaria  ".into();
        TransactionService::submit(&backend, &signed_in_session(), &input).expect("submit");

        let inserted = backend.inserted.lock().unwrap();
        assert_eq!(inserted[0].description, None);
        assert_eq!(inserted[1].description, Some("padaria".into()));
    }

    #[test]
    fn receipt_upload_failure_records_without_receipt() {
        let backend = StubBackend::failing_upload();
        let mut input = draft("25");
        input.receipt = Some(ReceiptImage {
            bytes: vec![0xFF, 0xD8],
            content_type: "image/jpeg".into(),
        });

        TransactionService::submit(&backend, &signed_in_session(), &input)
            .expect("submission survives the upload failure");

        let inserted = backend.inserted.lock().unwrap();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].receipt_path, None);
    }

    #[test]
    fn successful_upload_links_the_stored_path() {
        let backend = StubBackend::default();
        let mut input = draft("25");
        input.receipt = Some(ReceiptImage {
            bytes: vec![0xFF, 0xD8],
            content_type: "image/jpeg".into(),
        });

        TransactionService::submit(&backend, &signed_in_session(), &input).expect("submit");

        let inserted = backend.inserted.lock().unwrap();
        let path = inserted[0].receipt_path.as_deref().expect("path linked");
        assert!(path.ends_with("/receipt.jpg"));
        assert_eq!(backend.uploaded.lock().unwrap().len(), 1);
    }
}
