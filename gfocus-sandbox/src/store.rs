//! In-memory transaction store.

use dashmap::DashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use gfocus_types::{
    ConfirmTransactionRequest, PaymentStatusResponse, Plan, Transaction, TransactionCode,
    ValidationError,
};

const LICENSE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Transaction not found: {0}")]
    UnknownTransaction(String),
}

/// Body of `POST /sandbox/settle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettleRequest {
    pub transaction_note: String,
    /// Amount received, in dollars
    pub paid_amount: f64,
}

#[derive(Debug)]
struct Record {
    transaction: Transaction,
    plan: &'static Plan,
    polls: u32,
    report: PaymentStatusResponse,
}

/// Transactions keyed by their note.
#[derive(Debug, Default)]
pub struct SandboxStore {
    records: DashMap<String, Record>,
    auto_settle_after: Option<u32>,
}

impl SandboxStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending transactions settle as fully paid on their N-th status check.
    pub fn with_auto_settle(polls: u32) -> Self {
        Self {
            records: DashMap::new(),
            auto_settle_after: Some(polls.max(1)),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records a pending transaction. Registering the same note again is a no-op.
    pub fn register(&self, req: &ConfirmTransactionRequest) -> Result<(), SandboxError> {
        let code: TransactionCode = req.transaction_note.parse()?;
        let plan = Plan::find_by_name_or_key(&req.plan)
            .ok_or_else(|| ValidationError::UnknownPlan(req.plan.clone()))?;
        let transaction = Transaction::pending(code, &req.email, &req.plan)?;

        self.records
            .entry(req.transaction_note.clone())
            .or_insert_with(|| {
                tracing::info!(note = %req.transaction_note, plan = plan.name, "Registered");
                Record {
                    transaction,
                    plan,
                    polls: 0,
                    report: PaymentStatusResponse::pending(),
                }
            });
        Ok(())
    }

    /// Current report for a note; counts towards auto-settlement.
    pub fn status(&self, note: &str) -> Result<PaymentStatusResponse, SandboxError> {
        let mut record = self
            .records
            .get_mut(note)
            .ok_or_else(|| SandboxError::UnknownTransaction(note.to_string()))?;

        record.polls += 1;
        if let Some(after) = self.auto_settle_after {
            if !record.transaction.is_resolved() && record.polls >= after {
                let paid = record.plan.minimum_charge().as_major();
                settle_record(&mut *record, paid);
            }
        }
        Ok(record.report.clone())
    }

    /// Resolves a pending transaction against the amount received.
    ///
    /// Settling an already resolved transaction returns its existing report.
    pub fn settle(&self, req: &SettleRequest) -> Result<PaymentStatusResponse, SandboxError> {
        let mut record = self
            .records
            .get_mut(&req.transaction_note)
            .ok_or_else(|| SandboxError::UnknownTransaction(req.transaction_note.clone()))?;

        if !record.transaction.is_resolved() {
            settle_record(&mut *record, req.paid_amount);
        }
        Ok(record.report.clone())
    }
}

/// Per-user plans are due for at least their minimum seat count.
fn settle_record(record: &mut Record, paid_amount: f64) {
    let required = record.plan.minimum_charge().as_major();
    record.report = if paid_amount >= required {
        PaymentStatusResponse::success(generate_license_key())
    } else {
        PaymentStatusResponse::failed(paid_amount, required)
    };
    let status = record.transaction.apply_status(&record.report.status);
    tracing::info!(
        note = %record.transaction.code,
        paid_amount,
        required,
        %status,
        "Settled"
    );
}

/// `GF-XXXX-XXXX-XXXX` with an alphabet that avoids look-alike characters.
pub fn generate_license_key() -> String {
    let mut rng = rand::rng();
    let groups: Vec<String> = (0..3)
        .map(|_| {
            (0..4)
                .map(|_| LICENSE_ALPHABET[rng.random_range(0..LICENSE_ALPHABET.len())] as char)
                .collect()
        })
        .collect();
    format!("GF-{}", groups.join("-"))
}
