//! Transaction domain model.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Prefix shared by every code the checkout generates.
pub const CODE_BRAND: &str = "GFOCUS";

/// Number of random characters after the prefix.
pub const CODE_SUFFIX_LEN: usize = 6;

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Client-generated correlation identifier, `<PREFIX>-<6 base-36 chars>`.
///
/// The backend stores it as the transaction note, and the payer quotes it
/// in the bank transfer so the two can be matched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransactionCode(String);

impl TransactionCode {
    /// Generates a fresh code with the given prefix.
    pub fn generate(prefix: &str) -> Result<Self, ValidationError> {
        validate_prefix(prefix)?;
        Ok(Self::with_suffix(prefix))
    }

    /// Generates a code for a plan, e.g. `GFOCUS-PRO-7QK2ZD` for "Pro".
    pub fn for_plan(plan_name: &str) -> Self {
        // prefix_for_plan only emits [A-Z0-9-] with no leading or trailing dash
        Self::with_suffix(&prefix_for_plan(plan_name))
    }

    fn with_suffix(prefix: &str) -> Self {
        let mut rng = rand::rng();
        let suffix: String = (0..CODE_SUFFIX_LEN)
            .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
            .collect();

        Self(format!("{}-{}", prefix, suffix))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the prefix part (everything before the last dash).
    pub fn prefix(&self) -> &str {
        self.0
            .rsplit_once('-')
            .map(|(prefix, _)| prefix)
            .unwrap_or_default()
    }
}

/// Builds the code prefix for a plan name.
pub fn prefix_for_plan(plan_name: &str) -> String {
    let mut prefix = String::from(CODE_BRAND);
    let slug: String = plan_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '-'
            }
        })
        .collect();
    let slug = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if !slug.is_empty() {
        prefix.push('-');
        prefix.push_str(&slug);
    }
    prefix
}

fn validate_prefix(prefix: &str) -> Result<(), ValidationError> {
    let valid = !prefix.is_empty()
        && !prefix.starts_with('-')
        && !prefix.ends_with('-')
        && !prefix.contains("--")
        && prefix
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-');

    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidCodePrefix(prefix.to_string()))
    }
}

impl std::fmt::Display for TransactionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for TransactionCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTransactionCode(s.to_string());

        let (prefix, suffix) = s.rsplit_once('-').ok_or_else(invalid)?;
        validate_prefix(prefix).map_err(|_| invalid())?;

        let suffix_ok = suffix.len() == CODE_SUFFIX_LEN
            && suffix
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
        if !suffix_ok {
            return Err(invalid());
        }

        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for TransactionCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TransactionCode> for String {
    fn from(code: TransactionCode) -> Self {
        code.0
    }
}

/// Status as reported by the backend.
///
/// Anything other than `pending`, `success` or `failed` is kept verbatim
/// and treated as inconclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RemoteStatus {
    Pending,
    Success,
    Failed,
    Other(String),
}

impl RemoteStatus {
    /// True for `success` and `failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RemoteStatus::Success | RemoteStatus::Failed)
    }
}

impl From<String> for RemoteStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => RemoteStatus::Pending,
            "success" => RemoteStatus::Success,
            "failed" => RemoteStatus::Failed,
            _ => RemoteStatus::Other(value),
        }
    }
}

impl From<RemoteStatus> for String {
    fn from(status: RemoteStatus) -> Self {
        match status {
            RemoteStatus::Pending => "pending".to_string(),
            RemoteStatus::Success => "success".to_string(),
            RemoteStatus::Failed => "failed".to_string(),
            RemoteStatus::Other(other) => other,
        }
    }
}

/// Lifecycle state of a transaction from the client's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Success => write!(f, "success"),
            TransactionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A checkout attempt awaiting payment.
///
/// The status only moves through [`Transaction::apply_status`], which is fed
/// from backend reports. Once resolved it never changes again.
///
/// Only [`Transaction::pending`] builds one, so it cannot be deserialized
/// past the email and plan checks:
///
/// ```compile_fail
/// let tx: gfocus_types::Transaction = serde_json::from_str("{}").unwrap();
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    /// Correlation code sent as the transaction note
    pub code: TransactionCode,
    /// Payer's contact email
    pub email: String,
    /// Plan the payer is buying
    pub plan_name: String,
    status: TransactionStatus,
    /// When the attempt was started
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Creates a pending transaction after the minimal client-side checks.
    pub fn pending(
        code: TransactionCode,
        email: &str,
        plan_name: &str,
    ) -> Result<Self, ValidationError> {
        let email = email.trim();
        if !email.contains('@') {
            return Err(ValidationError::InvalidEmail(email.to_string()));
        }

        let plan_name = plan_name.trim();
        if plan_name.is_empty() {
            return Err(ValidationError::EmptyPlan);
        }

        Ok(Self {
            code,
            email: email.to_string(),
            plan_name: plan_name.to_string(),
            status: TransactionStatus::Pending,
            created_at: Utc::now(),
        })
    }

    /// Current status.
    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    /// True once the backend reported success or failure.
    pub fn is_resolved(&self) -> bool {
        self.status != TransactionStatus::Pending
    }

    /// Folds a backend report into the transaction and returns the new status.
    pub fn apply_status(&mut self, remote: &RemoteStatus) -> TransactionStatus {
        if !self.is_resolved() {
            self.status = match remote {
                RemoteStatus::Success => TransactionStatus::Success,
                RemoteStatus::Failed => TransactionStatus::Failed,
                RemoteStatus::Pending | RemoteStatus::Other(_) => TransactionStatus::Pending,
            };
        }
        self.status
    }
}
