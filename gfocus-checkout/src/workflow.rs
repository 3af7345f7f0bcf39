//! Payment Confirmation Workflow
//!
//! Registers a pending transaction, then polls the backend until the payment
//! resolves. Contains NO transport logic - the backend is injected.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep_until, timeout_at};

use gfocus_types::{
    CheckoutError, ConfirmTransactionRequest, PaymentBackend, PaymentStatusResponse, Transaction,
    TransactionCode, TransactionStatus,
};

use crate::cancel::CancelToken;

/// Pause between the end of one status check and the start of the next.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// How long polling may run before the checkout gives up.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(600);

/// Timing of the polling phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollPolicy {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT)
    }
}

/// How a checkout ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// The backend confirmed the payment.
    Paid { license_key: Option<String> },
    /// The backend matched a payment that does not cover the plan.
    Rejected {
        paid_amount: Option<f64>,
        required_amount: Option<f64>,
    },
    /// No resolution before the timeout. The payment may still arrive later.
    TimedOut,
    /// The caller cancelled.
    Cancelled,
}

impl CheckoutOutcome {
    pub fn is_paid(&self) -> bool {
        matches!(self, CheckoutOutcome::Paid { .. })
    }

    fn from_report(resp: PaymentStatusResponse, status: TransactionStatus) -> Option<Self> {
        match status {
            TransactionStatus::Success => Some(CheckoutOutcome::Paid {
                license_key: resp.license_key,
            }),
            TransactionStatus::Failed => Some(CheckoutOutcome::Rejected {
                paid_amount: resp.paid_amount,
                required_amount: resp.required_amount,
            }),
            TransactionStatus::Pending => None,
        }
    }
}

/// Result of one `confirm_payment` call.
#[derive(Debug, Clone)]
pub struct CheckoutReport {
    /// The transaction with its last known status
    pub transaction: Transaction,
    pub outcome: CheckoutOutcome,
    /// Number of status checks issued
    pub checks: u32,
}

/// Application service driving one checkout attempt at a time.
///
/// Generic over `B: PaymentBackend` - the adapter is injected at compile time.
pub struct PaymentConfirmationWorkflow<B: PaymentBackend> {
    backend: B,
    policy: PollPolicy,
}

impl<B: PaymentBackend> PaymentConfirmationWorkflow<B> {
    /// Creates a workflow with the default 5 s / 600 s policy.
    pub fn new(backend: B) -> Self {
        Self::with_policy(backend, PollPolicy::default())
    }

    pub fn with_policy(backend: B, policy: PollPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Registers the transaction and polls until it resolves or times out.
    pub async fn confirm_payment(
        &self,
        email: &str,
        plan_name: &str,
        code: &TransactionCode,
    ) -> Result<CheckoutReport, CheckoutError> {
        self.run(email, plan_name, code, std::future::pending())
            .await
    }

    /// Like [`confirm_payment`](Self::confirm_payment), but also stops when
    /// `cancel` fires.
    pub async fn confirm_payment_until(
        &self,
        email: &str,
        plan_name: &str,
        code: &TransactionCode,
        cancel: CancelToken,
    ) -> Result<CheckoutReport, CheckoutError> {
        self.run(email, plan_name, code, cancel.cancelled()).await
    }

    #[tracing::instrument(skip_all, fields(code = %code, plan = %plan_name))]
    async fn run<F>(
        &self,
        email: &str,
        plan_name: &str,
        code: &TransactionCode,
        cancelled: F,
    ) -> Result<CheckoutReport, CheckoutError>
    where
        F: Future<Output = ()>,
    {
        let mut transaction = Transaction::pending(code.clone(), email, plan_name)?;
        tokio::pin!(cancelled);

        // ── Registering ─────────────────────────────────────────────────────
        let req = ConfirmTransactionRequest {
            transaction_note: transaction.code.to_string(),
            email: transaction.email.clone(),
            plan: transaction.plan_name.clone(),
        };
        tokio::select! {
            biased;
            _ = &mut cancelled => {
                tracing::info!("Checkout cancelled before registration finished");
                return Ok(CheckoutReport {
                    transaction,
                    outcome: CheckoutOutcome::Cancelled,
                    checks: 0,
                });
            }
            registered = self.backend.register_transaction(&req) => {
                registered.map_err(|e| {
                    tracing::error!("Registration failed: {}", e);
                    CheckoutError::Registration(e)
                })?;
            }
        }
        tracing::info!("Transaction registered, polling for payment");

        // ── Polling ─────────────────────────────────────────────────────────
        let deadline = Instant::now() + self.policy.timeout;
        let mut checks = 0u32;

        let outcome = loop {
            checks += 1;
            let check = timeout_at(deadline, self.backend.check_payment_status(code));
            let result = tokio::select! {
                biased;
                _ = &mut cancelled => break CheckoutOutcome::Cancelled,
                result = check => result,
            };

            match result {
                Err(_elapsed) => break CheckoutOutcome::TimedOut,
                Ok(Ok(resp)) => {
                    let status = transaction.apply_status(&resp.status);
                    tracing::debug!(check = checks, status = %status, "Status check");
                    if let Some(outcome) = CheckoutOutcome::from_report(resp, status) {
                        break outcome;
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!(check = checks, "Status check failed, will retry: {}", e);
                }
            }

            let next = Instant::now() + self.policy.interval;
            if next >= deadline {
                break CheckoutOutcome::TimedOut;
            }
            tokio::select! {
                biased;
                _ = &mut cancelled => break CheckoutOutcome::Cancelled,
                _ = sleep_until(next) => {}
            }
        };

        match &outcome {
            CheckoutOutcome::Paid { .. } => tracing::info!(checks, "Payment confirmed"),
            CheckoutOutcome::Rejected {
                paid_amount,
                required_amount,
            } => tracing::info!(
                checks,
                ?paid_amount,
                ?required_amount,
                "Payment rejected by backend"
            ),
            CheckoutOutcome::TimedOut => {
                tracing::warn!(checks, "No payment confirmation before timeout")
            }
            CheckoutOutcome::Cancelled => tracing::info!(checks, "Checkout cancelled"),
        }

        Ok(CheckoutReport {
            transaction,
            outcome,
            checks,
        })
    }
}
