//! PaymentConfirmationWorkflow unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time::Instant;

    use gfocus_types::{
        BackendError, CheckoutError, ConfirmTransactionRequest, PaymentBackend,
        PaymentStatusResponse, RemoteStatus, TransactionCode, TransactionStatus, ValidationError,
    };

    use crate::{CheckoutOutcome, PaymentConfirmationWorkflow, PollPolicy, cancel_pair};

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Register(ConfirmTransactionRequest),
        Check(String),
    }

    /// Backend that replays a fixed script of status reports.
    ///
    /// Once the script runs out every check reports `pending`.
    pub struct ScriptedBackend {
        register_error: Mutex<Option<BackendError>>,
        script: Mutex<VecDeque<Result<PaymentStatusResponse, BackendError>>>,
        check_delay: Duration,
        calls: Mutex<Vec<(Call, Instant)>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedBackend {
        pub fn new(script: Vec<Result<PaymentStatusResponse, BackendError>>) -> Self {
            Self {
                register_error: Mutex::new(None),
                script: Mutex::new(script.into()),
                check_delay: Duration::ZERO,
                calls: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        pub fn failing_registration(error: BackendError) -> Self {
            let backend = Self::new(Vec::new());
            *backend.register_error.lock().unwrap() = Some(error);
            backend
        }

        pub fn with_check_delay(mut self, delay: Duration) -> Self {
            self.check_delay = delay;
            self
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
        }

        pub fn check_times(&self) -> Vec<Instant> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(c, _)| matches!(c, Call::Check(_)))
                .map(|(_, at)| *at)
                .collect()
        }
    }

    #[async_trait]
    impl PaymentBackend for ScriptedBackend {
        async fn register_transaction(
            &self,
            req: &ConfirmTransactionRequest,
        ) -> Result<(), BackendError> {
            self.calls
                .lock()
                .unwrap()
                .push((Call::Register(req.clone()), Instant::now()));
            match self.register_error.lock().unwrap().take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        async fn check_payment_status(
            &self,
            code: &TransactionCode,
        ) -> Result<PaymentStatusResponse, BackendError> {
            self.calls
                .lock()
                .unwrap()
                .push((Call::Check(code.to_string()), Instant::now()));

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            if !self.check_delay.is_zero() {
                tokio::time::sleep(self.check_delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(PaymentStatusResponse::pending()))
        }
    }

    fn code() -> TransactionCode {
        "GFOCUS-PRO-AB12CD".parse().unwrap()
    }

    fn gaps(times: &[Instant]) -> Vec<Duration> {
        times.windows(2).map(|w| w[1] - w[0]).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_example_checkout_pending_then_success() {
        let backend = ScriptedBackend::new(vec![
            Ok(PaymentStatusResponse::pending()),
            Ok(PaymentStatusResponse::success("XYZ")),
        ]);
        let workflow = PaymentConfirmationWorkflow::new(backend);

        let report = workflow
            .confirm_payment("user@example.com", "Pro", &code())
            .await
            .unwrap();

        assert_eq!(
            report.outcome,
            CheckoutOutcome::Paid {
                license_key: Some("XYZ".to_string())
            }
        );
        assert_eq!(report.checks, 2);
        assert_eq!(report.transaction.status(), TransactionStatus::Success);

        let calls = workflow.backend().calls();
        assert_eq!(calls.len(), 3);
        let Call::Register(req) = &calls[0] else {
            panic!("first call must be the registration, got {:?}", calls[0]);
        };
        assert_eq!(
            serde_json::to_string(req).unwrap(),
            r#"{"transaction_note":"GFOCUS-PRO-AB12CD","email":"user@example.com","plan":"Pro"}"#
        );
        assert_eq!(calls[1], Call::Check("GFOCUS-PRO-AB12CD".to_string()));
        assert_eq!(calls[2], Call::Check("GFOCUS-PRO-AB12CD".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_registration_failure_skips_polling() {
        let backend = ScriptedBackend::failing_registration(BackendError::Status {
            status: 500,
            message: "boom".into(),
        });
        let workflow = PaymentConfirmationWorkflow::new(backend);

        let err = workflow
            .confirm_payment("user@example.com", "Pro", &code())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Registration(BackendError::Status { status: 500, .. })
        ));
        let calls = workflow.backend().calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(calls[0], Call::Register(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_email_makes_no_calls() {
        let workflow = PaymentConfirmationWorkflow::new(ScriptedBackend::new(Vec::new()));

        let err = workflow
            .confirm_payment("not-an-email", "Pro", &code())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Validation(ValidationError::InvalidEmail(_))
        ));
        assert!(workflow.backend().calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_success_never_waits() {
        let backend = ScriptedBackend::new(vec![Ok(PaymentStatusResponse::success("KEY-1"))]);
        let workflow = PaymentConfirmationWorkflow::new(backend);

        let started = Instant::now();
        let report = workflow
            .confirm_payment("user@example.com", "Pro", &code())
            .await
            .unwrap();

        assert!(report.outcome.is_paid());
        assert_eq!(report.checks, 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_pending_then_success_spaced_by_interval() {
        let backend = ScriptedBackend::new(vec![
            Ok(PaymentStatusResponse::pending()),
            Ok(PaymentStatusResponse::pending()),
            Ok(PaymentStatusResponse::success("KEY-2")),
            Ok(PaymentStatusResponse::success("never-read")),
        ]);
        let workflow = PaymentConfirmationWorkflow::new(backend);

        let report = workflow
            .confirm_payment("user@example.com", "Pro", &code())
            .await
            .unwrap();

        assert_eq!(report.checks, 3);
        let times = workflow.backend().check_times();
        assert_eq!(times.len(), 3);
        for gap in gaps(&times) {
            assert!(gap >= Duration::from_secs(5), "gap {:?} too short", gap);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_resolving_times_out() {
        let workflow = PaymentConfirmationWorkflow::new(ScriptedBackend::new(Vec::new()));

        let started = Instant::now();
        let report = workflow
            .confirm_payment("user@example.com", "Pro", &code())
            .await
            .unwrap();

        assert_eq!(report.outcome, CheckoutOutcome::TimedOut);
        assert_eq!(report.transaction.status(), TransactionStatus::Pending);

        let times = workflow.backend().check_times();
        assert_eq!(times.len() as u32, report.checks);
        // One check every 5 s starting at t=0, none at or past t=600
        assert!((115..=120).contains(&times.len()), "{} checks", times.len());
        for at in &times {
            assert!(*at - started < Duration::from_secs(600));
        }
        for gap in gaps(&times) {
            assert!(gap >= Duration::from_secs(5));
        }
        assert!(started.elapsed() <= Duration::from_secs(600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_keep_polling() {
        let backend = ScriptedBackend::new(vec![
            Err(BackendError::Transport("connection reset".into())),
            Err(BackendError::Decode("expected value".into())),
            Ok(PaymentStatusResponse {
                status: RemoteStatus::Other("processing".into()),
                license_key: None,
                paid_amount: None,
                required_amount: None,
            }),
            Ok(PaymentStatusResponse::failed(100_000.0, 299_000.0)),
        ]);
        let workflow = PaymentConfirmationWorkflow::new(backend);

        let report = workflow
            .confirm_payment("user@example.com", "Pro", &code())
            .await
            .unwrap();

        assert_eq!(
            report.outcome,
            CheckoutOutcome::Rejected {
                paid_amount: Some(100_000.0),
                required_amount: Some(299_000.0),
            }
        );
        assert_eq!(report.checks, 4);
        assert_eq!(report.transaction.status(), TransactionStatus::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_checks_never_overlap() {
        let backend = ScriptedBackend::new(vec![
            Ok(PaymentStatusResponse::pending()),
            Ok(PaymentStatusResponse::pending()),
            Ok(PaymentStatusResponse::success("KEY-3")),
        ])
        .with_check_delay(Duration::from_secs(7));
        let workflow = PaymentConfirmationWorkflow::new(backend);

        let report = workflow
            .confirm_payment("user@example.com", "Pro", &code())
            .await
            .unwrap();

        assert!(report.outcome.is_paid());
        assert_eq!(workflow.backend().max_in_flight.load(Ordering::SeqCst), 1);
        // 7 s in flight plus 5 s rest between starts
        for gap in gaps(&workflow.backend().check_times()) {
            assert!(gap >= Duration::from_secs(12), "gap {:?}", gap);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_check_abandoned_at_deadline() {
        let backend = ScriptedBackend::new(Vec::new()).with_check_delay(Duration::from_secs(3600));
        let policy = PollPolicy::new(Duration::from_secs(5), Duration::from_secs(30));
        let workflow = PaymentConfirmationWorkflow::with_policy(backend, policy);

        let started = Instant::now();
        let report = workflow
            .confirm_payment("user@example.com", "Pro", &code())
            .await
            .unwrap();

        assert_eq!(report.outcome, CheckoutOutcome::TimedOut);
        assert_eq!(report.checks, 1);
        assert_eq!(started.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_polling() {
        let workflow = PaymentConfirmationWorkflow::new(ScriptedBackend::new(Vec::new()));
        let (handle, token) = cancel_pair();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(12)).await;
            handle.cancel();
        });

        let started = Instant::now();
        let report = workflow
            .confirm_payment_until("user@example.com", "Pro", &code(), token)
            .await
            .unwrap();

        assert_eq!(report.outcome, CheckoutOutcome::Cancelled);
        // checks at t=0, 5, 10
        assert_eq!(report.checks, 3);
        assert_eq!(started.elapsed(), Duration::from_secs(12));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_cancels_before_registration() {
        let workflow = PaymentConfirmationWorkflow::new(ScriptedBackend::new(Vec::new()));
        let (handle, token) = cancel_pair();
        drop(handle);

        let report = workflow
            .confirm_payment_until("user@example.com", "Pro", &code(), token)
            .await
            .unwrap();

        assert_eq!(report.outcome, CheckoutOutcome::Cancelled);
        assert_eq!(report.checks, 0);
        assert!(workflow.backend().calls().is_empty());
    }
}
