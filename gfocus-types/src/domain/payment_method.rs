//! Payment methods offered on the payment page.

use serde::{Deserialize, Serialize};

use super::plan::Plan;
use super::transaction::TransactionCode;
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Qr,
    Momo,
    Paypal,
}

impl PaymentMethod {
    pub fn all() -> &'static [PaymentMethod] {
        &[
            PaymentMethod::Card,
            PaymentMethod::Qr,
            PaymentMethod::Momo,
            PaymentMethod::Paypal,
        ]
    }

    pub fn id(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Qr => "qr",
            PaymentMethod::Momo => "momo",
            PaymentMethod::Paypal => "paypal",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Credit/Debit Card",
            PaymentMethod::Qr => "QR Code",
            PaymentMethod::Momo => "MoMo",
            PaymentMethod::Paypal => "PayPal",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Pay with Visa, Mastercard, or American Express",
            PaymentMethod::Qr => "Scan to pay with your banking app",
            PaymentMethod::Momo => "Pay with MoMo e-wallet",
            PaymentMethod::Paypal => "Pay securely with PayPal",
        }
    }

    /// Whether the payer has to quote the transaction code themselves.
    ///
    /// Transfer-style methods are matched by the note on the incoming
    /// payment, so the code must appear in it verbatim.
    pub fn needs_transfer_note(&self) -> bool {
        !matches!(self, PaymentMethod::Card)
    }

    /// Step the payer has to take before verification starts.
    ///
    /// Per-user plans quote the total for `users`, raised to the plan's
    /// seat minimum.
    pub fn instructions(&self, plan: &Plan, users: u32, code: &TransactionCode) -> String {
        let amount = plan.total_for(users);
        match self {
            PaymentMethod::Card => format!(
                "Complete the card payment of {} for the {} plan. Reference: {}",
                amount, plan.name, code
            ),
            PaymentMethod::Qr => format!(
                "Scan the QR code with your banking app and transfer {}. Use transfer note: {}",
                amount, code
            ),
            PaymentMethod::Momo => format!(
                "Send {} from your MoMo wallet. Use message: {}",
                amount, code
            ),
            PaymentMethod::Paypal => format!(
                "Send {} via PayPal and add this note to the payment: {}",
                amount, code
            ),
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "card" => Ok(PaymentMethod::Card),
            "qr" => Ok(PaymentMethod::Qr),
            "momo" => Ok(PaymentMethod::Momo),
            "paypal" => Ok(PaymentMethod::Paypal),
            _ => Err(ValidationError::UnknownPaymentMethod(s.to_string())),
        }
    }
}
