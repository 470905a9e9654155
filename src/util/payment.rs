use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::config::PaymentConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment declined: {0}")]
    Declined(String),
    #[error("Invalid charge: {0}")]
    InvalidCharge(String),
    #[error("Payment provider error: {0}")]
    Provider(String),
}

/// What the requester is asked to pay before a request is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPrompt {
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentCharge {
    pub payer_email: String,
    pub amount: i64,
    pub currency: String,
    /// Opaque token from the client-side card form, if any
    pub payment_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub reference: String,
    pub amount: i64,
    pub currency: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, charge: PaymentCharge) -> Result<PaymentReceipt, PaymentError>;
}

/// Stand-in for a card processor. Approves every valid charge unless
/// configured to decline.
pub struct SimulatedPaymentGateway {
    decline_all: bool,
}

impl SimulatedPaymentGateway {
    pub fn new(config: &PaymentConfig) -> Self {
        Self { decline_all: config.simulate_decline }
    }

    pub fn approving() -> Self {
        Self { decline_all: false }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedPaymentGateway {
    #[instrument(skip(self, charge), fields(payer = %charge.payer_email, amount = charge.amount))]
    async fn charge(&self, charge: PaymentCharge) -> Result<PaymentReceipt, PaymentError> {
        if charge.amount <= 0 {
            return Err(PaymentError::InvalidCharge(format!("amount must be positive, got {}", charge.amount)));
        }
        if self.decline_all {
            warn!("Simulated gateway declining charge");
            return Err(PaymentError::Declined("card declined".to_string()));
        }
        let receipt = PaymentReceipt {
            reference: format!("sim_{}", uuid::Uuid::new_v4().simple()),
            amount: charge.amount,
            currency: charge.currency,
        };
        info!(reference = %receipt.reference, "Simulated payment approved");
        Ok(receipt)
    }
}
