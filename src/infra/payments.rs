//! Payment gateway seam. The workflow only needs the charge made at
//! confirmation and the refund issued on cancellation; provider transport
//! is out of scope.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{GigId, PaymentError};

/// A charge request for a confirmed booking's agreed fee.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub gig_id: GigId,
    /// Raw money string as agreed, e.g. "£150".
    pub amount: String,
    pub description: String,
}

/// Receipt for a processed charge.
#[derive(Debug, Clone)]
pub struct ChargeReceipt {
    pub transaction_id: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeReceipt, PaymentError>;

    async fn refund(&self, transaction_id: &str) -> Result<(), PaymentError>;
}

/// Gateway that approves everything and only logs. Used by the CLI and for
/// local development against a non-live environment.
#[derive(Default)]
pub struct SandboxPaymentGateway;

impl SandboxPaymentGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PaymentGateway for SandboxPaymentGateway {
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeReceipt, PaymentError> {
        let transaction_id = format!("sbx_{}", Uuid::new_v4());
        log::info!(
            "sandbox charge of {} for gig {} -> {}",
            request.amount,
            request.gig_id,
            transaction_id
        );
        Ok(ChargeReceipt { transaction_id })
    }

    async fn refund(&self, transaction_id: &str) -> Result<(), PaymentError> {
        log::info!("sandbox refund of transaction {transaction_id}");
        Ok(())
    }
}
