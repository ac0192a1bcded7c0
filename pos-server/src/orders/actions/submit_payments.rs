//! SubmitPayments command handler
//!
//! Validates a quick (single row) or split (multiple rows) payment batch
//! against the outstanding balance and records it all-or-nothing. A batch
//! whose sum differs from the outstanding balance by more than 0.01 is
//! rejected without applying any row.

use async_trait::async_trait;
use uuid::Uuid;

use crate::orders::money::{self, MONEY_TOLERANCE, to_decimal, to_f64};
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use rust_decimal::Decimal;
use shared::order::{EventPayload, OrderEvent, OrderEventType, OrderStatus, PaymentRecord};

/// SubmitPayments action
#[derive(Debug, Clone)]
pub struct SubmitPaymentsAction {
    pub order_id: String,
    pub payments: Vec<shared::order::PaymentInput>,
}

#[async_trait]
impl CommandHandler for SubmitPaymentsAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        match snapshot.status {
            OrderStatus::Billed => {}
            OrderStatus::Open | OrderStatus::KotPrinted => {
                return Err(OrderError::InvalidState(format!(
                    "order {} has not been billed",
                    self.order_id
                )));
            }
            OrderStatus::Paid => {
                return Err(OrderError::InvalidState(format!(
                    "order {} is already settled",
                    self.order_id
                )));
            }
            status => {
                return Err(OrderError::InvalidState(format!(
                    "cannot pay {:?} order {}",
                    status, self.order_id
                )));
            }
        }

        if snapshot.totals.grand_total <= 0.0 {
            return Err(OrderError::NothingToPay(self.order_id.clone()));
        }

        if self.payments.is_empty() {
            return Err(OrderError::InvalidState(
                "payment batch must contain at least one row".to_string(),
            ));
        }

        for payment in &self.payments {
            money::validate_payment(payment)?;
        }

        // All-or-nothing: the batch must settle the outstanding balance
        // within tolerance. Quick and split submissions reconcile the same way.
        let outstanding = to_decimal(snapshot.totals.grand_total) - to_decimal(snapshot.paid_amount);
        let submitted: Decimal = self.payments.iter().map(|p| to_decimal(p.amount)).sum();

        if (submitted - outstanding).abs() > MONEY_TOLERANCE {
            return Err(OrderError::AmountMismatch {
                expected: to_f64(outstanding),
                submitted: to_f64(submitted),
            });
        }

        let now = chrono::Utc::now().timestamp_millis();
        let records: Vec<PaymentRecord> = self
            .payments
            .iter()
            .map(|payment| PaymentRecord {
                payment_id: Uuid::new_v4().to_string(),
                method: payment.method.clone(),
                amount: payment.amount,
                paid_at: payment.paid_at.unwrap_or(now),
                notes: payment.notes.clone(),
            })
            .collect();

        let seq = ctx.next_sequence();
        let event = OrderEvent::new(
            seq,
            self.order_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::PaymentsAdded,
            EventPayload::PaymentsAdded { payments: records },
        );

        Ok(vec![event])
    }
}
