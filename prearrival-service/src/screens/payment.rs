use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use wizard_flow::{Context, NavAction, Result, Screen, ScreenResult};

use crate::model::Traveler;

use super::types::{PaymentRecord, pages, session_keys};
use super::utils::{self, Submission};

/// Simulated processing time for the group payment.
const PROCESSING_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
struct PaymentForm {
    method: String,
}

/// One payment for the whole group: the summed arrival tax. Processing is
/// simulated with a fixed delay and a random reference; no real payment flow
/// is involved.
pub struct PaymentScreen;

fn prompt(group: &[Traveler]) -> String {
    let total: u64 = group.iter().map(Traveler::arrival_tax_cents).sum();
    format!(
        r#"Group arrival tax due: ${}.{:02}. Pay with {{"method": "card" | "bank_transfer"}}"#,
        total / 100,
        total % 100
    )
}

#[async_trait]
impl Screen for PaymentScreen {
    fn id(&self) -> &str {
        pages::PAYMENT
    }

    async fn run(&self, context: Context) -> Result<ScreenResult> {
        info!("running screen: {}", self.id());

        let group = utils::travelers(&context).await;
        if group.is_empty() {
            return Ok(ScreenResult::new(
                Some("No traveler group yet. Start with traveler setup.".to_string()),
                NavAction::Stay,
            ));
        }

        if let Some(record) = context.get::<PaymentRecord>(session_keys::PAYMENT).await {
            // Already paid: go straight to certificate issuance.
            return Ok(ScreenResult::new(
                Some(format!("Payment {} already recorded.", record.reference)),
                NavAction::ContinueAndRun,
            ));
        }

        match utils::submission::<PaymentForm>(&context).await {
            Submission::Back => Ok(ScreenResult::new(
                Some("Returning to the previous page".to_string()),
                NavAction::Back,
            )),
            Submission::Navigate(page) => Ok(ScreenResult::new(None, NavAction::GoTo(page))),
            Submission::Empty | Submission::Invalid(_) => {
                Ok(ScreenResult::new(Some(prompt(&group)), NavAction::Stay))
            }
            Submission::Form(form) => {
                let method = form.method.trim().to_lowercase();
                if method != "card" && method != "bank_transfer" {
                    return Ok(ScreenResult::new(
                        Some(format!("'{}' is not a supported method. {}", form.method, prompt(&group))),
                        NavAction::Stay,
                    ));
                }

                let amount_cents: u64 = group.iter().map(Traveler::arrival_tax_cents).sum();

                // Cosmetic processing delay; nothing real happens here.
                tokio::time::sleep(PROCESSING_DELAY).await;

                let record = PaymentRecord {
                    reference: format!("PAY-{:08X}", rand::random::<u32>()),
                    method,
                    amount_cents,
                    paid_at: Utc::now(),
                };
                context.set(session_keys::PAYMENT, &record).await;

                let status = format!(
                    "payment {} recorded for ${}.{:02}",
                    record.reference,
                    amount_cents / 100,
                    amount_cents % 100
                );
                info!("{status}");

                Ok(ScreenResult::new_with_status(
                    Some(format!(
                        "Payment confirmed ({}). Issuing entry certificates.",
                        record.reference
                    )),
                    NavAction::ContinueAndRun,
                    Some(status),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn submit(context: &Context, input: &str) -> ScreenResult {
        context.set(session_keys::USER_INPUT, input).await;
        PaymentScreen.run(context.clone()).await.unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn payment_totals_the_group_tax_and_records_a_reference() {
        let context = Context::new();
        let group = vec![
            Traveler::new(false),
            Traveler::new(false),
            Traveler::new(true),
        ];
        utils::save_travelers(&context, &group).await;

        let result = submit(&context, r#"{"method": "card"}"#).await;
        assert!(matches!(result.next, NavAction::ContinueAndRun));

        let record: PaymentRecord = context.get(session_keys::PAYMENT).await.unwrap();
        // Two adults at $25.00; the minor is exempt.
        assert_eq!(record.amount_cents, 5000);
        assert!(record.reference.starts_with("PAY-"));
        assert_eq!(record.method, "card");
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_visits_do_not_charge_twice() {
        let context = Context::new();
        utils::save_travelers(&context, &[Traveler::new(false)]).await;

        submit(&context, r#"{"method": "card"}"#).await;
        let first: PaymentRecord = context.get(session_keys::PAYMENT).await.unwrap();

        let result = submit(&context, r#"{"method": "bank_transfer"}"#).await;
        assert!(matches!(result.next, NavAction::ContinueAndRun));
        let second: PaymentRecord = context.get(session_keys::PAYMENT).await.unwrap();
        assert_eq!(first.reference, second.reference);
    }

    #[tokio::test(start_paused = true)]
    async fn unsupported_methods_are_rejected() {
        let context = Context::new();
        utils::save_travelers(&context, &[Traveler::new(false)]).await;

        let result = submit(&context, r#"{"method": "cheque"}"#).await;
        assert!(matches!(result.next, NavAction::Stay));
        assert!(
            context
                .get::<PaymentRecord>(session_keys::PAYMENT)
                .await
                .is_none()
        );
    }
}
