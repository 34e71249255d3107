use async_trait::async_trait;
use std::fmt::Write as _;
use tracing::info;
use wizard_flow::{Context, NavAction, Result, Screen, ScreenResult};

use super::types::{Destination, PaymentRecord, pages, session_keys};
use super::utils::{self, Submission};

/// Entry-certificate issuance: one simulated QR image URL per traveler.
/// The payload is a plain identifier string; there is no signing and no
/// verification anywhere.
pub struct QrCodeScreen;

#[async_trait]
impl Screen for QrCodeScreen {
    fn id(&self) -> &str {
        pages::QR_CODE
    }

    async fn run(&self, context: Context) -> Result<ScreenResult> {
        info!("running screen: {}", self.id());

        // Back and jump commands still work here; any other input (or none)
        // issues the certificates.
        match utils::submission::<serde_json::Value>(&context).await {
            Submission::Back => {
                return Ok(ScreenResult::new(
                    Some("Returning to the previous page".to_string()),
                    NavAction::Back,
                ));
            }
            Submission::Navigate(page) => {
                return Ok(ScreenResult::new(None, NavAction::GoTo(page)));
            }
            _ => {}
        }

        let group = utils::travelers(&context).await;
        if group.is_empty() {
            return Ok(ScreenResult::new(
                Some("No traveler group yet. Start with traveler setup.".to_string()),
                NavAction::Stay,
            ));
        }

        let country = context
            .get::<Destination>(session_keys::DESTINATION)
            .await
            .map(|d| d.country_code)
            .unwrap_or_else(|| "xx".to_string());
        let reference = context
            .get::<PaymentRecord>(session_keys::PAYMENT)
            .await
            .map(|p| p.reference)
            .unwrap_or_else(|| "UNPAID".to_string());

        let mut response = String::from("Entry certificates issued:\n");
        for traveler in &group {
            let payload = utils::qr_payload(traveler, &country, &reference);
            let _ = writeln!(
                response,
                "- {}: {}",
                traveler.display_name(),
                utils::qr_code_url(&payload)
            );
        }

        let status = format!("entry certificates issued for {} traveler(s)", group.len());
        info!("{status}");

        Ok(ScreenResult::new_with_status(
            Some(response),
            NavAction::End,
            Some(status),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Traveler;

    #[tokio::test]
    async fn issues_one_certificate_per_traveler_and_ends_the_flow() {
        let context = Context::new();
        let mut group = vec![Traveler::new(false), Traveler::new(false)];
        group[0].personal_details.passport_number = "AA111".to_string();
        group[1].personal_details.passport_number = "BB222".to_string();
        utils::save_travelers(&context, &group).await;
        context
            .set(
                session_keys::DESTINATION,
                Destination {
                    country_code: "jp".to_string(),
                    flag_url: utils::flag_url("jp"),
                },
            )
            .await;

        let result = QrCodeScreen.run(context.clone()).await.unwrap();
        assert!(matches!(result.next, NavAction::End));

        let body = result.response.unwrap();
        assert_eq!(body.matches("api.qrserver.com").count(), 2);
        assert!(body.contains("AA111"));
        assert!(body.contains("BB222"));
        // No payment was made in this session; the certificate says so.
        assert!(body.contains("UNPAID"));
    }

    #[tokio::test]
    async fn back_returns_instead_of_issuing() {
        let context = Context::new();
        utils::save_travelers(&context, &[Traveler::new(false)]).await;
        context.set(session_keys::USER_INPUT, "back").await;

        let result = QrCodeScreen.run(context.clone()).await.unwrap();
        assert!(matches!(result.next, NavAction::Back));
    }
}
