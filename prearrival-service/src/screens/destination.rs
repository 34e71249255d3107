use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;
use wizard_flow::{Context, NavAction, Result, Screen, ScreenResult};

use super::types::{Destination, pages, session_keys};
use super::utils::{self, Submission};

#[derive(Debug, Deserialize)]
struct DestinationForm {
    country: String,
}

/// Destination country selection. Re-selecting a country later never touches
/// the traveler records; the flow's edges route past traveler setup when a
/// group already exists.
pub struct DestinationScreen;

const PROMPT: &str = r#"Select your destination country: {"country": "<ISO alpha-2 code>"}"#;

#[async_trait]
impl Screen for DestinationScreen {
    fn id(&self) -> &str {
        pages::DESTINATION
    }

    async fn run(&self, context: Context) -> Result<ScreenResult> {
        info!("running screen: {}", self.id());

        match utils::submission::<DestinationForm>(&context).await {
            Submission::Back => Ok(ScreenResult::new(
                Some("Returning to the previous page".to_string()),
                NavAction::Back,
            )),
            Submission::Navigate(page) => Ok(ScreenResult::new(None, NavAction::GoTo(page))),
            Submission::Empty => Ok(ScreenResult::new(
                Some(PROMPT.to_string()),
                NavAction::Stay,
            )),
            Submission::Invalid(_) => Ok(ScreenResult::new(
                Some(format!("That was not a country selection. {PROMPT}")),
                NavAction::Stay,
            )),
            Submission::Form(form) => {
                let code = form.country.trim().to_lowercase();
                if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Ok(ScreenResult::new(
                        Some(format!("'{}' is not an ISO alpha-2 code. {PROMPT}", form.country)),
                        NavAction::Stay,
                    ));
                }

                let destination = Destination {
                    flag_url: utils::flag_url(&code),
                    country_code: code.clone(),
                };
                context.set(session_keys::DESTINATION, &destination).await;

                let status = format!("destination selected: {code}");
                info!("{status}");

                Ok(ScreenResult::new_with_status(
                    Some(format!(
                        "Destination set to '{code}' (flag: {})",
                        destination.flag_url
                    )),
                    NavAction::Continue,
                    Some(status),
                ))
            }
        }
    }
}
