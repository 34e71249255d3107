use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;
use wizard_flow::{Context, NavAction, Result, Screen, ScreenResult};

use crate::model::{MAX_TRAVELERS, Traveler};

use super::types::pages;
use super::utils::{self, Submission};

#[derive(Debug, Deserialize)]
struct TravelerSetupForm {
    count: usize,
    /// Optional minor markers, positional; missing entries default to adult.
    #[serde(default)]
    minors: Vec<bool>,
}

/// Party size selection: creates the group's traveler records.
pub struct TravelerSetupScreen;

const PROMPT: &str =
    r#"How many travelers are in your group (1-5)? {"count": <n>, "minors": [<bool>, ...]}"#;

#[async_trait]
impl Screen for TravelerSetupScreen {
    fn id(&self) -> &str {
        pages::TRAVELER_SETUP
    }

    async fn run(&self, context: Context) -> Result<ScreenResult> {
        info!("running screen: {}", self.id());

        match utils::submission::<TravelerSetupForm>(&context).await {
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
                Some(format!("That was not a party size. {PROMPT}")),
                NavAction::Stay,
            )),
            Submission::Form(form) => {
                if form.count == 0 || form.count > MAX_TRAVELERS {
                    return Ok(ScreenResult::new(
                        Some(format!(
                            "A travel group has between 1 and {MAX_TRAVELERS} travelers. {PROMPT}"
                        )),
                        NavAction::Stay,
                    ));
                }

                let group: Vec<Traveler> = (0..form.count)
                    .map(|i| Traveler::new(form.minors.get(i).copied().unwrap_or(false)))
                    .collect();
                let minors = group.iter().filter(|t| t.is_minor).count();
                utils::save_travelers(&context, &group).await;

                let status = format!("traveler group created: {} ({minors} minors)", form.count);
                info!("{status}");

                Ok(ScreenResult::new_with_status(
                    Some(format!(
                        "Created {} traveler record(s). Continuing to document upload.",
                        form.count
                    )),
                    NavAction::Continue,
                    Some(status),
                ))
            }
        }
    }
}
