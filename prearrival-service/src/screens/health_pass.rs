use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;
use wizard_flow::{Advance, Context, NavAction, Result, Retreat, Screen, ScreenResult, Wizard};

use crate::model::{HealthPassDetails, Traveler};

use super::types::pages;
use super::utils::{self, Submission};

const STEPS: usize = 2;

#[derive(Debug, Deserialize)]
struct HealthForm {
    has_symptoms: bool,
    vaccinated: bool,
    #[serde(default)]
    vaccine_type: String,
}

#[derive(Debug, Deserialize)]
struct HealthConfirmationForm {
    #[serde(default)]
    confirmed: bool,
}

/// Per-traveler health pass: the questionnaire, then a confirmation that the
/// answers are accurate. Only the confirmation sets the health flag.
pub struct HealthPassScreen;

fn prompt(group: &[Traveler], cursor: wizard_flow::WizardCursor) -> String {
    let example = match cursor.step {
        1 => r#"{"has_symptoms": false, "vaccinated": true, "vaccine_type": "..."}"#,
        _ => r#"{"confirmed": true}"#,
    };
    let label = match cursor.step {
        1 => "health questionnaire",
        _ => "health confirmation (the answers above are accurate)",
    };
    format!(
        "Traveler {}/{} ({}): {label} - {example}",
        cursor.record + 1,
        group.len(),
        group[cursor.record].display_name(),
    )
}

#[async_trait]
impl Screen for HealthPassScreen {
    fn id(&self) -> &str {
        pages::HEALTH_PASS
    }

    async fn run(&self, context: Context) -> Result<ScreenResult> {
        info!("running screen: {}", self.id());

        let wizard = Wizard::new(self.id(), STEPS);
        let mut group = utils::travelers(&context).await;
        if group.is_empty() {
            return Ok(ScreenResult::new(
                Some("No traveler group yet. Start with traveler setup.".to_string()),
                NavAction::Stay,
            ));
        }
        let cursor = utils::wizard_position(&wizard, &context, group.len()).await;

        match utils::submission::<serde_json::Value>(&context).await {
            Submission::Back => match wizard.retreat(&context).await {
                Retreat::Step(_) => {
                    let cursor = wizard.cursor(&context).await;
                    Ok(ScreenResult::new(Some(prompt(&group, cursor)), NavAction::Stay))
                }
                Retreat::Exit => Ok(ScreenResult::new(
                    Some("Returning to the previous page".to_string()),
                    NavAction::Back,
                )),
            },
            Submission::Navigate(page) => Ok(ScreenResult::new(None, NavAction::GoTo(page))),
            Submission::Empty | Submission::Invalid(_) => {
                Ok(ScreenResult::new(Some(prompt(&group, cursor)), NavAction::Stay))
            }
            Submission::Form(value) if cursor.step == 1 => {
                let form: HealthForm = match serde_json::from_value(value) {
                    Ok(form) => form,
                    Err(_) => {
                        return Ok(ScreenResult::new(
                            Some(prompt(&group, cursor)),
                            NavAction::Stay,
                        ));
                    }
                };

                group[cursor.record].health_pass_details = Some(HealthPassDetails {
                    has_symptoms: form.has_symptoms,
                    vaccinated: form.vaccinated,
                    vaccine_type: form.vaccine_type,
                });
                utils::save_travelers(&context, &group).await;

                wizard.advance(&context, group.len()).await;
                let cursor = wizard.cursor(&context).await;
                Ok(ScreenResult::new(Some(prompt(&group, cursor)), NavAction::Stay))
            }
            Submission::Form(value) => {
                let form: HealthConfirmationForm = serde_json::from_value(value)
                    .unwrap_or(HealthConfirmationForm { confirmed: false });
                if !form.confirmed {
                    return Ok(ScreenResult::new(
                        Some(format!(
                            "The health answers must be confirmed to continue. {}",
                            prompt(&group, cursor)
                        )),
                        NavAction::Stay,
                    ));
                }

                group[cursor.record].entry_requirements.health = true;
                utils::save_travelers(&context, &group).await;

                match wizard.advance(&context, group.len()).await {
                    Advance::Step(_) | Advance::NextRecord(_) => {
                        let cursor = wizard.cursor(&context).await;
                        Ok(ScreenResult::new(Some(prompt(&group, cursor)), NavAction::Stay))
                    }
                    Advance::Finished => {
                        let status =
                            format!("health passes completed for {} traveler(s)", group.len());
                        info!("{status}");
                        Ok(ScreenResult::new_with_status(
                            Some("Health passes complete. Continuing to insurance.".to_string()),
                            NavAction::Continue,
                            Some(status),
                        ))
                    }
                }
            }
        }
    }
}
