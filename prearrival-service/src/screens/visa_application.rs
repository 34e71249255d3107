use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;
use wizard_flow::{Advance, Context, NavAction, Result, Retreat, Screen, ScreenResult, Wizard};

use crate::model::{Traveler, VisaDetails};

use super::types::pages;
use super::utils::{self, Submission};

const STEPS: usize = 2;

#[derive(Debug, Deserialize)]
struct VisaForm {
    purpose: String,
    duration_days: u32,
    #[serde(default)]
    entry_type: String,
}

#[derive(Debug, Deserialize)]
struct VisaDeclarationForm {
    #[serde(default)]
    agreed: bool,
}

/// Per-traveler visa application: the application form, then a declaration
/// that must be agreed before the visa requirement flag is set.
pub struct VisaApplicationScreen;

fn prompt(group: &[Traveler], cursor: wizard_flow::WizardCursor) -> String {
    let example = match cursor.step {
        1 => r#"{"purpose": "tourism", "duration_days": 14, "entry_type": "single"}"#,
        _ => r#"{"agreed": true}"#,
    };
    let label = match cursor.step {
        1 => "visa application",
        _ => "visa declaration (I confirm the application is truthful)",
    };
    format!(
        "Traveler {}/{} ({}): {label} - {example}",
        cursor.record + 1,
        group.len(),
        group[cursor.record].display_name(),
    )
}

#[async_trait]
impl Screen for VisaApplicationScreen {
    fn id(&self) -> &str {
        pages::VISA_APPLICATION
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
                let form: VisaForm = match serde_json::from_value(value) {
                    Ok(form) => form,
                    Err(_) => {
                        return Ok(ScreenResult::new(
                            Some(prompt(&group, cursor)),
                            NavAction::Stay,
                        ));
                    }
                };
                if form.purpose.trim().is_empty() || form.duration_days == 0 {
                    return Ok(ScreenResult::new(
                        Some(format!(
                            "A purpose and a stay of at least one day are required. {}",
                            prompt(&group, cursor)
                        )),
                        NavAction::Stay,
                    ));
                }

                let entry_type = if form.entry_type.trim().is_empty() {
                    "single".to_string()
                } else {
                    form.entry_type
                };
                group[cursor.record].visa_details = Some(VisaDetails {
                    purpose: form.purpose,
                    duration_days: form.duration_days,
                    entry_type,
                });
                utils::save_travelers(&context, &group).await;

                wizard.advance(&context, group.len()).await;
                let cursor = wizard.cursor(&context).await;
                Ok(ScreenResult::new(Some(prompt(&group, cursor)), NavAction::Stay))
            }
            Submission::Form(value) => {
                let form: VisaDeclarationForm =
                    serde_json::from_value(value).unwrap_or(VisaDeclarationForm { agreed: false });
                if !form.agreed {
                    // The requirement flag is only ever set on an affirmative
                    // declaration.
                    return Ok(ScreenResult::new(
                        Some(format!(
                            "The declaration must be agreed to continue. {}",
                            prompt(&group, cursor)
                        )),
                        NavAction::Stay,
                    ));
                }

                group[cursor.record].entry_requirements.visa = true;
                utils::save_travelers(&context, &group).await;

                match wizard.advance(&context, group.len()).await {
                    Advance::Step(_) | Advance::NextRecord(_) => {
                        let cursor = wizard.cursor(&context).await;
                        Ok(ScreenResult::new(Some(prompt(&group, cursor)), NavAction::Stay))
                    }
                    Advance::Finished => {
                        let status =
                            format!("visa applications completed for {} traveler(s)", group.len());
                        info!("{status}");
                        Ok(ScreenResult::new_with_status(
                            Some("Visa applications complete. Continuing to customs declaration.".to_string()),
                            NavAction::Continue,
                            Some(status),
                        ))
                    }
                }
            }
        }
    }
}
