use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;
use wizard_flow::{Advance, Context, NavAction, Result, Retreat, Screen, ScreenResult, Wizard};

use crate::model::{CustomsDetails, Traveler};

use super::types::pages;
use super::utils::{self, Submission};

const STEPS: usize = 2;

#[derive(Debug, Deserialize)]
struct CustomsForm {
    carrying_restricted_goods: bool,
    #[serde(default)]
    goods_description: String,
    #[serde(default)]
    currency_over_limit: bool,
    #[serde(default)]
    declared_value: f64,
}

#[derive(Debug, Deserialize)]
struct CustomsConfirmationForm {
    #[serde(default)]
    declared: bool,
}

/// Per-traveler customs declaration: the goods questionnaire, then a
/// truthfulness confirmation that gates the customs requirement flag.
pub struct CustomsDeclarationScreen;

fn prompt(group: &[Traveler], cursor: wizard_flow::WizardCursor) -> String {
    let example = match cursor.step {
        1 => {
            r#"{"carrying_restricted_goods": false, "goods_description": "", "currency_over_limit": false, "declared_value": 0}"#
        }
        _ => r#"{"declared": true}"#,
    };
    let label = match cursor.step {
        1 => "customs declaration",
        _ => "customs confirmation (I declare the above is accurate)",
    };
    format!(
        "Traveler {}/{} ({}): {label} - {example}",
        cursor.record + 1,
        group.len(),
        group[cursor.record].display_name(),
    )
}

#[async_trait]
impl Screen for CustomsDeclarationScreen {
    fn id(&self) -> &str {
        pages::CUSTOMS_DECLARATION
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
                let form: CustomsForm = match serde_json::from_value(value) {
                    Ok(form) => form,
                    Err(_) => {
                        return Ok(ScreenResult::new(
                            Some(prompt(&group, cursor)),
                            NavAction::Stay,
                        ));
                    }
                };
                if form.carrying_restricted_goods && form.goods_description.trim().is_empty() {
                    return Ok(ScreenResult::new(
                        Some(format!(
                            "Restricted goods must be described. {}",
                            prompt(&group, cursor)
                        )),
                        NavAction::Stay,
                    ));
                }

                group[cursor.record].customs_details = Some(CustomsDetails {
                    carrying_restricted_goods: form.carrying_restricted_goods,
                    goods_description: form.goods_description,
                    currency_over_limit: form.currency_over_limit,
                    declared_value: form.declared_value,
                });
                utils::save_travelers(&context, &group).await;

                wizard.advance(&context, group.len()).await;
                let cursor = wizard.cursor(&context).await;
                Ok(ScreenResult::new(Some(prompt(&group, cursor)), NavAction::Stay))
            }
            Submission::Form(value) => {
                let form: CustomsConfirmationForm = serde_json::from_value(value)
                    .unwrap_or(CustomsConfirmationForm { declared: false });
                if !form.declared {
                    return Ok(ScreenResult::new(
                        Some(format!(
                            "The declaration must be confirmed to continue. {}",
                            prompt(&group, cursor)
                        )),
                        NavAction::Stay,
                    ));
                }

                group[cursor.record].entry_requirements.customs = true;
                utils::save_travelers(&context, &group).await;

                match wizard.advance(&context, group.len()).await {
                    Advance::Step(_) | Advance::NextRecord(_) => {
                        let cursor = wizard.cursor(&context).await;
                        Ok(ScreenResult::new(Some(prompt(&group, cursor)), NavAction::Stay))
                    }
                    Advance::Finished => {
                        let status = format!(
                            "customs declarations completed for {} traveler(s)",
                            group.len()
                        );
                        info!("{status}");
                        Ok(ScreenResult::new_with_status(
                            Some("Customs declarations complete. Continuing to the health pass.".to_string()),
                            NavAction::Continue,
                            Some(status),
                        ))
                    }
                }
            }
        }
    }
}
