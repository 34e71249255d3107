use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;
use wizard_flow::{Advance, Context, NavAction, Result, Retreat, Screen, ScreenResult, Wizard};

use crate::model::{InsuranceDetails, Traveler};

use super::types::pages;
use super::utils::{self, Submission};

const STEPS: usize = 2;

/// Coverage per plan, in cents.
fn plan_coverage_cents(plan: &str) -> Option<u64> {
    match plan {
        "basic" => Some(2_000_000),
        "standard" => Some(5_000_000),
        "premium" => Some(10_000_000),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct InsurancePlanForm {
    plan: String,
}

#[derive(Debug, Deserialize)]
struct InsuranceTermsForm {
    #[serde(default)]
    agreed: bool,
}

/// Per-traveler travel insurance: plan selection, then acceptance of the
/// policy terms. A policy number is issued on selection; the insurance flag
/// is set only when the terms are agreed.
pub struct InsuranceScreen;

fn prompt(group: &[Traveler], cursor: wizard_flow::WizardCursor) -> String {
    let example = match cursor.step {
        1 => r#"{"plan": "basic" | "standard" | "premium"}"#,
        _ => r#"{"agreed": true}"#,
    };
    let label = match cursor.step {
        1 => "insurance plan selection",
        _ => "insurance terms agreement",
    };
    format!(
        "Traveler {}/{} ({}): {label} - {example}",
        cursor.record + 1,
        group.len(),
        group[cursor.record].display_name(),
    )
}

#[async_trait]
impl Screen for InsuranceScreen {
    fn id(&self) -> &str {
        pages::INSURANCE
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
                let form: InsurancePlanForm = match serde_json::from_value(value) {
                    Ok(form) => form,
                    Err(_) => {
                        return Ok(ScreenResult::new(
                            Some(prompt(&group, cursor)),
                            NavAction::Stay,
                        ));
                    }
                };
                let plan = form.plan.trim().to_lowercase();
                let Some(coverage_cents) = plan_coverage_cents(&plan) else {
                    return Ok(ScreenResult::new(
                        Some(format!(
                            "'{}' is not an available plan. {}",
                            form.plan,
                            prompt(&group, cursor)
                        )),
                        NavAction::Stay,
                    ));
                };

                let policy_number = format!("POL-{:08X}", rand::random::<u32>());
                group[cursor.record].insurance_details = Some(InsuranceDetails {
                    plan,
                    policy_number,
                    coverage_cents,
                });
                utils::save_travelers(&context, &group).await;

                wizard.advance(&context, group.len()).await;
                let cursor = wizard.cursor(&context).await;
                Ok(ScreenResult::new(Some(prompt(&group, cursor)), NavAction::Stay))
            }
            Submission::Form(value) => {
                let form: InsuranceTermsForm =
                    serde_json::from_value(value).unwrap_or(InsuranceTermsForm { agreed: false });
                if !form.agreed {
                    return Ok(ScreenResult::new(
                        Some(format!(
                            "The policy terms must be agreed to continue. {}",
                            prompt(&group, cursor)
                        )),
                        NavAction::Stay,
                    ));
                }

                group[cursor.record].entry_requirements.insurance = true;
                utils::save_travelers(&context, &group).await;

                match wizard.advance(&context, group.len()).await {
                    Advance::Step(_) | Advance::NextRecord(_) => {
                        let cursor = wizard.cursor(&context).await;
                        Ok(ScreenResult::new(Some(prompt(&group, cursor)), NavAction::Stay))
                    }
                    Advance::Finished => {
                        let status =
                            format!("insurance issued for {} traveler(s)", group.len());
                        info!("{status}");
                        Ok(ScreenResult::new_with_status(
                            Some("Insurance issued for the whole group. Continuing to the arrival tax.".to_string()),
                            NavAction::Continue,
                            Some(status),
                        ))
                    }
                }
            }
        }
    }
}
