use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;
use wizard_flow::{Advance, Context, NavAction, Result, Retreat, Screen, ScreenResult, Wizard};

use crate::model::Traveler;

use super::types::pages;
use super::utils::{self, Submission};

const STEPS: usize = 1;

#[derive(Debug, Deserialize)]
struct TaxAcknowledgementForm {
    #[serde(default)]
    acknowledged: bool,
}

/// Per-traveler arrival tax assessment: one acknowledgement sub-step each.
/// Minors are exempt (assessed 0) but still acknowledge, so the tax flag is
/// set uniformly across the group.
pub struct ArrivalTaxScreen;

fn prompt(group: &[Traveler], cursor: wizard_flow::WizardCursor) -> String {
    let traveler = &group[cursor.record];
    let cents = traveler.arrival_tax_cents();
    format!(
        r#"Traveler {}/{} ({}): arrival tax assessed at ${}.{:02}{} - acknowledge with {{"acknowledged": true}}"#,
        cursor.record + 1,
        group.len(),
        traveler.display_name(),
        cents / 100,
        cents % 100,
        if traveler.is_minor { " (minor, exempt)" } else { "" },
    )
}

#[async_trait]
impl Screen for ArrivalTaxScreen {
    fn id(&self) -> &str {
        pages::ARRIVAL_TAX
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

        match utils::submission::<TaxAcknowledgementForm>(&context).await {
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
            Submission::Form(form) => {
                if !form.acknowledged {
                    return Ok(ScreenResult::new(
                        Some(format!(
                            "The assessment must be acknowledged to continue. {}",
                            prompt(&group, cursor)
                        )),
                        NavAction::Stay,
                    ));
                }

                group[cursor.record].entry_requirements.tax = true;
                utils::save_travelers(&context, &group).await;

                match wizard.advance(&context, group.len()).await {
                    Advance::Step(_) | Advance::NextRecord(_) => {
                        let cursor = wizard.cursor(&context).await;
                        Ok(ScreenResult::new(Some(prompt(&group, cursor)), NavAction::Stay))
                    }
                    Advance::Finished => {
                        let total: u64 = group.iter().map(Traveler::arrival_tax_cents).sum();
                        let status = format!(
                            "arrival tax acknowledged, group total ${}.{:02}",
                            total / 100,
                            total % 100
                        );
                        info!("{status}");
                        Ok(ScreenResult::new_with_status(
                            Some(format!(
                                "Arrival tax acknowledged for the whole group (total ${}.{:02}). Continuing to payment.",
                                total / 100,
                                total % 100
                            )),
                            NavAction::Continue,
                            Some(status),
                        ))
                    }
                }
            }
        }
    }
}
