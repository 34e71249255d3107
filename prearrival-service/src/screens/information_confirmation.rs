use async_trait::async_trait;
use tracing::info;
use wizard_flow::{Advance, Context, NavAction, Result, Retreat, Screen, ScreenResult, Wizard};

use crate::model::{
    AccommodationDetails, ContactDetails, DepartureDetails, PersonalDetails, Traveler,
};

use super::types::pages;
use super::utils::{self, Submission};

const STEPS: usize = 4;

/// Per-traveler review and entry of the four detail blocks: personal,
/// departure, accommodation, contact. Uploaded documents are not parsed
/// (no OCR); everything is typed in here.
pub struct InformationConfirmationScreen;

fn block_name(step: usize) -> &'static str {
    match step {
        1 => "personal details",
        2 => "departure details",
        3 => "accommodation details",
        _ => "contact details",
    }
}

fn prompt(group: &[Traveler], cursor: wizard_flow::WizardCursor) -> String {
    let example = match cursor.step {
        1 => r#"{"first_name": "...", "last_name": "...", "passport_number": "...", "nationality": "...", "date_of_birth": "1990-05-01", "arrival_date": "2026-09-12", "flight_number": "..."}"#,
        2 => r#"{"departure_country": "...", "departure_city": "...", "departure_date": "2026-09-12", "return_date": "2026-09-26"}"#,
        3 => r#"{"name": "...", "address": "...", "city": "...", "postal_code": "...", "booking_reference": "..."}"#,
        _ => r#"{"email": "...", "phone": "...", "emergency_contact_name": "...", "emergency_contact_phone": "..."}"#,
    };
    format!(
        "Traveler {}/{} ({}): confirm your {} - {example}",
        cursor.record + 1,
        group.len(),
        group[cursor.record].display_name(),
        block_name(cursor.step),
    )
}

/// Apply one block's form to the traveler. Returns guidance when a required
/// field is missing, leaving the record untouched.
fn apply_block(
    traveler: &mut Traveler,
    step: usize,
    value: serde_json::Value,
) -> std::result::Result<(), String> {
    match step {
        1 => {
            let details: PersonalDetails =
                serde_json::from_value(value).map_err(|e| e.to_string())?;
            if details.first_name.trim().is_empty()
                || details.last_name.trim().is_empty()
                || details.passport_number.trim().is_empty()
            {
                return Err("first name, last name and passport number are required".to_string());
            }
            traveler.personal_details = details;
        }
        2 => {
            traveler.departure_details =
                serde_json::from_value::<DepartureDetails>(value).map_err(|e| e.to_string())?;
        }
        3 => {
            traveler.accommodation_details =
                serde_json::from_value::<AccommodationDetails>(value).map_err(|e| e.to_string())?;
        }
        _ => {
            let details: ContactDetails =
                serde_json::from_value(value).map_err(|e| e.to_string())?;
            if details.email.trim().is_empty() {
                return Err("a contact email is required".to_string());
            }
            traveler.contact_details = details;
        }
    }
    Ok(())
}

#[async_trait]
impl Screen for InformationConfirmationScreen {
    fn id(&self) -> &str {
        pages::INFORMATION_CONFIRMATION
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
            Submission::Form(value) => {
                if let Err(reason) = apply_block(&mut group[cursor.record], cursor.step, value) {
                    return Ok(ScreenResult::new(
                        Some(format!("{reason}. {}", prompt(&group, cursor))),
                        NavAction::Stay,
                    ));
                }
                utils::save_travelers(&context, &group).await;

                match wizard.advance(&context, group.len()).await {
                    Advance::Step(_) | Advance::NextRecord(_) => {
                        let cursor = wizard.cursor(&context).await;
                        Ok(ScreenResult::new(Some(prompt(&group, cursor)), NavAction::Stay))
                    }
                    Advance::Finished => {
                        let status = format!(
                            "information confirmed for {} traveler(s)",
                            group.len()
                        );
                        info!("{status}");
                        Ok(ScreenResult::new_with_status(
                            Some("All traveler information confirmed. Continuing to the visa application.".to_string()),
                            NavAction::Continue,
                            Some(status),
                        ))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::types::session_keys;

    const PERSONAL: &str = r#"{"first_name": "Mina", "last_name": "Okafor", "passport_number": "P1234567", "nationality": "NG", "date_of_birth": "1991-02-11"}"#;
    const DEPARTURE: &str = r#"{"departure_country": "NG", "departure_city": "Lagos", "departure_date": "2026-09-12"}"#;
    const ACCOMMODATION: &str = r#"{"name": "Hotel Aster", "city": "Tokyo", "booking_reference": "BK-77"}"#;
    const CONTACT: &str = r#"{"email": "mina@example.com", "phone": "+2348000000"}"#;

    async fn seeded_context(count: usize) -> Context {
        let context = Context::new();
        let group: Vec<Traveler> = (0..count).map(|_| Traveler::new(false)).collect();
        utils::save_travelers(&context, &group).await;
        context
    }

    async fn submit(context: &Context, input: &str) -> ScreenResult {
        context.set(session_keys::USER_INPUT, input).await;
        InformationConfirmationScreen
            .run(context.clone())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn four_blocks_fill_the_record_then_navigate_on() {
        let context = seeded_context(1).await;

        submit(&context, PERSONAL).await;
        submit(&context, DEPARTURE).await;
        submit(&context, ACCOMMODATION).await;
        let result = submit(&context, CONTACT).await;
        assert!(matches!(result.next, NavAction::Continue));

        let group = utils::travelers(&context).await;
        let t = &group[0];
        assert_eq!(t.personal_details.first_name, "Mina");
        assert_eq!(t.departure_details.departure_city, "Lagos");
        assert_eq!(t.accommodation_details.booking_reference, "BK-77");
        assert_eq!(t.contact_details.email, "mina@example.com");
        assert_eq!(t.display_name(), "Mina Okafor");
    }

    #[tokio::test]
    async fn missing_required_fields_hold_the_sub_step() {
        let context = seeded_context(1).await;
        let result = submit(&context, r#"{"first_name": "Mina"}"#).await;
        assert!(matches!(result.next, NavAction::Stay));

        let group = utils::travelers(&context).await;
        assert!(group[0].personal_details.first_name.is_empty());
    }

    #[tokio::test]
    async fn each_traveler_is_confirmed_in_turn() {
        let context = seeded_context(2).await;

        for _ in 0..2 {
            submit(&context, PERSONAL).await;
            submit(&context, DEPARTURE).await;
            submit(&context, ACCOMMODATION).await;
            submit(&context, CONTACT).await;
        }

        let group = utils::travelers(&context).await;
        assert!(
            group
                .iter()
                .all(|t| t.contact_details.email == "mina@example.com")
        );
    }
}
