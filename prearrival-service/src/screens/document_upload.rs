use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;
use wizard_flow::{Advance, Context, NavAction, Result, Retreat, Screen, ScreenResult, Wizard};

use crate::model::Traveler;

use super::types::pages;
use super::utils::{self, Submission};

const STEPS: usize = 3;

#[derive(Debug, Deserialize)]
struct DocumentUploadForm {
    uploaded: bool,
    #[serde(default)]
    #[allow(dead_code)]
    file_name: Option<String>,
}

/// Per-traveler document upload: passport, flight ticket, accommodation
/// proof, one sub-step each. The upload itself is simulated; only the
/// completion flag is recorded, and details are typed in at the
/// information-confirmation page.
pub struct DocumentUploadScreen;

fn document_name(step: usize) -> &'static str {
    match step {
        1 => "passport",
        2 => "flight ticket",
        _ => "accommodation proof",
    }
}

fn prompt(group: &[Traveler], cursor: wizard_flow::WizardCursor) -> String {
    format!(
        r#"Traveler {}/{} ({}): upload your {} - {{"uploaded": true}}"#,
        cursor.record + 1,
        group.len(),
        group[cursor.record].display_name(),
        document_name(cursor.step),
    )
}

#[async_trait]
impl Screen for DocumentUploadScreen {
    fn id(&self) -> &str {
        pages::DOCUMENT_UPLOAD
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

        match utils::submission::<DocumentUploadForm>(&context).await {
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
                if !form.uploaded {
                    return Ok(ScreenResult::new(
                        Some(format!(
                            "The {} is required before continuing. {}",
                            document_name(cursor.step),
                            prompt(&group, cursor)
                        )),
                        NavAction::Stay,
                    ));
                }

                {
                    let documents = &mut group[cursor.record].documents;
                    match cursor.step {
                        1 => documents.passport = true,
                        2 => documents.flight = true,
                        _ => documents.accommodation = true,
                    }
                }
                utils::save_travelers(&context, &group).await;

                match wizard.advance(&context, group.len()).await {
                    Advance::Step(_) | Advance::NextRecord(_) => {
                        let cursor = wizard.cursor(&context).await;
                        Ok(ScreenResult::new(Some(prompt(&group, cursor)), NavAction::Stay))
                    }
                    Advance::Finished => {
                        let status = format!(
                            "all travel documents recorded for {} traveler(s)",
                            group.len()
                        );
                        info!("{status}");
                        Ok(ScreenResult::new_with_status(
                            Some("All documents recorded. Continuing to information confirmation.".to_string()),
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

    async fn seeded_context(count: usize) -> Context {
        let context = Context::new();
        let group: Vec<Traveler> = (0..count).map(|_| Traveler::new(false)).collect();
        utils::save_travelers(&context, &group).await;
        context
    }

    async fn submit(context: &Context, input: &str) -> ScreenResult {
        context.set(session_keys::USER_INPUT, input).await;
        DocumentUploadScreen.run(context.clone()).await.unwrap()
    }

    #[tokio::test]
    async fn all_uploads_set_every_travelers_document_flags_before_navigating() {
        let context = seeded_context(2).await;

        let mut last = None;
        for _ in 0..(2 * STEPS) {
            last = Some(submit(&context, r#"{"uploaded": true}"#).await);
        }

        let result = last.unwrap();
        assert!(matches!(result.next, NavAction::Continue));

        let group = utils::travelers(&context).await;
        assert!(group.iter().all(|t| t.documents.complete()));
    }

    #[tokio::test]
    async fn declined_upload_does_not_set_a_flag() {
        let context = seeded_context(1).await;
        let result = submit(&context, r#"{"uploaded": false}"#).await;
        assert!(matches!(result.next, NavAction::Stay));

        let group = utils::travelers(&context).await;
        assert_eq!(group[0].documents.completed_count(), 0);
    }

    #[tokio::test]
    async fn back_on_first_sub_step_leaves_the_page() {
        let context = seeded_context(1).await;
        let result = submit(&context, "back").await;
        assert!(matches!(result.next, NavAction::Back));

        // After one upload we are on sub-step 2; back stays on the page.
        submit(&context, r#"{"uploaded": true}"#).await;
        let result = submit(&context, "back").await;
        assert!(matches!(result.next, NavAction::Stay));
    }

    #[tokio::test]
    async fn second_traveler_starts_on_first_sub_step() {
        let context = seeded_context(2).await;
        for _ in 0..STEPS {
            submit(&context, r#"{"uploaded": true}"#).await;
        }

        let wizard = Wizard::new(pages::DOCUMENT_UPLOAD, STEPS);
        let cursor = wizard.cursor(&context).await;
        assert_eq!(cursor.record, 1);
        assert_eq!(cursor.step, 1);

        let group = utils::travelers(&context).await;
        assert!(group[0].documents.complete());
        assert_eq!(group[1].documents.completed_count(), 0);
    }
}
