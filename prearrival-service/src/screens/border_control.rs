use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Write as _;
use tracing::info;
use wizard_flow::{Context, NavAction, Result, Screen, ScreenResult};

use crate::model::progress_percent;

use super::types::{Destination, pages, session_keys};
use super::utils::{self, Submission};

#[derive(Debug, Deserialize)]
struct BorderControlForm {
    traveler: usize,
}

/// Simulated border-control viewer: the officer's read-only view of one
/// traveler's record. Reachable only by an explicit jump; never part of the
/// forward flow.
pub struct BorderControlScreen;

fn mark(flag: bool) -> &'static str {
    if flag { "yes" } else { "NO" }
}

#[async_trait]
impl Screen for BorderControlScreen {
    fn id(&self) -> &str {
        pages::BORDER_CONTROL
    }

    async fn run(&self, context: Context) -> Result<ScreenResult> {
        info!("running screen: {}", self.id());

        let group = utils::travelers(&context).await;
        let prompt = format!(
            r#"Border control: inspect a traveler with {{"traveler": <0-{}>}}"#,
            group.len().saturating_sub(1)
        );

        match utils::submission::<BorderControlForm>(&context).await {
            Submission::Back => Ok(ScreenResult::new(
                Some("Returning to the previous page".to_string()),
                NavAction::Back,
            )),
            Submission::Navigate(page) => Ok(ScreenResult::new(None, NavAction::GoTo(page))),
            Submission::Empty | Submission::Invalid(_) => {
                Ok(ScreenResult::new(Some(prompt), NavAction::Stay))
            }
            Submission::Form(form) => {
                let Some(traveler) = group.get(form.traveler) else {
                    return Ok(ScreenResult::new(
                        Some(format!("No traveler at index {}. {prompt}", form.traveler)),
                        NavAction::Stay,
                    ));
                };

                let destination = context
                    .get::<Destination>(session_keys::DESTINATION)
                    .await
                    .map(|d| d.country_code)
                    .unwrap_or_else(|| "unknown".to_string());

                let requirements = &traveler.entry_requirements;
                let mut view = String::new();
                let _ = writeln!(view, "=== BORDER CONTROL - {} ===", destination);
                let _ = writeln!(
                    view,
                    "{} | passport {} | nationality {} | minor: {}",
                    traveler.display_name(),
                    traveler.personal_details.passport_number,
                    traveler.personal_details.nationality,
                    traveler.is_minor
                );
                let _ = writeln!(
                    view,
                    "documents: passport {} / flight {} / accommodation {}",
                    mark(traveler.documents.passport),
                    mark(traveler.documents.flight),
                    mark(traveler.documents.accommodation)
                );
                let _ = writeln!(
                    view,
                    "requirements: visa {} / customs {} / health {} / insurance {} / tax {}",
                    mark(requirements.visa),
                    mark(requirements.customs),
                    mark(requirements.health),
                    mark(requirements.insurance),
                    mark(requirements.tax)
                );
                let cleared = traveler.documents.complete() && requirements.complete();
                let _ = writeln!(
                    view,
                    "status: {}",
                    if cleared {
                        "CLEARED FOR ENTRY"
                    } else {
                        "DOCUMENTATION INCOMPLETE"
                    }
                );
                let _ = writeln!(view, "group progress: {}%", progress_percent(&group));

                Ok(ScreenResult::new(Some(view), NavAction::Stay))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Traveler;

    #[tokio::test]
    async fn renders_a_travelers_requirement_status() {
        let context = Context::new();
        let mut group = vec![Traveler::new(false)];
        group[0].personal_details.first_name = "Ada".to_string();
        group[0].personal_details.last_name = "Udo".to_string();
        group[0].entry_requirements.visa = true;
        utils::save_travelers(&context, &group).await;

        context
            .set(session_keys::USER_INPUT, r#"{"traveler": 0}"#)
            .await;
        let result = BorderControlScreen.run(context.clone()).await.unwrap();
        assert!(matches!(result.next, NavAction::Stay));

        let view = result.response.unwrap();
        assert!(view.contains("Ada Udo"));
        assert!(view.contains("visa yes"));
        assert!(view.contains("customs NO"));
        assert!(view.contains("DOCUMENTATION INCOMPLETE"));
    }

    #[tokio::test]
    async fn out_of_range_index_is_guidance_not_an_error() {
        let context = Context::new();
        utils::save_travelers(&context, &[Traveler::new(false)]).await;

        context
            .set(session_keys::USER_INPUT, r#"{"traveler": 4}"#)
            .await;
        let result = BorderControlScreen.run(context.clone()).await.unwrap();
        assert!(matches!(result.next, NavAction::Stay));
        assert!(result.response.unwrap().contains("No traveler at index 4"));
    }
}
