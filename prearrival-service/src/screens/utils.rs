use serde::Deserialize;
use serde::de::DeserializeOwned;
use wizard_flow::Context;

use crate::model::Traveler;

use super::types::session_keys;

/// What the client sent for the current page.
#[derive(Debug)]
pub enum Submission<T> {
    /// The literal `back` command.
    Back,
    /// A `{"navigate": "<page>"}` jump request.
    Navigate(String),
    /// The page's own form.
    Form(T),
    /// No input on this request (e.g. first visit after a jump).
    Empty,
    /// Input that parsed as neither a command nor the form.
    Invalid(String),
}

#[derive(Debug, Deserialize)]
struct NavigateCommand {
    navigate: Option<String>,
}

/// Interpret the raw user input for the current screen. `back` and
/// `{"navigate": …}` work on every page; anything else is parsed as `T`.
pub async fn submission<T: DeserializeOwned>(context: &Context) -> Submission<T> {
    let Some(raw) = context.get::<String>(session_keys::USER_INPUT).await else {
        return Submission::Empty;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Submission::Empty;
    }
    if trimmed.eq_ignore_ascii_case("back") {
        return Submission::Back;
    }
    if let Ok(command) = serde_json::from_str::<NavigateCommand>(trimmed) {
        if let Some(page) = command.navigate {
            return Submission::Navigate(page);
        }
    }
    match serde_json::from_str::<T>(trimmed) {
        Ok(form) => Submission::Form(form),
        Err(e) => Submission::Invalid(e.to_string()),
    }
}

/// The group's traveler records, empty until traveler setup has run.
pub async fn travelers(context: &Context) -> Vec<Traveler> {
    context
        .get(session_keys::TRAVELERS)
        .await
        .unwrap_or_default()
}

pub async fn save_travelers(context: &Context, travelers: &[Traveler]) {
    context.set(session_keys::TRAVELERS, travelers).await;
}

/// Current cursor for a wizard page, restarted if the traveler group shrank
/// underneath it (re-running traveler setup mid-flow).
pub async fn wizard_position(
    wizard: &wizard_flow::Wizard,
    context: &Context,
    record_count: usize,
) -> wizard_flow::WizardCursor {
    let cursor = wizard.cursor(context).await;
    if cursor.record >= record_count {
        wizard.reset(context).await;
        wizard_flow::WizardCursor::first()
    } else {
        cursor
    }
}

/// Flag image for a country, served by a public CDN. Treated as an opaque
/// URL; the response is never parsed.
pub fn flag_url(country_code: &str) -> String {
    format!("https://flagcdn.com/w320/{}.png", country_code.to_lowercase())
}

/// Simulated entry-certificate QR image for a payload string. Not a real
/// certificate: no signing, no verification, just a rendered image URL.
pub fn qr_code_url(payload: &str) -> String {
    format!(
        "https://api.qrserver.com/v1/create-qr-code/?size=200x200&data={payload}"
    )
}

/// Payload encoded into a traveler's entry-certificate QR image. Restricted
/// to URL-safe characters so the constructed URL needs no escaping.
pub fn qr_payload(traveler: &Traveler, country_code: &str, payment_reference: &str) -> String {
    let passport: String = traveler
        .personal_details
        .passport_number
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    format!(
        "{}.{}.{}.{}",
        traveler.id,
        passport,
        country_code.to_lowercase(),
        payment_reference
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn submission_recognizes_commands_and_forms() {
        #[derive(Debug, Deserialize)]
        struct Form {
            count: usize,
        }

        let context = Context::new();
        assert!(matches!(
            submission::<Form>(&context).await,
            Submission::Empty
        ));

        context.set(session_keys::USER_INPUT, "  BACK ").await;
        assert!(matches!(
            submission::<Form>(&context).await,
            Submission::Back
        ));

        context
            .set(session_keys::USER_INPUT, r#"{"navigate": "qr_code"}"#)
            .await;
        assert!(matches!(
            submission::<Form>(&context).await,
            Submission::Navigate(p) if p == "qr_code"
        ));

        context.set(session_keys::USER_INPUT, r#"{"count": 3}"#).await;
        assert!(matches!(
            submission::<Form>(&context).await,
            Submission::Form(f) if f.count == 3
        ));

        context.set(session_keys::USER_INPUT, "not json").await;
        assert!(matches!(
            submission::<Form>(&context).await,
            Submission::Invalid(_)
        ));
    }

    #[test]
    fn url_builders() {
        assert_eq!(flag_url("FR"), "https://flagcdn.com/w320/fr.png");
        assert!(qr_code_url("abc").starts_with("https://api.qrserver.com/"));

        let mut traveler = Traveler::new(false);
        traveler.personal_details.passport_number = "AB 12-34".to_string();
        let payload = qr_payload(&traveler, "JP", "PAY-1");
        assert!(payload.contains("AB1234"));
        assert!(payload.contains(".jp."));
        assert!(!payload.contains(' '));
    }
}
