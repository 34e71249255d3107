use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Context keys shared across screens.
pub mod session_keys {
    pub const USER_INPUT: &str = "user_input";
    pub const TRAVELERS: &str = "travelers";
    pub const DESTINATION: &str = "destination";
    pub const PAYMENT: &str = "payment";
}

/// Page tags the router dispatches on.
pub mod pages {
    pub const DESTINATION: &str = "destination";
    pub const TRAVELER_SETUP: &str = "traveler_setup";
    pub const DOCUMENT_UPLOAD: &str = "document_upload";
    pub const INFORMATION_CONFIRMATION: &str = "information_confirmation";
    pub const VISA_APPLICATION: &str = "visa_application";
    pub const CUSTOMS_DECLARATION: &str = "customs_declaration";
    pub const HEALTH_PASS: &str = "health_pass";
    pub const INSURANCE: &str = "insurance";
    pub const ARRIVAL_TAX: &str = "arrival_tax";
    pub const PAYMENT: &str = "payment";
    pub const QR_CODE: &str = "qr_code";
    pub const BORDER_CONTROL: &str = "border_control";
}

/// Selected destination country.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    /// Lowercase ISO 3166-1 alpha-2 code.
    pub country_code: String,
    /// Opaque flag-image URL for display.
    pub flag_url: String,
}

/// Record of the group's simulated arrival-tax payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub reference: String,
    pub method: String,
    pub amount_cents: u64,
    pub paid_at: DateTime<Utc>,
}
