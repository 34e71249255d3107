// Pre-arrival documentation flow screens
pub mod arrival_tax;
pub mod border_control;
pub mod customs_declaration;
pub mod destination;
pub mod document_upload;
pub mod health_pass;
pub mod information_confirmation;
pub mod insurance;
pub mod payment;
pub mod qr_code;
pub mod traveler_setup;
pub mod visa_application;

// Shared modules
pub mod types;
pub mod utils;

// Re-export screen implementations
pub use arrival_tax::ArrivalTaxScreen;
pub use border_control::BorderControlScreen;
pub use customs_declaration::CustomsDeclarationScreen;
pub use destination::DestinationScreen;
pub use document_upload::DocumentUploadScreen;
pub use health_pass::HealthPassScreen;
pub use information_confirmation::InformationConfirmationScreen;
pub use insurance::InsuranceScreen;
pub use payment::PaymentScreen;
pub use qr_code::QrCodeScreen;
pub use traveler_setup::TravelerSetupScreen;
pub use visa_application::VisaApplicationScreen;

// Re-export page tags and session keys
pub use types::{pages, session_keys};
