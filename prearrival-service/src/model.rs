//! Traveler records for one travel group.
//!
//! Everything here lives in the session context; nothing is persisted past
//! logout. A traveler accumulates 8 completion flags: 3 document flags plus 5
//! entry requirements. Overall progress is the share of true flags across the
//! whole group.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of completion flags tracked per traveler (3 documents + 5 entry
/// requirements).
pub const FLAGS_PER_TRAVELER: usize = 8;

/// Maximum party size per trip.
pub const MAX_TRAVELERS: usize = 5;

/// Arrival tax per adult traveler, in cents. Minors are exempt.
pub const ARRIVAL_TAX_CENTS: u64 = 2500;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalDetails {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub passport_number: String,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub arrival_date: Option<NaiveDate>,
    #[serde(default)]
    pub flight_number: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepartureDetails {
    #[serde(default)]
    pub departure_country: String,
    #[serde(default)]
    pub departure_city: String,
    #[serde(default)]
    pub departure_date: Option<NaiveDate>,
    #[serde(default)]
    pub return_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccommodationDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub booking_reference: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub emergency_contact_name: String,
    #[serde(default)]
    pub emergency_contact_phone: String,
}

/// Upload completion flags, one per required document.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DocumentChecklist {
    pub passport: bool,
    pub flight: bool,
    pub accommodation: bool,
}

impl DocumentChecklist {
    pub fn completed_count(&self) -> usize {
        [self.passport, self.flight, self.accommodation]
            .into_iter()
            .filter(|&f| f)
            .count()
    }

    pub fn complete(&self) -> bool {
        self.completed_count() == 3
    }
}

/// Gating booleans, one per entry requirement. Each is set true only after
/// the matching screen's confirmation was affirmatively checked.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EntryRequirements {
    pub visa: bool,
    pub customs: bool,
    pub health: bool,
    pub insurance: bool,
    pub tax: bool,
}

impl EntryRequirements {
    pub fn completed_count(&self) -> usize {
        [self.visa, self.customs, self.health, self.insurance, self.tax]
            .into_iter()
            .filter(|&f| f)
            .count()
    }

    pub fn complete(&self) -> bool {
        self.completed_count() == 5
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisaDetails {
    pub purpose: String,
    pub duration_days: u32,
    #[serde(default)]
    pub entry_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomsDetails {
    pub carrying_restricted_goods: bool,
    #[serde(default)]
    pub goods_description: String,
    #[serde(default)]
    pub currency_over_limit: bool,
    #[serde(default)]
    pub declared_value: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthPassDetails {
    pub has_symptoms: bool,
    pub vaccinated: bool,
    #[serde(default)]
    pub vaccine_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InsuranceDetails {
    pub plan: String,
    pub policy_number: String,
    pub coverage_cents: u64,
}

/// One person's full documentation record within a travel group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Traveler {
    pub id: Uuid,
    #[serde(default)]
    pub is_minor: bool,
    #[serde(default)]
    pub personal_details: PersonalDetails,
    #[serde(default)]
    pub departure_details: DepartureDetails,
    #[serde(default)]
    pub accommodation_details: AccommodationDetails,
    #[serde(default)]
    pub contact_details: ContactDetails,
    #[serde(default)]
    pub documents: DocumentChecklist,
    #[serde(default)]
    pub entry_requirements: EntryRequirements,
    #[serde(default)]
    pub visa_details: Option<VisaDetails>,
    #[serde(default)]
    pub customs_details: Option<CustomsDetails>,
    #[serde(default)]
    pub health_pass_details: Option<HealthPassDetails>,
    #[serde(default)]
    pub insurance_details: Option<InsuranceDetails>,
}

impl Traveler {
    pub fn new(is_minor: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            is_minor,
            personal_details: PersonalDetails::default(),
            departure_details: DepartureDetails::default(),
            accommodation_details: AccommodationDetails::default(),
            contact_details: ContactDetails::default(),
            documents: DocumentChecklist::default(),
            entry_requirements: EntryRequirements::default(),
            visa_details: None,
            customs_details: None,
            health_pass_details: None,
            insurance_details: None,
        }
    }

    /// Count of true flags out of [`FLAGS_PER_TRAVELER`].
    pub fn completed_flags(&self) -> usize {
        self.documents.completed_count() + self.entry_requirements.completed_count()
    }

    /// Arrival tax assessed for this traveler, in cents.
    pub fn arrival_tax_cents(&self) -> u64 {
        if self.is_minor { 0 } else { ARRIVAL_TAX_CENTS }
    }

    /// Display name for prompts; falls back to the record id while the name
    /// has not been entered yet.
    pub fn display_name(&self) -> String {
        let full = format!(
            "{} {}",
            self.personal_details.first_name.trim(),
            self.personal_details.last_name.trim()
        );
        let full = full.trim();
        if full.is_empty() {
            format!("traveler {}", self.id)
        } else {
            full.to_string()
        }
    }
}

/// Overall completion percentage for the group: true flags over
/// `8 × traveler count`. An empty group is 0%.
pub fn progress_percent(travelers: &[Traveler]) -> u8 {
    if travelers.is_empty() {
        return 0;
    }
    let done: usize = travelers.iter().map(Traveler::completed_flags).sum();
    let total = FLAGS_PER_TRAVELER * travelers.len();
    ((done * 100) / total) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fully_flagged() -> Traveler {
        let mut t = Traveler::new(false);
        t.documents = DocumentChecklist {
            passport: true,
            flight: true,
            accommodation: true,
        };
        t.entry_requirements = EntryRequirements {
            visa: true,
            customs: true,
            health: true,
            insurance: true,
            tax: true,
        };
        t
    }

    #[test]
    fn new_traveler_has_no_flags_set() {
        let t = Traveler::new(false);
        assert_eq!(t.completed_flags(), 0);
        assert!(!t.documents.complete());
        assert!(!t.entry_requirements.complete());
        assert!(t.visa_details.is_none());
    }

    #[test]
    fn progress_is_zero_with_no_flags_and_hundred_with_all() {
        let empty_group: Vec<Traveler> = (0..3).map(|_| Traveler::new(false)).collect();
        assert_eq!(progress_percent(&empty_group), 0);

        let done_group: Vec<Traveler> = (0..3).map(|_| fully_flagged()).collect();
        assert_eq!(progress_percent(&done_group), 100);

        assert_eq!(progress_percent(&[]), 0);
    }

    #[test]
    fn progress_counts_partial_flags() {
        let mut t = Traveler::new(false);
        t.documents.passport = true;
        t.entry_requirements.visa = true;
        // 2 of 8 flags
        assert_eq!(progress_percent(std::slice::from_ref(&t)), 25);
    }

    #[test]
    fn minors_are_tax_exempt() {
        assert_eq!(Traveler::new(false).arrival_tax_cents(), ARRIVAL_TAX_CENTS);
        assert_eq!(Traveler::new(true).arrival_tax_cents(), 0);
    }
}
