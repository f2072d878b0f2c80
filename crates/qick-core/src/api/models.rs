use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Signed-in user as returned by the auth endpoints.
///
/// Every field except `id` may be missing from a response; missing fields
/// decode to their empty value.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    #[serde(alias = "_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub is_verified: bool,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if !full.is_empty() {
            full.to_string()
        } else if !self.email.is_empty() {
            self.email.clone()
        } else {
            self.id.clone()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Match {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub facility: Value,
    pub players: Vec<Value>,
    pub max_players: u32,
    pub sport: String,
    pub price: f64,
    pub status: String,
}

/// Facility as listed on the home screen.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct FacilitySummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub location: String,
    pub sports: Vec<String>,
    pub rating: f64,
    pub distance: f64,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Court {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub sport: String,
    pub capacity: u32,
    pub price_per_hour: f64,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub is_available: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeSlot {
    pub time: String,
    pub available: bool,
    pub price: f64,
    pub court_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct FacilityLocation {
    pub address: String,
    pub coordinates: (f64, f64),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct OpeningHours {
    pub open: String,
    pub close: String,
    pub closed: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct FacilityDetails {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub location: FacilityLocation,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub rating: f64,
    pub total_reviews: u32,
    pub sports: Vec<String>,
    pub courts: Vec<Court>,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub operating_hours: BTreeMap<String, OpeningHours>,
    pub rules: Vec<String>,
    pub policies: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingPlayer {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub email: String,
    pub phone: String,
    pub skills: Value,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingType {
    #[default]
    Individual,
    Team,
    Recurring,
    OpenPlay,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
    Failed,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct BookingFacilityRef {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub location: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct BookingCourtRef {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub sport: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: String,
    pub facility: BookingFacilityRef,
    pub court: BookingCourtRef,
    pub date: String,
    pub time_slot: String,
    pub duration: u32,
    pub price: f64,
    pub status: BookingStatus,
    pub players: Vec<BookingPlayer>,
    pub max_players: u32,
    pub created_by: String,
    pub booking_type: BookingType,
    pub payment_status: PaymentStatus,
    pub payment_method: String,
    pub is_recurring: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_days: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_end_date: Option<String>,
    pub invitations: Vec<String>,
    pub waiver_required: bool,
    pub waiver_signed: bool,
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_profile_decodes_partial_payload() {
        let user: UserProfile =
            serde_json::from_value(json!({"id": "u1"})).expect("partial user should decode");
        assert_eq!(user.id, "u1");
        assert!(user.email.is_empty());
        assert!(!user.is_verified);
        assert_eq!(user.avatar, None);
    }

    #[test]
    fn test_user_profile_accepts_mongo_id() {
        let user: UserProfile = serde_json::from_value(json!({
            "_id": "abc",
            "firstName": "Ana",
            "lastName": "Ruiz",
            "isVerified": true
        }))
        .expect("user should decode");
        assert_eq!(user.id, "abc");
        assert_eq!(user.display_name(), "Ana Ruiz");
        assert!(user.is_verified);
    }

    #[test]
    fn test_display_name_falls_back_to_email_then_id() {
        let mut user = UserProfile {
            id: "u9".to_string(),
            ..Default::default()
        };
        assert_eq!(user.display_name(), "u9");
        user.email = "a@b.co".to_string();
        assert_eq!(user.display_name(), "a@b.co");
    }

    #[test]
    fn test_booking_enums_use_wire_names() {
        let booking: Booking = serde_json::from_value(json!({
            "_id": "b1",
            "status": "confirmed",
            "bookingType": "open_play",
            "paymentStatus": "paid"
        }))
        .expect("booking should decode");
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.booking_type, BookingType::OpenPlay);
        assert_eq!(booking.payment_status, PaymentStatus::Paid);
    }
}
