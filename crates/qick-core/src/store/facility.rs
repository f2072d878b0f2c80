//! Facility detail slice: the facility being viewed and the court/slot
//! selection the user is building.

use crate::api::models::{FacilityDetails, TimeSlot};
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BookingData {
    pub facility_id: String,
    pub court_id: String,
    pub date: String,
    pub time_slot: String,
    pub duration: u32,
    pub price: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FacilityState {
    pub current_facility: Option<FacilityDetails>,
    pub available_slots: Vec<TimeSlot>,
    /// `YYYY-MM-DD`
    pub selected_date: String,
    pub selected_court: Option<String>,
    pub selected_time_slot: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub booking_data: Option<BookingData>,
}

impl Default for FacilityState {
    fn default() -> Self {
        Self {
            current_facility: None,
            available_slots: Vec::new(),
            selected_date: today(),
            selected_court: None,
            selected_time_slot: None,
            is_loading: false,
            error: None,
            booking_data: None,
        }
    }
}

fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub enum FacilityAction {
    SetLoading(bool),
    SetCurrentFacility(FacilityDetails),
    SetAvailableSlots(Vec<TimeSlot>),
    SetSelectedDate(String),
    SetSelectedCourt(String),
    SetSelectedTimeSlot(String),
    SetBookingData(Option<BookingData>),
    SetError(Option<String>),
    ClearFacilityData,
    ResetSelections,
}

impl FacilityAction {
    pub fn name(&self) -> &'static str {
        match self {
            FacilityAction::SetLoading(_) => "setLoading",
            FacilityAction::SetCurrentFacility(_) => "setCurrentFacility",
            FacilityAction::SetAvailableSlots(_) => "setAvailableSlots",
            FacilityAction::SetSelectedDate(_) => "setSelectedDate",
            FacilityAction::SetSelectedCourt(_) => "setSelectedCourt",
            FacilityAction::SetSelectedTimeSlot(_) => "setSelectedTimeSlot",
            FacilityAction::SetBookingData(_) => "setBookingData",
            FacilityAction::SetError(_) => "setError",
            FacilityAction::ClearFacilityData => "clearFacilityData",
            FacilityAction::ResetSelections => "resetSelections",
        }
    }
}

pub fn reduce(mut state: FacilityState, action: &FacilityAction) -> FacilityState {
    match action {
        FacilityAction::SetLoading(v) => state.is_loading = *v,
        FacilityAction::SetCurrentFacility(facility) => {
            state.current_facility = Some(facility.clone())
        }
        FacilityAction::SetAvailableSlots(slots) => state.available_slots = slots.clone(),
        FacilityAction::SetSelectedDate(date) => {
            // a new date invalidates the court and slot picked for the old one
            state.selected_date = date.clone();
            state.selected_court = None;
            state.selected_time_slot = None;
        }
        FacilityAction::SetSelectedCourt(court) => {
            state.selected_court = Some(court.clone());
            state.selected_time_slot = None;
        }
        FacilityAction::SetSelectedTimeSlot(slot) => state.selected_time_slot = Some(slot.clone()),
        FacilityAction::SetBookingData(data) => state.booking_data = data.clone(),
        FacilityAction::SetError(error) => state.error = error.clone(),
        FacilityAction::ClearFacilityData => {
            state.current_facility = None;
            state.available_slots.clear();
            state.selected_court = None;
            state.selected_time_slot = None;
            state.booking_data = None;
        }
        FacilityAction::ResetSelections => {
            state.selected_court = None;
            state.selected_time_slot = None;
            state.booking_data = None;
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_selection() -> FacilityState {
        [
            FacilityAction::SetSelectedCourt("c1".to_string()),
            FacilityAction::SetSelectedTimeSlot("18:00".to_string()),
        ]
        .iter()
        .fold(FacilityState::default(), reduce)
    }

    #[test]
    fn test_default_date_is_iso_day() {
        let state = FacilityState::default();
        assert_eq!(state.selected_date.len(), 10);
        assert_eq!(state.selected_date.matches('-').count(), 2);
    }

    #[test]
    fn test_changing_date_resets_court_and_slot() {
        let state = reduce(
            with_selection(),
            &FacilityAction::SetSelectedDate("2030-01-02".to_string()),
        );
        assert_eq!(state.selected_date, "2030-01-02");
        assert_eq!(state.selected_court, None);
        assert_eq!(state.selected_time_slot, None);
    }

    #[test]
    fn test_changing_court_resets_slot_only() {
        let state = reduce(
            with_selection(),
            &FacilityAction::SetSelectedCourt("c2".to_string()),
        );
        assert_eq!(state.selected_court.as_deref(), Some("c2"));
        assert_eq!(state.selected_time_slot, None);
    }

    #[test]
    fn test_clear_facility_data_keeps_date() {
        let mut state = with_selection();
        state = reduce(
            state,
            &FacilityAction::SetCurrentFacility(FacilityDetails {
                id: "f1".to_string(),
                ..Default::default()
            }),
        );
        state = reduce(
            state,
            &FacilityAction::SetBookingData(Some(BookingData::default())),
        );
        let date = state.selected_date.clone();

        let state = reduce(state, &FacilityAction::ClearFacilityData);
        assert_eq!(state.current_facility, None);
        assert_eq!(state.booking_data, None);
        assert_eq!(state.selected_court, None);
        assert_eq!(state.selected_date, date);
    }

    #[test]
    fn test_reset_selections() {
        let state = reduce(with_selection(), &FacilityAction::ResetSelections);
        assert_eq!(state.selected_court, None);
        assert_eq!(state.selected_time_slot, None);
    }
}
