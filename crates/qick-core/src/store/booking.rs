//! Booking slice, including the client-held booking-flow draft.
//!
//! Nothing here is submitted anywhere; the draft lives only in memory and
//! is dropped by `ClearBookingFlow`, `ResetBookingState` or logout.

use crate::api::models::{Booking, BookingPlayer, BookingStatus, BookingType};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingFlow {
    /// 1-based wizard step.
    pub step: u32,
    pub facility_id: String,
    pub court_id: String,
    pub date: String,
    pub time_slot: String,
    pub duration: u32,
    pub price: f64,
    pub players: Vec<BookingPlayer>,
    pub max_players: u32,
    pub booking_type: BookingType,
    pub is_recurring: bool,
    pub recurring_days: Vec<String>,
    pub recurring_end_date: String,
    pub invited_players: Vec<String>,
    pub payment_method: String,
    pub notes: String,
}

impl Default for BookingFlow {
    fn default() -> Self {
        Self {
            step: 1,
            facility_id: String::new(),
            court_id: String::new(),
            date: String::new(),
            time_slot: String::new(),
            duration: 1,
            price: 0.0,
            players: Vec::new(),
            max_players: 0,
            booking_type: BookingType::Individual,
            is_recurring: false,
            recurring_days: Vec::new(),
            recurring_end_date: String::new(),
            invited_players: Vec::new(),
            payment_method: String::new(),
            notes: String::new(),
        }
    }
}

/// Partial draft update; `None` keeps the current value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookingFlowPatch {
    pub step: Option<u32>,
    pub facility_id: Option<String>,
    pub court_id: Option<String>,
    pub date: Option<String>,
    pub time_slot: Option<String>,
    pub duration: Option<u32>,
    pub price: Option<f64>,
    pub players: Option<Vec<BookingPlayer>>,
    pub max_players: Option<u32>,
    pub booking_type: Option<BookingType>,
    pub is_recurring: Option<bool>,
    pub recurring_days: Option<Vec<String>>,
    pub recurring_end_date: Option<String>,
    pub invited_players: Option<Vec<String>>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

macro_rules! merge_fields {
    ($target:expr, $patch:expr, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = &$patch.$field {
                $target.$field = value.clone();
            }
        )+
    };
}

impl BookingFlowPatch {
    fn apply_to(&self, flow: &mut BookingFlow) {
        merge_fields!(
            flow,
            self,
            facility_id,
            court_id,
            date,
            time_slot,
            duration,
            price,
            players,
            max_players,
            booking_type,
            is_recurring,
            recurring_days,
            recurring_end_date,
            invited_players,
            payment_method,
            notes,
        );
        if let Some(step) = self.step {
            flow.step = step.max(1);
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BookingState {
    pub current_booking: Option<Booking>,
    pub booking_history: Vec<Booking>,
    pub upcoming_bookings: Vec<Booking>,
    pub pending_invitations: Vec<Booking>,
    pub is_loading: bool,
    pub is_creating: bool,
    pub is_payment_processing: bool,
    pub error: Option<String>,
    pub booking_flow: BookingFlow,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingAction {
    SetLoading(bool),
    SetCreating(bool),
    SetPaymentProcessing(bool),
    SetCurrentBooking(Booking),
    SetBookingHistory(Vec<Booking>),
    SetUpcomingBookings(Vec<Booking>),
    SetPendingInvitations(Vec<Booking>),
    UpdateBookingFlow(BookingFlowPatch),
    NextBookingStep,
    PreviousBookingStep,
    SetBookingStep(u32),
    AddPlayerToBooking(BookingPlayer),
    RemovePlayerFromBooking(String),
    UpdateBookingStatus {
        booking_id: String,
        status: BookingStatus,
    },
    SetError(Option<String>),
    ClearBookingFlow,
    ResetBookingState,
}

impl BookingAction {
    pub fn name(&self) -> &'static str {
        match self {
            BookingAction::SetLoading(_) => "setLoading",
            BookingAction::SetCreating(_) => "setCreating",
            BookingAction::SetPaymentProcessing(_) => "setPaymentProcessing",
            BookingAction::SetCurrentBooking(_) => "setCurrentBooking",
            BookingAction::SetBookingHistory(_) => "setBookingHistory",
            BookingAction::SetUpcomingBookings(_) => "setUpcomingBookings",
            BookingAction::SetPendingInvitations(_) => "setPendingInvitations",
            BookingAction::UpdateBookingFlow(_) => "updateBookingFlow",
            BookingAction::NextBookingStep => "nextBookingStep",
            BookingAction::PreviousBookingStep => "previousBookingStep",
            BookingAction::SetBookingStep(_) => "setBookingStep",
            BookingAction::AddPlayerToBooking(_) => "addPlayerToBooking",
            BookingAction::RemovePlayerFromBooking(_) => "removePlayerFromBooking",
            BookingAction::UpdateBookingStatus { .. } => "updateBookingStatus",
            BookingAction::SetError(_) => "setError",
            BookingAction::ClearBookingFlow => "clearBookingFlow",
            BookingAction::ResetBookingState => "resetBookingState",
        }
    }
}

pub fn reduce(mut state: BookingState, action: &BookingAction) -> BookingState {
    match action {
        BookingAction::SetLoading(v) => state.is_loading = *v,
        BookingAction::SetCreating(v) => state.is_creating = *v,
        BookingAction::SetPaymentProcessing(v) => state.is_payment_processing = *v,
        BookingAction::SetCurrentBooking(booking) => state.current_booking = Some(booking.clone()),
        BookingAction::SetBookingHistory(list) => state.booking_history = list.clone(),
        BookingAction::SetUpcomingBookings(list) => state.upcoming_bookings = list.clone(),
        BookingAction::SetPendingInvitations(list) => state.pending_invitations = list.clone(),
        BookingAction::UpdateBookingFlow(patch) => patch.apply_to(&mut state.booking_flow),
        BookingAction::NextBookingStep => {
            state.booking_flow.step = state.booking_flow.step.saturating_add(1)
        }
        BookingAction::PreviousBookingStep => {
            state.booking_flow.step = state.booking_flow.step.saturating_sub(1).max(1)
        }
        BookingAction::SetBookingStep(step) => state.booking_flow.step = (*step).max(1),
        BookingAction::AddPlayerToBooking(player) => {
            let players = &mut state.booking_flow.players;
            if !players.iter().any(|p| p.id == player.id) {
                players.push(player.clone());
            }
        }
        BookingAction::RemovePlayerFromBooking(player_id) => {
            state.booking_flow.players.retain(|p| &p.id != player_id)
        }
        BookingAction::UpdateBookingStatus { booking_id, status } => {
            let targets = state
                .upcoming_bookings
                .iter_mut()
                .chain(state.booking_history.iter_mut())
                .chain(state.current_booking.iter_mut());
            for booking in targets.filter(|b| &b.id == booking_id) {
                booking.status = *status;
            }
        }
        BookingAction::SetError(error) => state.error = error.clone(),
        BookingAction::ClearBookingFlow => state.booking_flow = BookingFlow::default(),
        BookingAction::ResetBookingState => {
            state.current_booking = None;
            state.booking_flow = BookingFlow::default();
            state.error = None;
        }
    }
    state
}
