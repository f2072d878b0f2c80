//! Home/discovery slice: nearby matches, recommendations, search and filters.

use crate::api::models::{FacilitySummary, Match};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HomeFilters {
    pub distance: u32,
    pub price_range: (u32, u32),
    pub time_range: String,
    pub player_count: u32,
}

impl Default for HomeFilters {
    fn default() -> Self {
        Self {
            distance: 10,
            price_range: (0, 100),
            time_range: "any".to_string(),
            player_count: 0,
        }
    }
}

/// Partial filter update; `None` keeps the current value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FiltersPatch {
    pub distance: Option<u32>,
    pub price_range: Option<(u32, u32)>,
    pub time_range: Option<String>,
    pub player_count: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HomeState {
    pub nearby_matches: Vec<Match>,
    pub recommended_facilities: Vec<FacilitySummary>,
    pub recent_bookings: Vec<Value>,
    pub search_results: Vec<Value>,
    pub is_loading: bool,
    pub is_searching: bool,
    pub error: Option<String>,
    pub search_query: String,
    pub selected_sport: String,
    pub filters: HomeFilters,
}

impl Default for HomeState {
    fn default() -> Self {
        Self {
            nearby_matches: Vec::new(),
            recommended_facilities: Vec::new(),
            recent_bookings: Vec::new(),
            search_results: Vec::new(),
            is_loading: false,
            is_searching: false,
            error: None,
            search_query: String::new(),
            selected_sport: "all".to_string(),
            filters: HomeFilters::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HomeAction {
    SetLoading(bool),
    SetSearching(bool),
    SetNearbyMatches(Vec<Match>),
    SetRecommendedFacilities(Vec<FacilitySummary>),
    SetRecentBookings(Vec<Value>),
    SetSearchResults(Vec<Value>),
    SetSearchQuery(String),
    SetSelectedSport(String),
    SetFilters(FiltersPatch),
    SetError(Option<String>),
    ClearSearchResults,
    ResetFilters,
}

impl HomeAction {
    pub fn name(&self) -> &'static str {
        match self {
            HomeAction::SetLoading(_) => "setLoading",
            HomeAction::SetSearching(_) => "setSearching",
            HomeAction::SetNearbyMatches(_) => "setNearbyMatches",
            HomeAction::SetRecommendedFacilities(_) => "setRecommendedFacilities",
            HomeAction::SetRecentBookings(_) => "setRecentBookings",
            HomeAction::SetSearchResults(_) => "setSearchResults",
            HomeAction::SetSearchQuery(_) => "setSearchQuery",
            HomeAction::SetSelectedSport(_) => "setSelectedSport",
            HomeAction::SetFilters(_) => "setFilters",
            HomeAction::SetError(_) => "setError",
            HomeAction::ClearSearchResults => "clearSearchResults",
            HomeAction::ResetFilters => "resetFilters",
        }
    }
}

pub fn reduce(mut state: HomeState, action: &HomeAction) -> HomeState {
    match action {
        HomeAction::SetLoading(v) => state.is_loading = *v,
        HomeAction::SetSearching(v) => state.is_searching = *v,
        HomeAction::SetNearbyMatches(matches) => state.nearby_matches = matches.clone(),
        HomeAction::SetRecommendedFacilities(facilities) => {
            state.recommended_facilities = facilities.clone()
        }
        HomeAction::SetRecentBookings(bookings) => state.recent_bookings = bookings.clone(),
        HomeAction::SetSearchResults(results) => state.search_results = results.clone(),
        HomeAction::SetSearchQuery(query) => state.search_query = query.clone(),
        HomeAction::SetSelectedSport(sport) => state.selected_sport = sport.clone(),
        HomeAction::SetFilters(patch) => {
            if let Some(distance) = patch.distance {
                state.filters.distance = distance;
            }
            if let Some(range) = patch.price_range {
                state.filters.price_range = range;
            }
            if let Some(time_range) = &patch.time_range {
                state.filters.time_range = time_range.clone();
            }
            if let Some(count) = patch.player_count {
                state.filters.player_count = count;
            }
        }
        HomeAction::SetError(error) => state.error = error.clone(),
        HomeAction::ClearSearchResults => {
            state.search_results.clear();
            state.search_query.clear();
            state.is_searching = false;
        }
        HomeAction::ResetFilters => state.filters = HomeFilters::default(),
    }
    state
}
