//! Booking flow: calendar and phone input helpers plus the step controller
//! that drives intro, booking and confirmation.

pub mod calendar;
pub mod controller;
pub mod phone;

pub use controller::{
    events::{FlowAction, FlowError, Panel, UiEvent, ViewModel},
    orchestration::{FlowController, FlowHandle},
    reducer::{reduce, Effect},
    state::{BookingDraft, BookingState, Screen, Step},
};
