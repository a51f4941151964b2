//! Pure transition function for the booking flow.
//!
//! `reduce` mutates [`BookingState`] and describes side effects as
//! [`Effect`] values; [`crate::FlowController`] is the only place that runs
//! them. Actions that are not valid in the current state leave it untouched
//! and produce no effects.

use std::time::Duration;

use chrono::NaiveDate;
use shared::domain::{is_known_time_slot, BookingRecord, ContactField};
use tracing::debug;

use crate::{
    calendar::is_selectable,
    controller::{
        events::{FlowAction, Panel, UiEvent},
        state::{is_mobile_width, BookingDraft, BookingState, Screen, Step},
    },
    phone::format_phone_input,
};

pub const INTRO_TRANSITION: Duration = Duration::from_millis(300);
pub const SUBMIT_TRANSITION: Duration = Duration::from_millis(300);
pub const TIME_SLOTS_SCROLL_DELAY: Duration = Duration::from_millis(200);
pub const CONTACT_FORM_SCROLL_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Publish a fresh view of the state.
    Render,
    Emit(UiEvent),
    /// Feed `action` back into the controller after `delay`.
    After {
        delay: Duration,
        action: FlowAction,
    },
    ScrollIntoView {
        panel: Panel,
        delay: Duration,
    },
    /// Hand the booking to the delivery side without waiting on it.
    SubmitBooking(BookingRecord),
}

pub fn reduce(state: &mut BookingState, action: FlowAction, today: NaiveDate) -> Vec<Effect> {
    if state.is_confirmed() {
        debug!(action = action.name(), "ignoring action after confirmation");
        return Vec::new();
    }

    match action {
        FlowAction::Start => {
            if state.screen() != Screen::Intro || state.animating {
                return ignored("start", "intro screen not shown");
            }
            state.animating = true;
            vec![
                Effect::Render,
                Effect::After {
                    delay: INTRO_TRANSITION,
                    action: FlowAction::CommitBooking,
                },
            ]
        }
        FlowAction::CommitBooking => {
            if state.step != Step::Intro {
                return ignored("commit_booking", "intro already left");
            }
            state.step = Step::Booking;
            state.animating = false;
            vec![Effect::Render]
        }
        FlowAction::ViewportResized { width } => {
            let is_mobile = is_mobile_width(width);
            if is_mobile == state.is_mobile {
                return Vec::new();
            }
            state.is_mobile = is_mobile;
            vec![Effect::Render]
        }
        FlowAction::ChangeMonth(delta) => {
            if !state.accepts_booking_input() {
                return ignored("change_month", "booking screen not active");
            }
            state.month = state.month.shift(delta);
            vec![Effect::Render]
        }
        FlowAction::SelectDate(date) => {
            if !state.accepts_booking_input() {
                return ignored("select_date", "booking screen not active");
            }
            if !is_selectable(date, today) {
                return ignored("select_date", "date is in the past");
            }
            state.draft.selected_date = Some(date);
            state.draft.selected_time = None;
            vec![
                Effect::Render,
                Effect::ScrollIntoView {
                    panel: Panel::TimeSlots,
                    delay: TIME_SLOTS_SCROLL_DELAY,
                },
            ]
        }
        FlowAction::SelectTime(slot) => {
            if !state.accepts_booking_input() {
                return ignored("select_time", "booking screen not active");
            }
            if state.draft.selected_date.is_none() {
                return ignored("select_time", "no date selected");
            }
            if !is_known_time_slot(&slot) {
                return ignored("select_time", "unknown time slot");
            }
            state.draft.selected_time = Some(slot);
            vec![
                Effect::Render,
                Effect::ScrollIntoView {
                    panel: Panel::ContactForm,
                    delay: CONTACT_FORM_SCROLL_DELAY,
                },
            ]
        }
        FlowAction::EditField { field, value } => {
            if !state.contact_form_visible() || !state.accepts_booking_input() {
                return ignored("edit_field", "contact form not shown");
            }
            let value = match field {
                ContactField::Phone => format_phone_input(&value),
                _ => value,
            };
            *state.draft.field_mut(field) = value;
            vec![Effect::Render]
        }
        FlowAction::Submit => {
            if !state.accepts_booking_input() {
                return ignored("submit", "booking screen not active");
            }
            match state.draft.to_record() {
                Err(err) => vec![Effect::Emit(UiEvent::ValidationFailed(err))],
                Ok(record) => {
                    state.pending = Some(record.clone());
                    state.animating = true;
                    vec![
                        Effect::Render,
                        Effect::SubmitBooking(record),
                        Effect::After {
                            delay: SUBMIT_TRANSITION,
                            action: FlowAction::CommitConfirmation,
                        },
                    ]
                }
            }
        }
        FlowAction::CommitConfirmation => {
            let Some(record) = state.pending.take() else {
                return ignored("commit_confirmation", "nothing submitted");
            };
            state.step = Step::Confirmation(record.clone());
            state.draft = BookingDraft::default();
            state.animating = false;
            vec![Effect::Render, Effect::Emit(UiEvent::Confirmed(record))]
        }
    }
}

fn ignored(action: &'static str, reason: &'static str) -> Vec<Effect> {
    debug!(action, reason, "flow action ignored");
    Vec::new()
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
