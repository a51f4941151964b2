//! Flow actions, renderer-facing events and error modeling for the booking controller.

use chrono::NaiveDate;
use shared::{
    domain::{BookingRecord, ContactField},
    error::ValidationError,
};
use thiserror::Error;

use crate::{
    calendar::DayCell,
    controller::state::{BookingDraft, BookingState, Screen},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowAction {
    /// "Book Your Call" on the intro screen.
    Start,
    ViewportResized {
        width: u32,
    },
    ChangeMonth(i32),
    SelectDate(NaiveDate),
    SelectTime(String),
    EditField {
        field: ContactField,
        value: String,
    },
    Submit,
    /// Posted by the controller once the intro animation has run.
    CommitBooking,
    /// Posted by the controller once the submit animation has run.
    CommitConfirmation,
}

impl FlowAction {
    pub fn name(&self) -> &'static str {
        match self {
            FlowAction::Start => "start",
            FlowAction::ViewportResized { .. } => "viewport_resized",
            FlowAction::ChangeMonth(_) => "change_month",
            FlowAction::SelectDate(_) => "select_date",
            FlowAction::SelectTime(_) => "select_time",
            FlowAction::EditField { .. } => "edit_field",
            FlowAction::Submit => "submit",
            FlowAction::CommitBooking => "commit_booking",
            FlowAction::CommitConfirmation => "commit_confirmation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    TimeSlots,
    ContactForm,
}

/// Everything the renderer needs to draw the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub screen: Screen,
    pub animating: bool,
    pub month_title: String,
    pub days: Vec<Option<DayCell>>,
    pub time_slots_visible: bool,
    pub contact_form_visible: bool,
    pub draft: BookingDraft,
    pub can_submit: bool,
    pub confirmation: Option<BookingRecord>,
}

impl ViewModel {
    pub fn from_state(state: &BookingState, today: NaiveDate) -> Self {
        let draft = state.draft().clone();
        Self {
            screen: state.screen(),
            animating: state.is_animating(),
            month_title: state.month().title(),
            days: state.month().cells(today, draft.selected_date),
            time_slots_visible: state.time_slots_visible(),
            contact_form_visible: state.contact_form_visible(),
            can_submit: state.can_submit(),
            confirmation: state.confirmation().cloned(),
            draft,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Changed(Box<ViewModel>),
    ScrollIntoView(Panel),
    ValidationFailed(ValidationError),
    Confirmed(BookingRecord),
}

impl UiEvent {
    pub fn name(&self) -> &'static str {
        match self {
            UiEvent::Changed(_) => "changed",
            UiEvent::ScrollIntoView(_) => "scroll_into_view",
            UiEvent::ValidationFailed(_) => "validation_failed",
            UiEvent::Confirmed(_) => "confirmed",
        }
    }
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("booking flow has stopped accepting actions")]
    Closed,
}
