//! Scripted visitor: reads renderer events and answers each rendered view
//! with the next input a person would give.

use anyhow::{anyhow, bail, Result};
use booking_flow::{
    calendar::{is_selectable, MonthCursor},
    phone::format_phone_input,
    FlowAction, FlowHandle, Screen, UiEvent, ViewModel,
};
use chrono::NaiveDate;
use crossbeam_channel::Receiver;
use shared::domain::{is_known_time_slot, BookingRecord, ContactField, TIME_SLOTS};
use tracing::{debug, info};

use crate::render::{render_confirmation, screen_heading};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingInput {
    pub date: NaiveDate,
    pub time: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl BookingInput {
    /// Rejects choices the picker would silently ignore.
    pub fn check(&self, today: NaiveDate) -> Result<()> {
        if !is_selectable(self.date, today) {
            bail!("{} is in the past; pick {today} or later", self.date);
        }
        if !is_known_time_slot(&self.time) {
            bail!(
                "'{}' is not an offered time slot (one of: {})",
                self.time,
                TIME_SLOTS.join(", ")
            );
        }
        Ok(())
    }

    fn contact_value(&self, field: ContactField) -> String {
        match field {
            ContactField::FirstName => self.first_name.clone(),
            ContactField::LastName => self.last_name.clone(),
            ContactField::Email => self.email.clone(),
            ContactField::Phone => format_phone_input(&self.phone),
        }
    }
}

pub struct ScriptedVisitor {
    input: BookingInput,
    handle: FlowHandle,
    events: Receiver<UiEvent>,
    country_code: String,
    last_screen: Option<Screen>,
    submitted: bool,
}

impl ScriptedVisitor {
    pub fn new(
        input: BookingInput,
        handle: FlowHandle,
        events: Receiver<UiEvent>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            input,
            handle,
            events,
            country_code: country_code.into(),
            last_screen: None,
            submitted: false,
        }
    }

    /// Blocks until the flow confirms the booking or rejects the input.
    pub fn run(mut self) -> Result<BookingRecord> {
        while let Ok(event) = self.events.recv() {
            match event {
                UiEvent::Changed(view) => {
                    if self.last_screen != Some(view.screen) {
                        self.last_screen = Some(view.screen);
                        println!("{}", screen_heading(&view));
                    }
                    if let Some(action) = self.next_action(&view) {
                        debug!(action = action.name(), "visitor input");
                        self.handle.send(action)?;
                    }
                }
                UiEvent::ScrollIntoView(panel) => debug!(?panel, "scrolled into view"),
                UiEvent::ValidationFailed(err) => {
                    return Err(anyhow!(err).context("booking form rejected"));
                }
                UiEvent::Confirmed(record) => {
                    info!(booking_date = %record.booking_date, "booking confirmed");
                    print!("{}", render_confirmation(&record, &self.country_code));
                    return Ok(record);
                }
            }
        }

        bail!("booking flow stopped before confirmation")
    }

    fn next_action(&mut self, view: &ViewModel) -> Option<FlowAction> {
        if view.animating {
            return None;
        }
        match view.screen {
            Screen::Intro => Some(FlowAction::Start),
            Screen::Booking => self.next_booking_action(view),
            Screen::Confirmation => None,
        }
    }

    fn next_booking_action(&mut self, view: &ViewModel) -> Option<FlowAction> {
        let draft = &view.draft;

        if draft.selected_date != Some(self.input.date) {
            // `check` keeps the target at or after the month first shown.
            if view.month_title != MonthCursor::containing(self.input.date).title() {
                return Some(FlowAction::ChangeMonth(1));
            }
            return Some(FlowAction::SelectDate(self.input.date));
        }
        if draft.selected_time.as_deref() != Some(self.input.time.as_str()) {
            return Some(FlowAction::SelectTime(self.input.time.clone()));
        }
        for field in ContactField::ALL {
            let value = self.input.contact_value(field);
            if draft.field(field) != value {
                return Some(FlowAction::EditField { field, value });
            }
        }

        if self.submitted {
            return None;
        }
        self.submitted = true;
        Some(FlowAction::Submit)
    }
}
