use chrono::NaiveDate;
use shared::{
    domain::{BookingRecord, ContactField, RequiredField},
    error::ValidationError,
};

use crate::calendar::{format_long_date, MonthCursor};

/// Viewports narrower than this get the intro screen.
pub const MOBILE_BREAKPOINT_PX: u32 = 768;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub selected_date: Option<NaiveDate>,
    pub selected_time: Option<String>,
}

impl BookingDraft {
    pub fn field(&self, field: ContactField) -> &str {
        match field {
            ContactField::FirstName => &self.first_name,
            ContactField::LastName => &self.last_name,
            ContactField::Email => &self.email,
            ContactField::Phone => &self.phone,
        }
    }

    pub fn field_mut(&mut self, field: ContactField) -> &mut String {
        match field {
            ContactField::FirstName => &mut self.first_name,
            ContactField::LastName => &mut self.last_name,
            ContactField::Email => &mut self.email,
            ContactField::Phone => &mut self.phone,
        }
    }

    pub fn missing_fields(&self) -> Vec<RequiredField> {
        let mut missing = Vec::new();
        if self.selected_date.is_none() {
            missing.push(RequiredField::Date);
        }
        if self.selected_time.is_none() {
            missing.push(RequiredField::Time);
        }
        for field in ContactField::ALL {
            if self.field(field).trim().is_empty() {
                missing.push(RequiredField::Contact(field));
            }
        }
        missing
    }

    /// Short phone numbers are accepted as long as the field is non-empty.
    pub fn to_record(&self) -> Result<BookingRecord, ValidationError> {
        let missing = self.missing_fields();
        let (Some(date), Some(time), true) = (
            self.selected_date,
            self.selected_time.as_ref(),
            missing.is_empty(),
        ) else {
            return Err(ValidationError::MissingFields(missing));
        };

        Ok(BookingRecord {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            booking_date: format_long_date(date),
            booking_time: time.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Intro,
    Booking,
    /// Terminal. Holds the rendering of the submitted draft.
    Confirmation(BookingRecord),
}

/// What the renderer should show. Differs from [`Step`] only on wide
/// viewports, where the intro step renders as the booking screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Intro,
    Booking,
    Confirmation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingState {
    pub(crate) step: Step,
    pub(crate) is_mobile: bool,
    pub(crate) animating: bool,
    pub(crate) month: MonthCursor,
    pub(crate) draft: BookingDraft,
    pub(crate) pending: Option<BookingRecord>,
}

impl BookingState {
    pub fn new(today: NaiveDate, viewport_width: u32) -> Self {
        Self {
            step: Step::Intro,
            is_mobile: is_mobile_width(viewport_width),
            animating: false,
            month: MonthCursor::containing(today),
            draft: BookingDraft::default(),
            pending: None,
        }
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    pub fn screen(&self) -> Screen {
        match self.step {
            Step::Intro if self.is_mobile => Screen::Intro,
            Step::Intro | Step::Booking => Screen::Booking,
            Step::Confirmation(_) => Screen::Confirmation,
        }
    }

    pub fn is_mobile(&self) -> bool {
        self.is_mobile
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn month(&self) -> MonthCursor {
        self.month
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn time_slots_visible(&self) -> bool {
        self.screen() == Screen::Booking && self.draft.selected_date.is_some()
    }

    pub fn contact_form_visible(&self) -> bool {
        self.time_slots_visible() && self.draft.selected_time.is_some()
    }

    pub fn can_submit(&self) -> bool {
        self.accepts_booking_input() && self.draft.missing_fields().is_empty()
    }

    pub fn confirmation(&self) -> Option<&BookingRecord> {
        match &self.step {
            Step::Confirmation(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self.step, Step::Confirmation(_))
    }

    pub(crate) fn accepts_booking_input(&self) -> bool {
        self.screen() == Screen::Booking && !self.animating && self.pending.is_none()
    }
}

pub fn is_mobile_width(viewport_width: u32) -> bool {
    viewport_width < MOBILE_BREAKPOINT_PX
}
