use serde::{Deserialize, Serialize};

/// Bookable half-hour slots, in display order.
pub const TIME_SLOTS: [&str; 16] = [
    "9:00 AM", "9:30 AM", "10:00 AM", "10:30 AM", "11:00 AM", "11:30 AM", "12:00 PM", "12:30 PM",
    "1:00 PM", "1:30 PM", "2:00 PM", "2:30 PM", "3:00 PM", "3:30 PM", "4:00 PM", "4:30 PM",
];

pub fn is_known_time_slot(slot: &str) -> bool {
    TIME_SLOTS.contains(&slot)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    FirstName,
    LastName,
    Email,
    Phone,
}

impl ContactField {
    pub const ALL: [ContactField; 4] = [
        ContactField::FirstName,
        ContactField::LastName,
        ContactField::Email,
        ContactField::Phone,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ContactField::FirstName => "First Name",
            ContactField::LastName => "Last Name",
            ContactField::Email => "Your Email",
            ContactField::Phone => "Phone",
        }
    }
}

/// A field that must be filled before a booking can be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    Date,
    Time,
    Contact(ContactField),
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequiredField::Date => f.write_str("date"),
            RequiredField::Time => f.write_str("time"),
            RequiredField::Contact(field) => f.write_str(field.label()),
        }
    }
}

/// Validated booking handed from the flow to the delivery side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Phone as typed into the form, e.g. `(555) 123-4567`.
    pub phone: String,
    /// Long-form date, e.g. `Tuesday, October 20, 2026`.
    pub booking_date: String,
    pub booking_time: String,
}

/// Receives a submitted booking. Implementations must return without waiting
/// on any network work.
pub trait BookingSink: Send + Sync {
    fn submit(&self, record: BookingRecord);
}
