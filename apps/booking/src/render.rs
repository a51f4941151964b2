//! Plain-text drawing of the booking screens.

use booking_flow::{calendar::MonthCursor, Screen, ViewModel};
use chrono::{Datelike, NaiveDate};
use shared::domain::BookingRecord;

const WEEKDAY_HEADER: &str = " Su  Mo  Tu  We  Th  Fr  Sa";

/// Month grid with bookable days plain, past days in parentheses and the
/// selected day in brackets.
pub fn render_month(cursor: MonthCursor, today: NaiveDate, selected: Option<NaiveDate>) -> String {
    let mut out = format!("{}\n{WEEKDAY_HEADER}\n", cursor.title());
    for week in cursor.cells(today, selected).chunks(7) {
        let line: String = week
            .iter()
            .map(|cell| match cell {
                None => "    ".to_string(),
                Some(day) if day.selected => format!("[{:>2}]", day.date.day()),
                Some(day) if !day.selectable => format!("({:>2})", day.date.day()),
                Some(day) => format!(" {:>2} ", day.date.day()),
            })
            .collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// The phone line carries the same country code the delivered event uses.
pub fn render_confirmation(record: &BookingRecord, country_code: &str) -> String {
    format!(
        "You're booked!\n  Date:  {}\n  Time:  {}\n  Name:  {} {}\n  Email: {}\n  Phone: +{} {}\n",
        record.booking_date,
        record.booking_time,
        record.first_name,
        record.last_name,
        record.email,
        country_code,
        record.phone,
    )
}

/// One-line heading printed when the visible screen changes.
pub fn screen_heading(view: &ViewModel) -> String {
    match view.screen {
        Screen::Intro => "Book a free strategy call".to_string(),
        Screen::Booking => format!("Pick a date ({})", view.month_title),
        Screen::Confirmation => "Booking confirmed".to_string(),
    }
}
