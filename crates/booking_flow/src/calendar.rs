use chrono::{Datelike, Months, NaiveDate};

/// First day of the month shown by the date picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
    first_day: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub selectable: bool,
    pub selected: bool,
}

impl MonthCursor {
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// Moves by whole months. Past months are reachable for viewing.
    pub fn shift(&self, months: i32) -> Self {
        let moved = if months >= 0 {
            self.first_day
                .checked_add_months(Months::new(months.unsigned_abs()))
        } else {
            self.first_day
                .checked_sub_months(Months::new(months.unsigned_abs()))
        };
        Self {
            first_day: moved.unwrap_or(self.first_day),
        }
    }

    pub fn days_in_month(&self) -> u32 {
        let next = self.shift(1).first_day;
        next.signed_duration_since(self.first_day).num_days() as u32
    }

    /// Weekday index of the first day, 0 = Sunday.
    pub fn leading_blanks(&self) -> u32 {
        self.first_day.weekday().num_days_from_sunday()
    }

    /// Leading `None`s for the blank cells, then one entry per day.
    pub fn grid(&self) -> Vec<Option<NaiveDate>> {
        let blanks = self.leading_blanks() as usize;
        let days = self.days_in_month() as usize;
        let mut cells = Vec::with_capacity(blanks + days);
        cells.extend(std::iter::repeat(None).take(blanks));
        cells.extend(self.first_day.iter_days().take(days).map(Some));
        cells
    }

    pub fn cells(&self, today: NaiveDate, selected: Option<NaiveDate>) -> Vec<Option<DayCell>> {
        self.grid()
            .into_iter()
            .map(|slot| {
                slot.map(|date| DayCell {
                    date,
                    selectable: is_selectable(date, today),
                    selected: selected == Some(date),
                })
            })
            .collect()
    }

    /// e.g. `October 2026`.
    pub fn title(&self) -> String {
        self.first_day.format("%B %Y").to_string()
    }
}

/// Today stays bookable; anything earlier is not.
pub fn is_selectable(date: NaiveDate, today: NaiveDate) -> bool {
    date >= today
}

/// e.g. `Tuesday, October 20, 2026`.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

#[cfg(test)]
#[path = "tests/calendar_tests.rs"]
mod tests;
