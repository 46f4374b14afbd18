use chrono::{Datelike, NaiveDate};
use crossterm::event::KeyCode;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

/// A date field typed part by part (`YYYY`, then `MM`, then `DD`).
///
/// `value` stays `None` until the user confirms an entry, so a bill form can
/// tell "not filled in" apart from "today".
pub struct DateInputState {
    pub value: Option<NaiveDate>,
    pub cursor: NaiveDate,
    pub editing: bool,
    pub date_part: DatePart,
    pub pending_digits: String,
}

impl DateInputState {
    pub fn new(start: NaiveDate) -> Self {
        Self {
            value: None,
            cursor: start,
            editing: false,
            date_part: DatePart::Year,
            pending_digits: String::new(),
        }
    }

    pub fn start_editing(&mut self) {
        if let Some(value) = self.value {
            self.cursor = value;
        }
        self.editing = true;
        self.date_part = DatePart::Year;
        self.pending_digits.clear();
    }

    /// Accept the date under the cursor.
    pub fn confirm(&mut self) {
        self.value = Some(self.cursor);
        self.editing = false;
        self.pending_digits.clear();
    }

    /// Leave editing without touching the stored value.
    pub fn cancel(&mut self) {
        self.editing = false;
        self.pending_digits.clear();
    }

    fn next_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        };
        self.pending_digits.clear();
    }

    fn previous_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        };
        self.pending_digits.clear();
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.pending_digits.push(c);
                let width = if self.date_part == DatePart::Year { 4 } else { 2 };
                if self.pending_digits.len() == width {
                    self.apply_pending();
                    self.next_date_part();
                }
            }
            KeyCode::Backspace => {
                self.pending_digits.pop();
            }
            KeyCode::Right | KeyCode::Tab => self.next_date_part(),
            KeyCode::Left => self.previous_date_part(),
            _ => {}
        }
    }

    fn apply_pending(&mut self) {
        let Ok(number) = self.pending_digits.parse::<u32>() else {
            return;
        };
        let (year, month, day) = (self.cursor.year(), self.cursor.month(), self.cursor.day());
        let candidate = match self.date_part {
            DatePart::Year if (1900..=2100).contains(&number) => {
                // Feb 29 in a non-leap year falls back to the 28th.
                NaiveDate::from_ymd_opt(number as i32, month, day)
                    .or_else(|| NaiveDate::from_ymd_opt(number as i32, month, 28))
            }
            DatePart::Month if (1..=12).contains(&number) => {
                NaiveDate::from_ymd_opt(year, number, day.min(days_in_month(year, number)))
            }
            DatePart::Day if (1..=days_in_month(year, month)).contains(&number) => {
                NaiveDate::from_ymd_opt(year, month, number)
            }
            _ => None,
        };
        if let Some(date) = candidate {
            self.cursor = date;
        }
    }

    pub fn display(&self) -> String {
        if !self.editing {
            return match self.value {
                Some(value) => value.format("%Y-%m-%d").to_string(),
                None => "(not set)".to_string(),
            };
        }

        let placeholder = |part: DatePart, current: String| {
            if part != self.date_part {
                current
            } else if self.pending_digits.is_empty() {
                format!("[{}]", current)
            } else {
                format!("[{}]", self.pending_digits)
            }
        };
        format!(
            "{}-{}-{}",
            placeholder(DatePart::Year, format!("{:04}", self.cursor.year())),
            placeholder(DatePart::Month, format!("{:02}", self.cursor.month())),
            placeholder(DatePart::Day, format!("{:02}", self.cursor.day())),
        )
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}
