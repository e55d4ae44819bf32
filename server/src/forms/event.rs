use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{invalid_choice, known_codes, normalize_code, require, FieldErrors};
use crate::models::{Event, EventDraft, GeoState};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct EventForm {
    #[serde(default)]
    #[validate(length(max = 255, message = "Ensure this value has at most 255 characters."))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date: Option<String>,
    /// `HH:MM` or `HH:MM:SS`
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub needs_sound: bool,
    #[serde(default)]
    pub needs_lighting: bool,
    #[serde(default)]
    pub needs_video: bool,
    #[serde(default)]
    pub needs_staging: bool,
    #[serde(default)]
    pub full_service_package: bool,
}

impl EventForm {
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            date: event.date.map(|date| date.format("%Y-%m-%d").to_string()),
            start_time: event.start_time.map(format_time),
            end_time: event.end_time.map(format_time),
            city: event.city.clone(),
            state: event.state.clone(),
            needs_sound: event.needs_sound,
            needs_lighting: event.needs_lighting,
            needs_video: event.needs_video,
            needs_staging: event.needs_staging,
            full_service_package: event.full_service_package,
        }
    }

    pub fn clean(&self, states: &[GeoState]) -> Result<EventDraft, FieldErrors> {
        let mut errors = FieldErrors::default();
        if let Err(found) = self.validate() {
            errors.absorb(found);
        }

        let title = self.title.trim();
        require(&mut errors, "title", title);

        let date = parse_optional(&mut errors, "date", self.date.as_deref(), parse_date);
        let start_time =
            parse_optional(&mut errors, "start_time", self.start_time.as_deref(), parse_time);
        let end_time = parse_optional(&mut errors, "end_time", self.end_time.as_deref(), parse_time);

        let state = normalize_code(&self.state);
        if !state.is_empty() && !known_codes(states).contains(state.as_str()) {
            errors.add("state", invalid_choice(&state));
        }

        errors.into_result(EventDraft {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            date,
            start_time,
            end_time,
            city: self.city.trim().to_string(),
            state,
            needs_sound: self.needs_sound,
            needs_lighting: self.needs_lighting,
            needs_video: self.needs_video,
            needs_staging: self.needs_staging,
            full_service_package: self.full_service_package,
        })
    }
}

fn parse_optional<T>(
    errors: &mut FieldErrors,
    field: &str,
    raw: Option<&str>,
    parse: fn(&str) -> Result<T, &'static str>,
) -> Option<T> {
    let raw = raw.map(str::trim).filter(|value| !value.is_empty())?;
    match parse(raw) {
        Ok(value) => Some(value),
        Err(message) => {
            errors.add(field, message);
            None
        }
    }
}

/// `HH:MM`, widened to `HH:MM:SS` when the seconds are set so a re-save
/// keeps them.
fn format_time(time: NaiveTime) -> String {
    if time.second() == 0 {
        time.format("%H:%M").to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, &'static str> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| "Enter a valid date.")
}

fn parse_time(raw: &str) -> Result<NaiveTime, &'static str> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| "Enter a valid time.")
}
