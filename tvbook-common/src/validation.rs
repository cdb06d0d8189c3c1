//! Submission validation for booking forms
//!
//! Drafts are saved as-is. Before a request enters the workflow every rule
//! below is checked and all failures are reported together, keyed by the
//! form field they belong to.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::model::{BookingDetails, BookingForm};

/// Field name → message for every failed rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    /// Record a failure; the first message for a field wins
    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&joined.join("; "))
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Check that a form is complete enough to submit
pub fn validate_submission(form: &BookingForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if is_blank(&form.title) {
        errors.add("title", "Title is required");
    }
    if form.studio.is_none() {
        errors.add("studio", "Please select a studio");
    }
    if is_blank(&form.program) {
        errors.add("program", "Program/Segment is required");
    }
    if form.air_date_time.is_none() {
        errors.add("airDateTime", "Air date and time is required");
    }
    if form.language.is_none() {
        errors.add("language", "Please select a language");
    }
    if form.priority.is_none() {
        errors.add("priority", "Please select a priority");
    }

    match &form.details {
        BookingDetails::IncomingFeed(_) => {
            match (form.feed_start_time, form.feed_end_time) {
                (None, _) | (_, None) => {
                    if form.feed_start_time.is_none() {
                        errors.add("feedStartTime", "Feed start time is required");
                    }
                    if form.feed_end_time.is_none() {
                        errors.add("feedEndTime", "Feed end time is required");
                    }
                }
                (Some(start), Some(end)) if end <= start => {
                    errors.add("feedEndTime", "Feed end time must be after feed start time");
                }
                _ => {}
            }
        }
        BookingDetails::InviteGuestNews(guest) | BookingDetails::InviteGuestProgram(guest) => {
            if is_blank(&guest.guest_name) {
                errors.add("guestName", "Guest name is required");
            }
            if is_blank(&guest.inews_rundown_id) {
                errors.add("inewsRundownId", "iNEWS Rundown ID is required");
            }
        }
        BookingDetails::DownloadIngest(download) => {
            if download.download_source.is_none() {
                errors.add("downloadSource", "Please select a download source");
            }
            if is_blank(&download.download_link) {
                errors.add("downloadLink", "Download link/URL is required");
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
