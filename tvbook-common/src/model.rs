//! Domain model for booking workflow requests
//!
//! Wire format mirrors the booking forms: camelCase keys and the human-readable
//! labels shown in form dropdowns (`"With NOC"`, `"Incoming Feed"`, ...).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::validation::ValidationErrors;
use crate::workflow::WorkflowError;
use crate::{Error, Result};

/// Declares a closed set of labelled values
///
/// Generates serde renames, `ALL`, `as_str`, `Display` and a case-insensitive
/// `FromStr` over the labels.
macro_rules! labeled_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $label)] $variant),+
        }

        impl $name {
            /// Every value in display order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Label used on the wire and in forms
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        Error::InvalidInput(format!("Unknown {} '{}'", stringify!($name), s))
                    })
            }
        }
    };
}

labeled_enum! {
    /// Kind of booking; selects which detail fields apply
    BookingType {
        IncomingFeed => "Incoming Feed",
        InviteGuestNews => "Invite Guest for News",
        InviteGuestProgram => "Invite Guest for Program",
        DownloadIngest => "Download and Ingest",
    }
}

labeled_enum! {
    /// Workflow stage of a request
    WorkflowStatus {
        Draft => "Draft",
        Submitted => "Submitted",
        WithNoc => "With NOC",
        ClarificationRequested => "Clarification Requested",
        ResourcesAdded => "Resources Added",
        WithIngest => "With Ingest",
        Completed => "Completed",
        NotDone => "Not Done",
    }
}

impl WorkflowStatus {
    /// Terminal stages accept no further action
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStatus::Completed | WorkflowStatus::NotDone)
    }
}

labeled_enum! {
    /// Team the caller acts for
    UserRole {
        Booking => "Booking",
        Noc => "NOC",
        Ingest => "Ingest",
        Admin => "Admin",
    }
}

impl UserRole {
    /// Name recorded on audit entries when the caller gives none
    pub fn team_name(&self) -> String {
        format!("{} Team", self.as_str())
    }
}

labeled_enum! {
    Priority {
        Normal => "Normal",
        High => "High",
        Urgent => "Urgent",
    }
}

labeled_enum! {
    Language {
        English => "English",
        Arabic => "Arabic",
    }
}

labeled_enum! {
    Studio {
        Studio1 => "Studio 1",
        Studio2 => "Studio 2",
    }
}

labeled_enum! {
    YesNo {
        Yes => "Yes",
        No => "No",
    }
}

labeled_enum! {
    /// Where an incoming feed is received
    SourceType {
        QmcEarthStation => "QMC Earth Station",
        VMix => "vMix",
        Srt => "SRT",
        Satellite => "Satellite",
    }
}

labeled_enum! {
    /// External input on the QMC earth station
    QmcSource {
        Ext1 => "Ext-1",
        Ext2 => "Ext-2",
        Ext3 => "Ext-3",
        Ext4 => "Ext-4",
        Ext5 => "Ext-5",
        Ext6 => "Ext-6",
        Ext7 => "Ext-7",
        Ext8 => "Ext-8",
        Ext9 => "Ext-9",
        Ext10 => "Ext-10",
    }
}

labeled_enum! {
    ResourceAssignmentType {
        Main => "Main",
        Backup => "Backup",
    }
}

labeled_enum! {
    Resolution {
        Hd => "HD",
        Uhd => "UHD",
    }
}

labeled_enum! {
    ReturnPath {
        Enabled => "Enabled",
        Disabled => "Disabled",
    }
}

labeled_enum! {
    KeyFill {
        None => "None",
        Key => "Key",
        Fill => "Fill",
    }
}

labeled_enum! {
    DownloadSource {
        YouTube => "YouTube",
        WeTransfer => "WeTransfer",
        Ftp => "FTP",
        Other => "Other",
    }
}

/// Treat `""` (an untouched form select) and `null` as "not set"
fn blank_as_none<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => T::deserialize(v).map(Some).map_err(de::Error::custom),
    }
}

/// Fields specific to an incoming feed booking
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingFeedDetails {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub source_type: Option<SourceType>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub qmc_source: Option<QmcSource>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub vmix_input_number: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub resource_assignment_type: Option<ResourceAssignmentType>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub resolution: Option<Resolution>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub return_path: Option<ReturnPath>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub key_fill: Option<KeyFill>,
}

/// Fields for guest invitations (news and program share the same shape)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestDetails {
    #[serde(default)]
    pub guest_name: String,
    #[serde(default)]
    pub guest_contact: String,
    #[serde(default)]
    pub inews_rundown_id: String,
    #[serde(default)]
    pub story_slug: String,
    #[serde(default)]
    pub rundown_position: String,
}

/// Fields for a download-and-ingest booking
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadDetails {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub download_source: Option<DownloadSource>,
    #[serde(default)]
    pub download_link: String,
}

/// Type-specific booking fields, discriminated by `bookingType`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "bookingType")]
pub enum BookingDetails {
    #[serde(rename = "Incoming Feed")]
    IncomingFeed(IncomingFeedDetails),
    #[serde(rename = "Invite Guest for News")]
    InviteGuestNews(GuestDetails),
    #[serde(rename = "Invite Guest for Program")]
    InviteGuestProgram(GuestDetails),
    #[serde(rename = "Download and Ingest")]
    DownloadIngest(DownloadDetails),
}

impl BookingDetails {
    pub fn booking_type(&self) -> BookingType {
        match self {
            BookingDetails::IncomingFeed(_) => BookingType::IncomingFeed,
            BookingDetails::InviteGuestNews(_) => BookingType::InviteGuestNews,
            BookingDetails::InviteGuestProgram(_) => BookingType::InviteGuestProgram,
            BookingDetails::DownloadIngest(_) => BookingType::DownloadIngest,
        }
    }

    /// Empty details for a booking type
    pub fn empty(booking_type: BookingType) -> Self {
        match booking_type {
            BookingType::IncomingFeed => BookingDetails::IncomingFeed(Default::default()),
            BookingType::InviteGuestNews => BookingDetails::InviteGuestNews(Default::default()),
            BookingType::InviteGuestProgram => {
                BookingDetails::InviteGuestProgram(Default::default())
            }
            BookingType::DownloadIngest => BookingDetails::DownloadIngest(Default::default()),
        }
    }
}

/// Editable booking form
///
/// Drafts may leave any field unset; `validation::validate_submission`
/// decides whether the form is complete enough to enter the workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingForm {
    #[serde(flatten)]
    pub details: BookingDetails,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub program: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub studio: Option<Studio>,
    #[serde(default, with = "crate::time::form_datetime")]
    pub air_date_time: Option<NaiveDateTime>,
    #[serde(default, with = "crate::time::form_datetime")]
    pub feed_start_time: Option<NaiveDateTime>,
    #[serde(default, with = "crate::time::form_datetime")]
    pub feed_end_time: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub language: Option<Language>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub noc_required: Option<YesNo>,
    #[serde(default)]
    pub resources_needed: String,
    #[serde(default)]
    pub newsroom_ticket: String,
    #[serde(default)]
    pub compliance_tags: String,
    #[serde(default)]
    pub notes: String,
}

impl BookingForm {
    /// Blank form for a booking type
    pub fn new(booking_type: BookingType) -> Self {
        Self {
            details: BookingDetails::empty(booking_type),
            title: String::new(),
            program: String::new(),
            studio: None,
            air_date_time: None,
            feed_start_time: None,
            feed_end_time: None,
            language: None,
            priority: None,
            noc_required: None,
            resources_needed: String::new(),
            newsroom_ticket: String::new(),
            compliance_tags: String::new(),
            notes: String::new(),
        }
    }

    pub fn booking_type(&self) -> BookingType {
        self.details.booking_type()
    }

    /// Whether the NOC team has to handle this booking
    pub fn needs_noc(&self) -> bool {
        self.noc_required == Some(YesNo::Yes)
    }

    /// Parse a form from a JSON object
    ///
    /// A missing or blank `bookingType` is reported as a field error rather
    /// than a parse failure, since it is the first thing the form asks for.
    pub fn from_json(value: Value) -> Result<Self> {
        let has_type = value
            .get("bookingType")
            .and_then(Value::as_str)
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false);
        if !has_type {
            let mut errors = ValidationErrors::default();
            errors.add("bookingType", "Please select a booking type");
            return Err(WorkflowError::Incomplete(errors).into());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Apply a partial update
    ///
    /// Keys present in `patch` replace the current values; switching
    /// `bookingType` swaps the detail fields for the new type.
    pub fn merged(&self, patch: &Map<String, Value>) -> Result<Self> {
        let mut current = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => return Err(Error::Internal("Form did not serialize to an object".into())),
        };
        for (key, value) in patch {
            current.insert(key.clone(), value.clone());
        }
        Self::from_json(Value::Object(current))
    }
}

/// A booking request moving through the workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRequest {
    pub id: String,
    #[serde(flatten)]
    pub form: BookingForm,
    pub status: WorkflowStatus,
    /// Where ingest stored the content (set on completion)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_path: Option<String>,
    /// Why ingest could not be done (set on Not Done)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_done_reason: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Audit entry for a status change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTransition {
    pub id: String,
    pub request_id: String,
    pub from_status: WorkflowStatus,
    pub to_status: WorkflowStatus,
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
    pub comment: String,
}

/// Resource the NOC team assigned to a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAssignment {
    pub id: String,
    pub request_id: String,
    pub resource_type: String,
    pub resource_name: String,
    pub assigned_by: String,
    pub assigned_at: DateTime<Utc>,
}

/// Resource type recorded for NOC assignments
pub const EQUIPMENT_RESOURCE_TYPE: &str = "Equipment";
