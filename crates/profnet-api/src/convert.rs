//! Row → domain conversions. Corrupt stored values are logged and replaced
//! with a default rather than failing the whole listing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;

use profnet_db::models::{
    ConnectionRow, EducationRow, MailboxRow, MessageRow, UserRow, WorkExperienceRow,
};
use profnet_types::{
    Connection, ConnectionStatus, DeleteFlag, EducationDetail, MailboxEntry, Message,
    MessageStatus, Party, User, WorkExperience,
};

use crate::error::FlowError;

/// Format dates are stored in.
pub const STORED_DATE_FORMAT: &str = "%Y-%m-%d";
/// Format users type dates in.
pub const INPUT_DATE_FORMAT: &str = "%Y/%m/%d";

pub fn parse_timestamp(raw: &str, what: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            // Parse as naive UTC and convert.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on {}: {}", raw, what, e);
            DateTime::default()
        })
}

fn parse_stored_date(raw: &str, what: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, STORED_DATE_FORMAT).unwrap_or_else(|e| {
        warn!("Corrupt date '{}' on {}: {}", raw, what, e);
        NaiveDate::default()
    })
}

/// Parse a user-typed `YYYY/MM/DD` date.
pub fn parse_input_date(raw: &str) -> Result<NaiveDate, FlowError> {
    NaiveDate::parse_from_str(raw.trim(), INPUT_DATE_FORMAT)
        .map_err(|_| FlowError::InvalidDate(raw.trim().to_string()))
}

pub fn store_date(date: NaiveDate) -> String {
    date.format(STORED_DATE_FORMAT).to_string()
}

pub fn user(row: UserRow) -> User {
    let what = format!("user '{}'", row.user_id);
    User {
        created_at: parse_timestamp(&row.created_at, &what),
        date_of_birth: row.date_of_birth.as_deref().map(|d| parse_stored_date(d, &what)),
        user_id: row.user_id,
        email: row.email,
        name: row.name.filter(|n| !n.is_empty()),
    }
}

pub fn work(row: WorkExperienceRow) -> WorkExperience {
    let what = format!("work experience {}", row.id);
    WorkExperience {
        start_date: parse_stored_date(&row.start_date, &what),
        end_date: row.end_date.as_deref().map(|d| parse_stored_date(d, &what)),
        id: row.id,
        user_id: row.user_id,
        company: row.company,
        role: row.role,
        location: row.location,
    }
}

pub fn education(row: EducationRow) -> EducationDetail {
    let what = format!("education detail {}", row.id);
    EducationDetail {
        start_date: parse_stored_date(&row.start_date, &what),
        end_date: row.end_date.as_deref().map(|d| parse_stored_date(d, &what)),
        id: row.id,
        user_id: row.user_id,
        institution: row.institution,
        major: row.major,
        degree: row.degree,
    }
}

pub fn connection(row: ConnectionRow) -> Connection {
    let what = format!("connection {}", row.id);
    Connection {
        status: row.status.parse().unwrap_or_else(|e| {
            warn!("{} on {}", e, what);
            ConnectionStatus::Reject
        }),
        created_at: parse_timestamp(&row.created_at, &what),
        id: row.id,
        requester_id: row.requester_id,
        recipient_id: row.recipient_id,
    }
}

fn message_status(raw: &str, what: &str) -> MessageStatus {
    raw.parse().unwrap_or_else(|e| {
        warn!("{} on {}", e, what);
        MessageStatus::FailedToDeliver
    })
}

pub fn message(row: MessageRow) -> Message {
    let what = format!("message {}", row.id);
    Message {
        sent_at: parse_timestamp(&row.sent_at, &what),
        status: message_status(&row.status, &what),
        delete_flag: DeleteFlag::from_code(row.delete_status).unwrap_or_else(|e| {
            warn!("{} on {}", e, what);
            DeleteFlag::HiddenFromBoth
        }),
        id: row.id,
        sender_id: row.sender_id,
        receiver_id: row.receiver_id,
        contents: row.contents,
    }
}

pub fn mailbox_entry(row: MailboxRow, party: Party) -> MailboxEntry {
    let what = format!("message {}", row.id);
    MailboxEntry {
        sent_at: parse_timestamp(&row.sent_at, &what),
        status: message_status(&row.status, &what),
        id: row.id,
        counterpart: row.counterpart,
        party,
    }
}
