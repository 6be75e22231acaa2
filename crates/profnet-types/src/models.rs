use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::ParseError;

/// Longest message body the network accepts, counted in characters.
pub const MAX_MESSAGE_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Name shown in headings: the full name when set, the login otherwise.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkExperience {
    pub id: i64,
    pub user_id: String,
    pub company: String,
    pub role: String,
    pub location: String,
    pub start_date: NaiveDate,
    /// `None` while the position is still held.
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EducationDetail {
    pub id: i64,
    pub user_id: String,
    pub institution: String,
    pub major: String,
    pub degree: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// A user together with everything shown on their profile page.
#[derive(Debug, Clone)]
pub struct Profile {
    pub user: User,
    pub work: Vec<WorkExperience>,
    pub education: Vec<EducationDetail>,
}

// -- Connections --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionStatus {
    Request,
    Accept,
    Reject,
}

impl ConnectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Request => "Request",
            Self::Accept => "Accept",
            Self::Reject => "Reject",
        }
    }

    /// Only a pending request may be answered, and only once.
    pub fn can_transition_to(self, next: ConnectionStatus) -> bool {
        matches!(
            (self, next),
            (Self::Request, Self::Accept) | (Self::Request, Self::Reject)
        )
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Request" => Ok(Self::Request),
            "Accept" => Ok(Self::Accept),
            "Reject" => Ok(Self::Reject),
            other => Err(ParseError::ConnectionStatus(other.to_string())),
        }
    }
}

/// Directed edge between two users. Friendship is any `Accept` edge,
/// whichever way it points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: i64,
    pub requester_id: String,
    pub recipient_id: String,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
}

// -- Messages --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageStatus {
    Delivered,
    Read,
    Draft,
    FailedToDeliver,
}

impl MessageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delivered => "Delivered",
            Self::Read => "Read",
            Self::Draft => "Draft",
            Self::FailedToDeliver => "Failed to Deliver",
        }
    }

    /// Label used in mailbox listings.
    pub fn read_label(self) -> &'static str {
        if self == Self::Delivered { "Unread" } else { "Read" }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Delivered" => Ok(Self::Delivered),
            "Read" => Ok(Self::Read),
            "Draft" => Ok(Self::Draft),
            "Failed to Deliver" => Ok(Self::FailedToDeliver),
            other => Err(ParseError::MessageStatus(other.to_string())),
        }
    }
}

/// Which end of a message a user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Sender,
    Receiver,
}

/// Soft-delete state of a message, stored as 0..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteFlag {
    Visible = 0,
    HiddenFromSender = 1,
    HiddenFromReceiver = 2,
    HiddenFromBoth = 3,
}

impl DeleteFlag {
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn from_code(code: i64) -> Result<Self, ParseError> {
        match code {
            0 => Ok(Self::Visible),
            1 => Ok(Self::HiddenFromSender),
            2 => Ok(Self::HiddenFromReceiver),
            3 => Ok(Self::HiddenFromBoth),
            other => Err(ParseError::DeleteFlag(other)),
        }
    }

    pub fn is_visible_to(self, party: Party) -> bool {
        match (self, party) {
            (Self::Visible, _) => true,
            (Self::HiddenFromSender, Party::Receiver) => true,
            (Self::HiddenFromReceiver, Party::Sender) => true,
            _ => false,
        }
    }

    /// Flag after `party` deletes the message. Never moves backwards, so
    /// hiding an already hidden message returns the same flag.
    pub fn hide_from(self, party: Party) -> Self {
        match (self, party) {
            (Self::Visible, Party::Sender) => Self::HiddenFromSender,
            (Self::Visible, Party::Receiver) => Self::HiddenFromReceiver,
            (Self::HiddenFromSender, Party::Receiver)
            | (Self::HiddenFromReceiver, Party::Sender) => Self::HiddenFromBoth,
            (unchanged, _) => unchanged,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: i64,
    pub sender_id: String,
    pub receiver_id: String,
    pub contents: String,
    pub sent_at: DateTime<Utc>,
    pub status: MessageStatus,
    pub delete_flag: DeleteFlag,
}

impl Message {
    /// The side `user_id` is on, or `None` for an outsider.
    pub fn party_of(&self, user_id: &str) -> Option<Party> {
        if self.receiver_id == user_id {
            Some(Party::Receiver)
        } else if self.sender_id == user_id {
            Some(Party::Sender)
        } else {
            None
        }
    }
}

/// One line of a mailbox listing, seen from `party`'s side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxEntry {
    pub id: i64,
    /// Sender for received mail, receiver for sent mail.
    pub counterpart: String,
    pub sent_at: DateTime<Utc>,
    pub status: MessageStatus,
    pub party: Party,
}
