//! Row types, one per table, as read back from SQLite.
//! Distinct from profnet-types models to keep the DB layer independent.

pub struct UserRow {
    pub user_id: String,
    pub password: String,
    pub email: String,
    pub name: Option<String>,
    pub date_of_birth: Option<String>,
    pub created_at: String,
}

pub struct WorkExperienceRow {
    pub id: i64,
    pub user_id: String,
    pub company: String,
    pub role: String,
    pub location: String,
    pub start_date: String,
    pub end_date: Option<String>,
}

pub struct EducationRow {
    pub id: i64,
    pub user_id: String,
    pub institution: String,
    pub major: String,
    pub degree: String,
    pub start_date: String,
    pub end_date: Option<String>,
}

pub struct ConnectionRow {
    pub id: i64,
    pub requester_id: String,
    pub recipient_id: String,
    pub status: String,
    pub created_at: String,
}

pub struct MessageRow {
    pub id: i64,
    pub sender_id: String,
    pub receiver_id: String,
    pub contents: String,
    pub sent_at: String,
    pub status: String,
    pub delete_status: i64,
}

/// Mailbox listing row: `counterpart` is the sender for received mail and
/// the receiver for sent mail.
pub struct MailboxRow {
    pub id: i64,
    pub counterpart: String,
    pub sent_at: String,
    pub status: String,
}
