use tracing::{debug, info};

use profnet_db::Database;
use profnet_types::{DeleteFlag, MAX_MESSAGE_LEN, MailboxEntry, Message, MessageStatus, Party};

use crate::convert;
use crate::error::{FlowError, FlowResult};

/// Store a new message. Bodies over [`MAX_MESSAGE_LEN`] characters are
/// refused before anything is written.
pub fn send_message(
    db: &Database,
    sender: &str,
    receiver: &str,
    contents: &str,
) -> FlowResult<Message> {
    if sender == receiver {
        return Err(FlowError::InvalidInput("you cannot message yourself".into()));
    }
    let len = contents.chars().count();
    if len > MAX_MESSAGE_LEN {
        return Err(FlowError::MessageTooLong { len, limit: MAX_MESSAGE_LEN });
    }
    if !db.user_exists(receiver)? {
        return Err(FlowError::UserNotFound(receiver.to_string()));
    }

    let id = db.insert_message(sender, receiver, contents, MessageStatus::Delivered.as_str())?;
    info!(id, sender, receiver, "Message sent");

    db.get_message(id)?
        .map(convert::message)
        .ok_or(FlowError::MessageNotFound(id))
}

/// Received messages still visible to `user_id`.
pub fn inbox(db: &Database, user_id: &str) -> FlowResult<Vec<MailboxEntry>> {
    Ok(db
        .get_inbox(user_id)?
        .into_iter()
        .map(|row| convert::mailbox_entry(row, Party::Receiver))
        .collect())
}

/// Sent messages still visible to `user_id`.
pub fn sent(db: &Database, user_id: &str) -> FlowResult<Vec<MailboxEntry>> {
    Ok(db
        .get_sent(user_id)?
        .into_iter()
        .map(|row| convert::mailbox_entry(row, Party::Sender))
        .collect())
}

/// Received then sent, the order mailbox screens number them in.
pub fn mailbox(db: &Database, user_id: &str) -> FlowResult<Vec<MailboxEntry>> {
    let mut entries = inbox(db, user_id)?;
    entries.extend(sent(db, user_id)?);
    Ok(entries)
}

/// Fetch a message for display. Opening a delivered message as its receiver
/// marks it read.
pub fn open_message(db: &Database, viewer: &str, id: i64) -> FlowResult<Message> {
    let mut message = visible_message(db, viewer, id)?;

    if message.party_of(viewer) == Some(Party::Receiver)
        && message.status == MessageStatus::Delivered
    {
        db.mark_message_read(id)?;
        message.status = MessageStatus::Read;
        debug!(id, viewer, "Message marked read");
    }

    Ok(message)
}

/// Hide a message from `viewer`'s side. Deleting again is a no-op.
pub fn delete_message(db: &Database, viewer: &str, id: i64) -> FlowResult<DeleteFlag> {
    let party = db
        .get_message(id)?
        .map(convert::message)
        .and_then(|m| m.party_of(viewer))
        .ok_or(FlowError::MessageNotFound(id))?;

    let stored = db.update_delete_status(id, |row| {
        let current = DeleteFlag::from_code(row.delete_status)?;
        Ok(current.hide_from(party).code())
    })?;

    let code = stored.ok_or(FlowError::MessageNotFound(id))?;
    let flag = DeleteFlag::from_code(code).map_err(anyhow::Error::from)?;
    info!(id, viewer, flag = code, "Message deleted");
    Ok(flag)
}

fn visible_message(db: &Database, viewer: &str, id: i64) -> FlowResult<Message> {
    let message = db
        .get_message(id)?
        .map(convert::message)
        .ok_or(FlowError::MessageNotFound(id))?;

    match message.party_of(viewer) {
        Some(party) if message.delete_flag.is_visible_to(party) => Ok(message),
        _ => Err(FlowError::MessageNotFound(id)),
    }
}
