use chrono::{DateTime, NaiveDate, Utc};

use profnet_types::{MailboxEntry, Message, Profile};

use crate::console::Console;

pub const RULE: &str = "---------";
pub const SEPARATOR: &str = ".........................";

pub fn greeting(console: &mut dyn Console) {
    console.println("");
    console.println("*******************************************************");
    console.println("              ProfNetwork User Interface");
    console.println("*******************************************************");
    console.println("");
}

pub fn timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn date(d: &NaiveDate) -> String {
    d.format("%Y/%m/%d").to_string()
}

fn end_date(d: &Option<NaiveDate>) -> String {
    d.as_ref().map(date).unwrap_or_else(|| "present".to_string())
}

pub fn print_profile(console: &mut dyn Console, profile: &Profile) {
    let user = &profile.user;

    console.println("");
    console.println(&format!("{}'s PROFILE:", user.display_name()));
    console.println(RULE);
    if let Some(name) = &user.name {
        console.println(&format!("Name: {}", name));
    }
    console.println(&format!("Login: {}", user.user_id));
    console.println(&format!("Email: {}", user.email));
    if let Some(dob) = &user.date_of_birth {
        console.println(&format!("Date of Birth: {}", date(dob)));
    }
    console.println(RULE);

    if !profile.work.is_empty() {
        console.println("Work Experience: ");
        for w in &profile.work {
            console.println("");
            console.println(&format!("Company: {}", w.company));
            console.println(&format!("Role: {}", w.role));
            console.println(&format!("Location: {}", w.location));
            console.println(&format!("Start Date: {}", date(&w.start_date)));
            console.println(&format!("End Date: {}", end_date(&w.end_date)));
        }
        console.println(RULE);
    }

    if !profile.education.is_empty() {
        console.println("Education Experience: ");
        for e in &profile.education {
            console.println("");
            console.println(&format!("Institution Name: {}", e.institution));
            console.println(&format!("Major: {}", e.major));
            console.println(&format!("Degree: {}", e.degree));
            console.println(&format!("Start Date: {}", date(&e.start_date)));
            console.println(&format!("End Date: {}", end_date(&e.end_date)));
        }
        console.println(RULE);
    }
}

/// `counterpart timestamp Unread|Read`
pub fn mailbox_line(entry: &MailboxEntry) -> String {
    format!(
        "{} {} {}",
        entry.counterpart,
        timestamp(&entry.sent_at),
        entry.status.read_label()
    )
}

pub fn message_body(message: &Message) -> Vec<String> {
    vec![
        format!("From: {}  To: {}", message.sender_id, message.receiver_id),
        format!("Sent: {}", timestamp(&message.sent_at)),
        String::new(),
        message.contents.clone(),
        String::new(),
    ]
}
