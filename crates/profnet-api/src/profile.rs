use tracing::info;

use profnet_db::Database;
use profnet_types::api::{NewEducationDetail, NewWorkExperience};
use profnet_types::{EducationDetail, Profile, User, WorkExperience};

use crate::convert::{self, store_date};
use crate::error::{FlowError, FlowResult};

pub fn change_email(db: &Database, user_id: &str, email: &str) -> FlowResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(FlowError::InvalidInput("email must not be empty".into()));
    }
    updated(db.update_email(user_id, email)?, user_id)?;
    info!(user = user_id, "Email changed");
    Ok(())
}

pub fn change_name(db: &Database, user_id: &str, name: &str) -> FlowResult<()> {
    updated(db.update_name(user_id, name.trim())?, user_id)?;
    info!(user = user_id, "Name changed");
    Ok(())
}

/// `date_of_birth` is typed as `YYYY/MM/DD`.
pub fn change_date_of_birth(db: &Database, user_id: &str, date_of_birth: &str) -> FlowResult<()> {
    let date = convert::parse_input_date(date_of_birth)?;
    updated(db.update_date_of_birth(user_id, &store_date(date))?, user_id)?;
    info!(user = user_id, "Date of birth changed");
    Ok(())
}

pub fn add_work_experience(
    db: &Database,
    user_id: &str,
    new: &NewWorkExperience,
) -> FlowResult<WorkExperience> {
    require_text(&[("company", &new.company), ("role", &new.role), ("location", &new.location)])?;
    check_order(new.start_date, new.end_date)?;

    let start = store_date(new.start_date);
    let end = new.end_date.map(store_date);
    let id = db.insert_work_experience(
        user_id,
        new.company.trim(),
        new.role.trim(),
        new.location.trim(),
        &start,
        end.as_deref(),
    )?;
    info!(user = user_id, id, "Work experience added");

    Ok(WorkExperience {
        id,
        user_id: user_id.to_string(),
        company: new.company.trim().to_string(),
        role: new.role.trim().to_string(),
        location: new.location.trim().to_string(),
        start_date: new.start_date,
        end_date: new.end_date,
    })
}

pub fn add_education(
    db: &Database,
    user_id: &str,
    new: &NewEducationDetail,
) -> FlowResult<EducationDetail> {
    require_text(&[
        ("institution", &new.institution),
        ("major", &new.major),
        ("degree", &new.degree),
    ])?;
    check_order(new.start_date, new.end_date)?;

    let start = store_date(new.start_date);
    let end = new.end_date.map(store_date);
    let id = db.insert_education(
        user_id,
        new.institution.trim(),
        new.major.trim(),
        new.degree.trim(),
        &start,
        end.as_deref(),
    )?;
    info!(user = user_id, id, "Education added");

    Ok(EducationDetail {
        id,
        user_id: user_id.to_string(),
        institution: new.institution.trim().to_string(),
        major: new.major.trim().to_string(),
        degree: new.degree.trim().to_string(),
        start_date: new.start_date,
        end_date: new.end_date,
    })
}

pub fn get_user(db: &Database, user_id: &str) -> FlowResult<User> {
    db.get_user(user_id)?
        .map(convert::user)
        .ok_or_else(|| FlowError::UserNotFound(user_id.to_string()))
}

pub fn load_profile(db: &Database, user_id: &str) -> FlowResult<Profile> {
    let user = get_user(db, user_id)?;
    let work = db.get_work_experience(user_id)?.into_iter().map(convert::work).collect();
    let education = db.get_education(user_id)?.into_iter().map(convert::education).collect();

    Ok(Profile { user, work, education })
}

/// Users matching `keyword` by exact login or by name, excluding the viewer.
pub fn search(db: &Database, viewer: &str, keyword: &str) -> FlowResult<Vec<User>> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(FlowError::InvalidInput("search keyword must not be empty".into()));
    }
    if keyword == viewer {
        return Err(FlowError::CannotSearchSelf);
    }

    Ok(db
        .search_users(keyword)?
        .into_iter()
        .filter(|row| row.user_id != viewer)
        .map(convert::user)
        .collect())
}

fn updated(rows: usize, user_id: &str) -> FlowResult<()> {
    if rows == 0 {
        return Err(FlowError::UserNotFound(user_id.to_string()));
    }
    Ok(())
}

fn require_text(fields: &[(&str, &String)]) -> FlowResult<()> {
    for (label, value) in fields {
        if value.trim().is_empty() {
            return Err(FlowError::InvalidInput(format!("{} must not be empty", label)));
        }
    }
    Ok(())
}

fn check_order(start: chrono::NaiveDate, end: Option<chrono::NaiveDate>) -> FlowResult<()> {
    match end {
        Some(end) if end < start => Err(FlowError::DateOrder {
            start: start.to_string(),
            end: end.to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn db_with(users: &[&str]) -> Database {
        let db = Database::open_in_memory().unwrap();
        for u in users {
            db.create_user(u, "hash", &format!("{u}@x.com")).unwrap();
        }
        db
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn profile_collects_work_and_education() {
        let db = db_with(&["alice"]);
        change_name(&db, "alice", "Alice Liddell").unwrap();
        change_date_of_birth(&db, "alice", "1990/02/03").unwrap();
        add_work_experience(
            &db,
            "alice",
            &NewWorkExperience {
                company: "Acme".into(),
                role: "Engineer".into(),
                location: "Riverside".into(),
                start_date: date(2015, 1, 1),
                end_date: None,
            },
        )
        .unwrap();
        add_education(
            &db,
            "alice",
            &NewEducationDetail {
                institution: "UCR".into(),
                major: "CS".into(),
                degree: "BS".into(),
                start_date: date(2010, 9, 1),
                end_date: Some(date(2014, 6, 1)),
            },
        )
        .unwrap();

        let profile = load_profile(&db, "alice").unwrap();
        assert_eq!(profile.user.display_name(), "Alice Liddell");
        assert_eq!(profile.user.date_of_birth, Some(date(1990, 2, 3)));
        assert_eq!(profile.work.len(), 1);
        assert_eq!(profile.work[0].end_date, None);
        assert_eq!(profile.education[0].end_date, Some(date(2014, 6, 1)));
    }

    #[test]
    fn end_before_start_is_rejected() {
        let db = db_with(&["alice"]);
        let err = add_education(
            &db,
            "alice",
            &NewEducationDetail {
                institution: "UCR".into(),
                major: "CS".into(),
                degree: "BS".into(),
                start_date: date(2014, 9, 1),
                end_date: Some(date(2010, 6, 1)),
            },
        )
        .unwrap_err();
        assert!(matches!(err, FlowError::DateOrder { .. }));
        assert!(load_profile(&db, "alice").unwrap().education.is_empty());
    }

    #[test]
    fn search_excludes_the_viewer() {
        let db = db_with(&["alice", "bob", "alicia"]);
        change_name(&db, "bob", "Bob Alister").unwrap();

        assert!(matches!(search(&db, "alice", "alice"), Err(FlowError::CannotSearchSelf)));

        let hits: Vec<_> = search(&db, "alicia", "ALI").unwrap().into_iter().map(|u| u.user_id).collect();
        assert_eq!(hits, vec!["bob"]);

        assert!(search(&db, "alice", "nobody").unwrap().is_empty());
    }

    #[test]
    fn unknown_users_are_reported() {
        let db = db_with(&[]);
        assert!(matches!(change_email(&db, "ghost", "g@x.com"), Err(FlowError::UserNotFound(_))));
        assert!(matches!(load_profile(&db, "ghost"), Err(FlowError::UserNotFound(_))));
        assert!(matches!(
            change_date_of_birth(&db, "ghost", "1990-01-01"),
            Err(FlowError::InvalidDate(_))
        ));
    }
}
