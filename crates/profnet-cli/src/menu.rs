//! Console menus as a finite-state stack.
//!
//! The state is a stack of [`Screen`]s; the top one is shown. Each screen is
//! turned into a [`Page`] of numbered choices built from the current store
//! contents, and the selected [`Action`] is the transition: push a screen,
//! pop back, or run a flow and stay put. An empty stack ends the session.

use tracing::{info, warn};

use profnet_api::{FlowError, auth, connections, graph, messages, profile};
use profnet_db::Database;
use profnet_types::api::{LoginRequest, NewEducationDetail, NewWorkExperience, RegisterRequest};
use profnet_types::{MAX_MESSAGE_LEN, Party};

use crate::console::Console;
use crate::views::{self, RULE, SEPARATOR};

/// Answer that abandons a work/education entry at any prompt.
const QUIT_ANSWER: &str = "q";

const LOGIN_PROMPT: &str = "\tEnter user login: ";
const PASSWORD_PROMPT: &str = "\tEnter user password: ";
const START_DATE_PROMPT: &str = "Please enter the start date in the form of YYYY/MM/DD: ";
const END_DATE_PROMPT: &str = "Please enter the end date in the form of YYYY/MM/DD (empty if current): ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Home,
    UpdateProfile,
    FriendList,
    SearchResults { keyword: String },
    Profile { user_id: String },
    Messages,
    ReadMessages,
    MessageView { id: i64 },
    DeleteMessages,
    ConnectionRequests,
    AnswerRequest { requester: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Open(Screen),
    Back,
    Quit,
    Register,
    Login,
    Logout,
    DisplayOwnProfile,
    Search,
    ChangePassword,
    ChangeEmail,
    ChangeName,
    ChangeDateOfBirth,
    AddWork,
    AddEducation,
    ViewProfile(String),
    SendConnection(String),
    SendMessage(String),
    DeleteMessage(i64),
    Accept(String),
    Reject(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Text(String),
    Choice(String, Action),
}

/// What one screen shows: a title, then lines and numbered choices in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub entries: Vec<Entry>,
}

impl Page {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            entries: Vec::new(),
        }
    }

    pub fn text(mut self, line: impl Into<String>) -> Self {
        self.entries.push(Entry::Text(line.into()));
        self
    }

    pub fn choice(mut self, label: impl Into<String>, action: Action) -> Self {
        self.entries.push(Entry::Choice(label.into(), action));
        self
    }

    pub fn separator(self) -> Self {
        self.text(SEPARATOR)
    }

    pub fn choices(&self) -> impl Iterator<Item = (&str, &Action)> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Choice(label, action) => Some((label.as_str(), action)),
            Entry::Text(_) => None,
        })
    }

    /// Action behind the 1-based menu number `n`.
    pub fn action(&self, n: i64) -> Option<&Action> {
        let idx = usize::try_from(n).ok()?.checked_sub(1)?;
        self.choices().nth(idx).map(|(_, action)| action)
    }

    pub fn render(&self, console: &mut dyn Console) {
        console.println("");
        console.println(&self.title);
        console.println(RULE);
        let mut n = 0;
        for entry in &self.entries {
            match entry {
                Entry::Text(line) => console.println(line),
                Entry::Choice(label, _) => {
                    n += 1;
                    console.println(&format!("{}. {}", n, label));
                }
            }
        }
    }
}

/// Prompt until a number is typed. `None` at end of input.
pub fn read_choice(console: &mut dyn Console) -> Option<i64> {
    loop {
        let line = console.prompt("Please make your choice: ")?;
        match line.trim().parse::<i64>() {
            Ok(n) => return Some(n),
            Err(_) => console.println("Your input is invalid!"),
        }
    }
}

/// One interactive session over a store: who is logged in and which screens
/// are open.
pub struct Session<'a> {
    db: &'a Database,
    user: Option<String>,
    stack: Vec<Screen>,
}

impl<'a> Session<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            user: None,
            stack: vec![Screen::Welcome],
        }
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn stack(&self) -> &[Screen] {
        &self.stack
    }

    pub fn current(&self) -> Option<&Screen> {
        self.stack.last()
    }

    /// Show screens and apply choices until the user exits or input ends.
    pub fn run(&mut self, console: &mut dyn Console) {
        while let Some(screen) = self.current().cloned() {
            let page = match self.page(&screen) {
                Ok(page) => page,
                Err(e) => {
                    report(console, &e);
                    self.stack.pop();
                    continue;
                }
            };
            page.render(console);

            match select(&page, console) {
                Some(action) => self.apply(action, console),
                None => self.stack.clear(),
            }
        }
    }

    fn logged_in(&self) -> Result<&str, FlowError> {
        self.user.as_deref().ok_or(FlowError::InvalidCredentials)
    }

    /// Build the page for `screen` from the current store contents.
    pub fn page(&self, screen: &Screen) -> Result<Page, FlowError> {
        let page = match screen {
            Screen::Welcome => Page::new("MAIN MENU")
                .choice("Create user", Action::Register)
                .choice("Log in", Action::Login)
                .choice("< EXIT", Action::Quit),

            Screen::Home => Page::new("MAIN MENU")
                .choice("Go to Friend List", Action::Open(Screen::FriendList))
                .choice("Update Profile", Action::Open(Screen::UpdateProfile))
                .choice("Display Your Profile", Action::DisplayOwnProfile)
                .choice("Search for People", Action::Search)
                .choice("View/Edit Messages", Action::Open(Screen::Messages))
                .choice(
                    "View/Reject Connection Requests",
                    Action::Open(Screen::ConnectionRequests),
                )
                .separator()
                .choice("Log out", Action::Logout),

            Screen::UpdateProfile => Page::new("UPDATE PROFILE MENU")
                .choice("Change password", Action::ChangePassword)
                .choice("Change email", Action::ChangeEmail)
                .choice("Change full name", Action::ChangeName)
                .choice("Change date of birth", Action::ChangeDateOfBirth)
                .choice("Add work experience", Action::AddWork)
                .choice("Add education details", Action::AddEducation)
                .separator()
                .choice("End update", Action::Back),

            Screen::FriendList => {
                let user = self.logged_in()?;
                let mut page =
                    Page::new("YOUR FRIENDS LIST (to view a friend's profile select their number)");
                for friend in graph::friends_of(self.db, user)? {
                    page = page.choice(friend.clone(), Action::ViewProfile(friend));
                }
                page.separator().choice("Go back", Action::Back)
            }

            Screen::SearchResults { keyword } => {
                let user = self.logged_in()?;
                let mut page = Page::new(format!("SEARCH RESULTS FOR '{}'", keyword));
                for hit in profile::search(self.db, user, keyword)? {
                    let label = match &hit.name {
                        Some(name) => format!("{} ({})", hit.user_id, name),
                        None => hit.user_id.clone(),
                    };
                    page = page.choice(label, Action::ViewProfile(hit.user_id));
                }
                page.separator().choice("Go back", Action::Back)
            }

            Screen::Profile { user_id } => Page::new(format!("{}'S PROFILE MENU", user_id))
                .choice("Send Connection", Action::SendConnection(user_id.clone()))
                .choice("Send Message", Action::SendMessage(user_id.clone()))
                .separator()
                .choice("Go Back", Action::Back),

            Screen::Messages => Page::new("MESSAGE MENU")
                .choice("View/read messages", Action::Open(Screen::ReadMessages))
                .choice("Delete messages", Action::Open(Screen::DeleteMessages))
                .separator()
                .choice("Go back", Action::Back),

            Screen::ReadMessages => self.mailbox_page("ALL MESSAGES", |id| {
                Action::Open(Screen::MessageView { id })
            })?,

            Screen::DeleteMessages => self.mailbox_page(
                "DELETE MESSAGE MENU (select a message to delete it)",
                Action::DeleteMessage,
            )?,

            Screen::MessageView { id } => {
                let user = self.logged_in()?;
                let message = messages::open_message(self.db, user, *id)?;
                let mut page = Page::new(format!("MESSAGE {}", id));
                for line in views::message_body(&message) {
                    page = page.text(line);
                }
                page.choice("Return", Action::Back)
            }

            Screen::ConnectionRequests => {
                let user = self.logged_in()?;
                let mut page = Page::new("YOUR CONNECTION REQUESTS");
                for request in connections::pending_requests(self.db, user)? {
                    let requester = request.requester_id;
                    page = page.choice(
                        requester.clone(),
                        Action::Open(Screen::AnswerRequest { requester }),
                    );
                }
                page.separator().choice("Go back", Action::Back)
            }

            Screen::AnswerRequest { requester } => {
                Page::new(format!("CONNECTION REQUEST FROM {}", requester))
                    .choice("Accept Request", Action::Accept(requester.clone()))
                    .choice("Deny Request", Action::Reject(requester.clone()))
                    .separator()
                    .choice("Return to your connection requests", Action::Back)
            }
        };
        Ok(page)
    }

    /// Received messages, then sent ones, numbered as one list.
    fn mailbox_page(
        &self,
        title: &str,
        on_select: impl Fn(i64) -> Action,
    ) -> Result<Page, FlowError> {
        let user = self.logged_in()?;
        let entries = messages::mailbox(self.db, user)?;

        let mut page = Page::new(title).text("Received Messages:").text(RULE);
        let mut in_sent = false;
        for entry in entries {
            if entry.party == Party::Sender && !in_sent {
                in_sent = true;
                page = page.text("Sent Messages:").text(RULE);
            }
            page = page.choice(views::mailbox_line(&entry), on_select(entry.id));
        }
        if !in_sent {
            page = page.text("Sent Messages:").text(RULE);
        }
        Ok(page.separator().choice("Go back", Action::Back))
    }

    /// Run `action` and move the stack accordingly. Flow failures are shown
    /// and leave the stack where it was.
    pub fn apply(&mut self, action: Action, console: &mut dyn Console) {
        if let Err(e) = self.try_apply(action, console) {
            report(console, &e);
        }
    }

    fn try_apply(&mut self, action: Action, console: &mut dyn Console) -> Result<(), FlowError> {
        match action {
            Action::Open(screen) => self.stack.push(screen),
            Action::Back => {
                self.stack.pop();
            }
            Action::Quit => self.stack.clear(),

            Action::Register => self.register(console)?,
            Action::Login => self.login(console)?,
            Action::Logout => {
                if let Some(user) = self.user.take() {
                    info!(user = %user, "Logged out");
                }
                self.stack = vec![Screen::Welcome];
            }

            Action::DisplayOwnProfile => {
                let user = self.logged_in()?;
                let profile = profile::load_profile(self.db, user)?;
                views::print_profile(console, &profile);
            }
            Action::Search => self.search(console)?,
            Action::ViewProfile(user_id) => {
                let profile = profile::load_profile(self.db, &user_id)?;
                views::print_profile(console, &profile);
                self.stack.push(Screen::Profile { user_id });
            }

            Action::ChangePassword => {
                let user = self.logged_in()?;
                let Some(pw) = console.prompt("Please input your new password: ") else {
                    return Ok(());
                };
                auth::change_password(self.db, user, &pw)?;
                console.println("Password updated!");
            }
            Action::ChangeEmail => {
                let user = self.logged_in()?;
                let Some(email) = console.prompt("Please input your new email: ") else {
                    return Ok(());
                };
                profile::change_email(self.db, user, &email)?;
                console.println("Email updated!");
            }
            Action::ChangeName => {
                let user = self.logged_in()?;
                let Some(name) = console.prompt("Please input your new name: ") else {
                    return Ok(());
                };
                profile::change_name(self.db, user, &name)?;
                console.println("Name updated!");
            }
            Action::ChangeDateOfBirth => {
                let user = self.logged_in()?;
                let Some(dob) =
                    console.prompt("Please input your date of birth in the form of YYYY/MM/DD: ")
                else {
                    return Ok(());
                };
                profile::change_date_of_birth(self.db, user, &dob)?;
                console.println("Date of birth updated!");
            }
            Action::AddWork => self.add_work(console)?,
            Action::AddEducation => self.add_education(console)?,

            Action::SendConnection(target) => {
                let user = self.logged_in()?;
                connections::request_connection(self.db, user, &target)?;
                console.println("Connection Request Sent!");
            }
            Action::SendMessage(receiver) => {
                let user = self.logged_in()?;
                console.println("");
                console.println("SEND MESSAGE:");
                console.println(RULE);
                let Some(contents) = console.prompt(&format!(
                    "Please enter your message contents (at most {} characters): ",
                    MAX_MESSAGE_LEN
                )) else {
                    return Ok(());
                };
                messages::send_message(self.db, user, &receiver, &contents)?;
                console.println("Message Sent!");
            }
            Action::DeleteMessage(id) => {
                let user = self.logged_in()?;
                messages::delete_message(self.db, user, id)?;
                console.println("Message deleted.");
            }

            Action::Accept(requester) => {
                let user = self.logged_in()?;
                connections::accept(self.db, user, &requester)?;
                console.println(&format!("You are now connected with {}!", requester));
                self.stack.pop();
            }
            Action::Reject(requester) => {
                let user = self.logged_in()?;
                connections::reject(self.db, user, &requester)?;
                console.println(&format!("Request from {} denied.", requester));
                self.stack.pop();
            }
        }
        Ok(())
    }

    fn register(&mut self, console: &mut dyn Console) -> Result<(), FlowError> {
        let labels = [LOGIN_PROMPT, PASSWORD_PROMPT, "\tEnter user email: "];
        let Some([user_id, password, email]) = fields(console, labels, None) else {
            return Ok(());
        };

        auth::register(self.db, &RegisterRequest { user_id, password, email })?;
        console.println("User successfully created!");
        Ok(())
    }

    fn login(&mut self, console: &mut dyn Console) -> Result<(), FlowError> {
        let labels = [LOGIN_PROMPT, PASSWORD_PROMPT];
        let Some([user_id, password]) = fields(console, labels, None) else {
            return Ok(());
        };

        let user = auth::login(self.db, &LoginRequest { user_id, password })?;
        self.user = Some(user.user_id);
        self.stack.push(Screen::Home);
        Ok(())
    }

    fn search(&mut self, console: &mut dyn Console) -> Result<(), FlowError> {
        let user = self.logged_in()?;
        let Some(keyword) =
            console.prompt("Please enter the login or name of the person you are looking for: ")
        else {
            return Ok(());
        };

        let hits = profile::search(self.db, user, &keyword)?;
        match hits.as_slice() {
            [] => console.println("The user does not exist!"),
            [only] if only.user_id == keyword.trim() => {
                console.println("The user exists....going to profile");
                let user_id = only.user_id.clone();
                return self.try_apply(Action::ViewProfile(user_id), console);
            }
            _ => self.stack.push(Screen::SearchResults {
                keyword: keyword.trim().to_string(),
            }),
        }
        Ok(())
    }

    fn add_work(&mut self, console: &mut dyn Console) -> Result<(), FlowError> {
        let user = self.logged_in()?.to_string();
        console.println("");
        console.println("Enter 'q' at any time to quit addition.");
        console.println("");

        let labels = [
            "Please enter the company: ",
            "Please enter your role at that company: ",
            "Please enter the location of the company: ",
            START_DATE_PROMPT,
            END_DATE_PROMPT,
        ];
        let Some([company, role, location, start, end]) =
            fields(console, labels, Some(QUIT_ANSWER))
        else {
            return Ok(());
        };

        let new = NewWorkExperience {
            company,
            role,
            location,
            start_date: profnet_api::convert::parse_input_date(&start)?,
            end_date: optional_date(&end)?,
        };
        profile::add_work_experience(self.db, &user, &new)?;
        console.println("Work experience added!!");
        Ok(())
    }

    fn add_education(&mut self, console: &mut dyn Console) -> Result<(), FlowError> {
        let user = self.logged_in()?.to_string();
        console.println("");
        console.println("Enter 'q' at any time to quit addition.");
        console.println("");

        let labels = [
            "Please enter the institution name: ",
            "Please enter your major: ",
            "Please enter your degree: ",
            START_DATE_PROMPT,
            END_DATE_PROMPT,
        ];
        let Some([institution, major, degree, start, end]) =
            fields(console, labels, Some(QUIT_ANSWER))
        else {
            return Ok(());
        };

        let new = NewEducationDetail {
            institution,
            major,
            degree,
            start_date: profnet_api::convert::parse_input_date(&start)?,
            end_date: optional_date(&end)?,
        };
        profile::add_education(self.db, &user, &new)?;
        console.println("Education experience added!!");
        Ok(())
    }
}

/// Prompt for each label in turn. `None` when input ends or, if `quit` is
/// set, when the user answers with it.
fn fields<const N: usize>(
    console: &mut dyn Console,
    labels: [&str; N],
    quit: Option<&str>,
) -> Option<[String; N]> {
    let mut answers = Vec::with_capacity(N);
    for label in labels {
        let answer = console.prompt(label)?;
        if quit.is_some_and(|q| answer.trim() == q) {
            return None;
        }
        answers.push(answer);
    }
    answers.try_into().ok()
}

fn optional_date(raw: &str) -> Result<Option<chrono::NaiveDate>, FlowError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    profnet_api::convert::parse_input_date(raw).map(Some)
}

/// Prompt until the number typed matches a choice on `page`.
fn select(page: &Page, console: &mut dyn Console) -> Option<Action> {
    loop {
        let n = read_choice(console)?;
        match page.action(n) {
            Some(action) => return Some(action.clone()),
            None => console.println("Unrecognized choice!"),
        }
    }
}

fn report(console: &mut dyn Console, e: &FlowError) {
    warn!(error = %e, "Flow failed");
    console.eprintln(&format!("Error: {}", e));
}
