//! Application State and Logic
//!
//! This module defines the screen state for the splitbill TUI. It manages:
//!
//! - The ledger (friends, selection, add-friend form visibility)
//! - Which panel has keyboard focus
//! - Add-friend and split-bill form buffers and their validation
//! - Status messages after each action
//!
//! `App::handle_key` maps a key press to ledger operations, and `run_app` is
//! the event loop that draws and feeds keys to it.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::Backend, widgets::ListState, Terminal};
use splitbill_core::{
    describe_balance, format_amount, parse_amount, FriendId, Ledger, LedgerError, NewFriend,
    Payer, SplitBill, DEFAULT_IMAGE,
};
use std::time::Duration;
use tracing::{debug, info};

pub type AppResult<T> = Result<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Friends,
    AddForm,
    SplitForm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Success(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddFriendForm {
    pub name: String,
    pub image: String,
    pub selected_field: usize,
    pub error: Option<String>,
}

impl Default for AddFriendForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            image: DEFAULT_IMAGE.to_string(),
            selected_field: 0,
            error: None,
        }
    }
}

impl AddFriendForm {
    pub const FIELDS: usize = 2;

    fn field_mut(&mut self) -> &mut String {
        match self.selected_field {
            0 => &mut self.name,
            _ => &mut self.image,
        }
    }

    pub fn handle_char(&mut self, c: char) {
        self.field_mut().push(c);
        self.error = None;
    }

    pub fn handle_backspace(&mut self) {
        self.field_mut().pop();
        self.error = None;
    }

    /// Validates the fields and builds a friend with a fresh id.
    pub fn submit(&self) -> Result<NewFriend, LedgerError> {
        let name = self.name.trim();
        let image = self.image.trim();
        if name.is_empty() {
            return Err(LedgerError::EmptyField("friend name"));
        }
        if image.is_empty() {
            return Err(LedgerError::EmptyField("image URL"));
        }
        Ok(NewFriend::with_random_id(name, image))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitForm {
    /// Friend this form was opened for; a different selection resets it.
    pub friend: Option<FriendId>,
    pub bill: String,
    pub paid_by_user: String,
    pub payer: Payer,
    pub selected_field: usize,
    pub error: Option<String>,
}

impl SplitForm {
    pub const FIELDS: usize = 3;
    pub const PAYER_FIELD: usize = 2;

    pub fn for_friend(friend: FriendId) -> Self {
        Self {
            friend: Some(friend),
            ..Default::default()
        }
    }

    /// The friend's share as shown in the read-only field, blank until the bill parses.
    pub fn paid_by_friend(&self) -> String {
        let Ok(bill) = parse_amount("bill value", &self.bill) else {
            return String::new();
        };
        let paid = parse_amount("your expense", &self.paid_by_user).unwrap_or(0);
        format_amount(bill - paid)
    }

    /// Typing only accepts amount characters, and an expense above the bill
    /// is refused so the field keeps its previous value.
    pub fn handle_char(&mut self, c: char) {
        if !(c.is_ascii_digit() || c == '.') {
            return;
        }
        match self.selected_field {
            0 => self.bill.push(c),
            1 => {
                let mut candidate = self.paid_by_user.clone();
                candidate.push(c);
                if let (Ok(bill), Ok(paid)) = (
                    parse_amount("bill value", &self.bill),
                    parse_amount("your expense", &candidate),
                ) {
                    if paid > bill {
                        return;
                    }
                }
                self.paid_by_user = candidate;
            }
            _ => return,
        }
        self.error = None;
    }

    pub fn handle_backspace(&mut self) {
        match self.selected_field {
            0 => {
                self.bill.pop();
            }
            1 => {
                self.paid_by_user.pop();
            }
            _ => return,
        }
        self.error = None;
    }

    pub fn to_split(&self) -> Result<SplitBill, LedgerError> {
        let bill = parse_amount("bill value", &self.bill)?;
        let paid_by_user = parse_amount("your expense", &self.paid_by_user)?;
        let split = SplitBill::new(bill, paid_by_user, self.payer);
        split.paid_by_friend()?;
        Ok(split)
    }
}

pub struct App {
    pub ledger: Ledger,
    pub currency: String,
    pub focus: Focus,
    pub running: bool,

    // Friend list cursor
    pub friend_state: ListState,

    pub add_form: AddFriendForm,
    pub split_form: SplitForm,

    pub status: Option<Status>,
}

impl App {
    pub fn new(ledger: Ledger, currency: impl Into<String>) -> Self {
        let mut friend_state = ListState::default();
        if !ledger.roster().is_empty() {
            friend_state.select(Some(0));
        }

        Self {
            ledger,
            currency: currency.into(),
            focus: Focus::Friends,
            running: true,
            friend_state,
            add_form: AddFriendForm::default(),
            split_form: SplitForm::default(),
            status: None,
        }
    }

    pub fn cursor_friend_id(&self) -> Option<FriendId> {
        let idx = self.friend_state.selected()?;
        self.ledger.roster().get(idx).map(|f| f.id.clone())
    }

    pub fn select_next(&mut self) {
        let i = self.friend_state.selected().unwrap_or(0);
        if i < self.ledger.roster().len().saturating_sub(1) {
            self.friend_state.select(Some(i + 1));
        }
    }

    pub fn select_prev(&mut self) {
        let i = self.friend_state.selected().unwrap_or(0);
        if i > 0 {
            self.friend_state.select(Some(i - 1));
        }
    }

    pub fn toggle_add_form(&mut self) {
        let snapshot = self.ledger.toggle_add_form();
        // The form starts from its defaults every time it opens.
        self.add_form = AddFriendForm::default();
        self.focus = if snapshot.add_form_open {
            Focus::AddForm
        } else {
            Focus::Friends
        };
        self.sync_focus();
    }

    /// Select (or deselect) the friend under the cursor.
    pub fn select_cursor_friend(&mut self) {
        let Some(id) = self.cursor_friend_id() else {
            return;
        };
        let was_open = self.ledger.is_add_form_open();
        match self.ledger.select_friend(&id) {
            Ok(snapshot) => {
                if was_open {
                    self.add_form = AddFriendForm::default();
                }
                match snapshot.selected {
                    Some(selected) => {
                        if self.split_form.friend.as_ref() != Some(&selected) {
                            self.split_form = SplitForm::for_friend(selected);
                        }
                        self.focus = Focus::SplitForm;
                    }
                    None => {
                        self.split_form = SplitForm::default();
                        self.focus = Focus::Friends;
                    }
                }
                self.status = None;
            }
            Err(e) => self.status = Some(Status::Error(e.to_string())),
        }
    }

    pub fn submit_add_friend(&mut self) {
        let friend = match self.add_form.submit() {
            Ok(friend) => friend,
            Err(e) => {
                self.add_form.error = Some(e.to_string());
                return;
            }
        };
        let name = friend.name.clone();
        match self.ledger.add_friend(friend) {
            Ok(snapshot) => {
                info!(%name, "friend added from form");
                self.add_form = AddFriendForm::default();
                self.friend_state.select(Some(snapshot.roster.len() - 1));
                self.status = Some(Status::Success(format!("Added {}", name)));
                self.focus = Focus::Friends;
            }
            Err(e) => self.add_form.error = Some(e.to_string()),
        }
    }

    pub fn submit_split(&mut self) {
        let split = match self.split_form.to_split() {
            Ok(split) => split,
            Err(e) => {
                self.split_form.error = Some(e.to_string());
                return;
            }
        };
        let friend_id = self.ledger.selected().cloned();
        match self.ledger.split_bill(split) {
            Ok(snapshot) => {
                let message = friend_id
                    .and_then(|id| snapshot.roster.iter().find(|f| f.id == id))
                    .map(|f| describe_balance(&f.name, f.balance, &self.currency))
                    .unwrap_or_else(|| "Split recorded".to_string());
                info!(%message, "split recorded from form");
                self.split_form = SplitForm::default();
                self.status = Some(Status::Success(message));
                self.focus = Focus::Friends;
            }
            Err(e) => self.split_form.error = Some(e.to_string()),
        }
    }

    /// Keep focus on a panel that is actually on screen.
    fn sync_focus(&mut self) {
        match self.focus {
            Focus::AddForm if !self.ledger.is_add_form_open() => self.focus = Focus::Friends,
            Focus::SplitForm if self.ledger.selected().is_none() => self.focus = Focus::Friends,
            _ => {}
        }
    }

    fn focus_next_panel(&mut self) {
        if self.ledger.is_add_form_open() {
            self.focus = Focus::AddForm;
        } else if self.ledger.selected().is_some() {
            self.focus = Focus::SplitForm;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.running = false;
            return;
        }

        match self.focus {
            Focus::Friends => self.handle_friends_key(key.code),
            Focus::AddForm => self.handle_add_form_key(key.code),
            Focus::SplitForm => self.handle_split_form_key(key.code),
        }
        self.sync_focus();
    }

    fn handle_friends_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.select_prev(),
            KeyCode::Home if !self.ledger.roster().is_empty() => {
                self.friend_state.select(Some(0));
            }
            KeyCode::End => {
                let len = self.ledger.roster().len();
                if len > 0 {
                    self.friend_state.select(Some(len - 1));
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.select_cursor_friend(),
            KeyCode::Char('a') => self.toggle_add_form(),
            KeyCode::Tab => self.focus_next_panel(),
            _ => {}
        }
    }

    fn handle_add_form_key(&mut self, code: KeyCode) {
        let fields = AddFriendForm::FIELDS;
        match code {
            // Esc acts as the "Close" button
            KeyCode::Esc => self.toggle_add_form(),
            KeyCode::Tab | KeyCode::Down => {
                self.add_form.selected_field = (self.add_form.selected_field + 1) % fields;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.add_form.selected_field = (self.add_form.selected_field + fields - 1) % fields;
            }
            KeyCode::Enter => self.submit_add_friend(),
            KeyCode::Backspace => self.add_form.handle_backspace(),
            KeyCode::Char(c) => self.add_form.handle_char(c),
            _ => {}
        }
    }

    fn handle_split_form_key(&mut self, code: KeyCode) {
        let fields = SplitForm::FIELDS;
        let on_payer = self.split_form.selected_field == SplitForm::PAYER_FIELD;
        match code {
            KeyCode::Esc => self.focus = Focus::Friends,
            KeyCode::Tab | KeyCode::Down => {
                self.split_form.selected_field = (self.split_form.selected_field + 1) % fields;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.split_form.selected_field =
                    (self.split_form.selected_field + fields - 1) % fields;
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') if on_payer => {
                self.split_form.payer = self.split_form.payer.toggle();
                debug!(payer = ?self.split_form.payer, "payer changed");
            }
            KeyCode::Enter => self.submit_split(),
            KeyCode::Backspace => self.split_form.handle_backspace(),
            KeyCode::Char(c) => self.split_form.handle_char(c),
            _ => {}
        }
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> AppResult<()> {
    loop {
        terminal.draw(|f| super::views::draw(f, &mut app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if !app.running {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn seeded_app() -> App {
        App::new(Ledger::seeded(), "£")
    }

    #[test]
    fn enter_selects_and_focuses_split_form() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.ledger.selected(), Some(&FriendId::from(118836u64)));
        assert_eq!(app.focus, Focus::SplitForm);
    }

    #[test]
    fn selecting_same_friend_again_closes_split_form() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.focus, Focus::Friends);
        press(&mut app, KeyCode::Enter);
        assert!(app.ledger.selected().is_none());
        assert_eq!(app.focus, Focus::Friends);
    }

    #[test]
    fn split_with_user_paying_updates_clark() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "20");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "5");
        assert_eq!(app.split_form.paid_by_friend(), "15.00");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.ledger.roster()[0].balance, 800);
        assert!(app.ledger.selected().is_none());
        assert_eq!(
            app.status,
            Some(Status::Success("Clark owes you £8.00".to_string()))
        );
    }

    #[test]
    fn split_with_friend_paying_updates_clark() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "20");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "5");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.split_form.payer, Payer::Friend);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.ledger.roster()[0].balance, -1200);
    }

    #[test]
    fn expense_above_bill_is_refused_while_typing() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "20");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "25");
        assert_eq!(app.split_form.paid_by_user, "2");
    }

    #[test]
    fn empty_split_shows_error_and_keeps_selection() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        assert_eq!(
            app.split_form.error.as_deref(),
            Some("bill value must not be empty")
        );
        assert!(app.ledger.selected().is_some());
    }

    #[test]
    fn add_friend_flow_appends_and_closes_form() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Char('a'));
        assert!(app.ledger.is_add_form_open());
        assert_eq!(app.focus, Focus::AddForm);

        type_str(&mut app, "Dana");
        press(&mut app, KeyCode::Enter);

        let roster = app.ledger.roster();
        assert_eq!(roster.len(), 4);
        assert_eq!(roster[3].name, "Dana");
        assert_eq!(roster[3].balance, 0);
        assert!(roster[3].image.starts_with("https://i.pravatar.cc/48?="));
        assert!(!app.ledger.is_add_form_open());
        assert_eq!(app.friend_state.selected(), Some(3));
    }

    #[test]
    fn add_friend_requires_name() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.ledger.roster().len(), 3);
        assert_eq!(
            app.add_form.error.as_deref(),
            Some("friend name must not be empty")
        );
    }

    #[test]
    fn esc_closes_add_form() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Char('a'));
        type_str(&mut app, "Zed");
        press(&mut app, KeyCode::Esc);
        assert!(!app.ledger.is_add_form_open());
        assert_eq!(app.focus, Focus::Friends);
        assert!(app.add_form.name.is_empty());
    }

    #[test]
    fn selecting_friend_closes_add_form() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Char('a'));
        app.focus = Focus::Friends;
        press(&mut app, KeyCode::Enter);
        assert!(!app.ledger.is_add_form_open());
        assert_eq!(app.focus, Focus::SplitForm);
    }

    #[test]
    fn switching_friend_resets_split_form() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "30");
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.ledger.selected(), Some(&FriendId::from(933372u64)));
        assert!(app.split_form.bill.is_empty());
    }

    #[test]
    fn q_types_into_forms_but_quits_from_list() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('q'));
        assert!(app.running);
        assert_eq!(app.add_form.name, "q");
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn ctrl_c_quits_anywhere() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Enter);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.running);
    }
}
