use std::collections::HashMap;

use crate::dialog::DialogSession;
use crate::error::{Error, ErrorKind, Result};

/// Open dialogs of a host, looked up by tag.
///
/// The most recently shown open dialog holds the input focus.
#[derive(Default)]
pub struct DialogRegistry {
    sessions: HashMap<String, DialogSession>,
    order: Vec<String>,
}

impl DialogRegistry {
    pub fn new() -> Self {
        DialogRegistry::default()
    }

    pub fn show(&mut self, tag: &str, session: DialogSession) -> Result<()> {
        if self.sessions.get(tag).map_or(false, DialogSession::is_open) {
            return Err(Error::new(
                ErrorKind::DuplicateSession,
                &format!("a dialog tagged '{}' is already open", tag),
            ));
        }

        log::debug!("Showing dialog '{}'", tag);
        self.order.retain(|t| t != tag);
        self.order.push(tag.to_owned());
        self.sessions.insert(tag.to_owned(), session);
        Ok(())
    }

    pub fn find(&self, tag: &str) -> Option<&DialogSession> {
        self.sessions.get(tag)
    }

    pub fn find_mut(&mut self, tag: &str) -> Option<&mut DialogSession> {
        self.sessions.get_mut(tag)
    }

    fn focused_tag(&self) -> Option<&String> {
        self.order
            .iter()
            .rev()
            .find(|tag| self.sessions.get(*tag).map_or(false, DialogSession::is_open))
    }

    pub fn focused(&self) -> Option<&DialogSession> {
        self.focused_tag().and_then(|tag| self.sessions.get(tag))
    }

    pub fn focused_mut(&mut self) -> Option<&mut DialogSession> {
        let tag = self.focused_tag()?.clone();
        self.sessions.get_mut(&tag)
    }

    pub fn has_focus(&self) -> bool {
        self.focused_tag().is_some()
    }

    /// Removes a dialog, cancelling it if it is still open.
    pub fn dismiss(&mut self, tag: &str) -> Option<DialogSession> {
        self.order.retain(|t| t != tag);
        let mut session = self.sessions.remove(tag)?;
        if session.is_open() {
            // closing can only fail for sessions that are already closed
            let _ = session.cancel();
        }
        Some(session)
    }

    /// Drops every closed dialog.
    pub fn reap(&mut self) {
        let sessions = &mut self.sessions;
        sessions.retain(|tag, session| {
            if !session.is_open() {
                log::debug!("Tearing down dialog '{}'", tag);
            }
            session.is_open()
        });
        self.order.retain(|tag| sessions.contains_key(tag));
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
