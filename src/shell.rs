//! Navigation shell: which screen is visible, and the last snapshot of it.
//!
//! Every navigation hands out a [`LoadTicket`]. A load that finishes after
//! the user has navigated again carries an outdated ticket and is dropped
//! instead of overwriting the newer screen.

use serde::Serialize;
use tracing::debug;

use crate::views::{View, ViewSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub view: View,
    generation: u64,
}

#[derive(Debug, Default)]
pub struct Shell {
    selected: View,
    generation: u64,
    snapshot: Option<ViewSnapshot>,
}

/// Serializable state of the shell for `GET /api/shell`.
#[derive(Debug, Clone, Serialize)]
pub struct ShellState {
    pub selected: View,
    pub title: String,
    pub menu: Vec<View>,
    pub snapshot: Option<ViewSnapshot>,
}

impl Shell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> View {
        self.selected
    }

    pub fn snapshot(&self) -> Option<&ViewSnapshot> {
        self.snapshot.as_ref()
    }

    /// Select `view`. Any load still running for a previous navigation is
    /// invalidated, including one for the same view.
    pub fn navigate(&mut self, view: View) -> LoadTicket {
        self.generation += 1;
        if self.selected != view {
            self.snapshot = None;
        }
        self.selected = view;
        debug!(%view, generation = self.generation, "Navigated");
        LoadTicket {
            view,
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation && ticket.view == self.selected
    }

    /// Store the result of a load. Returns `false`, leaving the shell
    /// untouched, when the ticket has been superseded.
    pub fn complete(&mut self, ticket: LoadTicket, snapshot: ViewSnapshot) -> bool {
        if !self.is_current(&ticket) || snapshot.view() != ticket.view {
            debug!(view = %ticket.view, generation = ticket.generation, "Discarding stale load");
            return false;
        }
        self.snapshot = Some(snapshot);
        true
    }

    pub fn state(&self) -> ShellState {
        ShellState {
            selected: self.selected,
            title: self.selected.title(),
            menu: View::menu(),
            snapshot: self.snapshot().cloned(),
        }
    }
}
