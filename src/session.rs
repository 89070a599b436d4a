//! The editing session: the graph plus the view-root breadcrumb.
//!
//! All state a command or the TUI needs lives here explicitly; core
//! functions take the session (or its parts) as arguments rather than
//! reaching for globals.

use crate::graph::error::GraphError;
use crate::graph::model::{People, PersonDetails, ROOT_ID};
use crate::graph::mutate::{self, DeleteOutcome};
use crate::graph::validate::validate;
use crate::persist::Snapshot;

/// Breadcrumb of previously visited view roots; the last entry is the
/// current view root. Never empty while a tree exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationStack(Vec<String>);

impl Default for NavigationStack {
    fn default() -> Self {
        Self(vec![ROOT_ID.to_string()])
    }
}

impl NavigationStack {
    pub fn current(&self) -> &str {
        self.0.last().expect("stack is never empty").as_str()
    }

    pub fn entries(&self) -> &[String] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Make `id` the view root. Pushing the current root again is a no-op.
    /// Returns whether the root changed (the caller resets the viewport).
    pub fn push(&mut self, id: &str) -> bool {
        if self.current() == id {
            return false;
        }
        self.0.push(id.to_string());
        true
    }

    /// Step back one breadcrumb. The last entry never pops.
    pub fn pop(&mut self) -> bool {
        if self.0.len() > 1 {
            self.0.pop();
            true
        } else {
            false
        }
    }

    /// Drop a deleted person from the breadcrumb; an emptied stack resets to
    /// the founder.
    pub fn remove(&mut self, id: &str) {
        self.0.retain(|entry| entry != id);
        if self.0.is_empty() {
            self.0.push(ROOT_ID.to_string());
        }
    }

    pub fn reset(&mut self) {
        self.0 = vec![ROOT_ID.to_string()];
    }
}

/// A loaded tree being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSession {
    pub people: People,
    pub nav: NavigationStack,
}

impl TreeSession {
    /// A fresh one-person tree.
    pub fn with_founder(details: PersonDetails) -> Self {
        Self {
            people: People::with_founder(details),
            nav: NavigationStack::default(),
        }
    }

    /// Accept an externally supplied snapshot after validating it. An empty
    /// or missing stack falls back to the founder when present.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, GraphError> {
        let Snapshot {
            people,
            mut root_id_stack,
        } = snapshot;
        if root_id_stack.is_empty() && people.contains(ROOT_ID) {
            root_id_stack.push(ROOT_ID.to_string());
        }
        validate(&people, &root_id_stack)?;
        let nav = if root_id_stack.is_empty() {
            NavigationStack::default()
        } else {
            NavigationStack(root_id_stack)
        };
        Ok(Self { people, nav })
    }

    /// The read-only snapshot handed to persistence and share collaborators.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            people: self.people.clone(),
            root_id_stack: self.nav.entries().to_vec(),
        }
    }

    /// Delete a person, keeping the breadcrumb consistent. On
    /// [`DeleteOutcome::TreeEmptied`] the caller resets to the no-tree
    /// state.
    pub fn delete_person(&mut self, id: &str) -> Result<DeleteOutcome, GraphError> {
        let outcome = mutate::delete_person(&mut self.people, id)?;
        self.nav.remove(id);
        Ok(outcome)
    }
}
