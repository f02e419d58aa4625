//! In-process change feed: observers register per table and are called
//! whenever the backend writes to (or detects an external write on) it.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Tasks,
    Users,
    Sessions,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Tasks, Table::Users, Table::Sessions];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Tasks => "tasks",
            Table::Users => "users",
            Table::Sessions => "sessions",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
    /// Committed by another connection; the exact operation is unknown.
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
}

pub type ChangeCallback = Box<dyn FnMut(&ChangeEvent)>;

struct Listener {
    id: u64,
    table: Table,
    callback: ChangeCallback,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<Listener>,
    dispatching: bool,
    // unsubscribed while their callbacks were checked out for dispatch
    pending_removals: Vec<u64>,
}

impl Registry {
    fn remove(&mut self, id: u64) {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        if self.listeners.len() == before && self.dispatching {
            self.pending_removals.push(id);
        }
    }
}

/// Shared handle to the observer registry. Cloning shares the registry.
#[derive(Clone, Default)]
pub struct ChangeFeed {
    registry: Rc<RefCell<Registry>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, table: Table, callback: ChangeCallback) -> Subscription {
        let mut reg = self.registry.borrow_mut();
        reg.next_id += 1;
        let id = reg.next_id;
        reg.listeners.push(Listener {
            id,
            table,
            callback,
        });

        Subscription {
            id,
            table,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Call every listener registered for `event.table`.
    ///
    /// Callbacks may subscribe or unsubscribe while being dispatched.
    pub fn notify(&self, event: &ChangeEvent) {
        let mut checked_out = {
            let mut reg = self.registry.borrow_mut();
            if reg.dispatching {
                log::warn!("nested change notification for '{}' dropped", event.table);
                return;
            }
            reg.dispatching = true;
            std::mem::take(&mut reg.listeners)
        };

        for listener in checked_out.iter_mut().filter(|l| l.table == event.table) {
            (listener.callback)(event);
        }

        let mut reg = self.registry.borrow_mut();
        let added = std::mem::take(&mut reg.listeners);
        let removed = std::mem::take(&mut reg.pending_removals);
        checked_out.retain(|l| !removed.contains(&l.id));
        checked_out.extend(added);
        reg.listeners = checked_out;
        reg.dispatching = false;
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }
}

/// Registration handle. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    table: Table,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    pub fn table(&self) -> Table {
        self.table
    }

    pub fn unsubscribe(self) {
        // Drop does the work
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            // try_borrow_mut: a subscription may be dropped from inside a callback
            if let Ok(mut reg) = registry.try_borrow_mut() {
                reg.remove(self.id);
            }
        }
    }
}
