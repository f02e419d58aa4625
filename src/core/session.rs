//! State owned by one open dashboard: the current snapshot, its report,
//! and the subscription that marks it stale when tasks change.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Local};

use super::report::DashboardReport;
use crate::auth::role::View;
use crate::backend::Backend;
use crate::backend::changes::{Subscription, Table};
use crate::errors::{AppError, AppResult};
use crate::models::task::{Task, TaskFilter};

/// Monotonic id of a reload request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

pub struct DashboardSession {
    view: View,
    user_id: String,
    window_days: u32,
    bucket_cap: usize,
    issued: u64,
    applied: Option<RequestId>,
    snapshot: Vec<Task>,
    report: Option<DashboardReport>,
    stale: Rc<Cell<bool>>,
    subscription: Option<Subscription>,
}

impl DashboardSession {
    pub fn new(view: View, user_id: &str, window_days: u32, bucket_cap: usize) -> Self {
        Self {
            view,
            user_id: user_id.to_string(),
            window_days,
            bucket_cap,
            issued: 0,
            applied: None,
            snapshot: Vec::new(),
            report: None,
            stale: Rc::new(Cell::new(true)),
            subscription: None,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    /// Admins see every task, members only their own.
    pub fn filter(&self) -> TaskFilter {
        match self.view {
            View::Admin => TaskFilter::all(),
            View::Member => TaskFilter::assigned_to(&self.user_id),
        }
    }

    /// Subscribe to task changes. Replaces a previous subscription.
    pub fn attach<B: Backend + ?Sized>(&mut self, backend: &B) {
        let stale = Rc::clone(&self.stale);
        self.subscription = Some(backend.subscribe_to_changes(
            Table::Tasks,
            Box::new(move |_| stale.set(true)),
        ));
    }

    pub fn detach(&mut self) {
        if let Some(sub) = self.subscription.take() {
            sub.unsubscribe();
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn needs_reload(&self) -> bool {
        self.stale.get()
    }

    pub fn set_window(&mut self, window_days: u32) {
        if window_days != self.window_days {
            self.window_days = window_days;
            self.stale.set(true);
        }
    }

    pub fn begin_reload(&mut self) -> RequestId {
        self.issued += 1;
        self.stale.set(false);
        RequestId(self.issued)
    }

    /// Apply a fetched snapshot. Returns `false` (and changes nothing) when a
    /// newer request has already been applied.
    pub fn complete_reload(
        &mut self,
        id: RequestId,
        snapshot: Vec<Task>,
        now: DateTime<Local>,
    ) -> bool {
        if self.applied.is_some_and(|applied| id <= applied) {
            log::debug!("discarding stale dashboard response {:?}", id);
            return false;
        }

        self.report = Some(DashboardReport::build(
            self.view,
            &self.user_id,
            &snapshot,
            now,
            self.window_days,
            self.bucket_cap,
        ));
        self.snapshot = snapshot;
        self.applied = Some(id);
        true
    }

    /// Fetch and aggregate in one go.
    pub fn reload<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        now: DateTime<Local>,
    ) -> AppResult<&DashboardReport> {
        let id = self.begin_reload();
        let snapshot = backend.query_tasks(&self.filter())?;
        self.complete_reload(id, snapshot, now);
        self.report()
            .ok_or_else(|| AppError::Other("dashboard has no data".into()))
    }

    pub fn report(&self) -> Option<&DashboardReport> {
        self.report.as_ref()
    }

    pub fn snapshot(&self) -> &[Task] {
        &self.snapshot
    }
}
