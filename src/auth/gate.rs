use std::fmt;

use chrono::{DateTime, Local};

use super::role::{View, route_for_role};
use crate::backend::{Backend, ProfileFields, Session};

/// Where a caller lands on entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard(View),
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Login => f.write_str("login"),
            Route::Dashboard(view) => write!(f, "{} dashboard", view),
        }
    }
}

/// Decide the entry route for an optional session.
///
/// With a session, the user's activity timestamp is refreshed and the role
/// is resolved. A failing role lookup lands on the member view, never on
/// the admin one.
pub fn resolve_entry_route<B>(backend: &B, session: Option<&Session>, now: DateTime<Local>) -> Route
where
    B: Backend + ?Sized,
{
    let Some(session) = session else {
        return Route::Login;
    };
    if session.is_expired(now) {
        return Route::Login;
    }

    if let Err(e) = backend.upsert_user_profile(&session.user_id, &ProfileFields::seen_at(now)) {
        log::warn!(
            "could not refresh activity for '{}': {}",
            session.user_id,
            e
        );
    }

    match backend.get_user_primary_role(&session.user_id) {
        Ok(role) => Route::Dashboard(route_for_role(role.as_deref())),
        Err(e) => {
            log::warn!(
                "role lookup failed for '{}', using member view: {}",
                session.user_id,
                e
            );
            Route::Dashboard(View::Member)
        }
    }
}
