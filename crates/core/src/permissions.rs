//! Authorization predicates evaluated for every request.
//!
//! Each rule is a pure function over an [`AccessRequest`] (who is calling
//! and whether the HTTP method is safe). Object-level rules also take the
//! target's author. Handlers compose them; nothing here touches HTTP or the
//! database.

use crate::roles::Role;
use crate::types::DbId;

/// HTTP methods that never mutate state.
pub const SAFE_METHODS: &[&str] = &["GET", "HEAD", "OPTIONS"];

/// `true` for GET, HEAD and OPTIONS.
pub fn is_safe_method(method: &str) -> bool {
    SAFE_METHODS.contains(&method)
}

/// The authenticated identity behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: DbId,
    pub username: String,
    pub role: Role,
    pub is_staff: bool,
}

impl Caller {
    /// Admins are users with the admin role and every staff account.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin || self.is_staff
    }

    pub fn is_moderator(&self) -> bool {
        self.role == Role::Moderator
    }
}

/// The inputs every rule needs. `caller` is `None` for anonymous requests.
#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
    pub caller: Option<&'a Caller>,
    pub safe_method: bool,
}

impl<'a> AccessRequest<'a> {
    pub fn new(caller: Option<&'a Caller>, method: &str) -> Self {
        Self {
            caller,
            safe_method: is_safe_method(method),
        }
    }

    fn is_authenticated_admin(&self) -> bool {
        self.caller.is_some_and(Caller::is_admin)
    }
}

/// Grants only safe methods.
pub fn read_only(req: &AccessRequest<'_>) -> bool {
    req.safe_method
}

/// Grants authenticated admins (including staff).
pub fn admin_only(req: &AccessRequest<'_>) -> bool {
    req.is_authenticated_admin()
}

/// Grants admins, or anyone for safe methods.
pub fn is_admin_or_read_only(req: &AccessRequest<'_>) -> bool {
    req.is_authenticated_admin() || req.safe_method
}

/// Grants any authenticated caller, or anyone for safe methods.
pub fn authenticated_or_read_only(req: &AccessRequest<'_>) -> bool {
    req.caller.is_some() || req.safe_method
}

/// Grants any authenticated caller.
pub fn authenticated(req: &AccessRequest<'_>) -> bool {
    req.caller.is_some()
}

/// Object-level rule for reviews and comments.
///
/// Grants the object's author, admins and moderators, or anyone for safe
/// methods. An anonymous caller never counts as the author.
pub fn is_admin_moderator_author_or_read_only(req: &AccessRequest<'_>, author_id: DbId) -> bool {
    let is_author = req.caller.is_some_and(|c| c.user_id == author_id);
    let is_staff_member = req
        .caller
        .is_some_and(|c| c.is_admin() || c.is_moderator());

    is_author || is_staff_member || req.safe_method
}

/// Outcome of a failed check, used to pick between 401 and 403.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No credentials were presented.
    NotAuthenticated,
    /// Credentials were presented but the rule still refused.
    PermissionDenied,
}

/// Run `rule` and classify a refusal.
pub fn check(
    req: &AccessRequest<'_>,
    rule: impl FnOnce(&AccessRequest<'_>) -> bool,
) -> Result<(), Denial> {
    if rule(req) {
        Ok(())
    } else if req.caller.is_none() {
        Err(Denial::NotAuthenticated)
    } else {
        Err(Denial::PermissionDenied)
    }
}
