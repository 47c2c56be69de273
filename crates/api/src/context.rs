use inkwell_core::UserId;

/// Identity established by the auth middleware for one request.
///
/// Only present on protected routes; handlers take it as
/// `Extension<AuthenticatedUser>` and pass the id on explicitly.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    user_id: UserId,
}

impl AuthenticatedUser {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}
