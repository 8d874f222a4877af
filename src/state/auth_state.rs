// ============================================================================
// AUTH STATE - Current session identity, shared by explicit handle
// ============================================================================

use crate::models::SessionUser;
use crate::state::reactivity::{ReactiveState, Subscription};

/// Who is signed in (None = anonymous)
#[derive(Clone, Default)]
pub struct AuthState {
    user: ReactiveState<Option<SessionUser>>,
}

impl AuthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_user(&self, user: Option<SessionUser>) {
        self.user.set(user);
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.user.get()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.with(Option::is_some)
    }

    pub fn uid(&self) -> Option<String> {
        self.user.with(|u| u.as_ref().map(|u| u.uid.clone()))
    }

    /// Bearer token for remote calls, if the provider supplied one
    pub fn id_token(&self) -> Option<String> {
        self.user.with(|u| u.as_ref().and_then(|u| u.id_token.clone()))
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Option<SessionUser>) + 'static,
    {
        self.user.subscribe(callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_sign_in_and_out() {
        let auth = AuthState::new();
        assert!(!auth.is_logged_in());

        let mut user = SessionUser::new("u1");
        user.id_token = Some("tok".to_string());
        auth.set_user(Some(user));
        assert_eq!(auth.uid().as_deref(), Some("u1"));
        assert_eq!(auth.id_token().as_deref(), Some("tok"));

        auth.set_user(None);
        assert!(auth.uid().is_none());
        assert!(auth.id_token().is_none());
    }
}
