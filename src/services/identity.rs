// ============================================================================
// IDENTITY - Sign-in / sign-out / session observation
// ============================================================================

use std::cell::RefCell;

use futures::future::{FutureExt, LocalBoxFuture};

use crate::error::TrackerError;
use crate::models::SessionUser;
use crate::state::{ReactiveState, Subscription};

pub type SessionCallback = std::rc::Rc<dyn Fn(Option<SessionUser>)>;

/// External identity provider
pub trait IdentityProvider {
    fn sign_in(&self) -> LocalBoxFuture<'_, Result<SessionUser, TrackerError>>;

    fn sign_out(&self) -> LocalBoxFuture<'_, Result<(), TrackerError>>;

    /// Called with the current session right away and on every transition
    fn observe(&self, callback: SessionCallback) -> Subscription;
}

/// Provider whose sign-in result is scripted (headless runs and tests)
#[derive(Clone, Default)]
pub struct MemoryIdentityProvider {
    session: ReactiveState<Option<SessionUser>>,
    next_sign_in: std::rc::Rc<RefCell<Option<Result<SessionUser, TrackerError>>>>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Result the next `sign_in` call produces
    pub fn script_sign_in(&self, result: Result<SessionUser, TrackerError>) {
        *self.next_sign_in.borrow_mut() = Some(result);
    }

    /// Push a session transition, as an external login would
    pub fn set_session(&self, user: Option<SessionUser>) {
        self.session.set(user);
    }

    pub fn observer_count(&self) -> usize {
        self.session.subscriber_count()
    }
}

impl IdentityProvider for MemoryIdentityProvider {
    fn sign_in(&self) -> LocalBoxFuture<'_, Result<SessionUser, TrackerError>> {
        async move {
            let scripted = self.next_sign_in.borrow_mut().take();
            let user = scripted
                .unwrap_or_else(|| Err(TrackerError::Auth("No sign-in scripted".to_string())))?;
            self.session.set(Some(user.clone()));
            Ok(user)
        }
        .boxed_local()
    }

    fn sign_out(&self) -> LocalBoxFuture<'_, Result<(), TrackerError>> {
        async move {
            self.session.set(None);
            Ok(())
        }
        .boxed_local()
    }

    fn observe(&self, callback: SessionCallback) -> Subscription {
        let current = self.session.get();
        let observer = callback.clone();
        let subscription = self.session.subscribe(move |user| observer(user.clone()));
        callback(current);
        subscription
    }
}

#[cfg(target_arch = "wasm32")]
pub use firebase::FirebaseIdentityProvider;

#[cfg(target_arch = "wasm32")]
mod firebase {
    use futures::future::{FutureExt, LocalBoxFuture};
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsValue;
    use wasm_bindgen_futures::JsFuture;

    use super::{IdentityProvider, SessionCallback};
    use crate::error::TrackerError;
    use crate::models::SessionUser;
    use crate::state::Subscription;
    use crate::utils::firebase_ffi::*;

    /// Firebase Authentication (Google popup) through the JS bridge
    #[derive(Clone, Copy, Default)]
    pub struct FirebaseIdentityProvider;

    fn parse_user(json: Option<String>) -> Option<SessionUser> {
        let json = json?;
        match serde_json::from_str::<SessionUser>(&json) {
            Ok(user) => Some(user),
            Err(e) => {
                log::error!("❌ [Auth] Unreadable user from bridge: {}", e);
                None
            }
        }
    }

    fn js_error(err: JsValue) -> TrackerError {
        TrackerError::Auth(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
    }

    impl IdentityProvider for FirebaseIdentityProvider {
        fn sign_in(&self) -> LocalBoxFuture<'_, Result<SessionUser, TrackerError>> {
            async move {
                let promise = firebase_sign_in_with_google().map_err(js_error)?;
                let value = JsFuture::from(promise).await.map_err(js_error)?;
                parse_user(value.as_string())
                    .ok_or_else(|| TrackerError::Auth("Sign-in returned no user".to_string()))
            }
            .boxed_local()
        }

        fn sign_out(&self) -> LocalBoxFuture<'_, Result<(), TrackerError>> {
            async move {
                let promise = firebase_sign_out().map_err(js_error)?;
                JsFuture::from(promise).await.map_err(js_error)?;
                Ok(())
            }
            .boxed_local()
        }

        fn observe(&self, callback: SessionCallback) -> Subscription {
            let closure = Closure::wrap(Box::new(move |json: Option<String>| {
                callback(parse_user(json));
            }) as Box<dyn FnMut(Option<String>)>);
            let unsubscribe = firebase_on_auth_state_changed(&closure);

            Subscription::new(move || {
                if let Err(e) = unsubscribe.call0(&JsValue::NULL) {
                    log::warn!("⚠️ [Auth] Unsubscribe failed: {:?}", e);
                }
                drop(closure);
            })
        }
    }
}
