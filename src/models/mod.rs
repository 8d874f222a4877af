pub mod account;
pub mod tracked;
pub mod session;

pub use account::{normalize_handle, AccountRecord, CachedAccount, Coordinates};
pub use tracked::{TrackedAccountSet, TrackedEntry};
pub use session::{SessionUser, UserDocument};

/// Current time as epoch milliseconds (the unit every remote timestamp uses)
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
