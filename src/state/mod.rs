// ============================================================================
// STATE MODULE - Shared state with Rc<RefCell> + change notifications
// ============================================================================

pub mod reactivity;
pub mod auth_state;
pub mod tracked_state;

pub use reactivity::*;
pub use auth_state::*;
pub use tracked_state::*;
