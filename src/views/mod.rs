// ============================================================================
// VIEWS - Functions that render DOM from the viewmodels (no business logic)
// ============================================================================

pub mod header;
pub mod login_modal;
pub mod search_panel;
pub mod tracked_list;

pub use header::render_header;
pub use login_modal::render_login_modal;
pub use search_panel::{render_search_form, render_search_result};
pub use tracked_list::render_tracked_list;
