pub mod map_viewmodel;
pub mod session_viewmodel;
pub mod sync_viewmodel;
pub mod tracking_viewmodel;

pub use map_viewmodel::MarkerLayer;
pub use session_viewmodel::SessionGate;
pub use sync_viewmodel::{ReconcileReport, SyncViewModel};
pub use tracking_viewmodel::{RemoteOutcome, SearchOutcome, TrackChange, TrackingViewModel};
