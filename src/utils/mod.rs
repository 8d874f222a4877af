// Shared utilities

pub mod constants;
pub mod storage;
pub mod timer;
pub mod spawn;
#[cfg(target_arch = "wasm32")]
pub mod firebase_ffi;
#[cfg(target_arch = "wasm32")]
pub mod google_maps_ffi;

pub use constants::*;
pub use storage::*;
pub use spawn::Spawner;
