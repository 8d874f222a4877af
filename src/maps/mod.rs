// Map rendering behind a common trait

#[cfg(target_arch = "wasm32")]
pub mod web;

pub mod memory;
pub mod traits;

pub use memory::MemoryMapRenderer;
pub use traits::*;
#[cfg(target_arch = "wasm32")]
pub use web::GoogleMapRenderer;
