// ============================================================================
// FIRESTORE - DocumentStore over the Firestore REST API (v1)
// ============================================================================

pub mod codec;
#[cfg(target_arch = "wasm32")]
pub mod client;

pub use codec::*;
#[cfg(target_arch = "wasm32")]
pub use client::FirestoreDocumentStore;
