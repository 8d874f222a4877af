// Services: stores, lookups and the identity bridge

pub mod account_lookup;
pub mod document_store;
pub mod firestore;
pub mod identity;
pub mod memory_store;
pub mod remote_directory;

pub use account_lookup::{AccountLookup, MockAccountLookup};
pub use document_store::{Document, DocumentPath, DocumentStore, Fields, WriteMode};
#[cfg(target_arch = "wasm32")]
pub use firestore::FirestoreDocumentStore;
pub use identity::{IdentityProvider, MemoryIdentityProvider};
#[cfg(target_arch = "wasm32")]
pub use identity::FirebaseIdentityProvider;
pub use memory_store::MemoryDocumentStore;
pub use remote_directory::RemoteDirectory;
