/// Local storage key holding the tracked handles (JSON string array)
pub const STORAGE_KEY_TRACKED_ACCOUNTS: &str = "localAccounts";

/// Remote collections
pub const USERS_COLLECTION: &str = "users";
pub const TRACKED_ACCOUNTS_COLLECTION: &str = "trackedAccounts";
pub const ACCOUNT_CACHE_COLLECTION: &str = "instagramAccounts";

/// Simulated latency of the mock account lookup
pub const DEFAULT_LOOKUP_LATENCY_MS: u64 = 500;

/// How often polling subscriptions re-read the remote directory
pub const DEFAULT_REMOTE_POLL_INTERVAL_MS: u32 = 5_000;

/// Firestore REST endpoint root
pub const FIRESTORE_API_ROOT: &str = "https://firestore.googleapis.com/v1";

/// Compile-time settings (see build.rs and .env.example)
pub const FIREBASE_API_KEY: Option<&str> = option_env!("FIREBASE_API_KEY");
pub const FIREBASE_AUTH_DOMAIN: Option<&str> = option_env!("FIREBASE_AUTH_DOMAIN");
pub const FIREBASE_PROJECT_ID: Option<&str> = option_env!("FIREBASE_PROJECT_ID");
pub const FIREBASE_STORAGE_BUCKET: Option<&str> = option_env!("FIREBASE_STORAGE_BUCKET");
pub const FIREBASE_MESSAGING_SENDER_ID: Option<&str> = option_env!("FIREBASE_MESSAGING_SENDER_ID");
pub const FIREBASE_APP_ID: Option<&str> = option_env!("FIREBASE_APP_ID");
pub const FIREBASE_MEASUREMENT_ID: Option<&str> = option_env!("FIREBASE_MEASUREMENT_ID");
pub const GOOGLE_MAPS_API_KEY: Option<&str> = option_env!("GOOGLE_MAPS_API_KEY");
pub const LOOKUP_LATENCY_MS: Option<&str> = option_env!("LOOKUP_LATENCY_MS");
pub const REMOTE_POLL_INTERVAL_MS: Option<&str> = option_env!("REMOTE_POLL_INTERVAL_MS");
