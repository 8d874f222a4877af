use serde::{Deserialize, Serialize};

/// Geographic point as the map SDK expects it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Profile of a tracked account, as returned by the account lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    pub username: String,
    #[serde(default)]
    pub name: String,
    /// Only business/creator accounts are eligible for tracking
    #[serde(default)]
    pub is_business: bool,
    #[serde(default)]
    pub location: Option<Coordinates>,
}

impl AccountRecord {
    /// Name shown on pins and in the info window (falls back to the handle)
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.username
        } else {
            &self.name
        }
    }
}

/// Entry of the global account cache (`instagramAccounts/{username}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedAccount {
    #[serde(flatten)]
    pub record: AccountRecord,
    pub last_updated: i64,
}

/// Turn raw search input into a handle: trim, drop one '@', trim again
pub fn normalize_handle(input: &str) -> Option<String> {
    let handle = input.trim().replacen('@', "", 1);
    let handle = handle.trim();
    if handle.is_empty() {
        None
    } else {
        Some(handle.to_string())
    }
}
