use crate::models::Coordinates;

/// Handle to a pin placed on the map
pub type PinId = u32;

/// Common trait for map renderers
pub trait MapRenderer {
    /// Place a pin; clicking it opens `info_html`
    fn add_pin(&mut self, pin: &MapPin) -> Result<PinId, MapError>;

    /// Remove every pin this renderer placed
    fn remove_all_pins(&mut self) -> Result<(), MapError>;

    fn pin_count(&self) -> usize;

    /// Whether the map is ready
    fn is_ready(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapPin {
    pub position: Coordinates,
    pub title: String,
    pub info_html: String,
}

/// Map error
#[derive(Debug, Clone, PartialEq)]
pub enum MapError {
    NotReady,
    InvalidCoordinates,
    Unknown(String),
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::NotReady => write!(f, "Map is not ready"),
            MapError::InvalidCoordinates => write!(f, "Invalid coordinates"),
            MapError::Unknown(msg) => write!(f, "Unknown error: {}", msg),
        }
    }
}

impl std::error::Error for MapError {}

impl From<MapError> for crate::error::TrackerError {
    fn from(err: MapError) -> Self {
        crate::error::TrackerError::Map(err.to_string())
    }
}

/// Reject pins that cannot be placed before they reach a renderer
pub fn validate_pin(pin: &MapPin) -> Result<(), MapError> {
    if pin.position.is_valid() {
        Ok(())
    } else {
        Err(MapError::InvalidCoordinates)
    }
}
