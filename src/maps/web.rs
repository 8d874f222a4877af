use super::{validate_pin, MapError, MapPin, MapRenderer, PinId};
use crate::config::MapConfig;
use crate::utils::google_maps_ffi::*;

/// Google Maps renderer through the JS bridge
pub struct GoogleMapRenderer {
    next_id: PinId,
    pin_count: usize,
    is_ready: bool,
}

impl GoogleMapRenderer {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pin_count: 0,
            is_ready: false,
        }
    }

    /// Create the map inside `config.container_id`
    pub fn initialize(&mut self, config: &MapConfig, api_key: &str) -> Result<(), MapError> {
        log::info!("🗺️ [Map] Initializing Google Maps in #{}", config.container_id);
        if api_key.is_empty() {
            log::warn!("⚠️ [Map] GOOGLE_MAPS_API_KEY is not set");
        }
        let created = init_google_map(
            &config.container_id,
            config.default_center_lat,
            config.default_center_lng,
            config.default_zoom,
            api_key,
        );
        if !created {
            return Err(MapError::Unknown("Google Maps failed to load".to_string()));
        }
        self.is_ready = true;
        log::info!("✅ [Map] Ready");
        Ok(())
    }
}

impl Default for GoogleMapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MapRenderer for GoogleMapRenderer {
    fn add_pin(&mut self, pin: &MapPin) -> Result<PinId, MapError> {
        if !self.is_ready {
            return Err(MapError::NotReady);
        }
        validate_pin(pin)?;

        let id = self.next_id;
        self.next_id += 1;
        add_map_pin(id, pin.position.lat, pin.position.lng, &pin.title, &pin.info_html);
        self.pin_count += 1;
        log::debug!("📍 [Map] Pin {} for {}", id, pin.title);
        Ok(id)
    }

    fn remove_all_pins(&mut self) -> Result<(), MapError> {
        if !self.is_ready {
            return Err(MapError::NotReady);
        }
        clear_map_pins();
        self.pin_count = 0;
        Ok(())
    }

    fn pin_count(&self) -> usize {
        self.pin_count
    }

    fn is_ready(&self) -> bool {
        self.is_ready
    }
}
