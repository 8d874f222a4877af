use super::{validate_pin, MapError, MapPin, MapRenderer, PinId};

/// Renderer that only records pins (headless runs and tests)
#[derive(Debug, Default)]
pub struct MemoryMapRenderer {
    pins: Vec<(PinId, MapPin)>,
    next_id: PinId,
}

impl MemoryMapRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn titles(&self) -> Vec<String> {
        self.pins.iter().map(|(_, pin)| pin.title.clone()).collect()
    }
}

impl MapRenderer for MemoryMapRenderer {
    fn add_pin(&mut self, pin: &MapPin) -> Result<PinId, MapError> {
        validate_pin(pin)?;
        let id = self.next_id;
        self.next_id += 1;
        self.pins.push((id, pin.clone()));
        Ok(id)
    }

    fn remove_all_pins(&mut self) -> Result<(), MapError> {
        self.pins.clear();
        Ok(())
    }

    fn pin_count(&self) -> usize {
        self.pins.len()
    }

    fn is_ready(&self) -> bool {
        true
    }
}
