// ============================================================================
// MAP VIEWMODEL - Marker layer for tracked accounts
// ============================================================================
// Each refresh bumps a generation counter; a refresh that sees a newer
// generation after an await stops without touching the map.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};

use crate::maps::{MapPin, MapRenderer};
use crate::models::{AccountRecord, TrackedAccountSet};
use crate::services::AccountLookup;
use crate::state::{Subscription, TrackedState};
use crate::utils::Spawner;

#[derive(Clone)]
pub struct MarkerLayer {
    renderer: Rc<RefCell<dyn MapRenderer>>,
    lookup: Rc<dyn AccountLookup>,
    generation: Rc<Cell<u64>>,
}

impl MarkerLayer {
    pub fn new(renderer: Rc<RefCell<dyn MapRenderer>>, lookup: Rc<dyn AccountLookup>) -> Self {
        Self {
            renderer,
            lookup,
            generation: Rc::new(Cell::new(0)),
        }
    }

    /// Clear the map now, then pin every handle of `set` that has a location.
    /// Resolves to the number of pins placed by this refresh.
    pub fn refresh(&self, set: &TrackedAccountSet) -> LocalBoxFuture<'static, usize> {
        let generation = self.invalidate();
        self.clear();

        let handles: Vec<String> = set.iter().map(str::to_string).collect();
        let layer = self.clone();
        async move {
            let mut placed = 0;
            for handle in handles {
                let record = layer.lookup.lookup(&handle).await;
                if layer.generation.get() != generation {
                    log::debug!("🗺️ [Markers] Refresh {} superseded", generation);
                    return placed;
                }
                let Some(pin) = record.as_ref().and_then(pin_for) else {
                    continue;
                };
                match layer.renderer.borrow_mut().add_pin(&pin) {
                    Ok(_) => placed += 1,
                    Err(e) => log::warn!("⚠️ [Markers] Could not pin @{}: {}", handle, e),
                }
            }
            log::info!("📍 [Markers] {} pins placed", placed);
            placed
        }
        .boxed_local()
    }

    /// Remove all pins and drop any refresh still in flight
    pub fn teardown(&self) {
        self.invalidate();
        self.clear();
    }

    /// Refresh now and on every change of `tracked`, running refreshes on `spawner`
    pub fn follow(&self, tracked: &TrackedState, spawner: Spawner) -> Subscription {
        spawner(self.refresh(&tracked.snapshot()).map(|_| ()).boxed_local());

        let layer = self.clone();
        tracked.subscribe(move |set| {
            spawner(layer.refresh(set).map(|_| ()).boxed_local());
        })
    }

    fn invalidate(&self) -> u64 {
        let next = self.generation.get() + 1;
        self.generation.set(next);
        next
    }

    fn clear(&self) {
        if let Err(e) = self.renderer.borrow_mut().remove_all_pins() {
            log::warn!("⚠️ [Markers] Could not clear pins: {}", e);
        }
    }
}

/// Pin for `record`, or None when it has no usable location
pub fn pin_for(record: &AccountRecord) -> Option<MapPin> {
    let position = record.location.filter(|location| location.is_valid())?;
    Some(MapPin {
        position,
        title: record.display_name().to_string(),
        info_html: info_window_html(record),
    })
}

pub fn info_window_html(record: &AccountRecord) -> String {
    format!(
        "<h3>{}</h3><p>@{}</p>",
        escape_html(record.display_name()),
        escape_html(&record.username)
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
