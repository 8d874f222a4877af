// ============================================================================
// SPAWN - Fire-and-forget execution of local (non-Send) futures
// ============================================================================

use std::rc::Rc;

use futures::future::LocalBoxFuture;

/// Runs a future to completion in the background; the caller never awaits it
pub type Spawner = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;

/// `wasm_bindgen_futures::spawn_local` on the browser event loop
#[cfg(target_arch = "wasm32")]
pub fn browser_spawner() -> Spawner {
    Rc::new(|future| wasm_bindgen_futures::spawn_local(future))
}

/// Spawner backed by a `LocalPool`; drive it with `pool.run()`
#[cfg(test)]
pub fn pool_spawner(pool: &futures::executor::LocalPool) -> Spawner {
    use futures::task::LocalSpawnExt;

    let spawner = pool.spawner();
    Rc::new(move |future| {
        if let Err(e) = spawner.spawn_local(future) {
            log::error!("❌ [Spawn] Could not spawn task: {}", e);
        }
    })
}
