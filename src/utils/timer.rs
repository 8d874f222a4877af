// ============================================================================
// TIMER - Async sleep that works in the browser and in native tests
// ============================================================================

use std::time::Duration;

/// Resolve after `duration`. Zero resolves immediately.
pub async fn sleep(duration: Duration) {
    if duration.is_zero() {
        return;
    }

    #[cfg(target_arch = "wasm32")]
    {
        gloo_timers::future::sleep(duration).await;
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let (tx, rx) = futures::channel::oneshot::channel::<()>();
        std::thread::spawn(move || {
            std::thread::sleep(duration);
            let _ = tx.send(());
        });
        let _ = rx.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn sleep_waits_at_least_the_duration() {
        let started = Instant::now();
        futures::executor::block_on(sleep(Duration::from_millis(20)));
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn zero_sleep_is_immediate() {
        futures::executor::block_on(sleep(Duration::ZERO));
    }
}
