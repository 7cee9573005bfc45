use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Delays work per key; scheduling again for the same key aborts the
/// pending task, so only the last call inside the window runs.
pub struct Debouncer<K> {
    delay: Duration,
    pending: Mutex<HashMap<K, JoinHandle<()>>>,
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, key: K, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let mut pending = self.lock();
        if let Some(previous) = pending.remove(&key) {
            previous.abort();
        }
        pending.retain(|_, handle| !handle.is_finished());
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
        pending.insert(key, handle);
    }

    pub fn cancel(&self, key: &K) -> bool {
        match self.lock().remove(key) {
            Some(handle) => {
                let was_pending = !handle.is_finished();
                handle.abort();
                was_pending
            }
            None => false,
        }
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.lock()
            .get(key)
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl<K> Drop for Debouncer<K> {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().unwrap_or_else(|poisoned| poisoned.into_inner());
        for (_, handle) in pending.drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::time::sleep;

    const DELAY: Duration = Duration::from_millis(40);

    fn recorder() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn push(log: &Arc<Mutex<Vec<String>>>, value: &str) -> impl Future<Output = ()> + Send + 'static {
        let log = log.clone();
        let value = value.to_string();
        async move {
            log.lock().unwrap().push(value);
        }
    }

    #[tokio::test]
    async fn only_the_last_keystroke_lands() {
        let debouncer = Debouncer::new(DELAY);
        let log = recorder();

        debouncer.schedule(1, push(&log, "c"));
        debouncer.schedule(1, push(&log, "ca"));
        debouncer.schedule(1, push(&log, "car"));
        assert!(debouncer.is_pending(&1));
        assert!(log.lock().unwrap().is_empty());

        sleep(DELAY * 4).await;
        assert_eq!(*log.lock().unwrap(), vec!["car"]);
        assert!(!debouncer.is_pending(&1));
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let debouncer = Debouncer::new(DELAY);
        let log = recorder();

        debouncer.schedule("a", push(&log, "first"));
        debouncer.schedule("b", push(&log, "second"));

        sleep(DELAY * 4).await;
        let mut seen = log.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn cancel_discards_pending_update() {
        let debouncer = Debouncer::new(DELAY);
        let log = recorder();

        debouncer.schedule(7, push(&log, "dropped"));
        assert!(debouncer.cancel(&7));
        assert!(!debouncer.cancel(&7));

        sleep(DELAY * 4).await;
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn spaced_out_calls_all_run() {
        let debouncer = Debouncer::new(DELAY);
        let log = recorder();

        debouncer.schedule(1, push(&log, "one"));
        sleep(DELAY * 4).await;
        debouncer.schedule(1, push(&log, "two"));
        sleep(DELAY * 4).await;

        assert_eq!(*log.lock().unwrap(), vec!["one", "two"]);
    }
}
