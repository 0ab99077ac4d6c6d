use std::sync::{Arc, Mutex};

/// Records every exclusion set reported to an `on_excluded` callback.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback suitable for `FunnelOptions::on_excluded`.
    pub fn callback(&self) -> impl Fn(&[String]) + Send + Sync + 'static {
        let calls = Arc::clone(&self.calls);
        move |paths: &[String]| {
            calls.lock().unwrap().push(paths.to_vec());
        }
    }

    /// All notifications so far, oldest first.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Vec<String>> {
        self.calls.lock().unwrap().last().cloned()
    }
}
