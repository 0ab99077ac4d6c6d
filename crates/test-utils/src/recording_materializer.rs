use std::path::Path;
use std::sync::{Arc, Mutex};

use amd_funnel::errors::Result;
use amd_funnel::{Materializer, ProjectionReport};

/// Wraps a real materializer and records every exclusion list it was asked
/// to project.
pub struct RecordingMaterializer<M> {
    inner: M,
    builds: Arc<Mutex<Vec<Vec<String>>>>,
}

impl<M: Materializer> RecordingMaterializer<M> {
    pub fn new(inner: M, builds: Arc<Mutex<Vec<Vec<String>>>>) -> Self {
        Self { inner, builds }
    }
}

impl<M: Materializer> Materializer for RecordingMaterializer<M> {
    fn input_path(&self) -> &Path {
        self.inner.input_path()
    }

    fn output_path(&self) -> &Path {
        self.inner.output_path()
    }

    fn exclude_mut(&mut self) -> &mut Vec<String> {
        self.inner.exclude_mut()
    }

    fn build(&mut self) -> Result<ProjectionReport> {
        {
            let mut guard = self.builds.lock().unwrap();
            guard.push(self.inner.exclude_mut().clone());
        }
        self.inner.build()
    }
}
