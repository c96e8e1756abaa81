use std::sync::{Arc, Mutex};

use migrun::exec::{FnMigration, Migration};

/// Hands out migrations that append their label to a shared log when applied.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    log: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A step that records `label` and succeeds.
    pub fn step(&self, label: &str) -> impl Migration + 'static {
        let log = Arc::clone(&self.log);
        let label = label.to_string();
        FnMigration::named(label.clone(), move || {
            let log = Arc::clone(&log);
            let label = label.clone();
            async move {
                log.lock().unwrap().push(label);
                Ok(())
            }
        })
    }

    /// A step that records `label` and then fails with `message`.
    pub fn failing_step(&self, label: &str, message: &str) -> impl Migration + 'static {
        let log = Arc::clone(&self.log);
        let label = label.to_string();
        let message = message.to_string();
        FnMigration::named(label.clone(), move || {
            let log = Arc::clone(&log);
            let label = label.clone();
            let message = message.clone();
            async move {
                log.lock().unwrap().push(label);
                Err(anyhow::anyhow!(message))
            }
        })
    }

    /// Labels in the order their steps were applied.
    pub fn entries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }
}
