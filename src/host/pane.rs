use std::io::Write;
use std::sync::{Arc, Mutex};

/// The host's build output pane. Text is written as-is; callers add newlines.
pub trait OutputPane {
    fn output_string(&self, text: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StderrPane;

impl OutputPane for StderrPane {
    fn output_string(&self, text: &str) {
        let mut stderr = std::io::stderr().lock();
        // A closed stderr is not worth failing a build over
        let _ = stderr.write_all(text.as_bytes());
    }
}

/// In-memory pane; clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemoryPane {
    buffer: Arc<Mutex<String>>,
}

impl MemoryPane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        self.buffer
            .lock()
            .map(|b| b.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl OutputPane for MemoryPane {
    fn output_string(&self, text: &str) {
        let mut buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
        buffer.push_str(text);
    }
}
