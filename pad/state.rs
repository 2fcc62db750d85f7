use std::sync::{Arc, Mutex, MutexGuard};

use ferrite_pad::{DrawingSession, ModelStore, PadConfig};

/// Server-wide state. There is one drawing session per server process.
///
/// The session sits behind its own mutex so gesture handling and inference
/// are serialized; the store and config are read-only and can be used
/// without the lock (model loads happen outside it).
pub struct PadState {
    pub session: Mutex<DrawingSession>,
    pub store:   ModelStore,
    pub config:  PadConfig,
}

impl PadState {
    pub fn new(session: DrawingSession, config: PadConfig) -> Self {
        PadState {
            session: Mutex::new(session),
            store:   ModelStore::new(&config.model_dir),
            config,
        }
    }

    /// Locks the session. A handler that panicked mid-request leaves the
    /// session usable; its state is still a valid drawing.
    pub fn session(&self) -> MutexGuard<'_, DrawingSession> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Shared state handed to every handler.
pub type SharedState = Arc<PadState>;
