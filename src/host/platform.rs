use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};

use usvg::fontdb;

static PLATFORM: Mutex<Weak<ScriptPlatform>> = Mutex::new(Weak::new());

/// Process-wide state shared by every live host.
///
/// Created by the first host and torn down when the last one drops its reference. Holds the
/// system font database, which is scanned once on first text use.
pub struct ScriptPlatform {
    system_fonts: OnceLock<Arc<fontdb::Database>>,
}

impl ScriptPlatform {
    /// The live platform, creating it if no host currently holds one.
    pub fn acquire() -> Arc<Self> {
        let mut slot = PLATFORM.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(platform) = slot.upgrade() {
            return platform;
        }
        let platform = Arc::new(Self {
            system_fonts: OnceLock::new(),
        });
        *slot = Arc::downgrade(&platform);
        tracing::debug!("script platform initialized");
        platform
    }

    /// Installed system fonts.
    pub fn system_fonts(&self) -> Arc<fontdb::Database> {
        Arc::clone(self.system_fonts.get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            tracing::debug!(faces = db.len(), "system fonts loaded");
            Arc::new(db)
        }))
    }
}

impl Drop for ScriptPlatform {
    fn drop(&mut self) {
        tracing::debug!("script platform torn down");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/platform.rs"]
mod tests;
