//! Session
//!
//! Process-wide flags that live for one browsing session. The preloader is
//! shown once: the first call to [`SessionFlags::begin_preloader`] claims it,
//! every later call sees it as already shown, and only [`SessionFlags::end`]
//! resets it.

use std::sync::atomic::{AtomicBool, Ordering};

static SESSION: SessionFlags = SessionFlags::new();

/// Session-scoped flags.
#[derive(Debug, Default)]
pub struct SessionFlags {
    preloader_shown: AtomicBool,
}

impl SessionFlags {
    /// Create a fresh set of flags.
    pub const fn new() -> Self {
        Self {
            preloader_shown: AtomicBool::new(false),
        }
    }

    /// Claim the one-time preloader. Returns true only for the first caller
    /// of the session.
    pub fn begin_preloader(&self) -> bool {
        let first = self
            .preloader_shown
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();

        if first {
            tracing::debug!("preloader shown for this session");
        }

        first
    }

    /// Whether the preloader has been shown this session.
    pub fn preloader_shown(&self) -> bool {
        self.preloader_shown.load(Ordering::Acquire)
    }

    /// End the session, clearing every flag.
    pub fn end(&self) {
        self.preloader_shown.store(false, Ordering::Release);

        tracing::debug!("session ended");
    }
}

/// The process-wide session.
pub fn session() -> &'static SessionFlags {
    &SESSION
}
