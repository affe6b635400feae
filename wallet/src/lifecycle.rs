//! # View Lifecycle
//!
//! A [`Mount`] marks how long a view is on screen. The view owns the handle;
//! every async operation it starts receives a [`Liveness`] clone and checks
//! it before touching view state. Unmounting cancels the underlying token,
//! so work that is still awaiting an external call finishes without writing
//! into a view nobody is looking at.

use tokio_util::sync::CancellationToken;

/// Lifetime handle owned by a mounted view.
///
/// Dropping the handle unmounts the view.
#[derive(Debug, Default)]
pub struct Mount {
    token: CancellationToken,
}

impl Mount {
    /// Mounts a view.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Returns a liveness probe for an async operation started by this view.
    pub fn liveness(&self) -> Liveness {
        Liveness {
            token: self.token.clone(),
        }
    }

    /// Returns `true` until [`unmount`](Self::unmount) is called.
    pub fn is_mounted(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Unmounts the view. Idempotent.
    pub fn unmount(&self) {
        if !self.token.is_cancelled() {
            tracing::debug!("view unmounted");
        }
        self.token.cancel();
    }
}

impl Drop for Mount {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Cloneable probe answering "is the view that started me still mounted?"
#[derive(Clone, Debug)]
pub struct Liveness {
    token: CancellationToken,
}

impl Liveness {
    /// `true` while the owning view is mounted.
    pub fn is_live(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Runs `update` only while the owning view is mounted.
    ///
    /// Returns `true` when the update ran.
    pub fn guard<F: FnOnce()>(&self, update: F) -> bool {
        if self.is_live() {
            update();
            true
        } else {
            tracing::debug!("skipping state update after unmount");
            false
        }
    }
}
