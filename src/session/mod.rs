//! Incremental session cache
//!
//! The session owns every tracked [`SrcFile`], grouped into directory-scoped [`SrcPack`]s, plus
//! the diagnostics last published for each file path. It keeps tokens and ASTs current as files
//! are edited, created, deleted or re-read, and skips work wherever it can tell nothing relevant
//! changed:
//!
//! - **File level**: text identical to what is cached is never re-tokenized. A new AST that
//!   equals the old one up to comments, whitespace and top-level order is a cosmetic edit and
//!   does not queue its pack for a tree refresh.
//! - **Pack level**: a queued pack only refreshes its trees if its member set or some member's
//!   content hash differs from the last refresh.
//! - **Publishing**: the diagnostics-changed notification fires only when the recomputed
//!   diagnostics differ from the published ones.
//!
//! ## Concurrency
//!
//! All state lives in one [`SessionState`] behind a mutex, reached only via [`Session::access`].
//! A diagnostics-changed notification produced during an access is sent after the lock is
//! released, so a listener may call back into [`Session::access`] without deadlocking.
//!
//! ## Modules
//!
//! - `src_file` - A tracked file and its derived tokens/AST
//! - `pack` - Directory-scoped packs and the tree refresh gate
//! - `ensure` - Ensuring, removing and reconciling files
//! - `publish` - Diagnostics aggregation and publishing
//! - `content_hash` - Recompute-skip keys
//! - `paths` - Source file path classification

mod content_hash;
mod ensure;
mod pack;
mod paths;
mod publish;
mod src_file;

use std::path::{Path, PathBuf};

use loon_syntax::diagnostics::Diagnostic;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;

use crate::config::SessionConfig;

pub use content_hash::content_hash;
pub use pack::SrcPack;
pub use paths::is_source_file_path;
pub use src_file::{MAX_SOURCE_SIZE, ReadError, SrcFile, read_source};

/// Published diagnostics, per file path.
pub type DiagnosticsMap = FxHashMap<PathBuf, Vec<Diagnostic>>;

/// Counts of the expensive steps the session performed, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecomputeStats {
    pub tokenizations: u64,
    pub parses: u64,
    pub tree_refreshes: u64,
}

/// Sent after an access that changed the published diagnostics.
///
/// Carries the complete diagnostics map as of that access, not a delta.
#[derive(Debug, Clone)]
pub struct DiagnosticsChanged {
    pub diagnostics: DiagnosticsMap,
}

// ============================================================================
// Session
// ============================================================================

/// Owner of the session state and its single guarded entry point.
pub struct Session {
    state: Mutex<SessionState>,
    notifier: Option<mpsc::UnboundedSender<DiagnosticsChanged>>,
}

impl Session {
    /// A session without change notifications.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            state: Mutex::new(SessionState::new(config)),
            notifier: None,
        }
    }

    /// A session that sends a [`DiagnosticsChanged`] for every publish that altered diagnostics.
    ///
    /// Pass the receiver to [`spawn_diagnostics_listener`] or poll it directly.
    pub fn with_notifications(config: SessionConfig) -> (Self, mpsc::UnboundedReceiver<DiagnosticsChanged>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Self {
            state: Mutex::new(SessionState::new(config)),
            notifier: Some(tx),
        };
        (session, rx)
    }

    /// Run `f` with exclusive access to the session state.
    ///
    /// Blocks while another caller holds access. Any resulting notification is sent once `f`
    /// has returned and the lock is released.
    pub fn access<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let (result, changed) = {
            let mut state = self.state.lock();
            let result = f(&mut state);
            let pending = state.take_notify_pending();
            let changed = (pending && self.notifier.is_some()).then(|| DiagnosticsChanged {
                diagnostics: state.published.clone(),
            });
            (result, changed)
        };
        if let (Some(changed), Some(notifier)) = (changed, &self.notifier)
            && notifier.send(changed).is_err()
        {
            tracing::debug!("diagnostics changed, but nobody is listening");
        }
        result
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

/// Handle every [`DiagnosticsChanged`] on its own background task, in order.
///
/// Must be called from within a tokio runtime. The task ends once the session is dropped.
pub fn spawn_diagnostics_listener<F>(
    mut events: mpsc::UnboundedReceiver<DiagnosticsChanged>,
    mut on_change: F,
) -> tokio::task::JoinHandle<()>
where
    F: FnMut(DiagnosticsChanged) + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(changed) = events.recv().await {
            on_change(changed);
        }
    })
}

// ============================================================================
// Session state
// ============================================================================

/// Everything the session tracks. Reached through [`Session::access`].
#[derive(Debug)]
pub struct SessionState {
    config: SessionConfig,
    packs: FxHashMap<PathBuf, SrcPack>,
    published: DiagnosticsMap,
    stats: RecomputeStats,
    notify_pending: bool,
}

impl SessionState {
    fn new(config: SessionConfig) -> Self {
        Self {
            config,
            packs: FxHashMap::default(),
            published: DiagnosticsMap::default(),
            stats: RecomputeStats::default(),
            notify_pending: false,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn stats(&self) -> RecomputeStats {
        self.stats
    }

    /// Diagnostics as last published, per file path.
    pub fn current_diagnostics(&self) -> &DiagnosticsMap {
        &self.published
    }

    /// All packs, sorted by directory path.
    pub fn all_packs(&self) -> Vec<&SrcPack> {
        let mut packs: Vec<&SrcPack> = self.packs.values().collect();
        packs.sort_by(|a, b| a.dir_path().cmp(b.dir_path()));
        packs
    }

    /// The cached file at `path`, without checking whether it is current.
    pub fn cached_file(&self, path: &Path) -> Option<&SrcFile> {
        self.packs.get(path.parent()?)?.file(path)
    }

    /// The cached pack of `dir`, without loading it.
    pub fn cached_pack(&self, dir: &Path) -> Option<&SrcPack> {
        self.packs.get(dir)
    }

    pub fn is_source_file_path(&self, path: &Path) -> bool {
        is_source_file_path(path, &self.config)
    }

    fn is_known(&self, path: &Path) -> bool {
        self.cached_file(path).is_some()
    }

    fn take_notify_pending(&mut self) -> bool {
        std::mem::take(&mut self.notify_pending)
    }
}
