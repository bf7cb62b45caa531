//! Diagnostics aggregation and publishing.

use std::path::PathBuf;

use loon_syntax::diagnostics::Diagnostic;
use rustc_hash::FxHashMap;

use super::SessionState;

impl SessionState {
    /// Recompute the diagnostics of every `provoking` path and publish them if anything changed.
    ///
    /// A file's diagnostics are its read error, lexing diagnostics and `Err` node diagnostics,
    /// sorted by span start. Published entries of files no longer tracked are dropped, which also
    /// counts as a change. Only a change (or `force`) schedules a [`DiagnosticsChanged`]
    /// notification.
    ///
    /// [`DiagnosticsChanged`]: super::DiagnosticsChanged
    pub fn publish(&mut self, force: bool, provoking: &[PathBuf]) {
        if provoking.is_empty() && !force {
            return;
        }

        let mut fresh: FxHashMap<PathBuf, Vec<Diagnostic>> = FxHashMap::default();
        for path in provoking {
            let mut diags = self
                .cached_file(path)
                .map(|file| file.all_diagnostics())
                .unwrap_or_default();
            diags.sort_by(|a, b| a.span.cmp_start(&b.span));
            fresh.insert(path.clone(), diags);
        }

        let before = self.published.len();
        let packs = &self.packs;
        self.published
            .retain(|path, _| path.parent().and_then(|dir| packs.get(dir)).is_some_and(|pack| pack.file(path).is_some()));
        let mut changed = self.published.len() != before;

        changed = changed
            || fresh.iter().any(|(path, diags)| {
                let published = self.published.get(path).map(Vec::as_slice).unwrap_or_default();
                !same_diagnostics(published, diags)
            });
        if changed {
            for (path, diags) in fresh {
                if self.is_known(&path) {
                    self.published.insert(path, diags);
                }
            }
            tracing::debug!(files = self.published.len(), "diagnostics changed");
        }

        if changed || force {
            self.notify_pending = true;
        }
    }
}

fn same_diagnostics(old: &[Diagnostic], new: &[Diagnostic]) -> bool {
    old.len() == new.len() && old.iter().zip(new).all(|(a, b)| a.equals(b, true))
}
