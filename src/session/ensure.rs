//! Ensuring, removing and reconciling tracked files.
//!
//! ## Notes
//! - `ensure_*` operations return the paths whose diagnostics need republishing; the entry
//!   points (`on_file_edit`, `on_file_events`, `get_file`, `get_pack`) publish them.
//! - A path whose file is gone from disk is removed rather than ensured.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use super::paths::{dir_files, is_dir, is_file};
use super::src_file::SrcFile;
use super::{SessionState, SrcPack};

enum Ensured {
    /// The file is gone and was removed.
    Removed,
    Current {
        diags_relevant: bool,
        structural: bool,
    },
}

impl SessionState {
    // ========================================================================
    // Entry points
    // ========================================================================

    /// An editor changed the file at `path`; `text` is its complete new content.
    pub fn on_file_edit(&mut self, path: &Path, text: &str) {
        let changed = self.ensure_file(path, Some(text), true);
        self.publish(false, &changed);
    }

    /// Files changed on disk: reconcile with the filesystem, drop `removed`, ensure `current`.
    pub fn on_file_events(&mut self, removed: &[PathBuf], can_skip_read: bool, current: &[PathBuf]) {
        self.fs_refresh();
        self.ensure_paths(removed, can_skip_read, current);
    }

    /// Remove `removed`, ensure `current`, and publish whatever changed.
    pub fn ensure_paths(&mut self, removed: &[PathBuf], can_skip_read: bool, current: &[PathBuf]) {
        self.remove_files(removed);
        let changed = self.ensure_files(can_skip_read, current);
        self.publish(false, &changed);
    }

    /// The file at `path`, brought up to date first (a cached read is trusted).
    pub fn get_file(&mut self, path: &Path) -> Option<&SrcFile> {
        let changed = self.ensure_file(path, None, true);
        self.publish(false, &changed);
        self.cached_file(path)
    }

    /// The pack of `dir`; with `load_if_missing`, an unknown pack is loaded from the source
    /// files directly inside `dir`. `dir` must be absolute.
    pub fn get_pack(&mut self, dir: &Path, load_if_missing: bool) -> Option<&SrcPack> {
        if !dir.is_absolute() {
            tracing::debug!(dir = %dir.display(), "pack lookup with relative path");
            return None;
        }
        if load_if_missing && !self.packs.contains_key(dir) {
            let paths: Vec<PathBuf> = dir_files(dir)
                .into_iter()
                .filter(|path| self.is_source_file_path(path))
                .collect();
            let changed = self.ensure_files(true, &paths);
            self.publish(false, &changed);
        }
        self.packs.get(dir)
    }

    // ========================================================================
    // Ensure
    // ========================================================================

    /// Make sure the file at `path` is tracked and its tokens and AST are current.
    ///
    /// With `text`, that text is taken as the file's content (an unsaved editor buffer).
    /// Otherwise the file is read from disk, except when `can_skip_read` allows trusting an
    /// earlier successful read. Returns the paths whose diagnostics need republishing.
    pub fn ensure_file(&mut self, path: &Path, text: Option<&str>, can_skip_read: bool) -> Vec<PathBuf> {
        let mut changed = Vec::new();
        let mut queued = FxHashSet::default();
        self.ensure_one(path, text, can_skip_read, &mut changed, &mut queued);
        self.refresh_queued_packs(queued);
        changed
    }

    /// [`ensure_file`](Self::ensure_file) for several on-disk files at once.
    #[tracing::instrument(skip_all, fields(count = paths.len()))]
    pub fn ensure_files(&mut self, can_skip_read: bool, paths: &[PathBuf]) -> Vec<PathBuf> {
        let mut changed = Vec::new();
        let mut queued = FxHashSet::default();
        for path in paths {
            self.ensure_one(path, None, can_skip_read, &mut changed, &mut queued);
        }
        self.refresh_queued_packs(queued);
        changed
    }

    fn ensure_one(
        &mut self,
        path: &Path,
        text: Option<&str>,
        can_skip_read: bool,
        changed: &mut Vec<PathBuf>,
        queued: &mut FxHashSet<PathBuf>,
    ) {
        if !is_file(path) {
            self.remove_files(&[path.to_path_buf()]);
            push_unique(changed, path);
            return;
        }

        let is_new = !self.is_known(path);
        if is_new {
            self.register(path);
            push_unique(changed, path);
            // a newly registered file counts as a structural change to its pack
            if let Some(dir) = path.parent() {
                queued.insert(dir.to_path_buf());
            }
        }

        match self.refresh_file(path, text, can_skip_read && !is_new) {
            Ensured::Removed => {
                self.remove_files(&[path.to_path_buf()]);
                push_unique(changed, path);
            }
            Ensured::Current {
                diags_relevant,
                structural,
            } => {
                if diags_relevant {
                    push_unique(changed, path);
                }
                if structural && let Some(dir) = path.parent() {
                    queued.insert(dir.to_path_buf());
                }
            }
        }
    }

    fn register(&mut self, path: &Path) {
        let file = SrcFile::new(path.to_path_buf());
        let dir = file.pack_dir().to_path_buf();
        tracing::debug!(path = %path.display(), "registering source file");
        self.packs
            .entry(dir.clone())
            .or_insert_with(|| SrcPack::new(dir))
            .add_file(file);
    }

    /// Load new content if needed and re-derive tokens and AST if the content changed.
    fn refresh_file(&mut self, path: &Path, text: Option<&str>, can_skip_read: bool) -> Ensured {
        let shebang_prefix = self.config.shebang_prefix.as_str();
        let stats = &mut self.stats;
        let Some(file) = path.parent().and_then(|dir| self.packs.get_mut(dir)).and_then(|pack| pack.file_mut(path)) else {
            return Ensured::Removed;
        };

        let had_read_err = file.last_read_error().is_some();
        let old_text = match text {
            Some(text) => Some(file.set_text(text)),
            None if !can_skip_read || had_read_err || !file.ever_read() => match file.read_from_disk() {
                Some(old_text) => Some(old_text),
                None => return Ensured::Removed,
            },
            None => None,
        };

        let text_changed = old_text.is_some_and(|old| old != file.text());
        if !(text_changed || had_read_err || file.last_read_error().is_some()) {
            tracing::debug!(path = %path.display(), "source unchanged");
            return Ensured::Current {
                diags_relevant: false,
                structural: false,
            };
        }

        let rederived = file.rederive(shebang_prefix, stats);
        Ensured::Current {
            diags_relevant: rederived.diags_relevant,
            structural: rederived.structural,
        }
    }

    fn refresh_queued_packs(&mut self, queued: FxHashSet<PathBuf>) {
        for dir in queued {
            if let Some(pack) = self.packs.get_mut(&dir)
                && pack.refresh_trees()
            {
                self.stats.tree_refreshes += 1;
            }
        }
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Stop tracking `paths`. Packs left empty are dropped; the remaining members of every
    /// affected pack get their trees refreshed and their diagnostics republished.
    pub fn remove_files(&mut self, paths: &[PathBuf]) {
        if paths.is_empty() {
            return;
        }
        let mut affected = FxHashSet::default();
        for path in paths {
            let Some(dir) = path.parent() else {
                continue;
            };
            let Some(pack) = self.packs.get_mut(dir) else {
                continue;
            };
            if pack.remove_file(path) {
                tracing::debug!(path = %path.display(), "source file removed");
                affected.insert(dir.to_path_buf());
            }
            if pack.files().is_empty() {
                self.packs.remove(dir);
            }
        }

        let mut provoking = Vec::new();
        for dir in &affected {
            if let Some(pack) = self.packs.get_mut(dir) {
                provoking.extend(pack.file_paths());
                if pack.refresh_trees() {
                    self.stats.tree_refreshes += 1;
                }
            }
        }
        provoking.extend(paths.iter().cloned());
        self.publish(false, &provoking);
    }

    /// Remove every tracked file no longer on disk, and every pack whose directory is gone.
    pub fn fs_refresh(&mut self) {
        let mut gone: Vec<PathBuf> = Vec::new();
        for (dir, pack) in &self.packs {
            if is_dir(dir) {
                gone.extend(pack.files().iter().map(SrcFile::path).filter(|path| !is_file(path)).map(Path::to_path_buf));
            } else {
                gone.extend(pack.file_paths());
            }
        }
        self.remove_files(&gone);
    }
}

fn push_unique(paths: &mut Vec<PathBuf>, path: &Path) {
    if !paths.iter().any(|known| known == path) {
        paths.push(path.to_path_buf());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use std::fs;

    fn state() -> SessionState {
        SessionState::new(SessionConfig::default())
    }

    #[test]
    fn test_ensure_registers_file_and_pack() {
        let dir = tempfile::Builder::new().prefix("loon").tempdir().unwrap();
        let path = dir.path().join("main.ls");
        fs::write(&path, "x\n").unwrap();

        let mut state = state();
        let changed = state.ensure_file(&path, None, true);
        assert_eq!(changed, vec![path.clone()]);
        let pack = state.cached_pack(dir.path()).unwrap();
        assert_eq!(pack.file_paths(), vec![path.clone()]);
        assert_eq!(pack.trees_generation(), 1);
        assert_eq!(state.cached_file(&path).unwrap().text(), "x\n");
    }

    #[test]
    fn test_missing_file_is_not_registered() {
        let dir = tempfile::Builder::new().prefix("loon").tempdir().unwrap();
        let path = dir.path().join("gone.ls");
        let mut state = state();
        assert_eq!(state.ensure_file(&path, None, true), vec![path.clone()]);
        assert!(state.cached_file(&path).is_none());
        assert!(state.all_packs().is_empty());
    }

    #[test]
    fn test_can_skip_read_trusts_cache() {
        let dir = tempfile::Builder::new().prefix("loon").tempdir().unwrap();
        let path = dir.path().join("main.ls");
        fs::write(&path, "x\n").unwrap();
        let mut state = state();
        state.ensure_file(&path, None, true);

        fs::write(&path, "y\n").unwrap();
        state.ensure_file(&path, None, true);
        assert_eq!(state.cached_file(&path).unwrap().text(), "x\n");
        state.ensure_file(&path, None, false);
        assert_eq!(state.cached_file(&path).unwrap().text(), "y\n");
    }

    #[test]
    fn test_removing_last_file_drops_pack() {
        let dir = tempfile::Builder::new().prefix("loon").tempdir().unwrap();
        let (a, b) = (dir.path().join("a.ls"), dir.path().join("b.ls"));
        fs::write(&a, "a\n").unwrap();
        fs::write(&b, "b\n").unwrap();
        let mut state = state();
        state.ensure_files(true, &[a.clone(), b.clone()]);
        let before = state.stats().tree_refreshes;

        state.remove_files(&[a.clone()]);
        assert_eq!(state.cached_pack(dir.path()).unwrap().file_paths(), vec![b.clone()]);
        assert_eq!(state.stats().tree_refreshes, before + 1);

        state.remove_files(&[b]);
        assert!(state.cached_pack(dir.path()).is_none());
    }

    #[test]
    fn test_fs_refresh_drops_deleted_files() {
        let dir = tempfile::Builder::new().prefix("loon").tempdir().unwrap();
        let (a, b) = (dir.path().join("a.ls"), dir.path().join("b.ls"));
        fs::write(&a, "a\n").unwrap();
        fs::write(&b, "b\n").unwrap();
        let mut state = state();
        state.ensure_files(true, &[a.clone(), b.clone()]);

        fs::remove_file(&a).unwrap();
        state.fs_refresh();
        assert!(state.cached_file(&a).is_none());
        assert!(state.cached_file(&b).is_some());
    }

    #[test]
    fn test_get_pack_loads_source_files_only() {
        let dir = tempfile::Builder::new().prefix("loon").tempdir().unwrap();
        fs::write(dir.path().join("a.ls"), "a\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "not loon").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.ls"), "c\n").unwrap();

        let mut state = state();
        assert!(state.get_pack(dir.path(), false).is_none());
        let pack = state.get_pack(dir.path(), true).unwrap();
        assert_eq!(pack.file_paths(), vec![dir.path().join("a.ls")]);
        assert!(state.get_pack(Path::new("relative/dir"), true).is_none());
    }
}
