//! Directory-scoped packs of source files.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rustc_hash::FxHashMap;

use super::content_hash::content_hash;
use super::src_file::SrcFile;

/// The source files of one directory: the unit of cross-file recomputation.
///
/// Created when the first file of a previously unseen directory is ensured, dropped when its
/// last file is removed.
#[derive(Debug)]
pub struct SrcPack {
    dir_path: PathBuf,
    files: Vec<SrcFile>,
    /// Content hash per member file as of the last tree refresh.
    last_tree_hashes: FxHashMap<PathBuf, String>,
    /// Bumped on every tree refresh that actually ran.
    trees_generation: u64,
}

impl SrcPack {
    pub(crate) fn new(dir_path: PathBuf) -> Self {
        Self {
            dir_path,
            files: Vec::new(),
            last_tree_hashes: FxHashMap::default(),
            trees_generation: 0,
        }
    }

    pub fn dir_path(&self) -> &Path {
        &self.dir_path
    }

    /// Member files, in the order they were registered.
    pub fn files(&self) -> &[SrcFile] {
        &self.files
    }

    pub fn file(&self, path: &Path) -> Option<&SrcFile> {
        self.files.iter().find(|file| file.path() == path)
    }

    pub(crate) fn file_mut(&mut self, path: &Path) -> Option<&mut SrcFile> {
        self.files.iter_mut().find(|file| file.path() == path)
    }

    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|file| file.path().to_path_buf()).collect()
    }

    /// How many tree refreshes have run for this pack.
    pub fn trees_generation(&self) -> u64 {
        self.trees_generation
    }

    pub(crate) fn add_file(&mut self, file: SrcFile) {
        self.files.push(file);
    }

    /// Detach the file at `path`. Returns `false` if it was not a member.
    pub(crate) fn remove_file(&mut self, path: &Path) -> bool {
        let before = self.files.len();
        self.files.retain(|file| file.path() != path);
        self.files.len() != before
    }

    // ========================================================================
    // Tree refresh gate
    // ========================================================================

    /// Refresh the pack's derived trees unless nothing relevant changed since the last refresh.
    ///
    /// Returns `true` if the refresh ran.
    pub(crate) fn refresh_trees(&mut self) -> bool {
        if self.can_skip_trees_refresh() {
            tracing::debug!(pack = %self.dir_path.display(), "pack trees refresh skipped");
            return false;
        }
        let started = Instant::now();
        self.last_tree_hashes = self
            .files
            .iter()
            .map(|file| (file.path().to_path_buf(), file.content_hash()))
            .collect();
        self.trees_generation += 1;
        tracing::info!(
            pack = %self.dir_path.display(),
            generation = self.trees_generation,
            elapsed = ?started.elapsed(),
            "pack trees refreshed"
        );
        true
    }

    /// Skip when the member set and every member's content hash match the last refresh.
    ///
    /// A member with read, lexing or parse errors also skips the refresh, and clears the
    /// snapshot so that the next change is never mistaken for "nothing changed".
    fn can_skip_trees_refresh(&mut self) -> bool {
        let unchanged = self.files.len() == self.last_tree_hashes.len()
            && self.files.iter().all(|file| {
                self.last_tree_hashes
                    .get(file.path())
                    .is_some_and(|hash| *hash == content_hash(file.text()))
            });
        if unchanged {
            return true;
        }
        if self.files.iter().any(SrcFile::has_lex_or_parse_errs) {
            self.last_tree_hashes.clear();
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::RecomputeStats;
    use loon_syntax::parser::DEFAULT_SHEBANG_PREFIX;

    fn pack_with(files: &[(&str, &str)]) -> SrcPack {
        let mut pack = SrcPack::new(PathBuf::from("/pkg"));
        let mut stats = RecomputeStats::default();
        for &(name, text) in files {
            let mut file = SrcFile::new(PathBuf::from("/pkg").join(name));
            file.set_text(text);
            file.rederive(DEFAULT_SHEBANG_PREFIX, &mut stats);
            pack.add_file(file);
        }
        pack
    }

    fn edit(pack: &mut SrcPack, name: &str, text: &str) {
        let path = PathBuf::from("/pkg").join(name);
        let file = pack.file_mut(&path).unwrap();
        file.set_text(text);
        file.rederive(DEFAULT_SHEBANG_PREFIX, &mut RecomputeStats::default());
    }

    #[test]
    fn test_refresh_runs_once_per_change() {
        let mut pack = pack_with(&[("a.ls", "a\n"), ("b.ls", "b\n")]);
        assert!(pack.refresh_trees());
        assert!(!pack.refresh_trees());
        assert_eq!(pack.trees_generation(), 1);

        edit(&mut pack, "a.ls", "a 1\n");
        assert!(pack.refresh_trees());
        assert_eq!(pack.trees_generation(), 2);
    }

    #[test]
    fn test_member_set_change_refreshes() {
        let mut pack = pack_with(&[("a.ls", "a\n"), ("b.ls", "b\n")]);
        assert!(pack.refresh_trees());
        assert!(pack.remove_file(Path::new("/pkg/b.ls")));
        assert!(!pack.remove_file(Path::new("/pkg/b.ls")));
        assert!(pack.refresh_trees());
    }

    #[test]
    fn test_errors_hold_back_refresh_until_fixed() {
        let mut pack = pack_with(&[("a.ls", "a\n")]);
        assert!(pack.refresh_trees());

        edit(&mut pack, "a.ls", "(a\n");
        assert!(!pack.refresh_trees());

        // back to the last refreshed content, but the snapshot was dropped
        edit(&mut pack, "a.ls", "a\n");
        assert!(pack.refresh_trees());
        assert_eq!(pack.trees_generation(), 2);
    }
}
