//! Session configuration for loon tooling

use loon_syntax::parser::DEFAULT_SHEBANG_PREFIX;

/// Settings a [`Session`](crate::session::Session) is constructed with.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Extension of loon source files, without the dot
    pub source_extension: String,
    /// Interpreter-directive prefix that turns a file's first line into a comment
    pub shebang_prefix: String,
    /// Whether files under a dot-prefixed directory (`.git`, `.cache`, ...) are ignored
    pub exclude_dot_dirs: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            source_extension: "ls".to_string(),
            shebang_prefix: DEFAULT_SHEBANG_PREFIX.to_string(),
            exclude_dot_dirs: true,
        }
    }
}

impl SessionConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source file extension (given without the dot)
    pub fn with_source_extension(mut self, ext: impl Into<String>) -> Self {
        self.source_extension = ext.into();
        self
    }

    /// Set the interpreter-directive prefix
    pub fn with_shebang_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.shebang_prefix = prefix.into();
        self
    }

    /// Set whether dot-prefixed directories are excluded
    pub fn with_exclude_dot_dirs(mut self, exclude: bool) -> Self {
        self.exclude_dot_dirs = exclude;
        self
    }
}
