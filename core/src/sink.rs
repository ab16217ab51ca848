use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::info;

/// Destination of generated text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Sink {
    #[default]
    Stdout,
    /// Writes `<dir>/<base name>.rs`, replacing any existing file.
    Directory(PathBuf),
}

impl Sink {
    pub fn directory<P: AsRef<Path>>(path: P) -> Self {
        Sink::Directory(path.as_ref().to_path_buf())
    }

    /// Path of the file written for `base_name`, if this sink writes files.
    pub fn target_path(&self, base_name: &str) -> Option<PathBuf> {
        match self {
            Sink::Stdout => None,
            Sink::Directory(dir) => Some(dir.join(target_file_name(base_name))),
        }
    }

    pub fn open(&self, base_name: &str) -> io::Result<Box<dyn Write>> {
        match self.target_path(base_name) {
            None => Ok(Box::new(io::stdout().lock())),
            Some(path) => {
                info!(path = %path.display(), "writing declarations");
                let file = File::create(path)?;
                Ok(Box::new(BufWriter::new(file)))
            }
        }
    }
}

pub fn target_file_name(base_name: &str) -> String {
    format!("{}.rs", base_name.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_lowercased_base_name() {
        assert_eq!(target_file_name("Expr"), "expr.rs");
        assert_eq!(target_file_name("Stmt"), "stmt.rs");
    }

    #[test]
    fn stdout_has_no_target_path() {
        assert_eq!(Sink::Stdout.target_path("Expr"), None);
        assert_eq!(
            Sink::directory("out").target_path("Expr"),
            Some(PathBuf::from("out").join("expr.rs"))
        );
    }

    #[test]
    fn directory_sink_fails_for_missing_directory() {
        let sink = Sink::directory("does/not/exist");
        assert!(sink.open("Expr").is_err());
    }
}
