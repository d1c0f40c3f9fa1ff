//! File watcher: runs `build` on startup, then rebuilds on documentation changes.

use std::path::{Component, Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::commands;
use crate::config;
use crate::diagnostics;
use crate::error;
use crate::scanner;

/// Debounce delay between filesystem events and rebuild.
const DEBOUNCE_MS: u64 = 100;

/// Whether a changed path can affect the build: a documentation file or the
/// config, outside dot-directories. The index itself is written by the build
/// and must not retrigger it.
fn affects_build(root: &Path, path: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let hidden = relative.components().any(|c| {
        return match c {
            Component::Normal(name) => scanner::is_hidden(name),
            _ => false,
        };
    });
    let is_config = relative.file_name().is_some_and(|n| return n == config::CONFIG_FILE);
    if is_config {
        return true;
    }
    return !hidden && scanner::has_doc_extension(relative);
}

/// Create a filesystem watcher that sends an event for every relevant change.
///
/// # Errors
///
/// Returns `Error::Watch` if the watcher cannot be created.
fn create_watcher(root: PathBuf, tx: crossbeam_channel::Sender<()>) -> Result<notify::RecommendedWatcher, error::Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_) | notify::EventKind::Modify(_) | notify::EventKind::Remove(_)
            )
            && event.paths.iter().any(|p| return affects_build(&root, p))
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return error::Error::Watch { reason: format!("watcher setup failed: {e}") };
    });
}

/// Entry point for the watch command.
///
/// Runs an initial build, then watches the tree and rebuilds on changes.
///
/// # Errors
///
/// Returns errors from watcher setup.
pub fn run() -> Result<ExitCode, error::Error> {
    let root = PathBuf::from(".");
    let absolute = std::fs::canonicalize(&root)?;

    eprintln!("watch: initial build");
    let mut last_code = run_build();

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(absolute.clone(), tx)?;
    watcher.watch(&absolute, RecursiveMode::Recursive).map_err(|e| {
        return error::Error::Watch { reason: format!("cannot watch {}: {e}", absolute.display()) };
    })?;

    eprintln!("watch: monitoring {}, press Ctrl+C to stop", absolute.display());

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        eprintln!("watch: change detected, rebuilding...");
        tracing::debug!("rebuild triggered");
        last_code = run_build();
    }

    return Ok(last_code);
}

/// Run build once and print the result. Returns the exit code from build.
fn run_build() -> ExitCode {
    return match commands::build() {
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(3_u8)
        },
        Ok(code) => code,
    };
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn documentation_and_config_changes_trigger() {
        let root = Path::new("/project");
        assert!(affects_build(root, Path::new("/project/docs/api.rst")));
        assert!(affects_build(root, Path::new("/project/guide.md")));
        assert!(affects_build(root, Path::new("/project/.polyglot.toml")));
    }

    #[test]
    fn index_sources_and_hidden_dirs_are_ignored() {
        let root = Path::new("/project");
        assert!(!affects_build(root, Path::new("/project/.polyglot.index")));
        assert!(!affects_build(root, Path::new("/project/src/main.rs")));
        assert!(!affects_build(root, Path::new("/project/.git/notes.txt")));
    }
}
