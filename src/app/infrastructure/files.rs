use std::fs;
use std::path::Path;

/// What a target document looks like on disk before the run touches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetStatus {
    pub exists: bool,
    /// The read-only permission flag, `None` when the file does not exist.
    /// This is not an access check: ownership, ACLs and read-only mounts
    /// are not considered, so a write can still fail when this is `false`.
    pub read_only: Option<bool>,
}

pub fn inspect_target(path: &Path) -> TargetStatus {
    match fs::metadata(path) {
        Ok(meta) => TargetStatus {
            exists: true,
            read_only: Some(meta.permissions().readonly()),
        },
        Err(_) => TargetStatus {
            exists: false,
            read_only: None,
        },
    }
}

/// Log the state of each target document.
pub fn log_targets<'a>(paths: impl IntoIterator<Item = &'a Path>) {
    for path in paths {
        let status = inspect_target(path);
        log::info!("Checking {}:", path.display());
        log::info!("  File exists: {}", status.exists);
        match status.read_only {
            Some(read_only) => log::info!("  File is read-only: {}", read_only),
            None => log::info!("  File is read-only: N/A"),
        }
    }
}
