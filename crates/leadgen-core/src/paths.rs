use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const LEADGEN_DIR: &str = ".leadgen";
pub const BACKUPS_DIR: &str = ".leadgen/backups";

pub const CONFIG_FILE: &str = ".leadgen/config.yaml";
pub const DATABASE_FILE: &str = ".leadgen/leads.db";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn leadgen_dir(root: &Path) -> PathBuf {
    root.join(LEADGEN_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn backups_dir(root: &Path) -> PathBuf {
    root.join(BACKUPS_DIR)
}

/// Resolve the database file. A relative `configured` path is taken relative
/// to the project root; `None` means the default location under `.leadgen/`.
pub fn database_path(root: &Path, configured: Option<&Path>) -> PathBuf {
    match configured {
        Some(p) if p.is_absolute() => p.to_path_buf(),
        Some(p) => root.join(p),
        None => root.join(DATABASE_FILE),
    }
}

/// `leads_backup_<stamp>.db` inside the backups directory.
pub fn backup_file(root: &Path, stamp: &str) -> PathBuf {
    backups_dir(root).join(format!("leads_backup_{stamp}.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_path_defaults_under_leadgen_dir() {
        let root = Path::new("/tmp/project");
        assert_eq!(
            database_path(root, None),
            PathBuf::from("/tmp/project/.leadgen/leads.db")
        );
    }

    #[test]
    fn database_path_relative_is_joined_to_root() {
        let root = Path::new("/tmp/project");
        assert_eq!(
            database_path(root, Some(Path::new("data/leads.db"))),
            PathBuf::from("/tmp/project/data/leads.db")
        );
        assert_eq!(
            database_path(root, Some(Path::new("/var/leads.db"))),
            PathBuf::from("/var/leads.db")
        );
    }

    #[test]
    fn backup_file_is_stamped() {
        let p = backup_file(Path::new("/r"), "20260101_120000");
        assert!(p.ends_with(".leadgen/backups/leads_backup_20260101_120000.db"));
    }
}
