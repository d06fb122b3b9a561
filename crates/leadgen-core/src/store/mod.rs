//! SQLite-backed lead store.
//!
//! One `LeadStore` owns one connection. Writers that must land together
//! (import of a profile, the per-send triple) run inside
//! [`LeadStore::with_transaction`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{LeadgenError, Result};
use crate::model::*;
use crate::types::*;

mod campaigns;
mod companies;
mod contacts;
mod interactions;
mod reports;
mod schema;
mod status;
mod tags;

pub use reports::{IndustryCount, StatusCount, UpcomingFollowUp};

pub struct LeadStore {
    conn: Connection,
}

impl LeadStore {
    /// Open (or create) the database file and bring its schema up to date.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    LeadgenError::StorageUnavailable(format!("{}: {e}", parent.display()))
                })?;
            }
        }
        let conn = Connection::open(path)
            .map_err(|e| LeadgenError::StorageUnavailable(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "opened lead store");
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| LeadgenError::StorageUnavailable(e.to_string()))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        schema::run_migrations(&conn)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    pub fn schema_version(&self) -> Result<i64> {
        schema::current_version(&self.conn)
    }

    /// Run `f` inside a SQLite transaction. Commits on `Ok`, rolls back on `Err`.
    /// Not reentrant: `f` must not call `with_transaction` again.
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        match f(self) {
            Ok(val) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(val)
            }
            Err(e) => {
                if let Err(rb) = self.conn.execute_batch("ROLLBACK") {
                    tracing::warn!(error = %rb, "rollback failed");
                }
                Err(e)
            }
        }
    }

    // =========================================================================
    // Backup
    // =========================================================================

    /// Hot copy of the whole database via SQLite's online backup API.
    pub fn backup_to(&self, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            crate::io::ensure_dir(parent)?;
        }
        let mut dst = Connection::open(dest)?;
        let backup = rusqlite::backup::Backup::new(&self.conn, &mut dst)?;
        backup.step(-1)?;
        tracing::info!(path = %dest.display(), "database backup written");
        Ok(())
    }
}

/// Trim and drop blank / "N/A" values before they reach a column.
pub(crate) fn clean(value: Option<&str>) -> Option<String> {
    if is_blank(value) {
        None
    } else {
        value.map(|v| v.trim().to_string())
    }
}

pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn store() -> LeadStore {
        LeadStore::open_in_memory().unwrap()
    }

    /// Company + contact + New status, the shape an import produces.
    pub fn seed_lead(
        store: &LeadStore,
        name: &str,
        email: Option<&str>,
        linkedin: Option<&str>,
        at: DateTime<Utc>,
    ) -> (CompanyId, ContactId) {
        let website = format!("https://{}.example", name.to_ascii_lowercase());
        let company = store
            .create_company(&CompanyProfile::new(name, Some(&website)))
            .unwrap();
        let contact = store
            .create_contact(
                company,
                &ContactInfo {
                    first_name: Some("Pat".into()),
                    last_name: Some("Lee".into()),
                    email: email.map(str::to_string),
                    linkedin_url: linkedin.map(str::to_string),
                    ..Default::default()
                },
            )
            .unwrap();
        store.init_status(company, at).unwrap();
        (company, contact)
    }
}
