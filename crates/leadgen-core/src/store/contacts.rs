use super::*;

const CONTACT_COLUMNS: &str =
    "id, company_id, first_name, last_name, position, email, phone, linkedin_url, notes";

impl LeadStore {
    // =========================================================================
    // Contacts
    // =========================================================================

    pub fn create_contact(&self, company_id: CompanyId, info: &ContactInfo) -> Result<ContactId> {
        self.ensure_company_exists(company_id)?;

        let email = clean(info.email.as_deref());
        let mut first_name = clean(info.first_name.as_deref());
        let mut last_name = clean(info.last_name.as_deref());
        if first_name.is_none() && last_name.is_none() {
            if let Some((first, last)) = email.as_deref().and_then(name_from_email) {
                first_name = Some(first);
                last_name = Some(last);
            }
        }

        let at = now();
        self.conn.execute(
            "INSERT INTO contacts (
                company_id, first_name, last_name, position, email, phone,
                linkedin_url, notes, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                company_id,
                first_name,
                last_name,
                clean(info.position.as_deref()),
                email,
                clean(info.phone.as_deref()),
                clean(info.linkedin_url.as_deref()),
                clean(info.notes.as_deref()),
                at,
            ],
        )?;
        Ok(ContactId(self.conn.last_insert_rowid()))
    }

    pub fn get_contact(&self, id: ContactId) -> Result<Contact> {
        self.conn
            .query_row(
                &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"),
                params![id],
                Self::map_contact_row,
            )
            .optional()?
            .ok_or(LeadgenError::ContactNotFound(id.0))
    }

    pub fn contacts_for_company(&self, company_id: CompanyId) -> Result<Vec<Contact>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE company_id = ?1 ORDER BY id"
        ))?;
        let rows = stmt.query_map(params![company_id], Self::map_contact_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn company_for_contact(&self, contact_id: ContactId) -> Result<CompanyId> {
        self.conn
            .query_row(
                "SELECT company_id FROM contacts WHERE id = ?1",
                params![contact_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(LeadgenError::ContactNotFound(contact_id.0))
    }

    /// Fill the contact's email / LinkedIn URL where they are empty or "N/A".
    /// Existing values are never overwritten. Returns true if a column changed.
    pub fn enrich_contact(&self, id: ContactId, enrichment: &ContactEnrichment) -> Result<bool> {
        let current = self.get_contact(id)?.info;

        let email = match clean(enrichment.email.as_deref()) {
            Some(found) if is_blank(current.email.as_deref()) => Some(found),
            _ => None,
        };
        let linkedin_url = match clean(enrichment.linkedin_url.as_deref()) {
            Some(found) if is_blank(current.linkedin_url.as_deref()) => Some(found),
            _ => None,
        };
        if email.is_none() && linkedin_url.is_none() {
            return Ok(false);
        }

        self.conn.execute(
            "UPDATE contacts SET
                email = COALESCE(?2, email),
                linkedin_url = COALESCE(?3, linkedin_url),
                updated_at = ?4
             WHERE id = ?1",
            params![id, email, linkedin_url, now()],
        )?;
        Ok(true)
    }

    pub(super) fn ensure_company_exists(&self, company_id: CompanyId) -> Result<()> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM companies WHERE id = ?1)",
            params![company_id],
            |row| row.get(0),
        )?;
        if exists {
            Ok(())
        } else {
            Err(LeadgenError::CompanyNotFound(company_id.0))
        }
    }

    pub(super) fn map_contact_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
        Ok(Contact {
            id: row.get(0)?,
            company_id: row.get(1)?,
            info: ContactInfo {
                first_name: row.get(2)?,
                last_name: row.get(3)?,
                position: row.get(4)?,
                email: row.get(5)?,
                phone: row.get(6)?,
                linkedin_url: row.get(7)?,
                notes: row.get(8)?,
            },
        })
    }
}

/// `jane.doe@acme.com` -> ("Jane", "Doe").
fn name_from_email(email: &str) -> Option<(String, String)> {
    let (local, _) = email.split_once('@')?;
    let mut parts = local.split('.');
    let first = parts.next().filter(|p| !p.is_empty())?;
    let last = parts.next().filter(|p| !p.is_empty())?;
    Some((capitalize(first), capitalize(last)))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::store;
    use super::*;

    fn company(store: &LeadStore) -> CompanyId {
        store
            .create_company(&CompanyProfile::new("Acme", Some("https://acme.com")))
            .unwrap()
    }

    #[test]
    fn contact_requires_company() {
        let store = store();
        let err = store
            .create_contact(CompanyId(7), &ContactInfo::default())
            .unwrap_err();
        assert!(matches!(err, LeadgenError::CompanyNotFound(7)));
    }

    #[test]
    fn name_derived_from_dotted_email() {
        let store = store();
        let c = company(&store);
        let id = store
            .create_contact(
                c,
                &ContactInfo {
                    email: Some("jane.DOE@acme.com".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        let info = store.get_contact(id).unwrap().info;
        assert_eq!(info.first_name.as_deref(), Some("Jane"));
        assert_eq!(info.last_name.as_deref(), Some("Doe"));
    }

    #[test]
    fn explicit_name_wins_over_email() {
        let store = store();
        let c = company(&store);
        let id = store
            .create_contact(
                c,
                &ContactInfo {
                    first_name: Some("Sam".into()),
                    email: Some("jane.doe@acme.com".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        let info = store.get_contact(id).unwrap().info;
        assert_eq!(info.first_name.as_deref(), Some("Sam"));
        assert!(info.last_name.is_none());
    }

    #[test]
    fn enrichment_never_overwrites_existing_email() {
        let store = store();
        let c = company(&store);
        let id = store
            .create_contact(
                c,
                &ContactInfo {
                    email: Some("a@x.com".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let changed = store
            .enrich_contact(
                id,
                &ContactEnrichment {
                    email: Some("b@x.com".into()),
                    linkedin_url: None,
                },
            )
            .unwrap();
        assert!(!changed);
        assert_eq!(
            store.get_contact(id).unwrap().info.email.as_deref(),
            Some("a@x.com")
        );
    }

    #[test]
    fn enrichment_fills_missing_linkedin() {
        let store = store();
        let c = company(&store);
        let id = store
            .create_contact(
                c,
                &ContactInfo {
                    email: Some("a@x.com".into()),
                    linkedin_url: Some("N/A".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        let changed = store
            .enrich_contact(
                id,
                &ContactEnrichment {
                    email: Some("b@x.com".into()),
                    linkedin_url: Some("https://linkedin.com/in/a".into()),
                },
            )
            .unwrap();
        assert!(changed);
        let info = store.get_contact(id).unwrap().info;
        assert_eq!(info.email.as_deref(), Some("a@x.com"));
        assert_eq!(info.linkedin_url.as_deref(), Some("https://linkedin.com/in/a"));
        assert_eq!(store.company_for_contact(id).unwrap(), c);
    }

    #[test]
    fn capitalize_lowercases_tail() {
        assert_eq!(capitalize("mARY"), "Mary");
        assert_eq!(name_from_email("solo@x.com"), None);
    }
}
