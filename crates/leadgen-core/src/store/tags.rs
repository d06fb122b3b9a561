use super::*;

impl LeadStore {
    // =========================================================================
    // Tags
    // =========================================================================

    /// Create the tag if needed and return its id. Names are unique.
    pub fn add_tag(&self, name: &str, description: Option<&str>) -> Result<TagId> {
        let name = name.trim();
        self.conn.execute(
            "INSERT INTO tags (name, description, created_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET
                description = COALESCE(tags.description, excluded.description)",
            params![name, description, now()],
        )?;
        Ok(self.conn.query_row(
            "SELECT id FROM tags WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?)
    }

    /// Returns false if the company already carried the tag.
    pub fn tag_company(&self, company_id: CompanyId, tag_id: TagId) -> Result<bool> {
        self.ensure_company_exists(company_id)?;
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO company_tags (company_id, tag_id, created_at)
             VALUES (?1, ?2, ?3)",
            params![company_id, tag_id, now()],
        )?;
        Ok(inserted > 0)
    }

    pub fn tags_for_company(&self, company_id: CompanyId) -> Result<Vec<Tag>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.name, t.description
             FROM tags t
             JOIN company_tags ct ON ct.tag_id = t.id
             WHERE ct.company_id = ?1
             ORDER BY t.name",
        )?;
        let rows = stmt.query_map(params![company_id], |row| {
            Ok(Tag {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn companies_by_tag(&self, name: &str) -> Result<Vec<CompanyId>> {
        let mut stmt = self.conn.prepare(
            "SELECT ct.company_id
             FROM company_tags ct
             JOIN tags t ON t.id = ct.tag_id
             WHERE t.name = ?1
             ORDER BY ct.company_id",
        )?;
        let rows = stmt.query_map(params![name.trim()], |row| row.get(0))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{seed_lead, store};
    use super::*;

    #[test]
    fn tagging_is_idempotent() {
        let store = store();
        let (company, _) = seed_lead(&store, "Acme", Some("a@acme.com"), None, Utc::now());
        let hot = store.add_tag("hot", Some("reply expected")).unwrap();
        assert_eq!(store.add_tag("hot", None).unwrap(), hot);

        assert!(store.tag_company(company, hot).unwrap());
        assert!(!store.tag_company(company, hot).unwrap());

        let tags = store.tags_for_company(company).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].description.as_deref(), Some("reply expected"));
        assert_eq!(store.companies_by_tag("hot").unwrap(), vec![company]);
    }

    #[test]
    fn tagging_unknown_company_fails() {
        let store = store();
        let tag = store.add_tag("cold", None).unwrap();
        assert!(matches!(
            store.tag_company(CompanyId(11), tag),
            Err(LeadgenError::CompanyNotFound(11))
        ));
    }
}
