use super::*;

const COMPANY_COLUMNS: &str = "id, company_name, website, industry, company_size, current_chatbot, \
     description, address, city, state, zipcode, country, source, scraped_date, created_at";

impl LeadStore {
    // =========================================================================
    // Companies
    // =========================================================================

    /// Insert a company unless `(company_name, website)` already exists.
    /// Returns the id and whether a row was created.
    pub fn ensure_company(&self, profile: &CompanyProfile) -> Result<(CompanyId, bool)> {
        let name = profile.company_name.trim();
        let website = clean(profile.website.as_deref()).unwrap_or_default();
        let at = now();

        let inserted = self.conn.execute(
            "INSERT INTO companies (
                company_name, website, industry, company_size, current_chatbot,
                description, address, city, state, zipcode, country, source,
                scraped_date, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)
             ON CONFLICT(company_name, website) DO NOTHING",
            params![
                name,
                website,
                clean(profile.industry.as_deref()),
                clean(profile.company_size.as_deref()),
                clean(profile.current_chatbot.as_deref()),
                clean(profile.description.as_deref()),
                clean(profile.address.as_deref()),
                clean(profile.city.as_deref()),
                clean(profile.state.as_deref()),
                clean(profile.zipcode.as_deref()),
                clean(profile.country.as_deref()),
                clean(profile.source.as_deref()),
                clean(profile.scraped_date.as_deref()),
                at,
            ],
        )?;

        let id: CompanyId = self.conn.query_row(
            "SELECT id FROM companies WHERE company_name = ?1 AND website = ?2",
            params![name, website],
            |row| row.get(0),
        )?;
        if inserted == 0 {
            tracing::debug!(company_id = %id, name, "company already exists");
        }
        Ok((id, inserted > 0))
    }

    /// Idempotent on `(company_name, website)`: a duplicate returns the existing id.
    pub fn create_company(&self, profile: &CompanyProfile) -> Result<CompanyId> {
        self.ensure_company(profile).map(|(id, _)| id)
    }

    pub fn find_company(&self, name: &str, website: Option<&str>) -> Result<Option<CompanyId>> {
        let website = clean(website).unwrap_or_default();
        Ok(self
            .conn
            .query_row(
                "SELECT id FROM companies WHERE company_name = ?1 AND website = ?2",
                params![name.trim(), website],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub fn get_company(&self, id: CompanyId) -> Result<Company> {
        self.conn
            .query_row(
                &format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE id = ?1"),
                params![id],
                Self::map_company_row,
            )
            .optional()?
            .ok_or(LeadgenError::CompanyNotFound(id.0))
    }

    /// Fill empty profile attributes from `patch`. Name and website are the
    /// identity and never change. Returns true if anything was written.
    pub fn enrich_company(&self, id: CompanyId, patch: &CompanyProfile) -> Result<bool> {
        let current = self.get_company(id)?.profile;
        let mut merged = current.clone();

        let pairs = [
            (&mut merged.industry, &patch.industry),
            (&mut merged.company_size, &patch.company_size),
            (&mut merged.current_chatbot, &patch.current_chatbot),
            (&mut merged.description, &patch.description),
            (&mut merged.address, &patch.address),
            (&mut merged.city, &patch.city),
            (&mut merged.state, &patch.state),
            (&mut merged.zipcode, &patch.zipcode),
            (&mut merged.country, &patch.country),
            (&mut merged.source, &patch.source),
            (&mut merged.scraped_date, &patch.scraped_date),
        ];
        for (slot, incoming) in pairs {
            if is_blank(slot.as_deref()) {
                if let Some(value) = clean(incoming.as_deref()) {
                    *slot = Some(value);
                }
            }
        }

        if merged == current {
            return Ok(false);
        }

        self.conn.execute(
            "UPDATE companies SET
                industry = ?2, company_size = ?3, current_chatbot = ?4, description = ?5,
                address = ?6, city = ?7, state = ?8, zipcode = ?9, country = ?10,
                source = ?11, scraped_date = ?12, updated_at = ?13
             WHERE id = ?1",
            params![
                id,
                merged.industry,
                merged.company_size,
                merged.current_chatbot,
                merged.description,
                merged.address,
                merged.city,
                merged.state,
                merged.zipcode,
                merged.country,
                merged.source,
                merged.scraped_date,
                now(),
            ],
        )?;
        Ok(true)
    }

    pub(super) fn map_company_row(row: &Row<'_>) -> rusqlite::Result<Company> {
        let website: String = row.get(2)?;
        Ok(Company {
            id: row.get(0)?,
            profile: CompanyProfile {
                company_name: row.get(1)?,
                website: if website.is_empty() { None } else { Some(website) },
                industry: row.get(3)?,
                company_size: row.get(4)?,
                current_chatbot: row.get(5)?,
                description: row.get(6)?,
                address: row.get(7)?,
                city: row.get(8)?,
                state: row.get(9)?,
                zipcode: row.get(10)?,
                country: row.get(11)?,
                source: row.get(12)?,
                scraped_date: row.get(13)?,
            },
            created_at: row.get(14)?,
        })
    }
}
