use super::*;

impl LeadStore {
    // =========================================================================
    // Interactions (append-only)
    // =========================================================================

    pub fn record_interaction(&self, new: &NewInteraction) -> Result<InteractionId> {
        self.ensure_company_exists(new.company_id)?;
        self.conn.execute(
            "INSERT INTO interactions (
                company_id, contact_id, interaction_type, channel,
                interaction_date, notes, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                new.company_id,
                new.contact_id,
                new.interaction_type,
                new.channel,
                new.at,
                new.notes,
                now(),
            ],
        )?;
        Ok(InteractionId(self.conn.last_insert_rowid()))
    }

    /// Oldest first.
    pub fn interactions_for_company(&self, company_id: CompanyId) -> Result<Vec<Interaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, company_id, contact_id, interaction_type, channel,
                    interaction_date, notes
             FROM interactions
             WHERE company_id = ?1
             ORDER BY interaction_date, id",
        )?;
        let rows = stmt.query_map(params![company_id], |row| {
            Ok(Interaction {
                id: row.get(0)?,
                company_id: row.get(1)?,
                contact_id: row.get(2)?,
                interaction_type: row.get(3)?,
                channel: row.get(4)?,
                interaction_date: row.get(5)?,
                notes: row.get(6)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}
