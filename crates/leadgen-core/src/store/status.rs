use super::*;
use crate::lifecycle::Trigger;

const STATUS_COLUMNS: &str = "company_id, status, score, last_contacted, next_action, \
     next_action_date, assigned_to, updated_at";

/// Lead view query. `contact_filter` narrows which contact is "first qualifying";
/// `predicate` is the outer WHERE clause.
fn lead_view_sql(require: Option<ContactField>, predicate: &str) -> String {
    let (join, contact_filter) = match require {
        Some(field) => {
            let col = field.column();
            (
                "JOIN",
                format!(" AND {col} IS NOT NULL AND TRIM({col}) != '' AND {col} != 'N/A'"),
            )
        }
        None => ("LEFT JOIN", String::new()),
    };
    format!(
        "SELECT c.id, c.company_name, c.website, c.industry,
                ct.id, ct.company_id, ct.first_name, ct.last_name, ct.position,
                ct.email, ct.phone, ct.linkedin_url, ct.notes,
                ls.status, ls.score, ls.last_contacted, ls.next_action, ls.next_action_date,
                (SELECT COUNT(*) FROM interactions i
                  WHERE i.company_id = c.id AND i.interaction_type = 'Email Sent')
         FROM companies c
         JOIN lead_status ls ON ls.company_id = c.id
         {join} contacts ct ON ct.id = (
             SELECT MIN(id) FROM contacts WHERE company_id = c.id{contact_filter}
         )
         WHERE {predicate}
         ORDER BY c.id"
    )
}

impl LeadStore {
    // =========================================================================
    // Lead status
    // =========================================================================

    /// Seed the status row for a freshly created company.
    pub fn init_status(&self, company_id: CompanyId, at: DateTime<Utc>) -> Result<()> {
        self.ensure_company_exists(company_id)?;
        if self.get_status(company_id)?.is_some() {
            return Err(LeadgenError::StatusExists(company_id.0));
        }

        let seed = Trigger::LeadCreated.transition();
        self.conn.execute(
            "INSERT INTO lead_status (
                company_id, status, score, next_action, next_action_date,
                created_at, updated_at
             ) VALUES (?1, ?2, 0, ?3, ?4, ?5, ?5)",
            params![
                company_id,
                seed.status,
                seed.next_action,
                seed.next_action_date(at),
                at,
            ],
        )?;
        Ok(())
    }

    pub fn get_status(&self, company_id: CompanyId) -> Result<Option<LeadStatusRecord>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {STATUS_COLUMNS} FROM lead_status WHERE company_id = ?1"),
                params![company_id],
                Self::map_status_row,
            )
            .optional()?)
    }

    /// Apply the populated fields of `update`; `updated_at` is always refreshed.
    /// Returns false when the company has no status row.
    pub(crate) fn update_status(&self, company_id: CompanyId, update: &StatusUpdate) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE lead_status SET
                status = COALESCE(?2, status),
                score = COALESCE(?3, score),
                last_contacted = COALESCE(?4, last_contacted),
                next_action = COALESCE(?5, next_action),
                next_action_date = COALESCE(?6, next_action_date),
                assigned_to = COALESCE(?7, assigned_to),
                updated_at = ?8
             WHERE company_id = ?1",
            params![
                company_id,
                update.status,
                update.score,
                update.last_contacted,
                update.next_action,
                update.next_action_date,
                update.assigned_to,
                now(),
            ],
        )?;
        Ok(changed > 0)
    }

    // =========================================================================
    // Lead views
    // =========================================================================

    /// Leads whose status is in `statuses`, joined with their first contact that
    /// has `require` populated. Leads without such a contact are left out when
    /// `require` is set. Ordered by company id.
    pub fn query_by_status(
        &self,
        statuses: &[LeadStatus],
        require: Option<ContactField>,
    ) -> Result<Vec<LeadView>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; statuses.len()].join(", ");
        let sql = lead_view_sql(require, &format!("ls.status IN ({placeholders})"));
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(statuses.iter()),
            Self::map_lead_view_row,
        )?;
        let leads = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        tracing::debug!(count = leads.len(), ?require, "queried leads by status");
        Ok(leads)
    }

    pub fn get_lead(&self, company_id: CompanyId) -> Result<LeadView> {
        let sql = lead_view_sql(None, "c.id = ?1");
        self.conn
            .query_row(&sql, params![company_id], Self::map_lead_view_row)
            .optional()?
            .ok_or(LeadgenError::CompanyNotFound(company_id.0))
    }

    pub(super) fn map_status_row(row: &Row<'_>) -> rusqlite::Result<LeadStatusRecord> {
        Ok(LeadStatusRecord {
            company_id: row.get(0)?,
            status: row.get(1)?,
            score: row.get(2)?,
            last_contacted: row.get(3)?,
            next_action: row.get(4)?,
            next_action_date: row.get(5)?,
            assigned_to: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn map_lead_view_row(row: &Row<'_>) -> rusqlite::Result<LeadView> {
        let website: String = row.get(2)?;
        let contact_id: Option<ContactId> = row.get(4)?;
        let contact = match contact_id {
            Some(id) => Some(Contact {
                id,
                company_id: row.get(5)?,
                info: ContactInfo {
                    first_name: row.get(6)?,
                    last_name: row.get(7)?,
                    position: row.get(8)?,
                    email: row.get(9)?,
                    phone: row.get(10)?,
                    linkedin_url: row.get(11)?,
                    notes: row.get(12)?,
                },
            }),
            None => None,
        };
        Ok(LeadView {
            company_id: row.get(0)?,
            company_name: row.get(1)?,
            website: if website.is_empty() { None } else { Some(website) },
            industry: row.get(3)?,
            contact,
            status: row.get(13)?,
            score: row.get(14)?,
            last_contacted: row.get(15)?,
            next_action: row.get(16)?,
            next_action_date: row.get(17)?,
            emails_sent: row.get(18)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{seed_lead, store};
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap()
    }

    #[test]
    fn init_status_seeds_new_lead() {
        let store = store();
        let (company, _) = seed_lead(&store, "Acme", Some("a@acme.com"), None, at());
        let status = store.get_status(company).unwrap().unwrap();
        assert_eq!(status.status, LeadStatus::New);
        assert_eq!(status.score, 0);
        assert_eq!(status.next_action.as_deref(), Some("Initial Outreach"));
        assert_eq!(status.next_action_date, Some(at() + Duration::days(1)));
        assert!(status.last_contacted.is_none());
    }

    #[test]
    fn one_status_per_company() {
        let store = store();
        let (company, _) = seed_lead(&store, "Acme", Some("a@acme.com"), None, at());
        assert!(matches!(
            store.init_status(company, at()),
            Err(LeadgenError::StatusExists(_))
        ));
        let rows: i64 = store
            .conn_ref()
            .query_row(
                "SELECT COUNT(*) FROM lead_status WHERE company_id = ?1",
                params![company],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn partial_update_leaves_other_columns() {
        let store = store();
        let (company, _) = seed_lead(&store, "Acme", Some("a@acme.com"), None, at());
        let changed = store
            .update_status(
                company,
                &StatusUpdate {
                    score: Some(40),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(changed);
        let status = store.get_status(company).unwrap().unwrap();
        assert_eq!(status.score, 40);
        assert_eq!(status.status, LeadStatus::New);
        assert_eq!(status.next_action.as_deref(), Some("Initial Outreach"));
    }

    #[test]
    fn update_without_row_reports_false() {
        let store = store();
        assert!(!store
            .update_status(CompanyId(99), &StatusUpdate::default())
            .unwrap());
    }

    #[test]
    fn query_filters_on_required_field() {
        let store = store();
        let (with_email, _) = seed_lead(&store, "Acme", Some("a@acme.com"), None, at());
        let (_no_email, _) = seed_lead(&store, "Bolt", Some("N/A"), Some("https://linkedin.com/in/x"), at());

        let email = store
            .query_by_status(&[LeadStatus::New], Some(ContactField::Email))
            .unwrap();
        assert_eq!(email.len(), 1);
        assert_eq!(email[0].company_id, with_email);
        assert_eq!(email[0].emails_sent, 0);

        let all = store.query_by_status(&[LeadStatus::New], None).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].company_id < all[1].company_id);
    }

    #[test]
    fn query_picks_first_qualifying_contact() {
        let store = store();
        let (company, first) = seed_lead(&store, "Acme", None, None, at());
        let second = store
            .create_contact(
                company,
                &ContactInfo {
                    first_name: Some("Ana".into()),
                    email: Some("ana@acme.example".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let leads = store
            .query_by_status(&[LeadStatus::New], Some(ContactField::Email))
            .unwrap();
        assert_eq!(leads[0].contact.as_ref().unwrap().id, second);

        let any = store.get_lead(company).unwrap();
        assert_eq!(any.contact.as_ref().unwrap().id, first);
    }

    #[test]
    fn empty_status_list_returns_nothing() {
        let store = store();
        seed_lead(&store, "Acme", Some("a@acme.com"), None, at());
        assert!(store.query_by_status(&[], None).unwrap().is_empty());
    }
}
