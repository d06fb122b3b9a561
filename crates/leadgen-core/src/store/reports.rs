use super::*;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: LeadStatus,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryCount {
    /// `None` groups companies with no industry recorded.
    pub industry: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpcomingFollowUp {
    pub company_id: CompanyId,
    pub company_name: String,
    pub status: LeadStatus,
    pub next_action: Option<String>,
    pub next_action_date: DateTime<Utc>,
    pub assigned_to: Option<String>,
}

impl LeadStore {
    // =========================================================================
    // Report queries
    // =========================================================================

    pub fn count_companies(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM companies", [], |row| row.get(0))?)
    }

    /// Largest group first.
    pub fn counts_by_status(&self) -> Result<Vec<StatusCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT status, COUNT(*) AS n FROM lead_status
             GROUP BY status ORDER BY n DESC, status",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StatusCount {
                status: row.get(0)?,
                count: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn counts_by_industry(&self) -> Result<Vec<IndustryCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT industry, COUNT(*) AS n FROM companies
             GROUP BY industry ORDER BY n DESC, industry",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(IndustryCount {
                industry: row.get(0)?,
                count: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Leads whose next action is due on or before `now + within_days`,
    /// overdue ones included. Soonest first.
    pub fn upcoming_follow_ups(
        &self,
        within_days: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<UpcomingFollowUp>> {
        let cutoff = now + chrono::Duration::days(within_days);
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.company_name, ls.status, ls.next_action,
                    ls.next_action_date, ls.assigned_to
             FROM companies c
             JOIN lead_status ls ON ls.company_id = c.id
             WHERE ls.next_action_date IS NOT NULL AND ls.next_action_date <= ?1
             ORDER BY ls.next_action_date ASC, c.id",
        )?;
        let rows = stmt.query_map(params![cutoff], |row| {
            Ok(UpcomingFollowUp {
                company_id: row.get(0)?,
                company_name: row.get(1)?,
                status: row.get(2)?,
                next_action: row.get(3)?,
                next_action_date: row.get(4)?,
                assigned_to: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Leads in `statuses` with no contact carrying `field`.
    pub fn count_missing_contact_field(
        &self,
        statuses: &[LeadStatus],
        field: ContactField,
    ) -> Result<i64> {
        if statuses.is_empty() {
            return Ok(0);
        }
        let col = field.column();
        let placeholders = vec!["?"; statuses.len()].join(", ");
        let sql = format!(
            "SELECT COUNT(*) FROM lead_status ls
             WHERE ls.status IN ({placeholders})
               AND NOT EXISTS (
                   SELECT 1 FROM contacts ct
                   WHERE ct.company_id = ls.company_id
                     AND ct.{col} IS NOT NULL AND TRIM(ct.{col}) != '' AND ct.{col} != 'N/A'
               )"
        );
        Ok(self.conn.query_row(
            &sql,
            rusqlite::params_from_iter(statuses.iter()),
            |row| row.get(0),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{seed_lead, store};
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn counts_group_by_status_and_industry() {
        let store = store();
        let t = Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap();
        seed_lead(&store, "Acme", Some("a@acme.com"), None, t);
        seed_lead(&store, "Bolt", None, None, t);
        let mut profile = CompanyProfile::new("Crux", Some("https://crux.io"));
        profile.industry = Some("SaaS".into());
        store.create_company(&profile).unwrap();

        assert_eq!(store.count_companies().unwrap(), 3);
        assert_eq!(
            store.counts_by_status().unwrap(),
            vec![StatusCount {
                status: LeadStatus::New,
                count: 2
            }]
        );
        let industries = store.counts_by_industry().unwrap();
        assert_eq!(industries[0].industry, None);
        assert_eq!(industries[0].count, 2);
    }

    #[test]
    fn upcoming_includes_overdue_and_window() {
        let store = store();
        let t = Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap();
        // next action due t+1d
        seed_lead(&store, "Soon", Some("a@soon.com"), None, t);
        // next action due t+11d
        seed_lead(&store, "Later", Some("a@later.com"), None, t + Duration::days(10));

        let due = store.upcoming_follow_ups(3, t).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].company_name, "Soon");

        let all = store.upcoming_follow_ups(3, t + Duration::days(9)).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].company_name, "Soon");
    }

    #[test]
    fn missing_field_counts_leads_without_any_email() {
        let store = store();
        let t = Utc::now();
        seed_lead(&store, "Acme", Some("a@acme.com"), None, t);
        seed_lead(&store, "Bolt", Some("N/A"), None, t);
        assert_eq!(
            store
                .count_missing_contact_field(&[LeadStatus::New], ContactField::Email)
                .unwrap(),
            1
        );
    }
}
