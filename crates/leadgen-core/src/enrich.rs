//! Contact enrichment for leads that have not been contacted yet.

use crate::error::Result;
use crate::model::{ContactEnrichment, LeadView};
use crate::store::LeadStore;
use crate::types::{is_blank, LeadStatus};
use serde::Serialize;

pub trait ProfileFinder {
    fn find_linkedin(&self, lead: &LeadView) -> Result<Option<String>>;
    fn find_email(&self, lead: &LeadView) -> Result<Option<String>>;
}

// ---------------------------------------------------------------------------
// SimulatedProfileFinder
// ---------------------------------------------------------------------------

/// Derives `linkedin.com/in/first-last` and `first.last@<website domain>`
/// from what the lead already has.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedProfileFinder;

fn slug(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

fn names(lead: &LeadView) -> Option<(String, String)> {
    let info = &lead.contact.as_ref()?.info;
    let first = slug(info.first_name.as_deref().filter(|s| !is_blank(Some(*s)))?);
    let last = slug(info.last_name.as_deref().filter(|s| !is_blank(Some(*s)))?);
    if first.is_empty() || last.is_empty() {
        return None;
    }
    Some((first, last))
}

/// `https://www.acme.com/about` -> `acme.com`.
pub fn website_domain(website: &str) -> Option<String> {
    let rest = website.trim();
    let rest = rest
        .strip_prefix("https://")
        .or_else(|| rest.strip_prefix("http://"))
        .unwrap_or(rest);
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    let host = rest.split(['/', '?', '#', ':']).next()?.to_ascii_lowercase();
    if host.contains('.') && !host.starts_with('.') {
        Some(host)
    } else {
        None
    }
}

impl ProfileFinder for SimulatedProfileFinder {
    fn find_linkedin(&self, lead: &LeadView) -> Result<Option<String>> {
        Ok(names(lead).map(|(first, last)| format!("https://www.linkedin.com/in/{first}-{last}")))
    }

    fn find_email(&self, lead: &LeadView) -> Result<Option<String>> {
        let Some((first, last)) = names(lead) else {
            return Ok(None);
        };
        Ok(lead
            .website
            .as_deref()
            .and_then(website_domain)
            .map(|domain| format!("{first}.{last}@{domain}")))
    }
}

// ---------------------------------------------------------------------------
// run_enrichment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct EnrichmentSummary {
    pub examined: usize,
    pub no_contact: usize,
    pub contacts_updated: usize,
    pub linkedin_found: usize,
    pub emails_found: usize,
    pub finder_failures: usize,
}

/// Look up missing email / LinkedIn values for up to `limit` New leads and
/// write them back fill-empty-only.
pub fn run_enrichment(
    store: &LeadStore,
    finder: &dyn ProfileFinder,
    limit: usize,
) -> Result<EnrichmentSummary> {
    let leads = store.query_by_status(&[LeadStatus::New], None)?;
    let mut summary = EnrichmentSummary::default();

    for lead in leads.into_iter().take(limit) {
        summary.examined += 1;
        let Some(contact) = lead.contact.as_ref() else {
            summary.no_contact += 1;
            continue;
        };

        let lookup = || -> Result<ContactEnrichment> {
            let linkedin_url = if is_blank(contact.info.linkedin_url.as_deref()) {
                finder.find_linkedin(&lead)?
            } else {
                None
            };
            let email = if is_blank(contact.info.email.as_deref()) {
                finder.find_email(&lead)?
            } else {
                None
            };
            Ok(ContactEnrichment {
                email,
                linkedin_url,
            })
        };

        let found = match lookup() {
            Ok(found) => found,
            Err(e) if e.is_lead_local() => {
                tracing::warn!(company_id = %lead.company_id, error = %e, "profile lookup failed");
                summary.finder_failures += 1;
                continue;
            }
            Err(e) => return Err(e),
        };
        if found.is_empty() {
            continue;
        }

        if store.enrich_contact(contact.id, &found)? {
            summary.contacts_updated += 1;
            summary.linkedin_found += usize::from(found.linkedin_url.is_some());
            summary.emails_found += usize::from(found.email.is_some());
            tracing::info!(
                company_id = %lead.company_id,
                contact_id = %contact.id,
                email = found.email.is_some(),
                linkedin = found.linkedin_url.is_some(),
                "contact enriched"
            );
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LeadgenError;
    use crate::lifecycle::{transition, Trigger};
    use crate::store::test_support::{seed_lead, store};
    use chrono::Utc;

    /// Always proposes the same values, whatever the lead already has.
    struct FixedFinder;

    impl ProfileFinder for FixedFinder {
        fn find_linkedin(&self, _lead: &LeadView) -> Result<Option<String>> {
            Ok(Some("https://www.linkedin.com/in/found".into()))
        }
        fn find_email(&self, _lead: &LeadView) -> Result<Option<String>> {
            Ok(Some("b@x.com".into()))
        }
    }

    struct FailingFinder;

    impl ProfileFinder for FailingFinder {
        fn find_linkedin(&self, _lead: &LeadView) -> Result<Option<String>> {
            Err(LeadgenError::SendFailure("lookup timed out".into()))
        }
        fn find_email(&self, _lead: &LeadView) -> Result<Option<String>> {
            Ok(None)
        }
    }

    #[test]
    fn website_domain_strips_scheme_and_path() {
        assert_eq!(
            website_domain("https://www.Acme.com/about").as_deref(),
            Some("acme.com")
        );
        assert_eq!(website_domain("acme.io").as_deref(), Some("acme.io"));
        assert_eq!(website_domain("localhost"), None);
    }

    #[test]
    fn simulated_finder_derives_from_name_and_site() {
        let store = store();
        let (company, _) = seed_lead(&store, "Acme", None, None, Utc::now());
        let lead = store.get_lead(company).unwrap();
        let finder = SimulatedProfileFinder;
        assert_eq!(
            finder.find_linkedin(&lead).unwrap().as_deref(),
            Some("https://www.linkedin.com/in/pat-lee")
        );
        assert_eq!(
            finder.find_email(&lead).unwrap().as_deref(),
            Some("pat.lee@acme.example")
        );
    }

    #[test]
    fn enrichment_is_monotonic() {
        let store = store();
        let (_, contact) = seed_lead(&store, "Acme", Some("a@x.com"), None, Utc::now());

        let summary = run_enrichment(&store, &FixedFinder, 50).unwrap();
        assert_eq!(summary.examined, 1);
        assert_eq!(summary.contacts_updated, 1);
        assert_eq!(summary.emails_found, 0);
        assert_eq!(summary.linkedin_found, 1);

        let info = store.get_contact(contact).unwrap().info;
        assert_eq!(info.email.as_deref(), Some("a@x.com"));
        assert_eq!(
            info.linkedin_url.as_deref(),
            Some("https://www.linkedin.com/in/found")
        );

        let again = run_enrichment(&store, &FixedFinder, 50).unwrap();
        assert_eq!(again.contacts_updated, 0);
    }

    #[test]
    fn only_new_leads_within_limit() {
        let store = store();
        let now = Utc::now();
        let (contacted, _) = seed_lead(&store, "Acme", None, None, now);
        transition(&store, contacted, Trigger::EmailSent, now).unwrap();
        seed_lead(&store, "Bolt", None, None, now);
        seed_lead(&store, "Crux", None, None, now);

        let summary = run_enrichment(&store, &FixedFinder, 1).unwrap();
        assert_eq!(summary.examined, 1);
        assert_eq!(summary.contacts_updated, 1);

        let acme = store.get_lead(contacted).unwrap();
        assert!(acme.contact.unwrap().info.email.is_none());
    }

    #[test]
    fn lead_local_finder_failure_is_skipped() {
        let store = store();
        seed_lead(&store, "Acme", None, None, Utc::now());
        let summary = run_enrichment(&store, &FailingFinder, 10).unwrap();
        assert_eq!(summary.finder_failures, 1);
        assert_eq!(summary.contacts_updated, 0);
    }
}
