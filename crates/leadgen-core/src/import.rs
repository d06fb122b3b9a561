//! Import of scraped lead profiles.

use crate::error::Result;
use crate::model::{CompanyProfile, ContactInfo};
use crate::store::LeadStore;
use crate::types::is_blank;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One flat scraper record. Every field is optional; "N/A" counts as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadProfile {
    pub company_name: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub current_chatbot: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    /// Free-form "City, State, Country".
    pub location: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
    pub source: Option<String>,
    pub scraped_date: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
}

impl LeadProfile {
    /// Company attributes, with `location` split into city/state/country when
    /// none of those three were given.
    pub fn company(&self, at: DateTime<Utc>) -> CompanyProfile {
        let mut city = self.city.clone();
        let mut state = self.state.clone();
        let mut country = self.country.clone();

        let no_location_fields = [&city, &state, &country]
            .iter()
            .all(|v| is_blank(v.as_deref()));
        if let Some(location) = self.location.as_deref().filter(|l| !is_blank(Some(*l))) {
            if no_location_fields {
                let mut parts = location.split(',').map(|p| p.trim().to_string());
                city = parts.next();
                state = parts.next();
                country = parts.next();
            }
        }

        CompanyProfile {
            company_name: self.company_name.clone().unwrap_or_default(),
            website: self.website.clone(),
            industry: self.industry.clone(),
            company_size: self.company_size.clone(),
            current_chatbot: self.current_chatbot.clone(),
            description: self.description.clone(),
            address: self.address.clone(),
            city,
            state,
            zipcode: self.zipcode.clone(),
            country,
            source: self.source.clone(),
            scraped_date: self
                .scraped_date
                .clone()
                .or_else(|| Some(at.format("%Y-%m-%d").to_string())),
        }
    }

    /// Contact details, or `None` when the record names nobody reachable.
    pub fn contact(&self) -> Option<ContactInfo> {
        let reachable = [
            &self.first_name,
            &self.email,
            &self.phone,
            &self.linkedin_url,
        ]
        .iter()
        .any(|v| !is_blank(v.as_deref()));
        if !reachable {
            return None;
        }
        Some(ContactInfo {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            position: self.position.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            linkedin_url: self.linkedin_url.clone(),
            notes: None,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub total: usize,
    pub companies_created: usize,
    pub duplicates: usize,
    /// Duplicates whose empty profile fields were filled from the record.
    pub companies_enriched: usize,
    pub contacts_created: usize,
    /// Records without a company name.
    pub skipped: usize,
}

/// Read a JSON array of profiles.
pub fn load_profiles(path: &Path) -> Result<Vec<LeadProfile>> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Import each profile in its own transaction. A new company gets its contact
/// and a `New` status row. A duplicate `(company_name, website)` only has its
/// empty profile fields filled; contacts and status are left as is.
pub fn import_profiles(
    store: &LeadStore,
    profiles: &[LeadProfile],
    at: DateTime<Utc>,
) -> Result<ImportSummary> {
    let mut summary = ImportSummary {
        total: profiles.len(),
        ..Default::default()
    };

    for profile in profiles {
        if is_blank(profile.company_name.as_deref()) {
            tracing::warn!(website = ?profile.website, "skipping profile without company name");
            summary.skipped += 1;
            continue;
        }

        let (created, enriched, contact) = store.with_transaction(|s| {
            let company = profile.company(at);
            let (company_id, created) = s.ensure_company(&company)?;
            if !created {
                let enriched = s.enrich_company(company_id, &company)?;
                return Ok((false, enriched, false));
            }
            let contact = match profile.contact() {
                Some(info) => {
                    s.create_contact(company_id, &info)?;
                    true
                }
                None => false,
            };
            s.init_status(company_id, at)?;
            Ok((true, false, contact))
        })?;

        if created {
            summary.companies_created += 1;
        } else {
            summary.duplicates += 1;
            summary.companies_enriched += usize::from(enriched);
        }
        summary.contacts_created += usize::from(contact);
    }

    tracing::info!(
        total = summary.total,
        created = summary.companies_created,
        duplicates = summary.duplicates,
        enriched = summary.companies_enriched,
        skipped = summary.skipped,
        "import finished"
    );
    Ok(summary)
}
