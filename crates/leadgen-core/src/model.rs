use crate::types::{
    CampaignId, CampaignStatus, Channel, CompanyId, ContactId, InteractionId, InteractionType,
    LeadStatus, TagId, TemplateId, TemplateType, TrackingId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Company
// ---------------------------------------------------------------------------

/// Profile attributes of a company as scraped. `(company_name, website)` is the
/// dedup key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_chatbot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_date: Option<String>,
}

impl CompanyProfile {
    pub fn new(company_name: impl Into<String>, website: Option<&str>) -> Self {
        Self {
            company_name: company_name.into(),
            website: website.map(str::to_string),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Company {
    pub id: CompanyId,
    #[serde(flatten)]
    pub profile: CompanyProfile,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ContactInfo {
    pub fn full_name(&self) -> Option<String> {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(f), Some(l)) => Some(format!("{f} {l}")),
            (Some(f), None) => Some(f.to_string()),
            (None, Some(l)) => Some(l.to_string()),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Contact {
    pub id: ContactId,
    pub company_id: CompanyId,
    #[serde(flatten)]
    pub info: ContactInfo,
}

/// Values discovered by a profile finder. Applied fill-empty-only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactEnrichment {
    pub email: Option<String>,
    pub linkedin_url: Option<String>,
}

impl ContactEnrichment {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.linkedin_url.is_none()
    }
}

// ---------------------------------------------------------------------------
// Lead status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct LeadStatusRecord {
    pub company_id: CompanyId,
    pub status: LeadStatus,
    pub score: i64,
    pub last_contacted: Option<DateTime<Utc>>,
    pub next_action: Option<String>,
    pub next_action_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update of a status row. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusUpdate {
    pub status: Option<LeadStatus>,
    pub score: Option<i64>,
    pub last_contacted: Option<DateTime<Utc>>,
    pub next_action: Option<String>,
    pub next_action_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
}

/// Company + first qualifying contact + status + emails sent so far.
#[derive(Debug, Clone, Serialize)]
pub struct LeadView {
    pub company_id: CompanyId,
    pub company_name: String,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub contact: Option<Contact>,
    pub status: LeadStatus,
    pub score: i64,
    pub last_contacted: Option<DateTime<Utc>>,
    pub next_action: Option<String>,
    pub next_action_date: Option<DateTime<Utc>>,
    pub emails_sent: u32,
}

impl LeadView {
    pub fn first_name(&self) -> Option<&str> {
        self.contact
            .as_ref()
            .and_then(|c| c.info.first_name.as_deref())
    }

    /// Whole days since the last send, `None` if never contacted.
    pub fn days_since_contact(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_contacted.map(|at| (now - at).num_days())
    }
}

// ---------------------------------------------------------------------------
// Interactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewInteraction {
    pub company_id: CompanyId,
    pub contact_id: Option<ContactId>,
    pub interaction_type: InteractionType,
    pub channel: Channel,
    pub at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Interaction {
    pub id: InteractionId,
    pub company_id: CompanyId,
    pub contact_id: Option<ContactId>,
    pub interaction_type: InteractionType,
    pub channel: Channel,
    pub interaction_date: DateTime<Utc>,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Campaigns and templates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub channel: Channel,
    pub name: String,
    pub description: Option<String>,
    pub status: CampaignStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Tracking rows recorded against this campaign.
    pub sends: i64,
}

/// Rendered content to persist as a template. Email uses `subject` + `body`;
/// LinkedIn stores `body` as the message and ignores `subject`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TemplateContent {
    pub subject: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Template {
    pub id: TemplateId,
    pub campaign_id: CampaignId,
    pub channel: Channel,
    pub template_type: TemplateType,
    #[serde(flatten)]
    pub content: TemplateContent,
}

// ---------------------------------------------------------------------------
// Tracking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct TrackingRecord {
    pub id: TrackingId,
    pub channel: Channel,
    pub contact_id: ContactId,
    pub template_id: TemplateId,
    pub campaign_id: CampaignId,
    /// `sent_date` for email, `connection_sent_date` or `message_sent_date`
    /// for LinkedIn.
    pub sent_at: Option<DateTime<Utc>>,
    pub replied: bool,
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub description: Option<String>,
}
