use crate::error::LeadgenError;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Row identifiers
// ---------------------------------------------------------------------------

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.0))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map($name)
            }
        }
    };
}

id_type!(CompanyId);
id_type!(ContactId);
id_type!(InteractionId);
id_type!(CampaignId);
id_type!(TemplateId);
id_type!(
    /// Row id in either `email_tracking` or `linkedin_tracking`, depending on channel.
    TrackingId
);
id_type!(TagId);

/// Implements `ToSql`/`FromSql` for an enum that already has `as_str` and `FromStr`.
macro_rules! text_column {
    ($name:ident) => {
        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let s = value.as_str()?;
                $name::from_str(s).map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

// ---------------------------------------------------------------------------
// LeadStatus
// ---------------------------------------------------------------------------

/// Pipeline status of a lead. One status column tracks the furthest milestone
/// across both outreach channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadStatus {
    #[serde(rename = "New")]
    New,
    #[serde(rename = "Contacted")]
    Contacted,
    #[serde(rename = "Connection Requested")]
    ConnectionRequested,
    #[serde(rename = "Message Sent")]
    MessageSent,
    #[serde(rename = "Engaged")]
    Engaged,
    #[serde(rename = "Qualified")]
    Qualified,
    #[serde(rename = "Proposal Sent")]
    ProposalSent,
    #[serde(rename = "Negotiation")]
    Negotiation,
    #[serde(rename = "Won")]
    Won,
    #[serde(rename = "Lost")]
    Lost,
    #[serde(rename = "On Hold")]
    OnHold,
}

impl LeadStatus {
    pub fn all() -> &'static [LeadStatus] {
        &[
            LeadStatus::New,
            LeadStatus::Contacted,
            LeadStatus::ConnectionRequested,
            LeadStatus::MessageSent,
            LeadStatus::Engaged,
            LeadStatus::Qualified,
            LeadStatus::ProposalSent,
            LeadStatus::Negotiation,
            LeadStatus::Won,
            LeadStatus::Lost,
            LeadStatus::OnHold,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Contacted => "Contacted",
            LeadStatus::ConnectionRequested => "Connection Requested",
            LeadStatus::MessageSent => "Message Sent",
            LeadStatus::Engaged => "Engaged",
            LeadStatus::Qualified => "Qualified",
            LeadStatus::ProposalSent => "Proposal Sent",
            LeadStatus::Negotiation => "Negotiation",
            LeadStatus::Won => "Won",
            LeadStatus::Lost => "Lost",
            LeadStatus::OnHold => "On Hold",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = LeadgenError;

    /// Accepts the display form ("Connection Requested") and snake_case
    /// ("connection_requested").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        LeadStatus::all()
            .iter()
            .copied()
            .find(|st| st.as_str().to_ascii_lowercase() == normalized)
            .ok_or_else(|| LeadgenError::InvalidStatus(s.to_string()))
    }
}

text_column!(LeadStatus);

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Linkedin,
}

impl Channel {
    pub fn all() -> &'static [Channel] {
        &[Channel::Email, Channel::Linkedin]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Email => "Email",
            Channel::Linkedin => "LinkedIn",
        }
    }

    pub(crate) fn campaigns_table(self) -> &'static str {
        match self {
            Channel::Email => "email_campaigns",
            Channel::Linkedin => "linkedin_campaigns",
        }
    }

    pub(crate) fn templates_table(self) -> &'static str {
        match self {
            Channel::Email => "email_templates",
            Channel::Linkedin => "linkedin_templates",
        }
    }

    pub(crate) fn tracking_table(self) -> &'static str {
        match self {
            Channel::Email => "email_tracking",
            Channel::Linkedin => "linkedin_tracking",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = LeadgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(Channel::Email),
            "linkedin" => Ok(Channel::Linkedin),
            _ => Err(LeadgenError::InvalidChannel(s.to_string())),
        }
    }
}

text_column!(Channel);

// ---------------------------------------------------------------------------
// TemplateType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateType {
    InitialOutreach,
    FollowUp,
    FinalAttempt,
    ConnectionRequest,
}

impl TemplateType {
    pub fn all() -> &'static [TemplateType] {
        &[
            TemplateType::InitialOutreach,
            TemplateType::FollowUp,
            TemplateType::FinalAttempt,
            TemplateType::ConnectionRequest,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateType::InitialOutreach => "initial_outreach",
            TemplateType::FollowUp => "follow_up",
            TemplateType::FinalAttempt => "final_attempt",
            TemplateType::ConnectionRequest => "connection_request",
        }
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateType {
    type Err = LeadgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initial_outreach" => Ok(TemplateType::InitialOutreach),
            "follow_up" | "follow-up" => Ok(TemplateType::FollowUp),
            "final_attempt" | "final-attempt" => Ok(TemplateType::FinalAttempt),
            "connection_request" | "connection-request" => Ok(TemplateType::ConnectionRequest),
            _ => Err(LeadgenError::InvalidTemplateType(s.to_string())),
        }
    }
}

text_column!(TemplateType);

// ---------------------------------------------------------------------------
// CampaignStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignStatus {
    Draft,
    Active,
    Ended,
}

impl CampaignStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CampaignStatus::Draft => "Draft",
            CampaignStatus::Active => "Active",
            CampaignStatus::Ended => "Ended",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = LeadgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(CampaignStatus::Draft),
            "active" => Ok(CampaignStatus::Active),
            "ended" => Ok(CampaignStatus::Ended),
            _ => Err(LeadgenError::InvalidCampaignStatus(s.to_string())),
        }
    }
}

text_column!(CampaignStatus);

// ---------------------------------------------------------------------------
// InteractionType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionType {
    #[serde(rename = "Email Sent")]
    EmailSent,
    #[serde(rename = "LinkedIn Connection Request")]
    LinkedinConnectionRequest,
    #[serde(rename = "LinkedIn Message")]
    LinkedinMessage,
}

impl InteractionType {
    pub fn as_str(self) -> &'static str {
        match self {
            InteractionType::EmailSent => "Email Sent",
            InteractionType::LinkedinConnectionRequest => "LinkedIn Connection Request",
            InteractionType::LinkedinMessage => "LinkedIn Message",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionType {
    type Err = LeadgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Email Sent" => Ok(InteractionType::EmailSent),
            "LinkedIn Connection Request" => Ok(InteractionType::LinkedinConnectionRequest),
            "LinkedIn Message" => Ok(InteractionType::LinkedinMessage),
            _ => Err(LeadgenError::InvalidStatus(format!("interaction type '{s}'"))),
        }
    }
}

text_column!(InteractionType);

// ---------------------------------------------------------------------------
// ContactField
// ---------------------------------------------------------------------------

/// Contact column a channel needs before a lead can enter its candidate pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Email,
    LinkedinUrl,
}

impl ContactField {
    pub fn for_channel(channel: Channel) -> Self {
        match channel {
            Channel::Email => ContactField::Email,
            Channel::Linkedin => ContactField::LinkedinUrl,
        }
    }

    pub(crate) fn column(self) -> &'static str {
        match self {
            ContactField::Email => "email",
            ContactField::LinkedinUrl => "linkedin_url",
        }
    }
}

/// Scraped values use "N/A" for unknown fields; treat it the same as blank.
pub fn is_blank(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => {
            let v = v.trim();
            v.is_empty() || v.eq_ignore_ascii_case("n/a")
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
