use thiserror::Error;

#[derive(Debug, Error)]
pub enum LeadgenError {
    #[error("not initialized: run 'leadgen init'")]
    NotInitialized,

    #[error("lead store unavailable: {0}")]
    StorageUnavailable(String),

    #[error(transparent)]
    Storage(#[from] rusqlite::Error),

    #[error("schema migration failed: {0}")]
    Migration(String),

    #[error("company not found: {0}")]
    CompanyNotFound(i64),

    #[error("contact not found: {0}")]
    ContactNotFound(i64),

    #[error("template not found: {0}")]
    TemplateNotFound(i64),

    #[error("campaign not found: {0}")]
    CampaignNotFound(i64),

    #[error("template {template} does not belong to campaign {campaign}")]
    TemplateNotInCampaign { template: i64, campaign: i64 },

    #[error("company {0} already has a lead status")]
    StatusExists(i64),

    #[error("invalid transition '{trigger}': {reason}")]
    InvalidTransition { trigger: String, reason: String },

    #[error("invalid lead status: {0}")]
    InvalidStatus(String),

    #[error("invalid channel: {0}")]
    InvalidChannel(String),

    #[error("invalid template type: {0}")]
    InvalidTemplateType(String),

    #[error("invalid campaign status: {0}")]
    InvalidCampaignStatus(String),

    #[error("template render failed: {0}")]
    RenderFailure(String),

    #[error("send failed: {0}")]
    SendFailure(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl LeadgenError {
    /// Errors scoped to a single lead. The scheduler logs these, skips the lead,
    /// and moves on; everything else aborts the pass.
    pub fn is_lead_local(&self) -> bool {
        matches!(
            self,
            LeadgenError::InvalidTransition { .. }
                | LeadgenError::RenderFailure(_)
                | LeadgenError::SendFailure(_)
                | LeadgenError::TemplateNotFound(_)
                | LeadgenError::TemplateNotInCampaign { .. }
                | LeadgenError::ContactNotFound(_)
                | LeadgenError::CompanyNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LeadgenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lead_local_classification() {
        assert!(LeadgenError::RenderFailure("x".into()).is_lead_local());
        assert!(LeadgenError::InvalidTransition {
            trigger: "email_sent".into(),
            reason: "no status".into(),
        }
        .is_lead_local());
        assert!(LeadgenError::TemplateNotInCampaign {
            template: 1,
            campaign: 2,
        }
        .is_lead_local());
        assert!(!LeadgenError::StorageUnavailable("gone".into()).is_lead_local());
        assert!(!LeadgenError::NotInitialized.is_lead_local());
    }
}
