//! Campaign bookkeeping and the per-send write.
//!
//! [`CampaignRecorder::record_rendered_send`] and
//! [`CampaignRecorder::record_send`] are the only paths that record an
//! outbound message. Everything one send writes commits together or not at
//! all.

use crate::error::{LeadgenError, Result};
use crate::lifecycle::{self, Trigger};
use crate::model::{Campaign, NewInteraction, TemplateContent};
use crate::store::LeadStore;
use crate::types::{
    CampaignId, CampaignStatus, Channel, ContactId, InteractionType, LeadStatus, TemplateId,
    TemplateType, TrackingId,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SendRecord {
    pub tracking_id: TrackingId,
    pub trigger: Trigger,
    pub status: LeadStatus,
}

pub struct CampaignRecorder<'a> {
    store: &'a LeadStore,
}

impl<'a> CampaignRecorder<'a> {
    pub fn new(store: &'a LeadStore) -> Self {
        Self { store }
    }

    /// New campaigns start as `Draft`.
    pub fn create_campaign(
        &self,
        channel: Channel,
        name: &str,
        description: Option<&str>,
    ) -> Result<CampaignId> {
        let id = self.store.insert_campaign(channel, name, description)?;
        tracing::debug!(%channel, campaign_id = %id, name, "campaign created");
        Ok(id)
    }

    pub fn set_campaign_status(
        &self,
        channel: Channel,
        id: CampaignId,
        status: CampaignStatus,
        at: DateTime<Utc>,
    ) -> Result<()> {
        self.store.update_campaign_status(channel, id, status, at)
    }

    pub fn attach_template(
        &self,
        channel: Channel,
        campaign_id: CampaignId,
        template_type: TemplateType,
        content: &TemplateContent,
    ) -> Result<TemplateId> {
        self.store
            .insert_template(channel, campaign_id, template_type, content)
    }

    pub fn list_campaigns(&self, channel: Channel) -> Result<Vec<Campaign>> {
        self.store.list_campaigns(channel)
    }

    /// Record one send of an existing template in a single transaction:
    /// tracking row, interaction, then the status transition derived from the
    /// channel and template type. Any failure rolls back all three.
    pub fn record_send(
        &self,
        contact_id: ContactId,
        template_id: TemplateId,
        campaign_id: CampaignId,
        channel: Channel,
        at: DateTime<Utc>,
    ) -> Result<SendRecord> {
        self.store.with_transaction(|store| {
            record_in(store, contact_id, template_id, campaign_id, channel, at)
        })
    }

    /// Store the text that was sent as a template under `campaign_id` and
    /// record the send, all in one transaction.
    pub fn record_rendered_send(
        &self,
        contact_id: ContactId,
        campaign_id: CampaignId,
        channel: Channel,
        template_type: TemplateType,
        content: &TemplateContent,
        at: DateTime<Utc>,
    ) -> Result<SendRecord> {
        self.store.with_transaction(|store| {
            let template_id =
                store.insert_template(channel, campaign_id, template_type, content)?;
            record_in(store, contact_id, template_id, campaign_id, channel, at)
        })
    }
}

/// Caller holds the transaction.
fn record_in(
    store: &LeadStore,
    contact_id: ContactId,
    template_id: TemplateId,
    campaign_id: CampaignId,
    channel: Channel,
    at: DateTime<Utc>,
) -> Result<SendRecord> {
    let template = store.get_template(channel, template_id)?;
    if template.campaign_id != campaign_id {
        return Err(LeadgenError::TemplateNotInCampaign {
            template: template_id.0,
            campaign: campaign_id.0,
        });
    }
    let company_id = store.company_for_contact(contact_id)?;
    let trigger = Trigger::for_send(channel, template.template_type);

    let tracking_id = store.insert_tracking(channel, contact_id, &template, at)?;
    store.record_interaction(&NewInteraction {
        company_id,
        contact_id: Some(contact_id),
        interaction_type: interaction_type(trigger),
        channel,
        at,
        notes: Some(format!(
            "{} via campaign {campaign_id}",
            template.template_type
        )),
    })?;
    let status = lifecycle::transition(store, company_id, trigger, at)?;

    Ok(SendRecord {
        tracking_id,
        trigger,
        status,
    })
}

fn interaction_type(trigger: Trigger) -> InteractionType {
    match trigger {
        Trigger::LinkedinConnectionSent => InteractionType::LinkedinConnectionRequest,
        Trigger::LinkedinMessageSent => InteractionType::LinkedinMessage,
        Trigger::EmailSent | Trigger::LeadCreated => InteractionType::EmailSent,
    }
}
