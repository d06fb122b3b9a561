//! One scheduling pass: load candidates, allocate the daily quota, then
//! render, send and record each allocated lead in order.
//!
//! The LinkedIn pass runs before the email pass, and the email pass queries
//! the store again, so a lead moved to `Connection Requested` moments ago is
//! no longer an email candidate.

use crate::allocator::{
    allocate, follow_up_template, partition_email, partition_linkedin, EMAIL_POOL, LINKEDIN_POOL,
};
use crate::config::Config;
use crate::error::{LeadgenError, Result};
use crate::model::{LeadView, TemplateContent};
use crate::recorder::CampaignRecorder;
use crate::render::{IndustryBucket, TemplateRenderer};
use crate::sender::{ChannelSender, OutboundMessage};
use crate::store::LeadStore;
use crate::types::{CampaignId, CampaignStatus, Channel, ContactField, TemplateType};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassScope {
    #[default]
    All,
    EmailOnly,
    LinkedinOnly,
}

impl PassScope {
    fn includes(self, channel: Channel) -> bool {
        match self {
            PassScope::All => true,
            PassScope::EmailOnly => channel == Channel::Email,
            PassScope::LinkedinOnly => channel == Channel::Linkedin,
        }
    }
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ChannelSummary {
    pub channel: Channel,
    pub ran: bool,
    /// Leads in the channel's status pool that have the required contact field.
    pub candidates: usize,
    /// Leads in the pool with no contact carrying the required field.
    pub missing_field: usize,
    /// In the pool but not due yet, or out of follow-ups.
    pub waiting: usize,
    pub follow_ups_sent: usize,
    pub first_touch_sent: usize,
    pub deferred: usize,
    pub render_failures: usize,
    pub transition_failures: usize,
    pub send_failures: usize,
    pub campaign_id: Option<CampaignId>,
}

impl ChannelSummary {
    fn new(channel: Channel) -> Self {
        Self {
            channel,
            ran: false,
            candidates: 0,
            missing_field: 0,
            waiting: 0,
            follow_ups_sent: 0,
            first_touch_sent: 0,
            deferred: 0,
            render_failures: 0,
            transition_failures: 0,
            send_failures: 0,
            campaign_id: None,
        }
    }

    pub fn sent(&self) -> usize {
        self.follow_ups_sent + self.first_touch_sent
    }

    pub fn failures(&self) -> usize {
        self.render_failures + self.transition_failures + self.send_failures
    }

    fn count_failure(&mut self, err: &LeadgenError) {
        match err {
            LeadgenError::RenderFailure(_) => self.render_failures += 1,
            LeadgenError::SendFailure(_) => self.send_failures += 1,
            _ => self.transition_failures += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PassSummary {
    pub started_at: DateTime<Utc>,
    pub linkedin: ChannelSummary,
    pub email: ChannelSummary,
}

impl PassSummary {
    pub fn total_sent(&self) -> usize {
        self.linkedin.sent() + self.email.sent()
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

pub struct Scheduler<'a> {
    store: &'a LeadStore,
    config: &'a Config,
    sender: &'a dyn ChannelSender,
    renderer: &'a dyn TemplateRenderer,
}

/// Lead picked for a send, with the template stage it gets.
struct Planned {
    lead: LeadView,
    stage: TemplateType,
    follow_up: bool,
}

impl<'a> Scheduler<'a> {
    pub fn new(
        store: &'a LeadStore,
        config: &'a Config,
        sender: &'a dyn ChannelSender,
        renderer: &'a dyn TemplateRenderer,
    ) -> Self {
        Self {
            store,
            config,
            sender,
            renderer,
        }
    }

    pub fn run_pass(&self, now: DateTime<Utc>, scope: PassScope) -> Result<PassSummary> {
        tracing::info!(?scope, "scheduling pass started");

        let mut linkedin = ChannelSummary::new(Channel::Linkedin);
        if self.config.linkedin.enabled && scope.includes(Channel::Linkedin) {
            linkedin = self.run_linkedin(now)?;
        } else {
            tracing::debug!("linkedin pass skipped");
        }

        let mut email = ChannelSummary::new(Channel::Email);
        if self.config.email.enabled && scope.includes(Channel::Email) {
            email = self.run_email(now)?;
        } else {
            tracing::debug!("email pass skipped");
        }

        let summary = PassSummary {
            started_at: now,
            linkedin,
            email,
        };
        tracing::info!(
            linkedin_sent = summary.linkedin.sent(),
            email_sent = summary.email.sent(),
            failures = summary.linkedin.failures() + summary.email.failures(),
            "scheduling pass finished"
        );
        Ok(summary)
    }

    fn run_email(&self, now: DateTime<Utc>) -> Result<ChannelSummary> {
        let cfg = &self.config.email;
        let mut summary = ChannelSummary::new(Channel::Email);
        summary.ran = true;

        let leads = self
            .store
            .query_by_status(EMAIL_POOL, Some(ContactField::Email))?;
        summary.candidates = leads.len();
        summary.missing_field = count_usize(
            self.store
                .count_missing_contact_field(EMAIL_POOL, ContactField::Email)?,
        );

        let partition = partition_email(leads, cfg, now);
        summary.waiting = partition.waiting.len();
        let allocation = allocate(
            partition.follow_ups,
            partition.first_touch,
            quota(cfg.emails_per_day),
        );
        summary.deferred = allocation.deferred.len();
        tracing::info!(
            follow_ups = allocation.follow_ups.len(),
            first_touch = allocation.first_touch.len(),
            deferred = summary.deferred,
            "email allocation"
        );

        let plan = allocation
            .follow_ups
            .into_iter()
            .map(|lead| Planned {
                stage: follow_up_template(lead.emails_sent, cfg.max_follow_ups),
                lead,
                follow_up: true,
            })
            .chain(allocation.first_touch.into_iter().map(|lead| Planned {
                lead,
                stage: TemplateType::InitialOutreach,
                follow_up: false,
            }))
            .collect();

        self.execute(Channel::Email, plan, now, &mut summary)?;
        Ok(summary)
    }

    fn run_linkedin(&self, now: DateTime<Utc>) -> Result<ChannelSummary> {
        let cfg = &self.config.linkedin;
        let mut summary = ChannelSummary::new(Channel::Linkedin);
        summary.ran = true;

        let leads = self
            .store
            .query_by_status(LINKEDIN_POOL, Some(ContactField::LinkedinUrl))?;
        summary.candidates = leads.len();
        summary.missing_field = count_usize(
            self.store
                .count_missing_contact_field(LINKEDIN_POOL, ContactField::LinkedinUrl)?,
        );

        let partition = partition_linkedin(leads, self.config.email.follow_up_days, now);
        summary.waiting = partition.waiting.len();
        let messages = allocate(
            partition.follow_ups,
            Vec::new(),
            quota(cfg.message_limit_per_day),
        );
        let connections = allocate(
            Vec::new(),
            partition.first_touch,
            quota(cfg.connection_limit_per_day),
        );
        summary.deferred = messages.deferred.len() + connections.deferred.len();
        tracing::info!(
            messages = messages.follow_ups.len(),
            connections = connections.first_touch.len(),
            deferred = summary.deferred,
            "linkedin allocation"
        );

        let plan = messages
            .follow_ups
            .into_iter()
            .map(|lead| Planned {
                lead,
                stage: TemplateType::FollowUp,
                follow_up: true,
            })
            .chain(connections.first_touch.into_iter().map(|lead| Planned {
                lead,
                stage: TemplateType::ConnectionRequest,
                follow_up: false,
            }))
            .collect();

        self.execute(Channel::Linkedin, plan, now, &mut summary)?;
        Ok(summary)
    }

    /// Open a campaign for the planned sends and work through them in order.
    fn execute(
        &self,
        channel: Channel,
        plan: Vec<Planned>,
        now: DateTime<Utc>,
        summary: &mut ChannelSummary,
    ) -> Result<()> {
        if plan.is_empty() {
            return Ok(());
        }

        let recorder = CampaignRecorder::new(self.store);
        let name = format!(
            "{} Campaign {}",
            channel.as_str(),
            now.format("%Y%m%d_%H%M%S")
        );
        let campaign = recorder.create_campaign(
            channel,
            &name,
            Some(&format!("Automated {} campaign", channel.as_str())),
        )?;
        recorder.set_campaign_status(channel, campaign, CampaignStatus::Active, now)?;
        summary.campaign_id = Some(campaign);

        for planned in plan {
            let company_id = planned.lead.company_id;
            match self.send_one(&recorder, channel, campaign, &planned, now) {
                Ok(()) => {
                    if planned.follow_up {
                        summary.follow_ups_sent += 1;
                    } else {
                        summary.first_touch_sent += 1;
                    }
                }
                Err(e) if e.is_lead_local() => {
                    tracing::warn!(
                        %channel,
                        company_id = %company_id,
                        stage = %planned.stage,
                        error = %e,
                        "lead skipped"
                    );
                    summary.count_failure(&e);
                }
                Err(e) => {
                    if let Err(end) =
                        recorder.set_campaign_status(channel, campaign, CampaignStatus::Ended, now)
                    {
                        tracing::warn!(
                            %channel,
                            campaign_id = %campaign,
                            error = %end,
                            "could not end aborted campaign"
                        );
                    }
                    return Err(e);
                }
            }
        }

        recorder.set_campaign_status(channel, campaign, CampaignStatus::Ended, now)?;
        Ok(())
    }

    fn send_one(
        &self,
        recorder: &CampaignRecorder<'_>,
        channel: Channel,
        campaign: CampaignId,
        planned: &Planned,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let lead = &planned.lead;
        let contact = lead
            .contact
            .as_ref()
            .ok_or(LeadgenError::ContactNotFound(0))?;
        let recipient = match channel {
            Channel::Email => contact.info.email.clone(),
            Channel::Linkedin => contact.info.linkedin_url.clone(),
        }
        .ok_or(LeadgenError::ContactNotFound(contact.id.0))?;

        let bucket = IndustryBucket::classify(lead.industry.as_deref());
        let rendered = self.renderer.render(channel, lead, planned.stage, bucket)?;
        let content = TemplateContent::from(rendered);

        self.sender.send(&OutboundMessage {
            channel,
            company_id: lead.company_id,
            contact_id: contact.id,
            recipient,
            template_type: planned.stage,
            subject: content.subject.clone(),
            body: content.body.clone(),
        })?;

        let record = recorder.record_rendered_send(
            contact.id,
            campaign,
            channel,
            planned.stage,
            &content,
            now,
        )?;
        tracing::debug!(
            company_id = %lead.company_id,
            trigger = %record.trigger,
            status = %record.status,
            "send recorded"
        );
        Ok(())
    }
}

fn quota(limit: u32) -> usize {
    usize::try_from(limit).unwrap_or(usize::MAX)
}

fn count_usize(n: i64) -> usize {
    usize::try_from(n).unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PacingConfig;
    use crate::lifecycle::{self, Trigger};
    use crate::model::NewInteraction;
    use crate::render::{DefaultRenderer, RenderedTemplate};
    use crate::sender::NoopSender;
    use crate::store::test_support::{seed_lead, store};
    use crate::types::{CompanyId, InteractionType, LeadStatus};
    use chrono::{Duration, TimeZone};
    use std::cell::RefCell;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 5, 9, 0, 0).unwrap()
    }

    fn config() -> Config {
        let mut cfg = Config::default();
        cfg.pacing = PacingConfig::none();
        cfg
    }

    /// Lead that got one email `days_ago` days before `now()`.
    fn contacted_lead(store: &LeadStore, name: &str, days_ago: i64) -> CompanyId {
        let sent = now() - Duration::days(days_ago);
        let (company, contact) =
            seed_lead(store, name, Some(&format!("x@{name}.com")), None, sent);
        store
            .record_interaction(&NewInteraction {
                company_id: company,
                contact_id: Some(contact),
                interaction_type: InteractionType::EmailSent,
                channel: Channel::Email,
                at: sent,
                notes: None,
            })
            .unwrap();
        lifecycle::transition(store, company, Trigger::EmailSent, sent).unwrap();
        company
    }

    /// Records every recipient; fails for the ones listed.
    #[derive(Default)]
    struct RecordingSender {
        sent: RefCell<Vec<String>>,
        fail_for: Vec<String>,
        fatal: bool,
    }

    impl ChannelSender for RecordingSender {
        fn send(&self, message: &OutboundMessage) -> Result<()> {
            if self.fatal {
                return Err(LeadgenError::StorageUnavailable("disk gone".into()));
            }
            if self.fail_for.contains(&message.recipient) {
                return Err(LeadgenError::SendFailure(message.recipient.clone()));
            }
            self.sent.borrow_mut().push(message.recipient.clone());
            Ok(())
        }
    }

    struct FailFor(CompanyId);

    impl TemplateRenderer for FailFor {
        fn render(
            &self,
            channel: Channel,
            lead: &LeadView,
            stage: TemplateType,
            bucket: IndustryBucket,
        ) -> Result<RenderedTemplate> {
            if lead.company_id == self.0 {
                return Err(LeadgenError::RenderFailure("bad variant".into()));
            }
            DefaultRenderer::new().render(channel, lead, stage, bucket)
        }
    }

    #[test]
    fn email_quota_serves_follow_ups_first() {
        let store = store();
        for i in 0..3 {
            contacted_lead(&store, &format!("f{i}"), 4);
        }
        for i in 0..20 {
            seed_lead(&store, &format!("n{i}"), Some(&format!("n{i}@x.com")), None, now());
        }
        let mut cfg = config();
        cfg.email.emails_per_day = 10;
        let sender = RecordingSender::default();
        let renderer = DefaultRenderer::new();

        let summary = Scheduler::new(&store, &cfg, &sender, &renderer)
            .run_pass(now(), PassScope::EmailOnly)
            .unwrap();
        assert_eq!(summary.email.follow_ups_sent, 3);
        assert_eq!(summary.email.first_touch_sent, 7);
        assert_eq!(summary.email.deferred, 13);
        assert_eq!(summary.total_sent(), 10);
        assert!(!summary.linkedin.ran);
        assert_eq!(sender.sent.borrow().len(), 10);
        assert_eq!(sender.sent.borrow()[0], "x@f0.com");

        assert_eq!(
            store
                .query_by_status(&[LeadStatus::New], None)
                .unwrap()
                .len(),
            13
        );
    }

    #[test]
    fn follow_up_at_max_uses_final_attempt() {
        let store = store();
        let company = contacted_lead(&store, "acme", 5);
        let lead = store.get_lead(company).unwrap();
        store
            .record_interaction(&NewInteraction {
                company_id: company,
                contact_id: lead.contact.as_ref().map(|c| c.id),
                interaction_type: InteractionType::EmailSent,
                channel: Channel::Email,
                at: now() - Duration::days(4),
                notes: None,
            })
            .unwrap();

        let cfg = config();
        let renderer = DefaultRenderer::new();
        let summary = Scheduler::new(&store, &cfg, &NoopSender, &renderer)
            .run_pass(now(), PassScope::EmailOnly)
            .unwrap();
        assert_eq!(summary.email.follow_ups_sent, 1);

        let campaign = summary.email.campaign_id.unwrap();
        let stage: String = store
            .conn_ref()
            .query_row(
                "SELECT template_type FROM email_templates WHERE campaign_id = ?1",
                [campaign.0],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(stage, "final_attempt");
    }

    #[test]
    fn linkedin_runs_first_and_claims_new_leads() {
        let store = store();
        let (both, _) = seed_lead(
            &store,
            "Both",
            Some("b@both.com"),
            Some("https://linkedin.com/in/both"),
            now(),
        );
        seed_lead(&store, "Mail", Some("m@mail.com"), None, now());

        let cfg = config();
        let renderer = DefaultRenderer::new();
        let summary = Scheduler::new(&store, &cfg, &NoopSender, &renderer)
            .run_pass(now(), PassScope::All)
            .unwrap();

        assert_eq!(summary.linkedin.first_touch_sent, 1);
        assert_eq!(summary.email.first_touch_sent, 1);
        assert_eq!(summary.linkedin.missing_field, 1);
        assert_eq!(
            store.get_status(both).unwrap().unwrap().status,
            LeadStatus::ConnectionRequested
        );
        assert_eq!(store.get_lead(both).unwrap().emails_sent, 0);
    }

    #[test]
    fn render_failure_skips_lead_and_continues() {
        let store = store();
        let (bad, _) = seed_lead(&store, "Bad", Some("bad@x.com"), None, now());
        let (good, _) = seed_lead(&store, "Good", Some("good@x.com"), None, now());

        let cfg = config();
        let renderer = FailFor(bad);
        let summary = Scheduler::new(&store, &cfg, &NoopSender, &renderer)
            .run_pass(now(), PassScope::EmailOnly)
            .unwrap();
        assert_eq!(summary.email.render_failures, 1);
        assert_eq!(summary.email.first_touch_sent, 1);
        assert_eq!(
            store.get_status(bad).unwrap().unwrap().status,
            LeadStatus::New
        );
        assert_eq!(
            store.get_status(good).unwrap().unwrap().status,
            LeadStatus::Contacted
        );
    }

    #[test]
    fn send_failure_leaves_lead_untouched() {
        let store = store();
        let (company, contact) = seed_lead(&store, "Acme", Some("a@acme.com"), None, now());
        let sender = RecordingSender {
            fail_for: vec!["a@acme.com".into()],
            ..Default::default()
        };
        let cfg = config();
        let renderer = DefaultRenderer::new();
        let summary = Scheduler::new(&store, &cfg, &sender, &renderer)
            .run_pass(now(), PassScope::EmailOnly)
            .unwrap();
        assert_eq!(summary.email.send_failures, 1);
        assert_eq!(summary.email.sent(), 0);
        assert_eq!(
            store.get_status(company).unwrap().unwrap().status,
            LeadStatus::New
        );
        assert!(store
            .tracking_for_contact(Channel::Email, contact)
            .unwrap()
            .is_empty());
        let templates: i64 = store
            .conn_ref()
            .query_row("SELECT COUNT(*) FROM email_templates", [], |r| r.get(0))
            .unwrap();
        assert_eq!(templates, 0);
    }

    #[test]
    fn fatal_error_aborts_pass() {
        let store = store();
        seed_lead(&store, "Acme", Some("a@acme.com"), None, now());
        let sender = RecordingSender {
            fatal: true,
            ..Default::default()
        };
        let cfg = config();
        let renderer = DefaultRenderer::new();
        let result = Scheduler::new(&store, &cfg, &sender, &renderer)
            .run_pass(now(), PassScope::EmailOnly);
        assert!(matches!(result, Err(LeadgenError::StorageUnavailable(_))));

        let campaigns = store.list_campaigns(Channel::Email).unwrap();
        assert_eq!(campaigns.len(), 1);
        assert_eq!(campaigns[0].status, CampaignStatus::Ended);
        assert_eq!(campaigns[0].end_date, Some(now()));
        assert_eq!(campaigns[0].sends, 0);
    }

    #[test]
    fn no_campaign_without_sends() {
        let store = store();
        contacted_lead(&store, "recent", 1);
        let cfg = config();
        let renderer = DefaultRenderer::new();
        let summary = Scheduler::new(&store, &cfg, &NoopSender, &renderer)
            .run_pass(now(), PassScope::All)
            .unwrap();
        assert_eq!(summary.total_sent(), 0);
        assert_eq!(summary.email.waiting, 1);
        assert!(summary.email.campaign_id.is_none());
        assert!(store.list_campaigns(Channel::Email).unwrap().is_empty());
    }

    #[test]
    fn linkedin_quotas_are_separate() {
        let store = store();
        for i in 0..4 {
            seed_lead(
                &store,
                &format!("c{i}"),
                None,
                Some(&format!("https://linkedin.com/in/c{i}")),
                now(),
            );
        }
        let mut cfg = config();
        cfg.linkedin.connection_limit_per_day = 2;
        let renderer = DefaultRenderer::new();
        let summary = Scheduler::new(&store, &cfg, &NoopSender, &renderer)
            .run_pass(now(), PassScope::LinkedinOnly)
            .unwrap();
        assert_eq!(summary.linkedin.first_touch_sent, 2);
        assert_eq!(summary.linkedin.deferred, 2);

        let campaign = store
            .get_campaign(Channel::Linkedin, summary.linkedin.campaign_id.unwrap())
            .unwrap();
        assert_eq!(campaign.status, CampaignStatus::Ended);
        assert_eq!(campaign.sends, 2);
    }

    #[test]
    fn disabled_channel_is_skipped() {
        let store = store();
        seed_lead(&store, "Acme", Some("a@acme.com"), None, now());
        let mut cfg = config();
        cfg.email.enabled = false;
        let renderer = DefaultRenderer::new();
        let summary = Scheduler::new(&store, &cfg, &NoopSender, &renderer)
            .run_pass(now(), PassScope::All)
            .unwrap();
        assert!(!summary.email.ran);
        assert_eq!(summary.total_sent(), 0);
    }
}
