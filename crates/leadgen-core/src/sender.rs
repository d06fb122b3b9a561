//! Outbound delivery. Nothing here talks to a real provider: the simulated
//! sender logs the message and waits out the pacing window.

use crate::config::PacingConfig;
use crate::error::Result;
use crate::types::{Channel, CompanyId, ContactId, TemplateType};
use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub channel: Channel,
    pub company_id: CompanyId,
    pub contact_id: ContactId,
    /// Email address or LinkedIn profile URL.
    pub recipient: String,
    pub template_type: TemplateType,
    pub subject: Option<String>,
    pub body: String,
}

pub trait ChannelSender {
    fn send(&self, message: &OutboundMessage) -> Result<()>;
}

// ---------------------------------------------------------------------------
// SimulatedSender
// ---------------------------------------------------------------------------

pub struct SimulatedSender {
    pacing: PacingConfig,
}

impl SimulatedSender {
    pub fn new(pacing: PacingConfig) -> Self {
        Self { pacing }
    }

    fn delay(&self) -> Duration {
        let (min, max) = self.pacing.bounds();
        if max <= min {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }
}

impl ChannelSender for SimulatedSender {
    fn send(&self, message: &OutboundMessage) -> Result<()> {
        tracing::info!(
            channel = %message.channel,
            company_id = %message.company_id,
            contact_id = %message.contact_id,
            recipient = %message.recipient,
            template = %message.template_type,
            subject = message.subject.as_deref().unwrap_or(""),
            "simulated send"
        );
        let delay = self.delay();
        if !delay.is_zero() {
            tracing::debug!(secs = delay.as_secs(), "pacing delay");
            std::thread::sleep(delay);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// NoopSender
// ---------------------------------------------------------------------------

/// Accepts every message without logging or waiting.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSender;

impl ChannelSender for NoopSender {
    fn send(&self, _message: &OutboundMessage) -> Result<()> {
        Ok(())
    }
}
