//! Outreach content rendering.
//!
//! The scheduler only sees the [`TemplateRenderer`] trait. [`DefaultRenderer`]
//! carries a small built-in variant set per channel and stage and fills the
//! `{first_name}`, `{company}` and `{industry_specific}` placeholders.

use crate::error::{LeadgenError, Result};
use crate::model::{LeadView, TemplateContent};
use crate::types::{is_blank, Channel, TemplateType};
use rand::seq::SliceRandom;
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// IndustryBucket
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndustryBucket {
    DigitalMarketing,
    SaasCompanies,
    EnterpriseIt,
    Smes,
    ServiceBusinesses,
}

impl IndustryBucket {
    pub fn all() -> &'static [IndustryBucket] {
        &[
            IndustryBucket::DigitalMarketing,
            IndustryBucket::SaasCompanies,
            IndustryBucket::EnterpriseIt,
            IndustryBucket::Smes,
            IndustryBucket::ServiceBusinesses,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IndustryBucket::DigitalMarketing => "digital_marketing",
            IndustryBucket::SaasCompanies => "saas_companies",
            IndustryBucket::EnterpriseIt => "enterprise_it",
            IndustryBucket::Smes => "smes",
            IndustryBucket::ServiceBusinesses => "service_businesses",
        }
    }

    /// Classify free-text industry. Rules are checked in order; anything
    /// unmatched (or missing) is an SME.
    pub fn classify(industry: Option<&str>) -> Self {
        let Some(text) = industry.filter(|s| !is_blank(Some(*s))) else {
            return IndustryBucket::Smes;
        };
        let text = text.to_ascii_lowercase();
        let has = |needle: &str| text.contains(needle);
        let has_word = |word: &str| {
            text.split(|c: char| !c.is_ascii_alphanumeric())
                .any(|token| token == word)
        };

        if has("market") || has("digital") || has("agency") {
            IndustryBucket::DigitalMarketing
        } else if has("saas") || has("software") || has("tech") {
            IndustryBucket::SaasCompanies
        } else if has("enterprise") || has("information technology") || has_word("it") {
            IndustryBucket::EnterpriseIt
        } else if has("service") || has("plumb") || has("electric") {
            IndustryBucket::ServiceBusinesses
        } else {
            IndustryBucket::Smes
        }
    }

    /// Phrases substituted for `{industry_specific}`.
    pub fn specifics(self) -> &'static [&'static str] {
        match self {
            IndustryBucket::DigitalMarketing => &[
                "content marketing",
                "paid search campaigns",
                "SEO services",
                "marketing automation",
            ],
            IndustryBucket::SaasCompanies => &[
                "customer onboarding",
                "subscription analytics",
                "team collaboration",
                "product support",
            ],
            IndustryBucket::EnterpriseIt => &[
                "IT service management",
                "cloud migration",
                "internal help desks",
                "security operations",
            ],
            IndustryBucket::Smes => &[
                "customer engagement",
                "online presence",
                "local customer service",
                "day-to-day operations",
            ],
            IndustryBucket::ServiceBusinesses => &[
                "appointment booking",
                "home services",
                "field scheduling",
                "client follow-up",
            ],
        }
    }
}

impl fmt::Display for IndustryBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Renderer trait
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedTemplate {
    pub subject: Option<String>,
    pub body: String,
}

impl From<RenderedTemplate> for TemplateContent {
    fn from(r: RenderedTemplate) -> Self {
        TemplateContent {
            subject: r.subject,
            body: r.body,
        }
    }
}

pub trait TemplateRenderer {
    /// Render the `stage` message for `lead` on `channel`.
    fn render(
        &self,
        channel: Channel,
        lead: &LeadView,
        stage: TemplateType,
        bucket: IndustryBucket,
    ) -> Result<RenderedTemplate>;
}

// ---------------------------------------------------------------------------
// DefaultRenderer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVariant {
    pub subject: Option<String>,
    pub body: String,
}

impl TemplateVariant {
    pub fn new(subject: Option<&str>, body: &str) -> Self {
        Self {
            subject: subject.map(str::to_string),
            body: body.to_string(),
        }
    }
}

pub struct DefaultRenderer {
    variants: HashMap<(Channel, TemplateType), Vec<TemplateVariant>>,
}

impl Default for DefaultRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultRenderer {
    pub fn new() -> Self {
        let mut variants = HashMap::new();
        variants.insert(
            (Channel::Email, TemplateType::InitialOutreach),
            vec![
                TemplateVariant::new(
                    Some("A 24/7 assistant for {company}"),
                    "Hi {first_name},\n\nI came across {company} and liked your work in \
                     {industry_specific}. We build AI chat assistants that answer visitors \
                     around the clock and hand qualified leads to your team.\n\nWould a \
                     15-minute call next week make sense?\n",
                ),
                TemplateVariant::new(
                    Some("Quick question about {company}"),
                    "Hello {first_name},\n\nTeams focused on {industry_specific} tell us \
                     most inquiries arrive after hours. Our chat assistant answers them \
                     instantly and books the follow-up for you.\n\nOpen to a short demo \
                     for {company}?\n",
                ),
            ],
        );
        variants.insert(
            (Channel::Email, TemplateType::FollowUp),
            vec![
                TemplateVariant::new(
                    Some("Following up: {company}"),
                    "Hi {first_name},\n\nCircling back on my last note. A few companies \
                     working in {industry_specific} have cut response times to seconds \
                     with our assistant. Happy to share how.\n",
                ),
                TemplateVariant::new(
                    Some("Re: a 24/7 assistant for {company}"),
                    "Hello {first_name},\n\nI know inboxes fill up fast. If improving \
                     {industry_specific} is on the list this quarter, I'd love 15 minutes \
                     to show what we did for similar teams.\n",
                ),
            ],
        );
        variants.insert(
            (Channel::Email, TemplateType::FinalAttempt),
            vec![TemplateVariant::new(
                Some("Closing the loop with {company}"),
                "Hi {first_name},\n\nThis is my last note for now. If better coverage for \
                 {industry_specific} becomes a priority, just reply and I'll send over a \
                 demo link.\n",
            )],
        );
        variants.insert(
            (Channel::Linkedin, TemplateType::ConnectionRequest),
            vec![
                TemplateVariant::new(
                    None,
                    "Hi {first_name}, I saw your work at {company} in {industry_specific} \
                     and would like to connect.",
                ),
                TemplateVariant::new(
                    None,
                    "Hello {first_name}, I work with teams in {industry_specific} on AI \
                     chat assistants. Would be glad to connect.",
                ),
            ],
        );
        variants.insert(
            (Channel::Linkedin, TemplateType::FollowUp),
            vec![TemplateVariant::new(
                None,
                "Thanks for connecting, {first_name}. Curious how {company} handles \
                 after-hours inquiries around {industry_specific}. Open to a quick chat?",
            )],
        );
        Self { variants }
    }

    /// Renderer with a single variant for one channel and stage.
    pub fn with_variant(channel: Channel, stage: TemplateType, variant: TemplateVariant) -> Self {
        let mut variants = HashMap::new();
        variants.insert((channel, stage), vec![variant]);
        Self { variants }
    }
}

impl TemplateRenderer for DefaultRenderer {
    fn render(
        &self,
        channel: Channel,
        lead: &LeadView,
        stage: TemplateType,
        bucket: IndustryBucket,
    ) -> Result<RenderedTemplate> {
        let mut rng = rand::thread_rng();
        let variant = self
            .variants
            .get(&(channel, stage))
            .and_then(|v| v.choose(&mut rng))
            .ok_or_else(|| {
                LeadgenError::RenderFailure(format!("no {channel} template for stage {stage}"))
            })?;
        let industry_specific = bucket
            .specifics()
            .choose(&mut rng)
            .copied()
            .unwrap_or(bucket.as_str());

        let first_name = lead
            .first_name()
            .filter(|n| !is_blank(Some(*n)))
            .unwrap_or("there");
        let company = if is_blank(Some(&lead.company_name)) {
            "your company"
        } else {
            lead.company_name.as_str()
        };

        let values = [
            ("first_name", first_name),
            ("company", company),
            ("industry_specific", industry_specific),
        ];
        let subject = match channel {
            Channel::Email => variant
                .subject
                .as_deref()
                .map(|s| fill(s, &values))
                .transpose()?,
            Channel::Linkedin => None,
        };
        let body = fill(&variant.body, &values)?;
        Ok(RenderedTemplate { subject, body })
    }
}

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").unwrap())
}

/// Substitute `{name}` placeholders. An unknown name is a render failure.
fn fill(template: &str, values: &[(&str, &str)]) -> Result<String> {
    let mut unknown: Option<String> = None;
    let out = placeholder_re().replace_all(template, |caps: &Captures<'_>| {
        let key = &caps[1];
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, v)) => v.to_string(),
            None => {
                unknown.get_or_insert_with(|| key.to_string());
                caps[0].to_string()
            }
        }
    });
    match unknown {
        Some(key) => Err(LeadgenError::RenderFailure(format!(
            "unknown placeholder '{{{key}}}'"
        ))),
        None => Ok(out.into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Contact, ContactInfo};
    use crate::types::{CompanyId, ContactId, LeadStatus};

    fn lead(first_name: Option<&str>) -> LeadView {
        LeadView {
            company_id: CompanyId(1),
            company_name: "Acme".into(),
            website: None,
            industry: Some("Digital Agency".into()),
            contact: Some(Contact {
                id: ContactId(1),
                company_id: CompanyId(1),
                info: ContactInfo {
                    first_name: first_name.map(str::to_string),
                    ..Default::default()
                },
            }),
            status: LeadStatus::New,
            score: 0,
            last_contacted: None,
            next_action: None,
            next_action_date: None,
            emails_sent: 0,
        }
    }

    #[test]
    fn classify_buckets() {
        let c = |s: &str| IndustryBucket::classify(Some(s));
        assert_eq!(c("Digital Marketing Agency"), IndustryBucket::DigitalMarketing);
        assert_eq!(c("B2B SaaS"), IndustryBucket::SaasCompanies);
        assert_eq!(c("Information Technology"), IndustryBucket::EnterpriseIt);
        assert_eq!(c("IT Consulting"), IndustryBucket::EnterpriseIt);
        assert_eq!(c("Plumbing"), IndustryBucket::ServiceBusinesses);
        assert_eq!(c("Bakery"), IndustryBucket::Smes);
        assert_eq!(c("Fruit wholesale"), IndustryBucket::Smes);
        assert_eq!(IndustryBucket::classify(None), IndustryBucket::Smes);
        assert_eq!(IndustryBucket::classify(Some("N/A")), IndustryBucket::Smes);
    }

    #[test]
    fn email_render_fills_placeholders() {
        let r = DefaultRenderer::new();
        let out = r
            .render(
                Channel::Email,
                &lead(Some("Dana")),
                TemplateType::InitialOutreach,
                IndustryBucket::DigitalMarketing,
            )
            .unwrap();
        assert!(out.subject.as_deref().unwrap().contains("Acme"));
        assert!(out.body.contains("Dana"));
        assert!(!out.body.contains('{'));
    }

    #[test]
    fn linkedin_render_has_no_subject() {
        let r = DefaultRenderer::new();
        let out = r
            .render(
                Channel::Linkedin,
                &lead(None),
                TemplateType::ConnectionRequest,
                IndustryBucket::Smes,
            )
            .unwrap();
        assert!(out.subject.is_none());
        assert!(out.body.contains("there"));
    }

    #[test]
    fn unknown_placeholder_fails() {
        let r = DefaultRenderer::with_variant(
            Channel::Email,
            TemplateType::FollowUp,
            TemplateVariant::new(Some("Hi"), "Hello {first_name} from {city}"),
        );
        let err = r
            .render(
                Channel::Email,
                &lead(Some("Dana")),
                TemplateType::FollowUp,
                IndustryBucket::Smes,
            )
            .unwrap_err();
        assert!(matches!(err, LeadgenError::RenderFailure(m) if m.contains("{city}")));
    }

    #[test]
    fn mixed_case_and_numbered_placeholders_fail() {
        for body in ["Hello {Name}", "Hello {var1}"] {
            let r = DefaultRenderer::with_variant(
                Channel::Linkedin,
                TemplateType::FollowUp,
                TemplateVariant::new(None, body),
            );
            let err = r
                .render(
                    Channel::Linkedin,
                    &lead(Some("Dana")),
                    TemplateType::FollowUp,
                    IndustryBucket::Smes,
                )
                .unwrap_err();
            assert!(matches!(err, LeadgenError::RenderFailure(_)), "{body}");
        }
    }

    #[test]
    fn missing_stage_fails() {
        let r = DefaultRenderer::new();
        assert!(matches!(
            r.render(
                Channel::Email,
                &lead(None),
                TemplateType::ConnectionRequest,
                IndustryBucket::Smes
            ),
            Err(LeadgenError::RenderFailure(_))
        ));
    }
}
