//! Lead status state machine.
//!
//! Every status change goes through [`transition`]. The table in
//! [`Trigger::transition`] is the only place that knows which status and
//! next action a send event produces, and [`project`] is the only place that
//! turns a transition into status columns.

use crate::error::{LeadgenError, Result};
use crate::model::StatusUpdate;
use crate::store::LeadStore;
use crate::types::{Channel, CompanyId, LeadStatus, TemplateType};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Trigger
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    LeadCreated,
    EmailSent,
    LinkedinConnectionSent,
    LinkedinMessageSent,
}

impl Trigger {
    pub fn all() -> &'static [Trigger] {
        &[
            Trigger::LeadCreated,
            Trigger::EmailSent,
            Trigger::LinkedinConnectionSent,
            Trigger::LinkedinMessageSent,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Trigger::LeadCreated => "lead_created",
            Trigger::EmailSent => "email_sent",
            Trigger::LinkedinConnectionSent => "linkedin_connection_sent",
            Trigger::LinkedinMessageSent => "linkedin_message_sent",
        }
    }

    /// The send event recorded for a template of `template_type` on `channel`.
    pub fn for_send(channel: Channel, template_type: TemplateType) -> Self {
        match (channel, template_type) {
            (Channel::Email, _) => Trigger::EmailSent,
            (Channel::Linkedin, TemplateType::ConnectionRequest) => Trigger::LinkedinConnectionSent,
            (Channel::Linkedin, _) => Trigger::LinkedinMessageSent,
        }
    }

    pub fn is_send(self) -> bool {
        !matches!(self, Trigger::LeadCreated)
    }

    pub fn transition(self) -> Transition {
        match self {
            Trigger::LeadCreated => Transition {
                status: LeadStatus::New,
                next_action: "Initial Outreach",
                offset_days: 1,
            },
            Trigger::EmailSent => Transition {
                status: LeadStatus::Contacted,
                next_action: "Follow Up",
                offset_days: 3,
            },
            Trigger::LinkedinConnectionSent => Transition {
                status: LeadStatus::ConnectionRequested,
                next_action: "Check Connection Status",
                offset_days: 5,
            },
            Trigger::LinkedinMessageSent => Transition {
                status: LeadStatus::MessageSent,
                next_action: "Check Response",
                offset_days: 7,
            },
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Trigger {
    type Err = LeadgenError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Trigger::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| LeadgenError::InvalidTransition {
                trigger: s.to_string(),
                reason: "unknown trigger".to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Transition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub status: LeadStatus,
    pub next_action: &'static str,
    pub offset_days: i64,
}

impl Transition {
    pub fn next_action_date(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        at + Duration::days(self.offset_days)
    }
}

/// Status columns written for `trigger` firing at `at`. Single track: every
/// channel writes the same `status` column.
pub fn project(trigger: Trigger, at: DateTime<Utc>) -> StatusUpdate {
    let t = trigger.transition();
    StatusUpdate {
        status: Some(t.status),
        last_contacted: trigger.is_send().then_some(at),
        next_action: Some(t.next_action.to_string()),
        next_action_date: Some(t.next_action_date(at)),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Fire a send trigger for a company. Returns the new status.
///
/// Fails with `InvalidTransition` if the company has no status row or if the
/// trigger is `lead_created` (seeding goes through `LeadStore::init_status`).
pub fn transition(
    store: &LeadStore,
    company_id: CompanyId,
    trigger: Trigger,
    at: DateTime<Utc>,
) -> Result<LeadStatus> {
    if !trigger.is_send() {
        return Err(LeadgenError::InvalidTransition {
            trigger: trigger.to_string(),
            reason: format!("company {company_id} already has a status row"),
        });
    }

    let update = project(trigger, at);
    if !store.update_status(company_id, &update)? {
        return Err(LeadgenError::InvalidTransition {
            trigger: trigger.to_string(),
            reason: format!("company {company_id} has no lead status"),
        });
    }

    let status = trigger.transition().status;
    tracing::debug!(company_id = %company_id, %trigger, %status, "lead transitioned");
    Ok(status)
}

/// Same as [`transition`] with the trigger given by name. Unknown names leave
/// the lead unchanged.
pub fn transition_named(
    store: &LeadStore,
    company_id: CompanyId,
    trigger: &str,
    at: DateTime<Utc>,
) -> Result<LeadStatus> {
    let trigger = Trigger::from_str(trigger)?;
    transition(store, company_id, trigger, at)
}

/// Update score and/or owner without touching the status.
pub fn annotate(
    store: &LeadStore,
    company_id: CompanyId,
    score: Option<i64>,
    assigned_to: Option<&str>,
) -> Result<()> {
    let update = StatusUpdate {
        score,
        assigned_to: assigned_to.map(str::to_string),
        ..Default::default()
    };
    if !store.update_status(company_id, &update)? {
        return Err(LeadgenError::InvalidTransition {
            trigger: "annotate".to_string(),
            reason: format!("company {company_id} has no lead status"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CompanyProfile;
    use crate::store::test_support::{seed_lead, store};
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 10, 14, 30, 0).unwrap()
    }

    #[test]
    fn email_sent_moves_new_to_contacted() {
        let store = store();
        let (company, _) = seed_lead(&store, "Acme", Some("a@acme.com"), None, at());
        let send = at() + Duration::hours(2);

        let status = transition(&store, company, Trigger::EmailSent, send).unwrap();
        assert_eq!(status, LeadStatus::Contacted);

        let row = store.get_status(company).unwrap().unwrap();
        assert_eq!(row.status, LeadStatus::Contacted);
        assert_eq!(row.next_action.as_deref(), Some("Follow Up"));
        assert_eq!(row.next_action_date, Some(send + Duration::days(3)));
        assert_eq!(row.last_contacted, Some(send));
    }

    #[test]
    fn linkedin_triggers_follow_table() {
        let store = store();
        let (company, _) = seed_lead(&store, "Acme", None, Some("https://linkedin.com/in/x"), at());

        transition(&store, company, Trigger::LinkedinConnectionSent, at()).unwrap();
        let row = store.get_status(company).unwrap().unwrap();
        assert_eq!(row.status, LeadStatus::ConnectionRequested);
        assert_eq!(row.next_action.as_deref(), Some("Check Connection Status"));
        assert_eq!(row.next_action_date, Some(at() + Duration::days(5)));

        transition(&store, company, Trigger::LinkedinMessageSent, at()).unwrap();
        let row = store.get_status(company).unwrap().unwrap();
        assert_eq!(row.status, LeadStatus::MessageSent);
        assert_eq!(row.next_action.as_deref(), Some("Check Response"));
        assert_eq!(row.next_action_date, Some(at() + Duration::days(7)));
    }

    #[test]
    fn same_trigger_same_result() {
        let store = store();
        let (a, _) = seed_lead(&store, "Acme", Some("a@acme.com"), None, at());
        let (b, _) = seed_lead(&store, "Bolt", Some("b@bolt.com"), None, at());
        transition(&store, a, Trigger::EmailSent, at()).unwrap();
        transition(&store, b, Trigger::EmailSent, at()).unwrap();
        transition(&store, b, Trigger::EmailSent, at()).unwrap();

        let ra = store.get_status(a).unwrap().unwrap();
        let rb = store.get_status(b).unwrap().unwrap();
        assert_eq!(ra.status, rb.status);
        assert_eq!(ra.next_action, rb.next_action);
        assert_eq!(ra.next_action_date, rb.next_action_date);
    }

    #[test]
    fn transition_without_status_row_fails_fast() {
        let store = store();
        let company = store
            .create_company(&CompanyProfile::new("Bare", None))
            .unwrap();
        let err = transition(&store, company, Trigger::EmailSent, at()).unwrap_err();
        assert!(matches!(err, LeadgenError::InvalidTransition { .. }));
        assert!(store.get_status(company).unwrap().is_none());
    }

    #[test]
    fn unknown_trigger_leaves_state() {
        let store = store();
        let (company, _) = seed_lead(&store, "Acme", Some("a@acme.com"), None, at());
        let err = transition_named(&store, company, "meeting_booked", at()).unwrap_err();
        assert!(matches!(err, LeadgenError::InvalidTransition { .. }));
        assert_eq!(
            store.get_status(company).unwrap().unwrap().status,
            LeadStatus::New
        );
    }

    #[test]
    fn lead_created_on_existing_row_is_rejected() {
        let store = store();
        let (company, _) = seed_lead(&store, "Acme", Some("a@acme.com"), None, at());
        assert!(matches!(
            transition_named(&store, company, "lead_created", at()),
            Err(LeadgenError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn annotate_keeps_status() {
        let store = store();
        let (company, _) = seed_lead(&store, "Acme", Some("a@acme.com"), None, at());
        annotate(&store, company, Some(75), Some("dana")).unwrap();
        let row = store.get_status(company).unwrap().unwrap();
        assert_eq!(row.score, 75);
        assert_eq!(row.assigned_to.as_deref(), Some("dana"));
        assert_eq!(row.status, LeadStatus::New);
    }

    #[test]
    fn trigger_for_send_derivation() {
        assert_eq!(
            Trigger::for_send(Channel::Email, TemplateType::FinalAttempt),
            Trigger::EmailSent
        );
        assert_eq!(
            Trigger::for_send(Channel::Linkedin, TemplateType::ConnectionRequest),
            Trigger::LinkedinConnectionSent
        );
        assert_eq!(
            Trigger::for_send(Channel::Linkedin, TemplateType::FollowUp),
            Trigger::LinkedinMessageSent
        );
    }

    #[test]
    fn project_sets_last_contacted_only_for_sends() {
        assert!(project(Trigger::LeadCreated, at()).last_contacted.is_none());
        assert_eq!(project(Trigger::EmailSent, at()).last_contacted, Some(at()));
    }
}
