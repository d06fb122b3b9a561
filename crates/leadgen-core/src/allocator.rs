//! Daily quota allocation between follow-up and first-touch pools.
//!
//! Follow-ups are served first; first-touch leads get whatever quota remains.
//! Input order is preserved and nothing here is random.

use crate::config::EmailConfig;
use crate::model::LeadView;
use crate::types::{LeadStatus, TemplateType};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Statuses the email pass loads.
pub const EMAIL_POOL: &[LeadStatus] = &[LeadStatus::New, LeadStatus::Contacted];

/// Statuses the LinkedIn pass loads.
pub const LINKEDIN_POOL: &[LeadStatus] = &[LeadStatus::New, LeadStatus::ConnectionRequested];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation<T> {
    pub follow_ups: Vec<T>,
    pub first_touch: Vec<T>,
    /// Leads that fit no remaining quota, follow-ups before first-touch.
    pub deferred: Vec<T>,
}

impl<T> Allocation<T> {
    pub fn total(&self) -> usize {
        self.follow_ups.len() + self.first_touch.len()
    }
}

/// `follow = min(quota, |F|)`, `first = min(quota - follow, |T|)`.
pub fn allocate<T>(follow_ups: Vec<T>, first_touch: Vec<T>, quota: usize) -> Allocation<T> {
    let mut follow_ups = follow_ups;
    let mut first_touch = first_touch;

    let follow = quota.min(follow_ups.len());
    let first = (quota - follow).min(first_touch.len());

    let mut deferred = follow_ups.split_off(follow);
    deferred.extend(first_touch.split_off(first));

    Allocation {
        follow_ups,
        first_touch,
        deferred,
    }
}

/// Candidates split by outreach stage. `waiting` holds leads that are in the
/// pool but not due yet (or out of follow-ups).
#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub follow_ups: Vec<LeadView>,
    pub first_touch: Vec<LeadView>,
    pub waiting: Vec<LeadView>,
}

fn elapsed(lead: &LeadView, follow_up_days: u32, now: DateTime<Utc>) -> bool {
    lead.days_since_contact(now)
        .is_some_and(|days| days >= i64::from(follow_up_days))
}

/// Zero emails sent: first-touch. `1..=max_follow_ups` sent and
/// `follow_up_days` whole days since the last send: follow-up.
pub fn partition_email(leads: Vec<LeadView>, cfg: &EmailConfig, now: DateTime<Utc>) -> Partition {
    let mut out = Partition::default();
    for lead in leads {
        if lead.emails_sent == 0 {
            out.first_touch.push(lead);
        } else if lead.emails_sent <= cfg.max_follow_ups && elapsed(&lead, cfg.follow_up_days, now) {
            out.follow_ups.push(lead);
        } else {
            out.waiting.push(lead);
        }
    }
    out
}

/// `New`: first-touch (connection request). `ConnectionRequested` past
/// `follow_up_days`: follow-up (message).
pub fn partition_linkedin(
    leads: Vec<LeadView>,
    follow_up_days: u32,
    now: DateTime<Utc>,
) -> Partition {
    let mut out = Partition::default();
    for lead in leads {
        match lead.status {
            LeadStatus::New => out.first_touch.push(lead),
            LeadStatus::ConnectionRequested if elapsed(&lead, follow_up_days, now) => {
                out.follow_ups.push(lead)
            }
            _ => out.waiting.push(lead),
        }
    }
    out
}

/// Template for the next email to a lead that already got `emails_sent`.
pub fn follow_up_template(emails_sent: u32, max_follow_ups: u32) -> TemplateType {
    if emails_sent >= max_follow_ups {
        TemplateType::FinalAttempt
    } else {
        TemplateType::FollowUp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CompanyId;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 20, 9, 0, 0).unwrap()
    }

    fn lead(id: i64, status: LeadStatus, sent: u32, days_ago: Option<i64>) -> LeadView {
        LeadView {
            company_id: CompanyId(id),
            company_name: format!("Co {id}"),
            website: None,
            industry: None,
            contact: None,
            status,
            score: 0,
            last_contacted: days_ago.map(|d| now() - Duration::days(d)),
            next_action: None,
            next_action_date: None,
            emails_sent: sent,
        }
    }

    #[test]
    fn follow_ups_take_priority() {
        let a = allocate((0..3).collect(), (100..120).collect(), 10);
        assert_eq!(a.follow_ups, vec![0, 1, 2]);
        assert_eq!(a.first_touch, (100..107).collect::<Vec<_>>());
        assert_eq!(a.total(), 10);
        assert_eq!(a.deferred.len(), 13);
    }

    #[test]
    fn quota_conservation() {
        for quota in 0..8 {
            for f in 0..5 {
                for t in 0..5 {
                    let a = allocate(vec![(); f], vec![(); t], quota);
                    assert_eq!(a.total(), quota.min(f + t));
                    assert_eq!(a.total() + a.deferred.len(), f + t);
                    if !a.first_touch.is_empty() {
                        assert_eq!(a.follow_ups.len(), f);
                    }
                }
            }
        }
    }

    #[test]
    fn follow_ups_alone_can_exhaust_quota() {
        let a = allocate(vec!['a', 'b', 'c'], vec!['x'], 2);
        assert_eq!(a.follow_ups, vec!['a', 'b']);
        assert!(a.first_touch.is_empty());
        assert_eq!(a.deferred, vec!['c', 'x']);
    }

    #[test]
    fn email_partition_rules() {
        let cfg = EmailConfig::default();
        let leads = vec![
            lead(1, LeadStatus::New, 0, None),
            lead(2, LeadStatus::Contacted, 1, Some(3)),
            lead(3, LeadStatus::Contacted, 1, Some(2)),
            lead(4, LeadStatus::Contacted, 2, Some(10)),
            lead(5, LeadStatus::Contacted, 3, Some(10)),
            lead(6, LeadStatus::Contacted, 1, None),
        ];
        let p = partition_email(leads, &cfg, now());
        let ids = |v: &[LeadView]| v.iter().map(|l| l.company_id.0).collect::<Vec<_>>();
        assert_eq!(ids(&p.first_touch), vec![1]);
        assert_eq!(ids(&p.follow_ups), vec![2, 4]);
        assert_eq!(ids(&p.waiting), vec![3, 5, 6]);
    }

    #[test]
    fn partial_day_does_not_count() {
        let cfg = EmailConfig::default();
        let mut l = lead(1, LeadStatus::Contacted, 1, None);
        l.last_contacted = Some(now() - Duration::days(3) + Duration::minutes(1));
        let p = partition_email(vec![l], &cfg, now());
        assert!(p.follow_ups.is_empty());
    }

    #[test]
    fn final_attempt_at_max() {
        assert_eq!(follow_up_template(2, 2), TemplateType::FinalAttempt);
        assert_eq!(follow_up_template(1, 2), TemplateType::FollowUp);
    }

    #[test]
    fn contacted_lead_at_max_gets_final_attempt() {
        let cfg = EmailConfig::default();
        let p = partition_email(
            vec![lead(9, LeadStatus::Contacted, 2, Some(3))],
            &cfg,
            now(),
        );
        assert_eq!(p.follow_ups.len(), 1);
        assert_eq!(
            follow_up_template(p.follow_ups[0].emails_sent, cfg.max_follow_ups),
            TemplateType::FinalAttempt
        );
    }

    #[test]
    fn linkedin_partition_rules() {
        let leads = vec![
            lead(1, LeadStatus::New, 0, None),
            lead(2, LeadStatus::ConnectionRequested, 0, Some(4)),
            lead(3, LeadStatus::ConnectionRequested, 0, Some(1)),
        ];
        let p = partition_linkedin(leads, 3, now());
        assert_eq!(p.first_touch.len(), 1);
        assert_eq!(p.follow_ups[0].company_id, CompanyId(2));
        assert_eq!(p.waiting[0].company_id, CompanyId(3));
    }
}
