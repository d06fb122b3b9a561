//! Pipeline snapshot: totals, status and industry breakdowns, and the
//! follow-ups coming due.

use crate::error::Result;
use crate::store::{IndustryCount, LeadStore, StatusCount, UpcomingFollowUp};
use crate::types::LeadStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub generated_at: DateTime<Utc>,
    pub window_days: i64,
    pub total_companies: i64,
    pub by_status: Vec<StatusCount>,
    pub by_industry: Vec<IndustryCount>,
    pub upcoming: Vec<UpcomingFollowUp>,
}

impl PipelineReport {
    pub fn build(store: &LeadStore, now: DateTime<Utc>, days: i64) -> Result<Self> {
        let days = days.max(0);
        Ok(Self {
            generated_at: now,
            window_days: days,
            total_companies: store.count_companies()?,
            by_status: store.counts_by_status()?,
            by_industry: store.counts_by_industry()?,
            upcoming: store.upcoming_follow_ups(days, now)?,
        })
    }

    pub fn count_for(&self, status: LeadStatus) -> i64 {
        self.by_status
            .iter()
            .filter(|s| s.status == status)
            .map(|s| s.count)
            .sum()
    }

    pub fn overdue(&self) -> impl Iterator<Item = &UpcomingFollowUp> {
        self.upcoming
            .iter()
            .filter(move |u| u.next_action_date < self.generated_at)
    }
}
