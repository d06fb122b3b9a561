use super::*;

impl LeadStore {
    // =========================================================================
    // Campaigns
    // =========================================================================

    pub fn insert_campaign(
        &self,
        channel: Channel,
        name: &str,
        description: Option<&str>,
    ) -> Result<CampaignId> {
        let at = now();
        self.conn.execute(
            &format!(
                "INSERT INTO {} (name, description, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                channel.campaigns_table()
            ),
            params![name, description, CampaignStatus::Draft, at],
        )?;
        Ok(CampaignId(self.conn.last_insert_rowid()))
    }

    /// `Active` stamps `start_date`, `Ended` stamps `end_date`. Earlier stamps
    /// are kept.
    pub fn update_campaign_status(
        &self,
        channel: Channel,
        id: CampaignId,
        status: CampaignStatus,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let (start, end) = match status {
            CampaignStatus::Draft => (None, None),
            CampaignStatus::Active => (Some(at), None),
            CampaignStatus::Ended => (None, Some(at)),
        };
        let changed = self.conn.execute(
            &format!(
                "UPDATE {} SET
                    status = ?2,
                    start_date = COALESCE(start_date, ?3),
                    end_date = COALESCE(end_date, ?4),
                    updated_at = ?5
                 WHERE id = ?1",
                channel.campaigns_table()
            ),
            params![id, status, start, end, now()],
        )?;
        if changed == 0 {
            return Err(LeadgenError::CampaignNotFound(id.0));
        }
        Ok(())
    }

    pub fn get_campaign(&self, channel: Channel, id: CampaignId) -> Result<Campaign> {
        self.campaigns_where(channel, "c.id = ?1", params![id])?
            .into_iter()
            .next()
            .ok_or(LeadgenError::CampaignNotFound(id.0))
    }

    /// Newest first, with the number of tracking rows per campaign.
    pub fn list_campaigns(&self, channel: Channel) -> Result<Vec<Campaign>> {
        self.campaigns_where(channel, "1 = 1", params![])
    }

    fn campaigns_where(
        &self,
        channel: Channel,
        predicate: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<Campaign>> {
        let sql = format!(
            "SELECT c.id, c.name, c.description, c.status, c.start_date, c.end_date,
                    c.created_at,
                    (SELECT COUNT(*) FROM {tracking} t WHERE t.campaign_id = c.id)
             FROM {campaigns} c
             WHERE {predicate}
             ORDER BY c.id DESC",
            tracking = channel.tracking_table(),
            campaigns = channel.campaigns_table(),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(args, |row| {
            Ok(Campaign {
                id: row.get(0)?,
                channel,
                name: row.get(1)?,
                description: row.get(2)?,
                status: row.get(3)?,
                start_date: row.get(4)?,
                end_date: row.get(5)?,
                created_at: row.get(6)?,
                sends: row.get(7)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    // =========================================================================
    // Templates
    // =========================================================================

    pub fn insert_template(
        &self,
        channel: Channel,
        campaign_id: CampaignId,
        template_type: TemplateType,
        content: &TemplateContent,
    ) -> Result<TemplateId> {
        let exists: bool = self.conn.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)",
                channel.campaigns_table()
            ),
            params![campaign_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(LeadgenError::CampaignNotFound(campaign_id.0));
        }

        let at = now();
        match channel {
            Channel::Email => self.conn.execute(
                "INSERT INTO email_templates (
                    campaign_id, template_type, subject, body, created_at, updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                params![campaign_id, template_type, content.subject, content.body, at],
            )?,
            Channel::Linkedin => self.conn.execute(
                "INSERT INTO linkedin_templates (
                    campaign_id, template_type, message, created_at, updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?4)",
                params![campaign_id, template_type, content.body, at],
            )?,
        };
        Ok(TemplateId(self.conn.last_insert_rowid()))
    }

    pub fn get_template(&self, channel: Channel, id: TemplateId) -> Result<Template> {
        let sql = match channel {
            Channel::Email => {
                "SELECT id, campaign_id, template_type, subject, body
                 FROM email_templates WHERE id = ?1"
            }
            Channel::Linkedin => {
                "SELECT id, campaign_id, template_type, NULL, message
                 FROM linkedin_templates WHERE id = ?1"
            }
        };
        self.conn
            .query_row(sql, params![id], |row| {
                Ok(Template {
                    id: row.get(0)?,
                    campaign_id: row.get(1)?,
                    channel,
                    template_type: row.get(2)?,
                    content: TemplateContent {
                        subject: row.get(3)?,
                        body: row.get(4)?,
                    },
                })
            })
            .optional()?
            .ok_or(LeadgenError::TemplateNotFound(id.0))
    }

    // =========================================================================
    // Tracking
    // =========================================================================

    /// LinkedIn rows mark `connection_sent` for connection requests and
    /// `message_sent` for everything else.
    pub fn insert_tracking(
        &self,
        channel: Channel,
        contact_id: ContactId,
        template: &Template,
        at: DateTime<Utc>,
    ) -> Result<TrackingId> {
        match channel {
            Channel::Email => self.conn.execute(
                "INSERT INTO email_tracking (
                    contact_id, template_id, campaign_id, sent_date, created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![contact_id, template.id, template.campaign_id, at, now()],
            )?,
            Channel::Linkedin => {
                let column = if template.template_type == TemplateType::ConnectionRequest {
                    "connection_sent"
                } else {
                    "message_sent"
                };
                self.conn.execute(
                    &format!(
                        "INSERT INTO linkedin_tracking (
                            contact_id, template_id, campaign_id, {column}, {column}_date,
                            created_at
                         ) VALUES (?1, ?2, ?3, 1, ?4, ?5)"
                    ),
                    params![contact_id, template.id, template.campaign_id, at, now()],
                )?
            }
        };
        Ok(TrackingId(self.conn.last_insert_rowid()))
    }

    pub fn tracking_for_contact(
        &self,
        channel: Channel,
        contact_id: ContactId,
    ) -> Result<Vec<TrackingRecord>> {
        let sql = match channel {
            Channel::Email => {
                "SELECT id, contact_id, template_id, campaign_id, sent_date, replied
                 FROM email_tracking WHERE contact_id = ?1 ORDER BY id"
            }
            Channel::Linkedin => {
                "SELECT id, contact_id, template_id, campaign_id,
                        COALESCE(message_sent_date, connection_sent_date), replied
                 FROM linkedin_tracking WHERE contact_id = ?1 ORDER BY id"
            }
        };
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params![contact_id], |row| {
            Ok(TrackingRecord {
                id: row.get(0)?,
                channel,
                contact_id: row.get(1)?,
                template_id: row.get(2)?,
                campaign_id: row.get(3)?,
                sent_at: row.get(4)?,
                replied: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}
