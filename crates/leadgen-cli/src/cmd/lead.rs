use super::open_project;
use crate::output::{cell, date_cell, print_json, print_table};
use anyhow::Context;
use chrono::Utc;
use clap::Subcommand;
use leadgen_core::{
    lifecycle,
    model::LeadView,
    types::{Channel, CompanyId, ContactField, LeadStatus},
};
use std::path::Path;
use std::str::FromStr;

#[derive(Subcommand)]
pub enum LeadSubcommand {
    /// List leads, optionally filtered by status, tag, or reachable channel
    List {
        /// Status to include (repeatable); all statuses when omitted
        #[arg(long = "status")]
        statuses: Vec<String>,
        /// Only leads carrying this tag
        #[arg(long)]
        tag: Option<String>,
        /// Only leads with a contact reachable on this channel: email or linkedin
        #[arg(long)]
        channel: Option<String>,
    },
    /// Show a lead with its contacts, tags, and interaction history
    Show { id: i64 },
    /// Attach a tag to a lead's company
    Tag {
        id: i64,
        tag: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Set the owner and/or score of a lead
    Assign {
        id: i64,
        /// Owner name
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        score: Option<i64>,
    },
    /// Apply a lifecycle trigger by name (e.g. email_sent)
    Transition { id: i64, trigger: String },
}

pub fn run(root: &Path, subcmd: LeadSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        LeadSubcommand::List {
            statuses,
            tag,
            channel,
        } => list(root, &statuses, tag.as_deref(), channel.as_deref(), json),
        LeadSubcommand::Show { id } => show(root, CompanyId(id), json),
        LeadSubcommand::Tag {
            id,
            tag,
            description,
        } => tag_lead(root, CompanyId(id), &tag, description.as_deref(), json),
        LeadSubcommand::Assign { id, to, score } => {
            assign(root, CompanyId(id), to.as_deref(), score, json)
        }
        LeadSubcommand::Transition { id, trigger } => {
            transition(root, CompanyId(id), &trigger, json)
        }
    }
}

fn list(
    root: &Path,
    statuses: &[String],
    tag: Option<&str>,
    channel: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let (_, store) = open_project(root)?;

    let statuses: Vec<LeadStatus> = if statuses.is_empty() {
        LeadStatus::all().to_vec()
    } else {
        statuses
            .iter()
            .map(|s| LeadStatus::from_str(s))
            .collect::<Result<_, _>>()?
    };
    let require = channel
        .map(Channel::from_str)
        .transpose()?
        .map(ContactField::for_channel);

    let mut leads = store
        .query_by_status(&statuses, require)
        .context("failed to query leads")?;
    if let Some(tag) = tag {
        let tagged = store.companies_by_tag(tag)?;
        leads.retain(|l| tagged.contains(&l.company_id));
    }

    if json {
        return print_json(&leads);
    }
    if leads.is_empty() {
        println!("No leads.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = leads.iter().map(lead_row).collect();
    print_table(
        &["ID", "COMPANY", "STATUS", "CONTACT", "EMAILS", "LAST_CONTACT", "NEXT_ACTION"],
        rows,
    );
    Ok(())
}

fn lead_row(l: &LeadView) -> Vec<String> {
    let contact = l
        .contact
        .as_ref()
        .and_then(|c| c.info.full_name().or_else(|| c.info.email.clone()));
    vec![
        l.company_id.to_string(),
        l.company_name.clone(),
        l.status.to_string(),
        cell(contact.as_deref()),
        l.emails_sent.to_string(),
        date_cell(l.last_contacted),
        match (&l.next_action, l.next_action_date) {
            (Some(action), Some(at)) => format!("{action} ({})", at.format("%Y-%m-%d")),
            (Some(action), None) => action.clone(),
            _ => "-".to_string(),
        },
    ]
}

fn show(root: &Path, id: CompanyId, json: bool) -> anyhow::Result<()> {
    let (_, store) = open_project(root)?;
    let lead = store
        .get_lead(id)
        .with_context(|| format!("lead {id} not found"))?;
    let company = store.get_company(id)?;
    let contacts = store.contacts_for_company(id)?;
    let tags = store.tags_for_company(id)?;
    let history = store.interactions_for_company(id)?;
    let status = store.get_status(id)?;

    if json {
        return print_json(&serde_json::json!({
            "company": company,
            "status": status,
            "emails_sent": lead.emails_sent,
            "contacts": contacts,
            "tags": tags,
            "interactions": history,
        }));
    }

    let p = &company.profile;
    println!("{} [{}]", p.company_name, lead.status);
    println!("  id:          {}", company.id);
    println!("  website:     {}", cell(p.website.as_deref()));
    println!("  industry:    {}", cell(p.industry.as_deref()));
    println!("  emails sent: {}", lead.emails_sent);
    if let Some(s) = &status {
        println!("  score:       {}", s.score);
        println!("  assigned to: {}", cell(s.assigned_to.as_deref()));
        println!(
            "  next action: {} {}",
            cell(s.next_action.as_deref()),
            date_cell(s.next_action_date)
        );
    }
    if !tags.is_empty() {
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        println!("  tags:        {}", names.join(", "));
    }

    if !contacts.is_empty() {
        println!("\nContacts:");
        let rows = contacts
            .iter()
            .map(|c| {
                vec![
                    c.id.to_string(),
                    cell(c.info.full_name().as_deref()),
                    cell(c.info.position.as_deref()),
                    cell(c.info.email.as_deref()),
                    cell(c.info.linkedin_url.as_deref()),
                ]
            })
            .collect();
        print_table(&["ID", "NAME", "POSITION", "EMAIL", "LINKEDIN"], rows);
    }

    if !history.is_empty() {
        println!("\nInteractions:");
        let rows = history
            .iter()
            .map(|i| {
                vec![
                    i.interaction_date.format("%Y-%m-%d %H:%M").to_string(),
                    i.channel.to_string(),
                    i.interaction_type.to_string(),
                    cell(i.notes.as_deref()),
                ]
            })
            .collect();
        print_table(&["DATE", "CHANNEL", "TYPE", "NOTES"], rows);
    }
    Ok(())
}

fn tag_lead(
    root: &Path,
    id: CompanyId,
    tag: &str,
    description: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let (_, store) = open_project(root)?;
    let tag_id = store.add_tag(tag, description)?;
    let added = store
        .tag_company(id, tag_id)
        .with_context(|| format!("failed to tag lead {id}"))?;

    if json {
        print_json(&serde_json::json!({
            "company_id": id,
            "tag": tag,
            "added": added,
        }))?;
    } else if added {
        println!("Tagged lead {id} with '{tag}'.");
    } else {
        println!("Lead {id} already tagged '{tag}'.");
    }
    Ok(())
}

fn assign(
    root: &Path,
    id: CompanyId,
    to: Option<&str>,
    score: Option<i64>,
    json: bool,
) -> anyhow::Result<()> {
    if to.is_none() && score.is_none() {
        anyhow::bail!("nothing to update: pass --to and/or --score");
    }
    let (_, store) = open_project(root)?;
    lifecycle::annotate(&store, id, score, to)
        .with_context(|| format!("failed to update lead {id}"))?;

    if json {
        let status = store.get_status(id)?;
        print_json(&status)?;
    } else {
        println!("Updated lead {id}.");
    }
    Ok(())
}

fn transition(root: &Path, id: CompanyId, trigger: &str, json: bool) -> anyhow::Result<()> {
    let (_, store) = open_project(root)?;
    let status = lifecycle::transition_named(&store, id, trigger, Utc::now())
        .with_context(|| format!("failed to apply '{trigger}' to lead {id}"))?;

    if json {
        print_json(&serde_json::json!({
            "company_id": id,
            "trigger": trigger,
            "status": status,
        }))?;
    } else {
        println!("Lead {id} is now {status}.");
    }
    Ok(())
}
