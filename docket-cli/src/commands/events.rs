use clap::{Args, Subcommand};
use docket_cli::{
    calendar::Calendar,
    models::{EventPayload, Period},
};
use eyre::Context;
use serde_json::json;

use super::print_json;

#[derive(Args, Debug)]
pub struct AppKeyArg {
    /// The application key the events belong to.
    #[arg(short, long, value_name = "APP_KEY")]
    key: String,
}

#[derive(Args, Debug)]
pub struct EventFields {
    #[arg(long)]
    title: Option<String>,

    /// RFC 3339, or `YYYY-MM-DD HH:MM:SS` in UTC.
    #[arg(long, value_name = "TIME")]
    start: Option<String>,

    /// RFC 3339, or `YYYY-MM-DD HH:MM:SS` in UTC.
    #[arg(long, value_name = "TIME")]
    end: Option<String>,

    #[arg(long)]
    description: Option<String>,
}

impl EventFields {
    fn into_payload(self) -> EventPayload {
        EventPayload {
            event_id: None,
            title: self.title,
            start_time: self.start,
            end_time: self.end,
            description: self.description,
        }
    }
}

/// Work with the events of an application key
#[derive(Subcommand, Debug)]
pub enum Events {
    /// List events, optionally only those within a period
    List {
        #[command(flatten)]
        key: AppKeyArg,

        /// Only events starting after this time.
        #[arg(long, value_name = "TIME")]
        after: Option<String>,

        /// Only events ending before this time.
        #[arg(long, value_name = "TIME")]
        before: Option<String>,
    },
    /// Show a single event
    Get {
        #[command(flatten)]
        key: AppKeyArg,
        id: String,
    },
    /// Create an event, printing its id
    Create {
        #[command(flatten)]
        key: AppKeyArg,
        #[command(flatten)]
        fields: EventFields,
    },
    /// Change the given fields of an event
    Update {
        #[command(flatten)]
        key: AppKeyArg,
        id: String,
        #[command(flatten)]
        fields: EventFields,
    },
    /// Delete an event
    Delete {
        #[command(flatten)]
        key: AppKeyArg,
        id: String,
    },
}

impl Events {
    pub async fn run(self, calendar: &Calendar) -> eyre::Result<()> {
        match self {
            Self::List { key, after, before } => {
                let period = Period {
                    start_time: after,
                    end_time: before,
                };

                let events = calendar
                    .list_events(&key.key, &period)
                    .await
                    .context("Failed to list events")?;

                print_json(&events)
            }
            Self::Get { key, id } => {
                let event = calendar
                    .get_event(&key.key, &id)
                    .await
                    .with_context(|| format!("Failed to fetch event {id}"))?;

                print_json(&event)
            }
            Self::Create { key, fields } => {
                let event_id = calendar
                    .create_event(&key.key, &fields.into_payload())
                    .await
                    .context("Failed to create event")?;

                print_json(&json!({ "eventId": event_id }))
            }
            Self::Update { key, id, fields } => calendar
                .update_event(&key.key, &id, &fields.into_payload())
                .await
                .with_context(|| format!("Failed to update event {id}")),
            Self::Delete { key, id } => calendar
                .delete_event(&key.key, &id)
                .await
                .with_context(|| format!("Failed to delete event {id}")),
        }
    }
}
