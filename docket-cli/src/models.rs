use docket::Entity;
use serde::{Deserialize, Serialize};

use crate::timestamp::format_millis;

/// An issued application key. Its only column is its primary key.
#[derive(Entity, Default, Debug, Clone, PartialEq, Eq)]
#[docket(table = "AppIds")]
pub struct AppKey {
    #[docket(primary_key)]
    pub app_key: Option<String>,
}

impl AppKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            app_key: Some(key.into()),
        }
    }
}

/// A calendar event, owned by the application key in `app_key`. Times are unix milliseconds.
#[derive(Entity, Default, Debug, Clone, PartialEq, Eq)]
#[docket(table = "Events")]
pub struct Event {
    #[docket(primary_key)]
    pub event_id: Option<String>,
    pub title: Option<String>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub description: Option<String>,
    pub app_key: Option<String>,
}

impl Event {
    /// A template matching every event of `app_key`.
    pub fn owned_by(app_key: impl Into<String>) -> Self {
        Self {
            app_key: Some(app_key.into()),
            ..Default::default()
        }
    }

    /// A template matching the event `event_id`, but only if it belongs to `app_key`.
    pub fn scoped(event_id: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            event_id: Some(event_id.into()),
            app_key: Some(app_key.into()),
            ..Default::default()
        }
    }
}

/// The outward shape of an event, with human readable timestamps.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    pub title: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub description: Option<String>,
}

impl From<&Event> for EventPayload {
    fn from(value: &Event) -> Self {
        Self {
            event_id: value.event_id.clone(),
            title: value.title.clone(),
            start_time: value.start_time.and_then(format_millis),
            end_time: value.end_time.and_then(format_millis),
            description: value.description.clone(),
        }
    }
}

/// Optional bounds when listing events.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}
