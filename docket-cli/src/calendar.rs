use docket::DataMapper;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    models::{AppKey, Event, EventPayload, Period},
    timestamp::parse_millis,
};

pub type Result<T> = std::result::Result<T, CalendarError>;

#[derive(Error, Debug)]
pub enum CalendarError {
    /// The app key is empty or was never issued.
    #[error("invalid app key")]
    Forbidden,

    #[error("event `{0}` not found")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Mapper(#[from] docket::Error),
}

impl CalendarError {
    /// The HTTP status code equivalent of this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Forbidden => 403,
            Self::NotFound(_) => 404,
            Self::BadRequest(_) => 400,
            Self::Mapper(_) => 500,
        }
    }
}

/// Template errors are the caller's fault, everything else from the mapper is ours.
fn reject_template(error: docket::Error) -> CalendarError {
    if error.is_template_error() {
        CalendarError::BadRequest(error.to_string())
    } else {
        CalendarError::Mapper(error)
    }
}

fn required_time(value: Option<&str>, name: &str) -> Result<i64> {
    let value = value.ok_or_else(|| CalendarError::BadRequest(format!("missing {name}")))?;

    parse_millis(value)
        .ok_or_else(|| CalendarError::BadRequest(format!("invalid {name} \"{value}\"")))
}

fn optional_time(value: Option<&str>, name: &str) -> Result<Option<i64>> {
    value.map(|e| required_time(Some(e), name)).transpose()
}

/// Calendar events, every one of them scoped to the application key it was created with.
#[derive(Debug, Clone)]
pub struct Calendar {
    mapper: DataMapper,
}

impl Calendar {
    #[must_use]
    pub const fn new(mapper: DataMapper) -> Self {
        Self { mapper }
    }

    /// Issue a new application key.
    ///
    /// # Errors
    ///
    /// If the key cannot be stored.
    pub async fn generate_key(&self) -> Result<String> {
        let key = Uuid::new_v4().to_string();

        self.mapper.insert(&AppKey::new(key.clone())).await?;

        info!("Issued app key {key}");
        Ok(key)
    }

    /// Succeed if `key` is a known application key.
    ///
    /// # Errors
    ///
    /// With [`CalendarError::Forbidden`] if the key is empty or unknown.
    pub async fn validate_key(&self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(CalendarError::Forbidden);
        }

        if self.mapper.select(&AppKey::new(key)).await?.is_empty() {
            return Err(CalendarError::Forbidden);
        }

        Ok(())
    }

    /// List all events of `key`, optionally only those starting after `period.start_time` and
    /// ending before `period.end_time`. Unparseable bounds are ignored.
    ///
    /// # Errors
    ///
    /// If the key is invalid or the store fails.
    pub async fn list_events(&self, key: &str, period: &Period) -> Result<Vec<EventPayload>> {
        self.validate_key(key).await?;

        let bound = |value: Option<&String>, name: &str| {
            value.filter(|e| !e.is_empty()).and_then(|e| {
                let parsed = parse_millis(e);
                if parsed.is_none() {
                    warn!("Ignoring unparseable {name} \"{e}\"");
                }
                parsed
            })
        };

        let after = bound(period.start_time.as_ref(), "start time");
        let before = bound(period.end_time.as_ref(), "end time");

        let events = self.mapper.select(&Event::owned_by(key)).await?;

        Ok(events
            .iter()
            .filter(|e| after.is_none_or(|after| e.start_time.is_some_and(|s| s > after)))
            .filter(|e| before.is_none_or(|before| e.end_time.is_some_and(|s| s < before)))
            .map(EventPayload::from)
            .collect())
    }

    /// Fetch a single event of `key`.
    ///
    /// # Errors
    ///
    /// If the key is invalid, the event does not exist under this key, or the store fails.
    pub async fn get_event(&self, key: &str, event_id: &str) -> Result<EventPayload> {
        self.validate_key(key).await?;

        self.find(key, event_id).await.map(|e| EventPayload::from(&e))
    }

    /// Create a new event under `key`, returning its generated id.
    ///
    /// # Errors
    ///
    /// With [`CalendarError::BadRequest`] if a field is missing or a time is unparseable, or if
    /// the key is invalid or the store fails.
    pub async fn create_event(&self, key: &str, payload: &EventPayload) -> Result<String> {
        self.validate_key(key).await?;

        let event_id = format!("event-{}", Uuid::new_v4());

        let event = Event {
            event_id: Some(event_id.clone()),
            title: payload.title.clone(),
            start_time: Some(required_time(payload.start_time.as_deref(), "start time")?),
            end_time: Some(required_time(payload.end_time.as_deref(), "end time")?),
            description: payload.description.clone(),
            app_key: Some(key.to_owned()),
        };

        self.mapper.insert(&event).await.map_err(reject_template)?;

        info!("Created event {event_id}");
        Ok(event_id)
    }

    /// Overwrite the fields of an existing event that are set in `payload`.
    ///
    /// # Errors
    ///
    /// If the key is invalid, the event does not exist under this key, a time is unparseable,
    /// nothing would change, or the store fails.
    pub async fn update_event(
        &self,
        key: &str,
        event_id: &str,
        payload: &EventPayload,
    ) -> Result<()> {
        self.validate_key(key).await?;
        self.find(key, event_id).await?;

        let changes = Event {
            event_id: Some(event_id.to_owned()),
            title: payload.title.clone(),
            start_time: optional_time(payload.start_time.as_deref(), "start time")?,
            end_time: optional_time(payload.end_time.as_deref(), "end time")?,
            description: payload.description.clone(),
            app_key: None,
        };

        self.mapper.update(&changes).await.map_err(reject_template)?;

        info!("Updated event {event_id}");
        Ok(())
    }

    /// Delete an existing event of `key`.
    ///
    /// # Errors
    ///
    /// If the key is invalid, the event does not exist under this key, or the store fails.
    pub async fn delete_event(&self, key: &str, event_id: &str) -> Result<()> {
        self.validate_key(key).await?;
        let event = self.find(key, event_id).await?;

        self.mapper.delete(&event).await?;

        info!("Deleted event {event_id}");
        Ok(())
    }

    async fn find(&self, key: &str, event_id: &str) -> Result<Event> {
        self.mapper
            .select(&Event::scoped(event_id, key))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CalendarError::NotFound(event_id.to_owned()))
    }
}
