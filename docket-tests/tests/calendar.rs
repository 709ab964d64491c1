use docket_cli::{
    SCHEMA,
    calendar::{Calendar, CalendarError},
    models::{EventPayload, Period},
};
use docket_tests::TestDatabase;

async fn calendar() -> (TestDatabase, Calendar) {
    let database = TestDatabase::new(&[SCHEMA]).await;
    let calendar = Calendar::new(database.mapper());
    (database, calendar)
}

fn payload(title: &str, start: &str, end: &str) -> EventPayload {
    EventPayload {
        event_id: None,
        title: Some(title.to_owned()),
        start_time: Some(start.to_owned()),
        end_time: Some(end.to_owned()),
        description: Some("planning".to_owned()),
    }
}

#[tokio::test]
async fn test_generated_keys_validate() {
    let (_database, calendar) = calendar().await;

    let key = calendar.generate_key().await.expect("key is stored");

    assert!(calendar.validate_key(&key).await.is_ok());
    assert!(matches!(
        calendar.validate_key("").await,
        Err(CalendarError::Forbidden)
    ));
    assert!(matches!(
        calendar.validate_key("never-issued").await,
        Err(CalendarError::Forbidden)
    ));
}

#[tokio::test]
async fn test_unknown_key_is_forbidden() {
    let (_database, calendar) = calendar().await;

    let result = calendar
        .create_event(
            "never-issued",
            &payload("Review", "2024-05-01 09:00:00", "2024-05-01 10:00:00"),
        )
        .await;
    assert!(matches!(result, Err(e) if e.status_code() == 403));

    let result = calendar.list_events("", &Period::default()).await;
    assert!(matches!(result, Err(CalendarError::Forbidden)));
}

#[tokio::test]
async fn test_create_list_and_get() {
    let (_database, calendar) = calendar().await;
    let key = calendar.generate_key().await.expect("key is stored");

    let event_id = calendar
        .create_event(
            &key,
            &payload("Review", "2024-05-01T09:00:00Z", "2024-05-01 10:00:00"),
        )
        .await
        .expect("event is created");
    assert!(event_id.starts_with("event-"));

    let expected = EventPayload {
        event_id: Some(event_id.clone()),
        title: Some("Review".to_owned()),
        start_time: Some("2024-05-01 09:00:00".to_owned()),
        end_time: Some("2024-05-01 10:00:00".to_owned()),
        description: Some("planning".to_owned()),
    };

    let listed = calendar
        .list_events(&key, &Period::default())
        .await
        .expect("events are listed");
    assert_eq!(listed, [expected.clone()]);

    let fetched = calendar
        .get_event(&key, &event_id)
        .await
        .expect("event is found");
    assert_eq!(fetched, expected);
}

#[tokio::test]
async fn test_events_are_scoped_to_their_key() {
    let (_database, calendar) = calendar().await;
    let owner = calendar.generate_key().await.expect("key is stored");
    let other = calendar.generate_key().await.expect("key is stored");

    let event_id = calendar
        .create_event(
            &owner,
            &payload("Review", "2024-05-01 09:00:00", "2024-05-01 10:00:00"),
        )
        .await
        .expect("event is created");

    assert!(
        calendar
            .list_events(&other, &Period::default())
            .await
            .expect("events are listed")
            .is_empty()
    );
    assert!(matches!(
        calendar.get_event(&other, &event_id).await,
        Err(CalendarError::NotFound(e)) if e == event_id
    ));
    assert!(matches!(
        calendar.delete_event(&other, &event_id).await,
        Err(CalendarError::NotFound(_))
    ));
    assert!(calendar.get_event(&owner, &event_id).await.is_ok());
}

#[tokio::test]
async fn test_create_rejects_incomplete_payloads() {
    let (database, calendar) = calendar().await;
    let key = calendar.generate_key().await.expect("key is stored");

    let result = calendar
        .create_event(
            &key,
            &EventPayload {
                start_time: None,
                ..payload("Review", "", "2024-05-01 10:00:00")
            },
        )
        .await;
    assert!(matches!(result, Err(CalendarError::BadRequest(_))));

    let result = calendar
        .create_event(
            &key,
            &payload("Review", "next tuesday", "2024-05-01 10:00:00"),
        )
        .await;
    assert!(matches!(result, Err(CalendarError::BadRequest(_))));

    let result = calendar
        .create_event(
            &key,
            &EventPayload {
                title: None,
                ..payload("", "2024-05-01 09:00:00", "2024-05-01 10:00:00")
            },
        )
        .await;
    assert!(matches!(result, Err(e) if e.status_code() == 400));

    assert_eq!(database.count::<docket_cli::models::Event>().await, 0);
}

#[tokio::test]
async fn test_list_filters_by_period() {
    let (_database, calendar) = calendar().await;
    let key = calendar.generate_key().await.expect("key is stored");

    for (title, start, end) in [
        ("early", "2024-05-01 08:00:00", "2024-05-01 09:00:00"),
        ("middle", "2024-05-02 08:00:00", "2024-05-02 09:00:00"),
        ("late", "2024-05-03 08:00:00", "2024-05-03 09:00:00"),
    ] {
        calendar
            .create_event(&key, &payload(title, start, end))
            .await
            .expect("event is created");
    }

    let titles = |events: Vec<EventPayload>| {
        let mut titles = events
            .into_iter()
            .filter_map(|e| e.title)
            .collect::<Vec<_>>();
        titles.sort();
        titles
    };

    let period = Period {
        start_time: Some("2024-05-01 08:00:00".to_owned()),
        end_time: Some("2024-05-03 09:00:00".to_owned()),
    };
    let listed = calendar
        .list_events(&key, &period)
        .await
        .expect("events are listed");
    assert_eq!(titles(listed), ["middle"]);

    let period = Period {
        start_time: Some("2024-05-01 12:00:00".to_owned()),
        end_time: None,
    };
    let listed = calendar
        .list_events(&key, &period)
        .await
        .expect("events are listed");
    assert_eq!(titles(listed), ["late", "middle"]);

    let period = Period {
        start_time: Some("whenever".to_owned()),
        end_time: Some(String::new()),
    };
    let listed = calendar
        .list_events(&key, &period)
        .await
        .expect("events are listed");
    assert_eq!(titles(listed), ["early", "late", "middle"]);
}

#[tokio::test]
async fn test_update_only_touches_supplied_fields() {
    let (_database, calendar) = calendar().await;
    let key = calendar.generate_key().await.expect("key is stored");
    let event_id = calendar
        .create_event(
            &key,
            &payload("Review", "2024-05-01 09:00:00", "2024-05-01 10:00:00"),
        )
        .await
        .expect("event is created");

    calendar
        .update_event(
            &key,
            &event_id,
            &EventPayload {
                title: Some("Retro".to_owned()),
                ..Default::default()
            },
        )
        .await
        .expect("event is updated");

    let fetched = calendar
        .get_event(&key, &event_id)
        .await
        .expect("event is found");
    assert_eq!(fetched.title.as_deref(), Some("Retro"));
    assert_eq!(fetched.start_time.as_deref(), Some("2024-05-01 09:00:00"));
    assert_eq!(fetched.description.as_deref(), Some("planning"));

    let result = calendar
        .update_event(&key, &event_id, &EventPayload::default())
        .await;
    assert!(matches!(result, Err(CalendarError::BadRequest(_))));

    let result = calendar
        .update_event(&key, "event-missing", &EventPayload::default())
        .await;
    assert!(matches!(result, Err(CalendarError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_then_not_found() {
    let (database, calendar) = calendar().await;
    let key = calendar.generate_key().await.expect("key is stored");
    let event_id = calendar
        .create_event(
            &key,
            &payload("Review", "2024-05-01 09:00:00", "2024-05-01 10:00:00"),
        )
        .await
        .expect("event is created");

    calendar
        .delete_event(&key, &event_id)
        .await
        .expect("event is deleted");

    assert!(matches!(
        calendar.get_event(&key, &event_id).await,
        Err(CalendarError::NotFound(_))
    ));
    assert_eq!(database.count::<docket_cli::models::Event>().await, 0);
}
