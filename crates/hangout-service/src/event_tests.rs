use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use hangout_core::model::{
    AvailabilityBlock, ClockTime, Coordinates, DayAvailability, EventId, Phase, TimePair,
    UserAvailability, UserId, UserLocation, UserVotes, VoteOptions,
};
use hangout_core::util::short_id::EVENT_ID_LEN;
use hangout_db::store::EventStore;

use crate::coordinator::WaitPolicy;
use crate::error::ErrorKind;
use crate::event::{
    PopulateEventRequest, availability_info, build_details, create_event, populate_event,
    put_availability, put_votes, vote_options,
};
use crate::runtime::CoordinatorRuntime;
use crate::testing::{
    CHANNEL, CREATOR, GUILD, Harness, RecordingNotifier, StaticPlaces, frontend, future_day,
    location, partial_event, populated_event, scheduler_config,
};

fn request(earliest: DateTime<Utc>, latest: DateTime<Utc>) -> PopulateEventRequest {
    PopulateEventRequest {
        title: "  Board games ".to_owned(),
        description: "Bring snacks".to_owned(),
        earliest_date: earliest,
        latest_date: latest,
        start_time_hour: 17,
        start_time_minute: 0,
        end_time_hour: 22,
        end_time_minute: 30,
        location_category: "cafe".to_owned(),
        timezone: None,
    }
}

fn harness() -> Harness {
    Harness::new(RecordingNotifier::new(), StaticPlaces::default())
}

fn one_day(date_offset: i64, block: AvailabilityBlock) -> UserAvailability {
    UserAvailability {
        days: vec![DayAvailability {
            date: future_day(date_offset).date_naive(),
            available_blocks: vec![block],
        }],
    }
}

#[test_log::test(tokio::test)]
async fn test_create_event_issues_short_id_and_setup_link() {
    let harness = harness();

    let created = create_event(
        harness.store.as_ref(),
        &frontend(),
        UserId::from(CREATOR),
        GUILD.to_owned(),
        CHANNEL.to_owned(),
    )
    .await
    .unwrap();

    assert_eq!(created.event_id.as_str().len(), EVENT_ID_LEN);
    assert_eq!(
        created.setup_url,
        format!("https://hangouts.test/new/{}", created.event_id)
    );
    let stored = harness.store.get_event(&created.event_id).await.unwrap();
    assert!(!stored.is_populated());
    assert_eq!(stored.phase, Phase::Scheduling);
    assert_eq!(stored.channel_id, CHANNEL);
}

#[test_log::test(tokio::test)]
async fn test_create_event_rejects_malformed_identifiers() {
    let harness = harness();

    let err = create_event(
        harness.store.as_ref(),
        &frontend(),
        UserId::from(CREATOR),
        "guild 1".to_owned(),
        CHANNEL.to_owned(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(harness.store.list_all_events().await.unwrap().is_empty());
}

#[test]
fn test_build_details_normalizes_request() {
    let now = Utc::now();
    let earliest = future_day(4);

    let details = build_details(now, &scheduler_config(), request(earliest, future_day(6))).unwrap();

    assert_eq!(details.title, "Board games");
    assert_eq!(details.daily_start, ClockTime::new(17, 0));
    assert_eq!(details.daily_end, ClockTime::new(22, 30));
    assert_eq!(details.timezone, chrono_tz::Tz::UTC);
    assert_eq!(details.switch_to_voting_at, now + (earliest - now) / 2);
}

#[test]
fn test_build_details_accepts_named_timezone() {
    let mut req = request(future_day(4), future_day(6));
    req.timezone = Some("America/New_York".to_owned());

    let details = build_details(Utc::now(), &scheduler_config(), req).unwrap();

    assert_eq!(details.timezone, chrono_tz::America::New_York);
}

#[test]
fn test_build_details_rejections() {
    let now = Utc::now();
    let config = scheduler_config();
    let cases: [(&str, fn(&mut PopulateEventRequest)); 7] = [
        ("blank title", |req| req.title = "   ".to_owned()),
        ("reversed range", |req| {
            req.latest_date = req.earliest_date - TimeDelta::days(1);
        }),
        ("past start", |req| {
            req.earliest_date = Utc::now() - TimeDelta::hours(1);
        }),
        ("empty daily window", |req| {
            req.end_time_hour = 17;
            req.end_time_minute = 0;
        }),
        ("hour out of range", |req| req.end_time_hour = 25),
        ("unknown timezone", |req| {
            req.timezone = Some("Mars/Olympus".to_owned());
        }),
        ("too many days", |req| {
            req.latest_date = req.earliest_date + TimeDelta::days(40);
        }),
    ];

    for (name, mutate) in cases {
        let mut req = request(future_day(4), future_day(6));
        mutate(&mut req);
        let err = build_details(now, &config, req).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "{name}");
    }
}

#[test_log::test(tokio::test)]
async fn test_populate_event_once_by_creator() {
    let harness = harness();
    harness.seed(&partial_event("pop01")).await;
    harness.seed(&partial_event("pop02")).await;
    let runtime = CoordinatorRuntime::new(harness.context(WaitPolicy::Deadline, "node-a"));
    let config = scheduler_config();
    let id = EventId::from("pop01");

    let details = populate_event(
        &runtime,
        &config,
        &id,
        &UserId::from(CREATOR),
        request(future_day(4), future_day(6)),
    )
    .await
    .unwrap();
    assert!(runtime.is_running(&id).await);
    let stored = harness.store.get_event(&id).await.unwrap();
    assert_eq!(stored.details.as_ref(), Some(&details));

    let again = populate_event(
        &runtime,
        &config,
        &id,
        &UserId::from(CREATOR),
        request(future_day(4), future_day(6)),
    )
    .await
    .unwrap_err();
    assert_eq!(again.kind(), ErrorKind::DuplicateId);

    let stranger = populate_event(
        &runtime,
        &config,
        &EventId::from("pop02"),
        &UserId::from("stranger"),
        request(future_day(4), future_day(6)),
    )
    .await
    .unwrap_err();
    assert_eq!(stranger.kind(), ErrorKind::Forbidden);

    let missing = populate_event(
        &runtime,
        &config,
        &EventId::from("nope1"),
        &UserId::from(CREATOR),
        request(future_day(4), future_day(6)),
    )
    .await
    .unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);

    runtime.shutdown().await;
    assert_eq!(harness.notifier.messages().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_put_availability_validates_input() {
    let harness = harness();
    harness
        .seed(&populated_event("av001", future_day(2), future_day(3)))
        .await;
    harness.seed(&partial_event("av002")).await;
    let store = harness.store.as_ref();
    let id = EventId::from("av001");
    let user = UserId::from("alice");
    let evening = AvailabilityBlock::new(18, 0, 20, 0);
    let home = UserLocation {
        coordinates: Coordinates::new(34.0, -81.0),
        address: "1 Main St".to_owned(),
    };

    put_availability(store, &id, &user, one_day(2, evening), Some(home.clone()))
        .await
        .unwrap();
    let stored = store.get_event(&id).await.unwrap();
    assert_eq!(stored.user_availability[&user], one_day(2, evening));
    assert_eq!(stored.user_locations[&user], home);

    put_availability(store, &id, &user, one_day(3, evening), None)
        .await
        .unwrap();
    let stored = store.get_event(&id).await.unwrap();
    assert_eq!(stored.user_availability[&user], one_day(3, evening));
    assert!(!stored.user_locations.contains_key(&user));

    let outside = put_availability(store, &id, &user, one_day(5, evening), None).await;
    let backwards = put_availability(
        store,
        &id,
        &user,
        one_day(2, AvailabilityBlock::new(20, 0, 18, 0)),
        None,
    )
    .await;
    let off_globe = put_availability(
        store,
        &id,
        &user,
        one_day(2, evening),
        Some(UserLocation {
            coordinates: Coordinates::new(100.0, 0.0),
            address: String::new(),
        }),
    )
    .await;
    let unpopulated =
        put_availability(store, &EventId::from("av002"), &user, one_day(2, evening), None).await;
    for result in [outside, backwards, off_globe, unpopulated] {
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Validation);
    }

    let missing =
        put_availability(store, &EventId::from("nope1"), &user, one_day(2, evening), None).await;
    assert_eq!(missing.unwrap_err().kind(), ErrorKind::NotFound);
}

#[test_log::test(tokio::test)]
async fn test_put_votes_follows_phase_and_option_counts() {
    let harness = harness();
    let mut event = populated_event("vote1", future_day(2), future_day(3));
    harness.seed(&event).await;
    let store = harness.store.as_ref();
    let id = EventId::from("vote1");
    let user = UserId::from("alice");
    let ballot = UserVotes {
        location_votes: vec![1],
        time_votes: vec![0, 2],
    };

    let early = put_votes(store, &id, &user, ballot.clone()).await.unwrap_err();
    assert_eq!(early.kind(), ErrorKind::Validation);

    let start = future_day(2) + TimeDelta::hours(18);
    event.vote_options = VoteOptions {
        locations: vec![location("Cafe")],
        times: vec![
            TimePair {
                start,
                end: start + TimeDelta::hours(1),
                available: Vec::new(),
            },
            TimePair {
                start: start + TimeDelta::hours(2),
                end: start + TimeDelta::hours(3),
                available: Vec::new(),
            },
        ],
    };
    store.replace_vote_options(&id, &event.vote_options).await.unwrap();
    store.set_phase(&id, Phase::Voting).await.unwrap();

    let short = put_votes(
        store,
        &id,
        &user,
        UserVotes {
            location_votes: vec![1],
            time_votes: vec![1],
        },
    )
    .await
    .unwrap_err();
    assert_eq!(short.kind(), ErrorKind::Validation);

    put_votes(store, &id, &user, ballot.clone()).await.unwrap();
    assert_eq!(store.get_event(&id).await.unwrap().user_votes[&user], ballot);
    assert_eq!(vote_options(store, &id).await.unwrap(), event.vote_options);

    store.set_phase(&id, Phase::Finalized).await.unwrap();
    let late = put_votes(store, &id, &user, ballot).await.unwrap_err();
    assert_eq!(late.kind(), ErrorKind::Validation);
}

#[test_log::test(tokio::test)]
async fn test_availability_info_reports_local_dates() {
    let harness = harness();
    let earliest = future_day(2) + TimeDelta::hours(3);
    harness
        .seed(&populated_event("info1", earliest, future_day(4)))
        .await;

    let info = availability_info(harness.store.as_ref(), &EventId::from("info1"))
        .await
        .unwrap();

    assert_eq!(info.title, "Dinner");
    assert_eq!(info.first_date, earliest.date_naive());
    assert_eq!(info.last_date, future_day(4).date_naive());
    assert_eq!(info.daily_start.minutes(), 8 * 60);
    assert_eq!(info.timezone, "UTC");
    assert_eq!(info.earliest_date.time(), NaiveTime::from_hms_opt(3, 0, 0).unwrap());
}
