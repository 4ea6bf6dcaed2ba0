use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, TimeDelta, Utc};
use hangout_core::model::{
    Attendee, AvailabilityBlock, Coordinates, DayAvailability, Event, EventId, Phase, TimePair,
    UserAvailability, UserId, UserLocation, UserVotes, VoteOptions,
};
use hangout_db::store::EventStore;
use tokio::sync::watch;

use crate::coordinator::{CoordinatorOutcome, EventCoordinator, WaitPolicy};
use crate::error::ErrorKind;
use crate::testing::{
    CHANNEL, Harness, RecordingNotifier, StaticPlaces, future_day, location, populated_event,
};

fn evening(date: NaiveDate) -> UserAvailability {
    UserAvailability {
        days: vec![DayAvailability {
            date,
            available_blocks: vec![AvailabilityBlock::new(18, 0, 20, 0)],
        }],
    }
}

fn at(latitude: f64, longitude: f64) -> UserLocation {
    UserLocation {
        coordinates: Coordinates::new(latitude, longitude),
        address: String::new(),
    }
}

/// Two participants free the same evening, both with locations.
fn dinner_event(id: &str) -> Event {
    let earliest = future_day(2);
    let mut event = populated_event(id, earliest, future_day(3));
    let day = earliest.date_naive();
    for (user, location) in [("alice", at(34.0, -81.0)), ("bob", at(36.0, -79.0))] {
        event.user_availability.insert(UserId::from(user), evening(day));
        event.user_locations.insert(UserId::from(user), location);
    }
    event
}

fn votes(locations: &[u32], times: &[u32]) -> UserVotes {
    UserVotes {
        location_votes: locations.to_vec(),
        time_votes: times.to_vec(),
    }
}

async fn run(harness: &Harness, id: &str) -> crate::error::ServiceResult<CoordinatorOutcome> {
    let (_tx, rx) = watch::channel(false);
    EventCoordinator::new(
        Arc::new(harness.instant_context()),
        EventId::from(id),
        rx,
    )
    .run()
    .await
}

#[test_log::test(tokio::test)]
async fn test_full_lifecycle_announces_winner() {
    let harness = Harness::new(
        RecordingNotifier::new().with_identity("alice", "Alice", "#FF0000"),
        StaticPlaces::new(vec![location("First"), location("Second")]),
    );
    let mut event = dinner_event("evt01");
    event
        .user_votes
        .insert(UserId::from("alice"), votes(&[0, 1], &[1]));
    event
        .user_votes
        .insert(UserId::from("bob"), votes(&[0, 2], &[1]));
    harness.seed(&event).await;

    let outcome = run(&harness, "evt01").await.unwrap();

    let CoordinatorOutcome::Finalized { location, time } = outcome else {
        panic!("expected a final choice, got {outcome:?}");
    };
    assert_eq!(location.map(|location| location.name), Some("Second".to_owned()));
    assert_eq!(time.end - time.start, TimeDelta::hours(2));

    let stored = harness.store.get_event(&EventId::from("evt01")).await.unwrap();
    assert_eq!(stored.phase, Phase::Finalized);
    assert_eq!(stored.vote_options.locations.len(), 2);
    assert_eq!(
        stored.vote_options.times[0].available,
        vec![
            Attendee {
                user_id: UserId::from("alice"),
                name: "Alice".to_owned(),
                color: "#FF0000".to_owned(),
            },
            Attendee::unknown(UserId::from("bob")),
        ]
    );
    assert_eq!(harness.places.centers(), vec![Coordinates::new(35.0, -80.0)]);

    let messages = harness.notifier.messages();
    assert_eq!(messages.len(), 3);
    assert!(messages.iter().all(|(channel, _)| channel == CHANNEL));
    assert!(messages[0].1.contains("https://hangouts.test/availability/evt01"));
    assert!(messages[1].1.contains("https://hangouts.test/vote/evt01"));
    assert!(messages[2].1.contains("at Second (Second address)"));
}

#[test_log::test(tokio::test)]
async fn test_no_votes_closes_without_final_announcement() {
    let harness = Harness::new(RecordingNotifier::new(), StaticPlaces::default());
    harness.seed(&dinner_event("evt02")).await;

    let outcome = run(&harness, "evt02").await.unwrap();

    assert_eq!(outcome, CoordinatorOutcome::NoDecision);
    assert_eq!(harness.notifier.messages().len(), 2);
    let stored = harness.store.get_event(&EventId::from("evt02")).await.unwrap();
    assert_eq!(stored.phase, Phase::Finalized);
}

#[test_log::test(tokio::test)]
async fn test_past_switch_time_skips_scheduling_announcement() {
    let harness = Harness::new(RecordingNotifier::new(), StaticPlaces::default());
    let mut event = dinner_event("evt03");
    if let Some(details) = event.details.as_mut() {
        details.switch_to_voting_at = Utc::now() - TimeDelta::minutes(1);
    }
    harness.seed(&event).await;

    run(&harness, "evt03").await.unwrap();

    let messages = harness.notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].1.contains("/vote/evt03"));
}

#[test_log::test(tokio::test)]
async fn test_notifier_failure_aborts_without_changes() {
    let harness = Harness::new(RecordingNotifier::new(), StaticPlaces::new(vec![location("First")]));
    harness.seed(&dinner_event("evt04")).await;
    harness.notifier.fail_posts();

    let err = run(&harness, "evt04").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CollaboratorFailure);
    let stored = harness.store.get_event(&EventId::from("evt04")).await.unwrap();
    assert_eq!(stored.phase, Phase::Scheduling);
    assert!(stored.vote_options.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_finalized_and_unpopulated_events_are_left_alone() {
    let harness = Harness::new(RecordingNotifier::new(), StaticPlaces::default());
    let mut finalized = dinner_event("evt05");
    finalized.phase = Phase::Finalized;
    harness.seed(&finalized).await;
    let mut unpopulated = dinner_event("evt06");
    unpopulated.details = None;
    harness.seed(&unpopulated).await;

    assert_eq!(
        run(&harness, "evt05").await.unwrap(),
        CoordinatorOutcome::AlreadyFinalized
    );
    assert_eq!(
        run(&harness, "evt06").await.unwrap(),
        CoordinatorOutcome::NotPopulated
    );
    assert!(harness.notifier.messages().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_resume_in_voting_keeps_existing_options() {
    let harness = Harness::new(RecordingNotifier::new(), StaticPlaces::new(vec![location("New")]));
    let mut event = dinner_event("evt07");
    let start = future_day(2) + TimeDelta::hours(12);
    event.phase = Phase::Voting;
    event.vote_options = VoteOptions {
        locations: Vec::new(),
        times: vec![
            TimePair {
                start,
                end: start + TimeDelta::hours(1),
                available: Vec::new(),
            },
            TimePair {
                start: start + TimeDelta::hours(3),
                end: start + TimeDelta::hours(4),
                available: Vec::new(),
            },
        ],
    };
    event.user_votes.insert(UserId::from("alice"), votes(&[], &[0, 2]));
    harness.seed(&event).await;

    let outcome = run(&harness, "evt07").await.unwrap();

    let CoordinatorOutcome::Finalized { location, time } = outcome else {
        panic!("expected a final choice, got {outcome:?}");
    };
    assert_eq!(location, None);
    assert_eq!(time.start, start + TimeDelta::hours(3));
    assert!(harness.places.centers().is_empty());
    let messages = harness.notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].1.contains("take place from"));
}

#[test_log::test(tokio::test)]
async fn test_missing_locations_skip_places_lookup() {
    let harness = Harness::new(RecordingNotifier::new(), StaticPlaces::new(vec![location("First")]));
    let mut event = dinner_event("evt08");
    event.user_locations.clear();
    harness.seed(&event).await;

    run(&harness, "evt08").await.unwrap();

    assert!(harness.places.centers().is_empty());
    let stored = harness.store.get_event(&EventId::from("evt08")).await.unwrap();
    assert!(stored.vote_options.locations.is_empty());
    assert_eq!(stored.vote_options.times.len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_shutdown_interrupts_wait() {
    let harness = Harness::new(RecordingNotifier::new(), StaticPlaces::default());
    harness.seed(&dinner_event("evt09")).await;
    let (tx, rx) = watch::channel(false);
    let coordinator = EventCoordinator::new(
        Arc::new(harness.context(WaitPolicy::Deadline, "test-node")),
        EventId::from("evt09"),
        rx,
    );

    let task = tokio::spawn(coordinator.run());
    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send_replace(true);
    let outcome = task.await.unwrap().unwrap();

    assert_eq!(outcome, CoordinatorOutcome::Cancelled);
    assert_eq!(harness.notifier.messages().len(), 1);
    let stored = harness.store.get_event(&EventId::from("evt09")).await.unwrap();
    assert_eq!(stored.phase, Phase::Scheduling);
}

#[test_log::test(tokio::test)]
async fn test_places_failure_aborts_before_voting_opens() {
    let harness = Harness::new(RecordingNotifier::new(), StaticPlaces::new(vec![location("First")]));
    harness.seed(&dinner_event("evt10")).await;
    harness.places.fail_searches();

    let err = run(&harness, "evt10").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CollaboratorFailure);
    assert_eq!(harness.places.centers().len(), 1);
    let stored = harness.store.get_event(&EventId::from("evt10")).await.unwrap();
    assert_eq!(stored.phase, Phase::Scheduling);
    assert!(stored.vote_options.is_empty());
    let messages = harness.notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].1.contains("/availability/evt10"));
}

#[test_log::test(tokio::test)]
async fn test_display_name_lookup_failure_uses_defaults() {
    let notifier = RecordingNotifier::new().with_identity("alice", "Alice", "#FF0000");
    notifier.fail_lookups();
    let harness = Harness::new(notifier, StaticPlaces::default());
    harness.seed(&dinner_event("evt11")).await;

    let outcome = run(&harness, "evt11").await.unwrap();

    assert_eq!(outcome, CoordinatorOutcome::NoDecision);
    let stored = harness.store.get_event(&EventId::from("evt11")).await.unwrap();
    assert_eq!(stored.vote_options.times.len(), 1);
    assert_eq!(
        stored.vote_options.times[0].available,
        vec![
            Attendee::unknown(UserId::from("alice")),
            Attendee::unknown(UserId::from("bob")),
        ]
    );
    assert_eq!(stored.vote_options.times[0].available[0].name, "unknown");
    assert_eq!(stored.vote_options.times[0].available[0].color, "#222222");
}

#[test_log::test(tokio::test)]
async fn test_lease_taken_over_during_wait_stops_coordinator() {
    let harness = Harness::new(RecordingNotifier::new(), StaticPlaces::default());
    let id = EventId::from("evt12");
    harness.seed(&dinner_event("evt12")).await;
    let now = Utc::now();
    assert!(
        harness
            .store
            .try_claim(&id, "node-a", now, now + TimeDelta::milliseconds(100))
            .await
            .unwrap()
    );
    let (_tx, rx) = watch::channel(false);
    let coordinator = EventCoordinator::new(
        Arc::new(harness.context_with_ttl(
            WaitPolicy::Deadline,
            "node-a",
            Duration::from_millis(100),
        )),
        id.clone(),
        rx,
    );

    let task = tokio::spawn(coordinator.run());
    tokio::time::sleep(Duration::from_millis(300)).await;
    let now = Utc::now();
    assert!(
        harness
            .store
            .try_claim(&id, "node-b", now, now + TimeDelta::hours(1))
            .await
            .unwrap()
    );
    let outcome = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    assert_eq!(outcome, CoordinatorOutcome::LeaseLost);
    assert_eq!(harness.notifier.messages().len(), 1);
    let stored = harness.store.get_event(&id).await.unwrap();
    assert_eq!(stored.phase, Phase::Scheduling);
}
