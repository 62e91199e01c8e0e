mod common;

use assert_matches::assert_matches;
use chrono::{Duration, NaiveTime, TimeZone, Utc, Weekday};
use pretty_assertions::assert_eq;

use common::{next_weekday, MockDataGenerator, TestContext};
use trainer_hub::models::{CreateWorkout, SlotToken, UpdateTrainerSettings, WorkoutStatus};
use trainer_hub::services::{BookSlot, ServiceError, WorkoutQuery};

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

#[tokio::test]
async fn test_booked_slot_disappears_from_availability() {
    let ctx = TestContext::new().await;
    let client = ctx.client("Kirill", 8).await;
    let date = next_weekday(Weekday::Mon);
    ctx.services
        .trainers
        .update_settings(
            ctx.trainer.id,
            UpdateTrainerSettings {
                working_hours_start: Some(hm(9, 0)),
                working_hours_end: Some(hm(12, 0)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let before = ctx
        .services
        .availability
        .available_slots(ctx.trainer.id, date, None)
        .await
        .unwrap();
    let labels: Vec<&str> = before.iter().map(|slot| slot.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["09:00-10:00", "09:30-10:30", "10:00-11:00", "10:30-11:30", "11:00-12:00"]
    );

    let token = before[2].token.parse::<SlotToken>().unwrap();
    ctx.services
        .bookings
        .book_slot(
            ctx.trainer.id,
            BookSlot {
                client_id: client.id,
                token: Some(token),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let after = ctx
        .services
        .availability
        .available_slots(ctx.trainer.id, date, None)
        .await
        .unwrap();
    let labels: Vec<&str> = after.iter().map(|slot| slot.label.as_str()).collect();
    assert_eq!(labels, vec!["09:00-10:00", "11:00-12:00"]);
}

#[tokio::test]
async fn test_booking_by_date_and_time_with_custom_duration() {
    let ctx = TestContext::new().await;
    let client = ctx.client("Lidia", 8).await;
    let date = next_weekday(Weekday::Tue);

    let workout = ctx
        .services
        .bookings
        .book_slot(
            ctx.trainer.id,
            BookSlot {
                client_id: client.id,
                date: Some(date),
                start_time: Some(hm(18, 30)),
                duration: Some(90),
                title: Some("Mobility".to_string()),
                price: Some(200_000),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(workout.workout_date, Utc.from_utc_datetime(&date.and_time(hm(18, 30))));
    assert_eq!(workout.duration, 90);
    assert_eq!(workout.title, "Mobility");
    assert_eq!(workout.status, WorkoutStatus::Scheduled);

    // 18:30-20:00 blocks the slots that would overlap it
    let slots = ctx
        .services
        .availability
        .available_slots(ctx.trainer.id, date, Some(60))
        .await
        .unwrap();
    assert!(slots.iter().all(|slot| slot.label != "18:00-19:00"));
    assert!(slots.iter().any(|slot| slot.label == "17:30-18:30"));
    assert!(slots.iter().any(|slot| slot.label == "20:00-21:00"));
}

#[tokio::test]
async fn test_manual_entry_off_grid_still_respects_overlaps() {
    let ctx = TestContext::new().await;
    let client = ctx.client("Nikita", 8).await;
    let date = next_weekday(Weekday::Fri);
    let start = Utc.from_utc_datetime(&date.and_time(hm(7, 10)));

    let manual = CreateWorkout {
        client_id: client.id,
        title: "Early run".to_string(),
        description: None,
        workout_date: start,
        duration: Some(45),
        status: None,
        workout_type: Some("cardio".to_string()),
        location: None,
        price: None,
        notes: None,
    };

    ctx.services
        .bookings
        .create_workout(ctx.trainer.id, manual.clone())
        .await
        .unwrap();

    let overlapping = CreateWorkout {
        workout_date: start + Duration::minutes(30),
        ..manual
    };
    assert_matches!(
        ctx.services
            .bookings
            .create_workout(ctx.trainer.id, overlapping)
            .await,
        Err(ServiceError::SlotConflict)
    );
}

#[tokio::test]
async fn test_day_off_and_far_future_have_no_slots() {
    let ctx = TestContext::new().await;
    let availability = &ctx.services.availability;

    let sunday = next_weekday(Weekday::Sun);
    assert!(availability
        .available_slots(ctx.trainer.id, sunday, None)
        .await
        .unwrap()
        .is_empty());

    let far = Utc::now().date_naive() + Duration::days(120);
    assert!(availability
        .available_slots(ctx.trainer.id, far, None)
        .await
        .unwrap()
        .is_empty());

    assert_matches!(
        availability
            .available_slots(ctx.trainer.id, sunday, Some(-30))
            .await,
        Err(ServiceError::InvalidRequest(_))
    );
}

#[tokio::test]
async fn test_workout_listing_exercises_and_duplicate() {
    let ctx = TestContext::new().await;
    let client = ctx.client("Olga", 8).await;
    let date = next_weekday(Weekday::Wed);

    let workout = ctx
        .services
        .bookings
        .book_slot(
            ctx.trainer.id,
            BookSlot {
                client_id: client.id,
                date: Some(date),
                start_time: Some(hm(10, 0)),
                title: Some("Legs".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let workouts = &ctx.services.workouts;
    workouts
        .add_exercises(
            ctx.trainer.id,
            workout.id,
            vec![
                MockDataGenerator::exercise("Squat", 0),
                MockDataGenerator::exercise("Lunge", 1),
            ],
        )
        .await
        .unwrap();

    let copy = workouts
        .duplicate(ctx.trainer.id, workout.id, workout.workout_date + Duration::days(7))
        .await
        .unwrap();
    assert_eq!(copy.title, "Legs (copy)");
    assert_eq!(copy.status, WorkoutStatus::Scheduled);

    let names: Vec<String> = workouts
        .list_exercises(ctx.trainer.id, copy.id)
        .await
        .unwrap()
        .into_iter()
        .map(|exercise| exercise.exercise_name)
        .collect();
    assert_eq!(names, vec!["Squat".to_string(), "Lunge".to_string()]);

    let listed = workouts
        .list(
            ctx.trainer.id,
            WorkoutQuery {
                client_id: Some(client.id),
                status: Some(WorkoutStatus::Scheduled),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);

    let upcoming = workouts.upcoming(ctx.trainer.id, Some(30)).await.unwrap();
    assert!(upcoming.iter().any(|w| w.id == workout.id));
}

#[tokio::test]
async fn test_records_of_another_trainer_are_hidden() {
    let ctx = TestContext::new().await;
    let client = ctx.client("Roman", 8).await;
    let other = ctx
        .services
        .trainers
        .register(MockDataGenerator::trainer(2002))
        .await
        .unwrap();

    assert_matches!(
        ctx.services.clients.get(other.id, client.id).await,
        Err(ServiceError::NotFound(_))
    );
    assert_matches!(
        ctx.services.stats.client_stats(other.id, client.id).await,
        Err(ServiceError::NotFound(_))
    );
    assert!(ctx.services.clients.list(other.id, false).await.unwrap().is_empty());
}
