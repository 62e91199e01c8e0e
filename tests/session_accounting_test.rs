mod common;

use assert_matches::assert_matches;
use chrono::{NaiveTime, Weekday};
use proptest::prelude::*;

use common::{next_weekday, TestContext};
use trainer_hub::models::{Client, SlotToken, WorkoutStatus};
use trainer_hub::services::session_accounting::{add_sessions, consume_session, refund_session};
use trainer_hub::services::{AccountingError, BookSlot, ServiceError, SessionOutcome};

fn client_with(total: i32, used: i32) -> Client {
    let now = chrono::Utc::now();
    Client {
        id: uuid::Uuid::new_v4(),
        trainer_id: uuid::Uuid::new_v4(),
        telegram_id: None,
        first_name: "Test".to_string(),
        last_name: None,
        username: None,
        phone: None,
        email: None,
        birth_date: None,
        gender: None,
        height_cm: None,
        initial_weight: None,
        current_weight: None,
        target_weight: None,
        goal: None,
        medical_notes: None,
        emergency_contact: None,
        subscription_type: None,
        subscription_start: None,
        subscription_end: None,
        sessions_total: total,
        sessions_used: used,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

proptest! {
    #[test]
    fn consumption_never_exceeds_the_subscription(total in 0i32..50, attempts in 0usize..80) {
        let mut client = client_with(total, 0);

        for _ in 0..attempts {
            match consume_session(&client) {
                Ok(next) => {
                    prop_assert_eq!(next.sessions_used, client.sessions_used + 1);
                    client = next;
                }
                Err(AccountingError::SessionsExhausted { used, total: limit }) => {
                    prop_assert_eq!(used, limit);
                }
                Err(other) => prop_assert!(false, "unexpected error {:?}", other),
            }
            prop_assert!(client.sessions_used <= client.sessions_total);
        }

        prop_assert_eq!(client.sessions_used, total.min(attempts as i32));
    }
}

#[test]
fn test_refund_and_top_up() {
    let client = client_with(5, 1);
    assert_eq!(refund_session(&client).unwrap().sessions_used, 0);
    assert_matches!(
        refund_session(&client_with(5, 0)),
        Err(AccountingError::NothingToRefund)
    );

    assert_eq!(add_sessions(&client, 10).unwrap().sessions_total, 15);
    assert_matches!(add_sessions(&client, 0), Err(AccountingError::InvalidTopUp(0)));
}

async fn booked_workout(ctx: &TestContext, client: &Client, hour: u32) -> uuid::Uuid {
    ctx.services
        .bookings
        .book_slot(
            ctx.trainer.id,
            BookSlot {
                client_id: client.id,
                token: Some(SlotToken {
                    date: next_weekday(Weekday::Thu),
                    start_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_complete_reopen_complete_consumes_one_session() {
    let ctx = TestContext::new().await;
    let client = ctx.client("Svetlana", 4).await;
    let workout_id = booked_workout(&ctx, &client, 10).await;
    let workouts = &ctx.services.workouts;

    let first = workouts.complete(ctx.trainer.id, workout_id, None).await.unwrap();
    assert_eq!(first.session, SessionOutcome::Consumed { sessions_remaining: 3 });

    let reopened = workouts.reopen(ctx.trainer.id, workout_id).await.unwrap();
    assert_eq!(reopened.workout.status, WorkoutStatus::Scheduled);
    assert_eq!(reopened.session, SessionOutcome::Refunded { sessions_remaining: 4 });

    let second = workouts
        .complete(ctx.trainer.id, workout_id, Some("Good form".to_string()))
        .await
        .unwrap();
    assert_eq!(second.session, SessionOutcome::Consumed { sessions_remaining: 3 });

    let client = ctx.services.clients.get(ctx.trainer.id, client.id).await.unwrap();
    assert_eq!(client.sessions_used, 1);
}

#[tokio::test]
async fn test_exhausted_subscription_keeps_status_and_counter() {
    let ctx = TestContext::new().await;
    let client = ctx.client("Boris", 1).await;
    let first = booked_workout(&ctx, &client, 9).await;
    let second = booked_workout(&ctx, &client, 12).await;
    let workouts = &ctx.services.workouts;

    workouts.mark_no_show(ctx.trainer.id, first).await.unwrap();
    let outcome = workouts.complete(ctx.trainer.id, second, None).await.unwrap();

    assert_eq!(outcome.workout.status, WorkoutStatus::Completed);
    assert_matches!(outcome.session, SessionOutcome::Failed { .. });

    let client = ctx.services.clients.get(ctx.trainer.id, client.id).await.unwrap();
    assert_eq!(client.sessions_used, 1);
    assert_eq!(client.sessions_total, 1);
}

#[tokio::test]
async fn test_cancel_does_not_touch_the_subscription() {
    let ctx = TestContext::new().await;
    let client = ctx.client("Galina", 3).await;
    let workout_id = booked_workout(&ctx, &client, 15).await;

    let outcome = ctx
        .services
        .workouts
        .cancel(ctx.trainer.id, workout_id, Some("Travelling".to_string()))
        .await
        .unwrap();
    assert_eq!(outcome.session, SessionOutcome::NotAffected);

    let again = ctx.services.workouts.cancel(ctx.trainer.id, workout_id, None).await;
    assert_matches!(
        again,
        Err(ServiceError::InvalidTransition {
            from: WorkoutStatus::Cancelled,
            to: WorkoutStatus::Cancelled
        })
    );

    let client = ctx.services.clients.get(ctx.trainer.id, client.id).await.unwrap();
    assert_eq!(client.sessions_used, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_completions_never_oversell_the_subscription() {
    let ctx = TestContext::new().await;
    let client = ctx.client("Denis", 3).await;

    let mut workout_ids = Vec::new();
    for hour in 9..19 {
        workout_ids.push(booked_workout(&ctx, &client, hour).await);
    }

    let handles: Vec<_> = workout_ids
        .into_iter()
        .map(|workout_id| {
            let workouts = ctx.services.workouts.clone();
            let trainer_id = ctx.trainer.id;
            tokio::spawn(async move { workouts.complete(trainer_id, workout_id, None).await })
        })
        .collect();

    let mut consumed = 0;
    let mut failed = 0;
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(outcome.workout.status, WorkoutStatus::Completed);
        match outcome.session {
            SessionOutcome::Consumed { .. } => consumed += 1,
            SessionOutcome::Failed { .. } => failed += 1,
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    assert_eq!(consumed, 3);
    assert_eq!(failed, 7);

    let client = ctx.services.clients.get(ctx.trainer.id, client.id).await.unwrap();
    assert_eq!(client.sessions_used, 3);
    assert_eq!(client.sessions_total, 3);
}
