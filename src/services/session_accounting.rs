use thiserror::Error;

use crate::models::Client;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountingError {
    #[error("Client has used all {total} sessions of the subscription")]
    SessionsExhausted { used: i32, total: i32 },
    #[error("Client has no used sessions to refund")]
    NothingToRefund,
    #[error("Number of sessions to add must be positive, got {0}")]
    InvalidTopUp(i32),
    #[error("Cannot add {added} sessions to a subscription of {total}")]
    TooManySessions { total: i32, added: i32 },
}

/// Uses one subscription session. The client is left untouched when the
/// subscription is already exhausted.
pub fn consume_session(client: &Client) -> Result<Client, AccountingError> {
    if client.sessions_used >= client.sessions_total {
        return Err(AccountingError::SessionsExhausted {
            used: client.sessions_used,
            total: client.sessions_total,
        });
    }

    let mut updated = client.clone();
    updated.sessions_used += 1;
    Ok(updated)
}

/// Gives back one previously consumed session.
pub fn refund_session(client: &Client) -> Result<Client, AccountingError> {
    if client.sessions_used <= 0 {
        return Err(AccountingError::NothingToRefund);
    }

    let mut updated = client.clone();
    updated.sessions_used -= 1;
    Ok(updated)
}

pub fn add_sessions(client: &Client, sessions: i32) -> Result<Client, AccountingError> {
    if sessions <= 0 {
        return Err(AccountingError::InvalidTopUp(sessions));
    }

    let total = client
        .sessions_total
        .checked_add(sessions)
        .ok_or(AccountingError::TooManySessions {
            total: client.sessions_total,
            added: sessions,
        })?;

    let mut updated = client.clone();
    updated.sessions_total = total;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use uuid::Uuid;

    fn client(total: i32, used: i32) -> Client {
        Client {
            id: Uuid::new_v4(),
            trainer_id: Uuid::new_v4(),
            telegram_id: None,
            first_name: "Anna".to_string(),
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
            subscription_type: Some("10 sessions".to_string()),
            subscription_start: None,
            subscription_end: None,
            sessions_total: total,
            sessions_used: used,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_consume_increments_used() {
        let updated = consume_session(&client(10, 3)).unwrap();
        assert_eq!(updated.sessions_used, 4);
        assert_eq!(updated.sessions_total, 10);
    }

    #[test]
    fn test_consume_stops_at_total() {
        let mut current = client(3, 0);
        for _ in 0..3 {
            current = consume_session(&current).unwrap();
        }

        let err = consume_session(&current).unwrap_err();
        assert_eq!(err, AccountingError::SessionsExhausted { used: 3, total: 3 });
        assert_eq!(current.sessions_used, 3);
    }

    #[test]
    fn test_empty_subscription_cannot_be_consumed() {
        assert_matches!(
            consume_session(&client(0, 0)),
            Err(AccountingError::SessionsExhausted { .. })
        );
    }

    #[test]
    fn test_refund() {
        assert_eq!(refund_session(&client(5, 2)).unwrap().sessions_used, 1);
        assert_matches!(refund_session(&client(5, 0)), Err(AccountingError::NothingToRefund));
    }

    #[test]
    fn test_add_sessions() {
        assert_eq!(add_sessions(&client(5, 5), 10).unwrap().sessions_total, 15);
        assert_matches!(add_sessions(&client(5, 5), 0), Err(AccountingError::InvalidTopUp(0)));
    }

    #[test]
    fn test_add_sessions_rejects_overflowing_total() {
        assert_matches!(
            add_sessions(&client(10, 0), i32::MAX),
            Err(AccountingError::TooManySessions { total: 10, added: i32::MAX })
        );
        assert_eq!(
            add_sessions(&client(10, 0), i32::MAX - 10).unwrap().sessions_total,
            i32::MAX
        );
    }
}
