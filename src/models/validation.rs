use anyhow::{anyhow, Result};
use chrono_tz::Tz;

/// Email validation
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(anyhow!("Email cannot be empty"));
    }

    if !email.contains('@') || !email.contains('.') {
        return Err(anyhow!("Invalid email format"));
    }

    if email.len() > 255 {
        return Err(anyhow!("Email cannot be longer than 255 characters"));
    }

    Ok(())
}

pub fn validate_name(name: &str, field_name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(anyhow!("{} cannot be empty", field_name));
    }

    if name.len() > 255 {
        return Err(anyhow!("{} cannot be longer than 255 characters", field_name));
    }

    Ok(())
}

pub fn validate_timezone(timezone: &str) -> Result<()> {
    timezone
        .parse::<Tz>()
        .map(|_| ())
        .map_err(|_| anyhow!("Unknown timezone '{}'", timezone))
}

/// Subscription counters: both non-negative, used never above total.
pub fn validate_session_counters(total: i32, used: i32) -> Result<()> {
    if total < 0 || used < 0 {
        return Err(anyhow!("Session counters cannot be negative"));
    }

    if used > total {
        return Err(anyhow!("Sessions used ({}) cannot exceed sessions total ({})", used, total));
    }

    Ok(())
}

pub fn validate_working_days(days: &[i32]) -> Result<()> {
    if let Some(day) = days.iter().find(|day| !(1..=7).contains(*day)) {
        return Err(anyhow!("Working day {} is out of range 1-7", day));
    }
    Ok(())
}

/// Session length in minutes; anything beyond a day is rejected.
pub fn validate_duration(minutes: i64) -> Result<()> {
    if minutes <= 0 {
        return Err(anyhow!("Duration must be positive"));
    }

    if minutes > 24 * 60 {
        return Err(anyhow!("Duration cannot exceed 24 hours"));
    }

    Ok(())
}

pub fn validate_amount(amount: i64) -> Result<()> {
    if amount <= 0 {
        return Err(anyhow!("Amount must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(validate_email("anna@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("anna.example.com").is_err());
    }

    #[test]
    fn test_session_counter_validation() {
        assert!(validate_session_counters(10, 0).is_ok());
        assert!(validate_session_counters(10, 10).is_ok());
        assert!(validate_session_counters(10, 11).is_err());
        assert!(validate_session_counters(-1, 0).is_err());
    }

    #[test]
    fn test_timezone_validation() {
        assert!(validate_timezone("Europe/Moscow").is_ok());
        assert!(validate_timezone("Mars/Olympus").is_err());
    }

    #[test]
    fn test_working_days_validation() {
        assert!(validate_working_days(&[1, 2, 3, 4, 5, 6, 7]).is_ok());
        assert!(validate_working_days(&[0, 1]).is_err());
        assert!(validate_working_days(&[8]).is_err());
    }
}
