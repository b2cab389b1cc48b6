use chrono::{DateTime, Utc};
use model::entities::{login_history, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::error::{AccountsError, Result};
use crate::users::find_user;
use crate::validation::LoginAttempt;

/// Appends a login attempt. A successful login also becomes the account's
/// last known IP address.
#[instrument(skip(db, attempt), fields(ip = %attempt.ip_address, successful = attempt.successful))]
pub async fn record_login(
    db: &DatabaseConnection,
    user_id: i32,
    attempt: LoginAttempt,
) -> Result<login_history::Model> {
    attempt.validate()?;

    let txn = db.begin().await?;
    let account = find_user(&txn, user_id).await?;

    let entry = login_history::ActiveModel {
        user_id: Set(user_id),
        login_time: Set(Utc::now()),
        ip_address: Set(attempt.ip_address.clone()),
        user_agent: Set(attempt.user_agent),
        login_successful: Set(attempt.successful),
        logout_time: Set(None),
        session_duration_seconds: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if attempt.successful {
        let mut active: user::ActiveModel = account.into();
        active.last_login_ip = Set(Some(attempt.ip_address));
        active.update(&txn).await?;
        info!(entry_id = entry.id, "Login recorded");
    } else {
        warn!(entry_id = entry.id, "Failed login recorded");
    }

    txn.commit().await?;
    Ok(entry)
}

/// Closes a session at `at`. Only successful logins that are still open can
/// be closed, and never before they started.
#[instrument(skip(db))]
pub async fn record_logout(
    db: &DatabaseConnection,
    entry_id: i32,
    at: DateTime<Utc>,
) -> Result<login_history::Model> {
    let entry = login_history::Entity::find_by_id(entry_id)
        .one(db)
        .await?
        .ok_or(AccountsError::LoginEntryNotFound(entry_id))?;

    if !entry.login_successful {
        return Err(AccountsError::InvalidLogout(format!(
            "login {entry_id} was not successful"
        )));
    }
    if entry.logout_time.is_some() {
        return Err(AccountsError::InvalidLogout(format!(
            "login {entry_id} is already closed"
        )));
    }

    if at < entry.login_time {
        return Err(AccountsError::InvalidLogout(format!(
            "logout at {at} precedes login at {}",
            entry.login_time
        )));
    }
    let duration = (at - entry.login_time).num_seconds();

    let mut active: login_history::ActiveModel = entry.into();
    active.logout_time = Set(Some(at));
    active.session_duration_seconds = Set(Some(duration));
    let closed = active.update(db).await?;

    info!(duration_seconds = duration, "Logout recorded");
    Ok(closed)
}

/// The newest entries for an account, most recent first.
pub async fn recent(db: &DatabaseConnection, user_id: i32, limit: u64) -> Result<Vec<login_history::Model>> {
    find_user(db, user_id).await?;
    Ok(login_history::Entity::find()
        .filter(login_history::Column::UserId.eq(user_id))
        .order_by_desc(login_history::Column::LoginTime)
        .order_by_desc(login_history::Column::Id)
        .limit(limit)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{new_user, setup_db};
    use chrono::Duration;
    use model::entities::user::UserType;

    fn attempt(ip: &str, successful: bool) -> LoginAttempt {
        LoginAttempt {
            ip_address: ip.to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            successful,
        }
    }

    #[tokio::test]
    async fn test_successful_login_updates_last_ip() {
        let db = setup_db().await.unwrap();
        let user = new_user(&db, "ravi", UserType::Farmer).await;

        let entry = record_login(&db, user.id, attempt("10.0.0.7", true)).await.unwrap();
        assert!(entry.is_open());

        let account = user::Entity::find_by_id(user.id).one(&db).await.unwrap().unwrap();
        assert_eq!(account.last_login_ip.as_deref(), Some("10.0.0.7"));
    }

    #[tokio::test]
    async fn test_failed_login_keeps_last_ip() {
        let db = setup_db().await.unwrap();
        let user = new_user(&db, "ravi", UserType::Farmer).await;

        record_login(&db, user.id, attempt("10.0.0.7", true)).await.unwrap();
        let failed = record_login(&db, user.id, attempt("203.0.113.9", false)).await.unwrap();
        assert!(!failed.is_open());

        let account = user::Entity::find_by_id(user.id).one(&db).await.unwrap().unwrap();
        assert_eq!(account.last_login_ip.as_deref(), Some("10.0.0.7"));
    }

    #[tokio::test]
    async fn test_invalid_ip_rejected() {
        let db = setup_db().await.unwrap();
        let user = new_user(&db, "ravi", UserType::Farmer).await;

        assert!(matches!(
            record_login(&db, user.id, attempt("999.1.1.1", true)).await,
            Err(AccountsError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_logout_closes_session_once() {
        let db = setup_db().await.unwrap();
        let user = new_user(&db, "ravi", UserType::Farmer).await;
        let entry = record_login(&db, user.id, attempt("::1", true)).await.unwrap();

        let at = entry.login_time + Duration::seconds(90);
        let closed = record_logout(&db, entry.id, at).await.unwrap();
        assert_eq!(closed.logout_time, Some(at));
        assert_eq!(closed.session_duration_seconds, Some(90));
        assert!(!closed.is_open());

        assert!(matches!(
            record_logout(&db, entry.id, at).await,
            Err(AccountsError::InvalidLogout(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_login_cannot_log_out() {
        let db = setup_db().await.unwrap();
        let user = new_user(&db, "ravi", UserType::Farmer).await;
        let entry = record_login(&db, user.id, attempt("::1", false)).await.unwrap();

        assert!(matches!(
            record_logout(&db, entry.id, Utc::now()).await,
            Err(AccountsError::InvalidLogout(_))
        ));
        assert!(matches!(
            record_logout(&db, 999, Utc::now()).await,
            Err(AccountsError::LoginEntryNotFound(999))
        ));
    }

    #[tokio::test]
    async fn test_logout_before_login_rejected() {
        let db = setup_db().await.unwrap();
        let user = new_user(&db, "ravi", UserType::Farmer).await;
        let entry = record_login(&db, user.id, attempt("::1", true)).await.unwrap();

        let before = entry.login_time - Duration::minutes(5);
        assert!(matches!(
            record_logout(&db, entry.id, before).await,
            Err(AccountsError::InvalidLogout(_))
        ));
    }

    #[tokio::test]
    async fn test_recent_is_newest_first() {
        let db = setup_db().await.unwrap();
        let user = new_user(&db, "ravi", UserType::Farmer).await;

        let first = record_login(&db, user.id, attempt("10.0.0.1", true)).await.unwrap();
        let second = record_login(&db, user.id, attempt("10.0.0.2", false)).await.unwrap();
        let third = record_login(&db, user.id, attempt("10.0.0.3", true)).await.unwrap();

        let entries = recent(&db, user.id, 2).await.unwrap();
        assert_eq!(
            entries.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![third.id, second.id]
        );
        assert_eq!(recent(&db, user.id, 10).await.unwrap().last().map(|e| e.id), Some(first.id));
    }
}
