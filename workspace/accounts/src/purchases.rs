use model::entities::buyer_profile;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{AccountsError, Result};

/// Precision of the `total_spent` column, `DECIMAL(12, 2)`.
const TOTAL_SPENT_PRECISION: u32 = 12;
/// Precision of the `average_order_value` column, `DECIMAL(10, 2)`.
const AVERAGE_PRECISION: u32 = 10;
const AMOUNT_SCALE: u32 = 2;

/// Largest value a `DECIMAL(precision, 2)` column holds.
fn column_max(precision: u32) -> Decimal {
    Decimal::new(10i64.pow(precision) - 1, AMOUNT_SCALE)
}

/// Rejects amounts the purchase columns cannot store.
fn validate_amount(order_amount: Decimal) -> Result<()> {
    if order_amount.is_sign_negative() && !order_amount.is_zero() {
        return Err(AccountsError::Validation(format!(
            "order amount must not be negative, got {order_amount}"
        )));
    }
    if order_amount.normalize().scale() > AMOUNT_SCALE {
        return Err(AccountsError::Validation(format!(
            "order amount must have at most {AMOUNT_SCALE} decimal places, got {order_amount}"
        )));
    }
    let max = column_max(TOTAL_SPENT_PRECISION);
    if order_amount > max {
        return Err(AccountsError::Validation(format!(
            "order amount must not exceed {max}, got {order_amount}"
        )));
    }
    Ok(())
}

/// Folds a completed order into the buyer's purchase statistics.
///
/// The read and the write happen in one transaction, so concurrent orders for
/// the same buyer do not lose updates on backends with row locking.
#[instrument(skip(db))]
pub async fn record_order(
    db: &DatabaseConnection,
    user_id: i32,
    order_amount: Decimal,
) -> Result<buyer_profile::Model> {
    if let Err(err) = validate_amount(order_amount) {
        warn!(%order_amount, "Rejecting order amount");
        return Err(err);
    }

    let txn = db.begin().await?;
    let profile = buyer_profile::Entity::find()
        .filter(buyer_profile::Column::UserId.eq(user_id))
        .one(&txn)
        .await?
        .ok_or(AccountsError::ProfileNotFound { user_id, kind: "buyer" })?;

    let recorded = profile.purchase_stats().record(order_amount).filter(|stats| {
        stats.total_spent <= column_max(TOTAL_SPENT_PRECISION)
            && stats.average_order_value <= column_max(AVERAGE_PRECISION)
    });
    let Some(stats) = recorded else {
        warn!(user_id, %order_amount, "Order would overflow purchase statistics");
        txn.rollback().await?;
        return Err(AccountsError::Validation(format!(
            "order of {order_amount} exceeds the purchase totals that can be stored for user {user_id}"
        )));
    };
    debug!(?stats, "Updated purchase statistics");

    let mut active: buyer_profile::ActiveModel = profile.into();
    active.total_orders = Set(stats.total_orders);
    active.total_spent = Set(stats.total_spent);
    active.average_order_value = Set(stats.average_order_value);
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    info!(
        total_orders = updated.total_orders,
        total_spent = %updated.total_spent,
        "Order recorded"
    );
    Ok(updated)
}
