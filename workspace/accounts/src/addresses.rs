//! Per-user address book.
//!
//! Titles are unique per user, and at most one address per user carries the
//! default flag. Marking an address as default clears the flag on the user's
//! other addresses in the same transaction. Nothing is ever promoted
//! automatically: unsetting or deleting the default leaves the user without one.

use chrono::Utc;
use model::entities::address;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::error::{AccountsError, Result};
use crate::users::find_user;
use crate::validation::{AddressChanges, NewAddress};

#[derive(Debug, Clone)]
pub struct AddressBook {
    db: DatabaseConnection,
}

impl AddressBook {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, new_address), fields(title = %new_address.title))]
    pub async fn create(&self, user_id: i32, new_address: NewAddress) -> Result<address::Model> {
        new_address.validate()?;

        let txn = self.db.begin().await?;
        find_user(&txn, user_id).await?;
        ensure_title_available(&txn, user_id, &new_address.title, None).await?;

        let title = new_address.title.clone();
        let created = address::ActiveModel {
            user_id: Set(user_id),
            address_type: Set(new_address.address_type),
            title: Set(new_address.title),
            address_line_1: Set(new_address.address_line_1),
            address_line_2: Set(new_address.address_line_2),
            city: Set(new_address.city),
            state: Set(new_address.state),
            postal_code: Set(new_address.postal_code),
            country: Set(new_address.country),
            latitude: Set(new_address.latitude),
            longitude: Set(new_address.longitude),
            is_default: Set(new_address.is_default),
            is_active: Set(new_address.is_active),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|err| title_conflict(err, user_id, &title))?;

        if created.is_default {
            clear_other_defaults(&txn, &created).await?;
        }

        txn.commit().await?;
        info!(address_id = created.id, user_id, "Address created");
        Ok(created)
    }

    #[instrument(skip(self, changes))]
    pub async fn update(&self, address_id: i32, changes: AddressChanges) -> Result<address::Model> {
        changes.validate()?;

        let txn = self.db.begin().await?;
        let existing = find_address(&txn, address_id).await?;
        let user_id = existing.user_id;
        let title = changes.title.clone().unwrap_or_else(|| existing.title.clone());

        if let Some(title) = &changes.title {
            ensure_title_available(&txn, user_id, title, Some(address_id)).await?;
        }

        let mut active: address::ActiveModel = existing.into();
        if let Some(address_type) = changes.address_type {
            active.address_type = Set(address_type);
        }
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(line) = changes.address_line_1 {
            active.address_line_1 = Set(line);
        }
        if let Some(line) = changes.address_line_2 {
            active.address_line_2 = Set(line);
        }
        if let Some(city) = changes.city {
            active.city = Set(city);
        }
        if let Some(state) = changes.state {
            active.state = Set(state);
        }
        if let Some(postal_code) = changes.postal_code {
            active.postal_code = Set(postal_code);
        }
        if let Some(country) = changes.country {
            active.country = Set(country);
        }
        if let Some(latitude) = changes.latitude {
            active.latitude = Set(latitude);
        }
        if let Some(longitude) = changes.longitude {
            active.longitude = Set(longitude);
        }
        if let Some(is_default) = changes.is_default {
            active.is_default = Set(is_default);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }

        let updated = active
            .update(&txn)
            .await
            .map_err(|err| title_conflict(err, user_id, &title))?;

        if updated.is_default {
            clear_other_defaults(&txn, &updated).await?;
        }

        txn.commit().await?;
        info!(address_id, "Address updated");
        Ok(updated)
    }

    /// Makes this address the user's only default.
    #[instrument(skip(self))]
    pub async fn set_default(&self, address_id: i32) -> Result<address::Model> {
        self.update(
            address_id,
            AddressChanges {
                is_default: Some(true),
                ..Default::default()
            },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, address_id: i32) -> Result<()> {
        let existing = find_address(&self.db, address_id).await?;
        address::Entity::delete_by_id(address_id).exec(&self.db).await?;

        if existing.is_default {
            debug!(user_id = existing.user_id, "Deleted the default address, user now has none");
        }
        info!(address_id, "Address deleted");
        Ok(())
    }

    pub async fn get(&self, address_id: i32) -> Result<address::Model> {
        find_address(&self.db, address_id).await
    }

    /// The user's addresses, default first, then by title.
    pub async fn list(&self, user_id: i32) -> Result<Vec<address::Model>> {
        find_user(&self.db, user_id).await?;
        Ok(address::Entity::find()
            .filter(address::Column::UserId.eq(user_id))
            .order_by_desc(address::Column::IsDefault)
            .order_by_asc(address::Column::Title)
            .all(&self.db)
            .await?)
    }

    pub async fn default_for(&self, user_id: i32) -> Result<Option<address::Model>> {
        find_user(&self.db, user_id).await?;
        Ok(address::Entity::find()
            .filter(address::Column::UserId.eq(user_id))
            .filter(address::Column::IsDefault.eq(true))
            .one(&self.db)
            .await?)
    }
}

async fn find_address<C>(conn: &C, address_id: i32) -> Result<address::Model>
where
    C: ConnectionTrait,
{
    address::Entity::find_by_id(address_id)
        .one(conn)
        .await?
        .ok_or(AccountsError::AddressNotFound(address_id))
}

async fn ensure_title_available<C>(conn: &C, user_id: i32, title: &str, except: Option<i32>) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = address::Entity::find()
        .filter(address::Column::UserId.eq(user_id))
        .filter(address::Column::Title.eq(title));
    if let Some(address_id) = except {
        query = query.filter(address::Column::Id.ne(address_id));
    }
    if query.one(conn).await?.is_some() {
        warn!(user_id, %title, "Address title already used");
        return Err(AccountsError::DuplicateAddressTitle {
            user_id,
            title: title.to_string(),
        });
    }
    Ok(())
}

fn title_conflict(err: sea_orm::DbErr, user_id: i32, title: &str) -> AccountsError {
    match err.sql_err() {
        Some(sea_orm::SqlErr::UniqueConstraintViolation(message)) => {
            warn!(user_id, %message, "Address title already used");
            AccountsError::DuplicateAddressTitle {
                user_id,
                title: title.to_string(),
            }
        }
        _ => AccountsError::Database(err),
    }
}

async fn clear_other_defaults<C>(conn: &C, keep: &address::Model) -> Result<()>
where
    C: ConnectionTrait,
{
    let cleared = address::Entity::update_many()
        .col_expr(address::Column::IsDefault, Expr::value(false))
        .col_expr(address::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(address::Column::UserId.eq(keep.user_id))
        .filter(address::Column::IsDefault.eq(true))
        .filter(address::Column::Id.ne(keep.id))
        .exec(conn)
        .await?;
    debug!(
        user_id = keep.user_id,
        cleared = cleared.rows_affected,
        "Cleared other default addresses"
    );
    Ok(())
}
