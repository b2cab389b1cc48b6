use chrono::Utc;
use model::entities::{buyer_profile, farmer_profile};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::{info, instrument};
use validator::Validate;

use crate::error::{AccountsError, Result};
use crate::validation::{BuyerProfileChanges, FarmerProfileChanges};

pub async fn farmer_profile(db: &DatabaseConnection, user_id: i32) -> Result<farmer_profile::Model> {
    farmer_profile::Entity::find()
        .filter(farmer_profile::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(AccountsError::ProfileNotFound { user_id, kind: "farmer" })
}

pub async fn buyer_profile(db: &DatabaseConnection, user_id: i32) -> Result<buyer_profile::Model> {
    buyer_profile::Entity::find()
        .filter(buyer_profile::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(AccountsError::ProfileNotFound { user_id, kind: "buyer" })
}

/// Updates the farm details. Ratings and review counts are not editable here.
#[instrument(skip(db, changes))]
pub async fn update_farmer_profile(
    db: &DatabaseConnection,
    user_id: i32,
    changes: FarmerProfileChanges,
) -> Result<farmer_profile::Model> {
    changes.validate()?;
    let existing = farmer_profile(db, user_id).await?;

    let mut active: farmer_profile::ActiveModel = existing.into();
    if let Some(value) = changes.farm_name {
        active.farm_name = Set(value);
    }
    if let Some(value) = changes.farm_size {
        active.farm_size = Set(value);
    }
    if let Some(value) = changes.farm_size_acres {
        active.farm_size_acres = Set(value);
    }
    if let Some(value) = changes.farming_type {
        active.farming_type = Set(value);
    }
    if let Some(value) = changes.farming_experience_years {
        active.farming_experience_years = Set(value);
    }
    if let Some(value) = changes.farm_address {
        active.farm_address = Set(value);
    }
    if let Some(value) = changes.farm_latitude {
        active.farm_latitude = Set(value);
    }
    if let Some(value) = changes.farm_longitude {
        active.farm_longitude = Set(value);
    }
    if let Some(value) = changes.organic_certified {
        active.organic_certified = Set(value);
    }
    if let Some(value) = changes.organic_certification_number {
        active.organic_certification_number = Set(value);
    }
    if let Some(value) = changes.organic_certification_expiry {
        active.organic_certification_expiry = Set(value);
    }
    if let Some(value) = changes.bank_account_number {
        active.bank_account_number = Set(value);
    }
    if let Some(value) = changes.bank_name {
        active.bank_name = Set(value);
    }
    if let Some(value) = changes.bank_branch {
        active.bank_branch = Set(value);
    }
    if let Some(value) = changes.ifsc_code {
        active.ifsc_code = Set(value);
    }
    if let Some(value) = changes.pan_number {
        active.pan_number = Set(value);
    }
    if let Some(value) = changes.farm_photo {
        active.farm_photo = Set(value);
    }
    if let Some(value) = changes.certification_document {
        active.certification_document = Set(value);
    }
    if let Some(value) = changes.id_proof {
        active.id_proof = Set(value);
    }
    if let Some(value) = changes.is_active_seller {
        active.is_active_seller = Set(value);
    }
    if let Some(value) = changes.subscription_plan {
        active.subscription_plan = Set(value);
    }
    if let Some(value) = changes.subscription_expiry {
        active.subscription_expiry = Set(value);
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(db).await?;
    info!(profile_id = updated.id, "Farmer profile updated");
    Ok(updated)
}

/// Updates buyer preferences. Purchase statistics only change through recorded orders.
#[instrument(skip(db, changes))]
pub async fn update_buyer_profile(
    db: &DatabaseConnection,
    user_id: i32,
    changes: BuyerProfileChanges,
) -> Result<buyer_profile::Model> {
    changes.validate()?;
    let existing = buyer_profile(db, user_id).await?;

    let mut active: buyer_profile::ActiveModel = existing.into();
    if let Some(value) = changes.buyer_type {
        active.buyer_type = Set(value);
    }
    if let Some(value) = changes.company_name {
        active.company_name = Set(value);
    }
    if let Some(value) = changes.gst_number {
        active.gst_number = Set(value);
    }
    if let Some(value) = changes.preferred_delivery_time {
        active.preferred_delivery_time = Set(value);
    }
    if let Some(value) = changes.special_instructions {
        active.special_instructions = Set(value);
    }
    if let Some(value) = changes.prefers_organic {
        active.prefers_organic = Set(value);
    }
    if let Some(value) = changes.max_delivery_distance {
        active.max_delivery_distance = Set(value);
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(db).await?;
    info!(profile_id = updated.id, "Buyer profile updated");
    Ok(updated)
}
