//! Role-profile provisioning.
//!
//! Every account owns at most one role profile: farmers get a
//! [`farmer_profile`], buyers and vendors share the [`buyer_profile`], and
//! administrators get none. [`provision_profile`] runs inside the transaction
//! that creates the account, so an account never becomes visible without its
//! profile. [`sync_profile`] is the follow-up step after an account update.

use chrono::Utc;
use model::entities::farmer_profile::{FarmSize, FarmingType};
use model::entities::{buyer_profile, farmer_profile, user};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tracing::{debug, info, instrument};
use validator::Validate;

use crate::error::{Result, map_unique_violation};

/// Farm address used when the owner has not entered any postal address.
pub const FARM_ADDRESS_PLACEHOLDER: &str = "Not specified";
pub const DEFAULT_FARMING_EXPERIENCE_YEARS: i32 = 1;

pub fn default_farm_size_acres() -> Decimal {
    Decimal::new(100, 2)
}

/// The role-specific profile attached to an account.
#[derive(Debug, Clone, PartialEq)]
pub enum RoleProfile {
    Farmer(farmer_profile::Model),
    Buyer(buyer_profile::Model),
}

impl RoleProfile {
    pub fn id(&self) -> i32 {
        match self {
            Self::Farmer(profile) => profile.id,
            Self::Buyer(profile) => profile.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Farmer(_) => "farmer",
            Self::Buyer(_) => "buyer",
        }
    }
}

/// Result of re-persisting an account's profile after the account was saved.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileSync {
    /// The existing profile was written back.
    Saved(RoleProfile),
    /// The role calls for a profile but none is visible yet.
    NotProvisioned,
    /// Administrators have no role profile.
    NoProfileRequired,
}

/// Placeholder values a farmer profile starts with. Validated before insert
/// so a bad default aborts the surrounding account creation.
#[derive(Debug, Validate)]
struct FarmerDefaults {
    #[validate(length(min = 1, max = 200))]
    farm_name: String,
    #[validate(range(min = 0, max = 100))]
    farming_experience_years: i32,
    #[validate(length(min = 1))]
    farm_address: String,
}

impl FarmerDefaults {
    fn for_user(user: &user::Model) -> Self {
        let address = user.full_address();
        Self {
            farm_name: format!("{}'s Farm", user.username),
            farming_experience_years: DEFAULT_FARMING_EXPERIENCE_YEARS,
            farm_address: if address.is_empty() {
                FARM_ADDRESS_PLACEHOLDER.to_string()
            } else {
                address
            },
        }
    }

    fn into_active_model(self, user_id: i32) -> farmer_profile::ActiveModel {
        farmer_profile::ActiveModel {
            user_id: Set(user_id),
            farm_name: Set(self.farm_name),
            farm_size: Set(FarmSize::Small),
            farm_size_acres: Set(default_farm_size_acres()),
            farming_type: Set(FarmingType::default()),
            farming_experience_years: Set(self.farming_experience_years),
            farm_address: Set(self.farm_address),
            farm_latitude: Set(None),
            farm_longitude: Set(None),
            organic_certified: Set(false),
            organic_certification_number: Set(String::new()),
            organic_certification_expiry: Set(None),
            bank_account_number: Set(String::new()),
            bank_name: Set(String::new()),
            bank_branch: Set(String::new()),
            ifsc_code: Set(String::new()),
            pan_number: Set(String::new()),
            farm_photo: Set(None),
            certification_document: Set(None),
            id_proof: Set(None),
            average_rating: Set(Decimal::ZERO),
            total_reviews: Set(0),
            is_active_seller: Set(true),
            subscription_plan: Set("basic".to_string()),
            subscription_expiry: Set(None),
            ..Default::default()
        }
    }
}

fn default_buyer_profile(user_id: i32) -> buyer_profile::ActiveModel {
    buyer_profile::ActiveModel {
        user_id: Set(user_id),
        buyer_type: Set(buyer_profile::BuyerType::default()),
        company_name: Set(String::new()),
        gst_number: Set(String::new()),
        preferred_delivery_time: Set(String::new()),
        special_instructions: Set(String::new()),
        total_orders: Set(0),
        total_spent: Set(Decimal::ZERO),
        average_order_value: Set(Decimal::ZERO),
        loyalty_points: Set(0),
        membership_tier: Set("bronze".to_string()),
        prefers_organic: Set(false),
        max_delivery_distance: Set(50),
        ..Default::default()
    }
}

/// Looks up the profile matching the account's role, if one exists.
pub async fn profile_for<C>(conn: &C, user: &user::Model) -> Result<Option<RoleProfile>>
where
    C: ConnectionTrait,
{
    let profile = match user.user_type {
        user::UserType::Farmer => farmer_profile::Entity::find()
            .filter(farmer_profile::Column::UserId.eq(user.id))
            .one(conn)
            .await?
            .map(RoleProfile::Farmer),
        user::UserType::Buyer | user::UserType::Vendor => buyer_profile::Entity::find()
            .filter(buyer_profile::Column::UserId.eq(user.id))
            .one(conn)
            .await?
            .map(RoleProfile::Buyer),
        user::UserType::Admin => None,
    };
    Ok(profile)
}

/// Creates the role profile for a freshly created account.
///
/// Returns the existing profile untouched when one is already present, and
/// `None` for administrators.
#[instrument(skip(conn, user), fields(user_id = user.id, user_type = ?user.user_type))]
pub async fn provision_profile<C>(conn: &C, user: &user::Model) -> Result<Option<RoleProfile>>
where
    C: ConnectionTrait,
{
    if let Some(existing) = profile_for(conn, user).await? {
        debug!(profile_id = existing.id(), "Profile already provisioned");
        return Ok(Some(existing));
    }

    let profile = match user.user_type {
        user::UserType::Farmer => {
            let defaults = FarmerDefaults::for_user(user);
            defaults.validate()?;
            let profile = defaults
                .into_active_model(user.id)
                .insert(conn)
                .await
                .map_err(map_unique_violation)?;
            Some(RoleProfile::Farmer(profile))
        }
        user::UserType::Buyer | user::UserType::Vendor => {
            let profile = default_buyer_profile(user.id)
                .insert(conn)
                .await
                .map_err(map_unique_violation)?;
            Some(RoleProfile::Buyer(profile))
        }
        user::UserType::Admin => None,
    };

    match &profile {
        Some(profile) => info!(
            profile_id = profile.id(),
            kind = profile.kind(),
            "Provisioned role profile"
        ),
        None => debug!("No role profile required"),
    }

    Ok(profile)
}

/// Writes the account's profile back after the account itself was saved.
///
/// A missing profile is reported as [`ProfileSync::NotProvisioned`]; every
/// other failure propagates.
#[instrument(skip(conn, user), fields(user_id = user.id))]
pub async fn sync_profile<C>(conn: &C, user: &user::Model) -> Result<ProfileSync>
where
    C: ConnectionTrait,
{
    if user.user_type == user::UserType::Admin {
        return Ok(ProfileSync::NoProfileRequired);
    }

    let Some(profile) = profile_for(conn, user).await? else {
        debug!("Profile not provisioned yet, skipping sync");
        return Ok(ProfileSync::NotProvisioned);
    };

    let now = Utc::now();
    let saved = match profile {
        RoleProfile::Farmer(profile) => {
            let mut active: farmer_profile::ActiveModel = profile.into();
            active.updated_at = Set(now);
            RoleProfile::Farmer(active.update(conn).await?)
        }
        RoleProfile::Buyer(profile) => {
            let mut active: buyer_profile::ActiveModel = profile.into();
            active.updated_at = Set(now);
            RoleProfile::Buyer(active.update(conn).await?)
        }
    };

    debug!(profile_id = saved.id(), "Profile synced");
    Ok(ProfileSync::Saved(saved))
}
