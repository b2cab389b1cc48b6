use chrono::{NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{address, buyer_profile, farmer_profile, join_address_parts, login_history};

/// The role a participant plays on the platform.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[sea_orm(string_value = "farmer")]
    Farmer,
    #[default]
    #[sea_orm(string_value = "buyer")]
    Buyer,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "vendor")]
    Vendor,
}

impl UserType {
    /// Human readable label, as shown in listings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Farmer => "Farmer",
            Self::Buyer => "Buyer",
            Self::Admin => "Administrator",
            Self::Vendor => "Vendor/Supplier",
        }
    }

    /// Buyers and vendors share the buyer profile.
    pub fn uses_buyer_profile(&self) -> bool {
        matches!(self, Self::Buyer | Self::Vendor)
    }
}

/// Outcome of the manual account review.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "verified")]
    Verified,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Core identity record for any platform participant (farmer, buyer, vendor, admin).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
    /// Indian mobile number, stored without the `+91` prefix.
    #[sea_orm(unique)]
    pub phone_number: String,
    /// Stored path of the uploaded picture.
    pub profile_picture: Option<String>,
    pub date_of_birth: Option<NaiveDate>,

    pub address_line_1: String,
    pub address_line_2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,

    pub is_verified: bool,
    pub verification_status: VerificationStatus,
    pub verification_date: Option<DateTimeUtc>,

    // Only meaningful for farmers and vendors.
    pub business_name: String,
    pub business_registration_number: String,
    pub tax_id: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub last_login_ip: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::farmer_profile::Entity")]
    FarmerProfile,
    #[sea_orm(has_one = "super::buyer_profile::Entity")]
    BuyerProfile,
    #[sea_orm(has_many = "super::address::Entity")]
    Address,
    #[sea_orm(has_many = "super::login_history::Entity")]
    LoginHistory,
}

impl Related<farmer_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FarmerProfile.def()
    }
}

impl Related<buyer_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BuyerProfile.def()
    }
}

impl Related<address::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Address.def()
    }
}

impl Related<login_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoginHistory.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now();
        if insert && matches!(self.created_at, ActiveValue::NotSet) {
            self.created_at = ActiveValue::Set(now);
        }
        self.updated_at = ActiveValue::Set(now);
        Ok(self)
    }
}

impl Model {
    /// Formatted postal address, skipping blank parts.
    pub fn full_address(&self) -> String {
        join_address_parts(&[
            &self.address_line_1,
            &self.address_line_2,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
        ])
    }

    pub fn is_farmer(&self) -> bool {
        self.user_type == UserType::Farmer
    }

    pub fn is_buyer(&self) -> bool {
        self.user_type == UserType::Buyer
    }

    pub fn is_vendor(&self) -> bool {
        self.user_type == UserType::Vendor
    }

    /// e.g. `ravi (Farmer)`
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.username, self.user_type.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Model {
        let now = Utc::now();
        Model {
            id: 1,
            username: "ravi".to_string(),
            email: None,
            first_name: String::new(),
            last_name: String::new(),
            user_type: UserType::Farmer,
            phone_number: "9876543210".to_string(),
            profile_picture: None,
            date_of_birth: None,
            address_line_1: "12 Canal Road".to_string(),
            address_line_2: String::new(),
            city: "Nashik".to_string(),
            state: "Maharashtra".to_string(),
            postal_code: "422001".to_string(),
            country: "India".to_string(),
            is_verified: false,
            verification_status: VerificationStatus::Pending,
            verification_date: None,
            business_name: String::new(),
            business_registration_number: String::new(),
            tax_id: String::new(),
            created_at: now,
            updated_at: now,
            last_login_ip: None,
        }
    }

    #[test]
    fn test_full_address_skips_blank_parts() {
        let user = sample();
        assert_eq!(
            user.full_address(),
            "12 Canal Road, Nashik, Maharashtra, 422001, India"
        );
    }

    #[test]
    fn test_full_address_empty_when_everything_blank() {
        let mut user = sample();
        user.address_line_1.clear();
        user.city.clear();
        user.state.clear();
        user.postal_code.clear();
        user.country.clear();
        assert_eq!(user.full_address(), "");
    }

    #[test]
    fn test_role_helpers() {
        let mut user = sample();
        assert!(user.is_farmer());
        assert!(!user.is_buyer());
        assert_eq!(user.display_name(), "ravi (Farmer)");

        user.user_type = UserType::Vendor;
        assert!(user.is_vendor());
        assert!(user.user_type.uses_buyer_profile());
        assert_eq!(user.display_name(), "ravi (Vendor/Supplier)");

        assert!(!UserType::Admin.uses_buyer_profile());
        assert_eq!(UserType::default(), UserType::Buyer);
    }
}
