use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum FarmingType {
    #[sea_orm(string_value = "organic")]
    Organic,
    #[default]
    #[sea_orm(string_value = "conventional")]
    Conventional,
    #[sea_orm(string_value = "hydroponic")]
    Hydroponic,
    #[sea_orm(string_value = "mixed")]
    Mixed,
}

/// Coarse farm size bucket. The exact area lives in `farm_size_acres`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum FarmSize {
    /// Under 2 acres.
    #[default]
    #[sea_orm(string_value = "small")]
    Small,
    /// 2 to 10 acres.
    #[sea_orm(string_value = "medium")]
    Medium,
    /// 10 to 50 acres.
    #[sea_orm(string_value = "large")]
    Large,
    /// Over 50 acres.
    #[sea_orm(string_value = "industrial")]
    Industrial,
}

/// Agriculture-specific extension of a farmer's account.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "farmer_profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub user_id: i32,

    pub farm_name: String,
    pub farm_size: FarmSize,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub farm_size_acres: Decimal,
    pub farming_type: FarmingType,
    pub farming_experience_years: i32,

    /// Farm location, which may differ from the owner's postal address.
    pub farm_address: String,
    #[sea_orm(column_type = "Decimal(Some((9, 6)))", nullable)]
    pub farm_latitude: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((9, 6)))", nullable)]
    pub farm_longitude: Option<Decimal>,

    pub organic_certified: bool,
    pub organic_certification_number: String,
    pub organic_certification_expiry: Option<NaiveDate>,

    pub bank_account_number: String,
    pub bank_name: String,
    pub bank_branch: String,
    pub ifsc_code: String,
    pub pan_number: String,

    pub farm_photo: Option<String>,
    pub certification_document: Option<String>,
    pub id_proof: Option<String>,

    #[sea_orm(column_type = "Decimal(Some((3, 2)))")]
    pub average_rating: Decimal,
    pub total_reviews: i32,

    pub is_active_seller: bool,
    pub subscription_plan: String,
    pub subscription_expiry: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::UserId",
        to = "user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
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
    /// A subscription is active only while its expiry lies in the future.
    pub fn is_subscription_active(&self, now: DateTimeUtc) -> bool {
        self.subscription_expiry.is_some_and(|expiry| expiry > now)
    }
}
