use chrono::Utc;
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
pub enum BuyerType {
    #[default]
    #[sea_orm(string_value = "individual")]
    Individual,
    #[sea_orm(string_value = "retailer")]
    Retailer,
    #[sea_orm(string_value = "wholesaler")]
    Wholesaler,
    #[sea_orm(string_value = "restaurant")]
    Restaurant,
    #[sea_orm(string_value = "institution")]
    Institution,
}

impl BuyerType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Individual => "Individual Consumer",
            Self::Retailer => "Retailer",
            Self::Wholesaler => "Wholesaler",
            Self::Restaurant => "Restaurant/Hotel",
            Self::Institution => "Institution",
        }
    }
}

/// Profile shared by buyers and vendors: consumers, retailers, wholesalers.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "buyer_profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub user_id: i32,

    pub buyer_type: BuyerType,
    pub company_name: String,
    pub gst_number: String,

    pub preferred_delivery_time: String,
    pub special_instructions: String,

    /// Purchase history summary, maintained by the purchase statistics aggregator.
    pub total_orders: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_spent: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub average_order_value: Decimal,

    pub loyalty_points: i32,
    pub membership_tier: String,

    pub prefers_organic: bool,
    /// Kilometres.
    pub max_delivery_distance: i32,

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

/// Running purchase aggregates of a buyer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PurchaseStats {
    pub total_orders: i32,
    pub total_spent: Decimal,
    pub average_order_value: Decimal,
}

impl PurchaseStats {
    /// Folds one completed order into the aggregates.
    ///
    /// Returns `None` when the order count or the total would overflow.
    /// The average is kept at two decimal places, matching the column scale.
    pub fn record(self, order_amount: Decimal) -> Option<Self> {
        let total_orders = self.total_orders.checked_add(1)?;
        let total_spent = self.total_spent.checked_add(order_amount)?;
        let average_order_value = total_spent
            .checked_div(Decimal::from(total_orders))?
            .round_dp(2);
        Some(Self {
            total_orders,
            total_spent,
            average_order_value,
        })
    }
}

impl Model {
    pub fn purchase_stats(&self) -> PurchaseStats {
        PurchaseStats {
            total_orders: self.total_orders,
            total_spent: self.total_spent,
            average_order_value: self.average_order_value,
        }
    }
}
