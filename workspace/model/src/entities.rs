//! This file serves as the root for all SeaORM entity modules.
//! The data model covers platform accounts, their role-specific profiles,
//! address books and the login audit log.

pub mod address;
pub mod buyer_profile;
pub mod farmer_profile;
pub mod login_history;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::address::Entity as Address;
    pub use super::buyer_profile::Entity as BuyerProfile;
    pub use super::farmer_profile::Entity as FarmerProfile;
    pub use super::login_history::Entity as LoginHistory;
    pub use super::user::Entity as User;
}

/// Joins the non-blank parts of an address with `", "`.
pub(crate) fn join_address_parts(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    fn new_user(username: &str, phone: &str, user_type: user::UserType) -> user::ActiveModel {
        user::ActiveModel {
            username: Set(username.to_string()),
            email: Set(None),
            first_name: Set(String::new()),
            last_name: Set(String::new()),
            user_type: Set(user_type),
            phone_number: Set(phone.to_string()),
            profile_picture: Set(None),
            date_of_birth: Set(None),
            address_line_1: Set(String::new()),
            address_line_2: Set(String::new()),
            city: Set(String::new()),
            state: Set(String::new()),
            postal_code: Set(String::new()),
            country: Set("India".to_string()),
            is_verified: Set(false),
            verification_status: Set(user::VerificationStatus::Pending),
            verification_date: Set(None),
            business_name: Set(String::new()),
            business_registration_number: Set(String::new()),
            tax_id: Set(String::new()),
            last_login_ip: Set(None),
            ..Default::default()
        }
    }

    fn new_address(user_id: i32, title: &str, is_default: bool) -> address::ActiveModel {
        address::ActiveModel {
            user_id: Set(user_id),
            address_type: Set(address::AddressType::Home),
            title: Set(title.to_string()),
            address_line_1: Set("1 Market Street".to_string()),
            address_line_2: Set(String::new()),
            city: Set("Pune".to_string()),
            state: Set("Maharashtra".to_string()),
            postal_code: Set("411001".to_string()),
            country: Set("India".to_string()),
            latitude: Set(None),
            longitude: Set(None),
            is_default: Set(is_default),
            is_active: Set(true),
            ..Default::default()
        }
    }

    #[test]
    fn test_join_address_parts() {
        assert_eq!(join_address_parts(&["a", "", " ", "b"]), "a, b");
        assert_eq!(join_address_parts(&["", ""]), "");
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let farmer = new_user("ravi", "9876543210", user::UserType::Farmer)
            .insert(&db)
            .await?;
        let buyer = new_user("meera", "+919123456780", user::UserType::Buyer)
            .insert(&db)
            .await?;

        assert!(farmer.created_at <= farmer.updated_at);

        farmer_profile::ActiveModel {
            user_id: Set(farmer.id),
            farm_name: Set("ravi's Farm".to_string()),
            farm_size: Set(farmer_profile::FarmSize::Small),
            farm_size_acres: Set(Decimal::new(100, 2)),
            farming_type: Set(farmer_profile::FarmingType::Organic),
            farming_experience_years: Set(4),
            farm_address: Set("Not specified".to_string()),
            farm_latitude: Set(Some(Decimal::new(19_997_500, 6))),
            farm_longitude: Set(Some(Decimal::new(73_789_800, 6))),
            organic_certified: Set(true),
            organic_certification_number: Set("ORG-1".to_string()),
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
        .insert(&db)
        .await?;

        buyer_profile::ActiveModel {
            user_id: Set(buyer.id),
            buyer_type: Set(buyer_profile::BuyerType::Restaurant),
            company_name: Set("Spice Route".to_string()),
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
        .insert(&db)
        .await?;

        new_address(farmer.id, "Home", true).insert(&db).await?;
        new_address(farmer.id, "Main Farm", false).insert(&db).await?;

        // (user, title) is unique
        let duplicate = new_address(farmer.id, "Home", false).insert(&db).await;
        assert!(duplicate.is_err());

        // Same title for another user is fine
        new_address(buyer.id, "Home", true).insert(&db).await?;

        login_history::ActiveModel {
            user_id: Set(farmer.id),
            login_time: Set(Utc::now()),
            ip_address: Set("10.0.0.1".to_string()),
            user_agent: Set("curl/8.0".to_string()),
            login_successful: Set(true),
            logout_time: Set(None),
            session_duration_seconds: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Phone numbers are unique
        let duplicate_phone = new_user("other", "9876543210", user::UserType::Buyer)
            .insert(&db)
            .await;
        assert!(duplicate_phone.is_err());

        // Relations
        let farm = farmer
            .find_related(FarmerProfile)
            .one(&db)
            .await?
            .expect("farmer profile");
        assert_eq!(farm.farming_type, farmer_profile::FarmingType::Organic);
        assert!(farm.farm_latitude.is_some());

        let farmer_addresses = farmer.find_related(Address).all(&db).await?;
        assert_eq!(farmer_addresses.len(), 2);

        let buyer_profile = buyer
            .find_related(BuyerProfile)
            .one(&db)
            .await?
            .expect("buyer profile");
        assert_eq!(buyer_profile.buyer_type.label(), "Restaurant/Hotel");

        // Deleting the account cascades to everything it owns
        farmer.clone().delete(&db).await?;

        assert_eq!(
            FarmerProfile::find()
                .filter(farmer_profile::Column::UserId.eq(farmer.id))
                .count(&db)
                .await?,
            0
        );
        assert_eq!(
            Address::find()
                .filter(address::Column::UserId.eq(farmer.id))
                .count(&db)
                .await?,
            0
        );
        assert_eq!(
            LoginHistory::find()
                .filter(login_history::Column::UserId.eq(farmer.id))
                .count(&db)
                .await?,
            0
        );
        assert_eq!(User::find().count(&db).await?, 1);

        Ok(())
    }
}
