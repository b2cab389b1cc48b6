use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string_len(Users::Username, 150).unique_key())
                    .col(string_null(Users::Email))
                    .col(string_len(Users::FirstName, 150).default(""))
                    .col(string_len(Users::LastName, 150).default(""))
                    .col(string_len(Users::UserType, 20).default("buyer"))
                    .col(string_len(Users::PhoneNumber, 17).unique_key())
                    .col(string_null(Users::ProfilePicture))
                    .col(date_null(Users::DateOfBirth))
                    .col(string_len(Users::AddressLine1, 255).default(""))
                    .col(string_len(Users::AddressLine2, 255).default(""))
                    .col(string_len(Users::City, 100).default(""))
                    .col(string_len(Users::State, 100).default(""))
                    .col(string_len(Users::PostalCode, 20).default(""))
                    .col(string_len(Users::Country, 100).default("India"))
                    .col(boolean(Users::IsVerified).default(false))
                    .col(string_len(Users::VerificationStatus, 20).default("pending"))
                    .col(timestamp_with_time_zone_null(Users::VerificationDate))
                    .col(string_len(Users::BusinessName, 200).default(""))
                    .col(string_len(Users::BusinessRegistrationNumber, 100).default(""))
                    .col(string_len(Users::TaxId, 50).default(""))
                    .col(timestamp_with_time_zone(Users::CreatedAt))
                    .col(timestamp_with_time_zone(Users::UpdatedAt))
                    .col(string_null(Users::LastLoginIp))
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_users_user_type", Users::UserType),
            ("idx_users_verification_status", Users::VerificationStatus),
            ("idx_users_phone_number", Users::PhoneNumber),
            ("idx_users_created_at", Users::CreatedAt),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Users::Table)
                        .col(column)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        // Create farmer_profiles table
        manager
            .create_table(
                Table::create()
                    .table(FarmerProfiles::Table)
                    .if_not_exists()
                    .col(pk_auto(FarmerProfiles::Id))
                    .col(integer(FarmerProfiles::UserId).unique_key())
                    .col(string_len(FarmerProfiles::FarmName, 200))
                    .col(string_len(FarmerProfiles::FarmSize, 20))
                    .col(decimal_len(FarmerProfiles::FarmSizeAcres, 10, 2))
                    .col(string_len(FarmerProfiles::FarmingType, 20).default("conventional"))
                    .col(integer(FarmerProfiles::FarmingExperienceYears))
                    .col(text(FarmerProfiles::FarmAddress))
                    .col(decimal_len_null(FarmerProfiles::FarmLatitude, 9, 6))
                    .col(decimal_len_null(FarmerProfiles::FarmLongitude, 9, 6))
                    .col(boolean(FarmerProfiles::OrganicCertified).default(false))
                    .col(string_len(FarmerProfiles::OrganicCertificationNumber, 100).default(""))
                    .col(date_null(FarmerProfiles::OrganicCertificationExpiry))
                    .col(string_len(FarmerProfiles::BankAccountNumber, 50).default(""))
                    .col(string_len(FarmerProfiles::BankName, 100).default(""))
                    .col(string_len(FarmerProfiles::BankBranch, 100).default(""))
                    .col(string_len(FarmerProfiles::IfscCode, 11).default(""))
                    .col(string_len(FarmerProfiles::PanNumber, 10).default(""))
                    .col(string_null(FarmerProfiles::FarmPhoto))
                    .col(string_null(FarmerProfiles::CertificationDocument))
                    .col(string_null(FarmerProfiles::IdProof))
                    .col(decimal_len(FarmerProfiles::AverageRating, 3, 2).default(0))
                    .col(integer(FarmerProfiles::TotalReviews).default(0))
                    .col(boolean(FarmerProfiles::IsActiveSeller).default(true))
                    .col(string_len(FarmerProfiles::SubscriptionPlan, 50).default("basic"))
                    .col(timestamp_with_time_zone_null(FarmerProfiles::SubscriptionExpiry))
                    .col(timestamp_with_time_zone(FarmerProfiles::CreatedAt))
                    .col(timestamp_with_time_zone(FarmerProfiles::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_farmer_profiles_user")
                            .from(FarmerProfiles::Table, FarmerProfiles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_farmer_profiles_farming_type", FarmerProfiles::FarmingType),
            ("idx_farmer_profiles_farm_size", FarmerProfiles::FarmSize),
            ("idx_farmer_profiles_organic_certified", FarmerProfiles::OrganicCertified),
            ("idx_farmer_profiles_is_active_seller", FarmerProfiles::IsActiveSeller),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(FarmerProfiles::Table)
                        .col(column)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        // Create buyer_profiles table
        manager
            .create_table(
                Table::create()
                    .table(BuyerProfiles::Table)
                    .if_not_exists()
                    .col(pk_auto(BuyerProfiles::Id))
                    .col(integer(BuyerProfiles::UserId).unique_key())
                    .col(string_len(BuyerProfiles::BuyerType, 20).default("individual"))
                    .col(string_len(BuyerProfiles::CompanyName, 200).default(""))
                    .col(string_len(BuyerProfiles::GstNumber, 15).default(""))
                    .col(string_len(BuyerProfiles::PreferredDeliveryTime, 50).default(""))
                    .col(text(BuyerProfiles::SpecialInstructions).default(""))
                    .col(integer(BuyerProfiles::TotalOrders).default(0))
                    .col(decimal_len(BuyerProfiles::TotalSpent, 12, 2).default(0))
                    .col(decimal_len(BuyerProfiles::AverageOrderValue, 10, 2).default(0))
                    .col(integer(BuyerProfiles::LoyaltyPoints).default(0))
                    .col(string_len(BuyerProfiles::MembershipTier, 20).default("bronze"))
                    .col(boolean(BuyerProfiles::PrefersOrganic).default(false))
                    .col(integer(BuyerProfiles::MaxDeliveryDistance).default(50))
                    .col(timestamp_with_time_zone(BuyerProfiles::CreatedAt))
                    .col(timestamp_with_time_zone(BuyerProfiles::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_buyer_profiles_user")
                            .from(BuyerProfiles::Table, BuyerProfiles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_buyer_profiles_buyer_type", BuyerProfiles::BuyerType),
            ("idx_buyer_profiles_membership_tier", BuyerProfiles::MembershipTier),
            ("idx_buyer_profiles_prefers_organic", BuyerProfiles::PrefersOrganic),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(BuyerProfiles::Table)
                        .col(column)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(BuyerProfiles::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(FarmerProfiles::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Username,
    Email,
    FirstName,
    LastName,
    UserType,
    PhoneNumber,
    ProfilePicture,
    DateOfBirth,
    #[sea_orm(iden = "address_line_1")]
    AddressLine1,
    #[sea_orm(iden = "address_line_2")]
    AddressLine2,
    City,
    State,
    PostalCode,
    Country,
    IsVerified,
    VerificationStatus,
    VerificationDate,
    BusinessName,
    BusinessRegistrationNumber,
    TaxId,
    CreatedAt,
    UpdatedAt,
    LastLoginIp,
}

#[derive(DeriveIden)]
enum FarmerProfiles {
    Table,
    Id,
    UserId,
    FarmName,
    FarmSize,
    FarmSizeAcres,
    FarmingType,
    FarmingExperienceYears,
    FarmAddress,
    FarmLatitude,
    FarmLongitude,
    OrganicCertified,
    OrganicCertificationNumber,
    OrganicCertificationExpiry,
    BankAccountNumber,
    BankName,
    BankBranch,
    IfscCode,
    PanNumber,
    FarmPhoto,
    CertificationDocument,
    IdProof,
    AverageRating,
    TotalReviews,
    IsActiveSeller,
    SubscriptionPlan,
    SubscriptionExpiry,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BuyerProfiles {
    Table,
    Id,
    UserId,
    BuyerType,
    CompanyName,
    GstNumber,
    PreferredDeliveryTime,
    SpecialInstructions,
    TotalOrders,
    TotalSpent,
    AverageOrderValue,
    LoyaltyPoints,
    MembershipTier,
    PrefersOrganic,
    MaxDeliveryDistance,
    CreatedAt,
    UpdatedAt,
}
