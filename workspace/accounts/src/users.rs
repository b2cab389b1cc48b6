use std::sync::Arc;

use chrono::Utc;
use model::entities::user::{self, UserType, VerificationStatus};
use model::entities::{address, buyer_profile, farmer_profile, login_history};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::error::{AccountsError, Result, map_unique_violation};
use crate::pictures::{MAX_PICTURE_DIMENSION, PictureProcessor};
use crate::provisioning::{ProfileSync, RoleProfile, provision_profile, sync_profile};
use crate::validation::{NewUser, UserChanges, VerificationDecision, normalize_phone_number};

/// Account lifecycle: signup with profile provisioning, updates, review and deletion.
#[derive(Debug, Clone)]
pub struct UserService {
    db: DatabaseConnection,
    pictures: Option<Arc<dyn PictureProcessor>>,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, pictures: None }
    }

    /// Attaches the processor that bounds uploaded profile pictures.
    pub fn with_picture_processor(mut self, pictures: Arc<dyn PictureProcessor>) -> Self {
        self.pictures = Some(pictures);
        self
    }

    /// Creates an account together with its role profile.
    ///
    /// Both rows are written in one transaction: when provisioning fails the
    /// account is rolled back as well.
    #[instrument(skip(self, new_user), fields(username = %new_user.username, user_type = ?new_user.user_type))]
    pub async fn create(&self, new_user: NewUser) -> Result<(user::Model, Option<RoleProfile>)> {
        new_user.validate()?;
        let phone_number = normalize_phone_number(&new_user.phone_number);

        let txn = self.db.begin().await?;

        ensure_username_available(&txn, &new_user.username).await?;
        ensure_phone_available(&txn, &phone_number, None).await?;

        let user = user::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            user_type: Set(new_user.user_type),
            phone_number: Set(phone_number),
            profile_picture: Set(new_user.profile_picture),
            date_of_birth: Set(new_user.date_of_birth),
            address_line_1: Set(new_user.address_line_1),
            address_line_2: Set(new_user.address_line_2),
            city: Set(new_user.city),
            state: Set(new_user.state),
            postal_code: Set(new_user.postal_code),
            country: Set(new_user.country),
            is_verified: Set(false),
            verification_status: Set(VerificationStatus::Pending),
            verification_date: Set(None),
            business_name: Set(new_user.business_name),
            business_registration_number: Set(new_user.business_registration_number),
            tax_id: Set(new_user.tax_id),
            last_login_ip: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(map_unique_violation)?;

        let profile = provision_profile(&txn, &user).await?;

        txn.commit().await?;
        info!(user_id = user.id, "Account created");

        self.process_picture(&user).await?;

        Ok((user, profile))
    }

    pub async fn get(&self, user_id: i32) -> Result<user::Model> {
        find_user(&self.db, user_id).await
    }

    /// All accounts ordered by id, optionally restricted to one role.
    pub async fn list(&self, user_type: Option<UserType>) -> Result<Vec<user::Model>> {
        let mut query = user::Entity::find().order_by_asc(user::Column::Id);
        if let Some(user_type) = user_type {
            query = query.filter(user::Column::UserType.eq(user_type));
        }
        Ok(query.all(&self.db).await?)
    }

    /// Applies a partial update, then writes the role profile back.
    #[instrument(skip(self, changes))]
    pub async fn update(&self, user_id: i32, mut changes: UserChanges) -> Result<(user::Model, ProfileSync)> {
        changes.validate()?;
        changes.phone_number = changes.phone_number.as_deref().map(normalize_phone_number);

        let txn = self.db.begin().await?;
        let existing = find_user(&txn, user_id).await?;

        if let Some(phone_number) = &changes.phone_number {
            ensure_phone_available(&txn, phone_number, Some(user_id)).await?;
        }

        let mut active: user::ActiveModel = existing.into();
        let mut updated_fields = Vec::new();

        macro_rules! apply {
            ($($field:ident),* $(,)?) => {
                $(
                    if let Some(value) = changes.$field {
                        active.$field = Set(value);
                        updated_fields.push(stringify!($field));
                    }
                )*
            };
        }

        apply!(
            first_name,
            last_name,
            phone_number,
            address_line_1,
            address_line_2,
            city,
            state,
            postal_code,
            country,
            business_name,
            business_registration_number,
            tax_id,
            email,
            profile_picture,
            date_of_birth,
        );

        debug!(fields = ?updated_fields, "Updating account");

        let user = active.update(&txn).await.map_err(map_unique_violation)?;
        let sync = sync_profile(&txn, &user).await?;

        txn.commit().await?;
        info!(user_id, "Account updated");

        self.process_picture(&user).await?;

        Ok((user, sync))
    }

    /// Records the outcome of a manual account review.
    #[instrument(skip(self))]
    pub async fn verify(&self, user_id: i32, decision: VerificationDecision) -> Result<user::Model> {
        let existing = find_user(&self.db, user_id).await?;

        let mut active: user::ActiveModel = existing.into();
        match decision {
            VerificationDecision::Verified => {
                active.verification_status = Set(VerificationStatus::Verified);
                active.is_verified = Set(true);
            }
            VerificationDecision::Rejected => {
                active.verification_status = Set(VerificationStatus::Rejected);
                active.is_verified = Set(false);
            }
        }
        active.verification_date = Set(Some(Utc::now()));

        let user = active.update(&self.db).await?;
        info!(user_id, status = ?user.verification_status, "Verification recorded");
        Ok(user)
    }

    /// Deletes an account and everything it owns.
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: i32) -> Result<()> {
        let txn = self.db.begin().await?;
        find_user(&txn, user_id).await?;

        let logins = login_history::Entity::delete_many()
            .filter(login_history::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        let addresses = address::Entity::delete_many()
            .filter(address::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        farmer_profile::Entity::delete_many()
            .filter(farmer_profile::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        buyer_profile::Entity::delete_many()
            .filter(buyer_profile::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        user::Entity::delete_by_id(user_id).exec(&txn).await?;

        txn.commit().await?;
        info!(
            user_id,
            login_entries = logins.rows_affected,
            addresses = addresses.rows_affected,
            "Account deleted"
        );
        Ok(())
    }

    async fn process_picture(&self, user: &user::Model) -> Result<()> {
        let Some(path) = &user.profile_picture else {
            return Ok(());
        };
        match &self.pictures {
            Some(pictures) => pictures.fit_within(path, MAX_PICTURE_DIMENSION).await,
            None => {
                warn!(user_id = user.id, %path, "No picture processor configured, keeping picture as uploaded");
                Ok(())
            }
        }
    }
}

pub(crate) async fn find_user<C>(conn: &C, user_id: i32) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    user::Entity::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or(AccountsError::UserNotFound(user_id))
}

async fn ensure_username_available<C>(conn: &C, username: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let taken = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(conn)
        .await?
        .is_some();
    if taken {
        warn!(%username, "Username already taken");
        return Err(AccountsError::DuplicateUsername(username.to_string()));
    }
    Ok(())
}

async fn ensure_phone_available<C>(conn: &C, phone_number: &str, except_user: Option<i32>) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = user::Entity::find().filter(user::Column::PhoneNumber.eq(phone_number));
    if let Some(user_id) = except_user {
        query = query.filter(user::Column::Id.ne(user_id));
    }
    if query.one(conn).await?.is_some() {
        warn!(%phone_number, "Phone number already registered");
        return Err(AccountsError::DuplicatePhoneNumber(phone_number.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addresses::AddressBook;
    use crate::login_history::record_login;
    use crate::testing::{new_user, setup_db, setup_db_with_foreign_keys, signup};
    use crate::validation::{LoginAttempt, NewAddress};
    use async_trait::async_trait;
    use model::entities::address::AddressType;
    use sea_orm::PaginatorTrait;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingProcessor {
        calls: Mutex<Vec<(String, u32)>>,
    }

    #[async_trait]
    impl PictureProcessor for RecordingProcessor {
        async fn fit_within(&self, path: &str, max_dimension: u32) -> Result<()> {
            self.calls.lock().unwrap().push((path.to_string(), max_dimension));
            Ok(())
        }
    }

    #[derive(Debug)]
    struct FailingProcessor;

    #[async_trait]
    impl PictureProcessor for FailingProcessor {
        async fn fit_within(&self, path: &str, _max_dimension: u32) -> Result<()> {
            Err(AccountsError::Picture(format!("cannot decode {path}")))
        }
    }

    #[tokio::test]
    async fn test_create_farmer_provisions_farm() {
        let db = setup_db().await.unwrap();
        let service = UserService::new(db.clone());

        let (user, profile) = service.create(signup("ravi", UserType::Farmer)).await.unwrap();

        assert_eq!(user.verification_status, VerificationStatus::Pending);
        assert!(!user.is_verified);
        let Some(RoleProfile::Farmer(farm)) = profile else {
            panic!("expected a farmer profile");
        };
        assert_eq!(farm.user_id, user.id);
        assert_eq!(farm.farming_experience_years, 1);
        assert_eq!(
            farmer_profile::Entity::find()
                .filter(farmer_profile::Column::UserId.eq(user.id))
                .count(&db)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_create_each_role_gets_the_right_profile() {
        let db = setup_db().await.unwrap();
        let service = UserService::new(db.clone());

        let (_, buyer) = service.create(signup("meera", UserType::Buyer)).await.unwrap();
        let (_, vendor) = service.create(signup("kiran", UserType::Vendor)).await.unwrap();
        let (_, admin) = service.create(signup("root", UserType::Admin)).await.unwrap();

        assert!(matches!(buyer, Some(RoleProfile::Buyer(ref p)) if p.total_orders == 0));
        assert!(matches!(vendor, Some(RoleProfile::Buyer(ref p)) if p.total_orders == 0));
        assert_eq!(admin, None);
        assert_eq!(buyer_profile::Entity::find().count(&db).await.unwrap(), 2);
        assert_eq!(farmer_profile::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_phone_is_rejected() {
        let db = setup_db().await.unwrap();
        let service = UserService::new(db.clone());

        let mut first = signup("ravi", UserType::Farmer);
        first.phone_number = "9000000001".to_string();
        service.create(first).await.unwrap();

        let mut second = signup("asha", UserType::Buyer);
        second.phone_number = "9000000001".to_string();
        let err = service.create(second).await.unwrap_err();

        assert!(matches!(err, AccountsError::DuplicatePhoneNumber(ref phone) if phone == "9000000001"));
        assert_eq!(user::Entity::find().count(&db).await.unwrap(), 1);
        assert_eq!(buyer_profile::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let db = setup_db().await.unwrap();
        let service = UserService::new(db.clone());

        service.create(signup("ravi", UserType::Farmer)).await.unwrap();
        let err = service.create(signup("ravi", UserType::Buyer)).await.unwrap_err();

        assert!(matches!(err, AccountsError::DuplicateUsername(_)));
    }

    #[tokio::test]
    async fn test_invalid_phone_is_rejected_before_insert() {
        let db = setup_db().await.unwrap();
        let service = UserService::new(db.clone());

        let mut new_user = signup("ravi", UserType::Farmer);
        new_user.phone_number = "12345".to_string();
        let err = service.create(new_user).await.unwrap_err();

        assert!(matches!(err, AccountsError::Validation(_)));
        assert_eq!(user::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_provisioning_rolls_back_account() {
        let db = setup_db().await.unwrap();
        let service = UserService::new(db.clone());

        // Without the profile table the account insert succeeds but provisioning cannot
        db.execute_unprepared("DROP TABLE farmer_profiles;").await.unwrap();

        let err = service.create(signup("ravi", UserType::Farmer)).await.unwrap_err();

        assert!(matches!(err, AccountsError::Database(_)));
        assert_eq!(user::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_syncs_profile() {
        let db = setup_db().await.unwrap();
        let service = UserService::new(db.clone());
        let user = new_user(&db, "meera", UserType::Buyer).await;

        let changes = UserChanges {
            city: Some("Pune".to_string()),
            business_name: Some("Meera Foods".to_string()),
            ..Default::default()
        };
        let (updated, sync) = service.update(user.id, changes).await.unwrap();

        assert_eq!(updated.city, "Pune");
        assert_eq!(updated.business_name, "Meera Foods");
        assert_eq!(updated.user_type, UserType::Buyer);
        assert!(matches!(sync, ProfileSync::Saved(RoleProfile::Buyer(_))));
    }

    #[tokio::test]
    async fn test_update_clears_optional_fields() {
        let db = setup_db().await.unwrap();
        let service = UserService::new(db.clone());
        let user = new_user(&db, "meera", UserType::Buyer).await;

        let changes = UserChanges {
            email: Some(Some("meera@example.com".to_string())),
            date_of_birth: Some(chrono::NaiveDate::from_ymd_opt(1990, 4, 12)),
            ..Default::default()
        };
        let (updated, _) = service.update(user.id, changes).await.unwrap();
        assert_eq!(updated.email.as_deref(), Some("meera@example.com"));
        assert!(updated.date_of_birth.is_some());

        // Untouched fields survive, explicit clears empty the column
        let changes = UserChanges {
            email: Some(None),
            ..Default::default()
        };
        let (updated, _) = service.update(user.id, changes).await.unwrap();
        assert_eq!(updated.email, None);
        assert!(updated.date_of_birth.is_some());
    }

    #[tokio::test]
    async fn test_update_rejects_phone_of_other_account() {
        let db = setup_db().await.unwrap();
        let service = UserService::new(db.clone());
        let ravi = new_user(&db, "ravi", UserType::Farmer).await;
        let meera = new_user(&db, "meera", UserType::Buyer).await;

        let changes = UserChanges {
            phone_number: Some(ravi.phone_number.clone()),
            ..Default::default()
        };
        let err = service.update(meera.id, changes).await.unwrap_err();
        assert!(matches!(err, AccountsError::DuplicatePhoneNumber(_)));

        // Re-submitting one's own number is fine
        let own = UserChanges {
            phone_number: Some(meera.phone_number.clone()),
            ..Default::default()
        };
        assert!(service.update(meera.id, own).await.is_ok());
    }

    #[tokio::test]
    async fn test_phone_prefix_does_not_bypass_uniqueness() {
        let db = setup_db().await.unwrap();
        let service = UserService::new(db.clone());

        let (ravi, _) = service
            .create(NewUser::new("ravi", "+919876543210", UserType::Farmer))
            .await
            .unwrap();
        assert_eq!(ravi.phone_number, "9876543210");

        let err = service
            .create(NewUser::new("meera", "9876543210", UserType::Buyer))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountsError::DuplicatePhoneNumber(_)));

        let (meera, _) = service
            .create(NewUser::new("meera", "9123456780", UserType::Buyer))
            .await
            .unwrap();
        let changes = UserChanges {
            phone_number: Some("+919876543210".to_string()),
            ..Default::default()
        };
        let err = service.update(meera.id, changes).await.unwrap_err();
        assert!(matches!(err, AccountsError::DuplicatePhoneNumber(_)));
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let db = setup_db().await.unwrap();
        let service = UserService::new(db);

        let err = service.update(42, UserChanges::default()).await.unwrap_err();
        assert!(matches!(err, AccountsError::UserNotFound(42)));
    }

    #[tokio::test]
    async fn test_verify_and_reject() {
        let db = setup_db().await.unwrap();
        let service = UserService::new(db.clone());
        let user = new_user(&db, "ravi", UserType::Farmer).await;

        let verified = service.verify(user.id, VerificationDecision::Verified).await.unwrap();
        assert!(verified.is_verified);
        assert_eq!(verified.verification_status, VerificationStatus::Verified);
        assert!(verified.verification_date.is_some());

        let rejected = service.verify(user.id, VerificationDecision::Rejected).await.unwrap();
        assert!(!rejected.is_verified);
        assert_eq!(rejected.verification_status, VerificationStatus::Rejected);
    }

    #[tokio::test]
    async fn test_list_filters_by_role() {
        let db = setup_db().await.unwrap();
        let service = UserService::new(db.clone());
        new_user(&db, "ravi", UserType::Farmer).await;
        new_user(&db, "meera", UserType::Buyer).await;
        new_user(&db, "asha", UserType::Farmer).await;

        assert_eq!(service.list(None).await.unwrap().len(), 3);
        let farmers = service.list(Some(UserType::Farmer)).await.unwrap();
        assert_eq!(farmers.len(), 2);
        assert!(farmers.iter().all(|u| u.is_farmer()));
    }

    async fn assert_delete_removes_owned_rows(db: DatabaseConnection) {
        let service = UserService::new(db.clone());
        let book = AddressBook::new(db.clone());
        let farmer = new_user(&db, "ravi", UserType::Farmer).await;
        let buyer = new_user(&db, "meera", UserType::Buyer).await;

        for user_id in [farmer.id, buyer.id] {
            book.create(
                user_id,
                NewAddress::new(AddressType::Home, "Home", "12 MG Road", "Pune", "Maharashtra", "411001"),
            )
            .await
            .unwrap();
            let attempt = LoginAttempt {
                ip_address: "10.0.0.7".to_string(),
                user_agent: "curl/8.0".to_string(),
                successful: true,
            };
            record_login(&db, user_id, attempt).await.unwrap();
        }

        service.delete(farmer.id).await.unwrap();

        assert!(matches!(service.get(farmer.id).await, Err(AccountsError::UserNotFound(_))));
        assert_eq!(farmer_profile::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(
            address::Entity::find()
                .filter(address::Column::UserId.eq(farmer.id))
                .count(&db)
                .await
                .unwrap(),
            0
        );
        assert_eq!(
            login_history::Entity::find()
                .filter(login_history::Column::UserId.eq(farmer.id))
                .count(&db)
                .await
                .unwrap(),
            0
        );
        assert!(matches!(
            service.delete(farmer.id).await,
            Err(AccountsError::UserNotFound(_))
        ));

        // The other account keeps its rows
        assert_eq!(address::Entity::find().count(&db).await.unwrap(), 1);
        assert_eq!(login_history::Entity::find().count(&db).await.unwrap(), 1);
        assert_eq!(buyer_profile::Entity::find().count(&db).await.unwrap(), 1);

        service.delete(buyer.id).await.unwrap();
        assert_eq!(address::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(login_history::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(buyer_profile::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_removes_owned_rows() {
        assert_delete_removes_owned_rows(setup_db().await.unwrap()).await;
    }

    #[tokio::test]
    async fn test_delete_removes_owned_rows_without_foreign_keys() {
        assert_delete_removes_owned_rows(setup_db_with_foreign_keys(false).await.unwrap()).await;
    }

    #[tokio::test]
    async fn test_picture_is_bounded_after_save() {
        let db = setup_db().await.unwrap();
        let processor = Arc::new(RecordingProcessor::default());
        let service = UserService::new(db.clone()).with_picture_processor(processor.clone());

        let mut new_user = signup("ravi", UserType::Farmer);
        new_user.profile_picture = Some("profile_pics/ravi.jpg".to_string());
        let (user, _) = service.create(new_user).await.unwrap();

        // Saving without a picture change still re-checks the stored picture
        service.update(user.id, UserChanges::default()).await.unwrap();

        let calls = processor.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                ("profile_pics/ravi.jpg".to_string(), MAX_PICTURE_DIMENSION),
                ("profile_pics/ravi.jpg".to_string(), MAX_PICTURE_DIMENSION),
            ]
        );
    }

    #[tokio::test]
    async fn test_picture_not_processed_without_picture() {
        let db = setup_db().await.unwrap();
        let processor = Arc::new(RecordingProcessor::default());
        let service = UserService::new(db.clone()).with_picture_processor(processor.clone());

        service.create(signup("meera", UserType::Buyer)).await.unwrap();

        assert!(processor.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_picture_failure_surfaces_after_commit() {
        let db = setup_db().await.unwrap();
        let service = UserService::new(db.clone()).with_picture_processor(Arc::new(FailingProcessor));

        let mut new_user = signup("ravi", UserType::Farmer);
        new_user.profile_picture = Some("profile_pics/broken.png".to_string());
        let err = service.create(new_user).await.unwrap_err();

        assert!(matches!(err, AccountsError::Picture(_)));
        // The account itself was committed before the picture step
        assert_eq!(user::Entity::find().count(&db).await.unwrap(), 1);
    }
}
