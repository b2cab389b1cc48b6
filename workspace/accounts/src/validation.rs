//! Input types accepted by the account services and the rules they must satisfy.
//!
//! Every write path validates its input here before touching the database, so
//! the HTTP layer and any other caller get identical behaviour.

use std::borrow::Cow;
use std::net::IpAddr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use model::entities::address::AddressType;
use model::entities::buyer_profile::BuyerType;
use model::entities::farmer_profile::{FarmSize, FarmingType};
use model::entities::user::UserType;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidationError};

/// Indian mobile numbers: ten digits starting with 6-9, optional `+91` prefix.
static PHONE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\+91)?[6-9]\d{9}$").expect("phone number pattern"));

pub const DEFAULT_COUNTRY: &str = "India";

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

fn default_true() -> bool {
    true
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Reads a field of a partial update that may be cleared: a missing field
/// stays `None`, an explicit `null` becomes `Some(None)`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn check_coordinates(
    latitude: Option<&Decimal>,
    longitude: Option<&Decimal>,
) -> Result<(), ValidationError> {
    if let Some(latitude) = latitude {
        validate_latitude(latitude)?;
    }
    if let Some(longitude) = longitude {
        validate_longitude(longitude)?;
    }
    Ok(())
}

fn validate_user_changes(changes: &UserChanges) -> Result<(), ValidationError> {
    match changes.email.as_ref().and_then(Option::as_ref) {
        Some(email) if !email.validate_email() => Err(invalid("email", "Not a valid email address")),
        _ => Ok(()),
    }
}

fn validate_address_changes(changes: &AddressChanges) -> Result<(), ValidationError> {
    check_coordinates(
        changes.latitude.as_ref().and_then(Option::as_ref),
        changes.longitude.as_ref().and_then(Option::as_ref),
    )
}

fn validate_farmer_profile_changes(changes: &FarmerProfileChanges) -> Result<(), ValidationError> {
    check_coordinates(
        changes.farm_latitude.as_ref().and_then(Option::as_ref),
        changes.farm_longitude.as_ref().and_then(Option::as_ref),
    )
}

pub fn validate_phone_number(value: &str) -> Result<(), ValidationError> {
    if PHONE_NUMBER.is_match(value) {
        Ok(())
    } else {
        Err(invalid(
            "phone_number",
            "Phone number must be a 10 digit mobile number, optionally prefixed with +91",
        ))
    }
}

/// Stored form of a valid mobile number: the ten digits without the `+91` prefix,
/// so both spellings of one number collide on the unique column.
pub fn normalize_phone_number(value: &str) -> String {
    value.strip_prefix("+91").unwrap_or(value).to_string()
}

pub fn validate_ip_address(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<IpAddr>()
        .map(|_| ())
        .map_err(|_| invalid("ip_address", "Not a valid IPv4 or IPv6 address"))
}

pub fn validate_latitude(value: &Decimal) -> Result<(), ValidationError> {
    if (Decimal::from(-90)..=Decimal::from(90)).contains(value) {
        Ok(())
    } else {
        Err(invalid("latitude", "Latitude must lie between -90 and 90"))
    }
}

pub fn validate_longitude(value: &Decimal) -> Result<(), ValidationError> {
    if (Decimal::from(-180)..=Decimal::from(180)).contains(value) {
        Ok(())
    } else {
        Err(invalid("longitude", "Longitude must lie between -180 and 180"))
    }
}

pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(invalid("non_negative", "Value must not be negative"))
    } else {
        Ok(())
    }
}

/// Signup data for a new account.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
    #[serde(default)]
    pub user_type: UserType,
    #[validate(custom(function = "validate_phone_number"))]
    pub phone_number: String,
    pub profile_picture: Option<String>,
    pub date_of_birth: Option<NaiveDate>,

    #[serde(default)]
    #[validate(length(max = 255))]
    pub address_line_1: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub address_line_2: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub city: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub state: String,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub postal_code: String,
    #[serde(default = "default_country")]
    #[validate(length(max = 100))]
    pub country: String,

    #[serde(default)]
    #[validate(length(max = 200))]
    pub business_name: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub business_registration_number: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub tax_id: String,
}

impl NewUser {
    /// Minimal signup with every optional field left at its default.
    pub fn new(username: impl Into<String>, phone_number: impl Into<String>, user_type: UserType) -> Self {
        Self {
            username: username.into(),
            email: None,
            first_name: String::new(),
            last_name: String::new(),
            user_type,
            phone_number: phone_number.into(),
            profile_picture: None,
            date_of_birth: None,
            address_line_1: String::new(),
            address_line_2: String::new(),
            city: String::new(),
            state: String::new(),
            postal_code: String::new(),
            country: default_country(),
            business_name: String::new(),
            business_registration_number: String::new(),
            tax_id: String::new(),
        }
    }
}

/// Partial account update. The role tag is deliberately absent: it is fixed
/// once the role profile exists.
///
/// Nullable columns take `Option<Option<_>>`: `null` clears the column.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, Validate)]
#[validate(schema(function = "validate_user_changes"))]
pub struct UserChanges {
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    #[validate(custom(function = "validate_phone_number"))]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub profile_picture: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<NaiveDate>)]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[validate(length(max = 255))]
    pub address_line_1: Option<String>,
    #[validate(length(max = 255))]
    pub address_line_2: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub state: Option<String>,
    #[validate(length(max = 20))]
    pub postal_code: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    #[validate(length(max = 200))]
    pub business_name: Option<String>,
    #[validate(length(max = 100))]
    pub business_registration_number: Option<String>,
    #[validate(length(max = 50))]
    pub tax_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VerificationDecision {
    Verified,
    Rejected,
}

/// A new address book entry.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct NewAddress {
    pub address_type: AddressType,
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub address_line_1: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub address_line_2: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 100))]
    pub state: String,
    #[validate(length(min = 1, max = 20))]
    pub postal_code: String,
    #[serde(default = "default_country")]
    #[validate(length(min = 1, max = 100))]
    pub country: String,
    #[schema(value_type = Option<String>)]
    #[validate(custom(function = "validate_latitude"))]
    pub latitude: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    #[validate(custom(function = "validate_longitude"))]
    pub longitude: Option<Decimal>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl NewAddress {
    pub fn new(
        address_type: AddressType,
        title: impl Into<String>,
        address_line_1: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            address_type,
            title: title.into(),
            address_line_1: address_line_1.into(),
            address_line_2: String::new(),
            city: city.into(),
            state: state.into(),
            postal_code: postal_code.into(),
            country: default_country(),
            latitude: None,
            longitude: None,
            is_default: false,
            is_active: true,
        }
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, Validate)]
#[validate(schema(function = "validate_address_changes"))]
pub struct AddressChanges {
    pub address_type: Option<AddressType>,
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub address_line_1: Option<String>,
    #[validate(length(max = 255))]
    pub address_line_2: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub state: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub postal_code: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub latitude: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub longitude: Option<Option<Decimal>>,
    pub is_default: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, Validate)]
#[validate(schema(function = "validate_farmer_profile_changes"))]
pub struct FarmerProfileChanges {
    #[validate(length(min = 1, max = 200))]
    pub farm_name: Option<String>,
    pub farm_size: Option<FarmSize>,
    #[schema(value_type = Option<String>)]
    #[validate(custom(function = "validate_non_negative"))]
    pub farm_size_acres: Option<Decimal>,
    pub farming_type: Option<FarmingType>,
    #[validate(range(min = 0, max = 100))]
    pub farming_experience_years: Option<i32>,
    #[validate(length(min = 1))]
    pub farm_address: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub farm_latitude: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub farm_longitude: Option<Option<Decimal>>,
    pub organic_certified: Option<bool>,
    #[validate(length(max = 100))]
    pub organic_certification_number: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<NaiveDate>)]
    pub organic_certification_expiry: Option<Option<NaiveDate>>,
    #[validate(length(max = 50))]
    pub bank_account_number: Option<String>,
    #[validate(length(max = 100))]
    pub bank_name: Option<String>,
    #[validate(length(max = 100))]
    pub bank_branch: Option<String>,
    #[validate(length(max = 11))]
    pub ifsc_code: Option<String>,
    #[validate(length(max = 10))]
    pub pan_number: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub farm_photo: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub certification_document: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub id_proof: Option<Option<String>>,
    pub is_active_seller: Option<bool>,
    #[validate(length(min = 1, max = 50))]
    pub subscription_plan: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<chrono::DateTime<chrono::Utc>>)]
    pub subscription_expiry: Option<Option<chrono::DateTime<chrono::Utc>>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct BuyerProfileChanges {
    pub buyer_type: Option<BuyerType>,
    #[validate(length(max = 200))]
    pub company_name: Option<String>,
    #[validate(length(max = 15))]
    pub gst_number: Option<String>,
    #[validate(length(max = 50))]
    pub preferred_delivery_time: Option<String>,
    pub special_instructions: Option<String>,
    pub prefers_organic: Option<bool>,
    #[validate(range(min = 0))]
    pub max_delivery_distance: Option<i32>,
}

/// One login attempt as reported by the authentication layer.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct LoginAttempt {
    #[validate(custom(function = "validate_ip_address"))]
    pub ip_address: String,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default = "default_true")]
    pub successful: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_numbers() {
        assert!(validate_phone_number("9876543210").is_ok());
        assert!(validate_phone_number("+916123456789").is_ok());
        assert!(validate_phone_number("5876543210").is_err());
        assert!(validate_phone_number("987654321").is_err());
        assert!(validate_phone_number("+9198765432101").is_err());
        assert!(validate_phone_number("+449876543210").is_err());
        assert!(validate_phone_number("").is_err());
    }

    #[test]
    fn test_phone_number_normalization() {
        assert_eq!(normalize_phone_number("+919876543210"), "9876543210");
        assert_eq!(normalize_phone_number("9876543210"), "9876543210");
        assert_eq!(normalize_phone_number("9191234567"), "9191234567");
    }

    #[test]
    fn test_ip_addresses() {
        assert!(validate_ip_address("192.168.1.10").is_ok());
        assert!(validate_ip_address("::1").is_ok());
        assert!(validate_ip_address("300.1.1.1").is_err());
        assert!(validate_ip_address("localhost").is_err());
    }

    #[test]
    fn test_coordinates() {
        assert!(validate_latitude(&Decimal::new(18_520_430, 6)).is_ok());
        assert!(validate_latitude(&Decimal::from(-91)).is_err());
        assert!(validate_longitude(&Decimal::from(180)).is_ok());
        assert!(validate_longitude(&Decimal::new(1_800_001, 4)).is_err());
    }

    #[test]
    fn test_new_user_validation() {
        let user = NewUser::new("ravi", "9876543210", UserType::Farmer);
        assert!(user.validate().is_ok());
        assert_eq!(user.country, "India");

        let bad_phone = NewUser::new("ravi", "12345", UserType::Farmer);
        let errors = bad_phone.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("phone_number"));

        let blank_name = NewUser::new("", "9876543210", UserType::Buyer);
        assert!(blank_name.validate().is_err());

        let mut bad_email = NewUser::new("meera", "9876543210", UserType::Buyer);
        bad_email.email = Some("not-an-email".to_string());
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_new_user_defaults_from_json() {
        let user: NewUser =
            serde_json::from_str(r#"{"username": "meera", "phone_number": "9123456780"}"#).unwrap();
        assert_eq!(user.user_type, UserType::Buyer);
        assert_eq!(user.country, "India");
        assert!(user.validate().is_ok());
    }

    #[test]
    fn test_farmer_changes_experience_range() {
        let ok = FarmerProfileChanges {
            farming_experience_years: Some(100),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let too_long = FarmerProfileChanges {
            farming_experience_years: Some(101),
            ..Default::default()
        };
        assert!(too_long.validate().is_err());

        let negative_area = FarmerProfileChanges {
            farm_size_acres: Some(Decimal::new(-1, 0)),
            ..Default::default()
        };
        assert!(negative_area.validate().is_err());
    }

    #[test]
    fn test_null_clears_and_absent_keeps() {
        let changes: UserChanges = serde_json::from_str(r#"{"email": null, "city": "Pune"}"#).unwrap();
        assert_eq!(changes.email, Some(None));
        assert_eq!(changes.profile_picture, None);
        assert_eq!(changes.date_of_birth, None);
        assert!(changes.validate().is_ok());

        let changes: UserChanges = serde_json::from_str(r#"{"email": "meera@example.com"}"#).unwrap();
        assert_eq!(changes.email, Some(Some("meera@example.com".to_string())));
        assert!(changes.validate().is_ok());

        let changes: AddressChanges = serde_json::from_str(r#"{"latitude": null}"#).unwrap();
        assert_eq!(changes.latitude, Some(None));
        assert_eq!(changes.longitude, None);
    }

    #[test]
    fn test_clearable_fields_are_still_validated() {
        let bad_email = UserChanges {
            email: Some(Some("not-an-email".to_string())),
            ..Default::default()
        };
        assert!(bad_email.validate().is_err());

        let bad_latitude = AddressChanges {
            latitude: Some(Some(Decimal::from(95))),
            ..Default::default()
        };
        assert!(bad_latitude.validate().is_err());

        let bad_longitude = FarmerProfileChanges {
            farm_longitude: Some(Some(Decimal::from(-181))),
            ..Default::default()
        };
        assert!(bad_longitude.validate().is_err());

        let cleared = FarmerProfileChanges {
            farm_latitude: Some(None),
            farm_longitude: Some(None),
            ..Default::default()
        };
        assert!(cleared.validate().is_ok());
    }

    #[test]
    fn test_login_attempt_requires_ip() {
        let attempt = LoginAttempt {
            ip_address: "not-an-ip".to_string(),
            user_agent: String::new(),
            successful: true,
        };
        assert!(attempt.validate().is_err());
    }
}
