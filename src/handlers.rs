pub mod addresses;
pub mod health;
pub mod logins;
pub mod profiles;
pub mod users;
