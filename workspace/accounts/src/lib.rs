//! Account management for the marketplace: signup with role-profile
//! provisioning, address books, login history and buyer purchase statistics.

pub mod addresses;
pub mod error;
pub mod login_history;
pub mod pictures;
pub mod profiles;
pub mod provisioning;
pub mod purchases;
pub mod users;
pub mod validation;

#[cfg(test)]
mod testing;

pub use addresses::AddressBook;
pub use error::{AccountsError, Result};
pub use pictures::{MAX_PICTURE_DIMENSION, PictureProcessor};
pub use provisioning::{ProfileSync, RoleProfile};
pub use users::UserService;
