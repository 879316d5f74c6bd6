//! Domain Value Objects

pub mod account_status;
pub mod email;
pub mod login_identifier;
pub mod password;
pub mod role;
pub mod user_name;

pub use account_status::AccountStatus;
pub use email::Email;
pub use login_identifier::LoginIdentifier;
pub use password::{PasswordDigest, RawPassword};
pub use role::Role;
pub use user_name::UserName;
