//! Application Layer
//!
//! Use cases composed from repository traits. Handlers own the HTTP
//! shape; these own the rules.

pub mod config;
pub mod current_account;
pub mod login;
pub mod logout;
pub mod refresh;

pub use config::AuthConfig;
pub use current_account::CurrentAccountUseCase;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use refresh::{RefreshOutput, RefreshUseCase};
