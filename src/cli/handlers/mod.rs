//! Command handlers for CLI operations
//!
//! Execution logic lives here, apart from parsing and validation.

pub mod check;
pub mod users;

pub use check::CheckCommandHandler;
pub use users::UsersCommandHandler;
