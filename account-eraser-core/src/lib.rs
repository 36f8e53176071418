//! Account Eraser Core Library
//!
//! Business logic for erasing an account's personal data, including:
//! - Erasure Authorizer (self-delete vs delete-any)
//! - Account Eraser (ordered, resumable removal of emails, keys, identities, name and active flag)
//! - Account Deletion Service (authorize, then erase)
//!
//! The host's account directory and permission system are abstracted through traits,
//! so the same logic runs against any backend that implements them.

pub mod error;
pub mod services;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult, DirectoryError, DirectoryResult, ErasureFailure};
pub use services::{AccountDeletionService, AccountEraser, ErasureAuthorizer, ServiceContext};
pub use traits::{AccountDirectory, AccountDirectoryViews, PermissionOracle};
