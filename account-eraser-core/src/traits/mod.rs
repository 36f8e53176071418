//! Collaborator abstraction trait definition

mod account_directory;
mod permission_oracle;

pub use account_directory::{AccountDirectory, AccountDirectoryViews};
pub use permission_oracle::PermissionOracle;
