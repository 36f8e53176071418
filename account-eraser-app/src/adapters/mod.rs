//! Directory and permission adapters for frontends without a live host (CLI, tests).

mod configured_permission_oracle;
mod in_memory_directory;

pub use configured_permission_oracle::ConfiguredPermissionOracle;
pub use in_memory_directory::{
    AccountByIdView, AccountRecord, InMemoryAccountDirectory, SelfAccountView,
};
