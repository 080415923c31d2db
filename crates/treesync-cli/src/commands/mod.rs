//! Command implementations for treesync-cli

pub mod fetch;
pub mod hooks;
pub mod init;
pub mod push;
pub mod remotes;
pub mod status;

pub use fetch::run_fetch;
pub use hooks::run_install_hooks;
pub use init::run_init;
pub use push::run_push;
pub use remotes::run_remotes;
pub use status::run_status;
