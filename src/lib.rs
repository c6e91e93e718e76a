pub mod config;
pub mod error;
mod fs;
pub mod identity;
pub mod layout;
pub mod process;
pub mod subcommand;
pub mod template;

pub use error::ShrubberyError;
pub use subcommand::{delete, deploy, describe};
