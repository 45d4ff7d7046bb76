pub mod config;
pub mod error;
pub mod logging;
pub mod naming;
pub mod notify;
pub mod resolver;
pub mod staging;
pub mod transfer;
pub mod upload;
pub mod verify;

pub use error::DropError;
