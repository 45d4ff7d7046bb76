//! CLI command handlers, one per mode.

mod list;
mod upload;

pub use list::run_list;
pub use self_test::run_self_test;
pub use upload::{read_request, run_upload};
