pub mod file_server;
pub mod local_copy;
