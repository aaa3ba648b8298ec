// Services: backends, folder loading and process-wide setup

pub mod auth;
pub mod folders;
pub mod metadata;
#[cfg(feature = "runtime")]
pub mod tracing_setup;
