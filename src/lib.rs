pub mod app_config;
pub mod cli;
pub mod file_proc;
pub mod logging;
pub mod mime;
pub mod report;

pub use app_config::AppConfig;
pub use file_proc::Context;
pub use report::{ActionKind, Output, RunReport};
