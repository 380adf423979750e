pub mod app_command;
pub mod console;

pub use app_command::AppCommand;
