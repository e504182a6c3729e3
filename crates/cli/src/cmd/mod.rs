mod accounts;
mod config;
mod report;

pub use accounts::cmd_accounts;
pub use config::cmd_config;
pub use report::{ReportArgs, cmd_report};
