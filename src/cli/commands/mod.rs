pub mod export;
pub mod history;
pub mod submit;
pub mod tasks;

pub use export::{ExportCommands, handle_export_command};
pub use history::{HistoryCommands, handle_history_command};
pub use submit::{SubmitCommands, handle_submit_command};
pub use tasks::{TaskCommands, handle_tasks_command};
