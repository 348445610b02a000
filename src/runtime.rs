mod command_service;
mod config;
mod context;
mod error;
mod io_service;
mod session;
mod workflow_service;

#[cfg(test)]
mod tests;

pub use command_service::CommandService;
pub use config::{SessionConfig, load_config, save_config};
pub use context::AppContext;
pub use error::{AppError, Result};
pub use io_service::IoService;
pub use session::{HoverListener, PixelProbe, StatusLevel, StatusLine, ViewerSession};
pub use workflow_service::WorkflowService;
