mod error;
mod execute;
mod io;
mod report;
mod spec;


pub use error::{PipelineError, Result};
pub use execute::run_script;
pub use io::{load_script, save_report};
pub use report::{ReplayReport, StepReport};
pub use spec::{ReplayScript, ScriptStep};
