use std::path::Path;

use crate::workflow::{ReplayReport, ReplayScript, load_script, run_script, save_report};

use super::{Result, ViewerSession};

#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowService;

impl WorkflowService {
    pub fn load_script(&self, path: impl AsRef<Path>) -> Result<ReplayScript> {
        Ok(load_script(path)?)
    }

    pub fn run(&self, script: &ReplayScript, session: &mut ViewerSession) -> Result<ReplayReport> {
        Ok(run_script(script, session)?)
    }

    pub fn save_report(&self, path: impl AsRef<Path>, report: &ReplayReport) -> Result<()> {
        save_report(path, report)?;
        Ok(())
    }
}
