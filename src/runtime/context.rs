use super::{CommandService, IoService, SessionConfig, ViewerSession, WorkflowService};

#[derive(Debug, Clone, Default)]
pub struct AppContext {
    io_service: IoService,
    command_service: CommandService,
    workflow_service: WorkflowService,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn io_service(&self) -> &IoService {
        &self.io_service
    }

    pub fn command_service(&self) -> &CommandService {
        &self.command_service
    }

    pub fn workflow_service(&self) -> &WorkflowService {
        &self.workflow_service
    }

    pub fn new_session(&self, config: SessionConfig) -> ViewerSession {
        ViewerSession::new(config)
    }
}
