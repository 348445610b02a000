use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use super::{IoError, RawImportParams, RawLoad, Result, read_raw};

/// Pending raw load running on the rayon pool.
#[derive(Debug)]
pub struct LoadHandle {
    path: PathBuf,
    params: RawImportParams,
    receiver: Receiver<Result<RawLoad>>,
}

impl LoadHandle {
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn params(&self) -> &RawImportParams {
        &self.params
    }

    /// Non-blocking poll; `None` while the load is still running.
    pub fn try_take(&self) -> Option<Result<RawLoad>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(IoError::LoadAborted)),
        }
    }

    pub fn wait(self) -> Result<RawLoad> {
        self.receiver.recv().unwrap_or(Err(IoError::LoadAborted))
    }
}

pub fn spawn_raw_load(path: impl Into<PathBuf>, params: RawImportParams) -> LoadHandle {
    let path = path.into();
    let (sender, receiver) = mpsc::channel();
    let worker_path = path.clone();
    let worker_params = params.clone();
    rayon::spawn(move || {
        let result = read_raw(&worker_path, &worker_params);
        if sender.send(result).is_err() {
            log::debug!(
                "dropping load of {}: receiver went away",
                worker_path.display()
            );
        }
    });
    LoadHandle {
        path,
        params,
        receiver,
    }
}
