use std::{fs, path::PathBuf};

use maze_quest_core::{AudioCue, AudioSink, CollaboratorError, Persistence, SaveSnapshot};

use crate::snapshot_transfer;

/// Stores snapshots as a single encoded line in a file.
#[derive(Debug)]
pub(crate) struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Persistence for FilePersistence {
    fn save(&mut self, snapshot: &SaveSnapshot) -> Result<(), CollaboratorError> {
        let encoded = snapshot_transfer::encode(snapshot).map_err(|error| failed(&error))?;
        fs::write(&self.path, encoded + "\n").map_err(|error| unavailable(&error))
    }

    fn load(&mut self) -> Result<SaveSnapshot, CollaboratorError> {
        let contents = fs::read_to_string(&self.path).map_err(|error| unavailable(&error))?;
        snapshot_transfer::decode(&contents).map_err(|error| failed(&error))
    }
}

fn failed(error: &dyn std::error::Error) -> CollaboratorError {
    CollaboratorError::Failed {
        collaborator: "file persistence",
        reason: error.to_string(),
    }
}

fn unavailable(error: &dyn std::error::Error) -> CollaboratorError {
    CollaboratorError::Unavailable {
        collaborator: "file persistence",
        reason: error.to_string(),
    }
}

/// Audio sink for headless runs: every cue becomes a log line.
#[derive(Debug, Default)]
pub(crate) struct LoggingAudio {
    played: u64,
}

impl LoggingAudio {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl AudioSink for LoggingAudio {
    fn play(&mut self, cue: AudioCue) -> Result<(), CollaboratorError> {
        self.played += 1;
        tracing::debug!(?cue, played = self.played, "audio cue");
        Ok(())
    }
}
