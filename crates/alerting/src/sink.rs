//! Alert Sinks

use crate::classifier::AlertDecision;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while performing an alert
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to start alert player '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Something that performs the alert side effect, e.g. playing a sound
pub trait AlertSink: Send + Sync + 'static {
    fn play(&self, decision: &AlertDecision) -> Result<(), SinkError>;
}

/// Sink that only logs; used when no audio player is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl AlertSink for LogSink {
    fn play(&self, decision: &AlertDecision) -> Result<(), SinkError> {
        warn!("Alert Sound Played: {}", decision.message);
        Ok(())
    }
}

/// Sink that launches an external audio player on the alarm file.
///
/// The player is started and left running; `play` never waits for it to
/// finish. Must be called from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct CommandSink {
    program: String,
    args: Vec<String>,
    sound_file: PathBuf,
}

impl CommandSink {
    /// Create a sink running `program [args..] <sound_file>`
    pub fn new(program: impl Into<String>, args: Vec<String>, sound_file: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            sound_file: sound_file.into(),
        }
    }
}

impl AlertSink for CommandSink {
    fn play(&self, decision: &AlertDecision) -> Result<(), SinkError> {
        let child = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(&self.sound_file)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
            .map_err(|source| SinkError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        debug!(
            "Started alert player {} (pid {:?}) for: {}",
            self.program,
            child.id(),
            decision.message
        );
        warn!("Alert Sound Played: {}", decision.message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::AlertClassifier;
    use detection_summary::{DetectionSummary, VIOLENCE_CLASS};

    fn violence() -> AlertDecision {
        AlertClassifier::default()
            .classify(&DetectionSummary::new().with(VIOLENCE_CLASS, 1))
            .unwrap()
    }

    #[test]
    fn test_log_sink_never_fails() {
        assert!(LogSink.play(&violence()).is_ok());
    }

    #[tokio::test]
    async fn test_command_sink_reports_missing_player() {
        let sink = CommandSink::new(
            "definitely-not-an-audio-player-3f9c",
            vec![],
            "mixkit-classic-alarm-995.wav",
        );
        let err = sink.play(&violence()).unwrap_err();
        assert!(matches!(err, SinkError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_sink_passes_args_then_sound_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("played.txt");
        let sound = dir.path().join("alarm.wav");

        // `sh -c <script> <sound>` binds the sound file to $0
        let target = out.display();
        let script = format!("printf '%s' \"$0\" > '{target}.tmp' && mv '{target}.tmp' '{target}'");
        let sink = CommandSink::new("sh", vec!["-c".to_string(), script], sound.clone());
        sink.play(&violence()).unwrap();

        let mut received = None;
        for _ in 0..100 {
            if let Ok(contents) = std::fs::read_to_string(&out) {
                received = Some(contents);
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }
        assert_eq!(received.as_deref(), Some(sound.to_str().unwrap()));
    }
}
