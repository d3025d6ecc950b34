//! Alert sound playback

use std::{
    fmt,
    io::Write,
    path::PathBuf,
    process::Stdio,
    sync::Mutex,
};
use tokio::{process::Command, sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

/// The alert sound could not be loaded or played
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to load or play the alert sound: {reason}")]
pub struct AudioPlaybackFailure {
    pub reason: String,
}

impl AudioPlaybackFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// Something that can sound the one-second-left cue
pub trait AlertSound: Send + Sync + fmt::Debug {
    /// Start playing the cue from the beginning
    fn play(&self) -> Result<(), AudioPlaybackFailure>;

    /// Stop any playback in flight and rewind to the start
    fn rewind(&self);
}

/// Rings the terminal bell on stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl AlertSound for TerminalBell {
    fn play(&self) -> Result<(), AudioPlaybackFailure> {
        let mut stderr = std::io::stderr();
        stderr
            .write_all(b"\x07")
            .and_then(|_| stderr.flush())
            .map_err(|e| AudioPlaybackFailure::new(format!("terminal bell: {}", e)))
    }

    fn rewind(&self) {}
}

/// Plays a sound file through an external player command such as `aplay` or `paplay`
///
/// Spawning the player is synchronous, so a missing binary fails `play` directly. A player
/// that starts but exits unsuccessfully is reported later over the failure channel.
#[derive(Debug)]
pub struct CommandSound {
    player: String,
    sound_path: PathBuf,
    failures: mpsc::UnboundedSender<AudioPlaybackFailure>,
    playback: Mutex<Option<JoinHandle<()>>>,
}

impl CommandSound {
    pub fn new(
        player: String,
        sound_path: PathBuf,
        failures: mpsc::UnboundedSender<AudioPlaybackFailure>,
    ) -> Self {
        Self {
            player,
            sound_path,
            failures,
            playback: Mutex::new(None),
        }
    }

    /// Check that the sound file is readable and the player can be executed
    pub async fn load(&self) -> Result<(), AudioPlaybackFailure> {
        let metadata = tokio::fs::metadata(&self.sound_path).await.map_err(|e| {
            AudioPlaybackFailure::new(format!(
                "cannot read {}: {}",
                self.sound_path.display(),
                e
            ))
        })?;

        if !metadata.is_file() {
            return Err(AudioPlaybackFailure::new(format!(
                "{} is not a file",
                self.sound_path.display()
            )));
        }

        Command::new(&self.player)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                AudioPlaybackFailure::new(format!("player {} is not available: {}", self.player, e))
            })?;

        info!(
            "Alert sound {} loaded, playing with {}",
            self.sound_path.display(),
            self.player
        );
        Ok(())
    }

    fn stop_playback(&self) {
        match self.playback.lock() {
            Ok(mut playback) => {
                if let Some(handle) = playback.take() {
                    // Dropping the aborted future drops the child, which kills it
                    handle.abort();
                    debug!("Stopped alert sound playback");
                }
            }
            Err(e) => warn!("Failed to lock playback slot: {}", e),
        }
    }
}

impl AlertSound for CommandSound {
    fn play(&self) -> Result<(), AudioPlaybackFailure> {
        self.stop_playback();

        let child = Command::new(&self.player)
            .arg(&self.sound_path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                AudioPlaybackFailure::new(format!("failed to start {}: {}", self.player, e))
            })?;

        let player = self.player.clone();
        let failures = self.failures.clone();
        let handle = tokio::spawn(async move {
            let failure = match child.wait_with_output().await {
                Ok(output) if output.status.success() => {
                    debug!("Alert sound finished");
                    return;
                }
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    AudioPlaybackFailure::new(format!(
                        "{} exited with {}: {}",
                        player,
                        output.status,
                        stderr.trim()
                    ))
                }
                Err(e) => AudioPlaybackFailure::new(format!("waiting for {}: {}", player, e)),
            };

            if failures.send(failure).is_err() {
                warn!("Audio failure listener is gone, dropping playback failure");
            }
        });

        let mut playback = self
            .playback
            .lock()
            .map_err(|e| AudioPlaybackFailure::new(format!("failed to lock playback slot: {}", e)))?;
        *playback = Some(handle);
        Ok(())
    }

    fn rewind(&self) {
        self.stop_playback();
    }
}
