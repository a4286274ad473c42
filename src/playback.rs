//! Sound playback. Requests are fire-and-forget: a player process is
//! spawned per sound and never waited on.

use crate::config::SoundConfig;
use crate::error::{PlaybackError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

pub const SOUND_EXTENSIONS: [&str; 3] = ["wav", "mp3", "ogg"];

/// Destination for sound requests.
pub trait PlaybackSink {
    /// Request playback of `sound_id` at `volume` (0.0 - 1.0). Must return
    /// without waiting for the sound to finish.
    fn play(&mut self, sound_id: &str, volume: f64) -> std::result::Result<(), PlaybackError>;
}

/// Sound files found on disk, keyed by file stem.
#[derive(Debug, Clone, Default)]
pub struct SoundLibrary {
    directory: PathBuf,
    sounds: BTreeMap<String, PathBuf>,
}

impl SoundLibrary {
    /// Scan `directory` for playable files, creating it when missing.
    pub fn scan<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();

        if !directory.exists() {
            std::fs::create_dir_all(&directory)?;
            info!("Created sound directory {}", directory.display());
        }

        let mut sounds = BTreeMap::new();
        for entry in std::fs::read_dir(&directory)? {
            let path = entry?.path();
            let playable = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| SOUND_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if !playable || !path.is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                debug!("Found sound {} at {}", stem, path.display());
                sounds.insert(stem.to_string(), path.clone());
            }
        }

        info!(
            "Loaded {} sounds from {}",
            sounds.len(),
            directory.display()
        );

        Ok(Self { directory, sounds })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn get(&self, sound_id: &str) -> Option<&Path> {
        self.sounds.get(sound_id).map(PathBuf::as_path)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sounds.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }

    /// Warn once for every expected file that is not in the library.
    pub fn report_missing<'a, I>(&self, expected_files: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut missing = 0;
        for file in expected_files {
            let stem = Path::new(file)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(file);
            if !self.sounds.contains_key(stem) {
                warn!(
                    "Sound file {} not found in {}",
                    file,
                    self.directory.display()
                );
                missing += 1;
            }
        }
        missing
    }
}

/// Plays sounds by spawning an external player (e.g. `paplay`).
#[derive(Debug)]
pub struct CommandPlayback {
    library: SoundLibrary,
    command: String,
}

impl CommandPlayback {
    pub fn new(library: SoundLibrary, command: impl Into<String>) -> Self {
        Self {
            library,
            command: command.into(),
        }
    }

    pub fn from_config(config: &SoundConfig) -> Result<Self> {
        let library = SoundLibrary::scan(&config.directory)?;
        Ok(Self::new(library, config.player_command.clone()))
    }

    pub fn library(&self) -> &SoundLibrary {
        &self.library
    }

    fn volume_args(&self, volume: f64) -> Vec<String> {
        // paplay takes a linear volume where 65536 is 100%
        if Path::new(&self.command).file_name().and_then(|n| n.to_str()) == Some("paplay") {
            vec![format!("--volume={}", (volume.clamp(0.0, 1.0) * 65536.0) as u32)]
        } else {
            Vec::new()
        }
    }
}

impl PlaybackSink for CommandPlayback {
    fn play(&mut self, sound_id: &str, volume: f64) -> std::result::Result<(), PlaybackError> {
        let path = self
            .library
            .get(sound_id)
            .ok_or_else(|| PlaybackError::MissingSound(sound_id.to_string()))?;

        let child = Command::new(&self.command)
            .args(self.volume_args(volume))
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PlaybackError::Player {
                command: self.command.clone(),
                details: e.to_string(),
            })?;

        debug!(
            "Started {} (pid {}) for sound {}",
            self.command,
            child.id(),
            sound_id
        );
        Ok(())
    }
}

/// Sink for sessions whose sound library could not be loaded.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentPlayback;

impl PlaybackSink for SilentPlayback {
    fn play(&mut self, _sound_id: &str, _volume: f64) -> std::result::Result<(), PlaybackError> {
        Err(PlaybackError::NoOutput)
    }
}
