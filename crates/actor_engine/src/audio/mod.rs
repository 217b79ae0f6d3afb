//! Audio submissions
//!
//! Scripts queue play/halt/volume commands during the frame; the engine
//! forwards them to an [`AudioBackend`] once per frame.

use crate::engine::EngineError;
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::PathBuf;

/// Queued mixer command
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCommand {
    /// Start a clip on a channel
    Play {
        /// Mixer channel
        channel: i32,
        /// Clip name
        clip: String,
        /// Loop until halted
        looping: bool,
    },
    /// Stop a channel
    Halt {
        /// Mixer channel
        channel: i32,
    },
    /// Change a channel's volume (0 to 128)
    SetVolume {
        /// Mixer channel
        channel: i32,
        /// Volume
        volume: f32,
    },
}

/// Receiver of audio commands
pub trait AudioBackend {
    /// Execute one command; an unknown clip is [`EngineError::MissingResource`]
    fn execute(&mut self, command: &AudioCommand) -> Result<(), EngineError>;
}

/// Frame-scoped audio command queue
#[derive(Debug, Default)]
pub struct AudioSystem {
    queue: RefCell<Vec<AudioCommand>>,
}

impl AudioSystem {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Queue a clip
    pub fn play(&self, channel: i32, clip: impl Into<String>, looping: bool) {
        self.queue.borrow_mut().push(AudioCommand::Play {
            channel,
            clip: clip.into(),
            looping,
        });
    }
    
    /// Queue a halt
    pub fn halt(&self, channel: i32) {
        self.queue.borrow_mut().push(AudioCommand::Halt { channel });
    }
    
    /// Queue a volume change
    pub fn set_volume(&self, channel: i32, volume: f32) {
        self.queue.borrow_mut().push(AudioCommand::SetVolume { channel, volume });
    }
    
    /// Forward queued commands in order
    pub fn flush(&self, backend: &mut dyn AudioBackend) -> Result<(), EngineError> {
        let commands = std::mem::take(&mut *self.queue.borrow_mut());
        for command in &commands {
            backend.execute(command)?;
        }
        Ok(())
    }
}

/// Backend that records commands, optionally limited to known clips
#[derive(Debug, Default)]
pub struct RecordingAudioBackend {
    executed: Vec<AudioCommand>,
    clips: Option<HashSet<String>>,
}

impl RecordingAudioBackend {
    /// Accept any clip
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Accept only the listed clips
    pub fn with_clips<I, S>(clips: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            executed: Vec::new(),
            clips: Some(clips.into_iter().map(Into::into).collect()),
        }
    }
    
    /// Commands executed so far
    pub fn executed(&self) -> &[AudioCommand] {
        &self.executed
    }
}

impl AudioBackend for RecordingAudioBackend {
    fn execute(&mut self, command: &AudioCommand) -> Result<(), EngineError> {
        if let (AudioCommand::Play { clip, .. }, Some(clips)) = (command, &self.clips) {
            if !clips.contains(clip) {
                return Err(EngineError::MissingResource {
                    kind: "audio",
                    name: clip.clone(),
                });
            }
        }
        self.executed.push(command.clone());
        Ok(())
    }
}

/// Backend that checks clips exist as `audio/<name>.wav` or `.ogg`
#[derive(Debug)]
pub struct HeadlessAudioBackend {
    root: PathBuf,
    known: HashSet<String>,
}

impl HeadlessAudioBackend {
    /// Validate against `resource_root`
    pub fn new(resource_root: impl Into<PathBuf>) -> Self {
        Self {
            root: resource_root.into(),
            known: HashSet::new(),
        }
    }
}

impl AudioBackend for HeadlessAudioBackend {
    fn execute(&mut self, command: &AudioCommand) -> Result<(), EngineError> {
        let AudioCommand::Play { clip, channel, .. } = command else {
            return Ok(());
        };
        if !self.known.contains(clip) {
            let dir = self.root.join("audio");
            let found = ["wav", "ogg"].iter().any(|ext| dir.join(format!("{clip}.{ext}")).is_file());
            if !found {
                return Err(EngineError::MissingResource {
                    kind: "audio",
                    name: clip.clone(),
                });
            }
            self.known.insert(clip.clone());
        }
        log::debug!("Playing {} on channel {}", clip, channel);
        Ok(())
    }
}
