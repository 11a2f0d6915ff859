use serde::{Deserialize, Serialize};

use crate::{
    config::{Config, Profiles},
    error::{AppError, AppResult},
};

/// One speaker-recognition reading from the device
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSample {
    /// Enrolled speaker position; negative means "no speaker"
    pub speaker_index: i32,
    pub confidence: f32,
    /// Milliseconds since the capture started
    pub at_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceMatch {
    pub speaker_index: i32,
    pub username: String,
}

/// Streaming hold detector
///
/// Accepts a speaker once it has been recognised above the threshold
/// continuously for `hold_ms`. A weak reading or a different speaker
/// restarts the hold.
#[derive(Debug, Clone)]
pub struct SpeakerHold {
    threshold: f32,
    hold_ms: u64,
    candidate: Option<(i32, u64)>,
}

impl SpeakerHold {
    pub fn new(threshold: f32, hold_ms: u64) -> Self {
        Self {
            threshold,
            hold_ms,
            candidate: None,
        }
    }

    /// Feeds one sample; returns the speaker index once the hold completes
    pub fn observe(&mut self, sample: &VoiceSample) -> Option<i32> {
        if sample.speaker_index < 0 || sample.confidence < self.threshold {
            self.candidate = None;
            return None;
        }

        let started_at = match self.candidate {
            Some((speaker, started_at)) if speaker == sample.speaker_index => started_at,
            _ => {
                self.candidate = Some((sample.speaker_index, sample.at_ms));
                sample.at_ms
            }
        };

        (sample.at_ms.saturating_sub(started_at) >= self.hold_ms).then_some(sample.speaker_index)
    }
}

/// Maps a burst of voice samples to the profile that should be opened
#[derive(Debug, Clone)]
pub struct VoiceGate {
    threshold: f32,
    hold_ms: u64,
    profiles: Profiles,
}

impl VoiceGate {
    pub fn new(threshold: f32, hold_ms: u64, profiles: Profiles) -> Self {
        Self {
            threshold,
            hold_ms,
            profiles,
        }
    }

    pub fn from_config(config: &Config, profiles: Profiles) -> Self {
        Self::new(config.voice_confidence_threshold, config.voice_hold_ms, profiles)
    }

    /// First speaker index whose hold completes, samples taken in time order
    pub fn accepted_speaker(&self, samples: &[VoiceSample]) -> Option<i32> {
        let mut ordered = samples.to_vec();
        ordered.sort_by_key(|s| s.at_ms);

        let mut hold = SpeakerHold::new(self.threshold, self.hold_ms);
        ordered.iter().find_map(|s| hold.observe(s))
    }

    /// Resolves the accepted speaker to a profile
    ///
    /// `Ok(None)` means nobody held long enough; an accepted index with no
    /// configured profile is `NotFound`.
    pub fn resolve(&self, samples: &[VoiceSample]) -> AppResult<Option<VoiceMatch>> {
        if samples
            .iter()
            .any(|s| !s.confidence.is_finite() || !(0.0..=1.0).contains(&s.confidence))
        {
            return Err(AppError::InvalidInput(
                "confidence must be between 0 and 1".to_string(),
            ));
        }

        let Some(speaker_index) = self.accepted_speaker(samples) else {
            return Ok(None);
        };

        let username = usize::try_from(speaker_index)
            .ok()
            .and_then(|i| self.profiles.by_index(i))
            .ok_or_else(|| {
                AppError::NotFound(format!("No profile for speaker {}", speaker_index))
            })?;

        tracing::info!(speaker_index, %username, "Voice match accepted");

        Ok(Some(VoiceMatch {
            speaker_index,
            username: username.to_string(),
        }))
    }
}
