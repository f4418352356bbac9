//! Image and audio blobs stored inline on questions and options.
//!
//! Capture and playback devices are outside this crate; the recorder and
//! player here only track state so that overlapping sessions fail loudly
//! instead of silently clobbering each other.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_MAX_MEDIA_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
}

impl MediaKind {
    pub(crate) fn column(&self) -> &'static str {
        match self {
            MediaKind::Image => "image_data",
            MediaKind::Audio => "audio_data",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Audio => write!(f, "audio"),
        }
    }
}

/// Container formats recognised from the leading bytes of a blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    Png,
    Jpeg,
    Gif,
    Heic,
    M4a,
    Mp3,
    Wav,
    Caf,
    Unknown,
}

impl MediaFormat {
    pub fn kind(&self) -> Option<MediaKind> {
        match self {
            MediaFormat::Png | MediaFormat::Jpeg | MediaFormat::Gif | MediaFormat::Heic => {
                Some(MediaKind::Image)
            }
            MediaFormat::M4a | MediaFormat::Mp3 | MediaFormat::Wav | MediaFormat::Caf => {
                Some(MediaKind::Audio)
            }
            MediaFormat::Unknown => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            MediaFormat::Png => "png",
            MediaFormat::Jpeg => "jpg",
            MediaFormat::Gif => "gif",
            MediaFormat::Heic => "heic",
            MediaFormat::M4a => "m4a",
            MediaFormat::Mp3 => "mp3",
            MediaFormat::Wav => "wav",
            MediaFormat::Caf => "caf",
            MediaFormat::Unknown => "bin",
        }
    }
}

pub fn detect_format(bytes: &[u8]) -> MediaFormat {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        return MediaFormat::Png;
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return MediaFormat::Jpeg;
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return MediaFormat::Gif;
    }
    if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
        return match &bytes[8..12] {
            b"heic" | b"heix" | b"hevc" | b"mif1" | b"msf1" => MediaFormat::Heic,
            _ => MediaFormat::M4a,
        };
    }
    if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WAVE" {
        return MediaFormat::Wav;
    }
    if bytes.starts_with(b"caff") {
        return MediaFormat::Caf;
    }
    if bytes.starts_with(b"ID3") || (bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] & 0xE0 == 0xE0)
    {
        return MediaFormat::Mp3;
    }
    MediaFormat::Unknown
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaError {
    #[error("{0} data is empty")]
    Empty(MediaKind),

    #[error("{kind} data is {size} bytes, limit is {max}")]
    TooLarge {
        kind: MediaKind,
        size: usize,
        max: usize,
    },

    #[error("expected {expected} data, found {found:?}")]
    KindMismatch {
        expected: MediaKind,
        found: MediaFormat,
    },

    #[error("a recording is already in progress")]
    AlreadyRecording,

    #[error("no recording in progress")]
    NotRecording,

    #[error("playback is already in progress")]
    AlreadyPlaying,
}

/// Check a blob before it is stored. Unrecognised formats are accepted since
/// the sniffing table is not exhaustive.
pub fn validate_blob(kind: MediaKind, bytes: &[u8], max_bytes: usize) -> Result<MediaFormat, MediaError> {
    if bytes.is_empty() {
        return Err(MediaError::Empty(kind));
    }
    if bytes.len() > max_bytes {
        return Err(MediaError::TooLarge {
            kind,
            size: bytes.len(),
            max: max_bytes,
        });
    }

    let format = detect_format(bytes);
    match format.kind() {
        Some(found) if found != kind => Err(MediaError::KindMismatch {
            expected: kind,
            found: format,
        }),
        Some(_) => Ok(format),
        None => {
            tracing::warn!("Storing {} blob of unrecognised format ({} bytes)", kind, bytes.len());
            Ok(format)
        }
    }
}

/// Entity a piece of media belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaOwner {
    Question(String),
    Option(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTarget {
    pub owner: MediaOwner,
    pub kind: MediaKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    pub target: MediaTarget,
    pub data: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct MediaRecorder {
    active: Option<Recording>,
}

impl MediaRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    pub fn start(&mut self, target: MediaTarget) -> Result<(), MediaError> {
        if self.active.is_some() {
            return Err(MediaError::AlreadyRecording);
        }
        tracing::debug!("Recording {} for {:?}", target.kind, target.owner);
        self.active = Some(Recording {
            target,
            data: Vec::new(),
        });
        Ok(())
    }

    pub fn write(&mut self, chunk: &[u8]) -> Result<(), MediaError> {
        let recording = self.active.as_mut().ok_or(MediaError::NotRecording)?;
        recording.data.extend_from_slice(chunk);
        Ok(())
    }

    pub fn stop(&mut self) -> Result<Recording, MediaError> {
        self.active.take().ok_or(MediaError::NotRecording)
    }
}

#[derive(Debug, Default)]
pub struct MediaPlayer {
    playing: Option<Vec<u8>>,
}

impl MediaPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.playing.is_some()
    }

    pub fn now_playing(&self) -> Option<&[u8]> {
        self.playing.as_deref()
    }

    pub fn play(&mut self, data: Vec<u8>) -> Result<(), MediaError> {
        if self.playing.is_some() {
            return Err(MediaError::AlreadyPlaying);
        }
        if data.is_empty() {
            return Err(MediaError::Empty(MediaKind::Audio));
        }
        self.playing = Some(data);
        Ok(())
    }

    /// Stop playback; returns whether anything was playing.
    pub fn stop(&mut self) -> bool {
        self.playing.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const M4A: &[u8] = b"\0\0\0\x20ftypM4A \0\0\0\0";

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(PNG), MediaFormat::Png);
        assert_eq!(detect_format(&[0xFF, 0xD8, 0xFF, 0xE0]), MediaFormat::Jpeg);
        assert_eq!(detect_format(M4A), MediaFormat::M4a);
        assert_eq!(detect_format(b"\0\0\0\x18ftypheic\0\0"), MediaFormat::Heic);
        assert_eq!(detect_format(b"RIFF\x24\0\0\0WAVEfmt "), MediaFormat::Wav);
        assert_eq!(detect_format(b"ID3\x04\0"), MediaFormat::Mp3);
        assert_eq!(detect_format(b"hello"), MediaFormat::Unknown);
    }

    #[test]
    fn test_validate_blob_limits() {
        assert_eq!(
            validate_blob(MediaKind::Image, &[], 10),
            Err(MediaError::Empty(MediaKind::Image))
        );
        assert!(matches!(
            validate_blob(MediaKind::Image, PNG, 4),
            Err(MediaError::TooLarge { size, max: 4, .. }) if size == PNG.len()
        ));
        assert_eq!(validate_blob(MediaKind::Image, PNG, 1024), Ok(MediaFormat::Png));
    }

    #[test]
    fn test_validate_blob_rejects_wrong_kind() {
        assert!(matches!(
            validate_blob(MediaKind::Image, M4A, 1024),
            Err(MediaError::KindMismatch {
                expected: MediaKind::Image,
                found: MediaFormat::M4a
            })
        ));
        assert_eq!(
            validate_blob(MediaKind::Audio, b"opaque", 1024),
            Ok(MediaFormat::Unknown)
        );
    }

    #[test]
    fn test_recorder_rejects_overlapping_recordings() {
        let mut recorder = MediaRecorder::new();
        let target = MediaTarget {
            owner: MediaOwner::Question("q1".to_string()),
            kind: MediaKind::Audio,
        };

        recorder.start(target.clone()).unwrap();
        assert_eq!(
            recorder.start(target.clone()),
            Err(MediaError::AlreadyRecording)
        );

        recorder.write(b"abc").unwrap();
        recorder.write(b"def").unwrap();
        let recording = recorder.stop().unwrap();
        assert_eq!(recording.target, target);
        assert_eq!(recording.data, b"abcdef");

        assert!(!recorder.is_recording());
        assert_eq!(recorder.write(b"x"), Err(MediaError::NotRecording));
        assert_eq!(recorder.stop(), Err(MediaError::NotRecording));
    }

    #[test]
    fn test_player_rejects_overlapping_playback() {
        let mut player = MediaPlayer::new();
        player.play(M4A.to_vec()).unwrap();
        assert_eq!(player.play(M4A.to_vec()), Err(MediaError::AlreadyPlaying));
        assert_eq!(player.now_playing(), Some(M4A));

        assert!(player.stop());
        assert!(!player.stop());
        assert!(player.play(M4A.to_vec()).is_ok());
    }
}
