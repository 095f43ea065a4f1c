//! File-sourced cues: wav/ogg decoding into stereo buffers.
//!
//! A sound can come from a pre-recorded file instead of the synthesizer.
//! The file is decoded up front into the same `StereoBuffer` representation
//! synthesized cues use, so playback does not care where a buffer came
//! from. No sample-rate conversion is performed; a mismatch with the mixer
//! rate is logged and the buffer plays at the device rate.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use earcon_core::{Sound, StereoBuffer};
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

use crate::output::mixer::Mixer;

pub type MediaResult<T> = Result<T, MediaError>;

#[derive(Debug)]
pub enum MediaError {
    MissingFile(PathBuf),
    /// Extension is not `.wav` or `.ogg`.
    UnsupportedExtension(PathBuf),
    NoAudioTrack,
    UnsupportedChannelLayout(usize),
    Decode(String),
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFile(path) => write!(f, "sound file not found: {}", path.display()),
            Self::UnsupportedExtension(path) => {
                write!(
                    f,
                    "sound file is not in .wav or .ogg format: {}",
                    path.display()
                )
            }
            Self::NoAudioTrack => write!(f, "no audio track in sound file"),
            Self::UnsupportedChannelLayout(channels) => {
                write!(f, "unsupported channel layout: {} channels", channels)
            }
            Self::Decode(msg) => write!(f, "failed to decode sound file: {}", msg),
        }
    }
}

impl std::error::Error for MediaError {}

/// Load a pre-recorded cue and register it with the mixer.
pub fn load_sound(path: impl AsRef<Path>, mixer: &Mixer) -> MediaResult<Sound> {
    let buffer = decode_file(path.as_ref(), mixer.sample_rate())?;
    Ok(Sound::from_buffer(buffer, mixer))
}

/// Decode a `.wav` or `.ogg` file into a stereo buffer.
///
/// Mono sources are duplicated into both channels; sources with more than
/// two channels are rejected. `expected_rate` is only used to warn about a
/// sample-rate mismatch.
pub fn decode_file(path: &Path, expected_rate: u32) -> MediaResult<StereoBuffer> {
    if !path.exists() {
        return Err(MediaError::MissingFile(path.to_path_buf()));
    }
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    let extension = match extension.as_deref() {
        Some(ext @ ("wav" | "ogg")) => ext.to_owned(),
        _ => return Err(MediaError::UnsupportedExtension(path.to_path_buf())),
    };

    let file = File::open(path).map_err(|e| MediaError::Decode(e.to_string()))?;
    let stream = MediaSourceStream::new(Box::new(file), Default::default());
    let mut hint = Hint::new();
    hint.with_extension(&extension);

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| MediaError::Decode(e.to_string()))?;
    let mut format = probed.format;

    let track = format.default_track().ok_or(MediaError::NoAudioTrack)?;
    let track_id = track.id;
    if let Some(rate) = track.codec_params.sample_rate {
        if rate != expected_rate {
            log::warn!(
                "sound file is {} Hz but the mixer runs at {} Hz; playing without conversion",
                rate,
                expected_rate
            );
        }
    }
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| MediaError::Decode(e.to_string()))?;

    let mut frames = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(err) => return Err(MediaError::Decode(err.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }
        let decoded = decoder
            .decode(&packet)
            .map_err(|e| MediaError::Decode(e.to_string()))?;
        extend_frames(&decoded, &mut frames)?;
    }

    Ok(StereoBuffer::from_frames(frames))
}

fn extend_frames(decoded: &AudioBufferRef<'_>, out: &mut Vec<[i16; 2]>) -> MediaResult<()> {
    match decoded {
        AudioBufferRef::S16(buf) => push_planar(buf.as_ref(), |s| s, out),
        AudioBufferRef::S32(buf) => push_planar(buf.as_ref(), |s| (s >> 16) as i16, out),
        AudioBufferRef::F32(buf) => push_planar(buf.as_ref(), f32_to_i16, out),
        AudioBufferRef::F64(buf) => push_planar(buf.as_ref(), |s| f32_to_i16(s as f32), out),
        AudioBufferRef::U8(buf) => push_planar(buf.as_ref(), |s| (i16::from(s) - 128) << 8, out),
        _ => Err(MediaError::Decode(
            "unsupported decoded sample format".to_owned(),
        )),
    }
}

fn push_planar<S: Sample>(
    buf: &AudioBuffer<S>,
    convert: impl Fn(S) -> i16,
    out: &mut Vec<[i16; 2]>,
) -> MediaResult<()> {
    let channels = buf.spec().channels.count();
    match channels {
        1 => {
            for &sample in buf.chan(0) {
                let value = convert(sample);
                out.push([value, value]);
            }
        }
        2 => {
            let left = buf.chan(0);
            let right = buf.chan(1);
            for frame in 0..buf.frames() {
                out.push([convert(left[frame]), convert(right[frame])]);
            }
        }
        n => return Err(MediaError::UnsupportedChannelLayout(n)),
    }
    Ok(())
}

#[inline]
fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}
