//! Post-processor / Codec collaborator (spec.md §2 component 10, §6). The
//! core treats `Codec` as an external collaborator specified only through a
//! trait boundary; this crate supplies one concrete, in-scope
//! implementation — WAV via `hound` — because a trait with zero
//! implementations would leave the mixer's output untestable end to end
//! (SPEC_FULL.md §10.3). MP3/AAC stay out of scope per spec.md §1.

use std::io::Cursor;

use rubato::{FftFixedIn, Resampler as RubatoResamplerTrait};

use crate::error::PipelineError;
use crate::model::pcm::{PcmBuffer, Resampler, CANONICAL_CHANNELS};

/// Container format a `Codec` can encode to. Mirrors `provider::FormatHint`
/// but lives in `codec` since it's the encoder's vocabulary, not the
/// provider's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Wav,
}

/// The external collaborator boundary spec.md §1/§6 describe: container
/// encoding is explicitly out of the core's scope, reached only through
/// this trait.
pub trait Codec {
    fn format(&self) -> ContainerFormat;
    fn encode(&self, pcm: &PcmBuffer) -> Result<Vec<u8>, PipelineError>;
}

/// WAV encoder over `hound`, the same crate the pack's `fidpa-hablara`
/// example pulls in for container I/O.
pub struct WavCodec;

impl Codec for WavCodec {
    fn format(&self) -> ContainerFormat {
        ContainerFormat::Wav
    }

    fn encode(&self, pcm: &PcmBuffer) -> Result<Vec<u8>, PipelineError> {
        let spec = hound::WavSpec {
            channels: pcm.channel_count,
            sample_rate: pcm.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).map_err(|e| {
                PipelineError::CodecError {
                    reason: e.to_string(),
                }
            })?;
            for sample in &pcm.samples {
                writer
                    .write_sample(*sample)
                    .map_err(|e| PipelineError::CodecError {
                        reason: e.to_string(),
                    })?;
            }
            writer
                .finalize()
                .map_err(|e| PipelineError::CodecError {
                    reason: e.to_string(),
                })?;
        }
        Ok(cursor.into_inner())
    }
}

/// Looks up the codec for a requested format hint.
pub fn codec_for(format: ContainerFormat) -> Box<dyn Codec> {
    match format {
        ContainerFormat::Wav => Box::new(WavCodec),
    }
}

/// Resamples one channel's worth of samples with a fixed-size FFT resampler,
/// the same approach as the pack's `FrameResampler` (processed in one shot
/// here rather than streamed, since a `PcmBuffer` is always a finite,
/// already-complete buffer).
fn resample_channel(input: &[f32], in_hz: usize, out_hz: usize) -> Vec<f32> {
    if in_hz == out_hz || input.is_empty() {
        return input.to_vec();
    }
    const CHUNK: usize = 1024;
    let mut resampler = match FftFixedIn::<f32>::new(in_hz, out_hz, CHUNK, 1, 1) {
        Ok(r) => r,
        Err(_) => return input.to_vec(),
    };

    let mut output = Vec::with_capacity(input.len() * out_hz / in_hz.max(1) + CHUNK);
    let mut offset = 0;
    while offset < input.len() {
        let end = (offset + CHUNK).min(input.len());
        let mut chunk = input[offset..end].to_vec();
        chunk.resize(CHUNK, 0.0);
        if let Ok(out) = resampler.process(&[&chunk[..]], None) {
            output.extend_from_slice(&out[0]);
        }
        offset = end;
    }
    output
}

/// Implements the `Resampler` trait boundary `model::pcm` defines: the
/// codec collaborator resamples a provider's output to the canonical
/// sample rate before it enters the mixer (spec.md §9 Open Question).
pub struct RubatoResampler;

impl Resampler for RubatoResampler {
    fn resample(&self, input: &PcmBuffer, target_sample_rate: u32) -> PcmBuffer {
        if input.sample_rate == target_sample_rate {
            return input.clone();
        }
        let stereo = input.mono_to_stereo();
        let channels = stereo.channel_count.max(1) as usize;
        let frames = stereo.frame_count();

        let mut per_channel: Vec<Vec<f32>> = vec![Vec::with_capacity(frames); channels];
        for frame in 0..frames {
            for c in 0..channels {
                let s = stereo.samples[frame * channels + c];
                per_channel[c].push(s as f32 / i16::MAX as f32);
            }
        }

        let resampled: Vec<Vec<f32>> = per_channel
            .iter()
            .map(|ch| resample_channel(ch, stereo.sample_rate as usize, target_sample_rate as usize))
            .collect();

        let out_frames = resampled.first().map(|c| c.len()).unwrap_or(0);
        let mut samples = Vec::with_capacity(out_frames * channels);
        for frame in 0..out_frames {
            for ch in &resampled {
                let v = ch.get(frame).copied().unwrap_or(0.0);
                samples.push((v * i16::MAX as f32).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16);
            }
        }

        PcmBuffer::new(target_sample_rate, CANONICAL_CHANNELS, samples)
    }
}
