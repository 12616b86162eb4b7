use serde::{Deserialize, Serialize};

/// Interleaved signed 16-bit little-endian PCM (spec.md §3 PcmBuffer).
///
/// All mixer inputs are canonicalized to this form before mixing: 44100 Hz,
/// stereo, `i16` samples. Mono sources are up-mixed by sample duplication
/// (spec.md §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PcmBuffer {
    pub sample_rate: u32,
    pub channel_count: u16,
    /// Decoded samples, interleaved per frame.
    pub samples: Vec<i16>,
}

pub const CANONICAL_SAMPLE_RATE: u32 = 44_100;
pub const CANONICAL_CHANNELS: u16 = 2;

impl PcmBuffer {
    pub fn new(sample_rate: u32, channel_count: u16, samples: Vec<i16>) -> Self {
        Self {
            sample_rate,
            channel_count,
            samples,
        }
    }

    /// A zero-length buffer in the canonical format.
    pub fn empty() -> Self {
        Self::new(CANONICAL_SAMPLE_RATE, CANONICAL_CHANNELS, Vec::new())
    }

    /// Silence of the given duration at the canonical format, used as the
    /// non-fatal fallback for failed synthesis segments (spec.md §4.4, §4.6).
    pub fn silence(duration_ms: u64) -> Self {
        let frames = (duration_ms as u64 * CANONICAL_SAMPLE_RATE as u64) / 1000;
        let samples = vec![0i16; (frames as usize) * CANONICAL_CHANNELS as usize];
        Self::new(CANONICAL_SAMPLE_RATE, CANONICAL_CHANNELS, samples)
    }

    pub fn is_canonical(&self) -> bool {
        self.sample_rate == CANONICAL_SAMPLE_RATE && self.channel_count == CANONICAL_CHANNELS
    }

    pub fn frame_count(&self) -> usize {
        if self.channel_count == 0 {
            0
        } else {
            self.samples.len() / self.channel_count as usize
        }
    }

    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.frame_count() as u64 * 1000) / self.sample_rate as u64
    }

    /// Duplicate every sample across two channels, preserving sample rate.
    pub fn mono_to_stereo(&self) -> Self {
        if self.channel_count != 1 {
            return self.clone();
        }
        let mut out = Vec::with_capacity(self.samples.len() * 2);
        for s in &self.samples {
            out.push(*s);
            out.push(*s);
        }
        Self::new(self.sample_rate, 2, out)
    }

    /// Concatenate several buffers of identical format into one.
    pub fn concat(buffers: &[PcmBuffer]) -> PcmBuffer {
        let Some(first) = buffers.first() else {
            return PcmBuffer::empty();
        };
        let mut out = Vec::new();
        for b in buffers {
            debug_assert_eq!(b.sample_rate, first.sample_rate);
            debug_assert_eq!(b.channel_count, first.channel_count);
            out.extend_from_slice(&b.samples);
        }
        PcmBuffer::new(first.sample_rate, first.channel_count, out)
    }
}

/// Converts a PCM buffer between sample rates and channel layouts. Canonical
/// codec collaborators (see `codec`) implement this; the core only depends
/// on the trait boundary, per spec.md §9's Open Question that the codec
/// collaborator must resample when a provider returns a different rate.
pub trait Resampler {
    fn resample(&self, input: &PcmBuffer, target_sample_rate: u32) -> PcmBuffer;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_has_expected_duration() {
        let buf = PcmBuffer::silence(1000);
        assert_eq!(buf.duration_ms(), 1000);
        assert!(buf.samples.iter().all(|&s| s == 0));
    }

    #[test]
    fn mono_to_stereo_duplicates_samples() {
        let mono = PcmBuffer::new(44100, 1, vec![1, 2, 3]);
        let stereo = mono.mono_to_stereo();
        assert_eq!(stereo.samples, vec![1, 1, 2, 2, 3, 3]);
        assert_eq!(stereo.channel_count, 2);
    }

    #[test]
    fn concat_sums_frame_counts() {
        let a = PcmBuffer::new(44100, 2, vec![1, 1, 2, 2]);
        let b = PcmBuffer::new(44100, 2, vec![3, 3]);
        let c = PcmBuffer::concat(&[a, b]);
        assert_eq!(c.frame_count(), 3);
    }
}
