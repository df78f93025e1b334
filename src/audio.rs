use std::{
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use hound::WavWriter;
use ndarray::Array2;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::{
    audio::SampleBuffer, codecs::DecoderOptions, formats::FormatOptions, io::MediaSourceStream,
    meta::MetadataOptions, probe::Hint,
};
use symphonia::default::{get_codecs, get_probe};
use tracing::debug;

use crate::error::{Result, RunnerError};
use crate::types::Waveform;

/// Decode an audio file into a planar waveform at its native sample rate.
///
/// Any probe or decode failure maps to [`RunnerError::UnreadableAudio`] so
/// callers can decide between retrying (single-file) and skipping (batch).
pub fn read_audio<P: AsRef<Path>>(path: P) -> Result<Waveform> {
    let path = path.as_ref();
    decode_file(path).map_err(|e| RunnerError::UnreadableAudio {
        path: path.to_path_buf(),
        reason: format!("{e:#}"),
    })
}

fn decode_file(path: &Path) -> anyhow::Result<Waveform> {
    let file =
        File::open(path).with_context(|| format!("Failed to open audio file: {:?}", path))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let mut format = probed.format;
    let track = format.default_track().context("No default track found")?;

    let mut decoder = get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_rate: u32 = 0;
    let mut channels: usize = 0;

    while let Ok(packet) = format.next_packet() {
        let decoded = decoder.decode(&packet)?;
        sample_rate = decoded.spec().rate;
        channels = decoded.spec().channels.count();

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        buffer.copy_interleaved_ref(decoded);

        samples.extend_from_slice(buffer.samples());
    }

    if channels == 0 || samples.is_empty() {
        return Err(anyhow!("No decodable audio data"));
    }

    debug!(
        "read audio: sample_rate={}, channels={}, frames={}",
        sample_rate,
        channels,
        samples.len() / channels
    );

    Ok(Waveform::new(
        deinterleave(&samples, channels),
        sample_rate,
    ))
}

fn deinterleave(interleaved: &[f32], channels: usize) -> Array2<f32> {
    let frames = interleaved.len() / channels;
    let mut planar = Array2::zeros((channels, frames));
    for (i, frame) in interleaved.chunks_exact(channels).enumerate() {
        for (ch, &sample) in frame.iter().enumerate() {
            planar[[ch, i]] = sample;
        }
    }
    planar
}

/// Resample a waveform to `target_rate`, channel layout preserved.
pub fn resample(wave: &Waveform, target_rate: u32) -> Result<Waveform> {
    if wave.sample_rate == target_rate {
        return Ok(wave.clone());
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let channels = wave.channels();
    let ratio = target_rate as f64 / wave.sample_rate as f64;
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, wave.len(), channels)
        .context("Failed to build resampler")?;
    let delay = resampler.output_delay();
    let expected = (wave.len() as f64 * ratio).round() as usize;

    let input: Vec<Vec<f32>> = (0..channels).map(|ch| wave.samples.row(ch).to_vec()).collect();
    let mut output = resampler
        .process(&input, None)
        .context("Resampling failed")?;

    // Flush the sinc filter so the signal's tail is not left inside it, then
    // drop the filter delay from the front for an exact output length.
    let tail = resampler
        .process_partial::<Vec<f32>>(None, None)
        .context("Resampler flush failed")?;
    for (channel, extra) in output.iter_mut().zip(tail) {
        channel.extend(extra);
    }

    let mut planar = Array2::zeros((channels, expected));
    for (ch, channel) in output.iter().enumerate() {
        let end = (delay + expected).min(channel.len());
        for (i, &sample) in channel[delay..end].iter().enumerate() {
            planar[[ch, i]] = sample;
        }
    }

    debug!(
        "resampled {} Hz -> {} Hz ({} -> {} frames)",
        wave.sample_rate,
        target_rate,
        wave.len(),
        expected
    );

    Ok(Waveform::new(planar, target_rate))
}

/// Write a waveform as a 32-bit float WAV.
pub fn write_audio(path: &Path, wave: &Waveform) -> Result<()> {
    let spec = hound::WavSpec {
        channels: wave.channels() as u16,
        sample_rate: wave.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for i in 0..wave.len() {
        for ch in 0..wave.channels() {
            writer.write_sample(wave.samples[[ch, i]])?;
        }
    }

    writer.finalize()?;
    Ok(())
}

/// Output path for one stem: `{store_dir}/{input stem}_{name}.wav`.
pub fn stem_path(store_dir: &Path, input: &Path, stem: &str) -> PathBuf {
    let base = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    store_dir.join(format!("{base}_{stem}.wav"))
}
