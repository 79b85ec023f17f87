use std::path::Path;

/// Write interleaved integer samples with hound at the given layout.
pub fn write_hound_wav(
    path: &Path,
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
    samples: &[i32],
) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample,
        sample_format: hound::SampleFormat::Int,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create wav parent dirs");
    }
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav writer");
    for &sample in samples {
        match bits_per_sample {
            8 => writer.write_sample(sample as i8),
            16 => writer.write_sample(sample as i16),
            _ => writer.write_sample(sample),
        }
        .expect("write wav sample");
    }
    writer.finalize().expect("finalize wav");
}

/// Read every sample of `path` back through hound.
pub fn read_hound_samples(path: &Path) -> Vec<i32> {
    let mut reader = hound::WavReader::open(path).expect("open wav reader");
    reader
        .samples::<i32>()
        .map(|sample| sample.expect("read wav sample"))
        .collect()
}

/// Deterministic sawtooth in `[-amplitude, amplitude)`.
pub fn sawtooth(len: usize, amplitude: i32) -> Vec<i32> {
    let period = (2 * amplitude) as usize;
    (0..len)
        .map(|idx| (idx % period) as i32 - amplitude)
        .collect()
}
