//! Files produced by `WavWriter` read back through hound and the stream reader.

mod support;

use support::wav::{read_hound_samples, sawtooth, write_hound_wav};
use tempfile::tempdir;
use waveview::{StreamFactory, WavStream, WavWriter};

#[test]
fn hound_reads_writer_output() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("written.wav");
    let samples = sawtooth(2 * 500, 4_000);
    let mut writer = WavWriter::create(&path, 2, 48_000, 16).unwrap();
    writer.append_samples(&samples).unwrap();
    writer.finalize().unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 48_000);
    assert_eq!(spec.bits_per_sample, 16);
    drop(reader);
    assert_eq!(read_hound_samples(&path), samples);
}

#[test]
fn eight_bit_output_matches_hound_convention() {
    let dir = tempdir().unwrap();
    let ours = dir.path().join("ours.wav");
    let theirs = dir.path().join("theirs.wav");
    let samples = sawtooth(256, 100);

    let mut writer = WavWriter::create(&ours, 1, 8_000, 8).unwrap();
    writer.append_samples(&samples).unwrap();
    writer.finalize().unwrap();
    write_hound_wav(&theirs, 1, 8_000, 8, &samples);

    assert_eq!(std::fs::read(&ours).unwrap(), std::fs::read(&theirs).unwrap());
}

#[test]
fn copying_frames_reproduces_the_file() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source.wav");
    let copy = dir.path().join("copy.wav");
    write_hound_wav(&source, 1, 16_000, 16, &sawtooth(5_000, 700));

    let mut stream = StreamFactory::default().provide_stream(&source).unwrap();
    let header = *stream.descriptor();
    let frames = stream
        .with_open(|stream| stream.frames(1_024).collect::<Result<Vec<_>, _>>())
        .unwrap();

    let mut writer = WavWriter::create(
        &copy,
        header.channel_count(),
        header.sample_rate(),
        header.bit_depth(),
    )
    .unwrap();
    writer.append_frames(&frames).unwrap();
    let written = writer.finalize().unwrap();

    assert_eq!(written, header);
    assert_eq!(std::fs::read(&copy).unwrap(), std::fs::read(&source).unwrap());
    assert!(WavStream::new(&copy).unwrap().descriptor().is_valid());
}
