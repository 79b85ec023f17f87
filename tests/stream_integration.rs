//! End-to-end reads through the factory against files written by hound.

mod support;

use std::path::Path;

use support::wav::{sawtooth, write_hound_wav};
use tempfile::tempdir;
use waveview::{
    ChannelLayout, Envelope, Frame, PcmError, StreamFactory, StreamSettings, compute_envelope,
};

fn read_all(factory: &StreamFactory, path: &Path, per_frame: usize) -> Vec<Frame> {
    let mut stream = factory.provide_stream(path).unwrap();
    stream
        .with_open(|stream| stream.frames(per_frame).collect())
        .unwrap()
}

#[test]
fn sixteen_bit_mono_matches_hound_samples() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("saw.wav");
    let samples = sawtooth(10_000, 1_000);
    write_hound_wav(&path, 1, 22_050, 16, &samples);

    let frames = read_all(&StreamFactory::default(), &path, 3_000);
    let counts: Vec<usize> = frames.iter().map(Frame::sample_count).collect();
    assert_eq!(counts, vec![3_000, 3_000, 3_000, 1_000]);

    let decoded: Vec<i32> = frames
        .iter()
        .flat_map(|frame| frame.as_mono().unwrap().decode_all().unwrap())
        .collect();
    assert_eq!(decoded, samples);
}

#[test]
fn eight_bit_stereo_splits_channels() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pairs.wav");
    let interleaved: Vec<i32> = (0..200).map(|idx| if idx % 2 == 0 { -100 } else { 50 }).collect();
    write_hound_wav(&path, 2, 8_000, 8, &interleaved);

    let factory = StreamFactory::default();
    let stream = factory.provide_stream(&path).unwrap();
    assert_eq!(stream.layout(), ChannelLayout::Stereo);
    assert_eq!(stream.descriptor().block_align(), 2);

    let frames = read_all(&factory, &path, 64);
    assert_eq!(frames.len(), 2);
    let stereo = frames[1].as_stereo().unwrap();
    assert_eq!(stereo.sample_count(), 36);
    assert!(stereo.left_channel().samples().all(|s| s.unwrap() == -100));
    assert!(stereo.right_channel().samples().all(|s| s.unwrap() == 50));
}

#[test]
fn frames_partition_the_payload_exactly() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("part.wav");
    write_hound_wav(&path, 2, 44_100, 16, &sawtooth(2 * 4_321, 300));

    let frames = read_all(&StreamFactory::default(), &path, 1_000);
    let joined: Vec<u8> = frames.iter().flat_map(|f| f.bytes().to_vec()).collect();
    let file = std::fs::read(&path).unwrap();
    assert_eq!(joined.as_slice(), &file[44..]);
    assert!(frames.iter().all(|f| f.bytes().len() % 4 == 0));
}

#[test]
fn seeking_halfway_reads_the_second_half() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("half.wav");
    let samples: Vec<i32> = (0..1_000).map(|idx| if idx < 500 { 10 } else { 20 }).collect();
    write_hound_wav(&path, 1, 1_000, 16, &samples);

    let mut stream = StreamFactory::default().provide_stream(&path).unwrap();
    stream.open().unwrap();
    stream.set_progress(0.5).unwrap();
    assert_eq!(stream.position(), 44 + 1_000);
    let frame = stream.read_next_frame(10_000).unwrap().unwrap();
    assert_eq!(frame.sample_count(), 500);
    assert!(frame.as_mono().unwrap().samples().all(|s| s.unwrap() == 20));
    assert!(stream.read_next_frame(1).unwrap().is_none());
    stream.close();
}

#[test]
fn default_settings_give_ten_bars_per_second() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dc.wav");
    write_hound_wav(&path, 1, 44_100, 16, &vec![-1_200; 2 * 44_100]);

    let factory = StreamFactory::new(StreamSettings::default());
    let mut stream = factory.provide_stream(&path).unwrap();
    let envelopes = stream
        .with_open(|stream| {
            let mut envelopes = Vec::new();
            while let Some(frame) = stream.read_default_frame()? {
                envelopes.push(factory.envelope(&frame)?);
            }
            Ok(envelopes)
        })
        .unwrap();
    assert_eq!(envelopes.len(), 2);
    for envelope in &envelopes {
        let Envelope::Mono(bars) = envelope else {
            panic!("expected mono envelope");
        };
        assert_eq!(bars.len(), 10);
        assert!(bars.iter().all(|bar| (bar - 1_200.0).abs() < 1e-9));
    }

    let first = read_all(&factory, &path, 44_100).remove(0);
    let bars = compute_envelope(first.as_mono().unwrap(), 4_410).unwrap();
    assert_eq!(bars.len(), 10);
}

#[test]
fn stereo_envelope_keeps_channels_apart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lr.wav");
    let interleaved: Vec<i32> = (0..2_000).map(|idx| if idx % 2 == 0 { 300 } else { 0 }).collect();
    write_hound_wav(&path, 2, 8_000, 16, &interleaved);

    let frames = read_all(&StreamFactory::default(), &path, 1_000);
    let envelope = waveview::compute_frame_envelope(&frames[0], 250).unwrap();
    let Envelope::Stereo { left, right } = envelope else {
        panic!("expected stereo envelope");
    };
    assert_eq!(left, vec![300.0; 4]);
    assert_eq!(right, vec![0.0; 4]);
}

#[test]
fn factory_rejects_foreign_files() {
    let dir = tempdir().unwrap();
    let factory = StreamFactory::default();

    let text = dir.path().join("notes.txt");
    std::fs::write(&text, b"hello").unwrap();
    assert!(matches!(
        factory.provide_stream(&text),
        Err(PcmError::FileStream { .. })
    ));

    let stub = dir.path().join("stub.wav");
    std::fs::write(&stub, [0u8; 20]).unwrap();
    assert!(matches!(
        factory.provide_stream(&stub),
        Err(PcmError::InvalidHeader { .. })
    ));

    assert!(matches!(
        factory.provide_stream(dir.path()),
        Err(PcmError::FileStream { .. })
    ));
}
