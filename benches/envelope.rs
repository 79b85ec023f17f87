use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tempfile::tempdir;
use waveview::{MonoFrame, StreamFactory, WavWriter, compute_envelope, compute_frame_envelope};

const SAMPLE_RATE: u32 = 44_100;
const WINDOW: usize = 4_410;

fn sawtooth(len: usize) -> Vec<i32> {
    (0..len).map(|idx| (idx % 2_000) as i32 - 1_000).collect()
}

fn mono_frame(samples: &[i32]) -> MonoFrame {
    let bytes: Vec<u8> = samples
        .iter()
        .flat_map(|&s| (s as i16).to_le_bytes())
        .collect();
    MonoFrame::new(bytes, 2, samples.len()).expect("mono frame")
}

fn bench_compute_envelope(c: &mut Criterion) {
    let frame = mono_frame(&sawtooth(SAMPLE_RATE as usize));
    c.bench_with_input(
        BenchmarkId::new("compute_envelope", SAMPLE_RATE),
        &frame,
        |b, frame| {
            b.iter(|| compute_envelope(black_box(frame), WINDOW).expect("envelope"));
        },
    );
}

fn bench_stream_to_envelopes(c: &mut Criterion) {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("bench.wav");
    let mut writer = WavWriter::create(&path, 2, SAMPLE_RATE, 16).expect("writer");
    writer
        .append_samples(&sawtooth(2 * 10 * SAMPLE_RATE as usize))
        .expect("append");
    writer.finalize().expect("finalize");

    let factory = StreamFactory::default();
    c.bench_function("stream_to_envelopes_10s_stereo", |b| {
        b.iter(|| {
            let mut stream = factory.provide_stream(&path).expect("stream");
            stream
                .with_open(|stream| {
                    let mut bars = 0;
                    for frame in stream.frames(SAMPLE_RATE as usize) {
                        bars += compute_frame_envelope(&frame?, WINDOW)?.bar_count();
                    }
                    Ok(bars)
                })
                .expect("read")
        });
    });
}

criterion_group!(benches, bench_compute_envelope, bench_stream_to_envelopes);
criterion_main!(benches);
