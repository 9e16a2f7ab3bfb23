use chardev_device::{CAPACITY, CharDevice, SharedBuffer};
use chardev_perf::make_payload;
use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn device() -> CharDevice {
    CharDevice::new(
        "bench",
        SharedBuffer::with_content(&make_payload(CAPACITY - 1)),
    )
}

/// Reads one session to end of stream in `chunk`-sized pieces.
fn drain(dev: &CharDevice, chunk: usize) -> usize {
    let mut session = dev.open();
    let mut buf = [0u8; CAPACITY];
    let chunk = chunk.min(CAPACITY);
    while session.read_into(&mut buf[..chunk]) > 0 {}
    session.cursor()
}

fn bench_session_cycle(c: &mut Criterion) {
    let dev = device();
    let mut group = c.benchmark_group("session");
    group.throughput(Throughput::Bytes((CAPACITY - 1) as u64));

    group.bench_function("open+drain+close (256)", |b| {
        b.iter(|| black_box(drain(&dev, CAPACITY)));
    });

    group.bench_function("open+drain+close (16)", |b| {
        b.iter(|| black_box(drain(&dev, 16)));
    });

    group.finish();
}

fn bench_contended(c: &mut Criterion) {
    let dev = device();
    let stop = Arc::new(AtomicBool::new(false));

    let writer = {
        let dev = dev.clone();
        let stop = Arc::clone(&stop);
        std::thread::spawn(move || {
            let mut session = dev.open();
            let a = make_payload(CAPACITY - 1);
            let b = make_payload(64);
            let mut flip = false;
            while !stop.load(Ordering::Relaxed) {
                session.write(if flip { &a } else { &b });
                flip = !flip;
            }
        })
    };

    let mut group = c.benchmark_group("session/contended");
    group.bench_function("open+drain+close (64) vs writer", |b| {
        b.iter(|| black_box(drain(&dev, 64)));
    });
    group.finish();

    stop.store(true, Ordering::Relaxed);
    let _ = writer.join();
}

criterion_group!(benches, bench_session_cycle, bench_contended);
criterion_main!(benches);
