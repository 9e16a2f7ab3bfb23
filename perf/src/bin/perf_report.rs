use std::hint::black_box;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chardev_buffer::{CAPACITY, SharedBuffer};
use chardev_device::CharDevice;
use chardev_perf::*;

fn main() {
    let json = std::env::args().any(|a| a == "--json");
    let harness = Harness::default();
    let mut results: Vec<BenchResult> = Vec::new();

    section_buffer(&harness, &mut results);
    section_session(&harness, &mut results);
    section_contended(&harness, &mut results);

    if json {
        match serde_json::to_string_pretty(&results) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("failed to serialize results: {e}"),
        }
    } else {
        print_table(&results);
    }
}

fn section_buffer(harness: &Harness, results: &mut Vec<BenchResult>) {
    let buf = SharedBuffer::new();
    for len in PAYLOAD_SIZES {
        let payload = make_payload(len);
        results.push(harness.run(&format!("replace ({len} B)"), || {
            black_box(buf.replace(black_box(&payload)));
        }));
    }

    buf.replace(&make_payload(CAPACITY - 1));
    let mut out = [0u8; CAPACITY];
    results.push(harness.run("read_into (full)", || {
        black_box(buf.read_into(black_box(0), &mut out));
    }));
}

fn section_session(harness: &Harness, results: &mut Vec<BenchResult>) {
    let dev = CharDevice::new("perf", SharedBuffer::with_content(&make_payload(CAPACITY - 1)));
    let mut buf = [0u8; 16];
    results.push(harness.run("open+drain(16)+close", || {
        let mut s = dev.open();
        while s.read_into(&mut buf) > 0 {}
        black_box(s.cursor());
    }));
}

fn section_contended(harness: &Harness, results: &mut Vec<BenchResult>) {
    let dev = CharDevice::new("perf", SharedBuffer::new());
    let stop = Arc::new(AtomicBool::new(false));

    let writer = {
        let dev = dev.clone();
        let stop = Arc::clone(&stop);
        std::thread::spawn(move || {
            let mut s = dev.open();
            let payload = make_payload(128);
            while !stop.load(Ordering::Relaxed) {
                s.write(&payload);
            }
        })
    };

    let buffer = dev.buffer();
    let mut out = [0u8; CAPACITY];
    results.push(harness.run("read_into vs writer", || {
        black_box(buffer.read_into(0, &mut out));
    }));

    stop.store(true, Ordering::Relaxed);
    let _ = writer.join();
}

fn print_table(results: &[BenchResult]) {
    println!(
        "{:<28} {:>8} {:>8} {:>8} {:>8} {:>10}   (ns/op)",
        "bench", "p50", "p90", "p99", "max", "mean"
    );
    println!("{}", "─".repeat(76));
    for r in results {
        let s = &r.stats;
        println!(
            "{:<28} {:>8} {:>8} {:>8} {:>8} {:>10.1}",
            r.name, s.p50, s.p90, s.p99, s.max, s.mean
        );
    }
}
