use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use simple_zip::{build_archive, crc32, ArchiveOptions, PendingFile, ZipArchive};

fn generate_random_data(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state = 0x12345678u32;
    for _ in 0..size {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        data.push((state >> 16) as u8);
    }
    data
}

fn bench_crc32(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc32");
    for size in [1024, 64 * 1024, 1024 * 1024] {
        let data = generate_random_data(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(format_size(size)), &data, |b, data| {
            b.iter(|| crc32(black_box(data)));
        });
    }
    group.finish();
}

fn bench_single_large_entry(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_entry");
    for size in [10 * 1024, 1024 * 1024, 10 * 1024 * 1024] {
        let files = vec![PendingFile::new("test.bin", generate_random_data(size))];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(format_size(size)), &files, |b, files| {
            b.iter(|| build_archive(black_box(files)).unwrap());
        });
    }
    group.finish();
}

fn bench_many_small_entries(c: &mut Criterion) {
    let mut group = c.benchmark_group("many_entries");
    let files: Vec<PendingFile> = (0..1000)
        .map(|i| PendingFile::new(format!("files/{:04}.txt", i), generate_random_data(256)))
        .collect();

    // one batch, pre-sized
    group.bench_function("batch_presized", |b| {
        b.iter(|| build_archive(black_box(&files)).unwrap());
    });

    // one append per file against a tiny hint: grows on every call
    group.bench_function("per_file_tiny_hint", |b| {
        b.iter(|| {
            let mut zip = ZipArchive::with_options(16, ArchiveOptions::legacy());
            for file in &files {
                zip.append_file(black_box(file)).unwrap();
            }
            zip.generate().unwrap()
        });
    });
    group.finish();
}

fn format_size(size: usize) -> String {
    if size >= 1024 * 1024 {
        format!("{}MB", size / (1024 * 1024))
    } else if size >= 1024 {
        format!("{}KB", size / 1024)
    } else {
        format!("{}B", size)
    }
}

criterion_group!(
    benches,
    bench_crc32,
    bench_single_large_entry,
    bench_many_small_entries
);
criterion_main!(benches);
