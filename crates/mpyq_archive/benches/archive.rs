use divan::AllocProfiler;

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

fn build_input(count: usize) -> Vec<u8> {
    use binrw::BinWrite;
    use mpyq_archive::types::{MpqEntryRecord, MpqHeader, HEADER_SIZE};
    use std::io::{Cursor, Write};

    let payload = vec![0x5Au8; 256];
    let mut directory = Cursor::new(Vec::new());
    for index in 0..count {
        let key = format!("assets/{index:05}.bin");
        let (hash_a, hash_b) = mpyq_archive::HashTable::shared()
            .name_hashes(&key)
            .unwrap();
        MpqEntryRecord {
            hash_a: hash_a.into(),
            hash_b: hash_b.into(),
            index: index as i32 + 1,
            key,
            file_date: 0,
            md5: mpyq_archive::checksum::digest_hex(&payload),
            file_offset: (index * payload.len()) as i32,
            file_size: payload.len() as i32,
        }
        .write(&mut directory)
        .unwrap();
    }

    let directory = directory.into_inner();
    let blocks_offset = HEADER_SIZE + directory.len() as i32;
    let mut output = Cursor::new(Vec::new());
    MpqHeader {
        archive_size: blocks_offset + (count * payload.len()) as i32,
        entry_count: count as i32,
        blocks_offset,
        ..Default::default()
    }
    .write(&mut output)
    .unwrap();
    output.write_all(&directory).unwrap();
    for _ in 0..count {
        output.write_all(&payload).unwrap();
    }
    output.into_inner()
}

pub mod hash {
    use divan::Bencher;
    use mpyq_archive::{hash_string, HashType};

    #[divan::bench]
    fn short_name(bencher: Bencher) {
        bencher.bench(|| hash_string(divan::black_box("a.txt"), HashType::NameA));
    }

    #[divan::bench]
    fn long_name(bencher: Bencher) {
        bencher.bench(|| {
            hash_string(
                divan::black_box("characters/hero/animations/idle_loop_variant_02.anim"),
                HashType::NameB,
            )
        });
    }
}

pub mod read {
    use divan::Bencher;
    use mpyq_archive::MpqArchive;
    use std::io::Cursor;

    #[divan::bench(args = [16, 1024])]
    fn open(bencher: Bencher, count: usize) {
        bencher
            .with_inputs(|| super::build_input(count))
            .bench_refs(|data| {
                divan::black_box(MpqArchive::new(Cursor::new(data)).unwrap());
            });
    }

    #[divan::bench]
    fn read_file_first(bencher: Bencher) {
        let archive = MpqArchive::new(Cursor::new(super::build_input(1024))).unwrap();
        bencher.bench_local(move || {
            divan::black_box(archive.read_file("assets/00000.bin").unwrap());
        });
    }

    #[divan::bench(sample_count = 1)]
    fn read_file_all(bencher: Bencher) {
        let archive = MpqArchive::new(Cursor::new(super::build_input(1024))).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_owned).collect();

        bencher.bench_local(move || {
            for name in &names {
                divan::black_box(archive.read_file(name).unwrap());
            }
        });
    }
}
