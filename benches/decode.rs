use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use dwarfscope::{ColumnSet, DwarfReader, ReaderOptions};

fn push_uleb(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// A minimal ELF64 image holding the given sections.
fn elf_image(sections: &[(&str, &[u8])]) -> Vec<u8> {
    const EHSIZE: usize = 64;

    let mut bodies = Vec::new();
    let mut cursor = EHSIZE;
    for (_, data) in sections {
        bodies.push((cursor, data.len()));
        cursor += data.len();
    }

    let mut shstrtab = vec![0u8];
    let mut name_offsets = Vec::new();
    for (name, _) in sections {
        name_offsets.push(shstrtab.len() as u32);
        shstrtab.extend_from_slice(name.as_bytes());
        shstrtab.push(0);
    }
    let shstrtab_name = shstrtab.len() as u32;
    shstrtab.extend_from_slice(b".shstrtab\0");
    let shstrtab_offset = cursor;
    cursor += shstrtab.len();
    let shoff = (cursor + 7) & !7;

    let count = sections.len() + 2;
    let mut image = Vec::new();
    image.extend_from_slice(&[0x7F, b'E', b'L', b'F', 2, 1, 1, 0]);
    image.extend_from_slice(&[0u8; 8]);
    image.extend_from_slice(&1u16.to_le_bytes());
    image.extend_from_slice(&0x3Eu16.to_le_bytes());
    image.extend_from_slice(&1u32.to_le_bytes());
    image.extend_from_slice(&0u64.to_le_bytes());
    image.extend_from_slice(&0u64.to_le_bytes());
    image.extend_from_slice(&(shoff as u64).to_le_bytes());
    image.extend_from_slice(&0u32.to_le_bytes());
    image.extend_from_slice(&64u16.to_le_bytes());
    image.extend_from_slice(&0u16.to_le_bytes());
    image.extend_from_slice(&0u16.to_le_bytes());
    image.extend_from_slice(&64u16.to_le_bytes());
    image.extend_from_slice(&(count as u16).to_le_bytes());
    image.extend_from_slice(&((count - 1) as u16).to_le_bytes());

    for (_, data) in sections {
        image.extend_from_slice(data);
    }
    image.extend_from_slice(&shstrtab);
    image.resize(shoff, 0);

    let mut shdr = |name: u32, sh_type: u32, offset: usize, size: usize| {
        image.extend_from_slice(&name.to_le_bytes());
        image.extend_from_slice(&sh_type.to_le_bytes());
        image.extend_from_slice(&[0u8; 16]); // sh_flags, sh_addr
        image.extend_from_slice(&(offset as u64).to_le_bytes());
        image.extend_from_slice(&(size as u64).to_le_bytes());
        image.extend_from_slice(&[0u8; 8]); // sh_link, sh_info
        image.extend_from_slice(&1u64.to_le_bytes());
        image.extend_from_slice(&0u64.to_le_bytes());
    };

    shdr(0, 0, 0, 0);
    for (i, (offset, size)) in bodies.iter().enumerate() {
        shdr(name_offsets[i], 1, *offset, *size);
    }
    shdr(shstrtab_name, 3, shstrtab_offset, shstrtab.len());

    image
}

/// `unit_count` units, each a compile_unit root with `entries_per_unit` child variables.
fn synthetic_image(unit_count: usize, entries_per_unit: usize) -> Vec<u8> {
    // Abbrevs: 1 = compile_unit(name: string) with children,
    //          2 = variable(name: string, decl_line: udata) without.
    let mut abbrev = Vec::new();
    for (code, tag, children, attrs) in [
        (1u64, 0x11u64, 1u8, &[(0x03u64, 0x08u64)][..]),
        (2, 0x34, 0, &[(0x03, 0x08), (0x3B, 0x0F)][..]),
    ] {
        push_uleb(&mut abbrev, code);
        push_uleb(&mut abbrev, tag);
        abbrev.push(children);
        for &(attr, form) in attrs {
            push_uleb(&mut abbrev, attr);
            push_uleb(&mut abbrev, form);
        }
        push_uleb(&mut abbrev, 0);
        push_uleb(&mut abbrev, 0);
    }
    push_uleb(&mut abbrev, 0);

    let mut info = Vec::new();
    for unit in 0..unit_count {
        let mut dies = Vec::new();
        push_uleb(&mut dies, 1);
        dies.extend_from_slice(format!("unit{unit}.c\0").as_bytes());
        for entry in 0..entries_per_unit {
            push_uleb(&mut dies, 2);
            dies.extend_from_slice(format!("var_{entry}\0").as_bytes());
            push_uleb(&mut dies, entry as u64 % 997);
        }
        push_uleb(&mut dies, 0);

        let mut header = Vec::new();
        header.extend_from_slice(&4u16.to_le_bytes());
        header.extend_from_slice(&0u32.to_le_bytes());
        header.push(8);

        info.extend_from_slice(&((header.len() + dies.len()) as u32).to_le_bytes());
        info.extend_from_slice(&header);
        info.extend_from_slice(&dies);
    }

    elf_image(&[(".debug_info", &info), (".debug_abbrev", &abbrev)])
}

fn decode_benchmark(c: &mut Criterion) {
    let image = synthetic_image(8, 10_000);
    let image_len = image.len() as u64;

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(image_len));

    for threads in [1usize, 4] {
        group.bench_function(format!("all_columns_{threads}_threads"), |b| {
            b.iter(|| {
                let mut reader = DwarfReader::from_mem(
                    image.clone(),
                    ReaderOptions {
                        num_threads: threads,
                        columns: ColumnSet::all(),
                    },
                )
                .unwrap();
                let mut rows = 0usize;
                while let Some(batch) = reader.next_batch().unwrap() {
                    rows += batch.num_rows();
                }
                rows
            });
        });
    }

    group.bench_function("projected_tag_offset", |b| {
        b.iter(|| {
            let mut reader = DwarfReader::from_mem(
                image.clone(),
                ReaderOptions {
                    num_threads: 4,
                    columns: ColumnSet::TAG | ColumnSet::OFFSET,
                },
            )
            .unwrap();
            let mut rows = 0usize;
            while let Some(batch) = reader.next_batch().unwrap() {
                rows += batch.num_rows();
            }
            rows
        });
    });

    group.finish();
}

criterion_group!(benches, decode_benchmark);
criterion_main!(benches);
