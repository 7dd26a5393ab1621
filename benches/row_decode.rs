use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use zero_rowcodec::constant::ColumnType;
use zero_rowcodec::protocol::primitive::{write_bytes_lenenc, write_null};
use zero_rowcodec::{BinaryRowDecoder, ColumnDefinition, Dialect, Opts, RowDecoder, TextRowDecoder};

pub struct Post {
    pub id: i32,
    pub user_id: i64,
    pub title: String,
    pub body: Option<String>,
}

fn post_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("id", ColumnType::INTEGER),
        ColumnDefinition::new("user_id", ColumnType::BIGINT),
        ColumnDefinition::new("title", ColumnType::VARCHAR),
        ColumnDefinition::new("body", ColumnType::VARCHAR),
    ]
}

fn binary_rows(n: usize) -> Vec<Vec<u8>> {
    (0..n)
        .map(|i| {
            // header + 1 bitmap byte; body (bit 5) NULL on odd rows
            let mut row = vec![0x00, if i % 2 == 1 { 0b0010_0000 } else { 0 }];
            row.extend_from_slice(&(i as i32).to_le_bytes());
            row.extend_from_slice(&(i as i64 * 7).to_le_bytes());
            write_bytes_lenenc(&mut row, format!("Post number {}", i).as_bytes());
            if i % 2 == 0 {
                write_bytes_lenenc(&mut row, "This is the body of the post".as_bytes());
            }
            row
        })
        .collect()
}

fn text_rows(n: usize) -> Vec<Vec<u8>> {
    (0..n)
        .map(|i| {
            let mut row = Vec::new();
            write_bytes_lenenc(&mut row, i.to_string().as_bytes());
            write_bytes_lenenc(&mut row, (i * 7).to_string().as_bytes());
            write_bytes_lenenc(&mut row, format!("Post number {}", i).as_bytes());
            if i % 2 == 0 {
                write_bytes_lenenc(&mut row, "This is the body of the post".as_bytes());
            } else {
                write_null(&mut row);
            }
            row
        })
        .collect()
}

fn read_post<'a>(decoder: &mut impl RowDecoder<'a>) -> Post {
    let (id, user_id, title, body) = decoder
        .decode_row::<(i32, i64, String, Option<String>)>()
        .unwrap();
    Post {
        id,
        user_id,
        title,
        body,
    }
}

fn bench_decode(c: &mut Criterion) {
    let cols = post_columns();
    let opts = Opts::default();
    let mut group = c.benchmark_group("decode_rows");

    for size in [100, 10_000] {
        let binary = binary_rows(size);
        group.bench_with_input(BenchmarkId::new("binary", size), &binary, |b, rows| {
            b.iter(|| {
                let mut decoder = BinaryRowDecoder::new(&cols, &opts, Dialect::Mysql);
                let mut posts = Vec::with_capacity(rows.len());
                for row in rows {
                    decoder.bind(row).unwrap();
                    posts.push(read_post(&mut decoder));
                }
                black_box(posts)
            });
        });

        let text = text_rows(size);
        group.bench_with_input(BenchmarkId::new("text", size), &text, |b, rows| {
            b.iter(|| {
                let mut decoder = TextRowDecoder::new(&cols, &opts, Dialect::Mysql);
                let mut posts = Vec::with_capacity(rows.len());
                for row in rows {
                    decoder.bind(row).unwrap();
                    posts.push(read_post(&mut decoder));
                }
                black_box(posts)
            });
        });
    }
    group.finish();
}

/// Reading the last column first forces a full scan; later reads reuse it.
fn bench_backward_access(c: &mut Criterion) {
    let cols = post_columns();
    let opts = Opts::default();
    let rows = binary_rows(1_000);

    c.bench_function("binary_reverse_order", |b| {
        b.iter(|| {
            let mut decoder = BinaryRowDecoder::new(&cols, &opts, Dialect::Mysql);
            let mut total = 0i64;
            for row in &rows {
                decoder.bind(row).unwrap();
                for i in (0..cols.len()).rev() {
                    decoder.position(i).unwrap();
                    total += decoder.as_string(&cols[i]).unwrap().map_or(0, |s| s.len() as i64);
                }
            }
            black_box(total)
        });
    });
}

criterion_group!(benches, bench_decode, bench_backward_access);
criterion_main!(benches);
