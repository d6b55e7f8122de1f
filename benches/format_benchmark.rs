//! Benchmarks for paperdoc formatting performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks format synthetic manuscripts of increasing length.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use paperdoc::model::{Document, Paragraph, Run, Table};
use paperdoc::{Docx, Formatter, TemplateRegistry};

/// Creates a synthetic manuscript with the given number of sections.
fn create_manuscript(section_count: usize) -> Document {
    let mut doc = Document::new();
    doc.add_paragraph(Paragraph::with_text("Benchmark manuscript"));

    for i in 0..section_count {
        let mut heading = Paragraph::new();
        heading.add_run(Run::bold(format!("{} Section", i + 1)));
        doc.add_paragraph(heading);

        for j in 0..8 {
            let mut p = Paragraph::with_text(format!(
                "Paragraph {} of section {} describes the measurements in some detail. ",
                j + 1,
                i + 1
            ));
            p.add_run(Run::bold("Key result."));
            doc.add_paragraph(p);
        }

        doc.add_paragraph(Paragraph::with_text(format!("Table {}: Summary", i + 1)));
        doc.add_table(Table::from_text(vec![
            vec!["Site", "Mean", "SD"],
            vec!["A", "1.2", "0.1"],
            vec!["B", "3.4", "0.2"],
        ]));
    }
    doc
}

/// Benchmark the formatting pass at various sizes.
fn bench_formatting(c: &mut Criterion) {
    let templates = TemplateRegistry::builtin();
    let formatter = Formatter::new(templates.resolve(Some("agu"))).unwrap();
    let mut group = c.benchmark_group("formatting");

    for section_count in [1, 10, 50].iter() {
        let doc = create_manuscript(*section_count);

        group.bench_function(format!("{}_sections", section_count), |b| {
            b.iter(|| {
                let mut doc = doc.clone();
                formatter.apply(black_box(&mut doc))
            });
        });
    }

    group.finish();
}

/// Benchmark reading and writing the package.
fn bench_package_round_trip(c: &mut Criterion) {
    let bytes = Docx::new(create_manuscript(10)).to_bytes().unwrap();

    c.bench_function("docx_read", |b| {
        b.iter(|| Docx::from_bytes(black_box(&bytes)).unwrap());
    });

    c.bench_function("docx_write", |b| {
        let docx = Docx::from_bytes(&bytes).unwrap();
        b.iter(|| docx.clone().to_bytes().unwrap());
    });
}

/// Benchmark format detection.
fn bench_format_detection(c: &mut Criterion) {
    let latex = b"\\documentclass{article}\n\\begin{document}\nText\n\\end{document}";
    let other = b"Not a manuscript, just random text content";

    c.bench_function("detect_latex", |b| {
        b.iter(|| paperdoc::detect_format_from_bytes(black_box(latex)).unwrap());
    });

    c.bench_function("detect_unknown", |b| {
        b.iter(|| paperdoc::detect_format_from_bytes(black_box(other)).is_err());
    });
}

criterion_group!(
    benches,
    bench_formatting,
    bench_package_round_trip,
    bench_format_detection,
);
criterion_main!(benches);
