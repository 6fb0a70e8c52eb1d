use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kitsune_owl::{parse_ontology, write_ontology};

fn create_test_document(size: usize) -> String {
    let mut doc = String::from("Prefix(:=<http://example.org/>)\nOntology(<http://example.org/bench>\n");

    for i in 0..size {
        // Class declaration
        doc.push_str(&format!("    Declaration(Class(:Class{}))\n", i));

        // Class assertion
        doc.push_str(&format!("    ClassAssertion(:Class{} :ind{})\n", i, i));

        // Subclass relation (except for root)
        if i > 0 {
            doc.push_str(&format!(
                "    SubClassOf(:Class{} ObjectSomeValuesFrom(:property{} :Class{}))\n",
                i,
                i,
                i - 1
            ));
        }
    }

    doc.push_str(")\n");
    doc
}

fn benchmark_parsing(c: &mut Criterion) {
    let sizes = vec![10, 100, 1000];

    for size in sizes {
        let document = create_test_document(size);
        c.bench_function(&format!("parse_{}_entities", size), |b| {
            b.iter(|| {
                let _ontology = parse_ontology(black_box(&document)).unwrap();
            });
        });
    }
}

fn benchmark_writing(c: &mut Criterion) {
    let sizes = vec![10, 100, 1000];

    for size in sizes {
        let ontology = parse_ontology(&create_test_document(size)).unwrap();
        c.bench_function(&format!("write_{}_entities", size), |b| {
            b.iter(|| {
                let mut buffer = Vec::new();
                write_ontology(black_box(&ontology), &mut buffer).unwrap();
            });
        });
    }
}

criterion_group!(benches, benchmark_parsing, benchmark_writing);
criterion_main!(benches);
