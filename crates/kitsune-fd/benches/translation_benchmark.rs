use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kitsune_fd::{FixedDomainReasoner, ReasonerConfig, Strategy};
use kitsune_asp::BuiltinSolver;
use kitsune_owl::{parse_ontology, Ontology};

fn create_chain_ontology(size: usize) -> Ontology {
    let mut doc = String::from("Prefix(:=<http://example.org/>)\nOntology(<http://example.org/bench>\n");

    for i in 0..size {
        doc.push_str(&format!("    ClassAssertion(:Class{} :ind{})\n", i, i));

        if i > 0 {
            doc.push_str(&format!(
                "    SubClassOf(:Class{} ObjectSomeValuesFrom(:next :Class{}))\n",
                i,
                i - 1
            ));
        }
    }
    doc.push_str("    FunctionalObjectProperty(:next)\n");

    doc.push_str(")\n");
    parse_ontology(&doc).unwrap()
}

fn reasoner(ontology: Ontology, strategy: Strategy) -> FixedDomainReasoner {
    let config = ReasonerConfig {
        strategy,
        ..ReasonerConfig::default()
    };
    FixedDomainReasoner::new(ontology, None, config, Box::new(BuiltinSolver::new())).unwrap()
}

fn benchmark_translation(c: &mut Criterion) {
    let sizes = vec![5, 10, 20];

    for size in sizes {
        let ontology = create_chain_ontology(size);
        for strategy in [Strategy::Naive, Strategy::Direct] {
            c.bench_function(&format!("translate_{}_{}_elements", strategy, size), |b| {
                b.iter(|| {
                    let r = reasoner(black_box(ontology.clone()), strategy);
                    black_box(r.program().len());
                });
            });
        }
    }
}

fn benchmark_consistency(c: &mut Criterion) {
    let sizes = vec![3, 5, 8];

    for size in sizes {
        let r = reasoner(create_chain_ontology(size), Strategy::Direct);
        c.bench_function(&format!("consistency_{}_elements", size), |b| {
            b.iter(|| {
                let _consistent = r.is_consistent().unwrap();
            });
        });
    }
}

criterion_group!(benches, benchmark_translation, benchmark_consistency);
criterion_main!(benches);
