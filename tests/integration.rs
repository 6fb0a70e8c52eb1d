// Integration tests for Kitsune components
// These tests verify end-to-end functionality across multiple crates

use kitsune_asp::BuiltinSolver;
use kitsune_fd::axiomatize::write_axiomatized;
use kitsune_fd::{FixedDomainReasoner, Model, ReasonerConfig, Strategy as TranslationStrategy};
use kitsune_owl::{parse_ontology, Axiom, FileOntologyLoader, Individual, Ontology, OntologyLoader, OwlIri};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use tempfile::TempDir;

const BASE: &str = r#"
Prefix(:=<http://e.org/#>)
Ontology(<http://e.org/base>
  SubClassOf(:Student :Person)
  DisjointClasses(:Person :Course)
  ObjectPropertyDomain(:attends :Student)
  ObjectPropertyRange(:attends :Course)
)"#;

const DATA: &str = r#"
Prefix(:=<http://e.org/#>)
Ontology(<http://e.org/data>
  Import(<http://e.org/base>)
  ObjectPropertyAssertion(:attends :ann :logic)
  ClassAssertion(:Person :bob)
)"#;

fn load_university(dir: &TempDir) -> Ontology {
    fs::write(dir.path().join("base.ofn"), BASE).unwrap();
    fs::write(dir.path().join("data.ofn"), DATA).unwrap();

    let mut loader = FileOntologyLoader::new();
    assert_eq!(loader.add_directory(dir.path()).unwrap(), 2);
    loader.load("http://e.org/data").unwrap()
}

fn reasoner(ontology: Ontology, strategy: TranslationStrategy) -> FixedDomainReasoner {
    let config = ReasonerConfig {
        strategy,
        ..ReasonerConfig::default()
    };
    FixedDomainReasoner::new(ontology, None, config, Box::new(BuiltinSolver::new())).unwrap()
}

fn query(body: &str) -> Vec<Axiom> {
    parse_ontology(&format!("Prefix(:=<http://e.org/#>)\nOntology({})", body))
        .unwrap()
        .axioms
}

fn ind(name: &str) -> Individual {
    Individual::new(format!("http://e.org/#{}", name))
}

#[test]
fn test_end_to_end_imports_and_reasoning() {
    let dir = TempDir::new().unwrap();
    let ontology = load_university(&dir);
    assert_eq!(ontology.axioms.len(), 6);

    for strategy in [TranslationStrategy::Naive, TranslationStrategy::Direct] {
        let r = reasoner(ontology.clone(), strategy);
        assert_eq!(r.domain_size(), 3);
        assert!(r.is_consistent().unwrap());

        let entailed = query(
            "ClassAssertion(:Student :ann)
             ClassAssertion(:Person :ann)
             ClassAssertion(:Course :logic)
             ClassAssertion(ObjectComplementOf(:Person) :logic)",
        );
        assert!(r.is_entailed(&entailed).unwrap());
        assert!(!r.is_entailed(&query("ClassAssertion(:Student :bob)")).unwrap());

        let models = r.models(5).unwrap();
        assert!(!models.is_empty() && models.len() <= 5);
        let student = OwlIri::new("http://e.org/#Student");
        let course = OwlIri::new("http://e.org/#Course");
        for model in &models {
            assert!(model.has_class(&ind("ann"), &student));
            assert!(model.has_class(&ind("logic"), &course));
            assert!(!model.has_class(&ind("bob"), &course));
        }
    }
}

#[test]
fn test_end_to_end_inconsistency_and_justification() {
    let dir = TempDir::new().unwrap();
    let mut ontology = load_university(&dir);
    let bad = query("ObjectPropertyAssertion(:attends :logic :ann)");
    ontology.add_axiom(bad[0].clone());

    let r = reasoner(ontology, TranslationStrategy::Naive);
    assert!(!r.is_consistent().unwrap());
    assert!(r.models(0).unwrap().is_empty());

    let justification = r.justification().unwrap().unwrap();
    assert!(justification.contains(&bad[0]));
    assert!(!justification.contains(&query("ClassAssertion(:Person :bob)")[0]));
}

#[test]
fn test_axiomatized_ontology_keeps_models() {
    let dir = TempDir::new().unwrap();
    let ontology = parse_ontology(
        r#"Prefix(:=<http://e.org/#>)
Ontology(<http://e.org/small>
  ClassAssertion(:A :a)
  DifferentIndividuals(:a :b)
)"#,
    )
    .unwrap();
    let original = reasoner(ontology.clone(), TranslationStrategy::Direct);

    let path = dir.path().join("small-fd.ofn");
    write_axiomatized(&ontology, original.domain(), &path).unwrap();
    let mut loader = FileOntologyLoader::new();
    let axiomatized = reasoner(loader.load(path.to_str().unwrap()).unwrap(), TranslationStrategy::Direct);

    assert_eq!(axiomatized.domain(), original.domain());
    let expected: BTreeSet<Model> = original.models(0).unwrap().into_iter().collect();
    let found: BTreeSet<Model> = axiomatized.models(0).unwrap().into_iter().collect();
    assert_eq!(expected.len(), 2);
    assert_eq!(found, expected);

    let closure = query("SubClassOf(owl:Thing ObjectOneOf(:a :b))");
    assert!(original.is_entailed(&closure).unwrap());
    assert!(axiomatized.is_entailed(&closure).unwrap());
}

#[test]
fn test_default_reasoner_session() {
    let ontology = query("ClassAssertion(ObjectSomeValuesFrom(:knows :Person) :ann)");
    let r = FixedDomainReasoner::with_defaults(Ontology::from_axioms(ontology)).unwrap();
    assert_eq!(r.strategy(), TranslationStrategy::Naive);
    // the only element has to know itself
    assert!(r.is_entailed(&query("ObjectPropertyAssertion(:knows :ann :ann)")).unwrap());
}

fn class_expression() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(":A"),
        Just(":B"),
        Just("ObjectComplementOf(:A)"),
        Just("ObjectUnionOf(:A :B)"),
        Just("ObjectSomeValuesFrom(:r :B)"),
        Just("ObjectAllValuesFrom(:r :A)"),
        Just("ObjectMaxCardinality(1 :r)"),
        Just("ObjectOneOf(:a)"),
    ]
    .prop_map(String::from)
}

fn individual() -> impl Strategy<Value = String> {
    prop_oneof![Just(":a"), Just(":b"), Just(":c")].prop_map(String::from)
}

fn axiom() -> impl Strategy<Value = String> {
    prop_oneof![
        (class_expression(), individual()).prop_map(|(c, i)| format!("ClassAssertion({} {})", c, i)),
        (class_expression(), class_expression()).prop_map(|(c, d)| format!("SubClassOf({} {})", c, d)),
        (individual(), individual()).prop_map(|(x, y)| format!("ObjectPropertyAssertion(:r {} {})", x, y)),
    ]
}

fn generated_ontology() -> impl Strategy<Value = Ontology> {
    proptest::collection::vec(axiom(), 1..6).prop_map(|axioms| {
        parse_ontology(&format!("Prefix(:=<http://e.org/#>)\nOntology(\n{}\n)", axioms.join("\n"))).unwrap()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_translation_is_deterministic(ontology in generated_ontology()) {
        for strategy in [TranslationStrategy::Naive, TranslationStrategy::Direct, TranslationStrategy::Debug] {
            let first = reasoner(ontology.clone(), strategy).program().to_string();
            let second = reasoner(ontology.clone(), strategy).program().to_string();
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn prop_strategies_agree_on_consistency(ontology in generated_ontology()) {
        let naive = reasoner(ontology.clone(), TranslationStrategy::Naive).is_consistent().unwrap();
        let direct = reasoner(ontology, TranslationStrategy::Direct).is_consistent().unwrap();
        prop_assert_eq!(naive, direct);
    }
}
