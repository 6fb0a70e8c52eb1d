//! 固定ドメイン意味論の公理化
//!
//! 一意名仮定とドメイン閉包を OWL 公理として明示し、
//! 通常の開世界推論器でも同じ答えが得られるようにします。

use crate::domain::Domain;
use crate::FdError;
use kitsune_owl::{write_ontology, Axiom, ClassExpression, Entity, Ontology};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// Axioms stating unique names and domain closure for `domain`
pub fn fixed_domain_axioms(domain: &Domain) -> Vec<Axiom> {
    let mut axioms: Vec<Axiom> = domain
        .elements()
        .iter()
        .map(|i| Axiom::Declaration(Entity::Individual(i.iri().clone())))
        .collect();
    if domain.len() > 1 {
        axioms.push(Axiom::DifferentIndividuals(domain.elements().to_vec()));
    }
    axioms.push(Axiom::SubClassOf(
        ClassExpression::Thing,
        ClassExpression::OneOf(domain.elements().to_vec()),
    ));
    axioms
}

/// The ontology extended with its fixed-domain axioms
pub fn axiomatize(ontology: &Ontology, domain: &Domain) -> Ontology {
    let mut result = Ontology {
        iri: ontology.iri.clone(),
        prefixes: ontology.prefixes.clone(),
        ..Ontology::default()
    };
    for axiom in ontology.axioms.iter().cloned().chain(fixed_domain_axioms(domain)) {
        if !result.axioms.contains(&axiom) {
            result.add_axiom(axiom);
        }
    }
    result
}

/// Write the axiomatized ontology to `path` in functional syntax
pub fn write_axiomatized(ontology: &Ontology, domain: &Domain, path: &Path) -> Result<(), FdError> {
    let axiomatized = axiomatize(ontology, domain);
    let mut out = BufWriter::new(File::create(path)?);
    write_ontology(&axiomatized, &mut out)?;
    info!(
        "Wrote {} axioms with fixed-domain semantics to {}",
        axiomatized.axioms.len(),
        path.display()
    );
    Ok(())
}
