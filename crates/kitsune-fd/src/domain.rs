//! 固定ドメインの決定

use crate::FdError;
use kitsune_owl::{Individual, Ontology};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Element synthesized when an ontology names no individual at all
pub const ANONYMOUS_ELEMENT: &str = "urn:kitsune:anonymous#a0";

/// The finite, ordered set of elements every model is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    elements: Vec<Individual>,
    synthesized: bool,
}

impl Domain {
    /// Fix the domain of a reasoning session.
    ///
    /// With an explicit domain document its named individuals are the domain,
    /// and every individual the ontology mentions has to be one of them.
    /// Otherwise the individuals of the assertional axioms (and nominals) are
    /// used, falling back to one anonymous element.
    pub fn resolve(ontology: &Ontology, explicit: Option<&Ontology>) -> Result<Self, FdError> {
        let domain = match explicit {
            Some(document) => {
                let elements = document.individuals_in_signature();
                if elements.is_empty() {
                    return Err(FdError::Configuration(
                        "explicit domain declares no named individuals".to_string(),
                    ));
                }
                let missing: Vec<String> = ontology
                    .individuals_in_signature()
                    .difference(elements)
                    .map(|i| i.to_string())
                    .collect();
                if !missing.is_empty() {
                    return Err(FdError::Configuration(format!(
                        "individuals outside the explicit domain: {}",
                        missing.join(", ")
                    )));
                }
                Self::from_individuals(elements.iter().cloned())
            }
            None => {
                let found = ontology.individuals_in_assertions();
                if found.is_empty() {
                    debug!("No named individuals; synthesizing {}", ANONYMOUS_ELEMENT);
                    Self {
                        elements: vec![Individual::new(ANONYMOUS_ELEMENT)],
                        synthesized: true,
                    }
                } else {
                    Self::from_individuals(found)
                }
            }
        };

        info!(
            "Fixed domain of {} element(s) ({})",
            domain.len(),
            if explicit.is_some() { "explicit" } else { "from assertions" }
        );
        Ok(domain)
    }

    /// Domain over the given individuals, deduplicated and sorted.
    /// An empty input yields the anonymous one-element domain.
    pub fn from_individuals(individuals: impl IntoIterator<Item = Individual>) -> Self {
        let elements: BTreeSet<Individual> = individuals.into_iter().collect();
        if elements.is_empty() {
            return Self {
                elements: vec![Individual::new(ANONYMOUS_ELEMENT)],
                synthesized: true,
            };
        }
        Self {
            elements: elements.into_iter().collect(),
            synthesized: false,
        }
    }

    pub fn elements(&self) -> &[Individual] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Never true; kept for API symmetry with collections
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, individual: &Individual) -> bool {
        self.index_of(individual).is_some()
    }

    pub fn index_of(&self, individual: &Individual) -> Option<usize> {
        self.elements.binary_search(individual).ok()
    }

    pub fn is_synthesized(&self) -> bool {
        self.synthesized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kitsune_owl::{Axiom, ClassExpression, Entity, OwlIri, PropertyExpression};

    fn ind(name: &str) -> Individual {
        Individual::new(format!("http://e.org/#{}", name))
    }

    #[test]
    fn test_domain_from_assertions() {
        let ontology = Ontology::from_axioms(vec![
            Axiom::ClassAssertion(ClassExpression::named("http://e.org/#A"), ind("b")),
            Axiom::ObjectPropertyAssertion(PropertyExpression::named("http://e.org/#r"), ind("a"), ind("b")),
            Axiom::Declaration(Entity::Individual(OwlIri::new("http://e.org/#unused"))),
        ]);
        let domain = Domain::resolve(&ontology, None).unwrap();
        assert_eq!(domain.elements(), &[ind("a"), ind("b")]);
        assert!(!domain.contains(&ind("unused")));
        assert_eq!(domain.index_of(&ind("b")), Some(1));
    }

    #[test]
    fn test_nominals_join_the_domain() {
        let ontology = Ontology::from_axioms(vec![Axiom::SubClassOf(
            ClassExpression::Thing,
            ClassExpression::OneOf(vec![ind("x"), ind("y")]),
        )]);
        assert_eq!(Domain::resolve(&ontology, None).unwrap().len(), 2);
    }

    #[test]
    fn test_empty_signature_synthesizes_one_element() {
        let ontology = Ontology::from_axioms(vec![Axiom::SubClassOf(
            ClassExpression::named("http://e.org/#A"),
            ClassExpression::named("http://e.org/#B"),
        )]);
        let domain = Domain::resolve(&ontology, None).unwrap();
        assert_eq!(domain.len(), 1);
        assert!(domain.is_synthesized());
        assert_eq!(domain.elements()[0].iri().as_str(), ANONYMOUS_ELEMENT);
    }

    #[test]
    fn test_explicit_domain() {
        let ontology = Ontology::from_axioms(vec![Axiom::ClassAssertion(
            ClassExpression::named("http://e.org/#A"),
            ind("a"),
        )]);
        let explicit = Ontology::from_axioms(
            ["a", "b", "c"]
                .iter()
                .map(|n| Axiom::Declaration(Entity::Individual(ind(n).0))),
        );
        let domain = Domain::resolve(&ontology, Some(&explicit)).unwrap();
        assert_eq!(domain.len(), 3);
        assert!(!domain.is_synthesized());
    }

    #[test]
    fn test_explicit_domain_must_cover_ontology_individuals() {
        let ontology = Ontology::from_axioms(vec![Axiom::ClassAssertion(
            ClassExpression::named("http://e.org/#A"),
            ind("z"),
        )]);
        let explicit = Ontology::from_axioms(vec![Axiom::DifferentIndividuals(vec![ind("a"), ind("b")])]);
        assert!(matches!(
            Domain::resolve(&ontology, Some(&explicit)),
            Err(FdError::Configuration(_))
        ));

        assert!(matches!(
            Domain::resolve(&ontology, Some(&Ontology::new())),
            Err(FdError::Configuration(_))
        ));
    }
}
