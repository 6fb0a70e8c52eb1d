//! モデル列挙とデコード

use crate::translate::TranslationContext;
use crate::FdError;
use kitsune_asp::{AnswerSet, Atom, Literal, Program, Rule, SolveOptions, Solver};
use kitsune_owl::{Entity, Individual, OwlIri};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

/// One fixed-domain model, decoded back into ontology vocabulary
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Model {
    /// Classes of every domain element
    pub classes: BTreeMap<Individual, BTreeSet<OwlIri>>,
    /// Property successors of every domain element
    pub properties: BTreeMap<Individual, BTreeSet<(OwlIri, Individual)>>,
}

impl Model {
    pub fn has_class(&self, individual: &Individual, class: &OwlIri) -> bool {
        self.classes.get(individual).map_or(false, |c| c.contains(class))
    }

    pub fn has_property(&self, subject: &Individual, property: &OwlIri, object: &Individual) -> bool {
        self.properties
            .get(subject)
            .map_or(false, |p| p.contains(&(property.clone(), object.clone())))
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (individual, classes) in &self.classes {
            let names: Vec<&str> = classes.iter().map(|c| c.local_name()).collect();
            writeln!(f, "{}: {}", individual.iri().local_name(), names.join(", "))?;
            if let Some(successors) = self.properties.get(individual) {
                for (property, target) in successors {
                    writeln!(f, "  {} -> {}", property.local_name(), target.iri().local_name())?;
                }
            }
        }
        Ok(())
    }
}

impl TranslationContext {
    /// Positive atoms that determine a model: class memberships and, without
    /// a projection, property tuples
    pub(crate) fn observable_atoms(&self, projection: Option<&BTreeSet<OwlIri>>) -> Vec<Atom> {
        let mut atoms = Vec::new();
        for (_, symbol) in self.observable_classes(projection) {
            for constant in self.constants() {
                atoms.push(Atom::new(symbol.clone(), vec![constant.clone()]));
            }
        }
        if projection.is_none() {
            for (_, symbol) in self.registered_properties() {
                for from in self.constants() {
                    for to in self.constants() {
                        atoms.push(Atom::new(symbol, vec![from.clone(), to.clone()]));
                    }
                }
            }
        }
        atoms
    }

    /// Decode an answer set; atoms without a mapper entry are skipped
    pub fn decode(&self, answer: &AnswerSet, projection: Option<&BTreeSet<OwlIri>>) -> Model {
        let mut model = Model::default();
        for element in self.domain().elements() {
            model.classes.insert(element.clone(), BTreeSet::new());
        }

        for atom in answer.atoms.iter().filter(|a| !a.negated) {
            let Some(entity) = self.mapper().entity_for(&atom.predicate) else {
                continue;
            };
            let individuals: Option<Vec<Individual>> = atom
                .args
                .iter()
                .map(|arg| match self.mapper().entity_for(arg) {
                    Some(Entity::Individual(iri)) => Some(Individual(iri.clone())),
                    _ => None,
                })
                .collect();
            let Some(individuals) = individuals else {
                continue;
            };

            match (entity, individuals.as_slice()) {
                (Entity::Class(iri), [x]) => {
                    if projection.map_or(true, |p| p.contains(iri)) {
                        model.classes.entry(x.clone()).or_default().insert(iri.clone());
                    }
                }
                (Entity::ObjectProperty(iri), [x, y]) if projection.is_none() => {
                    model
                        .properties
                        .entry(x.clone())
                        .or_default()
                        .insert((iri.clone(), y.clone()));
                }
                _ => {}
            }
        }
        model
    }
}

/// Lazy sequence of distinct models.
///
/// Each step asks the solver for one answer set, then adds a constraint
/// excluding exactly its observable atom assignment before the next step.
pub struct ModelEnumerator<'a> {
    solver: &'a dyn Solver,
    context: &'a TranslationContext,
    program: Program,
    observable: Vec<Atom>,
    projection: Option<BTreeSet<OwlIri>>,
    options: SolveOptions,
    limit: usize,
    found: usize,
    done: bool,
}

impl<'a> ModelEnumerator<'a> {
    /// `limit == 0` enumerates every model
    pub fn new(
        solver: &'a dyn Solver,
        context: &'a TranslationContext,
        program: Program,
        projection: Option<BTreeSet<OwlIri>>,
        options: SolveOptions,
        limit: usize,
    ) -> Self {
        let observable = context.observable_atoms(projection.as_ref());
        Self {
            solver,
            context,
            program,
            observable,
            projection,
            options: SolveOptions {
                max_models: 1,
                ..options
            },
            limit,
            found: 0,
            done: false,
        }
    }

    /// Models produced so far
    pub fn found(&self) -> usize {
        self.found
    }

    fn block(&mut self, answer: &AnswerSet) {
        let body = self
            .observable
            .iter()
            .map(|atom| {
                if answer.contains(atom) {
                    Literal::Pos(atom.clone())
                } else {
                    Literal::Not(atom.clone())
                }
            })
            .collect();
        self.program.push(Rule::constraint(body));
    }
}

impl Iterator for ModelEnumerator<'_> {
    type Item = Result<Model, FdError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || (self.limit > 0 && self.found >= self.limit) {
            return None;
        }

        let answers = match self.solver.solve(&self.program, &self.options) {
            Ok(answers) => answers,
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        };
        let Some(answer) = answers.into_iter().next() else {
            debug!("Enumeration exhausted after {} model(s)", self.found);
            self.done = true;
            return None;
        };

        let model = self.context.decode(&answer, self.projection.as_ref());
        if self.observable.is_empty() {
            // nothing observable tells models apart
            self.done = true;
        } else {
            self.block(&answer);
        }
        self.found += 1;
        debug!("Model {} found", self.found);
        Some(Ok(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Strategy;
    use crate::domain::Domain;
    use crate::mapper::SanitizingMapper;
    use kitsune_asp::BuiltinSolver;
    use kitsune_owl::parse_ontology;

    fn setup(source: &str) -> (TranslationContext, Program) {
        let ontology = parse_ontology(source).unwrap();
        let domain = Domain::resolve(&ontology, None).unwrap();
        let mut context = TranslationContext::new(domain, Box::new(SanitizingMapper::new()), Strategy::Naive);
        let program = context.translate_ontology(&ontology).unwrap().complete();
        (context, program)
    }

    const TWO_CLASSES: &str = r#"
Prefix(:=<http://e.org/#>)
Ontology(
  ClassAssertion(:A :x)
  ClassAssertion(ObjectUnionOf(:B :C) :x)
  DisjointClasses(:B :C)
)"#;

    #[test]
    fn test_enumeration_blocks_previous_models() {
        let (context, program) = setup(TWO_CLASSES);
        let solver = BuiltinSolver::new();
        let models: Vec<Model> = ModelEnumerator::new(&solver, &context, program, None, SolveOptions::default(), 0)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(models.len(), 2);
        assert_ne!(models[0], models[1]);

        let x = Individual::new("http://e.org/#x");
        let a = OwlIri::new("http://e.org/#A");
        assert!(models.iter().all(|m| m.has_class(&x, &a)));
    }

    #[test]
    fn test_limit_bounds_enumeration() {
        let (context, program) = setup(TWO_CLASSES);
        let solver = BuiltinSolver::new();
        let mut enumerator = ModelEnumerator::new(&solver, &context, program, None, SolveOptions::default(), 1);
        assert!(enumerator.next().is_some());
        assert!(enumerator.next().is_none());
        assert_eq!(enumerator.found(), 1);
    }

    #[test]
    fn test_projection_collapses_models() {
        let (context, program) = setup(TWO_CLASSES);
        let solver = BuiltinSolver::new();
        let projection: BTreeSet<OwlIri> = [OwlIri::new("http://e.org/#A")].into_iter().collect();
        let models: Vec<Model> =
            ModelEnumerator::new(&solver, &context, program, Some(projection), SolveOptions::default(), 0)
                .collect::<Result<_, _>>()
                .unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].to_string(), "x: A\n");
    }

    #[test]
    fn test_decode_skips_auxiliary_atoms() {
        let (context, _) = setup(TWO_CLASSES);
        let answer = AnswerSet::new(vec![
            Atom::new("a", vec!["x".into()]),
            Atom::new("_aux1", vec!["x".into()]),
            Atom::strong_negation("b", vec!["x".into()]),
            Atom::new("c", vec!["unknown".into()]),
        ]);
        let model = context.decode(&answer, None);
        assert_eq!(model.to_string(), "x: A\n");
    }
}
