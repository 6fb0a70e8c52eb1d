//! 公理から解集合プログラムへの翻訳
//!
//! 各クラス・プロパティはドメイン上で全域 (`c(e) | -c(e).`) とし、
//! 公理はドメイン全体に基底化された規則・制約になります。

mod axiom;
mod expression;

use crate::config::Strategy;
use crate::domain::Domain;
use crate::mapper::SignatureMapper;
use crate::FdError;
use kitsune_asp::{Atom, Literal, Program, Rule};
use kitsune_owl::{Axiom, ClassExpression, Entity, Individual, Ontology, OwlIri, PropertyExpression};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};

/// Predicate of the provenance atoms `_ax(k)` of the debug strategy
pub const ACTIVATION_PREDICATE: &str = "_ax";

/// Per-session translation state: the domain, the symbol mapping and the
/// auxiliary predicates introduced so far.
///
/// Cloning a context gives an independent copy, used for query fragments
/// that must not leak vocabulary into the base program.
#[derive(Clone)]
pub struct TranslationContext {
    domain: Domain,
    mapper: Box<dyn SignatureMapper>,
    strategy: Strategy,
    constants: Vec<String>,
    class_symbols: BTreeMap<OwlIri, String>,
    property_symbols: BTreeMap<OwlIri, String>,
    aux_cache: HashMap<ClassExpression, String>,
    aux_counter: usize,
    query_counter: usize,
    /// Totality and auxiliary definitions not yet emitted
    pending: Program,
}

/// A translated ontology
#[derive(Debug, Clone)]
pub struct Translation {
    /// Every rule, without activation facts
    pub program: Program,
    /// Debug strategy only: index and axiom behind each `_ax(k)` tag
    pub activations: Vec<(usize, Axiom)>,
}

impl Translation {
    /// The program with every axiom active
    pub fn complete(&self) -> Program {
        self.with_active(self.activations.iter().map(|(k, _)| *k))
    }

    /// The program with only the given axioms active
    pub fn with_active(&self, active: impl IntoIterator<Item = usize>) -> Program {
        let mut program = self.program.clone();
        let facts: Vec<usize> = active.into_iter().collect();
        if !facts.is_empty() {
            program.comment("activation");
            for k in facts {
                program.push(Rule::fact(activation_atom(k)));
            }
        }
        program
    }
}

pub(crate) fn activation_atom(k: usize) -> Atom {
    Atom::new(ACTIVATION_PREDICATE, vec![k.to_string()])
}

impl TranslationContext {
    pub fn new(domain: Domain, mut mapper: Box<dyn SignatureMapper>, strategy: Strategy) -> Self {
        let constants = domain
            .elements()
            .iter()
            .map(|i| mapper.symbol_for(&Entity::Individual(i.iri().clone())))
            .collect();
        Self {
            domain,
            mapper,
            strategy,
            constants,
            class_symbols: BTreeMap::new(),
            property_symbols: BTreeMap::new(),
            aux_cache: HashMap::new(),
            aux_counter: 0,
            query_counter: 0,
            pending: Program::new(),
        }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn mapper(&self) -> &dyn SignatureMapper {
        self.mapper.as_ref()
    }

    /// Number of auxiliary predicates introduced so far
    pub fn aux_count(&self) -> usize {
        self.aux_counter
    }

    pub fn registered_classes(&self) -> impl Iterator<Item = (&OwlIri, &str)> {
        self.class_symbols.iter().map(|(iri, s)| (iri, s.as_str()))
    }

    pub fn registered_properties(&self) -> impl Iterator<Item = (&OwlIri, &str)> {
        self.property_symbols.iter().map(|(iri, s)| (iri, s.as_str()))
    }

    /// Program constant of the i-th domain element
    pub fn constant(&self, element: usize) -> &str {
        &self.constants[element]
    }

    pub(crate) fn elements(&self) -> std::ops::Range<usize> {
        0..self.domain.len()
    }

    pub(crate) fn element(&self, individual: &Individual) -> Result<usize, FdError> {
        self.domain.index_of(individual).ok_or_else(|| {
            FdError::Configuration(format!("individual {} is not a domain element", individual))
        })
    }

    pub(crate) fn is_direct(&self) -> bool {
        self.strategy == Strategy::Direct
    }

    /// Translate a whole ontology: totality for its signature, then every
    /// axiom in document order.
    pub fn translate_ontology(&mut self, ontology: &Ontology) -> Result<Translation, FdError> {
        let mut program = Program::new();
        let mut activations = Vec::new();

        for iri in &ontology.classes {
            self.class_symbol(iri);
        }
        for iri in &ontology.object_properties {
            self.property_symbol(iri);
        }
        // Totality and auxiliary definitions stay untagged in debug mode;
        // only source axioms take part in justifications.
        program.comment("totality");
        self.flush_pending(&mut program);

        for (k, axiom) in ontology.axioms.iter().enumerate() {
            let mut rules = Vec::new();
            self.translate_axiom(axiom, &mut rules)?;
            if rules.is_empty() && self.pending.statements().is_empty() {
                continue;
            }

            program.comment(axiom.to_string());
            self.flush_pending(&mut program);
            if self.strategy == Strategy::Debug && !rules.is_empty() {
                for rule in &mut rules {
                    rule.body.push(Literal::Pos(activation_atom(k)));
                }
                activations.push((k, axiom.clone()));
            }
            for rule in rules {
                program.push(rule);
            }
        }

        info!(
            "Translated {} axioms into {} rules ({} strategy, {} auxiliary predicates)",
            ontology.axioms.len(),
            program.len(),
            self.strategy,
            self.aux_counter
        );
        Ok(Translation { program, activations })
    }

    pub(crate) fn flush_pending(&mut self, program: &mut Program) {
        program.extend(std::mem::take(&mut self.pending));
    }

    /// Symbol of a class, registering it (with totality) on first use
    pub(crate) fn class_symbol(&mut self, iri: &OwlIri) -> String {
        if let Some(symbol) = self.class_symbols.get(iri) {
            return symbol.clone();
        }
        let symbol = self.mapper.symbol_for(&Entity::Class(iri.clone()));
        debug!("Class {} -> {}", iri, symbol);
        for x in self.elements() {
            let atom = Atom::new(symbol.clone(), vec![self.constants[x].clone()]);
            self.pending
                .push(Rule::disjunction(vec![atom.clone(), atom.complement()], vec![]));
        }
        self.class_symbols.insert(iri.clone(), symbol.clone());
        symbol
    }

    pub(crate) fn property_symbol(&mut self, iri: &OwlIri) -> String {
        if let Some(symbol) = self.property_symbols.get(iri) {
            return symbol.clone();
        }
        let symbol = self.mapper.symbol_for(&Entity::ObjectProperty(iri.clone()));
        debug!("Property {} -> {}", iri, symbol);
        for x in self.elements() {
            for y in self.elements() {
                let atom = Atom::new(
                    symbol.clone(),
                    vec![self.constants[x].clone(), self.constants[y].clone()],
                );
                self.pending
                    .push(Rule::disjunction(vec![atom.clone(), atom.complement()], vec![]));
            }
        }
        self.property_symbols.insert(iri.clone(), symbol.clone());
        symbol
    }

    pub(crate) fn class_atom(&mut self, iri: &OwlIri, x: usize) -> Atom {
        let symbol = self.class_symbol(iri);
        Atom::new(symbol, vec![self.constants[x].clone()])
    }

    /// `R(x,y)`, with `InverseOf(R)(x,y)` read as `R(y,x)`
    pub(crate) fn role_atom(&mut self, property: &PropertyExpression, x: usize, y: usize) -> Atom {
        let (from, to) = match property {
            PropertyExpression::Named(_) => (x, y),
            PropertyExpression::InverseOf(_) => (y, x),
        };
        let symbol = self.property_symbol(property.property());
        Atom::new(
            symbol,
            vec![self.constants[from].clone(), self.constants[to].clone()],
        )
    }

    pub(crate) fn fresh_aux(&mut self) -> String {
        self.aux_counter += 1;
        format!("_aux{}", self.aux_counter)
    }

    pub(crate) fn fresh_query(&mut self) -> String {
        self.query_counter += 1;
        format!("_query{}", self.query_counter)
    }

    /// Symbols of every domain element, in domain order
    pub fn constants(&self) -> &[String] {
        &self.constants
    }

    pub(crate) fn observable_classes(&self, projection: Option<&BTreeSet<OwlIri>>) -> Vec<(OwlIri, String)> {
        self.class_symbols
            .iter()
            .filter(|(iri, _)| projection.map_or(true, |p| p.contains(*iri)))
            .map(|(iri, s)| (iri.clone(), s.clone()))
            .collect()
    }
}

impl std::fmt::Debug for TranslationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationContext")
            .field("domain", &self.domain)
            .field("strategy", &self.strategy)
            .field("classes", &self.class_symbols.len())
            .field("properties", &self.property_symbols.len())
            .field("aux", &self.aux_counter)
            .finish()
    }
}
