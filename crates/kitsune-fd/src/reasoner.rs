//! 固定ドメイン推論器
//!
//! 翻訳済みプログラムに対する一貫性・含意・正当化・モデル列挙

use crate::axiomatize::write_axiomatized;
use crate::config::{ReasonerConfig, Strategy};
use crate::domain::Domain;
use crate::enumerate::{Model, ModelEnumerator};
use crate::mapper::mapper_for;
use crate::translate::{Translation, TranslationContext};
use crate::FdError;
use kitsune_asp::{BuiltinSolver, CancelToken, Program, SolveOptions, Solver};
use kitsune_owl::{Axiom, Ontology, OwlIri};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Reasoning session over one ontology and its fixed domain
pub struct FixedDomainReasoner {
    ontology: Ontology,
    config: ReasonerConfig,
    solver: Box<dyn Solver>,
    context: TranslationContext,
    translation: Translation,
    cancel: CancelToken,
}

impl FixedDomainReasoner {
    /// Resolve the domain and translate the ontology.
    ///
    /// Fails before any translation when the domain is larger than
    /// `config.max_domain_size`.
    pub fn new(
        ontology: Ontology,
        explicit_domain: Option<&Ontology>,
        config: ReasonerConfig,
        solver: Box<dyn Solver>,
    ) -> Result<Self, FdError> {
        let domain = Domain::resolve(&ontology, explicit_domain)?;
        if let Some(limit) = config.max_domain_size {
            if domain.len() > limit {
                return Err(FdError::DomainTooLarge {
                    size: domain.len(),
                    limit,
                });
            }
        }

        let start = Instant::now();
        let mut context = TranslationContext::new(domain, mapper_for(config.mapper), config.strategy);
        let translation = context.translate_ontology(&ontology)?;
        debug!("Translation took {:?}", start.elapsed());

        Ok(Self {
            ontology,
            config,
            solver,
            context,
            translation,
            cancel: CancelToken::new(),
        })
    }

    /// Default configuration with the built-in solver
    pub fn with_defaults(ontology: Ontology) -> Result<Self, FdError> {
        Self::new(ontology, None, ReasonerConfig::default(), Box::new(BuiltinSolver::new()))
    }

    pub fn domain(&self) -> &Domain {
        self.context.domain()
    }

    pub fn domain_size(&self) -> usize {
        self.context.domain().len()
    }

    pub fn strategy(&self) -> Strategy {
        self.context.strategy()
    }

    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    /// Token stopping in-flight and later solver calls until reset
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The program submitted for consistency checking
    pub fn program(&self) -> Program {
        self.translation.complete()
    }

    /// Print the program of the configured strategy
    pub fn translate<W: Write>(&self, out: &mut W) -> Result<(), FdError> {
        write!(out, "{}", self.program())?;
        out.flush()?;
        Ok(())
    }

    fn options(&self, max_models: usize) -> SolveOptions {
        SolveOptions {
            max_models,
            timeout: self.config.timeout(),
            cancel: self.cancel.clone(),
        }
    }

    fn satisfiable(&self, program: &Program) -> Result<bool, FdError> {
        let start = Instant::now();
        let answers = self.solver.solve(program, &self.options(1))?;
        debug!(
            "{} answered {} for {} rules in {:?}",
            self.solver.name(),
            if answers.is_empty() { "UNSAT" } else { "SAT" },
            program.len(),
            start.elapsed()
        );
        Ok(!answers.is_empty())
    }

    /// Consistent iff the translated program has an answer set
    pub fn is_consistent(&self) -> Result<bool, FdError> {
        let consistent = self.satisfiable(&self.program())?;
        info!("Ontology is {}", if consistent { "consistent" } else { "inconsistent" });
        Ok(consistent)
    }

    /// Every axiom of `query` holds in every fixed-domain model.
    ///
    /// Each axiom's negation is added to a copy of the program; the query is
    /// entailed iff none of the augmented programs has an answer set.
    pub fn is_entailed(&self, query: &[Axiom]) -> Result<bool, FdError> {
        let base = self.program();
        for axiom in query {
            let mut context = self.context.clone();
            let fragment = context.negated_query(axiom)?;
            let mut program = base.clone();
            program.extend(fragment);
            if self.satisfiable(&program)? {
                info!("Not entailed: {}", axiom);
                return Ok(false);
            }
            debug!("Entailed: {}", axiom);
        }
        Ok(true)
    }

    /// A minimal set of axioms that is inconsistent on its own, or `None`
    /// for a consistent ontology.
    ///
    /// Deletion-based search over the provenance-tagged program: an axiom is
    /// dropped for good whenever the rest stays inconsistent without it.
    pub fn justification(&self) -> Result<Option<Vec<Axiom>>, FdError> {
        let tagged;
        let translation = if self.strategy() == Strategy::Debug {
            &self.translation
        } else {
            let mut context = TranslationContext::new(
                self.context.domain().clone(),
                mapper_for(self.config.mapper),
                Strategy::Debug,
            );
            tagged = context.translate_ontology(&self.ontology)?;
            &tagged
        };

        if self.satisfiable(&translation.complete())? {
            return Ok(None);
        }

        let mut active: Vec<usize> = translation.activations.iter().map(|(k, _)| *k).collect();
        let mut i = 0;
        while i < active.len() {
            let without: Vec<usize> = active
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, k)| *k)
                .collect();
            if self.satisfiable(&translation.with_active(without.iter().copied()))? {
                i += 1;
            } else {
                debug!("Axiom {} is not needed for the inconsistency", active[i]);
                active = without;
            }
        }

        let justification: Vec<Axiom> = translation
            .activations
            .iter()
            .filter(|(k, _)| active.contains(k))
            .map(|(_, axiom)| axiom.clone())
            .collect();
        info!("Justification of {} axiom(s)", justification.len());
        Ok(Some(justification))
    }

    fn projection(&self) -> Option<BTreeSet<OwlIri>> {
        if self.config.projection.is_empty() {
            return None;
        }
        let projection: BTreeSet<OwlIri> = self.config.projection.iter().map(OwlIri::new).collect();
        for iri in &projection {
            if !self.ontology.classes.contains(iri) {
                warn!("Projected class {} does not occur in the ontology", iri);
            }
        }
        Some(projection)
    }

    /// Lazily enumerate up to `limit` models (0 = all)
    pub fn enumerate_models(&self, limit: usize) -> ModelEnumerator<'_> {
        ModelEnumerator::new(
            self.solver.as_ref(),
            &self.context,
            self.program(),
            self.projection(),
            self.options(1),
            limit,
        )
    }

    /// Collect up to `limit` models (0 = all)
    pub fn models(&self, limit: usize) -> Result<Vec<Model>, FdError> {
        self.enumerate_models(limit).collect()
    }

    /// Write the ontology plus unique-name and domain-closure axioms
    pub fn axiomatize_fd_semantics(&self, path: &Path) -> Result<(), FdError> {
        write_axiomatized(&self.ontology, self.context.domain(), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kitsune_asp::SolverError;
    use kitsune_owl::parse_ontology;

    fn reasoner(source: &str) -> FixedDomainReasoner {
        FixedDomainReasoner::with_defaults(parse_ontology(source).unwrap()).unwrap()
    }

    #[test]
    fn test_consistency() {
        let consistent = reasoner(
            r#"Prefix(:=<http://e.org/#>)
Ontology( SubClassOf(:A :B) ClassAssertion(:A :a) )"#,
        );
        assert!(consistent.is_consistent().unwrap());

        let clash = reasoner(
            r#"Prefix(:=<http://e.org/#>)
Ontology( ClassAssertion(:A :a) ClassAssertion(ObjectComplementOf(:A) :a) )"#,
        );
        assert!(!clash.is_consistent().unwrap());
    }

    #[test]
    fn test_domain_limit() {
        let ontology = parse_ontology(
            r#"Prefix(:=<http://e.org/#>)
Ontology( DifferentIndividuals(:a :b :c) )"#,
        )
        .unwrap();
        let config = ReasonerConfig {
            max_domain_size: Some(2),
            ..ReasonerConfig::default()
        };
        let result = FixedDomainReasoner::new(ontology, None, config, Box::new(BuiltinSolver::new()));
        assert!(matches!(result, Err(FdError::DomainTooLarge { size: 3, limit: 2 })));
    }

    #[test]
    fn test_cancelled_call_is_not_inconsistency() {
        let r = reasoner(
            r#"Prefix(:=<http://e.org/#>)
Ontology( ClassAssertion(:A :a) )"#,
        );
        r.cancel_token().cancel();
        assert!(matches!(r.is_consistent(), Err(FdError::Solver(SolverError::Cancelled))));
        r.cancel_token().reset();
        assert!(r.is_consistent().unwrap());
    }

    #[test]
    fn test_justification_of_consistent_ontology_is_none() {
        let r = reasoner(
            r#"Prefix(:=<http://e.org/#>)
Ontology( ClassAssertion(:A :a) )"#,
        );
        assert!(r.justification().unwrap().is_none());
    }
}
