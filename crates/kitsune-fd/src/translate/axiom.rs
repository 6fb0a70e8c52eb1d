//! Axioms as grounded rules and constraints

use super::expression::concat_bodies;
use super::TranslationContext;
use crate::FdError;
use itertools::Itertools;
use kitsune_asp::{Aggregate, AggregateElement, CmpOp, Literal, Rule};
use kitsune_owl::{Axiom, ClassExpression, PropertyExpression};

impl TranslationContext {
    /// Append the rules of one axiom to `out`
    pub(crate) fn translate_axiom(&mut self, axiom: &Axiom, out: &mut Vec<Rule>) -> Result<(), FdError> {
        match axiom {
            Axiom::Declaration(_) => {}
            Axiom::SubClassOf(sub, sup) => self.subclass(sub, sup, out)?,
            Axiom::EquivalentClasses(classes) => {
                if let Some((first, rest)) = classes.split_first() {
                    for other in rest {
                        self.subclass(first, other, out)?;
                        self.subclass(other, first, out)?;
                    }
                }
            }
            Axiom::DisjointClasses(classes) => {
                for (a, b) in classes.iter().tuple_combinations() {
                    self.disjoint(a, b, out)?;
                }
            }
            Axiom::DisjointUnion(class, parts) => {
                let whole = ClassExpression::Named(class.clone());
                let union = ClassExpression::UnionOf(parts.clone());
                self.subclass(&whole, &union, out)?;
                self.subclass(&union, &whole, out)?;
                for (a, b) in parts.iter().tuple_combinations() {
                    self.disjoint(a, b, out)?;
                }
            }
            Axiom::SubObjectPropertyOf(sub, sup) => self.subproperty(sub, sup, out),
            Axiom::EquivalentObjectProperties(properties) => {
                if let Some((first, rest)) = properties.split_first() {
                    for other in rest {
                        self.subproperty(first, other, out);
                        self.subproperty(other, first, out);
                    }
                }
            }
            Axiom::DisjointObjectProperties(properties) => {
                for (r, s) in properties.iter().tuple_combinations() {
                    for (x, y) in self.pairs() {
                        let body = vec![Literal::Pos(self.role_atom(r, x, y)), Literal::Pos(self.role_atom(s, x, y))];
                        out.push(Rule::constraint(body));
                    }
                }
            }
            Axiom::InverseObjectProperties(r, s) => {
                self.subproperty(r, &s.inverse(), out);
                self.subproperty(&s.inverse(), r, out);
            }
            Axiom::ObjectPropertyDomain(property, class) => {
                for (x, y) in self.pairs() {
                    let body = vec![Literal::Pos(self.role_atom(property, x, y))];
                    self.assert_member(class, x, body, out)?;
                }
            }
            Axiom::ObjectPropertyRange(property, class) => {
                for (x, y) in self.pairs() {
                    let body = vec![Literal::Pos(self.role_atom(property, x, y))];
                    self.assert_member(class, y, body, out)?;
                }
            }
            Axiom::FunctionalObjectProperty(property) => self.functional(property, out),
            Axiom::InverseFunctionalObjectProperty(property) => self.functional(&property.inverse(), out),
            Axiom::ReflexiveObjectProperty(property) => {
                for x in self.elements() {
                    out.push(Rule::fact(self.role_atom(property, x, x)));
                }
            }
            Axiom::IrreflexiveObjectProperty(property) => {
                for x in self.elements() {
                    out.push(Rule::constraint(vec![Literal::Pos(self.role_atom(property, x, x))]));
                }
            }
            Axiom::SymmetricObjectProperty(property) => {
                for (x, y) in self.pairs() {
                    if x != y {
                        let body = vec![Literal::Pos(self.role_atom(property, x, y))];
                        out.push(Rule::new(self.role_atom(property, y, x), body));
                    }
                }
            }
            Axiom::AsymmetricObjectProperty(property) => {
                for (x, y) in self.pairs() {
                    if x < y {
                        let body = vec![Literal::Pos(self.role_atom(property, x, y)), Literal::Pos(self.role_atom(property, y, x))];
                        out.push(Rule::constraint(body));
                    } else if x == y {
                        out.push(Rule::constraint(vec![Literal::Pos(self.role_atom(property, x, x))]));
                    }
                }
            }
            Axiom::TransitiveObjectProperty(property) => {
                for (x, y) in self.pairs() {
                    if x == y {
                        continue;
                    }
                    for z in self.elements() {
                        if z == y {
                            continue;
                        }
                        let body = vec![Literal::Pos(self.role_atom(property, x, y)), Literal::Pos(self.role_atom(property, y, z))];
                        out.push(Rule::new(self.role_atom(property, x, z), body));
                    }
                }
            }
            Axiom::SameIndividual(individuals) => {
                let members = self.members(individuals)?;
                // distinct names denote distinct domain elements
                if members.iter().any(|m| *m != members[0]) {
                    out.push(Rule::constraint(Vec::new()));
                }
            }
            Axiom::DifferentIndividuals(individuals) => {
                self.members(individuals)?;
            }
            Axiom::ClassAssertion(class, individual) => {
                let x = self.element(individual)?;
                self.assert_member(class, x, Vec::new(), out)?;
            }
            Axiom::ObjectPropertyAssertion(property, a, b) => {
                let (x, y) = (self.element(a)?, self.element(b)?);
                out.push(Rule::fact(self.role_atom(property, x, y)));
            }
            Axiom::NegativeObjectPropertyAssertion(property, a, b) => {
                let (x, y) = (self.element(a)?, self.element(b)?);
                out.push(Rule::fact(self.role_atom(property, x, y).complement()));
            }
            Axiom::Unsupported { kind, source } => {
                return Err(FdError::Unsupported {
                    axiom: source.clone(),
                    reason: format!("{} axioms have no fixed-domain translation", kind),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn pairs(&self) -> impl Iterator<Item = (usize, usize)> {
        self.elements().cartesian_product(self.elements())
    }

    fn subclass(&mut self, sub: &ClassExpression, sup: &ClassExpression, out: &mut Vec<Rule>) -> Result<(), FdError> {
        for x in self.elements() {
            for body in self.lhs_bodies(sub, x)? {
                self.assert_member(sup, x, body, out)?;
            }
        }
        Ok(())
    }

    fn disjoint(&mut self, a: &ClassExpression, b: &ClassExpression, out: &mut Vec<Rule>) -> Result<(), FdError> {
        for x in self.elements() {
            let left = self.lhs_bodies(a, x)?;
            let right = self.lhs_bodies(b, x)?;
            for (l, r) in left.into_iter().cartesian_product(right) {
                out.push(Rule::constraint(concat_bodies(l, r)));
            }
        }
        Ok(())
    }

    fn subproperty(&mut self, sub: &PropertyExpression, sup: &PropertyExpression, out: &mut Vec<Rule>) {
        for (x, y) in self.pairs() {
            let body = vec![Literal::Pos(self.role_atom(sub, x, y))];
            out.push(Rule::new(self.role_atom(sup, x, y), body));
        }
    }

    fn functional(&mut self, property: &PropertyExpression, out: &mut Vec<Rule>) {
        for x in self.elements() {
            if self.is_direct() {
                let elements: Vec<AggregateElement> = self
                    .elements()
                    .map(|y| AggregateElement {
                        terms: vec![self.constant(y).to_string()],
                        condition: vec![Literal::Pos(self.role_atom(property, x, y))],
                    })
                    .collect();
                out.push(Rule::constraint(vec![Literal::Count(Aggregate {
                    elements,
                    op: CmpOp::Gt,
                    bound: 1,
                })]));
            } else {
                for (y, z) in self.elements().tuple_combinations() {
                    let body = vec![Literal::Pos(self.role_atom(property, x, y)), Literal::Pos(self.role_atom(property, x, z))];
                    out.push(Rule::constraint(body));
                }
            }
        }
    }

    /// Rules forcing `class` to hold at `x` whenever `body` holds
    pub(crate) fn assert_member(
        &mut self,
        class: &ClassExpression,
        x: usize,
        body: Vec<Literal>,
        out: &mut Vec<Rule>,
    ) -> Result<(), FdError> {
        if let ClassExpression::ComplementOf(inner) = class {
            if let ClassExpression::Named(iri) = &**inner {
                out.push(Rule::new(self.class_atom(iri, x).complement(), body));
                return Ok(());
            }
        }
        match class {
            ClassExpression::Thing => {}
            ClassExpression::Nothing => out.push(Rule::constraint(body)),
            ClassExpression::Named(iri) => out.push(Rule::new(self.class_atom(iri, x), body)),
            _ if self.is_direct() => self.assert_direct(class, x, body, out)?,
            _ => {
                if let Some(violation) = self.holds_not(class, x)? {
                    out.push(Rule::constraint(concat_bodies(body, violation)));
                }
            }
        }
        Ok(())
    }

    /// Structural recursion over the asserted class
    fn assert_direct(
        &mut self,
        class: &ClassExpression,
        x: usize,
        body: Vec<Literal>,
        out: &mut Vec<Rule>,
    ) -> Result<(), FdError> {
        match class {
            ClassExpression::IntersectionOf(conjuncts) => {
                for conjunct in conjuncts {
                    self.assert_member(conjunct, x, body.clone(), out)?;
                }
            }
            ClassExpression::UnionOf(disjuncts) => {
                let mut violation = body;
                for disjunct in disjuncts {
                    match self.holds_not(disjunct, x)? {
                        Some(part) => violation.extend(part),
                        None => return Ok(()),
                    }
                }
                out.push(Rule::constraint(violation));
            }
            ClassExpression::OneOf(individuals) => {
                if !self.members(individuals)?.contains(&x) {
                    out.push(Rule::constraint(body));
                }
            }
            ClassExpression::SomeValuesFrom { property, class } => {
                self.assert_count(property, class, x, &body, CmpOp::Lt, 1, out)?;
            }
            ClassExpression::MinCardinality { cardinality, property, class } => {
                if *cardinality > 0 {
                    let filler = class.as_deref().cloned().unwrap_or(ClassExpression::Thing);
                    self.assert_count(property, &filler, x, &body, CmpOp::Lt, *cardinality as usize, out)?;
                }
            }
            ClassExpression::MaxCardinality { cardinality, property, class } => {
                let filler = class.as_deref().cloned().unwrap_or(ClassExpression::Thing);
                self.assert_count(property, &filler, x, &body, CmpOp::Gt, *cardinality as usize, out)?;
            }
            ClassExpression::ExactCardinality { cardinality, property, class } => {
                let filler = class.as_deref().cloned().unwrap_or(ClassExpression::Thing);
                let n = *cardinality as usize;
                self.assert_count(property, &filler, x, &body, CmpOp::Lt, n, out)?;
                self.assert_count(property, &filler, x, &body, CmpOp::Gt, n, out)?;
            }
            ClassExpression::AllValuesFrom { property, class } => {
                for y in self.elements() {
                    let mut guarded = body.clone();
                    guarded.push(Literal::Pos(self.role_atom(property, x, y)));
                    self.assert_member(class, y, guarded, out)?;
                }
            }
            ClassExpression::HasValue { property, individual } => {
                let y = self.element(individual)?;
                out.push(Rule::new(self.role_atom(property, x, y), body));
            }
            ClassExpression::HasSelf(property) => {
                out.push(Rule::new(self.role_atom(property, x, x), body));
            }
            _ => {
                if let Some(violation) = self.holds_not(class, x)? {
                    out.push(Rule::constraint(concat_bodies(body, violation)));
                }
            }
        }
        Ok(())
    }

    /// `:- body, #count{ y : R(x,y), C(y) } op bound.`
    #[allow(clippy::too_many_arguments)]
    fn assert_count(
        &mut self,
        property: &PropertyExpression,
        class: &ClassExpression,
        x: usize,
        body: &[Literal],
        op: CmpOp,
        bound: usize,
        out: &mut Vec<Rule>,
    ) -> Result<(), FdError> {
        let elements = self.successors(property, class, x, false)?;
        let mut violation = body.to_vec();
        if elements.is_empty() {
            if !op.holds(0, bound) {
                return Ok(());
            }
        } else {
            violation.push(Literal::Count(Aggregate { elements, op, bound }));
        }
        out.push(Rule::constraint(violation));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Strategy;
    use crate::domain::Domain;
    use crate::mapper::SanitizingMapper;
    use crate::translate::TranslationContext;
    use kitsune_owl::parse_ontology;

    fn lines(source: &str, strategy: Strategy) -> Vec<String> {
        let ontology = parse_ontology(source).unwrap();
        let domain = Domain::resolve(&ontology, None).unwrap();
        let mut context = TranslationContext::new(domain, Box::new(SanitizingMapper::new()), strategy);
        context
            .translate_ontology(&ontology)
            .unwrap()
            .complete()
            .to_string()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn has(lines: &[String], expected: &str) -> bool {
        lines.iter().any(|l| l == expected)
    }

    #[test]
    fn test_disjointness_constraints() {
        let source = r#"
Prefix(:=<http://e.org/#>)
Ontology(
  DisjointClasses(:A :B :C)
  ClassAssertion(:A :x)
)"#;
        let out = lines(source, Strategy::Naive);
        assert!(has(&out, ":- a(x), b(x)."));
        assert!(has(&out, ":- a(x), c(x)."));
        assert!(has(&out, ":- b(x), c(x)."));
    }

    #[test]
    fn test_direct_existential_is_count_constraint() {
        let source = r#"
Prefix(:=<http://e.org/#>)
Ontology(
  SubClassOf(:A ObjectMinCardinality(2 :r :B))
  ClassAssertion(:A :x)
  ClassAssertion(:B :y)
)"#;
        let out = lines(source, Strategy::Direct);
        assert!(has(&out, ":- a(x), #count{ x : r(x,x), b(x); y : r(x,y), b(y) } < 2."));
    }

    #[test]
    fn test_naive_complex_superclass_is_constraint() {
        let source = r#"
Prefix(:=<http://e.org/#>)
Ontology(
  SubClassOf(:A ObjectSomeValuesFrom(:r :B))
  ClassAssertion(:A :x)
)"#;
        let out = lines(source, Strategy::Naive);
        assert!(has(&out, "_aux1(x) :- r(x,x), b(x)."));
        assert!(has(&out, ":- a(x), not _aux1(x)."));
    }

    #[test]
    fn test_property_axioms() {
        let source = r#"
Prefix(:=<http://e.org/#>)
Ontology(
  FunctionalObjectProperty(:r)
  InverseObjectProperties(:r :s)
  TransitiveObjectProperty(:t)
  ObjectPropertyAssertion(:r :x :y)
  NegativeObjectPropertyAssertion(:t :y :x)
)"#;
        let out = lines(source, Strategy::Naive);
        assert!(has(&out, ":- r(x,x), r(x,y)."));
        assert!(has(&out, "s(y,x) :- r(x,y)."));
        assert!(has(&out, "r(x,y) :- s(y,x)."));
        assert!(has(&out, "t(x,x) :- t(x,y), t(y,x)."));
        assert!(has(&out, "-t(y,x)."));

        let direct = lines(source, Strategy::Direct);
        assert!(has(&direct, ":- #count{ x : r(x,x); y : r(x,y) } > 1."));
    }

    #[test]
    fn test_same_individual_with_distinct_names_is_contradiction() {
        let source = r#"
Prefix(:=<http://e.org/#>)
Ontology(
  SameIndividual(:x :y)
)"#;
        assert!(has(&lines(source, Strategy::Naive), ":- #true."));
    }
}
