//! 含意判定: 問い合わせ公理の否定を付加するプログラム断片

use crate::translate::TranslationContext;
use crate::FdError;
use itertools::Itertools;
use kitsune_asp::{Atom, Literal, Program, Rule};
use kitsune_owl::{Axiom, ClassExpression, PropertyExpression};

impl TranslationContext {
    /// Fragment restricting the base program to models that violate `axiom`.
    ///
    /// Every way of violating the axiom derives a fresh `_queryN` atom and an
    /// integrity constraint demands it, so the axiom is entailed exactly when
    /// the base program plus this fragment has no answer set. Vocabulary the
    /// base program does not know is registered (with totality) in this
    /// context only.
    pub fn negated_query(&mut self, axiom: &Axiom) -> Result<Program, FdError> {
        let mut witnesses = Vec::new();
        self.witnesses(axiom, &mut witnesses)?;

        let name = self.fresh_query();
        let mut program = Program::new();
        program.comment(format!("negation of {}", axiom));
        self.flush_pending(&mut program);
        for body in witnesses {
            program.push(Rule::new(Atom::new(name.clone(), vec![]), body));
        }
        program.push(Rule::constraint(vec![Literal::Not(Atom::new(name, vec![]))]));
        Ok(program)
    }

    fn witnesses(&mut self, axiom: &Axiom, out: &mut Vec<Vec<Literal>>) -> Result<(), FdError> {
        match axiom {
            Axiom::Declaration(_) => {}
            Axiom::SubClassOf(sub, sup) => {
                for x in self.elements() {
                    if let (Some(mut body), Some(violation)) = (self.holds(sub, x)?, self.holds_not(sup, x)?) {
                        body.extend(violation);
                        out.push(body);
                    }
                }
            }
            Axiom::EquivalentClasses(classes) => {
                if let Some((first, rest)) = classes.split_first() {
                    for other in rest {
                        self.witnesses(&Axiom::SubClassOf(first.clone(), other.clone()), out)?;
                        self.witnesses(&Axiom::SubClassOf(other.clone(), first.clone()), out)?;
                    }
                }
            }
            Axiom::DisjointClasses(classes) => {
                for (a, b) in classes.iter().tuple_combinations() {
                    for x in self.elements() {
                        if let (Some(mut body), Some(other)) = (self.holds(a, x)?, self.holds(b, x)?) {
                            body.extend(other);
                            out.push(body);
                        }
                    }
                }
            }
            Axiom::DisjointUnion(class, parts) => {
                let whole = ClassExpression::Named(class.clone());
                let union = ClassExpression::UnionOf(parts.clone());
                self.witnesses(&Axiom::EquivalentClasses(vec![whole, union]), out)?;
                self.witnesses(&Axiom::DisjointClasses(parts.clone()), out)?;
            }
            Axiom::SubObjectPropertyOf(sub, sup) => {
                for (x, y) in self.pairs() {
                    out.push(vec![
                        Literal::Pos(self.role_atom(sub, x, y)),
                        Literal::Pos(self.role_atom(sup, x, y).complement()),
                    ]);
                }
            }
            Axiom::EquivalentObjectProperties(properties) => {
                if let Some((first, rest)) = properties.split_first() {
                    for other in rest {
                        self.witnesses(&Axiom::SubObjectPropertyOf(first.clone(), other.clone()), out)?;
                        self.witnesses(&Axiom::SubObjectPropertyOf(other.clone(), first.clone()), out)?;
                    }
                }
            }
            Axiom::DisjointObjectProperties(properties) => {
                for (r, s) in properties.iter().tuple_combinations() {
                    for (x, y) in self.pairs() {
                        out.push(vec![Literal::Pos(self.role_atom(r, x, y)), Literal::Pos(self.role_atom(s, x, y))]);
                    }
                }
            }
            Axiom::InverseObjectProperties(r, s) => {
                self.witnesses(&Axiom::SubObjectPropertyOf(r.clone(), s.inverse()), out)?;
                self.witnesses(&Axiom::SubObjectPropertyOf(s.inverse(), r.clone()), out)?;
            }
            Axiom::ObjectPropertyDomain(property, class) => self.typing_witnesses(property, class, false, out)?,
            Axiom::ObjectPropertyRange(property, class) => self.typing_witnesses(property, class, true, out)?,
            Axiom::FunctionalObjectProperty(property) => {
                for x in self.elements() {
                    for (y, z) in self.elements().tuple_combinations() {
                        out.push(vec![
                            Literal::Pos(self.role_atom(property, x, y)),
                            Literal::Pos(self.role_atom(property, x, z)),
                        ]);
                    }
                }
            }
            Axiom::InverseFunctionalObjectProperty(property) => {
                self.witnesses(&Axiom::FunctionalObjectProperty(property.inverse()), out)?;
            }
            Axiom::ReflexiveObjectProperty(property) => {
                for x in self.elements() {
                    out.push(vec![Literal::Pos(self.role_atom(property, x, x).complement())]);
                }
            }
            Axiom::IrreflexiveObjectProperty(property) => {
                for x in self.elements() {
                    out.push(vec![Literal::Pos(self.role_atom(property, x, x))]);
                }
            }
            Axiom::SymmetricObjectProperty(property) => {
                for (x, y) in self.pairs().filter(|(x, y)| x != y) {
                    out.push(vec![
                        Literal::Pos(self.role_atom(property, x, y)),
                        Literal::Pos(self.role_atom(property, y, x).complement()),
                    ]);
                }
            }
            Axiom::AsymmetricObjectProperty(property) => {
                for (x, y) in self.pairs().filter(|(x, y)| x <= y) {
                    let mut body = vec![Literal::Pos(self.role_atom(property, x, y))];
                    if x != y {
                        body.push(Literal::Pos(self.role_atom(property, y, x)));
                    }
                    out.push(body);
                }
            }
            Axiom::TransitiveObjectProperty(property) => {
                for (x, y) in self.pairs().filter(|(x, y)| x != y) {
                    for z in self.elements().filter(|z| *z != y) {
                        out.push(vec![
                            Literal::Pos(self.role_atom(property, x, y)),
                            Literal::Pos(self.role_atom(property, y, z)),
                            Literal::Pos(self.role_atom(property, x, z).complement()),
                        ]);
                    }
                }
            }
            Axiom::SameIndividual(individuals) => {
                let members = self.members(individuals)?;
                if members.iter().any(|m| *m != members[0]) {
                    out.push(Vec::new());
                }
            }
            Axiom::DifferentIndividuals(individuals) => {
                let members = self.members(individuals)?;
                if !members.iter().all_unique() {
                    out.push(Vec::new());
                }
            }
            Axiom::ClassAssertion(class, individual) => {
                let x = self.element(individual)?;
                out.extend(self.holds_not(class, x)?);
            }
            Axiom::ObjectPropertyAssertion(property, a, b) => {
                let (x, y) = (self.element(a)?, self.element(b)?);
                out.push(vec![Literal::Pos(self.role_atom(property, x, y).complement())]);
            }
            Axiom::NegativeObjectPropertyAssertion(property, a, b) => {
                let (x, y) = (self.element(a)?, self.element(b)?);
                out.push(vec![Literal::Pos(self.role_atom(property, x, y))]);
            }
            Axiom::Unsupported { kind, source } => {
                return Err(FdError::Unsupported {
                    axiom: source.clone(),
                    reason: format!("{} axioms cannot be checked for entailment", kind),
                });
            }
        }
        Ok(())
    }

    /// `R(x,y)` with `x` (domain) or `y` (range) outside `class`
    fn typing_witnesses(
        &mut self,
        property: &PropertyExpression,
        class: &ClassExpression,
        range: bool,
        out: &mut Vec<Vec<Literal>>,
    ) -> Result<(), FdError> {
        for (x, y) in self.pairs() {
            let typed = if range { y } else { x };
            if let Some(violation) = self.holds_not(class, typed)? {
                let mut body = vec![Literal::Pos(self.role_atom(property, x, y))];
                body.extend(violation);
                out.push(body);
            }
        }
        Ok(())
    }
}
