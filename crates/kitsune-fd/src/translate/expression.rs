//! Class expressions as rule bodies

use super::TranslationContext;
use crate::FdError;
use itertools::Itertools;
use kitsune_asp::{Aggregate, AggregateElement, Atom, CmpOp, Literal, Rule};
use kitsune_owl::{ClassExpression, Individual, PropertyExpression};

/// Alternative rule bodies; empty means the expression never holds
pub(crate) type Bodies = Vec<Vec<Literal>>;

/// `¬C`, without stacking double complements
pub(crate) fn negate(expr: &ClassExpression) -> ClassExpression {
    match expr {
        ClassExpression::ComplementOf(inner) => (**inner).clone(),
        other => other.clone().complement(),
    }
}

fn filler(class: &Option<Box<ClassExpression>>) -> ClassExpression {
    class.as_deref().cloned().unwrap_or(ClassExpression::Thing)
}

pub(crate) fn concat_bodies(mut a: Vec<Literal>, b: Vec<Literal>) -> Vec<Literal> {
    a.extend(b);
    a
}

impl TranslationContext {
    /// Body that is true exactly when `expr` holds at element `x`;
    /// `None` when it can never hold.
    pub(crate) fn holds(&mut self, expr: &ClassExpression, x: usize) -> Result<Option<Vec<Literal>>, FdError> {
        Ok(match expr {
            ClassExpression::Named(iri) => Some(vec![Literal::Pos(self.class_atom(iri, x))]),
            ClassExpression::Thing => Some(Vec::new()),
            ClassExpression::Nothing => None,
            ClassExpression::ComplementOf(inner) if inner.is_literal() => self.holds_not(inner, x)?,
            _ => {
                let aux = self.aux_for(expr)?;
                Some(vec![Literal::Pos(self.aux_atom(&aux, x))])
            }
        })
    }

    /// Body that is true exactly when `expr` does not hold at `x`
    pub(crate) fn holds_not(&mut self, expr: &ClassExpression, x: usize) -> Result<Option<Vec<Literal>>, FdError> {
        Ok(match expr {
            ClassExpression::Named(iri) => {
                Some(vec![Literal::Pos(self.class_atom(iri, x).complement())])
            }
            ClassExpression::Thing => None,
            ClassExpression::Nothing => Some(Vec::new()),
            ClassExpression::ComplementOf(inner) => self.holds(inner, x)?,
            _ => {
                let aux = self.aux_for(expr)?;
                Some(vec![Literal::Not(self.aux_atom(&aux, x))])
            }
        })
    }

    fn aux_atom(&self, aux: &str, x: usize) -> Atom {
        Atom::new(aux, vec![self.constant(x).to_string()])
    }

    /// Auxiliary predicate defined to hold exactly where `expr` holds.
    ///
    /// Sub-expressions are defined before the expression itself, so
    /// numbering follows a post-order walk of the expression tree.
    pub(crate) fn aux_for(&mut self, expr: &ClassExpression) -> Result<String, FdError> {
        if let Some(name) = self.aux_cache.get(expr) {
            return Ok(name.clone());
        }

        let mut definitions = Vec::new();
        for x in self.elements() {
            definitions.push((x, self.define(expr, x)?));
        }

        let name = self.fresh_aux();
        self.pending.comment(format!("{} := {}", name, expr));
        for (x, bodies) in definitions {
            for body in bodies {
                let head = self.aux_atom(&name, x);
                self.pending.push(Rule::new(head, body));
            }
        }
        self.aux_cache.insert(expr.clone(), name.clone());
        Ok(name)
    }

    /// Bodies of the rules defining `expr` at `x`
    fn define(&mut self, expr: &ClassExpression, x: usize) -> Result<Bodies, FdError> {
        let direct = self.is_direct();
        match expr {
            ClassExpression::Named(_) | ClassExpression::Thing | ClassExpression::Nothing => {
                Ok(self.holds(expr, x)?.into_iter().collect())
            }
            ClassExpression::IntersectionOf(conjuncts) => {
                let mut body = Vec::new();
                for conjunct in conjuncts {
                    match self.holds(conjunct, x)? {
                        Some(part) => body.extend(part),
                        None => return Ok(Vec::new()),
                    }
                }
                Ok(vec![body])
            }
            ClassExpression::UnionOf(disjuncts) => {
                let mut bodies = Vec::new();
                for disjunct in disjuncts {
                    bodies.extend(self.holds(disjunct, x)?);
                }
                Ok(bodies)
            }
            ClassExpression::ComplementOf(inner) => Ok(self.holds_not(inner, x)?.into_iter().collect()),
            ClassExpression::OneOf(individuals) => {
                let members = self.members(individuals)?;
                Ok(if members.contains(&x) { vec![Vec::new()] } else { Vec::new() })
            }
            ClassExpression::SomeValuesFrom { property, class } => {
                if direct {
                    let elements = self.successors(property, class, x, false)?;
                    Ok(self.count_body(elements, CmpOp::Ge, 1))
                } else {
                    let mut bodies = Vec::new();
                    for y in self.elements() {
                        if let Some(body) = self.holds(class, y)? {
                            bodies.push(concat_bodies(vec![Literal::Pos(self.role_atom(property, x, y))], body));
                        }
                    }
                    Ok(bodies)
                }
            }
            ClassExpression::AllValuesFrom { property, class } => {
                if direct {
                    let elements = self.successors(property, class, x, true)?;
                    Ok(self.count_body(elements, CmpOp::Le, 0))
                } else {
                    let counterexample = ClassExpression::SomeValuesFrom {
                        property: property.clone(),
                        class: Box::new(negate(class)),
                    };
                    Ok(self.holds_not(&counterexample, x)?.into_iter().collect())
                }
            }
            ClassExpression::HasValue { property, individual } => {
                let y = self.element(individual)?;
                Ok(vec![vec![Literal::Pos(self.role_atom(property, x, y))]])
            }
            ClassExpression::HasSelf(property) => Ok(vec![vec![Literal::Pos(self.role_atom(property, x, x))]]),
            ClassExpression::MinCardinality { cardinality, property, class } => {
                let n = *cardinality as usize;
                if n == 0 {
                    return Ok(vec![Vec::new()]);
                }
                let class = filler(class);
                if direct {
                    let elements = self.successors(property, &class, x, false)?;
                    Ok(self.count_body(elements, CmpOp::Ge, n))
                } else {
                    let mut candidates = Vec::new();
                    for y in self.elements() {
                        if let Some(body) = self.holds(&class, y)? {
                            candidates.push(concat_bodies(vec![Literal::Pos(self.role_atom(property, x, y))], body));
                        }
                    }
                    Ok(candidates
                        .into_iter()
                        .combinations(n)
                        .map(|chosen| chosen.into_iter().flatten().collect())
                        .collect())
                }
            }
            ClassExpression::MaxCardinality { cardinality, property, class } => {
                let n = *cardinality as usize;
                if direct {
                    let elements = self.successors(property, &filler(class), x, false)?;
                    Ok(self.count_body(elements, CmpOp::Le, n))
                } else {
                    let more = ClassExpression::MinCardinality {
                        cardinality: cardinality.saturating_add(1),
                        property: property.clone(),
                        class: class.clone(),
                    };
                    Ok(self.holds_not(&more, x)?.into_iter().collect())
                }
            }
            ClassExpression::ExactCardinality { cardinality, property, class } => {
                let n = *cardinality as usize;
                if direct {
                    let elements = self.successors(property, &filler(class), x, false)?;
                    Ok(self.count_body(elements, CmpOp::Eq, n))
                } else {
                    let at_least = ClassExpression::MinCardinality {
                        cardinality: *cardinality,
                        property: property.clone(),
                        class: class.clone(),
                    };
                    let more = ClassExpression::MinCardinality {
                        cardinality: cardinality.saturating_add(1),
                        property: property.clone(),
                        class: class.clone(),
                    };
                    match (self.holds(&at_least, x)?, self.holds_not(&more, x)?) {
                        (Some(a), Some(b)) => Ok(vec![concat_bodies(a, b)]),
                        _ => Ok(Vec::new()),
                    }
                }
            }
        }
    }

    /// Count elements `y : R(x,y), C(y)` (or `¬C(y)` when `negated`)
    pub(crate) fn successors(
        &mut self,
        property: &PropertyExpression,
        class: &ClassExpression,
        x: usize,
        negated: bool,
    ) -> Result<Vec<AggregateElement>, FdError> {
        let mut elements = Vec::new();
        for y in self.elements() {
            let filler = if negated { self.holds_not(class, y)? } else { self.holds(class, y)? };
            if let Some(body) = filler {
                let role = Literal::Pos(self.role_atom(property, x, y));
                elements.push(AggregateElement {
                    terms: vec![self.constant(y).to_string()],
                    condition: concat_bodies(vec![role], body),
                });
            }
        }
        Ok(elements)
    }

    /// A body holding when the count over `elements` satisfies `op bound`,
    /// folded away when the outcome is already fixed.
    fn count_body(&self, elements: Vec<AggregateElement>, op: CmpOp, bound: usize) -> Bodies {
        if elements.is_empty() {
            return if op.holds(0, bound) { vec![Vec::new()] } else { Vec::new() };
        }
        vec![vec![Literal::Count(Aggregate { elements, op, bound })]]
    }

    /// Domain positions of the individuals of a nominal
    pub(crate) fn members(&self, individuals: &[Individual]) -> Result<Vec<usize>, FdError> {
        individuals.iter().map(|i| self.element(i)).collect()
    }

    /// Bodies under which `expr` holds at `x`, for the left-hand side of
    /// an inclusion. The direct strategy inlines nominals, unions and
    /// intersections instead of naming them.
    pub(crate) fn lhs_bodies(&mut self, expr: &ClassExpression, x: usize) -> Result<Bodies, FdError> {
        if !self.is_direct() {
            return Ok(self.holds(expr, x)?.into_iter().collect());
        }
        match expr {
            ClassExpression::Nothing => Ok(Vec::new()),
            ClassExpression::Thing => Ok(vec![Vec::new()]),
            ClassExpression::OneOf(individuals) => {
                let members = self.members(individuals)?;
                Ok(if members.contains(&x) { vec![Vec::new()] } else { Vec::new() })
            }
            ClassExpression::UnionOf(disjuncts) => {
                let mut bodies = Vec::new();
                for disjunct in disjuncts {
                    bodies.extend(self.lhs_bodies(disjunct, x)?);
                }
                Ok(bodies)
            }
            ClassExpression::IntersectionOf(conjuncts) => {
                let mut product: Bodies = vec![Vec::new()];
                for conjunct in conjuncts {
                    let alternatives = self.lhs_bodies(conjunct, x)?;
                    product = product
                        .into_iter()
                        .cartesian_product(alternatives)
                        .map(|(a, b)| concat_bodies(a, b))
                        .collect();
                    if product.is_empty() {
                        break;
                    }
                }
                Ok(product)
            }
            _ => Ok(self.holds(expr, x)?.into_iter().collect()),
        }
    }
}
