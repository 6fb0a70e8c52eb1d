//! 組み込み安定モデルソルバー
//!
//! 基底プログラムを直接探索する小規模向けソルバー。選言ヘッドは
//! シフトで正規化し、三値伝播つきの深さ優先探索で全割当を列挙、
//! 各候補を縮約 (reduct) の最小不動点と照合して安定性を確認します。

use crate::program::{Atom, CmpOp, Literal, Program};
use crate::solver::{AnswerSet, SolveOptions, Solver};
use crate::SolverError;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Value {
    Unknown,
    True,
    False,
}

#[derive(Debug, Clone)]
enum Lit {
    Pos(usize),
    Not(usize),
    Count(CountLit),
}

#[derive(Debug, Clone)]
struct CountLit {
    /// One entry per distinct term tuple, holding its alternative conditions
    groups: Vec<Vec<Vec<(usize, bool)>>>,
    op: CmpOp,
    bound: usize,
}

#[derive(Debug)]
struct GroundRule {
    head: Option<usize>,
    body: Vec<Lit>,
}

#[derive(Default)]
struct Interner {
    index: HashMap<Atom, usize>,
    atoms: Vec<Atom>,
}

impl Interner {
    fn intern(&mut self, atom: &Atom) -> usize {
        if let Some(&i) = self.index.get(atom) {
            return i;
        }
        let i = self.atoms.len();
        self.atoms.push(atom.clone());
        self.index.insert(atom.clone(), i);
        i
    }

    fn literal(&mut self, literal: &Literal) -> Result<Lit, SolverError> {
        Ok(match literal {
            Literal::Pos(atom) => Lit::Pos(self.intern(atom)),
            Literal::Not(atom) => Lit::Not(self.intern(atom)),
            Literal::Count(aggregate) => {
                let mut groups: Vec<Vec<Vec<(usize, bool)>>> = Vec::new();
                let mut by_terms: HashMap<&[String], usize> = HashMap::new();
                for element in &aggregate.elements {
                    let mut condition = Vec::with_capacity(element.condition.len());
                    for literal in &element.condition {
                        match literal {
                            Literal::Pos(atom) => condition.push((self.intern(atom), true)),
                            Literal::Not(atom) => condition.push((self.intern(atom), false)),
                            Literal::Count(_) => {
                                return Err(SolverError::InvalidProgram(
                                    "nested aggregates are not supported".to_string(),
                                ))
                            }
                        }
                    }
                    let slot = *by_terms.entry(element.terms.as_slice()).or_insert_with(|| {
                        groups.push(Vec::new());
                        groups.len() - 1
                    });
                    groups[slot].push(condition);
                }
                Lit::Count(CountLit {
                    groups,
                    op: aggregate.op,
                    bound: aggregate.bound,
                })
            }
        })
    }
}

fn atom_value(assignment: &[Value], atom: usize, positive: bool) -> Value {
    match (assignment[atom], positive) {
        (Value::Unknown, _) => Value::Unknown,
        (value, true) => value,
        (Value::True, false) => Value::False,
        (Value::False, false) => Value::True,
    }
}

fn conjunction(assignment: &[Value], condition: &[(usize, bool)]) -> Value {
    let mut result = Value::True;
    for &(atom, positive) in condition {
        match atom_value(assignment, atom, positive) {
            Value::False => return Value::False,
            Value::Unknown => result = Value::Unknown,
            Value::True => {}
        }
    }
    result
}

/// Three-valued comparison given the certain and the possible count
fn decide(op: CmpOp, certain: usize, possible: usize, bound: usize) -> Value {
    let (satisfied, violated) = match op {
        CmpOp::Ge => (certain >= bound, possible < bound),
        CmpOp::Gt => (certain > bound, possible <= bound),
        CmpOp::Le => (possible <= bound, certain > bound),
        CmpOp::Lt => (possible < bound, certain >= bound),
        CmpOp::Eq => (
            certain == bound && possible == bound,
            bound < certain || bound > possible,
        ),
    };
    if satisfied {
        Value::True
    } else if violated {
        Value::False
    } else {
        Value::Unknown
    }
}

impl CountLit {
    fn value(&self, assignment: &[Value]) -> Value {
        let (mut certain, mut possible) = (0, 0);
        for group in &self.groups {
            let mut status = Value::False;
            for condition in group {
                match conjunction(assignment, condition) {
                    Value::True => {
                        status = Value::True;
                        break;
                    }
                    Value::Unknown => status = Value::Unknown,
                    Value::False => {}
                }
            }
            match status {
                Value::True => {
                    certain += 1;
                    possible += 1;
                }
                Value::Unknown => possible += 1,
                Value::False => {}
            }
        }
        decide(self.op, certain, possible, self.bound)
    }

    /// Monotone counts grow with the derived set; the rest are fixed by the candidate
    fn holds_in_reduct(&self, candidate: &[Value], derived: &[bool]) -> bool {
        let monotone = self.op.is_monotone();
        let count = self
            .groups
            .iter()
            .filter(|group| {
                group.iter().any(|condition| {
                    condition.iter().all(|&(atom, positive)| match (positive, monotone) {
                        (true, true) => derived[atom],
                        (true, false) => candidate[atom] == Value::True,
                        (false, _) => candidate[atom] != Value::True,
                    })
                })
            })
            .count();
        self.op.holds(count, self.bound)
    }
}

impl Lit {
    fn value(&self, assignment: &[Value]) -> Value {
        match self {
            Lit::Pos(atom) => atom_value(assignment, *atom, true),
            Lit::Not(atom) => atom_value(assignment, *atom, false),
            Lit::Count(count) => count.value(assignment),
        }
    }
}

fn body_value(body: &[Lit], assignment: &[Value]) -> Value {
    let mut result = Value::True;
    for lit in body {
        match lit.value(assignment) {
            Value::False => return Value::False,
            Value::Unknown => result = Value::Unknown,
            Value::True => {}
        }
    }
    result
}

/// Normal program over interned atoms
struct Grounded {
    atoms: Vec<Atom>,
    rules: Vec<GroundRule>,
    /// Rules deriving each atom
    supports: Vec<Vec<usize>>,
}

impl Grounded {
    fn build(program: &Program) -> Result<Self, SolverError> {
        let mut interner = Interner::default();
        let mut rules = Vec::new();

        for rule in program.rules() {
            let body = rule
                .body
                .iter()
                .map(|literal| interner.literal(literal))
                .collect::<Result<Vec<_>, _>>()?;
            let heads: Vec<usize> = rule.head.iter().map(|atom| interner.intern(atom)).collect();

            match heads.as_slice() {
                [] => rules.push(GroundRule { head: None, body }),
                [head] => rules.push(GroundRule {
                    head: Some(*head),
                    body,
                }),
                _ => {
                    // shift: a | b :- B  becomes  a :- B, not b  and  b :- B, not a
                    for (i, &head) in heads.iter().enumerate() {
                        let mut shifted = body.clone();
                        shifted.extend(
                            heads
                                .iter()
                                .enumerate()
                                .filter(|(j, _)| *j != i)
                                .map(|(_, &other)| Lit::Not(other)),
                        );
                        rules.push(GroundRule {
                            head: Some(head),
                            body: shifted,
                        });
                    }
                }
            }
        }

        // p and -p never hold together
        for (i, atom) in interner.atoms.iter().enumerate() {
            if atom.negated {
                continue;
            }
            if let Some(&j) = interner.index.get(&atom.complement()) {
                rules.push(GroundRule {
                    head: None,
                    body: vec![Lit::Pos(i), Lit::Pos(j)],
                });
            }
        }

        let mut supports = vec![Vec::new(); interner.atoms.len()];
        for (r, rule) in rules.iter().enumerate() {
            if let Some(head) = rule.head {
                supports[head].push(r);
            }
        }

        Ok(Self {
            atoms: interner.atoms,
            rules,
            supports,
        })
    }

    /// Extend the assignment with forced values; false on conflict
    fn propagate(&self, assignment: &mut [Value]) -> bool {
        loop {
            let mut changed = false;

            for rule in &self.rules {
                let mut unknown = 0;
                let mut last_unknown = None;
                let mut falsified = false;
                for lit in &rule.body {
                    match lit.value(assignment) {
                        Value::False => {
                            falsified = true;
                            break;
                        }
                        Value::Unknown => {
                            unknown += 1;
                            last_unknown = Some(lit);
                        }
                        Value::True => {}
                    }
                }
                if falsified {
                    continue;
                }

                let head = rule.head.map(|h| (h, assignment[h]));
                if unknown == 0 {
                    match head {
                        None | Some((_, Value::False)) => return false,
                        Some((h, Value::Unknown)) => {
                            assignment[h] = Value::True;
                            changed = true;
                        }
                        Some((_, Value::True)) => {}
                    }
                } else if unknown == 1 && matches!(head, None | Some((_, Value::False))) {
                    // the one open literal must fail
                    match last_unknown {
                        Some(Lit::Pos(atom)) => {
                            assignment[*atom] = Value::False;
                            changed = true;
                        }
                        Some(Lit::Not(atom)) => {
                            assignment[*atom] = Value::True;
                            changed = true;
                        }
                        _ => {}
                    }
                }
            }

            for atom in 0..self.atoms.len() {
                if assignment[atom] == Value::False {
                    continue;
                }
                let (first, second) = {
                    let mut open = self.supports[atom]
                        .iter()
                        .filter(|&&r| body_value(&self.rules[r].body, assignment) != Value::False);
                    (open.next().copied(), open.next().copied())
                };
                match (first, second) {
                    (None, _) => {
                        if assignment[atom] == Value::True {
                            return false;
                        }
                        assignment[atom] = Value::False;
                        changed = true;
                    }
                    // a true atom with a single possible support needs that body
                    (Some(r), None) if assignment[atom] == Value::True => {
                        for lit in &self.rules[r].body {
                            match *lit {
                                Lit::Pos(a) if assignment[a] == Value::Unknown => {
                                    assignment[a] = Value::True;
                                    changed = true;
                                }
                                Lit::Not(a) if assignment[a] == Value::Unknown => {
                                    assignment[a] = Value::False;
                                    changed = true;
                                }
                                _ => {}
                            }
                        }
                    }
                    _ => {}
                }
            }

            if !changed {
                return true;
            }
        }
    }

    /// A total assignment is an answer set iff it equals the least model of its reduct
    fn is_stable(&self, candidate: &[Value]) -> bool {
        let mut derived = vec![false; self.atoms.len()];
        let mut changed = true;
        while changed {
            changed = false;
            for rule in &self.rules {
                let head = match rule.head {
                    Some(head) if !derived[head] => head,
                    _ => continue,
                };
                let holds = rule.body.iter().all(|lit| match lit {
                    Lit::Pos(atom) => derived[*atom],
                    Lit::Not(atom) => candidate[*atom] != Value::True,
                    Lit::Count(count) => count.holds_in_reduct(candidate, &derived),
                });
                if holds {
                    derived[head] = true;
                    changed = true;
                }
            }
        }

        derived
            .iter()
            .zip(candidate)
            .all(|(&d, &v)| d == (v == Value::True))
    }

    fn search(&self, options: &SolveOptions, start: Instant) -> Result<Vec<AnswerSet>, SolverError> {
        let mut models = Vec::new();
        let mut stack = vec![vec![Value::Unknown; self.atoms.len()]];
        let mut nodes = 0usize;

        while let Some(mut assignment) = stack.pop() {
            check_budget(options, start)?;
            nodes += 1;

            if !self.propagate(&mut assignment) {
                continue;
            }

            match assignment.iter().position(|v| *v == Value::Unknown) {
                Some(atom) => {
                    let mut positive = assignment.clone();
                    positive[atom] = Value::True;
                    assignment[atom] = Value::False;
                    stack.push(positive);
                    stack.push(assignment);
                }
                None => {
                    if !self.is_stable(&assignment) {
                        trace!("Rejected unstable candidate after {} nodes", nodes);
                        continue;
                    }
                    models.push(AnswerSet::new(
                        assignment
                            .iter()
                            .zip(&self.atoms)
                            .filter(|(v, _)| **v == Value::True)
                            .map(|(_, atom)| atom.clone()),
                    ));
                    if options.max_models > 0 && models.len() >= options.max_models {
                        break;
                    }
                }
            }
        }

        debug!("Search visited {} nodes, found {} answer sets", nodes, models.len());
        Ok(models)
    }
}

fn check_budget(options: &SolveOptions, start: Instant) -> Result<(), SolverError> {
    if options.cancel.is_cancelled() {
        return Err(SolverError::Cancelled);
    }
    if let Some(timeout) = options.timeout {
        if start.elapsed() >= timeout {
            return Err(SolverError::Timeout(timeout));
        }
    }
    Ok(())
}

/// In-process solver for ground programs
#[derive(Debug, Clone, Default)]
pub struct BuiltinSolver;

impl BuiltinSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for BuiltinSolver {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn solve(&self, program: &Program, options: &SolveOptions) -> Result<Vec<AnswerSet>, SolverError> {
        let start = Instant::now();
        check_budget(options, start)?;
        let grounded = Grounded::build(program)?;
        debug!(
            "Built-in solver: {} atoms, {} normal rules",
            grounded.atoms.len(),
            grounded.rules.len()
        );
        grounded.search(options, start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{Aggregate, AggregateElement, Rule};
    use crate::solver::CancelToken;
    use proptest::prelude::*;
    use std::time::Duration;

    fn atom(p: &str) -> Atom {
        Atom::new(p, vec![])
    }

    fn pos(p: &str) -> Literal {
        Literal::Pos(atom(p))
    }

    fn not(p: &str) -> Literal {
        Literal::Not(atom(p))
    }

    fn solve_all(program: &Program) -> Vec<Vec<String>> {
        let mut models: Vec<Vec<String>> = BuiltinSolver
            .solve(program, &SolveOptions::default())
            .unwrap()
            .into_iter()
            .map(|m| m.atoms.iter().map(|a| a.to_string()).collect())
            .collect();
        models.sort();
        models
    }

    #[test]
    fn test_definite_program() {
        let mut program = Program::new();
        program.push(Rule::fact(atom("a")));
        program.push(Rule::new(atom("b"), vec![pos("a")]));
        program.push(Rule::new(atom("c"), vec![pos("d")]));
        assert_eq!(solve_all(&program), vec![vec!["a", "b"]]);
    }

    #[test]
    fn test_even_and_odd_loops() {
        let mut even = Program::new();
        even.push(Rule::new(atom("a"), vec![not("b")]));
        even.push(Rule::new(atom("b"), vec![not("a")]));
        assert_eq!(solve_all(&even), vec![vec!["a"], vec!["b"]]);

        let mut odd = Program::new();
        odd.push(Rule::new(atom("a"), vec![not("a")]));
        assert!(solve_all(&odd).is_empty());
    }

    #[test]
    fn test_positive_loop_is_unfounded() {
        let mut program = Program::new();
        program.push(Rule::new(atom("a"), vec![pos("b")]));
        program.push(Rule::new(atom("b"), vec![pos("a")]));
        assert_eq!(solve_all(&program), vec![Vec::<String>::new()]);
    }

    #[test]
    fn test_disjunction_and_constraint() {
        let mut program = Program::new();
        program.push(Rule::disjunction(vec![atom("a"), atom("b")], vec![]));
        assert_eq!(solve_all(&program), vec![vec!["a"], vec!["b"]]);

        program.push(Rule::constraint(vec![pos("a")]));
        assert_eq!(solve_all(&program), vec![vec!["b"]]);
    }

    #[test]
    fn test_classical_negation_clash() {
        let mut program = Program::new();
        program.push(Rule::fact(atom("a")));
        program.push(Rule::fact(Atom::strong_negation("a", vec![])));
        assert!(solve_all(&program).is_empty());
    }

    fn choice_program(n: usize) -> Program {
        let mut program = Program::new();
        for i in 0..n {
            let p = Atom::new("p", vec![i.to_string()]);
            program.push(Rule::disjunction(vec![p.clone(), p.complement()], vec![]));
        }
        program
    }

    fn count_of_p(n: usize, op: CmpOp, bound: usize) -> Aggregate {
        Aggregate {
            elements: (0..n)
                .map(|i| AggregateElement {
                    terms: vec![i.to_string()],
                    condition: vec![Literal::Pos(Atom::new("p", vec![i.to_string()]))],
                })
                .collect(),
            op,
            bound,
        }
    }

    #[test]
    fn test_count_constraint() {
        let mut program = choice_program(3);
        program.push(Rule::constraint(vec![Literal::Count(count_of_p(3, CmpOp::Lt, 2))]));
        // at least two of three: 3 pairs plus the full set
        assert_eq!(solve_all(&program).len(), 4);
    }

    #[test]
    fn test_count_support_must_be_founded() {
        let mut program = Program::new();
        program.push(Rule::new(
            atom("q"),
            vec![Literal::Count(Aggregate {
                elements: vec![AggregateElement {
                    terms: vec!["1".into()],
                    condition: vec![pos("p")],
                }],
                op: CmpOp::Ge,
                bound: 1,
            })],
        ));
        program.push(Rule::new(atom("p"), vec![pos("q")]));
        assert_eq!(solve_all(&program), vec![Vec::<String>::new()]);
    }

    #[test]
    fn test_duplicate_terms_count_once() {
        let mut program = choice_program(2);
        let aggregate = Aggregate {
            elements: vec![
                AggregateElement {
                    terms: vec!["t".into()],
                    condition: vec![Literal::Pos(Atom::new("p", vec!["0".into()]))],
                },
                AggregateElement {
                    terms: vec!["t".into()],
                    condition: vec![Literal::Pos(Atom::new("p", vec!["1".into()]))],
                },
            ],
            op: CmpOp::Ge,
            bound: 2,
        };
        program.push(Rule::new(atom("two"), vec![Literal::Count(aggregate)]));
        assert!(solve_all(&program).iter().all(|m| !m.contains(&"two".to_string())));
    }

    #[test]
    fn test_max_models_and_budget() {
        let program = choice_program(4);
        let options = SolveOptions {
            max_models: 3,
            ..SolveOptions::default()
        };
        assert_eq!(BuiltinSolver.solve(&program, &options).unwrap().len(), 3);

        let expired = SolveOptions {
            timeout: Some(Duration::ZERO),
            ..SolveOptions::default()
        };
        assert!(matches!(
            BuiltinSolver.solve(&program, &expired),
            Err(SolverError::Timeout(_))
        ));

        let cancel = CancelToken::new();
        cancel.cancel();
        let cancelled = SolveOptions {
            cancel,
            ..SolveOptions::default()
        };
        assert!(matches!(
            BuiltinSolver.solve(&program, &cancelled),
            Err(SolverError::Cancelled)
        ));
    }

    proptest! {
        #[test]
        fn prop_independent_choices_enumerate_fully(n in 0usize..6, limit in 0usize..40) {
            let program = choice_program(n);
            let options = SolveOptions { max_models: limit, ..SolveOptions::default() };
            let models = BuiltinSolver.solve(&program, &options).unwrap();
            let total = 1usize << n;
            let expected = if limit == 0 { total } else { limit.min(total) };
            prop_assert_eq!(models.len(), expected);

            let distinct: std::collections::BTreeSet<_> =
                models.iter().map(|m| m.atoms.clone()).collect();
            prop_assert_eq!(distinct.len(), models.len());
        }
    }
}
