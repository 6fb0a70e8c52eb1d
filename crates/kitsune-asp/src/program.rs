//! 基底 (ground) 論理プログラム表現

use crate::SolverError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Ground atom, optionally under classical negation: `-p(a,b)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Atom {
    pub negated: bool,
    pub predicate: String,
    pub args: Vec<String>,
}

impl Atom {
    pub fn new(predicate: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            negated: false,
            predicate: predicate.into(),
            args,
        }
    }

    /// `-p(args)`
    pub fn strong_negation(predicate: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            negated: true,
            predicate: predicate.into(),
            args,
        }
    }

    /// The classically complementary atom
    pub fn complement(&self) -> Self {
        Self {
            negated: !self.negated,
            ..self.clone()
        }
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "-")?;
        }
        write!(f, "{}", self.predicate)?;
        if !self.args.is_empty() {
            write!(f, "({})", self.args.join(","))?;
        }
        Ok(())
    }
}

impl FromStr for Atom {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negated, rest) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (predicate, args) = match rest.find('(') {
            None => (rest, Vec::new()),
            Some(open) => {
                let inner = rest[open + 1..]
                    .strip_suffix(')')
                    .ok_or_else(|| SolverError::Output(format!("unbalanced atom '{}'", s)))?;
                (&rest[..open], split_terms(inner))
            }
        };

        if predicate.is_empty() {
            return Err(SolverError::Output(format!("missing predicate in '{}'", s)));
        }

        Ok(Self {
            negated,
            predicate: predicate.to_string(),
            args,
        })
    }
}

/// Split a term list at top-level commas, keeping quoted strings intact
fn split_terms(inner: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for c in inner.chars() {
        if in_string {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                current.push(c);
            }
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => terms.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    if !current.is_empty() || !terms.is_empty() {
        terms.push(current);
    }
    terms
}

/// Aggregate comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpOp {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

impl CmpOp {
    pub fn holds(self, value: usize, bound: usize) -> bool {
        match self {
            CmpOp::Lt => value < bound,
            CmpOp::Le => value <= bound,
            CmpOp::Eq => value == bound,
            CmpOp::Ge => value >= bound,
            CmpOp::Gt => value > bound,
        }
    }

    /// Satisfaction can only be gained, never lost, as the counted set grows
    pub fn is_monotone(self) -> bool {
        matches!(self, CmpOp::Ge | CmpOp::Gt)
    }
}

impl Display for CmpOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let op = match self {
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Eq => "=",
            CmpOp::Ge => ">=",
            CmpOp::Gt => ">",
        };
        write!(f, "{}", op)
    }
}

/// One element `t1,...,tn : l1, ..., lm` of a count aggregate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AggregateElement {
    pub terms: Vec<String>,
    pub condition: Vec<Literal>,
}

/// `#count { elements } op bound`; elements with equal terms are counted once
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Aggregate {
    pub elements: Vec<AggregateElement>,
    pub op: CmpOp,
    pub bound: usize,
}

impl Display for Aggregate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.elements.is_empty() {
            // an empty count is the constant 0
            return write!(f, "0 {} {}", self.op, self.bound);
        }
        write!(f, "#count{{ ")?;
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", element.terms.join(","))?;
            if !element.condition.is_empty() {
                write!(f, " : ")?;
                write_literals(f, &element.condition)?;
            }
        }
        write!(f, " }} {} {}", self.op, self.bound)
    }
}

/// Body literal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Literal {
    Pos(Atom),
    /// Default negation: `not a`
    Not(Atom),
    Count(Aggregate),
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Pos(atom) => write!(f, "{}", atom),
            Literal::Not(atom) => write!(f, "not {}", atom),
            Literal::Count(aggregate) => write!(f, "{}", aggregate),
        }
    }
}

fn write_literals(f: &mut Formatter<'_>, literals: &[Literal]) -> fmt::Result {
    for (i, literal) in literals.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", literal)?;
    }
    Ok(())
}

/// `h1 | ... | hn :- body.`; an empty head is an integrity constraint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    pub head: Vec<Atom>,
    pub body: Vec<Literal>,
}

impl Rule {
    pub fn fact(atom: Atom) -> Self {
        Self {
            head: vec![atom],
            body: Vec::new(),
        }
    }

    pub fn new(head: Atom, body: Vec<Literal>) -> Self {
        Self {
            head: vec![head],
            body,
        }
    }

    pub fn disjunction(head: Vec<Atom>, body: Vec<Literal>) -> Self {
        Self { head, body }
    }

    pub fn constraint(body: Vec<Literal>) -> Self {
        Self {
            head: Vec::new(),
            body,
        }
    }

    pub fn is_constraint(&self) -> bool {
        self.head.is_empty()
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, atom) in self.head.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", atom)?;
        }
        match (self.head.is_empty(), self.body.is_empty()) {
            (false, true) => write!(f, "."),
            (true, true) => write!(f, ":- #true."),
            (false, false) => {
                write!(f, " :- ")?;
                write_literals(f, &self.body)?;
                write!(f, ".")
            }
            (true, false) => {
                write!(f, ":- ")?;
                write_literals(f, &self.body)?;
                write!(f, ".")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statement {
    Comment(String),
    Rule(Rule),
}

/// An ordered list of rules, rendered in clingo syntax
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    statements: Vec<Statement>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rule: Rule) {
        self.statements.push(Statement::Rule(rule));
    }

    pub fn comment(&mut self, text: impl Into<String>) {
        self.statements.push(Statement::Comment(text.into()));
    }

    pub fn extend(&mut self, other: Program) {
        self.statements.extend(other.statements);
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Rule(rule) => Some(rule),
            Statement::Comment(_) => None,
        })
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Number of rules, comments excluded
    pub fn len(&self) -> usize {
        self.rules().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            match statement {
                Statement::Comment(text) => writeln!(f, "% {}", text)?,
                Statement::Rule(rule) => writeln!(f, "{}", rule)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(p: &str, args: &[&str]) -> Atom {
        Atom::new(p, args.iter().map(|a| a.to_string()).collect())
    }

    #[test]
    fn test_rule_rendering() {
        let fact = Rule::fact(atom("person", &["alice"]));
        assert_eq!(fact.to_string(), "person(alice).");

        let choice = Rule::disjunction(
            vec![atom("a", &["x"]), Atom::strong_negation("a", vec!["x".into()])],
            vec![],
        );
        assert_eq!(choice.to_string(), "a(x) | -a(x).");

        let rule = Rule::new(
            atom("b", &["x"]),
            vec![Literal::Pos(atom("a", &["x"])), Literal::Not(atom("c", &["x"]))],
        );
        assert_eq!(rule.to_string(), "b(x) :- a(x), not c(x).");

        assert_eq!(Rule::constraint(vec![]).to_string(), ":- #true.");
    }

    #[test]
    fn test_aggregate_rendering() {
        let aggregate = Aggregate {
            elements: vec![
                AggregateElement {
                    terms: vec!["y1".into()],
                    condition: vec![Literal::Pos(atom("r", &["x", "y1"]))],
                },
                AggregateElement {
                    terms: vec!["y2".into()],
                    condition: vec![Literal::Pos(atom("r", &["x", "y2"]))],
                },
            ],
            op: CmpOp::Ge,
            bound: 2,
        };
        let rule = Rule::constraint(vec![
            Literal::Pos(atom("a", &["x"])),
            Literal::Count(Aggregate {
                op: CmpOp::Lt,
                ..aggregate.clone()
            }),
        ]);
        assert_eq!(
            rule.to_string(),
            ":- a(x), #count{ y1 : r(x,y1); y2 : r(x,y2) } < 2."
        );

        let empty = Aggregate {
            elements: vec![],
            op: CmpOp::Ge,
            bound: 1,
        };
        assert_eq!(empty.to_string(), "0 >= 1");
    }

    #[test]
    fn test_atom_from_str() {
        let parsed: Atom = "-c_A(\"http://e.org/a,b\",x)".parse().unwrap();
        assert!(parsed.negated);
        assert_eq!(parsed.predicate, "c_A");
        assert_eq!(parsed.args, vec!["\"http://e.org/a,b\"".to_string(), "x".to_string()]);

        let nullary: Atom = "flag".parse().unwrap();
        assert!(nullary.args.is_empty());

        assert!("p(a".parse::<Atom>().is_err());
        assert!("(a)".parse::<Atom>().is_err());
    }

    #[test]
    fn test_program_comments_not_counted() {
        let mut program = Program::new();
        program.comment("facts");
        program.push(Rule::fact(atom("a", &[])));
        assert_eq!(program.len(), 1);
        assert_eq!(program.to_string(), "% facts\na.\n");
    }
}
