//! OWL 2 関数型構文ライター

use crate::model::{Axiom, ClassExpression, Entity, Individual, Ontology, OwlIri, PropertyExpression};
use std::fmt::{self, Display, Formatter};
use std::io::Write;

struct FullIri<'a>(&'a OwlIri);

impl Display for FullIri<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.as_str().starts_with("_:") {
            write!(f, "{}", self.0)
        } else {
            write!(f, "<{}>", self.0)
        }
    }
}

fn join<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl Display for Individual {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", FullIri(&self.0))
    }
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), FullIri(self.iri()))
    }
}

impl Display for PropertyExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PropertyExpression::Named(iri) => write!(f, "{}", FullIri(iri)),
            PropertyExpression::InverseOf(iri) => write!(f, "ObjectInverseOf({})", FullIri(iri)),
        }
    }
}

impl Display for ClassExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ClassExpression::Named(iri) => write!(f, "{}", FullIri(iri)),
            ClassExpression::Thing => write!(f, "owl:Thing"),
            ClassExpression::Nothing => write!(f, "owl:Nothing"),
            ClassExpression::IntersectionOf(exprs) => {
                write!(f, "ObjectIntersectionOf(")?;
                join(f, exprs)?;
                write!(f, ")")
            }
            ClassExpression::UnionOf(exprs) => {
                write!(f, "ObjectUnionOf(")?;
                join(f, exprs)?;
                write!(f, ")")
            }
            ClassExpression::ComplementOf(expr) => write!(f, "ObjectComplementOf({})", expr),
            ClassExpression::OneOf(individuals) => {
                write!(f, "ObjectOneOf(")?;
                join(f, individuals)?;
                write!(f, ")")
            }
            ClassExpression::SomeValuesFrom { property, class } => {
                write!(f, "ObjectSomeValuesFrom({} {})", property, class)
            }
            ClassExpression::AllValuesFrom { property, class } => {
                write!(f, "ObjectAllValuesFrom({} {})", property, class)
            }
            ClassExpression::HasValue { property, individual } => {
                write!(f, "ObjectHasValue({} {})", property, individual)
            }
            ClassExpression::HasSelf(property) => write!(f, "ObjectHasSelf({})", property),
            ClassExpression::MinCardinality { cardinality, property, class } => {
                write_cardinality(f, "ObjectMinCardinality", *cardinality, property, class.as_deref())
            }
            ClassExpression::MaxCardinality { cardinality, property, class } => {
                write_cardinality(f, "ObjectMaxCardinality", *cardinality, property, class.as_deref())
            }
            ClassExpression::ExactCardinality { cardinality, property, class } => {
                write_cardinality(f, "ObjectExactCardinality", *cardinality, property, class.as_deref())
            }
        }
    }
}

fn write_cardinality(
    f: &mut Formatter<'_>,
    keyword: &str,
    cardinality: u32,
    property: &PropertyExpression,
    class: Option<&ClassExpression>,
) -> fmt::Result {
    match class {
        Some(class) => write!(f, "{}({} {} {})", keyword, cardinality, property, class),
        None => write!(f, "{}({} {})", keyword, cardinality, property),
    }
}

impl Display for Axiom {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Axiom::Declaration(entity) => write!(f, "Declaration({})", entity),
            Axiom::SubClassOf(sub, sup) => write!(f, "SubClassOf({} {})", sub, sup),
            Axiom::EquivalentClasses(exprs) | Axiom::DisjointClasses(exprs) => {
                write!(f, "{}(", self.kind())?;
                join(f, exprs)?;
                write!(f, ")")
            }
            Axiom::DisjointUnion(class, exprs) => {
                write!(f, "DisjointUnion({} ", FullIri(class))?;
                join(f, exprs)?;
                write!(f, ")")
            }
            Axiom::SubObjectPropertyOf(p1, p2) | Axiom::InverseObjectProperties(p1, p2) => {
                write!(f, "{}({} {})", self.kind(), p1, p2)
            }
            Axiom::EquivalentObjectProperties(props) | Axiom::DisjointObjectProperties(props) => {
                write!(f, "{}(", self.kind())?;
                join(f, props)?;
                write!(f, ")")
            }
            Axiom::ObjectPropertyDomain(p, c) | Axiom::ObjectPropertyRange(p, c) => {
                write!(f, "{}({} {})", self.kind(), p, c)
            }
            Axiom::FunctionalObjectProperty(p)
            | Axiom::InverseFunctionalObjectProperty(p)
            | Axiom::ReflexiveObjectProperty(p)
            | Axiom::IrreflexiveObjectProperty(p)
            | Axiom::SymmetricObjectProperty(p)
            | Axiom::AsymmetricObjectProperty(p)
            | Axiom::TransitiveObjectProperty(p) => write!(f, "{}({})", self.kind(), p),
            Axiom::SameIndividual(individuals) | Axiom::DifferentIndividuals(individuals) => {
                write!(f, "{}(", self.kind())?;
                join(f, individuals)?;
                write!(f, ")")
            }
            Axiom::ClassAssertion(c, i) => write!(f, "ClassAssertion({} {})", c, i),
            Axiom::ObjectPropertyAssertion(p, a, b)
            | Axiom::NegativeObjectPropertyAssertion(p, a, b) => {
                write!(f, "{}({} {} {})", self.kind(), p, a, b)
            }
            Axiom::Unsupported { source, .. } => write!(f, "{}", source),
        }
    }
}

impl Display for Ontology {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (prefix, namespace) in &self.prefixes {
            writeln!(f, "Prefix({}:=<{}>)", prefix, namespace)?;
        }
        if !self.prefixes.contains_key("owl") {
            writeln!(f, "Prefix(owl:=<http://www.w3.org/2002/07/owl#>)")?;
        }
        match &self.iri {
            Some(iri) => writeln!(f, "Ontology({}", FullIri(iri))?,
            None => writeln!(f, "Ontology(")?,
        }
        for import in &self.imports {
            writeln!(f, "    Import({})", FullIri(import))?;
        }
        for axiom in &self.axioms {
            writeln!(f, "    {}", axiom)?;
        }
        writeln!(f, ")")
    }
}

/// Write an ontology document in functional syntax
pub fn write_ontology<W: Write>(ontology: &Ontology, out: &mut W) -> std::io::Result<()> {
    write!(out, "{}", ontology)?;
    out.flush()
}
