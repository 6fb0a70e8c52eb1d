//! OWL 2 データモデル

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const OWL_THING: &str = "http://www.w3.org/2002/07/owl#Thing";
pub const OWL_NOTHING: &str = "http://www.w3.org/2002/07/owl#Nothing";

/// OWL IRI wrapper for type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OwlIri(pub String);

impl OwlIri {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fragment, last path segment, or local part of the IRI
    pub fn local_name(&self) -> &str {
        let s = self.0.as_str();
        match s.rfind(['#', '/', ':']) {
            Some(idx) if idx + 1 < s.len() => &s[idx + 1..],
            _ => s,
        }
    }
}

impl std::fmt::Display for OwlIri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// OWL named individual
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Individual(pub OwlIri);

impl Individual {
    pub fn new(iri: impl Into<String>) -> Self {
        Self(OwlIri::new(iri))
    }

    pub fn iri(&self) -> &OwlIri {
        &self.0
    }
}

/// Signature entity: the vocabulary an ontology is written in
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Entity {
    Class(OwlIri),
    ObjectProperty(OwlIri),
    Individual(OwlIri),
}

impl Entity {
    pub fn iri(&self) -> &OwlIri {
        match self {
            Entity::Class(iri) | Entity::ObjectProperty(iri) | Entity::Individual(iri) => iri,
        }
    }

    /// Functional-syntax keyword of the entity kind
    pub fn kind(&self) -> &'static str {
        match self {
            Entity::Class(_) => "Class",
            Entity::ObjectProperty(_) => "ObjectProperty",
            Entity::Individual(_) => "NamedIndividual",
        }
    }
}

/// Object property expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum PropertyExpression {
    /// Named object property
    Named(OwlIri),

    /// Inverse property: R⁻
    InverseOf(OwlIri),
}

impl PropertyExpression {
    pub fn named(iri: impl Into<String>) -> Self {
        PropertyExpression::Named(OwlIri::new(iri))
    }

    /// The named property underneath, ignoring direction
    pub fn property(&self) -> &OwlIri {
        match self {
            PropertyExpression::Named(iri) | PropertyExpression::InverseOf(iri) => iri,
        }
    }

    pub fn inverse(&self) -> Self {
        match self {
            PropertyExpression::Named(iri) => PropertyExpression::InverseOf(iri.clone()),
            PropertyExpression::InverseOf(iri) => PropertyExpression::Named(iri.clone()),
        }
    }
}

/// Class expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum ClassExpression {
    /// Named class
    Named(OwlIri),

    /// owl:Thing (⊤)
    Thing,

    /// owl:Nothing (⊥)
    Nothing,

    /// Intersection of classes: C1 ⊓ C2 ⊓ ... ⊓ Cn
    IntersectionOf(Vec<ClassExpression>),

    /// Union of classes: C1 ⊔ C2 ⊔ ... ⊔ Cn
    UnionOf(Vec<ClassExpression>),

    /// Complement of class: ¬C
    ComplementOf(Box<ClassExpression>),

    /// Enumeration of individuals: {i1, i2, ..., in}
    OneOf(Vec<Individual>),

    /// Existential restriction: ∃R.C
    SomeValuesFrom {
        property: PropertyExpression,
        class: Box<ClassExpression>,
    },

    /// Universal restriction: ∀R.C
    AllValuesFrom {
        property: PropertyExpression,
        class: Box<ClassExpression>,
    },

    /// Has value: ∃R.{i}
    HasValue {
        property: PropertyExpression,
        individual: Individual,
    },

    /// Local reflexivity: ∃R.Self
    HasSelf(PropertyExpression),

    /// Minimum cardinality: ≥n R.C
    MinCardinality {
        cardinality: u32,
        property: PropertyExpression,
        class: Option<Box<ClassExpression>>, // None means owl:Thing
    },

    /// Maximum cardinality: ≤n R.C
    MaxCardinality {
        cardinality: u32,
        property: PropertyExpression,
        class: Option<Box<ClassExpression>>, // None means owl:Thing
    },

    /// Exact cardinality: =n R.C
    ExactCardinality {
        cardinality: u32,
        property: PropertyExpression,
        class: Option<Box<ClassExpression>>, // None means owl:Thing
    },
}

impl ClassExpression {
    pub fn named(iri: impl Into<String>) -> Self {
        ClassExpression::Named(OwlIri::new(iri))
    }

    pub fn complement(self) -> Self {
        ClassExpression::ComplementOf(Box::new(self))
    }

    /// Named classes, owl:Thing, owl:Nothing and complements of named classes
    pub fn is_literal(&self) -> bool {
        match self {
            ClassExpression::Named(_) | ClassExpression::Thing | ClassExpression::Nothing => true,
            ClassExpression::ComplementOf(inner) => matches!(**inner, ClassExpression::Named(_)),
            _ => false,
        }
    }
}

/// OWL 2 axiom over the supported description-logic fragment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axiom {
    /// Declaration(Class(C)) / Declaration(ObjectProperty(R)) / Declaration(NamedIndividual(a))
    Declaration(Entity),

    SubClassOf(ClassExpression, ClassExpression),

    EquivalentClasses(Vec<ClassExpression>),

    DisjointClasses(Vec<ClassExpression>),

    /// DisjointUnion(C C1 ... Cn)
    DisjointUnion(OwlIri, Vec<ClassExpression>),

    SubObjectPropertyOf(PropertyExpression, PropertyExpression),

    EquivalentObjectProperties(Vec<PropertyExpression>),

    DisjointObjectProperties(Vec<PropertyExpression>),

    InverseObjectProperties(PropertyExpression, PropertyExpression),

    ObjectPropertyDomain(PropertyExpression, ClassExpression),

    ObjectPropertyRange(PropertyExpression, ClassExpression),

    FunctionalObjectProperty(PropertyExpression),

    InverseFunctionalObjectProperty(PropertyExpression),

    ReflexiveObjectProperty(PropertyExpression),

    IrreflexiveObjectProperty(PropertyExpression),

    SymmetricObjectProperty(PropertyExpression),

    AsymmetricObjectProperty(PropertyExpression),

    TransitiveObjectProperty(PropertyExpression),

    SameIndividual(Vec<Individual>),

    DifferentIndividuals(Vec<Individual>),

    ClassAssertion(ClassExpression, Individual),

    ObjectPropertyAssertion(PropertyExpression, Individual, Individual),

    NegativeObjectPropertyAssertion(PropertyExpression, Individual, Individual),

    /// A logical axiom outside the supported fragment, kept verbatim
    Unsupported { kind: String, source: String },
}

impl Axiom {
    /// Functional-syntax keyword of the axiom
    pub fn kind(&self) -> &str {
        match self {
            Axiom::Declaration(_) => "Declaration",
            Axiom::SubClassOf(..) => "SubClassOf",
            Axiom::EquivalentClasses(_) => "EquivalentClasses",
            Axiom::DisjointClasses(_) => "DisjointClasses",
            Axiom::DisjointUnion(..) => "DisjointUnion",
            Axiom::SubObjectPropertyOf(..) => "SubObjectPropertyOf",
            Axiom::EquivalentObjectProperties(_) => "EquivalentObjectProperties",
            Axiom::DisjointObjectProperties(_) => "DisjointObjectProperties",
            Axiom::InverseObjectProperties(..) => "InverseObjectProperties",
            Axiom::ObjectPropertyDomain(..) => "ObjectPropertyDomain",
            Axiom::ObjectPropertyRange(..) => "ObjectPropertyRange",
            Axiom::FunctionalObjectProperty(_) => "FunctionalObjectProperty",
            Axiom::InverseFunctionalObjectProperty(_) => "InverseFunctionalObjectProperty",
            Axiom::ReflexiveObjectProperty(_) => "ReflexiveObjectProperty",
            Axiom::IrreflexiveObjectProperty(_) => "IrreflexiveObjectProperty",
            Axiom::SymmetricObjectProperty(_) => "SymmetricObjectProperty",
            Axiom::AsymmetricObjectProperty(_) => "AsymmetricObjectProperty",
            Axiom::TransitiveObjectProperty(_) => "TransitiveObjectProperty",
            Axiom::SameIndividual(_) => "SameIndividual",
            Axiom::DifferentIndividuals(_) => "DifferentIndividuals",
            Axiom::ClassAssertion(..) => "ClassAssertion",
            Axiom::ObjectPropertyAssertion(..) => "ObjectPropertyAssertion",
            Axiom::NegativeObjectPropertyAssertion(..) => "NegativeObjectPropertyAssertion",
            Axiom::Unsupported { kind, .. } => kind,
        }
    }

    /// ABox axioms: statements about named individuals
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            Axiom::ClassAssertion(..)
                | Axiom::ObjectPropertyAssertion(..)
                | Axiom::NegativeObjectPropertyAssertion(..)
                | Axiom::SameIndividual(_)
                | Axiom::DifferentIndividuals(_)
        )
    }
}

/// OWL ontology: ordered axioms plus the signature they mention
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ontology {
    /// Ontology IRI
    pub iri: Option<OwlIri>,

    /// Directly imported ontologies
    pub imports: Vec<OwlIri>,

    /// Prefix declarations of the source document
    pub prefixes: BTreeMap<String, String>,

    /// All axioms in document order
    pub axioms: Vec<Axiom>,

    /// Named classes mentioned (owl:Thing / owl:Nothing excluded)
    pub classes: BTreeSet<OwlIri>,

    /// Object properties mentioned
    pub object_properties: BTreeSet<OwlIri>,

    /// Named individuals mentioned
    pub individuals: BTreeSet<Individual>,
}

impl Ontology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_iri(iri: OwlIri) -> Self {
        Self {
            iri: Some(iri),
            ..Self::default()
        }
    }

    /// Build an ontology from a list of axioms
    pub fn from_axioms(axioms: impl IntoIterator<Item = Axiom>) -> Self {
        let mut ontology = Self::new();
        for axiom in axioms {
            ontology.add_axiom(axiom);
        }
        ontology
    }

    pub fn add_axiom(&mut self, axiom: Axiom) {
        // Extract entities from axioms
        match &axiom {
            Axiom::Declaration(entity) => self.add_entity(entity),
            Axiom::SubClassOf(sub, sup) => {
                self.collect_class_expression(sub);
                self.collect_class_expression(sup);
            }
            Axiom::EquivalentClasses(expressions) | Axiom::DisjointClasses(expressions) => {
                for expr in expressions {
                    self.collect_class_expression(expr);
                }
            }
            Axiom::DisjointUnion(class, expressions) => {
                self.classes.insert(class.clone());
                for expr in expressions {
                    self.collect_class_expression(expr);
                }
            }
            Axiom::SubObjectPropertyOf(p1, p2) | Axiom::InverseObjectProperties(p1, p2) => {
                self.collect_property_expression(p1);
                self.collect_property_expression(p2);
            }
            Axiom::EquivalentObjectProperties(properties)
            | Axiom::DisjointObjectProperties(properties) => {
                for prop in properties {
                    self.collect_property_expression(prop);
                }
            }
            Axiom::ObjectPropertyDomain(p, c) | Axiom::ObjectPropertyRange(p, c) => {
                self.collect_property_expression(p);
                self.collect_class_expression(c);
            }
            Axiom::FunctionalObjectProperty(p)
            | Axiom::InverseFunctionalObjectProperty(p)
            | Axiom::ReflexiveObjectProperty(p)
            | Axiom::IrreflexiveObjectProperty(p)
            | Axiom::SymmetricObjectProperty(p)
            | Axiom::AsymmetricObjectProperty(p)
            | Axiom::TransitiveObjectProperty(p) => {
                self.collect_property_expression(p);
            }
            Axiom::SameIndividual(individuals) | Axiom::DifferentIndividuals(individuals) => {
                self.individuals.extend(individuals.iter().cloned());
            }
            Axiom::ClassAssertion(c, i) => {
                self.collect_class_expression(c);
                self.individuals.insert(i.clone());
            }
            Axiom::ObjectPropertyAssertion(p, i1, i2)
            | Axiom::NegativeObjectPropertyAssertion(p, i1, i2) => {
                self.collect_property_expression(p);
                self.individuals.insert(i1.clone());
                self.individuals.insert(i2.clone());
            }
            Axiom::Unsupported { .. } => {}
        }

        self.axioms.push(axiom);
    }

    /// Merge the axioms of an imported ontology
    pub fn merge(&mut self, other: Ontology) {
        for axiom in other.axioms {
            if !self.axioms.contains(&axiom) {
                self.add_axiom(axiom);
            }
        }
    }

    fn add_entity(&mut self, entity: &Entity) {
        match entity {
            Entity::Class(iri) => {
                if iri.as_str() != OWL_THING && iri.as_str() != OWL_NOTHING {
                    self.classes.insert(iri.clone());
                }
            }
            Entity::ObjectProperty(iri) => {
                self.object_properties.insert(iri.clone());
            }
            Entity::Individual(iri) => {
                self.individuals.insert(Individual(iri.clone()));
            }
        }
    }

    fn collect_class_expression(&mut self, expr: &ClassExpression) {
        match expr {
            ClassExpression::Named(iri) => {
                self.classes.insert(iri.clone());
            }
            ClassExpression::Thing | ClassExpression::Nothing => {}
            ClassExpression::IntersectionOf(expressions) | ClassExpression::UnionOf(expressions) => {
                for expr in expressions {
                    self.collect_class_expression(expr);
                }
            }
            ClassExpression::ComplementOf(expr) => self.collect_class_expression(expr),
            ClassExpression::OneOf(individuals) => {
                self.individuals.extend(individuals.iter().cloned());
            }
            ClassExpression::SomeValuesFrom { property, class }
            | ClassExpression::AllValuesFrom { property, class } => {
                self.collect_property_expression(property);
                self.collect_class_expression(class);
            }
            ClassExpression::HasValue { property, individual } => {
                self.collect_property_expression(property);
                self.individuals.insert(individual.clone());
            }
            ClassExpression::HasSelf(property) => self.collect_property_expression(property),
            ClassExpression::MinCardinality { property, class, .. }
            | ClassExpression::MaxCardinality { property, class, .. }
            | ClassExpression::ExactCardinality { property, class, .. } => {
                self.collect_property_expression(property);
                if let Some(class) = class {
                    self.collect_class_expression(class);
                }
            }
        }
    }

    fn collect_property_expression(&mut self, expr: &PropertyExpression) {
        self.object_properties.insert(expr.property().clone());
    }

    /// All named individuals in the signature
    pub fn individuals_in_signature(&self) -> &BTreeSet<Individual> {
        &self.individuals
    }

    /// Named individuals occurring in assertional axioms, plus those named by
    /// nominals (ObjectOneOf / ObjectHasValue) anywhere in the ontology
    pub fn individuals_in_assertions(&self) -> BTreeSet<Individual> {
        let mut found = BTreeSet::new();
        for axiom in &self.axioms {
            match axiom {
                Axiom::ClassAssertion(c, i) => {
                    found.insert(i.clone());
                    collect_nominals(c, &mut found);
                }
                Axiom::ObjectPropertyAssertion(_, i1, i2)
                | Axiom::NegativeObjectPropertyAssertion(_, i1, i2) => {
                    found.insert(i1.clone());
                    found.insert(i2.clone());
                }
                Axiom::SameIndividual(individuals) | Axiom::DifferentIndividuals(individuals) => {
                    found.extend(individuals.iter().cloned());
                }
                Axiom::SubClassOf(c1, c2) => {
                    collect_nominals(c1, &mut found);
                    collect_nominals(c2, &mut found);
                }
                Axiom::ObjectPropertyDomain(_, c) | Axiom::ObjectPropertyRange(_, c) => {
                    collect_nominals(c, &mut found)
                }
                Axiom::EquivalentClasses(expressions)
                | Axiom::DisjointClasses(expressions)
                | Axiom::DisjointUnion(_, expressions) => {
                    for expr in expressions {
                        collect_nominals(expr, &mut found);
                    }
                }
                _ => {}
            }
        }
        found
    }

    /// Every entity of the signature: individuals, classes, then object properties
    pub fn signature(&self) -> Vec<Entity> {
        self.individuals
            .iter()
            .map(|i| Entity::Individual(i.0.clone()))
            .chain(self.classes.iter().cloned().map(Entity::Class))
            .chain(self.object_properties.iter().cloned().map(Entity::ObjectProperty))
            .collect()
    }
}

fn collect_nominals(expr: &ClassExpression, found: &mut BTreeSet<Individual>) {
    match expr {
        ClassExpression::OneOf(individuals) => found.extend(individuals.iter().cloned()),
        ClassExpression::HasValue { individual, .. } => {
            found.insert(individual.clone());
        }
        ClassExpression::IntersectionOf(expressions) | ClassExpression::UnionOf(expressions) => {
            for expr in expressions {
                collect_nominals(expr, found);
            }
        }
        ClassExpression::ComplementOf(inner) => collect_nominals(inner, found),
        ClassExpression::SomeValuesFrom { class, .. } | ClassExpression::AllValuesFrom { class, .. } => {
            collect_nominals(class, found)
        }
        ClassExpression::MinCardinality { class: Some(class), .. }
        | ClassExpression::MaxCardinality { class: Some(class), .. }
        | ClassExpression::ExactCardinality { class: Some(class), .. } => collect_nominals(class, found),
        _ => {}
    }
}
