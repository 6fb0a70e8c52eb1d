//! OWL 2 関数型構文パーサー

use crate::model::{
    Axiom, ClassExpression, Entity, Individual, Ontology, OwlIri, PropertyExpression, OWL_NOTHING,
    OWL_THING,
};
use crate::OwlError;
use logos::Logos;
use std::collections::{BTreeMap, HashMap};
use std::ops::Range;
use tracing::debug;

/// 関数型構文トークン
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"([ \t\r\n\f]+|#[^\n]*)")] // whitespace and comments
pub enum Token<'a> {
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("=")]
    Equals,

    #[token("^^")]
    DoubleCaret,

    #[regex(r"<[^<>\s]*>")]
    FullIri(&'a str),

    #[regex(r"[A-Za-z_][A-Za-z0-9_.\-]*:[A-Za-z0-9_.\-]*")]
    #[regex(r":[A-Za-z0-9_.\-]*")]
    PrefixedName(&'a str),

    #[regex(r"[A-Za-z][A-Za-z0-9_]*")]
    Keyword(&'a str),

    #[regex(r"[0-9]+")]
    Integer(&'a str),

    #[regex(r#""([^"\\]|\\.)*""#)]
    StringLiteral(&'a str),

    #[regex(r"@[A-Za-z][A-Za-z0-9\-]*")]
    LangTag(&'a str),
}

/// Parse an ontology document in OWL 2 functional syntax
pub fn parse_ontology(input: &str) -> Result<Ontology, OwlError> {
    let mut parser = Parser::new(input)?;
    match parser.document() {
        Ok(ontology) => Ok(ontology),
        Err(Failure::Syntax(e)) => Err(e),
        Err(Failure::Unsupported(construct)) => Err(parser.error_at_end(format!(
            "unsupported construct '{}' outside of an axiom",
            construct
        ))),
    }
}

enum Failure {
    Syntax(OwlError),
    /// A construct outside the supported fragment; the enclosing axiom is kept verbatim
    Unsupported(String),
}

impl From<OwlError> for Failure {
    fn from(e: OwlError) -> Self {
        Failure::Syntax(e)
    }
}

type PResult<T> = Result<T, Failure>;

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<(Token<'a>, Range<usize>)>,
    pos: usize,
    prefixes: HashMap<String, String>,
    declared: BTreeMap<String, String>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Result<Self, OwlError> {
        let mut tokens = Vec::new();
        for (token, span) in Token::lexer(source).spanned() {
            match token {
                Ok(token) => tokens.push((token, span)),
                Err(()) => {
                    return Err(OwlError::Parse {
                        line: line_of(source, span.start),
                        message: format!("unexpected character sequence '{}'", &source[span]),
                    })
                }
            }
        }

        let prefixes = [
            ("owl", "http://www.w3.org/2002/07/owl#"),
            ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
            ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
            ("xsd", "http://www.w3.org/2001/XMLSchema#"),
        ]
        .into_iter()
        .map(|(p, ns)| (p.to_string(), ns.to_string()))
        .collect();

        Ok(Self {
            source,
            tokens,
            pos: 0,
            prefixes,
            declared: BTreeMap::new(),
        })
    }

    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).map(|(t, _)| *t)
    }

    fn advance(&mut self) -> PResult<Token<'a>> {
        match self.tokens.get(self.pos) {
            Some((token, _)) => {
                self.pos += 1;
                Ok(*token)
            }
            None => Err(Failure::Syntax(self.error_at_end("unexpected end of input"))),
        }
    }

    fn error(&self, message: impl Into<String>) -> Failure {
        match self.tokens.get(self.pos) {
            Some((_, span)) => Failure::Syntax(OwlError::Parse {
                line: line_of(self.source, span.start),
                message: message.into(),
            }),
            None => Failure::Syntax(self.error_at_end(message)),
        }
    }

    fn error_at_end(&self, message: impl Into<String>) -> OwlError {
        OwlError::Parse {
            line: line_of(self.source, self.source.len()),
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: Token<'static>) -> PResult<()> {
        match self.peek() {
            Some(token) if token == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(token) => Err(self.error(format!("expected {:?}, found {:?}", expected, token))),
            None => Err(Failure::Syntax(
                self.error_at_end(format!("expected {:?}, found end of input", expected)),
            )),
        }
    }

    /// Skip to the parenthesis closing the group we are inside of
    fn skip_rest(&mut self) -> PResult<()> {
        let mut depth = 1usize;
        while depth > 0 {
            match self.advance()? {
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }

    fn skip_group(&mut self) -> PResult<()> {
        self.expect(Token::LParen)?;
        self.skip_rest()
    }

    fn skip_annotations(&mut self) -> PResult<()> {
        while self.peek() == Some(Token::Keyword("Annotation")) {
            self.pos += 1;
            self.skip_group()?;
        }
        Ok(())
    }

    fn document(&mut self) -> PResult<Ontology> {
        loop {
            match self.peek() {
                Some(Token::Keyword("Prefix")) => {
                    self.pos += 1;
                    self.prefix_declaration()?;
                }
                Some(Token::Keyword("Ontology")) => {
                    self.pos += 1;
                    break;
                }
                Some(_) => return Err(self.error("expected Prefix or Ontology")),
                None => return Err(self.error("empty document")),
            }
        }

        self.expect(Token::LParen)?;
        let mut ontology = Ontology::new();
        ontology.prefixes = self.declared.clone();
        if let Some(iri) = self.try_iri()? {
            ontology.iri = Some(iri);
            // version IRI
            self.try_iri()?;
        }

        loop {
            match self.peek() {
                Some(Token::RParen) => {
                    self.pos += 1;
                    break;
                }
                Some(Token::Keyword("Import")) => {
                    self.pos += 1;
                    self.expect(Token::LParen)?;
                    let iri = self.iri()?;
                    self.expect(Token::RParen)?;
                    ontology.imports.push(iri);
                }
                Some(Token::Keyword("Annotation")) => {
                    self.pos += 1;
                    self.skip_group()?;
                }
                Some(Token::Keyword(kind)) => {
                    if let Some(axiom) = self.axiom(kind)? {
                        ontology.add_axiom(axiom);
                    }
                }
                Some(token) => return Err(self.error(format!("expected axiom, found {:?}", token))),
                None => return Err(self.error("unterminated Ontology")),
            }
        }

        if self.pos < self.tokens.len() {
            return Err(self.error("trailing content after Ontology"));
        }
        Ok(ontology)
    }

    fn prefix_declaration(&mut self) -> PResult<()> {
        self.expect(Token::LParen)?;
        let name = match self.advance()? {
            Token::PrefixedName(name) if name.ends_with(':') => name.trim_end_matches(':'),
            _ => return Err(self.error("expected prefix name")),
        };
        self.expect(Token::Equals)?;
        let namespace = match self.advance()? {
            Token::FullIri(iri) => strip_angles(iri),
            _ => return Err(self.error("expected full IRI")),
        };
        self.expect(Token::RParen)?;
        self.prefixes.insert(name.to_string(), namespace.to_string());
        self.declared.insert(name.to_string(), namespace.to_string());
        Ok(())
    }

    fn try_iri(&mut self) -> PResult<Option<OwlIri>> {
        match self.peek() {
            Some(Token::FullIri(iri)) => {
                self.pos += 1;
                Ok(Some(OwlIri::new(strip_angles(iri))))
            }
            Some(Token::PrefixedName(name)) => {
                let iri = self.expand(name)?;
                self.pos += 1;
                Ok(Some(iri))
            }
            _ => Ok(None),
        }
    }

    fn iri(&mut self) -> PResult<OwlIri> {
        match self.try_iri()? {
            Some(iri) => Ok(iri),
            None => Err(self.error("expected IRI")),
        }
    }

    fn expand(&self, name: &str) -> PResult<OwlIri> {
        let (prefix, local) = name.split_once(':').unwrap_or(("", name));
        // blank-node individuals stay as written
        if prefix == "_" {
            return Ok(OwlIri::new(name));
        }
        match self.prefixes.get(prefix) {
            Some(namespace) => Ok(OwlIri::new(format!("{}{}", namespace, local))),
            None => Err(self.error(format!("unknown prefix '{}:'", prefix))),
        }
    }

    /// Parse one axiom; the keyword is the current token
    fn axiom(&mut self, kind: &'a str) -> Result<Option<Axiom>, OwlError> {
        let start = self.pos;
        self.pos += 1;
        match self.axiom_body(kind) {
            Ok(axiom) => Ok(axiom),
            Err(Failure::Syntax(e)) => Err(e),
            Err(Failure::Unsupported(construct)) => {
                self.pos = start + 1;
                match self.skip_group() {
                    Ok(()) => {}
                    Err(Failure::Syntax(e)) => return Err(e),
                    Err(Failure::Unsupported(c)) => return Err(self.error_at_end(c)),
                }
                let begin = self.tokens[start].1.start;
                let end = self.tokens[self.pos - 1].1.end;
                debug!("Unsupported construct {} in {} axiom", construct, kind);
                Ok(Some(Axiom::Unsupported {
                    kind: kind.to_string(),
                    source: self.source[begin..end].to_string(),
                }))
            }
        }
    }

    fn axiom_body(&mut self, kind: &str) -> PResult<Option<Axiom>> {
        self.expect(Token::LParen)?;
        self.skip_annotations()?;

        let axiom = match kind {
            "Declaration" => return self.declaration(),
            "AnnotationAssertion"
            | "SubAnnotationPropertyOf"
            | "AnnotationPropertyDomain"
            | "AnnotationPropertyRange" => {
                self.skip_rest()?;
                return Ok(None);
            }
            "SubClassOf" => Axiom::SubClassOf(self.class_expression()?, self.class_expression()?),
            "EquivalentClasses" => Axiom::EquivalentClasses(self.class_expressions(2)?),
            "DisjointClasses" => Axiom::DisjointClasses(self.class_expressions(2)?),
            "DisjointUnion" => Axiom::DisjointUnion(self.iri()?, self.class_expressions(2)?),
            "SubObjectPropertyOf" => {
                Axiom::SubObjectPropertyOf(self.property_expression()?, self.property_expression()?)
            }
            "EquivalentObjectProperties" => {
                Axiom::EquivalentObjectProperties(self.property_expressions(2)?)
            }
            "DisjointObjectProperties" => Axiom::DisjointObjectProperties(self.property_expressions(2)?),
            "InverseObjectProperties" => {
                Axiom::InverseObjectProperties(self.property_expression()?, self.property_expression()?)
            }
            "ObjectPropertyDomain" => {
                Axiom::ObjectPropertyDomain(self.property_expression()?, self.class_expression()?)
            }
            "ObjectPropertyRange" => {
                Axiom::ObjectPropertyRange(self.property_expression()?, self.class_expression()?)
            }
            "FunctionalObjectProperty" => Axiom::FunctionalObjectProperty(self.property_expression()?),
            "InverseFunctionalObjectProperty" => {
                Axiom::InverseFunctionalObjectProperty(self.property_expression()?)
            }
            "ReflexiveObjectProperty" => Axiom::ReflexiveObjectProperty(self.property_expression()?),
            "IrreflexiveObjectProperty" => Axiom::IrreflexiveObjectProperty(self.property_expression()?),
            "SymmetricObjectProperty" => Axiom::SymmetricObjectProperty(self.property_expression()?),
            "AsymmetricObjectProperty" => Axiom::AsymmetricObjectProperty(self.property_expression()?),
            "TransitiveObjectProperty" => Axiom::TransitiveObjectProperty(self.property_expression()?),
            "SameIndividual" => Axiom::SameIndividual(self.individuals(2)?),
            "DifferentIndividuals" => Axiom::DifferentIndividuals(self.individuals(2)?),
            "ClassAssertion" => Axiom::ClassAssertion(self.class_expression()?, self.individual()?),
            "ObjectPropertyAssertion" => Axiom::ObjectPropertyAssertion(
                self.property_expression()?,
                self.individual()?,
                self.individual()?,
            ),
            "NegativeObjectPropertyAssertion" => Axiom::NegativeObjectPropertyAssertion(
                self.property_expression()?,
                self.individual()?,
                self.individual()?,
            ),
            other => return Err(Failure::Unsupported(other.to_string())),
        };

        self.expect(Token::RParen)?;
        Ok(Some(axiom))
    }

    fn declaration(&mut self) -> PResult<Option<Axiom>> {
        let kind = match self.advance()? {
            Token::Keyword(kind) => kind,
            _ => return Err(self.error("expected entity kind")),
        };
        self.expect(Token::LParen)?;
        let iri = self.iri()?;
        self.expect(Token::RParen)?;
        self.expect(Token::RParen)?;

        Ok(match kind {
            "Class" => Some(Axiom::Declaration(Entity::Class(iri))),
            "ObjectProperty" => Some(Axiom::Declaration(Entity::ObjectProperty(iri))),
            "NamedIndividual" => Some(Axiom::Declaration(Entity::Individual(iri))),
            // Declarations carry no logical content of their own
            "DataProperty" | "AnnotationProperty" | "Datatype" => {
                debug!("Skipping {} declaration of {}", kind, iri);
                None
            }
            other => return Err(self.error(format!("unknown entity kind '{}'", other))),
        })
    }

    fn class_expression(&mut self) -> PResult<ClassExpression> {
        if let Some(iri) = self.try_iri()? {
            return Ok(match iri.as_str() {
                OWL_THING => ClassExpression::Thing,
                OWL_NOTHING => ClassExpression::Nothing,
                _ => ClassExpression::Named(iri),
            });
        }

        let kind = match self.peek() {
            Some(Token::Keyword(kind)) => kind,
            _ => return Err(self.error("expected class expression")),
        };
        self.pos += 1;
        self.expect(Token::LParen)?;

        let expr = match kind {
            "ObjectIntersectionOf" => ClassExpression::IntersectionOf(self.class_expressions(2)?),
            "ObjectUnionOf" => ClassExpression::UnionOf(self.class_expressions(2)?),
            "ObjectComplementOf" => ClassExpression::ComplementOf(Box::new(self.class_expression()?)),
            "ObjectOneOf" => ClassExpression::OneOf(self.individuals(1)?),
            "ObjectSomeValuesFrom" => {
                let property = self.property_expression()?;
                let class = Box::new(self.class_expression()?);
                ClassExpression::SomeValuesFrom { property, class }
            }
            "ObjectAllValuesFrom" => {
                let property = self.property_expression()?;
                let class = Box::new(self.class_expression()?);
                ClassExpression::AllValuesFrom { property, class }
            }
            "ObjectHasValue" => {
                let property = self.property_expression()?;
                let individual = self.individual()?;
                ClassExpression::HasValue { property, individual }
            }
            "ObjectHasSelf" => ClassExpression::HasSelf(self.property_expression()?),
            "ObjectMinCardinality" => {
                let cardinality = self.cardinality()?;
                let property = self.property_expression()?;
                let class = self.optional_class_expression()?;
                ClassExpression::MinCardinality { cardinality, property, class }
            }
            "ObjectMaxCardinality" => {
                let cardinality = self.cardinality()?;
                let property = self.property_expression()?;
                let class = self.optional_class_expression()?;
                ClassExpression::MaxCardinality { cardinality, property, class }
            }
            "ObjectExactCardinality" => {
                let cardinality = self.cardinality()?;
                let property = self.property_expression()?;
                let class = self.optional_class_expression()?;
                ClassExpression::ExactCardinality { cardinality, property, class }
            }
            other => return Err(Failure::Unsupported(other.to_string())),
        };

        self.expect(Token::RParen)?;
        Ok(expr)
    }

    fn optional_class_expression(&mut self) -> PResult<Option<Box<ClassExpression>>> {
        if self.peek() == Some(Token::RParen) {
            Ok(None)
        } else {
            Ok(Some(Box::new(self.class_expression()?)))
        }
    }

    fn class_expressions(&mut self, min: usize) -> PResult<Vec<ClassExpression>> {
        let mut expressions = Vec::new();
        while self.peek() != Some(Token::RParen) {
            expressions.push(self.class_expression()?);
        }
        if expressions.len() < min {
            return Err(self.error(format!("expected at least {} class expressions", min)));
        }
        Ok(expressions)
    }

    fn property_expression(&mut self) -> PResult<PropertyExpression> {
        if let Some(iri) = self.try_iri()? {
            return Ok(PropertyExpression::Named(iri));
        }
        match self.peek() {
            Some(Token::Keyword("ObjectInverseOf")) => {
                self.pos += 1;
                self.expect(Token::LParen)?;
                let inner = self.property_expression()?;
                self.expect(Token::RParen)?;
                Ok(inner.inverse())
            }
            Some(Token::Keyword(other)) => Err(Failure::Unsupported(other.to_string())),
            _ => Err(self.error("expected object property expression")),
        }
    }

    fn property_expressions(&mut self, min: usize) -> PResult<Vec<PropertyExpression>> {
        let mut properties = Vec::new();
        while self.peek() != Some(Token::RParen) {
            properties.push(self.property_expression()?);
        }
        if properties.len() < min {
            return Err(self.error(format!("expected at least {} property expressions", min)));
        }
        Ok(properties)
    }

    fn individual(&mut self) -> PResult<Individual> {
        match self.try_iri()? {
            Some(iri) => Ok(Individual(iri)),
            None => Err(self.error("expected individual")),
        }
    }

    fn individuals(&mut self, min: usize) -> PResult<Vec<Individual>> {
        let mut individuals = Vec::new();
        while self.peek() != Some(Token::RParen) {
            individuals.push(self.individual()?);
        }
        if individuals.len() < min {
            return Err(self.error(format!("expected at least {} individuals", min)));
        }
        Ok(individuals)
    }

    fn cardinality(&mut self) -> PResult<u32> {
        match self.peek() {
            Some(Token::Integer(n)) => {
                let value = n
                    .parse()
                    .map_err(|_| self.error(format!("cardinality {} out of range", n)))?;
                self.pos += 1;
                Ok(value)
            }
            _ => Err(self.error("expected cardinality")),
        }
    }
}

fn strip_angles(iri: &str) -> &str {
    iri.trim_start_matches('<').trim_end_matches('>')
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())].matches('\n').count() + 1
}
