//! シグネチャとプログラム記号の双方向対応

use crate::config::MapperKind;
use kitsune_owl::Entity;
use std::collections::HashMap;

/// Bidirectional, injective naming of signature entities as program symbols.
///
/// `symbol_for` registers on first use and returns the same symbol for
/// every later call; `entity_for` only knows registered symbols, so
/// auxiliary predicates of a program decode to `None`.
pub trait SignatureMapper: Send + Sync {
    fn symbol_for(&mut self, entity: &Entity) -> String;

    fn entity_for(&self, symbol: &str) -> Option<&Entity>;

    fn clone_box(&self) -> Box<dyn SignatureMapper>;
}

impl Clone for Box<dyn SignatureMapper> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Build the mapper selected by configuration
pub fn mapper_for(kind: MapperKind) -> Box<dyn SignatureMapper> {
    match kind {
        MapperKind::Default => Box::new(SanitizingMapper::new()),
        MapperKind::AspCore => Box::new(AspCoreMapper::new()),
    }
}

/// Append-only symbol table shared by the mapper variants
#[derive(Debug, Clone, Default)]
struct SymbolTable {
    by_entity: HashMap<Entity, String>,
    by_symbol: HashMap<String, Entity>,
}

impl SymbolTable {
    fn register(&mut self, entity: &Entity, base: String) -> String {
        if let Some(symbol) = self.by_entity.get(entity) {
            return symbol.clone();
        }

        let mut symbol = base.clone();
        let mut suffix = 2;
        while self.by_symbol.contains_key(&symbol) {
            symbol = format!("{}_{}", base, suffix);
            suffix += 1;
        }

        self.by_entity.insert(entity.clone(), symbol.clone());
        self.by_symbol.insert(symbol.clone(), entity.clone());
        symbol
    }

    fn lookup(&self, symbol: &str) -> Option<&Entity> {
        self.by_symbol.get(symbol)
    }
}

fn kind_prefix(entity: &Entity) -> &'static str {
    match entity {
        Entity::Class(_) => "c",
        Entity::ObjectProperty(_) => "r",
        Entity::Individual(_) => "i",
    }
}

/// Lower-case words clingo reads as keywords
const RESERVED: &[&str] = &["not"];

/// Replace everything outside `[A-Za-z0-9_]` with `_`
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Lower-cased, sanitized local names: `http://e.org/family#Person` becomes `person`
#[derive(Debug, Clone, Default)]
pub struct SanitizingMapper {
    table: SymbolTable,
}

impl SanitizingMapper {
    pub fn new() -> Self {
        Self::default()
    }

    fn base_symbol(entity: &Entity) -> String {
        let sanitized = sanitize(entity.iri().local_name());
        let trimmed = sanitized.trim_start_matches('_');

        let mut chars = trimmed.chars();
        let symbol = match chars.next() {
            Some(first) if first.is_ascii_alphabetic() => {
                first.to_ascii_lowercase().to_string() + chars.as_str()
            }
            _ => return format!("{}_{}", kind_prefix(entity), trimmed),
        };
        if RESERVED.contains(&symbol.as_str()) {
            return format!("{}_{}", kind_prefix(entity), symbol);
        }
        symbol
    }
}

impl SignatureMapper for SanitizingMapper {
    fn symbol_for(&mut self, entity: &Entity) -> String {
        let base = Self::base_symbol(entity);
        self.table.register(entity, base)
    }

    fn entity_for(&self, symbol: &str) -> Option<&Entity> {
        self.table.lookup(symbol)
    }

    fn clone_box(&self) -> Box<dyn SignatureMapper> {
        Box::new(self.clone())
    }
}

/// ASP-Core-2 flavoured naming: predicates keep their case behind a `c_`/`r_`
/// prefix and individuals become quoted IRI string constants.
#[derive(Debug, Clone, Default)]
pub struct AspCoreMapper {
    table: SymbolTable,
}

impl AspCoreMapper {
    pub fn new() -> Self {
        Self::default()
    }

    fn base_symbol(entity: &Entity) -> String {
        match entity {
            Entity::Individual(iri) => {
                let escaped = iri.as_str().replace('\\', "\\\\").replace('"', "\\\"");
                format!("\"{}\"", escaped)
            }
            _ => format!("{}_{}", kind_prefix(entity), sanitize(entity.iri().local_name())),
        }
    }
}

impl SignatureMapper for AspCoreMapper {
    fn symbol_for(&mut self, entity: &Entity) -> String {
        let base = Self::base_symbol(entity);
        self.table.register(entity, base)
    }

    fn entity_for(&self, symbol: &str) -> Option<&Entity> {
        self.table.lookup(symbol)
    }

    fn clone_box(&self) -> Box<dyn SignatureMapper> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kitsune_owl::OwlIri;
    use proptest::prelude::*;

    fn class(iri: &str) -> Entity {
        Entity::Class(OwlIri::new(iri))
    }

    fn individual(iri: &str) -> Entity {
        Entity::Individual(OwlIri::new(iri))
    }

    #[test]
    fn test_sanitized_local_names() {
        let mut mapper = SanitizingMapper::new();
        assert_eq!(mapper.symbol_for(&class("http://e.org/family#Person")), "person");
        assert_eq!(mapper.symbol_for(&class("http://e.org/x#has-Part")), "has_Part");
        assert_eq!(mapper.symbol_for(&class("http://e.org/x#42")), "c_42");
        assert_eq!(mapper.symbol_for(&individual("http://e.org/x#_b0")), "b0");
        assert_eq!(
            mapper.symbol_for(&Entity::ObjectProperty(OwlIri::new("http://e.org/x#9r"))),
            "r_9r"
        );
    }

    #[test]
    fn test_keyword_names_get_kind_prefix() {
        let mut mapper = SanitizingMapper::new();
        assert_eq!(mapper.symbol_for(&class("http://e.org/#Not")), "c_not");
        assert_eq!(mapper.symbol_for(&individual("http://e.org/#not")), "i_not");
        assert_eq!(
            mapper.symbol_for(&Entity::ObjectProperty(OwlIri::new("http://e.org/#_not"))),
            "r_not"
        );
        assert_eq!(mapper.entity_for("c_not"), Some(&class("http://e.org/#Not")));
        // only whole words
        assert_eq!(mapper.symbol_for(&class("http://e.org/#Nothing")), "nothing");
    }

    #[test]
    fn test_collisions_get_suffixes() {
        let mut mapper = SanitizingMapper::new();
        let a = mapper.symbol_for(&class("http://one.org/#Person"));
        let b = mapper.symbol_for(&class("http://two.org/#Person"));
        let c = mapper.symbol_for(&individual("http://one.org/#person"));
        assert_eq!(a, "person");
        assert_eq!(b, "person_2");
        assert_eq!(c, "person_3");

        // idempotent after collisions
        assert_eq!(mapper.symbol_for(&class("http://two.org/#Person")), "person_2");
        assert_eq!(mapper.entity_for("person_3"), Some(&individual("http://one.org/#person")));
    }

    #[test]
    fn test_unregistered_symbol_is_lookup_failure() {
        let mut mapper = SanitizingMapper::new();
        mapper.symbol_for(&class("http://e.org/#A"));
        assert!(mapper.entity_for("_aux1").is_none());
        assert!(mapper.entity_for("b").is_none());
    }

    #[test]
    fn test_asp_core_naming() {
        let mut mapper = AspCoreMapper::new();
        assert_eq!(mapper.symbol_for(&class("http://e.org/#Person")), "c_Person");
        assert_eq!(
            mapper.symbol_for(&individual("http://e.org/#a\"b")),
            "\"http://e.org/#a\\\"b\""
        );
        assert_eq!(
            mapper.entity_for("\"http://e.org/#a\\\"b\""),
            Some(&individual("http://e.org/#a\"b"))
        );
    }

    #[test]
    fn test_boxed_mapper_clone_keeps_registrations() {
        let mut mapper = mapper_for(MapperKind::Default);
        mapper.symbol_for(&class("http://e.org/#A"));
        let copy = mapper.clone();
        assert_eq!(copy.entity_for("a"), Some(&class("http://e.org/#A")));
    }

    fn entity_strategy() -> impl Strategy<Value = Entity> {
        ("[a-zA-Z0-9_#/:.-]{0,12}", 0..3u8).prop_map(|(name, kind)| {
            let iri = OwlIri::new(format!("http://e.org/{}", name));
            match kind {
                0 => Entity::Class(iri),
                1 => Entity::ObjectProperty(iri),
                _ => Entity::Individual(iri),
            }
        })
    }

    proptest! {
        #[test]
        fn prop_round_trip_and_injectivity(entities in proptest::collection::vec(entity_strategy(), 1..40)) {
            for kind in [MapperKind::Default, MapperKind::AspCore] {
                let mut mapper = mapper_for(kind);
                let symbols: Vec<String> = entities.iter().map(|e| mapper.symbol_for(e)).collect();
                for (entity, symbol) in entities.iter().zip(&symbols) {
                    prop_assert_eq!(mapper.entity_for(symbol), Some(entity));
                    prop_assert_eq!(&mapper.symbol_for(entity), symbol);
                }
                let distinct_entities: std::collections::HashSet<_> = entities.iter().collect();
                let distinct_symbols: std::collections::HashSet<_> = symbols.iter().collect();
                prop_assert_eq!(distinct_entities.len(), distinct_symbols.len());
            }
        }
    }
}
