//! オントロジーローダー

use crate::model::Ontology;
use crate::parser::parse_ontology;
use crate::OwlError;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Document extensions picked up when scanning a directory
const ONTOLOGY_EXTENSIONS: &[&str] = &["ofn", "owl", "fss"];

/// Ontology loader trait
pub trait OntologyLoader {
    /// Load the ontology at `locator` together with its import closure
    fn load(&mut self, locator: &str) -> Result<Ontology, OwlError>;
}

/// Loads functional-syntax documents from the local file system
#[derive(Debug, Default)]
pub struct FileOntologyLoader {
    /// Ontology IRI → document path
    mappings: HashMap<String, PathBuf>,
}

impl FileOntologyLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map an ontology IRI to a local document
    pub fn add_mapping(&mut self, iri: impl Into<String>, path: impl Into<PathBuf>) {
        self.mappings.insert(iri.into(), path.into());
    }

    /// Scan a directory for ontology documents and map their ontology IRIs
    pub fn add_directory(&mut self, dir: &Path) -> Result<usize, OwlError> {
        let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ONTOLOGY_EXTENSIONS.contains(&ext))
                    .unwrap_or(false)
            })
            .collect();
        entries.sort();

        let mut mapped = 0;
        for path in entries {
            match Self::read_document(&path) {
                Ok(ontology) => {
                    if let Some(iri) = ontology.iri {
                        debug!("Mapped {} to {}", iri, path.display());
                        self.mappings.insert(iri.0, path);
                        mapped += 1;
                    }
                }
                Err(e) => warn!("Skipping {} while scanning {}: {}", path.display(), dir.display(), e),
            }
        }

        info!("Mapped {} ontologies from {}", mapped, dir.display());
        Ok(mapped)
    }

    fn read_document(path: &Path) -> Result<Ontology, OwlError> {
        let content = fs::read_to_string(path)?;
        parse_ontology(&content)
    }

    fn resolve(&self, locator: &str) -> Result<PathBuf, OwlError> {
        if let Some(path) = self.mappings.get(locator) {
            return Ok(path.clone());
        }

        let stripped = locator
            .strip_prefix("file://")
            .or_else(|| locator.strip_prefix("file:"))
            .unwrap_or(locator);
        let path = PathBuf::from(stripped);
        if path.is_file() {
            return Ok(path);
        }
        if path.is_dir() {
            return Err(OwlError::Loader(format!(
                "{} is a directory, not an ontology document",
                locator
            )));
        }

        Err(OwlError::Loader(format!("Cannot resolve ontology locator: {}", locator)))
    }
}

impl OntologyLoader for FileOntologyLoader {
    fn load(&mut self, locator: &str) -> Result<Ontology, OwlError> {
        let path = self.resolve(locator)?;
        let mut root = Self::read_document(&path)?;
        info!("Loaded {} axioms from {}", root.axioms.len(), path.display());

        let mut visited: BTreeSet<String> = BTreeSet::new();
        if let Some(iri) = &root.iri {
            visited.insert(iri.0.clone());
        }

        let mut pending: Vec<String> = root.imports.iter().map(|iri| iri.0.clone()).collect();
        while let Some(import) = pending.pop() {
            if !visited.insert(import.clone()) {
                continue;
            }
            let path = self.resolve(&import).map_err(|e| {
                OwlError::Loader(format!("Failed to resolve import {}: {}", import, e))
            })?;
            let imported = Self::read_document(&path)?;
            debug!("Merging {} axioms from import {}", imported.axioms.len(), import);
            pending.extend(imported.imports.iter().map(|iri| iri.0.clone()));
            root.merge(imported);
        }

        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Axiom, OwlIri};
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_with_imports_from_directory() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "base.ofn",
            "Ontology(<http://e.org/base> SubClassOf(<http://e.org/A> <http://e.org/B>))",
        );
        let main = write_file(
            dir.path(),
            "main.ofn",
            "Ontology(<http://e.org/main> Import(<http://e.org/base>) ClassAssertion(<http://e.org/A> <http://e.org/a>))",
        );
        write_file(dir.path(), "notes.txt", "not an ontology");

        let mut loader = FileOntologyLoader::new();
        assert_eq!(loader.add_directory(dir.path()).unwrap(), 2);

        let ontology = loader.load(main.to_str().unwrap()).unwrap();
        assert_eq!(ontology.axioms.len(), 2);
        assert!(ontology.classes.contains(&OwlIri::new("http://e.org/B")));
        assert!(matches!(ontology.axioms[0], Axiom::ClassAssertion(..)));
    }

    #[test]
    fn test_cyclic_imports_terminate() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "a.ofn",
            "Ontology(<http://e.org/a> Import(<http://e.org/b>) Declaration(Class(<http://e.org/A>)))",
        );
        write_file(
            dir.path(),
            "b.ofn",
            "Ontology(<http://e.org/b> Import(<http://e.org/a>) Declaration(Class(<http://e.org/B>)))",
        );

        let mut loader = FileOntologyLoader::new();
        loader.add_directory(dir.path()).unwrap();
        let ontology = loader.load("http://e.org/a").unwrap();
        assert_eq!(ontology.classes.len(), 2);
    }

    #[test]
    fn test_file_iri_and_missing_import() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "lonely.ofn",
            "Ontology(<http://e.org/lonely> Import(<http://e.org/elsewhere>))",
        );

        let mut loader = FileOntologyLoader::new();
        let locator = format!("file://{}", path.display());
        let err = loader.load(&locator).unwrap_err();
        assert!(err.to_string().contains("http://e.org/elsewhere"));

        assert!(loader.load("/definitely/not/here.ofn").is_err());
    }
}
