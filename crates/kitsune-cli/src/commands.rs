//! CLI command definitions and handlers

use anyhow::{Context, Result};
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, ValueEnum};
use kitsune_asp::Solver;
use kitsune_fd::{FixedDomainReasoner, ReasonerConfig, SolverBackend, Strategy};
use kitsune_owl::{Axiom, FileOntologyLoader, Ontology, OntologyLoader};
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Main CLI structure
#[derive(Parser, Debug)]
#[command(name = "kitsune")]
#[command(about = "Fixed-domain reasoning over OWL ontologies with answer-set programming")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Increase log verbosity (1 = info, 2 = debug, 3 = trace)
    #[arg(
        short,
        long,
        value_name = "N",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "1"
    )]
    pub verbose: Option<u8>,

    /// Restrict model output to the given classes
    #[arg(short, long, value_name = "IRI", value_delimiter = ',')]
    pub project: Vec<String>,

    /// Translate the ontology to TARGET and print the program
    #[arg(short = 'T', long, value_name = "TARGET")]
    pub translate: Option<TranslateTarget>,

    /// Write non-debug output to FILE
    #[arg(short = 'O', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Check whether the ontology in FILE is entailed
    #[arg(short, long, value_name = "FILE")]
    pub entail: Option<String>,

    /// Take the fixed domain from the individuals of the ontology in FILE
    #[arg(short, long, value_name = "FILE")]
    pub domain: Option<String>,

    /// Enumerate N models (0 = all)
    #[arg(short, long, value_name = "N")]
    pub model: Option<usize>,

    /// Check consistency
    #[arg(short, long)]
    pub consistent: bool,

    /// Find a justification of the inconsistency
    #[arg(short, long)]
    pub justification: bool,

    /// Write the ontology with fixed-domain axioms to FILE
    #[arg(short, long, value_name = "FILE")]
    pub axiomatize: Option<PathBuf>,

    /// Reasoner configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Answer-set solver (builtin, clingo)
    #[arg(long, value_name = "BACKEND")]
    pub solver: Option<SolverBackend>,

    /// Time budget of each solver call in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Refuse domains with more than N elements
    #[arg(long, value_name = "N")]
    pub max_domain: Option<usize>,

    /// Ontology documents, ontology IRIs, or directories to scan for imports
    #[arg(value_name = "IRI", required = true)]
    pub ontologies: Vec<String>,
}

/// Translation targets of `--translate`
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TranslateTarget {
    Naive,
    Direct,
    /// Provenance-tagged program used for justifications
    Naff,
}

impl From<TranslateTarget> for Strategy {
    fn from(target: TranslateTarget) -> Self {
        match target {
            TranslateTarget::Naive => Strategy::Naive,
            TranslateTarget::Direct => Strategy::Direct,
            TranslateTarget::Naff => Strategy::Debug,
        }
    }
}

/// Something to do with every loaded ontology
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Translate(Strategy),
    Entail,
    Models(usize),
    Consistent,
    Justification,
    Axiomatize(PathBuf),
}

impl Cli {
    /// Requested actions in command-line order
    pub fn actions(&self, matches: &ArgMatches) -> Vec<Action> {
        let mut actions: Vec<(usize, Action)> = Vec::new();
        let mut push = |id: &str, action: Action| {
            actions.push((matches.index_of(id).unwrap_or(usize::MAX), action));
        };

        if let Some(target) = self.translate {
            push("translate", Action::Translate(target.into()));
        }
        if self.entail.is_some() {
            push("entail", Action::Entail);
        }
        if let Some(limit) = self.model {
            push("model", Action::Models(limit));
        }
        if self.consistent {
            push("consistent", Action::Consistent);
        }
        if self.justification {
            push("justification", Action::Justification);
        }
        if let Some(path) = &self.axiomatize {
            push("axiomatize", Action::Axiomatize(path.clone()));
        }

        actions.sort_by_key(|(index, _)| *index);
        actions.into_iter().map(|(_, action)| action).collect()
    }

    /// Configuration file values overridden by command-line flags
    pub fn reasoner_config(&self) -> Result<ReasonerConfig> {
        let mut config = match &self.config {
            Some(path) => ReasonerConfig::from_file(path)?,
            None => ReasonerConfig::default(),
        };
        if !self.project.is_empty() {
            config.projection = self.project.clone();
        }
        if let Some(backend) = self.solver {
            config.solver.backend = backend;
        }
        if let Some(ms) = self.timeout {
            config.timeout_ms = Some(ms);
        }
        if let Some(limit) = self.max_domain {
            config.max_domain_size = Some(limit);
        }
        Ok(config)
    }
}

/// Parse arguments, keeping the order in which actions were given
pub fn parse_args<I, T>(args: I) -> Result<(Cli, Vec<Action>), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = Cli::command().try_get_matches_from(args)?;
    let cli = Cli::from_arg_matches(&matches)?;
    let actions = cli.actions(&matches);
    Ok((cli, actions))
}

/// Default log level for `-v/--verbose`; `RUST_LOG` takes precedence
pub fn log_level(verbose: Option<u8>) -> &'static str {
    match verbose.unwrap_or(0) {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn as_directory(locator: &str) -> Option<PathBuf> {
    let stripped = locator
        .strip_prefix("file://")
        .or_else(|| locator.strip_prefix("file:"))
        .unwrap_or(locator);
    let path = Path::new(stripped);
    path.is_dir().then(|| path.to_path_buf())
}

/// Runs the requested actions on each ontology
pub struct CommandExecutor {
    config: ReasonerConfig,
    actions: Vec<Action>,
    loader: FileOntologyLoader,
    domain: Option<Ontology>,
    entailment: Option<Vec<Axiom>>,
    output: Box<dyn Write>,
    solver_factory: Option<Box<dyn Fn() -> Box<dyn Solver>>>,
}

impl CommandExecutor {
    /// Scan directories and load the domain and entailment documents.
    ///
    /// Failing to load either document is a configuration error that stops
    /// the run before any ontology is processed.
    pub fn new(cli: &Cli, actions: Vec<Action>) -> Result<Self> {
        let config = cli.reasoner_config()?;

        let mut loader = FileOntologyLoader::new();
        for locator in &cli.ontologies {
            if let Some(dir) = as_directory(locator) {
                loader
                    .add_directory(&dir)
                    .with_context(|| format!("Failed to scan directory {}", dir.display()))?;
            }
        }

        let domain = match &cli.domain {
            Some(locator) => Some(
                loader
                    .load(locator)
                    .with_context(|| format!("Failed to load domain ontology {}", locator))?,
            ),
            None => None,
        };
        let entailment = match &cli.entail {
            Some(locator) => Some(
                loader
                    .load(locator)
                    .with_context(|| format!("Failed to load entailment ontology {}", locator))?
                    .axioms,
            ),
            None => None,
        };

        let output: Box<dyn Write> = match &cli.output {
            Some(path) => Box::new(BufWriter::new(
                File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
            )),
            None => Box::new(io::stdout()),
        };

        if actions.is_empty() {
            warn!("No action given; ontologies are only loaded and translated");
        }

        Ok(Self {
            config,
            actions,
            loader,
            domain,
            entailment,
            output,
            solver_factory: None,
        })
    }

    /// Use solvers from `factory` instead of the configured backend
    pub fn with_solver<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Solver> + 'static,
    {
        self.solver_factory = Some(Box::new(factory));
        self
    }

    fn solver(&self, config: &ReasonerConfig) -> Box<dyn Solver> {
        match &self.solver_factory {
            Some(factory) => factory(),
            None => config.solver.build(),
        }
    }

    /// Process every ontology; returns the number that failed
    pub fn run(&mut self, locators: &[String]) -> usize {
        let mut failures = 0;
        for locator in locators {
            if as_directory(locator).is_some() {
                continue;
            }
            if let Err(e) = self.process(locator) {
                error!("Failed to process {}: {:#}", locator, e);
                failures += 1;
            }
        }
        failures
    }

    /// Load one ontology and run all actions on it
    pub fn process(&mut self, locator: &str) -> Result<()> {
        info!("Processing {}", locator);
        debug!("{} actions", self.actions.len());

        let start = Instant::now();
        let ontology = self.loader.load(locator)?;
        info!("Ontology parsed in {:?}", start.elapsed());

        let start = Instant::now();
        let reasoner = FixedDomainReasoner::new(
            ontology,
            self.domain.as_ref(),
            self.config.clone(),
            self.solver(&self.config),
        )?;
        info!(
            "Reasoner created in {:?} over {} domain elements",
            start.elapsed(),
            reasoner.domain_size()
        );

        for action in self.actions.clone() {
            let start = Instant::now();
            self.execute(&reasoner, &action)?;
            debug!("{:?} completed in {:?}", action, start.elapsed());
        }
        self.output.flush()?;
        Ok(())
    }

    fn execute(&mut self, reasoner: &FixedDomainReasoner, action: &Action) -> Result<()> {
        match action {
            Action::Translate(strategy) => self.execute_translate(reasoner, *strategy),
            Action::Entail => {
                let axioms = self.entailment.as_deref().unwrap_or_default();
                let entailed = reasoner.is_entailed(axioms)?;
                writeln!(self.output, "Is entailed? : {}", entailed)?;
                Ok(())
            }
            Action::Models(limit) => self.execute_models(reasoner, *limit),
            Action::Consistent => {
                if reasoner.is_consistent()? {
                    writeln!(self.output, "Input ontologies are consistent")?;
                } else {
                    writeln!(self.output, "Input ontologies are inconsistent")?;
                }
                Ok(())
            }
            Action::Justification => {
                match reasoner.justification()? {
                    Some(axioms) => {
                        writeln!(self.output, "Justification ({} axioms):", axioms.len())?;
                        for axiom in axioms {
                            writeln!(self.output, "  {}", axiom)?;
                        }
                    }
                    None => writeln!(self.output, "Input ontologies are consistent, no justification")?,
                }
                Ok(())
            }
            Action::Axiomatize(path) => {
                reasoner.axiomatize_fd_semantics(path)?;
                Ok(())
            }
        }
    }

    fn execute_translate(&mut self, reasoner: &FixedDomainReasoner, strategy: Strategy) -> Result<()> {
        if strategy == reasoner.strategy() {
            reasoner.translate(&mut self.output)?;
            return Ok(());
        }
        let config = ReasonerConfig {
            strategy,
            ..self.config.clone()
        };
        let solver = self.solver(&config);
        let translator = FixedDomainReasoner::new(reasoner.ontology().clone(), self.domain.as_ref(), config, solver)?;
        translator.translate(&mut self.output)?;
        Ok(())
    }

    /// Models are written as they are found, so an interrupted enumeration
    /// still leaves the earlier ones in the output
    fn execute_models(&mut self, reasoner: &FixedDomainReasoner, limit: usize) -> Result<()> {
        let mut found = 0;
        for model in reasoner.enumerate_models(limit) {
            let model = match model {
                Ok(model) => model,
                Err(e) => {
                    writeln!(self.output, "Enumeration stopped after {} models", found)?;
                    self.output.flush()?;
                    return Err(e.into());
                }
            };
            found += 1;
            writeln!(self.output, "Model {}:", found)?;
            write!(self.output, "{}", model)?;
        }

        if limit == 0 {
            writeln!(self.output, "Found {} models (requested ALL)", found)?;
        } else {
            writeln!(self.output, "Found {} models (requested {})", found, limit)?;
        }
        Ok(())
    }
}
