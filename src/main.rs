//! tsviz - Entry Point

use clap::{Parser, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tsviz::config::{self, CliOverrides, ResolvedConfig};
use tsviz::model::{AppError, ShareConfig, SyntaxNode};
use tsviz::share::{self, WriterClipboard};
use tsviz::{graph, layout, serializer};

/// tsviz - inspect tree-sitter parse trees as JSON and tidy-tree diagrams
#[derive(Parser, Debug)]
#[command(name = "tsviz")]
#[command(version)]
#[command(about = "Inspect tree-sitter parse trees as JSON documents and tidy-tree diagrams")]
pub struct Args {
    /// Source file to parse (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Grammar id to parse with
    #[arg(short, long)]
    pub language: Option<String>,

    /// Use the terse serialization shape
    #[arg(long)]
    pub terse: bool,

    /// Document to print
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    /// Print a share link for the session instead of the document
    #[arg(long)]
    pub share: bool,

    /// Restore a session from a share link or its fragment
    #[arg(long, value_name = "FRAGMENT", conflicts_with = "tree")]
    pub load: Option<String>,

    /// Read an already-parsed tree (JSON) instead of running a grammar
    #[arg(long, value_name = "TREE_JSON")]
    pub tree: Option<PathBuf>,

    /// Viewport width used for layout
    #[arg(long)]
    pub width: Option<f64>,

    /// Viewport height used for layout
    #[arg(long)]
    pub height: Option<f64>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// List available grammars and exit
    #[arg(long)]
    pub list_languages: bool,
}

/// Output document selected with `--output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Serialized parse tree
    Json,
    /// Diagram hierarchy with node ids
    Graph,
    /// Positioned diagram with edge paths
    Layout,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("tsviz: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), AppError> {
    // Defaults → Config File → Env Vars → CLI Args
    let config = config::resolve(args.config.clone(), cli_overrides(&args))?;

    tsviz::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    if args.list_languages {
        for id in available_languages() {
            println!("{id}");
        }
        return Ok(());
    }

    if args.share {
        let session = match &args.tree {
            Some(path) => {
                let root = read_tree_document(path)?;
                ShareConfig::new(config.language.clone(), root.text.clone(), config.terse)
            }
            None => initial_session(&args, &config)?,
        };
        let mut clipboard = WriterClipboard::new(std::io::stdout().lock());
        share::share_link(&session, &config.share_base_url, &mut clipboard)?;
        return Ok(());
    }

    let output = match &args.tree {
        Some(path) => render_tree_document(&read_tree_document(path)?, args.output, &config)?,
        None => render_session(initial_session(&args, &config)?, args.output, &config)?,
    };
    println!("{output}");
    Ok(())
}

fn cli_overrides(args: &Args) -> CliOverrides {
    CliOverrides {
        language: args.language.clone(),
        // --terse can only switch terse mode on
        terse: args.terse.then_some(true),
        viewport_width: args.width,
        viewport_height: args.height,
    }
}

/// Session to render: a shared link if `--load` was given, else FILE or stdin.
fn initial_session(args: &Args, config: &ResolvedConfig) -> Result<ShareConfig, AppError> {
    if let Some(link) = &args.load {
        return Ok(share::load_shared(link).unwrap_or_else(|| {
            warn!("Falling back to an empty session");
            ShareConfig::new(config.language.clone(), "", config.terse)
        }));
    }
    let code = read_source(args.file.as_deref())?;
    Ok(ShareConfig::new(config.language.clone(), code, config.terse))
}

fn read_source(file: Option<&Path>) -> Result<String, AppError> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut code = String::new();
            std::io::stdin().read_to_string(&mut code)?;
            Ok(code)
        }
    }
}

fn read_tree_document(path: &Path) -> Result<SyntaxNode, AppError> {
    let contents = std::fs::read_to_string(path)?;
    SyntaxNode::from_json(&contents).map_err(|e| AppError::TreeDocument(e.to_string()))
}

/// Render an already-parsed tree without running any grammar.
fn render_tree_document(
    root: &SyntaxNode,
    output: OutputFormat,
    config: &ResolvedConfig,
) -> Result<String, AppError> {
    let rendered = match output {
        OutputFormat::Json => serializer::to_pretty_json(&serializer::serialize(
            &root,
            serializer::SerializeMode::from_terse(config.terse),
        ))?,
        OutputFormat::Graph => serde_json::to_string_pretty(&graph::project(Some(&root)))?,
        OutputFormat::Layout => serde_json::to_string_pretty(&layout::layout(
            &graph::project(Some(&root)),
            config.viewport_width,
            config.viewport_height,
        ))?,
    };
    Ok(rendered)
}

#[cfg(feature = "tree-sitter")]
fn available_languages() -> Vec<String> {
    use tsviz::pipeline::LanguageBackend;

    tsviz::grammars::TreeSitterBackend::with_bundled()
        .catalog()
        .iter()
        .map(str::to_string)
        .collect()
}

#[cfg(not(feature = "tree-sitter"))]
fn available_languages() -> Vec<String> {
    Vec::new()
}

#[cfg(feature = "tree-sitter")]
fn render_session(
    session: ShareConfig,
    output: OutputFormat,
    config: &ResolvedConfig,
) -> Result<String, AppError> {
    use std::time::Instant;
    use tsviz::grammars::TreeSitterBackend;
    use tsviz::pipeline::Workbench;

    let mut bench = Workbench::new(TreeSitterBackend::with_bundled(), session.language.clone())
        .with_debounce(config.debounce())
        .with_viewport_size(config.viewport_width, config.viewport_height);
    bench.restore(session, Instant::now());
    bench.recompute_now()?;

    Ok(match output {
        OutputFormat::Json => bench.text_panel().to_string(),
        OutputFormat::Graph => serde_json::to_string_pretty(&bench.graph())?,
        OutputFormat::Layout => serde_json::to_string_pretty(bench.diagram())?,
    })
}

#[cfg(not(feature = "tree-sitter"))]
fn render_session(
    session: ShareConfig,
    _output: OutputFormat,
    _config: &ResolvedConfig,
) -> Result<String, AppError> {
    Err(tsviz::model::GrammarLoadError::UnknownGrammar(session.language).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_does_not_error() {
        let result = Args::try_parse_from(["tsviz", "--help"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_does_not_error() {
        let result = Args::try_parse_from(["tsviz", "--version"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_no_args_defaults() {
        let args = Args::parse_from(["tsviz"]);
        assert_eq!(args.file, None);
        assert_eq!(args.language, None);
        assert!(!args.terse);
        assert_eq!(args.output, OutputFormat::Json);
        assert!(!args.share);
        assert_eq!(args.load, None);
        assert_eq!(args.tree, None);
        assert_eq!(args.width, None);
        assert_eq!(args.height, None);
        assert_eq!(args.config, None);
        assert!(!args.list_languages);
    }

    #[test]
    fn test_file_path_populates_file_field() {
        let args = Args::parse_from(["tsviz", "main.inf"]);
        assert_eq!(args.file, Some(PathBuf::from("main.inf")));
    }

    #[test]
    fn test_language_short_and_long() {
        let args = Args::parse_from(["tsviz", "-l", "python"]);
        assert_eq!(args.language.as_deref(), Some("python"));
        let args = Args::parse_from(["tsviz", "--language", "rust"]);
        assert_eq!(args.language.as_deref(), Some("rust"));
    }

    #[test]
    fn test_output_formats() {
        for (flag, expected) in [
            ("json", OutputFormat::Json),
            ("graph", OutputFormat::Graph),
            ("layout", OutputFormat::Layout),
        ] {
            let args = Args::parse_from(["tsviz", "--output", flag]);
            assert_eq!(args.output, expected);
        }
    }

    #[test]
    fn test_unknown_output_format_is_rejected() {
        let err = Args::try_parse_from(["tsviz", "-o", "svg"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_viewport_size_flags() {
        let args = Args::parse_from(["tsviz", "--width", "1024", "--height", "768.5"]);
        assert_eq!(args.width, Some(1024.0));
        assert_eq!(args.height, Some(768.5));
    }

    #[test]
    fn test_load_conflicts_with_tree() {
        let err = Args::try_parse_from(["tsviz", "--load", "abc", "--tree", "t.json"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_terse_flag_only_overrides_when_set() {
        let args = Args::parse_from(["tsviz"]);
        assert_eq!(cli_overrides(&args).terse, None);

        let args = Args::parse_from(["tsviz", "--terse", "--width", "10"]);
        let overrides = cli_overrides(&args);
        assert_eq!(overrides.terse, Some(true));
        assert_eq!(overrides.viewport_width, Some(10.0));
    }

    #[test]
    fn test_broken_load_falls_back_to_empty_session() {
        let args = Args::parse_from(["tsviz", "--load", "#not-a-share-link!!"]);
        let config = ResolvedConfig::default();
        let session = initial_session(&args, &config).unwrap();
        assert_eq!(session, ShareConfig::new("inference", "", false));
    }

    #[test]
    fn test_load_restores_shared_session() {
        let shared = ShareConfig::new("python", "x = 1", true);
        let url = share::share_url(&shared, "http://localhost:3000/").unwrap();
        let args = Args::parse_from(["tsviz", "--load", url.as_str()]);
        let session = initial_session(&args, &ResolvedConfig::default()).unwrap();
        assert_eq!(session, shared);
    }
}
