use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use refactory_core::{
    FeatureFlags, FileProcessor, PassPipeline, PipelineRunner, Program, ProjectConfig,
    RuleRegistry, RuleSetResolver, SkipPolicy,
};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "refactory")]
#[command(about = "Apply rule sets and post passes to JSON program trees")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configured rules and post passes over a program
    Process {
        /// Input program (JSON statement list)
        input: PathBuf,

        /// Project configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Additional rule-set files, resolved after the configured ones
        #[arg(long = "set")]
        sets: Vec<PathBuf>,

        /// Path used for skip matching and PSR-4 lookups (defaults to the input path)
        #[arg(long)]
        file_path: Option<PathBuf>,

        /// Output program file (defaults to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Resolve a rule-set file and list the resulting rules
    Resolve {
        /// Rule-set declaration file
        set: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Show the post passes enabled for a set of feature flags
    Passes {
        /// Project configuration file to read options from
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Enable auto-import-names
        #[arg(long)]
        auto_import_names: bool,

        /// Enable auto-import-docblock-names
        #[arg(long)]
        auto_import_docblock_names: bool,

        /// Enable remove-unused-imports
        #[arg(long)]
        remove_unused_imports: bool,
    },

    /// List registered rule identifiers
    Rules,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormat {
    Pretty,
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for JSON
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    let registry = RuleRegistry::with_default_rules();

    match cli.command {
        Commands::Process {
            input,
            config,
            sets,
            file_path,
            output,
            format,
        } => {
            let program: Program = read_json(&input, "program")?;
            let config = load_config(config.as_deref())?;

            let mut declaration = config.declaration();
            declaration.include.extend(sets);
            let rules = RuleSetResolver::new(&registry)
                .resolve_declaration(&declaration, Path::new(""))
                .map_err(|e| anyhow::Error::from(e).context("Rule resolution failed"))?;

            let skip = SkipPolicy::from_config(&config.skip)
                .context("Invalid skip configuration")?;
            let pipeline = PassPipeline::new(config.options.clone());
            let runner = PipelineRunner::new(&pipeline, &skip);

            let file_path = file_path.unwrap_or_else(|| input.clone());
            let result = FileProcessor::new(&rules, &runner, &skip)
                .process(program, &file_path)
                .map_err(|e| anyhow::Error::from(e).context("Processing failed"))?;

            if !result.applied.is_empty() {
                eprintln!("Applied: {}", result.applied.join(", "));
            }
            write_json(&result.program, output.as_ref(), format)?;
        }
        Commands::Resolve { set, format } => {
            let rules = RuleSetResolver::new(&registry)
                .resolve_from_declaration(&set)
                .map_err(|e| {
                    let context = e.to_json().to_string();
                    anyhow::Error::from(e).context(context)
                })?;
            let ids: Vec<&str> = rules.iter().map(|rule| rule.id()).collect();
            write_json(&ids, None, format)?;
        }
        Commands::Passes {
            config,
            auto_import_names,
            auto_import_docblock_names,
            remove_unused_imports,
        } => {
            let mut flags = load_config(config.as_deref())?.options;
            for (name, enabled) in [
                (FeatureFlags::AUTO_IMPORT_NAMES, auto_import_names),
                (FeatureFlags::AUTO_IMPORT_DOCBLOCK_NAMES, auto_import_docblock_names),
                (FeatureFlags::REMOVE_UNUSED_IMPORTS, remove_unused_imports),
            ] {
                if enabled {
                    flags.set(name, true);
                }
            }

            let pipeline = PassPipeline::new(flags);
            let ids: Vec<&str> = pipeline
                .enabled_passes()
                .iter()
                .map(|pass| pass.id())
                .collect();
            write_json(&ids, None, OutputFormat::Compact)?;
        }
        Commands::Rules => {
            let mut stdout = BufWriter::new(io::stdout());
            for id in registry.ids() {
                writeln!(stdout, "{}", id).context("Failed to write rule list")?;
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ProjectConfig> {
    match path {
        Some(path) => ProjectConfig::from_path(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display())),
        None => Ok(ProjectConfig::default()),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", what, path.display()))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse {} from: {}", what, path.display()))
}

fn write_json<T: serde::Serialize>(
    val: &T,
    path: Option<&PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let mut writer: Box<dyn Write> = if let Some(p) = path {
        let file = File::create(p)
            .with_context(|| format!("Failed to create output file: {}", p.display()))?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };

    match format {
        OutputFormat::Pretty => {
            serde_json::to_writer_pretty(&mut writer, val).context("Failed to write JSON")?;
        }
        OutputFormat::Compact => {
            serde_json::to_writer(&mut writer, val).context("Failed to write JSON")?;
        }
    }

    writeln!(writer).context("Failed to write trailing newline")?;
    writer.flush().context("Failed to flush output")?;

    Ok(())
}
