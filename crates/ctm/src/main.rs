//! ctm - Map test methods to backlog items
//!
//! ctm scans ABAP and Java sources for trace markers such as
//! `Trace(Jira:PROJECT-1)` in comments and reports which test methods they
//! are attached to.

mod config;
mod output;

use clap::{Parser, ValueEnum};
use config::Config;
use ctm_core::{
    GitHubLocation, Language, LocalLocation, LocationResolver, PathSources, ScanResult, Sources,
    WalkSources,
};
use eyre::{Result, WrapErr};
use output::{OutputFormat, render_report};
use owo_colors::{OwoColorize, Stream};
use std::path::{Path, PathBuf};
use tracing::debug;

/// CLI arguments
#[derive(Debug, Parser)]
#[command(name = "ctm", version, about = "Map test methods to backlog items via trace markers")]
struct Args {
    /// File or directory to scan (ignored with --config)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Path to a JSON config file listing the sources to scan
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only scan files of this language
    #[arg(short, long, value_enum)]
    language: Option<LanguageArg>,

    /// Glob patterns to scan, relative to PATH
    #[arg(long, action = clap::ArgAction::Append)]
    include: Vec<String>,

    /// Glob patterns to skip, relative to PATH
    #[arg(long, action = clap::ArgAction::Append)]
    exclude: Vec<String>,

    /// Base URL of the GitHub instance (with --organization/--repository)
    #[arg(long)]
    github_base_url: Option<String>,

    /// GitHub organization owning the sources
    #[arg(long, requires = "repository")]
    organization: Option<String>,

    /// GitHub repository holding the sources
    #[arg(long, requires = "organization")]
    repository: Option<String>,

    /// Branch to link to (default: master)
    #[arg(long)]
    branch: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LanguageArg {
    Abap,
    Java,
}

impl From<LanguageArg> for Language {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::Abap => Language::Abap,
            LanguageArg::Java => Language::Java,
        }
    }
}

/// One source tree to scan
struct Target {
    root: PathBuf,
    language: Option<Language>,
    include: Vec<String>,
    exclude: Vec<String>,
    resolver: Box<dyn LocationResolver>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let targets = match &args.config {
        Some(config_path) => targets_from_config(config_path, &args)?,
        None => vec![target_from_args(&args)],
    };

    let mut result = ScanResult::default();
    for target in targets {
        result.extend(scan_target(target)?);
    }

    if !result.warnings.is_empty() {
        eprintln!(
            "{} {} files skipped:",
            "!".if_supports_color(Stream::Stderr, |t| t.yellow()),
            result.warnings.len()
        );
        for warning in &result.warnings {
            eprintln!("   {}", warning);
        }
    }

    let report = render_report(&result, args.format)?;
    match &args.output {
        Some(out_path) => {
            std::fs::write(out_path, &report)
                .wrap_err_with(|| format!("Failed to write {}", out_path.display()))?;
            eprintln!(
                "{} Wrote {} traced tests to {}",
                "OK".if_supports_color(Stream::Stderr, |t| t.green()),
                result.records.len(),
                out_path.display()
            );
        }
        None => print!("{}", report),
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose {
        "ctm=debug,ctm_core=debug"
    } else {
        "ctm=info,ctm_core=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn target_from_args(args: &Args) -> Target {
    let root = args.path.clone();

    let resolver: Box<dyn LocationResolver> = match (&args.organization, &args.repository) {
        (Some(organization), Some(repository)) => {
            let mut location = GitHubLocation::new(organization, repository, location_root(&root));
            if let Some(base_url) = &args.github_base_url {
                location = location.base_url(base_url);
            }
            if let Some(branch) = &args.branch {
                location = location.branch(branch);
            }
            Box::new(location)
        }
        _ => Box::new(LocalLocation::relative_to(location_root(&root))),
    };

    Target {
        root,
        language: args.language.map(Into::into),
        include: args.include.clone(),
        exclude: args.exclude.clone(),
        resolver,
    }
}

fn targets_from_config(config_path: &Path, args: &Args) -> Result<Vec<Target>> {
    let config = Config::load(config_path)?;
    debug!(
        config = %config_path.display(),
        sources = config.sources.len(),
        "loaded config"
    );

    // Relative `local` entries are resolved against the config's directory
    let config_dir = config_path
        .parent()
        .ok_or_else(|| eyre::eyre!("Config path has no parent directory"))?;

    let github_base_url = args
        .github_base_url
        .as_deref()
        .or(config.github_base_url.as_deref());

    config
        .sources
        .iter()
        .map(|source| -> Result<Target> {
            let root = source.root(config_dir);
            let language = match args.language {
                Some(language) => Some(language.into()),
                None => source.language()?,
            };

            Ok(Target {
                resolver: source.resolver(&location_root(&root), github_base_url),
                root,
                language,
                include: source.include.clone(),
                exclude: source.exclude.clone(),
            })
        })
        .collect()
}

/// Links are relative to the scanned directory, or to the parent of a
/// single scanned file
fn location_root(root: &Path) -> PathBuf {
    if root.is_file() {
        root.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        root.to_path_buf()
    }
}

fn scan_target(target: Target) -> Result<ScanResult> {
    if !target.root.exists() {
        eyre::bail!("Source path not found: {}", target.root.display());
    }

    eprintln!(
        "{} Scanning {}...",
        "->".if_supports_color(Stream::Stderr, |t| t.blue()),
        target.root.display()
    );

    let result = if target.root.is_file() {
        let mut sources = PathSources::new([&target.root]);
        if let Some(language) = target.language {
            sources = sources.language(language);
        }
        sources.scan(&*target.resolver)?
    } else {
        let mut sources = WalkSources::new(&target.root)
            .include(target.include)
            .exclude(target.exclude);
        if let Some(language) = target.language {
            sources = sources.language(language);
        }
        sources.scan(&*target.resolver)?
    };

    eprintln!(
        "   Found {} traced tests",
        result
            .records
            .len()
            .if_supports_color(Stream::Stderr, |t| t.green())
    );

    Ok(result)
}
