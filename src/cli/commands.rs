use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::conditions::{self, PageContext};
use crate::config::{self, Config};
use crate::migrate::{self, ContentStore, DirStore, FileFlagStore, FlagStore};
use crate::version::Version;

use super::exit_codes;
use super::output::{
    self, CheckData, CheckWarning, EvalData, MigrateData, OutputMode, ScanData, VersionData,
};

#[derive(Parser)]
#[command(name = "dynif")]
#[command(about = "Conditional visibility rules and legacy attribute migration for block-annotated content")]
#[command(version)]
pub struct Cli {
    /// Path to config file (overrides DYNIF_CONFIG env var and default location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (auto-enabled when stdout is piped)
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Force text output even when stdout is piped
    #[arg(long, global = true, conflicts_with = "json")]
    pub no_json: bool,

    /// Suppress all output on success (errors still go to stderr)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate block attributes against a page context
    Eval {
        /// Attributes JSON file (a marker payload), "-" for stdin
        #[arg(short, long)]
        attrs: PathBuf,

        /// Page context JSON file
        #[arg(short, long)]
        context: PathBuf,
    },

    /// Lint block markers in content files
    Check {
        /// Content files or directories to check
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,
    },

    /// Migrate legacy markers in a content directory
    Migrate {
        /// Content directory root
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// List content items still carrying legacy markers
    Scan {
        /// Content directory root
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Clear the migration-completed flag before scanning
        #[arg(long)]
        reset: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Display version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Verify the configuration file and report errors
    Verify,
    /// Print the effective configuration
    Show,
    /// Print the configuration file path
    Path,
}

pub fn execute(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    let output_mode = OutputMode::from_flags(cli.json, cli.no_json, cli.quiet);

    match cli.command {
        Commands::Eval { attrs, context } => {
            let attrs_text = read_input(&attrs)?;
            let attrs = match conditions::parse_attributes(&attrs_text) {
                Ok(a) => a,
                Err(e) => fail(
                    output_mode,
                    exit_codes::MALFORMED_INPUT,
                    &format!("invalid attributes: {}", e),
                ),
            };

            let context_text = read_input(&context)?;
            let ctx: PageContext = match serde_json::from_str(&context_text) {
                Ok(c) => c,
                Err(e) => fail(
                    output_mode,
                    exit_codes::MALFORMED_INPUT,
                    &format!("invalid page context: {}", e),
                ),
            };

            let visible = conditions::is_visible(&attrs, &ctx);
            match output_mode {
                OutputMode::Json => output::print_json(&EvalData {
                    action: "eval",
                    visible,
                }),
                OutputMode::Text => {
                    println!("{}", if visible { "visible" } else { "hidden" })
                }
                OutputMode::Quiet => {}
            }
            Ok(())
        }

        Commands::Check { paths } => {
            let config = config::load_with_override(config_path)?;

            let mut files = 0usize;
            let mut warnings = Vec::new();

            for path in &paths {
                if path.is_dir() {
                    let store = DirStore::new(path, config.content.extensions.clone());
                    for id in store.list_matching(migrate::BLOCK_NAME)? {
                        let body = store.load(&id)?;
                        files += 1;
                        lint_content(&path.join(&id).display().to_string(), &body, &mut warnings);
                    }
                } else if path.is_file() {
                    let body = fs::read_to_string(path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    files += 1;
                    lint_content(&path.display().to_string(), &body, &mut warnings);
                } else {
                    fail(
                        output_mode,
                        exit_codes::CONTENT_NOT_FOUND,
                        &format!("no such file or directory: {}", path.display()),
                    );
                }
            }

            let clean = warnings.is_empty();
            match output_mode {
                OutputMode::Json => output::print_json(&CheckData {
                    action: "check",
                    files,
                    warnings,
                }),
                OutputMode::Text => {
                    for w in &warnings {
                        println!("{}: marker #{}: {}", w.file, w.marker, w.message);
                    }
                    if clean {
                        println!("checked {} file(s), no warnings", files);
                    }
                }
                OutputMode::Quiet => {}
            }

            if !clean {
                std::process::exit(exit_codes::ERROR);
            }
            Ok(())
        }

        Commands::Migrate { root, dry_run } => {
            let config = config::load_with_override(config_path)?;

            if !root.is_dir() {
                fail(
                    output_mode,
                    exit_codes::CONTENT_NOT_FOUND,
                    &format!("not a directory: {}", root.display()),
                );
            }

            let store = DirStore::new(&root, config.content.extensions.clone());
            let flags = FileFlagStore::new(flag_path(&root, &config));

            let summary = migrate::run(&store, &flags, dry_run)?;

            match output_mode {
                OutputMode::Json => output::print_json(&MigrateData {
                    action: "migrate",
                    summary,
                    dry_run,
                }),
                OutputMode::Text => {
                    let prefix = if dry_run { "would migrate" } else { "migrated" };
                    println!(
                        "{}: {}, failed: {} (scanned {})",
                        prefix, summary.migrated, summary.failed, summary.scanned
                    );
                }
                OutputMode::Quiet => {}
            }

            if summary.failed > 0 {
                std::process::exit(exit_codes::PARTIAL_FAILURE);
            }
            Ok(())
        }

        Commands::Scan { root, reset } => {
            let config = config::load_with_override(config_path)?;

            if !root.is_dir() {
                fail(
                    output_mode,
                    exit_codes::CONTENT_NOT_FOUND,
                    &format!("not a directory: {}", root.display()),
                );
            }

            let store = DirStore::new(&root, config.content.extensions.clone());
            let flags = FileFlagStore::new(flag_path(&root, &config));

            if reset {
                flags.set_migration_done(false)?;
            }

            let pending = migrate::pending(&store, &flags)?;
            let done = flags.migration_done();

            match output_mode {
                OutputMode::Json => output::print_json(&ScanData {
                    action: "scan",
                    pending,
                    done,
                }),
                OutputMode::Text => {
                    if pending.is_empty() {
                        println!("migration complete: no legacy markers pending");
                    } else {
                        for id in &pending {
                            println!("{}", id);
                        }
                    }
                }
                OutputMode::Quiet => {}
            }
            Ok(())
        }

        Commands::Config { command } => match command {
            ConfigCommands::Verify => {
                let path = config::resolve_config_path(config_path);
                let errors = match config::verify(&path) {
                    Ok(errors) => errors,
                    Err(e) => fail(output_mode, exit_codes::CONFIG_ERROR, &e.to_string()),
                };

                if errors.is_empty() {
                    match output_mode {
                        OutputMode::Json => output::print_json(&serde_json::json!({
                            "action": "config.verify",
                            "path": path.display().to_string(),
                            "valid": true,
                        })),
                        OutputMode::Text => println!("config OK: {}", path.display()),
                        OutputMode::Quiet => {}
                    }
                    Ok(())
                } else {
                    match output_mode {
                        OutputMode::Json => output::print_json(&serde_json::json!({
                            "action": "config.verify",
                            "path": path.display().to_string(),
                            "valid": false,
                            "errors": errors,
                        })),
                        _ => {
                            for e in &errors {
                                eprintln!("{}", e);
                            }
                        }
                    }
                    std::process::exit(exit_codes::CONFIG_ERROR);
                }
            }
            ConfigCommands::Show => {
                let config = config::load_with_override(config_path)?;
                let text = serde_json::to_string_pretty(&config)
                    .context("failed to serialize config")?;
                println!("{}", text);
                Ok(())
            }
            ConfigCommands::Path => {
                println!("{}", config::resolve_config_path(config_path).display());
                Ok(())
            }
        },

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "dynif", &mut std::io::stdout());
            Ok(())
        }

        Commands::Version => {
            let version = Version::current();
            match output_mode {
                OutputMode::Json => output::print_json(&VersionData {
                    action: "version",
                    commit: version.short_commit.clone(),
                    channel: version.channel.clone(),
                    version: version.version_string(),
                }),
                OutputMode::Text => println!("dynif {}", version.full_version_string()),
                OutputMode::Quiet => {}
            }
            Ok(())
        }
    }
}

/// read a file, or stdin when the path is "-"
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

/// lint every marker payload in one content body
fn lint_content(file: &str, body: &str, warnings: &mut Vec<CheckWarning>) {
    for (i, m) in migrate::scan(body).iter().enumerate() {
        for message in conditions::lint_payload(m.payload) {
            warnings.push(CheckWarning {
                file: file.to_string(),
                marker: i,
                message,
            });
        }
        if migrate::payload_is_legacy(m.payload) {
            warnings.push(CheckWarning {
                file: file.to_string(),
                marker: i,
                message: "legacy attributes pending migration (run `dynif migrate`)".to_string(),
            });
        }
    }
}

/// resolve the flag file location for a content root
fn flag_path(root: &Path, config: &Config) -> PathBuf {
    match &config.content.flag_file {
        Some(p) if p.is_absolute() => p.clone(),
        Some(p) => root.join(p),
        None => root.join(config::DEFAULT_FLAG_FILE),
    }
}

/// print an error in the mode-appropriate format and exit
fn fail(mode: OutputMode, code: i32, message: &str) -> ! {
    if mode.is_json() {
        output::print_json_error(code, message);
    } else {
        eprintln!("error: {}", message);
    }
    std::process::exit(code);
}
