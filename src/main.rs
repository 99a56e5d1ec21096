//! tfdocsync - Terraform variable documentation sync
//!
//! Reads the variable doc blocks of a module README and rewrites the
//! matching descriptions in the module's variables file.

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use std::path::Path;
use tfdocsync::cli::{check, init, list, print_json, sync, Cli, Commands, ConfigArgs, OutputFormat};
use tfdocsync::module::ModuleDir;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Setup logging; stdout is reserved for the rewritten text
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false),
        )
        .with(filter)
        .init();

    // Get module path
    let module_path = Path::new(&cli.path);

    // Execute command
    match cli.command {
        Commands::Sync(args) => sync(module_path, &args, cli.format)?,
        Commands::Check(args) => check(module_path, &args, cli.format)?,
        Commands::List(args) => list(module_path, &args, cli.format)?,
        Commands::Init(args) => init(module_path, args.force)?,
        Commands::Config(args) => handle_config(module_path, &args, cli.format)?,
    }

    Ok(())
}

/// Handle config command
fn handle_config(path: &Path, args: &ConfigArgs, format: OutputFormat) -> Result<()> {
    let module = ModuleDir::open(path)?;
    let config = module.config();

    if let Some(ref key) = args.get {
        match key.as_str() {
            "readme" => println!("{}", config.readme),
            "variables" => println!("{}", config.variables),
            "indent_width" => println!("{}", config.indent_width),
            "style" => println!("{}", config.style),
            "mode" => println!("{}", config.mode),
            "warn_malformed" => println!("{}", config.warn_malformed),
            "heredoc_marker" => println!("{}", config.heredoc_marker),
            "comment_prefix" => println!("{}", config.comment_prefix),
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        return Ok(());
    }

    if format == OutputFormat::Json {
        return print_json(config);
    }

    println!("tfdocsync Configuration");
    println!("=======================\n");
    println!("Module folder: {:?}", module.root());
    println!("README: {}", config.readme);
    println!("Variables file: {}", config.variables);
    println!("Indent width: {}", config.indent_width);
    println!("Style: {}", config.style);
    println!("Mode: {}", config.mode);
    println!("Warn on malformed doc blocks: {}", config.warn_malformed);
    println!("Heredoc marker: {}", config.heredoc_marker);
    println!("Comment prefix: {}", config.comment_prefix);

    Ok(())
}
