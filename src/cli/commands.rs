//! Command implementations

use super::{CheckArgs, ListArgs, OutputFormat, OverrideArgs, SyncArgs};
use crate::extract::DocExtractor;
use crate::module::{discover_modules, ModuleDir, SyncConfig, CONFIG_FILE};
use crate::sync::{SyncOptions, SyncReport, Synchronizer};
use anyhow::{Context, Result};
use similar::TextDiff;
use std::path::{Path, PathBuf};

/// Open the module folders a command works on
fn open_modules(path: &Path, recursive: bool, overrides: &OverrideArgs) -> Result<Vec<ModuleDir>> {
    let paths: Vec<PathBuf> = if recursive {
        let mut root_config = SyncConfig::load_or_default(path)?;
        overrides.apply(&mut root_config);
        discover_modules(path, &root_config)?
    } else {
        vec![path.to_path_buf()]
    };

    paths
        .iter()
        .map(|p| {
            let mut module = ModuleDir::open(p)?;
            overrides.apply(module.config_mut());
            Ok(module)
        })
        .collect()
}

/// Run the pipeline over one module; returns the original variables text
/// alongside the report
fn sync_module(module: &ModuleDir) -> Result<(String, SyncReport)> {
    let inputs = module
        .read_inputs()
        .with_context(|| format!("Failed to read inputs of module {:?}", module.root()))?;
    let synchronizer = Synchronizer::with_options(SyncOptions::from(module.config()));
    let report = synchronizer.run(&inputs.readme, &inputs.variables);
    Ok((inputs.variables, report))
}

/// Unified diff between the current variables file and the rewrite
fn unified_diff(module: &ModuleDir, old: &str, new: &str) -> String {
    let name = module.variables_path().display().to_string();
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{}", name), &format!("b/{}", name))
        .to_string()
}

/// Rewrite variable descriptions from the README
pub fn sync(path: &Path, args: &SyncArgs, format: OutputFormat) -> Result<()> {
    let modules = open_modules(path, args.recursive, &args.overrides)?;

    if args.recursive && modules.is_empty() {
        anyhow::bail!("No module folders found under {:?}", path);
    }

    // Read and rewrite everything first so a read failure leaves no partial output
    let mut results = Vec::with_capacity(modules.len());
    for module in &modules {
        let (original, report) = sync_module(module)?;
        results.push((module, original, report));
    }

    if format == OutputFormat::Json {
        let reports: Vec<&SyncReport> = results.iter().map(|(_, _, r)| r).collect();
        if args.recursive {
            print_json(&reports)?;
        } else if let Some(report) = reports.first() {
            print_json(report)?;
        }
    }

    for (module, original, report) in &results {
        if args.write {
            if report.changed {
                module.write_variables(&report.output)?;
            }
            if format == OutputFormat::Text {
                let status = if report.changed { "Updated" } else { "Up to date" };
                println!("✓ {} {:?}", status, module.variables_path());
            }
            continue;
        }

        if format == OutputFormat::Json {
            continue;
        }

        if args.diff {
            print!("{}", unified_diff(module, original, &report.output));
        } else {
            if args.recursive {
                println!("# ==> {} <==", module.variables_path().display());
            }
            print!("{}", report.output);
        }
    }

    Ok(())
}

/// Fail if any variables file would change
pub fn check(path: &Path, args: &CheckArgs, format: OutputFormat) -> Result<()> {
    let modules = open_modules(path, args.recursive, &args.overrides)?;

    let mut stale = Vec::new();
    let mut reports = Vec::new();
    for module in &modules {
        let (_, report) = sync_module(module)?;
        if report.changed {
            tracing::warn!(module = %module.root().display(), "variables file out of date");
            stale.push(module.variables_path());
        }
        reports.push(report);
    }

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "checked": modules.len(),
            "stale": stale,
            "problems": reports.iter().map(|r| r.diagnostics.len()).sum::<usize>(),
        }))?,
        OutputFormat::Text => {
            for module in &modules {
                let path = module.variables_path();
                if stale.contains(&path) {
                    println!("✗ {:?} is out of date", path);
                } else {
                    println!("✓ {:?}", path);
                }
            }
        }
    }

    if !stale.is_empty() {
        anyhow::bail!("{} module(s) out of date", stale.len());
    }

    Ok(())
}

/// List the doc blocks and link references found in the README
pub fn list(path: &Path, args: &ListArgs, format: OutputFormat) -> Result<()> {
    let modules = open_modules(path, false, &args.overrides)?;
    let Some(module) = modules.first() else {
        return Ok(());
    };

    let readme_path = module.readme_path();
    let readme = std::fs::read_to_string(&readme_path)
        .with_context(|| format!("Failed to read README: {:?}", readme_path))?;
    let config = module.config();
    let extracted = DocExtractor::new()
        .with_indent_width(config.indent_width)
        .with_interpretation(config.mode)
        .extract(&readme);

    if format == OutputFormat::Json {
        return print_json(&extracted);
    }

    if extracted.records.is_empty() {
        println!("No doc blocks found in {:?}", readme_path);
    }

    for record in &extracted.records {
        let indent = "  ".repeat(record.indent_level);
        println!(
            "{}{} ({}) since {}  [line {}]",
            indent, record.name, record.annotation, record.since_version, record.line
        );
        if let Some(ref default) = record.default {
            println!("{}  default: {}", indent, default);
        }
        println!("{}  {}", indent, record.description);
    }

    if !extracted.links.is_empty() {
        println!("\nLink references:");
        for (label, target) in extracted.links.iter() {
            println!("  [{}]: {}", label, target);
        }
    }

    if !extracted.malformed.is_empty() {
        println!("\nSkipped bullets:");
        for block in &extracted.malformed {
            println!("  {} [line {}]", block.name, block.line);
        }
    }

    Ok(())
}

/// Write a default configuration file into the module folder
pub fn init(path: &Path, force: bool) -> Result<()> {
    let config_path = path.join(CONFIG_FILE);
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it.",
            CONFIG_FILE
        );
    }

    if !path.is_dir() {
        anyhow::bail!("Not a directory: {:?}", path);
    }

    SyncConfig::default().save(path)?;
    println!("✓ Wrote {:?}", config_path);

    Ok(())
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
