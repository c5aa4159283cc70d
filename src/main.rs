//! The `themely` command line interface.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use themely::scaffold::{self, ThemeSkeleton};
use themely::{Config, Theme, ThemesManager};

#[derive(Parser)]
#[command(name = "themely", version, about = "Manage themes for a web application")]
struct Cli {
    /// Path to the configuration file (defaults to the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all discovered themes
    List,
    /// Activate a theme
    Activate {
        /// Theme name, optionally vendor-qualified (acme/dark)
        name: String,
    },
    /// Deactivate a theme
    Deactivate {
        /// Theme name, optionally vendor-qualified (acme/dark)
        name: String,
    },
    /// Build the themes cache
    Cache,
    /// Clear the themes cache
    CacheClear,
    /// Scaffold a new theme
    Make {
        /// Qualified theme name (vendor/name)
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "0.1.0")]
        version: String,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Parent theme this one extends
        #[arg(long)]
        parent: Option<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("cannot load config {}", path.display()))?,
        None => Config::load_default().context("cannot load default config")?,
    };

    match cli.command {
        Command::List => list(config),
        Command::Activate { name } => activate(config, &name),
        Command::Deactivate { name } => deactivate(config, &name),
        Command::Cache => cache(config),
        Command::CacheClear => cache_clear(config),
        Command::Make {
            name,
            description,
            version,
            author,
            email,
            parent,
        } => make(config, &name, description, version, author, email, parent),
    }
}

fn list(config: Config) -> anyhow::Result<()> {
    let fallback = config.fallback_theme.clone();
    let manager = ThemesManager::new(config)?;

    if manager.is_empty() {
        println!("No theme found.");
        return Ok(());
    }

    let rows: Vec<[String; 7]> = manager
        .all()
        .map(|theme| {
            [
                theme.name().to_string(),
                theme.vendor().to_string(),
                theme.version().to_string(),
                theme.description().to_string(),
                theme.parent().unwrap_or("").to_string(),
                flag(is_fallback(theme, fallback.as_deref())),
                flag(theme.enabled()),
            ]
        })
        .collect();

    print_table(
        &["Name", "Vendor", "Version", "Description", "Extends", "Default", "Active"],
        &rows,
    );
    Ok(())
}

fn is_fallback(theme: &Theme, fallback: Option<&str>) -> bool {
    fallback.is_some_and(|name| {
        theme.qualified_name() == name.to_lowercase() || theme.name().eq_ignore_ascii_case(name)
    })
}

fn flag(set: bool) -> String {
    if set { "X".to_string() } else { String::new() }
}

fn print_table(headers: &[&str; 7], rows: &[[String; 7]]) {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.len()).collect();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            widths[index] = widths[index].max(cell.len());
        }
    }

    let line = |cells: &[String]| {
        let rendered: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(index, cell)| format!("{:<width$}", cell, width = widths[index]))
            .collect();
        println!("| {} |", rendered.join(" | "));
    };

    let separator: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    line(&headers.map(str::to_string));
    println!("|-{}-|", separator.join("-|-"));
    for row in rows {
        line(row);
    }
}

fn activate(config: Config, name: &str) -> anyhow::Result<()> {
    let mut manager = ThemesManager::new(config)?;

    let target = manager.get(name).map(Theme::qualified_name);
    if target.is_some() && manager.current().map(Theme::qualified_name) == target {
        anyhow::bail!("theme `{name}` is already active");
    }

    manager.set(name)?;
    println!("Theme `{name}` activated.");
    Ok(())
}

fn deactivate(config: Config, name: &str) -> anyhow::Result<()> {
    let mut manager = ThemesManager::new(config)?;

    let active = manager
        .get(name)
        .ok_or_else(|| anyhow::anyhow!("theme `{name}` not found"))?
        .enabled();
    if !active {
        anyhow::bail!("theme `{name}` is not active");
    }

    manager.disable(name)?;
    println!("Theme `{name}` deactivated.");
    Ok(())
}

fn cache(config: Config) -> anyhow::Result<()> {
    let mut manager = ThemesManager::new(config)?;
    manager.build_cache().context("cannot build themes cache")?;
    println!("Themes cache created.");
    Ok(())
}

fn cache_clear(config: Config) -> anyhow::Result<()> {
    let manager = ThemesManager::new(config)?;
    manager.clear_cache().context("cannot clear themes cache")?;
    println!("Themes cache cleared.");
    Ok(())
}

fn make(
    config: Config,
    name: &str,
    description: String,
    version: String,
    author: Option<String>,
    email: Option<String>,
    parent: Option<String>,
) -> anyhow::Result<()> {
    let manager = ThemesManager::new(config.clone())?;
    if manager.has(name) {
        anyhow::bail!("theme `{name}` already exists");
    }
    if let Some(parent) = &parent {
        if !manager.has(parent) {
            anyhow::bail!("parent theme `{parent}` not found");
        }
    }

    let mut skeleton = ThemeSkeleton::from_qualified_name(name);
    skeleton.description = description;
    skeleton.version = version;
    skeleton.author_name = author;
    skeleton.author_email = email;
    skeleton.parent = parent;

    let path = scaffold::generate(&config, &skeleton)?;
    println!("Theme created at {}.", path.display());
    Ok(())
}
