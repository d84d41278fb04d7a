// SPDX-License-Identifier: MIT OR Apache-2.0
//! OrdoPlay keytool
//!
//! Run action editor keyframe commands on a saved session without the
//! editor UI.

use anyhow::Result;
use clap::{Parser, Subcommand};
use ordoplay_editor_action::{
    AnimContext, CallMode, CopyBuffer, KeyframeSettings, OperatorRegistry, OperatorStatus, ReportLevel,
};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod session;

use session::{load_commands, Session};

#[derive(Parser)]
#[command(name = "ordoplay-keytool")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run OrdoPlay action editor keyframe commands headlessly", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a list of commands against a session
    Run {
        /// Session file (RON)
        session: PathBuf,

        /// Command list (RON)
        #[arg(short, long)]
        commands: PathBuf,

        /// Keyframe settings (RON)
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Where to write the edited session (defaults to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Call operators interactively, asking before destructive ones
        #[arg(short, long)]
        interactive: bool,
    },

    /// List the available operators
    Operators {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the key range of a session
    Extents {
        /// Session file (RON)
        session: PathBuf,

        /// Keyframe settings (RON)
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("ordoplay_editor_action=debug,ordoplay_keytool=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("ordoplay_editor_action=info,ordoplay_keytool=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            session,
            commands,
            settings,
            output,
            interactive,
        } => cmd_run(&session, &commands, settings.as_deref(), output.as_deref(), interactive),

        Commands::Operators { json } => cmd_operators(json),

        Commands::Extents { session, settings } => cmd_extents(&session, settings.as_deref()),
    }
}

fn load_settings(path: Option<&Path>) -> Result<KeyframeSettings> {
    match path {
        Some(path) => Ok(KeyframeSettings::load(path)?),
        None => Ok(KeyframeSettings::default()),
    }
}

fn prompt(message: &str) -> bool {
    print!("{message} [y/N] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

fn cmd_run(
    session_path: &Path,
    commands_path: &Path,
    settings_path: Option<&Path>,
    output: Option<&Path>,
    interactive: bool,
) -> Result<()> {
    let settings = load_settings(settings_path)?;
    let mut session = Session::load(session_path)?;
    let commands = load_commands(commands_path)?;
    let mode = if interactive { CallMode::Invoke } else { CallMode::Exec };

    info!("Running {} commands on {}", commands.len(), session_path.display());

    let mut buffer = CopyBuffer::new();
    for command in &commands {
        let mut ctx = AnimContext::new(&mut session.document, &settings, &mut buffer)
            .with_scene(&mut session.scene)
            .with_view(&mut session.view)
            .with_content(session.content);
        if interactive {
            ctx = ctx.with_confirm(prompt);
        }

        let idname = command.operator().idname();
        let status = command.run(&mut ctx, mode)?;
        for report in ctx.reports.take() {
            match report.level {
                ReportLevel::Info => info!("{}: {}", idname, report.message),
                ReportLevel::Warning => warn!("{}: {}", idname, report.message),
            }
        }
        if status != OperatorStatus::Finished {
            warn!("{} returned {:?}", idname, status);
        }
    }

    let output = output.unwrap_or(session_path);
    session.save(output)?;
    info!("Wrote {}", output.display());
    Ok(())
}

fn operators_json(registry: &OperatorRegistry) -> serde_json::Value {
    registry
        .infos()
        .into_iter()
        .map(|op| {
            serde_json::json!({
                "idname": op.idname,
                "name": op.name,
                "description": op.description,
                "flags": op.flag_names(),
            })
        })
        .collect()
}

fn cmd_operators(json: bool) -> Result<()> {
    let registry = OperatorRegistry::new();

    if json {
        println!("{}", serde_json::to_string_pretty(&operators_json(&registry))?);
        return Ok(());
    }

    for op in registry.infos() {
        println!(
            "{:<28} {:<28} {:<16} {}",
            op.idname,
            op.name,
            op.flag_names().join("|"),
            op.description
        );
    }
    Ok(())
}

fn cmd_extents(session_path: &Path, settings_path: Option<&Path>) -> Result<()> {
    let settings = load_settings(settings_path)?;
    let mut session = Session::load(session_path)?;
    let mut buffer = CopyBuffer::new();

    let ctx = AnimContext::new(&mut session.document, &settings, &mut buffer)
        .with_scene(&mut session.scene)
        .with_content(session.content);
    let (min, max) = ctx.keyframe_extents();
    println!("{min} {max}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators_json_lists_flags() {
        let registry = OperatorRegistry::new();
        let list = operators_json(&registry);
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), registry.len());

        let jump = list.iter().find(|op| op["idname"] == "action.frame_jump").unwrap();
        assert_eq!(jump["flags"], serde_json::json!(["REGISTER"]));
        let delete = list.iter().find(|op| op["idname"] == "action.delete").unwrap();
        assert_eq!(delete["flags"], serde_json::json!(["REGISTER", "UNDO"]));
    }
}
