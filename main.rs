/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::path::PathBuf;
use std::process::ExitCode;

use bpaf::Bpaf;
use viewhost::services::persistence::load_pane_history_json;
use viewhost::{ContentClassifier, MimeClassifier, RendererRegistry};

/// Inspect renderer selection and saved pane histories.
#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version)]
enum Command {
    /// Rank the renderers able to display a content type
    #[bpaf(command)]
    Resolve {
        /// Renderer table to use instead of the user configuration
        #[bpaf(short, long, argument("PATH"))]
        registry: Option<PathBuf>,
        /// Implementation to rank first when it is compatible
        #[bpaf(long, argument("NAME"))]
        hint: Option<String>,
        /// Content type, e.g. text/html
        #[bpaf(positional("CONTENT_TYPE"))]
        content_type: String,
    },
    /// Classify an address and rank the renderers for it
    #[bpaf(command)]
    Classify {
        /// Renderer table to use instead of the user configuration
        #[bpaf(short, long, argument("PATH"))]
        registry: Option<PathBuf>,
        #[bpaf(positional("ADDRESS"))]
        address: String,
    },
    /// Print a pane history saved as JSON
    #[bpaf(command)]
    History {
        #[bpaf(positional("FILE"))]
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(command().run()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Resolve {
            registry,
            hint,
            content_type,
        } => print_resolution(&load_registry(registry)?, &content_type, hint.as_deref()),
        Command::Classify { registry, address } => {
            let content_type = MimeClassifier.classify(&address);
            println!("{address}: {content_type}");
            print_resolution(&load_registry(registry)?, &content_type, None)
        }
        Command::History { file } => {
            let history = load_pane_history_json(&file)?;
            if let Some(view_name) = history.view_name.as_deref() {
                println!("view: {view_name}");
            }
            for (index, entry) in history.entries.iter().enumerate() {
                let marker = if index as u64 == history.cursor { '>' } else { ' ' };
                println!(
                    "{marker} {index:>3} {} [{} via {}]",
                    entry.displayed_address, entry.content_type, entry.implementation_name
                );
                if entry.displayed_address != entry.address {
                    println!("        requested {}", entry.address);
                }
            }
            Ok(())
        }
    }
}

fn load_registry(path: Option<PathBuf>) -> Result<RendererRegistry, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => RendererRegistry::load_from_path(&path)?,
        None => RendererRegistry::load_or_default(),
    })
}

fn print_resolution(
    registry: &RendererRegistry,
    content_type: &str,
    hint: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let resolution = registry.resolve(content_type, hint);
    if resolution.is_empty() {
        return Err(format!("no renderer can display {content_type}").into());
    }
    for (rank, candidate) in resolution.candidates.iter().enumerate() {
        println!(
            "{:>2}. {} (preference {})",
            rank + 1,
            candidate.name,
            candidate.preference_for(content_type).unwrap_or(0)
        );
    }
    for application in &resolution.host_application {
        println!("    host application: {}", application.name);
    }
    Ok(())
}
