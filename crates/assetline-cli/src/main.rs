// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use assetline::TaskKind;
use assetline_cli::commands::{self, open_project, server_addr};
use assetline_cli::output;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "assetline")]
#[command(author = "Maravilla Labs")]
#[command(version)]
#[command(about = "Front-end asset builds with a live-reload dev server", long_about = None)]
struct Cli {
    /// Project root containing the `dev` tree (defaults to the current directory)
    #[arg(long, global = true, default_value = ".")]
    folder: PathBuf,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Quiet mode: only show errors (useful for CI)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch, rebuild and serve with live reload (default)
    Dev {
        /// Port to run the dev server on
        #[arg(short, long)]
        port: Option<u16>,
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Run every task once before serving
        #[arg(long)]
        initial_build: bool,
    },
    /// Run every task once
    Build,
    /// Remove the dist tree
    Clean,
    /// Serve dist without watching or building
    Serve {
        /// Port to run the server on
        #[arg(short, long)]
        port: Option<u16>,
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },
    /// Watch files and rebuild on change (no server)
    Watch,
    /// Copy markup pages
    Html,
    /// Compile stylesheets
    Scss,
    /// Bundle and minify scripts
    Javascript,
    /// Merge JSON documents
    Json,
    /// Copy fonts
    Fonts,
    /// Copy plugins
    Plugins,
    /// Optimize images
    Images,
    /// Copy icons
    Icons,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with the specified log level
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let (project, config) = open_project(&cli.folder)?;
    if !cli.quiet {
        output::banner(project.root());
    }

    let command = cli.command.unwrap_or(Commands::Dev {
        port: None,
        host: None,
        initial_build: false,
    });

    let task = |kind| commands::task::run(&project, &config, kind, cli.quiet);

    match command {
        Commands::Dev {
            port,
            host,
            initial_build,
        } => {
            let addr = server_addr(&config, host, port);
            commands::dev::run(&project, &config, &addr, initial_build, cli.quiet).await
        }
        Commands::Build => commands::build::run(&project, &config, cli.quiet),
        Commands::Clean => commands::clean::run(&project, cli.quiet),
        Commands::Serve { port, host } => {
            let addr = server_addr(&config, host, port);
            commands::serve::run(&project, &addr, cli.quiet).await
        }
        Commands::Watch => commands::watch::run(&project, &config, cli.quiet).await,
        Commands::Html => task(TaskKind::Html),
        Commands::Scss => task(TaskKind::Styles),
        Commands::Javascript => task(TaskKind::Scripts),
        Commands::Json => task(TaskKind::Json),
        Commands::Fonts => task(TaskKind::Fonts),
        Commands::Plugins => task(TaskKind::Plugins),
        Commands::Images => task(TaskKind::Images),
        Commands::Icons => task(TaskKind::Icons),
    }
}
