//! CLI entry point for nikola-rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nikola_rs::commands::build::BuildOptions;
use nikola_rs::Site;

#[derive(Parser)]
#[command(name = "nikola-rs")]
#[command(version)]
#[command(about = "A fast static site generator for Nikola-style Markdown posts", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render all posts and listings
    #[command(alias = "b")]
    Build {
        /// Directory holding the markdown posts
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Directory to write the site to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Remove the output directory first
        #[arg(long)]
        clean: bool,

        /// Exit with status 2 when any post failed
        #[arg(long)]
        strict: bool,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Comma separated tags
        #[arg(short, long, default_value = "")]
        tags: String,

        /// Category of the post
        #[arg(short = 'C', long)]
        category: Option<String>,
    },

    /// Delete the output directory
    Clean,

    /// List site information
    List {
        /// Type of content to list (post, tag, category)
        #[arg(default_value = "post")]
        r#type: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "nikola_rs=debug,info"
    } else {
        "nikola_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Build {
            input,
            output,
            clean,
            strict,
        } => {
            let site = Site::new(&base_dir)?.with_dirs(input, output);
            tracing::info!("Building {:?} into {:?}", site.source_dir, site.output_dir);

            let report = nikola_rs::commands::build::run(&site, BuildOptions { clean }).await?;
            print!("{}", report);

            let code = report.exit_code(strict);
            if code != 0 {
                std::process::exit(code);
            }
        }

        Commands::New {
            title,
            tags,
            category,
        } => {
            let site = Site::new(&base_dir)?;
            let path =
                nikola_rs::commands::new::create_post(&site, &title, &tags, category.as_deref())?;
            println!("Created: {}", path.display());
        }

        Commands::Clean => {
            let site = Site::new(&base_dir)?;
            nikola_rs::commands::clean::run(&site)?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let site = Site::new(&base_dir)?;
            nikola_rs::commands::list::run(&site, &r#type).await?;
        }
    }

    Ok(())
}
