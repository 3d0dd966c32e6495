use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resume_parser::config::Config;
use resume_parser::db::{create_pool, ensure_schema};
use resume_parser::{
    file_type_from_path, ExtractorRegistry, InMemoryTaskStore, ParseOptions, PgTaskStore,
    TaskCoordinator, TaskStatus, TaskStore,
};

#[derive(Parser, Debug)]
#[command(version, about = "Parse resumes (txt, md, pdf, docx) into structured JSON")]
struct Cli {
    /// Resume files to parse
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// File-type tag for every file; defaults to each file's extension
    #[arg(long = "type")]
    file_type: Option<String>,

    /// Normalize whitespace before extraction
    #[arg(long)]
    clean: bool,

    /// Sections to leave out (personal_info, education, experience, skills, projects)
    #[arg(long, value_delimiter = ',')]
    skip: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting resume parser v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn TaskStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            ensure_schema(&pool).await?;
            Arc::new(PgTaskStore::new(pool))
        }
        None => {
            info!("DATABASE_URL not set, keeping tasks in memory");
            Arc::new(InMemoryTaskStore::new())
        }
    };

    let registry = Arc::new(ExtractorRegistry::with_defaults());
    info!("Registered file types: {:?}", registry.supported_types());

    let coordinator = TaskCoordinator::new(
        Arc::clone(&store),
        registry,
        config.coordinator_settings(),
    );

    let options = ParseOptions {
        clean_text: cli.clean,
        skip_sections: cli.skip.clone(),
        ..Default::default()
    };

    let mut submitted = Vec::with_capacity(cli.files.len());
    let mut rejected = 0usize;
    for path in &cli.files {
        let file_type = cli
            .file_type
            .clone()
            .unwrap_or_else(|| file_type_from_path(path));
        let resume_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        match coordinator
            .submit(path, &file_type, &resume_id, &config.user_id, options.clone())
            .await
        {
            Ok(task) => submitted.push(task.id),
            Err(e) => {
                error!("Rejected {}: {e}", path.display());
                rejected += 1;
            }
        }
    }

    // Drain the queue so every accepted task reaches a terminal state.
    coordinator.shutdown().await;

    let mut failed = 0usize;
    for id in submitted {
        let task = store.get_task(id).await?;
        if task.status == TaskStatus::Failed {
            failed += 1;
        }
        println!("{}", serde_json::to_string_pretty(&task)?);
    }

    if rejected + failed > 0 {
        bail!(
            "{} of {} files could not be parsed",
            rejected + failed,
            cli.files.len()
        );
    }
    Ok(())
}
