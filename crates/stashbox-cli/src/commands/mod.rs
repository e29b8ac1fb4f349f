//! CLI command definitions and dispatch.

pub mod migrate;
pub mod node;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use stashbox_core::config::AppConfig;
use stashbox_core::error::AppError;
use stashbox_core::types::UserId;
use stashbox_database::connection::is_memory_url;
use stashbox_database::{DatabasePool, MemoryNodeRepository, NodeRepository, PgNodeRepository};
use stashbox_service::{FileTreeService, RequestContext};

use crate::output::OutputFormat;

/// Stashbox file tree administration
#[derive(Debug, Parser)]
#[command(name = "stashbox", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment overlay (`config/{env}.toml`)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Act as this user (falls back to `STASHBOX_USER`)
    #[arg(short, long)]
    pub user: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate(migrate::MigrateArgs),
    /// List the children of a folder
    Ls(node::LsArgs),
    /// Show the nested tree
    Tree(node::TreeArgs),
    /// Create a folder
    Mkdir(node::MkdirArgs),
    /// Rename or move a node
    Mv(node::MvArgs),
    /// Toggle the starred flag
    Star(node::IdArgs),
    /// Toggle the trash flag
    Trash(node::IdArgs),
    /// Trash a node, or remove it with its subtree
    Rm(node::RmArgs),
    /// Permanently remove every trashed node
    EmptyTrash,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.env)?;

        if let Commands::Migrate(args) = &self.command {
            return migrate::execute(args, &config).await;
        }

        let service = build_service(&config).await?;
        let ctx = self.context()?;

        match &self.command {
            Commands::Migrate(_) => Ok(()),
            Commands::Ls(args) => node::ls(&service, &ctx, args, self.format).await,
            Commands::Tree(args) => node::tree(&service, &ctx, args, self.format).await,
            Commands::Mkdir(args) => node::mkdir(&service, &ctx, args, self.format).await,
            Commands::Mv(args) => node::mv(&service, &ctx, args, self.format).await,
            Commands::Star(args) => node::star(&service, &ctx, args, self.format).await,
            Commands::Trash(args) => node::trash(&service, &ctx, args, self.format).await,
            Commands::Rm(args) => node::rm(&service, &ctx, args).await,
            Commands::EmptyTrash => node::empty_trash(&service, &ctx).await,
        }
    }

    fn context(&self) -> Result<RequestContext, AppError> {
        let raw = match &self.user {
            Some(user) => user.clone(),
            None => std::env::var("STASHBOX_USER")
                .map_err(|_| AppError::authentication("Pass --user or set STASHBOX_USER"))?,
        };
        Ok(RequestContext::new(UserId::parse(raw)?))
    }
}

/// Helper: build the file tree service over the configured store
pub async fn build_service(config: &AppConfig) -> Result<FileTreeService, AppError> {
    let repo: Arc<dyn NodeRepository> = if is_memory_url(&config.database.url) {
        tracing::warn!("Using the in-memory store; changes are discarded on exit");
        Arc::new(MemoryNodeRepository::new())
    } else {
        let pool = DatabasePool::connect(&config.database).await?;
        Arc::new(PgNodeRepository::new(pool.into_pool()))
    };
    Ok(FileTreeService::new(repo, config.tree.clone()))
}
