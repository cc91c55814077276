use clap::Subcommand;

/// Sub-commands available under `db`.
#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check that the database answers
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Upsert the PKD sections and the monitored tags
    Seed,
}

pub(crate) async fn run(
    pool: &sqlx::PgPool,
    config: &pkdscore_core::AppConfig,
    command: DbCommands,
) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            pkdscore_db::ping(pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = pkdscore_db::run_migrations(pool).await?;
            println!("applied {applied} migrations");
        }
        DbCommands::Seed => run_seed(pool, config).await?,
    }
    Ok(())
}

async fn run_seed(pool: &sqlx::PgPool, config: &pkdscore_core::AppConfig) -> anyhow::Result<()> {
    let sections = pkdscore_db::seed_sections(pool, pkdscore_core::SECTIONS).await?;

    let tags_file = pkdscore_core::load_tags(&config.tags_path)?;
    let tags = pkdscore_db::seed_tags(pool, &tags_file.tags).await?;

    tracing::info!(sections, tags, path = %config.tags_path.display(), "seed complete");
    println!("seeded {sections} sections and {tags} tags");
    Ok(())
}
