//! Rewrites `documents.file_size` from the files actually present in the
//! upload directory. Documents whose file is missing are left untouched.

use anyhow::{Context, Result};
use dotenvy::dotenv;
use erms::config::Config;
use erms::db::init_db;
use erms::utils::files::{format_file_size, public_path};
use tracing::{info, warn};

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt().with_target(false).init();

    let config = Config::from_env()?;
    let pool = init_db(&config.database_url, 1)
        .await
        .context("failed to connect to the database")?;

    let entries = std::fs::read_dir(&config.upload_dir)
        .with_context(|| format!("cannot read upload directory {}", config.upload_dir))?;

    let mut updated = 0u64;
    for entry in entries {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }

        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            warn!(path = ?entry.path(), "Skipping non UTF-8 file name");
            continue;
        };

        let size = format_file_size(metadata.len());
        let result = sqlx::query("UPDATE documents SET file_size = ? WHERE file_path = ?")
            .bind(&size)
            .bind(public_path(&config.uploads_url_prefix, &name))
            .execute(&pool)
            .await?;

        if result.rows_affected() > 0 {
            info!(file = %name, file_size = %size, rows = result.rows_affected(), "Updated document size");
            updated += result.rows_affected();
        }
    }

    info!(updated, "Finished recomputing document sizes");
    Ok(())
}
