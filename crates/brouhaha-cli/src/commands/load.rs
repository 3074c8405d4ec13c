use anyhow::{Context, Result};
use std::path::Path;

use super::context::AppContext;

pub async fn run(context: &AppContext, id: &str, out: &Path) -> Result<()> {
    let map = context.archive.load(id).await?;

    tokio::fs::write(out, map.as_bytes())
        .await
        .with_context(|| format!("Failed to write {}", out.display()))?;

    println!("Wrote {} bytes to {}", map.len(), out.display());
    Ok(())
}
