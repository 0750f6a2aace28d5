// src/graph/clean.rs

use anyhow::{Context, Result};
use tracing::info;

use crate::tasks::BuildContext;

/// Recursively remove the output root. A missing root is not an error.
pub fn clean_output(ctx: &BuildContext) -> Result<()> {
    let root = ctx.output_root();
    ctx.fs()
        .remove_dir_all(&root)
        .with_context(|| format!("removing output root {root:?}"))?;
    info!(path = ?root, "cleaned output");
    Ok(())
}
