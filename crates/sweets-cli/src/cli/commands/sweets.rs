//! Inventory command handlers.
//!
//! Every change is followed by a fresh listing; nothing is patched locally.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use sweets_core::{SweetDraft, View};
use sweets_types::{SearchFilter, SweetId};

use crate::app::App;
use crate::render;

pub async fn list(app: &mut App) -> Result<()> {
    app.navigate(View::Inventory).await
}

pub async fn search(app: &mut App, filter: &SearchFilter) -> Result<()> {
    let result = app.sweets().search(filter).await;
    let sweets = app.settle(result)?;

    if sweets.is_empty() {
        println!("No sweets match the search.");
    } else {
        println!("{}", render::inventory(&sweets));
    }
    Ok(())
}

pub async fn show(app: &mut App, id: SweetId) -> Result<()> {
    let result = app.sweets().get(id).await;
    let sweet = app.settle(result)?;

    println!("{}", render::detail(&sweet));
    Ok(())
}

pub async fn create(app: &mut App, draft: &SweetDraft) -> Result<()> {
    let result = app.sweets().create(draft).await;
    let sweet = app.settle(result)?;

    println!("✓ Created {} (#{})", sweet.name, sweet.id);
    app.navigate(View::Inventory).await
}

pub async fn update(app: &mut App, id: SweetId, draft: &SweetDraft) -> Result<()> {
    let result = app.sweets().update(id, draft).await;
    let sweet = app.settle(result)?;

    println!("✓ Updated {} (#{})", sweet.name, sweet.id);
    app.navigate(View::Inventory).await
}

pub async fn delete(app: &mut App, id: SweetId) -> Result<()> {
    let result = app.sweets().delete(id).await;
    app.settle(result)?;

    println!("✓ Deleted sweet #{id}");
    app.navigate(View::Inventory).await
}

pub async fn export(app: &mut App, output: Option<&Path>) -> Result<()> {
    let result = app.sweets().export_report().await;
    let csv = app.settle(result)?;

    match output {
        Some(path) => {
            fs::write(path, &csv)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("✓ Saved report to {}", path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}
