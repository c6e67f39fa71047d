//! Aggregation module for the cross-referenced knowledge base
//!
//! This module joins the upstream datasets into the published JSON files:
//! - The complete item, monster and prayer files
//! - The item search index and per-slot item files
//! - The item drop table with one resolved image per monster identity

mod cache;
mod drop_table;
mod image;

pub use cache::{CachedImage, ImageCache, MonsterIdentityKey};
pub use drop_table::{
    attach_images, build_drop_table, is_excluded, DropEntry, DropTable, DropTableItem,
    DropTableMonster,
};
pub use image::{
    default_strategies, resolve_first, ImageResolver, ImageStrategy, InfoboxImage, OgImageMeta,
    Resolution,
};

use crate::config::Config;
use crate::dataset::{load_items, load_monsters, load_prayers, ItemRecord, MonsterRecord};
use crate::http::build_http_client;
use crate::output::DocsWriter;
use crate::LoreboxError;
use std::path::PathBuf;

/// Counters and files of one aggregation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationReport {
    pub items: usize,
    pub monsters: usize,
    pub prayers: usize,

    /// Items in the drop table, when it was built
    pub drop_table_items: Option<usize>,

    /// Every file written, in write order
    pub files: Vec<PathBuf>,
}

/// Builds the drop table, resolves its images and writes it
///
/// # Arguments
///
/// * `config` - The Lorebox configuration
/// * `items` - The item dataset
/// * `monsters` - The monster dataset
///
/// # Returns
///
/// The table as written and the path it was written to
pub async fn generate_drop_table(
    config: &Config,
    items: &[ItemRecord],
    monsters: &[MonsterRecord],
) -> Result<(DropTable, PathBuf), LoreboxError> {
    let mut table = build_drop_table(items, monsters);
    tracing::info!(
        "Drop table joined: {} items, {} monster entries",
        table.items.len(),
        table.monster_entries()
    );

    let client = build_http_client(&config.user_agent, &config.http)?;
    let resolver = ImageResolver::new(client, &config.wiki.base_url, config.images.retry_limit)?;
    let mut cache = ImageCache::new();
    attach_images(&mut table, &resolver, &mut cache).await;

    let path = DocsWriter::new(&config.output.docs_dir).write_drop_table(&table)?;
    Ok((table, path))
}

/// Writes only the drop table
pub async fn run_drop_table(config: &Config) -> Result<AggregationReport, LoreboxError> {
    let items = load_items(&config.datasets.items)?;
    let monsters = load_monsters(&config.datasets.monsters)?;

    let (table, path) = generate_drop_table(config, &items, &monsters).await?;

    Ok(AggregationReport {
        items: items.len(),
        monsters: monsters.len(),
        prayers: 0,
        drop_table_items: Some(table.items.len()),
        files: vec![path],
    })
}

/// Runs the full aggregation
///
/// Any unreadable dataset or unwritable file aborts the run.
///
/// # Arguments
///
/// * `config` - The Lorebox configuration
/// * `skip_drop_table` - Write every file except the drop table
///
/// # Example
///
/// ```no_run
/// use lorebox::aggregate::run_aggregation;
/// use lorebox::config::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("lorebox.toml"))?;
/// let report = run_aggregation(&config, false).await?;
/// println!("{} files written", report.files.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_aggregation(
    config: &Config,
    skip_drop_table: bool,
) -> Result<AggregationReport, LoreboxError> {
    let items = load_items(&config.datasets.items)?;
    let monsters = load_monsters(&config.datasets.monsters)?;
    let prayers = load_prayers(&config.datasets.prayers)?;

    tracing::info!(
        "Loaded {} items, {} monsters, {} prayers",
        items.len(),
        monsters.len(),
        prayers.len()
    );

    let docs = DocsWriter::new(&config.output.docs_dir);
    let mut report = AggregationReport {
        items: items.len(),
        monsters: monsters.len(),
        prayers: prayers.len(),
        ..Default::default()
    };

    report.files.push(docs.write_items_complete(&items)?);
    report.files.push(docs.write_monsters_complete(&monsters)?);
    report.files.push(docs.write_prayers_complete(&prayers)?);
    report.files.push(docs.write_items_search(&items)?);
    report.files.extend(docs.write_slot_files(&items)?);

    if skip_drop_table {
        tracing::info!("Skipping the item drop table");
    } else {
        let (table, path) = generate_drop_table(config, &items, &monsters).await?;
        report.drop_table_items = Some(table.items.len());
        report.files.push(path);
    }

    tracing::info!(
        "Aggregation finished: {} files written to {}",
        report.files.len(),
        docs.docs_dir().display()
    );

    Ok(report)
}
