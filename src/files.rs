//! `docsite files`: the output catalogue as a client sees it.
//!
//! Fetches over HTTP through [`ManifestCache`] and the views, so it goes
//! through the same coalescing and degradation paths a docs page would.

use crate::{
    config::SiteConfig,
    log,
    outputs::{
        AllTypesView, FileItem, HttpSource, LinkBuilder, ManifestCache, ManifestSource, OutputType,
        SummaryView, TypeView,
    },
};
use anyhow::{Context, Result, bail};
use std::io::{self, Write};

pub fn list_files(config: &SiteConfig, output: Option<OutputType>, counts: bool) -> Result<()> {
    let source = HttpSource::new(&config.outputs.base_url, &config.outputs.summary)?;
    let cache = ManifestCache::new(source, LinkBuilder::new(&config.github));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let mut out = io::stdout().lock();
    runtime.block_on(async {
        match (counts, output) {
            (true, _) => print_counts(&cache, &mut out).await,
            (false, Some(output)) => print_type(&cache, output, &mut out).await,
            (false, None) => print_all(&cache, &mut out).await,
        }
    })
}

async fn print_counts<S>(cache: &ManifestCache<S>, out: &mut impl Write) -> Result<()>
where
    S: ManifestSource + 'static,
{
    let mut view = SummaryView::new(cache);
    view.load().await;
    if let Some(err) = view.error() {
        bail!("summary unavailable: {err}");
    }

    for output in OutputType::ALL {
        writeln!(
            out,
            "{:<10} {:>6} files {:>4} categories",
            output.slug(),
            view.count(output),
            view.categories(output)
        )?;
    }
    writeln!(out, "{:<10} {:>6} files", "total", view.total_files())?;
    Ok(())
}

async fn print_type<S>(cache: &ManifestCache<S>, output: OutputType, out: &mut impl Write) -> Result<()>
where
    S: ManifestSource + 'static,
{
    let mut view = TypeView::new(cache, output);
    view.load().await;
    if let Some(err) = view.error() {
        bail!("{output}: {err}");
    }

    for category in view.categories() {
        writeln!(out, "{category}")?;
        for file in view.files_in(category) {
            write_file(out, file)?;
        }
    }
    Ok(())
}

async fn print_all<S>(cache: &ManifestCache<S>, out: &mut impl Write) -> Result<()>
where
    S: ManifestSource + 'static,
{
    let mut view = AllTypesView::new(cache);
    view.load().await;
    if let Some(err) = view.error() {
        log!("fetch"; "{err}");
    }

    for (output, count) in view.count_by_type() {
        if count == 0 {
            continue;
        }
        writeln!(out, "{output} ({count})")?;
        for file in view.files(output) {
            write_file(out, file)?;
        }
    }
    writeln!(
        out,
        "{} files in {} categories",
        view.total_files(),
        view.categories().len()
    )?;
    Ok(())
}

fn write_file(out: &mut impl Write, file: &FileItem) -> io::Result<()> {
    let title = file.title.as_deref().unwrap_or(&file.name);
    writeln!(out, "  {}  {title}  {}", file.path, file.url)?;
    if let Some(colab) = &file.colab_url {
        writeln!(out, "      colab: {colab}")?;
    }
    Ok(())
}
