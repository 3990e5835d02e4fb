//! Sitemap generation.
//!
//! One page per topic document in the data directory, plus the homepage and
//! the docs landing page.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://mathhook.org/docs/limits</loc>
//!     <lastmod>2025-01-01</lastmod>
//!     <changefreq>monthly</changefreq>
//!     <priority>0.8</priority>
//!   </url>
//! </urlset>
//! ```

use crate::{config::SiteConfig, docs::DataRoot, log};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use std::{fs, path::Path};
use walkdir::WalkDir;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Write the sitemap to `[sitemap].path`.
pub fn build_sitemap(config: &SiteConfig) -> Result<()> {
    let data = DataRoot::resolve(config.get_root(), &config.data);
    let xml = render_sitemap(config, &data.dir)?;
    let path = &config.sitemap.path;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, xml).with_context(|| format!("Failed to write sitemap to {}", path.display()))?;

    log!("sitemap"; "{}", path.display());
    Ok(())
}

/// Sitemap XML for the topics currently in `data_dir`.
pub fn render_sitemap(config: &SiteConfig, data_dir: &Path) -> Result<String> {
    let today = Utc::now().date_naive();
    let sitemap = Sitemap::from_data_dir(data_dir, &config.base.url, &config.sitemap.docs_prefix, today)
        .with_context(|| format!("Failed to list {}", data_dir.display()))?;
    Ok(sitemap.into_xml())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeFreq {
    Weekly,
    Monthly,
}

impl ChangeFreq {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

struct Sitemap {
    urls: Vec<UrlEntry>,
}

struct UrlEntry {
    loc: String,
    /// YYYY-MM-DD
    lastmod: Option<String>,
    changefreq: ChangeFreq,
    priority: f32,
}

impl Sitemap {
    fn from_data_dir(
        dir: &Path,
        base_url: &str,
        docs_prefix: &str,
        today: NaiveDate,
    ) -> Result<Self, walkdir::Error> {
        let base_url = base_url.trim_end_matches('/');
        let docs = format!("/{}", docs_prefix.trim_matches('/'));
        let today = Some(today.format("%Y-%m-%d").to_string());

        let mut urls = vec![
            UrlEntry {
                loc: format!("{base_url}/"),
                lastmod: today.clone(),
                changefreq: ChangeFreq::Weekly,
                priority: 1.0,
            },
            UrlEntry {
                loc: format!("{base_url}{docs}"),
                lastmod: today,
                changefreq: ChangeFreq::Weekly,
                priority: 0.9,
            },
        ];

        let mut topics = Vec::new();
        if dir.is_dir() {
            for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
                let entry = entry?;
                let path = entry.path();
                if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "json") {
                    continue;
                }
                let Some(topic) = path.file_stem().and_then(|stem| stem.to_str()) else {
                    continue;
                };
                if topic.starts_with('_') {
                    continue;
                }
                let lastmod = entry
                    .metadata()
                    .ok()
                    .and_then(|meta| meta.modified().ok())
                    .map(|time| DateTime::<Utc>::from(time).format("%Y-%m-%d").to_string());
                topics.push((topic.to_owned(), lastmod));
            }
        } else {
            log!("sitemap"; "{} does not exist, listing no topics", dir.display());
        }

        topics.sort_by(|a, b| a.0.cmp(&b.0));
        urls.extend(topics.into_iter().map(|(topic, lastmod)| UrlEntry {
            loc: format!("{base_url}{docs}/{}", urlencoding::encode(&topic)),
            lastmod,
            changefreq: ChangeFreq::Monthly,
            priority: 0.8,
        }));

        Ok(Self { urls })
    }

    fn into_xml(self) -> String {
        let mut xml = String::with_capacity(256 + self.urls.len() * 160);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
        xml.push('\n');

        for entry in self.urls {
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
            if let Some(lastmod) = entry.lastmod {
                xml.push_str(&format!("    <lastmod>{lastmod}</lastmod>\n"));
            }
            xml.push_str(&format!(
                "    <changefreq>{}</changefreq>\n",
                entry.changefreq.as_str()
            ));
            xml.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
