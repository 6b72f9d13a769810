//! Reports derived from parsed sitemap entries: URL patterns, protocol
//! validation, per-domain summaries, and update-frequency statistics.

use chrono::{DateTime, NaiveDate, Utc};
use itertools::Itertools;
use serde::Serialize;
use std::collections::HashMap;
use url::Url;

use super::parser::{SitemapDocument, SitemapKind, UrlEntry};

/// Sitemap protocol limit: maximum URLs per file.
pub const MAX_URLS_PER_SITEMAP: usize = 50_000;
/// Sitemap protocol limit: maximum uncompressed file size in bytes.
pub const MAX_SITEMAP_BYTES: usize = 50 * 1024 * 1024;
/// Size above which a warning is reported even though the file is valid.
pub const LARGE_SITEMAP_BYTES: usize = 10 * 1024 * 1024;
/// Sitemap protocol limit: maximum URL length.
pub const MAX_URL_LENGTH: usize = 2048;
/// Number of leading URLs checked for format violations.
const URL_FORMAT_SAMPLE: usize = 100;
/// Number of format violations included in a validation report.
const MAX_REPORTED_URL_ISSUES: usize = 5;
/// Number of distribution buckets kept per report section.
const TOP_N: usize = 10;

/// A named bucket with an occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountEntry {
    pub name: String,
    pub count: usize,
}

/// Distribution report over the URLs of a sitemap.
#[derive(Debug, Clone, Serialize)]
pub struct UrlPatterns {
    pub total_urls: usize,
    pub unique_domains: usize,
    pub domain_distribution: Vec<CountEntry>,
    pub path_patterns: Vec<CountEntry>,
    pub file_extensions: Vec<CountEntry>,
}

/// Result of checking a sitemap against the protocol limits.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub total_urls: usize,
    pub file_size_mb: f64,
    pub sitemap_type: SitemapKind,
    pub validation_issues: Vec<String>,
    pub warnings: Vec<String>,
}

/// Per-domain roll-up with bounded samples.
#[derive(Debug, Clone, Serialize)]
pub struct DomainEntry {
    pub domain: String,
    pub count: usize,
    pub sample_urls: Vec<String>,
    pub paths: Vec<String>,
    pub schemes: Vec<String>,
}

/// Update-frequency statistics across a sitemap's entries.
#[derive(Debug, Clone, Serialize)]
pub struct UpdatePatterns {
    pub changefreq_distribution: Vec<CountEntry>,
    pub priority_distribution: Vec<CountEntry>,
    pub lastmod_analysis: LastmodStats,
}

/// `lastmod` coverage and recency statistics.
#[derive(Debug, Clone, Serialize)]
pub struct LastmodStats {
    pub total_with_lastmod: usize,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
    pub recent_updates_7d: usize,
    pub recent_updates_30d: usize,
}

/// Per-domain update roll-up over entries carrying a `lastmod`.
#[derive(Debug, Clone, Serialize)]
pub struct DomainUpdateEntry {
    pub domain: String,
    pub count: usize,
    pub latest_update: Option<DateTime<Utc>>,
    pub changefreqs: Vec<String>,
    pub avg_priority: Option<f64>,
}

/// How many entries carry each optional metadata field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataCoverage {
    pub urls_with_lastmod: usize,
    pub urls_with_changefreq: usize,
    pub urls_with_priority: usize,
}

/// A recently updated URL, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct RecentUpdate {
    pub url: String,
    pub lastmod: String,
    pub changefreq: Option<String>,
    pub priority: Option<String>,
}

/// Analyze domain, path, and extension distributions over raw URLs.
/// Unparseable URLs are skipped.
#[inline]
pub fn analyze_url_patterns(urls: &[String]) -> UrlPatterns {
    let mut domains: HashMap<String, usize> = HashMap::new();
    let mut paths: HashMap<String, usize> = HashMap::new();
    let mut extensions: HashMap<String, usize> = HashMap::new();

    for raw in urls {
        let Ok(url) = Url::parse(raw) else {
            continue;
        };

        if let Some(host) = url.host_str() {
            *domains.entry(host.to_string()).or_default() += 1;
        }

        *paths.entry(first_path_segment(&url)).or_default() += 1;

        if let Some((_, ext)) = url.path().rsplit_once('.') {
            *extensions.entry(ext.to_lowercase()).or_default() += 1;
        }
    }

    UrlPatterns {
        total_urls: urls.len(),
        unique_domains: domains.len(),
        domain_distribution: top_counts(domains, TOP_N),
        path_patterns: top_counts(paths, TOP_N),
        file_extensions: top_counts(extensions, usize::MAX),
    }
}

/// Validate a parsed sitemap plus its wire size against the protocol limits.
#[inline]
pub fn validate_sitemap(document: &SitemapDocument, content_bytes: usize) -> ValidationReport {
    let mut issues = Vec::new();
    let mut warnings = Vec::new();
    let urls = document.urls();

    if urls.len() > MAX_URLS_PER_SITEMAP {
        issues.push(format!(
            "URL count over limit: {} > {}",
            urls.len(),
            MAX_URLS_PER_SITEMAP
        ));
    }

    let size_mb = content_bytes as f64 / (1024.0 * 1024.0);
    if content_bytes > MAX_SITEMAP_BYTES {
        issues.push(format!("File size over limit: {:.1}MB > 50MB", size_mb));
    } else if content_bytes > LARGE_SITEMAP_BYTES {
        warnings.push(format!("Large sitemap file: {:.1}MB", size_mb));
    }

    let mut url_issues = Vec::new();
    for (i, url) in urls.iter().take(URL_FORMAT_SAMPLE).enumerate() {
        if url.len() > MAX_URL_LENGTH {
            url_issues.push(format!("URL #{} exceeds maximum length", i + 1));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            url_issues.push(format!("URL #{} has an invalid scheme", i + 1));
        }
    }
    issues.extend(url_issues.into_iter().take(MAX_REPORTED_URL_ISSUES));

    if document.kind == SitemapKind::Unknown {
        issues.push("Unrecognized sitemap format".to_string());
    }

    ValidationReport {
        is_valid: issues.is_empty(),
        total_urls: urls.len(),
        file_size_mb: size_mb,
        sitemap_type: document.kind,
        validation_issues: issues,
        warnings,
    }
}

/// Roll URLs up by domain with bounded per-domain samples, most frequent
/// domains first.
#[inline]
pub fn domain_summary(urls: &[String], sample_limit: usize) -> Vec<DomainEntry> {
    const MAX_PATHS_PER_DOMAIN: usize = 20;

    struct Accumulator {
        count: usize,
        sample_urls: Vec<String>,
        paths: Vec<String>,
        schemes: Vec<String>,
    }

    let mut by_domain: HashMap<String, Accumulator> = HashMap::new();

    for raw in urls {
        let Ok(url) = Url::parse(raw) else {
            continue;
        };
        let Some(host) = url.host_str() else {
            continue;
        };

        let acc = by_domain
            .entry(host.to_string())
            .or_insert_with(|| Accumulator {
                count: 0,
                sample_urls: Vec::new(),
                paths: Vec::new(),
                schemes: Vec::new(),
            });

        acc.count += 1;

        let scheme = url.scheme().to_string();
        if !acc.schemes.contains(&scheme) {
            acc.schemes.push(scheme);
        }

        let segment = first_path_segment(&url);
        if !acc.paths.contains(&segment) && acc.paths.len() < MAX_PATHS_PER_DOMAIN {
            acc.paths.push(segment);
        }

        if acc.sample_urls.len() < sample_limit {
            acc.sample_urls.push(raw.clone());
        }
    }

    by_domain
        .into_iter()
        .sorted_by(|a, b| b.1.count.cmp(&a.1.count).then_with(|| a.0.cmp(&b.0)))
        .map(|(domain, acc)| DomainEntry {
            domain,
            count: acc.count,
            sample_urls: acc.sample_urls,
            paths: acc.paths,
            schemes: acc.schemes,
        })
        .collect()
}

/// Analyze changefreq, priority, and lastmod statistics. `now` anchors the
/// recency windows.
#[inline]
pub fn analyze_update_patterns(entries: &[UrlEntry], now: DateTime<Utc>) -> UpdatePatterns {
    let mut changefreqs: HashMap<String, usize> = HashMap::new();
    let mut priorities: HashMap<String, usize> = HashMap::new();
    let mut stats = LastmodStats {
        total_with_lastmod: 0,
        earliest: None,
        latest: None,
        recent_updates_7d: 0,
        recent_updates_30d: 0,
    };

    for entry in entries {
        if let Some(changefreq) = &entry.changefreq {
            *changefreqs.entry(changefreq.clone()).or_default() += 1;
        }

        if let Some(priority) = &entry.priority {
            if let Ok(value) = priority.parse::<f64>() {
                // Bucketed to one decimal, truncating toward zero.
                let bucket = format!("{:.1}", (value * 10.0).trunc() / 10.0);
                *priorities.entry(bucket).or_default() += 1;
            }
        }

        if let Some(lastmod) = &entry.lastmod {
            stats.total_with_lastmod += 1;

            if let Some(date) = parse_lastmod(lastmod) {
                if stats.earliest.is_none_or(|earliest| date < earliest) {
                    stats.earliest = Some(date);
                }
                if stats.latest.is_none_or(|latest| date > latest) {
                    stats.latest = Some(date);
                }

                let age_days = (now - date).num_days();
                if (0..=7).contains(&age_days) {
                    stats.recent_updates_7d += 1;
                }
                if (0..=30).contains(&age_days) {
                    stats.recent_updates_30d += 1;
                }
            }
        }
    }

    UpdatePatterns {
        changefreq_distribution: top_counts(changefreqs, usize::MAX),
        priority_distribution: top_counts(priorities, usize::MAX),
        lastmod_analysis: stats,
    }
}

/// Roll update metadata up by domain. Only entries with a `lastmod` count;
/// domains are ranked by entry count and capped at the top ten.
#[inline]
pub fn domain_update_summary(entries: &[UrlEntry]) -> Vec<DomainUpdateEntry> {
    struct Accumulator {
        count: usize,
        latest: Option<DateTime<Utc>>,
        changefreqs: Vec<String>,
        priorities: Vec<f64>,
    }

    let mut by_domain: HashMap<String, Accumulator> = HashMap::new();

    for entry in entries {
        let Some(lastmod) = &entry.lastmod else {
            continue;
        };
        let Ok(url) = Url::parse(&entry.loc) else {
            continue;
        };
        let Some(host) = url.host_str() else {
            continue;
        };

        let acc = by_domain
            .entry(host.to_string())
            .or_insert_with(|| Accumulator {
                count: 0,
                latest: None,
                changefreqs: Vec::new(),
                priorities: Vec::new(),
            });

        acc.count += 1;

        if let Some(changefreq) = &entry.changefreq {
            if !acc.changefreqs.contains(changefreq) {
                acc.changefreqs.push(changefreq.clone());
            }
        }

        if let Some(priority) = &entry.priority {
            if let Ok(value) = priority.parse::<f64>() {
                acc.priorities.push(value);
            }
        }

        if let Some(date) = parse_lastmod(lastmod) {
            if acc.latest.is_none_or(|latest| date > latest) {
                acc.latest = Some(date);
            }
        }
    }

    by_domain
        .into_iter()
        .sorted_by(|a, b| b.1.count.cmp(&a.1.count).then_with(|| a.0.cmp(&b.0)))
        .take(TOP_N)
        .map(|(domain, acc)| {
            let mut changefreqs = acc.changefreqs;
            changefreqs.sort_unstable();
            let avg_priority = (!acc.priorities.is_empty())
                .then(|| acc.priorities.iter().sum::<f64>() / acc.priorities.len() as f64);
            DomainUpdateEntry {
                domain,
                count: acc.count,
                latest_update: acc.latest,
                changefreqs,
                avg_priority,
            }
        })
        .collect()
}

/// Count entries carrying each optional metadata field.
#[inline]
pub fn metadata_coverage(entries: &[UrlEntry]) -> MetadataCoverage {
    MetadataCoverage {
        urls_with_lastmod: entries.iter().filter(|e| e.lastmod.is_some()).count(),
        urls_with_changefreq: entries.iter().filter(|e| e.changefreq.is_some()).count(),
        urls_with_priority: entries.iter().filter(|e| e.priority.is_some()).count(),
    }
}

/// Entries with a parseable `lastmod`, sorted newest first, bounded.
#[inline]
pub fn recent_updates(entries: &[UrlEntry], limit: usize) -> Vec<RecentUpdate> {
    entries
        .iter()
        .filter_map(|entry| {
            let lastmod = entry.lastmod.as_ref()?;
            let parsed = parse_lastmod(lastmod)?;
            Some((parsed, entry, lastmod))
        })
        .sorted_by(|a, b| b.0.cmp(&a.0))
        .take(limit)
        .map(|(_, entry, lastmod)| RecentUpdate {
            url: entry.loc.clone(),
            lastmod: lastmod.clone(),
            changefreq: entry.changefreq.clone(),
            priority: entry.priority.clone(),
        })
        .collect()
}

/// Parse a `lastmod` value: RFC 3339 when it contains a time component,
/// otherwise a bare `YYYY-MM-DD` date at midnight UTC.
#[inline]
pub fn parse_lastmod(raw: &str) -> Option<DateTime<Utc>> {
    if raw.contains('T') {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    } else {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}

fn first_path_segment(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next())
        .unwrap_or_default();

    if segment.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segment)
    }
}

fn top_counts(map: HashMap<String, usize>, limit: usize) -> Vec<CountEntry> {
    map.into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .take(limit)
        .map(|(name, count)| CountEntry { name, count })
        .collect()
}
