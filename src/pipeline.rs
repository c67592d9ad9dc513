use crate::cache::{Cache, Freshness, GLOBAL_CHECK_TIMESTAMP};
use crate::config::{AppConfig, DatasetConfig};
use crate::export::{LinkFormatter, write_csv};
use crate::fetch::{LocalPage, PageSource, PageStore};
use crate::items::{Apartment, ScrapedItem, Vehicle};
use crate::model::{Dataset, DatasetReport, RunReport, ScrapedList};
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Reset every check timestamp before starting.
    pub force: bool,
}

/// Scrapes both lists and their items, then writes one CSV per dataset.
///
/// Any fetch failure aborts the run before a CSV is written.
pub fn run(config: &AppConfig, source: &dyn PageSource, options: &RunOptions) -> Result<RunReport> {
    let cache = Cache::new(&config.paths.cache_path);
    if options.force {
        reset_cache(config)?;
    }

    let store = PageStore::new(&config.paths.scraped_dir, source);

    let refresh_lists =
        cache.is_refresh_needed(GLOBAL_CHECK_TIMESTAMP, config.cache.global_expiration_hours)?;
    if refresh_lists {
        info!("global cache outdated; fetching list pages");
    } else {
        info!("global cache still up to date; working with local list pages");
    }

    let vehicles_page = ensure_list_page(&store, Dataset::Vehicles, &config.vehicles, refresh_lists)?;
    let apartments_page =
        ensure_list_page(&store, Dataset::Apartments, &config.apartments, refresh_lists)?;
    if refresh_lists {
        cache.set_checked_timestamp(GLOBAL_CHECK_TIMESTAMP, false)?;
    }

    let (vehicles, vehicles_report) =
        process_dataset::<Vehicle>(config, &cache, &store, &vehicles_page, &config.vehicles)?;
    let (apartments, apartments_report) = process_dataset::<Apartment>(
        config,
        &cache,
        &store,
        &apartments_page,
        &config.apartments,
    )?;

    let links = LinkFormatter::new(&config.export);
    let mut report = RunReport {
        list_pages_refreshed: refresh_lists,
        datasets: vec![vehicles_report, apartments_report],
    };
    let written = [
        write_dataset(&vehicles, &links, &config.paths.output_dir)?,
        write_dataset(&apartments, &links, &config.paths.output_dir)?,
    ];
    for (dataset_report, path) in report.datasets.iter_mut().zip(written) {
        dataset_report.csv_path = Some(path.display().to_string());
    }

    Ok(report)
}

fn ensure_list_page(
    store: &PageStore<'_>,
    dataset: Dataset,
    dataset_config: &DatasetConfig,
    refresh: bool,
) -> Result<LocalPage> {
    store
        .ensure(dataset.key(), &dataset_config.page_url, refresh)
        .with_context(|| format!("failed to fetch the {} list page", dataset.key()))
}

/// Extracts one list, reconciles its item count with the cache and enriches
/// every item inside the configured window, in list order.
pub fn process_dataset<T: ScrapedItem>(
    config: &AppConfig,
    cache: &Cache,
    store: &PageStore<'_>,
    list_page: &LocalPage,
    dataset_config: &DatasetConfig,
) -> Result<(ScrapedList<T>, DatasetReport)> {
    let dataset = T::DATASET;
    let doc = list_page.read_html()?;
    let items = T::parse_list(&doc, &config.wiki.origin)
        .with_context(|| format!("failed to parse the {} list page", dataset.key()))?;
    let mut list = ScrapedList::new(items);

    let count_changed = cache.reconcile_list_count(dataset.key(), list.item_count)?;
    let timestamp_key = dataset.check_timestamp_key();
    let refresh = cache.is_refresh_needed(&timestamp_key, dataset_config.expiration_hours)?;
    info!(
        dataset = dataset.key(),
        items = list.item_count,
        count_changed,
        refresh,
        "list extracted"
    );

    let mut report = DatasetReport {
        dataset: dataset.key().to_string(),
        items: list.item_count,
        count_changed,
        refreshed: refresh,
        ..DatasetReport::default()
    };

    let fetched_before = store.fetched();
    for (index, item) in list.items.iter_mut().enumerate() {
        if !dataset_config.in_window(index) {
            continue;
        }

        debug!(
            dataset = dataset.key(),
            index,
            item = %item.stub().name,
            url = item.stub().detail_url.as_deref().unwrap_or_default(),
            "processing item"
        );
        let enriched = item
            .extract_detail(store, refresh)
            .with_context(|| format!("failed to extract {}", item.stub().name))?;
        if enriched {
            report.enriched += 1;
            info!(dataset = dataset.key(), index, item = %item.stub().name, "item done");
        } else {
            report.without_page += 1;
        }
    }
    report.pages_fetched = store.fetched() - fetched_before;

    cache.set_checked_timestamp(&timestamp_key, false)?;
    info!(
        dataset = dataset.key(),
        enriched = report.enriched,
        without_page = report.without_page,
        fetched = report.pages_fetched,
        "all items extracted"
    );

    Ok((list, report))
}

fn write_dataset<T: ScrapedItem>(
    list: &ScrapedList<T>,
    links: &LinkFormatter,
    output_dir: &Path,
) -> Result<PathBuf> {
    let rows: Vec<Vec<String>> = list.items.iter().map(|item| item.csv_row(links)).collect();
    let path = output_dir.join(format!("{}.csv", T::DATASET.key()));
    write_csv(&path, T::CSV_HEADERS, &rows)?;
    info!(
        dataset = T::DATASET.key(),
        rows = rows.len(),
        file = %path.display(),
        "csv written"
    );
    Ok(path)
}

fn check_keys() -> Vec<String> {
    let mut keys = vec![GLOBAL_CHECK_TIMESTAMP.to_string()];
    keys.extend(Dataset::ALL.iter().map(|dataset| dataset.check_timestamp_key()));
    keys
}

/// Makes every check stale so the next run fetches everything again.
pub fn reset_cache(config: &AppConfig) -> Result<()> {
    Cache::new(&config.paths.cache_path).reset_timestamps(&check_keys())
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckStatus {
    pub key: String,
    pub expiration_hours: f64,
    pub freshness: Freshness,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub cache_path: String,
    pub checks: Vec<CheckStatus>,
    pub item_counts: BTreeMap<String, usize>,
}

pub fn cache_status(config: &AppConfig) -> Result<CacheStatus> {
    let cache = Cache::new(&config.paths.cache_path);
    let now = Utc::now();

    let expirations = [
        config.cache.global_expiration_hours,
        config.vehicles.expiration_hours,
        config.apartments.expiration_hours,
    ];
    let mut checks = Vec::new();
    for (key, expiration_hours) in check_keys().into_iter().zip(expirations) {
        let freshness = cache.freshness_at(&key, expiration_hours, now)?;
        checks.push(CheckStatus {
            key,
            expiration_hours,
            freshness,
        });
    }

    let mut item_counts = BTreeMap::new();
    for dataset in Dataset::ALL {
        item_counts.insert(dataset.key().to_string(), cache.get_list_items(dataset.key())?);
    }

    Ok(CacheStatus {
        cache_path: cache.path().display().to_string(),
        checks,
        item_counts,
    })
}
