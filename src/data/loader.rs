use std::path::Path;

use anyhow::{Context, Result};

use super::columns::resolve_columns;
use super::model::{Field, RegionSummary, ResultRow};
use super::normalize::{normalize_latency, normalize_throughput};
use super::region::{aggregate_regions, row_ip, row_region};

// ---------------------------------------------------------------------------
// Raw rows
// ---------------------------------------------------------------------------

/// Split delimited text into rows of cells.
///
/// Blank lines and rows whose cells are all blank are dropped. If the CSV
/// reader rejects the input, or a stray quote made it swallow line breaks
/// into a cell, every line is split on `,` instead.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let parsed: Result<Vec<Vec<String>>, csv::Error> = reader
        .byte_records()
        .map(|record| {
            record.map(|r| {
                r.iter()
                    .map(|field| String::from_utf8_lossy(field).into_owned())
                    .collect()
            })
        })
        .collect();

    let rows = match parsed {
        Ok(rows) if !rows.iter().flatten().any(|c| c.contains('\n')) => rows,
        Ok(_) => {
            log::warn!("unbalanced quote in CSV input, splitting lines on ','");
            split_lines(text)
        }
        Err(e) => {
            log::warn!("CSV parse failed ({e}), splitting lines on ','");
            split_lines(text)
        }
    };

    rows.into_iter()
        .filter(|row: &Vec<String>| row.iter().any(|c| !c.trim().is_empty()))
        .collect()
}

fn split_lines(text: &str) -> Vec<Vec<String>> {
    text.lines()
        .map(|line| line.split(',').map(str::to_string).collect())
        .collect()
}

/// Read a file produced by the speed-test tool into rows.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub fn read_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(parse_rows(&String::from_utf8_lossy(&bytes)))
}

// ---------------------------------------------------------------------------
// Measurement pass output
// ---------------------------------------------------------------------------

/// Turn raw rows into at most `limit` normalised result rows.
pub fn rows_to_results(rows: &[Vec<String>], limit: usize) -> Vec<ResultRow> {
    let map = resolve_columns(rows);
    let ip_idx = map.index(Field::Ip);
    let rtt_idx = map.index(Field::AvgRtt);
    let down_idx = map.index(Field::DownMb);
    let region_idx = map.index(Field::Region);

    let cell = |row: &[String], idx: usize| -> String {
        row.get(idx).map(|c| c.trim().to_string()).unwrap_or_default()
    };

    rows.iter()
        .skip(map.data_start)
        .take(limit)
        .map(|row| ResultRow {
            ip: row_ip(row, ip_idx).unwrap_or_default(),
            latency: normalize_latency(&cell(row, rtt_idx)),
            download: normalize_throughput(&cell(row, down_idx)),
            region_code: row_region(row, Some(region_idx)),
        })
        .collect()
}

/// Load the measurement pass result file. An empty file yields no rows.
pub fn load_results(path: &Path, limit: usize) -> Result<Vec<ResultRow>> {
    let rows = read_rows(path)?;
    let results = rows_to_results(&rows, limit);
    let fastest = results
        .iter()
        .filter_map(ResultRow::download_mbps)
        .fold(None, |best: Option<f64>, v| Some(best.map_or(v, |b| b.max(v))));
    let lowest_rtt = results
        .iter()
        .filter_map(ResultRow::avg_latency_ms)
        .fold(None, |best: Option<f64>, v| Some(best.map_or(v, |b| b.min(v))));
    log::info!(
        "loaded {} result rows from {} (best {:?} MB/s, {:?} ms)",
        results.len(),
        path.display(),
        fastest,
        lowest_rtt
    );
    Ok(results)
}

// ---------------------------------------------------------------------------
// Discovery pass output
// ---------------------------------------------------------------------------

/// Group raw discovery rows into ranked region summaries.
///
/// Only a header-named region column is trusted; otherwise every row goes
/// through the token scan.
pub fn rows_to_regions(rows: &[Vec<String>]) -> Vec<RegionSummary> {
    let map = resolve_columns(rows);
    let data = rows.get(map.data_start..).unwrap_or(&[]);
    aggregate_regions(
        data,
        map.index(Field::Ip),
        map.header_index(Field::Region),
    )
}

/// Load the discovery pass output and aggregate it by region.
pub fn load_regions(path: &Path) -> Result<Vec<RegionSummary>> {
    let rows = read_rows(path)?;
    let regions = rows_to_regions(&rows);
    log::info!(
        "aggregated {} regions from {}",
        regions.len(),
        path.display()
    );
    Ok(regions)
}
