use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::columns::looks_like_ip;
use super::model::{RegionSummary, UNKNOWN_REGION};

// ---------------------------------------------------------------------------
// Colo code → location name
// ---------------------------------------------------------------------------

const COLO_NAMES: &[(&str, &str)] = &[
    ("SJC", "United States (San Jose)"),
    ("SFO", "United States (San Francisco)"),
    ("LAX", "United States (Los Angeles)"),
    ("ORD", "United States (Chicago)"),
    ("JFK", "United States (New York)"),
    ("DEN", "United States (Denver)"),
    ("SEA", "United States (Seattle)"),
    ("EWR", "United States (Newark)"),
    ("IAD", "United States (Washington Dulles)"),
    ("BOS", "United States (Boston)"),
    ("MIA", "United States (Miami)"),
    ("DFW", "United States (Dallas/Fort Worth)"),
    ("ATL", "United States (Atlanta)"),
    ("PHX", "United States (Phoenix)"),
    ("CLT", "United States (Charlotte)"),
    ("MSP", "United States (Minneapolis)"),
    ("SLC", "United States (Salt Lake City)"),
    ("TPA", "United States (Tampa)"),
    ("NRT", "Japan (Narita)"),
    ("HND", "Japan (Haneda)"),
    ("KIX", "Japan (Kansai)"),
    ("FUK", "Japan (Fukuoka)"),
    ("HKG", "China (Hong Kong)"),
    ("LHR", "United Kingdom (London Heathrow)"),
    ("LGW", "United Kingdom (London Gatwick)"),
    ("CDG", "France (Paris Charles de Gaulle)"),
    ("ORY", "France (Paris Orly)"),
    ("FRA", "Germany (Frankfurt)"),
    ("MUC", "Germany (Munich)"),
    ("AMS", "Netherlands (Amsterdam)"),
    ("SYD", "Australia (Sydney)"),
    ("MEL", "Australia (Melbourne)"),
    ("BNE", "Australia (Brisbane)"),
    ("EZE", "Argentina (Buenos Aires)"),
    ("GRU", "Brazil (São Paulo)"),
    ("DXB", "United Arab Emirates (Dubai)"),
    ("AUH", "United Arab Emirates (Abu Dhabi)"),
    ("SIN", "Singapore"),
    ("ICN", "South Korea (Incheon)"),
    ("IST", "Turkey (Istanbul)"),
    ("MAD", "Spain (Madrid)"),
    ("YYZ", "Canada (Toronto)"),
];

/// Human readable name for a colo code, or the code itself when unknown.
pub fn display_name(code: &str) -> String {
    let upper = code.to_uppercase();
    COLO_NAMES
        .iter()
        .find(|(c, _)| *c == upper)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| code.to_string())
}

// ---------------------------------------------------------------------------
// Per-row extraction
// ---------------------------------------------------------------------------

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|s| s.trim()).unwrap_or("")
}

/// First cell that is 2–4 alphanumeric characters, e.g. an airport code.
pub fn region_token(row: &[String]) -> Option<&str> {
    row.iter().map(|c| c.trim()).find(|c| {
        let n = c.chars().count();
        (2..=4).contains(&n) && c.chars().all(char::is_alphanumeric)
    })
}

/// IP at `idx`, else the first cell in the row shaped like an IP.
pub fn row_ip(row: &[String], idx: usize) -> Option<String> {
    let direct = cell(row, idx);
    if !direct.is_empty() {
        return Some(direct.to_string());
    }
    row.iter()
        .find(|c| looks_like_ip(c))
        .map(|c| c.trim().to_string())
}

/// Region code at `idx`; a blank cell (or no column) falls back to the
/// row-wide token scan, then [`UNKNOWN_REGION`].
pub fn row_region(row: &[String], idx: Option<usize>) -> String {
    let direct = idx.map(|i| cell(row, i)).unwrap_or("");
    if !direct.is_empty() {
        return direct.to_string();
    }
    region_token(row).unwrap_or(UNKNOWN_REGION).to_string()
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Group data rows by region code and rank regions by IP count, descending.
///
/// Ties keep discovery order. Rows with no IP are skipped.
pub fn aggregate_regions(
    rows: &[Vec<String>],
    ip_idx: usize,
    region_idx: Option<usize>,
) -> Vec<RegionSummary> {
    let mut order: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();

    for row in rows {
        if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let Some(ip) = row_ip(row, ip_idx) else {
            continue;
        };
        let region = row_region(row, region_idx);
        let slot = *order.entry(region.clone()).or_insert_with(|| {
            groups.push((region, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(ip);
    }

    let mut summaries: Vec<RegionSummary> = groups
        .into_iter()
        .map(|(code, ips)| RegionSummary {
            display_name: display_name(&code),
            ip_count: ips.len(),
            code,
            ips,
        })
        .collect();
    summaries.sort_by(|a, b| b.ip_count.cmp(&a.ip_count));
    summaries
}

// ---------------------------------------------------------------------------
// Selection export
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("writing {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Write the region's unique IPs, sorted, one per line. Returns the number of
/// lines written.
pub fn export_selection(region: &RegionSummary, path: &Path) -> Result<usize, ExportError> {
    let unique: BTreeSet<&str> = region
        .ips
        .iter()
        .map(|ip| ip.trim())
        .filter(|ip| !ip.is_empty())
        .collect();

    let mut body = String::new();
    for ip in &unique {
        body.push_str(ip);
        body.push('\n');
    }

    fs::write(path, body).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!(
        "exported {} IPs of region {} to {}",
        unique.len(),
        region.code,
        path.display()
    );
    Ok(unique.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(lines: &[&str]) -> Vec<Vec<String>> {
        lines
            .iter()
            .map(|l| l.split(',').map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn lookup_is_case_insensitive_with_raw_fallback() {
        assert_eq!(display_name("lax"), "United States (Los Angeles)");
        assert_eq!(display_name("SIN"), "Singapore");
        assert_eq!(display_name("XYZ"), "XYZ");
        assert_eq!(display_name(UNKNOWN_REGION), UNKNOWN_REGION);
    }

    #[test]
    fn groups_and_ranks_by_count() {
        let data = rows(&[
            "1.1.1.1,NRT",
            "1.0.0.1,LAX",
            "1.0.0.2,LAX",
            "1.0.0.3,HKG",
            "1.0.0.4,LAX",
            "1.0.0.5,HKG",
        ]);
        let regions = aggregate_regions(&data, 0, Some(1));
        let codes: Vec<&str> = regions.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, ["LAX", "HKG", "NRT"]);
        assert_eq!(regions[0].ip_count, 3);
        assert_eq!(regions[0].ips, ["1.0.0.1", "1.0.0.2", "1.0.0.4"]);
        assert_eq!(regions[0].display_name, "United States (Los Angeles)");
    }

    #[test]
    fn ties_keep_discovery_order_and_are_repeatable() {
        let data = rows(&["1.1.1.1,SJC", "1.1.1.2,NRT", "1.1.1.3,FRA"]);
        let first = aggregate_regions(&data, 0, Some(1));
        let second = aggregate_regions(&data, 0, Some(1));
        assert_eq!(first, second);
        let codes: Vec<&str> = first.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, ["SJC", "NRT", "FRA"]);
    }

    #[test]
    fn blank_region_uses_row_token_then_unknown() {
        let data = rows(&["1.1.1.1,4,sjc,", "1.1.1.2,,,", "1.1.1.3,x,,"]);
        let regions = aggregate_regions(&data, 0, Some(3));
        let codes: Vec<&str> = regions.iter().map(|r| r.code.as_str()).collect();
        // "4" and "x" are too short to be a token
        assert_eq!(codes, ["UNKNOWN", "sjc"]);
        assert_eq!(regions[0].ips, ["1.1.1.2", "1.1.1.3"]);
    }

    #[test]
    fn missing_region_column_scans_each_row() {
        let data = rows(&["1.1.1.1,AMS", "1.1.1.2,AMS"]);
        let regions = aggregate_regions(&data, 0, None);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].code, "AMS");
        assert_eq!(regions[0].display_name, "Netherlands (Amsterdam)");
    }

    #[test]
    fn rows_without_ip_are_dropped() {
        let data = rows(&[",LAX", "1.1.1.1,LAX", ",", "5.5.5.5,NRT"]);
        let regions = aggregate_regions(&data, 0, Some(1));
        let total: usize = regions.iter().map(|r| r.ips.len()).sum();
        assert_eq!(total, 2);
        assert_eq!(regions[0].ips, ["1.1.1.1"]);
        assert_eq!(regions[1].ips, ["5.5.5.5"]);
    }

    #[test]
    fn blank_ip_cell_falls_back_to_shape_scan() {
        let data = rows(&[",LAX,9.9.9.9"]);
        let regions = aggregate_regions(&data, 0, Some(1));
        assert_eq!(regions[0].ips, ["9.9.9.9"]);
    }

    #[test]
    fn export_dedups_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("region_ok.txt");
        let region = RegionSummary {
            code: "LAX".into(),
            display_name: display_name("LAX"),
            ip_count: 3,
            ips: vec!["10.0.0.2".into(), "10.0.0.1".into(), "10.0.0.1".into()],
        };
        let written = export_selection(&region, &path).unwrap();
        assert_eq!(written, 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "10.0.0.1\n10.0.0.2\n");
    }

    #[test]
    fn export_reports_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("region_ok.txt");
        let region = RegionSummary {
            code: "LAX".into(),
            display_name: "LAX".into(),
            ip_count: 1,
            ips: vec!["1.1.1.1".into()],
        };
        let err = export_selection(&region, &path).unwrap_err();
        assert!(err.to_string().contains("region_ok.txt"));
    }
}
