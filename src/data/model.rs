use std::fmt;

/// Sentinel region code used when a row carries no recognisable region token.
pub const UNKNOWN_REGION: &str = "UNKNOWN";

// ---------------------------------------------------------------------------
// Field – the logical columns we try to locate in a result file
// ---------------------------------------------------------------------------

/// A logical column of the external tool's CSV output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Ip,
    AvgRtt,
    DownMb,
    Region,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Ip, Field::AvgRtt, Field::DownMb, Field::Region];

    fn slot(self) -> usize {
        match self {
            Field::Ip => 0,
            Field::AvgRtt => 1,
            Field::DownMb => 2,
            Field::Region => 3,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Field::Ip => "ip",
            Field::AvgRtt => "avg_rtt",
            Field::DownMb => "down_mb",
            Field::Region => "region",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// ColumnIndexMap – where each logical field lives in a given file
// ---------------------------------------------------------------------------

/// How a column position was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A header cell matched one of the field's aliases.
    Header,
    /// Sampled data rows all looked like IP addresses in this column.
    Content,
    /// Nothing matched; a fixed default position was used.
    Fallback,
}

/// Complete mapping from [`Field`] to a zero-based column position.
/// Every field is always present, see [`crate::data::columns::resolve_columns`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndexMap {
    slots: [(usize, Resolution); 4],
    /// Index of the first data row (1 when row 0 was recognised as a header).
    pub data_start: usize,
}

impl ColumnIndexMap {
    pub(crate) fn new(slots: [(usize, Resolution); 4], data_start: usize) -> Self {
        Self { slots, data_start }
    }

    pub fn index(&self, field: Field) -> usize {
        self.slots[field.slot()].0
    }

    pub fn resolution(&self, field: Field) -> Resolution {
        self.slots[field.slot()].1
    }

    /// The column index only if it came from a header match.
    pub fn header_index(&self, field: Field) -> Option<usize> {
        (self.resolution(field) == Resolution::Header).then_some(self.index(field))
    }

    pub fn has_header(&self) -> bool {
        self.data_start > 0
    }
}

// ---------------------------------------------------------------------------
// Reading – a normalised numeric cell with its display text
// ---------------------------------------------------------------------------

/// A latency or throughput cell after unit normalisation.
///
/// `value` is `None` when the cell held no numeric run; `text` then carries
/// the original trimmed text so nothing is lost.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub value: Option<f64>,
    pub text: String,
}

impl Reading {
    pub fn passthrough(raw: &str) -> Self {
        Self {
            value: None,
            text: raw.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// ResultRow – one line of the measurement pass output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub ip: String,
    pub latency: Reading,
    pub download: Reading,
    pub region_code: String,
}

impl ResultRow {
    pub fn avg_latency_ms(&self) -> Option<f64> {
        self.latency.value
    }

    pub fn download_mbps(&self) -> Option<f64> {
        self.download.value
    }
}

// ---------------------------------------------------------------------------
// RegionSummary – one entry of the region statistics list
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSummary {
    pub code: String,
    pub display_name: String,
    pub ip_count: usize,
    /// IPs in first-seen order, duplicates kept.
    pub ips: Vec<String>,
}

impl RegionSummary {
    /// List label, `rank` is 1-based.
    pub fn label(&self, rank: usize) -> String {
        format!(
            "{rank}. {}  {} IPs [{}]",
            self.display_name, self.ip_count, self.code
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_index_only_for_header_matches() {
        let map = ColumnIndexMap::new(
            [
                (0, Resolution::Content),
                (4, Resolution::Fallback),
                (5, Resolution::Fallback),
                (6, Resolution::Header),
            ],
            1,
        );
        assert_eq!(map.header_index(Field::Ip), None);
        assert_eq!(map.header_index(Field::Region), Some(6));
        assert_eq!(map.index(Field::DownMb), 5);
        assert!(map.has_header());
    }

    #[test]
    fn region_label_format() {
        let summary = RegionSummary {
            code: "LAX".into(),
            display_name: "United States (Los Angeles)".into(),
            ip_count: 3,
            ips: vec!["1.1.1.1".into(); 3],
        };
        assert_eq!(
            summary.label(2),
            "2. United States (Los Angeles)  3 IPs [LAX]"
        );
    }
}
