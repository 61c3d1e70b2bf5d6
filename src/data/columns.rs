use super::model::{ColumnIndexMap, Field, Resolution};

/// Number of data rows inspected when sniffing the IP column by content.
const SAMPLE_ROWS: usize = 10;

// ---------------------------------------------------------------------------
// Header aliases
// ---------------------------------------------------------------------------

/// Header spellings seen across versions of the speed-test tool, in priority
/// order. Matching is case-insensitive, by equality or substring.
pub fn aliases(field: Field) -> &'static [&'static str] {
    match field {
        Field::Ip => &["ip 地址", "ip地址", "ip", "address", "host"],
        Field::AvgRtt => &[
            "平均延迟",
            "平均延时",
            "avg",
            "avg_rtt",
            "latency",
            "rtt",
            "平均延迟(ms)",
        ],
        Field::DownMb => &[
            "下载速度(mb/s)",
            "下载速度",
            "download",
            "download speed",
            "download_mb",
        ],
        Field::Region => &["地区码", "地区", "region", "colo", "cfcolo", "place", "country"],
    }
}

/// Fixed position used when neither the header nor the content tells us.
fn fallback_index(field: Field, last_column: usize) -> usize {
    match field {
        Field::Ip => 0,
        Field::AvgRtt => last_column.min(4),
        Field::DownMb => last_column.min(5),
        Field::Region => last_column.min(6),
    }
}

// ---------------------------------------------------------------------------
// Shape test
// ---------------------------------------------------------------------------

/// Syntactic check that `s` looks like an IPv4 or IPv6 address.
///
/// IPv4: four dot-separated decimal octets in 0..=255.
/// IPv6: contains a colon and every non-empty colon segment is at most four
/// characters. Nothing is validated beyond the shape.
pub fn looks_like_ip(s: &str) -> bool {
    let s = s.trim();
    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() == 4
        && parts.iter().all(|p| {
            !p.is_empty()
                && p.bytes().all(|b| b.is_ascii_digit())
                && p.parse::<u32>().is_ok_and(|n| n <= 255)
        })
    {
        return true;
    }
    s.contains(':') && s.split(':').all(|p| p.chars().count() <= 4)
}

// ---------------------------------------------------------------------------
// Column resolution
// ---------------------------------------------------------------------------

fn header_match(field: Field, header: &[String]) -> Option<usize> {
    let wanted = aliases(field);
    header.iter().position(|cell| {
        let cell = cell.trim().to_lowercase();
        wanted.iter().any(|alias| {
            let alias = alias.to_lowercase();
            cell == alias || cell.contains(&alias)
        })
    })
}

fn sniff_ip_column(sample: &[Vec<String>], width: usize) -> Option<usize> {
    if sample.is_empty() {
        return None;
    }
    (0..width).find(|&col| {
        sample
            .iter()
            .all(|row| row.get(col).is_some_and(|cell| looks_like_ip(cell)))
    })
}

/// Work out which column holds which [`Field`].
///
/// `rows` are already split on the delimiter; row 0 may or may not be a
/// header. The chain is header alias → IP content sniff → fixed position, so
/// the result is always complete.
pub fn resolve_columns(rows: &[Vec<String>]) -> ColumnIndexMap {
    let mut slots: [Option<(usize, Resolution)>; 4] = [None; 4];

    if let Some(header) = rows.first() {
        for (slot, field) in slots.iter_mut().zip(Field::ALL) {
            *slot = header_match(field, header).map(|idx| (idx, Resolution::Header));
        }
    }

    let data_start = if slots.iter().any(Option::is_some) { 1 } else { 0 };
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);

    if slots[0].is_none() {
        let end = rows.len().min(data_start + SAMPLE_ROWS);
        let sample = rows.get(data_start..end).unwrap_or(&[]);
        slots[0] = sniff_ip_column(sample, width).map(|idx| (idx, Resolution::Content));
    }

    let last_column = width.saturating_sub(1);
    let mut resolved = [(0, Resolution::Fallback); 4];
    for ((out, slot), field) in resolved.iter_mut().zip(slots).zip(Field::ALL) {
        *out = slot.unwrap_or((fallback_index(field, last_column), Resolution::Fallback));
    }

    let map = ColumnIndexMap::new(resolved, data_start);
    log::debug!(
        "resolved columns {:?} (header row: {})",
        resolved,
        map.has_header()
    );
    map
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
    fn shape_test_examples() {
        assert!(looks_like_ip("192.168.1.1"));
        assert!(looks_like_ip(" 10.0.0.1 "));
        assert!(!looks_like_ip("999.1.1.1"));
        assert!(looks_like_ip("2001:db8::1"));
        assert!(!looks_like_ip("not.an.ip"));
        assert!(!looks_like_ip("1.2.3"));
        assert!(!looks_like_ip("1.2.3.-4"));
        assert!(!looks_like_ip("LAX"));
        assert!(!looks_like_ip("2001:db8zzz::1"));
    }

    #[test]
    fn tool_header_in_chinese() {
        let data = rows(&[
            "IP 地址,已发送,已接收,丢包率,平均延迟,下载速度 (MB/s),地区码",
            "104.16.1.1,4,4,0.00,150.23,12.30,LAX",
        ]);
        let map = resolve_columns(&data);
        assert_eq!(map.data_start, 1);
        assert_eq!(map.index(Field::Ip), 0);
        assert_eq!(map.index(Field::AvgRtt), 4);
        assert_eq!(map.index(Field::DownMb), 5);
        assert_eq!(map.index(Field::Region), 6);
        for field in Field::ALL {
            assert_eq!(map.resolution(field), Resolution::Header);
        }
    }

    #[test]
    fn english_header_variants() {
        let data = rows(&["Address,RTT,Download Speed,CfColo", "1.1.1.1,20,3,LAX"]);
        let map = resolve_columns(&data);
        assert_eq!(map.index(Field::Ip), 0);
        assert_eq!(map.index(Field::AvgRtt), 1);
        assert_eq!(map.index(Field::DownMb), 2);
        assert_eq!(map.index(Field::Region), 3);
    }

    #[test]
    fn headerless_file_sniffs_ip_and_falls_back() {
        let data = rows(&[
            "x,1.1.1.1,4,4,0,120,9.5,SJC",
            "y,1.0.0.1,4,4,0,130,8.1,NRT",
        ]);
        let map = resolve_columns(&data);
        assert_eq!(map.data_start, 0);
        assert_eq!(map.index(Field::Ip), 1);
        assert_eq!(map.resolution(Field::Ip), Resolution::Content);
        assert_eq!(map.index(Field::AvgRtt), 4);
        assert_eq!(map.index(Field::DownMb), 5);
        assert_eq!(map.index(Field::Region), 6);
        assert_eq!(map.resolution(Field::Region), Resolution::Fallback);
    }

    #[test]
    fn sniff_requires_every_sampled_row() {
        let data = rows(&["1.1.1.1,2.2.2.2", "junk,3.3.3.3"]);
        let map = resolve_columns(&data);
        assert_eq!(map.index(Field::Ip), 1);
    }

    #[test]
    fn sniff_looks_at_first_ten_rows_only() {
        let mut lines: Vec<String> = (0..10).map(|i| format!("10.0.0.{i},LAX")).collect();
        lines.push("junk,LAX".to_string());
        let line_refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let map = resolve_columns(&rows(&line_refs));
        assert_eq!(map.data_start, 0);
        assert_eq!(map.index(Field::Ip), 0);
        assert_eq!(map.resolution(Field::Ip), Resolution::Content);

        // the same bad row inside the window spoils the column
        let map = resolve_columns(&rows(&line_refs[1..]));
        assert_eq!(map.resolution(Field::Ip), Resolution::Fallback);
    }

    #[test]
    fn sniff_skips_a_header_without_ip_alias() {
        let data = rows(&[
            "node,target,latency,colo",
            "n1,1.1.1.1,20,LAX",
            "n2,1.0.0.1,25,NRT",
        ]);
        let map = resolve_columns(&data);
        assert_eq!(map.data_start, 1);
        assert_eq!(map.index(Field::Ip), 1);
        assert_eq!(map.resolution(Field::Ip), Resolution::Content);
        assert_eq!(map.header_index(Field::AvgRtt), Some(2));
        assert_eq!(map.header_index(Field::Region), Some(3));
    }

    #[test]
    fn narrow_rows_clamp_fallbacks() {
        let data = rows(&["a,b", "c,d"]);
        let map = resolve_columns(&data);
        for field in Field::ALL {
            assert!(map.index(field) < 2, "{field} out of bounds");
        }
        assert_eq!(map.index(Field::Region), 1);
    }

    #[test]
    fn empty_input_still_resolves() {
        let map = resolve_columns(&[]);
        assert_eq!(map.data_start, 0);
        for field in Field::ALL {
            assert_eq!(map.index(field), 0);
        }
    }

    #[test]
    fn every_alias_resolves_within_bounds() {
        for field in Field::ALL {
            for alias in aliases(field) {
                let header = vec!["foo".to_string(), alias.to_uppercase(), "bar".to_string()];
                let data = vec![header, vec!["1.1.1.1".into(), "x".into(), "y".into()]];
                let map = resolve_columns(&data);
                assert_eq!(map.header_index(field), Some(1), "alias {alias}");
                for f in Field::ALL {
                    assert!(map.index(f) < 3);
                }
            }
        }
    }
}
