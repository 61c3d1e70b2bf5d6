/// Data layer: tolerant ingestion of the speed-test tool's CSV output.
///
/// Architecture:
/// ```text
///  region.csv / result.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  bytes → rows of cells
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ columns   │  header aliases → IP sniff → fixed positions
///   └──────────┘
///        │
///        ├──────────────────────┐
///        ▼                      ▼
///   ┌───────────┐         ┌──────────┐
///   │ normalize │         │  region   │  group by colo, rank, export
///   └───────────┘         └──────────┘
///   ResultRow             RegionSummary
/// ```

pub mod columns;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod region;
