/// Data layer: core types, loading, and cascading filters.
///
/// Architecture:
/// ```text
///  events / drivers / race_laps  (.csv / .parquet)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse files → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  column-per-year tables + lap counts (immutable, Arc)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year → events / drivers, event → lap range
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
