use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Year – the key of every column-per-year table
// ---------------------------------------------------------------------------

/// A championship year, parsed from a table header such as `"2023"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Year(pub u16);

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Year {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u16>().map(Year)
    }
}

// ---------------------------------------------------------------------------
// YearTable – events or drivers, one column per year
// ---------------------------------------------------------------------------

/// A column-per-year table: each year maps to the ordered, non-empty
/// entries listed under its header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearTable {
    /// Years in source column order.
    years: Vec<Year>,
    entries: BTreeMap<Year, Vec<String>>,
}

impl YearTable {
    /// Build a table from `(year, cells)` columns. Blank cells are dropped;
    /// a repeated year header is merged into the first occurrence.
    pub fn from_columns<I>(columns: I) -> Self
    where
        I: IntoIterator<Item = (Year, Vec<String>)>,
    {
        let mut table = YearTable::default();
        for (year, cells) in columns {
            let kept = cells
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty());
            match table.entries.get_mut(&year) {
                Some(existing) => existing.extend(kept),
                None => {
                    table.years.push(year);
                    table.entries.insert(year, kept.collect());
                }
            }
        }
        table
    }

    pub fn years(&self) -> &[Year] {
        &self.years
    }

    /// Entries for `year`, or `None` when the year has no column.
    pub fn entries(&self, year: Year) -> Option<&[String]> {
        self.entries.get(&year).map(Vec::as_slice)
    }
}

// ---------------------------------------------------------------------------
// LapTable – event name → race distance in laps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LapTable {
    laps: BTreeMap<String, u32>,
}

impl LapTable {
    /// Build from `(event, laps)` rows. The first row for an event wins.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (String, u32)>,
    {
        let mut laps = BTreeMap::new();
        for (event, n) in rows {
            laps.entry(event.trim().to_string()).or_insert(n);
        }
        LapTable { laps }
    }

    pub fn laps(&self, event: &str) -> Option<u32> {
        self.laps.get(event).copied()
    }

    pub fn len(&self) -> usize {
        self.laps.len()
    }
}

// ---------------------------------------------------------------------------
// Dataset – everything loaded at startup
// ---------------------------------------------------------------------------

/// The three tables loaded once at startup. Never mutated afterwards; share
/// it behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub events: YearTable,
    pub drivers: YearTable,
    pub laps: LapTable,
}

impl Dataset {
    /// Years offered to the user, taken from the events table.
    pub fn years(&self) -> &[Year] {
        self.events.years()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn year_parses_trimmed_header() {
        assert_eq!(" 2023 ".parse::<Year>().unwrap(), Year(2023));
        assert!("Select Year".parse::<Year>().is_err());
        assert!("".parse::<Year>().is_err());
    }

    #[test]
    fn year_table_drops_blank_cells_and_keeps_order() {
        let table = YearTable::from_columns([
            (Year(2023), strings(&["Bahrain Grand Prix", "", "  Saudi Arabian Grand Prix "])),
            (Year(2022), strings(&["Bahrain Grand Prix", " "])),
        ]);
        assert_eq!(table.years(), &[Year(2023), Year(2022)]);
        assert_eq!(
            table.entries(Year(2023)).unwrap(),
            &strings(&["Bahrain Grand Prix", "Saudi Arabian Grand Prix"])[..]
        );
        assert_eq!(table.entries(Year(2022)).unwrap().len(), 1);
        assert!(table.entries(Year(1999)).is_none());
    }

    #[test]
    fn lap_table_first_row_wins() {
        let laps = LapTable::from_rows([
            ("Italian Grand Prix".to_string(), 53),
            ("Italian Grand Prix".to_string(), 51),
        ]);
        assert_eq!(laps.laps("Italian Grand Prix"), Some(53));
        assert_eq!(laps.len(), 1);
        assert_eq!(laps.laps("Monaco Grand Prix"), None);
    }
}
