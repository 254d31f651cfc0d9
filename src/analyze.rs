use std::collections::BTreeMap;
use std::io::Read;

use serde::Serialize;

use crate::airport::Category;
use crate::normalize::{is_iata, RawAirport};
use crate::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CategoryCount {
    pub total: usize,
    /// Rows of the category with a valid IATA code
    pub with_iata: usize,
}

/// Summary of a dataset file, computed without writing anything
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analysis {
    pub total: usize,
    /// Rows that could not be decoded
    pub malformed: usize,
    pub with_iata: usize,
    pub with_scheduled: usize,
    pub categories: BTreeMap<String, CategoryCount>,
    /// ISO 3166 country -> number of rows
    pub countries: BTreeMap<String, usize>,
}

impl Analysis {
    fn add(&mut self, raw: &RawAirport) {
        let has_iata = is_iata(raw.iata_code.trim());
        if has_iata {
            self.with_iata += 1;
        }
        if raw.scheduled_service.trim().eq_ignore_ascii_case("yes") {
            self.with_scheduled += 1;
        }

        let category = self
            .categories
            .entry(Category::from(raw.type_.as_str()).to_string())
            .or_default();
        category.total += 1;
        if has_iata {
            category.with_iata += 1;
        }

        let country = raw.iso_country.trim();
        if !country.is_empty() {
            *self.countries.entry(country.to_string()).or_default() += 1;
        }
    }

    /// Categories, most frequent first
    pub fn categories_by_count(&self) -> Vec<(&str, CategoryCount)> {
        let mut categories = self
            .categories
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect::<Vec<_>>();
        categories.sort_by(|a, b| b.1.total.cmp(&a.1.total).then_with(|| a.0.cmp(b.0)));
        categories
    }

    /// The `n` countries with most rows, most frequent first
    pub fn top_countries(&self, n: usize) -> Vec<(&str, usize)> {
        let mut countries = self
            .countries
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect::<Vec<_>>();
        countries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        countries.truncate(n);
        countries
    }
}

/// Returns the [`Analysis`] of the dataset in `reader`, streaming it row by row.
pub fn analyze<R: Read>(reader: R) -> Result<Analysis, Error> {
    let mut analysis = Analysis::default();
    for row in crate::csv::deserialize::<RawAirport, _>(reader) {
        analysis.total += 1;
        match row {
            Ok(raw) => analysis.add(&raw),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(_) => analysis.malformed += 1,
        }
    }
    Ok(analysis)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn work() {
        let data = "\
ident,type,iata_code,iso_country,scheduled_service
KLAX,large_airport,LAX,US,yes
KSFO,large_airport,SFO,US,yes
00A,heliport,,US,no
EGLL,Large_Airport,LHR,GB,yes
X1,small_airport,X1,,no
";
        let analysis = analyze(data.as_bytes()).unwrap();
        assert_eq!(analysis.total, 5);
        assert_eq!(analysis.with_iata, 3);
        assert_eq!(analysis.with_scheduled, 3);
        assert_eq!(
            analysis.categories_by_count(),
            vec![
                ("large_airport", CategoryCount { total: 3, with_iata: 3 }),
                ("heliport", CategoryCount { total: 1, with_iata: 0 }),
                ("small_airport", CategoryCount { total: 1, with_iata: 0 }),
            ]
        );
        assert_eq!(analysis.top_countries(1), vec![("US", 3)]);
    }
}
