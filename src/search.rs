//! Resolution of user-typed text into airports.
use std::cmp::Ordering;

use crate::{AirportRecord, AirportStore, AirportSummary};

/// Maximum results of an exact code query
pub static CODE_LIMIT: usize = 10;
/// Maximum results of a prefix query
pub static PREFIX_LIMIT: usize = 15;
/// Maximum results of a text query
pub static TEXT_LIMIT: usize = 20;

/// How a query is interpreted, by its shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Empty,
    /// 3 letters: an exact IATA, ICAO or ident code
    Code,
    /// up to 3 characters: the start of an IATA or ICAO code
    Prefix,
    /// a city, airport or country name
    Text,
}

impl QueryKind {
    pub fn of(query: &str) -> Self {
        let query = query.trim();
        if query.is_empty() {
            Self::Empty
        } else if crate::normalize::is_iata(query) {
            Self::Code
        } else if query.chars().count() <= 3 {
            Self::Prefix
        } else {
            Self::Text
        }
    }
}

/// Search over the airports of a store. Only airports with an IATA code are ever returned.
pub struct AirportIndex<'a, S: AirportStore> {
    store: &'a S,
}

impl<'a, S: AirportStore> AirportIndex<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn candidates(&self) -> impl Iterator<Item = &'a AirportRecord> {
        let store: &'a S = self.store;
        store.airports().filter(|airport| airport.has_iata())
    }

    /// Returns the airports matching `query`, ranked, at most [`CODE_LIMIT`], [`PREFIX_LIMIT`]
    /// or [`TEXT_LIMIT`] depending on its [`QueryKind`].
    pub fn search(&self, query: &str) -> Vec<AirportSummary> {
        let query = query.trim();
        let (mut matches, limit) = match QueryKind::of(query) {
            QueryKind::Empty => return vec![],
            QueryKind::Code => (self.by_code(query), CODE_LIMIT),
            QueryKind::Prefix => (self.by_prefix(query), PREFIX_LIMIT),
            QueryKind::Text => (self.by_text(query), TEXT_LIMIT),
        };
        matches.truncate(limit);
        matches.into_iter().map(AirportSummary::from).collect()
    }

    /// Exact code match; IATA matches rank before ICAO and ident matches
    fn by_code(&self, code: &str) -> Vec<&'a AirportRecord> {
        let mut matches = self
            .candidates()
            .filter_map(|airport| {
                if airport.iata.eq_ignore_ascii_case(code) {
                    Some((0, airport))
                } else if airport.icao.eq_ignore_ascii_case(code)
                    || airport.ident.eq_ignore_ascii_case(code)
                {
                    Some((1, airport))
                } else {
                    None
                }
            })
            .collect::<Vec<_>>();
        matches.sort_by(|(a_rank, a), (b_rank, b)| a_rank.cmp(b_rank).then_with(|| a.name.cmp(&b.name)));
        matches.into_iter().map(|(_, airport)| airport).collect()
    }

    fn by_prefix(&self, prefix: &str) -> Vec<&'a AirportRecord> {
        let prefix = prefix.to_ascii_uppercase();
        let mut matches = self
            .candidates()
            .filter(|airport| {
                airport.iata.starts_with(&prefix)
                    || airport.icao.to_ascii_uppercase().starts_with(&prefix)
            })
            .collect::<Vec<_>>();
        matches.sort_by(|a, b| a.iata.cmp(&b.iata).then_with(|| a.name.cmp(&b.name)));
        matches
    }

    /// Substring match on city, name or country. Exact city or name matches rank first,
    /// then airports with scheduled service, then by name.
    fn by_text(&self, text: &str) -> Vec<&'a AirportRecord> {
        let text = text.to_lowercase();
        let mut matches = self
            .candidates()
            .filter_map(|airport| {
                let city = airport.city.to_lowercase();
                let name = airport.name.to_lowercase();
                let found = city.contains(&text)
                    || name.contains(&text)
                    || airport.country.to_lowercase().contains(&text);
                found.then(|| (city == text || name == text, airport))
            })
            .collect::<Vec<_>>();
        matches.sort_by(|(a_exact, a), (b_exact, b)| rank(*a_exact, a, *b_exact, b));
        matches.into_iter().map(|(_, airport)| airport).collect()
    }

    /// Returns the airport with IATA `code`, else the one with ICAO or ident `code`.
    /// Case-insensitive. `None` when no airport with an IATA code matches.
    pub fn get(&self, code: &str) -> Option<AirportSummary> {
        self.record(code).map(AirportSummary::from)
    }

    /// Same as [`Self::get`], returning the stored record
    pub fn record(&self, code: &str) -> Option<&'a AirportRecord> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        self.candidates()
            .find(|airport| airport.iata.eq_ignore_ascii_case(code))
            .or_else(|| {
                self.candidates().find(|airport| {
                    airport.icao.eq_ignore_ascii_case(code) || airport.ident.eq_ignore_ascii_case(code)
                })
            })
    }
}

fn rank(a_exact: bool, a: &AirportRecord, b_exact: bool, b: &AirportRecord) -> Ordering {
    b_exact
        .cmp(&a_exact)
        .then_with(|| b.scheduled_service.cmp(&a.scheduled_service))
        .then_with(|| a.name.cmp(&b.name))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::airport::airport;
    use crate::store::MemoryStore;

    fn store() -> MemoryStore {
        let mut sjc = airport("SJC", "KSJC", "Norman Y. Mineta San Jose International", "San Jose", "US");
        sjc.scheduled_service = false;
        MemoryStore::from_iter(vec![
            airport("LAX", "KLAX", "Los Angeles International", "Los Angeles", "US"),
            airport("JFK", "KJFK", "John F Kennedy International", "New York", "US"),
            airport("SFO", "KSFO", "San Francisco International", "San Francisco", "US"),
            sjc,
            airport("SAN", "KSAN", "San Diego International", "San Diego", "US"),
            airport("SEE", "KSEE", "Gillespie Field", "San Diego County", "US"),
            airport("", "KSAC", "Sacramento Executive", "Sacramento", "US"),
            // ICAO collides with an IATA query
            airport("XLA", "LAX", "Somewhere", "Elsewhere", "FR"),
        ])
    }

    fn iatas(result: Vec<AirportSummary>) -> Vec<String> {
        result.into_iter().map(|a| a.iata).collect()
    }

    #[test]
    fn kinds() {
        assert_eq!(QueryKind::of("  "), QueryKind::Empty);
        assert_eq!(QueryKind::of("lax"), QueryKind::Code);
        assert_eq!(QueryKind::of("LA"), QueryKind::Prefix);
        assert_eq!(QueryKind::of("K1"), QueryKind::Prefix);
        assert_eq!(QueryKind::of("Lond"), QueryKind::Text);
    }

    #[test]
    fn exact_code() {
        let store = store();
        let index = AirportIndex::new(&store);
        assert_eq!(iatas(index.search("lax")), vec!["LAX", "XLA"]);
        assert_eq!(index.search("LAX")[0].iata, "LAX");
    }

    #[test]
    fn prefix() {
        let store = store();
        let index = AirportIndex::new(&store);
        assert_eq!(iatas(index.search("s")), vec!["SAN", "SEE", "SFO", "SJC"]);
        assert_eq!(iatas(index.search("KJ")), vec!["JFK"]);
    }

    #[test]
    fn three_letters_is_a_code() {
        let store = store();
        let index = AirportIndex::new(&store);
        let result = index.search("San");
        assert_eq!(iatas(result.clone()), vec!["SAN"]);
        assert!(result.iter().all(|a| {
            [&a.city, &a.name, &a.country]
                .iter()
                .any(|x| x.to_lowercase().contains("san"))
        }));
    }

    #[test]
    fn text() {
        let store = store();
        let index = AirportIndex::new(&store);
        let result = index.search("San F");
        assert_eq!(iatas(result), vec!["SFO"]);
        // scheduled service first, then by name
        assert_eq!(
            iatas(index.search("International")),
            vec!["JFK", "LAX", "SAN", "SFO", "SJC"]
        );
        assert!(index.search("Germany").is_empty());
    }

    #[test]
    fn text_exact_first() {
        let store = store();
        let index = AirportIndex::new(&store);
        assert_eq!(iatas(index.search("san diego")), vec!["SAN", "SEE"]);
        assert_eq!(iatas(index.search("Diego")), vec!["SEE", "SAN"]);
    }

    #[test]
    fn never_without_iata() {
        let store = store();
        let index = AirportIndex::new(&store);
        assert!(index.search("Sacramento").is_empty());
        assert!(index.get("KSAC").is_none());
    }

    #[test]
    fn limits() {
        let store = (0..30)
            .map(|i| {
                let code = format!("A{}", (b'A' + i as u8 % 26) as char);
                airport(&format!("{code}{}", (b'A' + i as u8 / 26) as char), "", "Big Airport", "Town", "US")
            })
            .collect::<MemoryStore>();
        let index = AirportIndex::new(&store);
        assert_eq!(index.search("A").len(), PREFIX_LIMIT);
        assert_eq!(index.search("Big Airport").len(), TEXT_LIMIT);
    }

    #[test]
    fn get() {
        let store = store();
        let index = AirportIndex::new(&store);
        assert_eq!(index.get("jfk").unwrap().iata, "JFK");
        assert_eq!(index.get("KSFO").unwrap().iata, "SFO");
        // IATA wins over ICAO
        assert_eq!(index.get("LAX").unwrap().name, "Los Angeles International");
        assert_eq!(index.get("ZZZ"), None);
        assert_eq!(index.get(""), None);
    }
}
