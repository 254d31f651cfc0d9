use std::collections::BTreeSet;
use std::error::Error;

use airtrips::{
    AirportIndex, AirportStore, CsvStore, EmissionsModel, ImportMode, ImportOptions, Importer,
    MemoryStore, TripError, TripPlanner, Trips, Write,
};

static DATASET: &'static str = "\
id,ident,type,name,latitude_deg,longitude_deg,elevation_ft,continent,iso_country,iso_region,municipality,scheduled_service,gps_code,iata_code,local_code,home_link,wikipedia_link,keywords,icao_code
3632,KLAX,large_airport,Los Angeles International Airport,33.942501,-118.407997,125,NA,US,US-CA,Los Angeles,yes,KLAX,LAX,LAX,,,,KLAX
3622,KJFK,large_airport,John F Kennedy International Airport,40.639447,-73.779317,13,NA,US,US-NY,New York,yes,KJFK,JFK,JFK,,,,KJFK
3878,KSFO,large_airport,San Francisco International Airport,37.619806,-122.374821,13,NA,US,US-CA,San Francisco,yes,KSFO,SFO,SFO,,,,KSFO
3867,KSAN,large_airport,San Diego International Airport,32.733556,-117.189667,17,NA,US,US-CA,San Diego,yes,KSAN,SAN,SAN,,,,KSAN
20418,KMCE,medium_airport,Merced Regional Macready Field,37.284698,-120.514,155,NA,US,US-CA,Merced,yes,KMCE,MCE,MCE,,,,
6523,00A,heliport,Total RF Heliport,40.070985,-74.933689,11,NA,US,US-PA,Bensalem,no,K00A,ZHP,00A,,,,
99999,XSEA,seaplane_base,Harbor Seaplane Base,47.6,-122.3,0,NA,US,US-WA,Seattle,no,,SEB,,,,,
1,KNUL,small_airport,Null Island,0,0,0,AF,XX,XX-00,,no,,NUL,,,,,
2,KDUP,small_airport,Duplicate of Los Angeles,1,1,0,NA,US,US-CA,Nowhere,no,,LAX,,,,,
3,SANT,small_airport,Santa Ana Field,33.0,-117.0,0,NA,US,US-CA,,no,,SNA,,,,,
";

fn abs_difference<T: std::ops::Sub<Output = T> + PartialOrd>(x: T, y: T) -> T {
    if x < y {
        y - x
    } else {
        x - y
    }
}

fn iatas<S: AirportStore>(store: &S) -> BTreeSet<String> {
    store.airports().map(|a| a.iata.clone()).collect()
}

fn imported(options: ImportOptions) -> MemoryStore {
    let mut store = MemoryStore::new();
    Importer::new(&mut store, options)
        .import_csv(DATASET.as_bytes(), ImportMode::Replace)
        .unwrap();
    store
}

/// Verifies that `distance_km` agrees with the published great-circle distance
/// between Los Angeles (LAX) and New York (JFK), ca. 3983 km.
#[test]
fn acceptance_distance() {
    let expected = 3983.0;
    let accepted_error = 0.01; // 1%
    let distance = airtrips::distance_km(33.9416, -118.4085, 40.6413, -73.7781);
    assert!(abs_difference(distance, expected) / expected < accepted_error);
    assert_eq!(
        airtrips::distance_km(40.6413, -73.7781, 33.9416, -118.4085),
        distance
    );
    assert_eq!(airtrips::distance_km(40.6413, -73.7781, 40.6413, -73.7781), 0.0);
}

#[test]
fn import_filters() {
    let store = imported(ImportOptions::default());
    assert_eq!(
        iatas(&store),
        ["JFK", "LAX", "MCE", "SAN", "SFO", "SNA"]
            .into_iter()
            .map(String::from)
            .collect::<BTreeSet<_>>()
    );

    // first row wins
    let index = AirportIndex::new(&store);
    assert_eq!(
        index.get("LAX").unwrap().name,
        "Los Angeles International Airport"
    );
    // icao_code wins over gps_code
    assert_eq!(index.get("JFK").unwrap().icao, "KJFK");
    assert_eq!(index.get("SNA").unwrap().city, "Unknown");
}

#[test]
fn heliport_inclusion() {
    let store = imported(ImportOptions {
        excluded_categories: [airtrips::Category::SeaplaneBase].into_iter().collect(),
        ..Default::default()
    });
    assert!(iatas(&store).contains("ZHP"));
    assert!(!iatas(&store).contains("SEB"));

    let store = imported(ImportOptions::default());
    assert!(!iatas(&store).contains("ZHP"));
}

/// Exporting and re-importing with the same options yields the same airports
#[test]
fn export_import_roundtrip() -> Result<(), Box<dyn Error>> {
    let options = ImportOptions::default();
    let dir = tempfile::tempdir()?;
    let mut store = CsvStore::open(dir.path().join("airports.csv"))?;
    Importer::new(&mut store, options.clone()).import_csv(DATASET.as_bytes(), ImportMode::Replace)?;

    let mut exported = vec![];
    airtrips::export(&store, &mut exported)?;

    let mut other = CsvStore::open(dir.path().join("other.csv"))?;
    let report = Importer::new(&mut other, options).import_csv(exported.as_slice(), ImportMode::Replace)?;

    assert_eq!(report.rejected_total(), 0);
    assert_eq!(iatas(&store), iatas(&other));
    Ok(())
}

#[test]
fn clean_twice() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let mut store = CsvStore::open(dir.path().join("airports.csv"))?;
    let mut importer = Importer::new(&mut store, ImportOptions::default());
    importer.import_csv(DATASET.as_bytes(), ImportMode::Replace)?;
    // a second incremental import of the same file adds nothing
    importer.import_csv(DATASET.as_bytes(), ImportMode::Upsert)?;
    assert_eq!(store.count(), 6);

    // defects written around the pipeline
    let mut duplicate = store.rows()[0].airport.clone();
    duplicate.name = "duplicate".to_string();
    let mut placeholder = store.rows()[1].airport.clone();
    placeholder.iata = "ZRO".to_string();
    (placeholder.latitude, placeholder.longitude) = (0.0, 0.0);
    store.apply(Write::Append(vec![duplicate, placeholder]))?;

    let report = airtrips::clean(&mut store)?;
    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(report.placeholders_removed, 1);
    assert_eq!(store.count(), 6);

    let report = airtrips::clean(&mut store)?;
    assert_eq!(report.removed(), 0);

    // the cleaned table survives reopening
    let reopened = CsvStore::open(dir.path().join("airports.csv"))?;
    assert_eq!(iatas(&reopened), iatas(&store));
    assert!(reopened.airports().all(|a| a.name != "duplicate"));
    Ok(())
}

#[test]
fn search() {
    let store = imported(ImportOptions::default());
    let index = AirportIndex::new(&store);

    let result = index.search("LAX");
    assert_eq!(result[0].iata, "LAX");
    assert_eq!(result.len(), 1);

    let result = index.search("San Francisco");
    assert_eq!(result[0].iata, "SFO");

    // three letters are a code query
    let result = index.search("San");
    assert_eq!(result.len(), 1);
    assert!(result[0].name.to_lowercase().contains("san"));

    let result = index.search("Sant");
    assert!(!result.is_empty());
    assert!(result.iter().all(|a| {
        [&a.city, &a.name, &a.country]
            .iter()
            .any(|x| x.to_lowercase().contains("sant"))
    }));

    assert_eq!(index.get("ZZZ"), None);
}

#[test]
fn trips() {
    let store = imported(ImportOptions::default());
    let planner = TripPlanner::new(&store, EmissionsModel::default());
    let mut trips = Trips::new();

    let trip = trips.create(&planner, 1, "LAX", "JFK").unwrap();
    assert!(abs_difference(trip.distance_km, 3983.0) / 3983.0 < 0.01);
    assert!(trip.emissions_kg > 0.0);

    assert_eq!(
        planner.compute_trip("LAX", "ZZZ"),
        Err(TripError::UnknownAirport("ZZZ".to_string()))
    );
    assert!(trips.create(&planner, 1, "ZZZ", "JFK").is_err());
    assert_eq!(trips.len(), 1);
}
