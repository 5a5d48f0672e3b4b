use geoseed_core::db::open_db_in_memory;
use geoseed_core::{
    CityRecord, CountryLoader, CountryRecord, Dataset, DatasetCatalog, DatasetSeedRunner,
    DirectoryCatalog, GeoKind, GeoRepository, InMemoryCatalog, InstallContext, LoaderError,
    RegionRecord, RepoResult, SeedError, SeedReport, SeedRunner, SqliteGeoRepository,
    SqliteTransactionRunner, TransactionRunner,
};
use rusqlite::{params, Connection};
use std::cell::RefCell;

fn with_context<T>(
    conn: &Connection,
    catalog: &dyn DatasetCatalog,
    seeder: &dyn SeedRunner,
    f: impl FnOnce(InstallContext<'_>) -> T,
) -> T {
    let repo = SqliteGeoRepository::try_new(conn).unwrap();
    let transactions = SqliteTransactionRunner::new(conn);
    f(InstallContext {
        catalog,
        repo: &repo,
        transactions: &transactions,
        seeder,
    })
}

fn row_counts(conn: &Connection, country_code: &str) -> (i64, i64, i64) {
    let count = |sql: &str| -> i64 {
        conn.query_row(sql, params![country_code], |row| row.get(0))
            .unwrap()
    };
    (
        count("SELECT COUNT(*) FROM countries WHERE code = ?1;"),
        count("SELECT COUNT(*) FROM regions WHERE country_code = ?1;"),
        count("SELECT COUNT(*) FROM cities WHERE country_code = ?1;"),
    )
}

fn peru_dataset(last_city_latitude: f64) -> Dataset {
    Dataset::new(
        CountryRecord {
            code: "PE".to_string(),
            name: "Peru".to_string(),
            iso3: Some("PER".to_string()),
        },
        vec![
            RegionRecord {
                code: "PE-LIM".to_string(),
                name: "Lima".to_string(),
            },
            RegionRecord {
                code: "PE-CUS".to_string(),
                name: "Cusco".to_string(),
            },
        ],
        vec![
            CityRecord {
                name: "Lima".to_string(),
                region_code: Some("PE-LIM".to_string()),
                latitude: Some(-12.0464),
                longitude: Some(-77.0428),
            },
            CityRecord {
                name: "Cusco".to_string(),
                region_code: Some("PE-CUS".to_string()),
                latitude: Some(last_city_latitude),
                longitude: Some(-71.9675),
            },
        ],
    )
}

/// Writes one country row, then fails on a broken statement.
struct FailingSeedRunner;

impl SeedRunner for FailingSeedRunner {
    fn run_seed(&self, conn: &Connection, _identifier: &str) -> Result<SeedReport, SeedError> {
        conn.execute(
            "INSERT INTO countries (code, name) VALUES ('MX', 'Mexico');",
            [],
        )?;
        conn.execute("INSERT INTO missing_table (id) VALUES (1);", [])?;
        Ok(SeedReport::default())
    }
}

/// Records the identifiers it is addressed with, then delegates.
struct RecordingSeedRunner<'c> {
    inner: DatasetSeedRunner<'c>,
    calls: RefCell<Vec<String>>,
}

impl SeedRunner for RecordingSeedRunner<'_> {
    fn run_seed(&self, conn: &Connection, identifier: &str) -> Result<SeedReport, SeedError> {
        self.calls.borrow_mut().push(identifier.to_string());
        self.inner.run_seed(conn, identifier)
    }
}

/// Records which row kinds were counted, then delegates.
struct CountingRepo<'conn> {
    inner: SqliteGeoRepository<'conn>,
    counted: RefCell<Vec<GeoKind>>,
}

impl GeoRepository for CountingRepo<'_> {
    fn count_by_country_code(&self, kind: GeoKind, country_code: &str) -> RepoResult<u64> {
        self.counted.borrow_mut().push(kind);
        self.inner.count_by_country_code(kind, country_code)
    }

    fn insert_country(&self, country: &CountryRecord) -> RepoResult<()> {
        self.inner.insert_country(country)
    }

    fn insert_region(&self, country_code: &str, region: &RegionRecord) -> RepoResult<()> {
        self.inner.insert_region(country_code, region)
    }

    fn insert_city(&self, country_code: &str, city: &CityRecord) -> RepoResult<()> {
        self.inner.insert_city(country_code, city)
    }
}

/// Reports success without ever running the work.
struct SkippingTransactionRunner;

impl TransactionRunner<LoaderError> for SkippingTransactionRunner {
    fn run_in_transaction(
        &self,
        _work: &mut dyn FnMut(&Connection) -> Result<(), LoaderError>,
    ) -> Result<(), LoaderError> {
        Ok(())
    }
}

#[test]
fn valid_checks_dataset_existence_through_identifier_form() {
    let catalog = DirectoryCatalog::bundled();

    assert!(CountryLoader::valid(&catalog, "Mexico"));
    assert!(CountryLoader::valid(&catalog, "Costa Rica"));
    assert!(CountryLoader::valid(&catalog, "Antigua and Barbuda"));
    assert!(!CountryLoader::valid(&catalog, "Nonexistentland"));
    assert!(!CountryLoader::valid(&catalog, "../Mexico"));
}

#[test]
fn create_rejects_unavailable_country() {
    let conn = open_db_in_memory().unwrap();
    let catalog = DirectoryCatalog::bundled();
    let seeder = DatasetSeedRunner::new(&catalog);

    with_context(&conn, &catalog, &seeder, |ctx| {
        let err = CountryLoader::create(ctx, "Nonexistentland").err().unwrap();
        assert!(matches!(err, LoaderError::CountryNotAvailable(ref name) if name == "Nonexistentland"));
        assert_eq!(err.to_string(), "country not available: Nonexistentland");
    });
}

#[test]
fn list_available_maps_display_names_to_themselves() {
    let catalog = DirectoryCatalog::bundled();

    let available = CountryLoader::list_available(&catalog).unwrap();
    let names: Vec<&str> = available.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Antigua and Barbuda", "Costa Rica", "Mexico"]);
    for (key, value) in &available {
        assert_eq!(key, value);
    }
}

#[test]
fn list_available_collapses_identifiers_with_same_display_name() {
    let catalog = InMemoryCatalog::new()
        .with_dataset("CostaRica", peru_dataset(-13.5319))
        .with_dataset("Costa-Rica", peru_dataset(-13.5319));

    let available = CountryLoader::list_available(&catalog).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(available.len(), 1);
    assert_eq!(available.get("Costa Rica").map(String::as_str), Some("Costa Rica"));
}

#[test]
fn install_seeds_all_rows_and_marks_country_installed() {
    let conn = open_db_in_memory().unwrap();
    let catalog = DirectoryCatalog::bundled();
    let seeder = DatasetSeedRunner::new(&catalog);

    with_context(&conn, &catalog, &seeder, |ctx| {
        let loader = CountryLoader::create(ctx, "Mexico").unwrap();
        assert!(!loader.is_installed().unwrap());

        let report = loader.install().unwrap();
        assert_eq!(
            report,
            SeedReport {
                countries: 1,
                regions: 4,
                cities: 5,
            }
        );
        assert!(loader.is_installed().unwrap());
        assert!(CountryLoader::is_country_installed(ctx.catalog, ctx.repo, "Mexico").unwrap());
    });

    assert_eq!(row_counts(&conn, "MX"), (1, 4, 5));
    assert_eq!(row_counts(&conn, "CR"), (0, 0, 0));
}

#[test]
fn second_install_fails_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let catalog = DirectoryCatalog::bundled();
    let seeder = DatasetSeedRunner::new(&catalog);

    with_context(&conn, &catalog, &seeder, |ctx| {
        CountryLoader::create(ctx, "Costa Rica")
            .unwrap()
            .install()
            .unwrap();
    });
    let before = row_counts(&conn, "CR");

    with_context(&conn, &catalog, &seeder, |ctx| {
        let err = CountryLoader::create(ctx, "Costa Rica")
            .unwrap()
            .install()
            .unwrap_err();
        assert!(matches!(err, LoaderError::CountryAlreadyInstalled(ref name) if name == "Costa Rica"));
    });

    assert_eq!(row_counts(&conn, "CR"), before);
    assert_eq!(before, (1, 7, 7));
}

#[test]
fn any_geo_row_marks_country_installed() {
    let catalog = DirectoryCatalog::bundled();

    for sql in [
        "INSERT INTO countries (code, name) VALUES ('CR', 'Costa Rica');",
        "INSERT INTO regions (country_code, code, name) VALUES ('CR', 'CR-SJ', 'San José');",
        "INSERT INTO cities (country_code, name) VALUES ('CR', 'Liberia');",
    ] {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteGeoRepository::try_new(&conn).unwrap();
        assert!(!CountryLoader::is_country_installed(&catalog, &repo, "Costa Rica").unwrap());

        conn.execute(sql, []).unwrap();
        assert!(
            CountryLoader::is_country_installed(&catalog, &repo, "Costa Rica").unwrap(),
            "not detected after: {sql}"
        );
    }
}

#[test]
fn installation_check_requires_dataset() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGeoRepository::try_new(&conn).unwrap();
    let catalog = InMemoryCatalog::new();

    let err = CountryLoader::is_country_installed(&catalog, &repo, "Mexico").unwrap_err();
    assert!(matches!(err, LoaderError::DatasetNotFound(ref identifier) if identifier == "Mexico"));
}

#[test]
fn exception_names_address_seed_runner_by_identifier() {
    let conn = open_db_in_memory().unwrap();
    let catalog = DirectoryCatalog::bundled();
    let seeder = RecordingSeedRunner {
        inner: DatasetSeedRunner::new(&catalog),
        calls: RefCell::new(Vec::new()),
    };

    with_context(&conn, &catalog, &seeder, |ctx| {
        let loader = CountryLoader::create(ctx, "Antigua and Barbuda").unwrap();
        assert_eq!(loader.country_name(), "Antigua and Barbuda");
        assert_eq!(loader.identifier(), "AntiguaandBarbuda");

        loader.install().unwrap();
        assert!(loader.is_installed().unwrap());
    });

    assert_eq!(*seeder.calls.borrow(), vec!["AntiguaandBarbuda".to_string()]);
    assert_eq!(row_counts(&conn, "AG"), (1, 8, 3));
}

#[test]
fn seed_failure_rolls_back_every_row() {
    let conn = open_db_in_memory().unwrap();
    let catalog = DirectoryCatalog::bundled();
    let seeder = FailingSeedRunner;

    with_context(&conn, &catalog, &seeder, |ctx| {
        let loader = CountryLoader::create(ctx, "Mexico").unwrap();
        let err = loader.install().unwrap_err();
        assert!(matches!(err, LoaderError::Seed(SeedError::Repo(_))));
        assert!(!loader.is_installed().unwrap());
    });

    assert_eq!(row_counts(&conn, "MX"), (0, 0, 0));
}

#[test]
fn storage_rejection_mid_seed_leaves_no_partial_rows() {
    let conn = open_db_in_memory().unwrap();
    let catalog = InMemoryCatalog::new().with_dataset("Peru", peru_dataset(200.0));
    let seeder = DatasetSeedRunner::new(&catalog);

    with_context(&conn, &catalog, &seeder, |ctx| {
        let err = CountryLoader::create(ctx, "Peru")
            .unwrap()
            .install()
            .unwrap_err();
        assert!(matches!(err, LoaderError::Seed(SeedError::Repo(_))));
    });

    assert_eq!(row_counts(&conn, "PE"), (0, 0, 0));
}

#[test]
fn invalid_dataset_is_rejected_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let complete = peru_dataset(-13.5319);
    let dataset = Dataset::new(
        complete.country().clone(),
        complete.regions()[..1].to_vec(),
        complete.cities().to_vec(),
    );
    let catalog = InMemoryCatalog::new().with_dataset("Peru", dataset);
    let seeder = DatasetSeedRunner::new(&catalog);

    with_context(&conn, &catalog, &seeder, |ctx| {
        let err = CountryLoader::create(ctx, "Peru")
            .unwrap()
            .install()
            .unwrap_err();
        assert!(matches!(err, LoaderError::Seed(SeedError::Invalid { .. })));
        assert!(err.to_string().contains("PE-CUS"));
    });

    assert_eq!(row_counts(&conn, "PE"), (0, 0, 0));
}

#[test]
fn install_after_failed_attempt_succeeds() {
    let conn = open_db_in_memory().unwrap();
    let catalog = InMemoryCatalog::new().with_dataset("Peru", peru_dataset(200.0));
    let seeder = DatasetSeedRunner::new(&catalog);
    with_context(&conn, &catalog, &seeder, |ctx| {
        assert!(CountryLoader::create(ctx, "Peru").unwrap().install().is_err());
    });

    let fixed = InMemoryCatalog::new().with_dataset("Peru", peru_dataset(-13.5319));
    let seeder = DatasetSeedRunner::new(&fixed);
    with_context(&conn, &fixed, &seeder, |ctx| {
        let report = CountryLoader::create(ctx, "Peru").unwrap().install().unwrap();
        assert_eq!(report.total(), 5);
    });

    assert_eq!(row_counts(&conn, "PE"), (1, 2, 2));
}

#[test]
fn installation_check_probes_country_then_region_then_city() {
    let conn = open_db_in_memory().unwrap();
    let catalog = DirectoryCatalog::bundled();
    let repo = CountingRepo {
        inner: SqliteGeoRepository::try_new(&conn).unwrap(),
        counted: RefCell::new(Vec::new()),
    };

    assert!(!CountryLoader::is_country_installed(&catalog, &repo, "Mexico").unwrap());
    assert_eq!(
        *repo.counted.borrow(),
        vec![GeoKind::Country, GeoKind::Region, GeoKind::City]
    );

    conn.execute(
        "INSERT INTO countries (code, name) VALUES ('MX', 'Mexico');",
        [],
    )
    .unwrap();
    repo.counted.borrow_mut().clear();

    assert!(CountryLoader::is_country_installed(&catalog, &repo, "Mexico").unwrap());
    assert_eq!(*repo.counted.borrow(), vec![GeoKind::Country]);
}

#[test]
fn installation_check_stops_at_first_region_hit() {
    let conn = open_db_in_memory().unwrap();
    let catalog = DirectoryCatalog::bundled();
    let repo = CountingRepo {
        inner: SqliteGeoRepository::try_new(&conn).unwrap(),
        counted: RefCell::new(Vec::new()),
    };
    conn.execute(
        "INSERT INTO regions (country_code, code, name) VALUES ('MX', 'MX-JAL', 'Jalisco');",
        [],
    )
    .unwrap();

    assert!(CountryLoader::is_country_installed(&catalog, &repo, "Mexico").unwrap());
    assert_eq!(*repo.counted.borrow(), vec![GeoKind::Country, GeoKind::Region]);
}

#[test]
fn install_fails_when_transaction_runner_skips_seed() {
    let conn = open_db_in_memory().unwrap();
    let catalog = DirectoryCatalog::bundled();
    let repo = SqliteGeoRepository::try_new(&conn).unwrap();
    let seeder = RecordingSeedRunner {
        inner: DatasetSeedRunner::new(&catalog),
        calls: RefCell::new(Vec::new()),
    };
    let ctx = InstallContext {
        catalog: &catalog,
        repo: &repo,
        transactions: &SkippingTransactionRunner,
        seeder: &seeder,
    };

    let err = CountryLoader::create(ctx, "Mexico")
        .unwrap()
        .install()
        .unwrap_err();
    assert!(matches!(err, LoaderError::SeedNotRun(ref identifier) if identifier == "Mexico"));
    assert!(seeder.calls.borrow().is_empty());
    assert_eq!(row_counts(&conn, "MX"), (0, 0, 0));
}

#[test]
fn dataset_missing_at_seed_time_reports_dataset_not_found() {
    let conn = open_db_in_memory().unwrap();
    let catalog = InMemoryCatalog::new().with_dataset("Peru", peru_dataset(-13.5319));
    let seed_catalog = InMemoryCatalog::new();
    let seeder = DatasetSeedRunner::new(&seed_catalog);

    with_context(&conn, &catalog, &seeder, |ctx| {
        let err = CountryLoader::create(ctx, "Peru")
            .unwrap()
            .install()
            .unwrap_err();
        assert!(matches!(err, LoaderError::DatasetNotFound(ref identifier) if identifier == "Peru"));
    });

    assert_eq!(row_counts(&conn, "PE"), (0, 0, 0));
}
