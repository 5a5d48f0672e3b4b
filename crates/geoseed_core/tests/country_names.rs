use geoseed_core::{display_to_identifier, identifier_to_display, DatasetCatalog, DirectoryCatalog};

#[test]
fn simple_identifiers_are_stable_through_identifier_form() {
    for identifier in [
        "Mexico",
        "CostaRica",
        "UnitedArabEmirates",
        "NewZealand",
        "SouthAfrica",
        "CentralAfricanRepublic",
    ] {
        let display = identifier_to_display(identifier);
        assert_eq!(display_to_identifier(&display), identifier);
        assert_eq!(
            identifier_to_display(&display_to_identifier(&display)),
            display
        );
    }
}

#[test]
fn exception_entry_maps_both_ways() {
    assert_eq!(
        identifier_to_display("AntiguaandBarbuda"),
        "Antigua and Barbuda"
    );
    assert_eq!(
        display_to_identifier("Antigua and Barbuda"),
        "AntiguaandBarbuda"
    );
}

#[test]
fn bundled_dataset_names_match_their_country_headers() {
    let catalog = DirectoryCatalog::bundled();

    for identifier in catalog.identifiers().unwrap() {
        let dataset = catalog.load(&identifier).unwrap();
        assert_eq!(identifier_to_display(&identifier), dataset.country().name);
        assert_eq!(display_to_identifier(&dataset.country().name), identifier);
    }
}
