/// Return the two-digit FIPS code for a state or territory name.
/// Covers the 50 states + DC and the territories the catchment data includes.
pub fn state_fips(name: &str) -> Option<&'static str> {
    match name {
        "Alabama" => Some("01"),
        "Alaska" => Some("02"),
        "Arizona" => Some("04"),
        "Arkansas" => Some("05"),
        "California" => Some("06"),
        "Colorado" => Some("08"),
        "Connecticut" => Some("09"),
        "Delaware" => Some("10"),
        "District of Columbia" => Some("11"),
        "Florida" => Some("12"),
        "Georgia" => Some("13"),
        "Hawaii" => Some("15"),
        "Idaho" => Some("16"),
        "Illinois" => Some("17"),
        "Indiana" => Some("18"),
        "Iowa" => Some("19"),
        "Kansas" => Some("20"),
        "Kentucky" => Some("21"),
        "Louisiana" => Some("22"),
        "Maine" => Some("23"),
        "Maryland" => Some("24"),
        "Massachusetts" => Some("25"),
        "Michigan" => Some("26"),
        "Minnesota" => Some("27"),
        "Mississippi" => Some("28"),
        "Missouri" => Some("29"),
        "Montana" => Some("30"),
        "Nebraska" => Some("31"),
        "Nevada" => Some("32"),
        "New Hampshire" => Some("33"),
        "New Jersey" => Some("34"),
        "New Mexico" => Some("35"),
        "New York" => Some("36"),
        "North Carolina" => Some("37"),
        "North Dakota" => Some("38"),
        "Ohio" => Some("39"),
        "Oklahoma" => Some("40"),
        "Oregon" => Some("41"),
        "Pennsylvania" => Some("42"),
        "Rhode Island" => Some("44"),
        "South Carolina" => Some("45"),
        "South Dakota" => Some("46"),
        "Tennessee" => Some("47"),
        "Texas" => Some("48"),
        "Utah" => Some("49"),
        "Vermont" => Some("50"),
        "Virginia" => Some("51"),
        "Washington" => Some("53"),
        "West Virginia" => Some("54"),
        "Wisconsin" => Some("55"),
        "Wyoming" => Some("56"),
        "Guam" => Some("66"),
        "Puerto Rico" => Some("72"),
        "Virgin Islands of the United States" => Some("78"),
        _ => None,
    }
}

/// Every state and territory present in the catchment datasets, in FIPS order.
pub fn all_states() -> &'static [&'static str] {
    &[
        "Alabama",
        "Alaska",
        "Arizona",
        "Arkansas",
        "California",
        "Colorado",
        "Connecticut",
        "Delaware",
        "District of Columbia",
        "Florida",
        "Georgia",
        "Hawaii",
        "Idaho",
        "Illinois",
        "Indiana",
        "Iowa",
        "Kansas",
        "Kentucky",
        "Louisiana",
        "Maine",
        "Maryland",
        "Massachusetts",
        "Michigan",
        "Minnesota",
        "Mississippi",
        "Missouri",
        "Montana",
        "Nebraska",
        "Nevada",
        "New Hampshire",
        "New Jersey",
        "New Mexico",
        "New York",
        "North Carolina",
        "North Dakota",
        "Ohio",
        "Oklahoma",
        "Oregon",
        "Pennsylvania",
        "Rhode Island",
        "South Carolina",
        "South Dakota",
        "Tennessee",
        "Texas",
        "Utah",
        "Vermont",
        "Virginia",
        "Washington",
        "West Virginia",
        "Wisconsin",
        "Wyoming",
        "Guam",
        "Puerto Rico",
        "Virgin Islands of the United States",
    ]
}

/// Reverse lookup: FIPS code back to the state name.
pub fn state_name_from_fips(fips: &str) -> Option<&'static str> {
    all_states()
        .iter()
        .find(|name| state_fips(name) == Some(fips))
        .copied()
}

/// UPPER_SNAKE directory form used by the census extracts (`NEW_HAMPSHIRE`).
pub(crate) fn dir_name(name: &str) -> String {
    name.to_ascii_uppercase().replace(' ', "_")
}

/// File-name form with underscores for spaces (`New_Hampshire`).
pub(crate) fn file_name(name: &str) -> String {
    name.replace(' ', "_")
}
