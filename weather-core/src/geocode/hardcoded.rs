use crate::model::Coordinates;

/// Stadiums the lookup is usually asked about, keyed on how people write the city.
/// Rules are checked in order, so the more specific Los Angeles entry comes first.
pub fn hardcoded_coordinates(location: &str) -> Option<Coordinates> {
    let n = normalize(location);
    let has = |needle: &str| n.contains(needle);
    // state codes are short enough to hide inside city names ("bloomINgton")
    let word = |code: &str| {
        n.split(|c: char| !c.is_alphanumeric())
            .any(|token| token == code)
    };

    let coords = if has("lincoln") && (word("ne") || has("nebraska")) {
        // Memorial Stadium
        (40.8206, -96.7056)
    } else if has("columbus") && (word("oh") || has("ohio")) {
        // Ohio Stadium
        (40.0017, -83.0197)
    } else if has("ann arbor") && (word("mi") || has("michigan")) {
        // Michigan Stadium
        (42.2658, -83.7486)
    } else if has("state college") || has("university park") {
        // Beaver Stadium
        (40.8122, -77.8561)
    } else if has("madison") && (word("wi") || has("wisconsin")) {
        // Camp Randall Stadium
        (43.0700, -89.4128)
    } else if has("iowa city") {
        // Kinnick Stadium
        (41.6589, -91.5508)
    } else if has("minneapolis") && (word("mn") || has("minnesota")) {
        // Huntington Bank Stadium
        (44.9765, -93.2248)
    } else if has("champaign") || has("urbana") {
        (40.0992, -88.2360)
    } else if has("evanston") {
        // Ryan Field
        (42.0659, -87.6910)
    } else if has("west lafayette") {
        // Ross-Ade Stadium
        (40.4419, -86.9189)
    } else if has("bloomington") && (word("in") || has("indiana")) {
        (39.1807, -86.5258)
    } else if has("college park") {
        // SECU Stadium
        (38.9907, -76.9488)
    } else if has("piscataway") || (has("new brunswick") && word("nj")) {
        // SHI Stadium
        (40.5138, -74.4653)
    } else if has("east lansing") {
        // Spartan Stadium
        (42.7284, -84.4822)
    } else if has("pasadena") || (has("los angeles") && word("ucla")) {
        // Rose Bowl
        (34.1614, -118.1676)
    } else if has("los angeles") && (word("ca") || word("usc") || has("coliseum")) {
        (34.0141, -118.2879)
    } else if has("eugene") {
        // Autzen Stadium
        (44.0582, -123.0687)
    } else if has("seattle") {
        // Husky Stadium
        (47.6505, -122.3017)
    } else if has("omaha") && (word("ne") || has("nebraska")) {
        (41.2565, -95.9345)
    } else {
        return None;
    };

    Some(Coordinates::known(coords.0, coords.1))
}

fn normalize(location: &str) -> String {
    location
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize("  Iowa   City,\tIA "), "iowa city, ia");
    }

    #[test]
    fn known_venues_resolve() {
        let kinnick = hardcoded_coordinates("Iowa City, IA").unwrap();
        assert_eq!((kinnick.latitude, kinnick.longitude), (41.6589, -91.5508));

        let lincoln = hardcoded_coordinates("LINCOLN,  Nebraska").unwrap();
        assert_eq!(lincoln.latitude, 40.8206);

        let beaver = hardcoded_coordinates("University Park, PA").unwrap();
        assert_eq!(beaver.longitude, -77.8561);
    }

    #[test]
    fn ucla_wins_over_generic_los_angeles() {
        let ucla = hardcoded_coordinates("Los Angeles, CA (UCLA)").unwrap();
        assert_eq!(ucla.latitude, 34.1614);

        let usc = hardcoded_coordinates("Los Angeles, CA").unwrap();
        assert_eq!(usc.latitude, 34.0141);
    }

    #[test]
    fn state_code_must_be_a_whole_word() {
        assert!(hardcoded_coordinates("Bloomington, IL").is_none());
        assert!(hardcoded_coordinates("Bloomington, MN").is_none());

        let iu = hardcoded_coordinates("Bloomington, IN").unwrap();
        assert_eq!(iu.latitude, 39.1807);
        assert!(hardcoded_coordinates("bloomington indiana").is_some());
    }

    #[test]
    fn city_without_state_qualifier_is_not_matched() {
        assert!(hardcoded_coordinates("Columbus, GA").is_none());
        assert!(hardcoded_coordinates("Boulder, CO").is_none());
    }
}
