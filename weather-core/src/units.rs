//! Unit conversions and lookup tables shared by the forecast sources.

pub fn fahrenheit_to_kelvin(fahrenheit: i32) -> i32 {
    ((f64::from(fahrenheit) - 32.0) * 5.0 / 9.0 + 273.15).round() as i32
}

pub fn kelvin_label(fahrenheit: i32) -> String {
    format!("{}K", fahrenheit_to_kelvin(fahrenheit))
}

/// Eight-point compass name for a bearing in degrees.
pub fn compass_direction(degrees: f64) -> &'static str {
    match degrees.round() as i64 {
        0..=22 | 338..=360 => "N",
        23..=67 => "NE",
        68..=112 => "E",
        113..=157 => "SE",
        158..=202 => "S",
        203..=247 => "SW",
        248..=292 => "W",
        293..=337 => "NW",
        _ => "Variable",
    }
}

/// Tomorrow.io `weatherCode` values.
pub fn tomorrow_code_description(code: i32) -> &'static str {
    match code {
        0 => "Unknown",
        1000 => "Clear",
        1001 => "Cloudy",
        1100 => "Mostly Clear",
        1101 => "Partly Cloudy",
        1102 => "Mostly Cloudy",
        2000 => "Fog",
        2100 => "Light Fog",
        3000 => "Light Wind",
        3001 => "Wind",
        3002 => "Strong Wind",
        4000 => "Drizzle",
        4001 => "Rain",
        4200 => "Light Rain",
        4201 => "Heavy Rain",
        5000 => "Snow",
        5001 => "Flurries",
        5100 => "Light Snow",
        5101 => "Heavy Snow",
        6000 => "Freezing Drizzle",
        6001 => "Freezing Rain",
        6200 => "Light Freezing Rain",
        6201 => "Heavy Freezing Rain",
        7000 => "Ice Pellets",
        7101 => "Heavy Ice Pellets",
        7102 => "Light Ice Pellets",
        8000 => "Thunderstorm",
        _ => "Unknown Conditions",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kelvin_conversion_rounds() {
        assert_eq!(fahrenheit_to_kelvin(32), 273);
        assert_eq!(fahrenheit_to_kelvin(60), 289);
        assert_eq!(fahrenheit_to_kelvin(0), 255);
        assert_eq!(kelvin_label(212), "373K");
    }

    #[test]
    fn compass_boundaries() {
        assert_eq!(compass_direction(0.0), "N");
        assert_eq!(compass_direction(22.4), "N");
        assert_eq!(compass_direction(22.6), "NE");
        assert_eq!(compass_direction(180.0), "S");
        assert_eq!(compass_direction(337.0), "NW");
        assert_eq!(compass_direction(359.9), "N");
        assert_eq!(compass_direction(361.0), "Variable");
        assert_eq!(compass_direction(-5.0), "Variable");
    }

    #[test]
    fn unknown_codes_fall_through() {
        assert_eq!(tomorrow_code_description(4001), "Rain");
        assert_eq!(tomorrow_code_description(0), "Unknown");
        assert_eq!(tomorrow_code_description(9999), "Unknown Conditions");
    }
}
