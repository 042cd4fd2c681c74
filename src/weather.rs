//! Mocked weather lookup and the saved locations list.
//!
//! There is no weather service; conditions come from a fixed table.

use thiserror::Error;

/// Location selected when the state file names none.
pub const DEFAULT_LOCATION: &str = "Stockholm, SE";

/// Sentinel location meaning "show no weather".
pub const NO_LOCATION: &str = "No Location";

const BUILTIN_LOCATIONS: [&str; 10] = [
    "Stockholm, SE",
    "London, UK",
    "New York, US",
    "Tokyo, JP",
    "Berlin, DE",
    "Sydney, AU",
    "Uppsala, SE",
    "Gothenburg, SE",
    "Malmö, SE",
    "Huddinge, SE",
];

const CONDITIONS: [(&str, &str); 10] = [
    ("Stockholm, SE", "1°C ❄️ | Light Snow"),
    ("London, UK", "9°C ☁️ | Overcast"),
    ("New York, US", "12°C ☀️ | Clear"),
    ("Tokyo, JP", "15°C 🌧️ | Rain Showers"),
    ("Berlin, DE", "6°C 🌥️ | Partly Cloudy"),
    ("Sydney, AU", "25°C ☀️ | Sunny"),
    ("Uppsala, SE", "0°C 🌨️ | Flurries"),
    ("Gothenburg, SE", "2°C 🌫️ | Fog"),
    ("Malmö, SE", "4°C ☁️ | Cloudy"),
    ("Huddinge, SE", "1°C ❄️ | Light Snow"),
];

/// Current conditions for `location`.
///
/// ```
/// use newsdeck::weather::conditions;
///
/// assert_eq!(conditions("No Location"), "Not Set");
/// assert_eq!(conditions("Paris, FR"), "N/A - Custom Location");
/// ```
pub fn conditions(location: &str) -> &'static str {
    if location == NO_LOCATION {
        return "Not Set";
    }
    CONDITIONS
        .iter()
        .find(|(name, _)| *name == location)
        .map_or("N/A - Custom Location", |(_, weather)| weather)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location must be 'City, CC' (e.g., Paris, FR)")]
    Format,

    #[error("Country code must be 2 letters")]
    CountryCode,

    #[error("'{0}' already present")]
    Duplicate(String),

    #[error("Unknown location '{0}'")]
    Unknown(String),
}

/// Normalize `City, CC` input. The city may not be empty and the country
/// code must be two alphabetic characters.
pub fn parse_location(input: &str) -> Result<String, LocationError> {
    let input = input.trim();
    let parts: Vec<&str> = input.split(',').collect();
    let [city, cc] = parts.as_slice() else {
        return Err(LocationError::Format);
    };
    let (city, cc) = (city.trim(), cc.trim());
    if city.is_empty() || cc.chars().count() != 2 || !cc.chars().all(char::is_alphabetic) {
        return Err(LocationError::CountryCode);
    }
    Ok(format!("{}, {}", city, cc))
}

/// Known locations (kept sorted) and the selected one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locations {
    all: Vec<String>,
    current: String,
}

impl Default for Locations {
    fn default() -> Self {
        Self::from_parts(None, DEFAULT_LOCATION.to_owned())
    }
}

impl Locations {
    /// Build from stored values; `None` means the built-in list.
    pub fn from_parts(all: Option<Vec<String>>, current: String) -> Self {
        let mut all = all.unwrap_or_else(|| BUILTIN_LOCATIONS.iter().map(|s| s.to_string()).collect());
        all.sort();
        all.dedup();
        Self { all, current }
    }

    pub fn all(&self) -> &[String] {
        &self.all
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    /// Header text, e.g. `📍 London, UK: 9°C ☁️ | Overcast`.
    pub fn display(&self) -> String {
        format!("📍 {}: {}", self.current, conditions(&self.current))
    }

    /// Validate and insert a new location. Returns the normalized name.
    pub fn add(&mut self, input: &str) -> Result<String, LocationError> {
        let location = parse_location(input)?;
        if self.all.contains(&location) {
            return Err(LocationError::Duplicate(location));
        }
        self.all.push(location.clone());
        self.all.sort();
        Ok(location)
    }

    /// Select a known location or [`NO_LOCATION`].
    pub fn select(&mut self, location: &str) -> Result<(), LocationError> {
        if location != NO_LOCATION && !self.all.iter().any(|l| l == location) {
            return Err(LocationError::Unknown(location.to_owned()));
        }
        self.current = location.to_owned();
        Ok(())
    }

    /// Step through the known locations, wrapping at the ends.
    pub fn cycle(&mut self, forward: bool) {
        if self.all.is_empty() {
            return;
        }
        let len = self.all.len();
        let next = match self.all.iter().position(|l| *l == self.current) {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None if forward => 0,
            None => len - 1,
        };
        self.current = self.all[next].clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conditions_table() {
        assert_eq!(conditions("London, UK"), "9°C ☁️ | Overcast");
        assert_eq!(conditions("Atlantis, XX"), "N/A - Custom Location");
        assert_eq!(conditions(NO_LOCATION), "Not Set");
    }

    #[test]
    fn test_parse_location() {
        assert_eq!(parse_location(" Paris ,fr ").unwrap(), "Paris, fr");
        assert_eq!(parse_location("Paris"), Err(LocationError::Format));
        assert_eq!(parse_location("Paris, F, R"), Err(LocationError::Format));
        assert_eq!(parse_location("Paris, FRA"), Err(LocationError::CountryCode));
        assert_eq!(parse_location("Paris, F1"), Err(LocationError::CountryCode));
        assert_eq!(parse_location(", FR"), Err(LocationError::CountryCode));
    }

    #[test]
    fn test_add_keeps_sorted_and_rejects_duplicates() {
        let mut locations = Locations::default();
        assert_eq!(locations.add("Amsterdam, NL").unwrap(), "Amsterdam, NL");
        assert_eq!(locations.all()[0], "Amsterdam, NL");
        assert_eq!(
            locations.add("Amsterdam,NL"),
            Err(LocationError::Duplicate("Amsterdam, NL".into()))
        );
    }

    #[test]
    fn test_select_and_cycle() {
        let mut locations = Locations::from_parts(
            Some(vec!["B, BB".into(), "A, AA".into()]),
            "A, AA".into(),
        );
        locations.cycle(true);
        assert_eq!(locations.current(), "B, BB");
        locations.cycle(true);
        assert_eq!(locations.current(), "A, AA");
        locations.cycle(false);
        assert_eq!(locations.current(), "B, BB");

        assert!(locations.select("Nowhere, NO").is_err());
        locations.select(NO_LOCATION).unwrap();
        assert_eq!(locations.display(), "📍 No Location: Not Set");
    }
}
