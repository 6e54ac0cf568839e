//! US state name to postal code lookup

use std::collections::HashMap;
use std::sync::LazyLock;

/// Full state name (canonical casing) to two-letter postal code
pub static STATE_CODES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::with_capacity(50);
    m.insert("Alabama", "AL");
    m.insert("Alaska", "AK");
    m.insert("Arizona", "AZ");
    m.insert("Arkansas", "AR");
    m.insert("California", "CA");
    m.insert("Colorado", "CO");
    m.insert("Connecticut", "CT");
    m.insert("Delaware", "DE");
    m.insert("Florida", "FL");
    m.insert("Georgia", "GA");
    m.insert("Hawaii", "HI");
    m.insert("Idaho", "ID");
    m.insert("Illinois", "IL");
    m.insert("Indiana", "IN");
    m.insert("Iowa", "IA");
    m.insert("Kansas", "KS");
    m.insert("Kentucky", "KY");
    m.insert("Louisiana", "LA");
    m.insert("Maine", "ME");
    m.insert("Maryland", "MD");
    m.insert("Massachusetts", "MA");
    m.insert("Michigan", "MI");
    m.insert("Minnesota", "MN");
    m.insert("Mississippi", "MS");
    m.insert("Missouri", "MO");
    m.insert("Montana", "MT");
    m.insert("Nebraska", "NE");
    m.insert("Nevada", "NV");
    m.insert("New Hampshire", "NH");
    m.insert("New Jersey", "NJ");
    m.insert("New Mexico", "NM");
    m.insert("New York", "NY");
    m.insert("North Carolina", "NC");
    m.insert("North Dakota", "ND");
    m.insert("Ohio", "OH");
    m.insert("Oklahoma", "OK");
    m.insert("Oregon", "OR");
    m.insert("Pennsylvania", "PA");
    m.insert("Rhode Island", "RI");
    m.insert("South Carolina", "SC");
    m.insert("South Dakota", "SD");
    m.insert("Tennessee", "TN");
    m.insert("Texas", "TX");
    m.insert("Utah", "UT");
    m.insert("Vermont", "VT");
    m.insert("Virginia", "VA");
    m.insert("Washington", "WA");
    m.insert("West Virginia", "WV");
    m.insert("Wisconsin", "WI");
    m.insert("Wyoming", "WY");
    m
});

/// Fix the casing of a state name so it matches the lookup table.
///
/// Every whitespace-separated word gets an uppercase first letter and a
/// lowercase remainder; runs of whitespace collapse to a single space.
pub fn normalize_state_name(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Look up the two-letter code for a state name in any casing
pub fn state_code(name: &str) -> Option<&'static str> {
    STATE_CODES.get(normalize_state_name(name).as_str()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_fifty_states() {
        assert_eq!(STATE_CODES.len(), 50);
    }

    #[test]
    fn test_normalize_state_name() {
        assert_eq!(normalize_state_name("CALIFORNIA"), "California");
        assert_eq!(normalize_state_name("california"), "California");
        assert_eq!(normalize_state_name("new   YORK"), "New York");
        assert_eq!(normalize_state_name("  texas "), "Texas");
    }

    #[test]
    fn test_any_casing_matches_canonical() {
        for (&name, &code) in STATE_CODES.iter() {
            assert_eq!(state_code(name), Some(code));
            assert_eq!(state_code(&name.to_uppercase()), Some(code), "{}", name);
            assert_eq!(state_code(&name.to_lowercase()), Some(code), "{}", name);
        }
    }

    #[test]
    fn test_unknown_state() {
        assert_eq!(state_code("Puerto Rico"), None);
        assert_eq!(state_code("Rating Area 1"), None);
        assert_eq!(state_code(""), None);
    }
}
