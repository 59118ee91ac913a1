//! Turns free-text location descriptions into geocodable addresses.
//!
//! A description either names one spot ("2 Montgomery Street", "Pine & Kearny")
//! or a stretch of street ("Powell from Bush and Sutter"), which becomes two
//! intersections.

use regex::Regex;

/// Characters allowed in a street name fragment
const PART: &str = r"[\da-zA-Z .']+";

/// Confidence rating of a parsed address; lower is better
const RATING_STREET: u8 = 1;
const RATING_INTERSECTION: u8 = 2;
const RATING_LANDMARK: u8 = 100;

/// Result of parsing one description
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLocation {
    Single(String),
    Range(String, String),
}

impl ParsedLocation {
    pub fn addresses(&self) -> Vec<&str> {
        match self {
            ParsedLocation::Single(a) => vec![a.as_str()],
            ParsedLocation::Range(a, b) => vec![a.as_str(), b.as_str()],
        }
    }
}

pub struct LocationParser {
    /// Leading words stripped by `clean_location`, applied in order
    prefixes: Vec<Regex>,
    pier: Regex,
    street_at: Regex,
    street: Regex,
    intersections: Vec<Regex>,
    parens: Regex,
    ranges: Vec<Regex>,
}

impl LocationParser {
    pub fn new() -> Self {
        let re = |pattern: &str| Regex::new(pattern).expect("valid location pattern");

        let prefixes = [
            "and",
            "at",
            "near",
            "off of",
            "off",
            "intersection of",
            "corner of",
        ]
        .iter()
        .map(|p| re(&format!(r"(?i)^{} ([\w .&']+)", p)))
        .collect();

        let intersections = ["&", "at", "and"]
            .iter()
            .map(|sep| re(&format!("{PART} {sep} {PART}")))
            .collect();

        let ranges = [
            (",? between", "and"),
            (",? between", "&"),
            (" from", "and"),
            (" from", "&"),
            (" from", "to"),
            (" at", "and"),
            (" at", "&"),
        ]
        .iter()
        .map(|(head, sep)| re(&format!("(?i)({PART}){head} ({PART}) {sep} ({PART})")))
        .collect();

        Self {
            prefixes,
            pier: re(r"Piers? [\d /]+"),
            street_at: re(&format!(r"-*(\d+) ({PART}) at")),
            street: re(&format!(r"-*(\d+) ({PART})")),
            intersections,
            parens: re(r"(.+)\((.+)\)"),
            ranges,
        }
    }

    /// Parse a raw description into one address or a pair of addresses.
    pub fn parse(&self, description: &str) -> ParsedLocation {
        if description.is_empty() {
            return ParsedLocation::Single(String::new());
        }
        if let Some((a, b)) = self.parse_range(description) {
            return ParsedLocation::Range(a, b);
        }
        ParsedLocation::Single(self.parse_single(description))
    }

    /// Trim, drop a leading "near", "at", "corner of", ... and spell out `&`.
    pub fn clean_location(&self, loc: &str) -> String {
        let mut loc = loc.trim().to_string();
        for prefix in &self.prefixes {
            if let Some(rest) = prefix.captures(&loc).map(|c| c[1].to_string()) {
                loc = rest;
            }
        }
        loc.replace('&', "and")
    }

    /// A pier or a numbered street address, e.g. "950 Mason Street".
    ///
    /// In a house-number range like "303-305" the last number is kept.
    pub fn parse_simple_street(&self, loc: &str) -> Option<String> {
        if let Some(m) = self.pier.find(loc) {
            return Some(self.clean_location(m.as_str()));
        }

        let caps = self
            .street_at
            .captures(loc)
            .or_else(|| self.street.captures(loc))?;
        let addr = format!("{} {}", &caps[1], caps[2].trim());
        Some(self.clean_location(&addr))
    }

    /// Two streets joined by "&", "at" or "and".
    pub fn parse_intersection(&self, loc: &str) -> Option<String> {
        self.intersections
            .iter()
            .find_map(|re| re.find(loc))
            .map(|m| self.clean_location(m.as_str()))
    }

    /// Best address in `loc` with its rating.
    pub fn parse_location(&self, loc: &str) -> (String, u8) {
        if let Some(street) = self.parse_simple_street(loc) {
            return (street, RATING_STREET);
        }
        if let Some(intersection) = self.parse_intersection(loc) {
            return (intersection, RATING_INTERSECTION);
        }
        // Probably a landmark or neighbourhood name
        (loc.to_string(), RATING_LANDMARK)
    }

    /// Address of a single spot; text in parentheses is tried as an alternative.
    pub fn parse_single(&self, loc: &str) -> String {
        if loc.is_empty() {
            return String::new();
        }

        let candidates = match self.parens.captures(loc) {
            Some(caps) => vec![caps[1].trim().to_string(), caps[2].trim().to_string()],
            None => vec![loc.to_string()],
        };

        candidates
            .iter()
            .map(|c| self.parse_location(c))
            .min_by_key(|(_, rating)| *rating)
            .map(|(addr, _)| addr)
            .unwrap_or_default()
    }

    /// A street range such as "X between Y and Z", as the intersections
    /// ("X and Y", "X and Z").
    pub fn parse_range(&self, loc: &str) -> Option<(String, String)> {
        let caps = self.ranges.iter().find_map(|re| re.captures(loc))?;
        let street = self.clean_location(&caps[1]);
        let from = self.clean_location(&caps[2]);
        let to = self.clean_location(&caps[3]);
        Some((
            format!("{} and {}", street, from),
            format!("{} and {}", street, to),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(s: &str) -> ParsedLocation {
        ParsedLocation::Single(s.to_string())
    }

    fn range(a: &str, b: &str) -> ParsedLocation {
        ParsedLocation::Range(a.to_string(), b.to_string())
    }

    #[test]
    fn test_clean_location() {
        let parser = LocationParser::new();
        let cases = [
            ("Market & 2nd Streets", "Market and 2nd Streets"),
            ("Intersection of California at Polk", "California at Polk"),
            ("Intersection of York & Peralta", "York and Peralta"),
            ("off of Taylor Street and Filbert", "Taylor Street and Filbert"),
            ("950 Mason Street", "950 Mason Street"),
            (
                "near Potrero and Cesar Chavez Streets",
                "Potrero and Cesar Chavez Streets",
            ),
            ("at 820 Mission", "820 Mission"),
            ("Near Point Lobos", "Point Lobos"),
            ("O'Farrell Street at Powell", "O'Farrell Street at Powell"),
        ];
        for (input, expected) in cases {
            assert_eq!(parser.clean_location(input), expected, "{}", input);
        }
    }

    #[test]
    fn test_parse_simple_street() {
        let parser = LocationParser::new();
        let cases = [
            ("Crissy Field", None),
            ("Leavenworth from Filbert & Francisco St", None),
            ("Pine between Kearney and Davis", None),
            ("2 Montgomery Street", Some("2 Montgomery Street")),
            ("950 Mason Street, Nob Hill", Some("950 Mason Street")),
            ("Vallejo St. Garage, 766 Vallejo St.", Some("766 Vallejo St.")),
            ("303-305 S. Van Ness", Some("305 S. Van Ness")),
            ("Pier 39", Some("Pier 39")),
            ("Piers 1/2 ", Some("Piers 1/2")),
        ];
        for (input, expected) in cases {
            assert_eq!(
                parser.parse_simple_street(input).as_deref(),
                expected,
                "{}",
                input
            );
        }
    }

    #[test]
    fn test_parse_intersection() {
        let parser = LocationParser::new();
        let cases = [
            (
                "Corner of Van Ness & Mission Street",
                Some("Van Ness and Mission Street"),
            ),
            ("901 Mission Street", None),
            ("950 Mason Street, Nob Hill", None),
            ("Montgomery & Market Streets", Some("Montgomery and Market Streets")),
            ("Filbert Street at Hyde", Some("Filbert Street at Hyde")),
            (
                "1298 Sacramento Street at Jones",
                Some("1298 Sacramento Street at Jones"),
            ),
            ("Sutter & Buchannan Streets", Some("Sutter and Buchannan Streets")),
            ("24th and Church St. ", Some("24th and Church St.")),
            ("Café Trieste", None),
            ("The Café at 2369 Market St.", None),
            ("Pier 7", None),
        ];
        for (input, expected) in cases {
            assert_eq!(
                parser.parse_intersection(input).as_deref(),
                expected,
                "{}",
                input
            );
        }
    }

    #[test]
    fn test_parse_location_ratings() {
        let parser = LocationParser::new();
        let cases = [
            ("Starbucks at 333 O'Farrell St.", ("333 O'Farrell St.", 1)),
            ("2000 Folsom", ("2000 Folsom", 1)),
            ("2413 Harrison St.", ("2413 Harrison St.", 1)),
            ("Muddy Waters Coffee House", ("Muddy Waters Coffee House", 100)),
            ("24th and Church St. ", ("24th and Church St.", 2)),
        ];
        for (input, (addr, rating)) in cases {
            assert_eq!(
                parser.parse_location(input),
                (addr.to_string(), rating),
                "{}",
                input
            );
        }
    }

    #[test]
    fn test_parse_single() {
        let parser = LocationParser::new();
        let cases = [
            ("Corner of Van Ness & Mission Street", "Van Ness and Mission Street"),
            ("24th and Church St. ", "24th and Church St."),
            ("Intersection of California at Polk", "California at Polk"),
            (
                "near Potrero and Cesar Chavez Streets",
                "Potrero and Cesar Chavez Streets",
            ),
            ("Montgomery & Market Streets", "Montgomery and Market Streets"),
            ("Café Trieste", "Café Trieste"),
            ("The Café at 2369 Market St.", "2369 Market St."),
            ("21st St & Sanchez", "21st St and Sanchez"),
            (
                "Mark Hopkins Intercontinental Hotel (1 Nob Hill Circle, Nob Hill)",
                "1 Nob Hill Circle",
            ),
            ("McDonald's Restaurant (701 3rd Street, SOMA)", "701 3rd Street"),
            ("Broadway Studios (435 Broadway at Montgomery Street)", "435 Broadway"),
            ("23rd & Iowa Streets (Dogpatch)", "23rd and Iowa Streets"),
            ("", ""),
        ];
        for (input, expected) in cases {
            assert_eq!(parser.parse_single(input), expected, "{}", input);
        }
    }

    #[test]
    fn test_parse_range() {
        let parser = LocationParser::new();
        let cases = [
            ("Corner of Van Ness & Mission Street", None),
            ("Nam Yuen Restaurant (740 Washington Street, Chinatown)", None),
            ("Folsom & Essex Streets", None),
            (
                "Off Bush Street, between Powell and Stockton Streets",
                Some(("Bush Street and Powell", "Bush Street and Stockton Streets")),
            ),
            (
                "Howard St. from Embarcadero to 11 St.",
                Some(("Howard St. and Embarcadero", "Howard St. and 11 St.")),
            ),
            (
                "Leavenworth from Filbert & Francisco St",
                Some(("Leavenworth and Filbert", "Leavenworth and Francisco St")),
            ),
            ("420 Jones St. at Ellis St.", None),
            ("(916 Grant Avenue at Washington, Chinatown", None),
            ("Lombard at Hyde", None),
            (
                "Columbus Avenue at Green & Stockton",
                Some(("Columbus Avenue and Green", "Columbus Avenue and Stockton")),
            ),
            (
                "Mission at 1st and 2nd",
                Some(("Mission and 1st", "Mission and 2nd")),
            ),
            ("", None),
        ];
        for (input, expected) in cases {
            let expected = expected.map(|(a, b): (&str, &str)| (a.to_string(), b.to_string()));
            assert_eq!(parser.parse_range(input), expected, "{}", input);
        }
    }

    #[test]
    fn test_parse() {
        let parser = LocationParser::new();
        let cases = [
            (
                "Corner of Van Ness & Mission Street",
                single("Van Ness and Mission Street"),
            ),
            (
                "Columbus Avenue at Green & Stockton",
                range("Columbus Avenue and Green", "Columbus Avenue and Stockton"),
            ),
            (
                "Off Bush Street, between Powell and Stockton Streets",
                range("Bush Street and Powell", "Bush Street and Stockton Streets"),
            ),
            ("Café Trieste", single("Café Trieste")),
            ("21st St & Sanchez", single("21st St and Sanchez")),
            ("", single("")),
        ];
        for (input, expected) in cases {
            assert_eq!(parser.parse(input), expected, "{}", input);
        }

        assert_eq!(
            range("A and B", "A and C").addresses(),
            vec!["A and B", "A and C"]
        );
    }
}
