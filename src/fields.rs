//! Positional field extraction from a rate-table page
//!
//! A rate-table page is read as an array of text lines. Every field lives at a
//! fixed line index of the one known template; [`PageLayout`] holds that map so
//! a template revision is a single table edit.

use crate::record::{AgeBand, RateRecord, AGE_BAND_COUNT, DATE_FORMAT};
use crate::states;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;
use std::ops::RangeInclusive;

/// Line positions of every field on a rate-table page (0-indexed)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageLayout {
    /// "Valid for Effective Dates: MM/DD/YYYY - MM/DD/YYYY"
    pub date_range: usize,
    pub state: usize,
    pub rating_area: usize,
    /// Trailing characters stripped from the rating area line
    pub rating_area_suffix: usize,
    pub product_name: usize,
    /// Source lines of the price column, one line per age band in band order.
    /// Spans may overlap where the table collapses bands onto one value.
    pub price_lines: Vec<RangeInclusive<usize>>,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            date_range: 0,
            state: 2,
            rating_area: 6,
            rating_area_suffix: 2,
            product_name: 14,
            price_lines: vec![
                37..=37,   // 0-18
                37..=37,   // 19-20
                38..=51,   // 21-34
                73..=87,   // 35-49
                110..=124, // 50-64
                124..=124, // 65+
            ],
        }
    }
}

impl PageLayout {
    /// Price source lines flattened in band order
    pub fn price_line_indices(&self) -> Vec<usize> {
        self.price_lines.iter().flat_map(|span| span.clone()).collect()
    }
}

/// Named field of a rate-table page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    DateRange,
    StartDate,
    EndDate,
    ProductName,
    State,
    RatingArea,
    Price(AgeBand),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::DateRange => write!(f, "valid date range"),
            Field::StartDate => write!(f, "start date"),
            Field::EndDate => write!(f, "end date"),
            Field::ProductName => write!(f, "product name"),
            Field::State => write!(f, "state"),
            Field::RatingArea => write!(f, "group rating area"),
            Field::Price(band) => write!(f, "price for age {}", band.label()),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FieldError {
    #[error("{field}: page has no line {line}")]
    MissingLine { field: Field, line: usize },
    #[error("{field}: line {line} is not a number: {text:?}")]
    InvalidNumber {
        field: Field,
        line: usize,
        text: String,
    },
    #[error("unrecognized state: {0:?}")]
    UnknownState(String),
    #[error("malformed date range: {0:?}")]
    MalformedDateRange(String),
    #[error("{field}: not a MM/DD/YYYY date: {text:?}")]
    InvalidDate { field: Field, text: String },
    #[error("layout names {found} price lines, expected {expected}")]
    PriceCount { expected: usize, found: usize },
}

fn line_at<'a>(lines: &'a [String], field: Field, index: usize) -> Result<&'a str, FieldError> {
    lines
        .get(index)
        .map(String::as_str)
        .ok_or(FieldError::MissingLine { field, line: index })
}

/// Start and end of the validity period
pub fn valid_dates(
    lines: &[String],
    layout: &PageLayout,
) -> Result<(NaiveDate, NaiveDate), FieldError> {
    let line = line_at(lines, Field::DateRange, layout.date_range)?;
    parse_date_range(line)
}

/// Parse "<label>: MM/DD/YYYY - MM/DD/YYYY"
///
/// Stricter than a plain split: exactly two `-`-separated tokens are required
/// and both must be real calendar dates. Unpadded input such as `1/1/2020` is
/// accepted and comes back zero-padded when the record is written.
pub fn parse_date_range(line: &str) -> Result<(NaiveDate, NaiveDate), FieldError> {
    let malformed = || FieldError::MalformedDateRange(line.to_string());

    let (_, dates) = line.split_once(':').ok_or_else(malformed)?;
    let compact: String = dates.chars().filter(|c| !c.is_whitespace()).collect();

    let mut parts = compact.split('-');
    let (Some(start), Some(end), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed());
    };

    Ok((
        parse_date(Field::StartDate, start)?,
        parse_date(Field::EndDate, end)?,
    ))
}

fn parse_date(field: Field, text: &str) -> Result<NaiveDate, FieldError> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| FieldError::InvalidDate {
        field,
        text: text.to_string(),
    })
}

pub fn product_name(lines: &[String], layout: &PageLayout) -> Result<String, FieldError> {
    line_at(lines, Field::ProductName, layout.product_name).map(str::to_string)
}

/// Two-letter code of the state named on the page
pub fn state(lines: &[String], layout: &PageLayout) -> Result<&'static str, FieldError> {
    let name = line_at(lines, Field::State, layout.state)?;
    states::state_code(name).ok_or_else(|| FieldError::UnknownState(name.to_string()))
}

pub fn group_rating_area(lines: &[String], layout: &PageLayout) -> Result<String, FieldError> {
    let line = line_at(lines, Field::RatingArea, layout.rating_area)?;
    let keep = line.chars().count().saturating_sub(layout.rating_area_suffix);
    Ok(line.chars().take(keep).collect())
}

/// Per-band prices, youngest band first
pub fn prices(lines: &[String], layout: &PageLayout) -> Result<[f64; AGE_BAND_COUNT], FieldError> {
    let indices = layout.price_line_indices();
    if indices.len() != AGE_BAND_COUNT {
        return Err(FieldError::PriceCount {
            expected: AGE_BAND_COUNT,
            found: indices.len(),
        });
    }

    let mut prices = [0.0; AGE_BAND_COUNT];
    for (band, index) in AgeBand::all().zip(indices) {
        let field = Field::Price(band);
        let text = line_at(lines, field, index)?;
        prices[band.index()] = text.trim().parse().map_err(|_| FieldError::InvalidNumber {
            field,
            line: index,
            text: text.to_string(),
        })?;
    }

    Ok(prices)
}

/// Extract every field of one page into a record
pub fn extract_record(lines: &[String], layout: &PageLayout) -> Result<RateRecord, FieldError> {
    let (start_date, end_date) = valid_dates(lines, layout)?;

    Ok(RateRecord {
        start_date,
        end_date,
        product_name: product_name(lines, layout)?,
        state: state(lines, layout)?,
        rating_area: group_rating_area(lines, layout)?,
        prices: prices(lines, layout)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lines laid out like the known template, prices 100.00 + line index
    fn template_lines() -> Vec<String> {
        let mut lines: Vec<String> = (0..130).map(|i| format!("{}.00", 100 + i)).collect();
        lines[0] = "Valid for Effective Dates: 01/01/2020 - 12/31/2020".into();
        lines[2] = "CALIFORNIA".into();
        lines[6] = "Area 3 *".into();
        lines[14] = "Gold PPO 500".into();
        lines
    }

    #[test]
    fn test_parse_date_range() {
        let (start, end) =
            parse_date_range("Valid for Effective Dates: 01/01/2020 - 12/31/2020").unwrap();
        assert_eq!(start.format(DATE_FORMAT).to_string(), "01/01/2020");
        assert_eq!(end.format(DATE_FORMAT).to_string(), "12/31/2020");
    }

    #[test]
    fn test_parse_date_range_ignores_whitespace() {
        let (start, end) = parse_date_range("Dates:01/ 01/2021-   03/31/2021 ").unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2021, 3, 31).unwrap());
    }

    #[test]
    fn test_parse_date_range_malformed() {
        assert!(matches!(
            parse_date_range("no colon here"),
            Err(FieldError::MalformedDateRange(_))
        ));
        assert!(matches!(
            parse_date_range("Valid: 01/01/2020"),
            Err(FieldError::MalformedDateRange(_))
        ));
        assert!(matches!(
            parse_date_range("Valid: 01/01/2020 - 02/01/2020 - 03/01/2020"),
            Err(FieldError::MalformedDateRange(_))
        ));
        assert!(matches!(
            parse_date_range("Valid: 13/45/2020 - 12/31/2020"),
            Err(FieldError::InvalidDate {
                field: Field::StartDate,
                ..
            })
        ));
    }

    #[test]
    fn test_state_lookup() {
        let layout = PageLayout::default();
        let mut lines = template_lines();
        assert_eq!(state(&lines, &layout).unwrap(), "CA");

        lines[2] = "new york".into();
        assert_eq!(state(&lines, &layout).unwrap(), "NY");

        lines[2] = "Ontario".into();
        assert_eq!(
            state(&lines, &layout),
            Err(FieldError::UnknownState("Ontario".into()))
        );
    }

    #[test]
    fn test_group_rating_area() {
        let layout = PageLayout::default();
        let mut lines = template_lines();
        assert_eq!(group_rating_area(&lines, &layout).unwrap(), "Area 3");

        lines[6] = "1".into();
        assert_eq!(group_rating_area(&lines, &layout).unwrap(), "");
    }

    #[test]
    fn test_prices_band_order() {
        let layout = PageLayout::default();
        let prices = prices(&template_lines(), &layout).unwrap();

        assert_eq!(prices[0], 137.0);
        assert_eq!(prices[1], 137.0);
        assert_eq!(prices[2], 138.0); // 21
        assert_eq!(prices[15], 151.0); // 34
        assert_eq!(prices[16], 173.0); // 35
        assert_eq!(prices[30], 187.0); // 49
        assert_eq!(prices[31], 210.0); // 50
        assert_eq!(prices[45], 224.0); // 64
        assert_eq!(prices[46], prices[45]);
    }

    #[test]
    fn test_prices_invalid_number() {
        let layout = PageLayout::default();
        let mut lines = template_lines();
        lines[80] = "N/A".into();

        let err = prices(&lines, &layout).unwrap_err();
        match err {
            FieldError::InvalidNumber { field, line, text } => {
                assert_eq!(field, Field::Price(AgeBand::new(23).unwrap()));
                assert_eq!(line, 80);
                assert_eq!(text, "N/A");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_short_page_reports_field() {
        let layout = PageLayout::default();
        let lines: Vec<String> = template_lines().into_iter().take(100).collect();

        let err = extract_record(&lines, &layout).unwrap_err();
        assert_eq!(
            err,
            FieldError::MissingLine {
                field: Field::Price(AgeBand::new(31).unwrap()),
                line: 110,
            }
        );
        assert_eq!(err.to_string(), "price for age 50: page has no line 110");
    }

    #[test]
    fn test_layout_price_count_checked() {
        let layout = PageLayout {
            price_lines: vec![37..=40],
            ..PageLayout::default()
        };
        assert_eq!(
            prices(&template_lines(), &layout),
            Err(FieldError::PriceCount {
                expected: AGE_BAND_COUNT,
                found: 4,
            })
        );
    }

    #[test]
    fn test_extract_record() {
        let record = extract_record(&template_lines(), &PageLayout::default()).unwrap();
        assert_eq!(record.product_name, "Gold PPO 500");
        assert_eq!(record.state, "CA");
        assert_eq!(record.rating_area, "Area 3");
        assert_eq!(record.start_date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(record.end_date, NaiveDate::from_ymd_opt(2020, 12, 31).unwrap());
    }
}
