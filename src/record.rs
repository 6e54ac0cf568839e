//! Typed output row for one rate-table page

use chrono::NaiveDate;

/// Number of age bands per rate table: 0-18, 19-20, 21 through 64, 65+
pub const AGE_BAND_COUNT: usize = 47;

/// Date format used by the rate tables and the upload workbook
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// One age band column of the rate table, by position (0 = "0-18")
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeBand(usize);

impl AgeBand {
    pub fn new(index: usize) -> Option<Self> {
        (index < AGE_BAND_COUNT).then_some(Self(index))
    }

    /// All bands in column order
    pub fn all() -> impl Iterator<Item = AgeBand> {
        (0..AGE_BAND_COUNT).map(AgeBand)
    }

    pub fn index(self) -> usize {
        self.0
    }

    /// Column label, e.g. "0-18", "35", "65+"
    pub fn label(self) -> String {
        match self.0 {
            0 => "0-18".to_string(),
            1 => "19-20".to_string(),
            i if i == AGE_BAND_COUNT - 1 => "65+".to_string(),
            i => (i + 19).to_string(),
        }
    }
}

/// A single extracted rate table.
///
/// Built once per page and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RateRecord {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub product_name: String,
    /// Two-letter postal code
    pub state: &'static str,
    pub rating_area: String,
    pub prices: [f64; AGE_BAND_COUNT],
}

impl RateRecord {
    /// Flatten into the upload sheet's column order
    pub fn to_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(5 + AGE_BAND_COUNT);
        row.push(self.start_date.format(DATE_FORMAT).to_string());
        row.push(self.end_date.format(DATE_FORMAT).to_string());
        row.push(self.product_name.clone());
        row.push(self.state.to_string());
        row.push(self.rating_area.clone());
        row.extend(self.prices.iter().map(|p| p.to_string()));
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RateRecord {
        let mut prices = [0.0; AGE_BAND_COUNT];
        for (i, p) in prices.iter_mut().enumerate() {
            *p = 200.0 + i as f64 + 0.25;
        }
        RateRecord {
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
            product_name: "Gold PPO 500".into(),
            state: "CA",
            rating_area: "1".into(),
            prices,
        }
    }

    #[test]
    fn test_band_labels() {
        let labels: Vec<String> = AgeBand::all().map(AgeBand::label).collect();
        assert_eq!(labels.len(), AGE_BAND_COUNT);
        assert_eq!(labels[0], "0-18");
        assert_eq!(labels[1], "19-20");
        assert_eq!(labels[2], "21");
        assert_eq!(labels[16], "35");
        assert_eq!(labels[45], "64");
        assert_eq!(labels[46], "65+");
    }

    #[test]
    fn test_band_bounds() {
        assert!(AgeBand::new(46).is_some());
        assert!(AgeBand::new(47).is_none());
    }

    #[test]
    fn test_to_row() {
        let row = sample().to_row();
        assert_eq!(row.len(), 5 + AGE_BAND_COUNT);
        assert_eq!(&row[..5], &["01/01/2020", "12/31/2020", "Gold PPO 500", "CA", "1"]);
        assert_eq!(row[5], "200.25");
        assert_eq!(row[51], "246.25");
    }
}
