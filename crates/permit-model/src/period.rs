//! Observation periods.
//!
//! Periods are stored as the first day of the period (`2001-01-01` for
//! January 2001, `2001-04-01` for the second quarter).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Sampling frequency of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Monthly,
    Quarterly,
}

impl Frequency {
    /// Observations per year, the engine's `period=` value.
    pub fn periods_per_year(self) -> u32 {
        match self {
            Self::Monthly => 12,
            Self::Quarterly => 4,
        }
    }

    /// Months covered by one observation.
    pub fn months(self) -> u32 {
        12 / self.periods_per_year()
    }

    /// Infers the frequency from the spacing of consecutive periods.
    ///
    /// Indices shorter than two periods default to monthly. Irregular spacing
    /// (gaps, duplicates) yields `None`.
    pub fn infer(index: &[NaiveDate]) -> Option<Self> {
        let Some(first) = index.windows(2).next() else {
            return Some(Self::Monthly);
        };
        let step = month_distance(first[0], first[1]);
        let frequency = match step {
            1 => Self::Monthly,
            3 => Self::Quarterly,
            _ => return None,
        };
        index
            .windows(2)
            .all(|pair| month_distance(pair[0], pair[1]) == step)
            .then_some(frequency)
    }

    /// 1-based position of `date` within its year.
    pub fn period_of_year(self, date: NaiveDate) -> u32 {
        date.month0() / self.months() + 1
    }
}

/// Signed number of calendar months from `from` to `to`.
pub fn month_distance(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32
}

pub fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Formats a period for CSV output.
pub fn format_period(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses the `YYYYPP` tokens the engine writes in its component tables.
pub fn parse_engine_period(token: &str, frequency: Frequency) -> Option<NaiveDate> {
    let token = token.trim();
    if token.len() != 6 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = token[..4].parse().ok()?;
    let period: u32 = token[4..].parse().ok()?;
    if period == 0 || period > frequency.periods_per_year() {
        return None;
    }
    first_of_month(year, (period - 1) * frequency.months() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> NaiveDate {
        first_of_month(year, month).unwrap()
    }

    #[test]
    fn infers_monthly_and_quarterly() {
        let monthly = [ym(2020, 11), ym(2020, 12), ym(2021, 1)];
        assert_eq!(Frequency::infer(&monthly), Some(Frequency::Monthly));

        let quarterly = [ym(2020, 7), ym(2020, 10), ym(2021, 1)];
        assert_eq!(Frequency::infer(&quarterly), Some(Frequency::Quarterly));

        assert_eq!(Frequency::infer(&[ym(2020, 1)]), Some(Frequency::Monthly));
    }

    #[test]
    fn gaps_are_not_a_frequency() {
        let gapped = [ym(2020, 1), ym(2020, 2), ym(2020, 4)];
        assert_eq!(Frequency::infer(&gapped), None);
    }

    #[test]
    fn period_of_year_counts_from_one() {
        assert_eq!(Frequency::Monthly.period_of_year(ym(2020, 12)), 12);
        assert_eq!(Frequency::Quarterly.period_of_year(ym(2020, 4)), 2);
    }

    #[test]
    fn parses_engine_tokens() {
        assert_eq!(
            parse_engine_period("200103", Frequency::Monthly),
            Some(ym(2001, 3))
        );
        assert_eq!(
            parse_engine_period("200102", Frequency::Quarterly),
            Some(ym(2001, 4))
        );
        assert_eq!(parse_engine_period("200113", Frequency::Monthly), None);
        assert_eq!(parse_engine_period("2001.03", Frequency::Monthly), None);
    }
}
