use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Weekday in the sheet's own order: Monday first, matching the 7-row cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Day {
    #[serde(rename = "Mon.")]
    Monday,
    #[serde(rename = "Tues.")]
    Tuesday,
    #[serde(rename = "Wed.")]
    Wednesday,
    #[serde(rename = "Thurs.")]
    Thursday,
    #[serde(rename = "Fri.")]
    Friday,
    #[serde(rename = "Sat.")]
    Saturday,
    #[serde(rename = "Sun.")]
    Sunday,
}

pub const WEEK: [Day; 7] = [
    Day::Monday,
    Day::Tuesday,
    Day::Wednesday,
    Day::Thursday,
    Day::Friday,
    Day::Saturday,
    Day::Sunday,
];

impl Day {
    pub fn for_row(id: usize) -> Day {
        WEEK[id % 7]
    }

    /// Position in [`WEEK`]. The only place the index mapping lives.
    pub fn index(self) -> usize {
        self.of_chrono().num_days_from_monday() as usize
    }

    pub fn of_date(date: NaiveDate) -> Day {
        Day::from_chrono(date.weekday())
    }

    pub fn from_chrono(weekday: Weekday) -> Day {
        match weekday {
            Weekday::Mon => Day::Monday,
            Weekday::Tue => Day::Tuesday,
            Weekday::Wed => Day::Wednesday,
            Weekday::Thu => Day::Thursday,
            Weekday::Fri => Day::Friday,
            Weekday::Sat => Day::Saturday,
            Weekday::Sun => Day::Sunday,
        }
    }

    pub fn of_chrono(self) -> Weekday {
        match self {
            Day::Monday => Weekday::Mon,
            Day::Tuesday => Weekday::Tue,
            Day::Wednesday => Weekday::Wed,
            Day::Thursday => Weekday::Thu,
            Day::Friday => Weekday::Fri,
            Day::Saturday => Weekday::Sat,
            Day::Sunday => Weekday::Sun,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Day::Monday => "Mon.",
            Day::Tuesday => "Tues.",
            Day::Wednesday => "Wed.",
            Day::Thursday => "Thurs.",
            Day::Friday => "Fri.",
            Day::Saturday => "Sat.",
            Day::Sunday => "Sun.",
        }
    }

    pub fn full_name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }
}

/// Nearest instance of `day` strictly before `date`. A date already on
/// `day` goes back a full week.
pub fn preceding(date: NaiveDate, day: Day) -> NaiveDate {
    let actual = Day::of_date(date).index() as i64;
    let target = day.index() as i64;
    let mut back = (actual - target).rem_euclid(7);
    if back == 0 {
        back = 7;
    }
    date - Duration::days(back)
}
