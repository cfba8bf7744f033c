//! Named observances and the rules that place them in a year.
//!
//! A [`Catalog`] is plain data: a list of labels, each with a [`Rule`] and a
//! flag telling whether it belongs to the commonly celebrated subset. The
//! built-in Swedish tables are provided as constructors; further entries can
//! be deserialized from configuration and merged in with [`Catalog::extend`].

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::date_math::{
    is_leap_year, nth_weekday_of_month, normalize, weekday_on_or_after, CalendarDate,
};
use crate::easter::easter_date;
use crate::error::AlmanacError;

// ── Rules ───────────────────────────────────────────────────────────────────

/// How an observance's date is derived from the year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rule {
    /// Same month and day every year.
    Fixed { month: u32, day: u32 },
    /// Signed number of days from Easter Sunday.
    Easter { offset: i64 },
    /// First `weekday` on or after `month`/`day`, plus `extra_days`.
    WeekdayOnOrAfter {
        weekday: Weekday,
        month: u32,
        day: u32,
        #[serde(default)]
        extra_days: i64,
    },
    /// `weekday` in the `week`-th 7-day bucket of `month`, plus `extra_days`.
    NthWeekday {
        weekday: Weekday,
        month: u32,
        week: i64,
        #[serde(default)]
        extra_days: i64,
    },
    /// Fixed month and day, observed in leap years only.
    LeapYearFixed { month: u32, day: u32 },
}

impl Rule {
    /// The date this rule yields in `year`, or `None` if it does not occur.
    pub fn resolve(&self, year: i32) -> Option<CalendarDate> {
        match *self {
            Rule::Fixed { month, day } => Some(normalize(year, month as i32, i64::from(day))),
            Rule::Easter { offset } => Some(easter_date(year).add_days(offset)),
            Rule::WeekdayOnOrAfter {
                weekday,
                month,
                day,
                extra_days,
            } => {
                let reference = normalize(year, month as i32, i64::from(day));
                Some(weekday_on_or_after(weekday, reference, extra_days))
            }
            Rule::NthWeekday {
                weekday,
                month,
                week,
                extra_days,
            } => Some(nth_weekday_of_month(weekday, year, month, week, extra_days)),
            Rule::LeapYearFixed { month, day } => is_leap_year(year)
                .then(|| normalize(year, month as i32, i64::from(day))),
        }
    }

    /// Reject month/day anchors that exist in no year.
    fn validate(&self, label: &str) -> Result<(), AlmanacError> {
        let anchor = match *self {
            Rule::Easter { .. } => return Ok(()),
            Rule::NthWeekday { month, .. } => (month, 1),
            Rule::Fixed { month, day }
            | Rule::LeapYearFixed { month, day }
            | Rule::WeekdayOnOrAfter { month, day, .. } => (month, day),
        };
        // 2000 is a leap year, so February 29th passes.
        CalendarDate::new(2000, anchor.0, anchor.1)
            .map(|_| ())
            .map_err(|e| AlmanacError::InvalidDate(format!("observance '{label}': {e}")))
    }
}

// ── Catalog ─────────────────────────────────────────────────────────────────

/// A labelled rule in a [`Catalog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub label: String,
    #[serde(flatten)]
    pub rule: Rule,
    /// Whether the observance is kept when only common ones are requested.
    #[serde(default = "default_common")]
    pub common: bool,
}

fn default_common() -> bool {
    true
}

/// A named observance on a concrete date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observance {
    pub label: String,
    pub date: CalendarDate,
}

/// A configurable table of observances.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = CatalogEntry>) {
        self.entries.extend(entries);
    }

    /// Check that every fixed anchor names a day that exists.
    ///
    /// # Errors
    ///
    /// Returns [`AlmanacError::InvalidDate`] naming the first bad entry.
    pub fn validate(&self) -> Result<(), AlmanacError> {
        self.entries
            .iter()
            .try_for_each(|entry| entry.rule.validate(&entry.label))
    }

    /// Evaluate the catalog for `year` and for `year + 1`.
    ///
    /// The following year is included so that a lookahead window near the
    /// end of December still sees early-January dates. The two years are
    /// concatenated in that order and not sorted or deduplicated.
    pub fn observances(&self, year: i32, only_common: bool) -> Vec<Observance> {
        [year, year + 1]
            .into_iter()
            .flat_map(|y| {
                self.entries
                    .iter()
                    .filter(move |entry| entry.common || !only_common)
                    .filter_map(move |entry| {
                        entry.rule.resolve(y).map(|date| Observance {
                            label: entry.label.clone(),
                            date,
                        })
                    })
            })
            .collect()
    }

    /// Swedish public holidays.
    pub fn swedish_holidays() -> Self {
        Self::from_table(SWEDISH_HOLIDAYS, &[])
    }

    /// Swedish non-holiday observances: the commonly celebrated days first,
    /// then the extended list (marked not common).
    pub fn swedish_events() -> Self {
        Self::from_table(SWEDISH_COMMON_EVENTS, SWEDISH_OTHER_EVENTS)
    }

    fn from_table(common: &[(&str, Rule)], other: &[(&str, Rule)]) -> Self {
        let tagged = |table: &[(&str, Rule)], common: bool| -> Vec<CatalogEntry> {
            table
                .iter()
                .map(|(label, rule)| CatalogEntry {
                    label: (*label).to_string(),
                    rule: rule.clone(),
                    common,
                })
                .collect()
        };
        let mut entries = tagged(common, true);
        entries.extend(tagged(other, false));
        Self { entries }
    }
}

// ── Built-in tables ─────────────────────────────────────────────────────────

const fn fixed(month: u32, day: u32) -> Rule {
    Rule::Fixed { month, day }
}

const fn easter(offset: i64) -> Rule {
    Rule::Easter { offset }
}

const fn on_or_after(weekday: Weekday, month: u32, day: u32, extra_days: i64) -> Rule {
    Rule::WeekdayOnOrAfter {
        weekday,
        month,
        day,
        extra_days,
    }
}

const SWEDISH_HOLIDAYS: &[(&str, Rule)] = &[
    ("Nyårsdagen", fixed(1, 1)),
    ("Trettondedag jul", fixed(1, 6)),
    ("Första maj", fixed(5, 1)),
    ("Sveriges nationaldag", fixed(6, 6)),
    ("Juldagen", fixed(12, 25)),
    ("Annandag jul", fixed(12, 26)),
    ("Midsommardagen", on_or_after(Weekday::Sat, 6, 20, 0)),
    ("Alla helgons dag", on_or_after(Weekday::Sat, 10, 31, 0)),
    ("Annandag påsk", easter(1)),
    ("Långfredagen", easter(-2)),
    ("Kristi himmelsfärdsdag", easter(39)),
];

const SWEDISH_COMMON_EVENTS: &[(&str, Rule)] = &[
    ("Trettondagsafton", fixed(1, 5)),
    ("Alla hjärtans dag", fixed(2, 14)),
    ("Internationella kvinnodagen", fixed(3, 8)),
    ("Första april", fixed(4, 1)),
    ("Valborgsmässoafton", fixed(4, 30)),
    ("Första maj", fixed(5, 1)),
    ("Midsommarafton", on_or_after(Weekday::Fri, 6, 19, 0)),
    ("Lucia", fixed(12, 13)),
    ("Julafton", fixed(12, 24)),
    ("Allhelgonaafton", on_or_after(Weekday::Fri, 10, 30, 0)),
    ("Nyårsafton", fixed(12, 31)),
    ("Skärtorsdagen", easter(-3)),
    ("Påskdagen", easter(0)),
    ("Påskafton", easter(-1)),
    ("Pingstdagen", easter(49)),
    ("Pingstafton", easter(48)),
    ("Fettisdagen", easter(-47)),
    ("Första söndagen i advent", on_or_after(Weekday::Sun, 11, 27, 0)),
    ("Andra söndagen i advent", on_or_after(Weekday::Sun, 12, 4, 0)),
    ("Tredje söndagen i advent", on_or_after(Weekday::Sun, 12, 11, 0)),
    ("Fjärde söndagen i advent", on_or_after(Weekday::Sun, 12, 18, 0)),
];

const SWEDISH_OTHER_EVENTS: &[(&str, Rule)] = &[
    ("Palmsöndagen", easter(-7)),
    ("Förintelsens minnesdag", fixed(1, 27)),
    ("Världsreligionsdagen", on_or_after(Weekday::Sun, 1, 1, 6 * 7)),
    ("Darwindagen", fixed(2, 12)),
    ("Internationella modersmålsdagen", fixed(2, 21)),
    ("Föredetta skottdagen", Rule::LeapYearFixed { month: 2, day: 24 }),
    ("Kyndelsmässodagen", fixed(2, 2)),
    ("Sverigefinnarnas dag", fixed(2, 24)),
    ("Internationella vattendagen", fixed(3, 22)),
    ("Matematikens dag (Pi-dagen)", fixed(3, 14)),
    ("Nordens dag", fixed(3, 23)),
    ("Jungfru Marie bebådelsedag", on_or_after(Weekday::Sun, 3, 22, 0)),
    ("Världsböndagen för fred", on_or_after(Weekday::Fri, 3, 1, 0)),
    ("Världspoesidagen", fixed(3, 21)),
    ("Dansens dag", fixed(4, 29)),
    ("Försöksdjurens dag", fixed(4, 24)),
    ("Jordens dag", fixed(4, 22)),
    ("Världens konstdag", fixed(4, 15)),
    ("Världshälsodagen", fixed(4, 7)),
    ("Europadagen/Segerdagen", fixed(5, 9)),
    ("Handduksdagen", fixed(5, 25)),
    ("Internationella dagen för biologisk mångfald", fixed(5, 22)),
    ("Internationella familjedagen", fixed(5, 15)),
    ("Internationella fredssoldatdagen/Veterandagen", fixed(5, 29)),
    ("Jungfru Marie besökelsedag", fixed(5, 31)),
    ("Tobaksfria dagen", fixed(5, 31)),
    ("Världsdagen för pressfrihet", fixed(5, 3)),
    ("Internationella heraldikdagen", fixed(6, 10)),
    ("Mobilfria dagen", fixed(6, 1)),
    ("Världsmiljödagen", fixed(6, 5)),
    ("Den helige Johannes Döparens dag", on_or_after(Weekday::Sun, 6, 21, 0)),
    ("Tau-dagen", fixed(6, 28)),
    ("Mandeladagen", fixed(7, 18)),
    ("Sjusovardagen", fixed(7, 27)),
    ("Victoriadagen", fixed(7, 14)),
    ("Europeisk minnesdag för stalinismens och nazismens offer", fixed(8, 23)),
    ("Jungfru Marie himmelsfärd", fixed(8, 15)),
    ("Raoul Wallenbergs dag", fixed(8, 27)),
    ("Vänsterhäntas dag", fixed(8, 13)),
    ("Det heliga korsets upphöjelse", fixed(9, 14)),
    ("Europeiska språkdagen", fixed(9, 26)),
    ("Geologins dag", on_or_after(Weekday::Sat, 9, 1, 7)),
    ("Internationella bilfria dagen", fixed(9, 22)),
    ("Internationella fredsdagen", fixed(9, 21)),
    ("Jungfru Marie födelse", fixed(9, 8)),
    ("Jungfru Marie heliga namn", fixed(9, 12)),
    ("Software Freedom Day", fixed(9, 19)),
    ("Djurens dag", fixed(10, 4)),
    ("FN-dagen", fixed(10, 24)),
    ("Internationella dagen för utrotande av fattigdom", fixed(10, 17)),
    ("Internationella flickdagen", fixed(10, 11)),
    ("Internationella handtvättsdagen", fixed(10, 15)),
    ("Internationella stamningsdagen", fixed(10, 22)),
    ("Kanelbullens dag", fixed(10, 4)),
    ("Lantbruksdjurens dag", fixed(10, 2)),
    ("Vegetariska världsdagen", fixed(10, 1)),
    ("Världshungerdagen", fixed(10, 16)),
    ("Alla själars dag", fixed(11, 2)),
    ("Allhelgonadagen", fixed(11, 1)),
    ("Arkivens dag", on_or_after(Weekday::Sat, 11, 1, 7)),
    ("Gustav Adolfsdagen", fixed(11, 6)),
    ("Internationella dagen mot våld mot kvinnor", fixed(11, 25)),
    ("Internationella filosofidagen", on_or_after(Weekday::Thu, 11, 1, 2 * 7)),
    ("Internationella mansdagen", fixed(11, 19)),
    (
        "Internationella solidaritetsdagen med det palestinska folket",
        fixed(11, 29),
    ),
    ("Internationella vegandagen", fixed(11, 1)),
    ("Kåldolmens dag", fixed(11, 30)),
    ("Mårtensafton", fixed(11, 10)),
    ("Stilleståndsdagen", fixed(11, 11)),
    ("Världsdiabetesdagen", fixed(11, 14)),
    ("Söndagen före domssöndagen", on_or_after(Weekday::Sun, 11, 13, 0)),
    ("Söndagen efter Alla helgons dag", on_or_after(Weekday::Sat, 10, 31, 1)),
    (
        "Internationella GIS-dagen",
        Rule::NthWeekday {
            weekday: Weekday::Wed,
            month: 10,
            week: 3,
            extra_days: 0,
        },
    ),
    ("Internationella dagen för mänskliga rättigheter", fixed(12, 10)),
    ("Internationella volontärdagen", fixed(12, 5)),
    ("Tangons dag", fixed(12, 11)),
    ("Världs-AIDS-dagen", fixed(12, 1)),
    ("Värnlösa barns dag", fixed(12, 28)),
];

// ── Tests ───────────────────────────────────────────────────────────────────
