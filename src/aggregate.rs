use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::data::PopulationRecord;

/// Year-over-year change for one prefecture.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PrefectureDelta {
    pub region: Option<String>,
    pub prefecture: String,
    pub prefecture_code: Option<String>,
    pub population: u64,
    pub delta: i64,
    pub absolute_delta: u64,
}

/// Largest grower and largest shrinker of a year.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExtremeMovers {
    pub grower: PrefectureDelta,
    pub shrinker: PrefectureDelta,
}

/// National population per year, ascending by year.
pub fn yearly_national_total(records: &[PopulationRecord]) -> Vec<(i32, u64)> {
    let mut totals: BTreeMap<i32, u64> = BTreeMap::new();
    for r in records {
        *totals.entry(r.year).or_default() += r.population;
    }
    totals.into_iter().collect()
}

/// National totals for every year up to and including `year`.
pub fn line_series_up_to(records: &[PopulationRecord], year: i32) -> Vec<(i32, u64)> {
    yearly_national_total(records)
        .into_iter()
        .filter(|(y, _)| *y <= year)
        .collect()
}

pub fn national_total(records: &[PopulationRecord], year: i32) -> Option<u64> {
    let mut rows = records.iter().filter(|r| r.year == year).peekable();
    rows.peek()?;
    Some(rows.map(|r| r.population).sum())
}

/// Change of the national total against the previous year, or `None` when
/// the previous year has no data.
pub fn national_delta(records: &[PopulationRecord], year: i32) -> Option<i64> {
    let current = national_total(records, year)?;
    let prior = national_total(records, year - 1)?;
    Some(signed(current) - signed(prior))
}

pub fn year_slice(records: &[PopulationRecord], year: i32) -> Vec<&PopulationRecord> {
    records.iter().filter(|r| r.year == year).collect()
}

/// Largest population first; ties keep slice order.
pub fn rank_by_population<'a>(slice: &[&'a PopulationRecord]) -> Vec<&'a PopulationRecord> {
    let mut ranked = slice.to_vec();
    ranked.sort_by(|a, b| b.population.cmp(&a.population));
    ranked
}

/// Every prefecture of `year` with its change against `year - 1`, largest
/// growth first.
///
/// A prefecture without a record in `year - 1` counts as growing from zero.
pub fn population_delta(records: &[PopulationRecord], year: i32) -> Vec<PrefectureDelta> {
    let prior: HashMap<&str, u64> = records
        .iter()
        .filter(|r| r.year == year - 1)
        .map(|r| (r.prefecture.as_str(), r.population))
        .collect();

    let mut deltas: Vec<PrefectureDelta> = records
        .iter()
        .filter(|r| r.year == year)
        .map(|r| {
            let before = prior.get(r.prefecture.as_str()).copied().unwrap_or(0);
            let delta = signed(r.population) - signed(before);
            PrefectureDelta {
                region: r.region().map(str::to_string),
                prefecture: r.prefecture.clone(),
                prefecture_code: r.prefecture_code().map(str::to_string),
                population: r.population,
                delta,
                absolute_delta: delta.unsigned_abs(),
            }
        })
        .collect();
    deltas.sort_by(|a, b| b.delta.cmp(&a.delta));
    deltas
}

/// First and last rows of [`population_delta`]. `None` when `year - 1` has
/// no records at all, so the first year of the series shows no movers.
pub fn extreme_movers(records: &[PopulationRecord], year: i32) -> Option<ExtremeMovers> {
    if !records.iter().any(|r| r.year == year - 1) {
        return None;
    }
    let deltas = population_delta(records, year);
    let grower = deltas.first()?.clone();
    let shrinker = deltas.last()?.clone();
    Some(ExtremeMovers { grower, shrinker })
}

/// Distinct years, most recent first.
pub fn available_years(records: &[PopulationRecord]) -> Vec<i32> {
    let years: BTreeSet<i32> = records.iter().map(|r| r.year).collect();
    years.into_iter().rev().collect()
}

fn signed(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
