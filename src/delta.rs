// Year-over-year movement per district.
//
// Here a missing reading counts as zero generation, and a (district, period)
// pair with no row at all is zero-filled, so every district in scope gets a
// delta. The ranking views in `aggregate` skip missing readings instead.
use crate::error::{ReportError, Result};
use crate::measures::Measure;
use crate::types::FactTable;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// How many districts each mover list holds at most.
pub const TOP_MOVERS: usize = 10;

/// District × period grid of one measure's totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pivot {
    periods: BTreeSet<i32>,
    cells: BTreeMap<String, BTreeMap<i32, f64>>,
}

impl Pivot {
    /// Rows without a period take no part in the grid.
    pub fn build(table: &FactTable, measure: Measure) -> Pivot {
        let mut pivot = Pivot::default();
        for row in table.rows() {
            let Some(period) = row.period else {
                continue;
            };
            pivot.periods.insert(period);
            *pivot
                .cells
                .entry(row.district.clone())
                .or_default()
                .entry(period)
                .or_insert(0.0) += row.value(measure).unwrap_or(0.0);
        }
        pivot
    }

    /// Periods that have at least one row in scope.
    pub fn periods(&self) -> Vec<i32> {
        self.periods.iter().copied().collect()
    }

    pub fn has_period(&self, period: i32) -> bool {
        self.periods.contains(&period)
    }

    pub fn districts(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// Zero for any cell the source never mentioned.
    pub fn value(&self, district: &str, period: i32) -> f64 {
        self.cells
            .get(district)
            .and_then(|row| row.get(&period))
            .copied()
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodValues {
    pub value_a: f64,
    pub value_b: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictDelta {
    pub district: String,
    #[serde(flatten)]
    pub values: PeriodValues,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeltaReport {
    pub measure: String,
    pub period_a: i32,
    pub period_b: i32,
    pub per_district: BTreeMap<String, PeriodValues>,
    pub top_increase: Vec<DistrictDelta>,
    pub top_decrease: Vec<DistrictDelta>,
}

impl DeltaReport {
    /// Sum of every district's delta.
    pub fn net_delta(&self) -> f64 {
        self.per_district.values().map(|v| v.delta).sum()
    }
}

/// Compare `measure` between `period_a` and `period_b` for every district in
/// `table`: delta = value(B) − value(A).
///
/// Fails with `PeriodUnavailable` when either period has no rows in scope.
pub fn compute_delta(
    table: &FactTable,
    measure: &str,
    period_a: i32,
    period_b: i32,
) -> Result<DeltaReport> {
    let measure = Measure::parse(measure)?;
    let pivot = Pivot::build(table, measure);
    if !pivot.has_period(period_a) || !pivot.has_period(period_b) {
        return Err(ReportError::PeriodUnavailable {
            requested: (period_a, period_b),
            available: pivot.periods(),
        });
    }

    let per_district: BTreeMap<String, PeriodValues> = pivot
        .districts()
        .map(|d| {
            let value_a = pivot.value(d, period_a);
            let value_b = pivot.value(d, period_b);
            (
                d.to_string(),
                PeriodValues {
                    value_a,
                    value_b,
                    delta: value_b - value_a,
                },
            )
        })
        .collect();

    let mut movers: Vec<DistrictDelta> = per_district
        .iter()
        .map(|(d, v)| DistrictDelta {
            district: d.clone(),
            values: *v,
        })
        .collect();

    movers.sort_by(|a, b| by_delta(b, a).then_with(|| a.district.cmp(&b.district)));
    let top_increase = movers.iter().take(TOP_MOVERS).cloned().collect();
    movers.sort_by(|a, b| by_delta(a, b).then_with(|| a.district.cmp(&b.district)));
    let top_decrease = movers.into_iter().take(TOP_MOVERS).collect();

    debug!(
        %measure,
        period_a,
        period_b,
        districts = per_district.len(),
        "computed delta"
    );
    Ok(DeltaReport {
        measure: measure.name().to_string(),
        period_a,
        period_b,
        per_district,
        top_increase,
        top_decrease,
    })
}

fn by_delta(a: &DistrictDelta, b: &DistrictDelta) -> Ordering {
    a.values
        .delta
        .partial_cmp(&b.values.delta)
        .unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::filter_by_department;
    use crate::types::fixtures::{fact, sample_table};

    fn names(v: &[DistrictDelta]) -> Vec<&str> {
        v.iter().map(|d| d.district.as_str()).collect()
    }

    #[test]
    fn missing_later_reading_counts_as_a_drop() {
        let cusco = filter_by_department(&sample_table(), "CUSCO");
        let report = compute_delta(&cusco, "QRESIDUOS_PAPEL_BLANCO", 2019, 2023).unwrap();
        let c = report.per_district["CUSCO"];
        assert_eq!((c.value_a, c.value_b, c.delta), (50.0, 0.0, -50.0));
        assert_eq!(report.top_decrease[0].district, "CUSCO");
        assert_eq!(names(&report.top_increase), vec!["WANCHAQ", "OLLANTAYTAMBO", "CUSCO"]);
        // OLLANTAYTAMBO has no 2019 row at all; it is zero-filled.
        assert_eq!(report.per_district["OLLANTAYTAMBO"].delta, 3.0);
    }

    #[test]
    fn swapping_periods_negates_every_delta() {
        let table = sample_table();
        let forward = compute_delta(&table, "QRESIDUOS_ALIMENTOS", 2019, 2023).unwrap();
        let backward = compute_delta(&table, "QRESIDUOS_ALIMENTOS", 2023, 2019).unwrap();
        assert_eq!(forward.per_district.len(), backward.per_district.len());
        for (d, v) in &forward.per_district {
            assert_eq!(v.delta, -backward.per_district[d].delta);
        }
    }

    #[test]
    fn unavailable_period_is_reported_not_fabricated() {
        let table = sample_table();
        match compute_delta(&table, "QRESIDUOS_ALIMENTOS", 2019, 2022) {
            Err(ReportError::PeriodUnavailable { requested, available }) => {
                assert_eq!(requested, (2019, 2022));
                assert_eq!(available, vec![2019, 2023]);
            }
            other => panic!("expected PeriodUnavailable, got {other:?}"),
        }
        assert!(compute_delta(&FactTable::default(), "QRESIDUOS_ALIMENTOS", 2019, 2023).is_err());
    }

    #[test]
    fn top_lists_hold_ten_with_alphabetical_ties() {
        let mut rows = Vec::new();
        for i in 0..12 {
            let name = format!("D{:02}", i);
            rows.push(fact("X", "X", &name, 2019, &[("QRESIDUOS_PILAS", 1.0)]));
            // D00, D01 and D02 all move by 2.
            let later = if i < 2 { 3.0 } else { 1.0 + i as f64 };
            rows.push(fact("X", "X", &name, 2020, &[("QRESIDUOS_PILAS", later)]));
        }
        let report = compute_delta(&FactTable::new(rows), "QRESIDUOS_PILAS", 2019, 2020).unwrap();
        assert_eq!(report.top_increase.len(), TOP_MOVERS);
        assert_eq!(report.top_decrease.len(), TOP_MOVERS);
        assert_eq!(report.top_increase[0].district, "D11");
        assert_eq!(names(&report.top_decrease)[..4], ["D00", "D01", "D02", "D03"]);
        assert!(report
            .top_increase
            .windows(2)
            .all(|w| w[0].values.delta >= w[1].values.delta));
    }

    #[test]
    fn small_scopes_are_not_padded() {
        let lima = filter_by_department(&sample_table(), "LIMA");
        let report = compute_delta(&lima, "QRESIDUOS_ALIMENTOS", 2019, 2023).unwrap();
        assert_eq!(report.top_increase.len(), 4);
        assert_eq!(report.top_decrease.len(), 4);
        assert_eq!(report.top_decrease[0].district, "HUACHO");
        // BARRANCO only has a 2023 row with no readings: 0 → 0.
        assert_eq!(report.per_district["BARRANCO"].delta, 0.0);
        assert_eq!(report.net_delta(), -302.5);
    }

    #[test]
    fn same_named_districts_stay_apart_once_scoped_by_department() {
        let table = FactTable::new(vec![
            fact("LIMA", "CANTA", "SANTA ROSA", 2019, &[("QRESIDUOS_PILAS", 10.0)]),
            fact("LIMA", "CANTA", "SANTA ROSA", 2023, &[("QRESIDUOS_PILAS", 30.0)]),
            fact("PUNO", "MELGAR", "SANTA ROSA", 2019, &[("QRESIDUOS_PILAS", 100.0)]),
            fact("PUNO", "MELGAR", "SANTA ROSA", 2023, &[("QRESIDUOS_PILAS", 50.0)]),
        ]);
        let lima = filter_by_department(&table, "LIMA");
        let lima = compute_delta(&lima, "QRESIDUOS_PILAS", 2019, 2023).unwrap();
        assert_eq!(lima.per_district["SANTA ROSA"].delta, 20.0);
        let puno = filter_by_department(&table, "PUNO");
        let puno = compute_delta(&puno, "QRESIDUOS_PILAS", 2019, 2023).unwrap();
        assert_eq!(puno.per_district["SANTA ROSA"].delta, -50.0);

        // The grid is keyed by district name, so an unscoped table folds them.
        let merged = compute_delta(&table, "QRESIDUOS_PILAS", 2019, 2023).unwrap();
        assert_eq!(merged.per_district.len(), 1);
        assert_eq!(merged.per_district["SANTA ROSA"].delta, -30.0);
    }

    #[test]
    fn invalid_measure_comes_before_period_checks() {
        let err = compute_delta(&sample_table(), "PAPEL", 1990, 1991).unwrap_err();
        assert!(matches!(err, ReportError::InvalidMeasure { .. }));
    }
}
