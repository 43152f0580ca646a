// Turning view results into display rows and the JSON summary.
//
// This is the presentation boundary: numbers become grouped, fixed-decimal
// strings here and nowhere else.
use crate::aggregate::{aggregate_by_district, aggregate_by_province, GroupTotal};
use crate::composition::{proportions, FractionQuantity};
use crate::delta::{compute_delta, DeltaReport, DistrictDelta};
use crate::error::Result;
use crate::filter::{districts, Selection};
use crate::measures::Measure;
use crate::types::{CompositionRow, DeltaRow, FactTable, RankingRow, SummaryStats};
use crate::util::format_number;
use tracing::warn;

pub fn ranking_rows(totals: &[GroupTotal]) -> Vec<RankingRow> {
    totals
        .iter()
        .enumerate()
        .map(|(idx, g)| RankingRow {
            rank: idx + 1,
            name: g.name.clone(),
            tonnes: format_number(g.total, 2),
        })
        .collect()
}

pub fn delta_rows(movers: &[DistrictDelta]) -> Vec<DeltaRow> {
    movers
        .iter()
        .enumerate()
        .map(|(idx, d)| DeltaRow {
            rank: idx + 1,
            district: d.district.clone(),
            value_a: format_number(d.values.value_a, 2),
            value_b: format_number(d.values.value_b, 2),
            delta: format_number(d.values.delta, 2),
        })
        .collect()
}

pub fn composition_rows(parts: &[FractionQuantity]) -> Vec<CompositionRow> {
    parts
        .iter()
        .zip(proportions(parts))
        .map(|(p, share)| CompositionRow {
            fraction: Measure::parse(p.fraction)
                .map(Measure::label)
                .unwrap_or(p.fraction)
                .to_string(),
            tonnes: format_number(p.quantity, 2),
            share_pct: format_number(share * 100.0, 2),
        })
        .collect()
}

/// Headline numbers for one selection. `ranking` and `delta` are whatever
/// those views produced; a view that failed is listed in `views_failed`.
pub fn generate_summary(
    scoped: &FactTable,
    selection: &Selection,
    measure: Measure,
    ranking: Option<&[GroupTotal]>,
    delta: Option<&DeltaReport>,
    views_failed: Vec<String>,
) -> SummaryStats {
    let total_tonnes = scoped.rows().iter().filter_map(|r| r.value(measure)).sum();
    SummaryStats {
        generated_at: chrono::Utc::now(),
        department: selection.department.clone(),
        province: selection.province.clone(),
        period: selection.period,
        measure: measure.name().to_string(),
        rows_in_scope: scoped.len(),
        districts_in_scope: districts(scoped).len(),
        total_tonnes,
        top_district: ranking.and_then(|r| r.first()).map(|g| g.name.clone()),
        delta_periods: delta.map(|d| (d.period_a, d.period_b)),
        net_delta: delta.map(DeltaReport::net_delta),
        views_failed,
    }
}

/// Every view of one selection, computed independently.
#[derive(Debug, Clone)]
pub struct ReportBundle {
    pub ranking: Option<Vec<GroupTotal>>,
    pub rollup: Option<Vec<GroupTotal>>,
    pub delta: Option<DeltaReport>,
    pub summary: SummaryStats,
}

/// Compute the district ranking, provincial rollup and `from` → `to` delta
/// for `selection`, plus the summary. A view that fails is left `None` and
/// named in `summary.views_failed`; only an invalid measure fails the whole
/// bundle. The delta ignores the selection's period.
pub fn run_bundle(
    table: &FactTable,
    selection: &Selection,
    measure: &str,
    from: i32,
    to: i32,
) -> Result<ReportBundle> {
    let measure = Measure::parse(measure)?;
    let scoped = selection.apply(table);
    let mut failed = Vec::new();

    let ranking = match aggregate_by_district(&scoped, measure.name()) {
        Ok(r) => Some(r),
        Err(e) => {
            warn!(error = %e, "district ranking failed");
            failed.push("district_ranking".to_string());
            None
        }
    };
    let rollup = match aggregate_by_province(&scoped, measure.name()) {
        Ok(r) => Some(r),
        Err(e) => {
            warn!(error = %e, "provincial rollup failed");
            failed.push("province_rollup".to_string());
            None
        }
    };

    let delta_scope = Selection {
        period: None,
        ..selection.clone()
    };
    let delta = match compute_delta(&delta_scope.apply(table), measure.name(), from, to) {
        Ok(d) => Some(d),
        Err(e) => {
            warn!(error = %e, "delta omitted");
            failed.push("delta".to_string());
            None
        }
    };

    let summary = generate_summary(
        &scoped,
        selection,
        measure,
        ranking.as_deref(),
        delta.as_ref(),
        failed,
    );
    Ok(ReportBundle {
        ranking,
        rollup,
        delta,
        summary,
    })
}
