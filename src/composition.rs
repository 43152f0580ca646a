use crate::measures::Measure;
use crate::types::FactTable;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FractionQuantity {
    pub fraction: &'static str,
    pub quantity: f64,
}

/// Breakdown of one district's waste in one period across every fraction.
///
/// Rows matching (district, period) are summed per fraction; missing readings
/// are left out rather than counted as zero. Fractions with no reading or a
/// total ≤ 0 are dropped. The result keeps the declared fraction order.
pub fn composition(table: &FactTable, district: &str, period: i32) -> Vec<FractionQuantity> {
    let rows: Vec<_> = table
        .rows()
        .iter()
        .filter(|r| r.district == district && r.period == Some(period))
        .collect();

    Measure::all()
        .filter_map(|m| {
            let quantity = rows
                .iter()
                .filter_map(|r| r.value(m))
                .fold(None, |acc: Option<f64>, v| Some(acc.unwrap_or(0.0) + v))?;
            (quantity > 0.0).then_some(FractionQuantity {
                fraction: m.name(),
                quantity,
            })
        })
        .collect()
}

/// Each part's share of the whole, in the same order. Empty input gives an
/// empty result.
pub fn proportions(parts: &[FractionQuantity]) -> Vec<f64> {
    let total: f64 = parts.iter().map(|p| p.quantity).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    parts.iter().map(|p| p.quantity / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measures::FRACTIONS;
    use crate::types::fixtures::{fact, sample_table};

    #[test]
    fn only_positive_fractions_in_declared_order() {
        let table = FactTable::new(vec![fact(
            "LIMA",
            "LIMA",
            "SURCO",
            2023,
            &[
                ("QRESIDUOS_PILAS", 2.0),
                ("QRESIDUOS_ALIMENTOS", 10.0),
                ("QRESIDUOS_MADERA", 0.0),
                ("QRESIDUOS_ALUMINIO", -1.0),
            ],
        )]);
        let parts = composition(&table, "SURCO", 2023);
        let names: Vec<_> = parts.iter().map(|p| p.fraction).collect();
        assert_eq!(names, vec!["QRESIDUOS_ALIMENTOS", "QRESIDUOS_PILAS"]);
        assert!(parts.iter().all(|p| p.quantity > 0.0));
        let pos = |n: &str| FRACTIONS.iter().position(|f| *f == n).unwrap();
        assert!(pos(names[0]) < pos(names[1]));
    }

    #[test]
    fn duplicate_rows_are_summed_per_fraction() {
        let table = FactTable::new(vec![
            fact("A", "P", "X", 2020, &[("QRESIDUOS_PILAS", 1.0)]),
            fact("A", "P", "X", 2020, &[("QRESIDUOS_PILAS", 2.5), ("QRESIDUOS_MALEZA", 4.0)]),
            fact("A", "P", "X", 2021, &[("QRESIDUOS_PILAS", 100.0)]),
        ]);
        let parts = composition(&table, "X", 2020);
        assert_eq!(
            parts,
            vec![
                FractionQuantity { fraction: "QRESIDUOS_MALEZA", quantity: 4.0 },
                FractionQuantity { fraction: "QRESIDUOS_PILAS", quantity: 3.5 },
            ]
        );
    }

    #[test]
    fn proportions_sum_to_one() {
        let parts = composition(&sample_table(), "MIRAFLORES", 2019);
        assert_eq!(parts.len(), 2);
        let shares = proportions(&parts);
        let total: f64 = shares.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_key_or_all_missing_gives_nothing() {
        let table = sample_table();
        assert!(composition(&table, "BARRANCO", 2023).is_empty());
        assert!(composition(&table, "SURCO", 2021).is_empty());
        assert!(proportions(&[]).is_empty());
    }
}
