// Point intensities for the map overlay.
use crate::error::Result;
use crate::measures::Measure;
use crate::types::FactTable;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub intensity: f64,
}

/// One point per fact row. Rows missing a coordinate or a reading, or with a
/// negative reading, are left out.
pub fn heat_points(table: &FactTable, measure: &str) -> Result<Vec<HeatPoint>> {
    let measure = Measure::parse(measure)?;
    Ok(table
        .rows()
        .iter()
        .filter_map(|r| {
            Some(HeatPoint {
                latitude: r.latitude?,
                longitude: r.longitude?,
                intensity: r.value(measure).filter(|v| *v >= 0.0)?,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::fact;

    #[test]
    fn incomplete_triples_are_excluded() {
        let mut located = fact("A", "P", "X", 2019, &[("QRESIDUOS_PILAS", 2.0)]);
        located.latitude = Some(-12.1);
        located.longitude = Some(-77.0);
        let mut no_lon = located.clone();
        no_lon.longitude = None;
        let mut no_reading = located.clone();
        no_reading.fractions = vec![None; no_reading.fractions.len()];
        let mut negative = fact("A", "P", "Y", 2019, &[("QRESIDUOS_PILAS", -1.0)]);
        negative.latitude = Some(-13.5);
        negative.longitude = Some(-71.9);

        let table = FactTable::new(vec![located, no_lon, no_reading, negative]);
        let points = heat_points(&table, "QRESIDUOS_PILAS").unwrap();
        assert_eq!(
            points,
            vec![HeatPoint { latitude: -12.1, longitude: -77.0, intensity: 2.0 }]
        );
    }

    #[test]
    fn unknown_measure_is_rejected() {
        assert!(heat_points(&FactTable::default(), "LATITUD").is_err());
    }
}
