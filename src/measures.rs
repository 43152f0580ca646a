// The fixed set of waste-fraction measures.
//
// Every view that takes a measure name goes through `Measure::parse`, so an
// unknown or misspelt column is rejected before any aggregation happens.
use crate::error::{ReportError, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// Prefix shared by every fraction column of the waste source.
pub const FRACTION_PREFIX: &str = "QRESIDUOS_";

/// Domestic total column. It carries the `QRESIDUOS_` prefix but is the sum
/// of the fractions, not a fraction of its own.
pub const DOMESTIC_TOTAL: &str = "QRESIDUOS_DOM";

/// Fraction columns in source-declared order.
pub const FRACTIONS: [&str; 32] = [
    "QRESIDUOS_ALIMENTOS",
    "QRESIDUOS_MALEZA",
    "QRESIDUOS_OTROS_ORGANICOS",
    "QRESIDUOS_MADERA",
    "QRESIDUOS_PAPEL_BLANCO",
    "QRESIDUOS_PAPEL_PERIODICO",
    "QRESIDUOS_PAPEL_MIXTO",
    "QRESIDUOS_CARTON_BLANCO",
    "QRESIDUOS_CARTON_MARRON",
    "QRESIDUOS_CARTON_MIXTO",
    "QRESIDUOS_VIDRIO_TRANSPARENTE",
    "QRESIDUOS_VIDRIO_OTROS_COLORES",
    "QRESIDUOS_OTROS_VIDRIOS",
    "QRESIDUOS_TEREFLATO_POLIETILENO",
    "QRESIDUOS_POLIETILENO_ALTA_DENSIDAD",
    "QRESIDUOS_POLICLORURO_VINILO",
    "QRESIDUOS_POLIETILENO_BAJA_DENSIDAD",
    "QRESIDUOS_POLIPROPILENO",
    "QRESIDUOS_POLIESTIRENO",
    "QRESIDUOS_POLICARBONATO",
    "QRESIDUOS_TETRABRICK",
    "QRESIDUOS_BOLSAS_PLASTICAS",
    "QRESIDUOS_TECNOPOR",
    "QRESIDUOS_ALUMINIO",
    "QRESIDUOS_OTROS_METALES",
    "QRESIDUOS_TELAS_TEXTILES",
    "QRESIDUOS_CAUCHO_CUERO_JEBE",
    "QRESIDUOS_INERTES",
    "QRESIDUOS_SANITARIOS",
    "QRESIDUOS_PILAS",
    "QRESIDUOS_OTROS_PELIGROSOS",
    "QRESIDUOS_OTROS_NO_CATEGORIZADOS",
];

static FRACTION_INDEX: Lazy<HashMap<&'static str, usize>> =
    Lazy::new(|| FRACTIONS.iter().enumerate().map(|(i, f)| (*f, i)).collect());

/// A validated waste-fraction column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Measure(usize);

impl Measure {
    /// Validate a measure name against the fixed fraction set. Surrounding
    /// whitespace is ignored; case is not.
    pub fn parse(name: &str) -> Result<Measure> {
        FRACTION_INDEX
            .get(name.trim())
            .map(|&i| Measure(i))
            .ok_or_else(|| ReportError::InvalidMeasure {
                measure: name.to_string(),
            })
    }

    pub fn all() -> impl Iterator<Item = Measure> {
        (0..FRACTIONS.len()).map(Measure)
    }

    pub fn name(self) -> &'static str {
        FRACTIONS[self.0]
    }

    /// Position in `FRACTIONS`, which is also the slot in `FactRow::fractions`.
    pub fn index(self) -> usize {
        self.0
    }

    /// Column name without the shared prefix, e.g. `PAPEL_BLANCO`.
    pub fn label(self) -> &'static str {
        self.name()
            .strip_prefix(FRACTION_PREFIX)
            .unwrap_or_else(|| self.name())
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
