// Narrowing the fact table along the administrative hierarchy and by period.
//
// Every filter returns a new table; an unknown key gives an empty table, not
// an error. The domain helpers always look at the table they are given, so a
// province list built from a department-filtered table only shows that
// department's provinces.
use crate::types::{FactRow, FactTable};
use std::collections::BTreeSet;

pub fn filter_by_department(table: &FactTable, department: &str) -> FactTable {
    table.subset(|r| r.department == department)
}

pub fn filter_by_province(table: &FactTable, province: &str) -> FactTable {
    table.subset(|r| r.province == province)
}

pub fn filter_by_period(table: &FactTable, period: i32) -> FactTable {
    table.subset(|r| r.period == Some(period))
}

fn distinct<T, F>(table: &FactTable, key: F) -> Vec<T>
where
    T: Ord,
    F: Fn(&FactRow) -> Option<T>,
{
    table
        .rows()
        .iter()
        .filter_map(key)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn departments(table: &FactTable) -> Vec<String> {
    distinct(table, |r| non_empty(&r.department))
}

pub fn provinces(table: &FactTable) -> Vec<String> {
    distinct(table, |r| non_empty(&r.province))
}

pub fn districts(table: &FactTable) -> Vec<String> {
    distinct(table, |r| non_empty(&r.district))
}

pub fn periods(table: &FactTable) -> Vec<i32> {
    distinct(table, |r| r.period)
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// The filter keys chosen by a caller. Applied outermost first:
/// department, province, period.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub department: Option<String>,
    pub province: Option<String>,
    pub period: Option<i32>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn province(mut self, province: impl Into<String>) -> Self {
        self.province = Some(province.into());
        self
    }

    pub fn period(mut self, period: i32) -> Self {
        self.period = Some(period);
        self
    }

    pub fn apply(&self, table: &FactTable) -> FactTable {
        let mut scoped = table.clone();
        if let Some(dep) = &self.department {
            scoped = filter_by_department(&scoped, dep);
        }
        if let Some(prov) = &self.province {
            scoped = filter_by_province(&scoped, prov);
        }
        if let Some(period) = self.period {
            scoped = filter_by_period(&scoped, period);
        }
        scoped
    }

    /// Human-readable scope, e.g. `LIMA / LIMA / 2023`.
    pub fn describe(&self) -> String {
        let mut parts: Vec<String> = [&self.department, &self.province]
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        if let Some(p) = self.period {
            parts.push(p.to_string());
        }
        if parts.is_empty() {
            "all districts".to_string()
        } else {
            parts.join(" / ")
        }
    }
}
