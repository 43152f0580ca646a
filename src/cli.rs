use clap::{Args as ClapArgs, Parser, Subcommand};
use residuos_report::config::{DEFAULT_LOCATION_PATH, DEFAULT_WASTE_PATH};
use residuos_report::Selection;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "residuos_report")]
#[command(about = "Rank districts by municipal solid-waste generation and its change over time")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Waste generation table (`;` separated)
    #[arg(long, env = "RESIDUOS_WASTE_CSV", default_value = DEFAULT_WASTE_PATH)]
    pub waste: PathBuf,

    /// Encoding label of the waste table
    #[arg(long, default_value = "latin1")]
    pub waste_encoding: String,

    /// District location table (`;` separated)
    #[arg(long, env = "RESIDUOS_LOCATIONS_CSV", default_value = DEFAULT_LOCATION_PATH)]
    pub locations: PathBuf,

    /// Directory for exported CSV/JSON files
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Rows shown in console previews
    #[arg(long, default_value_t = 10)]
    pub preview_rows: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Administrative scope shared by most views.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct Scope {
    #[arg(long)]
    pub department: Option<String>,
    #[arg(long)]
    pub province: Option<String>,
    #[arg(long)]
    pub period: Option<i32>,
}

impl Scope {
    pub fn selection(&self) -> Selection {
        Selection {
            department: self.department.clone(),
            province: self.province.clone(),
            period: self.period,
        }
    }
}

/// Scope for views keyed by district name. District names repeat across
/// provinces, so department and province are both required.
#[derive(ClapArgs, Debug, Clone)]
pub struct DistrictScope {
    #[arg(long)]
    pub department: String,
    #[arg(long)]
    pub province: String,
    #[arg(long)]
    pub period: Option<i32>,
}

impl DistrictScope {
    pub fn selection(&self) -> Selection {
        Selection {
            department: Some(self.department.clone()),
            province: Some(self.province.clone()),
            period: self.period,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the waste fractions that can be selected
    Measures,
    /// List departments, provinces, districts and periods inside a scope
    Options {
        #[command(flatten)]
        scope: Scope,
    },
    /// Rank districts by total tonnes of one fraction
    Districts {
        #[command(flatten)]
        scope: DistrictScope,
        #[arg(long)]
        measure: String,
    },
    /// Roll one fraction up to provinces
    Provinces {
        #[command(flatten)]
        scope: Scope,
        #[arg(long)]
        measure: String,
    },
    /// Top districts by change of one fraction between two periods
    Delta {
        #[arg(long)]
        department: String,
        #[arg(long)]
        province: Option<String>,
        #[arg(long)]
        measure: String,
        #[arg(long, default_value_t = 2019)]
        from: i32,
        #[arg(long, default_value_t = 2023)]
        to: i32,
    },
    /// Fraction breakdown of one district in one period
    Composition {
        #[arg(long)]
        district: String,
        #[arg(long)]
        period: i32,
        #[arg(long)]
        department: Option<String>,
    },
    /// Export latitude/longitude/intensity points for a map overlay
    Heat {
        #[command(flatten)]
        scope: Scope,
        #[arg(long)]
        measure: String,
    },
    /// Ranking, provincial rollup, delta and a JSON summary in one go
    Report {
        #[command(flatten)]
        scope: DistrictScope,
        #[arg(long)]
        measure: String,
        #[arg(long, default_value_t = 2019)]
        from: i32,
        #[arg(long, default_value_t = 2023)]
        to: i32,
    },
}
