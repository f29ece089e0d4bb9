//! Query the Presolar Grain Database (PGD).
//!
//! Load an export once, narrow it down by grain type and isotope-ratio cuts, and pull
//! out ratio/error pairs ready for plotting:
//!
//! ```no_run
//! use stardust::StarDust;
//!
//! # fn main() -> stardust::Result<()> {
//! let mut sd = StarDust::new()?;
//! sd.filter_type("M")?;
//! sd.filter_value(0.1, "Si-29", "Si-28", ">", false)?;
//! let (x, y, xerr, yerr) = sd
//!     .return_ratios(("Si-29", "Si-28"), ("Si-30", "Si-28"))?
//!     .into_tuple();
//! # let _ = (x, y, xerr, yerr);
//! sd.reset();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod isotope;
pub mod stardust;

pub use config::DataSource;
pub use data::filter::{Comparator, GrainTypes};
pub use data::model::{CellValue, GrainTable};
pub use data::resolve::ColumnRef;
pub use error::{Result, StarDustError};
pub use isotope::to_database_name;
pub use stardust::{MissingErrors, RatioSeries, StarDust, TYPE_COLUMN};
