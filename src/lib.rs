//! Rule-driven extraction of spectral lines from HITRAN `.par` files.
//!
//! Each molecule/band selection maps to a [`Rule`]: which tokens of a
//! whitespace-split line hold the wavenumber, Einstein A, lower-state
//! energy and statistical weights, and which token range must equal the
//! requested vibrational band.
//!
//! ```no_run
//! use hitran_lines::{load_hitran_file, Registry};
//!
//! print!("{}", Registry::builtin());
//! let lines = load_hitran_file("example_HITRAN_CS.par", "CS", "v_0").unwrap();
//! for line in &lines {
//!     println!("{} {} {}", line.line_name, line.wavenumber, line.einstein_a);
//! }
//! ```

pub mod data;
pub mod error;

pub use data::export::{preview, save_table};
pub use data::loader::{extract, load_hitran_file, load_with_registry};
pub use data::model::{LineRecord, LineTable, COLUMN_NAMES};
pub use data::registry::Registry;
pub use data::rules::{BandCriteria, Cut, LabelField, NumericField, Rule, TokenIndex, TokenSpan};
pub use error::{HitranError, Result};
