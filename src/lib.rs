//! Redact DICOM metadata by overwriting a configurable set of tags, leaving
//! pixel data and every other tag untouched.
//!
//! The input is either a single DICOM file or a directory holding one
//! multi-slice series; the redaction map is a flat JSON object of canonical
//! `gggg|eeee` tag identifiers to replacement strings. Outputs are written
//! under timestamped names next to (or under) a configurable base directory.
//!
//! # Example
//!
//! ```no_run
//! use dicom_redactor::{RedactionMap, Redactor};
//!
//! let map = RedactionMap::from_path("tags.json")?;
//! let redactor = Redactor::new(map);
//! let output = redactor.run("image.dcm".as_ref())?;
//! println!("{}", output.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod dump;
pub mod errors;
pub mod naming;
pub mod redact;
pub mod series;
pub mod single;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{ConfigError, RedactionMap};
pub use errors::RunError;
pub use naming::InputKind;

use log::info;
use std::path::{Path, PathBuf};

/// Drives one redaction run: classifies the input and hands it to the
/// single-file or series pipeline, both sharing the same redaction map.
#[derive(Debug, Clone)]
pub struct Redactor {
    map: RedactionMap,
    output_base: PathBuf,
    dump: bool,
}

impl Redactor {
    /// A redactor writing its outputs into the current working directory.
    pub fn new(map: RedactionMap) -> Self {
        Self {
            map,
            output_base: PathBuf::from("."),
            dump: false,
        }
    }

    /// Base directory under which `output_<stamp>` names are created.
    pub fn with_output_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.output_base = base.into();
        self
    }

    /// Print a dump of the metadata dictionary before and after redaction.
    pub fn with_dump(mut self, dump: bool) -> Self {
        self.dump = dump;
        self
    }

    /// Run the pipeline for `input`, returning the written output path
    /// (a file in single-file mode, a directory in series mode).
    pub fn run(&self, input: &Path) -> Result<PathBuf, RunError> {
        match naming::classify(input)? {
            InputKind::SingleFile => {
                info!("processing DICOM file {}", input.display());
                single::run(input, &self.map, &self.output_base, self.dump)
            }
            InputKind::Series => {
                info!("processing DICOM series {}", input.display());
                series::run(input, &self.map, &self.output_base, self.dump)
            }
        }
    }
}
