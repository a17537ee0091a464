use crate::config::RedactionMap;
use crate::errors::RunError;
use crate::naming;
use crate::redact::redact;
use dicom_core::Tag;
use dicom_dictionary_std::tags;
use dicom_object::{open_file, DefaultDicomObject};
use log::info;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Spatial extents of the reconstructed volume: one 2-D slice per file,
/// stacked along the series axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeShape {
    pub rows: u16,
    pub columns: u16,
    pub depth: usize,
}

#[derive(Debug)]
struct Slice {
    path: PathBuf,
    object: DefaultDicomObject,
}

/// One decoded multi-slice series: an ordered set of slice files, each with
/// its own dataset, plus the volume shape they compose.
///
/// The slice order is derived from acquisition metadata, not lexical file
/// names, and is reused verbatim when writing, which is what keeps each
/// output slice paired with its own dictionary and pixel payload.
#[derive(Debug)]
pub struct Series {
    slices: Vec<Slice>,
    shape: VolumeShape,
}

impl Series {
    /// Decode every slice file in `dir` and assemble them into an ordered
    /// series. Fails on the first unreadable file, when the directory holds
    /// more than one series, or when the slices do not compose a coherent
    /// volume.
    pub fn open(dir: &Path) -> Result<Self, RunError> {
        let mut paths: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                !path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with('.'))
            })
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(RunError::Series(format!(
                "no slice files found in {}",
                dir.display()
            )));
        }

        let mut slices = Vec::with_capacity(paths.len());
        for path in paths {
            let object = open_file(&path).map_err(|source| RunError::Read {
                path: path.clone(),
                source,
            })?;
            slices.push(Slice { path, object });
        }

        order_slices(&mut slices)?;
        check_single_series(&slices)?;
        let shape = volume_shape(&slices)?;

        Ok(Series { slices, shape })
    }

    pub fn shape(&self) -> VolumeShape {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Slice file paths in series order.
    pub fn slice_paths(&self) -> impl Iterator<Item = &Path> {
        self.slices.iter().map(|slice| slice.path.as_path())
    }

    /// Per-slice datasets, index-aligned with [`Series::slice_paths`].
    pub fn objects(&self) -> impl Iterator<Item = &DefaultDicomObject> {
        self.slices.iter().map(|slice| &slice.object)
    }

    pub(crate) fn first_object(&self) -> &DefaultDicomObject {
        &self.slices[0].object
    }

    /// Apply the redaction map to every slice's dictionary. Each slice owns
    /// a distinct dictionary, so the map is applied once per slice.
    pub fn redact_all(&mut self, map: &RedactionMap) {
        for slice in &mut self.slices {
            redact(&mut slice.object, map);
        }
    }

    /// Write every slice into `out_dir`, in series order, under its input
    /// base name. The first failure aborts the remaining writes; slices
    /// already written are left on disk.
    pub fn write_to(&self, out_dir: &Path) -> Result<Vec<PathBuf>, RunError> {
        let mut written = Vec::with_capacity(self.slices.len());
        for (index, slice) in self.slices.iter().enumerate() {
            let name = slice
                .path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(format!("slice_{:04}.dcm", index + 1)));
            let out_path = out_dir.join(name);
            slice
                .object
                .write_to_file(&out_path)
                .map_err(|source| RunError::Write {
                    path: out_path.clone(),
                    source,
                })?;
            written.push(out_path);
        }
        Ok(written)
    }
}

/// Order slices the way the acquisition laid them out: by position along
/// the slice normal when every slice carries position data, by instance
/// number when every slice carries one, and by file name as a last resort
/// (the paths arrive lexically sorted). Slices whose image orientation
/// disagrees with the rest of the series fail the run.
fn order_slices(slices: &mut Vec<Slice>) -> Result<(), RunError> {
    let order = if let Some(keys) = position_keys(slices)? {
        sorted_order(keys.len(), |a, b| {
            keys[a].partial_cmp(&keys[b]).unwrap_or(Ordering::Equal)
        })
    } else if let Some(keys) = instance_number_keys(slices) {
        sorted_order(keys.len(), |a, b| keys[a].cmp(&keys[b]))
    } else {
        return Ok(());
    };

    let mut taken: Vec<Option<Slice>> = slices.drain(..).map(Some).collect();
    slices.extend(order.into_iter().filter_map(|index| taken[index].take()));
    Ok(())
}

fn sorted_order(len: usize, cmp: impl Fn(usize, usize) -> Ordering) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.sort_by(|&a, &b| cmp(a, b));
    order
}

fn position_keys(slices: &[Slice]) -> Result<Option<Vec<f64>>, RunError> {
    let Some(orientation) = slice_orientation(&slices[0]) else {
        return Ok(None);
    };

    // every slice carrying an orientation must agree with the first one
    for slice in &slices[1..] {
        if let Some(other) = slice_orientation(slice) {
            if orientation
                .iter()
                .zip(&other)
                .any(|(a, b)| (a - b).abs() > 1e-3)
            {
                return Err(RunError::Series(format!(
                    "slice {} has an inconsistent image orientation",
                    slice.path.display()
                )));
            }
        }
    }

    let row = [orientation[0], orientation[1], orientation[2]];
    let col = [orientation[3], orientation[4], orientation[5]];
    let normal = cross(row, col);

    let keys = slices
        .iter()
        .map(|slice| {
            let position = slice
                .object
                .element(tags::IMAGE_POSITION_PATIENT)
                .ok()?
                .to_multi_float64()
                .ok()?;
            if position.len() != 3 {
                return None;
            }
            Some(dot([position[0], position[1], position[2]], normal))
        })
        .collect();
    Ok(keys)
}

fn slice_orientation(slice: &Slice) -> Option<Vec<f64>> {
    let orientation = slice
        .object
        .element(tags::IMAGE_ORIENTATION_PATIENT)
        .ok()?
        .to_multi_float64()
        .ok()?;
    (orientation.len() == 6).then_some(orientation)
}

fn instance_number_keys(slices: &[Slice]) -> Option<Vec<i64>> {
    slices
        .iter()
        .map(|slice| {
            slice
                .object
                .element(tags::INSTANCE_NUMBER)
                .ok()?
                .to_int::<i64>()
                .ok()
        })
        .collect()
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn check_single_series(slices: &[Slice]) -> Result<(), RunError> {
    let mut series_uid: Option<String> = None;
    for slice in slices {
        let Ok(elem) = slice.object.element(tags::SERIES_INSTANCE_UID) else {
            continue;
        };
        let Ok(uid) = elem.to_str() else {
            continue;
        };
        let uid = uid.trim_end_matches('\0').to_string();
        match &series_uid {
            None => series_uid = Some(uid),
            Some(expected) if *expected != uid => {
                return Err(RunError::Series(format!(
                    "directory holds more than one series ({expected} and {uid})"
                )));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn volume_shape(slices: &[Slice]) -> Result<VolumeShape, RunError> {
    let first = slices
        .first()
        .ok_or_else(|| RunError::Series("series has no slices".into()))?;
    let rows = slice_extent(first, tags::ROWS)?;
    let columns = slice_extent(first, tags::COLUMNS)?;

    for slice in &slices[1..] {
        let slice_rows = slice_extent(slice, tags::ROWS)?;
        let slice_columns = slice_extent(slice, tags::COLUMNS)?;
        if (slice_rows, slice_columns) != (rows, columns) {
            return Err(RunError::Series(format!(
                "slice {} is {}x{}, expected {}x{}",
                slice.path.display(),
                slice_rows,
                slice_columns,
                rows,
                columns
            )));
        }
    }

    // paths, dictionaries and the series axis extent stay index-aligned
    Ok(VolumeShape {
        rows,
        columns,
        depth: slices.len(),
    })
}

fn slice_extent(slice: &Slice, tag: Tag) -> Result<u16, RunError> {
    slice
        .object
        .element(tag)
        .ok()
        .and_then(|elem| elem.to_int::<u16>().ok())
        .ok_or_else(|| {
            RunError::Series(format!(
                "slice {} has no usable image extents",
                slice.path.display()
            ))
        })
}

/// Decode a series directory, redact every slice, and re-encode the slices
/// into a freshly created `output_<stamp>/` directory under `output_base`.
/// Returns the output directory path.
pub fn run(
    dir: &Path,
    map: &RedactionMap,
    output_base: &Path,
    dump: bool,
) -> Result<PathBuf, RunError> {
    let mut series = Series::open(dir)?;
    info!(
        "decoded {} slices of {}x{}",
        series.shape().depth,
        series.shape().rows,
        series.shape().columns
    );

    if dump {
        print!("{}", crate::dump::render(&crate::dump::dump(series.first_object())));
    }

    series.redact_all(map);

    if dump {
        print!("{}", crate::dump::render(&crate::dump::dump(series.first_object())));
    }

    let out_dir = naming::series_output_dir(output_base, &naming::timestamp());
    // create_dir, not create_dir_all: an existing directory from a run in
    // the same second is a collision and must fail fast
    fs::create_dir(&out_dir).map_err(|source| RunError::OutputDir {
        path: out_dir.clone(),
        source,
    })?;

    let written = series.write_to(&out_dir)?;
    info!("wrote {} slices to {}", written.len(), out_dir.display());
    Ok(out_dir)
}
