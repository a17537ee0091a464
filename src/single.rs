use crate::config::RedactionMap;
use crate::errors::RunError;
use crate::naming;
use crate::redact::redact;
use dicom_object::open_file;
use log::info;
use std::path::{Path, PathBuf};

/// Decode one file, redact its dictionary, re-encode under a timestamped
/// name in `output_base`. The pixel payload and the transfer syntax ride
/// through untouched. Returns the path of the written file.
pub fn run(
    input: &Path,
    map: &RedactionMap,
    output_base: &Path,
    dump: bool,
) -> Result<PathBuf, RunError> {
    let output_path = naming::single_output_path(output_base, &naming::timestamp());
    run_to(input, map, output_path, dump)
}

fn run_to(
    input: &Path,
    map: &RedactionMap,
    output_path: PathBuf,
    dump: bool,
) -> Result<PathBuf, RunError> {
    let mut obj = open_file(input).map_err(|source| RunError::Read {
        path: input.to_path_buf(),
        source,
    })?;

    if dump {
        print!("{}", crate::dump::render(&crate::dump::dump(&obj)));
    }

    redact(&mut obj, map);

    if dump {
        print!("{}", crate::dump::render(&crate::dump::dump(&obj)));
    }

    if output_path.exists() {
        // two runs within the same second would collide; fail fast instead
        // of overwriting
        return Err(RunError::OutputExists { path: output_path });
    }

    obj.write_to_file(&output_path)
        .map_err(|source| RunError::Write {
            path: output_path.clone(),
            source,
        })?;

    info!("wrote {}", output_path.display());
    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_object;
    use dicom_dictionary_std::tags;

    fn sample_map() -> RedactionMap {
        let mut map = RedactionMap::new();
        map.insert(tags::PATIENT_NAME, "ANON");
        map.insert(tags::PATIENT_ID, "000001");
        map
    }

    #[test]
    fn test_run_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.dcm");
        sample_object().write_to_file(&input).unwrap();

        let output = run(&input, &sample_map(), dir.path(), false).unwrap();
        assert!(output.is_file());

        let written = open_file(&output).unwrap();
        assert_eq!(
            written.element(tags::PATIENT_NAME).unwrap().to_str().unwrap(),
            "ANON"
        );
        assert_eq!(
            written.element(tags::PATIENT_ID).unwrap().to_str().unwrap(),
            "000001"
        );

        // pixel payload must be bit-identical to the input
        let original = open_file(&input).unwrap();
        assert_eq!(
            written
                .element(tags::PIXEL_DATA)
                .unwrap()
                .to_bytes()
                .unwrap(),
            original
                .element(tags::PIXEL_DATA)
                .unwrap()
                .to_bytes()
                .unwrap()
        );
        assert_eq!(
            written.meta().transfer_syntax,
            original.meta().transfer_syntax
        );
    }

    #[test]
    fn test_run_refuses_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.dcm");
        sample_object().write_to_file(&input).unwrap();

        // a leftover from a run in the same second must not be clobbered
        let output_path = crate::naming::single_output_path(dir.path(), "17_Jan_2024_14_05_09");
        std::fs::write(&output_path, b"leftover").unwrap();

        let err = run_to(&input, &sample_map(), output_path.clone(), false).unwrap_err();
        assert!(matches!(err, RunError::OutputExists { .. }));
        assert_eq!(err.exit_code(), 7);
        assert_eq!(std::fs::read(&output_path).unwrap(), b"leftover");
    }

    #[test]
    fn test_run_rejects_non_dicom_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("garbage.dcm");
        std::fs::write(&input, b"not a dicom file").unwrap();

        let err = run(&input, &sample_map(), dir.path(), false).unwrap_err();
        assert!(matches!(err, RunError::Read { .. }));
        assert_eq!(err.exit_code(), 5);
    }
}
