use dicom_core::value::Value;
use dicom_core::{PrimitiveValue, VR};
use dicom_dictionary_std::tags;
use dicom_object::mem::InMemElement;
use dicom_object::meta::FileMetaTableBuilder;
use dicom_object::{DefaultDicomObject, FileDicomObject, FileMetaTable};

pub(crate) fn make_file_meta() -> FileMetaTable {
    make_file_meta_with_instance("2.3.4")
}

pub(crate) fn make_file_meta_with_instance(sop_instance_uid: &str) -> FileMetaTable {
    FileMetaTableBuilder::new()
        .media_storage_sop_class_uid("1.2.840.10008.5.1.4.1.1.7")
        .media_storage_sop_instance_uid(sop_instance_uid)
        .transfer_syntax("1.2.840.10008.1.2.1") // Explicit VR Little Endian
        .build()
        .unwrap()
}

/// A small but complete dataset: identifying tags, image shape and a 2x2
/// 8-bit pixel payload.
pub(crate) fn sample_object() -> DefaultDicomObject {
    sample_object_with_pixels(vec![0, 64, 128, 255])
}

pub(crate) fn sample_object_with_pixels(pixels: Vec<u8>) -> DefaultDicomObject {
    sample_object_with(make_file_meta(), pixels)
}

/// One slice of a synthetic series: shared series UID, per-slice SOP
/// instance UID, instance number and pixel payload derived from `instance`.
pub(crate) fn sample_slice(instance: i32) -> DefaultDicomObject {
    let meta = make_file_meta_with_instance(&format!("2.3.4.{instance}"));
    let mut obj = sample_object_with(meta, vec![instance as u8; 4]);
    obj.put(InMemElement::new(
        tags::SERIES_INSTANCE_UID,
        VR::UI,
        Value::from("1.2.3.4.5"),
    ));
    obj.put(InMemElement::new(
        tags::INSTANCE_NUMBER,
        VR::IS,
        Value::from(instance.to_string()),
    ));
    obj
}

/// Write a series of slices into a fresh temporary directory. Each entry is
/// `(file name, instance number)`; file names are free-form so tests can
/// make lexical order disagree with acquisition order.
pub(crate) fn sample_series_dir(slices: &[(&str, i32)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, instance) in slices {
        sample_slice(*instance)
            .write_to_file(dir.path().join(name))
            .unwrap();
    }
    dir
}

fn sample_object_with(meta: FileMetaTable, pixels: Vec<u8>) -> DefaultDicomObject {
    let mut obj = FileDicomObject::new_empty_with_meta(meta);
    obj.put(InMemElement::new(
        tags::PATIENT_NAME,
        VR::PN,
        Value::from("Jane Roe"),
    ));
    obj.put(InMemElement::new(
        tags::PATIENT_ID,
        VR::LO,
        Value::from("PAT123"),
    ));
    obj.put(InMemElement::new(
        tags::MODALITY,
        VR::CS,
        Value::from("OT"),
    ));
    obj.put(InMemElement::new(
        tags::ROWS,
        VR::US,
        Value::from(PrimitiveValue::from(2_u16)),
    ));
    obj.put(InMemElement::new(
        tags::COLUMNS,
        VR::US,
        Value::from(PrimitiveValue::from(2_u16)),
    ));
    obj.put(InMemElement::new(
        tags::BITS_ALLOCATED,
        VR::US,
        Value::from(PrimitiveValue::from(8_u16)),
    ));
    obj.put(InMemElement::new(
        tags::PIXEL_DATA,
        VR::OB,
        Value::from(PrimitiveValue::from(pixels)),
    ));
    obj
}
