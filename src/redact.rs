use crate::config::{format_tag_key, RedactionMap};
use dicom_core::dictionary::DataDictionary;
use dicom_core::value::Value;
use dicom_core::{Tag, VR};
use dicom_dictionary_std::StandardDataDictionary;
use dicom_object::mem::InMemElement;
use dicom_object::DefaultDicomObject;
use log::warn;

/// Overwrite, or insert, every tag named by the redaction map.
///
/// Only textual elements participate: an existing element keeps its value
/// representation and gets the replacement string; an absent tag is created
/// with the standard dictionary's VR (or `LO` for tags the dictionary does
/// not know). Elements holding sequences or binary payloads are left alone,
/// as is every tag the map does not name. The operation never fails and is
/// idempotent; an empty map is the identity.
pub fn redact(obj: &mut DefaultDicomObject, map: &RedactionMap) {
    for (tag, value) in map.iter() {
        apply(obj, *tag, value);
    }
}

fn apply(obj: &mut DefaultDicomObject, tag: Tag, value: &str) {
    let existing_vr = obj.element(tag).ok().map(|elem| elem.vr());

    let vr = match existing_vr {
        Some(vr) if is_text_vr(vr) => vr,
        Some(vr) => {
            warn!(
                "not redacting {}: {} is not a textual value representation",
                format_tag_key(tag),
                vr
            );
            return;
        }
        None => match dictionary_vr(tag) {
            Some(vr) if is_text_vr(vr) => vr,
            Some(vr) => {
                warn!(
                    "not inserting {}: {} is not a textual value representation",
                    format_tag_key(tag),
                    vr
                );
                return;
            }
            None => VR::LO,
        },
    };

    obj.put(InMemElement::new(tag, vr, Value::from(value)));
}

fn dictionary_vr(tag: Tag) -> Option<VR> {
    StandardDataDictionary
        .by_tag(tag)
        .map(|entry| entry.vr.relaxed())
}

pub(crate) fn is_text_vr(vr: VR) -> bool {
    matches!(
        vr,
        VR::AE
            | VR::AS
            | VR::CS
            | VR::DA
            | VR::DS
            | VR::DT
            | VR::IS
            | VR::LO
            | VR::LT
            | VR::PN
            | VR::SH
            | VR::ST
            | VR::TM
            | VR::UC
            | VR::UI
            | VR::UR
            | VR::UT
    )
}
