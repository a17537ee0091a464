use crate::config::format_tag_key;
use crate::redact::is_text_vr;
use dicom_core::dictionary::DataDictionary;
use dicom_core::value::Value;
use dicom_core::Tag;
use dicom_dictionary_std::StandardDataDictionary;
use dicom_object::InMemDicomObject;
use std::fmt;

/// One rendered dictionary entry: the tag, its human-readable label from the
/// standard data-element dictionary, and the value as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    pub tag: Tag,
    pub label: &'static str,
    pub value: String,
}

impl fmt::Display for TagEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} = {}", format_tag_key(self.tag), self.label, self.value)
    }
}

fn label_for_tag(tag: Tag) -> Option<&'static str> {
    StandardDataDictionary.by_tag(tag).map(|entry| entry.alias)
}

/// Collect every element whose value is representable as a string and whose
/// tag has a known label. Sequences and binary payloads are skipped, as are
/// tags the standard dictionary does not know; those elements still exist in
/// the dataset, they are just not rendered.
pub fn dump(obj: &InMemDicomObject<StandardDataDictionary>) -> Vec<TagEntry> {
    let mut entries = Vec::new();
    for elem in obj {
        let tag = elem.header().tag;
        if !is_text_vr(elem.header().vr) {
            continue;
        }
        let Some(label) = label_for_tag(tag) else {
            continue;
        };
        let Value::Primitive(primitive) = elem.value() else {
            continue;
        };
        entries.push(TagEntry {
            tag,
            label,
            value: primitive.to_str().into_owned(),
        });
    }
    entries
}

/// Render the entries one per line, for operator verification before and
/// after redaction.
pub fn render(entries: &[TagEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.to_string());
        out.push('\n');
    }
    out
}
