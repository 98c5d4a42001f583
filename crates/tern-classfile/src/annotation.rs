use crate::constant_pool::ConstantPool;
use crate::error::{Error, Result};
use crate::reader::Reader;

pub(crate) const RETENTION_DESCRIPTOR: &str = "Ljava/lang/annotation/Retention;";
const RETENTION_POLICY_DESCRIPTOR: &str = "Ljava/lang/annotation/RetentionPolicy;";

/// A retained class-level annotation.
///
/// The only annotation that affects header compilation is `@Retention` on an
/// annotation declaration, so a retained record always has `visible: true`
/// and a single `value` element binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationInfo {
    pub type_descriptor: String,
    pub visible: bool,
    pub elements: Vec<(String, ElementValue)>,
}

/// Annotation element values.
///
/// Element values are a tagged encoding of constants, enum constants, class
/// literals, nested annotations and arrays; the reader walks all of them but
/// only ever materializes the enum constant carrying the retention policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementValue {
    EnumConst {
        type_descriptor: String,
        const_name: String,
    },
}

/// Reads a `RuntimeVisibleAnnotations` payload, keeping only `@Retention`.
pub(crate) fn read_annotations(
    reader: &mut Reader<'_>,
    cp: &ConstantPool<'_>,
) -> Result<Vec<AnnotationInfo>> {
    let num_annotations = reader.read_u2()? as usize;
    let mut annotations = Vec::new();
    for _ in 0..num_annotations {
        if let Some(info) = read_annotation(reader, cp)? {
            annotations.push(info);
        }
    }
    Ok(annotations)
}

/// Extracts an `@Retention` record, or else walks over the annotation.
fn read_annotation(reader: &mut Reader<'_>, cp: &ConstantPool<'_>) -> Result<Option<AnnotationInfo>> {
    let type_index = reader.read_u2()?;
    let type_descriptor = cp.get_utf8(type_index)?;
    let retention = type_descriptor == RETENTION_DESCRIPTOR;

    let num_element_value_pairs = reader.read_u2()? as usize;
    let mut result = None;
    for _ in 0..num_element_value_pairs {
        let element_name_index = reader.read_u2()?;
        let key = cp.get_utf8(element_name_index)?;
        let keep = retention && key == "value";
        if let Some(value) = read_element_value(reader, cp, keep)? {
            if result.is_some() {
                // Well-formed files carry one `value` pair; the last one is
                // authoritative if a producer emitted several.
                tracing::warn!(
                    annotation = type_descriptor,
                    "duplicate @Retention value element"
                );
            }
            result = Some(AnnotationInfo {
                type_descriptor: type_descriptor.to_string(),
                visible: true,
                elements: vec![(key.to_string(), value)],
            });
        }
    }
    Ok(result)
}

/// Extracts the retention policy when `keep` holds, or else walks over the
/// element value.
fn read_element_value(
    reader: &mut Reader<'_>,
    cp: &ConstantPool<'_>,
    keep: bool,
) -> Result<Option<ElementValue>> {
    let tag = reader.read_u1()?;
    match tag {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => {
            reader.read_u2()?; // const_value_index
            Ok(None)
        }
        b'e' => {
            let type_name_index = reader.read_u2()?;
            let const_name_index = reader.read_u2()?;
            if keep {
                let type_descriptor = cp.get_utf8(type_name_index)?;
                if type_descriptor == RETENTION_POLICY_DESCRIPTOR {
                    return Ok(Some(ElementValue::EnumConst {
                        type_descriptor: type_descriptor.to_string(),
                        const_name: cp.get_utf8(const_name_index)?.to_string(),
                    }));
                }
            }
            Ok(None)
        }
        b'c' => {
            reader.read_u2()?; // class_info_index
            Ok(None)
        }
        b'@' => {
            read_annotation(reader, cp)?;
            Ok(None)
        }
        b'[' => {
            let num_values = reader.read_u2()? as usize;
            for _ in 0..num_values {
                read_element_value(reader, cp, false)?;
            }
            Ok(None)
        }
        other => Err(Error::InvalidElementValueTag(other)),
    }
}
