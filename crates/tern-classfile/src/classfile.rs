use crate::annotation::{read_annotations, AnnotationInfo};
use crate::constant_pool::{ConstValue, ConstantPool};
use crate::error::{Error, Result};
use crate::reader::Reader;

const ACC_ANNOTATION: u16 = 0x2000;

/// The header-relevant contents of one class file.
#[derive(Debug, Clone)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub access_flags: u16,
    /// Internal-form name, e.g. `p/Outer$Inner`.
    pub this_class: String,
    /// Generic signature, when the class declares one.
    pub signature: Option<String>,
    /// `None` only for `java/lang/Object`.
    pub super_class: Option<String>,
    /// Direct interfaces in declaration order.
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    /// Inner-class records naming this class as inner or outer; all others
    /// are dropped during parsing.
    pub inner_classes: Vec<InnerClassInfo>,
    /// Retained annotations. Populated only for annotation declarations,
    /// and then only with `@Retention`; empty otherwise.
    pub annotations: Vec<AnnotationInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub constant_value: Option<ConstValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    /// Thrown exception class names in declaration order.
    pub exceptions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClassInfo {
    pub inner_class: String,
    pub outer_class: Option<String>,
    pub inner_name: Option<String>,
    pub access_flags: u16,
}

impl ClassFile {
    /// Parses one class file.
    ///
    /// Accepts major versions 45 through 52. Attributes that do not affect
    /// header compilation are skipped by their recorded length.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let magic = reader.read_u4()?;
        if magic != 0xCAFEBABE {
            return Err(Error::InvalidMagic(magic));
        }

        let minor_version = reader.read_u2()?;
        let major_version = reader.read_u2()?;
        if !(45..=52).contains(&major_version) {
            return Err(Error::UnsupportedVersion {
                major: major_version,
                minor: minor_version,
            });
        }

        let cp = ConstantPool::parse(&mut reader)?;

        let access_flags = reader.read_u2()?;
        let this_class = cp.get_class_name(reader.read_u2()?)?.to_string();
        let super_class_idx = reader.read_u2()?;
        let super_class = if super_class_idx == 0 {
            None
        } else {
            Some(cp.get_class_name(super_class_idx)?.to_string())
        };

        let interfaces_count = reader.read_u2()? as usize;
        let mut interfaces = Vec::with_capacity(interfaces_count);
        for _ in 0..interfaces_count {
            interfaces.push(cp.get_class_name(reader.read_u2()?)?.to_string());
        }

        let fields_count = reader.read_u2()? as usize;
        let mut fields = Vec::with_capacity(fields_count);
        for _ in 0..fields_count {
            fields.push(parse_field(&mut reader, &cp)?);
        }

        let methods_count = reader.read_u2()? as usize;
        let mut methods = Vec::with_capacity(methods_count);
        for _ in 0..methods_count {
            methods.push(parse_method(&mut reader, &cp)?);
        }

        let class_attrs = parse_attributes(
            &mut reader,
            &cp,
            AttributeTarget::Class {
                access_flags,
                this_class: this_class.as_str(),
            },
        )?;

        reader.ensure_empty()?;

        Ok(Self {
            minor_version,
            major_version,
            access_flags,
            this_class,
            signature: class_attrs.signature,
            super_class,
            interfaces,
            fields,
            methods,
            inner_classes: class_attrs.inner_classes,
            annotations: class_attrs.annotations,
        })
    }
}

fn parse_field(reader: &mut Reader<'_>, cp: &ConstantPool<'_>) -> Result<FieldInfo> {
    let access_flags = reader.read_u2()?;
    let name = cp.get_utf8(reader.read_u2()?)?.to_string();
    let descriptor = cp.get_utf8(reader.read_u2()?)?.to_string();

    let attrs = parse_attributes(reader, cp, AttributeTarget::Field)?;
    Ok(FieldInfo {
        access_flags,
        name,
        descriptor,
        // Field Signature attributes carry no information header binding
        // needs beyond the descriptor.
        signature: None,
        constant_value: attrs.constant_value,
    })
}

fn parse_method(reader: &mut Reader<'_>, cp: &ConstantPool<'_>) -> Result<MethodInfo> {
    let access_flags = reader.read_u2()?;
    let name = cp.get_utf8(reader.read_u2()?)?.to_string();
    let descriptor = cp.get_utf8(reader.read_u2()?)?.to_string();

    let attrs = parse_attributes(reader, cp, AttributeTarget::Method)?;
    Ok(MethodInfo {
        access_flags,
        name,
        descriptor,
        signature: attrs.signature,
        exceptions: attrs.exceptions,
    })
}

#[derive(Default)]
struct ParsedAttributes {
    signature: Option<String>,
    constant_value: Option<ConstValue>,
    exceptions: Vec<String>,
    inner_classes: Vec<InnerClassInfo>,
    annotations: Vec<AnnotationInfo>,
}

#[derive(Clone, Copy)]
enum AttributeTarget<'c> {
    Class { access_flags: u16, this_class: &'c str },
    Field,
    Method,
}

fn parse_attributes(
    reader: &mut Reader<'_>,
    cp: &ConstantPool<'_>,
    target: AttributeTarget<'_>,
) -> Result<ParsedAttributes> {
    let attributes_count = reader.read_u2()? as usize;
    let mut parsed = ParsedAttributes::default();
    for _ in 0..attributes_count {
        let name_index = reader.read_u2()?;
        let length = reader.read_u4()? as usize;
        let info = reader.read_bytes(length)?;
        let name = cp.get_utf8(name_index)?;

        let mut sub = Reader::new(info);
        match name {
            "ConstantValue" if matches!(target, AttributeTarget::Field) => {
                parsed.constant_value = Some(cp.get_constant(sub.read_u2()?)?);
                sub.ensure_empty()?;
            }
            "Exceptions" if matches!(target, AttributeTarget::Method) => {
                let number_of_exceptions = sub.read_u2()? as usize;
                let mut exceptions = Vec::with_capacity(number_of_exceptions);
                for _ in 0..number_of_exceptions {
                    exceptions.push(cp.get_class_name(sub.read_u2()?)?.to_string());
                }
                parsed.exceptions = exceptions;
                sub.ensure_empty()?;
            }
            "Signature" if !matches!(target, AttributeTarget::Field) => {
                parsed.signature = Some(cp.get_utf8(sub.read_u2()?)?.to_string());
                sub.ensure_empty()?;
            }
            "InnerClasses" => {
                if let AttributeTarget::Class { this_class, .. } = target {
                    parsed.inner_classes = parse_inner_classes(&mut sub, cp, this_class)?;
                    sub.ensure_empty()?;
                }
            }
            "RuntimeVisibleAnnotations" => {
                // Only @Retention on an annotation declaration affects header
                // compilation; for every other class the payload is skipped.
                if let AttributeTarget::Class { access_flags, .. } = target {
                    if access_flags & ACC_ANNOTATION != 0 {
                        parsed.annotations = read_annotations(&mut sub, cp)?;
                        sub.ensure_empty()?;
                    }
                }
            }
            _ => {
                // Unknown attribute: intentionally skipped.
            }
        }
    }

    Ok(parsed)
}

fn parse_inner_classes(
    reader: &mut Reader<'_>,
    cp: &ConstantPool<'_>,
    this_class: &str,
) -> Result<Vec<InnerClassInfo>> {
    let number_of_classes = reader.read_u2()? as usize;
    let mut inner_classes = Vec::new();
    for _ in 0..number_of_classes {
        let inner_class_info_index = reader.read_u2()?;
        let outer_class_info_index = reader.read_u2()?;
        let inner_name_index = reader.read_u2()?;
        let inner_access_flags = reader.read_u2()?;

        let inner_class = cp.get_class_name(inner_class_info_index)?;
        let outer_class = if outer_class_info_index == 0 {
            None
        } else {
            Some(cp.get_class_name(outer_class_info_index)?)
        };
        let inner_name = if inner_name_index == 0 {
            None
        } else {
            Some(cp.get_utf8(inner_name_index)?)
        };

        // Keep only records describing this class or one of its members.
        if inner_class == this_class || outer_class == Some(this_class) {
            inner_classes.push(InnerClassInfo {
                inner_class: inner_class.to_string(),
                outer_class: outer_class.map(str::to_string),
                inner_name: inner_name.map(str::to_string),
                access_flags: inner_access_flags,
            });
        }
    }
    Ok(inner_classes)
}
