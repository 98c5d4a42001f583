use once_cell::unsync::OnceCell;

use crate::error::{Error, Result};
use crate::reader::Reader;

/// A typed literal constant, as referenced by `ConstantValue` attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

#[derive(Debug, Clone)]
pub(crate) enum CpInfo<'a> {
    /// Raw modified-UTF-8 bytes; decoded on first lookup and cached.
    Utf8 {
        bytes: &'a [u8],
        decoded: OnceCell<String>,
    },
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class { name_index: u16 },
    String { string_index: u16 },
    Fieldref,
    Methodref,
    InterfaceMethodref,
    NameAndType,
    MethodHandle,
    MethodType,
    Dynamic,
    InvokeDynamic,
    Module,
    Package,
}

impl CpInfo<'_> {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            CpInfo::Utf8 { .. } => "Utf8",
            CpInfo::Integer(_) => "Integer",
            CpInfo::Float(_) => "Float",
            CpInfo::Long(_) => "Long",
            CpInfo::Double(_) => "Double",
            CpInfo::Class { .. } => "Class",
            CpInfo::String { .. } => "String",
            CpInfo::Fieldref => "Fieldref",
            CpInfo::Methodref => "Methodref",
            CpInfo::InterfaceMethodref => "InterfaceMethodref",
            CpInfo::NameAndType => "NameAndType",
            CpInfo::MethodHandle => "MethodHandle",
            CpInfo::MethodType => "MethodType",
            CpInfo::Dynamic => "Dynamic",
            CpInfo::InvokeDynamic => "InvokeDynamic",
            CpInfo::Module => "Module",
            CpInfo::Package => "Package",
        }
    }
}

/// A parsed constant pool.
///
/// The pool is consumed once at the start of a class-file parse. Entries the
/// header compiler has no use for are decoded only far enough to advance the
/// cursor; UTF-8 entries keep their raw byte span and are decoded lazily.
#[derive(Debug, Clone)]
pub struct ConstantPool<'a> {
    entries: Vec<Option<CpInfo<'a>>>,
}

impl<'a> ConstantPool<'a> {
    pub fn parse(reader: &mut Reader<'a>) -> Result<Self> {
        let count = reader.read_u2()? as usize;
        if count == 0 {
            return Err(Error::Malformed("constant_pool_count must be >= 1"));
        }

        let mut entries = vec![None; count];
        let mut i = 1usize;
        while i < count {
            let tag = reader.read_u1()?;
            let entry = match tag {
                1 => {
                    let len = reader.read_u2()? as usize;
                    let bytes = reader.read_bytes(len)?;
                    CpInfo::Utf8 {
                        bytes,
                        decoded: OnceCell::new(),
                    }
                }
                3 => CpInfo::Integer(reader.read_i4()?),
                4 => {
                    let bits = reader.read_u4()?;
                    CpInfo::Float(f32::from_bits(bits))
                }
                5 => CpInfo::Long(reader.read_i8()?),
                6 => {
                    let bits = reader.read_i8()? as u64;
                    CpInfo::Double(f64::from_bits(bits))
                }
                7 => CpInfo::Class {
                    name_index: reader.read_u2()?,
                },
                8 => CpInfo::String {
                    string_index: reader.read_u2()?,
                },
                9 => {
                    reader.skip(4)?;
                    CpInfo::Fieldref
                }
                10 => {
                    reader.skip(4)?;
                    CpInfo::Methodref
                }
                11 => {
                    reader.skip(4)?;
                    CpInfo::InterfaceMethodref
                }
                12 => {
                    reader.skip(4)?;
                    CpInfo::NameAndType
                }
                15 => {
                    reader.skip(3)?;
                    CpInfo::MethodHandle
                }
                16 => {
                    reader.skip(2)?;
                    CpInfo::MethodType
                }
                17 => {
                    reader.skip(4)?;
                    CpInfo::Dynamic
                }
                18 => {
                    reader.skip(4)?;
                    CpInfo::InvokeDynamic
                }
                19 => {
                    reader.skip(2)?;
                    CpInfo::Module
                }
                20 => {
                    reader.skip(2)?;
                    CpInfo::Package
                }
                other => return Err(Error::InvalidConstantPoolTag(other)),
            };

            // Long/Double take up two slots.
            let two_slots = matches!(entry, CpInfo::Long(_) | CpInfo::Double(_));
            entries[i] = Some(entry);
            if two_slots {
                if i + 1 >= count {
                    return Err(Error::Malformed("malformed constant pool"));
                }
                i += 2;
            } else {
                i += 1;
            }
        }

        Ok(Self { entries })
    }

    pub(crate) fn get(&self, index: u16) -> Result<&CpInfo<'a>> {
        let idx = index as usize;
        if idx == 0 || idx >= self.entries.len() {
            return Err(Error::InvalidConstantPoolIndex(index));
        }
        self.entries[idx]
            .as_ref()
            .ok_or(Error::InvalidConstantPoolIndex(index))
    }

    /// Looks up a UTF-8 entry, decoding and caching it on first access.
    pub fn get_utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            CpInfo::Utf8 { bytes, decoded } => decoded
                .get_or_try_init(|| decode_modified_utf8(bytes))
                .map(|s| s.as_str()),
            other => Err(Error::ConstantPoolTypeMismatch {
                index,
                expected: "Utf8",
                found: other.kind(),
            }),
        }
    }

    /// Looks up a class-info entry and returns the internal-form
    /// (slash-separated) class name.
    pub fn get_class_name(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            CpInfo::Class { name_index } => self.get_utf8(*name_index),
            other => Err(Error::ConstantPoolTypeMismatch {
                index,
                expected: "Class",
                found: other.kind(),
            }),
        }
    }

    /// Looks up a literal constant, following `String` indirection.
    pub fn get_constant(&self, index: u16) -> Result<ConstValue> {
        match self.get(index)? {
            CpInfo::Integer(v) => Ok(ConstValue::Int(*v)),
            CpInfo::Long(v) => Ok(ConstValue::Long(*v)),
            CpInfo::Float(v) => Ok(ConstValue::Float(*v)),
            CpInfo::Double(v) => Ok(ConstValue::Double(*v)),
            CpInfo::String { string_index } => {
                Ok(ConstValue::String(self.get_utf8(*string_index)?.to_string()))
            }
            other => Err(Error::ConstantPoolTypeMismatch {
                index,
                expected: "Integer, Long, Float, Double or String",
                found: other.kind(),
            }),
        }
    }
}

fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    // Modified UTF-8 as used in class files is essentially UTF-8 for the BMP
    // plus:
    // - NUL encoded as 0xC0 0x80
    // - Supplementary characters encoded as surrogate pairs (CESU-8 style)
    //
    // We decode into UTF-16 code units and then convert via from_utf16.
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0usize;
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            units.push(b as u16);
            i += 1;
            continue;
        }

        if (b & 0xE0) == 0xC0 {
            if i + 1 >= bytes.len() {
                return Err(Error::InvalidModifiedUtf8);
            }
            let b2 = bytes[i + 1];
            if b == 0xC0 && b2 == 0x80 {
                units.push(0);
            } else {
                if (b2 & 0xC0) != 0x80 {
                    return Err(Error::InvalidModifiedUtf8);
                }
                let value = (((b & 0x1F) as u16) << 6) | ((b2 & 0x3F) as u16);
                units.push(value);
            }
            i += 2;
            continue;
        }

        if (b & 0xF0) == 0xE0 {
            if i + 2 >= bytes.len() {
                return Err(Error::InvalidModifiedUtf8);
            }
            let b2 = bytes[i + 1];
            let b3 = bytes[i + 2];
            if (b2 & 0xC0) != 0x80 || (b3 & 0xC0) != 0x80 {
                return Err(Error::InvalidModifiedUtf8);
            }
            let value =
                (((b & 0x0F) as u16) << 12) | (((b2 & 0x3F) as u16) << 6) | ((b3 & 0x3F) as u16);
            units.push(value);
            i += 3;
            continue;
        }

        // Modified UTF-8 never uses 4-byte sequences; supplementary code
        // points arrive as two 3-byte surrogate encodings.
        return Err(Error::InvalidModifiedUtf8);
    }

    // Java identifiers may legally contain unpaired surrogate values, so use
    // lossy decoding instead of rejecting the entire class file.
    Ok(String::from_utf16_lossy(&units))
}
