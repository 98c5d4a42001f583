use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// The class file ended in the middle of a field.
    UnexpectedEof,
    /// The first four bytes were not `0xCAFEBABE`.
    InvalidMagic(u32),
    /// The major version is outside the supported `[45, 52]` range.
    UnsupportedVersion { major: u16, minor: u16 },
    InvalidConstantPoolIndex(u16),
    InvalidConstantPoolTag(u8),
    ConstantPoolTypeMismatch {
        index: u16,
        expected: &'static str,
        found: &'static str,
    },
    InvalidModifiedUtf8,
    /// Unknown tag in an annotation element value.
    InvalidElementValueTag(u8),
    Malformed(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnexpectedEof => write!(f, "unexpected end of input"),
            Error::InvalidMagic(magic) => write!(f, "invalid classfile magic: 0x{magic:08x}"),
            Error::UnsupportedVersion { major, minor } => {
                write!(f, "unsupported classfile version: {major}.{minor}")
            }
            Error::InvalidConstantPoolIndex(index) => {
                write!(f, "invalid constant pool index: {index}")
            }
            Error::InvalidConstantPoolTag(tag) => write!(f, "invalid constant pool tag: {tag}"),
            Error::ConstantPoolTypeMismatch {
                index,
                expected,
                found,
            } => write!(
                f,
                "constant pool type mismatch at index {index}: expected {expected}, found {found}"
            ),
            Error::InvalidModifiedUtf8 => write!(f, "invalid modified UTF-8 constant"),
            Error::InvalidElementValueTag(tag) => {
                write!(f, "invalid annotation element value tag: 0x{tag:02x}")
            }
            Error::Malformed(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for Error {}
