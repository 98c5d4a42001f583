//! Class-file reading for header compilation.
//!
//! Parses the JVMS §4 binary format far enough to recover inter-module
//! signatures: access flags, the type hierarchy, field and method
//! signatures, inner-class relationships, and the one annotation that
//! matters to a header compiler (`@Retention` on annotation declarations).
//! Everything else (code attributes, debug tables, most annotations) is
//! skipped by length.

pub mod annotation;
pub mod classfile;
pub mod constant_pool;
pub mod error;
pub mod reader;

pub use annotation::{AnnotationInfo, ElementValue};
pub use classfile::{ClassFile, FieldInfo, InnerClassInfo, MethodInfo};
pub use constant_pool::{ConstValue, ConstantPool};
pub use error::{Error, Result};
pub use reader::Reader;
