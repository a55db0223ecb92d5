//! Protocol buffer code-generator back-ends.
//!
//! The crate consumes an in-memory [`descriptor::DescriptorPool`] built from
//! `FileDescriptorProto` records and emits generated source through a
//! [`GeneratorContext`] sink. Four output flavors are supported: C++
//! header/source pairs, Java outer-class files, Kotlin DSL extensions over
//! the Java classes, and Objective-C headers.
//!
//! Generation is deterministic: for a given pool, options, and back-end the
//! emitted bytes are identical across runs regardless of descriptor
//! insertion order.

pub mod cpp;
pub mod descriptor;
pub mod error;
pub mod flatten;
pub mod java;
pub mod objectivec;
pub mod options;
pub mod printer;
pub mod proto;
pub mod scc;

use descriptor::FileDescriptor;
use error::Result;
use options::Options;

/// Where generated files go. The driver supplies a directory-backed sink;
/// tests capture output in memory.
pub trait GeneratorContext {
    fn write_file(&mut self, path: &str, contents: &[u8]) -> std::io::Result<()>;
}

/// Output flavor of one generator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Cpp,
    Java,
    Kotlin,
    ObjectiveC,
}

/// Generate all outputs of `backend` for one file. Options are validated
/// first; nothing is written when they conflict.
pub fn generate(
    fd: FileDescriptor<'_>,
    backend: Backend,
    options: &Options,
    context: &mut dyn GeneratorContext,
) -> Result<()> {
    options.validate()?;
    match backend {
        Backend::Cpp => cpp::generate(fd, options, context),
        Backend::Java => java::generate(fd, options, context),
        Backend::Kotlin => java::generate_kotlin(fd, options, context),
        Backend::ObjectiveC => objectivec::generate(fd, options, context),
    }
}
