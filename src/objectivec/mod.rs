//! Objective-C back-end: emits a `.pbobjc.h` header per file.

pub mod file;
pub mod names;

use crate::descriptor::FileDescriptor;
use crate::error::Result;
use crate::options::Options;
use crate::printer::Printer;
use crate::GeneratorContext;

pub use file::FileGenerator;

/// Generate the Objective-C output for one file.
pub fn generate(
    fd: FileDescriptor<'_>,
    options: &Options,
    context: &mut dyn GeneratorContext,
) -> Result<()> {
    let generator = FileGenerator::new(fd, options);
    let mut header = Printer::new();
    generator.generate_header(&mut header)?;
    let (text, _) = header.into_parts();
    context.write_file(&names::header_path(fd), text.as_bytes())?;
    Ok(())
}
