//! C++ back-end: emits a `.pb.h`/`.pb.cc` pair per file, plus `.meta`
//! annotation sidecars when requested.

pub mod enum_;
pub mod extension;
pub mod field;
pub mod file;
pub mod helpers;
pub mod message;
pub mod names;
pub mod service;

use crate::descriptor::FileDescriptor;
use crate::error::Result;
use crate::options::Options;
use crate::printer::Printer;
use crate::scc::SccAnalyzer;
use crate::GeneratorContext;

pub use file::FileGenerator;

/// Generate all outputs for one file.
pub fn generate(
    fd: FileDescriptor<'_>,
    options: &Options,
    context: &mut dyn GeneratorContext,
) -> Result<()> {
    let mut analyzer = SccAnalyzer::new();
    let generator = FileGenerator::new(fd, options, &mut analyzer);

    let mut header = Printer::new();
    generator.generate_header(&mut header);
    let (text, annotations) = header.into_parts();
    let path = names::header_path(fd);
    context.write_file(&path, text.as_bytes())?;
    if options.annotate_code {
        context.write_file(&format!("{path}.meta"), &annotations.encode())?;
    }

    let mut source = Printer::new();
    generator.generate_source(&mut source);
    let (text, annotations) = source.into_parts();
    let path = names::source_path(fd);
    context.write_file(&path, text.as_bytes())?;
    if options.annotate_code {
        context.write_file(&format!("{path}.meta"), &annotations.encode())?;
    }
    Ok(())
}
