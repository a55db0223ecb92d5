//! Java back-end: one outer-class `.java` file per proto file, plus the
//! Kotlin DSL extensions when the Kotlin flavor is requested.

pub mod enum_;
pub mod extension;
pub mod field;
pub mod file;
pub mod helpers;
pub mod kotlin;
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
pub use kotlin::KotlinGenerator;

/// Generate the Java outputs for one file.
pub fn generate(
    fd: FileDescriptor<'_>,
    options: &Options,
    context: &mut dyn GeneratorContext,
) -> Result<()> {
    let mut analyzer = SccAnalyzer::new();
    let generator = FileGenerator::new(fd, options)?;

    let mut source = Printer::new();
    generator.generate(&mut source, &mut analyzer)?;
    let (text, annotations) = source.into_parts();
    let path = names::file_path(fd)?;
    context.write_file(&path, text.as_bytes())?;
    if options.annotate_code {
        context.write_file(&format!("{path}.meta"), &annotations.encode())?;
    }
    Ok(())
}

/// Generate the Kotlin DSL output for one file.
pub fn generate_kotlin(
    fd: FileDescriptor<'_>,
    options: &Options,
    context: &mut dyn GeneratorContext,
) -> Result<()> {
    let mut analyzer = SccAnalyzer::new();
    let mut source = Printer::new();
    KotlinGenerator::new(fd, options).generate(&mut source, &mut analyzer)?;
    let (text, _) = source.into_parts();
    let path = names::kotlin_file_path(fd)?;
    context.write_file(&path, text.as_bytes())?;
    Ok(())
}
