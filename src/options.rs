//! Generator options shared by every back-end.

use crate::error::{GenerateError, Result};

/// Whether to emit the tail-call parser dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TcTableMode {
    Never,
    #[default]
    Selectively,
    Always,
}

/// Optimization profile picked for the generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnforceMode {
    #[default]
    Speed,
    LiteRuntime,
    CodeSize,
    NoEnforcement,
}

/// Options consumed by the back-ends. One record per generator run; the
/// driver fills it from command-line parameters.
#[derive(Debug, Clone)]
pub struct Options {
    /// Affects include-path rewriting and class-name exceptions for
    /// well-known types.
    pub opensource_runtime: bool,
    /// Omit comments and the embedded descriptor bytes.
    pub strip_nonfunctional_codegen: bool,
    pub tctable_mode: TcTableMode,
    /// Swap message fields to pointer-through-weak-symbol storage.
    pub lite_implicit_weak_fields: bool,
    /// Emit side-channel annotation (.meta) files.
    pub annotate_code: bool,
    pub enforce_mode: EnforceMode,
    /// Prefix for runtime-library includes.
    pub runtime_include_base: String,
    /// Attribute macro injected on public symbols.
    pub dllexport_decl: String,
    pub annotation_guard_name: String,
    pub annotation_pragma_name: String,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            opensource_runtime: true,
            strip_nonfunctional_codegen: false,
            tctable_mode: TcTableMode::default(),
            lite_implicit_weak_fields: false,
            annotate_code: false,
            enforce_mode: EnforceMode::default(),
            runtime_include_base: String::new(),
            dllexport_decl: String::new(),
            annotation_guard_name: "PROTOBUF_CODEGEN_ANNOTATIONS".to_string(),
            annotation_pragma_name: String::new(),
        }
    }
}

impl Options {
    /// Reject incompatible option combinations before any output is emitted.
    pub fn validate(&self) -> Result<()> {
        if self.lite_implicit_weak_fields && self.enforce_mode != EnforceMode::LiteRuntime {
            return Err(GenerateError::OptionConflict(
                "lite_implicit_weak_fields requires the lite-runtime enforce mode".to_string(),
            ));
        }
        if self.annotate_code && self.strip_nonfunctional_codegen {
            return Err(GenerateError::OptionConflict(
                "annotate_code cannot be combined with strip_nonfunctional_codegen".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_lite(&self) -> bool {
        self.enforce_mode == EnforceMode::LiteRuntime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_validate() {
        assert!(Options::default().validate().is_ok());
    }

    #[test]
    fn implicit_weak_requires_lite() {
        let mut options = Options::default();
        options.lite_implicit_weak_fields = true;
        assert!(matches!(
            options.validate(),
            Err(GenerateError::OptionConflict(_))
        ));

        options.enforce_mode = EnforceMode::LiteRuntime;
        assert!(options.validate().is_ok());
    }

    #[test]
    fn annotations_conflict_with_stripping() {
        let mut options = Options::default();
        options.annotate_code = true;
        options.strip_nonfunctional_codegen = true;
        assert!(options.validate().is_err());
    }
}
