//! Java extension identifiers.
//!
//! One `GeneratedExtension` constant per extension, scoped either to the
//! outer class (file level) or to the extended message's declaring class.

use crate::descriptor::{CppType, Descriptor, FieldDescriptor};
use crate::error::Result;
use crate::printer::Printer;

use super::helpers;
use super::names;

pub struct ExtensionGenerator<'a> {
    extension: FieldDescriptor<'a>,
    /// Declaring message for message-scoped extensions, `None` at file scope.
    scope: Option<Descriptor<'a>>,
}

impl<'a> ExtensionGenerator<'a> {
    pub fn new(
        extension: FieldDescriptor<'a>,
        scope: Option<Descriptor<'a>>,
    ) -> ExtensionGenerator<'a> {
        debug_assert!(extension.is_extension());
        ExtensionGenerator { extension, scope }
    }

    /// The Java type parameter of the identifier: the boxed element type, or
    /// a list of it for repeated extensions.
    fn type_parameter(&self) -> Result<String> {
        let element = helpers::boxed_type(self.extension)?;
        if self.extension.is_repeated() {
            Ok(format!("java.util.List<{element}>"))
        } else {
            Ok(element)
        }
    }

    /// Class token passed to the factory; always the singular element class.
    fn singular_class(&self) -> Result<String> {
        Ok(format!("{}.class", helpers::boxed_type(self.extension)?))
    }

    fn default_argument(&self) -> Result<String> {
        if self.extension.is_repeated() {
            return Ok("null".to_string());
        }
        match self.extension.cpp_type() {
            CppType::Message => {
                let target = names::qualified_class_name(
                    self.extension.message_type().expect("message extension"),
                )?;
                Ok(format!("{target}.getDefaultInstance()"))
            }
            _ => Ok("null".to_string()),
        }
    }

    pub fn generate(&self, printer: &mut Printer) -> Result<()> {
        let extendee = names::qualified_class_name(
            self.extension
                .containing_type()
                .expect("extensions have an extendee"),
        )?;
        let name = names::resolve_keyword(
            &names::underscores_to_camel_case(self.extension.name(), false),
        );
        let constant = format!(
            "{}_FIELD_NUMBER",
            self.extension.name().to_ascii_uppercase()
        );
        let number = self.extension.number().to_string();
        let type_parameter = self.type_parameter()?;
        let singular_class = self.singular_class()?;
        let default_argument = self.default_argument()?;
        let factory = match self.scope {
            Some(scope) => {
                let index = scope
                    .extensions()
                    .position(|e| e == self.extension)
                    .expect("extension in scope");
                format!(
                    "newMessageScopedGeneratedExtension(\n    getDefaultInstance(), {index}, {singular_class}, {default_argument})"
                )
            }
            None => format!(
                "newFileScopedGeneratedExtension(\n    {singular_class}, {default_argument})"
            ),
        };
        printer.with_vars(
            &[
                ("extendee", &extendee),
                ("extension_name", &name),
                ("constant_name", &constant),
                ("number", &number),
                ("type_parameter", &type_parameter),
                ("factory", &factory),
            ],
            |p| {
                p.print(
                    "public static final int $constant_name$ = $number$;\n\
                     public static final\n\
                     \x20 com.google.protobuf.GeneratedMessage.GeneratedExtension<\n\
                     \x20   $extendee$,\n\
                     \x20   $type_parameter$> $extension_name$ = com.google.protobuf.GeneratedMessage\n\
                     \x20       .$factory$;\n",
                );
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorPool;
    use crate::printer::Printer;
    use crate::proto::*;

    fn pool_with_extensions() -> DescriptorPool {
        let file = FileDescriptorProto {
            name: "ext.proto".to_string(),
            package: "demo".to_string(),
            syntax: "proto2".to_string(),
            message_type: vec![DescriptorProto {
                name: "Base".to_string(),
                extension_range: vec![ExtensionRange {
                    start: 100,
                    end: 200,
                }],
                ..Default::default()
            }],
            extension: vec![FieldDescriptorProto {
                name: "tagline".to_string(),
                number: 100,
                r#type: Type::String,
                extendee: ".demo.Base".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut pool = DescriptorPool::new();
        pool.add_file(&file).unwrap();
        pool
    }

    #[test]
    fn file_scoped_extension_uses_the_file_factory() {
        let pool = pool_with_extensions();
        let file = pool.file_by_name("ext.proto").unwrap();
        let extension = file.extensions().next().unwrap();
        let mut printer = Printer::new();
        ExtensionGenerator::new(extension, None)
            .generate(&mut printer)
            .unwrap();
        let out = printer.into_parts().0;
        assert!(out.contains("public static final int TAGLINE_FIELD_NUMBER = 100;"));
        assert!(out.contains("newFileScopedGeneratedExtension"));
        assert!(out.contains("java.lang.String.class"));
        assert!(out.contains("demo.Ext.Base"));
    }
}
