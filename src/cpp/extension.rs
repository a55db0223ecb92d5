//! Extension identifier generation.
//!
//! Each extension becomes one singleton identifier carrying the extendee,
//! the value type traits, the declared type number, and packedness. The
//! identifier lives at namespace scope for file-level extensions and under a
//! `Scope_` prefix for extensions declared inside a message.

use crate::descriptor::{CppType, Descriptor, FieldDescriptor};
use crate::options::Options;
use crate::printer::Printer;

use super::{helpers, names};

fn type_traits(extension: FieldDescriptor<'_>) -> String {
    let traits = match extension.cpp_type() {
        CppType::String | CppType::Bytes => "StringTypeTraits".to_string(),
        CppType::Enum => {
            let name = names::qualified_enum_name(extension.enum_type().expect("enum field"));
            format!("EnumTypeTraits<{name}, {name}_IsValid>")
        }
        CppType::Message => format!(
            "MessageTypeTraits<{}>",
            names::qualified_class_name(extension.message_type().expect("message field"))
        ),
        _ => format!(
            "PrimitiveTypeTraits<{}>",
            helpers::primitive_type_name(extension)
        ),
    };
    if extension.is_repeated() {
        format!("::google::protobuf::internal::Repeated{traits}")
    } else {
        format!("::google::protobuf::internal::{traits}")
    }
}

pub struct ExtensionGenerator<'a> {
    extension: FieldDescriptor<'a>,
    options: &'a Options,
    /// Declaring message, when not declared at file scope.
    scope: Option<Descriptor<'a>>,
}

impl<'a> ExtensionGenerator<'a> {
    pub fn new(
        extension: FieldDescriptor<'a>,
        scope: Option<Descriptor<'a>>,
        options: &'a Options,
    ) -> Self {
        ExtensionGenerator {
            extension,
            options,
            scope,
        }
    }

    fn identifier(&self) -> String {
        let base = names::extension_name(self.extension);
        match self.scope {
            Some(scope) => format!("{}_{base}", names::class_name(scope)),
            None => base,
        }
    }

    fn default_argument(&self) -> String {
        match self.extension.cpp_type() {
            // Message extensions default to the target's default instance.
            CppType::Message => format!(
                "&{}._instance",
                names::qualified_default_instance_name(
                    self.extension.message_type().expect("message field")
                )
            ),
            _ if self.extension.is_repeated() => String::new(),
            _ => helpers::default_value(self.extension),
        }
    }

    fn vars(&self) -> Vec<(String, String)> {
        let extendee = self
            .extension
            .containing_type()
            .expect("extensions have an extendee");
        vec![
            ("name".to_string(), self.identifier()),
            (
                "extendee".to_string(),
                names::qualified_class_name(extendee),
            ),
            ("type_traits".to_string(), type_traits(self.extension)),
            (
                "field_type".to_string(),
                self.extension.proto_type().wire_value().to_string(),
            ),
            ("packed".to_string(), self.extension.is_packed().to_string()),
            (
                "number".to_string(),
                self.extension.number().to_string(),
            ),
            (
                "constant".to_string(),
                format!(
                    "k{}FieldNumber",
                    names::underscores_to_camel_case(self.extension.name(), true)
                ),
            ),
            ("dllexport".to_string(), self.options.dllexport_decl.clone()),
        ]
    }

    pub fn generate_declaration(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars(), |p| {
            p.print(
                "constexpr int $constant$ = $number$;\n\
                 extern$ dllexport$ ::google::protobuf::internal::ExtensionIdentifier<$extendee$, $type_traits$, $field_type$, $packed$> $name$;\n",
            );
        });
    }

    pub fn generate_definition(&self, p: &mut Printer) {
        // Default values can contain arbitrary literal text, so the argument
        // list is assembled outside the template.
        let default = self.default_argument();
        let args = if default.is_empty() {
            self.extension.number().to_string()
        } else {
            format!("{}, {default}", self.extension.number())
        };
        helpers::with_vars(p, &self.vars(), |p| {
            p.print_with(
                &[("args", &args)],
                "::google::protobuf::internal::ExtensionIdentifier<$extendee$, $type_traits$, $field_type$, $packed$> $name$($args$);\n",
            );
        });
    }
}
