//! C++ identifier resolution.
//!
//! Nested messages flatten to `Outer_Inner` class names, files map to
//! `::pkg::sub` namespaces, and anything colliding with a C++ keyword gets a
//! trailing underscore. Map entry classes are never user-visible and carry
//! the `_DoNotUse` suffix.

use std::collections::HashSet;
use std::sync::OnceLock;

use crate::descriptor::{
    Descriptor, EnumDescriptor, EnumValueDescriptor, FieldDescriptor, FileDescriptor,
    OneofDescriptor, ServiceDescriptor,
};

const KEYWORD_LIST: &[&str] = &[
    "NULL",
    "alignas",
    "alignof",
    "and",
    "and_eq",
    "asm",
    "assert",
    "auto",
    "bitand",
    "bitor",
    "bool",
    "break",
    "case",
    "catch",
    "char",
    "char16_t",
    "char32_t",
    "char8_t",
    "class",
    "co_await",
    "co_return",
    "co_yield",
    "compl",
    "concept",
    "const",
    "const_cast",
    "consteval",
    "constexpr",
    "constinit",
    "continue",
    "decltype",
    "default",
    "delete",
    "do",
    "double",
    "dynamic_cast",
    "else",
    "enum",
    "explicit",
    "export",
    "extern",
    "false",
    "float",
    "for",
    "friend",
    "goto",
    "if",
    "inline",
    "int",
    "long",
    "mutable",
    "namespace",
    "new",
    "noexcept",
    "not",
    "not_eq",
    "nullptr",
    "operator",
    "or",
    "or_eq",
    "private",
    "protected",
    "public",
    "register",
    "reinterpret_cast",
    "requires",
    "return",
    "short",
    "signed",
    "sizeof",
    "static",
    "static_assert",
    "static_cast",
    "struct",
    "switch",
    "template",
    "this",
    "thread_local",
    "throw",
    "true",
    "try",
    "typedef",
    "typeid",
    "typename",
    "union",
    "unsigned",
    "using",
    "virtual",
    "void",
    "volatile",
    "wchar_t",
    "while",
    "xor",
    "xor_eq",
];

fn keywords() -> &'static HashSet<&'static str> {
    static KEYWORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    KEYWORDS.get_or_init(|| KEYWORD_LIST.iter().copied().collect())
}

/// Append `_` to names that are C++ keywords.
pub fn resolve_keyword(name: &str) -> String {
    if keywords().contains(name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// Unqualified class name: ancestor names joined by `_` (nested messages
/// flatten into the enclosing namespace). Map entries get `_DoNotUse`.
pub fn class_name(message: Descriptor<'_>) -> String {
    let mut parts = vec![message.name().to_string()];
    let mut parent = message.containing_type();
    while let Some(p) = parent {
        parts.push(p.name().to_string());
        parent = p.containing_type();
    }
    parts.reverse();
    let flat = resolve_keyword(&parts.join("_"));
    if message.is_map_entry() {
        format!("{flat}_DoNotUse")
    } else {
        flat
    }
}

pub fn enum_name(enumeration: EnumDescriptor<'_>) -> String {
    let mut parts = vec![enumeration.name().to_string()];
    let mut parent = enumeration.containing_type();
    while let Some(p) = parent {
        parts.push(p.name().to_string());
        parent = p.containing_type();
    }
    parts.reverse();
    resolve_keyword(&parts.join("_"))
}

/// Enum value constant. Nested enum values leak into the enclosing
/// namespace, so they carry the enum classname as a prefix.
pub fn enum_value_name(value: EnumValueDescriptor<'_>) -> String {
    let enumeration = value.enum_type();
    if enumeration.containing_type().is_some() {
        format!(
            "{}_{}",
            enum_name(enumeration),
            resolve_keyword(value.name())
        )
    } else {
        resolve_keyword(value.name())
    }
}

/// Namespace parts of a file's package, keyword-escaped.
pub fn namespace_parts(file: FileDescriptor<'_>) -> Vec<String> {
    if file.package().is_empty() {
        return Vec::new();
    }
    file.package().split('.').map(resolve_keyword).collect()
}

/// `::pkg::sub` (empty string for the global namespace).
pub fn namespace_of(file: FileDescriptor<'_>) -> String {
    let parts = namespace_parts(file);
    if parts.is_empty() {
        String::new()
    } else {
        format!("::{}", parts.join("::"))
    }
}

pub fn qualified_class_name(message: Descriptor<'_>) -> String {
    format!("{}::{}", namespace_of(message.file()), class_name(message))
}

pub fn qualified_enum_name(enumeration: EnumDescriptor<'_>) -> String {
    format!(
        "{}::{}",
        namespace_of(enumeration.file()),
        enum_name(enumeration)
    )
}

/// The file-scope singleton holding a message's default instance.
pub fn default_instance_name(message: Descriptor<'_>) -> String {
    format!("_{}_default_instance_", class_name(message))
}

pub fn qualified_default_instance_name(message: Descriptor<'_>) -> String {
    format!(
        "{}::{}",
        namespace_of(message.file()),
        default_instance_name(message)
    )
}

/// Identifier-safe encoding of a filename: alphanumerics kept, everything
/// else becomes `_` plus two hex digits.
pub fn filename_identifier(filename: &str) -> String {
    let mut out = String::with_capacity(filename.len());
    for byte in filename.bytes() {
        if byte.is_ascii_alphanumeric() {
            out.push(byte as char);
        } else {
            out.push('_');
            out.push_str(&format!("{byte:02x}"));
        }
    }
    out
}

/// Name of the `DescriptorTable` record for a file.
pub fn descriptor_table_name(file: FileDescriptor<'_>) -> String {
    format!("descriptor_table_{}", filename_identifier(file.name()))
}

/// Include-guard token for a generated header.
pub fn include_guard(file: FileDescriptor<'_>) -> String {
    format!(
        "GOOGLE_PROTOBUF_INCLUDED_{}_2epb_2eh",
        filename_identifier(file.name().trim_end_matches(".proto"))
    )
}

/// `foo/bar.proto` -> `foo/bar.pb.h` / `foo/bar.pb.cc`.
pub fn header_path(file: FileDescriptor<'_>) -> String {
    format!("{}.pb.h", strip_proto(file.name()))
}

pub fn source_path(file: FileDescriptor<'_>) -> String {
    format!("{}.pb.cc", strip_proto(file.name()))
}

pub fn strip_proto(filename: &str) -> &str {
    filename
        .strip_suffix(".protodevel")
        .or_else(|| filename.strip_suffix(".proto"))
        .unwrap_or(filename)
}

/// Accessor base name of a field: the lowercased proto name, keyword-escaped.
pub fn field_name(field: FieldDescriptor<'_>) -> String {
    resolve_keyword(&field.name().to_lowercase())
}

/// Private storage member, always `<name>_`.
pub fn field_member_name(field: FieldDescriptor<'_>) -> String {
    format!("{}_", field.name().to_lowercase())
}

pub fn oneof_case_constant(field: FieldDescriptor<'_>) -> String {
    format!("k{}", underscores_to_camel_case(field.name(), true))
}

pub fn oneof_name(oneof: OneofDescriptor<'_>) -> String {
    resolve_keyword(&oneof.name().to_lowercase())
}

/// Extension identifier, scoped by the containing message when the extension
/// is declared inside one.
pub fn extension_name(extension: FieldDescriptor<'_>) -> String {
    resolve_keyword(&extension.name().to_lowercase())
}

pub fn service_class_name(service: ServiceDescriptor<'_>) -> String {
    resolve_keyword(service.name())
}

pub fn underscores_to_camel_case(input: &str, cap_first: bool) -> String {
    let mut out = String::with_capacity(input.len());
    let mut cap_next = cap_first;
    for ch in input.chars() {
        if ch == '_' {
            cap_next = true;
        } else if cap_next {
            out.extend(ch.to_uppercase());
            cap_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorPool;
    use crate::proto::*;

    fn pool_with_nested() -> DescriptorPool {
        let file = FileDescriptorProto {
            name: "names/test.proto".to_string(),
            package: "names.v1".to_string(),
            syntax: "proto3".to_string(),
            message_type: vec![DescriptorProto {
                name: "Outer".to_string(),
                nested_type: vec![
                    DescriptorProto {
                        name: "Inner".to_string(),
                        ..Default::default()
                    },
                    DescriptorProto {
                        name: "MapEntry".to_string(),
                        options: Some(MessageOptions {
                            map_entry: true,
                            ..Default::default()
                        }),
                        field: vec![
                            FieldDescriptorProto {
                                name: "key".to_string(),
                                number: 1,
                                r#type: Type::String,
                                ..Default::default()
                            },
                            FieldDescriptorProto {
                                name: "value".to_string(),
                                number: 2,
                                r#type: Type::Int32,
                                ..Default::default()
                            },
                        ],
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut pool = DescriptorPool::new();
        pool.add_file(&file).unwrap();
        pool
    }

    #[test]
    fn nested_names_flatten_with_underscores() {
        let pool = pool_with_nested();
        let inner = pool.message_by_name("names.v1.Outer.Inner").unwrap();
        assert_eq!(class_name(inner), "Outer_Inner");
        assert_eq!(qualified_class_name(inner), "::names::v1::Outer_Inner");
        assert_eq!(
            default_instance_name(inner),
            "_Outer_Inner_default_instance_"
        );
    }

    #[test]
    fn map_entries_are_marked_do_not_use() {
        let pool = pool_with_nested();
        let entry = pool.message_by_name("names.v1.Outer.MapEntry").unwrap();
        assert_eq!(class_name(entry), "Outer_MapEntry_DoNotUse");
    }

    #[test]
    fn keywords_get_trailing_underscore() {
        assert_eq!(resolve_keyword("class"), "class_");
        assert_eq!(resolve_keyword("co_await"), "co_await_");
        assert_eq!(resolve_keyword("value"), "value");
    }

    #[test]
    fn filename_identifier_escapes_punctuation() {
        assert_eq!(filename_identifier("a/b.proto"), "a_2fb_2eproto");
        let pool = pool_with_nested();
        let file = pool.file_by_name("names/test.proto").unwrap();
        assert_eq!(
            descriptor_table_name(file),
            "descriptor_table_names_2ftest_2eproto"
        );
        assert_eq!(header_path(file), "names/test.pb.h");
        assert_eq!(source_path(file), "names/test.pb.cc");
    }

    #[test]
    fn camel_case_conversion() {
        assert_eq!(underscores_to_camel_case("foo_bar_baz", true), "FooBarBaz");
        assert_eq!(underscores_to_camel_case("foo_bar", false), "fooBar");
    }
}
