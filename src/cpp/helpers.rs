//! Shared emission helpers for the C++ back-end: storage types, default
//! value literals, string escaping and per-field variable maps.

use itertools::Itertools;

use super::names;
use crate::descriptor::{CppType, Descriptor, FieldDescriptor, FileDescriptor, Utf8Mode};
use crate::options::Options;
use crate::printer::Printer;

/// C++ storage type of a singular field.
pub fn primitive_type_name(field: FieldDescriptor<'_>) -> String {
    match field.cpp_type() {
        CppType::Int32 => "::int32_t".to_string(),
        CppType::Int64 => "::int64_t".to_string(),
        CppType::UInt32 => "::uint32_t".to_string(),
        CppType::UInt64 => "::uint64_t".to_string(),
        CppType::Float => "float".to_string(),
        CppType::Double => "double".to_string(),
        CppType::Bool => "bool".to_string(),
        CppType::Enum => names::qualified_enum_name(field.enum_type().expect("enum field")),
        CppType::String | CppType::Bytes => "std::string".to_string(),
        CppType::Message => names::qualified_class_name(field.message_type().expect("msg field")),
    }
}

/// Default-value literal for a singular field, parsed from the descriptor's
/// textual default.
pub fn default_value(field: FieldDescriptor<'_>) -> String {
    let text = field.default_value();
    match field.cpp_type() {
        CppType::Int32 => {
            if text.is_empty() {
                "0".to_string()
            } else {
                text.to_string()
            }
        }
        CppType::Int64 => {
            if text.is_empty() {
                "::int64_t{0}".to_string()
            } else {
                format!("::int64_t{{{text}}}")
            }
        }
        CppType::UInt32 => {
            if text.is_empty() {
                "0u".to_string()
            } else {
                format!("{text}u")
            }
        }
        CppType::UInt64 => {
            if text.is_empty() {
                "::uint64_t{0u}".to_string()
            } else {
                format!("::uint64_t{{{text}u}}")
            }
        }
        CppType::Float => float_literal(text, "f"),
        CppType::Double => float_literal(text, ""),
        CppType::Bool => {
            if text == "true" {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
        CppType::Enum => {
            let enumeration = field.enum_type().expect("enum field");
            let value = if text.is_empty() {
                enumeration.default_value()
            } else {
                enumeration
                    .find_value_by_name(text)
                    .unwrap_or_else(|| enumeration.default_value())
            };
            format!(
                "{}::{}",
                names::namespace_of(enumeration.file()),
                names::enum_value_name(value)
            )
        }
        CppType::String | CppType::Bytes => format!("\"{}\"", escape_c_string(text)),
        CppType::Message => format!(
            "*{}",
            names::qualified_default_instance_name(field.message_type().expect("msg field"))
        ),
    }
}

fn float_literal(text: &str, suffix: &str) -> String {
    let limits = if suffix == "f" { "float" } else { "double" };
    match text {
        "" => format!("0{suffix}"),
        "inf" => format!("std::numeric_limits<{limits}>::infinity()"),
        "-inf" => format!("-std::numeric_limits<{limits}>::infinity()"),
        "nan" => format!("std::numeric_limits<{limits}>::quiet_NaN()"),
        _ => {
            if text.contains('.') || text.contains('e') || text.contains('E') {
                format!("{text}{suffix}")
            } else {
                format!("{text}.0{suffix}")
            }
        }
    }
}

/// Escape a byte string into a C string literal body (quotes not included).
pub fn escape_c_string(input: &str) -> String {
    escape_c_bytes(input.as_bytes())
}

pub fn escape_c_bytes(input: &[u8]) -> String {
    let mut out = String::with_capacity(input.len() * 2);
    for &byte in input {
        match byte {
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7e => out.push(byte as char),
            _ => out.push_str(&format!("\\{byte:03o}")),
        }
    }
    out
}

/// `[[deprecated]]` marker for accessors of deprecated fields.
pub fn deprecated_attribute(field: FieldDescriptor<'_>) -> &'static str {
    if field.is_deprecated() {
        "[[deprecated]] "
    } else {
        ""
    }
}

/// Include path for a dependency's generated header, honoring the
/// runtime-include-base prefix.
pub fn dependency_include(options: &Options, dep: FileDescriptor<'_>) -> String {
    let base = names::strip_proto(dep.name());
    if options.runtime_include_base.is_empty() {
        format!("{base}.pb.h")
    } else {
        format!("{}{base}.pb.h", options.runtime_include_base)
    }
}

/// Whether the message uses reflection-capable generation (vs lite).
pub fn has_descriptor_methods(options: &Options) -> bool {
    !options.is_lite()
}

/// The superclass of generated messages.
pub fn superclass_name(options: &Options) -> &'static str {
    if options.is_lite() {
        "::google::protobuf::MessageLite"
    } else {
        "::google::protobuf::Message"
    }
}

/// Fields of `message` sorted by ascending field number, the order required
/// for serialization and size accounting.
pub fn fields_by_number(message: Descriptor<'_>) -> Vec<FieldDescriptor<'_>> {
    message.fields().sorted_by_key(|f| f.number()).collect()
}

/// Marker comment for the UTF-8 verification mode of a string field.
pub fn utf8_check_mode_comment(mode: Utf8Mode) -> &'static str {
    match mode {
        Utf8Mode::None => "none",
        Utf8Mode::Verify => "verify",
        Utf8Mode::Strict => "strict",
    }
}

/// Declared-type name used to pick the WireFormatLite read/write/size
/// routine for a field.
pub fn declared_type_name(field: FieldDescriptor<'_>) -> &'static str {
    use crate::proto::Type;
    match field.proto_type() {
        Type::Int32 => "Int32",
        Type::Int64 => "Int64",
        Type::Uint32 => "UInt32",
        Type::Uint64 => "UInt64",
        Type::Sint32 => "SInt32",
        Type::Sint64 => "SInt64",
        Type::Fixed32 => "Fixed32",
        Type::Fixed64 => "Fixed64",
        Type::Sfixed32 => "SFixed32",
        Type::Sfixed64 => "SFixed64",
        Type::Float => "Float",
        Type::Double => "Double",
        Type::Bool => "Bool",
        Type::Enum => "Enum",
        Type::String => "String",
        Type::Bytes => "Bytes",
        Type::Message => "Message",
        Type::Group => "Group",
    }
}

pub fn varint_size(value: u64) -> usize {
    (((64 - (value | 1).leading_zeros()) as usize) + 6) / 7
}

/// Encoded size of the field's wire tag.
pub fn tag_size(field: FieldDescriptor<'_>) -> usize {
    varint_size(u64::from(field.tag()))
}

/// Fixed-width encoded size, or None for varint/length-delimited types.
pub fn fixed_size(field: FieldDescriptor<'_>) -> Option<usize> {
    use crate::proto::Type;
    match field.proto_type() {
        Type::Fixed32 | Type::Sfixed32 | Type::Float => Some(4),
        Type::Fixed64 | Type::Sfixed64 | Type::Double => Some(8),
        Type::Bool => Some(1),
        _ => None,
    }
}

/// Run `body` with a field's variable map pushed onto the printer.
pub fn with_vars<F>(printer: &mut Printer, vars: &[(String, String)], body: F)
where
    F: FnOnce(&mut Printer),
{
    let view: Vec<(&str, &str)> = vars.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    printer.with_vars(&view, body);
}

/// The base variable map every field generator starts from.
pub fn field_vars(
    field: FieldDescriptor<'_>,
    info_name: &str,
    capitalized: &str,
) -> Vec<(String, String)> {
    let mut vars = vec![
        ("name".to_string(), info_name.to_string()),
        ("Name".to_string(), capitalized.to_string()),
        ("member".to_string(), names::field_member_name(field)),
        ("number".to_string(), field.number().to_string()),
        ("tag".to_string(), field.tag().to_string()),
        ("packed_tag".to_string(), field.packed_tag().to_string()),
        ("deprecated_attr".to_string(), deprecated_attribute(field).to_string()),
        ("full_name".to_string(), field.full_name().to_string()),
    ];
    if let Some(oneof) = field.real_containing_oneof() {
        vars.push(("oneof_name".to_string(), names::oneof_name(oneof)));
        vars.push((
            "oneof_case".to_string(),
            names::oneof_case_constant(field),
        ));
    }
    vars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_string_escaping() {
        assert_eq!(escape_c_string("plain"), "plain");
        assert_eq!(escape_c_string("a\"b\\c\n"), "a\\\"b\\\\c\\n");
        assert_eq!(escape_c_bytes(&[0x01, 0x7f]), "\\001\\177");
    }

    #[test]
    fn varint_sizes() {
        assert_eq!(varint_size(0), 1);
        assert_eq!(varint_size(127), 1);
        assert_eq!(varint_size(128), 2);
        assert_eq!(varint_size(16383), 2);
        assert_eq!(varint_size(16384), 3);
        assert_eq!(varint_size(u64::MAX), 10);
    }

    #[test]
    fn float_literals_get_decimal_points() {
        assert_eq!(float_literal("5", "f"), "5.0f");
        assert_eq!(float_literal("2.5", "f"), "2.5f");
        assert_eq!(float_literal("", ""), "0");
        assert_eq!(float_literal("1e10", ""), "1e10");
    }

    #[test]
    fn nonfinite_literals_match_the_field_width() {
        assert_eq!(
            float_literal("inf", "f"),
            "std::numeric_limits<float>::infinity()"
        );
        assert_eq!(
            float_literal("-inf", "f"),
            "-std::numeric_limits<float>::infinity()"
        );
        assert_eq!(
            float_literal("nan", "f"),
            "std::numeric_limits<float>::quiet_NaN()"
        );
        assert_eq!(
            float_literal("inf", ""),
            "std::numeric_limits<double>::infinity()"
        );
        assert_eq!(
            float_literal("nan", ""),
            "std::numeric_limits<double>::quiet_NaN()"
        );
    }
}
