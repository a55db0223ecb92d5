//! Shared emission helpers for the Java back-end.

use crate::descriptor::{CppType, FieldDescriptor};
use crate::error::Result;
use crate::printer::Printer;
use crate::proto::Type;

use super::names;

/// Unboxed Java type of a field's single element.
pub fn java_type(field: FieldDescriptor<'_>) -> Result<String> {
    Ok(match field.cpp_type() {
        CppType::Int32 | CppType::UInt32 => "int".to_string(),
        CppType::Int64 | CppType::UInt64 => "long".to_string(),
        CppType::Float => "float".to_string(),
        CppType::Double => "double".to_string(),
        CppType::Bool => "boolean".to_string(),
        CppType::String => "java.lang.String".to_string(),
        CppType::Bytes => "com.google.protobuf.ByteString".to_string(),
        CppType::Enum => {
            names::qualified_enum_name(field.enum_type().expect("enum field"))?
        }
        CppType::Message => {
            names::qualified_class_name(field.message_type().expect("message field"))?
        }
    })
}

/// Boxed variant, for generics.
pub fn boxed_type(field: FieldDescriptor<'_>) -> Result<String> {
    Ok(match field.cpp_type() {
        CppType::Int32 | CppType::UInt32 => "java.lang.Integer".to_string(),
        CppType::Int64 | CppType::UInt64 => "java.lang.Long".to_string(),
        CppType::Float => "java.lang.Float".to_string(),
        CppType::Double => "java.lang.Double".to_string(),
        CppType::Bool => "java.lang.Boolean".to_string(),
        _ => java_type(field)?,
    })
}

/// Literal for the unset value of a singular field.
pub fn default_value(field: FieldDescriptor<'_>) -> Result<String> {
    let text = field.default_value();
    Ok(match field.cpp_type() {
        CppType::Int32 | CppType::UInt32 => {
            if text.is_empty() {
                "0".to_string()
            } else {
                text.to_string()
            }
        }
        CppType::Int64 | CppType::UInt64 => {
            if text.is_empty() {
                "0L".to_string()
            } else {
                format!("{text}L")
            }
        }
        CppType::Float => {
            if text.is_empty() {
                "0F".to_string()
            } else {
                format!("{text}F")
            }
        }
        CppType::Double => {
            if text.is_empty() {
                "0D".to_string()
            } else {
                format!("{text}D")
            }
        }
        CppType::Bool => {
            if text == "true" {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
        CppType::String => format!("\"{}\"", escape_java_string(text)),
        CppType::Bytes => {
            if text.is_empty() {
                "com.google.protobuf.ByteString.EMPTY".to_string()
            } else {
                format!(
                    "com.google.protobuf.ByteString.copyFromUtf8(\"{}\")",
                    escape_java_string(text)
                )
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
                "{}.{}",
                names::qualified_enum_name(enumeration)?,
                names::resolve_keyword(value.name())
            )
        }
        CppType::Message => "null".to_string(),
    })
}

pub fn escape_java_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if (' '..='~').contains(&c) => out.push(c),
            c => out.push_str(&format!("\\u{:04x}", c as u32)),
        }
    }
    out
}

/// Raw descriptor bytes as a Java string literal body. The runtime decodes
/// the literal as ISO-8859-1, so every byte maps to one escaped char.
pub fn escape_java_bytes(input: &[u8]) -> String {
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

/// Suffix picking the CodedInputStream/CodedOutputStream routine:
/// `readInt32`, `writeSInt64`, `computeFixed32Size`, ...
pub fn capitalized_type_name(field: FieldDescriptor<'_>) -> &'static str {
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

pub fn deprecated_annotation(field: FieldDescriptor<'_>) -> &'static str {
    if field.is_deprecated() {
        "@java.lang.Deprecated "
    } else {
        ""
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
