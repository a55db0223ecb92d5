//! Plain-data mirrors of `descriptor.proto` and `GeneratedCodeInfo`.
//!
//! These are the inputs handed to the pool by the external parser (or, for
//! the CLI, deserialized from a JSON `FileDescriptorSet`). They carry just
//! enough of the option surface for the back-ends; custom options and
//! uninterpreted options are out of scope.
//!
//! Wire encoding here covers what the generated code needs embedded at
//! runtime: `FileDescriptorProto` byte literals and `GeneratedCodeInfo`
//! annotation files. Field numbers follow descriptor.proto.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Label {
    #[default]
    Optional,
    Required,
    Repeated,
}

impl Label {
    fn wire_value(self) -> u64 {
        match self {
            Label::Optional => 1,
            Label::Required => 2,
            Label::Repeated => 3,
        }
    }
}

/// Declared field type, one-to-one with `FieldDescriptorProto.Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Group,
    Message,
    Bytes,
    Uint32,
    Enum,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
}

impl Type {
    pub fn wire_value(self) -> u64 {
        match self {
            Type::Double => 1,
            Type::Float => 2,
            Type::Int64 => 3,
            Type::Uint64 => 4,
            Type::Int32 => 5,
            Type::Fixed64 => 6,
            Type::Fixed32 => 7,
            Type::Bool => 8,
            Type::String => 9,
            Type::Group => 10,
            Type::Message => 11,
            Type::Bytes => 12,
            Type::Uint32 => 13,
            Type::Enum => 14,
            Type::Sfixed32 => 15,
            Type::Sfixed64 => 16,
            Type::Sint32 => 17,
            Type::Sint64 => 18,
        }
    }
}

/// String/bytes storage variant requested by `[ctype = ...]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CType {
    #[default]
    String,
    Cord,
    StringPiece,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDescriptorSet {
    pub file: Vec<FileDescriptorProto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDescriptorProto {
    pub name: String,
    pub package: String,
    pub dependency: Vec<String>,
    /// Indexes into `dependency`.
    pub public_dependency: Vec<i32>,
    /// Indexes into `dependency`.
    pub weak_dependency: Vec<i32>,
    pub message_type: Vec<DescriptorProto>,
    pub enum_type: Vec<EnumDescriptorProto>,
    pub service: Vec<ServiceDescriptorProto>,
    pub extension: Vec<FieldDescriptorProto>,
    pub options: Option<FileOptions>,
    /// "proto2" (or empty) or "proto3".
    pub syntax: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOptions {
    pub java_package: String,
    pub java_outer_classname: String,
    pub java_multiple_files: bool,
    pub objc_class_prefix: String,
    pub deprecated: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptorProto {
    pub name: String,
    pub field: Vec<FieldDescriptorProto>,
    pub extension: Vec<FieldDescriptorProto>,
    pub nested_type: Vec<DescriptorProto>,
    pub enum_type: Vec<EnumDescriptorProto>,
    pub extension_range: Vec<ExtensionRange>,
    pub oneof_decl: Vec<OneofDescriptorProto>,
    pub options: Option<MessageOptions>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionRange {
    pub start: i32,
    /// Exclusive.
    pub end: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageOptions {
    pub map_entry: bool,
    pub deprecated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDescriptorProto {
    pub name: String,
    pub number: i32,
    pub label: Label,
    pub r#type: Type,
    /// Fully qualified, with leading dot, for message and enum fields.
    pub type_name: String,
    /// Set on extensions: the extended message's full name.
    pub extendee: String,
    /// Textual default, as written in the schema.
    pub default_value: String,
    pub oneof_index: Option<i32>,
    pub json_name: String,
    pub options: Option<FieldOptions>,
    pub proto3_optional: bool,
}

impl Default for FieldDescriptorProto {
    fn default() -> Self {
        FieldDescriptorProto {
            name: String::new(),
            number: 0,
            label: Label::Optional,
            r#type: Type::Int32,
            type_name: String::new(),
            extendee: String::new(),
            default_value: String::new(),
            oneof_index: None,
            json_name: String::new(),
            options: None,
            proto3_optional: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldOptions {
    pub ctype: CType,
    pub packed: Option<bool>,
    pub lazy: bool,
    pub deprecated: bool,
    pub weak: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OneofDescriptorProto {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumDescriptorProto {
    pub name: String,
    pub value: Vec<EnumValueDescriptorProto>,
    pub options: Option<EnumOptions>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumOptions {
    pub allow_alias: bool,
    pub deprecated: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumValueDescriptorProto {
    pub name: String,
    pub number: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceDescriptorProto {
    pub name: String,
    pub method: Vec<MethodDescriptorProto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodDescriptorProto {
    pub name: String,
    pub input_type: String,
    pub output_type: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
}

/// One record of the side-channel annotation file, mapping a byte range of
/// generated text back to the descriptor path it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    pub path: Vec<i32>,
    pub source_file: String,
    pub begin: u32,
    pub end: u32,
    pub semantic: Semantic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Semantic {
    #[default]
    None,
    Set,
    Alias,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedCodeInfo {
    pub annotation: Vec<Annotation>,
}

/// Minimal proto wire writer: varints and length-delimited records only,
/// which is all the descriptor embedding needs.
pub(crate) mod wire {
    pub fn put_varint(out: &mut Vec<u8>, mut value: u64) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                out.push(byte);
                break;
            }
            out.push(byte | 0x80);
        }
    }

    pub fn put_tag(out: &mut Vec<u8>, field_number: u32, wire_type: u32) {
        put_varint(out, (u64::from(field_number) << 3) | u64::from(wire_type));
    }

    pub fn put_varint_field(out: &mut Vec<u8>, field_number: u32, value: u64) {
        put_tag(out, field_number, 0);
        put_varint(out, value);
    }

    pub fn put_bytes_field(out: &mut Vec<u8>, field_number: u32, value: &[u8]) {
        put_tag(out, field_number, 2);
        put_varint(out, value.len() as u64);
        out.extend_from_slice(value);
    }

    pub fn put_str_field(out: &mut Vec<u8>, field_number: u32, value: &str) {
        put_bytes_field(out, field_number, value.as_bytes());
    }

    pub fn put_message_field(out: &mut Vec<u8>, field_number: u32, body: &[u8]) {
        put_bytes_field(out, field_number, body);
    }
}

use wire::*;

impl FileDescriptorProto {
    /// Serialize to the wire format of `FileDescriptorProto`, for embedding
    /// in generated code. Unset optional fields are omitted.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if !self.name.is_empty() {
            put_str_field(&mut out, 1, &self.name);
        }
        if !self.package.is_empty() {
            put_str_field(&mut out, 2, &self.package);
        }
        for dep in &self.dependency {
            put_str_field(&mut out, 3, dep);
        }
        for message in &self.message_type {
            put_message_field(&mut out, 4, &message.encode());
        }
        for enumeration in &self.enum_type {
            put_message_field(&mut out, 5, &enumeration.encode());
        }
        for service in &self.service {
            put_message_field(&mut out, 6, &service.encode());
        }
        for extension in &self.extension {
            put_message_field(&mut out, 7, &extension.encode());
        }
        if let Some(options) = &self.options {
            let body = options.encode();
            if !body.is_empty() {
                put_message_field(&mut out, 8, &body);
            }
        }
        for &index in &self.public_dependency {
            put_varint_field(&mut out, 10, index as u64);
        }
        for &index in &self.weak_dependency {
            put_varint_field(&mut out, 11, index as u64);
        }
        if !self.syntax.is_empty() && self.syntax != "proto2" {
            put_str_field(&mut out, 12, &self.syntax);
        }
        out
    }
}

impl FileOptions {
    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if !self.java_package.is_empty() {
            put_str_field(&mut out, 1, &self.java_package);
        }
        if !self.java_outer_classname.is_empty() {
            put_str_field(&mut out, 8, &self.java_outer_classname);
        }
        if self.java_multiple_files {
            put_varint_field(&mut out, 10, 1);
        }
        if self.deprecated {
            put_varint_field(&mut out, 23, 1);
        }
        if !self.objc_class_prefix.is_empty() {
            put_str_field(&mut out, 36, &self.objc_class_prefix);
        }
        out
    }
}

impl DescriptorProto {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if !self.name.is_empty() {
            put_str_field(&mut out, 1, &self.name);
        }
        for field in &self.field {
            put_message_field(&mut out, 2, &field.encode());
        }
        for nested in &self.nested_type {
            put_message_field(&mut out, 3, &nested.encode());
        }
        for enumeration in &self.enum_type {
            put_message_field(&mut out, 4, &enumeration.encode());
        }
        for range in &self.extension_range {
            let mut body = Vec::new();
            put_varint_field(&mut body, 1, range.start as u64);
            put_varint_field(&mut body, 2, range.end as u64);
            put_message_field(&mut out, 5, &body);
        }
        for extension in &self.extension {
            put_message_field(&mut out, 6, &extension.encode());
        }
        if let Some(options) = &self.options {
            let mut body = Vec::new();
            if options.map_entry {
                put_varint_field(&mut body, 7, 1);
            }
            if options.deprecated {
                put_varint_field(&mut body, 3, 1);
            }
            if !body.is_empty() {
                put_message_field(&mut out, 7, &body);
            }
        }
        for oneof in &self.oneof_decl {
            let mut body = Vec::new();
            if !oneof.name.is_empty() {
                put_str_field(&mut body, 1, &oneof.name);
            }
            put_message_field(&mut out, 8, &body);
        }
        out
    }
}

impl FieldDescriptorProto {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if !self.name.is_empty() {
            put_str_field(&mut out, 1, &self.name);
        }
        if !self.extendee.is_empty() {
            put_str_field(&mut out, 2, &self.extendee);
        }
        put_varint_field(&mut out, 3, self.number as u64);
        put_varint_field(&mut out, 4, self.label.wire_value());
        put_varint_field(&mut out, 5, self.r#type.wire_value());
        if !self.type_name.is_empty() {
            put_str_field(&mut out, 6, &self.type_name);
        }
        if !self.default_value.is_empty() {
            put_str_field(&mut out, 7, &self.default_value);
        }
        if let Some(options) = &self.options {
            let body = options.encode();
            if !body.is_empty() {
                put_message_field(&mut out, 8, &body);
            }
        }
        if let Some(index) = self.oneof_index {
            put_varint_field(&mut out, 9, index as u64);
        }
        if !self.json_name.is_empty() {
            put_str_field(&mut out, 10, &self.json_name);
        }
        if self.proto3_optional {
            put_varint_field(&mut out, 17, 1);
        }
        out
    }
}

impl FieldOptions {
    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self.ctype {
            CType::String => {}
            CType::Cord => put_varint_field(&mut out, 1, 1),
            CType::StringPiece => put_varint_field(&mut out, 1, 2),
        }
        if let Some(packed) = self.packed {
            put_varint_field(&mut out, 2, u64::from(packed));
        }
        if self.deprecated {
            put_varint_field(&mut out, 3, 1);
        }
        if self.lazy {
            put_varint_field(&mut out, 5, 1);
        }
        if self.weak {
            put_varint_field(&mut out, 10, 1);
        }
        out
    }
}

impl EnumDescriptorProto {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if !self.name.is_empty() {
            put_str_field(&mut out, 1, &self.name);
        }
        for value in &self.value {
            let mut body = Vec::new();
            if !value.name.is_empty() {
                put_str_field(&mut body, 1, &value.name);
            }
            put_varint_field(&mut body, 2, value.number as u64);
            put_message_field(&mut out, 2, &body);
        }
        if let Some(options) = &self.options {
            let mut body = Vec::new();
            if options.allow_alias {
                put_varint_field(&mut body, 2, 1);
            }
            if options.deprecated {
                put_varint_field(&mut body, 3, 1);
            }
            if !body.is_empty() {
                put_message_field(&mut out, 3, &body);
            }
        }
        out
    }
}

impl ServiceDescriptorProto {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if !self.name.is_empty() {
            put_str_field(&mut out, 1, &self.name);
        }
        for method in &self.method {
            let mut body = Vec::new();
            if !method.name.is_empty() {
                put_str_field(&mut body, 1, &method.name);
            }
            put_str_field(&mut body, 2, &method.input_type);
            put_str_field(&mut body, 3, &method.output_type);
            if method.client_streaming {
                put_varint_field(&mut body, 5, 1);
            }
            if method.server_streaming {
                put_varint_field(&mut body, 6, 1);
            }
            put_message_field(&mut out, 2, &body);
        }
        out
    }
}

impl GeneratedCodeInfo {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for annotation in &self.annotation {
            let mut body = Vec::new();
            if !annotation.path.is_empty() {
                // Packed repeated int32.
                let mut packed = Vec::new();
                for &step in &annotation.path {
                    put_varint(&mut packed, step as u64);
                }
                put_bytes_field(&mut body, 1, &packed);
            }
            if !annotation.source_file.is_empty() {
                put_str_field(&mut body, 2, &annotation.source_file);
            }
            put_varint_field(&mut body, 3, u64::from(annotation.begin));
            put_varint_field(&mut body, 4, u64::from(annotation.end));
            match annotation.semantic {
                Semantic::None => {}
                Semantic::Set => put_varint_field(&mut body, 5, 1),
                Semantic::Alias => put_varint_field(&mut body, 5, 2),
            }
            put_message_field(&mut out, 1, &body);
        }
        out
    }
}

/// Derive the canonical JSON name of a field (lowerCamelCase of the proto
/// name), used to decide whether an explicit `json_name` is redundant.
pub fn camel_case_json_name(field_name: &str) -> String {
    let mut out = String::with_capacity(field_name.len());
    let mut capitalize_next = false;
    for ch in field_name.chars() {
        if ch == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            out.extend(ch.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Pure source-retention stripping pass applied before the descriptor is
/// embedded in generated code. Our option model only carries
/// runtime-retention builtins, so this reduces to dropping `json_name`
/// values that are derivable from the field name.
pub fn strip_for_embedding(file: &FileDescriptorProto) -> FileDescriptorProto {
    fn strip_field(field: &FieldDescriptorProto) -> FieldDescriptorProto {
        let mut stripped = field.clone();
        if stripped.json_name == camel_case_json_name(&stripped.name) {
            stripped.json_name = String::new();
        }
        stripped
    }

    fn strip_message(message: &DescriptorProto) -> DescriptorProto {
        let mut stripped = message.clone();
        stripped.field = message.field.iter().map(strip_field).collect();
        stripped.extension = message.extension.iter().map(strip_field).collect();
        stripped.nested_type = message.nested_type.iter().map(strip_message).collect();
        stripped
    }

    let mut stripped = file.clone();
    stripped.message_type = file.message_type.iter().map(strip_message).collect();
    stripped.extension = file.extension.iter().map(strip_field).collect();
    stripped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_encoding() {
        let mut out = Vec::new();
        wire::put_varint(&mut out, 0);
        wire::put_varint(&mut out, 1);
        wire::put_varint(&mut out, 300);
        assert_eq!(out, vec![0, 1, 0xac, 0x02]);
    }

    #[test]
    fn file_encoding_is_deterministic_and_tagged() {
        let file = FileDescriptorProto {
            name: "foo.proto".to_string(),
            package: "foo".to_string(),
            syntax: "proto3".to_string(),
            message_type: vec![DescriptorProto {
                name: "Foo".to_string(),
                field: vec![FieldDescriptorProto {
                    name: "bar".to_string(),
                    number: 1,
                    r#type: Type::Int32,
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };
        let first = file.encode();
        let second = file.encode();
        assert_eq!(first, second);
        // Field 1 (name), length-delimited: tag 0x0a.
        assert_eq!(first[0], 0x0a);
        assert_eq!(&first[2..11], b"foo.proto");
    }

    #[test]
    fn strip_drops_derivable_json_name() {
        let mut file = FileDescriptorProto::default();
        file.message_type.push(DescriptorProto {
            name: "M".to_string(),
            field: vec![
                FieldDescriptorProto {
                    name: "foo_bar".to_string(),
                    json_name: "fooBar".to_string(),
                    ..Default::default()
                },
                FieldDescriptorProto {
                    name: "foo_bar".to_string(),
                    json_name: "custom".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        });
        let stripped = strip_for_embedding(&file);
        assert_eq!(stripped.message_type[0].field[0].json_name, "");
        assert_eq!(stripped.message_type[0].field[1].json_name, "custom");
    }

    #[test]
    fn generated_code_info_roundtrips_field_numbers() {
        let info = GeneratedCodeInfo {
            annotation: vec![Annotation {
                path: vec![4, 0, 2, 1],
                source_file: "foo.proto".to_string(),
                begin: 10,
                end: 20,
                semantic: Semantic::Set,
            }],
        };
        let bytes = info.encode();
        // Outer record: field 1, length-delimited.
        assert_eq!(bytes[0], 0x0a);
        // Packed path lives in field 1 of the annotation.
        assert_eq!(bytes[2], 0x0a);
        assert_eq!(bytes[3], 4);
        assert_eq!(&bytes[4..8], &[4, 0, 2, 1]);
    }
}
