//! Java identifier resolution.
//!
//! A file maps to one wrapping outer class; nested proto types become nested
//! Java classes joined by `.`. Reserved words get a trailing underscore.
//! Accessor names colliding with the runtime base class come from a
//! configurable forbidden set, not a hard-coded one.

use std::collections::HashSet;
use std::sync::OnceLock;

use crate::descriptor::{
    Descriptor, Edition, EnumDescriptor, FieldDescriptor, FileDescriptor, ServiceDescriptor,
};
use crate::error::{GenerateError, Result};

const KEYWORD_LIST: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "package", "private", "protected", "public", "return", "short", "static",
    "strictfp", "super", "switch", "synchronized", "this", "throw", "throws", "transient", "true",
    "false", "null", "try", "void", "volatile", "while",
];

fn keywords() -> &'static HashSet<&'static str> {
    static KEYWORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    KEYWORDS.get_or_init(|| KEYWORD_LIST.iter().copied().collect())
}

/// Per-target configuration. The forbidden accessor set diverges between
/// runtimes, so it is data, not code.
pub struct Config {
    /// Proto field names whose accessors would collide with methods of the
    /// generated message base class.
    pub forbidden_field_names: HashSet<&'static str>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            forbidden_field_names: [
                "class",
                "default_instance",
                "default_instance_for_type",
                "serialized_size",
                "cached_size",
                "unknown_fields",
                "initialized",
                "init",
                "parser_for_type",
                "all_fields",
                "descriptor",
                "descriptor_for_type",
            ]
            .into_iter()
            .collect(),
        }
    }
}

pub fn resolve_keyword(name: &str) -> String {
    if keywords().contains(name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
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

fn file_basename(file: FileDescriptor<'_>) -> &str {
    let name = file.name();
    let stem = name
        .strip_suffix(".protodevel")
        .or_else(|| name.strip_suffix(".proto"))
        .unwrap_or(name);
    stem.rsplit('/').next().unwrap_or(stem)
}

fn derived_outer_class(file: FileDescriptor<'_>) -> String {
    underscores_to_camel_case(file_basename(file), true)
}

fn top_level_symbols(file: FileDescriptor<'_>) -> Vec<&str> {
    let mut symbols: Vec<&str> = file.messages().map(|m| m.name()).collect();
    symbols.extend(file.enums().map(|e| e.name()));
    symbols.extend(file.services().map(|s| s.name()));
    symbols
}

/// The wrapping outer class of a file. An explicit `java_outer_classname`
/// always wins. A derived name that collides with a top-level symbol fails
/// generation under proto2 and takes the `OuterClass` suffix otherwise.
pub fn file_class_name(file: FileDescriptor<'_>) -> Result<String> {
    if let Some(options) = file.options() {
        if !options.java_outer_classname.is_empty() {
            return Ok(options.java_outer_classname.clone());
        }
    }
    let derived = derived_outer_class(file);
    let collides = top_level_symbols(file)
        .iter()
        .any(|s| s.eq_ignore_ascii_case(&derived));
    if !collides {
        return Ok(derived);
    }
    match file.edition() {
        Edition::Proto2 => Err(GenerateError::schema(
            file.name(),
            format!("{derived}: outer class name collides with a type in the file; set java_outer_classname"),
        )),
        Edition::Proto3 => Ok(format!("{derived}OuterClass")),
    }
}

/// `java_package` option, falling back to the proto package.
pub fn java_package(file: FileDescriptor<'_>) -> String {
    if let Some(options) = file.options() {
        if !options.java_package.is_empty() {
            return options.java_package.clone();
        }
    }
    file.package().to_string()
}

/// Class name relative to the outer class: nested names joined by `.`.
pub fn class_name(message: Descriptor<'_>) -> String {
    let mut parts = vec![resolve_keyword(message.name())];
    let mut parent = message.containing_type();
    while let Some(p) = parent {
        parts.push(resolve_keyword(p.name()));
        parent = p.containing_type();
    }
    parts.reverse();
    parts.join(".")
}

pub fn enum_name(enumeration: EnumDescriptor<'_>) -> String {
    let mut parts = vec![resolve_keyword(enumeration.name())];
    let mut parent = enumeration.containing_type();
    while let Some(p) = parent {
        parts.push(resolve_keyword(p.name()));
        parent = p.containing_type();
    }
    parts.reverse();
    parts.join(".")
}

/// Fully qualified name: package, outer class, then the nested path.
pub fn qualified_class_name(message: Descriptor<'_>) -> Result<String> {
    let package = java_package(message.file());
    let outer = file_class_name(message.file())?;
    let relative = class_name(message);
    if package.is_empty() {
        Ok(format!("{outer}.{relative}"))
    } else {
        Ok(format!("{package}.{outer}.{relative}"))
    }
}

pub fn qualified_enum_name(enumeration: EnumDescriptor<'_>) -> Result<String> {
    let package = java_package(enumeration.file());
    let outer = file_class_name(enumeration.file())?;
    let relative = enum_name(enumeration);
    if package.is_empty() {
        Ok(format!("{outer}.{relative}"))
    } else {
        Ok(format!("{package}.{outer}.{relative}"))
    }
}

/// Accessor suffix of a field: `foo_bar` -> `FooBar`; forbidden or colliding
/// names carry the field number.
pub fn capitalized_field_name(field: FieldDescriptor<'_>) -> String {
    underscores_to_camel_case(field.name(), true)
}

pub fn field_member_name(field: FieldDescriptor<'_>) -> String {
    format!("{}_", underscores_to_camel_case(field.name(), false))
}

pub fn service_class_name(service: ServiceDescriptor<'_>) -> String {
    resolve_keyword(service.name())
}

/// File path of the generated outer class, package dots as directories.
pub fn file_path(file: FileDescriptor<'_>) -> Result<String> {
    let package = java_package(file);
    let class = file_class_name(file)?;
    if package.is_empty() {
        Ok(format!("{class}.java"))
    } else {
        Ok(format!("{}/{class}.java", package.replace('.', "/")))
    }
}

/// File path of the generated Kotlin DSL extensions.
pub fn kotlin_file_path(file: FileDescriptor<'_>) -> Result<String> {
    let package = java_package(file);
    let class = file_class_name(file)?;
    if package.is_empty() {
        Ok(format!("{class}Kt.kt"))
    } else {
        Ok(format!("{}/{class}Kt.kt", package.replace('.', "/")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorPool;
    use crate::proto::*;

    fn file_with_message(syntax: &str, filename: &str, message: &str) -> FileDescriptorProto {
        FileDescriptorProto {
            name: filename.to_string(),
            package: "demo".to_string(),
            syntax: syntax.to_string(),
            message_type: vec![DescriptorProto {
                name: message.to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn outer_class_derives_from_filename() {
        let mut pool = DescriptorPool::new();
        pool.add_file(&file_with_message("proto3", "dir/foo_bar.proto", "Msg"))
            .unwrap();
        let file = pool.file_by_name("dir/foo_bar.proto").unwrap();
        assert_eq!(file_class_name(file).unwrap(), "FooBar");
        assert_eq!(file_path(file).unwrap(), "demo/FooBar.java");
    }

    #[test]
    fn proto3_collision_takes_outer_class_suffix() {
        let mut pool = DescriptorPool::new();
        pool.add_file(&file_with_message("proto3", "foo.proto", "Foo"))
            .unwrap();
        let file = pool.file_by_name("foo.proto").unwrap();
        assert_eq!(file_class_name(file).unwrap(), "FooOuterClass");
    }

    #[test]
    fn proto2_collision_is_a_schema_error() {
        let mut pool = DescriptorPool::new();
        pool.add_file(&file_with_message("proto2", "foo.proto", "Foo"))
            .unwrap();
        let file = pool.file_by_name("foo.proto").unwrap();
        let err = file_class_name(file).unwrap_err();
        assert!(err.to_string().contains("foo.proto"));
        assert!(err.to_string().contains("java_outer_classname"));
    }

    #[test]
    fn explicit_outer_classname_wins_even_on_collision() {
        let mut proto = file_with_message("proto2", "foo.proto", "Foo");
        proto.options = Some(FileOptions {
            java_outer_classname: "FooProtos".to_string(),
            ..Default::default()
        });
        let mut pool = DescriptorPool::new();
        pool.add_file(&proto).unwrap();
        let file = pool.file_by_name("foo.proto").unwrap();
        assert_eq!(file_class_name(file).unwrap(), "FooProtos");
    }

    #[test]
    fn collision_check_is_case_insensitive() {
        let mut pool = DescriptorPool::new();
        pool.add_file(&file_with_message("proto3", "foo.proto", "FOO"))
            .unwrap();
        let file = pool.file_by_name("foo.proto").unwrap();
        assert_eq!(file_class_name(file).unwrap(), "FooOuterClass");
    }
}
