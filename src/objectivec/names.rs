//! Objective-C naming: class prefixes, camel-cased file names, and the
//! keyword mangling the flat C namespace forces on generated symbols.

use crate::descriptor::{Descriptor, EnumDescriptor, EnumValueDescriptor, FieldDescriptor, FileDescriptor};

/// Identifiers that collide with Objective-C keywords or NSObject surface;
/// fields with these names get the `_p` suffix, the way the stock generator
/// mangles them.
const RESERVED_WORDS: &[&str] = &[
    "id", "alloc", "autorelease", "bycopy", "byref", "class", "copy", "dealloc",
    "description", "hash", "in", "init", "inout", "isProxy", "new", "oneway",
    "out", "release", "retain", "retainCount", "self", "superclass", "zone",
    "auto", "break", "case", "char", "const", "continue", "default", "do",
    "double", "else", "enum", "extern", "float", "for", "goto", "if", "int",
    "long", "nil", "register", "return", "short", "signed", "sizeof", "static",
    "struct", "switch", "typedef", "union", "unsigned", "void", "volatile",
    "while",
];

pub fn sanitize(name: &str) -> String {
    if RESERVED_WORDS.contains(&name) {
        format!("{name}_p")
    } else {
        name.to_string()
    }
}

/// `foo_bar_baz` to `FooBarBaz`; digits force the next letter upper-case.
pub fn underscores_to_camel_case(input: &str, initial_upper: bool) -> String {
    let mut out = String::with_capacity(input.len());
    let mut upper_next = initial_upper;
    for ch in input.chars() {
        if ch == '_' {
            upper_next = true;
        } else if ch.is_ascii_digit() {
            out.push(ch);
            upper_next = true;
        } else if upper_next {
            out.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// The `objc_class_prefix` file option, empty when unset.
pub fn class_prefix(file: FileDescriptor<'_>) -> String {
    file.options()
        .map(|o| o.objc_class_prefix.clone())
        .unwrap_or_default()
}

/// Nested message path joined with `_`, behind the file's class prefix.
pub fn class_name(message: Descriptor<'_>) -> String {
    let mut parts = vec![underscores_to_camel_case(message.name(), true)];
    let mut parent = message.containing_type();
    while let Some(p) = parent {
        parts.push(underscores_to_camel_case(p.name(), true));
        parent = p.containing_type();
    }
    parts.reverse();
    format!("{}{}", class_prefix(message.file()), parts.join("_"))
}

pub fn enum_name(enumeration: EnumDescriptor<'_>) -> String {
    let own = underscores_to_camel_case(enumeration.name(), true);
    match enumeration.containing_type() {
        Some(parent) => format!("{}_{own}", class_name(parent)),
        None => format!("{}{own}", class_prefix(enumeration.file())),
    }
}

/// `<EnumName>_<ValueCamel>`, with the enum's own name stripped from the
/// value when the proto used it as a prefix.
pub fn enum_value_name(enumeration: EnumDescriptor<'_>, value: EnumValueDescriptor<'_>) -> String {
    let type_name = enum_name(enumeration);
    let prefix = format!("{}_", enumeration.name().to_ascii_uppercase());
    let stripped = value
        .name()
        .strip_prefix(&prefix)
        .unwrap_or(value.name());
    format!(
        "{type_name}_{}",
        underscores_to_camel_case(&stripped.to_ascii_lowercase(), true)
    )
}

/// Property name: lower camel case, keyword-mangled.
pub fn field_name(field: FieldDescriptor<'_>) -> String {
    sanitize(&underscores_to_camel_case(field.name(), false))
}

pub fn capitalized_field_name(field: FieldDescriptor<'_>) -> String {
    underscores_to_camel_case(field.name(), true)
}

/// The `FooRoot` registry class wrapping the file's extensions.
pub fn root_class_name(file: FileDescriptor<'_>) -> String {
    format!("{}{}Root", class_prefix(file), file_base_name(file))
}

fn file_base_name(file: FileDescriptor<'_>) -> String {
    let basename = file
        .name()
        .rsplit('/')
        .next()
        .unwrap_or(file.name())
        .trim_end_matches(".proto");
    underscores_to_camel_case(&basename.replace(['.', '-'], "_"), true)
}

/// Output path of the generated header, next to the proto file.
pub fn header_path(file: FileDescriptor<'_>) -> String {
    let dir = match file.name().rfind('/') {
        Some(pos) => &file.name()[..=pos],
        None => "",
    };
    format!("{dir}{}.pbobjc.h", file_base_name(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorPool;
    use crate::proto::*;

    fn pool() -> DescriptorPool {
        let file = FileDescriptorProto {
            name: "maps/route_guide.proto".to_string(),
            package: "maps".to_string(),
            syntax: "proto3".to_string(),
            options: Some(FileOptions {
                objc_class_prefix: "RTG".to_string(),
                ..Default::default()
            }),
            message_type: vec![DescriptorProto {
                name: "Feature".to_string(),
                field: vec![FieldDescriptorProto {
                    name: "class".to_string(),
                    number: 1,
                    r#type: Type::String,
                    ..Default::default()
                }],
                nested_type: vec![DescriptorProto {
                    name: "Tag".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            enum_type: vec![EnumDescriptorProto {
                name: "Terrain".to_string(),
                value: vec![
                    EnumValueDescriptorProto {
                        name: "TERRAIN_UNKNOWN".to_string(),
                        number: 0,
                    },
                    EnumValueDescriptorProto {
                        name: "TERRAIN_OPEN_WATER".to_string(),
                        number: 1,
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
    fn classes_take_the_file_prefix_and_nested_underscore_path() {
        let pool = pool();
        let feature = pool.message_by_name("maps.Feature").unwrap();
        assert_eq!(class_name(feature), "RTGFeature");
        let tag = pool.message_by_name("maps.Feature.Tag").unwrap();
        assert_eq!(class_name(tag), "RTGFeature_Tag");
    }

    #[test]
    fn enum_values_drop_the_redundant_type_prefix() {
        let pool = pool();
        let terrain = pool.enum_by_name("maps.Terrain").unwrap();
        assert_eq!(enum_name(terrain), "RTGTerrain");
        let values: Vec<String> = terrain
            .values()
            .map(|v| enum_value_name(terrain, v))
            .collect();
        assert_eq!(values, ["RTGTerrain_Unknown", "RTGTerrain_OpenWater"]);
    }

    #[test]
    fn reserved_field_names_are_mangled() {
        let pool = pool();
        let feature = pool.message_by_name("maps.Feature").unwrap();
        let field = feature.fields().next().unwrap();
        assert_eq!(field_name(field), "class_p");
    }

    #[test]
    fn header_path_camel_cases_the_basename_in_place() {
        let pool = pool();
        let fd = pool.file_by_name("maps/route_guide.proto").unwrap();
        assert_eq!(header_path(fd), "maps/RouteGuide.pbobjc.h");
        assert_eq!(root_class_name(fd), "RTGRouteGuideRoot");
    }
}
