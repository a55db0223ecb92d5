//! Per-field code generation.
//!
//! Exactly one generator variant exists per (cardinality, category,
//! container) combination; `make_field_generator` picks it with the fixed
//! selection rule: map, then repeated, then real-oneof, then singular.
//! Groups are treated as messages throughout.
//!
//! Every variant implements the same lifecycle-hook contract. The message
//! generator calls the hooks in a fixed sequence; each hook is pure text
//! emission against the printer using the field's variable map.

mod enum_;
mod map;
mod message;
mod primitive;
mod string;

use std::collections::HashSet;

use crate::descriptor::{CppType, Descriptor, FieldDescriptor};
use crate::options::Options;
use crate::printer::Printer;

use super::names;

/// Naming record for one field, resolved once per message. When the default
/// accessor name collides with another field or a reserved accessor, the
/// field number is appended and the reason recorded.
#[derive(Debug, Clone)]
pub struct FieldGeneratorInfo {
    pub name: String,
    pub capitalized_name: String,
    pub disambiguated_reason: Option<String>,
}

/// Accessor base names already claimed by the message runtime; a field named
/// after one of these must be disambiguated. Parameterized per target
/// configuration rather than hard-coded in the generators.
pub fn build_field_infos(
    message: Descriptor<'_>,
    forbidden_names: &HashSet<&str>,
) -> Vec<FieldGeneratorInfo> {
    let declared: Vec<&str> = message.fields().map(|f| f.name()).collect();
    message
        .fields()
        .map(|field| {
            let base = names::field_name(field);
            let mut reason = None;
            if forbidden_names.contains(base.as_str()) {
                reason = Some(format!("collides with reserved accessor {base:?}"));
            } else if declared
                .iter()
                .any(|&other| other != field.name() && other.eq_ignore_ascii_case(field.name()))
            {
                reason = Some("collides with another field name".to_string());
            }
            let name = if reason.is_some() {
                format!("{base}_{}", field.number())
            } else {
                base
            };
            let capitalized = names::underscores_to_camel_case(&name, true);
            FieldGeneratorInfo {
                name,
                capitalized_name: capitalized,
                disambiguated_reason: reason,
            }
        })
        .collect()
}

/// The tagged variant driving hook dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    SingularPrimitive,
    OneofPrimitive,
    RepeatedPrimitive,
    SingularString,
    OneofString,
    RepeatedString,
    SingularEnum,
    OneofEnum,
    RepeatedEnum,
    SingularMessage,
    OneofMessage,
    RepeatedMessage,
    Map,
}

/// First match wins: map, repeated, real oneof, singular.
pub fn select_variant(field: FieldDescriptor<'_>) -> Variant {
    let category = field.cpp_type();
    if field.is_map() {
        return Variant::Map;
    }
    if field.is_repeated() {
        return match category {
            CppType::Message => Variant::RepeatedMessage,
            CppType::Enum => Variant::RepeatedEnum,
            CppType::String | CppType::Bytes => Variant::RepeatedString,
            _ => Variant::RepeatedPrimitive,
        };
    }
    if field.real_containing_oneof().is_some() {
        return match category {
            CppType::Message => Variant::OneofMessage,
            CppType::Enum => Variant::OneofEnum,
            CppType::String | CppType::Bytes => Variant::OneofString,
            _ => Variant::OneofPrimitive,
        };
    }
    match category {
        CppType::Message => Variant::SingularMessage,
        CppType::Enum => Variant::SingularEnum,
        CppType::String | CppType::Bytes => Variant::SingularString,
        _ => Variant::SingularPrimitive,
    }
}

pub enum FieldGenerator<'a> {
    SingularPrimitive(primitive::SingularPrimitive<'a>),
    OneofPrimitive(primitive::OneofPrimitive<'a>),
    RepeatedPrimitive(primitive::RepeatedPrimitive<'a>),
    SingularString(string::SingularString<'a>),
    OneofString(string::OneofString<'a>),
    RepeatedString(string::RepeatedString<'a>),
    SingularEnum(enum_::SingularEnum<'a>),
    OneofEnum(enum_::OneofEnum<'a>),
    RepeatedEnum(enum_::RepeatedEnum<'a>),
    SingularMessage(message::SingularMessage<'a>),
    OneofMessage(message::OneofMessage<'a>),
    RepeatedMessage(message::RepeatedMessage<'a>),
    Map(map::MapField<'a>),
}

/// Everything a variant needs at construction time. `enum_is_closed` is the
/// routing decision for out-of-range enum values (unknown-field set vs
/// sentinel) — decided by the caller, never inferred here.
pub struct FieldGenOptions<'a> {
    pub classname: String,
    pub has_bit_index: Option<usize>,
    pub enum_is_closed: bool,
    /// Storage lives in the heap-allocated cold section of `Impl_`.
    pub split: bool,
    pub options: &'a Options,
}

pub fn make_field_generator<'a>(
    field: FieldDescriptor<'a>,
    info: &FieldGeneratorInfo,
    gen_options: &FieldGenOptions<'_>,
) -> FieldGenerator<'a> {
    match select_variant(field) {
        Variant::SingularPrimitive => {
            FieldGenerator::SingularPrimitive(primitive::SingularPrimitive::new(
                field,
                info,
                gen_options,
            ))
        }
        Variant::OneofPrimitive => {
            FieldGenerator::OneofPrimitive(primitive::OneofPrimitive::new(field, info, gen_options))
        }
        Variant::RepeatedPrimitive => FieldGenerator::RepeatedPrimitive(
            primitive::RepeatedPrimitive::new(field, info, gen_options),
        ),
        Variant::SingularString => {
            FieldGenerator::SingularString(string::SingularString::new(field, info, gen_options))
        }
        Variant::OneofString => {
            FieldGenerator::OneofString(string::OneofString::new(field, info, gen_options))
        }
        Variant::RepeatedString => {
            FieldGenerator::RepeatedString(string::RepeatedString::new(field, info, gen_options))
        }
        Variant::SingularEnum => {
            FieldGenerator::SingularEnum(enum_::SingularEnum::new(field, info, gen_options))
        }
        Variant::OneofEnum => {
            FieldGenerator::OneofEnum(enum_::OneofEnum::new(field, info, gen_options))
        }
        Variant::RepeatedEnum => {
            FieldGenerator::RepeatedEnum(enum_::RepeatedEnum::new(field, info, gen_options))
        }
        Variant::SingularMessage => {
            FieldGenerator::SingularMessage(message::SingularMessage::new(field, info, gen_options))
        }
        Variant::OneofMessage => {
            FieldGenerator::OneofMessage(message::OneofMessage::new(field, info, gen_options))
        }
        Variant::RepeatedMessage => {
            FieldGenerator::RepeatedMessage(message::RepeatedMessage::new(field, info, gen_options))
        }
        Variant::Map => FieldGenerator::Map(map::MapField::new(field, info, gen_options)),
    }
}

macro_rules! dispatch {
    ($self:ident, $method:ident, $printer:ident) => {
        match $self {
            FieldGenerator::SingularPrimitive(g) => g.$method($printer),
            FieldGenerator::OneofPrimitive(g) => g.$method($printer),
            FieldGenerator::RepeatedPrimitive(g) => g.$method($printer),
            FieldGenerator::SingularString(g) => g.$method($printer),
            FieldGenerator::OneofString(g) => g.$method($printer),
            FieldGenerator::RepeatedString(g) => g.$method($printer),
            FieldGenerator::SingularEnum(g) => g.$method($printer),
            FieldGenerator::OneofEnum(g) => g.$method($printer),
            FieldGenerator::RepeatedEnum(g) => g.$method($printer),
            FieldGenerator::SingularMessage(g) => g.$method($printer),
            FieldGenerator::OneofMessage(g) => g.$method($printer),
            FieldGenerator::RepeatedMessage(g) => g.$method($printer),
            FieldGenerator::Map(g) => g.$method($printer),
        }
    };
}

impl<'a> FieldGenerator<'a> {
    pub fn field(&self) -> FieldDescriptor<'a> {
        match self {
            FieldGenerator::SingularPrimitive(g) => g.field,
            FieldGenerator::OneofPrimitive(g) => g.field,
            FieldGenerator::RepeatedPrimitive(g) => g.field,
            FieldGenerator::SingularString(g) => g.field,
            FieldGenerator::OneofString(g) => g.field,
            FieldGenerator::RepeatedString(g) => g.field,
            FieldGenerator::SingularEnum(g) => g.field,
            FieldGenerator::OneofEnum(g) => g.field,
            FieldGenerator::RepeatedEnum(g) => g.field,
            FieldGenerator::SingularMessage(g) => g.field,
            FieldGenerator::OneofMessage(g) => g.field,
            FieldGenerator::RepeatedMessage(g) => g.field,
            FieldGenerator::Map(g) => g.field,
        }
    }

    pub fn generate_interface(&self, printer: &mut Printer) {
        dispatch!(self, generate_interface, printer)
    }
    pub fn generate_members(&self, printer: &mut Printer) {
        dispatch!(self, generate_members, printer)
    }
    pub fn generate_builder_members(&self, printer: &mut Printer) {
        dispatch!(self, generate_builder_members, printer)
    }
    pub fn generate_initialization_code(&self, printer: &mut Printer) {
        dispatch!(self, generate_initialization_code, printer)
    }
    pub fn generate_builder_clear_code(&self, printer: &mut Printer) {
        dispatch!(self, generate_builder_clear_code, printer)
    }
    pub fn generate_merging_code(&self, printer: &mut Printer) {
        dispatch!(self, generate_merging_code, printer)
    }
    pub fn generate_building_code(&self, printer: &mut Printer) {
        dispatch!(self, generate_building_code, printer)
    }
    pub fn generate_builder_parsing_code(&self, printer: &mut Printer) {
        dispatch!(self, generate_builder_parsing_code, printer)
    }
    pub fn generate_serialization_code(&self, printer: &mut Printer) {
        dispatch!(self, generate_serialization_code, printer)
    }
    pub fn generate_serialized_size_code(&self, printer: &mut Printer) {
        dispatch!(self, generate_serialized_size_code, printer)
    }
    pub fn generate_equals_code(&self, printer: &mut Printer) {
        dispatch!(self, generate_equals_code, printer)
    }
    pub fn generate_hash_code(&self, printer: &mut Printer) {
        dispatch!(self, generate_hash_code, printer)
    }
}

/// Shared variable-map construction for all variants.
pub(super) fn base_vars(
    field: FieldDescriptor<'_>,
    info: &FieldGeneratorInfo,
    gen_options: &FieldGenOptions<'_>,
) -> Vec<(String, String)> {
    use super::helpers;
    let mut vars = helpers::field_vars(field, &info.name, &info.capitalized_name);
    if gen_options.split {
        // Cold storage is reached through the Impl_::Split pointer.
        let member = super::names::field_member_name(field);
        let slot = vars
            .iter_mut()
            .find(|(k, _)| k == "member")
            .expect("member var");
        slot.1 = format!("_split_->{member}");
    }
    vars.push((
        "decl_member".to_string(),
        super::names::field_member_name(field),
    ));
    vars.push(("classname".to_string(), gen_options.classname.clone()));
    vars.push((
        "declared_type".to_string(),
        helpers::declared_type_name(field).to_string(),
    ));
    vars.push((
        "tag_size".to_string(),
        helpers::tag_size(field).to_string(),
    ));
    if let Some(index) = gen_options.has_bit_index {
        vars.push(("has_word".to_string(), (index / 32).to_string()));
        vars.push((
            "has_mask".to_string(),
            format!("0x{:08x}u", 1u32 << (index % 32)),
        ));
    }
    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorPool;
    use crate::proto::*;

    fn build_pool() -> DescriptorPool {
        let file = FileDescriptorProto {
            name: "variants.proto".to_string(),
            package: "v".to_string(),
            syntax: "proto3".to_string(),
            message_type: vec![DescriptorProto {
                name: "M".to_string(),
                oneof_decl: vec![OneofDescriptorProto {
                    name: "choice".to_string(),
                }],
                field: vec![
                    FieldDescriptorProto {
                        name: "scalar".to_string(),
                        number: 1,
                        r#type: Type::Int32,
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "reps".to_string(),
                        number: 2,
                        label: Label::Repeated,
                        r#type: Type::String,
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "pick".to_string(),
                        number: 3,
                        r#type: Type::Int64,
                        oneof_index: Some(0),
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "grp".to_string(),
                        number: 4,
                        r#type: Type::Group,
                        type_name: ".v.M.Grp".to_string(),
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "m".to_string(),
                        number: 5,
                        label: Label::Repeated,
                        r#type: Type::Message,
                        type_name: ".v.M.MEntry".to_string(),
                        ..Default::default()
                    },
                ],
                nested_type: vec![
                    DescriptorProto {
                        name: "Grp".to_string(),
                        ..Default::default()
                    },
                    DescriptorProto {
                        name: "MEntry".to_string(),
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
    fn selection_rule_order() {
        let pool = build_pool();
        let m = pool.message_by_name("v.M").unwrap();
        let variants: Vec<_> = m.fields().map(select_variant).collect();
        assert_eq!(
            variants,
            [
                Variant::SingularPrimitive,
                Variant::RepeatedString,
                Variant::OneofPrimitive,
                Variant::SingularMessage, // group treated as message
                Variant::Map,             // map wins over repeated message
            ]
        );
    }

    #[test]
    fn forbidden_names_are_disambiguated_with_field_number() {
        let pool = build_pool();
        let m = pool.message_by_name("v.M").unwrap();
        let forbidden: HashSet<&str> = ["scalar"].into_iter().collect();
        let infos = build_field_infos(m, &forbidden);
        assert_eq!(infos[0].name, "scalar_1");
        assert!(infos[0].disambiguated_reason.is_some());
        assert_eq!(infos[1].name, "reps");
        assert!(infos[1].disambiguated_reason.is_none());
    }
}
