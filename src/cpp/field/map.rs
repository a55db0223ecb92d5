//! Generator for map fields.
//!
//! A map field is a repeated synthetic entry message on the wire; in memory
//! it is a keyed container. Merging upserts, serialization walks entries in
//! iteration order, and the entry class itself is never user-visible.

use crate::descriptor::{CppType, FieldDescriptor};
use crate::printer::Printer;

use super::super::{helpers, names};
use super::{base_vars, FieldGenOptions, FieldGeneratorInfo};

fn map_storage_type(field: FieldDescriptor<'_>) -> String {
    match field.cpp_type() {
        // Enum values are stored as int so unknown numbers survive in open
        // enums.
        CppType::Enum => "int".to_string(),
        _ => helpers::primitive_type_name(field),
    }
}

pub struct MapField<'a> {
    pub field: FieldDescriptor<'a>,
    vars: Vec<(String, String)>,
}

impl<'a> MapField<'a> {
    pub fn new(
        field: FieldDescriptor<'a>,
        info: &FieldGeneratorInfo,
        gen_options: &FieldGenOptions<'_>,
    ) -> Self {
        let entry = field.message_type().expect("map field");
        let mut vars = base_vars(field, info, gen_options);
        vars.push(("key_type".to_string(), map_storage_type(entry.map_key())));
        vars.push((
            "value_type".to_string(),
            map_storage_type(entry.map_value()),
        ));
        vars.push(("entry_class".to_string(), names::qualified_class_name(entry)));
        Self { field, vars }
    }

    pub fn generate_interface(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "$deprecated_attr$int $name$_size() const;\n\
                 $deprecated_attr$const ::google::protobuf::Map<$key_type$, $value_type$>& $name$() const;\n\
                 $deprecated_attr$::google::protobuf::Map<$key_type$, $value_type$>* mutable_$name$();\n\
                 $deprecated_attr$void clear_$name$();\n",
            );
        });
    }

    pub fn generate_members(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("::google::protobuf::Map<$key_type$, $value_type$> $decl_member$;\n");
        });
    }

    pub fn generate_builder_members(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "inline int $classname$::$name$_size() const {\n\
                 \x20 return static_cast<int>(_impl_.$member$.size());\n\
                 }\n\
                 inline const ::google::protobuf::Map<$key_type$, $value_type$>& $classname$::$name$() const {\n\
                 \x20 return _impl_.$member$;\n\
                 }\n\
                 inline ::google::protobuf::Map<$key_type$, $value_type$>* $classname$::mutable_$name$() {\n\
                 \x20 return &_impl_.$member$;\n\
                 }\n\
                 inline void $classname$::clear_$name$() {\n\
                 \x20 _impl_.$member$.clear();\n\
                 }\n",
            );
        });
    }

    pub fn generate_initialization_code(&self, _p: &mut Printer) {}

    pub fn generate_builder_clear_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("_impl_.$member$.clear();\n");
        });
    }

    pub fn generate_merging_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "for (const auto& entry : from._impl_.$member$) {\n\
                 \x20 _impl_.$member$[entry.first] = entry.second;\n\
                 }\n",
            );
        });
    }

    pub fn generate_building_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("_impl_.$member$ = from._impl_.$member$;\n");
        });
    }

    pub fn generate_builder_parsing_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "$entry_class$ entry;\n\
                 ptr = ::google::protobuf::internal::ParseMessage(&entry, ptr, ctx);\n\
                 _impl_.$member$[entry.key()] = entry.value();\n",
            );
        });
    }

    pub fn generate_serialization_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "for (const auto& entry : _impl_.$member$) {\n\
                 \x20 target = $entry_class$::Funcs::SerializeToArray($number$, entry.first, entry.second, target);\n\
                 }\n",
            );
        });
    }

    pub fn generate_serialized_size_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "total_size += static_cast<::size_t>($tag_size$) * static_cast<::size_t>(_impl_.$member$.size());\n\
                 for (const auto& entry : _impl_.$member$) {\n\
                 \x20 total_size += $entry_class$::Funcs::ByteSizeLong(entry.first, entry.second);\n\
                 }\n",
            );
        });
    }

    pub fn generate_equals_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("if (_impl_.$member$ != other._impl_.$member$) return false;\n");
        });
    }

    pub fn generate_hash_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "seed = ::google::protobuf::internal::HashCombine(seed, static_cast<::uint64_t>(_impl_.$member$.size()));\n",
            );
        });
    }
}
