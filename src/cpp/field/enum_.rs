//! Generators for enum fields.
//!
//! Storage is a plain `int`; accessors cast at the boundary. Closed enums
//! route out-of-range numbers into the unknown-field set at parse time, open
//! enums store them as-is.

use crate::descriptor::FieldDescriptor;
use crate::printer::Printer;

use super::super::{helpers, names};
use super::{base_vars, FieldGenOptions, FieldGeneratorInfo};

fn enum_vars(
    field: FieldDescriptor<'_>,
    info: &FieldGeneratorInfo,
    gen_options: &FieldGenOptions<'_>,
) -> Vec<(String, String)> {
    let mut vars = base_vars(field, info, gen_options);
    let enumeration = field.enum_type().expect("enum field");
    vars.push(("type".to_string(), names::qualified_enum_name(enumeration)));
    vars.push(("default".to_string(), helpers::default_value(field)));
    vars
}

fn print_closed_enum_guard(p: &mut Printer, closed: bool) {
    // Open enums accept any varint; nothing to guard.
    if closed {
        p.print(
            "if (!$type$_IsValid(value)) {\n\
             \x20 _internal_metadata_.mutable_unknown_fields()->AddVarint($number$, static_cast<::uint64_t>(value));\n\
             \x20 break;\n\
             }\n",
        );
    }
}

pub struct SingularEnum<'a> {
    pub field: FieldDescriptor<'a>,
    vars: Vec<(String, String)>,
    has_bit: bool,
    closed: bool,
}

impl<'a> SingularEnum<'a> {
    pub fn new(
        field: FieldDescriptor<'a>,
        info: &FieldGeneratorInfo,
        gen_options: &FieldGenOptions<'_>,
    ) -> Self {
        Self {
            field,
            vars: enum_vars(field, info, gen_options),
            has_bit: gen_options.has_bit_index.is_some(),
            closed: gen_options.enum_is_closed,
        }
    }

    pub fn generate_interface(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            if self.has_bit {
                p.print("$deprecated_attr$bool has_$name$() const;\n");
            }
            p.print(
                "$deprecated_attr$$type$ $name$() const;\n\
                 $deprecated_attr$void set_$name$($type$ value);\n\
                 $deprecated_attr$void clear_$name$();\n",
            );
        });
    }

    pub fn generate_members(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("int $decl_member$;\n");
        });
    }

    pub fn generate_builder_members(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            if self.has_bit {
                p.print(
                    "inline bool $classname$::has_$name$() const {\n\
                     \x20 return (_impl_._has_bits_[$has_word$] & $has_mask$) != 0;\n\
                     }\n",
                );
            }
            p.print(
                "inline $type$ $classname$::$name$() const {\n\
                 \x20 return static_cast<$type$>(_impl_.$member$);\n\
                 }\n\
                 inline void $classname$::set_$name$($type$ value) {\n",
            );
            p.indent();
            if self.closed {
                p.print("assert($type$_IsValid(value));\n");
            }
            if self.has_bit {
                p.print("_impl_._has_bits_[$has_word$] |= $has_mask$;\n");
            }
            p.print("_impl_.$member$ = static_cast<int>(value);\n");
            p.outdent();
            p.print(
                "}\n\
                 inline void $classname$::clear_$name$() {\n",
            );
            p.indent();
            p.print("_impl_.$member$ = static_cast<int>($default$);\n");
            if self.has_bit {
                p.print("_impl_._has_bits_[$has_word$] &= ~$has_mask$;\n");
            }
            p.outdent();
            p.print("}\n");
        });
    }

    pub fn generate_initialization_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("_impl_.$member$ = static_cast<int>($default$);\n");
        });
    }

    pub fn generate_builder_clear_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("_impl_.$member$ = static_cast<int>($default$);\n");
        });
    }

    pub fn generate_merging_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            if self.has_bit {
                p.print(
                    "if ((from._impl_._has_bits_[$has_word$] & $has_mask$) != 0) {\n\
                     \x20 set_$name$(from.$name$());\n\
                     }\n",
                );
            } else {
                p.print(
                    "if (from._impl_.$member$ != static_cast<int>($default$)) {\n\
                     \x20 set_$name$(from.$name$());\n\
                     }\n",
                );
            }
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
                "int value;\n\
                 ptr = ::google::protobuf::internal::ReadEnum(ptr, &value);\n",
            );
            print_closed_enum_guard(p, self.closed);
            p.print("_impl_.$member$ = value;\n");
            if self.has_bit {
                p.print("_impl_._has_bits_[$has_word$] |= $has_mask$;\n");
            }
        });
    }

    pub fn generate_serialization_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            if self.has_bit {
                p.print("if ((_impl_._has_bits_[$has_word$] & $has_mask$) != 0) {\n");
            } else {
                p.print("if (_impl_.$member$ != static_cast<int>($default$)) {\n");
            }
            p.indent();
            p.print(
                "target = ::google::protobuf::internal::WireFormatLite::WriteEnumToArray($number$, _impl_.$member$, target);\n",
            );
            p.outdent();
            p.print("}\n");
        });
    }

    pub fn generate_serialized_size_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            if self.has_bit {
                p.print("if ((_impl_._has_bits_[$has_word$] & $has_mask$) != 0) {\n");
            } else {
                p.print("if (_impl_.$member$ != static_cast<int>($default$)) {\n");
            }
            p.indent();
            p.print(
                "total_size += $tag_size$ + ::google::protobuf::internal::WireFormatLite::EnumSize(_impl_.$member$);\n",
            );
            p.outdent();
            p.print("}\n");
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
                "seed = ::google::protobuf::internal::HashCombine(seed, static_cast<::uint64_t>(_impl_.$member$));\n",
            );
        });
    }
}

pub struct OneofEnum<'a> {
    pub field: FieldDescriptor<'a>,
    vars: Vec<(String, String)>,
    closed: bool,
}

impl<'a> OneofEnum<'a> {
    pub fn new(
        field: FieldDescriptor<'a>,
        info: &FieldGeneratorInfo,
        gen_options: &FieldGenOptions<'_>,
    ) -> Self {
        Self {
            field,
            vars: enum_vars(field, info, gen_options),
            closed: gen_options.enum_is_closed,
        }
    }

    pub fn generate_interface(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "$deprecated_attr$bool has_$name$() const;\n\
                 $deprecated_attr$$type$ $name$() const;\n\
                 $deprecated_attr$void set_$name$($type$ value);\n\
                 $deprecated_attr$void clear_$name$();\n",
            );
        });
    }

    pub fn generate_members(&self, _p: &mut Printer) {}

    pub fn generate_builder_members(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "inline bool $classname$::has_$name$() const {\n\
                 \x20 return $oneof_name$_case() == $oneof_case$;\n\
                 }\n\
                 inline $type$ $classname$::$name$() const {\n\
                 \x20 if ($oneof_name$_case() == $oneof_case$) {\n\
                 \x20   return static_cast<$type$>(_impl_.$oneof_name$_.$member$);\n\
                 \x20 }\n\
                 \x20 return $default$;\n\
                 }\n\
                 inline void $classname$::set_$name$($type$ value) {\n\
                 \x20 if ($oneof_name$_case() != $oneof_case$) {\n\
                 \x20   clear_$oneof_name$();\n\
                 \x20   set_has_$name$();\n\
                 \x20 }\n\
                 \x20 _impl_.$oneof_name$_.$member$ = static_cast<int>(value);\n\
                 }\n\
                 inline void $classname$::clear_$name$() {\n\
                 \x20 if ($oneof_name$_case() == $oneof_case$) {\n\
                 \x20   clear_$oneof_name$();\n\
                 \x20 }\n\
                 }\n",
            );
        });
    }

    pub fn generate_initialization_code(&self, _p: &mut Printer) {}

    pub fn generate_builder_clear_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("_impl_.$oneof_name$_.$member$ = static_cast<int>($default$);\n");
        });
    }

    pub fn generate_merging_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("set_$name$(from.$name$());\n");
        });
    }

    pub fn generate_building_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("_impl_.$oneof_name$_.$member$ = from._impl_.$oneof_name$_.$member$;\n");
        });
    }

    pub fn generate_builder_parsing_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "int value;\n\
                 ptr = ::google::protobuf::internal::ReadEnum(ptr, &value);\n",
            );
            print_closed_enum_guard(p, self.closed);
            p.print(
                "if ($oneof_name$_case() != $oneof_case$) {\n\
                 \x20 clear_$oneof_name$();\n\
                 \x20 set_has_$name$();\n\
                 }\n\
                 _impl_.$oneof_name$_.$member$ = value;\n",
            );
        });
    }

    pub fn generate_serialization_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "if ($oneof_name$_case() == $oneof_case$) {\n\
                 \x20 target = ::google::protobuf::internal::WireFormatLite::WriteEnumToArray($number$, _impl_.$oneof_name$_.$member$, target);\n\
                 }\n",
            );
        });
    }

    pub fn generate_serialized_size_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "if ($oneof_name$_case() == $oneof_case$) {\n\
                 \x20 total_size += $tag_size$ + ::google::protobuf::internal::WireFormatLite::EnumSize(_impl_.$oneof_name$_.$member$);\n\
                 }\n",
            );
        });
    }

    pub fn generate_equals_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "if (_impl_.$oneof_name$_.$member$ != other._impl_.$oneof_name$_.$member$) return false;\n",
            );
        });
    }

    pub fn generate_hash_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "seed = ::google::protobuf::internal::HashCombine(seed, static_cast<::uint64_t>(_impl_.$oneof_name$_.$member$));\n",
            );
        });
    }
}

pub struct RepeatedEnum<'a> {
    pub field: FieldDescriptor<'a>,
    vars: Vec<(String, String)>,
    packed: bool,
    closed: bool,
}

impl<'a> RepeatedEnum<'a> {
    pub fn new(
        field: FieldDescriptor<'a>,
        info: &FieldGeneratorInfo,
        gen_options: &FieldGenOptions<'_>,
    ) -> Self {
        Self {
            field,
            vars: enum_vars(field, info, gen_options),
            packed: field.is_packed(),
            closed: gen_options.enum_is_closed,
        }
    }

    pub fn generate_interface(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "$deprecated_attr$int $name$_size() const;\n\
                 $deprecated_attr$$type$ $name$(int index) const;\n\
                 $deprecated_attr$void set_$name$(int index, $type$ value);\n\
                 $deprecated_attr$void add_$name$($type$ value);\n\
                 $deprecated_attr$const ::google::protobuf::RepeatedField<int>& $name$() const;\n\
                 $deprecated_attr$::google::protobuf::RepeatedField<int>* mutable_$name$();\n\
                 $deprecated_attr$void clear_$name$();\n",
            );
        });
    }

    pub fn generate_members(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("::google::protobuf::RepeatedField<int> $decl_member$;\n");
        });
    }

    pub fn generate_builder_members(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "inline int $classname$::$name$_size() const {\n\
                 \x20 return _impl_.$member$.size();\n\
                 }\n\
                 inline $type$ $classname$::$name$(int index) const {\n\
                 \x20 return static_cast<$type$>(_impl_.$member$.Get(index));\n\
                 }\n\
                 inline void $classname$::set_$name$(int index, $type$ value) {\n\
                 \x20 _impl_.$member$.Set(index, static_cast<int>(value));\n\
                 }\n\
                 inline void $classname$::add_$name$($type$ value) {\n\
                 \x20 _impl_.$member$.Add(static_cast<int>(value));\n\
                 }\n\
                 inline const ::google::protobuf::RepeatedField<int>& $classname$::$name$() const {\n\
                 \x20 return _impl_.$member$;\n\
                 }\n\
                 inline ::google::protobuf::RepeatedField<int>* $classname$::mutable_$name$() {\n\
                 \x20 return &_impl_.$member$;\n\
                 }\n\
                 inline void $classname$::clear_$name$() {\n\
                 \x20 _impl_.$member$.Clear();\n\
                 }\n",
            );
        });
    }

    pub fn generate_initialization_code(&self, _p: &mut Printer) {}

    pub fn generate_builder_clear_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("_impl_.$member$.Clear();\n");
        });
    }

    pub fn generate_merging_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("_impl_.$member$.MergeFrom(from._impl_.$member$);\n");
        });
    }

    pub fn generate_building_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("_impl_.$member$.CopyFrom(from._impl_.$member$);\n");
        });
    }

    pub fn generate_builder_parsing_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("if ((tag & 7) == 2) {\n");
            p.indent();
            if self.closed {
                p.print(
                    "ptr = ::google::protobuf::internal::PackedEnumParserArg(&_impl_.$member$, ptr, ctx,\n\
                     \x20   $type$_IsValid, _internal_metadata_.mutable_unknown_fields(), $number$);\n",
                );
            } else {
                p.print(
                    "ptr = ::google::protobuf::internal::PackedEnumParser(&_impl_.$member$, ptr, ctx);\n",
                );
            }
            p.outdent();
            p.print(
                "} else {\n\
                 \x20 int value;\n\
                 \x20 ptr = ::google::protobuf::internal::ReadEnum(ptr, &value);\n",
            );
            p.indent();
            print_closed_enum_guard(p, self.closed);
            p.print("_impl_.$member$.Add(value);\n");
            p.outdent();
            p.print("}\n");
        });
    }

    pub fn generate_serialization_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            if self.packed {
                p.print(
                    "if (!_impl_.$member$.empty()) {\n\
                     \x20 target = ::google::protobuf::internal::WireFormatLite::WriteEnumPackedToArray($number$, _impl_.$member$, target);\n\
                     }\n",
                );
            } else {
                p.print(
                    "for (const int value : _impl_.$member$) {\n\
                     \x20 target = ::google::protobuf::internal::WireFormatLite::WriteEnumToArray($number$, value, target);\n\
                     }\n",
                );
            }
        });
    }

    pub fn generate_serialized_size_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "{\n\
                 \x20 ::size_t data_size = 0;\n\
                 \x20 for (const int value : _impl_.$member$) {\n\
                 \x20   data_size += ::google::protobuf::internal::WireFormatLite::EnumSize(value);\n\
                 \x20 }\n",
            );
            p.indent();
            if self.packed {
                p.print(
                    "if (data_size != 0) {\n\
                     \x20 total_size += $tag_size$ + data_size +\n\
                     \x20     ::google::protobuf::internal::WireFormatLite::Int32Size(static_cast<::int32_t>(data_size));\n\
                     }\n",
                );
            } else {
                p.print(
                    "total_size += static_cast<::size_t>($tag_size$) * static_cast<::size_t>(_impl_.$member$.size()) + data_size;\n",
                );
            }
            p.outdent();
            p.print("}\n");
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
                "for (const int value : _impl_.$member$) {\n\
                 \x20 seed = ::google::protobuf::internal::HashCombine(seed, static_cast<::uint64_t>(value));\n\
                 }\n",
            );
        });
    }
}
