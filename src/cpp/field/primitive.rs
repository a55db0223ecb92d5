//! Generators for numeric and bool fields.

use crate::descriptor::FieldDescriptor;
use crate::printer::Printer;

use super::super::helpers;
use super::{base_vars, FieldGenOptions, FieldGeneratorInfo};

fn primitive_vars(
    field: FieldDescriptor<'_>,
    info: &FieldGeneratorInfo,
    gen_options: &FieldGenOptions<'_>,
) -> Vec<(String, String)> {
    let mut vars = base_vars(field, info, gen_options);
    vars.push(("type".to_string(), helpers::primitive_type_name(field)));
    vars.push(("default".to_string(), helpers::default_value(field)));
    vars
}

pub struct SingularPrimitive<'a> {
    pub field: FieldDescriptor<'a>,
    vars: Vec<(String, String)>,
    has_bit: bool,
}

impl<'a> SingularPrimitive<'a> {
    pub fn new(
        field: FieldDescriptor<'a>,
        info: &FieldGeneratorInfo,
        gen_options: &FieldGenOptions<'_>,
    ) -> Self {
        Self {
            field,
            vars: primitive_vars(field, info, gen_options),
            has_bit: gen_options.has_bit_index.is_some(),
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
            p.print("$type$ $decl_member$;\n");
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
                 \x20 return _impl_.$member$;\n\
                 }\n\
                 inline void $classname$::set_$name$($type$ value) {\n",
            );
            p.indent();
            if self.has_bit {
                p.print("_impl_._has_bits_[$has_word$] |= $has_mask$;\n");
            }
            p.print("_impl_.$member$ = value;\n");
            p.outdent();
            p.print(
                "}\n\
                 inline void $classname$::clear_$name$() {\n",
            );
            p.indent();
            p.print("_impl_.$member$ = $default$;\n");
            if self.has_bit {
                p.print("_impl_._has_bits_[$has_word$] &= ~$has_mask$;\n");
            }
            p.outdent();
            p.print("}\n");
        });
    }

    pub fn generate_initialization_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("_impl_.$member$ = $default$;\n");
        });
    }

    pub fn generate_builder_clear_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("_impl_.$member$ = $default$;\n");
        });
    }

    pub fn generate_merging_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            if self.has_bit {
                p.print(
                    "if ((from._impl_._has_bits_[$has_word$] & $has_mask$) != 0) {\n\
                     \x20 set_$name$(from._impl_.$member$);\n\
                     }\n",
                );
            } else {
                p.print(
                    "if (from._impl_.$member$ != $default$) {\n\
                     \x20 set_$name$(from._impl_.$member$);\n\
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
            p.print("ptr = ::google::protobuf::internal::Read$declared_type$(ptr, &_impl_.$member$);\n");
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
                p.print("if (_impl_.$member$ != $default$) {\n");
            }
            p.indent();
            p.print(
                "target = ::google::protobuf::internal::WireFormatLite::Write$declared_type$ToArray($number$, _impl_.$member$, target);\n",
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
                p.print("if (_impl_.$member$ != $default$) {\n");
            }
            p.indent();
            if let Some(width) = helpers::fixed_size(self.field) {
                helpers::with_vars(
                    p,
                    &[("fixed_size".to_string(), width.to_string())],
                    |p| p.print("total_size += $tag_size$ + $fixed_size$;\n"),
                );
            } else {
                p.print(
                    "total_size += $tag_size$ + ::google::protobuf::internal::WireFormatLite::$declared_type$Size(_impl_.$member$);\n",
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
                "seed = ::google::protobuf::internal::HashCombine(seed, static_cast<::uint64_t>(_impl_.$member$));\n",
            );
        });
    }
}

pub struct OneofPrimitive<'a> {
    pub field: FieldDescriptor<'a>,
    vars: Vec<(String, String)>,
}

impl<'a> OneofPrimitive<'a> {
    pub fn new(
        field: FieldDescriptor<'a>,
        info: &FieldGeneratorInfo,
        gen_options: &FieldGenOptions<'_>,
    ) -> Self {
        Self {
            field,
            vars: primitive_vars(field, info, gen_options),
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

    pub fn generate_members(&self, _p: &mut Printer) {
        // Storage lives in the containing oneof's union; declared by the
        // message generator.
    }

    pub fn generate_builder_members(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "inline bool $classname$::has_$name$() const {\n\
                 \x20 return $oneof_name$_case() == $oneof_case$;\n\
                 }\n\
                 inline $type$ $classname$::$name$() const {\n\
                 \x20 if ($oneof_name$_case() == $oneof_case$) {\n\
                 \x20   return _impl_.$oneof_name$_.$member$;\n\
                 \x20 }\n\
                 \x20 return $default$;\n\
                 }\n\
                 inline void $classname$::set_$name$($type$ value) {\n\
                 \x20 if ($oneof_name$_case() != $oneof_case$) {\n\
                 \x20   clear_$oneof_name$();\n\
                 \x20   set_has_$name$();\n\
                 \x20 }\n\
                 \x20 _impl_.$oneof_name$_.$member$ = value;\n\
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
            p.print("_impl_.$oneof_name$_.$member$ = $default$;\n");
        });
    }

    pub fn generate_merging_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("set_$name$(from._impl_.$oneof_name$_.$member$);\n");
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
                "if ($oneof_name$_case() != $oneof_case$) {\n\
                 \x20 clear_$oneof_name$();\n\
                 \x20 set_has_$name$();\n\
                 }\n\
                 ptr = ::google::protobuf::internal::Read$declared_type$(ptr, &_impl_.$oneof_name$_.$member$);\n",
            );
        });
    }

    pub fn generate_serialization_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "if ($oneof_name$_case() == $oneof_case$) {\n\
                 \x20 target = ::google::protobuf::internal::WireFormatLite::Write$declared_type$ToArray($number$, _impl_.$oneof_name$_.$member$, target);\n\
                 }\n",
            );
        });
    }

    pub fn generate_serialized_size_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("if ($oneof_name$_case() == $oneof_case$) {\n");
            p.indent();
            if let Some(width) = helpers::fixed_size(self.field) {
                helpers::with_vars(
                    p,
                    &[("fixed_size".to_string(), width.to_string())],
                    |p| p.print("total_size += $tag_size$ + $fixed_size$;\n"),
                );
            } else {
                p.print(
                    "total_size += $tag_size$ + ::google::protobuf::internal::WireFormatLite::$declared_type$Size(_impl_.$oneof_name$_.$member$);\n",
                );
            }
            p.outdent();
            p.print("}\n");
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

pub struct RepeatedPrimitive<'a> {
    pub field: FieldDescriptor<'a>,
    vars: Vec<(String, String)>,
    packed: bool,
}

impl<'a> RepeatedPrimitive<'a> {
    pub fn new(
        field: FieldDescriptor<'a>,
        info: &FieldGeneratorInfo,
        gen_options: &FieldGenOptions<'_>,
    ) -> Self {
        Self {
            field,
            vars: primitive_vars(field, info, gen_options),
            packed: field.is_packed(),
        }
    }

    pub fn generate_interface(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "$deprecated_attr$int $name$_size() const;\n\
                 $deprecated_attr$$type$ $name$(int index) const;\n\
                 $deprecated_attr$void set_$name$(int index, $type$ value);\n\
                 $deprecated_attr$void add_$name$($type$ value);\n\
                 $deprecated_attr$const ::google::protobuf::RepeatedField<$type$>& $name$() const;\n\
                 $deprecated_attr$::google::protobuf::RepeatedField<$type$>* mutable_$name$();\n\
                 $deprecated_attr$void clear_$name$();\n",
            );
        });
    }

    pub fn generate_members(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("::google::protobuf::RepeatedField<$type$> $decl_member$;\n");
        });
    }

    pub fn generate_builder_members(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "inline int $classname$::$name$_size() const {\n\
                 \x20 return _impl_.$member$.size();\n\
                 }\n\
                 inline $type$ $classname$::$name$(int index) const {\n\
                 \x20 return _impl_.$member$.Get(index);\n\
                 }\n\
                 inline void $classname$::set_$name$(int index, $type$ value) {\n\
                 \x20 _impl_.$member$.Set(index, value);\n\
                 }\n\
                 inline void $classname$::add_$name$($type$ value) {\n\
                 \x20 _impl_.$member$.Add(value);\n\
                 }\n\
                 inline const ::google::protobuf::RepeatedField<$type$>& $classname$::$name$() const {\n\
                 \x20 return _impl_.$member$;\n\
                 }\n\
                 inline ::google::protobuf::RepeatedField<$type$>* $classname$::mutable_$name$() {\n\
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

    /// Both wire shapes are accepted regardless of the declared packedness:
    /// a length-delimited tag drains a packed run, the scalar tag appends a
    /// single element.
    pub fn generate_builder_parsing_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "if ((tag & 7) == 2) {\n\
                 \x20 ptr = ::google::protobuf::internal::Packed$declared_type$Parser(&_impl_.$member$, ptr, ctx);\n\
                 } else {\n\
                 \x20 $type$ value;\n\
                 \x20 ptr = ::google::protobuf::internal::Read$declared_type$(ptr, &value);\n\
                 \x20 _impl_.$member$.Add(value);\n\
                 }\n",
            );
        });
    }

    pub fn generate_serialization_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            if self.packed {
                p.print(
                    "if (!_impl_.$member$.empty()) {\n\
                     \x20 target = ::google::protobuf::internal::WireFormatLite::Write$declared_type$PackedToArray($number$, _impl_.$member$, target);\n\
                     }\n",
                );
            } else {
                p.print(
                    "for (const $type$ value : _impl_.$member$) {\n\
                     \x20 target = ::google::protobuf::internal::WireFormatLite::Write$declared_type$ToArray($number$, value, target);\n\
                     }\n",
                );
            }
        });
    }

    pub fn generate_serialized_size_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            let member = super::super::names::field_member_name(self.field);
            let data_size = if let Some(width) = helpers::fixed_size(self.field) {
                format!(
                    "static_cast<::size_t>({width}) * static_cast<::size_t>(_impl_.{member}.size())"
                )
            } else {
                format!(
                    "::google::protobuf::internal::WireFormatLite::{}SizeRepeated(_impl_.{member})",
                    helpers::declared_type_name(self.field)
                )
            };
            if self.packed {
                p.print("{\n");
                p.indent();
                helpers::with_vars(
                    p,
                    &[("data_size".to_string(), data_size)],
                    |p| {
                        p.print(
                            "const ::size_t data_size = $data_size$;\n\
                             if (data_size != 0) {\n\
                             \x20 total_size += $tag_size$ + data_size +\n\
                             \x20     ::google::protobuf::internal::WireFormatLite::Int32Size(static_cast<::int32_t>(data_size));\n\
                             }\n",
                        );
                    },
                );
                p.outdent();
                p.print("}\n");
            } else {
                helpers::with_vars(
                    p,
                    &[("data_size".to_string(), data_size)],
                    |p| {
                        p.print(
                            "total_size += static_cast<::size_t>($tag_size$) * static_cast<::size_t>(_impl_.$member$.size()) + $data_size$;\n",
                        );
                    },
                );
            }
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
                "for (const $type$ value : _impl_.$member$) {\n\
                 \x20 seed = ::google::protobuf::internal::HashCombine(seed, static_cast<::uint64_t>(value));\n\
                 }\n",
            );
        });
    }
}
