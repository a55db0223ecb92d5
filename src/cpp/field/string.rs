//! Generators for string and bytes fields.

use crate::descriptor::{FieldDescriptor, Utf8Mode};
use crate::printer::Printer;

use super::super::helpers;
use super::{base_vars, FieldGenOptions, FieldGeneratorInfo};

fn string_vars(
    field: FieldDescriptor<'_>,
    info: &FieldGeneratorInfo,
    gen_options: &FieldGenOptions<'_>,
) -> Vec<(String, String)> {
    let mut vars = base_vars(field, info, gen_options);
    vars.push(("default".to_string(), helpers::default_value(field)));
    vars
}

/// UTF-8 check statements for one direction (`PARSE` or `SERIALIZE`). Bytes
/// fields and `Utf8Mode::None` emit nothing.
fn print_utf8_check(p: &mut Printer, field: FieldDescriptor<'_>, direction: &str, value: &str) {
    let routine = match field.utf8_mode() {
        Utf8Mode::None => return,
        Utf8Mode::Verify => "VerifyUTF8StringNamedField",
        Utf8Mode::Strict => "VerifyUtf8String",
    };
    helpers::with_vars(
        p,
        &[
            ("utf8_routine".to_string(), routine.to_string()),
            ("direction".to_string(), direction.to_string()),
            ("value".to_string(), value.to_string()),
        ],
        |p| {
            p.print(
                "::google::protobuf::internal::WireFormatLite::$utf8_routine$(\n\
                 \x20   $value$.data(), static_cast<int>($value$.size()),\n\
                 \x20   ::google::protobuf::internal::WireFormatLite::$direction$, \"$full_name$\");\n",
            );
        },
    );
}

pub struct SingularString<'a> {
    pub field: FieldDescriptor<'a>,
    vars: Vec<(String, String)>,
    has_bit: bool,
}

impl<'a> SingularString<'a> {
    pub fn new(
        field: FieldDescriptor<'a>,
        info: &FieldGeneratorInfo,
        gen_options: &FieldGenOptions<'_>,
    ) -> Self {
        Self {
            field,
            vars: string_vars(field, info, gen_options),
            has_bit: gen_options.has_bit_index.is_some(),
        }
    }

    pub fn generate_interface(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            if self.has_bit {
                p.print("$deprecated_attr$bool has_$name$() const;\n");
            }
            p.print(
                "$deprecated_attr$const std::string& $name$() const;\n\
                 $deprecated_attr$void set_$name$(std::string value);\n\
                 $deprecated_attr$std::string* mutable_$name$();\n\
                 $deprecated_attr$void clear_$name$();\n",
            );
        });
    }

    pub fn generate_members(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("std::string $decl_member$;\n");
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
                "inline const std::string& $classname$::$name$() const {\n\
                 \x20 return _impl_.$member$;\n\
                 }\n\
                 inline void $classname$::set_$name$(std::string value) {\n",
            );
            p.indent();
            if self.has_bit {
                p.print("_impl_._has_bits_[$has_word$] |= $has_mask$;\n");
            }
            p.print("_impl_.$member$ = std::move(value);\n");
            p.outdent();
            p.print(
                "}\n\
                 inline std::string* $classname$::mutable_$name$() {\n",
            );
            p.indent();
            if self.has_bit {
                p.print("_impl_._has_bits_[$has_word$] |= $has_mask$;\n");
            }
            p.print("return &_impl_.$member$;\n");
            p.outdent();
            p.print(
                "}\n\
                 inline void $classname$::clear_$name$() {\n",
            );
            p.indent();
            p.print("_impl_.$member$.clear();\n");
            if self.has_bit {
                p.print("_impl_._has_bits_[$has_word$] &= ~$has_mask$;\n");
            }
            p.outdent();
            p.print("}\n");
        });
    }

    pub fn generate_initialization_code(&self, p: &mut Printer) {
        // Non-empty proto2 defaults are materialized eagerly.
        if !self.field.default_value().is_empty() {
            helpers::with_vars(p, &self.vars, |p| {
                p.print("_impl_.$member$ = $default$;\n");
            });
        }
    }

    pub fn generate_builder_clear_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            if self.field.default_value().is_empty() {
                p.print("_impl_.$member$.clear();\n");
            } else {
                p.print("_impl_.$member$ = $default$;\n");
            }
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
                    "if (!from._impl_.$member$.empty()) {\n\
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
            p.print("ptr = ::google::protobuf::internal::InlineGreedyStringParser(&_impl_.$member$, ptr, ctx);\n");
            let member = super::super::names::field_member_name(self.field);
            print_utf8_check(p, self.field, "PARSE", &format!("_impl_.{member}"));
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
                p.print("if (!_impl_.$member$.empty()) {\n");
            }
            p.indent();
            let member = super::super::names::field_member_name(self.field);
            print_utf8_check(p, self.field, "SERIALIZE", &format!("_impl_.{member}"));
            p.print(
                "target = ::google::protobuf::internal::WireFormatLite::WriteStringToArray($number$, _impl_.$member$, target);\n",
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
                p.print("if (!_impl_.$member$.empty()) {\n");
            }
            p.indent();
            p.print(
                "total_size += $tag_size$ + ::google::protobuf::internal::WireFormatLite::StringSize(_impl_.$member$);\n",
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
                "seed = ::google::protobuf::internal::HashCombine(seed, ::google::protobuf::internal::HashString(_impl_.$member$));\n",
            );
        });
    }
}

pub struct OneofString<'a> {
    pub field: FieldDescriptor<'a>,
    vars: Vec<(String, String)>,
}

impl<'a> OneofString<'a> {
    pub fn new(
        field: FieldDescriptor<'a>,
        info: &FieldGeneratorInfo,
        gen_options: &FieldGenOptions<'_>,
    ) -> Self {
        Self {
            field,
            vars: string_vars(field, info, gen_options),
        }
    }

    /// Concrete dereference of the union slot, for contexts that cannot go
    /// through the variable map.
    fn slot(&self) -> String {
        let oneof = self.field.real_containing_oneof().expect("oneof field");
        format!(
            "(*_impl_.{}_.{})",
            super::super::names::oneof_name(oneof),
            super::super::names::field_member_name(self.field)
        )
    }

    pub fn generate_interface(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "$deprecated_attr$bool has_$name$() const;\n\
                 $deprecated_attr$const std::string& $name$() const;\n\
                 $deprecated_attr$void set_$name$(std::string value);\n\
                 $deprecated_attr$std::string* mutable_$name$();\n\
                 $deprecated_attr$void clear_$name$();\n",
            );
        });
    }

    pub fn generate_members(&self, _p: &mut Printer) {
        // Oneof storage is a std::string* slot in the union; declared by the
        // message generator.
    }

    pub fn generate_builder_members(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "inline bool $classname$::has_$name$() const {\n\
                 \x20 return $oneof_name$_case() == $oneof_case$;\n\
                 }\n\
                 inline const std::string& $classname$::$name$() const {\n\
                 \x20 if ($oneof_name$_case() == $oneof_case$) {\n\
                 \x20   return *_impl_.$oneof_name$_.$member$;\n\
                 \x20 }\n\
                 \x20 return ::google::protobuf::internal::GetEmptyString();\n\
                 }\n\
                 inline void $classname$::set_$name$(std::string value) {\n\
                 \x20 if ($oneof_name$_case() != $oneof_case$) {\n\
                 \x20   clear_$oneof_name$();\n\
                 \x20   set_has_$name$();\n\
                 \x20   _impl_.$oneof_name$_.$member$ = new std::string();\n\
                 \x20 }\n\
                 \x20 *_impl_.$oneof_name$_.$member$ = std::move(value);\n\
                 }\n\
                 inline std::string* $classname$::mutable_$name$() {\n\
                 \x20 if ($oneof_name$_case() != $oneof_case$) {\n\
                 \x20   clear_$oneof_name$();\n\
                 \x20   set_has_$name$();\n\
                 \x20   _impl_.$oneof_name$_.$member$ = new std::string();\n\
                 \x20 }\n\
                 \x20 return _impl_.$oneof_name$_.$member$;\n\
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
            p.print("delete _impl_.$oneof_name$_.$member$;\n");
        });
    }

    pub fn generate_merging_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("set_$name$(*from._impl_.$oneof_name$_.$member$);\n");
        });
    }

    pub fn generate_building_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "_impl_.$oneof_name$_.$member$ = new std::string(*from._impl_.$oneof_name$_.$member$);\n",
            );
        });
    }

    pub fn generate_builder_parsing_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "ptr = ::google::protobuf::internal::InlineGreedyStringParser(mutable_$name$(), ptr, ctx);\n",
            );
            print_utf8_check(p, self.field, "PARSE", &self.slot());
        });
    }

    pub fn generate_serialization_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("if ($oneof_name$_case() == $oneof_case$) {\n");
            p.indent();
            print_utf8_check(p, self.field, "SERIALIZE", &self.slot());
            p.print(
                "target = ::google::protobuf::internal::WireFormatLite::WriteStringToArray($number$, *_impl_.$oneof_name$_.$member$, target);\n",
            );
            p.outdent();
            p.print("}\n");
        });
    }

    pub fn generate_serialized_size_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "if ($oneof_name$_case() == $oneof_case$) {\n\
                 \x20 total_size += $tag_size$ + ::google::protobuf::internal::WireFormatLite::StringSize(*_impl_.$oneof_name$_.$member$);\n\
                 }\n",
            );
        });
    }

    pub fn generate_equals_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "if (*_impl_.$oneof_name$_.$member$ != *other._impl_.$oneof_name$_.$member$) return false;\n",
            );
        });
    }

    pub fn generate_hash_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "seed = ::google::protobuf::internal::HashCombine(seed, ::google::protobuf::internal::HashString(*_impl_.$oneof_name$_.$member$));\n",
            );
        });
    }
}

pub struct RepeatedString<'a> {
    pub field: FieldDescriptor<'a>,
    vars: Vec<(String, String)>,
}

impl<'a> RepeatedString<'a> {
    pub fn new(
        field: FieldDescriptor<'a>,
        info: &FieldGeneratorInfo,
        gen_options: &FieldGenOptions<'_>,
    ) -> Self {
        Self {
            field,
            vars: string_vars(field, info, gen_options),
        }
    }

    pub fn generate_interface(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "$deprecated_attr$int $name$_size() const;\n\
                 $deprecated_attr$const std::string& $name$(int index) const;\n\
                 $deprecated_attr$void set_$name$(int index, std::string value);\n\
                 $deprecated_attr$std::string* add_$name$();\n\
                 $deprecated_attr$const ::google::protobuf::RepeatedPtrField<std::string>& $name$() const;\n\
                 $deprecated_attr$::google::protobuf::RepeatedPtrField<std::string>* mutable_$name$();\n\
                 $deprecated_attr$void clear_$name$();\n",
            );
        });
    }

    pub fn generate_members(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("::google::protobuf::RepeatedPtrField<std::string> $decl_member$;\n");
        });
    }

    pub fn generate_builder_members(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "inline int $classname$::$name$_size() const {\n\
                 \x20 return _impl_.$member$.size();\n\
                 }\n\
                 inline const std::string& $classname$::$name$(int index) const {\n\
                 \x20 return _impl_.$member$.Get(index);\n\
                 }\n\
                 inline void $classname$::set_$name$(int index, std::string value) {\n\
                 \x20 *_impl_.$member$.Mutable(index) = std::move(value);\n\
                 }\n\
                 inline std::string* $classname$::add_$name$() {\n\
                 \x20 return _impl_.$member$.Add();\n\
                 }\n\
                 inline const ::google::protobuf::RepeatedPtrField<std::string>& $classname$::$name$() const {\n\
                 \x20 return _impl_.$member$;\n\
                 }\n\
                 inline ::google::protobuf::RepeatedPtrField<std::string>* $classname$::mutable_$name$() {\n\
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
            p.print(
                "std::string* value = _impl_.$member$.Add();\n\
                 ptr = ::google::protobuf::internal::InlineGreedyStringParser(value, ptr, ctx);\n",
            );
            print_utf8_check(p, self.field, "PARSE", "(*value)");
        });
    }

    pub fn generate_serialization_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("for (const std::string& value : _impl_.$member$) {\n");
            p.indent();
            print_utf8_check(p, self.field, "SERIALIZE", "value");
            p.print(
                "target = ::google::protobuf::internal::WireFormatLite::WriteStringToArray($number$, value, target);\n",
            );
            p.outdent();
            p.print("}\n");
        });
    }

    pub fn generate_serialized_size_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "total_size += static_cast<::size_t>($tag_size$) * static_cast<::size_t>(_impl_.$member$.size());\n\
                 for (const std::string& value : _impl_.$member$) {\n\
                 \x20 total_size += ::google::protobuf::internal::WireFormatLite::StringSize(value);\n\
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
                "for (const std::string& value : _impl_.$member$) {\n\
                 \x20 seed = ::google::protobuf::internal::HashCombine(seed, ::google::protobuf::internal::HashString(value));\n\
                 }\n",
            );
        });
    }
}
