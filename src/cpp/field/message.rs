//! Generators for message and group fields. Singular storage is an owned
//! pointer, null meaning absent; the accessor falls back to the shared
//! default instance.

use crate::descriptor::FieldDescriptor;
use crate::printer::Printer;

use super::super::{helpers, names};
use super::{base_vars, FieldGenOptions, FieldGeneratorInfo};

fn message_vars(
    field: FieldDescriptor<'_>,
    info: &FieldGeneratorInfo,
    gen_options: &FieldGenOptions<'_>,
) -> Vec<(String, String)> {
    let mut vars = base_vars(field, info, gen_options);
    let target = field.message_type().expect("message field");
    vars.push(("type".to_string(), names::qualified_class_name(target)));
    vars.push((
        "default_instance".to_string(),
        names::qualified_default_instance_name(target),
    ));
    vars
}

fn wire_calls(field: FieldDescriptor<'_>) -> (&'static str, &'static str, &'static str) {
    if field.is_group() {
        (
            "ParseGroup",
            "WriteGroupToArray",
            "GroupSize",
        )
    } else {
        (
            "ParseMessage",
            "WriteMessageToArray",
            "MessageSize",
        )
    }
}

pub struct SingularMessage<'a> {
    pub field: FieldDescriptor<'a>,
    vars: Vec<(String, String)>,
    has_bit: bool,
}

impl<'a> SingularMessage<'a> {
    pub fn new(
        field: FieldDescriptor<'a>,
        info: &FieldGeneratorInfo,
        gen_options: &FieldGenOptions<'_>,
    ) -> Self {
        Self {
            field,
            vars: message_vars(field, info, gen_options),
            has_bit: gen_options.has_bit_index.is_some(),
        }
    }

    pub fn generate_interface(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "$deprecated_attr$bool has_$name$() const;\n\
                 $deprecated_attr$const $type$& $name$() const;\n\
                 $deprecated_attr$$type$* mutable_$name$();\n\
                 $deprecated_attr$void clear_$name$();\n",
            );
        });
    }

    pub fn generate_members(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("$type$* $decl_member$;\n");
        });
    }

    pub fn generate_builder_members(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "inline bool $classname$::has_$name$() const {\n\
                 \x20 return _impl_.$member$ != nullptr;\n\
                 }\n\
                 inline const $type$& $classname$::$name$() const {\n\
                 \x20 if (_impl_.$member$ != nullptr) {\n\
                 \x20   return *_impl_.$member$;\n\
                 \x20 }\n\
                 \x20 return $default_instance$;\n\
                 }\n\
                 inline $type$* $classname$::mutable_$name$() {\n",
            );
            p.indent();
            if self.has_bit {
                p.print("_impl_._has_bits_[$has_word$] |= $has_mask$;\n");
            }
            p.print(
                "if (_impl_.$member$ == nullptr) {\n\
                 \x20 _impl_.$member$ = new $type$();\n\
                 }\n\
                 return _impl_.$member$;\n",
            );
            p.outdent();
            p.print(
                "}\n\
                 inline void $classname$::clear_$name$() {\n",
            );
            p.indent();
            p.print(
                "delete _impl_.$member$;\n\
                 _impl_.$member$ = nullptr;\n",
            );
            if self.has_bit {
                p.print("_impl_._has_bits_[$has_word$] &= ~$has_mask$;\n");
            }
            p.outdent();
            p.print("}\n");
        });
    }

    pub fn generate_initialization_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("_impl_.$member$ = nullptr;\n");
        });
    }

    pub fn generate_builder_clear_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "delete _impl_.$member$;\n\
                 _impl_.$member$ = nullptr;\n",
            );
        });
    }

    pub fn generate_merging_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "if (from._impl_.$member$ != nullptr) {\n\
                 \x20 mutable_$name$()->MergeFrom(*from._impl_.$member$);\n\
                 }\n",
            );
        });
    }

    pub fn generate_building_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "if (from._impl_.$member$ != nullptr) {\n\
                 \x20 _impl_.$member$ = new $type$(*from._impl_.$member$);\n\
                 }\n",
            );
        });
    }

    pub fn generate_builder_parsing_code(&self, p: &mut Printer) {
        let (parse, _, _) = wire_calls(self.field);
        helpers::with_vars(
            p,
            &[("parse_call".to_string(), parse.to_string())],
            |p| {
                helpers::with_vars(p, &self.vars, |p| {
                    p.print(
                        "ptr = ::google::protobuf::internal::$parse_call$(mutable_$name$(), ptr, ctx);\n",
                    );
                    if self.has_bit {
                        p.print("_impl_._has_bits_[$has_word$] |= $has_mask$;\n");
                    }
                });
            },
        );
    }

    pub fn generate_serialization_code(&self, p: &mut Printer) {
        let (_, write, _) = wire_calls(self.field);
        helpers::with_vars(
            p,
            &[("write_call".to_string(), write.to_string())],
            |p| {
                helpers::with_vars(p, &self.vars, |p| {
                    p.print(
                        "if (_impl_.$member$ != nullptr) {\n\
                         \x20 target = ::google::protobuf::internal::WireFormatLite::$write_call$($number$, *_impl_.$member$, target);\n\
                         }\n",
                    );
                });
            },
        );
    }

    pub fn generate_serialized_size_code(&self, p: &mut Printer) {
        let (_, _, size) = wire_calls(self.field);
        helpers::with_vars(
            p,
            &[("size_call".to_string(), size.to_string())],
            |p| {
                helpers::with_vars(p, &self.vars, |p| {
                    p.print(
                        "if (_impl_.$member$ != nullptr) {\n\
                         \x20 total_size += $tag_size$ + ::google::protobuf::internal::WireFormatLite::$size_call$(*_impl_.$member$);\n\
                         }\n",
                    );
                });
            },
        );
    }

    pub fn generate_equals_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "if (has_$name$() != other.has_$name$()) return false;\n\
                 if (has_$name$() && !(*_impl_.$member$ == *other._impl_.$member$)) return false;\n",
            );
        });
    }

    pub fn generate_hash_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "if (_impl_.$member$ != nullptr) {\n\
                 \x20 seed = ::google::protobuf::internal::HashCombine(seed, _impl_.$member$->HashCode());\n\
                 }\n",
            );
        });
    }
}

pub struct OneofMessage<'a> {
    pub field: FieldDescriptor<'a>,
    vars: Vec<(String, String)>,
}

impl<'a> OneofMessage<'a> {
    pub fn new(
        field: FieldDescriptor<'a>,
        info: &FieldGeneratorInfo,
        gen_options: &FieldGenOptions<'_>,
    ) -> Self {
        Self {
            field,
            vars: message_vars(field, info, gen_options),
        }
    }

    pub fn generate_interface(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "$deprecated_attr$bool has_$name$() const;\n\
                 $deprecated_attr$const $type$& $name$() const;\n\
                 $deprecated_attr$$type$* mutable_$name$();\n\
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
                 inline const $type$& $classname$::$name$() const {\n\
                 \x20 if ($oneof_name$_case() == $oneof_case$) {\n\
                 \x20   return *_impl_.$oneof_name$_.$member$;\n\
                 \x20 }\n\
                 \x20 return $default_instance$;\n\
                 }\n\
                 inline $type$* $classname$::mutable_$name$() {\n\
                 \x20 if ($oneof_name$_case() != $oneof_case$) {\n\
                 \x20   clear_$oneof_name$();\n\
                 \x20   set_has_$name$();\n\
                 \x20   _impl_.$oneof_name$_.$member$ = new $type$();\n\
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
            p.print("mutable_$name$()->MergeFrom(*from._impl_.$oneof_name$_.$member$);\n");
        });
    }

    pub fn generate_building_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "_impl_.$oneof_name$_.$member$ = new $type$(*from._impl_.$oneof_name$_.$member$);\n",
            );
        });
    }

    pub fn generate_builder_parsing_code(&self, p: &mut Printer) {
        let (parse, _, _) = wire_calls(self.field);
        helpers::with_vars(
            p,
            &[("parse_call".to_string(), parse.to_string())],
            |p| {
                helpers::with_vars(p, &self.vars, |p| {
                    p.print(
                        "ptr = ::google::protobuf::internal::$parse_call$(mutable_$name$(), ptr, ctx);\n",
                    );
                });
            },
        );
    }

    pub fn generate_serialization_code(&self, p: &mut Printer) {
        let (_, write, _) = wire_calls(self.field);
        helpers::with_vars(
            p,
            &[("write_call".to_string(), write.to_string())],
            |p| {
                helpers::with_vars(p, &self.vars, |p| {
                    p.print(
                        "if ($oneof_name$_case() == $oneof_case$) {\n\
                         \x20 target = ::google::protobuf::internal::WireFormatLite::$write_call$($number$, *_impl_.$oneof_name$_.$member$, target);\n\
                         }\n",
                    );
                });
            },
        );
    }

    pub fn generate_serialized_size_code(&self, p: &mut Printer) {
        let (_, _, size) = wire_calls(self.field);
        helpers::with_vars(
            p,
            &[("size_call".to_string(), size.to_string())],
            |p| {
                helpers::with_vars(p, &self.vars, |p| {
                    p.print(
                        "if ($oneof_name$_case() == $oneof_case$) {\n\
                         \x20 total_size += $tag_size$ + ::google::protobuf::internal::WireFormatLite::$size_call$(*_impl_.$oneof_name$_.$member$);\n\
                         }\n",
                    );
                });
            },
        );
    }

    pub fn generate_equals_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "if (!(*_impl_.$oneof_name$_.$member$ == *other._impl_.$oneof_name$_.$member$)) return false;\n",
            );
        });
    }

    pub fn generate_hash_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "seed = ::google::protobuf::internal::HashCombine(seed, _impl_.$oneof_name$_.$member$->HashCode());\n",
            );
        });
    }
}

pub struct RepeatedMessage<'a> {
    pub field: FieldDescriptor<'a>,
    vars: Vec<(String, String)>,
}

impl<'a> RepeatedMessage<'a> {
    pub fn new(
        field: FieldDescriptor<'a>,
        info: &FieldGeneratorInfo,
        gen_options: &FieldGenOptions<'_>,
    ) -> Self {
        Self {
            field,
            vars: message_vars(field, info, gen_options),
        }
    }

    pub fn generate_interface(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "$deprecated_attr$int $name$_size() const;\n\
                 $deprecated_attr$const $type$& $name$(int index) const;\n\
                 $deprecated_attr$$type$* mutable_$name$(int index);\n\
                 $deprecated_attr$$type$* add_$name$();\n\
                 $deprecated_attr$const ::google::protobuf::RepeatedPtrField<$type$>& $name$() const;\n\
                 $deprecated_attr$::google::protobuf::RepeatedPtrField<$type$>* mutable_$name$();\n\
                 $deprecated_attr$void clear_$name$();\n",
            );
        });
    }

    pub fn generate_members(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("::google::protobuf::RepeatedPtrField<$type$> $decl_member$;\n");
        });
    }

    pub fn generate_builder_members(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "inline int $classname$::$name$_size() const {\n\
                 \x20 return _impl_.$member$.size();\n\
                 }\n\
                 inline const $type$& $classname$::$name$(int index) const {\n\
                 \x20 return _impl_.$member$.Get(index);\n\
                 }\n\
                 inline $type$* $classname$::mutable_$name$(int index) {\n\
                 \x20 return _impl_.$member$.Mutable(index);\n\
                 }\n\
                 inline $type$* $classname$::add_$name$() {\n\
                 \x20 return _impl_.$member$.Add();\n\
                 }\n\
                 inline const ::google::protobuf::RepeatedPtrField<$type$>& $classname$::$name$() const {\n\
                 \x20 return _impl_.$member$;\n\
                 }\n\
                 inline ::google::protobuf::RepeatedPtrField<$type$>* $classname$::mutable_$name$() {\n\
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
        let (parse, _, _) = wire_calls(self.field);
        helpers::with_vars(
            p,
            &[("parse_call".to_string(), parse.to_string())],
            |p| {
                helpers::with_vars(p, &self.vars, |p| {
                    p.print(
                        "ptr = ::google::protobuf::internal::$parse_call$(_impl_.$member$.Add(), ptr, ctx);\n",
                    );
                });
            },
        );
    }

    pub fn generate_serialization_code(&self, p: &mut Printer) {
        let (_, write, _) = wire_calls(self.field);
        helpers::with_vars(
            p,
            &[("write_call".to_string(), write.to_string())],
            |p| {
                helpers::with_vars(p, &self.vars, |p| {
                    p.print(
                        "for (const $type$& value : _impl_.$member$) {\n\
                         \x20 target = ::google::protobuf::internal::WireFormatLite::$write_call$($number$, value, target);\n\
                         }\n",
                    );
                });
            },
        );
    }

    pub fn generate_serialized_size_code(&self, p: &mut Printer) {
        let (_, _, size) = wire_calls(self.field);
        helpers::with_vars(
            p,
            &[("size_call".to_string(), size.to_string())],
            |p| {
                helpers::with_vars(p, &self.vars, |p| {
                    p.print(
                        "total_size += static_cast<::size_t>($tag_size$) * static_cast<::size_t>(_impl_.$member$.size());\n\
                         for (const $type$& value : _impl_.$member$) {\n\
                         \x20 total_size += ::google::protobuf::internal::WireFormatLite::$size_call$(value);\n\
                         }\n",
                    );
                });
            },
        );
    }

    pub fn generate_equals_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print("if (_impl_.$member$ != other._impl_.$member$) return false;\n");
        });
    }

    pub fn generate_hash_code(&self, p: &mut Printer) {
        helpers::with_vars(p, &self.vars, |p| {
            p.print(
                "for (const $type$& value : _impl_.$member$) {\n\
                 \x20 seed = ::google::protobuf::internal::HashCombine(seed, value.HashCode());\n\
                 }\n",
            );
        });
    }
}
