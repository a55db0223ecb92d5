//! Per-message code generation: class definition, inline accessors, and the
//! out-of-line method bodies.
//!
//! The emission order is fixed: class header, oneof case enums, accessor
//! declarations, then the private `Impl_` aggregate. Source-side methods are
//! constructor/destructor, Clear, MergeFrom/CopyFrom, the tag-switch parser,
//! serialization and size accounting (ascending field number interleaved
//! with extension ranges), equality and hashing, and oneof bookkeeping.

use std::collections::HashSet;

use itertools::Itertools;

use crate::descriptor::{CppType, Descriptor, FieldDescriptor, OneofDescriptor};
use crate::options::{EnforceMode, Options};
use crate::printer::Printer;
use crate::proto::Semantic;
use crate::scc::SccAnalyzer;

use super::field::{
    build_field_infos, make_field_generator, FieldGenOptions, FieldGenerator, FieldGeneratorInfo,
};
use super::{helpers, names};

fn oneof_case_enum_name(oneof: OneofDescriptor<'_>) -> String {
    format!("{}Case", names::underscores_to_camel_case(oneof.name(), true))
}

fn oneof_not_set_constant(oneof: OneofDescriptor<'_>) -> String {
    format!("{}_NOT_SET", oneof.name().to_uppercase())
}

/// Union slot type for a oneof member.
fn oneof_storage_type(field: FieldDescriptor<'_>) -> String {
    match field.cpp_type() {
        CppType::Enum => "int".to_string(),
        CppType::String | CppType::Bytes => "std::string*".to_string(),
        CppType::Message => format!(
            "{}*",
            names::qualified_class_name(field.message_type().expect("message field"))
        ),
        _ => helpers::primitive_type_name(field),
    }
}

pub struct MessageGenerator<'a> {
    message: Descriptor<'a>,
    options: &'a Options,
    classname: String,
    infos: Vec<FieldGeneratorInfo>,
    generators: Vec<FieldGenerator<'a>>,
    /// Parallel to fields: index into the presence bitfield, if tracked
    /// there.
    has_bit_indices: Vec<Option<usize>>,
    has_bit_count: usize,
    split_fields: Vec<bool>,
    /// Parallel to fields: message-typed fields whose reachable graph holds
    /// a required field, so IsInitialized must recurse.
    needs_init_check: Vec<bool>,
}

impl<'a> MessageGenerator<'a> {
    pub fn new(
        message: Descriptor<'a>,
        options: &'a Options,
        forbidden_names: &HashSet<&str>,
        analyzer: &mut SccAnalyzer<'a>,
    ) -> Self {
        let classname = names::class_name(message);
        let infos = build_field_infos(message, forbidden_names);

        let mut has_bit_indices = Vec::with_capacity(message.field_count());
        let mut has_bit_count = 0usize;
        let mut split_fields = Vec::with_capacity(message.field_count());
        let mut needs_init_check = Vec::with_capacity(message.field_count());
        for field in message.fields() {
            let tracked = !field.is_repeated()
                && field.has_presence()
                && field.real_containing_oneof().is_none()
                && field.cpp_type() != CppType::Message;
            if tracked {
                has_bit_indices.push(Some(has_bit_count));
                has_bit_count += 1;
            } else {
                has_bit_indices.push(None);
            }
            split_fields.push(
                options.enforce_mode == EnforceMode::CodeSize
                    && field.is_repeated()
                    && field.real_containing_oneof().is_none(),
            );
            let check = field.cpp_type() == CppType::Message
                && !field.is_map()
                && field
                    .message_type()
                    .is_some_and(|target| analyzer.get_scc(target).props.contains_required);
            needs_init_check.push(check);
        }

        let generators = message
            .fields()
            .enumerate()
            .map(|(i, field)| {
                let gen_options = FieldGenOptions {
                    classname: classname.clone(),
                    has_bit_index: has_bit_indices[i],
                    enum_is_closed: field.enum_type().is_some_and(|e| e.is_closed()),
                    split: split_fields[i],
                    options,
                };
                make_field_generator(field, &infos[i], &gen_options)
            })
            .collect();

        MessageGenerator {
            message,
            options,
            classname,
            infos,
            generators,
            has_bit_indices,
            has_bit_count,
            split_fields,
            needs_init_check,
        }
    }

    pub fn descriptor(&self) -> Descriptor<'a> {
        self.message
    }

    pub fn classname(&self) -> &str {
        &self.classname
    }

    fn has_words(&self) -> usize {
        self.has_bit_count.div_ceil(32)
    }

    fn has_split(&self) -> bool {
        self.split_fields.iter().any(|&s| s)
    }

    fn real_oneofs(&self) -> Vec<OneofDescriptor<'a>> {
        self.message.real_oneofs().collect()
    }

    fn class_vars(&self) -> Vec<(&str, String)> {
        vec![
            ("classname", self.classname.clone()),
            ("full_name", self.message.full_name().to_string()),
            ("superclass", helpers::superclass_name(self.options).to_string()),
            ("dllexport", self.options.dllexport_decl.clone()),
            (
                "default_instance",
                names::default_instance_name(self.message),
            ),
        ]
    }

    fn with_class_vars<F: FnOnce(&mut Printer)>(&self, p: &mut Printer, body: F) {
        let vars = self.class_vars();
        let view: Vec<(&str, &str)> = vars.iter().map(|(k, v)| (*k, v.as_str())).collect();
        p.with_vars(&view, body);
    }

    /// Header-side class definition.
    pub fn generate_class_definition(&self, p: &mut Printer) {
        if self.message.is_map_entry() {
            self.generate_map_entry_class(p);
            return;
        }
        self.with_class_vars(p, |p| {
            p.print("class$ dllexport$ $classname$ final : public $superclass$ {\n");
            if self.options.annotate_code {
                p.annotate(
                    "classname",
                    self.message.file().name(),
                    self.message.path(),
                    Semantic::None,
                );
            }
            p.print(" public:\n");
            p.indent();
            p.print(
                "$classname$();\n\
                 ~$classname$() override;\n\
                 $classname$(const $classname$& from);\n\
                 $classname$& operator=(const $classname$& from);\n\
                 \n\
                 static const $classname$& default_instance();\n\
                 \n\
                 void Clear() final;\n\
                 bool IsInitialized() const final;\n\
                 ::size_t ByteSizeLong() const final;\n\
                 const char* _InternalParse(const char* ptr, ::google::protobuf::internal::ParseContext* ctx) final;\n\
                 ::uint8_t* _InternalSerialize(::uint8_t* target, ::google::protobuf::io::EpsCopyOutputStream* stream) const final;\n\
                 void MergeFrom(const $classname$& from);\n\
                 void CopyFrom(const $classname$& from);\n\
                 bool operator==(const $classname$& other) const;\n\
                 ::uint64_t HashCode() const;\n\
                 \n\
                 static constexpr const char* kFullName = \"$full_name$\";\n",
            );

            for oneof in self.real_oneofs() {
                self.generate_oneof_case_enum(p, oneof);
            }

            p.print("\n// accessors\n");
            for (i, generator) in self.generators.iter().enumerate() {
                let field = generator.field();
                p.print_with(
                    &[
                        ("field_name", field.name()),
                        ("field_number", &field.number().to_string()),
                    ],
                    "\n// $field_name$ = $field_number$\n",
                );
                if let Some(reason) = &self.infos[i].disambiguated_reason {
                    p.print_with(&[("reason", reason)], "// renamed: $reason$\n");
                }
                generator.generate_interface(p);
            }

            for oneof in self.real_oneofs() {
                p.print_with(
                    &[
                        ("camel", &oneof_case_enum_name(oneof)),
                        ("oneof_name", &names::oneof_name(oneof)),
                    ],
                    "\n$camel$ $oneof_name$_case() const;\n\
                     void clear_$oneof_name$();\n",
                );
            }

            p.outdent();
            p.print("\n private:\n");
            p.indent();
            p.print("void SharedCtor();\nvoid SharedDtor();\n");
            for oneof in self.real_oneofs() {
                for field in oneof.fields() {
                    p.print_with(
                        &[("name", &names::field_name(field))],
                        "void set_has_$name$();\n",
                    );
                }
            }
            self.generate_impl_struct(p);
            p.print(
                "Impl_ _impl_;\n\
                 ::google::protobuf::internal::InternalMetadata _internal_metadata_;\n",
            );
            p.outdent();
            p.print("};\n");
        });
    }

    fn generate_oneof_case_enum(&self, p: &mut Printer, oneof: OneofDescriptor<'a>) {
        p.print_with(
            &[("camel", &oneof_case_enum_name(oneof))],
            "\nenum $camel$ {\n",
        );
        p.indent();
        for field in oneof.fields() {
            p.print_with(
                &[
                    ("case", &names::oneof_case_constant(field)),
                    ("number", &field.number().to_string()),
                ],
                "$case$ = $number$,\n",
            );
        }
        p.print_with(
            &[("not_set", &oneof_not_set_constant(oneof))],
            "$not_set$ = 0,\n",
        );
        p.outdent();
        p.print("};\n");
    }

    /// All field storage, presence bits and bookkeeping live in one named
    /// aggregate so the cold section can be swapped out as a unit.
    fn generate_impl_struct(&self, p: &mut Printer) {
        p.print("struct Impl_ {\n");
        p.indent();
        if self.has_bit_count > 0 {
            p.print_with(
                &[("words", &self.has_words().to_string())],
                "::uint32_t _has_bits_[$words$] = {};\n",
            );
        }
        p.print("mutable ::google::protobuf::internal::CachedSize _cached_size_;\n");
        if self.message.is_extendable() {
            p.print("::google::protobuf::internal::ExtensionSet _extensions_;\n");
        }
        for (i, generator) in self.generators.iter().enumerate() {
            if !self.split_fields[i] {
                generator.generate_members(p);
            }
        }
        for oneof in self.real_oneofs() {
            p.print_with(
                &[("camel", &oneof_case_enum_name(oneof))],
                "union $camel$Union {\n",
            );
            p.indent();
            p.print_with(
                &[("camel", &oneof_case_enum_name(oneof))],
                "constexpr $camel$Union() : dummy_(0) {}\nint dummy_;\n",
            );
            for field in oneof.fields() {
                p.print_with(
                    &[
                        ("storage", &oneof_storage_type(field)),
                        ("member", &names::field_member_name(field)),
                    ],
                    "$storage$ $member$;\n",
                );
            }
            p.outdent();
            p.print_with(
                &[("oneof_name", &names::oneof_name(oneof))],
                "} $oneof_name$_;\n",
            );
        }
        let oneofs = self.real_oneofs();
        if !oneofs.is_empty() {
            p.print_with(
                &[("count", &oneofs.len().to_string())],
                "::uint32_t _oneof_case_[$count$] = {};\n",
            );
        }
        if self.has_split() {
            p.print("struct Split {\n");
            p.indent();
            for (i, generator) in self.generators.iter().enumerate() {
                if self.split_fields[i] {
                    generator.generate_members(p);
                }
            }
            p.outdent();
            p.print("};\nSplit* _split_ = nullptr;\n");
        }
        p.outdent();
        p.print("};\n");
    }

    fn generate_map_entry_class(&self, p: &mut Printer) {
        let key = self.message.map_key();
        let value = self.message.map_value();
        self.with_class_vars(p, |p| {
            p.with_vars(
                &[
                    ("key_type", &helpers::primitive_type_name(key)),
                    ("value_type", &helpers::primitive_type_name(value)),
                ],
                |p| {
                    p.print(
                        "// Synthetic map entry; not part of the public API.\n\
                         class $classname$ final {\n\
                         \x20public:\n\
                         \x20 const $key_type$& key() const { return key_; }\n\
                         \x20 const $value_type$& value() const { return value_; }\n\
                         \x20 struct Funcs {\n\
                         \x20   static ::uint8_t* SerializeToArray(int number, const $key_type$& key, const $value_type$& value, ::uint8_t* target);\n\
                         \x20   static ::size_t ByteSizeLong(const $key_type$& key, const $value_type$& value);\n\
                         \x20 };\n\
                         \x20private:\n\
                         \x20 $key_type$ key_{};\n\
                         \x20 $value_type$ value_{};\n\
                         };\n",
                    );
                },
            );
        });
    }

    /// Header-side inline accessor definitions.
    pub fn generate_inline_methods(&self, p: &mut Printer) {
        if self.message.is_map_entry() {
            return;
        }
        self.with_class_vars(p, |p| {
            for oneof in self.real_oneofs() {
                p.print_with(
                    &[
                        ("camel", &oneof_case_enum_name(oneof)),
                        ("oneof_name", &names::oneof_name(oneof)),
                        ("index", &oneof.index().to_string()),
                    ],
                    "inline $classname$::$camel$ $classname$::$oneof_name$_case() const {\n\
                     \x20 return static_cast<$classname$::$camel$>(_impl_._oneof_case_[$index$]);\n\
                     }\n",
                );
                for field in oneof.fields() {
                    p.print_with(
                        &[
                            ("name", &names::field_name(field)),
                            ("case", &names::oneof_case_constant(field)),
                            ("index", &oneof.index().to_string()),
                        ],
                        "inline void $classname$::set_has_$name$() {\n\
                         \x20 _impl_._oneof_case_[$index$] = $case$;\n\
                         }\n",
                    );
                }
            }
            for generator in &self.generators {
                generator.generate_builder_members(p);
            }
        });
    }

    /// Source-side method bodies.
    pub fn generate_methods(&self, p: &mut Printer) {
        if self.message.is_map_entry() {
            self.generate_map_entry_methods(p);
            return;
        }
        self.with_class_vars(p, |p| {
            self.generate_structors(p);
            self.generate_clear(p);
            self.generate_merge(p);
            self.generate_copy(p);
            self.generate_parse(p);
            self.generate_serialize(p);
            self.generate_byte_size(p);
            self.generate_is_initialized(p);
            self.generate_equals_and_hash(p);
            self.generate_oneof_clear(p);
        });
    }

    fn generate_structors(&self, p: &mut Printer) {
        p.print(
            "$classname$::$classname$() {\n\
             \x20 SharedCtor();\n\
             }\n\
             $classname$::$classname$(const $classname$& from) : $classname$() {\n",
        );
        p.indent();
        if self.has_bit_count > 0 {
            p.print_with(
                &[("words", &self.has_words().to_string())],
                "::memcpy(_impl_._has_bits_, from._impl_._has_bits_, sizeof(::uint32_t) * $words$);\n",
            );
        }
        for generator in &self.generators {
            if generator.field().real_containing_oneof().is_none() {
                generator.generate_building_code(p);
            }
        }
        for oneof in self.real_oneofs() {
            p.print_with(
                &[
                    ("oneof_name", &names::oneof_name(oneof)),
                    ("index", &oneof.index().to_string()),
                ],
                "_impl_._oneof_case_[$index$] = from._impl_._oneof_case_[$index$];\n\
                 switch (from.$oneof_name$_case()) {\n",
            );
            p.indent();
            for field in oneof.fields() {
                p.print_with(
                    &[("case", &names::oneof_case_constant(field))],
                    "case $case$: {\n",
                );
                p.indent();
                self.generator_for(field).generate_building_code(p);
                p.print("break;\n");
                p.outdent();
                p.print("}\n");
            }
            p.print_with(
                &[("not_set", &oneof_not_set_constant(oneof))],
                "case $not_set$: {\n\
                 \x20 break;\n\
                 }\n",
            );
            p.outdent();
            p.print("}\n");
        }
        if self.message.is_extendable() {
            p.print("_impl_._extensions_.MergeFrom(from._impl_._extensions_);\n");
        }
        p.print("_internal_metadata_.MergeFrom(from._internal_metadata_);\n");
        p.outdent();
        p.print(
            "}\n\
             $classname$& $classname$::operator=(const $classname$& from) {\n\
             \x20 CopyFrom(from);\n\
             \x20 return *this;\n\
             }\n\
             $classname$::~$classname$() {\n\
             \x20 SharedDtor();\n\
             }\n\
             void $classname$::SharedCtor() {\n",
        );
        p.indent();
        if self.has_split() {
            p.print("_impl_._split_ = new Impl_::Split();\n");
        }
        for generator in &self.generators {
            generator.generate_initialization_code(p);
        }
        p.outdent();
        p.print(
            "}\n\
             void $classname$::SharedDtor() {\n",
        );
        p.indent();
        for generator in &self.generators {
            let field = generator.field();
            // Owned singular message pointers are the only storage freed by
            // hand; containers and the split block clean up below.
            if field.cpp_type() == CppType::Message
                && !field.is_repeated()
                && field.real_containing_oneof().is_none()
            {
                p.print_with(
                    &[("member", &names::field_member_name(field))],
                    "delete _impl_.$member$;\n",
                );
            }
        }
        for oneof in self.real_oneofs() {
            p.print_with(
                &[("oneof_name", &names::oneof_name(oneof))],
                "clear_$oneof_name$();\n",
            );
        }
        if self.has_split() {
            p.print("delete _impl_._split_;\n");
        }
        p.outdent();
        p.print("}\n");
    }

    fn generate_clear(&self, p: &mut Printer) {
        p.print("void $classname$::Clear() {\n");
        p.indent();
        for generator in &self.generators {
            if generator.field().real_containing_oneof().is_none() {
                generator.generate_builder_clear_code(p);
            }
        }
        for oneof in self.real_oneofs() {
            p.print_with(
                &[("oneof_name", &names::oneof_name(oneof))],
                "clear_$oneof_name$();\n",
            );
        }
        if self.has_bit_count > 0 {
            p.print_with(
                &[("words", &self.has_words().to_string())],
                "::memset(_impl_._has_bits_, 0, sizeof(::uint32_t) * $words$);\n",
            );
        }
        if self.message.is_extendable() {
            p.print("_impl_._extensions_.Clear();\n");
        }
        p.print("_internal_metadata_.Clear();\n");
        p.outdent();
        p.print("}\n");
    }

    fn generate_merge(&self, p: &mut Printer) {
        p.print("void $classname$::MergeFrom(const $classname$& from) {\n");
        p.indent();
        for generator in &self.generators {
            if generator.field().real_containing_oneof().is_none() {
                generator.generate_merging_code(p);
            }
        }
        for oneof in self.real_oneofs() {
            p.print_with(
                &[("oneof_name", &names::oneof_name(oneof))],
                "switch (from.$oneof_name$_case()) {\n",
            );
            p.indent();
            for field in oneof.fields() {
                p.print_with(
                    &[("case", &names::oneof_case_constant(field))],
                    "case $case$: {\n",
                );
                p.indent();
                self.generator_for(field).generate_merging_code(p);
                p.print("break;\n");
                p.outdent();
                p.print("}\n");
            }
            p.print_with(
                &[("not_set", &oneof_not_set_constant(oneof))],
                "case $not_set$: {\n\
                 \x20 break;\n\
                 }\n",
            );
            p.outdent();
            p.print("}\n");
        }
        if self.message.is_extendable() {
            p.print("_impl_._extensions_.MergeFrom(from._impl_._extensions_);\n");
        }
        p.print("_internal_metadata_.MergeFrom(from._internal_metadata_);\n");
        p.outdent();
        p.print("}\n");
    }

    fn generate_copy(&self, p: &mut Printer) {
        p.print(
            "void $classname$::CopyFrom(const $classname$& from) {\n\
             \x20 if (&from == this) return;\n\
             \x20 Clear();\n\
             \x20 MergeFrom(from);\n\
             }\n",
        );
    }

    /// Expected wire type of the field's primary (non-packed) encoding.
    fn expected_wire(field: FieldDescriptor<'_>) -> u32 {
        field.tag() & 7
    }

    fn generator_for(&self, field: FieldDescriptor<'a>) -> &FieldGenerator<'a> {
        self.generators
            .iter()
            .find(|g| g.field() == field)
            .expect("field belongs to this message")
    }

    fn generate_parse(&self, p: &mut Printer) {
        p.print(
            "const char* $classname$::_InternalParse(const char* ptr, ::google::protobuf::internal::ParseContext* ctx) {\n",
        );
        p.indent();
        p.print(
            "while (!ctx->Done(&ptr)) {\n\
             \x20 ::uint32_t tag;\n\
             \x20 ptr = ::google::protobuf::internal::ReadTag(ptr, &tag);\n\
             \x20 switch (tag >> 3) {\n",
        );
        p.indent();
        p.indent();
        for generator in &self.generators {
            let field = generator.field();
            p.print_with(
                &[("number", &field.number().to_string())],
                "case $number$: {\n",
            );
            p.indent();
            if field.is_packable() {
                // The parsing hook accepts both wire shapes itself.
                generator.generate_builder_parsing_code(p);
            } else {
                p.print_with(
                    &[("wire", &Self::expected_wire(field).to_string())],
                    "if ((tag & 7) != $wire$) goto handle_unusual;\n",
                );
                generator.generate_builder_parsing_code(p);
            }
            p.print("break;\n");
            p.outdent();
            p.print("}\n");
        }
        p.print("default: {\n\x20 goto handle_unusual;\n}\n");
        p.outdent();
        p.outdent();
        p.print(
            "\x20 }\n\
             \x20 continue;\n\
             handle_unusual:\n\
             \x20 if (tag == 0 || (tag & 7) == 4) {\n\
             \x20   ctx->SetLastTag(tag);\n\
             \x20   break;\n\
             \x20 }\n",
        );
        if self.message.is_extendable() {
            p.print(
                "\x20 if (_impl_._extensions_.MaybeParseExtension(tag, ptr, ctx)) {\n\
                 \x20   continue;\n\
                 \x20 }\n",
            );
        }
        p.print(
            "\x20 ptr = ::google::protobuf::internal::UnknownFieldParse(tag, _internal_metadata_.mutable_unknown_fields(), ptr, ctx);\n\
             }\n\
             return ptr;\n",
        );
        p.outdent();
        p.print("}\n");
    }

    /// Fields ascending by number interleaved with extension ranges
    /// ascending by start, two pointers.
    fn generate_serialize(&self, p: &mut Printer) {
        p.print(
            "::uint8_t* $classname$::_InternalSerialize(::uint8_t* target, ::google::protobuf::io::EpsCopyOutputStream* stream) const {\n",
        );
        p.indent();
        let fields = helpers::fields_by_number(self.message);
        let ranges = self.sorted_extension_ranges();
        let mut fi = 0;
        let mut ri = 0;
        while fi < fields.len() || ri < ranges.len() {
            let emit_field = match (fields.get(fi), ranges.get(ri)) {
                (Some(field), Some(&(start, _))) => field.number() < start,
                (Some(_), None) => true,
                _ => false,
            };
            if emit_field {
                self.generator_for(fields[fi]).generate_serialization_code(p);
                fi += 1;
            } else {
                let (start, end) = ranges[ri];
                p.print_with(
                    &[("start", &start.to_string()), ("end", &end.to_string())],
                    "target = _impl_._extensions_.InternalSerialize($start$, $end$, target, stream);\n",
                );
                ri += 1;
            }
        }
        p.print(
            "if (!_internal_metadata_.unknown_fields().empty()) {\n\
             \x20 target = ::google::protobuf::internal::WireFormat::SerializeUnknownFieldsToArray(_internal_metadata_.unknown_fields(), target);\n\
             }\n\
             return target;\n",
        );
        p.outdent();
        p.print("}\n");
    }

    fn sorted_extension_ranges(&self) -> Vec<(i32, i32)> {
        self.message
            .extension_ranges()
            .iter()
            .map(|r| (r.start, r.end))
            .sorted()
            .collect()
    }

    fn generate_byte_size(&self, p: &mut Printer) {
        p.print("::size_t $classname$::ByteSizeLong() const {\n");
        p.indent();
        p.print("::size_t total_size = 0;\n");
        // Mirrors the serialization order so the two agree byte for byte.
        let fields = helpers::fields_by_number(self.message);
        let ranges = self.sorted_extension_ranges();
        let mut fi = 0;
        let mut ri = 0;
        while fi < fields.len() || ri < ranges.len() {
            let emit_field = match (fields.get(fi), ranges.get(ri)) {
                (Some(field), Some(&(start, _))) => field.number() < start,
                (Some(_), None) => true,
                _ => false,
            };
            if emit_field {
                self.generator_for(fields[fi])
                    .generate_serialized_size_code(p);
                fi += 1;
            } else {
                let (start, end) = ranges[ri];
                p.print_with(
                    &[("start", &start.to_string()), ("end", &end.to_string())],
                    "total_size += _impl_._extensions_.ByteSize($start$, $end$);\n",
                );
                ri += 1;
            }
        }
        p.print(
            "if (!_internal_metadata_.unknown_fields().empty()) {\n\
             \x20 total_size += ::google::protobuf::internal::WireFormat::ComputeUnknownFieldsSize(_internal_metadata_.unknown_fields());\n\
             }\n\
             _impl_._cached_size_.Set(::google::protobuf::internal::ToCachedSize(total_size));\n\
             return total_size;\n",
        );
        p.outdent();
        p.print("}\n");
    }

    fn generate_is_initialized(&self, p: &mut Printer) {
        p.print("bool $classname$::IsInitialized() const {\n");
        p.indent();
        for field in self.message.fields() {
            if field.is_required() {
                p.print_with(
                    &[("name", &names::field_name(field))],
                    "if (!has_$name$()) return false;\n",
                );
            }
        }
        for (i, generator) in self.generators.iter().enumerate() {
            if !self.needs_init_check[i] {
                continue;
            }
            let field = generator.field();
            let name = names::field_name(field);
            if field.is_repeated() {
                p.print_with(
                    &[("name", &name)],
                    "for (const auto& value : $name$()) {\n\
                     \x20 if (!value.IsInitialized()) return false;\n\
                     }\n",
                );
            } else {
                p.print_with(
                    &[("name", &name)],
                    "if (has_$name$() && !$name$().IsInitialized()) return false;\n",
                );
            }
        }
        if self.message.is_extendable() {
            p.print("if (!_impl_._extensions_.IsInitialized()) return false;\n");
        }
        p.print("return true;\n");
        p.outdent();
        p.print("}\n");
    }

    fn generate_equals_and_hash(&self, p: &mut Printer) {
        p.print("bool $classname$::operator==(const $classname$& other) const {\n");
        p.indent();
        for generator in &self.generators {
            if generator.field().real_containing_oneof().is_none() {
                generator.generate_equals_code(p);
            }
        }
        for oneof in self.real_oneofs() {
            p.print_with(
                &[("oneof_name", &names::oneof_name(oneof))],
                "if ($oneof_name$_case() != other.$oneof_name$_case()) return false;\n\
                 switch ($oneof_name$_case()) {\n",
            );
            p.indent();
            for field in oneof.fields() {
                p.print_with(
                    &[("case", &names::oneof_case_constant(field))],
                    "case $case$: {\n",
                );
                p.indent();
                self.generator_for(field).generate_equals_code(p);
                p.print("break;\n");
                p.outdent();
                p.print("}\n");
            }
            p.print_with(
                &[("not_set", &oneof_not_set_constant(oneof))],
                "case $not_set$: {\n\
                 \x20 break;\n\
                 }\n",
            );
            p.outdent();
            p.print("}\n");
        }
        p.print("return true;\n");
        p.outdent();
        p.print(
            "}\n\
             ::uint64_t $classname$::HashCode() const {\n",
        );
        p.indent();
        p.print("::uint64_t seed = 0;\n");
        for generator in &self.generators {
            if generator.field().real_containing_oneof().is_none() {
                generator.generate_hash_code(p);
            }
        }
        for oneof in self.real_oneofs() {
            p.print_with(
                &[("oneof_name", &names::oneof_name(oneof))],
                "switch ($oneof_name$_case()) {\n",
            );
            p.indent();
            for field in oneof.fields() {
                p.print_with(
                    &[("case", &names::oneof_case_constant(field))],
                    "case $case$: {\n",
                );
                p.indent();
                self.generator_for(field).generate_hash_code(p);
                p.print("break;\n");
                p.outdent();
                p.print("}\n");
            }
            p.print_with(
                &[("not_set", &oneof_not_set_constant(oneof))],
                "case $not_set$: {\n\
                 \x20 break;\n\
                 }\n",
            );
            p.outdent();
            p.print("}\n");
        }
        p.print("return seed;\n");
        p.outdent();
        p.print("}\n");
    }

    fn generate_oneof_clear(&self, p: &mut Printer) {
        for oneof in self.real_oneofs() {
            p.print_with(
                &[("oneof_name", &names::oneof_name(oneof))],
                "void $classname$::clear_$oneof_name$() {\n\
                 \x20 switch ($oneof_name$_case()) {\n",
            );
            p.indent();
            p.indent();
            for field in oneof.fields() {
                p.print_with(
                    &[("case", &names::oneof_case_constant(field))],
                    "case $case$: {\n",
                );
                p.indent();
                self.generator_for(field).generate_builder_clear_code(p);
                p.print("break;\n");
                p.outdent();
                p.print("}\n");
            }
            p.print_with(
                &[("not_set", &oneof_not_set_constant(oneof))],
                "case $not_set$: {\n\
                 \x20 break;\n\
                 }\n",
            );
            p.outdent();
            p.print_with(
                &[
                    ("index", &oneof.index().to_string()),
                    ("not_set", &oneof_not_set_constant(oneof)),
                ],
                "}\n\
                 _impl_._oneof_case_[$index$] = $not_set$;\n",
            );
            p.outdent();
            p.print("}\n");
        }
    }

    fn generate_map_entry_methods(&self, p: &mut Printer) {
        let key = self.message.map_key();
        let value = self.message.map_value();
        self.with_class_vars(p, |p| {
            p.with_vars(
                &[
                    ("key_type", &helpers::primitive_type_name(key)),
                    ("value_type", &helpers::primitive_type_name(value)),
                ],
                |p| {
                    p.print(
                        "::uint8_t* $classname$::Funcs::SerializeToArray(int number, const $key_type$& key, const $value_type$& value, ::uint8_t* target) {\n\
                         \x20 target = ::google::protobuf::internal::WireFormatLite::WriteMapEntryToArray(number, key, value, target);\n\
                         \x20 return target;\n\
                         }\n\
                         ::size_t $classname$::Funcs::ByteSizeLong(const $key_type$& key, const $value_type$& value) {\n\
                         \x20 return ::google::protobuf::internal::WireFormatLite::MapEntrySize(key, value);\n\
                         }\n",
                    );
                },
            );
        });
    }

    /// Reflection offset entries: has-bits word, extension set, oneof case
    /// array, then one entry per field and per oneof. Returns the entry
    /// count so the schema table can track its running base.
    pub fn generate_offsets(&self, p: &mut Printer) -> usize {
        self.with_class_vars(p, |p| {
            if self.has_bit_count > 0 {
                p.print("PROTOBUF_FIELD_OFFSET($classname$, _impl_._has_bits_),\n");
            } else {
                p.print("~0u,  // no _has_bits_\n");
            }
            if self.message.is_extendable() {
                p.print("PROTOBUF_FIELD_OFFSET($classname$, _impl_._extensions_),\n");
            } else {
                p.print("~0u,  // no _extensions_\n");
            }
            let oneofs = self.real_oneofs();
            if oneofs.is_empty() {
                p.print("~0u,  // no _oneof_case_\n");
            } else {
                p.print("PROTOBUF_FIELD_OFFSET($classname$, _impl_._oneof_case_),\n");
            }
            for (i, generator) in self.generators.iter().enumerate() {
                let field = generator.field();
                let member = names::field_member_name(field);
                if self.split_fields[i] {
                    // Split storage sits behind a pointer; not reachable by
                    // offsetof.
                    p.print_with(&[("member", &member)], "~0u,  // split $member$\n");
                } else if let Some(oneof) = field.real_containing_oneof() {
                    p.print_with(
                        &[
                            ("member", &member),
                            ("oneof_name", &names::oneof_name(oneof)),
                        ],
                        "PROTOBUF_FIELD_OFFSET($classname$, _impl_.$oneof_name$_.$member$),\n",
                    );
                } else {
                    p.print_with(
                        &[("member", &member)],
                        "PROTOBUF_FIELD_OFFSET($classname$, _impl_.$member$),\n",
                    );
                }
            }
            for oneof in oneofs {
                p.print_with(
                    &[("oneof_name", &names::oneof_name(oneof))],
                    "PROTOBUF_FIELD_OFFSET($classname$, _impl_.$oneof_name$_),\n",
                );
            }
        });
        3 + self.generators.len() + self.real_oneofs().len()
    }

    /// Default instance definition, emitted at file scope in the source.
    pub fn generate_default_instance(&self, p: &mut Printer) {
        self.with_class_vars(p, |p| {
            p.print(
                "struct $classname$DefaultTypeInternal {\n\
                 \x20 $classname$ _instance;\n\
                 };\n\
                 $classname$DefaultTypeInternal $default_instance$;\n\
                 const $classname$& $classname$::default_instance() {\n\
                 \x20 return $default_instance$._instance;\n\
                 }\n",
            );
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorPool;
    use crate::proto::*;

    fn pool() -> DescriptorPool {
        let file = FileDescriptorProto {
            name: "msg.proto".to_string(),
            package: "m".to_string(),
            syntax: "proto2".to_string(),
            message_type: vec![DescriptorProto {
                name: "Widget".to_string(),
                oneof_decl: vec![OneofDescriptorProto {
                    name: "kind".to_string(),
                }],
                field: vec![
                    FieldDescriptorProto {
                        name: "id".to_string(),
                        number: 1,
                        label: Label::Optional,
                        r#type: Type::Int32,
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "label".to_string(),
                        number: 3,
                        label: Label::Optional,
                        r#type: Type::String,
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "width".to_string(),
                        number: 2,
                        label: Label::Optional,
                        r#type: Type::Int32,
                        oneof_index: Some(0),
                        ..Default::default()
                    },
                ],
                extension_range: vec![ExtensionRange { start: 10, end: 20 }],
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut pool = DescriptorPool::new();
        pool.add_file(&file).unwrap();
        pool
    }

    fn generate(pool: &DescriptorPool) -> (String, String, String) {
        let message = pool.message_by_name("m.Widget").unwrap();
        let options = Options::default();
        let mut analyzer = SccAnalyzer::new();
        let generator =
            MessageGenerator::new(message, &options, &HashSet::new(), &mut analyzer);
        let mut header = Printer::new();
        generator.generate_class_definition(&mut header);
        let mut inlines = Printer::new();
        generator.generate_inline_methods(&mut inlines);
        let mut source = Printer::new();
        generator.generate_methods(&mut source);
        (
            header.into_parts().0,
            inlines.into_parts().0,
            source.into_parts().0,
        )
    }

    #[test]
    fn class_definition_contains_skeleton() {
        let pool = pool();
        let (header, inlines, source) = generate(&pool);
        assert!(header.contains("class Widget final"));
        assert!(header.contains("enum KindCase {"));
        assert!(header.contains("kWidth = 2,"));
        assert!(header.contains("KIND_NOT_SET = 0,"));
        assert!(header.contains("struct Impl_ {"));
        assert!(header.contains("::uint32_t _has_bits_[1]"));
        assert!(header.contains("_extensions_"), "extendable message");
        assert!(inlines.contains("inline ::int32_t Widget::id() const"));
        assert!(source.contains("void Widget::Clear()"));
        assert!(source.contains("const char* Widget::_InternalParse"));
    }

    #[test]
    fn serialization_interleaves_extension_ranges_by_number() {
        let pool = pool();
        let (_, _, source) = generate(&pool);
        // Fields 1, 2, 3 come before the [10, 20) extension range.
        let field1 = source.find("WriteInt32ToArray(1,").unwrap();
        let range = source.find("InternalSerialize(10, 20,").unwrap();
        assert!(field1 < range);
        let field3 = source.find("WriteStringToArray(3,").unwrap();
        assert!(field3 < range);
    }

    #[test]
    fn split_storage_under_code_size_mode() {
        let file = FileDescriptorProto {
            name: "split.proto".to_string(),
            package: "s".to_string(),
            syntax: "proto3".to_string(),
            message_type: vec![DescriptorProto {
                name: "Big".to_string(),
                field: vec![
                    FieldDescriptorProto {
                        name: "hot".to_string(),
                        number: 1,
                        r#type: Type::Int32,
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "cold".to_string(),
                        number: 2,
                        label: Label::Repeated,
                        r#type: Type::Int64,
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut pool = DescriptorPool::new();
        pool.add_file(&file).unwrap();
        let message = pool.message_by_name("s.Big").unwrap();
        let options = Options {
            enforce_mode: EnforceMode::CodeSize,
            ..Default::default()
        };
        let mut analyzer = SccAnalyzer::new();
        let generator =
            MessageGenerator::new(message, &options, &HashSet::new(), &mut analyzer);
        let mut header = Printer::new();
        generator.generate_class_definition(&mut header);
        let text = header.into_parts().0;
        assert!(text.contains("struct Split {"));
        assert!(text.contains("Split* _split_ = nullptr;"));

        let mut inlines = Printer::new();
        generator.generate_inline_methods(&mut inlines);
        let inline_text = inlines.into_parts().0;
        assert!(inline_text.contains("_impl_._split_->cold_"));
    }
}
