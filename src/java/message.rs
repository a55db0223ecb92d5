//! Java message generation: the message class and its `Builder` mirror.
//!
//! Each message becomes a nested static class inside the file's outer class:
//! an `...OrBuilder` interface, the immutable class with hand-written
//! `writeTo`/`getSerializedSize`/`equals`/`hashCode`, and a `Builder` whose
//! `mergeFrom(CodedInputStream, ...)` carries the tag-switch parse loop.
//! Serialization interleaves fields and extension ranges in ascending
//! number order, exactly as the C++ back-end does.

use itertools::Itertools;

use crate::descriptor::{CppType, Descriptor, Edition, FieldDescriptor, OneofDescriptor};
use crate::error::Result;
use crate::options::Options;
use crate::printer::Printer;
use crate::scc::SccAnalyzer;

use super::field::{
    build_field_infos, FieldGenOptions, FieldGenerator, FieldGeneratorInfo,
};
use super::names::{self, Config};

pub struct MessageGenerator<'a> {
    message: Descriptor<'a>,
    options: &'a Options,
    classname: String,
    qualified_outer: String,
    ident: String,
    infos: Vec<FieldGeneratorInfo>,
    generators: Vec<FieldGenerator<'a>>,
    message_bit_count: usize,
    builder_bit_count: usize,
    /// Parallel to fields: message-typed fields whose reachable graph holds
    /// a required field, so isInitialized must recurse.
    needs_init_check: Vec<bool>,
}

impl<'a> MessageGenerator<'a> {
    pub fn new(
        message: Descriptor<'a>,
        options: &'a Options,
        config: &Config,
        analyzer: &mut SccAnalyzer<'a>,
    ) -> Result<MessageGenerator<'a>> {
        let classname = names::resolve_keyword(message.name());
        let package = names::java_package(message.file());
        let outer = names::file_class_name(message.file())?;
        let qualified_outer = if package.is_empty() {
            outer
        } else {
            format!("{package}.{outer}")
        };
        let ident = message.full_name().replace('.', "_");
        let infos = build_field_infos(message, &config.forbidden_field_names);
        let check_utf8 = message.file().edition() == Edition::Proto3;

        let mut message_bit_count = 0usize;
        let mut builder_bit_count = 0usize;
        let mut needs_init_check = Vec::with_capacity(message.field_count());
        let mut generators = Vec::with_capacity(message.field_count());
        for (i, field) in message.fields().enumerate() {
            let tracked = !field.is_repeated()
                && field.has_presence()
                && field.real_containing_oneof().is_none()
                && field.cpp_type() != CppType::Message;
            let message_bit_index = if tracked {
                let index = message_bit_count;
                message_bit_count += 1;
                Some(index)
            } else {
                None
            };
            let builder_bit_index = if field.real_containing_oneof().is_none() {
                let index = builder_bit_count;
                builder_bit_count += 1;
                Some(index)
            } else {
                None
            };
            needs_init_check.push(
                field.cpp_type() == CppType::Message
                    && field
                        .message_type()
                        .is_some_and(|target| analyzer.get_scc(target).props.contains_required),
            );
            let map_entry_descriptor = if field.is_map() {
                let entry = field.message_type().expect("map field");
                Some(format!(
                    "{qualified_outer}.internal_static_{}_descriptor",
                    entry.full_name().replace('.', "_")
                ))
            } else {
                None
            };
            let gen_options = FieldGenOptions {
                message_bit_index,
                builder_bit_index,
                enum_is_closed: field.enum_type().is_some_and(|e| e.is_closed()),
                check_utf8,
                map_entry_descriptor,
            };
            generators.push(FieldGenerator::new(field, &infos[i], &gen_options)?);
        }

        Ok(MessageGenerator {
            message,
            options,
            classname,
            qualified_outer,
            ident,
            infos,
            generators,
            message_bit_count,
            builder_bit_count,
            needs_init_check,
        })
    }

    fn is_extendable(&self) -> bool {
        self.message.is_extendable()
    }

    fn real_oneofs(&self) -> Vec<OneofDescriptor<'a>> {
        self.message.real_oneofs().collect()
    }

    fn map_fields(&self) -> Vec<(FieldDescriptor<'a>, &FieldGeneratorInfo)> {
        self.message
            .fields()
            .zip(&self.infos)
            .filter(|(f, _)| f.is_map())
            .collect()
    }

    fn fields_by_number(&self) -> Vec<usize> {
        (0..self.generators.len())
            .sorted_by_key(|&i| self.generators[i].field.number())
            .collect()
    }

    fn base_vars(&self) -> Vec<(String, String)> {
        vec![
            ("classname".to_string(), self.classname.clone()),
            ("outer".to_string(), self.qualified_outer.clone()),
            ("ident".to_string(), self.ident.clone()),
        ]
    }

    fn oneof_vars(oneof: OneofDescriptor<'_>) -> Vec<(String, String)> {
        let camel = names::underscores_to_camel_case(oneof.name(), true);
        let lower = names::underscores_to_camel_case(oneof.name(), false);
        vec![
            ("oneof_camel".to_string(), camel.clone()),
            ("oneof_case_type".to_string(), format!("{camel}Case")),
            ("oneof_member".to_string(), format!("{lower}_")),
            ("oneof_case_member".to_string(), format!("{lower}Case_")),
            (
                "oneof_not_set".to_string(),
                format!("{}_NOT_SET", oneof.name().to_ascii_uppercase()),
            ),
        ]
    }

    /// The interface both the class and its builder implement.
    pub fn generate_interface(&self, p: &mut Printer) {
        with_owned(p, &self.base_vars(), |p| {
            if self.is_extendable() {
                p.print(
                    "public interface $classname$OrBuilder extends\n\
                     \x20   com.google.protobuf.GeneratedMessageV3.\n\
                     \x20       ExtendableMessageOrBuilder<$classname$> {\n",
                );
            } else {
                p.print(
                    "public interface $classname$OrBuilder extends\n\
                     \x20   com.google.protobuf.MessageOrBuilder {\n",
                );
            }
            p.indent();
            for generator in &self.generators {
                generator.generate_interface(p);
            }
            for oneof in self.real_oneofs() {
                with_owned(p, &Self::oneof_vars(oneof), |p| {
                    p.print(
                        "$classname$.$oneof_case_type$ get$oneof_camel$Case();\n",
                    );
                });
            }
            p.outdent();
            p.print("}\n\n");
        });
    }

    pub fn generate(&self, p: &mut Printer, analyzer: &mut SccAnalyzer<'a>, config: &Config) -> Result<()> {
        self.generate_interface(p);
        let vars = self.base_vars();
        with_owned(p, &vars, |p| {
            if self.is_extendable() {
                p.print(
                    "public static final class $classname$ extends\n\
                     \x20   com.google.protobuf.GeneratedMessageV3.ExtendableMessage<\n\
                     \x20     $classname$> implements $classname$OrBuilder {\n",
                );
            } else {
                p.print(
                    "public static final class $classname$ extends\n\
                     \x20   com.google.protobuf.GeneratedMessageV3 implements\n\
                     \x20   $classname$OrBuilder {\n",
                );
            }
            p.indent();
            p.print("private static final long serialVersionUID = 0L;\n");
            p.print(
                "// Use $classname$.newBuilder() to construct.\n",
            );
            if self.is_extendable() {
                p.print(
                    "private $classname$(\n\
                     \x20   com.google.protobuf.GeneratedMessageV3.ExtendableBuilder<$classname$, ?> builder) {\n\
                     \x20 super(builder);\n\
                     }\n",
                );
            } else {
                p.print(
                    "private $classname$(com.google.protobuf.GeneratedMessageV3.Builder<?> builder) {\n\
                     \x20 super(builder);\n\
                     }\n",
                );
            }
            p.print("private $classname$() {\n");
            p.indent();
            for generator in &self.generators {
                generator.generate_initialization_code(p);
            }
            p.outdent();
            p.print(
                "}\n\n\
                 @java.lang.Override\n\
                 @SuppressWarnings({\"unused\"})\n\
                 protected java.lang.Object newInstance(UnusedPrivateParameter unused) {\n\
                 \x20 return new $classname$();\n\
                 }\n\n",
            );

            p.print(
                "public static final com.google.protobuf.Descriptors.Descriptor\n\
                 \x20   getDescriptor() {\n\
                 \x20 return $outer$.internal_static_$ident$_descriptor;\n\
                 }\n\n",
            );
            self.generate_map_field_reflection(p, false);
            p.print(
                "@java.lang.Override\n\
                 protected com.google.protobuf.GeneratedMessageV3.FieldAccessorTable\n\
                 \x20   internalGetFieldAccessorTable() {\n\
                 \x20 return $outer$.internal_static_$ident$_fieldAccessorTable\n\
                 \x20     .ensureFieldAccessorsInitialized(\n\
                 \x20         $classname$.class, $classname$.Builder.class);\n\
                 }\n\n",
            );
        });

        // Nested types, skipping synthetic map entries.
        for nested_enum in self.message.nested_enums() {
            super::enum_::EnumGenerator::new(nested_enum, self.options).generate(p)?;
            p.print("\n");
        }
        for nested in self.message.nested_types() {
            if nested.is_map_entry() {
                continue;
            }
            MessageGenerator::new(nested, self.options, config, analyzer)?
                .generate(p, analyzer, config)?;
        }

        for extension in self.message.extensions() {
            super::extension::ExtensionGenerator::new(extension, Some(self.message))
                .generate(p)?;
        }

        with_owned(p, &vars, |p| {
            if self.message_bit_words() > 0 {
                for word in 0..self.message_bit_words() {
                    p.print_with(
                        &[("word", &word.to_string())],
                        "private int bitField$word$_;\n",
                    );
                }
            }

            // Oneof case storage and enums.
            for oneof in self.real_oneofs() {
                self.generate_oneof_case_enum(p, oneof);
            }

            for generator in &self.generators {
                generator.generate_members(p);
            }
            p.print("\n");

            self.generate_is_initialized(p, false);
            self.generate_write_to(p);
            self.generate_serialized_size(p);
            self.generate_equals(p);
            self.generate_hash_code(p);
            self.generate_parse_helpers(p);
            self.generate_builder(p);
            self.generate_default_instance(p);
            p.outdent();
            p.print("}\n\n");
        });
        Ok(())
    }

    fn message_bit_words(&self) -> usize {
        self.message_bit_count.div_ceil(32)
    }

    fn builder_bit_words(&self) -> usize {
        // At least one word: buildPartial gates on it unconditionally.
        self.builder_bit_count.div_ceil(32).max(1)
    }

    fn generate_map_field_reflection(&self, p: &mut Printer, mutable: bool) {
        let maps = self.map_fields();
        if maps.is_empty() {
            return;
        }
        let method = if mutable {
            "internalGetMutableMapField"
        } else {
            "internalGetMapField"
        };
        p.print_with(
            &[("method", method)],
            "@SuppressWarnings({\"rawtypes\"})\n\
             @java.lang.Override\n\
             protected com.google.protobuf.MapField $method$(int number) {\n\
             \x20 switch (number) {\n",
        );
        for (field, info) in &maps {
            let prefix = if mutable {
                "internalGetMutable"
            } else {
                "internalGet"
            };
            p.print_with(
                &[
                    ("number", &field.number().to_string()),
                    ("accessor", &format!("{prefix}{}", info.capitalized_name)),
                ],
                "\x20   case $number$:\n\
                 \x20     return $accessor$();\n",
            );
        }
        p.print(
            "\x20   default:\n\
             \x20     throw new java.lang.RuntimeException(\n\
             \x20         \"Invalid map field number: \" + number);\n\
             \x20 }\n\
             }\n",
        );
    }

    fn generate_oneof_case_enum(&self, p: &mut Printer, oneof: OneofDescriptor<'a>) {
        with_owned(p, &Self::oneof_vars(oneof), |p| {
            p.print(
                "private int $oneof_case_member$ = 0;\n\
                 @SuppressWarnings(\"serial\")\n\
                 private java.lang.Object $oneof_member$;\n\
                 public enum $oneof_case_type$\n\
                 \x20   implements com.google.protobuf.Internal.EnumLite,\n\
                 \x20       com.google.protobuf.AbstractMessage.InternalOneOfEnum {\n",
            );
            for field in oneof.fields() {
                p.print_with(
                    &[
                        ("case_name", &field.name().to_ascii_uppercase()),
                        ("case_number", &field.number().to_string()),
                    ],
                    "\x20 $case_name$($case_number$),\n",
                );
            }
            p.print(
                "\x20 $oneof_not_set$(0);\n\
                 \x20 private final int value;\n\
                 \x20 private $oneof_case_type$(int value) {\n\
                 \x20   this.value = value;\n\
                 \x20 }\n\
                 \x20 public static $oneof_case_type$ forNumber(int value) {\n\
                 \x20   switch (value) {\n",
            );
            for field in oneof.fields() {
                p.print_with(
                    &[
                        ("case_name", &field.name().to_ascii_uppercase()),
                        ("case_number", &field.number().to_string()),
                    ],
                    "\x20     case $case_number$: return $case_name$;\n",
                );
            }
            p.print(
                "\x20     case 0: return $oneof_not_set$;\n\
                 \x20     default: return null;\n\
                 \x20   }\n\
                 \x20 }\n\
                 \x20 public int getNumber() {\n\
                 \x20   return this.value;\n\
                 \x20 }\n\
                 };\n\n\
                 public $oneof_case_type$ get$oneof_camel$Case() {\n\
                 \x20 return $oneof_case_type$.forNumber($oneof_case_member$);\n\
                 }\n\n",
            );
        });
    }

    fn generate_is_initialized(&self, p: &mut Printer, builder: bool) {
        if !builder {
            p.print("private byte memoizedIsInitialized = -1;\n");
        }
        p.print(
            "@java.lang.Override\n\
             public final boolean isInitialized() {\n",
        );
        p.indent();
        if !builder {
            p.print(
                "byte isInitialized = memoizedIsInitialized;\n\
                 if (isInitialized == 1) return true;\n\
                 if (isInitialized == 0) return false;\n\n",
            );
        }
        let fail = if builder {
            "return false;\n"
        } else {
            "memoizedIsInitialized = 0;\nreturn false;\n"
        };
        for (i, generator) in self.generators.iter().enumerate() {
            let field = generator.field;
            let cap = &self.infos[i].capitalized_name;
            if field.is_required() {
                p.print_with(
                    &[("cap", cap), ("fail", fail)],
                    "if (!has$cap$()) {\n\
                     \x20 $fail$}\n",
                );
            }
        }
        for (i, generator) in self.generators.iter().enumerate() {
            if !self.needs_init_check[i] {
                continue;
            }
            let field = generator.field;
            let cap = &self.infos[i].capitalized_name;
            if field.is_map() {
                let value = field.message_type().expect("map field").map_value();
                if value.cpp_type() != CppType::Message {
                    continue;
                }
                p.print_with(
                    &[("cap", cap), ("fail", fail)],
                    "for (com.google.protobuf.MessageLite item\n\
                     \x20    : get$cap$Map().values()) {\n\
                     \x20 if (!item.isInitialized()) {\n\
                     \x20   $fail$\x20}\n\
                     }\n",
                );
            } else if field.is_repeated() {
                p.print_with(
                    &[("cap", cap), ("fail", fail)],
                    "for (int i = 0; i < get$cap$Count(); i++) {\n\
                     \x20 if (!get$cap$(i).isInitialized()) {\n\
                     \x20   $fail$\x20}\n\
                     }\n",
                );
            } else {
                p.print_with(
                    &[("cap", cap), ("fail", fail)],
                    "if (has$cap$()) {\n\
                     \x20 if (!get$cap$().isInitialized()) {\n\
                     \x20   $fail$\x20}\n\
                     }\n",
                );
            }
        }
        if self.is_extendable() {
            p.print_with(
                &[("fail", fail)],
                "if (!extensionsAreInitialized()) {\n\
                 \x20 $fail$}\n",
            );
        }
        if !builder {
            p.print("memoizedIsInitialized = 1;\n");
        }
        p.print("return true;\n");
        p.outdent();
        p.print("}\n\n");
    }

    /// Fields and extension ranges merged in ascending number order, the
    /// same two-pointer walk the C++ back-end uses.
    fn generate_write_to(&self, p: &mut Printer) {
        p.print(
            "@java.lang.Override\n\
             public void writeTo(com.google.protobuf.CodedOutputStream output)\n\
             \x20                   throws java.io.IOException {\n",
        );
        p.indent();
        if self.generators.iter().any(|g| g.field.is_packed()) {
            p.print("getSerializedSize();\n");
        }
        if self.is_extendable() {
            p.print(
                "com.google.protobuf.GeneratedMessageV3\n\
                 \x20 .ExtendableMessage<$classname$>.ExtensionWriter\n\
                 \x20   extensionWriter = newExtensionWriter();\n",
            );
        }
        let ordered = self.fields_by_number();
        let ranges = self.message.extension_ranges();
        let mut fi = 0usize;
        let mut ri = 0usize;
        while fi < ordered.len() || ri < ranges.len() {
            let next_field = ordered
                .get(fi)
                .map(|&i| self.generators[i].field.number());
            let next_range = ranges.get(ri).map(|r| r.start);
            match (next_field, next_range) {
                (Some(f), Some(r)) if r < f => {
                    self.write_extension_range(p, ranges[ri].end);
                    ri += 1;
                }
                (Some(_), _) => {
                    self.generators[ordered[fi]].generate_serialization_code(p);
                    fi += 1;
                }
                (None, Some(_)) => {
                    self.write_extension_range(p, ranges[ri].end);
                    ri += 1;
                }
                (None, None) => unreachable!(),
            }
        }
        p.print("getUnknownFields().writeTo(output);\n");
        p.outdent();
        p.print("}\n\n");
    }

    fn write_extension_range(&self, p: &mut Printer, end: i32) {
        p.print_with(
            &[("range_end", &end.to_string())],
            "extensionWriter.writeUntil($range_end$, output);\n",
        );
    }

    fn generate_serialized_size(&self, p: &mut Printer) {
        p.print(
            "@java.lang.Override\n\
             public int getSerializedSize() {\n\
             \x20 int size = memoizedSize;\n\
             \x20 if (size != -1) return size;\n\n\
             \x20 size = 0;\n",
        );
        p.indent();
        for &i in &self.fields_by_number() {
            self.generators[i].generate_serialized_size_code(p);
        }
        if self.is_extendable() {
            p.print("size += extensionsSerializedSize();\n");
        }
        p.print(
            "size += getUnknownFields().getSerializedSize();\n\
             memoizedSize = size;\n\
             return size;\n",
        );
        p.outdent();
        p.print("}\n\n");
    }

    fn generate_equals(&self, p: &mut Printer) {
        p.print(
            "@java.lang.Override\n\
             public boolean equals(final java.lang.Object obj) {\n\
             \x20 if (obj == this) {\n\
             \x20   return true;\n\
             \x20 }\n\
             \x20 if (!(obj instanceof $classname$)) {\n\
             \x20   return super.equals(obj);\n\
             \x20 }\n\
             \x20 $classname$ other = ($classname$) obj;\n\n",
        );
        p.indent();
        for generator in &self.generators {
            if generator.field.real_containing_oneof().is_some() {
                continue;
            }
            generator.generate_equals_code(p);
        }
        for oneof in self.real_oneofs() {
            with_owned(p, &Self::oneof_vars(oneof), |p| {
                p.print(
                    "if (!get$oneof_camel$Case().equals(other.get$oneof_camel$Case())) return false;\n\
                     switch ($oneof_case_member$) {\n",
                );
            });
            for field in oneof.fields() {
                let index = field.index();
                p.print_with(
                    &[("case_number", &field.number().to_string())],
                    "\x20 case $case_number$:\n",
                );
                p.indent();
                self.generators[index].generate_equals_code(p);
                p.print("break;\n");
                p.outdent();
            }
            p.print(
                "\x20 case 0:\n\
                 \x20 default:\n\
                 }\n",
            );
        }
        if self.is_extendable() {
            p.print(
                "if (!getExtensionFields().equals(other.getExtensionFields()))\n\
                 \x20 return false;\n",
            );
        }
        p.print(
            "if (!getUnknownFields().equals(other.getUnknownFields())) return false;\n\
             return true;\n",
        );
        p.outdent();
        p.print("}\n\n");
    }

    fn generate_hash_code(&self, p: &mut Printer) {
        p.print(
            "@java.lang.Override\n\
             public int hashCode() {\n\
             \x20 if (memoizedHashCode != 0) {\n\
             \x20   return memoizedHashCode;\n\
             \x20 }\n\
             \x20 int hash = 41;\n\
             \x20 hash = (19 * hash) + getDescriptor().hashCode();\n",
        );
        p.indent();
        for generator in &self.generators {
            if generator.field.real_containing_oneof().is_some() {
                continue;
            }
            generator.generate_hash_code(p);
        }
        for oneof in self.real_oneofs() {
            with_owned(p, &Self::oneof_vars(oneof), |p| {
                p.print("switch ($oneof_case_member$) {\n");
            });
            for field in oneof.fields() {
                let index = field.index();
                p.print_with(
                    &[("case_number", &field.number().to_string())],
                    "\x20 case $case_number$:\n",
                );
                p.indent();
                self.generators[index].generate_hash_code(p);
                p.print("break;\n");
                p.outdent();
            }
            p.print(
                "\x20 case 0:\n\
                 \x20 default:\n\
                 }\n",
            );
        }
        if self.is_extendable() {
            p.print("hash = hashFields(hash, getExtensionFields());\n");
        }
        p.print(
            "hash = (29 * hash) + getUnknownFields().hashCode();\n\
             memoizedHashCode = hash;\n\
             return hash;\n",
        );
        p.outdent();
        p.print("}\n\n");
    }

    fn generate_parse_helpers(&self, p: &mut Printer) {
        p.print(
            "public static $classname$ parseFrom(\n\
             \x20   com.google.protobuf.ByteString data)\n\
             \x20   throws com.google.protobuf.InvalidProtocolBufferException {\n\
             \x20 return PARSER.parseFrom(data);\n\
             }\n\
             public static $classname$ parseFrom(\n\
             \x20   com.google.protobuf.ByteString data,\n\
             \x20   com.google.protobuf.ExtensionRegistryLite extensionRegistry)\n\
             \x20   throws com.google.protobuf.InvalidProtocolBufferException {\n\
             \x20 return PARSER.parseFrom(data, extensionRegistry);\n\
             }\n\
             public static $classname$ parseFrom(byte[] data)\n\
             \x20   throws com.google.protobuf.InvalidProtocolBufferException {\n\
             \x20 return PARSER.parseFrom(data);\n\
             }\n\
             public static $classname$ parseFrom(\n\
             \x20   byte[] data,\n\
             \x20   com.google.protobuf.ExtensionRegistryLite extensionRegistry)\n\
             \x20   throws com.google.protobuf.InvalidProtocolBufferException {\n\
             \x20 return PARSER.parseFrom(data, extensionRegistry);\n\
             }\n\
             public static $classname$ parseFrom(java.io.InputStream input)\n\
             \x20   throws java.io.IOException {\n\
             \x20 return com.google.protobuf.GeneratedMessageV3\n\
             \x20     .parseWithIOException(PARSER, input);\n\
             }\n\
             public static $classname$ parseFrom(\n\
             \x20   java.io.InputStream input,\n\
             \x20   com.google.protobuf.ExtensionRegistryLite extensionRegistry)\n\
             \x20   throws java.io.IOException {\n\
             \x20 return com.google.protobuf.GeneratedMessageV3\n\
             \x20     .parseWithIOException(PARSER, input, extensionRegistry);\n\
             }\n\
             public static $classname$ parseDelimitedFrom(java.io.InputStream input)\n\
             \x20   throws java.io.IOException {\n\
             \x20 return com.google.protobuf.GeneratedMessageV3\n\
             \x20     .parseDelimitedWithIOException(PARSER, input);\n\
             }\n\
             public static $classname$ parseFrom(\n\
             \x20   com.google.protobuf.CodedInputStream input)\n\
             \x20   throws java.io.IOException {\n\
             \x20 return com.google.protobuf.GeneratedMessageV3\n\
             \x20     .parseWithIOException(PARSER, input);\n\
             }\n\
             public static $classname$ parseFrom(\n\
             \x20   com.google.protobuf.CodedInputStream input,\n\
             \x20   com.google.protobuf.ExtensionRegistryLite extensionRegistry)\n\
             \x20   throws java.io.IOException {\n\
             \x20 return com.google.protobuf.GeneratedMessageV3\n\
             \x20     .parseWithIOException(PARSER, input, extensionRegistry);\n\
             }\n\n\
             @java.lang.Override\n\
             public Builder newBuilderForType() { return newBuilder(); }\n\
             public static Builder newBuilder() {\n\
             \x20 return DEFAULT_INSTANCE.toBuilder();\n\
             }\n\
             public static Builder newBuilder($classname$ prototype) {\n\
             \x20 return DEFAULT_INSTANCE.toBuilder().mergeFrom(prototype);\n\
             }\n\
             @java.lang.Override\n\
             public Builder toBuilder() {\n\
             \x20 return this == DEFAULT_INSTANCE\n\
             \x20     ? new Builder() : new Builder().mergeFrom(this);\n\
             }\n\n\
             @java.lang.Override\n\
             protected Builder newBuilderForType(\n\
             \x20   com.google.protobuf.GeneratedMessageV3.BuilderParent parent) {\n\
             \x20 Builder builder = new Builder(parent);\n\
             \x20 return builder;\n\
             }\n\n",
        );
    }

    fn generate_builder(&self, p: &mut Printer) {
        if self.is_extendable() {
            p.print(
                "public static final class Builder extends\n\
                 \x20   com.google.protobuf.GeneratedMessageV3.ExtendableBuilder<\n\
                 \x20     $classname$, Builder> implements $classname$OrBuilder {\n",
            );
        } else {
            p.print(
                "public static final class Builder extends\n\
                 \x20   com.google.protobuf.GeneratedMessageV3.Builder<Builder> implements\n\
                 \x20   $classname$OrBuilder {\n",
            );
        }
        p.indent();
        p.print(
            "public static final com.google.protobuf.Descriptors.Descriptor\n\
             \x20   getDescriptor() {\n\
             \x20 return $outer$.internal_static_$ident$_descriptor;\n\
             }\n\n",
        );
        self.generate_map_field_reflection(p, false);
        self.generate_map_field_reflection(p, true);
        p.print(
            "@java.lang.Override\n\
             protected com.google.protobuf.GeneratedMessageV3.FieldAccessorTable\n\
             \x20   internalGetFieldAccessorTable() {\n\
             \x20 return $outer$.internal_static_$ident$_fieldAccessorTable\n\
             \x20     .ensureFieldAccessorsInitialized(\n\
             \x20         $classname$.class, $classname$.Builder.class);\n\
             }\n\n\
             private Builder() {}\n\n\
             private Builder(\n\
             \x20   com.google.protobuf.GeneratedMessageV3.BuilderParent parent) {\n\
             \x20 super(parent);\n\
             }\n\n",
        );

        // clear()
        p.print(
            "@java.lang.Override\n\
             public Builder clear() {\n\
             \x20 super.clear();\n",
        );
        p.indent();
        for word in 0..self.builder_bit_words() {
            p.print_with(&[("word", &word.to_string())], "bitField$word$_ = 0;\n");
        }
        for generator in &self.generators {
            generator.generate_builder_clear_code(p);
        }
        for oneof in self.real_oneofs() {
            with_owned(p, &Self::oneof_vars(oneof), |p| {
                p.print(
                    "$oneof_case_member$ = 0;\n\
                     $oneof_member$ = null;\n",
                );
            });
        }
        p.print("return this;\n");
        p.outdent();
        p.print("}\n\n");

        p.print(
            "@java.lang.Override\n\
             public com.google.protobuf.Descriptors.Descriptor\n\
             \x20   getDescriptorForType() {\n\
             \x20 return $outer$.internal_static_$ident$_descriptor;\n\
             }\n\n\
             @java.lang.Override\n\
             public $classname$ getDefaultInstanceForType() {\n\
             \x20 return $classname$.getDefaultInstance();\n\
             }\n\n\
             @java.lang.Override\n\
             public $classname$ build() {\n\
             \x20 $classname$ result = buildPartial();\n\
             \x20 if (!result.isInitialized()) {\n\
             \x20   throw newUninitializedMessageException(result);\n\
             \x20 }\n\
             \x20 return result;\n\
             }\n\n",
        );

        // buildPartial
        let dirty = (0..self.builder_bit_words())
            .map(|word| format!("bitField{word}_ != 0"))
            .join(" || ");
        p.print(
            "@java.lang.Override\n\
             public $classname$ buildPartial() {\n\
             \x20 $classname$ result = new $classname$(this);\n",
        );
        p.print_with(
            &[("dirty", &dirty)],
            "\x20 if ($dirty$) { buildPartial0(result); }\n",
        );
        if !self.real_oneofs().is_empty() {
            p.print("\x20 buildPartialOneofs(result);\n");
        }
        p.print(
            "\x20 onBuilt();\n\
             \x20 return result;\n\
             }\n\n\
             private void buildPartial0($classname$ result) {\n",
        );
        p.indent();
        for word in 0..self.builder_bit_words() {
            p.print_with(
                &[("word", &word.to_string())],
                "int from_bitField$word$_ = bitField$word$_;\n",
            );
        }
        for word in 0..self.message_bit_words() {
            p.print_with(
                &[("word", &word.to_string())],
                "int to_bitField$word$_ = 0;\n",
            );
        }
        for generator in &self.generators {
            generator.generate_building_code(p);
        }
        for word in 0..self.message_bit_words() {
            p.print_with(
                &[("word", &word.to_string())],
                "result.bitField$word$_ |= to_bitField$word$_;\n",
            );
        }
        p.outdent();
        p.print("}\n\n");

        if !self.real_oneofs().is_empty() {
            p.print("private void buildPartialOneofs($classname$ result) {\n");
            p.indent();
            for oneof in self.real_oneofs() {
                with_owned(p, &Self::oneof_vars(oneof), |p| {
                    p.print(
                        "result.$oneof_case_member$ = $oneof_case_member$;\n\
                         result.$oneof_member$ = this.$oneof_member$;\n",
                    );
                });
            }
            p.outdent();
            p.print("}\n\n");
        }

        // mergeFrom(Message) and mergeFrom(self)
        p.print(
            "@java.lang.Override\n\
             public Builder mergeFrom(com.google.protobuf.Message other) {\n\
             \x20 if (other instanceof $classname$) {\n\
             \x20   return mergeFrom(($classname$) other);\n\
             \x20 } else {\n\
             \x20   super.mergeFrom(other);\n\
             \x20   return this;\n\
             \x20 }\n\
             }\n\n\
             public Builder mergeFrom($classname$ other) {\n\
             \x20 if (other == $classname$.getDefaultInstance()) return this;\n",
        );
        p.indent();
        for generator in &self.generators {
            if generator.field.real_containing_oneof().is_some() {
                continue;
            }
            generator.generate_merging_code(p);
        }
        for oneof in self.real_oneofs() {
            with_owned(p, &Self::oneof_vars(oneof), |p| {
                p.print("switch (other.get$oneof_camel$Case()) {\n");
            });
            for field in oneof.fields() {
                let index = field.index();
                p.print_with(
                    &[("case_name", &field.name().to_ascii_uppercase())],
                    "\x20 case $case_name$: {\n",
                );
                p.indent();
                self.generators[index].generate_merging_code(p);
                p.print("break;\n");
                p.outdent();
                p.print("\x20 }\n");
            }
            with_owned(p, &Self::oneof_vars(oneof), |p| {
                p.print(
                    "\x20 case $oneof_not_set$: {\n\
                     \x20   break;\n\
                     \x20 }\n\
                     }\n",
                );
            });
        }
        if self.is_extendable() {
            p.print("this.mergeExtensionFields(other);\n");
        }
        p.print(
            "this.mergeUnknownFields(other.getUnknownFields());\n\
             onChanged();\n\
             return this;\n",
        );
        p.outdent();
        p.print("}\n\n");

        self.generate_is_initialized(p, true);

        // mergeFrom(CodedInputStream)
        p.print(
            "@java.lang.Override\n\
             public Builder mergeFrom(\n\
             \x20   com.google.protobuf.CodedInputStream input,\n\
             \x20   com.google.protobuf.ExtensionRegistryLite extensionRegistry)\n\
             \x20   throws java.io.IOException {\n\
             \x20 if (extensionRegistry == null) {\n\
             \x20   throw new java.lang.NullPointerException();\n\
             \x20 }\n\
             \x20 try {\n\
             \x20   boolean done = false;\n\
             \x20   while (!done) {\n\
             \x20     int tag = input.readTag();\n\
             \x20     switch (tag) {\n\
             \x20       case 0:\n\
             \x20         done = true;\n\
             \x20         break;\n",
        );
        p.indent();
        p.indent();
        p.indent();
        for &i in &self.fields_by_number() {
            self.generators[i].generate_builder_parsing_code(p);
        }
        p.outdent();
        p.outdent();
        p.outdent();
        p.print(
            "\x20       default: {\n\
             \x20         if (!super.parseUnknownField(input, extensionRegistry, tag)) {\n\
             \x20           done = true;\n\
             \x20         }\n\
             \x20         break;\n\
             \x20       }\n\
             \x20     }\n\
             \x20   }\n\
             \x20 } catch (com.google.protobuf.InvalidProtocolBufferException e) {\n\
             \x20   throw e.unwrapIOException();\n\
             \x20 } finally {\n\
             \x20   onChanged();\n\
             \x20 }\n\
             \x20 return this;\n\
             }\n\n",
        );

        for word in 0..self.builder_bit_words() {
            p.print_with(&[("word", &word.to_string())], "private int bitField$word$_;\n");
        }
        p.print("\n");

        // Builder-side oneof case storage and accessors.
        for oneof in self.real_oneofs() {
            with_owned(p, &Self::oneof_vars(oneof), |p| {
                p.print(
                    "private int $oneof_case_member$ = 0;\n\
                     private java.lang.Object $oneof_member$;\n\
                     public $oneof_case_type$ get$oneof_camel$Case() {\n\
                     \x20 return $oneof_case_type$.forNumber($oneof_case_member$);\n\
                     }\n\
                     public Builder clear$oneof_camel$() {\n\
                     \x20 $oneof_case_member$ = 0;\n\
                     \x20 $oneof_member$ = null;\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n\n",
                );
            });
        }

        for generator in &self.generators {
            generator.generate_builder_members(p);
        }

        p.outdent();
        p.print("}\n\n");
    }

    fn generate_default_instance(&self, p: &mut Printer) {
        p.print(
            "private static final $classname$ DEFAULT_INSTANCE;\n\
             static {\n\
             \x20 DEFAULT_INSTANCE = new $classname$();\n\
             }\n\n\
             public static $classname$ getDefaultInstance() {\n\
             \x20 return DEFAULT_INSTANCE;\n\
             }\n\n\
             private static final com.google.protobuf.Parser<$classname$>\n\
             \x20   PARSER = new com.google.protobuf.AbstractParser<$classname$>() {\n\
             \x20 @java.lang.Override\n\
             \x20 public $classname$ parsePartialFrom(\n\
             \x20     com.google.protobuf.CodedInputStream input,\n\
             \x20     com.google.protobuf.ExtensionRegistryLite extensionRegistry)\n\
             \x20     throws com.google.protobuf.InvalidProtocolBufferException {\n\
             \x20   Builder builder = newBuilder();\n\
             \x20   try {\n\
             \x20     builder.mergeFrom(input, extensionRegistry);\n\
             \x20   } catch (com.google.protobuf.InvalidProtocolBufferException e) {\n\
             \x20     throw e.setUnfinishedMessage(builder.buildPartial());\n\
             \x20   } catch (com.google.protobuf.UninitializedMessageException e) {\n\
             \x20     throw e.asInvalidProtocolBufferException()\n\
             \x20         .setUnfinishedMessage(builder.buildPartial());\n\
             \x20   } catch (java.io.IOException e) {\n\
             \x20     throw new com.google.protobuf.InvalidProtocolBufferException(e)\n\
             \x20         .setUnfinishedMessage(builder.buildPartial());\n\
             \x20   }\n\
             \x20   return builder.buildPartial();\n\
             \x20 }\n\
             };\n\n\
             public static com.google.protobuf.Parser<$classname$> parser() {\n\
             \x20 return PARSER;\n\
             }\n\n\
             @java.lang.Override\n\
             public com.google.protobuf.Parser<$classname$> getParserForType() {\n\
             \x20 return PARSER;\n\
             }\n\n\
             @java.lang.Override\n\
             public $classname$ getDefaultInstanceForType() {\n\
             \x20 return DEFAULT_INSTANCE;\n\
             }\n",
        );
    }
}

fn with_owned<F>(p: &mut Printer, vars: &[(String, String)], body: F)
where
    F: FnOnce(&mut Printer),
{
    let view: Vec<(&str, &str)> = vars.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    p.with_vars(&view, body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorPool;
    use crate::printer::Printer;
    use crate::proto::*;

    fn build_pool() -> DescriptorPool {
        let file = FileDescriptorProto {
            name: "ledger.proto".to_string(),
            package: "bank".to_string(),
            syntax: "proto2".to_string(),
            message_type: vec![DescriptorProto {
                name: "Account".to_string(),
                extension_range: vec![ExtensionRange { start: 50, end: 100 }],
                oneof_decl: vec![OneofDescriptorProto {
                    name: "owner".to_string(),
                }],
                field: vec![
                    FieldDescriptorProto {
                        name: "id".to_string(),
                        number: 1,
                        label: Label::Required,
                        r#type: Type::Int64,
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "balance".to_string(),
                        number: 120,
                        label: Label::Optional,
                        r#type: Type::Sint64,
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "alias".to_string(),
                        number: 7,
                        r#type: Type::String,
                        oneof_index: Some(0),
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

    fn render() -> String {
        let pool = build_pool();
        let message = pool.message_by_name("bank.Account").unwrap();
        let options = Options::default();
        let config = Config::default();
        let mut analyzer = SccAnalyzer::new();
        let generator =
            MessageGenerator::new(message, &options, &config, &mut analyzer).unwrap();
        let mut printer = Printer::new();
        generator
            .generate(&mut printer, &mut analyzer, &config)
            .unwrap();
        printer.into_parts().0
    }

    #[test]
    fn class_skeleton_has_interface_class_and_builder() {
        let out = render();
        assert!(out.contains("public interface AccountOrBuilder extends"));
        assert!(out.contains("public static final class Account extends"));
        assert!(out.contains("ExtendableMessage<"));
        assert!(out.contains("public static final class Builder extends"));
        assert!(out.contains("internal_static_bank_Account_fieldAccessorTable"));
    }

    #[test]
    fn write_to_interleaves_extension_ranges_in_number_order() {
        let out = render();
        let id = out.find("output.writeInt64(1, id_);").expect("id serialization");
        let writer = out
            .find("extensionWriter.writeUntil(100, output);")
            .expect("extension writer");
        let balance = out
            .find("output.writeSInt64(120, balance_);")
            .expect("balance serialization");
        assert!(id < writer, "field 1 precedes range [50,100)");
        assert!(writer < balance, "range [50,100) precedes field 120");
    }

    #[test]
    fn required_field_gates_is_initialized() {
        let out = render();
        assert!(out.contains("if (!hasId()) {"));
        assert!(out.contains("memoizedIsInitialized = 0;"));
        assert!(out.contains("if (!extensionsAreInitialized()) {"));
    }

    #[test]
    fn oneof_case_enum_lists_members_and_not_set() {
        let out = render();
        assert!(out.contains("public enum OwnerCase"));
        assert!(out.contains("ALIAS(7),"));
        assert!(out.contains("OWNER_NOT_SET(0);"));
        assert!(out.contains("public OwnerCase getOwnerCase()"));
    }
}
