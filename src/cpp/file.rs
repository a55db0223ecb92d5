//! Per-file orchestration for the C++ back-end.
//!
//! The header and source are each emitted in a fixed order so the pair is
//! self-consistent: everything a later section references has been declared
//! by an earlier one. All iteration that reaches the output is over sorted
//! or declaration-ordered collections.

use std::collections::{BTreeMap, HashSet};

use itertools::Itertools;
use log::debug;

use crate::descriptor::FileDescriptor;
use crate::flatten::{self, CrossFileReferences};
use crate::options::Options;
use crate::printer::Printer;
use crate::proto::{self, CType};
use crate::scc::SccAnalyzer;

use super::enum_::EnumGenerator;
use super::extension::ExtensionGenerator;
use super::helpers;
use super::message::MessageGenerator;
use super::names;
use super::service::ServiceGenerator;

/// Accessor base names that would collide with methods of the generated
/// message class; fields with these names get the number-suffixed form.
pub const FORBIDDEN_FIELD_NAMES: &[&str] = &[
    "clear",
    "copy_from",
    "merge_from",
    "default_instance",
    "unknown_fields",
    "byte_size_long",
    "is_initialized",
    "hash_code",
];

/// String-literal length limit past which the embedded descriptor switches
/// to an array-of-char literal.
const STRING_LITERAL_LIMIT: usize = 65535;

/// Which runtime headers the file's schema actually pulls in.
#[derive(Default)]
struct Features {
    extensions: bool,
    repeated: bool,
    maps: bool,
    cord: bool,
    weak: bool,
    lazy: bool,
}

fn scan_features(file: FileDescriptor<'_>) -> Features {
    let mut features = Features::default();
    if file.extensions().next().is_some() {
        features.extensions = true;
    }
    for message in flatten::flatten_messages_in_file(file) {
        if message.is_extendable() || message.extensions().next().is_some() {
            features.extensions = true;
        }
        for field in message.fields() {
            if field.is_map() {
                features.maps = true;
            } else if field.is_repeated() {
                features.repeated = true;
            }
            if field.ctype() == CType::Cord {
                features.cord = true;
            }
            if field.is_weak() || flatten::is_implicit_weak_reference(file, field) {
                features.weak = true;
            }
            if field.is_lazy() {
                features.lazy = true;
            }
        }
    }
    features
}

pub struct FileGenerator<'a> {
    file: FileDescriptor<'a>,
    options: &'a Options,
    messages: Vec<MessageGenerator<'a>>,
    enums: Vec<EnumGenerator<'a>>,
    extensions: Vec<ExtensionGenerator<'a>>,
    services: Vec<ServiceGenerator<'a>>,
    refs: CrossFileReferences<'a>,
    features: Features,
}

impl<'a> FileGenerator<'a> {
    pub fn new(
        file: FileDescriptor<'a>,
        options: &'a Options,
        analyzer: &mut SccAnalyzer<'a>,
    ) -> Self {
        let forbidden: HashSet<&str> = FORBIDDEN_FIELD_NAMES.iter().copied().collect();
        let flattened = flatten::flatten_messages_in_file(file);

        let messages = flattened
            .iter()
            .map(|&message| MessageGenerator::new(message, options, &forbidden, analyzer))
            .collect();

        let mut enums: Vec<EnumGenerator<'a>> = file
            .enums()
            .map(|e| EnumGenerator::new(e, options))
            .collect();
        for &message in &flattened {
            enums.extend(message.nested_enums().map(|e| EnumGenerator::new(e, options)));
        }

        let mut extensions: Vec<ExtensionGenerator<'a>> = file
            .extensions()
            .map(|ext| ExtensionGenerator::new(ext, None, options))
            .collect();
        for &message in &flattened {
            extensions.extend(
                message
                    .extensions()
                    .map(move |ext| ExtensionGenerator::new(ext, Some(message), options)),
            );
        }

        let services = if options.is_lite() {
            Vec::new()
        } else {
            file.services()
                .map(|s| ServiceGenerator::new(s, options))
                .collect()
        };

        FileGenerator {
            file,
            options,
            messages,
            enums,
            extensions,
            services,
            refs: flatten::gather_cross_file_references(file),
            features: scan_features(file),
        }
    }

    fn banner(&self, p: &mut Printer) {
        if self.options.strip_nonfunctional_codegen {
            return;
        }
        p.print_with(
            &[("file", self.file.name())],
            "// Generated by the protocol buffer compiler.  DO NOT EDIT!\n\
             // source: $file$\n\n",
        );
    }

    fn runtime_include(&self, p: &mut Printer, path: &str) {
        p.print_with(
            &[
                ("base", &self.options.runtime_include_base),
                ("path", path),
            ],
            "#include \"$base$$path$\"\n",
        );
    }

    fn open_namespace(&self, p: &mut Printer) {
        for part in names::namespace_parts(self.file) {
            p.print_with(&[("part", &part)], "namespace $part$ {\n");
        }
    }

    fn close_namespace(&self, p: &mut Printer) {
        for part in names::namespace_parts(self.file).iter().rev() {
            p.print_with(&[("part", part)], "}  // namespace $part$\n");
        }
    }

    /// The complete generated header.
    pub fn generate_header(&self, p: &mut Printer) {
        debug!("generating C++ header for {}", self.file.name());
        self.banner(p);
        p.print_with(
            &[("guard", &names::include_guard(self.file))],
            "#ifndef $guard$\n\
             #define $guard$\n\n\
             #include <cstdint>\n\
             #include <limits>\n\
             #include <string>\n\n",
        );
        self.generate_library_includes(p);
        for dep in &self.refs.strong_reflection_files {
            p.print_with(
                &[("include", &helpers::dependency_include(self.options, *dep))],
                "#include \"$include$\"\n",
            );
        }
        p.print("\n");
        self.generate_forward_declarations(p);

        self.open_namespace(p);
        for generator in &self.enums {
            p.print("\n");
            generator.generate_definition(p);
        }
        for generator in &self.messages {
            p.print("\n");
            generator.generate_class_definition(p);
        }
        for generator in &self.services {
            p.print("\n");
            generator.generate_declarations(p);
        }
        if !self.extensions.is_empty() {
            p.print("\n// extension identifiers\n");
            for generator in &self.extensions {
                generator.generate_declaration(p);
            }
        }
        p.print("\n// inline methods\n");
        for generator in &self.messages {
            generator.generate_inline_methods(p);
        }
        self.close_namespace(p);

        if helpers::has_descriptor_methods(self.options) {
            p.print_with(
                &[("table", &names::descriptor_table_name(self.file))],
                "\nextern const ::google::protobuf::internal::DescriptorTable $table$;\n",
            );
        }
        p.print_with(
            &[("guard", &names::include_guard(self.file))],
            "\n#endif  // $guard$\n",
        );
    }

    fn generate_library_includes(&self, p: &mut Printer) {
        if self.options.is_lite() {
            self.runtime_include(p, "google/protobuf/message_lite.h");
        } else {
            self.runtime_include(p, "google/protobuf/message.h");
        }
        self.runtime_include(p, "google/protobuf/generated_message_util.h");
        self.runtime_include(p, "google/protobuf/metadata_lite.h");
        if self.features.extensions {
            self.runtime_include(p, "google/protobuf/extension_set.h");
        }
        if self.features.repeated || self.features.maps {
            self.runtime_include(p, "google/protobuf/repeated_field.h");
        }
        if self.features.maps {
            self.runtime_include(p, "google/protobuf/map.h");
        }
        if self.features.cord {
            self.runtime_include(p, "absl/strings/cord.h");
        }
        if self.features.weak {
            self.runtime_include(p, "google/protobuf/implicit_weak_message.h");
        }
        if self.features.lazy {
            self.runtime_include(p, "google/protobuf/lazy_field.h");
        }
        if !self.services.is_empty() {
            self.runtime_include(p, "google/protobuf/service.h");
        }
    }

    /// Forward declarations for this file's classes and for classes reached
    /// through weak imports, grouped by namespace; groups and the names
    /// within them are sorted.
    fn generate_forward_declarations(&self, p: &mut Printer) {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for generator in &self.messages {
            if !generator.descriptor().is_map_entry() {
                groups
                    .entry(names::namespace_of(self.file))
                    .or_default()
                    .push(generator.classname().to_string());
            }
        }
        for &message in &self.refs.weak_default_instances {
            groups
                .entry(names::namespace_of(message.file()))
                .or_default()
                .push(names::class_name(message));
        }

        for (namespace, classes) in groups {
            let parts: Vec<&str> = namespace.split("::").filter(|s| !s.is_empty()).collect();
            for part in &parts {
                p.print_with(&[("part", part)], "namespace $part$ {\n");
            }
            for class in classes.into_iter().sorted().dedup() {
                p.print_with(&[("class", &class)], "class $class$;\n");
            }
            for part in parts.iter().rev() {
                p.print_with(&[("part", part)], "}  // namespace $part$\n");
            }
        }
        p.print("\n");
    }

    /// The complete generated source.
    pub fn generate_source(&self, p: &mut Printer) {
        debug!("generating C++ source for {}", self.file.name());
        self.banner(p);
        p.print_with(
            &[("header", &names::header_path(self.file))],
            "#include \"$header$\"\n\n\
             #include <algorithm>\n\
             #include <cstring>\n\n",
        );
        self.runtime_include(p, "google/protobuf/io/coded_stream.h");
        self.runtime_include(p, "google/protobuf/wire_format_lite.h");
        if helpers::has_descriptor_methods(self.options) {
            self.runtime_include(p, "google/protobuf/descriptor.h");
            self.runtime_include(p, "google/protobuf/generated_message_reflection.h");
            self.runtime_include(p, "google/protobuf/wire_format.h");
        }
        p.print("\n");

        self.generate_weak_cross_file_declarations(p);

        self.open_namespace(p);
        for generator in &self.messages {
            if !generator.descriptor().is_map_entry() {
                generator.generate_default_instance(p);
            }
        }
        self.close_namespace(p);

        if helpers::has_descriptor_methods(self.options) {
            self.generate_reflection_initialization(p);
        }

        self.open_namespace(p);
        for generator in &self.messages {
            p.print("\n");
            generator.generate_methods(p);
        }
        for generator in &self.enums {
            p.print("\n");
            generator.generate_methods(p);
        }
        for generator in &self.services {
            p.print("\n");
            generator.generate_methods(p);
        }
        if !self.extensions.is_empty() {
            p.print("\n");
            for generator in &self.extensions {
                generator.generate_definition(p);
            }
        }
        self.close_namespace(p);
    }

    /// Weak-symbol declarations for everything this file may reference in a
    /// weakly imported file: default instances and dependency tables.
    fn generate_weak_cross_file_declarations(&self, p: &mut Printer) {
        for &message in &self.refs.weak_default_instances {
            let namespace = names::namespace_of(message.file());
            let parts: Vec<&str> = namespace.split("::").filter(|s| !s.is_empty()).collect();
            for part in &parts {
                p.print_with(&[("part", part)], "namespace $part$ {\n");
            }
            p.print_with(
                &[
                    ("class", &names::class_name(message)),
                    ("instance", &names::default_instance_name(message)),
                ],
                "struct $class$DefaultTypeInternal;\n\
                 extern __attribute__((weak)) $class$DefaultTypeInternal $instance$;\n",
            );
            for part in parts.iter().rev() {
                p.print_with(&[("part", part)], "}  // namespace $part$\n");
            }
        }
        for dep in &self.refs.weak_reflection_files {
            p.print_with(
                &[("table", &names::descriptor_table_name(*dep))],
                "extern __attribute__((weak)) const ::google::protobuf::internal::DescriptorTable $table$;\n",
            );
        }
        if !self.refs.weak_default_instances.is_empty()
            || !self.refs.weak_reflection_files.is_empty()
        {
            p.print("\n");
        }
    }

    /// Non-map-entry messages, the set the reflection tables cover.
    fn reflected_messages(&self) -> Vec<&MessageGenerator<'a>> {
        self.messages
            .iter()
            .filter(|g| !g.descriptor().is_map_entry())
            .collect()
    }

    fn generate_reflection_initialization(&self, p: &mut Printer) {
        let ident = names::filename_identifier(self.file.name());
        let table = names::descriptor_table_name(self.file);
        let reflected = self.reflected_messages();
        p.with_vars(&[("ident", &ident), ("table", &table)], |p| {
            p.print(
                "\nstatic const ::uint32_t table_offsets_$ident$[] = {\n",
            );
            p.indent();
            let mut bases = Vec::with_capacity(reflected.len());
            let mut next = 0usize;
            for generator in &reflected {
                bases.push(next);
                next += generator.generate_offsets(p);
            }
            p.outdent();
            p.print(
                "};\n\
                 static const ::google::protobuf::internal::MigrationSchema schemas_$ident$[] = {\n",
            );
            p.indent();
            for (generator, base) in reflected.iter().zip(&bases) {
                p.print_with(
                    &[
                        ("base", &base.to_string()),
                        ("classname", generator.classname()),
                    ],
                    "{ $base$, -1, -1, sizeof($classname$) },\n",
                );
            }
            p.outdent();
            p.print(
                "};\n\
                 static const ::google::protobuf::Message* const file_default_instances_$ident$[] = {\n",
            );
            p.indent();
            for generator in &reflected {
                p.print_with(
                    &[(
                        "instance",
                        &names::default_instance_name(generator.descriptor()),
                    )],
                    "&$instance$._instance,\n",
                );
            }
            p.outdent();
            p.print("};\n");

            self.generate_descriptor_literal(p);

            let dep_count = self.refs.strong_reflection_files.len();
            if dep_count > 0 {
                p.print(
                    "static const ::google::protobuf::internal::DescriptorTable* const descriptor_table_deps_$ident$[] = {\n",
                );
                p.indent();
                for dep in &self.refs.strong_reflection_files {
                    p.print_with(
                        &[("dep_table", &names::descriptor_table_name(*dep))],
                        "&$dep_table$,\n",
                    );
                }
                p.outdent();
                p.print("};\n");
            }
            let deps_array = if dep_count > 0 {
                format!("descriptor_table_deps_{ident}")
            } else {
                "nullptr".to_string()
            };
            p.print_with(
                &[
                    ("file", self.file.name()),
                    ("deps_array", &deps_array),
                    ("dep_count", &dep_count.to_string()),
                    ("message_count", &reflected.len().to_string()),
                ],
                "static ::google::protobuf::internal::once_flag descriptor_table_once_$ident$;\n\
                 const ::google::protobuf::internal::DescriptorTable $table$ = {\n\
                 \x20 false,\n\
                 \x20 descriptor_table_protodef_$ident$,\n\
                 \x20 sizeof(descriptor_table_protodef_$ident$) - 1,\n\
                 \x20 \"$file$\",\n\
                 \x20 &descriptor_table_once_$ident$,\n\
                 \x20 $deps_array$,\n\
                 \x20 $dep_count$,\n\
                 \x20 $message_count$,\n\
                 \x20 schemas_$ident$,\n\
                 \x20 file_default_instances_$ident$,\n\
                 \x20 table_offsets_$ident$,\n\
                 };\n\
                 static ::google::protobuf::internal::AddDescriptorsRunner descriptor_table_runner_$ident$(&$table$);\n",
            );
        });
    }

    /// The encoded `FileDescriptorProto`, source-retention options stripped,
    /// as a byte literal. Above the string-literal limit it becomes an
    /// array-of-char literal at 25 bytes per line; below, C-string literals
    /// at 40 bytes per line.
    fn generate_descriptor_literal(&self, p: &mut Printer) {
        let bytes = if self.options.strip_nonfunctional_codegen {
            Vec::new()
        } else {
            proto::strip_for_embedding(self.file.proto()).encode()
        };
        if bytes.len() > STRING_LITERAL_LIMIT {
            p.print("static const char descriptor_table_protodef_$ident$[] = {\n");
            p.indent();
            for chunk in bytes.chunks(25) {
                let line = chunk
                    .iter()
                    .map(|b| format!("'\\{b:03o}'"))
                    .join(", ");
                p.print_with(&[("line", &line)], "$line$,\n");
            }
            p.print("'\\000',\n");
            p.outdent();
            p.print("};\n");
        } else {
            p.print("static const char descriptor_table_protodef_$ident$[] =\n");
            p.indent();
            for chunk in bytes.chunks(40) {
                let line = helpers::escape_c_bytes(chunk);
                p.print_with(&[("line", &line)], "\"$line$\"\n");
            }
            if bytes.is_empty() {
                p.print("\"\"\n");
            }
            p.outdent();
            p.print(";\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorPool;
    use crate::proto::*;

    fn sample_file() -> FileDescriptorProto {
        FileDescriptorProto {
            name: "shop/order.proto".to_string(),
            package: "shop".to_string(),
            syntax: "proto3".to_string(),
            enum_type: vec![EnumDescriptorProto {
                name: "Status".to_string(),
                value: vec![
                    EnumValueDescriptorProto {
                        name: "STATUS_UNKNOWN".to_string(),
                        number: 0,
                    },
                    EnumValueDescriptorProto {
                        name: "STATUS_OPEN".to_string(),
                        number: 1,
                    },
                ],
                ..Default::default()
            }],
            message_type: vec![DescriptorProto {
                name: "Order".to_string(),
                field: vec![
                    FieldDescriptorProto {
                        name: "id".to_string(),
                        number: 1,
                        r#type: Type::Int64,
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "status".to_string(),
                        number: 2,
                        r#type: Type::Enum,
                        type_name: ".shop.Status".to_string(),
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "tags".to_string(),
                        number: 3,
                        label: Label::Repeated,
                        r#type: Type::String,
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn generate(file: &FileDescriptorProto) -> (String, String) {
        let mut pool = DescriptorPool::new();
        pool.add_file(file).unwrap();
        let fd = pool.file_by_name(&file.name).unwrap();
        let options = Options::default();
        let mut analyzer = SccAnalyzer::new();
        let generator = FileGenerator::new(fd, &options, &mut analyzer);
        let mut header = Printer::new();
        generator.generate_header(&mut header);
        let mut source = Printer::new();
        generator.generate_source(&mut source);
        (header.into_parts().0, source.into_parts().0)
    }

    #[test]
    fn header_sections_are_ordered() {
        let (header, _) = generate(&sample_file());
        let guard = header.find("#ifndef GOOGLE_PROTOBUF_INCLUDED_").unwrap();
        let includes = header.find("#include \"google/protobuf/message.h\"").unwrap();
        let forward = header.find("class Order;").unwrap();
        let enums = header.find("enum Status : int {").unwrap();
        let class = header.find("class Order final").unwrap();
        let inline_section = header.find("// inline methods").unwrap();
        let table = header
            .find("extern const ::google::protobuf::internal::DescriptorTable")
            .unwrap();
        let endif = header.find("#endif").unwrap();
        let order = [guard, includes, forward, enums, class, inline_section, table, endif];
        assert!(order.windows(2).all(|w| w[0] < w[1]), "{order:?}");
    }

    #[test]
    fn source_embeds_descriptor_as_string_literal() {
        let (_, source) = generate(&sample_file());
        assert!(source.contains("descriptor_table_protodef_shop_2forder_2eproto"));
        assert!(source.contains("static const char descriptor_table_protodef_"));
        // Small descriptor stays in string-literal form.
        assert!(!source.contains("'\\"));
        assert!(source.contains("AddDescriptorsRunner"));
    }

    #[test]
    fn generation_is_deterministic() {
        let file = sample_file();
        let first = generate(&file);
        let second = generate(&file);
        assert_eq!(first, second);
    }

    #[test]
    fn weak_dependency_gets_weak_symbol_declarations() {
        let dep = FileDescriptorProto {
            name: "shop/coupon.proto".to_string(),
            package: "shop.deals".to_string(),
            syntax: "proto3".to_string(),
            message_type: vec![DescriptorProto {
                name: "Coupon".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let main = FileDescriptorProto {
            name: "shop/cart.proto".to_string(),
            package: "shop".to_string(),
            syntax: "proto3".to_string(),
            dependency: vec!["shop/coupon.proto".to_string()],
            weak_dependency: vec![0],
            message_type: vec![DescriptorProto {
                name: "Cart".to_string(),
                field: vec![FieldDescriptorProto {
                    name: "coupon".to_string(),
                    number: 1,
                    r#type: Type::Message,
                    type_name: ".shop.deals.Coupon".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut pool = DescriptorPool::new();
        pool.add_file(&dep).unwrap();
        pool.add_file(&main).unwrap();
        let fd = pool.file_by_name("shop/cart.proto").unwrap();
        let options = Options::default();
        let mut analyzer = SccAnalyzer::new();
        let generator = FileGenerator::new(fd, &options, &mut analyzer);
        let mut source = Printer::new();
        generator.generate_source(&mut source);
        let text = source.into_parts().0;
        assert!(text.contains("extern __attribute__((weak)) CouponDefaultTypeInternal _Coupon_default_instance_;"));
        assert!(text.contains("__attribute__((weak)) const ::google::protobuf::internal::DescriptorTable descriptor_table_shop_2fcoupon_2eproto;"));
        // Weak deps never enter the strong dependency array.
        assert!(!text.contains("descriptor_table_deps_"));
    }
}
