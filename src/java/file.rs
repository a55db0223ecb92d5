//! Per-file orchestration for the Java back-end.
//!
//! One `.java` file per proto file: a final outer class wrapping every
//! message, enum, service and extension, followed by the reflection statics
//! and a static block that rebuilds the `FileDescriptor` from the embedded
//! descriptor bytes. Sections are emitted in a fixed order so everything a
//! later section references has been declared by an earlier one.

use itertools::Itertools;
use log::debug;

use crate::descriptor::{Descriptor, FileDescriptor, OneofDescriptor};
use crate::error::Result;
use crate::options::Options;
use crate::printer::Printer;
use crate::proto;
use crate::scc::SccAnalyzer;

use super::enum_::EnumGenerator;
use super::extension::ExtensionGenerator;
use super::field::build_field_infos;
use super::helpers;
use super::message::MessageGenerator;
use super::names::{self, Config};
use super::service::ServiceGenerator;

/// Escaped bytes per line of the embedded descriptor literal.
const DESCRIPTOR_CHUNK: usize = 40;

pub struct FileGenerator<'a> {
    file: FileDescriptor<'a>,
    options: &'a Options,
    config: Config,
    outer_class: String,
}

impl<'a> FileGenerator<'a> {
    pub fn new(file: FileDescriptor<'a>, options: &'a Options) -> Result<FileGenerator<'a>> {
        Ok(FileGenerator {
            file,
            options,
            config: Config::default(),
            outer_class: names::file_class_name(file)?,
        })
    }

    /// Every message of the file, parents before their nested types, so the
    /// static block can reach each descriptor through its parent's.
    fn messages_preorder(&self) -> Vec<Descriptor<'a>> {
        let mut result = Vec::new();
        for message in self.file.messages() {
            preorder_into(message, &mut result);
        }
        result
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

    pub fn generate(&self, p: &mut Printer, analyzer: &mut SccAnalyzer<'a>) -> Result<()> {
        debug!("generating Java source for {}", self.file.name());
        self.banner(p);
        let package = names::java_package(self.file);
        if !package.is_empty() {
            p.print_with(&[("package", &package)], "package $package$;\n\n");
        }
        p.print_with(
            &[("outer", &self.outer_class)],
            "public final class $outer$ {\n\
             \x20 private $outer$() {}\n",
        );
        p.indent();

        self.generate_extension_registration(p)?;

        for extension in self.file.extensions() {
            ExtensionGenerator::new(extension, None).generate(p)?;
        }

        for enumeration in self.file.enums() {
            EnumGenerator::new(enumeration, self.options).generate(p)?;
            p.print("\n");
        }
        for message in self.file.messages() {
            MessageGenerator::new(message, self.options, &self.config, analyzer)?
                .generate(p, analyzer, &self.config)?;
        }
        if !self.options.is_lite() {
            for service in self.file.services() {
                ServiceGenerator::new(service).generate(p)?;
                p.print("\n");
            }
        }

        self.generate_descriptor_statics(p)?;

        p.outdent();
        p.print("}\n");
        Ok(())
    }

    /// Both registry flavors; the full one funnels into the lite overload.
    fn generate_extension_registration(&self, p: &mut Printer) -> Result<()> {
        p.print(
            "public static void registerAllExtensions(\n\
             \x20   com.google.protobuf.ExtensionRegistryLite registry) {\n",
        );
        p.indent();
        for extension in self.file.extensions() {
            let name = names::resolve_keyword(&names::underscores_to_camel_case(
                extension.name(),
                false,
            ));
            p.print_with(&[("extension", &name)], "registry.add($extension$);\n");
        }
        for message in self.messages_preorder() {
            for extension in message.extensions() {
                let scope = names::class_name(message);
                let name = names::resolve_keyword(&names::underscores_to_camel_case(
                    extension.name(),
                    false,
                ));
                p.print_with(
                    &[("scope", &scope), ("extension", &name)],
                    "registry.add($scope$.$extension$);\n",
                );
            }
        }
        p.outdent();
        p.print(
            "}\n\n\
             public static void registerAllExtensions(\n\
             \x20   com.google.protobuf.ExtensionRegistry registry) {\n\
             \x20 registerAllExtensions(\n\
             \x20     (com.google.protobuf.ExtensionRegistryLite) registry);\n\
             }\n\n",
        );
        Ok(())
    }

    fn generate_descriptor_statics(&self, p: &mut Printer) -> Result<()> {
        let messages = self.messages_preorder();
        for message in &messages {
            let ident = message.full_name().replace('.', "_");
            p.print_with(
                &[("ident", &ident)],
                "static final com.google.protobuf.Descriptors.Descriptor\n\
                 \x20 internal_static_$ident$_descriptor;\n\
                 static final\n\
                 \x20 com.google.protobuf.GeneratedMessageV3.FieldAccessorTable\n\
                 \x20   internal_static_$ident$_fieldAccessorTable;\n",
            );
        }

        p.print(
            "\npublic static com.google.protobuf.Descriptors.FileDescriptor\n\
             \x20   getDescriptor() {\n\
             \x20 return descriptor;\n\
             }\n\
             private static com.google.protobuf.Descriptors.FileDescriptor\n\
             \x20   descriptor;\n\
             static {\n",
        );
        p.indent();
        self.generate_descriptor_literal(p);

        p.print(
            "descriptor = com.google.protobuf.Descriptors.FileDescriptor\n\
             \x20 .internalBuildGeneratedFileFrom(descriptorData,\n\
             \x20     new com.google.protobuf.Descriptors.FileDescriptor[] {\n",
        );
        for dep in self.file.dependencies() {
            let dep_package = names::java_package(dep);
            let dep_outer = names::file_class_name(dep)?;
            let qualified = if dep_package.is_empty() {
                dep_outer
            } else {
                format!("{dep_package}.{dep_outer}")
            };
            p.print_with(
                &[("dep", &qualified)],
                "\x20     $dep$.getDescriptor(),\n",
            );
        }
        p.print("\x20   });\n");

        for message in &messages {
            let ident = message.full_name().replace('.', "_");
            let descriptor_expr = match message.containing_type() {
                Some(parent) => {
                    let parent_ident = parent.full_name().replace('.', "_");
                    let index = parent
                        .nested_types()
                        .position(|m| m == *message)
                        .expect("nested message in parent");
                    format!(
                        "internal_static_{parent_ident}_descriptor.getNestedTypes().get({index})"
                    )
                }
                None => {
                    let index = self
                        .file
                        .messages()
                        .position(|m| m == *message)
                        .expect("message in file");
                    format!("getDescriptor().getMessageTypes().get({index})")
                }
            };
            let field_names = self.accessor_field_names(*message);
            p.print_with(
                &[
                    ("ident", &ident),
                    ("descriptor_expr", &descriptor_expr),
                    ("field_names", &field_names),
                ],
                "internal_static_$ident$_descriptor =\n\
                 \x20 $descriptor_expr$;\n\
                 internal_static_$ident$_fieldAccessorTable = new\n\
                 \x20 com.google.protobuf.GeneratedMessageV3.FieldAccessorTable(\n\
                 \x20   internal_static_$ident$_descriptor,\n\
                 \x20   new java.lang.String[] { $field_names$});\n",
            );
        }
        p.outdent();
        p.print("}\n");
        Ok(())
    }

    /// Accessor-name array for the reflection table: capitalized field names
    /// followed by the camel-cased oneof names.
    fn accessor_field_names(&self, message: Descriptor<'a>) -> String {
        let infos = build_field_infos(message, &self.config.forbidden_field_names);
        let mut names: Vec<String> = infos
            .iter()
            .map(|info| format!("\"{}\", ", info.capitalized_name))
            .collect();
        names.extend(
            message
                .oneofs()
                .map(|o: OneofDescriptor<'a>| {
                    format!("\"{}\", ", names::underscores_to_camel_case(o.name(), true))
                }),
        );
        names.concat()
    }

    /// The encoded `FileDescriptorProto` as a Java string array, one element
    /// built from escaped chunks joined with `+`.
    fn generate_descriptor_literal(&self, p: &mut Printer) {
        let bytes = if self.options.strip_nonfunctional_codegen {
            Vec::new()
        } else {
            proto::strip_for_embedding(self.file.proto()).encode()
        };
        p.print("java.lang.String[] descriptorData = {\n");
        p.indent();
        let chunks: Vec<String> = bytes
            .chunks(DESCRIPTOR_CHUNK)
            .map(helpers::escape_java_bytes)
            .collect();
        if chunks.is_empty() {
            p.print("\"\"\n");
        } else {
            let literal = chunks
                .iter()
                .map(|chunk| format!("\"{chunk}\""))
                .join(" +\n");
            p.print_with(&[("literal", &literal)], "$literal$\n");
        }
        p.outdent();
        p.print("};\n");
    }
}

fn preorder_into<'a>(message: Descriptor<'a>, result: &mut Vec<Descriptor<'a>>) {
    result.push(message);
    for nested in message.nested_types() {
        preorder_into(nested, result);
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
                nested_type: vec![DescriptorProto {
                    name: "Line".to_string(),
                    field: vec![FieldDescriptorProto {
                        name: "sku".to_string(),
                        number: 1,
                        r#type: Type::String,
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn generate(file: &FileDescriptorProto) -> String {
        let mut pool = DescriptorPool::new();
        pool.add_file(file).unwrap();
        let fd = pool.file_by_name(&file.name).unwrap();
        let options = Options::default();
        let mut analyzer = SccAnalyzer::new();
        let generator = FileGenerator::new(fd, &options).unwrap();
        let mut printer = Printer::new();
        generator.generate(&mut printer, &mut analyzer).unwrap();
        printer.into_parts().0
    }

    #[test]
    fn outer_class_wraps_all_sections_in_order() {
        let out = generate(&sample_file());
        let package = out.find("package shop;").unwrap();
        // Derived name "Order" collides with the message, so the outer class
        // takes the suffixed form.
        let outer = out.find("public final class OrderOuterClass {").unwrap();
        let register = out.find("registerAllExtensions").unwrap();
        let enums = out.find("public enum Status").unwrap();
        let class = out.find("public static final class Order extends").unwrap();
        let statics = out
            .find("internal_static_shop_Order_descriptor;")
            .unwrap();
        let build = out.find("internalBuildGeneratedFileFrom").unwrap();
        let order = [package, outer, register, enums, class, statics, build];
        assert!(order.windows(2).all(|w| w[0] < w[1]), "{order:?}");
    }

    #[test]
    fn nested_descriptor_reaches_through_its_parent() {
        let out = generate(&sample_file());
        assert!(out.contains("internal_static_shop_Order_Line_descriptor ="));
        assert!(out.contains(
            "internal_static_shop_Order_descriptor.getNestedTypes().get(0);"
        ));
    }

    #[test]
    fn accessor_table_lists_capitalized_field_names() {
        let out = generate(&sample_file());
        assert!(out.contains("new java.lang.String[] { \"Id\", \"Status\", \"Tags\", }"));
    }

    #[test]
    fn descriptor_bytes_are_embedded_as_string_data() {
        let out = generate(&sample_file());
        assert!(out.contains("java.lang.String[] descriptorData = {"));
        assert!(out.contains("shop/order.proto"));
    }

    #[test]
    fn generation_is_deterministic() {
        let file = sample_file();
        assert_eq!(generate(&file), generate(&file));
    }
}
