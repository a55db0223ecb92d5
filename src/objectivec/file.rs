//! Objective-C header emission.
//!
//! One `.pbobjc.h` per proto file: the root registry class, `GPB_ENUM`
//! typedefs, forward declarations, and a `GPBMessage` interface per message
//! with field-number enums and properties. Implementation files are the
//! runtime's concern; the header is what downstream code compiles against.

use log::debug;

use crate::descriptor::{CppType, Descriptor, EnumDescriptor, FieldDescriptor, FileDescriptor};
use crate::error::Result;
use crate::flatten;
use crate::options::Options;
use crate::printer::Printer;

use super::names;

pub struct FileGenerator<'a> {
    file: FileDescriptor<'a>,
    options: &'a Options,
}

impl<'a> FileGenerator<'a> {
    pub fn new(file: FileDescriptor<'a>, options: &'a Options) -> FileGenerator<'a> {
        FileGenerator { file, options }
    }

    fn flattened(&self) -> Vec<Descriptor<'a>> {
        flatten::flatten_messages_in_file(self.file)
            .into_iter()
            .filter(|m| !m.is_map_entry())
            .collect()
    }

    fn all_enums(&self) -> Vec<EnumDescriptor<'a>> {
        let mut enums: Vec<EnumDescriptor<'a>> = self.file.enums().collect();
        for message in self.flattened() {
            enums.extend(message.nested_enums());
        }
        enums
    }

    pub fn generate_header(&self, p: &mut Printer) -> Result<()> {
        debug!("generating Objective-C header for {}", self.file.name());
        if !self.options.strip_nonfunctional_codegen {
            p.print_with(
                &[("file", self.file.name())],
                "// Generated by the protocol buffer compiler. DO NOT EDIT!\n\
                 // source: $file$\n\n",
            );
        }
        p.print(
            "#import \"GPBProtocolBuffers.h\"\n\n\
             #if GOOGLE_PROTOBUF_OBJC_VERSION < 30004\n\
             #error This file was generated by a newer version of protoc.\n\
             #endif\n\n",
        );
        for dep in self.file.dependencies() {
            p.print_with(
                &[("header", &names::header_path(dep))],
                "#import \"$header$\"\n",
            );
        }

        p.print("\nCF_EXTERN_C_BEGIN\n\n");
        self.generate_forward_declarations(p);
        p.print("NS_ASSUME_NONNULL_BEGIN\n\n");

        for enumeration in self.all_enums() {
            self.generate_enum(p, enumeration);
        }

        self.generate_root_class(p);

        for message in self.flattened() {
            self.generate_message_interface(p, message)?;
        }

        p.print(
            "NS_ASSUME_NONNULL_END\n\n\
             CF_EXTERN_C_END\n",
        );
        Ok(())
    }

    /// `@class` lines for every message class this header mentions,
    /// including classes from imported files used as field types.
    fn generate_forward_declarations(&self, p: &mut Printer) {
        let mut classes: Vec<String> = Vec::new();
        for message in self.flattened() {
            for field in message.fields() {
                if field.cpp_type() == CppType::Message && !field.is_map() {
                    let target = field.message_type().expect("message field");
                    if !target.is_map_entry() {
                        classes.push(names::class_name(target));
                    }
                }
            }
        }
        classes.sort();
        classes.dedup();
        if classes.is_empty() {
            return;
        }
        for class in &classes {
            p.print_with(&[("class", class)], "@class $class$;\n");
        }
        p.print("\n");
    }

    fn generate_enum(&self, p: &mut Printer, enumeration: EnumDescriptor<'a>) {
        let name = names::enum_name(enumeration);
        p.print_with(
            &[("name", &name)],
            "typedef GPB_ENUM($name$) {\n",
        );
        p.indent();
        if !enumeration.is_closed() {
            p.print_with(
                &[("name", &name)],
                "/// Value used if any message's field encounters a value that\n\
                 /// is not defined by this enum. The message will also have\n\
                 /// C functions to get/set the rawValue of the field.\n\
                 $name$_GPBUnrecognizedEnumeratorValue = kGPBUnrecognizedEnumeratorValue,\n",
            );
        }
        for value in enumeration.values() {
            p.print_with(
                &[
                    ("value", &names::enum_value_name(enumeration, value)),
                    ("number", &value.number().to_string()),
                ],
                "$value$ = $number$,\n",
            );
        }
        p.outdent();
        p.print("};\n\n");
        p.print_with(
            &[("name", &name)],
            "GPBEnumDescriptor *$name$_EnumDescriptor(void);\n\n\
             BOOL $name$_IsValidValue(int32_t value);\n\n",
        );
    }

    fn generate_root_class(&self, p: &mut Printer) {
        p.print_with(
            &[("root", &names::root_class_name(self.file))],
            "#pragma mark - $root$\n\n\
             /// Exposes the extension registry for this file.\n\
             GPB_FINAL @interface $root$ : GPBRootObject\n\
             @end\n\n",
        );
    }

    fn generate_message_interface(&self, p: &mut Printer, message: Descriptor<'a>) -> Result<()> {
        let class = names::class_name(message);

        // Field number enum.
        if message.field_count() > 0 {
            p.print_with(
                &[("class", &class)],
                "typedef GPB_ENUM($class$_FieldNumber) {\n",
            );
            p.indent();
            for field in message.fields() {
                p.print_with(
                    &[
                        ("class", &class),
                        ("cap", &names::capitalized_field_name(field)),
                        ("number", &field.number().to_string()),
                    ],
                    "$class$_FieldNumber_$cap$ = $number$,\n",
                );
            }
            p.outdent();
            p.print("};\n\n");
        }

        p.print_with(
            &[("class", &class)],
            "#pragma mark - $class$\n\n\
             GPB_FINAL @interface $class$ : GPBMessage\n\n",
        );
        for field in message.fields() {
            self.generate_property(p, field)?;
        }
        p.print("@end\n\n");
        Ok(())
    }

    fn generate_property(&self, p: &mut Printer, field: FieldDescriptor<'_>) -> Result<()> {
        let name = names::field_name(field);
        let cap = names::capitalized_field_name(field);
        if field.is_map() {
            let entry = field.message_type().expect("map field");
            let container = map_container_type(entry.map_key(), entry.map_value());
            p.print_with(
                &[("type", &container), ("name", &name), ("cap", &cap)],
                "@property(nonatomic, readwrite, strong, null_resettable) $type$ *$name$;\n\
                 /// The number of items in @c $name$ without causing the container to be created.\n\
                 @property(nonatomic, readonly) NSUInteger $name$_Count;\n\n",
            );
        } else if field.is_repeated() {
            let (container, suffix) = repeated_container_type(field);
            p.print_with(
                &[
                    ("type", &container),
                    ("generic", &suffix),
                    ("name", &name),
                    ("cap", &cap),
                ],
                "@property(nonatomic, readwrite, strong, null_resettable) $type$$generic$ *$name$Array;\n\
                 /// The number of items in @c $name$Array without causing the container to be created.\n\
                 @property(nonatomic, readonly) NSUInteger $name$Array_Count;\n\n",
            );
        } else {
            let (attrs, ctype) = scalar_property_type(field);
            p.print_with(
                &[("attrs", &attrs), ("type", &ctype), ("name", &name)],
                "@property(nonatomic, readwrite$attrs$) $type$$name$;\n",
            );
            if field.has_presence() {
                p.print_with(
                    &[("cap", &cap)],
                    "/// Test to see if @c $cap$ has been set.\n\
                     @property(nonatomic, readwrite) BOOL has$cap$;\n",
                );
            }
            p.print("\n");
        }
        Ok(())
    }
}

/// Attribute tail and C type of a singular property; object types carry
/// their pointer star so the name concatenates cleanly.
fn scalar_property_type(field: FieldDescriptor<'_>) -> (String, String) {
    match field.cpp_type() {
        CppType::Int32 => (String::new(), "int32_t ".to_string()),
        CppType::Int64 => (String::new(), "int64_t ".to_string()),
        CppType::UInt32 => (String::new(), "uint32_t ".to_string()),
        CppType::UInt64 => (String::new(), "uint64_t ".to_string()),
        CppType::Float => (String::new(), "float ".to_string()),
        CppType::Double => (String::new(), "double ".to_string()),
        CppType::Bool => (String::new(), "BOOL ".to_string()),
        CppType::String => (
            ", copy, null_resettable".to_string(),
            "NSString *".to_string(),
        ),
        CppType::Bytes => (
            ", copy, null_resettable".to_string(),
            "NSData *".to_string(),
        ),
        CppType::Enum => (
            String::new(),
            format!("{} ", names::enum_name(field.enum_type().expect("enum field"))),
        ),
        CppType::Message => (
            ", strong, null_resettable".to_string(),
            format!(
                "{} *",
                names::class_name(field.message_type().expect("message field"))
            ),
        ),
    }
}

/// Container class of a repeated field; scalar elements use the GPB typed
/// arrays, objects use a generic `NSMutableArray`.
fn repeated_container_type(field: FieldDescriptor<'_>) -> (String, String) {
    match field.cpp_type() {
        CppType::Int32 => ("GPBInt32Array".to_string(), String::new()),
        CppType::Int64 => ("GPBInt64Array".to_string(), String::new()),
        CppType::UInt32 => ("GPBUInt32Array".to_string(), String::new()),
        CppType::UInt64 => ("GPBUInt64Array".to_string(), String::new()),
        CppType::Float => ("GPBFloatArray".to_string(), String::new()),
        CppType::Double => ("GPBDoubleArray".to_string(), String::new()),
        CppType::Bool => ("GPBBoolArray".to_string(), String::new()),
        CppType::Enum => ("GPBEnumArray".to_string(), String::new()),
        CppType::String => (
            "NSMutableArray".to_string(),
            "<NSString*>".to_string(),
        ),
        CppType::Bytes => ("NSMutableArray".to_string(), "<NSData*>".to_string()),
        CppType::Message => (
            "NSMutableArray".to_string(),
            format!(
                "<{}*>",
                names::class_name(field.message_type().expect("message field"))
            ),
        ),
    }
}

fn map_container_type(key: FieldDescriptor<'_>, value: FieldDescriptor<'_>) -> String {
    let key_part = match key.cpp_type() {
        CppType::Int32 => "Int32",
        CppType::Int64 => "Int64",
        CppType::UInt32 => "UInt32",
        CppType::UInt64 => "UInt64",
        CppType::Bool => "Bool",
        CppType::String => "String",
        _ => "String",
    };
    match value.cpp_type() {
        CppType::Int32 => format!("GPB{key_part}Int32Dictionary"),
        CppType::Int64 => format!("GPB{key_part}Int64Dictionary"),
        CppType::UInt32 => format!("GPB{key_part}UInt32Dictionary"),
        CppType::UInt64 => format!("GPB{key_part}UInt64Dictionary"),
        CppType::Float => format!("GPB{key_part}FloatDictionary"),
        CppType::Double => format!("GPB{key_part}DoubleDictionary"),
        CppType::Bool => format!("GPB{key_part}BoolDictionary"),
        CppType::Enum => format!("GPB{key_part}EnumDictionary"),
        CppType::String if key.cpp_type() == CppType::String => {
            "NSMutableDictionary<NSString*, NSString*>".to_string()
        }
        CppType::String => format!("GPB{key_part}ObjectDictionary<NSString*>"),
        CppType::Bytes if key.cpp_type() == CppType::String => {
            "NSMutableDictionary<NSString*, NSData*>".to_string()
        }
        CppType::Bytes => format!("GPB{key_part}ObjectDictionary<NSData*>"),
        CppType::Message => {
            let class = names::class_name(value.message_type().expect("message field"));
            if key.cpp_type() == CppType::String {
                format!("NSMutableDictionary<NSString*, {class}*>")
            } else {
                format!("GPB{key_part}ObjectDictionary<{class}*>")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorPool;
    use crate::printer::Printer;
    use crate::proto::*;

    fn sample_file() -> FileDescriptorProto {
        FileDescriptorProto {
            name: "zoo/habitat.proto".to_string(),
            package: "zoo".to_string(),
            syntax: "proto3".to_string(),
            options: Some(FileOptions {
                objc_class_prefix: "ZOO".to_string(),
                ..Default::default()
            }),
            enum_type: vec![EnumDescriptorProto {
                name: "Climate".to_string(),
                value: vec![
                    EnumValueDescriptorProto {
                        name: "CLIMATE_UNSPECIFIED".to_string(),
                        number: 0,
                    },
                    EnumValueDescriptorProto {
                        name: "CLIMATE_ARID".to_string(),
                        number: 1,
                    },
                ],
                ..Default::default()
            }],
            message_type: vec![DescriptorProto {
                name: "Habitat".to_string(),
                field: vec![
                    FieldDescriptorProto {
                        name: "name".to_string(),
                        number: 1,
                        r#type: Type::String,
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "climate".to_string(),
                        number: 2,
                        r#type: Type::Enum,
                        type_name: ".zoo.Climate".to_string(),
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "sizes".to_string(),
                        number: 3,
                        label: Label::Repeated,
                        r#type: Type::Int32,
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn render() -> String {
        let mut pool = DescriptorPool::new();
        pool.add_file(&sample_file()).unwrap();
        let fd = pool.file_by_name("zoo/habitat.proto").unwrap();
        let options = Options::default();
        let mut printer = Printer::new();
        FileGenerator::new(fd, &options)
            .generate_header(&mut printer)
            .unwrap();
        printer.into_parts().0
    }

    #[test]
    fn header_declares_root_enums_and_interfaces() {
        let out = render();
        assert!(out.contains("GPB_FINAL @interface ZOOHabitatRoot : GPBRootObject"));
        assert!(out.contains("typedef GPB_ENUM(ZOOClimate) {"));
        assert!(out.contains("ZOOClimate_Unspecified = 0,"));
        assert!(out.contains("GPB_FINAL @interface ZOOHabitat : GPBMessage"));
    }

    #[test]
    fn open_enum_carries_the_unrecognized_enumerator() {
        let out = render();
        assert!(out.contains(
            "ZOOClimate_GPBUnrecognizedEnumeratorValue = kGPBUnrecognizedEnumeratorValue,"
        ));
    }

    #[test]
    fn properties_match_field_shapes() {
        let out = render();
        assert!(out.contains(
            "@property(nonatomic, readwrite, copy, null_resettable) NSString *name;"
        ));
        assert!(out.contains("@property(nonatomic, readwrite) ZOOClimate climate;"));
        assert!(out.contains(
            "@property(nonatomic, readwrite, strong, null_resettable) GPBInt32Array *sizesArray;"
        ));
        assert!(out.contains("NSUInteger sizesArray_Count;"));
    }

    #[test]
    fn field_number_enum_lists_every_field() {
        let out = render();
        assert!(out.contains("typedef GPB_ENUM(ZOOHabitat_FieldNumber) {"));
        assert!(out.contains("ZOOHabitat_FieldNumber_Climate = 2,"));
    }
}
