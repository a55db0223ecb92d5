//! End-to-end runs of every back-end through the public entry point,
//! asserting output paths, cross-back-end consistency, and the properties
//! that hold for any schema: deterministic bytes and ascending field-number
//! serialization order.

use std::collections::BTreeMap;
use std::io;

use protoscribe::descriptor::DescriptorPool;
use protoscribe::options::{EnforceMode, Options};
use protoscribe::printer::Printer;
use protoscribe::proto::*;
use protoscribe::scc::SccAnalyzer;
use protoscribe::{cpp, flatten, java, Backend, GeneratorContext};

#[derive(Default)]
struct MemoryContext {
    files: BTreeMap<String, Vec<u8>>,
}

impl GeneratorContext for MemoryContext {
    fn write_file(&mut self, path: &str, contents: &[u8]) -> io::Result<()> {
        self.files.insert(path.to_string(), contents.to_vec());
        Ok(())
    }
}

impl MemoryContext {
    fn text(&self, path: &str) -> &str {
        std::str::from_utf8(self.files.get(path).unwrap_or_else(|| {
            panic!("missing output {path:?}, have {:?}", self.files.keys())
        }))
        .unwrap()
    }
}

fn tracker_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: "fleet/tracker.proto".to_string(),
        package: "fleet".to_string(),
        syntax: "proto2".to_string(),
        enum_type: vec![EnumDescriptorProto {
            name: "Engine".to_string(),
            value: vec![
                EnumValueDescriptorProto {
                    name: "ENGINE_DIESEL".to_string(),
                    number: 1,
                },
                EnumValueDescriptorProto {
                    name: "ENGINE_ELECTRIC".to_string(),
                    number: 2,
                },
            ],
            ..Default::default()
        }],
        message_type: vec![
            DescriptorProto {
                name: "Vehicle".to_string(),
                oneof_decl: vec![OneofDescriptorProto {
                    name: "ident".to_string(),
                }],
                field: vec![
                    FieldDescriptorProto {
                        name: "plate".to_string(),
                        number: 1,
                        label: Label::Required,
                        r#type: Type::String,
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "engine".to_string(),
                        number: 2,
                        label: Label::Optional,
                        r#type: Type::Enum,
                        type_name: ".fleet.Engine".to_string(),
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "vin".to_string(),
                        number: 3,
                        r#type: Type::String,
                        oneof_index: Some(0),
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "fleet_id".to_string(),
                        number: 4,
                        r#type: Type::Uint64,
                        oneof_index: Some(0),
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "trailer".to_string(),
                        number: 5,
                        label: Label::Optional,
                        r#type: Type::Message,
                        type_name: ".fleet.Vehicle".to_string(),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            },
            DescriptorProto {
                name: "Depot".to_string(),
                field: vec![FieldDescriptorProto {
                    name: "vehicles_by_plate".to_string(),
                    number: 1,
                    label: Label::Repeated,
                    r#type: Type::Message,
                    type_name: ".fleet.Depot.VehiclesByPlateEntry".to_string(),
                    ..Default::default()
                }],
                nested_type: vec![DescriptorProto {
                    name: "VehiclesByPlateEntry".to_string(),
                    field: vec![
                        FieldDescriptorProto {
                            name: "key".to_string(),
                            number: 1,
                            r#type: Type::String,
                            ..Default::default()
                        },
                        FieldDescriptorProto {
                            name: "value".to_string(),
                            number: 2,
                            r#type: Type::Message,
                            type_name: ".fleet.Vehicle".to_string(),
                            ..Default::default()
                        },
                    ],
                    options: Some(MessageOptions {
                        map_entry: true,
                        ..Default::default()
                    }),
                    ..Default::default()
                }],
                ..Default::default()
            },
        ],
        service: vec![ServiceDescriptorProto {
            name: "Dispatch".to_string(),
            method: vec![MethodDescriptorProto {
                name: "locate".to_string(),
                input_type: ".fleet.Vehicle".to_string(),
                output_type: ".fleet.Depot".to_string(),
                ..Default::default()
            }],
        }],
        ..Default::default()
    }
}

fn run(backend: Backend, options: &Options) -> MemoryContext {
    let proto = tracker_file();
    let mut pool = DescriptorPool::new();
    pool.add_file(&proto).unwrap();
    let fd = pool.file_by_name("fleet/tracker.proto").unwrap();
    let mut context = MemoryContext::default();
    protoscribe::generate(fd, backend, options, &mut context).unwrap();
    context
}

#[test]
fn cpp_backend_writes_header_and_source() {
    let out = run(Backend::Cpp, &Options::default());
    let header = out.text("fleet/tracker.pb.h");
    let source = out.text("fleet/tracker.pb.cc");
    assert!(header.contains("class Vehicle"));
    assert!(source.contains("descriptor_table_protodef_"));
}

#[test]
fn java_backend_writes_the_outer_class_file() {
    let out = run(Backend::Java, &Options::default());
    let java = out.text("fleet/Tracker.java");
    assert!(java.contains("public final class Tracker {"));
    assert!(java.contains("public static final class Vehicle extends"));
    assert!(java.contains("public static final class Depot extends"));
    assert!(java.contains("public enum Engine"));
    assert!(java.contains("public abstract static class Dispatch"));
}

#[test]
fn kotlin_backend_writes_the_dsl_file() {
    let out = run(Backend::Kotlin, &Options::default());
    let kt = out.text("fleet/TrackerKt.kt");
    assert!(kt.contains("public object VehicleKt {"));
    assert!(kt.contains("_builder.build()"));
}

#[test]
fn objc_backend_writes_the_header() {
    let out = run(Backend::ObjectiveC, &Options::default());
    let header = out.text("fleet/Tracker.pbobjc.h");
    assert!(header.contains("@interface Vehicle : GPBMessage"));
    assert!(header.contains("typedef GPB_ENUM(Engine) {"));
}

#[test]
fn oneof_members_share_one_case_field() {
    let out = run(Backend::Java, &Options::default());
    let java = out.text("fleet/Tracker.java");
    assert!(java.contains("public enum IdentCase"));
    assert!(java.contains("VIN(3),"));
    assert!(java.contains("FLEET_ID(4),"));
    assert!(java.contains("IDENT_NOT_SET(0);"));
}

#[test]
fn recursive_required_reference_recurses_in_is_initialized() {
    // Vehicle.trailer points back at Vehicle, whose SCC carries the
    // required plate field.
    let out = run(Backend::Java, &Options::default());
    let java = out.text("fleet/Tracker.java");
    assert!(java.contains("if (!hasPlate()) {"));
    assert!(java.contains("if (hasTrailer()) {"));
    assert!(java.contains("if (!getTrailer().isInitialized()) {"));
}

#[test]
fn map_field_uses_the_map_runtime() {
    let out = run(Backend::Java, &Options::default());
    let java = out.text("fleet/Tracker.java");
    assert!(java.contains("com.google.protobuf.MapField"));
    assert!(java.contains("VehiclesByPlateDefaultEntryHolder"));
    // Map entries never become Java classes of their own.
    assert!(!java.contains("class VehiclesByPlateEntry extends"));
}

#[test]
fn serialization_walks_fields_in_ascending_number_order() {
    let out = run(Backend::Java, &Options::default());
    let java = out.text("fleet/Tracker.java");
    let write_to = java.find("public void writeTo(").unwrap();
    let tail = &java[write_to..];
    let plate = tail.find("1, plate_").unwrap();
    let engine = tail.find("writeEnum(2,").unwrap();
    let trailer = tail.find("writeMessage(5,").unwrap();
    assert!(plate < engine && engine < trailer);
}

#[test]
fn lite_mode_omits_services() {
    let mut options = Options::default();
    options.enforce_mode = EnforceMode::LiteRuntime;
    let out = run(Backend::Java, &options);
    let java = out.text("fleet/Tracker.java");
    assert!(!java.contains("com.google.protobuf.Service"));
}

#[test]
fn annotate_code_adds_meta_sidecars_for_cpp() {
    let mut options = Options::default();
    options.annotate_code = true;
    let out = run(Backend::Cpp, &options);
    assert!(out.files.contains_key("fleet/tracker.pb.h.meta"));
    assert!(out.files.contains_key("fleet/tracker.pb.cc.meta"));
}

#[test]
fn conflicting_options_fail_before_any_output() {
    let proto = tracker_file();
    let mut pool = DescriptorPool::new();
    pool.add_file(&proto).unwrap();
    let fd = pool.file_by_name("fleet/tracker.proto").unwrap();
    let mut options = Options::default();
    options.lite_implicit_weak_fields = true;
    let mut context = MemoryContext::default();
    let result = protoscribe::generate(fd, Backend::Cpp, &options, &mut context);
    assert!(result.is_err());
    assert!(context.files.is_empty());
}

#[test]
fn analyzer_query_order_does_not_change_the_output() {
    let proto = tracker_file();
    let mut pool = DescriptorPool::new();
    pool.add_file(&proto).unwrap();
    let fd = pool.file_by_name("fleet/tracker.proto").unwrap();
    let options = Options::default();

    // Warm the analyzers back to front, so component ids are assigned in
    // the opposite order from the one generation visits messages in.
    let mut warmed = SccAnalyzer::new();
    for message in flatten::flatten_messages_in_file(fd).into_iter().rev() {
        warmed.get_scc_id(message);
    }
    let generator = cpp::FileGenerator::new(fd, &options, &mut warmed);
    let mut header = Printer::new();
    generator.generate_header(&mut header);
    let mut source = Printer::new();
    generator.generate_source(&mut source);

    let baseline = run(Backend::Cpp, &options);
    assert_eq!(header.into_parts().0, baseline.text("fleet/tracker.pb.h"));
    assert_eq!(source.into_parts().0, baseline.text("fleet/tracker.pb.cc"));

    let mut warmed = SccAnalyzer::new();
    for message in flatten::flatten_messages_in_file(fd).into_iter().rev() {
        warmed.get_scc_id(message);
    }
    let mut out = Printer::new();
    java::FileGenerator::new(fd, &options)
        .unwrap()
        .generate(&mut out, &mut warmed)
        .unwrap();

    let baseline = run(Backend::Java, &options);
    assert_eq!(out.into_parts().0, baseline.text("fleet/Tracker.java"));
}

#[test]
fn every_backend_is_deterministic() {
    for backend in [
        Backend::Cpp,
        Backend::Java,
        Backend::Kotlin,
        Backend::ObjectiveC,
    ] {
        let first = run(backend, &Options::default());
        let second = run(backend, &Options::default());
        assert_eq!(first.files, second.files, "{backend:?}");
    }
}
