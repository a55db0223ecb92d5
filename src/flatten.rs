//! Deterministic message flattening and cross-file dependency scanning.
//!
//! Flattening yields every message of a file in post-order (nested types
//! before their parent), so intra-file references always point backward in
//! the list and forward declarations can be emitted in one pass.

use itertools::Itertools;

use crate::descriptor::{CppType, Descriptor, FieldDescriptor, FileDescriptor};

/// All messages of `file`, nested types before their parent, siblings in
/// declaration order.
pub fn flatten_messages_in_file(file: FileDescriptor<'_>) -> Vec<Descriptor<'_>> {
    let mut result = Vec::new();
    for message in file.messages() {
        flatten_into(message, &mut result);
    }
    result
}

fn flatten_into<'a>(message: Descriptor<'a>, result: &mut Vec<Descriptor<'a>>) {
    for nested in message.nested_types() {
        flatten_into(nested, result);
    }
    result.push(message);
}

/// How a file import is bound in generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// Normal import: its reflection table is referenced and initialized
    /// before this file's.
    Strong,
    /// Late binding: forward declarations only, default instances through a
    /// weak symbol.
    Weak,
    /// Re-exported through the include graph; types defined there are
    /// visible without forward declarations.
    Public,
}

pub fn classify_dependency(file: FileDescriptor<'_>, dep: FileDescriptor<'_>) -> DependencyKind {
    if file.is_weak_dependency(dep) {
        DependencyKind::Weak
    } else if file.is_public_dependency(dep) {
        DependencyKind::Public
    } else {
        DependencyKind::Strong
    }
}

/// Cross-file references a file generator needs before emitting its source:
/// which default instances arrive through weak symbols and which dependency
/// reflection tables are strong vs weak. All lists sorted for determinism.
pub struct CrossFileReferences<'a> {
    pub weak_default_instances: Vec<Descriptor<'a>>,
    pub strong_reflection_files: Vec<FileDescriptor<'a>>,
    pub weak_reflection_files: Vec<FileDescriptor<'a>>,
}

/// True when the field's target message is bound through the weak-symbol
/// pattern: either the field opts in with `[weak = true]` or the defining
/// file is imported weakly.
pub fn is_implicit_weak_reference(
    file: FileDescriptor<'_>,
    field: FieldDescriptor<'_>,
) -> bool {
    if field.cpp_type() != CppType::Message {
        return false;
    }
    let Some(target) = field.message_type() else {
        return false;
    };
    if target.file().name() == file.name() {
        return false;
    }
    field.is_weak() || file.is_weak_dependency(target.file())
}

pub fn gather_cross_file_references(file: FileDescriptor<'_>) -> CrossFileReferences<'_> {
    let mut weak_default_instances = Vec::new();
    for message in flatten_messages_in_file(file) {
        for field in message.fields() {
            if is_implicit_weak_reference(file, field) {
                weak_default_instances.push(field.message_type().expect("message field"));
            }
        }
    }
    let weak_default_instances = weak_default_instances
        .into_iter()
        .sorted_by(|a, b| a.full_name().cmp(b.full_name()))
        .dedup_by(|a, b| a.full_name() == b.full_name())
        .collect();

    let mut strong_reflection_files = Vec::new();
    let mut weak_reflection_files = Vec::new();
    for dep in file.dependencies() {
        match classify_dependency(file, dep) {
            DependencyKind::Weak => weak_reflection_files.push(dep),
            DependencyKind::Strong | DependencyKind::Public => {
                strong_reflection_files.push(dep)
            }
        }
    }
    strong_reflection_files.sort_by(|a, b| a.name().cmp(b.name()));
    strong_reflection_files.dedup_by(|a, b| a.name() == b.name());
    weak_reflection_files.sort_by(|a, b| a.name().cmp(b.name()));
    weak_reflection_files.dedup_by(|a, b| a.name() == b.name());

    CrossFileReferences {
        weak_default_instances,
        strong_reflection_files,
        weak_reflection_files,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorPool;
    use crate::proto::*;

    #[test]
    fn flatten_is_post_order() {
        let file = FileDescriptorProto {
            name: "nest.proto".to_string(),
            package: "nest".to_string(),
            syntax: "proto3".to_string(),
            message_type: vec![
                DescriptorProto {
                    name: "A".to_string(),
                    nested_type: vec![DescriptorProto {
                        name: "B".to_string(),
                        nested_type: vec![DescriptorProto {
                            name: "C".to_string(),
                            ..Default::default()
                        }],
                        ..Default::default()
                    }],
                    ..Default::default()
                },
                DescriptorProto {
                    name: "D".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let mut pool = DescriptorPool::new();
        pool.add_file(&file).unwrap();
        let flattened = flatten_messages_in_file(pool.file_by_name("nest.proto").unwrap());
        let names: Vec<_> = flattened.iter().map(|m| m.full_name()).collect();
        assert_eq!(names, ["nest.A.B.C", "nest.A.B", "nest.A", "nest.D"]);
    }

    #[test]
    fn weak_dependency_references_are_gathered_sorted() {
        let dep = FileDescriptorProto {
            name: "weak_dep.proto".to_string(),
            package: "w".to_string(),
            syntax: "proto2".to_string(),
            message_type: vec![
                DescriptorProto {
                    name: "Zeta".to_string(),
                    ..Default::default()
                },
                DescriptorProto {
                    name: "Alpha".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let main = FileDescriptorProto {
            name: "main.proto".to_string(),
            package: "m".to_string(),
            syntax: "proto2".to_string(),
            dependency: vec!["weak_dep.proto".to_string()],
            weak_dependency: vec![0],
            message_type: vec![DescriptorProto {
                name: "M".to_string(),
                field: vec![
                    FieldDescriptorProto {
                        name: "z".to_string(),
                        number: 1,
                        r#type: Type::Message,
                        type_name: ".w.Zeta".to_string(),
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "a".to_string(),
                        number: 2,
                        r#type: Type::Message,
                        type_name: ".w.Alpha".to_string(),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut pool = DescriptorPool::new();
        pool.add_file(&dep).unwrap();
        pool.add_file(&main).unwrap();
        let main_file = pool.file_by_name("main.proto").unwrap();

        let refs = gather_cross_file_references(main_file);
        let names: Vec<_> = refs
            .weak_default_instances
            .iter()
            .map(|m| m.full_name())
            .collect();
        assert_eq!(names, ["w.Alpha", "w.Zeta"], "sorted by full name");
        assert!(refs.strong_reflection_files.is_empty());
        assert_eq!(refs.weak_reflection_files.len(), 1);
    }
}
