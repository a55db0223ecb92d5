//! Linked descriptor pool.
//!
//! The pool consumes plain-data descriptor protos (see [`crate::proto`]) and
//! links them into index-based storage: every message, field, enum, oneof,
//! service and method gets a slot in a flat `Vec`, and cross references
//! (field → message type, extension → extendee, method → request/response)
//! are stored as indices. Handles are `Copy` borrows into the pool exposing
//! the accessor surface the back-ends consume; they never outlive the pool.
//!
//! Linking is two-pass: the first pass registers every symbol by full name,
//! the second resolves `type_name` references. Dependencies must be added to
//! the pool before their dependents.

use std::collections::HashMap;

use crate::error::{GenerateError, Result};
use crate::proto::{
    self, CType, DescriptorProto, EnumDescriptorProto, ExtensionRange, FieldDescriptorProto,
    FileDescriptorProto, Label, ServiceDescriptorProto, Type,
};

/// File syntax level. Editions collapse onto these two semantic baselines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edition {
    Proto2,
    Proto3,
}

/// Storage category of a field, the axis field generators dispatch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CppType {
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float,
    Double,
    Bool,
    Enum,
    String,
    Bytes,
    Message,
}

/// Proto wire types, as encoded in the low bits of a tag.
pub mod wire_type {
    pub const VARINT: u32 = 0;
    pub const FIXED64: u32 = 1;
    pub const LENGTH_DELIMITED: u32 = 2;
    pub const START_GROUP: u32 = 3;
    pub const END_GROUP: u32 = 4;
    pub const FIXED32: u32 = 5;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Symbol {
    Message(usize),
    Enum(usize),
}

#[derive(Debug)]
struct FileData {
    proto: FileDescriptorProto,
    edition: Edition,
    /// Resolved indices into `pool.files`, parallel to `proto.dependency`.
    dependencies: Vec<usize>,
    messages: Vec<usize>,
    enums: Vec<usize>,
    services: Vec<usize>,
    extensions: Vec<usize>,
}

#[derive(Debug)]
struct MessageData {
    name: String,
    full_name: String,
    file: usize,
    containing_type: Option<usize>,
    /// Path through SourceCodeInfo numbering, e.g. [4, 0] for the first
    /// top-level message.
    path: Vec<i32>,
    fields: Vec<usize>,
    oneofs: Vec<usize>,
    nested_types: Vec<usize>,
    nested_enums: Vec<usize>,
    extension_ranges: Vec<ExtensionRange>,
    extensions: Vec<usize>,
    is_map_entry: bool,
}

#[derive(Debug)]
struct FieldData {
    name: String,
    full_name: String,
    number: i32,
    label: Label,
    proto_type: Type,
    file: usize,
    /// Message the field belongs to (for extensions: the extendee).
    containing_type: Option<usize>,
    /// Message or enum the field points at, resolved in pass two.
    message_type: Option<usize>,
    enum_type: Option<usize>,
    oneof: Option<usize>,
    is_extension: bool,
    /// Index within the containing message (or file extension list).
    index: usize,
    path: Vec<i32>,
    default_value: String,
    json_name: String,
    options: proto::FieldOptions,
    proto3_optional: bool,
}

#[derive(Debug)]
struct OneofData {
    name: String,
    full_name: String,
    containing_type: usize,
    fields: Vec<usize>,
    index: usize,
}

#[derive(Debug)]
struct EnumData {
    name: String,
    full_name: String,
    file: usize,
    containing_type: Option<usize>,
    path: Vec<i32>,
    values: Vec<usize>,
}

#[derive(Debug)]
struct EnumValueData {
    name: String,
    full_name: String,
    number: i32,
    enum_index: usize,
    index: usize,
}

#[derive(Debug)]
struct ServiceData {
    name: String,
    full_name: String,
    file: usize,
    methods: Vec<usize>,
    index: usize,
    path: Vec<i32>,
}

#[derive(Debug)]
struct MethodData {
    name: String,
    full_name: String,
    service: usize,
    input_type: usize,
    output_type: usize,
    client_streaming: bool,
    server_streaming: bool,
    index: usize,
}

/// Owns every linked descriptor. Read-only once built.
#[derive(Default)]
pub struct DescriptorPool {
    files: Vec<FileData>,
    messages: Vec<MessageData>,
    fields: Vec<FieldData>,
    oneofs: Vec<OneofData>,
    enums: Vec<EnumData>,
    enum_values: Vec<EnumValueData>,
    services: Vec<ServiceData>,
    methods: Vec<MethodData>,
    symbols: HashMap<String, Symbol>,
    files_by_name: HashMap<String, usize>,
    // Scratch between linking passes of the file currently being added.
    pending: Vec<Pending>,
    pending_methods: Vec<PendingMethod>,
    resolved: Vec<Pending>,
}

impl DescriptorPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link one file into the pool. Dependencies must already be present.
    pub fn add_file(&mut self, proto: &FileDescriptorProto) -> Result<FileDescriptor<'_>> {
        if self.files_by_name.contains_key(&proto.name) {
            return Err(GenerateError::PoolLink(format!(
                "file {:?} added twice",
                proto.name
            )));
        }
        let edition = match proto.syntax.as_str() {
            "" | "proto2" => Edition::Proto2,
            "proto3" => Edition::Proto3,
            other => {
                return Err(GenerateError::PoolLink(format!(
                    "{}: unknown syntax {other:?}",
                    proto.name
                )));
            }
        };
        let mut dependencies = Vec::with_capacity(proto.dependency.len());
        for dep in &proto.dependency {
            let index = self.files_by_name.get(dep).copied().ok_or_else(|| {
                GenerateError::PoolLink(format!(
                    "{}: dependency {dep:?} not in pool",
                    proto.name
                ))
            })?;
            dependencies.push(index);
        }

        let file_index = self.files.len();
        self.files.push(FileData {
            proto: proto.clone(),
            edition,
            dependencies,
            messages: Vec::new(),
            enums: Vec::new(),
            services: Vec::new(),
            extensions: Vec::new(),
        });
        self.files_by_name.insert(proto.name.clone(), file_index);

        let package = proto.package.clone();
        let first_pass_start = self.fields.len();

        // Pass one: register symbols and allocate slots.
        for (i, message) in proto.message_type.iter().enumerate() {
            let index =
                self.register_message(message, file_index, None, &package, vec![4, i as i32])?;
            self.files[file_index].messages.push(index);
        }
        for (i, enumeration) in proto.enum_type.iter().enumerate() {
            let index =
                self.register_enum(enumeration, file_index, None, &package, vec![5, i as i32])?;
            self.files[file_index].enums.push(index);
        }
        for (i, extension) in proto.extension.iter().enumerate() {
            let index = self.register_field(
                extension,
                file_index,
                None,
                &package,
                i,
                vec![7, i as i32],
            )?;
            self.files[file_index].extensions.push(index);
        }
        for (i, service) in proto.service.iter().enumerate() {
            let full_name = join_names(&package, &service.name);
            let service_index = self.services.len();
            self.services.push(ServiceData {
                name: service.name.clone(),
                full_name,
                file: file_index,
                methods: Vec::new(),
                index: i,
                path: vec![6, i as i32],
            });
            self.files[file_index].services.push(service_index);
            self.register_methods(service, service_index)?;
        }

        // Pass two: resolve type references for everything this file added.
        self.resolve_fields(first_pass_start)?;
        self.resolve_methods(file_index)?;
        self.link_oneof_members(file_index)?;
        self.validate_map_entries(file_index)?;

        Ok(FileDescriptor {
            pool: self,
            index: file_index,
        })
    }

    pub fn file_by_name(&self, name: &str) -> Option<FileDescriptor<'_>> {
        self.files_by_name.get(name).map(|&index| FileDescriptor {
            pool: self,
            index,
        })
    }

    pub fn message_by_name(&self, full_name: &str) -> Option<Descriptor<'_>> {
        match self.symbols.get(full_name) {
            Some(&Symbol::Message(index)) => Some(Descriptor { pool: self, index }),
            _ => None,
        }
    }

    pub fn enum_by_name(&self, full_name: &str) -> Option<EnumDescriptor<'_>> {
        match self.symbols.get(full_name) {
            Some(&Symbol::Enum(index)) => Some(EnumDescriptor { pool: self, index }),
            _ => None,
        }
    }

    fn register_message(
        &mut self,
        proto: &DescriptorProto,
        file: usize,
        containing_type: Option<usize>,
        scope: &str,
        path: Vec<i32>,
    ) -> Result<usize> {
        let full_name = join_names(scope, &proto.name);
        let message_index = self.messages.len();
        self.insert_symbol(&full_name, Symbol::Message(message_index), file)?;
        self.messages.push(MessageData {
            name: proto.name.clone(),
            full_name: full_name.clone(),
            file,
            containing_type,
            path: path.clone(),
            fields: Vec::new(),
            oneofs: Vec::new(),
            nested_types: Vec::new(),
            nested_enums: Vec::new(),
            extension_ranges: proto.extension_range.clone(),
            extensions: Vec::new(),
            is_map_entry: proto.options.as_ref().is_some_and(|o| o.map_entry),
        });

        for (i, oneof) in proto.oneof_decl.iter().enumerate() {
            let oneof_index = self.oneofs.len();
            self.oneofs.push(OneofData {
                name: oneof.name.clone(),
                full_name: format!("{full_name}.{}", oneof.name),
                containing_type: message_index,
                fields: Vec::new(),
                index: i,
            });
            self.messages[message_index].oneofs.push(oneof_index);
        }
        for (i, field) in proto.field.iter().enumerate() {
            let mut field_path = path.clone();
            field_path.extend([2, i as i32]);
            let index =
                self.register_field(field, file, Some(message_index), &full_name, i, field_path)?;
            self.messages[message_index].fields.push(index);
        }
        for (i, nested) in proto.nested_type.iter().enumerate() {
            let mut nested_path = path.clone();
            nested_path.extend([3, i as i32]);
            let index =
                self.register_message(nested, file, Some(message_index), &full_name, nested_path)?;
            self.messages[message_index].nested_types.push(index);
        }
        for (i, nested_enum) in proto.enum_type.iter().enumerate() {
            let mut enum_path = path.clone();
            enum_path.extend([4, i as i32]);
            let index = self.register_enum(
                nested_enum,
                file,
                Some(message_index),
                &full_name,
                enum_path,
            )?;
            self.messages[message_index].nested_enums.push(index);
        }
        for (i, extension) in proto.extension.iter().enumerate() {
            let mut ext_path = path.clone();
            ext_path.extend([6, i as i32]);
            let index = self.register_field(extension, file, None, &full_name, i, ext_path)?;
            self.messages[message_index].extensions.push(index);
        }
        Ok(message_index)
    }

    fn register_field(
        &mut self,
        proto: &FieldDescriptorProto,
        file: usize,
        containing_type: Option<usize>,
        scope: &str,
        index: usize,
        path: Vec<i32>,
    ) -> Result<usize> {
        if proto.number <= 0 {
            return Err(GenerateError::PoolLink(format!(
                "{scope}.{}: invalid field number {}",
                proto.name, proto.number
            )));
        }
        let field_index = self.fields.len();
        let json_name = if proto.json_name.is_empty() {
            proto::camel_case_json_name(&proto.name)
        } else {
            proto.json_name.clone()
        };
        self.fields.push(FieldData {
            name: proto.name.clone(),
            full_name: join_names(scope, &proto.name),
            number: proto.number,
            label: proto.label,
            proto_type: proto.r#type,
            file,
            containing_type,
            message_type: None,
            enum_type: None,
            oneof: None,
            is_extension: !proto.extendee.is_empty(),
            index,
            path,
            default_value: proto.default_value.clone(),
            json_name,
            options: proto.options.clone().unwrap_or_default(),
            proto3_optional: proto.proto3_optional,
        });
        // Stash the unresolved names for pass two, keyed by slot.
        self.pending.push(Pending {
            field: field_index,
            type_name: proto.type_name.clone(),
            extendee: proto.extendee.clone(),
            oneof_index: proto.oneof_index,
        });
        Ok(field_index)
    }

    fn register_enum(
        &mut self,
        proto: &EnumDescriptorProto,
        file: usize,
        containing_type: Option<usize>,
        scope: &str,
        path: Vec<i32>,
    ) -> Result<usize> {
        if proto.value.is_empty() {
            return Err(GenerateError::PoolLink(format!(
                "{scope}.{}: enums must have at least one value",
                proto.name
            )));
        }
        let full_name = join_names(scope, &proto.name);
        let enum_index = self.enums.len();
        self.insert_symbol(&full_name, Symbol::Enum(enum_index), file)?;
        self.enums.push(EnumData {
            name: proto.name.clone(),
            full_name: full_name.clone(),
            file,
            containing_type,
            path,
            values: Vec::new(),
        });
        for (i, value) in proto.value.iter().enumerate() {
            let value_index = self.enum_values.len();
            self.enum_values.push(EnumValueData {
                name: value.name.clone(),
                // Enum value names scope to the enum's parent, per proto
                // C++-style scoping rules.
                full_name: join_names(scope, &value.name),
                number: value.number,
                enum_index,
                index: i,
            });
            self.enums[enum_index].values.push(value_index);
        }
        Ok(enum_index)
    }

    fn register_methods(&mut self, proto: &ServiceDescriptorProto, service: usize) -> Result<()> {
        for (i, method) in proto.method.iter().enumerate() {
            let method_index = self.methods.len();
            self.methods.push(MethodData {
                name: method.name.clone(),
                full_name: format!("{}.{}", self.services[service].full_name, method.name),
                service,
                input_type: usize::MAX,
                output_type: usize::MAX,
                client_streaming: method.client_streaming,
                server_streaming: method.server_streaming,
                index: i,
            });
            self.services[service].methods.push(method_index);
            self.pending_methods.push(PendingMethod {
                method: method_index,
                input_type: method.input_type.clone(),
                output_type: method.output_type.clone(),
            });
        }
        Ok(())
    }

    fn insert_symbol(&mut self, full_name: &str, symbol: Symbol, file: usize) -> Result<()> {
        if self.symbols.insert(full_name.to_string(), symbol).is_some() {
            return Err(GenerateError::PoolLink(format!(
                "{}: symbol {full_name:?} defined twice",
                self.files[file].proto.name
            )));
        }
        Ok(())
    }

    fn lookup_message(&self, reference: &str, context: &str) -> Result<usize> {
        match self.symbols.get(reference.trim_start_matches('.')) {
            Some(&Symbol::Message(index)) => Ok(index),
            Some(&Symbol::Enum(_)) => Err(GenerateError::PoolLink(format!(
                "{context}: {reference:?} is an enum, expected a message"
            ))),
            None => Err(GenerateError::PoolLink(format!(
                "{context}: unresolved type {reference:?}"
            ))),
        }
    }

    fn resolve_fields(&mut self, _start: usize) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        for entry in &pending {
            let context = self.fields[entry.field].full_name.clone();
            match self.fields[entry.field].proto_type {
                Type::Message | Type::Group => {
                    let index = self.lookup_message(&entry.type_name, &context)?;
                    self.fields[entry.field].message_type = Some(index);
                }
                Type::Enum => {
                    let reference = entry.type_name.trim_start_matches('.');
                    match self.symbols.get(reference) {
                        Some(&Symbol::Enum(index)) => {
                            self.fields[entry.field].enum_type = Some(index);
                        }
                        _ => {
                            return Err(GenerateError::PoolLink(format!(
                                "{context}: unresolved enum type {:?}",
                                entry.type_name
                            )));
                        }
                    }
                }
                _ => {}
            }
            if !entry.extendee.is_empty() {
                let extendee = self.lookup_message(&entry.extendee, &context)?;
                let number = self.fields[entry.field].number;
                let in_range = self.messages[extendee]
                    .extension_ranges
                    .iter()
                    .any(|r| r.start <= number && number < r.end);
                if !in_range {
                    return Err(GenerateError::PoolLink(format!(
                        "{context}: number {number} is not in an extension range of {}",
                        self.messages[extendee].full_name
                    )));
                }
                self.fields[entry.field].containing_type = Some(extendee);
            }
        }
        // Keep oneof indices for the membership pass.
        self.resolved = pending;
        Ok(())
    }

    fn resolve_methods(&mut self, _file: usize) -> Result<()> {
        let pending = std::mem::take(&mut self.pending_methods);
        for entry in pending {
            let context = self.methods[entry.method].full_name.clone();
            self.methods[entry.method].input_type =
                self.lookup_message(&entry.input_type, &context)?;
            self.methods[entry.method].output_type =
                self.lookup_message(&entry.output_type, &context)?;
        }
        Ok(())
    }

    fn link_oneof_members(&mut self, _file: usize) -> Result<()> {
        let resolved = std::mem::take(&mut self.resolved);
        for entry in resolved {
            let Some(oneof_index) = entry.oneof_index else {
                continue;
            };
            let field = entry.field;
            let Some(message) = self.fields[field].containing_type else {
                return Err(GenerateError::PoolLink(format!(
                    "{}: extension cannot be a oneof member",
                    self.fields[field].full_name
                )));
            };
            let oneofs = &self.messages[message].oneofs;
            let Some(&oneof) = oneofs.get(oneof_index as usize) else {
                return Err(GenerateError::PoolLink(format!(
                    "{}: oneof index {oneof_index} out of range",
                    self.fields[field].full_name
                )));
            };
            self.fields[field].oneof = Some(oneof);
            self.oneofs[oneof].fields.push(field);
        }
        Ok(())
    }

    fn validate_map_entries(&mut self, file: usize) -> Result<()> {
        let file_name = self.files[file].proto.name.clone();
        for index in 0..self.messages.len() {
            if self.messages[index].file != file || !self.messages[index].is_map_entry {
                continue;
            }
            let data = &self.messages[index];
            let ok = data.fields.len() == 2
                && self.fields[data.fields[0]].number == 1
                && self.fields[data.fields[1]].number == 2;
            if !ok {
                return Err(GenerateError::PoolLink(format!(
                    "{file_name}: {} is not a valid map entry",
                    data.full_name
                )));
            }
        }
        Ok(())
    }
}

// Scratch space used between linking passes.
#[derive(Debug)]
struct Pending {
    field: usize,
    type_name: String,
    extendee: String,
    oneof_index: Option<i32>,
}

#[derive(Debug)]
struct PendingMethod {
    method: usize,
    input_type: String,
    output_type: String,
}

fn join_names(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}.{name}")
    }
}

macro_rules! handle {
    ($name:ident) => {
        #[derive(Clone, Copy)]
        pub struct $name<'a> {
            pool: &'a DescriptorPool,
            index: usize,
        }

        impl PartialEq for $name<'_> {
            fn eq(&self, other: &Self) -> bool {
                std::ptr::eq(self.pool, other.pool) && self.index == other.index
            }
        }
        impl Eq for $name<'_> {}

        impl std::hash::Hash for $name<'_> {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.index.hash(state);
            }
        }

        impl std::fmt::Debug for $name<'_> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("index", &self.index)
                    .finish()
            }
        }
    };
}

handle!(FileDescriptor);
handle!(Descriptor);
handle!(FieldDescriptor);
handle!(OneofDescriptor);
handle!(EnumDescriptor);
handle!(EnumValueDescriptor);
handle!(ServiceDescriptor);
handle!(MethodDescriptor);

impl<'a> FileDescriptor<'a> {
    pub fn name(&self) -> &'a str {
        &self.pool.files[self.index].proto.name
    }

    pub fn package(&self) -> &'a str {
        &self.pool.files[self.index].proto.package
    }

    pub fn edition(&self) -> Edition {
        self.pool.files[self.index].edition
    }

    pub fn proto(&self) -> &'a FileDescriptorProto {
        &self.pool.files[self.index].proto
    }

    pub fn options(&self) -> Option<&'a proto::FileOptions> {
        self.pool.files[self.index].proto.options.as_ref()
    }

    pub fn messages(&self) -> impl Iterator<Item = Descriptor<'a>> + '_ {
        self.pool.files[self.index]
            .messages
            .iter()
            .map(|&index| Descriptor {
                pool: self.pool,
                index,
            })
    }

    pub fn enums(&self) -> impl Iterator<Item = EnumDescriptor<'a>> + '_ {
        self.pool.files[self.index]
            .enums
            .iter()
            .map(|&index| EnumDescriptor {
                pool: self.pool,
                index,
            })
    }

    pub fn services(&self) -> impl Iterator<Item = ServiceDescriptor<'a>> + '_ {
        self.pool.files[self.index]
            .services
            .iter()
            .map(|&index| ServiceDescriptor {
                pool: self.pool,
                index,
            })
    }

    pub fn extensions(&self) -> impl Iterator<Item = FieldDescriptor<'a>> + '_ {
        self.pool.files[self.index]
            .extensions
            .iter()
            .map(|&index| FieldDescriptor {
                pool: self.pool,
                index,
            })
    }

    pub fn dependencies(&self) -> impl Iterator<Item = FileDescriptor<'a>> + '_ {
        self.pool.files[self.index]
            .dependencies
            .iter()
            .map(|&index| FileDescriptor {
                pool: self.pool,
                index,
            })
    }

    pub fn public_dependencies(&self) -> impl Iterator<Item = FileDescriptor<'a>> + '_ {
        let data = &self.pool.files[self.index];
        data.proto
            .public_dependency
            .iter()
            .map(|&i| FileDescriptor {
                pool: self.pool,
                index: data.dependencies[i as usize],
            })
    }

    pub fn weak_dependencies(&self) -> impl Iterator<Item = FileDescriptor<'a>> + '_ {
        let data = &self.pool.files[self.index];
        data.proto.weak_dependency.iter().map(|&i| FileDescriptor {
            pool: self.pool,
            index: data.dependencies[i as usize],
        })
    }

    pub fn is_weak_dependency(&self, dep: FileDescriptor<'_>) -> bool {
        self.weak_dependencies().any(|d| d.index == dep.index)
    }

    pub fn is_public_dependency(&self, dep: FileDescriptor<'_>) -> bool {
        self.public_dependencies().any(|d| d.index == dep.index)
    }
}

impl<'a> Descriptor<'a> {
    pub fn name(&self) -> &'a str {
        &self.pool.messages[self.index].name
    }

    pub fn full_name(&self) -> &'a str {
        &self.pool.messages[self.index].full_name
    }

    pub fn file(&self) -> FileDescriptor<'a> {
        FileDescriptor {
            pool: self.pool,
            index: self.pool.messages[self.index].file,
        }
    }

    pub fn containing_type(&self) -> Option<Descriptor<'a>> {
        self.pool.messages[self.index]
            .containing_type
            .map(|index| Descriptor {
                pool: self.pool,
                index,
            })
    }

    /// SourceCodeInfo-style path of this message within its file.
    pub fn path(&self) -> &'a [i32] {
        &self.pool.messages[self.index].path
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldDescriptor<'a>> + '_ {
        self.pool.messages[self.index]
            .fields
            .iter()
            .map(|&index| FieldDescriptor {
                pool: self.pool,
                index,
            })
    }

    pub fn field_count(&self) -> usize {
        self.pool.messages[self.index].fields.len()
    }

    pub fn field(&self, i: usize) -> FieldDescriptor<'a> {
        FieldDescriptor {
            pool: self.pool,
            index: self.pool.messages[self.index].fields[i],
        }
    }

    pub fn find_field_by_number(&self, number: i32) -> Option<FieldDescriptor<'a>> {
        self.fields().find(|f| f.number() == number)
    }

    pub fn oneofs(&self) -> impl Iterator<Item = OneofDescriptor<'a>> + '_ {
        self.pool.messages[self.index]
            .oneofs
            .iter()
            .map(|&index| OneofDescriptor {
                pool: self.pool,
                index,
            })
    }

    /// Oneofs minus the synthetic ones carrying proto3 `optional` fields.
    pub fn real_oneofs(&self) -> impl Iterator<Item = OneofDescriptor<'a>> + '_ {
        self.oneofs().filter(|o| !o.is_synthetic())
    }

    pub fn nested_types(&self) -> impl Iterator<Item = Descriptor<'a>> + '_ {
        self.pool.messages[self.index]
            .nested_types
            .iter()
            .map(|&index| Descriptor {
                pool: self.pool,
                index,
            })
    }

    pub fn nested_enums(&self) -> impl Iterator<Item = EnumDescriptor<'a>> + '_ {
        self.pool.messages[self.index]
            .nested_enums
            .iter()
            .map(|&index| EnumDescriptor {
                pool: self.pool,
                index,
            })
    }

    pub fn extension_ranges(&self) -> &'a [ExtensionRange] {
        &self.pool.messages[self.index].extension_ranges
    }

    pub fn is_extendable(&self) -> bool {
        !self.pool.messages[self.index].extension_ranges.is_empty()
    }

    pub fn extensions(&self) -> impl Iterator<Item = FieldDescriptor<'a>> + '_ {
        self.pool.messages[self.index]
            .extensions
            .iter()
            .map(|&index| FieldDescriptor {
                pool: self.pool,
                index,
            })
    }

    pub fn is_map_entry(&self) -> bool {
        self.pool.messages[self.index].is_map_entry
    }

    /// Key field of a map entry (field number 1).
    pub fn map_key(&self) -> FieldDescriptor<'a> {
        debug_assert!(self.is_map_entry());
        self.field(0)
    }

    /// Value field of a map entry (field number 2).
    pub fn map_value(&self) -> FieldDescriptor<'a> {
        debug_assert!(self.is_map_entry());
        self.field(1)
    }
}

impl<'a> FieldDescriptor<'a> {
    pub fn name(&self) -> &'a str {
        &self.pool.fields[self.index].name
    }

    pub fn full_name(&self) -> &'a str {
        &self.pool.fields[self.index].full_name
    }

    pub fn json_name(&self) -> &'a str {
        &self.pool.fields[self.index].json_name
    }

    pub fn number(&self) -> i32 {
        self.pool.fields[self.index].number
    }

    pub fn file(&self) -> FileDescriptor<'a> {
        FileDescriptor {
            pool: self.pool,
            index: self.pool.fields[self.index].file,
        }
    }

    pub fn path(&self) -> &'a [i32] {
        &self.pool.fields[self.index].path
    }

    /// Declaration index within the containing message.
    pub fn index(&self) -> usize {
        self.pool.fields[self.index].index
    }

    pub fn label(&self) -> Label {
        self.pool.fields[self.index].label
    }

    pub fn proto_type(&self) -> Type {
        self.pool.fields[self.index].proto_type
    }

    pub fn is_repeated(&self) -> bool {
        self.label() == Label::Repeated
    }

    pub fn is_required(&self) -> bool {
        self.label() == Label::Required
    }

    pub fn is_optional(&self) -> bool {
        self.label() == Label::Optional
    }

    pub fn is_extension(&self) -> bool {
        self.pool.fields[self.index].is_extension
    }

    pub fn is_group(&self) -> bool {
        self.proto_type() == Type::Group
    }

    pub fn options(&self) -> &'a proto::FieldOptions {
        &self.pool.fields[self.index].options
    }

    pub fn is_weak(&self) -> bool {
        self.options().weak
    }

    pub fn is_lazy(&self) -> bool {
        self.options().lazy
    }

    pub fn is_deprecated(&self) -> bool {
        self.options().deprecated
    }

    pub fn ctype(&self) -> CType {
        self.options().ctype
    }

    pub fn default_value(&self) -> &'a str {
        &self.pool.fields[self.index].default_value
    }

    pub fn containing_type(&self) -> Option<Descriptor<'a>> {
        self.pool.fields[self.index]
            .containing_type
            .map(|index| Descriptor {
                pool: self.pool,
                index,
            })
    }

    /// Oneof the field is declared in, synthetic proto3-optional ones
    /// included.
    pub fn containing_oneof(&self) -> Option<OneofDescriptor<'a>> {
        self.pool.fields[self.index]
            .oneof
            .map(|index| OneofDescriptor {
                pool: self.pool,
                index,
            })
    }

    /// Oneof the field is declared in, excluding the synthetic oneof that
    /// carries a proto3 `optional` field.
    pub fn real_containing_oneof(&self) -> Option<OneofDescriptor<'a>> {
        self.containing_oneof().filter(|o| !o.is_synthetic())
    }

    pub fn is_proto3_optional(&self) -> bool {
        self.pool.fields[self.index].proto3_optional
    }

    pub fn message_type(&self) -> Option<Descriptor<'a>> {
        self.pool.fields[self.index]
            .message_type
            .map(|index| Descriptor {
                pool: self.pool,
                index,
            })
    }

    pub fn enum_type(&self) -> Option<EnumDescriptor<'a>> {
        self.pool.fields[self.index]
            .enum_type
            .map(|index| EnumDescriptor {
                pool: self.pool,
                index,
            })
    }

    /// Storage category: the first dispatch axis of the field generators.
    /// Groups are treated as messages.
    pub fn cpp_type(&self) -> CppType {
        match self.proto_type() {
            Type::Int32 | Type::Sint32 | Type::Sfixed32 => CppType::Int32,
            Type::Int64 | Type::Sint64 | Type::Sfixed64 => CppType::Int64,
            Type::Uint32 | Type::Fixed32 => CppType::UInt32,
            Type::Uint64 | Type::Fixed64 => CppType::UInt64,
            Type::Float => CppType::Float,
            Type::Double => CppType::Double,
            Type::Bool => CppType::Bool,
            Type::Enum => CppType::Enum,
            Type::String => CppType::String,
            Type::Bytes => CppType::Bytes,
            Type::Message | Type::Group => CppType::Message,
        }
    }

    pub fn wire_type(&self) -> u32 {
        match self.proto_type() {
            Type::Int32
            | Type::Int64
            | Type::Uint32
            | Type::Uint64
            | Type::Sint32
            | Type::Sint64
            | Type::Bool
            | Type::Enum => wire_type::VARINT,
            Type::Fixed64 | Type::Sfixed64 | Type::Double => wire_type::FIXED64,
            Type::Fixed32 | Type::Sfixed32 | Type::Float => wire_type::FIXED32,
            Type::String | Type::Bytes | Type::Message => wire_type::LENGTH_DELIMITED,
            Type::Group => wire_type::START_GROUP,
        }
    }

    /// Wire tag for the non-packed encoding of this field.
    pub fn tag(&self) -> u32 {
        ((self.number() as u32) << 3) | self.wire_type()
    }

    /// Wire tag of the packed (length-delimited) encoding.
    pub fn packed_tag(&self) -> u32 {
        ((self.number() as u32) << 3) | wire_type::LENGTH_DELIMITED
    }

    pub fn is_map(&self) -> bool {
        self.is_repeated()
            && self.cpp_type() == CppType::Message
            && self.message_type().is_some_and(|m| m.is_map_entry())
    }

    /// Repeated scalar fields eligible for packed encoding.
    pub fn is_packable(&self) -> bool {
        self.is_repeated()
            && !matches!(
                self.cpp_type(),
                CppType::String | CppType::Bytes | CppType::Message
            )
    }

    /// Packed by default under proto3; opt-in under proto2.
    pub fn is_packed(&self) -> bool {
        if !self.is_packable() {
            return false;
        }
        match self.options().packed {
            Some(explicit) => explicit,
            None => self.file().edition() == Edition::Proto3,
        }
    }

    /// A field has presence iff it is message-typed, lives in a oneof, or is
    /// explicitly optional under its edition.
    pub fn has_presence(&self) -> bool {
        if self.is_repeated() {
            return false;
        }
        if self.cpp_type() == CppType::Message || self.containing_oneof().is_some() {
            return true;
        }
        self.file().edition() == Edition::Proto2
    }

    /// String-field verification policy at parse and serialize time.
    pub fn utf8_mode(&self) -> Utf8Mode {
        if self.proto_type() != Type::String {
            return Utf8Mode::None;
        }
        match self.file().edition() {
            Edition::Proto3 => Utf8Mode::Strict,
            Edition::Proto2 => Utf8Mode::Verify,
        }
    }
}

/// UTF-8 policy for string fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8Mode {
    None,
    Verify,
    Strict,
}

impl<'a> OneofDescriptor<'a> {
    pub fn name(&self) -> &'a str {
        &self.pool.oneofs[self.index].name
    }

    pub fn full_name(&self) -> &'a str {
        &self.pool.oneofs[self.index].full_name
    }

    pub fn index(&self) -> usize {
        self.pool.oneofs[self.index].index
    }

    pub fn containing_type(&self) -> Descriptor<'a> {
        Descriptor {
            pool: self.pool,
            index: self.pool.oneofs[self.index].containing_type,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldDescriptor<'a>> + '_ {
        self.pool.oneofs[self.index]
            .fields
            .iter()
            .map(|&index| FieldDescriptor {
                pool: self.pool,
                index,
            })
    }

    pub fn field_count(&self) -> usize {
        self.pool.oneofs[self.index].fields.len()
    }

    /// Synthetic oneofs carry exactly one proto3 `optional` field.
    pub fn is_synthetic(&self) -> bool {
        let fields = &self.pool.oneofs[self.index].fields;
        fields.len() == 1 && self.pool.fields[fields[0]].proto3_optional
    }
}

impl<'a> EnumDescriptor<'a> {
    pub fn name(&self) -> &'a str {
        &self.pool.enums[self.index].name
    }

    pub fn full_name(&self) -> &'a str {
        &self.pool.enums[self.index].full_name
    }

    pub fn file(&self) -> FileDescriptor<'a> {
        FileDescriptor {
            pool: self.pool,
            index: self.pool.enums[self.index].file,
        }
    }

    pub fn containing_type(&self) -> Option<Descriptor<'a>> {
        self.pool.enums[self.index]
            .containing_type
            .map(|index| Descriptor {
                pool: self.pool,
                index,
            })
    }

    pub fn path(&self) -> &'a [i32] {
        &self.pool.enums[self.index].path
    }

    pub fn values(&self) -> impl Iterator<Item = EnumValueDescriptor<'a>> + '_ {
        self.pool.enums[self.index]
            .values
            .iter()
            .map(|&index| EnumValueDescriptor {
                pool: self.pool,
                index,
            })
    }

    pub fn value_count(&self) -> usize {
        self.pool.enums[self.index].values.len()
    }

    pub fn default_value(&self) -> EnumValueDescriptor<'a> {
        EnumValueDescriptor {
            pool: self.pool,
            index: self.pool.enums[self.index].values[0],
        }
    }

    pub fn find_value_by_name(&self, name: &str) -> Option<EnumValueDescriptor<'a>> {
        self.values().find(|v| v.name() == name)
    }

    /// Closed enums reject unknown numbers at parse time; open enums keep
    /// them. Proto2 enums are closed, proto3 enums open.
    pub fn is_closed(&self) -> bool {
        self.file().edition() == Edition::Proto2
    }

    /// Canonical values: the first value declared for each distinct number.
    /// Later duplicates are aliases.
    pub fn canonical_values(&self) -> Vec<EnumValueDescriptor<'a>> {
        let mut seen = std::collections::HashSet::new();
        self.values().filter(|v| seen.insert(v.number())).collect()
    }
}

impl<'a> EnumValueDescriptor<'a> {
    pub fn name(&self) -> &'a str {
        &self.pool.enum_values[self.index].name
    }

    pub fn full_name(&self) -> &'a str {
        &self.pool.enum_values[self.index].full_name
    }

    pub fn number(&self) -> i32 {
        self.pool.enum_values[self.index].number
    }

    pub fn index(&self) -> usize {
        self.pool.enum_values[self.index].index
    }

    pub fn enum_type(&self) -> EnumDescriptor<'a> {
        EnumDescriptor {
            pool: self.pool,
            index: self.pool.enum_values[self.index].enum_index,
        }
    }
}

impl<'a> ServiceDescriptor<'a> {
    pub fn name(&self) -> &'a str {
        &self.pool.services[self.index].name
    }

    pub fn full_name(&self) -> &'a str {
        &self.pool.services[self.index].full_name
    }

    pub fn index(&self) -> usize {
        self.pool.services[self.index].index
    }

    pub fn file(&self) -> FileDescriptor<'a> {
        FileDescriptor {
            pool: self.pool,
            index: self.pool.services[self.index].file,
        }
    }

    pub fn methods(&self) -> impl Iterator<Item = MethodDescriptor<'a>> + '_ {
        self.pool.services[self.index]
            .methods
            .iter()
            .map(|&index| MethodDescriptor {
                pool: self.pool,
                index,
            })
    }

    pub fn method_count(&self) -> usize {
        self.pool.services[self.index].methods.len()
    }

    pub fn path(&self) -> &'a [i32] {
        &self.pool.services[self.index].path
    }
}

impl<'a> MethodDescriptor<'a> {
    pub fn name(&self) -> &'a str {
        &self.pool.methods[self.index].name
    }

    pub fn full_name(&self) -> &'a str {
        &self.pool.methods[self.index].full_name
    }

    pub fn index(&self) -> usize {
        self.pool.methods[self.index].index
    }

    pub fn service(&self) -> ServiceDescriptor<'a> {
        ServiceDescriptor {
            pool: self.pool,
            index: self.pool.methods[self.index].service,
        }
    }

    pub fn input_type(&self) -> Descriptor<'a> {
        Descriptor {
            pool: self.pool,
            index: self.pool.methods[self.index].input_type,
        }
    }

    pub fn output_type(&self) -> Descriptor<'a> {
        Descriptor {
            pool: self.pool,
            index: self.pool.methods[self.index].output_type,
        }
    }

    pub fn client_streaming(&self) -> bool {
        self.pool.methods[self.index].client_streaming
    }

    pub fn server_streaming(&self) -> bool {
        self.pool.methods[self.index].server_streaming
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::*;

    fn int32_field(name: &str, number: i32) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: name.to_string(),
            number,
            r#type: Type::Int32,
            ..Default::default()
        }
    }

    fn message_field(name: &str, number: i32, type_name: &str) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: name.to_string(),
            number,
            r#type: Type::Message,
            type_name: type_name.to_string(),
            ..Default::default()
        }
    }

    fn simple_file() -> FileDescriptorProto {
        FileDescriptorProto {
            name: "test.proto".to_string(),
            package: "unit".to_string(),
            syntax: "proto3".to_string(),
            message_type: vec![
                DescriptorProto {
                    name: "Outer".to_string(),
                    field: vec![
                        int32_field("plain", 1),
                        message_field("inner", 2, ".unit.Outer.Inner"),
                    ],
                    nested_type: vec![DescriptorProto {
                        name: "Inner".to_string(),
                        field: vec![int32_field("x", 1)],
                        ..Default::default()
                    }],
                    ..Default::default()
                },
                DescriptorProto {
                    name: "Tree".to_string(),
                    field: vec![
                        message_field("left", 1, ".unit.Tree"),
                        message_field("right", 2, ".unit.Tree"),
                    ],
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn links_nested_and_recursive_types() {
        let mut pool = DescriptorPool::new();
        pool.add_file(&simple_file()).expect("file should link");

        let outer = pool.message_by_name("unit.Outer").unwrap();
        assert_eq!(outer.full_name(), "unit.Outer");
        assert_eq!(outer.field_count(), 2);
        let inner_field = outer.field(1);
        assert_eq!(
            inner_field.message_type().unwrap().full_name(),
            "unit.Outer.Inner"
        );

        let tree = pool.message_by_name("unit.Tree").unwrap();
        assert_eq!(tree.field(0).message_type().unwrap(), tree);
    }

    #[test]
    fn rejects_unresolved_reference() {
        let mut file = simple_file();
        file.message_type[0].field[1].type_name = ".unit.Missing".to_string();
        let mut pool = DescriptorPool::new();
        let err = pool.add_file(&file).unwrap_err();
        assert!(err.to_string().contains("unresolved type"));
    }

    #[test]
    fn proto3_presence_rules() {
        let mut file = simple_file();
        file.message_type[0].field.push(FieldDescriptorProto {
            name: "opt".to_string(),
            number: 3,
            r#type: Type::Int32,
            proto3_optional: true,
            oneof_index: Some(0),
            ..Default::default()
        });
        file.message_type[0].oneof_decl = vec![OneofDescriptorProto {
            name: "_opt".to_string(),
        }];
        let mut pool = DescriptorPool::new();
        pool.add_file(&file).unwrap();

        let outer = pool.message_by_name("unit.Outer").unwrap();
        let plain = outer.field(0);
        assert!(!plain.has_presence(), "proto3 scalar has no presence");
        let inner = outer.field(1);
        assert!(inner.has_presence(), "message fields always have presence");
        let opt = outer.field(2);
        assert!(opt.has_presence(), "proto3 optional tracks presence");
        assert!(opt.containing_oneof().unwrap().is_synthetic());
        assert!(opt.real_containing_oneof().is_none());
        assert_eq!(outer.real_oneofs().count(), 0);
    }

    #[test]
    fn packedness_follows_edition() {
        let mut file = simple_file();
        file.message_type[0].field.push(FieldDescriptorProto {
            name: "reps".to_string(),
            number: 4,
            label: Label::Repeated,
            r#type: Type::Int32,
            ..Default::default()
        });
        let mut pool = DescriptorPool::new();
        pool.add_file(&file).unwrap();
        let reps = pool
            .message_by_name("unit.Outer")
            .unwrap()
            .fields()
            .find(|f| f.name() == "reps")
            .unwrap();
        assert!(reps.is_packed(), "proto3 repeated scalars default packed");
        assert_eq!(reps.tag(), (4 << 3) | wire_type::VARINT);
        assert_eq!(reps.packed_tag(), (4 << 3) | wire_type::LENGTH_DELIMITED);
    }

    #[test]
    fn map_entry_validation() {
        let mut file = simple_file();
        file.message_type[0].nested_type.push(DescriptorProto {
            name: "BadEntry".to_string(),
            field: vec![int32_field("key", 1)],
            options: Some(MessageOptions {
                map_entry: true,
                ..Default::default()
            }),
            ..Default::default()
        });
        let mut pool = DescriptorPool::new();
        let err = pool.add_file(&file).unwrap_err();
        assert!(err.to_string().contains("not a valid map entry"));
    }

    #[test]
    fn dependency_classification() {
        let dep = FileDescriptorProto {
            name: "dep.proto".to_string(),
            package: "dep".to_string(),
            syntax: "proto3".to_string(),
            message_type: vec![DescriptorProto {
                name: "D".to_string(),
                field: vec![int32_field("x", 1)],
                ..Default::default()
            }],
            ..Default::default()
        };
        let main = FileDescriptorProto {
            name: "main.proto".to_string(),
            package: "m".to_string(),
            syntax: "proto3".to_string(),
            dependency: vec!["dep.proto".to_string()],
            weak_dependency: vec![0],
            message_type: vec![DescriptorProto {
                name: "M".to_string(),
                field: vec![message_field("d", 1, ".dep.D")],
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut pool = DescriptorPool::new();
        pool.add_file(&dep).unwrap();
        pool.add_file(&main).unwrap();

        let main_file = pool.file_by_name("main.proto").unwrap();
        let dep_file = pool.file_by_name("dep.proto").unwrap();
        assert!(main_file.is_weak_dependency(dep_file));
        assert!(!main_file.is_public_dependency(dep_file));
    }
}
