//! Per-field Java emission.
//!
//! Same lifecycle-hook contract as the C++ back-end, but collapsed into one
//! tagged generator: the thirteen variants share far more text on the Java
//! side, so each hook is a single match instead of a type per variant. The
//! selection rule is unchanged: map, then repeated, then real-oneof, then
//! singular, with groups treated as messages.

use std::collections::HashSet;

use crate::descriptor::{CppType, Descriptor, FieldDescriptor};
use crate::error::Result;
use crate::printer::Printer;
use crate::proto::Type;

use super::helpers;
use super::names;

#[derive(Debug, Clone)]
pub struct FieldGeneratorInfo {
    pub name: String,
    pub capitalized_name: String,
    pub disambiguated_reason: Option<String>,
}

/// Accessor naming, resolved once per message. Forbidden names come from the
/// runtime configuration; two fields whose camel-cased names coincide are
/// both disambiguated with their field numbers.
pub fn build_field_infos(
    message: Descriptor<'_>,
    forbidden_names: &HashSet<&'static str>,
) -> Vec<FieldGeneratorInfo> {
    let capitalized: Vec<String> = message
        .fields()
        .map(|f| names::underscores_to_camel_case(f.name(), true))
        .collect();
    message
        .fields()
        .enumerate()
        .map(|(i, field)| {
            let mut reason = None;
            if forbidden_names.contains(field.name()) {
                reason = Some(format!(
                    "collides with reserved accessor {:?}",
                    field.name()
                ));
            } else if capitalized
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && other == &capitalized[i])
            {
                reason = Some("collides with another field name".to_string());
            }
            let base = if reason.is_some() {
                format!("{}_{}", field.name(), field.number())
            } else {
                field.name().to_string()
            };
            FieldGeneratorInfo {
                name: names::underscores_to_camel_case(&base, false),
                capitalized_name: names::underscores_to_camel_case(&base, true),
                disambiguated_reason: reason,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    SingularPrimitive,
    OneofPrimitive,
    RepeatedPrimitive,
    SingularString,
    OneofString,
    RepeatedString,
    SingularEnum,
    OneofEnum,
    RepeatedEnum,
    SingularMessage,
    OneofMessage,
    RepeatedMessage,
    Map,
}

/// First match wins: map, repeated, real oneof, singular.
pub fn select_variant(field: FieldDescriptor<'_>) -> Variant {
    let category = field.cpp_type();
    if field.is_map() {
        return Variant::Map;
    }
    if field.is_repeated() {
        return match category {
            CppType::Message => Variant::RepeatedMessage,
            CppType::Enum => Variant::RepeatedEnum,
            CppType::String | CppType::Bytes => Variant::RepeatedString,
            _ => Variant::RepeatedPrimitive,
        };
    }
    if field.real_containing_oneof().is_some() {
        return match category {
            CppType::Message => Variant::OneofMessage,
            CppType::Enum => Variant::OneofEnum,
            CppType::String | CppType::Bytes => Variant::OneofString,
            _ => Variant::OneofPrimitive,
        };
    }
    match category {
        CppType::Message => Variant::SingularMessage,
        CppType::Enum => Variant::SingularEnum,
        CppType::String | CppType::Bytes => Variant::SingularString,
        _ => Variant::SingularPrimitive,
    }
}

/// Construction-time decisions made by the message generator, never inferred
/// here.
pub struct FieldGenOptions {
    /// Presence bit in the message's bit-field words, when the field has one.
    pub message_bit_index: Option<usize>,
    /// Dirty bit in the builder's bit-field words. Oneof members have none.
    pub builder_bit_index: Option<usize>,
    /// Routing for out-of-range enum numbers: unknown-field set (closed) or
    /// the UNRECOGNIZED sentinel (open).
    pub enum_is_closed: bool,
    /// Strings reject non-UTF-8 payloads at parse time.
    pub check_utf8: bool,
    /// Outer-class-qualified prefix of the map entry descriptor, for map
    /// fields only.
    pub map_entry_descriptor: Option<String>,
}

pub struct FieldGenerator<'a> {
    pub field: FieldDescriptor<'a>,
    variant: Variant,
    vars: Vec<(String, String)>,
    has_hazzer: bool,
    open_enum: bool,
    packed: bool,
}

impl<'a> FieldGenerator<'a> {
    pub fn new(
        field: FieldDescriptor<'a>,
        info: &FieldGeneratorInfo,
        gen_options: &FieldGenOptions,
    ) -> Result<FieldGenerator<'a>> {
        let variant = select_variant(field);
        let open_enum = field.cpp_type() == CppType::Enum && !gen_options.enum_is_closed;
        let has_hazzer = gen_options.message_bit_index.is_some()
            || matches!(variant, Variant::SingularMessage)
            || field.real_containing_oneof().is_some();
        let vars = build_vars(field, info, variant, open_enum, gen_options)?;
        Ok(FieldGenerator {
            field,
            variant,
            vars,
            has_hazzer,
            open_enum,
            packed: field.is_packed(),
        })
    }

    fn is_bytes(&self) -> bool {
        self.field.cpp_type() == CppType::Bytes
    }

    pub fn generate_interface(&self, printer: &mut Printer) {
        helpers::with_vars(printer, &self.vars, |p| match self.variant {
            Variant::SingularPrimitive
            | Variant::SingularString
            | Variant::SingularEnum
            | Variant::SingularMessage
            | Variant::OneofPrimitive
            | Variant::OneofString
            | Variant::OneofEnum
            | Variant::OneofMessage => {
                if self.has_hazzer {
                    p.print("$deprecation$boolean has$capitalized_name$();\n");
                }
                if self.open_enum {
                    p.print("$deprecation$int get$capitalized_name$Value();\n");
                }
                p.print("$deprecation$$type$ get$capitalized_name$();\n");
                if self.field.cpp_type() == CppType::String {
                    p.print(
                        "$deprecation$com.google.protobuf.ByteString get$capitalized_name$Bytes();\n",
                    );
                }
                if self.field.cpp_type() == CppType::Message {
                    p.print("$deprecation$$type$OrBuilder get$capitalized_name$OrBuilder();\n");
                }
            }
            Variant::RepeatedPrimitive | Variant::RepeatedMessage => {
                p.print("$deprecation$java.util.List<$boxed_type$> get$capitalized_name$List();\n");
                p.print("$deprecation$int get$capitalized_name$Count();\n");
                p.print("$deprecation$$type$ get$capitalized_name$(int index);\n");
            }
            Variant::RepeatedString => {
                if self.is_bytes() {
                    p.print(
                        "$deprecation$java.util.List<$boxed_type$> get$capitalized_name$List();\n",
                    );
                } else {
                    p.print(
                        "$deprecation$java.util.List<java.lang.String> get$capitalized_name$List();\n",
                    );
                }
                p.print("$deprecation$int get$capitalized_name$Count();\n");
                p.print("$deprecation$$type$ get$capitalized_name$(int index);\n");
                if !self.is_bytes() {
                    p.print(
                        "$deprecation$com.google.protobuf.ByteString get$capitalized_name$Bytes(int index);\n",
                    );
                }
            }
            Variant::RepeatedEnum => {
                p.print("$deprecation$java.util.List<$type$> get$capitalized_name$List();\n");
                p.print("$deprecation$int get$capitalized_name$Count();\n");
                p.print("$deprecation$$type$ get$capitalized_name$(int index);\n");
                if self.open_enum {
                    p.print(
                        "$deprecation$java.util.List<java.lang.Integer> get$capitalized_name$ValueList();\n",
                    );
                    p.print("$deprecation$int get$capitalized_name$Value(int index);\n");
                }
            }
            Variant::Map => {
                p.print("$deprecation$int get$capitalized_name$Count();\n");
                p.print("$deprecation$boolean contains$capitalized_name$($key_type$ key);\n");
                p.print(
                    "$deprecation$java.util.Map<$boxed_key$, $boxed_value$> get$capitalized_name$Map();\n",
                );
                p.print(
                    "$deprecation$$value_type$ get$capitalized_name$OrDefault($key_type$ key, $value_type$ defaultValue);\n",
                );
                p.print(
                    "$deprecation$$value_type$ get$capitalized_name$OrThrow($key_type$ key);\n",
                );
            }
        });
    }

    pub fn generate_members(&self, printer: &mut Printer) {
        helpers::with_vars(printer, &self.vars, |p| {
            p.print("public static final int $constant_name$ = $number$;\n");
            match self.variant {
                Variant::SingularPrimitive => {
                    p.print("private $type$ $member$ = $default$;\n");
                    if self.has_hazzer {
                        p.print(
                            "$deprecation$public boolean has$capitalized_name$() {\n\
                             \x20 return (($has_field$ & $has_mask$) != 0);\n\
                             }\n",
                        );
                    }
                    p.print(
                        "$deprecation$public $type$ get$capitalized_name$() {\n\
                         \x20 return $member$;\n\
                         }\n",
                    );
                }
                Variant::SingularString => {
                    if self.is_bytes() {
                        p.print("private com.google.protobuf.ByteString $member$ = $default$;\n");
                        if self.has_hazzer {
                            p.print(
                                "$deprecation$public boolean has$capitalized_name$() {\n\
                                 \x20 return (($has_field$ & $has_mask$) != 0);\n\
                                 }\n",
                            );
                        }
                        p.print(
                            "$deprecation$public com.google.protobuf.ByteString get$capitalized_name$() {\n\
                             \x20 return $member$;\n\
                             }\n",
                        );
                    } else {
                        p.print(
                            "@SuppressWarnings(\"serial\")\n\
                             private volatile java.lang.Object $member$ = $default$;\n",
                        );
                        if self.has_hazzer {
                            p.print(
                                "$deprecation$public boolean has$capitalized_name$() {\n\
                                 \x20 return (($has_field$ & $has_mask$) != 0);\n\
                                 }\n",
                            );
                        }
                        p.print(
                            "$deprecation$public java.lang.String get$capitalized_name$() {\n\
                             \x20 java.lang.Object ref = $member$;\n\
                             \x20 if (ref instanceof java.lang.String) {\n\
                             \x20   return (java.lang.String) ref;\n\
                             \x20 } else {\n\
                             \x20   com.google.protobuf.ByteString bs =\n\
                             \x20       (com.google.protobuf.ByteString) ref;\n\
                             \x20   java.lang.String s = bs.toStringUtf8();\n\
                             \x20   $member$ = s;\n\
                             \x20   return s;\n\
                             \x20 }\n\
                             }\n\
                             $deprecation$public com.google.protobuf.ByteString get$capitalized_name$Bytes() {\n\
                             \x20 java.lang.Object ref = $member$;\n\
                             \x20 if (ref instanceof java.lang.String) {\n\
                             \x20   com.google.protobuf.ByteString b =\n\
                             \x20       com.google.protobuf.ByteString.copyFromUtf8((java.lang.String) ref);\n\
                             \x20   $member$ = b;\n\
                             \x20   return b;\n\
                             \x20 } else {\n\
                             \x20   return (com.google.protobuf.ByteString) ref;\n\
                             \x20 }\n\
                             }\n",
                        );
                    }
                }
                Variant::SingularEnum => {
                    p.print("private int $member$ = $default_number$;\n");
                    if self.has_hazzer {
                        p.print(
                            "$deprecation$public boolean has$capitalized_name$() {\n\
                             \x20 return (($has_field$ & $has_mask$) != 0);\n\
                             }\n",
                        );
                    }
                    if self.open_enum {
                        p.print(
                            "$deprecation$public int get$capitalized_name$Value() {\n\
                             \x20 return $member$;\n\
                             }\n",
                        );
                    }
                    p.print(
                        "$deprecation$public $type$ get$capitalized_name$() {\n\
                         \x20 $type$ result = $type$.forNumber($member$);\n\
                         \x20 return result == null ? $fallback$ : result;\n\
                         }\n",
                    );
                }
                Variant::SingularMessage => {
                    p.print("private $type$ $member$;\n");
                    p.print(
                        "$deprecation$public boolean has$capitalized_name$() {\n\
                         \x20 return $member$ != null;\n\
                         }\n\
                         $deprecation$public $type$ get$capitalized_name$() {\n\
                         \x20 return $member$ == null ? $type$.getDefaultInstance() : $member$;\n\
                         }\n\
                         $deprecation$public $type$OrBuilder get$capitalized_name$OrBuilder() {\n\
                         \x20 return $member$ == null ? $type$.getDefaultInstance() : $member$;\n\
                         }\n",
                    );
                }
                Variant::OneofPrimitive => {
                    p.print(
                        "$deprecation$public boolean has$capitalized_name$() {\n\
                         \x20 return $case_member$ == $number$;\n\
                         }\n\
                         $deprecation$public $type$ get$capitalized_name$() {\n\
                         \x20 if ($case_member$ == $number$) {\n\
                         \x20   return ($boxed_type$) $oneof_member$;\n\
                         \x20 }\n\
                         \x20 return $default$;\n\
                         }\n",
                    );
                }
                Variant::OneofString => {
                    if self.is_bytes() {
                        p.print(
                            "$deprecation$public boolean has$capitalized_name$() {\n\
                             \x20 return $case_member$ == $number$;\n\
                             }\n\
                             $deprecation$public com.google.protobuf.ByteString get$capitalized_name$() {\n\
                             \x20 if ($case_member$ == $number$) {\n\
                             \x20   return (com.google.protobuf.ByteString) $oneof_member$;\n\
                             \x20 }\n\
                             \x20 return $default$;\n\
                             }\n",
                        );
                    } else {
                        p.print(
                            "$deprecation$public boolean has$capitalized_name$() {\n\
                             \x20 return $case_member$ == $number$;\n\
                             }\n\
                             $deprecation$public java.lang.String get$capitalized_name$() {\n\
                             \x20 java.lang.Object ref = $default$;\n\
                             \x20 if ($case_member$ == $number$) {\n\
                             \x20   ref = $oneof_member$;\n\
                             \x20 }\n\
                             \x20 if (ref instanceof java.lang.String) {\n\
                             \x20   return (java.lang.String) ref;\n\
                             \x20 } else {\n\
                             \x20   com.google.protobuf.ByteString bs =\n\
                             \x20       (com.google.protobuf.ByteString) ref;\n\
                             \x20   java.lang.String s = bs.toStringUtf8();\n\
                             \x20   if ($case_member$ == $number$) {\n\
                             \x20     $oneof_member$ = s;\n\
                             \x20   }\n\
                             \x20   return s;\n\
                             \x20 }\n\
                             }\n\
                             $deprecation$public com.google.protobuf.ByteString get$capitalized_name$Bytes() {\n\
                             \x20 java.lang.Object ref = $default$;\n\
                             \x20 if ($case_member$ == $number$) {\n\
                             \x20   ref = $oneof_member$;\n\
                             \x20 }\n\
                             \x20 if (ref instanceof java.lang.String) {\n\
                             \x20   com.google.protobuf.ByteString b =\n\
                             \x20       com.google.protobuf.ByteString.copyFromUtf8((java.lang.String) ref);\n\
                             \x20   if ($case_member$ == $number$) {\n\
                             \x20     $oneof_member$ = b;\n\
                             \x20   }\n\
                             \x20   return b;\n\
                             \x20 } else {\n\
                             \x20   return (com.google.protobuf.ByteString) ref;\n\
                             \x20 }\n\
                             }\n",
                        );
                    }
                }
                Variant::OneofEnum => {
                    p.print(
                        "$deprecation$public boolean has$capitalized_name$() {\n\
                         \x20 return $case_member$ == $number$;\n\
                         }\n",
                    );
                    if self.open_enum {
                        p.print(
                            "$deprecation$public int get$capitalized_name$Value() {\n\
                             \x20 if ($case_member$ == $number$) {\n\
                             \x20   return (java.lang.Integer) $oneof_member$;\n\
                             \x20 }\n\
                             \x20 return $default_number$;\n\
                             }\n",
                        );
                    }
                    p.print(
                        "$deprecation$public $type$ get$capitalized_name$() {\n\
                         \x20 if ($case_member$ == $number$) {\n\
                         \x20   $type$ result = $type$.forNumber((java.lang.Integer) $oneof_member$);\n\
                         \x20   return result == null ? $fallback$ : result;\n\
                         \x20 }\n\
                         \x20 return $default$;\n\
                         }\n",
                    );
                }
                Variant::OneofMessage => {
                    p.print(
                        "$deprecation$public boolean has$capitalized_name$() {\n\
                         \x20 return $case_member$ == $number$;\n\
                         }\n\
                         $deprecation$public $type$ get$capitalized_name$() {\n\
                         \x20 if ($case_member$ == $number$) {\n\
                         \x20   return ($type$) $oneof_member$;\n\
                         \x20 }\n\
                         \x20 return $type$.getDefaultInstance();\n\
                         }\n\
                         $deprecation$public $type$OrBuilder get$capitalized_name$OrBuilder() {\n\
                         \x20 if ($case_member$ == $number$) {\n\
                         \x20   return ($type$) $oneof_member$;\n\
                         \x20 }\n\
                         \x20 return $type$.getDefaultInstance();\n\
                         }\n",
                    );
                }
                Variant::RepeatedPrimitive => {
                    p.print(
                        "@SuppressWarnings(\"serial\")\n\
                         private $list_type$ $member$ = $empty_list$;\n\
                         $deprecation$public java.util.List<$boxed_type$> get$capitalized_name$List() {\n\
                         \x20 return $member$;\n\
                         }\n\
                         $deprecation$public int get$capitalized_name$Count() {\n\
                         \x20 return $member$.size();\n\
                         }\n\
                         $deprecation$public $type$ get$capitalized_name$(int index) {\n\
                         \x20 return $member$.$list_get$(index);\n\
                         }\n",
                    );
                    if self.packed {
                        p.print("private int $name$MemoizedSerializedSize = -1;\n");
                    }
                }
                Variant::RepeatedString => {
                    if self.is_bytes() {
                        p.print(
                            "@SuppressWarnings(\"serial\")\n\
                             private java.util.List<com.google.protobuf.ByteString> $member$ =\n\
                             \x20   java.util.Collections.emptyList();\n\
                             $deprecation$public java.util.List<com.google.protobuf.ByteString> get$capitalized_name$List() {\n\
                             \x20 return $member$;\n\
                             }\n\
                             $deprecation$public int get$capitalized_name$Count() {\n\
                             \x20 return $member$.size();\n\
                             }\n\
                             $deprecation$public com.google.protobuf.ByteString get$capitalized_name$(int index) {\n\
                             \x20 return $member$.get(index);\n\
                             }\n",
                        );
                    } else {
                        p.print(
                            "@SuppressWarnings(\"serial\")\n\
                             private com.google.protobuf.LazyStringArrayList $member$ =\n\
                             \x20   com.google.protobuf.LazyStringArrayList.emptyList();\n\
                             $deprecation$public com.google.protobuf.ProtocolStringList get$capitalized_name$List() {\n\
                             \x20 return $member$;\n\
                             }\n\
                             $deprecation$public int get$capitalized_name$Count() {\n\
                             \x20 return $member$.size();\n\
                             }\n\
                             $deprecation$public java.lang.String get$capitalized_name$(int index) {\n\
                             \x20 return $member$.get(index);\n\
                             }\n\
                             $deprecation$public com.google.protobuf.ByteString get$capitalized_name$Bytes(int index) {\n\
                             \x20 return $member$.getByteString(index);\n\
                             }\n",
                        );
                    }
                }
                Variant::RepeatedEnum => {
                    p.print(
                        "@SuppressWarnings(\"serial\")\n\
                         private java.util.List<java.lang.Integer> $member$;\n\
                         private static final com.google.protobuf.Internal.ListAdapter.Converter<\n\
                         \x20   java.lang.Integer, $type$> $name$_converter_ =\n\
                         \x20       new com.google.protobuf.Internal.ListAdapter.Converter<\n\
                         \x20           java.lang.Integer, $type$>() {\n\
                         \x20         public $type$ convert(java.lang.Integer from) {\n\
                         \x20           $type$ result = $type$.forNumber(from);\n\
                         \x20           return result == null ? $fallback$ : result;\n\
                         \x20         }\n\
                         \x20       };\n\
                         $deprecation$public java.util.List<$type$> get$capitalized_name$List() {\n\
                         \x20 return new com.google.protobuf.Internal.ListAdapter<\n\
                         \x20     java.lang.Integer, $type$>($member$, $name$_converter_);\n\
                         }\n\
                         $deprecation$public int get$capitalized_name$Count() {\n\
                         \x20 return $member$.size();\n\
                         }\n\
                         $deprecation$public $type$ get$capitalized_name$(int index) {\n\
                         \x20 return $name$_converter_.convert($member$.get(index));\n\
                         }\n",
                    );
                    if self.open_enum {
                        p.print(
                            "$deprecation$public java.util.List<java.lang.Integer> get$capitalized_name$ValueList() {\n\
                             \x20 return $member$;\n\
                             }\n\
                             $deprecation$public int get$capitalized_name$Value(int index) {\n\
                             \x20 return $member$.get(index);\n\
                             }\n",
                        );
                    }
                    if self.packed {
                        p.print("private int $name$MemoizedSerializedSize;\n");
                    }
                }
                Variant::RepeatedMessage => {
                    p.print(
                        "@SuppressWarnings(\"serial\")\n\
                         private java.util.List<$type$> $member$;\n\
                         $deprecation$public java.util.List<$type$> get$capitalized_name$List() {\n\
                         \x20 return $member$;\n\
                         }\n\
                         $deprecation$public int get$capitalized_name$Count() {\n\
                         \x20 return $member$.size();\n\
                         }\n\
                         $deprecation$public $type$ get$capitalized_name$(int index) {\n\
                         \x20 return $member$.get(index);\n\
                         }\n",
                    );
                }
                Variant::Map => {
                    p.print(
                        "private static final class $capitalized_name$DefaultEntryHolder {\n\
                         \x20 static final com.google.protobuf.MapEntry<$boxed_key$, $boxed_value$> defaultEntry =\n\
                         \x20     com.google.protobuf.MapEntry.<$boxed_key$, $boxed_value$>newDefaultInstance(\n\
                         \x20         $entry_descriptor$,\n\
                         \x20         com.google.protobuf.WireFormat.FieldType.$key_wire_const$,\n\
                         \x20         $key_default$,\n\
                         \x20         com.google.protobuf.WireFormat.FieldType.$value_wire_const$,\n\
                         \x20         $value_default$);\n\
                         }\n\
                         @SuppressWarnings(\"serial\")\n\
                         private com.google.protobuf.MapField<$boxed_key$, $boxed_value$> $member$;\n\
                         private com.google.protobuf.MapField<$boxed_key$, $boxed_value$>\n\
                         internalGet$capitalized_name$() {\n\
                         \x20 if ($member$ == null) {\n\
                         \x20   return com.google.protobuf.MapField.emptyMapField(\n\
                         \x20       $capitalized_name$DefaultEntryHolder.defaultEntry);\n\
                         \x20 }\n\
                         \x20 return $member$;\n\
                         }\n\
                         $deprecation$public int get$capitalized_name$Count() {\n\
                         \x20 return internalGet$capitalized_name$().getMap().size();\n\
                         }\n\
                         $deprecation$public boolean contains$capitalized_name$($key_type$ key) {\n\
                         \x20 $key_null_check$return internalGet$capitalized_name$().getMap().containsKey(key);\n\
                         }\n\
                         $deprecation$public java.util.Map<$boxed_key$, $boxed_value$> get$capitalized_name$Map() {\n\
                         \x20 return internalGet$capitalized_name$().getMap();\n\
                         }\n\
                         $deprecation$public $value_type$ get$capitalized_name$OrDefault(\n\
                         \x20   $key_type$ key, $value_type$ defaultValue) {\n\
                         \x20 $key_null_check$java.util.Map<$boxed_key$, $boxed_value$> map =\n\
                         \x20     internalGet$capitalized_name$().getMap();\n\
                         \x20 return map.containsKey(key) ? map.get(key) : defaultValue;\n\
                         }\n\
                         $deprecation$public $value_type$ get$capitalized_name$OrThrow($key_type$ key) {\n\
                         \x20 $key_null_check$java.util.Map<$boxed_key$, $boxed_value$> map =\n\
                         \x20     internalGet$capitalized_name$().getMap();\n\
                         \x20 if (!map.containsKey(key)) {\n\
                         \x20   throw new java.lang.IllegalArgumentException();\n\
                         \x20 }\n\
                         \x20 return map.get(key);\n\
                         }\n",
                    );
                }
            }
        });
    }

    pub fn generate_builder_members(&self, printer: &mut Printer) {
        helpers::with_vars(printer, &self.vars, |p| match self.variant {
            Variant::SingularPrimitive => {
                p.print(
                    "private $type$ $member$ = $default$;\n\
                     $deprecation$public $type$ get$capitalized_name$() {\n\
                     \x20 return $member$;\n\
                     }\n\
                     $deprecation$public Builder set$capitalized_name$($type$ value) {\n\
                     \x20 $member$ = value;\n\
                     \x20 $bit_field$ |= $builder_mask$;\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder clear$capitalized_name$() {\n\
                     \x20 $bit_field$ = ($bit_field$ & ~$builder_mask$);\n\
                     \x20 $member$ = $default$;\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n",
                );
                if self.has_hazzer {
                    p.print(
                        "$deprecation$public boolean has$capitalized_name$() {\n\
                         \x20 return (($bit_field$ & $builder_mask$) != 0);\n\
                         }\n",
                    );
                }
            }
            Variant::SingularString => {
                if self.is_bytes() {
                    p.print(
                        "private com.google.protobuf.ByteString $member$ = $default$;\n\
                         $deprecation$public com.google.protobuf.ByteString get$capitalized_name$() {\n\
                         \x20 return $member$;\n\
                         }\n\
                         $deprecation$public Builder set$capitalized_name$(com.google.protobuf.ByteString value) {\n\
                         \x20 if (value == null) { throw new NullPointerException(); }\n\
                         \x20 $member$ = value;\n\
                         \x20 $bit_field$ |= $builder_mask$;\n\
                         \x20 onChanged();\n\
                         \x20 return this;\n\
                         }\n\
                         $deprecation$public Builder clear$capitalized_name$() {\n\
                         \x20 $bit_field$ = ($bit_field$ & ~$builder_mask$);\n\
                         \x20 $member$ = $default$;\n\
                         \x20 onChanged();\n\
                         \x20 return this;\n\
                         }\n",
                    );
                } else {
                    p.print(
                        "private java.lang.Object $member$ = $default$;\n\
                         $deprecation$public java.lang.String get$capitalized_name$() {\n\
                         \x20 java.lang.Object ref = $member$;\n\
                         \x20 if (!(ref instanceof java.lang.String)) {\n\
                         \x20   com.google.protobuf.ByteString bs =\n\
                         \x20       (com.google.protobuf.ByteString) ref;\n\
                         \x20   java.lang.String s = bs.toStringUtf8();\n\
                         \x20   $member$ = s;\n\
                         \x20   return s;\n\
                         \x20 } else {\n\
                         \x20   return (java.lang.String) ref;\n\
                         \x20 }\n\
                         }\n\
                         $deprecation$public com.google.protobuf.ByteString get$capitalized_name$Bytes() {\n\
                         \x20 java.lang.Object ref = $member$;\n\
                         \x20 if (ref instanceof String) {\n\
                         \x20   com.google.protobuf.ByteString b =\n\
                         \x20       com.google.protobuf.ByteString.copyFromUtf8((java.lang.String) ref);\n\
                         \x20   $member$ = b;\n\
                         \x20   return b;\n\
                         \x20 } else {\n\
                         \x20   return (com.google.protobuf.ByteString) ref;\n\
                         \x20 }\n\
                         }\n\
                         $deprecation$public Builder set$capitalized_name$(java.lang.String value) {\n\
                         \x20 if (value == null) { throw new NullPointerException(); }\n\
                         \x20 $member$ = value;\n\
                         \x20 $bit_field$ |= $builder_mask$;\n\
                         \x20 onChanged();\n\
                         \x20 return this;\n\
                         }\n\
                         $deprecation$public Builder clear$capitalized_name$() {\n\
                         \x20 $member$ = getDefaultInstance().get$capitalized_name$();\n\
                         \x20 $bit_field$ = ($bit_field$ & ~$builder_mask$);\n\
                         \x20 onChanged();\n\
                         \x20 return this;\n\
                         }\n\
                         $deprecation$public Builder set$capitalized_name$Bytes(com.google.protobuf.ByteString value) {\n\
                         \x20 if (value == null) { throw new NullPointerException(); }\n\
                         \x20 $utf8_check$$member$ = value;\n\
                         \x20 $bit_field$ |= $builder_mask$;\n\
                         \x20 onChanged();\n\
                         \x20 return this;\n\
                         }\n",
                    );
                }
                if self.has_hazzer {
                    p.print(
                        "$deprecation$public boolean has$capitalized_name$() {\n\
                         \x20 return (($bit_field$ & $builder_mask$) != 0);\n\
                         }\n",
                    );
                }
            }
            Variant::SingularEnum => {
                p.print("private int $member$ = $default_number$;\n");
                if self.has_hazzer {
                    p.print(
                        "$deprecation$public boolean has$capitalized_name$() {\n\
                         \x20 return (($bit_field$ & $builder_mask$) != 0);\n\
                         }\n",
                    );
                }
                if self.open_enum {
                    p.print(
                        "$deprecation$public int get$capitalized_name$Value() {\n\
                         \x20 return $member$;\n\
                         }\n\
                         $deprecation$public Builder set$capitalized_name$Value(int value) {\n\
                         \x20 $member$ = value;\n\
                         \x20 $bit_field$ |= $builder_mask$;\n\
                         \x20 onChanged();\n\
                         \x20 return this;\n\
                         }\n",
                    );
                }
                p.print(
                    "$deprecation$public $type$ get$capitalized_name$() {\n\
                     \x20 $type$ result = $type$.forNumber($member$);\n\
                     \x20 return result == null ? $fallback$ : result;\n\
                     }\n\
                     $deprecation$public Builder set$capitalized_name$($type$ value) {\n\
                     \x20 if (value == null) { throw new NullPointerException(); }\n\
                     \x20 $bit_field$ |= $builder_mask$;\n\
                     \x20 $member$ = value.getNumber();\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder clear$capitalized_name$() {\n\
                     \x20 $bit_field$ = ($bit_field$ & ~$builder_mask$);\n\
                     \x20 $member$ = $default_number$;\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n",
                );
            }
            Variant::SingularMessage => {
                p.print(
                    "private $type$ $member$;\n\
                     $deprecation$public boolean has$capitalized_name$() {\n\
                     \x20 return (($bit_field$ & $builder_mask$) != 0);\n\
                     }\n\
                     $deprecation$public $type$ get$capitalized_name$() {\n\
                     \x20 return $member$ == null ? $type$.getDefaultInstance() : $member$;\n\
                     }\n\
                     $deprecation$public $type$OrBuilder get$capitalized_name$OrBuilder() {\n\
                     \x20 return $member$ == null ? $type$.getDefaultInstance() : $member$;\n\
                     }\n\
                     $deprecation$public Builder set$capitalized_name$($type$ value) {\n\
                     \x20 if (value == null) { throw new NullPointerException(); }\n\
                     \x20 $member$ = value;\n\
                     \x20 $bit_field$ |= $builder_mask$;\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder set$capitalized_name$($type$.Builder builderForValue) {\n\
                     \x20 $member$ = builderForValue.build();\n\
                     \x20 $bit_field$ |= $builder_mask$;\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder merge$capitalized_name$($type$ value) {\n\
                     \x20 if ((($bit_field$ & $builder_mask$) != 0)\n\
                     \x20     && $member$ != null\n\
                     \x20     && $member$ != $type$.getDefaultInstance()) {\n\
                     \x20   $member$ = $type$.newBuilder($member$).mergeFrom(value).buildPartial();\n\
                     \x20 } else {\n\
                     \x20   $member$ = value;\n\
                     \x20 }\n\
                     \x20 $bit_field$ |= $builder_mask$;\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder clear$capitalized_name$() {\n\
                     \x20 $bit_field$ = ($bit_field$ & ~$builder_mask$);\n\
                     \x20 $member$ = null;\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n",
                );
            }
            Variant::OneofPrimitive => {
                p.print(
                    "$deprecation$public boolean has$capitalized_name$() {\n\
                     \x20 return $case_member$ == $number$;\n\
                     }\n\
                     $deprecation$public $type$ get$capitalized_name$() {\n\
                     \x20 if ($case_member$ == $number$) {\n\
                     \x20   return ($boxed_type$) $oneof_member$;\n\
                     \x20 }\n\
                     \x20 return $default$;\n\
                     }\n\
                     $deprecation$public Builder set$capitalized_name$($type$ value) {\n\
                     \x20 $case_member$ = $number$;\n\
                     \x20 $oneof_member$ = value;\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder clear$capitalized_name$() {\n\
                     \x20 if ($case_member$ == $number$) {\n\
                     \x20   $case_member$ = 0;\n\
                     \x20   $oneof_member$ = null;\n\
                     \x20   onChanged();\n\
                     \x20 }\n\
                     \x20 return this;\n\
                     }\n",
                );
            }
            Variant::OneofString => {
                let value_type = if self.is_bytes() {
                    "com.google.protobuf.ByteString"
                } else {
                    "java.lang.String"
                };
                helpers::with_vars(
                    p,
                    &[("value_param".to_string(), value_type.to_string())],
                    |p| {
                        p.print(
                            "$deprecation$public boolean has$capitalized_name$() {\n\
                             \x20 return $case_member$ == $number$;\n\
                             }\n\
                             $deprecation$public Builder set$capitalized_name$($value_param$ value) {\n\
                             \x20 if (value == null) { throw new NullPointerException(); }\n\
                             \x20 $case_member$ = $number$;\n\
                             \x20 $oneof_member$ = value;\n\
                             \x20 onChanged();\n\
                             \x20 return this;\n\
                             }\n\
                             $deprecation$public Builder clear$capitalized_name$() {\n\
                             \x20 if ($case_member$ == $number$) {\n\
                             \x20   $case_member$ = 0;\n\
                             \x20   $oneof_member$ = null;\n\
                             \x20   onChanged();\n\
                             \x20 }\n\
                             \x20 return this;\n\
                             }\n",
                        );
                    },
                );
                if self.is_bytes() {
                    p.print(
                        "$deprecation$public com.google.protobuf.ByteString get$capitalized_name$() {\n\
                         \x20 if ($case_member$ == $number$) {\n\
                         \x20   return (com.google.protobuf.ByteString) $oneof_member$;\n\
                         \x20 }\n\
                         \x20 return $default$;\n\
                         }\n",
                    );
                } else {
                    p.print(
                        "$deprecation$public java.lang.String get$capitalized_name$() {\n\
                         \x20 java.lang.Object ref = $default$;\n\
                         \x20 if ($case_member$ == $number$) {\n\
                         \x20   ref = $oneof_member$;\n\
                         \x20 }\n\
                         \x20 if (!(ref instanceof java.lang.String)) {\n\
                         \x20   com.google.protobuf.ByteString bs =\n\
                         \x20       (com.google.protobuf.ByteString) ref;\n\
                         \x20   java.lang.String s = bs.toStringUtf8();\n\
                         \x20   if ($case_member$ == $number$) {\n\
                         \x20     $oneof_member$ = s;\n\
                         \x20   }\n\
                         \x20   return s;\n\
                         \x20 } else {\n\
                         \x20   return (java.lang.String) ref;\n\
                         \x20 }\n\
                         }\n\
                         $deprecation$public com.google.protobuf.ByteString get$capitalized_name$Bytes() {\n\
                         \x20 java.lang.Object ref = $default$;\n\
                         \x20 if ($case_member$ == $number$) {\n\
                         \x20   ref = $oneof_member$;\n\
                         \x20 }\n\
                         \x20 if (ref instanceof java.lang.String) {\n\
                         \x20   return com.google.protobuf.ByteString.copyFromUtf8((java.lang.String) ref);\n\
                         \x20 } else {\n\
                         \x20   return (com.google.protobuf.ByteString) ref;\n\
                         \x20 }\n\
                         }\n\
                         $deprecation$public Builder set$capitalized_name$Bytes(com.google.protobuf.ByteString value) {\n\
                         \x20 if (value == null) { throw new NullPointerException(); }\n\
                         \x20 $utf8_check$$case_member$ = $number$;\n\
                         \x20 $oneof_member$ = value;\n\
                         \x20 onChanged();\n\
                         \x20 return this;\n\
                         }\n",
                    );
                }
            }
            Variant::OneofEnum => {
                p.print(
                    "$deprecation$public boolean has$capitalized_name$() {\n\
                     \x20 return $case_member$ == $number$;\n\
                     }\n",
                );
                if self.open_enum {
                    p.print(
                        "$deprecation$public int get$capitalized_name$Value() {\n\
                         \x20 if ($case_member$ == $number$) {\n\
                         \x20   return ((java.lang.Integer) $oneof_member$).intValue();\n\
                         \x20 }\n\
                         \x20 return $default_number$;\n\
                         }\n\
                         $deprecation$public Builder set$capitalized_name$Value(int value) {\n\
                         \x20 $case_member$ = $number$;\n\
                         \x20 $oneof_member$ = value;\n\
                         \x20 onChanged();\n\
                         \x20 return this;\n\
                         }\n",
                    );
                }
                p.print(
                    "$deprecation$public $type$ get$capitalized_name$() {\n\
                     \x20 if ($case_member$ == $number$) {\n\
                     \x20   $type$ result = $type$.forNumber((java.lang.Integer) $oneof_member$);\n\
                     \x20   return result == null ? $fallback$ : result;\n\
                     \x20 }\n\
                     \x20 return $default$;\n\
                     }\n\
                     $deprecation$public Builder set$capitalized_name$($type$ value) {\n\
                     \x20 if (value == null) { throw new NullPointerException(); }\n\
                     \x20 $case_member$ = $number$;\n\
                     \x20 $oneof_member$ = value.getNumber();\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder clear$capitalized_name$() {\n\
                     \x20 if ($case_member$ == $number$) {\n\
                     \x20   $case_member$ = 0;\n\
                     \x20   $oneof_member$ = null;\n\
                     \x20   onChanged();\n\
                     \x20 }\n\
                     \x20 return this;\n\
                     }\n",
                );
            }
            Variant::OneofMessage => {
                p.print(
                    "$deprecation$public boolean has$capitalized_name$() {\n\
                     \x20 return $case_member$ == $number$;\n\
                     }\n\
                     $deprecation$public $type$ get$capitalized_name$() {\n\
                     \x20 if ($case_member$ == $number$) {\n\
                     \x20   return ($type$) $oneof_member$;\n\
                     \x20 }\n\
                     \x20 return $type$.getDefaultInstance();\n\
                     }\n\
                     $deprecation$public $type$OrBuilder get$capitalized_name$OrBuilder() {\n\
                     \x20 if ($case_member$ == $number$) {\n\
                     \x20   return ($type$) $oneof_member$;\n\
                     \x20 }\n\
                     \x20 return $type$.getDefaultInstance();\n\
                     }\n\
                     $deprecation$public Builder set$capitalized_name$($type$ value) {\n\
                     \x20 if (value == null) { throw new NullPointerException(); }\n\
                     \x20 $oneof_member$ = value;\n\
                     \x20 $case_member$ = $number$;\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder set$capitalized_name$($type$.Builder builderForValue) {\n\
                     \x20 $oneof_member$ = builderForValue.build();\n\
                     \x20 $case_member$ = $number$;\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder merge$capitalized_name$($type$ value) {\n\
                     \x20 if ($case_member$ == $number$\n\
                     \x20     && $oneof_member$ != $type$.getDefaultInstance()) {\n\
                     \x20   $oneof_member$ = $type$.newBuilder(($type$) $oneof_member$)\n\
                     \x20       .mergeFrom(value).buildPartial();\n\
                     \x20 } else {\n\
                     \x20   $oneof_member$ = value;\n\
                     \x20 }\n\
                     \x20 $case_member$ = $number$;\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder clear$capitalized_name$() {\n\
                     \x20 if ($case_member$ == $number$) {\n\
                     \x20   $case_member$ = 0;\n\
                     \x20   $oneof_member$ = null;\n\
                     \x20   onChanged();\n\
                     \x20 }\n\
                     \x20 return this;\n\
                     }\n",
                );
            }
            Variant::RepeatedPrimitive => {
                p.print(
                    "private $list_type$ $member$ = $empty_list$;\n\
                     private void ensure$capitalized_name$IsMutable() {\n\
                     \x20 if (!$member$.isModifiable()) {\n\
                     \x20   $member$ = makeMutableCopy($member$);\n\
                     \x20 }\n\
                     \x20 $bit_field$ |= $builder_mask$;\n\
                     }\n\
                     $deprecation$public java.util.List<$boxed_type$> get$capitalized_name$List() {\n\
                     \x20 $member$.makeImmutable();\n\
                     \x20 return $member$;\n\
                     }\n\
                     $deprecation$public int get$capitalized_name$Count() {\n\
                     \x20 return $member$.size();\n\
                     }\n\
                     $deprecation$public $type$ get$capitalized_name$(int index) {\n\
                     \x20 return $member$.$list_get$(index);\n\
                     }\n\
                     $deprecation$public Builder set$capitalized_name$(int index, $type$ value) {\n\
                     \x20 ensure$capitalized_name$IsMutable();\n\
                     \x20 $member$.$list_set$(index, value);\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder add$capitalized_name$($type$ value) {\n\
                     \x20 ensure$capitalized_name$IsMutable();\n\
                     \x20 $member$.$list_add$(value);\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder addAll$capitalized_name$(\n\
                     \x20   java.lang.Iterable<? extends $boxed_type$> values) {\n\
                     \x20 ensure$capitalized_name$IsMutable();\n\
                     \x20 com.google.protobuf.AbstractMessageLite.Builder.addAll(values, $member$);\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder clear$capitalized_name$() {\n\
                     \x20 $member$ = $empty_list$;\n\
                     \x20 $bit_field$ = ($bit_field$ & ~$builder_mask$);\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n",
                );
            }
            Variant::RepeatedString => {
                if self.is_bytes() {
                    p.print(
                        "private java.util.List<com.google.protobuf.ByteString> $member$ =\n\
                         \x20   java.util.Collections.emptyList();\n\
                         private void ensure$capitalized_name$IsMutable() {\n\
                         \x20 if ((($bit_field$ & $builder_mask$) == 0)) {\n\
                         \x20   $member$ = new java.util.ArrayList<com.google.protobuf.ByteString>($member$);\n\
                         \x20   $bit_field$ |= $builder_mask$;\n\
                         \x20 }\n\
                         }\n\
                         $deprecation$public java.util.List<com.google.protobuf.ByteString> get$capitalized_name$List() {\n\
                         \x20 return java.util.Collections.unmodifiableList($member$);\n\
                         }\n\
                         $deprecation$public int get$capitalized_name$Count() {\n\
                         \x20 return $member$.size();\n\
                         }\n\
                         $deprecation$public com.google.protobuf.ByteString get$capitalized_name$(int index) {\n\
                         \x20 return $member$.get(index);\n\
                         }\n\
                         $deprecation$public Builder set$capitalized_name$(int index, com.google.protobuf.ByteString value) {\n\
                         \x20 if (value == null) { throw new NullPointerException(); }\n\
                         \x20 ensure$capitalized_name$IsMutable();\n\
                         \x20 $member$.set(index, value);\n\
                         \x20 onChanged();\n\
                         \x20 return this;\n\
                         }\n\
                         $deprecation$public Builder add$capitalized_name$(com.google.protobuf.ByteString value) {\n\
                         \x20 if (value == null) { throw new NullPointerException(); }\n\
                         \x20 ensure$capitalized_name$IsMutable();\n\
                         \x20 $member$.add(value);\n\
                         \x20 onChanged();\n\
                         \x20 return this;\n\
                         }\n\
                         $deprecation$public Builder addAll$capitalized_name$(\n\
                         \x20   java.lang.Iterable<? extends com.google.protobuf.ByteString> values) {\n\
                         \x20 ensure$capitalized_name$IsMutable();\n\
                         \x20 com.google.protobuf.AbstractMessageLite.Builder.addAll(values, $member$);\n\
                         \x20 onChanged();\n\
                         \x20 return this;\n\
                         }\n\
                         $deprecation$public Builder clear$capitalized_name$() {\n\
                         \x20 $member$ = java.util.Collections.emptyList();\n\
                         \x20 $bit_field$ = ($bit_field$ & ~$builder_mask$);\n\
                         \x20 onChanged();\n\
                         \x20 return this;\n\
                         }\n",
                    );
                } else {
                    p.print(
                        "private com.google.protobuf.LazyStringArrayList $member$ =\n\
                         \x20   com.google.protobuf.LazyStringArrayList.emptyList();\n\
                         private void ensure$capitalized_name$IsMutable() {\n\
                         \x20 if (!$member$.isModifiable()) {\n\
                         \x20   $member$ = new com.google.protobuf.LazyStringArrayList($member$);\n\
                         \x20 }\n\
                         \x20 $bit_field$ |= $builder_mask$;\n\
                         }\n\
                         $deprecation$public com.google.protobuf.ProtocolStringList get$capitalized_name$List() {\n\
                         \x20 $member$.makeImmutable();\n\
                         \x20 return $member$;\n\
                         }\n\
                         $deprecation$public int get$capitalized_name$Count() {\n\
                         \x20 return $member$.size();\n\
                         }\n\
                         $deprecation$public java.lang.String get$capitalized_name$(int index) {\n\
                         \x20 return $member$.get(index);\n\
                         }\n\
                         $deprecation$public com.google.protobuf.ByteString get$capitalized_name$Bytes(int index) {\n\
                         \x20 return $member$.getByteString(index);\n\
                         }\n\
                         $deprecation$public Builder set$capitalized_name$(int index, java.lang.String value) {\n\
                         \x20 if (value == null) { throw new NullPointerException(); }\n\
                         \x20 ensure$capitalized_name$IsMutable();\n\
                         \x20 $member$.set(index, value);\n\
                         \x20 onChanged();\n\
                         \x20 return this;\n\
                         }\n\
                         $deprecation$public Builder add$capitalized_name$(java.lang.String value) {\n\
                         \x20 if (value == null) { throw new NullPointerException(); }\n\
                         \x20 ensure$capitalized_name$IsMutable();\n\
                         \x20 $member$.add(value);\n\
                         \x20 onChanged();\n\
                         \x20 return this;\n\
                         }\n\
                         $deprecation$public Builder addAll$capitalized_name$(\n\
                         \x20   java.lang.Iterable<java.lang.String> values) {\n\
                         \x20 ensure$capitalized_name$IsMutable();\n\
                         \x20 com.google.protobuf.AbstractMessageLite.Builder.addAll(values, $member$);\n\
                         \x20 onChanged();\n\
                         \x20 return this;\n\
                         }\n\
                         $deprecation$public Builder clear$capitalized_name$() {\n\
                         \x20 $member$ = com.google.protobuf.LazyStringArrayList.emptyList();\n\
                         \x20 $bit_field$ = ($bit_field$ & ~$builder_mask$);\n\
                         \x20 onChanged();\n\
                         \x20 return this;\n\
                         }\n\
                         $deprecation$public Builder add$capitalized_name$Bytes(com.google.protobuf.ByteString value) {\n\
                         \x20 if (value == null) { throw new NullPointerException(); }\n\
                         \x20 $utf8_check$ensure$capitalized_name$IsMutable();\n\
                         \x20 $member$.add(value);\n\
                         \x20 onChanged();\n\
                         \x20 return this;\n\
                         }\n",
                    );
                }
            }
            Variant::RepeatedEnum => {
                p.print(
                    "private java.util.List<java.lang.Integer> $member$ =\n\
                     \x20   java.util.Collections.emptyList();\n\
                     private void ensure$capitalized_name$IsMutable() {\n\
                     \x20 if ((($bit_field$ & $builder_mask$) == 0)) {\n\
                     \x20   $member$ = new java.util.ArrayList<java.lang.Integer>($member$);\n\
                     \x20   $bit_field$ |= $builder_mask$;\n\
                     \x20 }\n\
                     }\n\
                     $deprecation$public java.util.List<$type$> get$capitalized_name$List() {\n\
                     \x20 return new com.google.protobuf.Internal.ListAdapter<\n\
                     \x20     java.lang.Integer, $type$>($member$, $name$_converter_);\n\
                     }\n\
                     $deprecation$public int get$capitalized_name$Count() {\n\
                     \x20 return $member$.size();\n\
                     }\n\
                     $deprecation$public $type$ get$capitalized_name$(int index) {\n\
                     \x20 return $name$_converter_.convert($member$.get(index));\n\
                     }\n\
                     $deprecation$public Builder set$capitalized_name$(int index, $type$ value) {\n\
                     \x20 if (value == null) { throw new NullPointerException(); }\n\
                     \x20 ensure$capitalized_name$IsMutable();\n\
                     \x20 $member$.set(index, value.getNumber());\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder add$capitalized_name$($type$ value) {\n\
                     \x20 if (value == null) { throw new NullPointerException(); }\n\
                     \x20 ensure$capitalized_name$IsMutable();\n\
                     \x20 $member$.add(value.getNumber());\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder addAll$capitalized_name$(\n\
                     \x20   java.lang.Iterable<? extends $type$> values) {\n\
                     \x20 ensure$capitalized_name$IsMutable();\n\
                     \x20 for ($type$ value : values) {\n\
                     \x20   $member$.add(value.getNumber());\n\
                     \x20 }\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder clear$capitalized_name$() {\n\
                     \x20 $member$ = java.util.Collections.emptyList();\n\
                     \x20 $bit_field$ = ($bit_field$ & ~$builder_mask$);\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n",
                );
                if self.open_enum {
                    p.print(
                        "$deprecation$public java.util.List<java.lang.Integer> get$capitalized_name$ValueList() {\n\
                         \x20 return java.util.Collections.unmodifiableList($member$);\n\
                         }\n\
                         $deprecation$public int get$capitalized_name$Value(int index) {\n\
                         \x20 return $member$.get(index);\n\
                         }\n\
                         $deprecation$public Builder set$capitalized_name$Value(int index, int value) {\n\
                         \x20 ensure$capitalized_name$IsMutable();\n\
                         \x20 $member$.set(index, value);\n\
                         \x20 onChanged();\n\
                         \x20 return this;\n\
                         }\n\
                         $deprecation$public Builder add$capitalized_name$Value(int value) {\n\
                         \x20 ensure$capitalized_name$IsMutable();\n\
                         \x20 $member$.add(value);\n\
                         \x20 onChanged();\n\
                         \x20 return this;\n\
                         }\n",
                    );
                }
            }
            Variant::RepeatedMessage => {
                p.print(
                    "private java.util.List<$type$> $member$ =\n\
                     \x20   java.util.Collections.emptyList();\n\
                     private void ensure$capitalized_name$IsMutable() {\n\
                     \x20 if ((($bit_field$ & $builder_mask$) == 0)) {\n\
                     \x20   $member$ = new java.util.ArrayList<$type$>($member$);\n\
                     \x20   $bit_field$ |= $builder_mask$;\n\
                     \x20 }\n\
                     }\n\
                     $deprecation$public java.util.List<$type$> get$capitalized_name$List() {\n\
                     \x20 return java.util.Collections.unmodifiableList($member$);\n\
                     }\n\
                     $deprecation$public int get$capitalized_name$Count() {\n\
                     \x20 return $member$.size();\n\
                     }\n\
                     $deprecation$public $type$ get$capitalized_name$(int index) {\n\
                     \x20 return $member$.get(index);\n\
                     }\n\
                     $deprecation$public Builder set$capitalized_name$(int index, $type$ value) {\n\
                     \x20 if (value == null) { throw new NullPointerException(); }\n\
                     \x20 ensure$capitalized_name$IsMutable();\n\
                     \x20 $member$.set(index, value);\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder set$capitalized_name$(int index, $type$.Builder builderForValue) {\n\
                     \x20 ensure$capitalized_name$IsMutable();\n\
                     \x20 $member$.set(index, builderForValue.build());\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder add$capitalized_name$($type$ value) {\n\
                     \x20 if (value == null) { throw new NullPointerException(); }\n\
                     \x20 ensure$capitalized_name$IsMutable();\n\
                     \x20 $member$.add(value);\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder add$capitalized_name$($type$.Builder builderForValue) {\n\
                     \x20 ensure$capitalized_name$IsMutable();\n\
                     \x20 $member$.add(builderForValue.build());\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder addAll$capitalized_name$(\n\
                     \x20   java.lang.Iterable<? extends $type$> values) {\n\
                     \x20 ensure$capitalized_name$IsMutable();\n\
                     \x20 com.google.protobuf.AbstractMessageLite.Builder.addAll(values, $member$);\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder remove$capitalized_name$(int index) {\n\
                     \x20 ensure$capitalized_name$IsMutable();\n\
                     \x20 $member$.remove(index);\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder clear$capitalized_name$() {\n\
                     \x20 $member$ = java.util.Collections.emptyList();\n\
                     \x20 $bit_field$ = ($bit_field$ & ~$builder_mask$);\n\
                     \x20 onChanged();\n\
                     \x20 return this;\n\
                     }\n",
                );
            }
            Variant::Map => {
                p.print(
                    "private com.google.protobuf.MapField<$boxed_key$, $boxed_value$> $member$;\n\
                     private com.google.protobuf.MapField<$boxed_key$, $boxed_value$>\n\
                     internalGet$capitalized_name$() {\n\
                     \x20 if ($member$ == null) {\n\
                     \x20   return com.google.protobuf.MapField.emptyMapField(\n\
                     \x20       $capitalized_name$DefaultEntryHolder.defaultEntry);\n\
                     \x20 }\n\
                     \x20 return $member$;\n\
                     }\n\
                     private com.google.protobuf.MapField<$boxed_key$, $boxed_value$>\n\
                     internalGetMutable$capitalized_name$() {\n\
                     \x20 if ($member$ == null) {\n\
                     \x20   $member$ = com.google.protobuf.MapField.newMapField(\n\
                     \x20       $capitalized_name$DefaultEntryHolder.defaultEntry);\n\
                     \x20 }\n\
                     \x20 if (!$member$.isMutable()) {\n\
                     \x20   $member$ = $member$.copy();\n\
                     \x20 }\n\
                     \x20 $bit_field$ |= $builder_mask$;\n\
                     \x20 onChanged();\n\
                     \x20 return $member$;\n\
                     }\n\
                     $deprecation$public int get$capitalized_name$Count() {\n\
                     \x20 return internalGet$capitalized_name$().getMap().size();\n\
                     }\n\
                     $deprecation$public boolean contains$capitalized_name$($key_type$ key) {\n\
                     \x20 $key_null_check$return internalGet$capitalized_name$().getMap().containsKey(key);\n\
                     }\n\
                     $deprecation$public java.util.Map<$boxed_key$, $boxed_value$> get$capitalized_name$Map() {\n\
                     \x20 return internalGet$capitalized_name$().getMap();\n\
                     }\n\
                     $deprecation$public $value_type$ get$capitalized_name$OrDefault(\n\
                     \x20   $key_type$ key, $value_type$ defaultValue) {\n\
                     \x20 $key_null_check$java.util.Map<$boxed_key$, $boxed_value$> map =\n\
                     \x20     internalGet$capitalized_name$().getMap();\n\
                     \x20 return map.containsKey(key) ? map.get(key) : defaultValue;\n\
                     }\n\
                     $deprecation$public $value_type$ get$capitalized_name$OrThrow($key_type$ key) {\n\
                     \x20 $key_null_check$java.util.Map<$boxed_key$, $boxed_value$> map =\n\
                     \x20     internalGet$capitalized_name$().getMap();\n\
                     \x20 if (!map.containsKey(key)) {\n\
                     \x20   throw new java.lang.IllegalArgumentException();\n\
                     \x20 }\n\
                     \x20 return map.get(key);\n\
                     }\n\
                     $deprecation$public Builder clear$capitalized_name$() {\n\
                     \x20 $bit_field$ = ($bit_field$ & ~$builder_mask$);\n\
                     \x20 internalGetMutable$capitalized_name$().getMutableMap().clear();\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder remove$capitalized_name$($key_type$ key) {\n\
                     \x20 $key_null_check$internalGetMutable$capitalized_name$().getMutableMap().remove(key);\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder put$capitalized_name$($key_type$ key, $value_type$ value) {\n\
                     \x20 $key_null_check$$value_null_check$internalGetMutable$capitalized_name$().getMutableMap().put(key, value);\n\
                     \x20 $bit_field$ |= $builder_mask$;\n\
                     \x20 return this;\n\
                     }\n\
                     $deprecation$public Builder putAll$capitalized_name$(\n\
                     \x20   java.util.Map<$boxed_key$, $boxed_value$> values) {\n\
                     \x20 internalGetMutable$capitalized_name$().getMutableMap().putAll(values);\n\
                     \x20 $bit_field$ |= $builder_mask$;\n\
                     \x20 return this;\n\
                     }\n",
                );
            }
        });
    }

    /// Member initialization run from the message constructor and from
    /// `newInstance`. Oneof storage is initialized by the message generator.
    pub fn generate_initialization_code(&self, printer: &mut Printer) {
        helpers::with_vars(printer, &self.vars, |p| match self.variant {
            Variant::SingularPrimitive => {
                p.print("$member$ = $default$;\n");
            }
            Variant::SingularString => {
                p.print("$member$ = $default$;\n");
            }
            Variant::SingularEnum => {
                p.print("$member$ = $default_number$;\n");
            }
            Variant::RepeatedPrimitive => {
                p.print("$member$ = $empty_list$;\n");
            }
            Variant::RepeatedString => {
                if self.is_bytes() {
                    p.print("$member$ = java.util.Collections.emptyList();\n");
                } else {
                    p.print("$member$ = com.google.protobuf.LazyStringArrayList.emptyList();\n");
                }
            }
            Variant::RepeatedEnum => {
                p.print("$member$ = java.util.Collections.emptyList();\n");
            }
            Variant::RepeatedMessage => {
                p.print("$member$ = java.util.Collections.emptyList();\n");
            }
            _ => {}
        });
    }

    /// Reset run from `Builder.clear()`. The builder bit field itself is
    /// cleared once by the message generator.
    pub fn generate_builder_clear_code(&self, printer: &mut Printer) {
        helpers::with_vars(printer, &self.vars, |p| match self.variant {
            Variant::SingularPrimitive | Variant::SingularString => {
                p.print("$member$ = $default$;\n");
            }
            Variant::SingularEnum => {
                p.print("$member$ = $default_number$;\n");
            }
            Variant::SingularMessage => {
                p.print("$member$ = null;\n");
            }
            Variant::RepeatedPrimitive => {
                p.print("$member$ = $empty_list$;\n");
            }
            Variant::RepeatedString => {
                if self.is_bytes() {
                    p.print("$member$ = java.util.Collections.emptyList();\n");
                } else {
                    p.print("$member$ = com.google.protobuf.LazyStringArrayList.emptyList();\n");
                }
            }
            Variant::RepeatedEnum | Variant::RepeatedMessage => {
                p.print("$member$ = java.util.Collections.emptyList();\n");
            }
            Variant::Map => {
                p.print("internalGetMutable$capitalized_name$().clear();\n");
            }
            // Oneof storage is reset by the message generator.
            _ => {}
        });
    }

    /// Per-field body of `Builder.mergeFrom(Message other)`. Oneof members
    /// run inside the per-oneof case switch emitted by the message
    /// generator.
    pub fn generate_merging_code(&self, printer: &mut Printer) {
        helpers::with_vars(printer, &self.vars, |p| match self.variant {
            Variant::SingularPrimitive | Variant::SingularEnum => {
                if self.has_hazzer {
                    p.print(
                        "if (other.has$capitalized_name$()) {\n\
                         \x20 set$capitalized_name$(other.get$capitalized_name$());\n\
                         }\n",
                    );
                } else if self.open_enum {
                    p.print(
                        "if (other.$member$ != $default_number$) {\n\
                         \x20 set$capitalized_name$Value(other.get$capitalized_name$Value());\n\
                         }\n",
                    );
                } else {
                    p.print(
                        "if (other.get$capitalized_name$() != $default$) {\n\
                         \x20 set$capitalized_name$(other.get$capitalized_name$());\n\
                         }\n",
                    );
                }
            }
            Variant::SingularString => {
                if self.has_hazzer {
                    p.print(
                        "if (other.has$capitalized_name$()) {\n\
                         \x20 $member$ = other.$member$;\n\
                         \x20 $bit_field$ |= $builder_mask$;\n\
                         \x20 onChanged();\n\
                         }\n",
                    );
                } else if self.is_bytes() {
                    p.print(
                        "if (other.get$capitalized_name$() != $default$) {\n\
                         \x20 set$capitalized_name$(other.get$capitalized_name$());\n\
                         }\n",
                    );
                } else {
                    p.print(
                        "if (!other.get$capitalized_name$().isEmpty()) {\n\
                         \x20 $member$ = other.$member$;\n\
                         \x20 $bit_field$ |= $builder_mask$;\n\
                         \x20 onChanged();\n\
                         }\n",
                    );
                }
            }
            Variant::SingularMessage => {
                p.print(
                    "if (other.has$capitalized_name$()) {\n\
                     \x20 merge$capitalized_name$(other.get$capitalized_name$());\n\
                     }\n",
                );
            }
            Variant::OneofPrimitive => {
                p.print("set$capitalized_name$(other.get$capitalized_name$());\n");
            }
            Variant::OneofString => {
                if self.is_bytes() {
                    p.print("set$capitalized_name$(other.get$capitalized_name$());\n");
                } else {
                    p.print(
                        "$case_member$ = $number$;\n\
                         $oneof_member$ = other.$oneof_member$;\n\
                         onChanged();\n",
                    );
                }
            }
            Variant::OneofEnum => {
                if self.open_enum {
                    p.print("set$capitalized_name$Value(other.get$capitalized_name$Value());\n");
                } else {
                    p.print("set$capitalized_name$(other.get$capitalized_name$());\n");
                }
            }
            Variant::OneofMessage => {
                p.print("merge$capitalized_name$(other.get$capitalized_name$());\n");
            }
            Variant::RepeatedPrimitive => {
                p.print(
                    "if (!other.$member$.isEmpty()) {\n\
                     \x20 if ($member$.isEmpty()) {\n\
                     \x20   $member$ = other.$member$;\n\
                     \x20   $member$.makeImmutable();\n\
                     \x20   $bit_field$ |= $builder_mask$;\n\
                     \x20 } else {\n\
                     \x20   ensure$capitalized_name$IsMutable();\n\
                     \x20   $member$.addAll(other.$member$);\n\
                     \x20 }\n\
                     \x20 onChanged();\n\
                     }\n",
                );
            }
            Variant::RepeatedString | Variant::RepeatedEnum | Variant::RepeatedMessage => {
                p.print(
                    "if (!other.$member$.isEmpty()) {\n\
                     \x20 if ($member$.isEmpty()) {\n\
                     \x20   $member$ = other.$member$;\n\
                     \x20   $bit_field$ = ($bit_field$ & ~$builder_mask$);\n\
                     \x20 } else {\n\
                     \x20   ensure$capitalized_name$IsMutable();\n\
                     \x20   $member$.addAll(other.$member$);\n\
                     \x20 }\n\
                     \x20 onChanged();\n\
                     }\n",
                );
            }
            Variant::Map => {
                p.print(
                    "internalGetMutable$capitalized_name$().mergeFrom(\n\
                     \x20   other.internalGet$capitalized_name$());\n\
                     $bit_field$ |= $builder_mask$;\n",
                );
            }
        });
    }

    /// Per-field body of `buildPartial`. Non-oneof fields are gated on the
    /// builder dirty bit; oneof storage is copied wholesale by the message
    /// generator.
    pub fn generate_building_code(&self, printer: &mut Printer) {
        helpers::with_vars(printer, &self.vars, |p| match self.variant {
            Variant::SingularPrimitive | Variant::SingularString | Variant::SingularEnum => {
                if self.has_hazzer {
                    p.print(
                        "if (((from_$bit_field$ & $builder_mask$) != 0)) {\n\
                         \x20 result.$member$ = $member$;\n\
                         \x20 to_$has_field$ |= $has_mask$;\n\
                         }\n",
                    );
                } else {
                    p.print(
                        "if (((from_$bit_field$ & $builder_mask$) != 0)) {\n\
                         \x20 result.$member$ = $member$;\n\
                         }\n",
                    );
                }
            }
            Variant::SingularMessage => {
                p.print(
                    "if (((from_$bit_field$ & $builder_mask$) != 0)) {\n\
                     \x20 result.$member$ = $member$;\n\
                     }\n",
                );
            }
            Variant::RepeatedPrimitive => {
                p.print(
                    "if (((from_$bit_field$ & $builder_mask$) != 0)) {\n\
                     \x20 $member$.makeImmutable();\n\
                     }\n\
                     result.$member$ = $member$;\n",
                );
            }
            Variant::RepeatedString => {
                if self.is_bytes() {
                    p.print(
                        "if (((from_$bit_field$ & $builder_mask$) != 0)) {\n\
                         \x20 $member$ = java.util.Collections.unmodifiableList($member$);\n\
                         \x20 $bit_field$ = ($bit_field$ & ~$builder_mask$);\n\
                         }\n\
                         result.$member$ = $member$;\n",
                    );
                } else {
                    p.print(
                        "$member$.makeImmutable();\n\
                         result.$member$ = $member$;\n",
                    );
                }
            }
            Variant::RepeatedEnum | Variant::RepeatedMessage => {
                p.print(
                    "if (((from_$bit_field$ & $builder_mask$) != 0)) {\n\
                     \x20 $member$ = java.util.Collections.unmodifiableList($member$);\n\
                     \x20 $bit_field$ = ($bit_field$ & ~$builder_mask$);\n\
                     }\n\
                     result.$member$ = $member$;\n",
                );
            }
            Variant::Map => {
                p.print(
                    "result.$member$ = internalGet$capitalized_name$();\n\
                     result.$member$.makeImmutable();\n",
                );
            }
            // Oneof storage is copied wholesale by the message generator.
            _ => {}
        });
    }

    /// One case of the tag switch inside
    /// `Builder.mergeFrom(CodedInputStream, ExtensionRegistryLite)`.
    pub fn generate_builder_parsing_code(&self, printer: &mut Printer) {
        helpers::with_vars(printer, &self.vars, |p| match self.variant {
            Variant::SingularPrimitive => {
                p.print(
                    "case $tag$: {\n\
                     \x20 $member$ = $read_call$;\n\
                     \x20 $bit_field$ |= $builder_mask$;\n\
                     \x20 break;\n\
                     }\n",
                );
            }
            Variant::SingularString => {
                p.print(
                    "case $tag$: {\n\
                     \x20 $member$ = $read_call$;\n\
                     \x20 $bit_field$ |= $builder_mask$;\n\
                     \x20 break;\n\
                     }\n",
                );
            }
            Variant::SingularEnum => {
                if self.open_enum {
                    p.print(
                        "case $tag$: {\n\
                         \x20 $member$ = input.readEnum();\n\
                         \x20 $bit_field$ |= $builder_mask$;\n\
                         \x20 break;\n\
                         }\n",
                    );
                } else {
                    p.print(
                        "case $tag$: {\n\
                         \x20 int tmpRaw = input.readEnum();\n\
                         \x20 if ($type$.forNumber(tmpRaw) == null) {\n\
                         \x20   mergeUnknownVarintField($number$, tmpRaw);\n\
                         \x20 } else {\n\
                         \x20   $member$ = tmpRaw;\n\
                         \x20   $bit_field$ |= $builder_mask$;\n\
                         \x20 }\n\
                         \x20 break;\n\
                         }\n",
                    );
                }
            }
            Variant::SingularMessage => {
                p.print(
                    "case $tag$: {\n\
                     \x20 merge$capitalized_name$($read_call$);\n\
                     \x20 break;\n\
                     }\n",
                );
            }
            Variant::OneofPrimitive => {
                p.print(
                    "case $tag$: {\n\
                     \x20 $oneof_member$ = $read_call$;\n\
                     \x20 $case_member$ = $number$;\n\
                     \x20 break;\n\
                     }\n",
                );
            }
            Variant::OneofString => {
                p.print(
                    "case $tag$: {\n\
                     \x20 $oneof_member$ = $read_call$;\n\
                     \x20 $case_member$ = $number$;\n\
                     \x20 break;\n\
                     }\n",
                );
            }
            Variant::OneofEnum => {
                if self.open_enum {
                    p.print(
                        "case $tag$: {\n\
                         \x20 $oneof_member$ = input.readEnum();\n\
                         \x20 $case_member$ = $number$;\n\
                         \x20 break;\n\
                         }\n",
                    );
                } else {
                    p.print(
                        "case $tag$: {\n\
                         \x20 int tmpRaw = input.readEnum();\n\
                         \x20 if ($type$.forNumber(tmpRaw) == null) {\n\
                         \x20   mergeUnknownVarintField($number$, tmpRaw);\n\
                         \x20 } else {\n\
                         \x20   $oneof_member$ = tmpRaw;\n\
                         \x20   $case_member$ = $number$;\n\
                         \x20 }\n\
                         \x20 break;\n\
                         }\n",
                    );
                }
            }
            Variant::OneofMessage => {
                p.print(
                    "case $tag$: {\n\
                     \x20 merge$capitalized_name$($read_call$);\n\
                     \x20 break;\n\
                     }\n",
                );
            }
            Variant::RepeatedPrimitive => {
                p.print(
                    "case $tag$: {\n\
                     \x20 $type$ v = $read_call$;\n\
                     \x20 ensure$capitalized_name$IsMutable();\n\
                     \x20 $member$.$list_add$(v);\n\
                     \x20 break;\n\
                     }\n",
                );
                if self.field.is_packable() {
                    p.print(
                        "case $packed_tag$: {\n\
                         \x20 int length = input.readRawVarint32();\n\
                         \x20 int limit = input.pushLimit(length);\n\
                         \x20 ensure$capitalized_name$IsMutable();\n\
                         \x20 while (input.getBytesUntilLimit() > 0) {\n\
                         \x20   $member$.$list_add$($read_call$);\n\
                         \x20 }\n\
                         \x20 input.popLimit(limit);\n\
                         \x20 break;\n\
                         }\n",
                    );
                }
            }
            Variant::RepeatedString => {
                if self.is_bytes() {
                    p.print(
                        "case $tag$: {\n\
                         \x20 com.google.protobuf.ByteString v = input.readBytes();\n\
                         \x20 ensure$capitalized_name$IsMutable();\n\
                         \x20 $member$.add(v);\n\
                         \x20 break;\n\
                         }\n",
                    );
                } else {
                    p.print(
                        "case $tag$: {\n\
                         \x20 java.lang.String s = $read_call$;\n\
                         \x20 ensure$capitalized_name$IsMutable();\n\
                         \x20 $member$.add(s);\n\
                         \x20 break;\n\
                         }\n",
                    );
                }
            }
            Variant::RepeatedEnum => {
                if self.open_enum {
                    p.print(
                        "case $tag$: {\n\
                         \x20 int tmpRaw = input.readEnum();\n\
                         \x20 ensure$capitalized_name$IsMutable();\n\
                         \x20 $member$.add(tmpRaw);\n\
                         \x20 break;\n\
                         }\n\
                         case $packed_tag$: {\n\
                         \x20 int length = input.readRawVarint32();\n\
                         \x20 int oldLimit = input.pushLimit(length);\n\
                         \x20 while (input.getBytesUntilLimit() > 0) {\n\
                         \x20   int tmpRaw = input.readEnum();\n\
                         \x20   ensure$capitalized_name$IsMutable();\n\
                         \x20   $member$.add(tmpRaw);\n\
                         \x20 }\n\
                         \x20 input.popLimit(oldLimit);\n\
                         \x20 break;\n\
                         }\n",
                    );
                } else {
                    p.print(
                        "case $tag$: {\n\
                         \x20 int tmpRaw = input.readEnum();\n\
                         \x20 if ($type$.forNumber(tmpRaw) == null) {\n\
                         \x20   mergeUnknownVarintField($number$, tmpRaw);\n\
                         \x20 } else {\n\
                         \x20   ensure$capitalized_name$IsMutable();\n\
                         \x20   $member$.add(tmpRaw);\n\
                         \x20 }\n\
                         \x20 break;\n\
                         }\n\
                         case $packed_tag$: {\n\
                         \x20 int length = input.readRawVarint32();\n\
                         \x20 int oldLimit = input.pushLimit(length);\n\
                         \x20 while (input.getBytesUntilLimit() > 0) {\n\
                         \x20   int tmpRaw = input.readEnum();\n\
                         \x20   if ($type$.forNumber(tmpRaw) == null) {\n\
                         \x20     mergeUnknownVarintField($number$, tmpRaw);\n\
                         \x20   } else {\n\
                         \x20     ensure$capitalized_name$IsMutable();\n\
                         \x20     $member$.add(tmpRaw);\n\
                         \x20   }\n\
                         \x20 }\n\
                         \x20 input.popLimit(oldLimit);\n\
                         \x20 break;\n\
                         }\n",
                    );
                }
            }
            Variant::RepeatedMessage => {
                p.print(
                    "case $tag$: {\n\
                     \x20 $type$ m = $read_call$;\n\
                     \x20 ensure$capitalized_name$IsMutable();\n\
                     \x20 $member$.add(m);\n\
                     \x20 break;\n\
                     }\n",
                );
            }
            Variant::Map => {
                p.print(
                    "case $tag$: {\n\
                     \x20 com.google.protobuf.MapEntry<$boxed_key$, $boxed_value$> entry__ =\n\
                     \x20     input.readMessage(\n\
                     \x20         $capitalized_name$DefaultEntryHolder.defaultEntry.getParserForType(),\n\
                     \x20         extensionRegistry);\n\
                     \x20 internalGetMutable$capitalized_name$().getMutableMap().put(\n\
                     \x20     entry__.getKey(), entry__.getValue());\n\
                     \x20 $bit_field$ |= $builder_mask$;\n\
                     \x20 break;\n\
                     }\n",
                );
            }
        });
    }

    /// Per-field body of `writeTo(CodedOutputStream)`.
    pub fn generate_serialization_code(&self, printer: &mut Printer) {
        helpers::with_vars(printer, &self.vars, |p| match self.variant {
            Variant::SingularPrimitive => {
                if self.has_hazzer {
                    p.print(
                        "if ((($has_field$ & $has_mask$) != 0)) {\n\
                         \x20 output.write$capitalized_type$($number$, $member$);\n\
                         }\n",
                    );
                } else {
                    p.print(
                        "if ($nonzero_condition$) {\n\
                         \x20 output.write$capitalized_type$($number$, $member$);\n\
                         }\n",
                    );
                }
            }
            Variant::SingularString => {
                let guard = if self.has_hazzer {
                    "if ((($has_field$ & $has_mask$) != 0)) {\n"
                } else if self.is_bytes() {
                    "if (!$member$.isEmpty()) {\n"
                } else {
                    "if (!com.google.protobuf.GeneratedMessageV3.isStringEmpty($member$)) {\n"
                };
                p.print(guard);
                if self.is_bytes() {
                    p.print("\x20 output.writeBytes($number$, $member$);\n}\n");
                } else {
                    p.print(
                        "\x20 com.google.protobuf.GeneratedMessageV3.writeString(output, $number$, $member$);\n}\n",
                    );
                }
            }
            Variant::SingularEnum => {
                if self.has_hazzer {
                    p.print(
                        "if ((($has_field$ & $has_mask$) != 0)) {\n\
                         \x20 output.writeEnum($number$, $member$);\n\
                         }\n",
                    );
                } else {
                    p.print(
                        "if ($member$ != $default_number$) {\n\
                         \x20 output.writeEnum($number$, $member$);\n\
                         }\n",
                    );
                }
            }
            Variant::SingularMessage => {
                p.print(
                    "if ($member$ != null) {\n\
                     \x20 output.write$capitalized_type$($number$, get$capitalized_name$());\n\
                     }\n",
                );
            }
            Variant::OneofPrimitive => {
                p.print(
                    "if ($case_member$ == $number$) {\n\
                     \x20 output.write$capitalized_type$(\n\
                     \x20     $number$, ($write_cast$) $oneof_member$);\n\
                     }\n",
                );
            }
            Variant::OneofString => {
                if self.is_bytes() {
                    p.print(
                        "if ($case_member$ == $number$) {\n\
                         \x20 output.writeBytes(\n\
                         \x20     $number$, (com.google.protobuf.ByteString) $oneof_member$);\n\
                         }\n",
                    );
                } else {
                    p.print(
                        "if ($case_member$ == $number$) {\n\
                         \x20 com.google.protobuf.GeneratedMessageV3.writeString(output, $number$, $oneof_member$);\n\
                         }\n",
                    );
                }
            }
            Variant::OneofEnum => {
                p.print(
                    "if ($case_member$ == $number$) {\n\
                     \x20 output.writeEnum($number$, ((java.lang.Integer) $oneof_member$));\n\
                     }\n",
                );
            }
            Variant::OneofMessage => {
                p.print(
                    "if ($case_member$ == $number$) {\n\
                     \x20 output.write$capitalized_type$($number$, ($type$) $oneof_member$);\n\
                     }\n",
                );
            }
            Variant::RepeatedPrimitive | Variant::RepeatedEnum => {
                if self.packed {
                    p.print(
                        "if (get$capitalized_name$List().size() > 0) {\n\
                         \x20 output.writeUInt32NoTag($packed_tag$);\n\
                         \x20 output.writeUInt32NoTag($name$MemoizedSerializedSize);\n\
                         }\n\
                         for (int i = 0; i < $member$.size(); i++) {\n\
                         \x20 output.write$capitalized_type$NoTag($member$.$list_get_raw$(i));\n\
                         }\n",
                    );
                } else {
                    p.print(
                        "for (int i = 0; i < $member$.size(); i++) {\n\
                         \x20 output.write$capitalized_type$($number$, $member$.$list_get_raw$(i));\n\
                         }\n",
                    );
                }
            }
            Variant::RepeatedString => {
                if self.is_bytes() {
                    p.print(
                        "for (int i = 0; i < $member$.size(); i++) {\n\
                         \x20 output.writeBytes($number$, $member$.get(i));\n\
                         }\n",
                    );
                } else {
                    p.print(
                        "for (int i = 0; i < $member$.size(); i++) {\n\
                         \x20 com.google.protobuf.GeneratedMessageV3.writeString(output, $number$, $member$.getRaw(i));\n\
                         }\n",
                    );
                }
            }
            Variant::RepeatedMessage => {
                p.print(
                    "for (int i = 0; i < $member$.size(); i++) {\n\
                     \x20 output.write$capitalized_type$($number$, $member$.get(i));\n\
                     }\n",
                );
            }
            Variant::Map => {
                p.print(
                    "com.google.protobuf.GeneratedMessageV3.serialize$map_serializer$MapTo(\n\
                     \x20   output,\n\
                     \x20   internalGet$capitalized_name$(),\n\
                     \x20   $capitalized_name$DefaultEntryHolder.defaultEntry,\n\
                     \x20   $number$);\n",
                );
            }
        });
    }

    /// Per-field body of `getSerializedSize`.
    pub fn generate_serialized_size_code(&self, printer: &mut Printer) {
        helpers::with_vars(printer, &self.vars, |p| match self.variant {
            Variant::SingularPrimitive => {
                let guard = if self.has_hazzer {
                    "if ((($has_field$ & $has_mask$) != 0)) {\n"
                } else {
                    "if ($nonzero_condition$) {\n"
                };
                p.print(guard);
                p.print(
                    "\x20 size += com.google.protobuf.CodedOutputStream\n\
                     \x20     .compute$capitalized_type$Size($number$, $member$);\n\
                     }\n",
                );
            }
            Variant::SingularString => {
                let guard = if self.has_hazzer {
                    "if ((($has_field$ & $has_mask$) != 0)) {\n"
                } else if self.is_bytes() {
                    "if (!$member$.isEmpty()) {\n"
                } else {
                    "if (!com.google.protobuf.GeneratedMessageV3.isStringEmpty($member$)) {\n"
                };
                p.print(guard);
                if self.is_bytes() {
                    p.print(
                        "\x20 size += com.google.protobuf.CodedOutputStream\n\
                         \x20     .computeBytesSize($number$, $member$);\n\
                         }\n",
                    );
                } else {
                    p.print(
                        "\x20 size += com.google.protobuf.GeneratedMessageV3.computeStringSize($number$, $member$);\n\
                         }\n",
                    );
                }
            }
            Variant::SingularEnum => {
                let guard = if self.has_hazzer {
                    "if ((($has_field$ & $has_mask$) != 0)) {\n"
                } else {
                    "if ($member$ != $default_number$) {\n"
                };
                p.print(guard);
                p.print(
                    "\x20 size += com.google.protobuf.CodedOutputStream\n\
                     \x20     .computeEnumSize($number$, $member$);\n\
                     }\n",
                );
            }
            Variant::SingularMessage => {
                p.print(
                    "if ($member$ != null) {\n\
                     \x20 size += com.google.protobuf.CodedOutputStream\n\
                     \x20     .compute$capitalized_type$Size($number$, get$capitalized_name$());\n\
                     }\n",
                );
            }
            Variant::OneofPrimitive => {
                p.print(
                    "if ($case_member$ == $number$) {\n\
                     \x20 size += com.google.protobuf.CodedOutputStream\n\
                     \x20     .compute$capitalized_type$Size(\n\
                     \x20         $number$, ($write_cast$) $oneof_member$);\n\
                     }\n",
                );
            }
            Variant::OneofString => {
                if self.is_bytes() {
                    p.print(
                        "if ($case_member$ == $number$) {\n\
                         \x20 size += com.google.protobuf.CodedOutputStream\n\
                         \x20     .computeBytesSize(\n\
                         \x20         $number$, (com.google.protobuf.ByteString) $oneof_member$);\n\
                         }\n",
                    );
                } else {
                    p.print(
                        "if ($case_member$ == $number$) {\n\
                         \x20 size += com.google.protobuf.GeneratedMessageV3.computeStringSize($number$, $oneof_member$);\n\
                         }\n",
                    );
                }
            }
            Variant::OneofEnum => {
                p.print(
                    "if ($case_member$ == $number$) {\n\
                     \x20 size += com.google.protobuf.CodedOutputStream\n\
                     \x20     .computeEnumSize($number$, ((java.lang.Integer) $oneof_member$));\n\
                     }\n",
                );
            }
            Variant::OneofMessage => {
                p.print(
                    "if ($case_member$ == $number$) {\n\
                     \x20 size += com.google.protobuf.CodedOutputStream\n\
                     \x20     .compute$capitalized_type$Size($number$, ($type$) $oneof_member$);\n\
                     }\n",
                );
            }
            Variant::RepeatedPrimitive | Variant::RepeatedEnum => {
                if self.packed {
                    p.print(
                        "{\n\
                         \x20 int dataSize = 0;\n\
                         \x20 for (int i = 0; i < $member$.size(); i++) {\n\
                         \x20   dataSize += com.google.protobuf.CodedOutputStream\n\
                         \x20       .compute$capitalized_type$SizeNoTag($member$.$list_get_raw$(i));\n\
                         \x20 }\n\
                         \x20 size += dataSize;\n\
                         \x20 if (!get$capitalized_name$List().isEmpty()) {\n\
                         \x20   size += $tag_size$;\n\
                         \x20   size += com.google.protobuf.CodedOutputStream\n\
                         \x20       .computeInt32SizeNoTag(dataSize);\n\
                         \x20 }\n\
                         \x20 $name$MemoizedSerializedSize = dataSize;\n\
                         }\n",
                    );
                } else {
                    p.print(
                        "{\n\
                         \x20 int dataSize = 0;\n\
                         \x20 for (int i = 0; i < $member$.size(); i++) {\n\
                         \x20   dataSize += com.google.protobuf.CodedOutputStream\n\
                         \x20       .compute$capitalized_type$SizeNoTag($member$.$list_get_raw$(i));\n\
                         \x20 }\n\
                         \x20 size += dataSize;\n\
                         \x20 size += $tag_size$ * get$capitalized_name$List().size();\n\
                         }\n",
                    );
                }
            }
            Variant::RepeatedString => {
                p.print(
                    "{\n\
                     \x20 int dataSize = 0;\n\
                     \x20 for (int i = 0; i < $member$.size(); i++) {\n",
                );
                if self.is_bytes() {
                    p.print(
                        "\x20   dataSize += com.google.protobuf.CodedOutputStream\n\
                         \x20       .computeBytesSizeNoTag($member$.get(i));\n",
                    );
                } else {
                    p.print(
                        "\x20   dataSize += computeStringSizeNoTag($member$.getRaw(i));\n",
                    );
                }
                p.print(
                    "\x20 }\n\
                     \x20 size += dataSize;\n\
                     \x20 size += $tag_size$ * get$capitalized_name$List().size();\n\
                     }\n",
                );
            }
            Variant::RepeatedMessage => {
                p.print(
                    "for (int i = 0; i < $member$.size(); i++) {\n\
                     \x20 size += com.google.protobuf.CodedOutputStream\n\
                     \x20     .compute$capitalized_type$Size($number$, $member$.get(i));\n\
                     }\n",
                );
            }
            Variant::Map => {
                p.print(
                    "for (java.util.Map.Entry<$boxed_key$, $boxed_value$> entry\n\
                     \x20    : internalGet$capitalized_name$().getMap().entrySet()) {\n\
                     \x20 com.google.protobuf.MapEntry<$boxed_key$, $boxed_value$> entry__ =\n\
                     \x20     $capitalized_name$DefaultEntryHolder.defaultEntry.newBuilderForType()\n\
                     \x20         .setKey(entry.getKey())\n\
                     \x20         .setValue(entry.getValue())\n\
                     \x20         .build();\n\
                     \x20 size += com.google.protobuf.CodedOutputStream\n\
                     \x20     .computeMessageSize($number$, entry__);\n\
                     }\n",
                );
            }
        });
    }

    /// Per-field comparison inside `equals`. Oneof members run inside the
    /// per-oneof case switch.
    pub fn generate_equals_code(&self, printer: &mut Printer) {
        helpers::with_vars(printer, &self.vars, |p| {
            if self.has_hazzer && self.field.real_containing_oneof().is_none() {
                p.print(
                    "if (has$capitalized_name$() != other.has$capitalized_name$()) return false;\n\
                     if (has$capitalized_name$()) {\n\
                     \x20 if ($not_equal_condition$) return false;\n\
                     }\n",
                );
                return;
            }
            match self.variant {
                Variant::Map => {
                    p.print(
                        "if (!internalGet$capitalized_name$().equals(\n\
                         \x20   other.internalGet$capitalized_name$())) return false;\n",
                    );
                }
                _ => {
                    p.print("if ($not_equal_condition$) return false;\n");
                }
            }
        });
    }

    /// Per-field contribution to `hashCode`. Oneof members run inside the
    /// per-oneof case switch; repeated and map fields are guarded on
    /// emptiness.
    pub fn generate_hash_code(&self, printer: &mut Printer) {
        helpers::with_vars(printer, &self.vars, |p| match self.variant {
            Variant::RepeatedPrimitive
            | Variant::RepeatedString
            | Variant::RepeatedEnum
            | Variant::RepeatedMessage => {
                p.print(
                    "if (get$capitalized_name$Count() > 0) {\n\
                     \x20 hash = (37 * hash) + $constant_name$;\n\
                     \x20 hash = (53 * hash) + $hash_expr$;\n\
                     }\n",
                );
            }
            Variant::Map => {
                p.print(
                    "if (!internalGet$capitalized_name$().getMap().isEmpty()) {\n\
                     \x20 hash = (37 * hash) + $constant_name$;\n\
                     \x20 hash = (53 * hash) + internalGet$capitalized_name$().hashCode();\n\
                     }\n",
                );
            }
            _ => {
                if self.has_hazzer && self.field.real_containing_oneof().is_none() {
                    p.print(
                        "if (has$capitalized_name$()) {\n\
                         \x20 hash = (37 * hash) + $constant_name$;\n\
                         \x20 hash = (53 * hash) + $hash_expr$;\n\
                         }\n",
                    );
                } else {
                    p.print(
                        "hash = (37 * hash) + $constant_name$;\n\
                         hash = (53 * hash) + $hash_expr$;\n",
                    );
                }
            }
        });
    }
}

fn constant_name(field: FieldDescriptor<'_>) -> String {
    format!("{}_FIELD_NUMBER", field.name().to_ascii_uppercase())
}

fn list_parts(field: FieldDescriptor<'_>) -> (&'static str, &'static str, &'static str, &'static str, &'static str) {
    // (list type, empty factory, indexed get, indexed set, add)
    match field.cpp_type() {
        CppType::Int32 | CppType::UInt32 => (
            "com.google.protobuf.Internal.IntList",
            "emptyIntList()",
            "getInt",
            "setInt",
            "addInt",
        ),
        CppType::Int64 | CppType::UInt64 => (
            "com.google.protobuf.Internal.LongList",
            "emptyLongList()",
            "getLong",
            "setLong",
            "addLong",
        ),
        CppType::Float => (
            "com.google.protobuf.Internal.FloatList",
            "emptyFloatList()",
            "getFloat",
            "setFloat",
            "addFloat",
        ),
        CppType::Double => (
            "com.google.protobuf.Internal.DoubleList",
            "emptyDoubleList()",
            "getDouble",
            "setDouble",
            "addDouble",
        ),
        CppType::Bool => (
            "com.google.protobuf.Internal.BooleanList",
            "emptyBooleanList()",
            "getBoolean",
            "setBoolean",
            "addBoolean",
        ),
        _ => ("java.util.List", "java.util.Collections.emptyList()", "get", "set", "add"),
    }
}

fn read_call(field: FieldDescriptor<'_>, check_utf8: bool) -> Result<String> {
    Ok(match field.cpp_type() {
        CppType::String => {
            if check_utf8 {
                "input.readStringRequireUtf8()".to_string()
            } else {
                "input.readBytes()".to_string()
            }
        }
        CppType::Bytes => "input.readBytes()".to_string(),
        CppType::Message => {
            let target = names::qualified_class_name(field.message_type().expect("message field"))?;
            if field.proto_type() == Type::Group {
                format!(
                    "input.readGroup({}, {target}.parser(), extensionRegistry)",
                    field.number()
                )
            } else {
                format!("input.readMessage({target}.parser(), extensionRegistry)")
            }
        }
        _ => format!("input.read{}()", helpers::capitalized_type_name(field)),
    })
}

fn hash_expr(field: FieldDescriptor<'_>, info: &FieldGeneratorInfo, open_enum: bool) -> String {
    let cap = &info.capitalized_name;
    if field.is_map() {
        return format!("internalGet{cap}().hashCode()");
    }
    if field.is_repeated() {
        return match field.cpp_type() {
            CppType::Enum if open_enum => format!("get{cap}ValueList().hashCode()"),
            CppType::Enum => format!("{}_.hashCode()", info.name),
            _ => format!("get{cap}List().hashCode()"),
        };
    }
    match field.cpp_type() {
        CppType::Int32 | CppType::UInt32 => format!("get{cap}()"),
        CppType::Int64 | CppType::UInt64 => {
            format!("com.google.protobuf.Internal.hashLong(\n      get{cap}())")
        }
        CppType::Bool => format!("com.google.protobuf.Internal.hashBoolean(\n      get{cap}())"),
        CppType::Float => format!("java.lang.Float.floatToIntBits(\n      get{cap}())"),
        CppType::Double => format!(
            "com.google.protobuf.Internal.hashLong(\n      java.lang.Double.doubleToLongBits(get{cap}()))"
        ),
        CppType::Enum if open_enum => format!("get{cap}Value()"),
        CppType::Enum => format!("get{cap}().getNumber()"),
        CppType::String | CppType::Bytes | CppType::Message => format!("get{cap}().hashCode()"),
    }
}

fn not_equal_condition(field: FieldDescriptor<'_>, info: &FieldGeneratorInfo, open_enum: bool) -> String {
    let cap = &info.capitalized_name;
    if field.is_repeated() {
        return match field.cpp_type() {
            CppType::Enum => {
                let member = format!("{}_", info.name);
                format!("!{member}.equals(other.{member})")
            }
            _ => format!("!get{cap}List().equals(other.get{cap}List())"),
        };
    }
    match field.cpp_type() {
        CppType::Int32 | CppType::UInt32 | CppType::Int64 | CppType::UInt64 | CppType::Bool => {
            format!("get{cap}() != other.get{cap}()")
        }
        CppType::Float => format!(
            "java.lang.Float.floatToIntBits(get{cap}())\n    != java.lang.Float.floatToIntBits(other.get{cap}())"
        ),
        CppType::Double => format!(
            "java.lang.Double.doubleToLongBits(get{cap}())\n    != java.lang.Double.doubleToLongBits(other.get{cap}())"
        ),
        CppType::Enum if open_enum => format!("get{cap}Value() != other.get{cap}Value()"),
        CppType::Enum => format!("get{cap}() != other.get{cap}()"),
        CppType::String | CppType::Bytes | CppType::Message => {
            format!("!get{cap}().equals(other.get{cap}())")
        }
    }
}

fn nonzero_condition(field: FieldDescriptor<'_>, info: &FieldGeneratorInfo) -> String {
    let member = format!("{}_", info.name);
    match field.cpp_type() {
        CppType::Float => format!("java.lang.Float.floatToRawIntBits({member}) != 0"),
        CppType::Double => format!("java.lang.Double.doubleToRawLongBits({member}) != 0"),
        CppType::Bool => format!("{member} != false"),
        CppType::Int64 | CppType::UInt64 => format!("{member} != 0L"),
        _ => format!("{member} != 0"),
    }
}

fn map_key_default(key: FieldDescriptor<'_>) -> Result<String> {
    match key.cpp_type() {
        CppType::String => Ok("\"\"".to_string()),
        _ => helpers::default_value(key),
    }
}

fn map_value_default(value: FieldDescriptor<'_>) -> Result<String> {
    match value.cpp_type() {
        CppType::Message => {
            let target = names::qualified_class_name(value.message_type().expect("message field"))?;
            Ok(format!("{target}.getDefaultInstance()"))
        }
        CppType::Enum => {
            let enumeration = value.enum_type().expect("enum field");
            Ok(format!(
                "{}.{}",
                names::qualified_enum_name(enumeration)?,
                names::resolve_keyword(enumeration.default_value().name())
            ))
        }
        _ => helpers::default_value(value),
    }
}

fn build_vars(
    field: FieldDescriptor<'_>,
    info: &FieldGeneratorInfo,
    variant: Variant,
    open_enum: bool,
    gen_options: &FieldGenOptions,
) -> Result<Vec<(String, String)>> {
    let mut vars: Vec<(String, String)> = vec![
        ("name".to_string(), info.name.clone()),
        ("capitalized_name".to_string(), info.capitalized_name.clone()),
        ("member".to_string(), format!("{}_", info.name)),
        ("constant_name".to_string(), constant_name(field)),
        ("number".to_string(), field.number().to_string()),
        ("tag".to_string(), field.tag().to_string()),
        ("type".to_string(), helpers::java_type(field)?),
        ("boxed_type".to_string(), helpers::boxed_type(field)?),
        ("default".to_string(), helpers::default_value(field)?),
        (
            "capitalized_type".to_string(),
            helpers::capitalized_type_name(field).to_string(),
        ),
        (
            "deprecation".to_string(),
            helpers::deprecated_annotation(field).to_string(),
        ),
        (
            "tag_size".to_string(),
            tag_bytes(field.tag()).to_string(),
        ),
        (
            "read_call".to_string(),
            read_call(field, gen_options.check_utf8)?,
        ),
        (
            "hash_expr".to_string(),
            hash_expr(field, info, open_enum),
        ),
        (
            "not_equal_condition".to_string(),
            not_equal_condition(field, info, open_enum),
        ),
        (
            "nonzero_condition".to_string(),
            nonzero_condition(field, info),
        ),
        (
            "utf8_check".to_string(),
            if gen_options.check_utf8 {
                "checkByteStringIsUtf8(value);\n  ".to_string()
            } else {
                String::new()
            },
        ),
    ];

    if let Some(index) = gen_options.message_bit_index {
        vars.push(("has_mask".to_string(), format!("0x{:08x}", 1u32 << (index % 32))));
        vars.push(("has_field".to_string(), format!("bitField{}_", index / 32)));
    }
    if let Some(index) = gen_options.builder_bit_index {
        vars.push((
            "builder_mask".to_string(),
            format!("0x{:08x}", 1u32 << (index % 32)),
        ));
        vars.push(("bit_field".to_string(), format!("bitField{}_", index / 32)));
    }

    if field.cpp_type() == CppType::Enum && !field.is_map() {
        let enumeration = field.enum_type().expect("enum field");
        let qualified = names::qualified_enum_name(enumeration)?;
        let fallback = if open_enum {
            format!("{qualified}.UNRECOGNIZED")
        } else {
            format!(
                "{qualified}.{}",
                names::resolve_keyword(enumeration.default_value().name())
            )
        };
        vars.push(("fallback".to_string(), fallback));
        let default_number = if field.default_value().is_empty() {
            enumeration.default_value().number()
        } else {
            enumeration
                .find_value_by_name(field.default_value())
                .map(|v| v.number())
                .unwrap_or_else(|| enumeration.default_value().number())
        };
        vars.push(("default_number".to_string(), default_number.to_string()));
    }

    if let Some(oneof) = field.real_containing_oneof() {
        let oneof_name = names::underscores_to_camel_case(oneof.name(), false);
        vars.push(("oneof_member".to_string(), format!("{oneof_name}_")));
        vars.push(("case_member".to_string(), format!("{oneof_name}Case_")));
        let cast = match field.cpp_type() {
            CppType::Int32 | CppType::UInt32 => "java.lang.Integer",
            CppType::Int64 | CppType::UInt64 => "java.lang.Long",
            CppType::Float => "java.lang.Float",
            CppType::Double => "java.lang.Double",
            CppType::Bool => "java.lang.Boolean",
            _ => "",
        };
        if !cast.is_empty() {
            vars.push(("write_cast".to_string(), cast.to_string()));
        }
    }

    if matches!(
        variant,
        Variant::RepeatedPrimitive | Variant::RepeatedEnum | Variant::RepeatedString
    ) {
        let (list_type, empty, get, set, add) = list_parts(field);
        vars.push(("list_type".to_string(), list_type.to_string()));
        vars.push(("empty_list".to_string(), empty.to_string()));
        vars.push(("list_get".to_string(), get.to_string()));
        vars.push(("list_set".to_string(), set.to_string()));
        vars.push(("list_add".to_string(), add.to_string()));
        // Raw element access for serialization; the enum list stores ints.
        vars.push((
            "list_get_raw".to_string(),
            if variant == Variant::RepeatedEnum {
                "get".to_string()
            } else {
                get.to_string()
            },
        ));
        if field.is_packable() {
            vars.push((
                "packed_tag".to_string(),
                (((field.number() as u32) << 3) | 2).to_string(),
            ));
        }
    }

    if variant == Variant::Map {
        let entry = field.message_type().expect("map field");
        let key = entry.map_key();
        let value = entry.map_value();
        vars.push(("key_type".to_string(), helpers::java_type(key)?));
        vars.push(("boxed_key".to_string(), helpers::boxed_type(key)?));
        vars.push(("value_type".to_string(), helpers::java_type(value)?));
        vars.push(("boxed_value".to_string(), helpers::boxed_type(value)?));
        vars.push((
            "key_wire_const".to_string(),
            helpers::capitalized_type_name(key).to_ascii_uppercase(),
        ));
        vars.push((
            "value_wire_const".to_string(),
            helpers::capitalized_type_name(value).to_ascii_uppercase(),
        ));
        vars.push(("key_default".to_string(), map_key_default(key)?));
        vars.push(("value_default".to_string(), map_value_default(value)?));
        vars.push((
            "entry_descriptor".to_string(),
            gen_options
                .map_entry_descriptor
                .clone()
                .unwrap_or_default(),
        ));
        vars.push((
            "key_null_check".to_string(),
            if key.cpp_type() == CppType::String {
                "if (key == null) { throw new NullPointerException(\"map key\"); }\n  ".to_string()
            } else {
                String::new()
            },
        ));
        vars.push((
            "value_null_check".to_string(),
            if matches!(value.cpp_type(), CppType::String | CppType::Bytes | CppType::Message | CppType::Enum) {
                "if (value == null) { throw new NullPointerException(\"map value\"); }\n  ".to_string()
            } else {
                String::new()
            },
        ));
        vars.push((
            "map_serializer".to_string(),
            match key.cpp_type() {
                CppType::String => "String",
                CppType::Int64 | CppType::UInt64 => "Long",
                CppType::Bool => "Boolean",
                _ => "Integer",
            }
            .to_string(),
        ));
    }

    Ok(vars)
}

/// Encoded size of a tag, one byte per 7 bits.
fn tag_bytes(tag: u32) -> usize {
    let bits = (32 - tag.leading_zeros()) as usize;
    bits.max(1).div_ceil(7)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorPool;
    use crate::printer::Printer;
    use crate::proto::*;

    fn build_pool() -> DescriptorPool {
        let file = FileDescriptorProto {
            name: "fields.proto".to_string(),
            package: "demo".to_string(),
            syntax: "proto3".to_string(),
            enum_type: vec![EnumDescriptorProto {
                name: "Mode".to_string(),
                value: vec![
                    EnumValueDescriptorProto {
                        name: "MODE_UNSET".to_string(),
                        number: 0,
                    },
                    EnumValueDescriptorProto {
                        name: "MODE_FAST".to_string(),
                        number: 1,
                    },
                ],
                ..Default::default()
            }],
            message_type: vec![DescriptorProto {
                name: "Record".to_string(),
                oneof_decl: vec![OneofDescriptorProto {
                    name: "payload".to_string(),
                }],
                field: vec![
                    FieldDescriptorProto {
                        name: "count".to_string(),
                        number: 1,
                        r#type: Type::Int32,
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "label".to_string(),
                        number: 2,
                        r#type: Type::String,
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "mode".to_string(),
                        number: 3,
                        r#type: Type::Enum,
                        type_name: ".demo.Mode".to_string(),
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "weights".to_string(),
                        number: 4,
                        label: Label::Repeated,
                        r#type: Type::Int64,
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "token".to_string(),
                        number: 5,
                        r#type: Type::Uint32,
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

    fn make(
        pool: &DescriptorPool,
        index: usize,
        message_bit: Option<usize>,
        builder_bit: Option<usize>,
    ) -> (FieldGenerator<'_>, FieldGeneratorInfo) {
        let message = pool.message_by_name("demo.Record").unwrap();
        let infos = build_field_infos(message, &Default::default());
        let field = message.fields().nth(index).unwrap();
        let gen_options = FieldGenOptions {
            message_bit_index: message_bit,
            builder_bit_index: builder_bit,
            enum_is_closed: false,
            check_utf8: true,
            map_entry_descriptor: None,
        };
        let generator = FieldGenerator::new(field, &infos[index], &gen_options).unwrap();
        (generator, infos[index].clone())
    }

    fn render(body: impl FnOnce(&mut Printer)) -> String {
        let mut printer = Printer::new();
        body(&mut printer);
        printer.into_parts().0
    }

    #[test]
    fn implicit_presence_scalar_is_guarded_on_its_default() {
        let pool = build_pool();
        let (generator, _) = make(&pool, 0, None, Some(0));
        let out = render(|p| generator.generate_serialization_code(p));
        assert!(out.contains("if (count_ != 0)"));
        assert!(out.contains("output.writeInt32(1, count_);"));
    }

    #[test]
    fn proto3_string_parses_with_utf8_validation() {
        let pool = build_pool();
        let (generator, _) = make(&pool, 1, None, Some(1));
        let out = render(|p| generator.generate_builder_parsing_code(p));
        assert!(out.contains("case 18:"));
        assert!(out.contains("input.readStringRequireUtf8()"));
    }

    #[test]
    fn open_enum_exposes_raw_value_accessors() {
        let pool = build_pool();
        let (generator, _) = make(&pool, 2, None, Some(2));
        let out = render(|p| generator.generate_members(p));
        assert!(out.contains("public int getModeValue()"));
        assert!(out.contains("demo.Fields.Mode.UNRECOGNIZED"));
    }

    #[test]
    fn packed_repeated_primitive_writes_length_prefixed_block() {
        let pool = build_pool();
        let (generator, _) = make(&pool, 3, None, Some(3));
        assert!(generator.packed);
        let out = render(|p| generator.generate_serialization_code(p));
        assert!(out.contains("output.writeUInt32NoTag(34);"));
        assert!(out.contains("writeInt64NoTag"));
        let size = render(|p| generator.generate_serialized_size_code(p));
        assert!(size.contains("weightsMemoizedSerializedSize = dataSize;"));
    }

    #[test]
    fn oneof_member_reads_through_the_case_field() {
        let pool = build_pool();
        let (generator, _) = make(&pool, 4, None, None);
        let out = render(|p| generator.generate_members(p));
        assert!(out.contains("payloadCase_ == 5"));
        assert!(out.contains("(java.lang.Integer) payload_"));
    }
}
