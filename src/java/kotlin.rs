//! Kotlin DSL extensions over the generated Java classes.
//!
//! For each message the file gains a builder-lambda factory function and a
//! `FooKt.Dsl` wrapper whose properties delegate to the Java builder. The
//! DSL never reimplements message semantics; it is a typed veneer over the
//! Java surface, which is why this generator runs off the same naming pass
//! as the Java one.

use crate::descriptor::{CppType, Descriptor, FieldDescriptor, FileDescriptor};
use crate::error::Result;
use crate::options::Options;
use crate::printer::Printer;
use crate::scc::SccAnalyzer;

use super::field::{build_field_infos, FieldGeneratorInfo};
use super::names::{self, Config};

pub struct KotlinGenerator<'a> {
    file: FileDescriptor<'a>,
    options: &'a Options,
    config: Config,
}

impl<'a> KotlinGenerator<'a> {
    pub fn new(file: FileDescriptor<'a>, options: &'a Options) -> KotlinGenerator<'a> {
        KotlinGenerator {
            file,
            options,
            config: Config::default(),
        }
    }

    pub fn generate(&self, p: &mut Printer, _analyzer: &mut SccAnalyzer<'a>) -> Result<()> {
        if !self.options.strip_nonfunctional_codegen {
            p.print_with(
                &[("file", self.file.name())],
                "// Generated by the protocol buffer compiler. DO NOT EDIT!\n\
                 // source: $file$\n\n",
            );
        }
        let package = names::java_package(self.file);
        if !package.is_empty() {
            p.print_with(&[("package", &package)], "package $package$\n\n");
        }
        for message in self.file.messages() {
            self.generate_message_dsl(p, message)?;
        }
        Ok(())
    }

    fn generate_message_dsl(&self, p: &mut Printer, message: Descriptor<'a>) -> Result<()> {
        if message.is_map_entry() {
            return Ok(());
        }
        let qualified = names::qualified_class_name(message)?;
        let factory = names::underscores_to_camel_case(message.name(), false);
        let kt_object = format!("{}Kt", names::class_name(message).replace('.', ""));
        p.print_with(
            &[
                ("qualified", &qualified),
                ("factory", &factory),
                ("kt_object", &kt_object),
            ],
            "public inline fun $factory$(block: $kt_object$.Dsl.() -> kotlin.Unit): $qualified$ =\n\
             \x20 $kt_object$.Dsl._create($qualified$.newBuilder()).apply { block() }._build()\n\n\
             public object $kt_object$ {\n\
             \x20 @kotlin.OptIn(com.google.protobuf.kotlin.OnlyForUseByGeneratedProtoCode::class)\n\
             \x20 public class Dsl private constructor(\n\
             \x20   private val _builder: $qualified$.Builder\n\
             \x20 ) {\n\
             \x20   public companion object {\n\
             \x20     @kotlin.jvm.JvmSynthetic\n\
             \x20     @kotlin.PublishedApi\n\
             \x20     internal fun _create(builder: $qualified$.Builder): Dsl = Dsl(builder)\n\
             \x20   }\n\n\
             \x20   @kotlin.jvm.JvmSynthetic\n\
             \x20   @kotlin.PublishedApi\n\
             \x20   internal fun _build(): $qualified$ = _builder.build()\n\n",
        );
        p.indent();
        p.indent();
        let infos = build_field_infos(message, &self.config.forbidden_field_names);
        for (field, info) in message.fields().zip(&infos) {
            self.generate_field_dsl(p, field, info)?;
        }
        p.outdent();
        p.outdent();
        p.print("\x20 }\n}\n\n");

        for nested in message.nested_types() {
            self.generate_message_dsl(p, nested)?;
        }
        Ok(())
    }

    fn generate_field_dsl(
        &self,
        p: &mut Printer,
        field: FieldDescriptor<'a>,
        info: &FieldGeneratorInfo,
    ) -> Result<()> {
        let kotlin_type = kotlin_type(field)?;
        let vars: Vec<(&str, &str)> = vec![
            ("name", &info.name),
            ("cap", &info.capitalized_name),
            ("type", &kotlin_type),
        ];
        if field.is_map() {
            let entry = field.message_type().expect("map field");
            let key = self::kotlin_type(entry.map_key())?;
            let value = self::kotlin_type(entry.map_value())?;
            p.print_with(
                &[
                    ("name", &info.name),
                    ("cap", &info.capitalized_name),
                    ("key", &key),
                    ("value", &value),
                ],
                "public val $name$: kotlin.collections.Map<$key$, $value$>\n\
                 \x20 @kotlin.jvm.JvmSynthetic\n\
                 \x20 get() = _builder.get$cap$Map()\n\
                 @kotlin.jvm.JvmSynthetic\n\
                 public fun put$cap$(key: $key$, value: $value$) {\n\
                 \x20 _builder.put$cap$(key, value)\n\
                 }\n\
                 @kotlin.jvm.JvmSynthetic\n\
                 public fun remove$cap$(key: $key$) {\n\
                 \x20 _builder.remove$cap$(key)\n\
                 }\n\
                 @kotlin.jvm.JvmSynthetic\n\
                 public fun clear$cap$() {\n\
                 \x20 _builder.clear$cap$()\n\
                 }\n\n",
            );
        } else if field.is_repeated() {
            p.print_with(
                &vars,
                "public val $name$: kotlin.collections.List<$type$>\n\
                 \x20 @kotlin.jvm.JvmSynthetic\n\
                 \x20 get() = _builder.get$cap$List()\n\
                 @kotlin.jvm.JvmSynthetic\n\
                 public fun add$cap$(value: $type$) {\n\
                 \x20 _builder.add$cap$(value)\n\
                 }\n\
                 @kotlin.jvm.JvmSynthetic\n\
                 public fun addAll$cap$(values: kotlin.collections.Iterable<$type$>) {\n\
                 \x20 _builder.addAll$cap$(values)\n\
                 }\n\
                 @kotlin.jvm.JvmSynthetic\n\
                 public fun clear$cap$() {\n\
                 \x20 _builder.clear$cap$()\n\
                 }\n\n",
            );
        } else {
            p.print_with(
                &vars,
                "public var $name$: $type$\n\
                 \x20 @kotlin.jvm.JvmName(\"get$cap$\")\n\
                 \x20 get() = _builder.get$cap$()\n\
                 \x20 @kotlin.jvm.JvmName(\"set$cap$\")\n\
                 \x20 set(value) {\n\
                 \x20   _builder.set$cap$(value)\n\
                 \x20 }\n\
                 public fun clear$cap$() {\n\
                 \x20 _builder.clear$cap$()\n\
                 }\n",
            );
            if field.has_presence() {
                p.print_with(
                    &vars,
                    "public fun has$cap$(): kotlin.Boolean = _builder.has$cap$()\n",
                );
            }
            p.print("\n");
        }
        Ok(())
    }
}

fn kotlin_type(field: FieldDescriptor<'_>) -> Result<String> {
    Ok(match field.cpp_type() {
        CppType::Int32 | CppType::UInt32 => "kotlin.Int".to_string(),
        CppType::Int64 | CppType::UInt64 => "kotlin.Long".to_string(),
        CppType::Float => "kotlin.Float".to_string(),
        CppType::Double => "kotlin.Double".to_string(),
        CppType::Bool => "kotlin.Boolean".to_string(),
        CppType::String => "kotlin.String".to_string(),
        CppType::Bytes => "com.google.protobuf.ByteString".to_string(),
        CppType::Enum => names::qualified_enum_name(field.enum_type().expect("enum field"))?,
        CppType::Message => {
            names::qualified_class_name(field.message_type().expect("message field"))?
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorPool;
    use crate::printer::Printer;
    use crate::proto::*;

    fn sample_pool() -> DescriptorPool {
        let file = FileDescriptorProto {
            name: "inventory.proto".to_string(),
            package: "store".to_string(),
            syntax: "proto3".to_string(),
            message_type: vec![DescriptorProto {
                name: "Item".to_string(),
                field: vec![
                    FieldDescriptorProto {
                        name: "sku".to_string(),
                        number: 1,
                        r#type: Type::String,
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "counts".to_string(),
                        number: 2,
                        label: Label::Repeated,
                        r#type: Type::Int32,
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
        let pool = sample_pool();
        let fd = pool.file_by_name("inventory.proto").unwrap();
        let options = Options::default();
        let mut analyzer = SccAnalyzer::new();
        let mut printer = Printer::new();
        KotlinGenerator::new(fd, &options)
            .generate(&mut printer, &mut analyzer)
            .unwrap();
        printer.into_parts().0
    }

    #[test]
    fn factory_function_wraps_the_java_builder() {
        let out = render();
        assert!(out.contains(
            "public inline fun item(block: ItemKt.Dsl.() -> kotlin.Unit): store.Inventory.Item ="
        ));
        assert!(out.contains("ItemKt.Dsl._create(store.Inventory.Item.newBuilder())"));
    }

    #[test]
    fn singular_field_becomes_a_var_with_clear() {
        let out = render();
        assert!(out.contains("public var sku: kotlin.String"));
        assert!(out.contains("_builder.setSku(value)"));
        assert!(out.contains("public fun clearSku() {"));
    }

    #[test]
    fn repeated_field_gets_add_helpers() {
        let out = render();
        assert!(out.contains("public val counts: kotlin.collections.List<kotlin.Int>"));
        assert!(out.contains("public fun addCounts(value: kotlin.Int) {"));
        assert!(out.contains("public fun addAllCounts(values: kotlin.collections.Iterable<kotlin.Int>) {"));
    }
}
