//! Java enum generation.
//!
//! Open enums carry the `UNRECOGNIZED = -1` sentinel and throw from
//! `getNumber()` on it; closed enums resolve unknown numbers to null in
//! `forNumber` and route them to the unknown-field set at parse time.
//! Dense number ranges compile `forNumber` to a switch, sparse ones to a
//! linear scan over `values()`.

use itertools::Itertools;

use crate::descriptor::EnumDescriptor;
use crate::error::Result;
use crate::options::Options;
use crate::printer::Printer;

use super::names;

pub struct EnumGenerator<'a> {
    enumeration: EnumDescriptor<'a>,
    #[allow(dead_code)]
    options: &'a Options,
    classname: String,
}

impl<'a> EnumGenerator<'a> {
    pub fn new(enumeration: EnumDescriptor<'a>, options: &'a Options) -> EnumGenerator<'a> {
        EnumGenerator {
            enumeration,
            options,
            classname: names::resolve_keyword(enumeration.name()),
        }
    }

    fn is_open(&self) -> bool {
        !self.enumeration.is_closed()
    }

    /// Contiguous canonical numbers compile `forNumber` to a switch.
    fn is_dense(&self) -> bool {
        let numbers: Vec<i64> = self
            .enumeration
            .canonical_values()
            .iter()
            .map(|v| v.number() as i64)
            .sorted()
            .collect();
        match (numbers.first(), numbers.last()) {
            (Some(min), Some(max)) => max - min + 1 == numbers.len() as i64,
            _ => false,
        }
    }

    /// Expression for this enum's `Descriptors.EnumDescriptor`, reaching
    /// through the declaring scope.
    fn descriptor_expr(&self) -> Result<String> {
        let position = match self.enumeration.containing_type() {
            Some(parent) => {
                let scope = names::qualified_class_name(parent)?;
                let index = parent
                    .nested_enums()
                    .position(|e| e == self.enumeration)
                    .expect("enum in parent scope");
                return Ok(format!(
                    "{scope}.getDescriptor().getEnumTypes().get({index})"
                ));
            }
            None => self
                .enumeration
                .file()
                .enums()
                .position(|e| e == self.enumeration)
                .expect("enum in file scope"),
        };
        let package = names::java_package(self.enumeration.file());
        let outer = names::file_class_name(self.enumeration.file())?;
        let qualified_outer = if package.is_empty() {
            outer
        } else {
            format!("{package}.{outer}")
        };
        Ok(format!(
            "{qualified_outer}.getDescriptor().getEnumTypes().get({position})"
        ))
    }

    pub fn generate(&self, printer: &mut Printer) -> Result<()> {
        let descriptor_expr = self.descriptor_expr()?;
        printer.with_vars(
            &[
                ("classname", &self.classname),
                ("descriptor_expr", &descriptor_expr),
            ],
            |p| {
                p.print(
                    "public enum $classname$\n\
                     \x20   implements com.google.protobuf.ProtocolMessageEnum {\n",
                );
                p.indent();
                for value in self.enumeration.values() {
                    let name = names::resolve_keyword(value.name());
                    let number = value.number().to_string();
                    p.with_vars(
                        &[("value_name", &name), ("value_number", &number)],
                        |p| p.print("$value_name$($value_number$),\n"),
                    );
                }
                if self.is_open() {
                    p.print("UNRECOGNIZED(-1),\n");
                }
                p.print(";\n\n");

                for value in self.enumeration.values() {
                    let constant = format!(
                        "{}_VALUE",
                        value.name().to_ascii_uppercase()
                    );
                    let number = value.number().to_string();
                    p.with_vars(
                        &[("value_constant", &constant), ("value_number", &number)],
                        |p| {
                            p.print(
                                "public static final int $value_constant$ = $value_number$;\n",
                            )
                        },
                    );
                }
                p.print("\n");

                if self.is_open() {
                    p.print(
                        "public final int getNumber() {\n\
                         \x20 if (this == UNRECOGNIZED) {\n\
                         \x20   throw new java.lang.IllegalArgumentException(\n\
                         \x20       \"Can't get the number of an unknown enum value.\");\n\
                         \x20 }\n\
                         \x20 return value;\n\
                         }\n\n",
                    );
                } else {
                    p.print(
                        "public final int getNumber() {\n\
                         \x20 return value;\n\
                         }\n\n",
                    );
                }

                p.print(
                    "@java.lang.Deprecated\n\
                     public static $classname$ valueOf(int value) {\n\
                     \x20 return forNumber(value);\n\
                     }\n\n",
                );

                self.generate_for_number(p);

                p.print(
                    "public static com.google.protobuf.Internal.EnumLiteMap<$classname$>\n\
                     \x20   internalGetValueMap() {\n\
                     \x20 return internalValueMap;\n\
                     }\n\
                     private static final com.google.protobuf.Internal.EnumLiteMap<\n\
                     \x20   $classname$> internalValueMap =\n\
                     \x20     new com.google.protobuf.Internal.EnumLiteMap<$classname$>() {\n\
                     \x20       public $classname$ findValueByNumber(int number) {\n\
                     \x20         return $classname$.forNumber(number);\n\
                     \x20       }\n\
                     \x20     };\n\n",
                );

                p.print(
                    "public final com.google.protobuf.Descriptors.EnumValueDescriptor\n\
                     \x20   getValueDescriptor() {\n",
                );
                if self.is_open() {
                    p.print(
                        "\x20 if (this == UNRECOGNIZED) {\n\
                         \x20   throw new java.lang.IllegalStateException(\n\
                         \x20       \"Can't get the descriptor of an unrecognized enum value.\");\n\
                         \x20 }\n",
                    );
                }
                p.print(
                    "\x20 return getDescriptor().getValues().get(ordinal());\n\
                     }\n\
                     public final com.google.protobuf.Descriptors.EnumDescriptor\n\
                     \x20   getDescriptorForType() {\n\
                     \x20 return getDescriptor();\n\
                     }\n\
                     public static final com.google.protobuf.Descriptors.EnumDescriptor\n\
                     \x20   getDescriptor() {\n\
                     \x20 return $descriptor_expr$;\n\
                     }\n\n",
                );

                p.print(
                    "private static final $classname$[] VALUES = values();\n\n\
                     public static $classname$ valueOf(\n\
                     \x20   com.google.protobuf.Descriptors.EnumValueDescriptor desc) {\n\
                     \x20 if (desc.getType() != getDescriptor()) {\n\
                     \x20   throw new java.lang.IllegalArgumentException(\n\
                     \x20       \"EnumValueDescriptor is not for this type.\");\n\
                     \x20 }\n",
                );
                if self.is_open() {
                    p.print(
                        "\x20 if (desc.getIndex() == -1) {\n\
                         \x20   return UNRECOGNIZED;\n\
                         \x20 }\n",
                    );
                }
                p.print(
                    "\x20 return VALUES[desc.getIndex()];\n\
                     }\n\n\
                     private final int value;\n\n\
                     private $classname$(int value) {\n\
                     \x20 this.value = value;\n\
                     }\n",
                );
                p.outdent();
                p.print("}\n");
            },
        );
        Ok(())
    }

    fn generate_for_number(&self, p: &mut Printer) {
        p.print("public static $classname$ forNumber(int value) {\n");
        if self.is_dense() {
            p.print("\x20 switch (value) {\n");
            for value in self.enumeration.canonical_values() {
                let name = names::resolve_keyword(value.name());
                let number = value.number().to_string();
                p.with_vars(
                    &[("value_name", &name), ("value_number", &number)],
                    |p| p.print("\x20   case $value_number$: return $value_name$;\n"),
                );
            }
            p.print(
                "\x20   default: return null;\n\
                 \x20 }\n\
                 }\n\n",
            );
        } else if self.is_open() {
            p.print(
                "\x20 for ($classname$ candidate : VALUES) {\n\
                 \x20   if (candidate != UNRECOGNIZED && candidate.value == value) {\n\
                 \x20     return candidate;\n\
                 \x20   }\n\
                 \x20 }\n\
                 \x20 return null;\n\
                 }\n\n",
            );
        } else {
            p.print(
                "\x20 for ($classname$ candidate : VALUES) {\n\
                 \x20   if (candidate.value == value) {\n\
                 \x20     return candidate;\n\
                 \x20   }\n\
                 \x20 }\n\
                 \x20 return null;\n\
                 }\n\n",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorPool;
    use crate::options::Options;
    use crate::printer::Printer;
    use crate::proto::*;

    fn pool_with_enum(syntax: &str, numbers: &[i32]) -> DescriptorPool {
        let file = FileDescriptorProto {
            name: "palette.proto".to_string(),
            package: "art".to_string(),
            syntax: syntax.to_string(),
            enum_type: vec![EnumDescriptorProto {
                name: "Color".to_string(),
                value: numbers
                    .iter()
                    .enumerate()
                    .map(|(i, &n)| EnumValueDescriptorProto {
                        name: format!("COLOR_{i}"),
                        number: n,
                    })
                    .collect(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut pool = DescriptorPool::new();
        pool.add_file(&file).unwrap();
        pool
    }

    fn render(pool: &DescriptorPool) -> String {
        let enumeration = pool.enum_by_name("art.Color").unwrap();
        let options = Options::default();
        let generator = EnumGenerator::new(enumeration, &options);
        let mut printer = Printer::new();
        generator.generate(&mut printer).unwrap();
        printer.into_parts().0
    }

    #[test]
    fn open_enum_carries_the_unrecognized_sentinel() {
        let pool = pool_with_enum("proto3", &[0, 1, 2]);
        let out = render(&pool);
        assert!(out.contains("UNRECOGNIZED(-1),"));
        assert!(out.contains("Can't get the number of an unknown enum value."));
    }

    #[test]
    fn closed_enum_has_plain_get_number() {
        let pool = pool_with_enum("proto2", &[1, 2, 3]);
        let out = render(&pool);
        assert!(!out.contains("UNRECOGNIZED"));
        assert!(!out.contains("Can't get the number of an unknown enum value."));
    }

    #[test]
    fn dense_numbers_compile_for_number_to_a_switch() {
        let pool = pool_with_enum("proto3", &[0, 1, 2, 3]);
        let out = render(&pool);
        assert!(out.contains("switch (value)"));
        assert!(out.contains("case 2: return COLOR_2;"));
    }

    #[test]
    fn sparse_numbers_fall_back_to_a_scan() {
        let pool = pool_with_enum("proto3", &[0, 5, 100]);
        let out = render(&pool);
        assert!(!out.contains("switch (value)"));
        assert!(out.contains("for (Color candidate : VALUES)"));
    }
}
