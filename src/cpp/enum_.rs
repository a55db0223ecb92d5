//! Per-enum code generation.
//!
//! Values are emitted in declared order (aliases repeat their number, which
//! C++ permits). The number lookup compiles to a range check when the
//! canonical numbers are contiguous and to a sorted table with binary search
//! otherwise.

use itertools::Itertools;

use crate::descriptor::{EnumDescriptor, EnumValueDescriptor};
use crate::printer::Printer;
use crate::proto::Semantic;
use crate::options::Options;

use super::names;

pub struct EnumGenerator<'a> {
    enumeration: EnumDescriptor<'a>,
    options: &'a Options,
    classname: String,
    /// Canonical numbers, ascending.
    numbers: Vec<i32>,
}

impl<'a> EnumGenerator<'a> {
    pub fn new(enumeration: EnumDescriptor<'a>, options: &'a Options) -> Self {
        let numbers = enumeration
            .canonical_values()
            .iter()
            .map(|v| v.number())
            .sorted()
            .collect();
        EnumGenerator {
            enumeration,
            options,
            classname: names::enum_name(enumeration),
            numbers,
        }
    }

    /// Canonical numbers cover [min, max] with no gaps.
    fn is_dense(&self) -> bool {
        let min = self.numbers[0] as i64;
        let max = *self.numbers.last().expect("enums are never empty") as i64;
        max - min + 1 == self.numbers.len() as i64
    }

    fn value_constant(&self, value: EnumValueDescriptor<'a>) -> String {
        names::enum_value_name(value)
    }

    fn unrecognized_constant(&self) -> Option<String> {
        if self.enumeration.is_closed() || self.numbers.contains(&-1) {
            None
        } else {
            Some(format!("{}_UNRECOGNIZED", self.classname))
        }
    }

    fn with_enum_vars<F: FnOnce(&mut Printer)>(&self, p: &mut Printer, body: F) {
        let min = self.numbers[0].to_string();
        let max = self.numbers.last().expect("enums are never empty").to_string();
        p.with_vars(
            &[
                ("classname", &self.classname),
                ("dllexport", &self.options.dllexport_decl),
                ("min", &min),
                ("max", &max),
            ],
            body,
        );
    }

    /// Header-side definition.
    pub fn generate_definition(&self, p: &mut Printer) {
        self.with_enum_vars(p, |p| {
            p.print("enum $classname$ : int {\n");
            if self.options.annotate_code {
                p.annotate(
                    "classname",
                    self.enumeration.file().name(),
                    self.enumeration.path(),
                    Semantic::None,
                );
            }
            p.indent();
            for value in self.enumeration.values() {
                p.print_with(
                    &[
                        ("constant", &self.value_constant(value)),
                        ("number", &value.number().to_string()),
                    ],
                    "$constant$ = $number$,\n",
                );
            }
            if let Some(unrecognized) = self.unrecognized_constant() {
                p.print_with(&[("constant", &unrecognized)], "$constant$ = -1,\n");
            }
            p.outdent();
            p.print(
                "};\n\
                 $dllexport$bool $classname$_IsValid(int value);\n\
                 $dllexport$$classname$ $classname$_ForNumber(int value);\n\
                 constexpr $classname$ $classname$_MIN = static_cast<$classname$>($min$);\n\
                 constexpr $classname$ $classname$_MAX = static_cast<$classname$>($max$);\n",
            );
        });
    }

    /// Source-side lookup bodies.
    pub fn generate_methods(&self, p: &mut Printer) {
        self.with_enum_vars(p, |p| {
            if self.is_dense() {
                p.print(
                    "bool $classname$_IsValid(int value) {\n\
                     \x20 return value >= $min$ && value <= $max$;\n\
                     }\n",
                );
            } else {
                p.print(
                    "static constexpr int $classname$_numbers_[] = {\n",
                );
                p.indent();
                for chunk in &self.numbers.iter().chunks(10) {
                    let line = chunk.map(|n| n.to_string()).join(", ");
                    p.print_with(&[("line", &line)], "$line$,\n");
                }
                p.outdent();
                p.print(
                    "};\n\
                     bool $classname$_IsValid(int value) {\n\
                     \x20 return std::binary_search(std::begin($classname$_numbers_), std::end($classname$_numbers_), value);\n\
                     }\n",
                );
            }
            let fallback = if let Some(unrecognized) = self.unrecognized_constant() {
                unrecognized
            } else {
                self.value_constant(self.enumeration.default_value())
            };
            p.print_with(
                &[("fallback", &fallback)],
                "$classname$ $classname$_ForNumber(int value) {\n\
                 \x20 if ($classname$_IsValid(value)) {\n\
                 \x20   return static_cast<$classname$>(value);\n\
                 \x20 }\n\
                 \x20 return $fallback$;\n\
                 }\n",
            );
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorPool;
    use crate::proto::*;

    fn enum_file(syntax: &str, numbers: &[i32]) -> FileDescriptorProto {
        FileDescriptorProto {
            name: "color.proto".to_string(),
            package: "palette".to_string(),
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
        }
    }

    fn generate(file: &FileDescriptorProto) -> (String, String) {
        let mut pool = DescriptorPool::new();
        pool.add_file(file).unwrap();
        let enumeration = pool.enum_by_name("palette.Color").unwrap();
        let options = Options::default();
        let generator = EnumGenerator::new(enumeration, &options);
        let mut header = Printer::new();
        generator.generate_definition(&mut header);
        let mut source = Printer::new();
        generator.generate_methods(&mut source);
        (header.into_parts().0, source.into_parts().0)
    }

    #[test]
    fn dense_numbers_compile_to_range_check() {
        let (header, source) = generate(&enum_file("proto3", &[0, 1, 2, 3]));
        assert!(header.contains("COLOR_0 = 0,"));
        assert!(header.contains("Color_UNRECOGNIZED = -1,"), "open enum sentinel");
        assert!(source.contains("return value >= 0 && value <= 3;"));
    }

    #[test]
    fn sparse_numbers_compile_to_lookup_table() {
        let (_, source) = generate(&enum_file("proto3", &[0, 5, 100]));
        assert!(source.contains("Color_numbers_[] = {"));
        assert!(source.contains("std::binary_search"));
    }

    #[test]
    fn closed_enum_has_no_sentinel_and_falls_back_to_default() {
        let (header, source) = generate(&enum_file("proto2", &[4, 5, 6]));
        assert!(!header.contains("UNRECOGNIZED"));
        assert!(source.contains("return COLOR_0;"), "first declared value");
        assert!(header.contains("constexpr Color Color_MIN = static_cast<Color>(4);"));
    }
}
