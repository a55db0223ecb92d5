//! Text emission with named-variable substitution.
//!
//! Templates contain `$name$` markers resolved against per-call substitutions
//! and the scoped variable stack. `$$` unescapes to a literal `$`. A marker
//! written `$ name$` keeps its leading space only when the value is
//! non-empty; `$name $` does the same for a trailing space.
//!
//! The printer tracks the byte span of every substitution performed by the
//! most recent call, which is what `annotate` turns into source-map records.
//! An undefined variable or a reversed annotation span is a logic error in
//! the generator and panics.

use std::collections::HashMap;

use crate::proto::{Annotation, GeneratedCodeInfo, Semantic};

/// Indent step, in spaces.
const INDENT_WIDTH: usize = 2;

/// One substitution handed to [`Printer::emit`]: plain text, or a callable
/// block that re-enters the printer at the current indent.
pub enum Sub<'a> {
    Text(&'a str, &'a str),
    Block(&'a str, &'a dyn Fn(&mut Printer)),
}

impl<'a> Sub<'a> {
    pub fn text(key: &'a str, value: &'a str) -> Self {
        Sub::Text(key, value)
    }

    pub fn block(key: &'a str, body: &'a dyn Fn(&mut Printer)) -> Self {
        Sub::Block(key, body)
    }

    fn key(&self) -> &'a str {
        match self {
            Sub::Text(key, _) => key,
            Sub::Block(key, _) => key,
        }
    }
}

#[derive(Default)]
pub struct Printer {
    buffer: String,
    indent: usize,
    at_start_of_line: bool,
    /// Scoped variable frames, innermost last.
    frames: Vec<HashMap<String, String>>,
    /// Byte spans of substitutions from the most recent print/emit call.
    last_spans: HashMap<String, (usize, usize)>,
    annotations: Vec<Annotation>,
}

impl Printer {
    pub fn new() -> Self {
        Printer {
            at_start_of_line: true,
            ..Default::default()
        }
    }

    /// Current size of the sink in bytes.
    pub fn byte_count(&self) -> usize {
        self.buffer.len()
    }

    pub fn indent(&mut self) {
        self.indent += INDENT_WIDTH;
    }

    pub fn outdent(&mut self) {
        assert!(self.indent >= INDENT_WIDTH, "outdent without matching indent");
        self.indent -= INDENT_WIDTH;
    }

    /// Run `body` with an extra variable frame; bindings are restored on
    /// exit.
    pub fn with_vars<F>(&mut self, vars: &[(&str, &str)], body: F)
    where
        F: FnOnce(&mut Printer),
    {
        self.frames.push(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        body(self);
        self.frames.pop();
    }

    fn lookup(&self, key: &str, locals: &[(&str, &str)]) -> Option<String> {
        for (k, v) in locals {
            if *k == key {
                return Some((*v).to_string());
            }
        }
        for frame in self.frames.iter().rev() {
            if let Some(v) = frame.get(key) {
                return Some(v.clone());
            }
        }
        None
    }

    /// Substitute and append `template` using only the scoped frames.
    pub fn print(&mut self, template: &str) {
        self.print_with(&[], template);
    }

    /// Substitute and append `template`; `locals` take precedence over the
    /// scoped frames.
    pub fn print_with(&mut self, locals: &[(&str, &str)], template: &str) {
        self.last_spans.clear();
        let mut rest = template;
        while let Some(pos) = rest.find('$') {
            self.write_raw(&rest[..pos]);
            rest = &rest[pos + 1..];
            let end = rest
                .find('$')
                .unwrap_or_else(|| panic!("printer: unterminated $ in template {template:?}"));
            let marker = &rest[..end];
            rest = &rest[end + 1..];

            if marker.is_empty() {
                self.write_raw("$");
                continue;
            }
            let leading_space = marker.starts_with(' ');
            let trailing_space = marker.ends_with(' ');
            let key = marker.trim();
            let value = self
                .lookup(key, locals)
                .unwrap_or_else(|| panic!("printer: undefined variable {key:?}"));
            if leading_space && !value.is_empty() {
                self.write_raw(" ");
            }
            let start = self.buffer.len();
            self.write_raw(&value);
            self.last_spans
                .insert(key.to_string(), (start, self.buffer.len()));
            if trailing_space && !value.is_empty() {
                self.write_raw(" ");
            }
        }
        self.write_raw(rest);
    }

    /// Richer substitution: text markers behave like `print_with`, and
    /// block-valued substitutions recursively emit into the same sink at the
    /// current indent.
    pub fn emit(&mut self, subs: &[Sub<'_>], template: &str) {
        let mut rest = template;
        let mut spans = HashMap::new();
        while let Some(pos) = rest.find('$') {
            self.write_raw(&rest[..pos]);
            rest = &rest[pos + 1..];
            let end = rest
                .find('$')
                .unwrap_or_else(|| panic!("printer: unterminated $ in template {template:?}"));
            let marker = &rest[..end];
            rest = &rest[end + 1..];

            if marker.is_empty() {
                self.write_raw("$");
                continue;
            }
            let leading_space = marker.starts_with(' ');
            let trailing_space = marker.ends_with(' ');
            let key = marker.trim();
            let sub = subs.iter().find(|s| s.key() == key);
            match sub {
                Some(Sub::Text(_, value)) => {
                    if leading_space && !value.is_empty() {
                        self.write_raw(" ");
                    }
                    let start = self.buffer.len();
                    self.write_raw(value);
                    spans.insert(key.to_string(), (start, self.buffer.len()));
                    if trailing_space && !value.is_empty() {
                        self.write_raw(" ");
                    }
                }
                Some(Sub::Block(_, body)) => {
                    let start = self.buffer.len();
                    body(self);
                    spans.insert(key.to_string(), (start, self.buffer.len()));
                }
                None => {
                    let value = self
                        .lookup(key, &[])
                        .unwrap_or_else(|| panic!("printer: undefined variable {key:?}"));
                    if leading_space && !value.is_empty() {
                        self.write_raw(" ");
                    }
                    let start = self.buffer.len();
                    self.write_raw(&value);
                    spans.insert(key.to_string(), (start, self.buffer.len()));
                    if trailing_space && !value.is_empty() {
                        self.write_raw(" ");
                    }
                }
            }
        }
        self.write_raw(rest);
        self.last_spans = spans;
    }

    /// Attach an annotation record to the span of `var` in the most recent
    /// print/emit call.
    pub fn annotate(&mut self, var: &str, source_file: &str, path: &[i32], semantic: Semantic) {
        self.annotate_span(var, var, source_file, path, semantic);
    }

    /// Annotation spanning from the start of `begin_var` to the end of
    /// `end_var` in the most recent print/emit call.
    pub fn annotate_span(
        &mut self,
        begin_var: &str,
        end_var: &str,
        source_file: &str,
        path: &[i32],
        semantic: Semantic,
    ) {
        let &(begin, _) = self
            .last_spans
            .get(begin_var)
            .unwrap_or_else(|| panic!("printer: no emitted span for {begin_var:?}"));
        let &(_, end) = self
            .last_spans
            .get(end_var)
            .unwrap_or_else(|| panic!("printer: no emitted span for {end_var:?}"));
        assert!(begin <= end, "printer: unbalanced annotation markers");
        self.annotations.push(Annotation {
            path: path.to_vec(),
            source_file: source_file.to_string(),
            begin: begin as u32,
            end: end as u32,
            semantic,
        });
    }

    fn write_raw(&mut self, text: &str) {
        for line in text.split_inclusive('\n') {
            if self.at_start_of_line && line != "\n" && self.indent > 0 {
                for _ in 0..self.indent {
                    self.buffer.push(' ');
                }
            }
            self.buffer.push_str(line);
            self.at_start_of_line = line.ends_with('\n');
        }
    }

    pub fn output(&self) -> &str {
        &self.buffer
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Consume the printer, returning the final text and its annotation
    /// records serialized as `GeneratedCodeInfo`.
    pub fn into_parts(self) -> (String, GeneratedCodeInfo) {
        (
            self.buffer,
            GeneratedCodeInfo {
                annotation: self.annotations,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_substitution() {
        let mut printer = Printer::new();
        printer.print_with(&[("name", "foo"), ("type", "int32")], "$type$ $name$ = 0;\n");
        assert_eq!(printer.output(), "int32 foo = 0;\n");
    }

    #[test]
    fn dollar_escape() {
        let mut printer = Printer::new();
        printer.print("cost: $$5\n");
        assert_eq!(printer.output(), "cost: $5\n");
    }

    #[test]
    fn spacing_markers_drop_space_for_empty_values() {
        let mut printer = Printer::new();
        printer.print_with(&[("export", "")], "class$ export$ Foo;\n");
        printer.print_with(&[("export", "DLL")], "class$ export$ Foo;\n");
        printer.print_with(&[("export", "DLL")], "class $export $Foo;\n");
        assert_eq!(printer.output(), "class Foo;\nclass DLL Foo;\nclass DLL Foo;\n");
    }

    #[test]
    fn indentation_applies_per_line_and_skips_blank_lines() {
        let mut printer = Printer::new();
        printer.print("{\n");
        printer.indent();
        printer.print("a;\n\nb;\n");
        printer.outdent();
        printer.print("}\n");
        assert_eq!(printer.output(), "{\n  a;\n\n  b;\n}\n");
    }

    #[test]
    #[should_panic(expected = "undefined variable")]
    fn missing_variable_is_fatal() {
        let mut printer = Printer::new();
        printer.print("$nope$");
    }

    #[test]
    #[should_panic(expected = "outdent without matching indent")]
    fn unbalanced_outdent_is_fatal() {
        let mut printer = Printer::new();
        printer.outdent();
    }

    #[test]
    fn scoped_vars_restore_on_exit() {
        let mut printer = Printer::new();
        printer.with_vars(&[("name", "outer")], |p| {
            p.print("$name$\n");
            p.with_vars(&[("name", "inner")], |p| p.print("$name$\n"));
            p.print("$name$\n");
        });
        assert_eq!(printer.output(), "outer\ninner\nouter\n");
    }

    #[test]
    fn annotations_capture_spans_in_encounter_order() {
        let mut printer = Printer::new();
        printer.print_with(&[("class", "Foo")], "class $class$ {\n");
        printer.annotate("class", "foo.proto", &[4, 0], Semantic::None);
        printer.print_with(&[("method", "bar")], "  void $method$();\n");
        printer.annotate("method", "foo.proto", &[4, 0, 2, 0], Semantic::Set);

        let (text, info) = printer.into_parts();
        assert_eq!(info.annotation.len(), 2);
        let first = &info.annotation[0];
        assert_eq!(
            &text[first.begin as usize..first.end as usize],
            "Foo",
            "annotation range must point at the substituted value"
        );
        let second = &info.annotation[1];
        assert_eq!(&text[second.begin as usize..second.end as usize], "bar");
        assert!(first.begin < second.begin, "encounter order");
    }

    #[test]
    fn emit_block_substitution_runs_at_current_indent() {
        let mut printer = Printer::new();
        printer.indent();
        printer.emit(
            &[
                Sub::text("name", "Foo"),
                Sub::block("body", &|p: &mut Printer| {
                    p.indent();
                    p.print("int x;\n");
                    p.outdent();
                }),
            ],
            "struct $name$ {\n$body$};\n",
        );
        assert_eq!(printer.output(), "  struct Foo {\n    int x;\n  };\n");
    }

    #[test]
    fn deterministic_output() {
        let emit = || {
            let mut printer = Printer::new();
            printer.with_vars(&[("a", "1"), ("b", "2")], |p| {
                p.print("$a$ $b$ $a$\n");
            });
            printer.into_parts().0
        };
        assert_eq!(emit(), emit());
    }
}
