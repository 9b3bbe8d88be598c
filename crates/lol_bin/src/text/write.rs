//! Printing property documents as text

use std::fmt::Write;

use bon::Builder;
use lol_hash::{HashValue, Named};

use crate::{
    error::{Error, Result},
    types::{Bin, BinField, BinType, BinValue, Embedded},
};

/// Options for how a document is printed
#[derive(Debug, Clone, Copy, Builder)]
pub struct TextOptions {
    /// Spaces per indentation level
    #[builder(default = 4)]
    pub indent_width: usize,
}

impl Default for TextOptions {
    fn default() -> Self {
        TextOptions::builder().build()
    }
}

/// Format a float with at most four decimals, dropping trailing zeros and a trailing point
pub fn format_f32(value: f32) -> String {
    let text = format!("{value:.4}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_owned()
    } else {
        text
    }
}

/// Escape a string for use between double quotes
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out
}

/// Whether the reader would take `name` for a hex hash rather than hash it
fn reads_as_hex<T: HashValue>(name: &str) -> bool {
    let digits = name
        .strip_prefix("0x")
        .or_else(|| name.strip_prefix("0X"))
        .unwrap_or(name);
    T::is_hash(digits)
}

fn is_bare_safe<T: HashValue>(name: &str) -> bool {
    !name.is_empty()
        && !reads_as_hex::<T>(name)
        && !name.starts_with("0x")
        && !name.starts_with("0X")
        && !name.starts_with('#')
        && name != "null"
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '{' | '}' | '=' | '"' | ',' | ':' | '\''))
}

/// Print an identifier, as its name when that reads back to the same hash, as hex otherwise
pub fn hash_token<T: HashValue>(hash: &Named<T>, quote: bool) -> String {
    match &hash.name {
        Some(name) if quote && !reads_as_hex::<T>(name) => format!("\"{}\"", escape(name)),
        Some(name) if !quote && is_bare_safe::<T>(name) => name.clone(),
        _ => format!("0x{}", hash.hex()),
    }
}

/// Type annotation of a value, `list[string]`, `map[hash,embed]` and so on
pub fn type_annotation(value: &BinValue) -> Result<String> {
    let inner = |outer: BinType, inner: BinType| -> Result<()> {
        if inner.is_container() {
            Err(Error::NestedContainer { outer, inner })
        } else {
            Ok(())
        }
    };

    let annotation = match value {
        BinValue::List { value_type, .. }
        | BinValue::List2 { value_type, .. }
        | BinValue::Option { value_type, .. } => {
            inner(value.bin_type(), *value_type)?;
            format!("{}[{}]", value.bin_type(), value_type)
        }
        BinValue::Map {
            key_type,
            value_type,
            ..
        } => {
            inner(BinType::Map, *key_type)?;
            inner(BinType::Map, *value_type)?;
            format!("map[{key_type},{value_type}]")
        }
        other => other.bin_type().to_string(),
    };
    Ok(annotation)
}

struct TextWriter {
    out: String,
    indent_width: usize,
}

impl TextWriter {
    fn indent(&mut self, level: usize) {
        for _ in 0..level * self.indent_width {
            self.out.push(' ');
        }
    }

    fn field(&mut self, field: &BinField, level: usize) -> Result<()> {
        self.indent(level);
        write!(
            self.out,
            "{}: {} = ",
            hash_token(&field.name, false),
            type_annotation(&field.value)?
        )?;
        self.value(&field.value, level)?;
        self.out.push('\n');
        Ok(())
    }

    fn fields(&mut self, fields: &[BinField], level: usize) -> Result<()> {
        self.out.push('{');
        if fields.is_empty() {
            self.out.push('}');
            return Ok(());
        }
        self.out.push('\n');
        for field in fields {
            self.field(field, level + 1)?;
        }
        self.indent(level);
        self.out.push('}');
        Ok(())
    }

    fn embedded(&mut self, object: &Embedded, level: usize) -> Result<()> {
        if object.is_null() {
            self.out.push_str("null");
            return Ok(());
        }
        write!(self.out, "{} ", hash_token(&object.class, false))?;
        self.fields(&object.fields, level)
    }

    fn floats(&mut self, values: &[f32]) -> Result<()> {
        let values: Vec<String> = values.iter().map(|v| format_f32(*v)).collect();
        write!(self.out, "{{ {} }}", values.join(", "))?;
        Ok(())
    }

    fn block<'a>(
        &mut self,
        items: impl ExactSizeIterator<Item = &'a BinValue>,
        level: usize,
    ) -> Result<()> {
        self.out.push('{');
        if items.len() == 0 {
            self.out.push('}');
            return Ok(());
        }
        self.out.push('\n');
        for item in items {
            self.indent(level + 1);
            self.value(item, level + 1)?;
            self.out.push('\n');
        }
        self.indent(level);
        self.out.push('}');
        Ok(())
    }

    /// Print a value starting at the current column, nested lines are indented from `level`
    fn value(&mut self, value: &BinValue, level: usize) -> Result<()> {
        match value {
            BinValue::None => self.out.push_str("null"),
            BinValue::Bool(value) => write!(self.out, "{value}")?,
            BinValue::I8(value) => write!(self.out, "{value}")?,
            BinValue::U8(value) => write!(self.out, "{value}")?,
            BinValue::I16(value) => write!(self.out, "{value}")?,
            BinValue::U16(value) => write!(self.out, "{value}")?,
            BinValue::I32(value) => write!(self.out, "{value}")?,
            BinValue::U32(value) => write!(self.out, "{value}")?,
            BinValue::I64(value) => write!(self.out, "{value}")?,
            BinValue::U64(value) => write!(self.out, "{value}")?,
            BinValue::F32(value) => self.out.push_str(&format_f32(*value)),
            BinValue::Vec2(value) => self.floats(value)?,
            BinValue::Vec3(value) => self.floats(value)?,
            BinValue::Vec4(value) => self.floats(value)?,
            BinValue::Mtx44(value) => {
                self.out.push_str("{\n");
                for row in value.chunks(4) {
                    self.indent(level + 1);
                    let row: Vec<String> = row.iter().map(|v| format_f32(*v)).collect();
                    writeln!(self.out, "{}", row.join(", "))?;
                }
                self.indent(level);
                self.out.push('}');
            }
            BinValue::Rgba([r, g, b, a]) => write!(self.out, "{{ {r}, {g}, {b}, {a} }}")?,
            BinValue::String(value) => write!(self.out, "\"{}\"", escape(value))?,
            BinValue::Hash(hash) | BinValue::Link(hash) => {
                self.out.push_str(&hash_token(hash, true))
            }
            BinValue::File(hash) => self.out.push_str(&hash_token(hash, true)),
            BinValue::List { items, .. } | BinValue::List2 { items, .. } => {
                self.block(items.iter(), level)?
            }
            BinValue::Pointer(object) | BinValue::Embed(object) => self.embedded(object, level)?,
            BinValue::Option { item, .. } => self.block(item.iter().map(|b| b.as_ref()), level)?,
            BinValue::Map { entries, .. } => {
                self.out.push('{');
                if entries.is_empty() {
                    self.out.push('}');
                    return Ok(());
                }
                self.out.push('\n');
                for (key, value) in entries {
                    self.indent(level + 1);
                    self.value(key, level + 1)?;
                    self.out.push_str(" = ");
                    self.value(value, level + 1)?;
                    self.out.push('\n');
                }
                self.indent(level);
                self.out.push('}');
            }
            BinValue::Flag(value) => write!(self.out, "{}", *value != 0)?,
        }
        Ok(())
    }

    fn document(&mut self, bin: &Bin) -> Result<()> {
        let signature = bin.signature();
        writeln!(self.out, "#{signature}_text")?;
        writeln!(self.out, "type: string = \"{signature}\"")?;
        writeln!(self.out, "version: u32 = {}", bin.version)?;

        self.out.push_str("linked: list[string] = ");
        let links: Vec<BinValue> = bin
            .links
            .iter()
            .map(|link| BinValue::String(link.clone()))
            .collect();
        self.block(links.iter(), 0)?;
        self.out.push('\n');

        self.out.push_str("entries: map[hash,embed] = {");
        if bin.entries.is_empty() {
            self.out.push_str("}\n");
        } else {
            self.out.push('\n');
            for entry in &bin.entries {
                self.indent(1);
                write!(
                    self.out,
                    "{} = {} ",
                    hash_token(&entry.hash, true),
                    hash_token(&entry.class, false)
                )?;
                self.fields(&entry.fields, 1)?;
                self.out.push('\n');
            }
            self.out.push_str("}\n");
        }

        if bin.is_patch {
            self.out.push_str("patches: map[hash,embed] = {");
            if bin.patches.is_empty() {
                self.out.push_str("}\n");
            } else {
                self.out.push('\n');
                for patch in &bin.patches {
                    self.indent(1);
                    writeln!(self.out, "{} = patch {{", hash_token(&patch.hash, true))?;
                    self.indent(2);
                    writeln!(self.out, "path: string = \"{}\"", escape(&patch.path))?;
                    self.indent(2);
                    write!(self.out, "value: {} = ", type_annotation(&patch.value)?)?;
                    self.value(&patch.value, 2)?;
                    self.out.push('\n');
                    self.indent(1);
                    self.out.push_str("}\n");
                }
                self.out.push_str("}\n");
            }
        }

        Ok(())
    }
}

impl Bin {
    /// Print the document with the default options
    pub fn to_text(&self) -> Result<String> {
        self.to_text_with(&TextOptions::default())
    }

    /// Print the document
    ///
    /// Containers directly inside containers have no type annotation and fail with
    /// [`Error::NestedContainer`].
    pub fn to_text_with(&self, options: &TextOptions) -> Result<String> {
        let mut writer = TextWriter {
            out: String::new(),
            indent_width: options.indent_width,
        };
        writer.document(self)?;
        Ok(writer.out)
    }
}
