//! Parsing property documents from text

use std::str::FromStr;

use lol_hash::{fnv1a, BinHash, HashValue, Named};
use winnow::{
    ascii::{float, multispace1, till_line_ending},
    combinator::{alt, fail, opt, repeat},
    error::{StrContext, StrContextValue},
    prelude::*,
    token::{any, take_till, take_while},
};

use crate::{
    error::{Error, Result},
    types::{Bin, BinEntry, BinField, BinPatch, BinType, BinValue, Embedded},
};

/// Declared type of a value, with the sub-types of containers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TypeSpec {
    bin_type: BinType,
    first: BinType,
    second: BinType,
}

fn expected<O>(input: &mut &str, what: &'static str) -> PResult<O> {
    fail.context(StrContext::Expected(StrContextValue::Description(what)))
        .parse_next(input)
}

/// Whitespace and `#` comments
fn ws(input: &mut &str) -> PResult<()> {
    repeat(
        0..,
        alt((multispace1.void(), ('#', till_line_ending).void())),
    )
    .parse_next(input)
}

fn quoted(input: &mut &str) -> PResult<String> {
    '"'.parse_next(input)?;
    let mut out = String::new();
    loop {
        let chunk: &str = take_till(0.., ['"', '\\']).parse_next(input)?;
        out.push_str(chunk);
        match any
            .context(StrContext::Expected(StrContextValue::CharLiteral('"')))
            .parse_next(input)?
        {
            '"' => return Ok(out),
            _ => {
                let escaped = any.parse_next(input)?;
                out.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                });
            }
        }
    }
}

fn bare<'i>(input: &mut &'i str) -> PResult<&'i str> {
    take_while(1.., |c: char| {
        !c.is_whitespace() && !matches!(c, '{' | '}' | '=' | '"' | ',')
    })
    .parse_next(input)
}

/// A quoted name, a bare name or a hex hash with an optional `0x` prefix
fn hash_token<T: HashValue>(input: &mut &str) -> PResult<Named<T>> {
    alt((
        quoted.map(|name| Named::parse(&name)),
        bare.map(Named::parse),
    ))
    .context(StrContext::Label("hash"))
    .parse_next(input)
}

fn field_name(input: &mut &str) -> PResult<BinHash> {
    if input.starts_with('"') {
        let name = quoted(input)?;
        ws(input)?;
        ':'.parse_next(input)?;
        return Ok(Named::parse(&name));
    }
    let token = bare
        .context(StrContext::Label("field name"))
        .parse_next(input)?;
    match token.strip_suffix(':') {
        Some(name) if !name.is_empty() => Ok(Named::parse(name)),
        _ => {
            ws(input)?;
            ':'.parse_next(input)?;
            Ok(Named::parse(token))
        }
    }
}

fn type_name(input: &mut &str) -> PResult<BinType> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric())
        .verify_map(BinType::from_name)
        .context(StrContext::Expected(StrContextValue::Description(
            "a type name",
        )))
        .parse_next(input)
}

fn inner_type_name(input: &mut &str) -> PResult<BinType> {
    ws(input)?;
    let inner = type_name
        .verify(|t: &BinType| !t.is_container())
        .context(StrContext::Expected(StrContextValue::Description(
            "a non-container element type",
        )))
        .parse_next(input)?;
    ws(input)?;
    Ok(inner)
}

fn type_spec(input: &mut &str) -> PResult<TypeSpec> {
    let bin_type = type_name(input)?;
    let mut spec = TypeSpec {
        bin_type,
        first: BinType::None,
        second: BinType::None,
    };
    match bin_type {
        BinType::List | BinType::List2 | BinType::Option => {
            '['.parse_next(input)?;
            spec.first = inner_type_name(input)?;
            ']'.parse_next(input)?;
        }
        BinType::Map => {
            '['.parse_next(input)?;
            spec.first = inner_type_name(input)?;
            ','.parse_next(input)?;
            spec.second = inner_type_name(input)?;
            ']'.parse_next(input)?;
        }
        _ => {}
    }
    Ok(spec)
}

fn integer<T>(input: &mut &str) -> PResult<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    take_while(1.., ('0'..='9', '-', '+'))
        .try_map(str::parse::<T>)
        .context(StrContext::Expected(StrContextValue::Description(
            "an integer in range",
        )))
        .parse_next(input)
}

fn boolean(input: &mut &str) -> PResult<bool> {
    alt(("true".value(true), "false".value(false)))
        .context(StrContext::Expected(StrContextValue::Description(
            "true or false",
        )))
        .parse_next(input)
}

fn number(input: &mut &str) -> PResult<f32> {
    float
        .context(StrContext::Expected(StrContextValue::Description("a number")))
        .parse_next(input)
}

/// `{ a, b, c }`, commas are optional so matrix rows may be split over lines
fn numbers<T: Copy + Default, const N: usize>(
    input: &mut &str,
    mut element: impl FnMut(&mut &str) -> PResult<T>,
) -> PResult<[T; N]> {
    '{'.parse_next(input)?;
    let mut out = [T::default(); N];
    for slot in out.iter_mut() {
        ws(input)?;
        *slot = element(input)?;
        ws(input)?;
        opt(',').parse_next(input)?;
    }
    ws(input)?;
    '}'.parse_next(input)?;
    Ok(out)
}

/// Consume a closing brace if one follows
fn close(input: &mut &str) -> PResult<bool> {
    ws(input)?;
    Ok(opt('}').parse_next(input)?.is_some())
}

fn items(input: &mut &str, value_type: BinType) -> PResult<Vec<BinValue>> {
    '{'.parse_next(input)?;
    let mut items = Vec::new();
    while !close(input)? {
        items.push(value(input, value_type, BinType::None, BinType::None)?);
        ws(input)?;
        opt(',').parse_next(input)?;
    }
    Ok(items)
}

fn fields(input: &mut &str) -> PResult<Vec<BinField>> {
    '{'.parse_next(input)?;
    let mut fields = Vec::new();
    while !close(input)? {
        fields.push(field(input)?);
    }
    Ok(fields)
}

fn embedded(input: &mut &str) -> PResult<Embedded> {
    let class = if input.starts_with('"') {
        Named::parse(&quoted(input)?)
    } else {
        let token = bare
            .context(StrContext::Label("class name"))
            .parse_next(input)?;
        if token == "null" {
            return Ok(Embedded::null());
        }
        Named::parse(token)
    };
    ws(input)?;
    let fields = fields(input)?;
    Ok(Embedded { class, fields })
}

fn value(input: &mut &str, value_type: BinType, first: BinType, second: BinType) -> PResult<BinValue> {
    let value = match value_type {
        BinType::None => "null".value(BinValue::None).parse_next(input)?,
        BinType::Bool => BinValue::Bool(boolean(input)?),
        BinType::I8 => BinValue::I8(integer(input)?),
        BinType::U8 => BinValue::U8(integer(input)?),
        BinType::I16 => BinValue::I16(integer(input)?),
        BinType::U16 => BinValue::U16(integer(input)?),
        BinType::I32 => BinValue::I32(integer(input)?),
        BinType::U32 => BinValue::U32(integer(input)?),
        BinType::I64 => BinValue::I64(integer(input)?),
        BinType::U64 => BinValue::U64(integer(input)?),
        BinType::F32 => BinValue::F32(number(input)?),
        BinType::Vec2 => BinValue::Vec2(numbers(input, number)?),
        BinType::Vec3 => BinValue::Vec3(numbers(input, number)?),
        BinType::Vec4 => BinValue::Vec4(numbers(input, number)?),
        BinType::Mtx44 => BinValue::Mtx44(numbers(input, number)?),
        BinType::Rgba => BinValue::Rgba(numbers(input, integer::<u8>)?),
        BinType::String => BinValue::String(
            quoted
                .context(StrContext::Expected(StrContextValue::Description(
                    "a quoted string",
                )))
                .parse_next(input)?,
        ),
        BinType::Hash => BinValue::Hash(hash_token::<u32>(input)?),
        BinType::File => BinValue::File(hash_token::<u64>(input)?),
        BinType::List => BinValue::List {
            value_type: first,
            items: items(input, first)?,
        },
        BinType::List2 => BinValue::List2 {
            value_type: first,
            items: items(input, first)?,
        },
        BinType::Pointer => BinValue::Pointer(embedded(input)?),
        BinType::Embed => BinValue::Embed(embedded(input)?),
        BinType::Link => BinValue::Link(hash_token::<u32>(input)?),
        BinType::Option => {
            '{'.parse_next(input)?;
            let item = if close(input)? {
                None
            } else {
                let item = value(input, first, BinType::None, BinType::None)?;
                ws(input)?;
                '}'.parse_next(input)?;
                Some(Box::new(item))
            };
            BinValue::Option {
                value_type: first,
                item,
            }
        }
        BinType::Map => {
            '{'.parse_next(input)?;
            let mut entries = Vec::new();
            while !close(input)? {
                let key = value(input, first, BinType::None, BinType::None)?;
                ws(input)?;
                '='.parse_next(input)?;
                ws(input)?;
                let item = value(input, second, BinType::None, BinType::None)?;
                entries.push((key, item));
            }
            BinValue::Map {
                key_type: first,
                value_type: second,
                entries,
            }
        }
        BinType::Flag => BinValue::Flag(alt((boolean.map(u8::from), integer::<u8>)).parse_next(input)?),
    };
    Ok(value)
}

fn typed_value(input: &mut &str) -> PResult<BinValue> {
    ws(input)?;
    let spec = type_spec(input)?;
    ws(input)?;
    '='.parse_next(input)?;
    ws(input)?;
    value(input, spec.bin_type, spec.first, spec.second)
}

/// `name: type = value`
fn field(input: &mut &str) -> PResult<BinField> {
    let name = field_name(input)?;
    let value = typed_value(input)?;
    Ok(BinField { name, value })
}

fn entry_from_value(key: BinValue, object: BinValue) -> Option<BinEntry> {
    match (key, object) {
        (BinValue::Hash(hash), BinValue::Embed(object)) => Some(BinEntry {
            hash,
            class: object.class,
            fields: object.fields,
        }),
        _ => None,
    }
}

fn patch_from_value(key: BinValue, object: BinValue) -> Option<BinPatch> {
    let (BinValue::Hash(hash), BinValue::Embed(object)) = (key, object) else {
        return None;
    };
    let mut path = None;
    let mut value = None;
    for field in object.fields {
        if field.name.hash == fnv1a("path") {
            path = field.value.as_str().map(str::to_owned);
        } else if field.name.hash == fnv1a("value") {
            value = Some(field.value);
        }
    }
    Some(BinPatch {
        hash,
        path: path?,
        value: value?,
    })
}

fn hash_embed_map(input: &mut &str) -> PResult<Vec<(BinValue, BinValue)>> {
    match typed_value(input)? {
        BinValue::Map {
            key_type: BinType::Hash,
            value_type: BinType::Embed,
            entries,
        } => Ok(entries),
        _ => expected(input, "map[hash,embed]"),
    }
}

fn block(input: &mut &str, bin: &mut Bin) -> PResult<()> {
    let name = field_name(input)?;
    let name = name.name.unwrap_or_default();
    match name.as_str() {
        "type" => match typed_value(input)? {
            BinValue::String(signature) if signature == "PROP" || signature == "PTCH" => {
                bin.is_patch = signature == "PTCH";
            }
            _ => return expected(input, "type: string = \"PROP\" or \"PTCH\""),
        },
        "version" => match typed_value(input)? {
            BinValue::U32(version) => bin.version = version,
            _ => return expected(input, "version: u32"),
        },
        "linked" => match typed_value(input)? {
            BinValue::List {
                value_type: BinType::String,
                items,
            } => {
                bin.links = items
                    .into_iter()
                    .filter_map(|item| item.as_str().map(str::to_owned))
                    .collect();
            }
            _ => return expected(input, "linked: list[string]"),
        },
        "entries" => {
            for (key, object) in hash_embed_map(input)? {
                match entry_from_value(key, object) {
                    Some(entry) => bin.entries.push(entry),
                    None => return expected(input, "entry key = Class { fields }"),
                }
            }
        }
        "patches" => {
            for (key, object) in hash_embed_map(input)? {
                match patch_from_value(key, object) {
                    Some(patch) => bin.patches.push(patch),
                    None => return expected(input, "patch { path: string value: type }"),
                }
            }
        }
        _ => {
            return expected(
                input,
                "one of the blocks type, version, linked, entries, patches",
            )
        }
    }
    Ok(())
}

fn document(input: &mut &str) -> PResult<Bin> {
    let mut bin = Bin::default();
    ws(input)?;
    while !input.is_empty() {
        block(input, &mut bin)?;
        ws(input)?;
    }
    Ok(bin)
}

/// 1-based line and column of a byte offset
fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let before = &text[..offset.min(text.len())];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rsplit('\n')
        .next()
        .map(|line| line.chars().count())
        .unwrap_or(0)
        + 1;
    (line, column)
}

impl Bin {
    /// Parse a document from its text form
    ///
    /// ```
    /// # fn doit() -> lol_bin::error::Result<()>
    /// # {
    /// use lol_bin::Bin;
    ///
    /// let bin = Bin::from_text(
    ///     r#"
    ///     #PROP_text
    ///     type: string = "PROP"
    ///     version: u32 = 3
    ///     entries: map[hash,embed] = {
    ///         "Annie" = Champion { mName: string = "Annie" }
    ///     }
    ///     "#,
    /// )?;
    /// assert_eq!(bin.entries[0].class.to_string(), "Champion");
    /// # Ok(())
    /// # }
    /// # doit().unwrap();
    /// ```
    pub fn from_text(text: &str) -> Result<Bin> {
        document.parse(text).map_err(|error| {
            let (line, column) = line_column(text, error.offset());
            Error::TextParse {
                line,
                column,
                message: error.inner().to_string(),
            }
        })
    }
}

#[cfg(test)]
mod test {
    use lol_hash::{fnv1a, xxh64, PathHash};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_list_of_strings() -> Result<()> {
        let bin = Bin::from_text(
            r#"#PROP_text
type: string = "PROP"
version: u32 = 3
linked: list[string] = {}
entries: map[hash,embed] = {
    0x00000001 = 0x0000002a {
        0x00000007: list[string] = {
            "a"
            "bc"
        }
    }
}
"#,
        )?;

        assert_eq!(
            bin.entries,
            vec![BinEntry {
                hash: BinHash::new(1),
                class: BinHash::new(0x2A),
                fields: vec![BinField::new(
                    BinHash::new(7),
                    BinValue::List {
                        value_type: BinType::String,
                        items: vec![BinValue::String("a".into()), BinValue::String("bc".into())],
                    },
                )],
            }]
        );

        Ok(())
    }

    #[test]
    fn parse_values() -> Result<()> {
        let bin = Bin::from_text(
            r#"entries: map[hash,embed] = {
    "Entry" = Cls {
        mtx: mtx44 = {
            1, 0, 0, 0
            0, 1, 0, 0
            0, 0, 1, 0
            0, 0, 0, 1
        }
        color: rgba = { 255, 128, 0, 255 }
        path: file = "ASSETS/a.dds"
        raw: hash = 0xdeadbeef
        text: string = "tab\there \"quoted\" back\\slash"
        m: map[u32,option[u8]] = {}
    }
}
"#,
        );
        // containers are not valid map values
        assert!(matches!(bin, Err(Error::TextParse { line: 13, .. })));

        let bin = Bin::from_text(
            r#"entries: map[hash,embed] = {
    "Entry" = Cls {
        color: rgba = { 255, 128, 0, 255 }
        path: file = "ASSETS/a.dds"
        raw: hash = 0xdeadbeef
        text: string = "tab\there \"quoted\" back\\slash"
        f: flag = false
        o: option[f32] = {
            1.5
        }
    }
}
"#,
        )?;
        let entry = &bin.entries[0];
        assert_eq!(entry.hash, BinHash::from_raw("Entry"));
        assert_eq!(entry.field(fnv1a("color")), Some(&BinValue::Rgba([255, 128, 0, 255])));
        assert_eq!(
            entry.field(fnv1a("path")).cloned(),
            Some(BinValue::File(PathHash {
                hash: xxh64("assets/a.dds"),
                name: Some("ASSETS/a.dds".into())
            }))
        );
        assert_eq!(entry.field(fnv1a("raw")), Some(&BinValue::Hash(BinHash::new(0xdeadbeef))));
        assert_eq!(
            entry.field(fnv1a("text")).and_then(BinValue::as_str),
            Some("tab\there \"quoted\" back\\slash")
        );
        assert_eq!(entry.field(fnv1a("f")), Some(&BinValue::Flag(0)));
        assert_eq!(
            entry.field(fnv1a("o")),
            Some(&BinValue::Option {
                value_type: BinType::F32,
                item: Some(Box::new(BinValue::F32(1.5)))
            })
        );

        Ok(())
    }

    #[test]
    fn errors_report_position() {
        let result = Bin::from_text("version: u32 = 3\nentries: map[hash,embed] = {\n    \"a\" = B {\n        x: u8 = 300\n    }\n}\n");
        let Err(Error::TextParse { line, .. }) = result else {
            panic!("expected a parse error, got {result:?}");
        };
        assert_eq!(line, 4);

        assert!(matches!(
            Bin::from_text("bogus: u32 = 1"),
            Err(Error::TextParse { line: 1, .. })
        ));
    }

    #[test]
    fn line_column_of_offsets() {
        assert_eq!(line_column("ab\ncd", 0), (1, 1));
        assert_eq!(line_column("ab\ncd", 4), (2, 2));
    }
}
