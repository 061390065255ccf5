//! Keyword table: which functions carry translatable messages, and where.
//!
//! A keyword is registered with a spec of the form `NAME[:ARGS]`:
//!
//! - `_` → argument 1 is the message
//! - `gettext.dgettext:2` → argument 2 is the message
//! - `gettext.ngettext:1,2` → arguments 1 and 2 are singular and plural
//! - `pgettext:1c,2` → argument 1 is the message context
//! - `tr:1,2t` → only calls with exactly 2 arguments match

use std::collections::HashMap;

use anyhow::{Context, Result, bail};

/// Keywords recognized when the caller does not opt out.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "_",
    "gettext.gettext",
    "gettext.dgettext:2",
    "gettext.dcgettext:2",
    "gettext.ngettext:1,2",
    "gettext.dngettext:2,3",
    "gettext.dcngettext:2,3",
];

/// Which arguments of a keyword call are message text. Argument numbers are
/// 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallShape {
    pub msgid: usize,
    pub plural: Option<usize>,
    pub context: Option<usize>,
    /// Required total number of arguments, if any.
    pub total: Option<usize>,
}

impl CallShape {
    pub fn singular(msgid: usize) -> Self {
        Self {
            msgid,
            plural: None,
            context: None,
            total: None,
        }
    }

    pub fn plural(msgid: usize, plural: usize) -> Self {
        Self {
            plural: Some(plural),
            ..Self::singular(msgid)
        }
    }

    /// Highest argument number this shape reads.
    pub fn max_arg(&self) -> usize {
        [Some(self.msgid), self.plural, self.context]
            .into_iter()
            .flatten()
            .max()
            .unwrap_or(self.msgid)
    }
}

impl Default for CallShape {
    fn default() -> Self {
        Self::singular(1)
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeywordTable {
    shapes: HashMap<String, CallShape>,
}

impl KeywordTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        table.install_defaults();
        table
    }

    /// Build a table from user specs, on top of [`DEFAULT_KEYWORDS`] unless
    /// `with_defaults` is false. User specs replace defaults of the same name.
    pub fn from_specs<S: AsRef<str>>(specs: &[S], with_defaults: bool) -> Result<Self> {
        let mut table = if with_defaults {
            Self::with_defaults()
        } else {
            Self::new()
        };
        for spec in specs {
            table.insert_spec(spec.as_ref())?;
        }
        Ok(table)
    }

    pub fn install_defaults(&mut self) {
        for spec in DEFAULT_KEYWORDS {
            if let Ok((name, shape)) = parse_keyword_spec(spec) {
                self.shapes.insert(name, shape);
            }
        }
    }

    pub fn insert_spec(&mut self, spec: &str) -> Result<()> {
        let (name, shape) = parse_keyword_spec(spec)?;
        self.shapes.insert(name, shape);
        Ok(())
    }

    /// Look up a (possibly dotted) symbol name.
    pub fn get(&self, name: &[u8]) -> Option<&CallShape> {
        let name = std::str::from_utf8(name).ok()?;
        self.shapes.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }
}

/// Parse a `NAME[:ARGS]` keyword spec.
pub fn parse_keyword_spec(spec: &str) -> Result<(String, CallShape)> {
    let (name, args) = match spec.split_once(':') {
        Some((name, args)) => (name, Some(args)),
        None => (spec, None),
    };

    if !is_qualified_name(name) {
        bail!("Invalid keyword name in \"{}\"", spec);
    }

    let Some(args) = args else {
        return Ok((name.to_string(), CallShape::default()));
    };

    let mut positional = Vec::new();
    let mut context = None;
    let mut total = None;

    for part in args.split(',').map(str::trim) {
        if let Some(digits) = part.strip_suffix('c') {
            set_once(&mut context, parse_arg(digits, part, spec)?, part, spec)?;
        } else if let Some(digits) = part.strip_suffix('t') {
            set_once(&mut total, parse_arg(digits, part, spec)?, part, spec)?;
        } else {
            positional.push(parse_arg(part, part, spec)?);
        }
    }

    let shape = match positional.as_slice() {
        [] => CallShape::singular(1),
        [msgid] => CallShape::singular(*msgid),
        [msgid, plural] if msgid != plural => CallShape::plural(*msgid, *plural),
        _ => bail!("Too many or repeated message arguments in keyword \"{}\"", spec),
    };
    let shape = CallShape {
        context,
        total,
        ..shape
    };

    if shape.context.is_some_and(|c| c == shape.msgid || Some(c) == shape.plural) {
        bail!("Context argument overlaps message argument in keyword \"{}\"", spec);
    }
    if shape.total.is_some_and(|t| t < shape.max_arg()) {
        bail!("Total argument count too small in keyword \"{}\"", spec);
    }

    Ok((name.to_string(), shape))
}

fn parse_arg(digits: &str, part: &str, spec: &str) -> Result<usize> {
    let n: usize = digits
        .parse()
        .with_context(|| format!("Invalid argument \"{}\" in keyword \"{}\"", part, spec))?;
    if n == 0 {
        bail!("Argument numbers start at 1 in keyword \"{}\"", spec);
    }
    Ok(n)
}

fn set_once(slot: &mut Option<usize>, n: usize, part: &str, spec: &str) -> Result<()> {
    if slot.replace(n).is_some() {
        bail!("Duplicate argument \"{}\" in keyword \"{}\"", part, spec);
    }
    Ok(())
}

/// `name` or `a.b.c` where every part is a Lua identifier.
fn is_qualified_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            let mut bytes = part.bytes();
            bytes
                .next()
                .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_')
                && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
        })
}
