//! Format-flag contexts.
//!
//! A flag context says whether a string argument is a Lua format string.
//! Flags are declared per function argument with specs like
//! `string.format:1:lua-format` and flow inward: in
//!
//! ```lua
//! string.format(_("%d apples"), n)
//! ```
//!
//! argument 1 of `string.format` is a format string and argument 1 of `_`
//! passes its caller's context through, so the extracted message is marked
//! `lua-format`.

use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result, bail};
use serde::Serialize;

/// Flags recorded for the default keywords and the standard library.
pub const DEFAULT_FLAGS: &[&str] = &[
    "_:1:pass-lua-format",
    "gettext.gettext:1:pass-lua-format",
    "gettext.dgettext:2:pass-lua-format",
    "gettext.dcgettext:2:pass-lua-format",
    "gettext.ngettext:1:pass-lua-format",
    "gettext.ngettext:2:pass-lua-format",
    "gettext.dngettext:2:pass-lua-format",
    "gettext.dngettext:3:pass-lua-format",
    "gettext.dcngettext:2:pass-lua-format",
    "gettext.dcngettext:3:pass-lua-format",
    "string.format:1:lua-format",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormatFlag {
    #[default]
    Undecided,
    Yes,
    No,
    /// Not declared, but the text parses as a format string with directives.
    Possible,
    /// Not declared, and the text is not a valid format string.
    Impossible,
}

impl FormatFlag {
    /// Combine the flag of a new occurrence into an existing one. Explicit
    /// declarations win over guesses.
    pub fn merge(self, other: FormatFlag) -> FormatFlag {
        use FormatFlag::*;
        match (self, other) {
            (Yes | No, _) => self,
            (_, Yes | No) => other,
            (Possible, _) | (_, Possible) => Possible,
            (Impossible, _) | (_, Impossible) => Impossible,
            (Undecided, Undecided) => Undecided,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagContext {
    pub is_format: FormatFlag,
    /// Take `is_format` from the enclosing call's argument instead.
    pub pass_format: bool,
}

impl FlagContext {
    pub const NULL: FlagContext = FlagContext {
        is_format: FormatFlag::Undecided,
        pass_format: false,
    };

    pub const PASSTHROUGH: FlagContext = FlagContext {
        is_format: FormatFlag::Undecided,
        pass_format: true,
    };

    /// The context of an argument whose declaration is `self`, inside an
    /// argument whose context is `outer`.
    pub fn inherit(self, outer: FlagContext) -> FlagContext {
        if self.pass_format {
            FlagContext {
                is_format: outer.is_format,
                pass_format: false,
            }
        } else {
            self
        }
    }
}

/// Per-argument flag contexts of one function.
pub type ArgumentFlags = BTreeMap<usize, FlagContext>;

#[derive(Debug, Clone, Default)]
pub struct FlagTable {
    entries: HashMap<String, ArgumentFlags>,
}

impl FlagTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        for spec in DEFAULT_FLAGS {
            if let Ok(Some((name, arg, flag))) = parse_flag_spec(spec) {
                table.insert(name, arg, flag);
            }
        }
        table
    }

    /// [`DEFAULT_FLAGS`] followed by `specs`.
    pub fn from_specs<S: AsRef<str>>(specs: &[S]) -> Result<Self> {
        let mut table = Self::with_defaults();
        for spec in specs {
            table.insert_spec(spec.as_ref())?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, name: impl Into<String>, arg: usize, flag: FlagSpec) {
        let context = self
            .entries
            .entry(name.into())
            .or_default()
            .entry(arg)
            .or_default();
        match flag {
            FlagSpec::Format(is_format) => context.is_format = is_format,
            FlagSpec::Pass => context.pass_format = true,
        }
    }

    pub fn insert_spec(&mut self, spec: &str) -> Result<()> {
        if let Some((name, arg, flag)) = parse_flag_spec(spec)? {
            self.insert(name, arg, flag);
        }
        Ok(())
    }

    /// Iterator over the argument contexts of the function `name`.
    pub fn iter(&self, name: &[u8]) -> ContextIter<'_> {
        std::str::from_utf8(name)
            .ok()
            .and_then(|name| self.entries.get(name))
            .map_or(ContextIter::Null, |flags| ContextIter::List { flags, arg: 1 })
    }
}

/// Yields the declared flag context of each successive argument of a call.
#[derive(Debug, Clone, Copy)]
pub enum ContextIter<'t> {
    /// Every argument is undecided.
    Null,
    /// Every argument inherits from the enclosing context.
    Passthrough,
    List { flags: &'t ArgumentFlags, arg: usize },
}

impl ContextIter<'_> {
    pub fn advance(&mut self) -> FlagContext {
        match self {
            ContextIter::Null => FlagContext::NULL,
            ContextIter::Passthrough => FlagContext::PASSTHROUGH,
            ContextIter::List { flags, arg } => {
                let context = flags.get(&*arg).copied().unwrap_or_default();
                *arg += 1;
                context
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagSpec {
    Format(FormatFlag),
    Pass,
}

/// Parse a `NAME:ARG:FLAG` spec. Flags for other languages' format strings
/// are accepted and yield `None`.
pub fn parse_flag_spec(spec: &str) -> Result<Option<(String, usize, FlagSpec)>> {
    let mut parts = spec.split(':');
    let (Some(name), Some(arg), Some(flag), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        bail!("Invalid flag \"{}\": expected NAME:ARG:FLAG", spec);
    };

    if name.is_empty() {
        bail!("Invalid flag \"{}\": empty function name", spec);
    }
    let arg: usize = arg
        .parse()
        .with_context(|| format!("Invalid argument number in flag \"{}\"", spec))?;
    if arg == 0 {
        bail!("Argument numbers start at 1 in flag \"{}\"", spec);
    }

    let flag = match flag {
        "lua-format" => FlagSpec::Format(FormatFlag::Yes),
        "no-lua-format" => FlagSpec::Format(FormatFlag::No),
        "possible-lua-format" => FlagSpec::Format(FormatFlag::Possible),
        "pass-lua-format" => FlagSpec::Pass,
        other if other.ends_with("-format") => {
            tracing::debug!("ignoring flag for another language: {}", spec);
            return Ok(None);
        }
        _ => bail!("Unknown flag \"{}\" in \"{}\"", flag, spec),
    };

    Ok(Some((name.to_string(), arg, flag)))
}
