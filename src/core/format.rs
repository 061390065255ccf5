//! Lua format strings, as understood by `string.format`.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::flags::FormatFlag;

// One directive at the start of the haystack: `%%`, or width,
// precision and a conversion. Lua takes no flag characters.
static DIRECTIVE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^%(?:%|[0-9]*(?:\.[0-9]*)?[cdiouxXaAeEfgGqs])").unwrap()
});

/// Count the directives in `text`, or describe the first invalid one.
/// `%%` is an escape, not a directive.
pub fn count_directives(text: &str) -> Result<usize, String> {
    let mut count = 0;
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('%') {
        let start = pos + offset;
        let Some(m) = DIRECTIVE_REGEX.find(&text[start..]) else {
            return Err(format!(
                "invalid format directive at position {}",
                text[..start].chars().count() + 1
            ));
        };
        if m.as_str() != "%%" {
            count += 1;
        }
        pos = start + m.end();
    }

    Ok(count)
}

/// Settle an undecided flag by looking at the text itself.
pub fn guess_format_flag(flag: FormatFlag, text: &str) -> FormatFlag {
    if flag != FormatFlag::Undecided {
        return flag;
    }
    match count_directives(text) {
        Ok(n) if n > 0 => FormatFlag::Possible,
        Ok(_) => FormatFlag::Undecided,
        Err(_) => FormatFlag::Impossible,
    }
}
