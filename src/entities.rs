use crate::config::MAX_ENTITY_LEN;

/// The fixed entity table. Anything outside it is emitted literally.
fn entity_char(name: &str) -> Option<char> {
    Some(match name {
        "&nbsp;" => ' ',
        "&lt;" => '<',
        "&gt;" => '>',
        "&amp;" => '&',
        "&quot;" => '"',
        "&apos;" => '\'',
        "&cent;" => '¢',
        "&pound;" => '£',
        "&yen;" => '¥',
        "&euro;" => '€',
        "&copy;" => '©',
        "&reg;" => '®',
        _ => return None,
    })
}

#[derive(Clone, Copy, PartialEq)]
enum Mode {
    Text,
    /// Accumulating an `&...;` entity spelling.
    Entity,
    /// Accumulating a run of `'` characters.
    Emphasis,
}

/// Decodes HTML entities against the fixed table and deletes `''`/`'''`-style
/// emphasis runs, in a single left-to-right scan.
///
/// A lone apostrophe is kept; runs of two or more quotes are wiki bold/italic
/// markers and collapse to nothing. Output never exceeds the input in length.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut buf = String::new();
    let mut quotes = 0usize;
    let mut mode = Mode::Text;

    for c in text.chars() {
        match mode {
            Mode::Text => dispatch(c, &mut out, &mut buf, &mut quotes, &mut mode),
            Mode::Entity => {
                if c == '&' {
                    // A new '&' flushes the stale buffer and restarts
                    out.push_str(&buf);
                    buf.clear();
                    buf.push('&');
                } else {
                    buf.push(c);
                    if c == ';' {
                        match entity_char(&buf) {
                            Some(decoded) => out.push(decoded),
                            None => out.push_str(&buf),
                        }
                        mode = Mode::Text;
                    } else if buf.chars().count() >= MAX_ENTITY_LEN {
                        // Longer than any real entity spelling
                        out.push_str(&buf);
                        mode = Mode::Text;
                    }
                }
            }
            Mode::Emphasis => {
                if c == '\'' {
                    quotes += 1;
                } else {
                    if quotes == 1 {
                        out.push('\'');
                    }
                    mode = Mode::Text;
                    dispatch(c, &mut out, &mut buf, &mut quotes, &mut mode);
                }
            }
        }
    }

    // Flush whatever the scan ended inside of
    match mode {
        Mode::Entity => out.push_str(&buf),
        Mode::Emphasis if quotes == 1 => out.push('\''),
        _ => {}
    }

    out
}

fn dispatch(c: char, out: &mut String, buf: &mut String, quotes: &mut usize, mode: &mut Mode) {
    match c {
        '&' => {
            buf.clear();
            buf.push('&');
            *mode = Mode::Entity;
        }
        '\'' => {
            *quotes = 1;
            *mode = Mode::Emphasis;
        }
        _ => out.push(c),
    }
}
