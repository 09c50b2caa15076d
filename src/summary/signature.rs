//! Parameter names recovered from signature text.
//!
//! Works on text such as `move(self, x: int = 0, *args)`. Brackets are
//! balanced over `()`, `[]` and `{}`; quoted literals are opaque, so a
//! default like `sep=")"` does not end the list. Anything malformed yields
//! an empty list.

/// Parameter names of a signature, in order.
///
/// Annotations and defaults are dropped, bare `*` and `/` markers are
/// skipped and `*args` / `**kwargs` keep their stars.
pub fn params_from_signature(signature: &str) -> Vec<String> {
    let Some(open) = signature.find('(') else {
        return Vec::new();
    };
    let Some(pieces) = split_params(&signature[open + 1..]) else {
        return Vec::new();
    };

    pieces
        .iter()
        .map(|piece| clean_param(piece))
        .filter(|p| !p.is_empty() && p != "*" && p != "/")
        .collect()
}

/// Split the text after `(` at top-level commas up to the matching `)`.
fn split_params(text: &str) -> Option<Vec<String>> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut stack: Vec<char> = Vec::new();
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                current.push(c);
                copy_string(c, &mut chars, &mut current)?;
            }
            '(' | '[' | '{' => {
                stack.push(c);
                current.push(c);
            }
            ')' if stack.is_empty() => {
                pieces.push(current);
                return Some(pieces);
            }
            ')' | ']' | '}' => {
                let open = stack.pop()?;
                if !matches!((open, c), ('(', ')') | ('[', ']') | ('{', '}')) {
                    return None;
                }
                current.push(c);
            }
            ',' if stack.is_empty() => pieces.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    // No closing parenthesis.
    None
}

/// Copy a quoted literal through its closing quote. `None` if unterminated.
fn copy_string(quote: char, chars: &mut std::str::Chars, out: &mut String) -> Option<()> {
    while let Some(c) = chars.next() {
        out.push(c);
        if c == '\\' {
            out.push(chars.next()?);
        } else if c == quote {
            return Some(());
        }
    }
    None
}

/// Cut a parameter at its annotation, then at its default.
fn clean_param(piece: &str) -> String {
    let name = cut_top_level(piece, ':');
    let name = cut_top_level(name, '=');
    name.trim().to_string()
}

fn cut_top_level(text: &str, stop: char) -> &str {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ if c == stop && depth == 0 => return &text[..i],
            _ => {}
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_signature() {
        assert_eq!(params_from_signature("move(self, x, y)"), vec!["self", "x", "y"]);
        assert!(params_from_signature("noop()").is_empty());
    }

    #[test]
    fn test_annotations_and_defaults() {
        assert_eq!(
            params_from_signature("f(self, a: Dict[str, int] = {}, b=(1, 2), c: str = 'x')"),
            vec!["self", "a", "b", "c"]
        );
    }

    #[test]
    fn test_variadics_and_markers() {
        assert_eq!(
            params_from_signature("f(a, /, b, *, c, *args, **kwargs)"),
            vec!["a", "b", "c", "*args", "**kwargs"]
        );
    }

    #[test]
    fn test_quoted_brackets_are_opaque() {
        assert_eq!(
            params_from_signature(r#"join(self, sep=")", end='[', esc="\")")"#),
            vec!["self", "sep", "end", "esc"]
        );
    }

    #[test]
    fn test_text_after_close_is_ignored() {
        assert_eq!(params_from_signature("f(a, b) -> Tuple[int, int]"), vec!["a", "b"]);
    }

    #[test]
    fn test_malformed_is_empty() {
        assert!(params_from_signature("f(a, b").is_empty());
        assert!(params_from_signature("f(a, [b)").is_empty());
        assert!(params_from_signature("f(a], b)").is_empty());
        assert!(params_from_signature("f(a='unterminated)").is_empty());
        assert!(params_from_signature("no parens").is_empty());
        assert!(params_from_signature("").is_empty());
    }
}
