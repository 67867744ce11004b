//! Single-quoted shell embedding
//!
//! A value is wrapped in single quotes and every embedded single quote
//! becomes `'\''` (close quote, escaped quote, reopen quote). Scripts that
//! consume the document rely on this exact form.

/// Quote `value` for a POSIX shell
#[must_use]
#[inline]
pub fn shell_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            escaped.push_str(r"'\''");
        } else {
            escaped.push(ch);
        }
    }
    escaped.push('\'');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_values_are_still_quoted() {
        assert_eq!(shell_escape("admin"), "'admin'");
        assert_eq!(shell_escape(""), "''");
    }

    #[test]
    fn embedded_quotes() {
        assert_eq!(
            shell_escape("%username'\"t:%!"),
            r#"'%username'\''"t:%!'"#
        );
    }

    #[test]
    fn shell_metacharacters_stay_literal() {
        assert_eq!(shell_escape("$HOME `id` \\"), r"'$HOME `id` \'");
    }
}
