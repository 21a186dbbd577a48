//! Raw text of query results.
//!
//! Locates a node inside the payload bytes by its JSON Pointer, so `contains`
//! sees the payload's own text: number lexemes, member order and escapes as
//! they were sent.

/// Bytes of the value at `pointer` within `raw`.
///
/// `raw` is expected to be a well-formed JSON document; `None` is returned
/// when the pointer does not resolve.
pub(crate) fn locate<'a>(raw: &'a [u8], pointer: &str) -> Option<&'a [u8]> {
    let mut scanner = Scanner { bytes: raw, pos: 0 };

    if !pointer.is_empty() {
        for token in pointer.strip_prefix('/')?.split('/') {
            let token = token.replace("~1", "/").replace("~0", "~");
            scanner.skip_whitespace();
            match scanner.peek()? {
                b'{' => scanner.enter_member(&token)?,
                b'[' => scanner.enter_element(token.parse().ok()?)?,
                _ => return None,
            }
        }
    }

    scanner.skip_whitespace();
    let start = scanner.pos;
    scanner.skip_value()?;
    Some(&raw[start..scanner.pos])
}

struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Scanner<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Option<()> {
        self.skip_whitespace();
        if self.peek()? != byte {
            return None;
        }
        self.pos += 1;
        Some(())
    }

    /// Move to the value of the member named `name`. With duplicate names
    /// the last one wins, as it does for the parsed payload.
    fn enter_member(&mut self, name: &str) -> Option<()> {
        self.expect(b'{')?;
        let mut found = None;

        loop {
            self.skip_whitespace();
            match self.peek()? {
                b'}' => break,
                b',' => {
                    self.pos += 1;
                    continue;
                }
                _ => {}
            }

            let key_start = self.pos;
            self.skip_string()?;
            let key = &self.bytes[key_start..self.pos];
            self.expect(b':')?;
            self.skip_whitespace();
            if key_matches(key, name) {
                found = Some(self.pos);
            }
            self.skip_value()?;
        }

        self.pos = found?;
        Some(())
    }

    /// Move to the element at `index`.
    fn enter_element(&mut self, index: usize) -> Option<()> {
        self.expect(b'[')?;
        for _ in 0..index {
            self.skip_whitespace();
            self.skip_value()?;
            self.expect(b',')?;
        }
        self.skip_whitespace();
        match self.peek()? {
            b']' => None,
            _ => Some(()),
        }
    }

    fn skip_value(&mut self) -> Option<()> {
        match self.peek()? {
            b'"' => self.skip_string(),
            b'{' | b'[' => self.skip_container(),
            _ => {
                let start = self.pos;
                while matches!(
                    self.peek(),
                    Some(b) if !matches!(b, b',' | b']' | b'}' | b' ' | b'\t' | b'\n' | b'\r')
                ) {
                    self.pos += 1;
                }
                (self.pos > start).then_some(())
            }
        }
    }

    fn skip_string(&mut self) -> Option<()> {
        if self.peek()? != b'"' {
            return None;
        }
        self.pos += 1;
        loop {
            match self.peek()? {
                b'\\' => self.pos += 2,
                b'"' => {
                    self.pos += 1;
                    return Some(());
                }
                _ => self.pos += 1,
            }
        }
    }

    fn skip_container(&mut self) -> Option<()> {
        let mut depth = 0usize;
        loop {
            match self.peek()? {
                b'"' => {
                    self.skip_string()?;
                    continue;
                }
                b'{' | b'[' => depth += 1,
                b'}' | b']' => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        self.pos += 1;
                        return Some(());
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
    }
}

/// Compare a quoted member name from the payload with a decoded name.
fn key_matches(raw_key: &[u8], name: &str) -> bool {
    if raw_key.contains(&b'\\') {
        serde_json::from_slice::<String>(raw_key).is_ok_and(|key| key == name)
    } else {
        raw_key.len() >= 2 && &raw_key[1..raw_key.len() - 1] == name.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text<'a>(raw: &'a str, pointer: &str) -> Option<&'a str> {
        locate(raw.as_bytes(), pointer).map(|b| std::str::from_utf8(b).unwrap())
    }

    #[test]
    fn test_locate_keeps_source_text() {
        let raw = r#"{ "price": 1.50, "user": {"name":"bob", "age": 3}, "tags": ["a", "b\"c"] }"#;

        assert_eq!(text(raw, ""), Some(raw));
        assert_eq!(text(raw, "/price"), Some("1.50"));
        assert_eq!(text(raw, "/user"), Some(r#"{"name":"bob", "age": 3}"#));
        assert_eq!(text(raw, "/user/age"), Some("3"));
        assert_eq!(text(raw, "/tags/1"), Some(r#""b\"c""#));
        assert_eq!(text(raw, "/tags/2"), None);
        assert_eq!(text(raw, "/missing"), None);
    }

    #[test]
    fn test_locate_escaped_member_names() {
        let raw = r#"{"a/b": 1, "t~x": 2, "café": 3}"#;

        assert_eq!(text(raw, "/a~1b"), Some("1"));
        assert_eq!(text(raw, "/t~0x"), Some("2"));
        assert_eq!(text(raw, "/café"), Some("3"));
    }

    #[test]
    fn test_locate_duplicate_member_takes_last() {
        assert_eq!(text(r#"{"a": 1, "a": 2}"#, "/a"), Some("2"));
    }

    #[test]
    fn test_locate_skips_brackets_inside_strings() {
        let raw = r#"[{"s": "}]"}, {"s": "x"}]"#;
        assert_eq!(text(raw, "/1/s"), Some(r#""x""#));
    }
}
