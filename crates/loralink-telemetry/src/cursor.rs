//! Left-to-right scanning cursor over a payload string.
//!
//! The cursor only moves forward. Each primitive either consumes input and
//! returns `Some`, or leaves the cursor untouched and returns `None`.

/// Forward-only view into the unconsumed part of a string.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    /// Create a cursor at the start of `input`.
    pub fn new(input: &'a str) -> Self {
        Cursor { rest: input }
    }

    /// The unconsumed input.
    pub fn rest(&self) -> &'a str {
        self.rest
    }

    /// Whether all input has been consumed.
    pub fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }

    /// Find the next occurrence of `literal` and move past it.
    pub fn skip_past(&mut self, literal: &str) -> Option<()> {
        let start = self.rest.find(literal)?;
        self.rest = &self.rest[start + literal.len()..];
        Some(())
    }

    /// Read everything up to (not including) the next `delimiter`.
    ///
    /// The delimiter itself stays in the input.
    pub fn take_until(&mut self, delimiter: char) -> Option<&'a str> {
        let end = self.rest.find(delimiter)?;
        let (value, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_and_take() {
        let mut cursor = Cursor::new(r#"{"id":"X1","fw":"2.0"}"#);
        cursor.skip_past("id\":\"").unwrap();
        assert_eq!(cursor.take_until('"'), Some("X1"));
        assert_eq!(cursor.rest(), r#"","fw":"2.0"}"#);
    }

    #[test]
    fn test_missing_literal_leaves_cursor() {
        let mut cursor = Cursor::new("abc,def");
        assert!(cursor.skip_past("xyz").is_none());
        assert_eq!(cursor.rest(), "abc,def");
    }

    #[test]
    fn test_missing_delimiter_leaves_cursor() {
        let mut cursor = Cursor::new("abc");
        assert!(cursor.take_until('}').is_none());
        assert_eq!(cursor.rest(), "abc");
    }

    #[test]
    fn test_empty_value() {
        let mut cursor = Cursor::new(",,");
        cursor.skip_past(",").unwrap();
        assert_eq!(cursor.take_until(','), Some(""));
        assert!(!cursor.is_empty());
    }

    #[test]
    fn test_multibyte_text() {
        let mut cursor = Cursor::new("topic\":\"อุณหภูมิ\",");
        cursor.skip_past("topic\":\"").unwrap();
        assert_eq!(cursor.take_until('"'), Some("อุณหภูมิ"));
    }
}
