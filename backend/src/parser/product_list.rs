//! Parser for the serialized product list stored in the `product` column.
//!
//! Accepted forms:
//!
//! ```text
//! ['Milk', 'Soap']        single-quoted items
//! ["Milk", "Bread"]       double-quoted items
//! [Milk, Soap]            bare items (trimmed)
//! []                      empty list
//! ```
//!
//! Backslash escapes are honoured inside quotes. A single trailing comma is allowed.

/// Parse a product list literal into an ordered list of product names.
///
/// Returns the reason on failure; the caller attaches row context.
pub fn parse_product_list(input: &str) -> Result<Vec<String>, String> {
    let trimmed = input.trim();
    let inner = trimmed
        .strip_prefix('[')
        .ok_or_else(|| "expected '[' at start of list".to_string())?
        .strip_suffix(']')
        .ok_or_else(|| "expected ']' at end of list".to_string())?;

    let mut scanner = Scanner { chars: inner.chars().collect(), pos: 0 };
    let mut items = Vec::new();

    scanner.skip_whitespace();
    if scanner.at_end() {
        return Ok(items);
    }

    loop {
        scanner.skip_whitespace();
        let item = match scanner.peek() {
            Some(q @ ('\'' | '"')) => {
                scanner.pos += 1;
                scanner.quoted(q)?
            }
            Some(',') => return Err(format!("empty item at position {}", scanner.pos)),
            Some(_) => scanner.bare()?,
            None => return Err("dangling separator".to_string()),
        };
        items.push(item);

        scanner.skip_whitespace();
        match scanner.peek() {
            None => break,
            Some(',') => {
                scanner.pos += 1;
                scanner.skip_whitespace();
                // trailing comma
                if scanner.at_end() {
                    break;
                }
            }
            Some(c) => {
                return Err(format!("unexpected '{}' after item at position {}", c, scanner.pos));
            }
        }
    }

    Ok(items)
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
}

impl Scanner {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// Reads up to the closing quote; the opening quote is already consumed.
    fn quoted(&mut self, quote: char) -> Result<String, String> {
        let start = self.pos;
        let mut out = String::new();
        while let Some(c) = self.peek() {
            self.pos += 1;
            match c {
                '\\' => match self.peek() {
                    Some(escaped) => {
                        self.pos += 1;
                        out.push(match escaped {
                            'n' => '\n',
                            't' => '\t',
                            other => other,
                        });
                    }
                    None => break,
                },
                c if c == quote => return Ok(out),
                c => out.push(c),
            }
        }
        Err(format!("unterminated quote starting at position {}", start - 1))
    }

    fn bare(&mut self) -> Result<String, String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == ',' {
                break;
            }
            if matches!(c, '\'' | '"' | '[' | ']') {
                return Err(format!("unexpected '{}' in unquoted item at position {}", c, self.pos));
            }
            self.pos += 1;
        }
        let item: String = self.chars[start..self.pos].iter().collect();
        Ok(item.trim().to_string())
    }
}
