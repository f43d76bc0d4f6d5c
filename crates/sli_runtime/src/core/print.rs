//! Textual renderings of datums.
//!
//! `print` is the plain form used in tables and messages, `pprint` the form
//! that could be read back (strings in parentheses, dictionaries expanded).
//! `list` renders procedures as an indented block with the current position
//! marked by `-->`.

use std::fmt;

use super::token::Token;
use super::value::{Datum, DictHandle, Procedure, Value};
use crate::util::Appendable;

const MARKER: &str = "-->";
const BLANK: &str = "   ";

impl Value {
    pub fn print(&self, out: &mut String) {
        self.render(out, false);
    }

    pub fn pprint(&self, out: &mut String) {
        self.render(out, true);
    }

    pub fn to_pretty_string(&self) -> String {
        let mut s = String::new();
        self.pprint(&mut s);
        s
    }

    fn render(&self, out: &mut String, pretty: bool) {
        match self {
            Value::Integer(i) => out.append_i64(*i),
            Value::Double(f) => out.append_f64(*f),
            Value::Bool(b) => out.append_bool(*b),
            Value::String(s) if pretty => {
                out.push('(');
                out.push_str(s);
                out.push(')');
            }
            Value::String(s) => out.push_str(s),
            Value::Name(n) => out.push_str(n.as_str()),
            Value::Literal(n) => {
                out.push('/');
                out.push_str(n.as_str());
            }
            Value::Procedure(p) | Value::LitProcedure(p) => {
                out.push('{');
                render_tokens(p.tokens(), out);
                out.push('}');
            }
            Value::Array(items) => {
                out.push('[');
                render_tokens(items, out);
                out.push(']');
            }
            Value::Dictionary(DictHandle::Owned(d)) if pretty => match d.try_borrow() {
                Ok(d) => out.push_str(&d.to_string()),
                Err(_) => out.push_str("<<...>>"),
            },
            Value::Dictionary(_) => out.push_str("<dictionarytype>"),
            Value::Function(f) => {
                out.push('-');
                out.push_str(f.name().as_str());
                out.push('-');
            }
            Value::Trie(t) => {
                out.push('+');
                out.push_str(t.name().as_str());
                out.push('+');
            }
            Value::Primitive(p) => out.push_str(p.name()),
            Value::Callback(t) => {
                out.push_str("<callback ");
                match t.value() {
                    Some(v) => v.render(out, pretty),
                    None => out.push_str("void"),
                }
                out.push('>');
            }
            Value::Mark => out.push_str("<mark>"),
        }
    }
}

fn render_tokens(tokens: &[Token], out: &mut String) {
    for (i, t) in tokens.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        match t.value() {
            Some(v) => v.pprint(out),
            None => out.push_str("<void>"),
        }
    }
}

impl Procedure {
    /// Indented listing with element `cursor` marked; a negative cursor marks nothing.
    pub fn list(&self, out: &mut String, prefix: &str, cursor: isize) {
        self.list_block(out, prefix, cursor, BLANK);
    }

    fn list_block(&self, out: &mut String, prefix: &str, cursor: isize, header: &str) {
        out.push_str(header);
        out.push_str(prefix);
        out.push_str("{\n");
        let inner = format!("{prefix}{BLANK}");
        for (i, t) in self.iter().enumerate() {
            let marker = if i as isize == cursor { MARKER } else { BLANK };
            match t.value() {
                Some(Value::Procedure(p)) | Some(Value::LitProcedure(p)) => {
                    p.list_block(out, &inner, -1, marker)
                }
                Some(v) => {
                    out.push_str(marker);
                    out.push_str(&inner);
                    v.pprint(out);
                }
                None => {
                    out.push_str(marker);
                    out.push_str(&inner);
                    out.push_str("<void>");
                }
            }
            out.push('\n');
        }
        out.push_str(BLANK);
        out.push_str(prefix);
        out.push('}');
    }
}

impl Datum {
    pub fn print(&self, out: &mut String) {
        self.value().print(out);
    }

    pub fn pprint(&self, out: &mut String) {
        self.value().pprint(out);
    }

    /// For procedures `l` is the element to mark, for anything else `l == 0`
    /// marks the datum itself.
    pub fn list(&self, out: &mut String, prefix: &str, l: isize) {
        match self.value() {
            Value::Procedure(p) | Value::LitProcedure(p) => p.list(out, prefix, l),
            v => {
                out.push_str(if l == 0 { MARKER } else { BLANK });
                out.push_str(prefix);
                v.print(out);
            }
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::new();
        self.print(&mut s);
        f.write_str(&s)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.datum() {
            Some(d) => d.fmt(f),
            None => f.write_str("<void>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_and_pprint_differ_for_strings() {
        let t = Token::string("abc");
        let mut plain = String::new();
        let mut pretty = String::new();
        t.datum().unwrap().print(&mut plain);
        t.datum().unwrap().pprint(&mut pretty);
        assert_eq!(plain, "abc");
        assert_eq!(pretty, "(abc)");
    }

    #[test]
    fn procedures_render_their_elements() {
        let p = Token::procedure(vec![
            Token::int(1),
            Token::double(2.5),
            Token::literal("x"),
            Token::name("add"),
        ]);
        assert_eq!(p.to_string(), "{1 2.5 /x add}");
    }

    #[test]
    fn list_marks_the_cursor() {
        let p = Procedure::new(vec![Token::int(1), Token::int(2), Token::name("add")]);
        let mut out = String::new();
        p.list(&mut out, "", 1);
        assert_eq!(out, "   {\n      1\n-->   2\n      add\n   }");
    }

    #[test]
    fn nested_procedures_are_indented() {
        let p = Procedure::new(vec![
            Token::procedure(vec![Token::name("dup")]),
            Token::name("exec"),
        ]);
        let mut out = String::new();
        p.list(&mut out, "", 0);
        assert_eq!(out, "   {\n-->   {\n         dup\n      }\n      exec\n   }");
    }
}
