//! Stable textual representation of call arguments.
//!
//! The Inputs log stores each call's positional arguments as one tuple
//! literal, e.g. `('foo',)` or `('a', 1)`. Replay prints it back verbatim as
//! `name(*('foo',)) -> ...`, so the format must not change between releases.

use std::fmt::Write;

use crate::value::Value;

/// Representation of a single argument.
pub trait Repr {
    fn repr(&self) -> String;
}

/// Representation of a whole positional argument list.
pub trait ArgsRepr {
    fn args_repr(&self) -> String;
}

fn quote_text(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn quote_bytes(bytes: &[u8]) -> String {
    let quote = if bytes.contains(&b'\'') && !bytes.contains(&b'"') {
        b'"'
    } else {
        b'\''
    };

    let mut out = String::with_capacity(bytes.len() + 3);
    out.push('b');
    out.push(quote as char);
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b if b == quote => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7e => out.push(b as char),
            b => {
                let _ = write!(out, "\\x{:02x}", b);
            }
        }
    }
    out.push(quote as char);
    out
}

impl Repr for str {
    fn repr(&self) -> String {
        quote_text(self)
    }
}

impl Repr for String {
    fn repr(&self) -> String {
        quote_text(self)
    }
}

impl Repr for [u8] {
    fn repr(&self) -> String {
        quote_bytes(self)
    }
}

impl Repr for Vec<u8> {
    fn repr(&self) -> String {
        quote_bytes(self)
    }
}

impl Repr for i64 {
    fn repr(&self) -> String {
        self.to_string()
    }
}

impl Repr for f64 {
    fn repr(&self) -> String {
        if self.is_nan() {
            "nan".to_string()
        } else if self.is_infinite() {
            let sign = if *self > 0.0 { "" } else { "-" };
            format!("{}inf", sign)
        } else {
            float_repr(*self)
        }
    }
}

/// Shortest round-trip digits, switching to exponent form outside
/// `1e-4 <= |f| < 1e16` with a signed, two-digit exponent (`1e+16`, `1e-05`).
fn float_repr(f: f64) -> String {
    let sci = format!("{:e}", f);
    let exponent = sci
        .split_once('e')
        .and_then(|(mantissa, exp)| Some((mantissa, exp.parse::<i32>().ok()?)));

    match exponent {
        Some((mantissa, exp)) if f != 0.0 && !(-4..16).contains(&exp) => {
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        _ => {
            let fixed = f.to_string();
            if fixed.contains('.') {
                fixed
            } else {
                format!("{}.0", fixed)
            }
        }
    }
}

impl Repr for bool {
    fn repr(&self) -> String {
        let text = if *self { "True" } else { "False" };
        text.to_string()
    }
}

impl<T: Repr> Repr for Option<T> {
    fn repr(&self) -> String {
        match self {
            Some(inner) => inner.repr(),
            None => "None".to_string(),
        }
    }
}

impl Repr for Value {
    fn repr(&self) -> String {
        match self {
            Value::Text(text) => text.repr(),
            Value::Bytes(bytes) => bytes.repr(),
            Value::Int(n) => n.repr(),
            Value::Float(f) => f.repr(),
        }
    }
}

impl<T: Repr + ?Sized> Repr for &T {
    fn repr(&self) -> String {
        (**self).repr()
    }
}

impl ArgsRepr for () {
    fn args_repr(&self) -> String {
        "()".to_string()
    }
}

impl<A: Repr> ArgsRepr for (A,) {
    fn args_repr(&self) -> String {
        format!("({},)", self.0.repr())
    }
}

macro_rules! tuple_args_repr {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Repr),+> ArgsRepr for ($($name,)+) {
            fn args_repr(&self) -> String {
                let parts: Vec<String> = vec![$(self.$idx.repr()),+];
                format!("({})", parts.join(", "))
            }
        }
    };
}

tuple_args_repr!(A: 0, B: 1);
tuple_args_repr!(A: 0, B: 1, C: 2);
tuple_args_repr!(A: 0, B: 1, C: 2, D: 3);
