//! Lua text writer
//!
//! Output mirrors the layout the simulation itself writes: one entry per
//! line, explicit `[key]` brackets, and an `-- end of` marker after every
//! nested table. Keys are emitted in table order, so output is deterministic.

use crate::value::{Key, Table, Value};
use std::fmt::Write;

const INDENT: &str = "    ";

/// Serialize `table` as the assignment `name = { ... }`
pub fn to_lua(name: &str, table: &Table) -> String {
    let mut out = String::new();
    let _ = write!(out, "{} = \n", name);
    write_table(&mut out, table, 0);
    let _ = write!(out, " -- end of {}\n", name);
    out
}

fn write_table(out: &mut String, table: &Table, depth: usize) {
    let pad = INDENT.repeat(depth);
    let inner = INDENT.repeat(depth + 1);

    out.push_str(&pad);
    out.push_str("{\n");
    for (key, value) in table.iter() {
        let key_text = key_literal(key);
        out.push_str(&inner);
        out.push_str(&key_text);
        out.push_str(" = ");
        match value {
            Value::Table(t) => {
                out.push('\n');
                write_table(out, t, depth + 1);
                let _ = write!(out, ", -- end of {}\n", key_text);
            }
            scalar => {
                write_scalar(out, scalar);
                out.push_str(",\n");
            }
        }
    }
    out.push_str(&pad);
    out.push('}');
}

fn key_literal(key: &Key) -> String {
    match key {
        Key::Int(i) => format!("[{}]", i),
        Key::Str(s) => format!("[{}]", quote(s)),
    }
}

fn write_scalar(out: &mut String, value: &Value) {
    match value {
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Int(i) => {
            let _ = write!(out, "{}", i);
        }
        Value::Float(f) => out.push_str(&float_literal(*f)),
        Value::Str(s) => out.push_str(&quote(s)),
        Value::Table(_) => unreachable!("tables are written by write_table"),
    }
}

fn float_literal(f: f64) -> String {
    if f.is_nan() {
        tracing::warn!("NaN written as 0/0");
        "0/0".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "math.huge" } else { "-math.huge" }.to_string()
    } else {
        // Debug keeps a decimal point on integral values and is round-trip exact
        format!("{:?}", f)
    }
}

/// Quote a string as a Lua double-quoted literal
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                let _ = write!(out, "\\{:03}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
