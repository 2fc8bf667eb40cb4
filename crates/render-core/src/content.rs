//! Serialization of PDF objects and content-stream operators.
//!
//! Literal strings escape `(`, `)` and `\` with a backslash and write every
//! byte outside printable ASCII as a three-digit octal escape. Reals carry at
//! most four decimals and no trailing zeros.

use lopdf::content::Operation;
use lopdf::{Dictionary, Object, StringFormat};
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Encodes a sequence of operators, one per line.
pub fn encode_operations(operations: &[Operation]) -> Vec<u8> {
    let mut out = Vec::with_capacity(operations.len() * 16);
    for operation in operations {
        // Writing into a Vec cannot fail.
        let _ = write_operation(&mut out, operation);
    }
    out
}

pub fn write_operation(writer: &mut dyn Write, operation: &Operation) -> io::Result<()> {
    for operand in &operation.operands {
        write_object(writer, operand)?;
        writer.write_all(b" ")?;
    }
    writer.write_all(operation.operator.as_bytes())?;
    writer.write_all(b"\n")
}

pub fn format_real(value: f32) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let mut text = format!("{:.4}", value);
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

pub fn write_literal(writer: &mut dyn Write, bytes: &[u8]) -> io::Result<()> {
    writer.write_all(b"(")?;
    for &byte in bytes {
        match byte {
            b'(' | b')' | b'\\' => writer.write_all(&[b'\\', byte])?,
            0x20..=0x7e => writer.write_all(&[byte])?,
            _ => write!(writer, "\\{:03o}", byte)?,
        }
    }
    writer.write_all(b")")
}

pub fn write_object(writer: &mut dyn Write, object: &Object) -> io::Result<()> {
    match object {
        Object::Null => writer.write_all(b"null"),
        Object::Boolean(b) => writer.write_all(if *b { b"true" } else { b"false" }),
        Object::Integer(i) => write!(writer, "{}", i),
        Object::Real(r) => writer.write_all(format_real(*r).as_bytes()),
        Object::Name(n) => {
            writer.write_all(b"/")?;
            writer.write_all(n)
        }
        Object::String(s, StringFormat::Literal) => write_literal(writer, s),
        Object::String(s, StringFormat::Hexadecimal) => {
            writer.write_all(b"<")?;
            for byte in s {
                write!(writer, "{:02X}", byte)?;
            }
            writer.write_all(b">")
        }
        Object::Array(arr) => {
            writer.write_all(b"[")?;
            for (i, obj) in arr.iter().enumerate() {
                if i > 0 {
                    writer.write_all(b" ")?;
                }
                write_object(writer, obj)?;
            }
            writer.write_all(b"]")
        }
        Object::Dictionary(dict) => write_dictionary(writer, dict),
        Object::Stream(stream) => {
            let mut dict = stream.dict.clone();
            dict.set("Length", stream.content.len() as i64);
            write_dictionary(writer, &dict)?;
            writer.write_all(b"\nstream\n")?;
            writer.write_all(&stream.content)?;
            writer.write_all(b"\nendstream")
        }
        Object::Reference(id) => write!(writer, "{} {} R", id.0, id.1),
    }
}

pub fn write_dictionary(writer: &mut dyn Write, dict: &Dictionary) -> io::Result<()> {
    writer.write_all(b"<<")?;
    let sorted_keys: BTreeMap<_, _> = dict.iter().collect();
    for (key, value) in sorted_keys {
        writer.write_all(b"/")?;
        writer.write_all(key)?;
        writer.write_all(b" ")?;
        write_object(writer, value)?;
        writer.write_all(b" ")?;
    }
    writer.write_all(b">>")
}
