//! JSON I/O handling for CLI
//!
//! - Input: one JSON document via stdin, may span several lines
//! - Output: one JSON object per line via stdout
//! - UTF-8 only

use std::io::{Read, Write};

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Read one JSON document from `input`
pub fn read_document<R: Read>(mut input: R) -> CliResult<Value> {
    let mut text = String::new();
    input.read_to_string(&mut text)?;

    if text.trim().is_empty() {
        return Err(CliError::InvalidInput("empty input".into()));
    }

    let value: Value = serde_json::from_str(&text)?;
    if !value.is_object() {
        return Err(CliError::InvalidInput("expected a JSON object".into()));
    }
    Ok(value)
}

/// Write a success response
pub fn write_response<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    write_line(out, &json!({ "status": "ok", "data": data }))
}

/// Write an error response
pub fn write_error<W: Write>(out: &mut W, code: &str, message: &str) -> CliResult<()> {
    write_line(
        out,
        &json!({ "status": "error", "code": code, "message": message }),
    )
}

/// Write an indented JSON document
pub fn write_pretty<W: Write>(out: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn write_line<W: Write>(out: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
