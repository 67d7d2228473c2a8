//! Operations over response tensors.

use serde_json::Value;
use super::{TensorProto, TensorValues};

/// Index of the largest score.
///
/// Ties resolve to the first maximum, matching how classifier outputs are
/// usually read. NaN scores never win.
///
/// # Returns
///
/// `None` if `scores` is empty or holds only NaN.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if score <= current => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Decodes a JSON list (possibly nested, as batched outputs are) into a
/// flat tensor of floats or strings.
///
/// The shape records the list dimensions; ragged nesting and lists mixing
/// numbers with strings are rejected.
pub fn tensor_from_json(value: &Value) -> Result<TensorProto, String> {
    let mut shape = Vec::new();
    let mut cursor = value;
    while let Value::Array(items) = cursor {
        shape.push(items.len());
        match items.first() {
            Some(first) => cursor = first,
            None => break,
        }
    }

    let mut leaves = Vec::new();
    collect_leaves(value, 0, &shape, &mut leaves)?;
    if shape.is_empty() {
        shape.push(1);
    }

    let values = if leaves.iter().all(|v| v.is_number()) {
        TensorValues::Float(leaves.iter().filter_map(|v| v.as_f64()).map(|v| v as f32).collect())
    } else if leaves.iter().all(|v| v.is_string()) {
        TensorValues::String(leaves.iter().filter_map(|v| v.as_str()).map(str::to_string).collect())
    } else {
        return Err("list mixes numbers and strings".to_string());
    };
    Ok(TensorProto::from_parts(shape, values))
}

fn collect_leaves<'a>(value: &'a Value, depth: usize, shape: &[usize], out: &mut Vec<&'a Value>) -> Result<(), String> {
    match value {
        Value::Array(items) => {
            if shape.get(depth) != Some(&items.len()) {
                return Err(format!("ragged output list at depth {}", depth));
            }
            for item in items {
                collect_leaves(item, depth + 1, shape, out)?;
            }
            Ok(())
        }
        Value::Number(_) | Value::String(_) => {
            if depth != shape.len() {
                return Err(format!("unexpected scalar at depth {}", depth));
            }
            out.push(value);
            Ok(())
        }
        other => Err(format!("expected a number or string, found {}", other)),
    }
}
