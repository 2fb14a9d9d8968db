//! Dotted field names addressing a nested `serde_json::Value`.
//!
//! `cousine.0.name` reads as: key `cousine`, index `0`, key `name`. A segment
//! is an index when it is made of ASCII digits only (`"00"` is index 0);
//! anything else is a mapping key. No other syntax checking is done: an odd
//! name reads back as absent and may create odd structure on write.

use serde_json::{Map, Value};
use smallvec::SmallVec;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

impl<'a> Segment<'a> {
    pub fn parse(raw: &'a str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            // Too large for usize falls back to a key.
            if let Ok(i) = raw.parse::<usize>() {
                return Segment::Index(i);
            }
        }
        Segment::Key(raw)
    }

    pub fn is_index(&self) -> bool {
        matches!(self, Segment::Index(_))
    }

    /// The segment as a mapping key. Indexes into a mapping use their
    /// decimal form, so `"00"` and `"0"` address the same key.
    fn as_key(&self) -> String {
        match self {
            Segment::Key(k) => (*k).to_string(),
            Segment::Index(i) => i.to_string(),
        }
    }
}

pub type Segments<'a> = SmallVec<[Segment<'a>; 4]>;

pub fn segments(name: &str) -> Segments<'_> {
    name.split('.').map(Segment::parse).collect()
}

/// JS-style falsiness: `null`, `false`, `0`, and `""`.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn child<'v>(container: &'v Value, seg: &Segment<'_>) -> Option<&'v Value> {
    match (container, seg) {
        (Value::Object(map), seg) => map.get(&seg.as_key()),
        (Value::Array(items), Segment::Index(i)) => items.get(*i),
        _ => None,
    }
}

/// Reads the value at `name`. A missing intermediate or a `null` leaf both
/// read as `None`.
pub fn get<'v>(root: &'v Value, name: &str) -> Option<&'v Value> {
    let mut cur = root;
    for seg in segments(name) {
        cur = child(cur, &seg)?;
    }
    (!cur.is_null()).then_some(cur)
}

fn empty_container(next: &Segment<'_>) -> Value {
    if next.is_index() {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

/// Slot for `seg` inside `container`, creating it (as `null`) if missing.
/// Returns `None` when the container cannot hold that segment.
fn slot<'v>(container: &'v mut Value, seg: &Segment<'_>) -> Option<&'v mut Value> {
    match (container, seg) {
        (Value::Object(map), seg) => Some(map.entry(seg.as_key()).or_insert(Value::Null)),
        (Value::Array(items), Segment::Index(i)) => {
            if items.len() <= *i {
                items.resize(*i + 1, Value::Null);
            }
            items.get_mut(*i)
        }
        _ => None,
    }
}

/// Writes `value` at `name`, creating intermediate containers.
///
/// An intermediate is created when the entry is missing or falsy: a sequence
/// if the following segment is an index, a mapping otherwise. A write that
/// would have to pass through a non-container value is dropped.
pub fn set(root: &mut Value, name: &str, value: Value) {
    let segs = segments(name);
    let Some((last, parents)) = segs.split_last() else {
        return;
    };

    let mut cur = root;
    for (pos, seg) in parents.iter().enumerate() {
        let next = parents.get(pos + 1).unwrap_or(last);
        let Some(entry) = slot(cur, seg) else {
            log::debug!("path `{name}`: segment {seg:?} does not fit its container; write dropped");
            return;
        };
        if is_falsy(entry) {
            *entry = empty_container(next);
        }
        cur = entry;
    }

    match slot(cur, last) {
        Some(entry) => *entry = value,
        None => {
            log::debug!("path `{name}`: cannot write {last:?} into a non-container; write dropped")
        }
    }
}
