use crate::DecodeError;
use record::{Object, Tag, Value};

// Wire tag bytes match the Tag discriminants; Unknown (0) is reserved and
// never written.
const NULL: u8 = Tag::Null as u8;
const BOOL: u8 = Tag::Bool as u8;
const SIGNED: u8 = Tag::Signed as u8;
const UNSIGNED: u8 = Tag::Unsigned as u8;
const FLOAT: u8 = Tag::Float as u8;
const DOUBLE: u8 = Tag::Double as u8;
const STRING: u8 = Tag::String as u8;
const ARRAY: u8 = Tag::Array as u8;
const OBJECT: u8 = Tag::Object as u8;

// Decoding recursion is bounded by strictly-decreasing child offsets, but a
// crafted chain of one-element arrays could still be as deep as the buffer
// is long. Cap it like a flatbuffer verifier would.
const MAX_DEPTH: usize = 64;

/// Encode a Value into a self-contained buffer.
///
/// Nodes are written bottom-up: children strictly precede their parent, and
/// the final four bytes are the little-endian offset of the root node.
pub fn encode(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    let root = encode_node(value, &mut buf);
    buf.extend_from_slice(&root.to_le_bytes());
    buf
}

/// Decode a buffer produced by [`encode`], verifying offsets, lengths,
/// string encodings and tags along the walk.
pub fn decode(buf: &[u8]) -> Result<Value, DecodeError> {
    if buf.len() < 4 {
        return Err(DecodeError::Truncated);
    }
    let nodes = &buf[..buf.len() - 4];
    let root = read_u32(buf, buf.len() - 4)?;
    if root as usize >= nodes.len() {
        return Err(DecodeError::BadOffset(root));
    }
    decode_node(nodes, root, 0)
}

fn encode_node(value: &Value, buf: &mut Vec<u8>) -> u32 {
    match value {
        Value::Null => {
            let at = buf.len() as u32;
            buf.push(NULL);
            at
        }
        Value::Bool(b) => {
            let at = buf.len() as u32;
            buf.push(BOOL);
            buf.push(*b as u8);
            at
        }
        Value::Signed(n) => {
            let at = buf.len() as u32;
            buf.push(SIGNED);
            buf.extend_from_slice(&n.to_le_bytes());
            at
        }
        Value::Unsigned(n) => {
            let at = buf.len() as u32;
            buf.push(UNSIGNED);
            buf.extend_from_slice(&n.to_le_bytes());
            at
        }
        Value::Float(n) => {
            let at = buf.len() as u32;
            buf.push(FLOAT);
            buf.extend_from_slice(&n.to_bits().to_le_bytes());
            at
        }
        Value::Double(n) => {
            let at = buf.len() as u32;
            buf.push(DOUBLE);
            buf.extend_from_slice(&n.to_bits().to_le_bytes());
            at
        }
        Value::String(s) => {
            let at = buf.len() as u32;
            buf.push(STRING);
            put_bytes(buf, s.as_bytes());
            at
        }
        Value::Array(items) => {
            let offsets: Vec<u32> = items.iter().map(|child| encode_node(child, buf)).collect();
            let at = buf.len() as u32;
            buf.push(ARRAY);
            put_u32(buf, offsets.len() as u32);
            for offset in offsets {
                put_u32(buf, offset);
            }
            at
        }
        Value::Object(obj) => {
            let offsets: Vec<u32> = obj
                .iter()
                .map(|field| encode_node(&field.value, buf))
                .collect();
            let at = buf.len() as u32;
            buf.push(OBJECT);
            put_bytes(buf, obj.name().as_bytes());
            put_u32(buf, obj.len() as u32);
            for (field, offset) in obj.iter().zip(offsets) {
                put_bytes(buf, field.key.as_bytes());
                put_u32(buf, offset);
            }
            at
        }
    }
}

fn decode_node(nodes: &[u8], off: u32, depth: usize) -> Result<Value, DecodeError> {
    if depth >= MAX_DEPTH {
        return Err(DecodeError::TooDeep);
    }
    let at = off as usize;
    let tag = *nodes.get(at).ok_or(DecodeError::BadOffset(off))?;
    let mut cur = at + 1;
    match tag {
        NULL => Ok(Value::Null),
        BOOL => {
            let b = *nodes.get(cur).ok_or(DecodeError::Truncated)?;
            Ok(Value::Bool(b != 0))
        }
        SIGNED => Ok(Value::Signed(i64::from_le_bytes(read_array(nodes, cur)?))),
        UNSIGNED => Ok(Value::Unsigned(u64::from_le_bytes(read_array(nodes, cur)?))),
        FLOAT => Ok(Value::Float(f32::from_bits(u32::from_le_bytes(
            read_array(nodes, cur)?,
        )))),
        DOUBLE => Ok(Value::Double(f64::from_bits(u64::from_le_bytes(
            read_array(nodes, cur)?,
        )))),
        STRING => Ok(Value::String(read_str(nodes, &mut cur)?.to_string())),
        ARRAY => {
            let count = read_u32(nodes, cur)? as usize;
            cur += 4;
            let mut items = Vec::with_capacity(reserve(nodes, cur, count));
            for _ in 0..count {
                let child = read_u32(nodes, cur)?;
                cur += 4;
                if child >= off {
                    return Err(DecodeError::BadOffset(child));
                }
                items.push(decode_node(nodes, child, depth + 1)?);
            }
            Ok(Value::Array(items))
        }
        OBJECT => {
            let name = read_str(nodes, &mut cur)?;
            let mut obj = Object::new(name);
            let count = read_u32(nodes, cur)? as usize;
            cur += 4;
            for _ in 0..count {
                let key = read_str(nodes, &mut cur)?.to_string();
                let child = read_u32(nodes, cur)?;
                cur += 4;
                if child >= off {
                    return Err(DecodeError::BadOffset(child));
                }
                obj.insert(key, decode_node(nodes, child, depth + 1)?);
            }
            Ok(Value::Object(obj))
        }
        other => Err(DecodeError::BadTag(other)),
    }
}

// Cap an attacker-controlled element count by what the remaining buffer
// could possibly hold, so with_capacity stays honest.
fn reserve(nodes: &[u8], cur: usize, count: usize) -> usize {
    count.min(nodes.len().saturating_sub(cur) / 4)
}

pub(crate) fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub(crate) fn put_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    put_u32(out, bytes.len() as u32);
    out.extend_from_slice(bytes);
}

pub(crate) fn read_u32(buf: &[u8], at: usize) -> Result<u32, DecodeError> {
    Ok(u32::from_le_bytes(read_array(buf, at)?))
}

fn read_array<const N: usize>(buf: &[u8], at: usize) -> Result<[u8; N], DecodeError> {
    let end = at.checked_add(N).ok_or(DecodeError::Truncated)?;
    buf.get(at..end)
        .ok_or(DecodeError::Truncated)?
        .try_into()
        .map_err(|_| DecodeError::Truncated)
}

pub(crate) fn read_bytes<'b>(buf: &'b [u8], at: &mut usize) -> Result<&'b [u8], DecodeError> {
    let len = read_u32(buf, *at)? as usize;
    let start = *at + 4;
    let end = start.checked_add(len).ok_or(DecodeError::Truncated)?;
    let bytes = buf.get(start..end).ok_or(DecodeError::Truncated)?;
    *at = end;
    Ok(bytes)
}

pub(crate) fn read_str<'b>(buf: &'b [u8], at: &mut usize) -> Result<&'b str, DecodeError> {
    std::str::from_utf8(read_bytes(buf, at)?).map_err(|_| DecodeError::BadUtf8)
}
