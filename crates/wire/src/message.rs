use crate::codec::{put_bytes, put_u32, read_bytes, read_str, read_u32};
use crate::{codec, DecodeError};
use record::Value;

/// Schema version of the result-file framing. Readers reject anything else.
pub const SCHEMA_VERSION: u8 = 1;

/// Message is the ordered set of named values captured by one test case,
/// and the unit persisted as a result file.
///
/// Names keep insertion order; re-inserting a name overwrites its value in
/// place. Each value is framed as its own self-contained codec buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    entries: Vec<(String, Value)>,
}

impl Message {
    pub fn new() -> Message {
        Message::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![SCHEMA_VERSION];
        put_u32(&mut buf, self.entries.len() as u32);
        for (name, value) in &self.entries {
            put_bytes(&mut buf, name.as_bytes());
            put_bytes(&mut buf, &codec::encode(value));
        }
        buf
    }

    pub fn decode(buf: &[u8]) -> Result<Message, DecodeError> {
        let version = *buf.first().ok_or(DecodeError::Truncated)?;
        if version != SCHEMA_VERSION {
            return Err(DecodeError::BadVersion(version));
        }
        let mut cur = 1;
        let count = read_u32(buf, cur)? as usize;
        cur += 4;

        let mut message = Message::new();
        for _ in 0..count {
            let name = read_str(buf, &mut cur)?.to_string();
            let body = read_bytes(buf, &mut cur)?;
            message.insert(name, codec::decode(body)?);
        }
        Ok(message)
    }
}

impl FromIterator<(String, Value)> for Message {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Message {
        let mut message = Message::new();
        for (name, value) in iter {
            message.insert(name, value);
        }
        message
    }
}

#[cfg(test)]
mod test {
    use super::{DecodeError, Message, SCHEMA_VERSION};
    use record::{Object, Value};

    fn fixture() -> Message {
        let mut message = Message::new();
        message.insert("some-array-value", Value::Array(vec![Value::Bool(true)]));
        message.insert("some-other-value", Value::Unsigned(1));
        message.insert(
            "some-value",
            Object::new("head").with("eyes", Value::Unsigned(2)).into(),
        );
        message
    }

    #[test]
    fn test_round_trip_preserves_entries_and_order() {
        let message = fixture();
        let decoded = Message::decode(&message.encode()).unwrap();
        assert_eq!(decoded, message);

        let names: Vec<_> = decoded.iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec!["some-array-value", "some-other-value", "some-value"]
        );
    }

    #[test]
    fn test_empty_message_round_trips() {
        let message = Message::new();
        assert!(message.is_empty());
        assert_eq!(Message::decode(&message.encode()).unwrap(), message);
    }

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut message = fixture();
        message.insert("some-other-value", Value::Unsigned(2));
        assert_eq!(message.len(), 3);
        assert_eq!(message.get("some-other-value"), Some(&Value::Unsigned(2)));
        let names: Vec<_> = message.iter().map(|(n, _)| n).collect();
        assert_eq!(names[1], "some-other-value");
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let mut buf = fixture().encode();
        assert_eq!(buf[0], SCHEMA_VERSION);
        buf[0] = 2;
        assert_eq!(Message::decode(&buf), Err(DecodeError::BadVersion(2)));
    }

    #[test]
    fn test_truncated_message_is_rejected() {
        let buf = fixture().encode();
        assert_eq!(Message::decode(&[]), Err(DecodeError::Truncated));
        assert_eq!(
            Message::decode(&buf[..buf.len() - 3]),
            Err(DecodeError::Truncated)
        );
    }
}
