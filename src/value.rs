/// A payload accepted by `Cache::store`.
///
/// The store only ever sees bytes; this enum fixes how each kind is encoded,
/// which is also how the typed retrieves decode it again.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Bytes(Vec<u8>),
    Int(i64),
    Float(f64),
}

impl Value {
    /// Encode the value the way a Redis client would send it.
    ///
    /// Text is UTF-8, bytes are verbatim and numbers are decimal text. Floats
    /// use the shortest representation that parses back to the same `f64`.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Value::Text(text) => text.as_bytes().to_vec(),
            Value::Bytes(bytes) => bytes.clone(),
            Value::Int(n) => n.to_string().into_bytes(),
            Value::Float(f) => format!("{:?}", f).into_bytes(),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

/// Conversion of an operation's result into the bytes appended to its Outputs log.
pub trait Encode {
    fn encode(&self) -> Vec<u8>;
}

impl Encode for Value {
    fn encode(&self) -> Vec<u8> {
        self.to_bytes()
    }
}

impl Encode for String {
    fn encode(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl Encode for &str {
    fn encode(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl Encode for Vec<u8> {
    fn encode(&self) -> Vec<u8> {
        self.clone()
    }
}

impl Encode for i64 {
    fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl Encode for f64 {
    fn encode(&self) -> Vec<u8> {
        format!("{:?}", self).into_bytes()
    }
}

impl Encode for bool {
    fn encode(&self) -> Vec<u8> {
        if *self { b"1".to_vec() } else { b"0".to_vec() }
    }
}
