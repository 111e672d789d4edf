//! # Contract Call Encoding
//!
//! Encodes `(function, args)` pairs into the call data the contract's
//! dispatcher expects: a 4-byte selector followed by ABI-encoded arguments.
//!
//! This is not a general ABI implementation. MERIT calls a handful of
//! functions on one fixed contract, so we support the parameter types those
//! functions actually use and type-check arguments at encode time. Decoding
//! return data is out of scope — the grading function returns nothing, and
//! success/failure arrives via the receipt.
//!
//! The encoder is deterministic: identical inputs produce byte-identical
//! output, always. The contract's interpretation of those bytes is its own
//! business.

use std::fmt;
use thiserror::Error;

use crate::crypto::hash::keccak256;
use crate::crypto::Address;

/// Errors from call-data encoding.
#[derive(Debug, Error)]
pub enum AbiError {
    #[error("function `{name}` takes {expected} argument(s), got {actual}")]
    ArgumentCount {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("argument {index} of `{name}`: expected {expected}, got {actual}")]
    ArgumentType {
        name: String,
        index: usize,
        expected: ParamType,
        actual: &'static str,
    },
}

/// ABI parameter types supported by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Address,
    Bool,
    Uint256,
    Bytes32,
    /// Dynamic byte array.
    Bytes,
    /// Dynamic UTF-8 string.
    String,
}

impl ParamType {
    /// The canonical type name as it appears in a function signature.
    fn canonical(&self) -> &'static str {
        match self {
            ParamType::Address => "address",
            ParamType::Bool => "bool",
            ParamType::Uint256 => "uint256",
            ParamType::Bytes32 => "bytes32",
            ParamType::Bytes => "bytes",
            ParamType::String => "string",
        }
    }

    /// Dynamic types are encoded as an offset in the head and their payload
    /// in the tail; static types are encoded inline.
    fn is_dynamic(&self) -> bool {
        matches!(self, ParamType::Bytes | ParamType::String)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical())
    }
}

/// A positional argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    Bool(bool),
    Uint256(u128),
    Bytes32([u8; 32]),
    Bytes(Vec<u8>),
    String(String),
}

impl Token {
    fn type_name(&self) -> &'static str {
        match self {
            Token::Address(_) => "address",
            Token::Bool(_) => "bool",
            Token::Uint256(_) => "uint256",
            Token::Bytes32(_) => "bytes32",
            Token::Bytes(_) => "bytes",
            Token::String(_) => "string",
        }
    }

    fn matches(&self, param: ParamType) -> bool {
        matches!(
            (self, param),
            (Token::Address(_), ParamType::Address)
                | (Token::Bool(_), ParamType::Bool)
                | (Token::Uint256(_), ParamType::Uint256)
                | (Token::Bytes32(_), ParamType::Bytes32)
                | (Token::Bytes(_), ParamType::Bytes)
                | (Token::String(_), ParamType::String)
        )
    }
}

/// State mutability of a contract function, as declared in its interface.
///
/// Carried for documentation and diagnostics; the encoder treats all
/// functions identically. Whether a call changes state is decided by the
/// contract, not by us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateMutability {
    /// Modifies state, accepts no value transfer. All MERIT calls.
    NonPayable,
    /// Read-only.
    View,
    /// Modifies state and accepts value.
    Payable,
}

/// A static description of one contract function: name, parameter types,
/// and mutability. The only thing this crate does with it is encode
/// positional arguments into call data.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub params: Vec<ParamType>,
    pub mutability: StateMutability,
}

impl Function {
    pub fn new(name: &str, params: Vec<ParamType>, mutability: StateMutability) -> Self {
        Self {
            name: name.to_string(),
            params,
            mutability,
        }
    }

    /// The grading function on the Learn2Earn contract:
    /// `gradeSubmission(address student, bool approved)`.
    pub fn grade_submission() -> Self {
        Self::new(
            crate::config::GRADE_FUNCTION_NAME,
            vec![ParamType::Address, ParamType::Bool],
            StateMutability::NonPayable,
        )
    }

    /// The canonical signature string, e.g.
    /// `gradeSubmission(address,bool)`. No spaces, no parameter names —
    /// get this wrong and the selector points at a function that does not
    /// exist.
    pub fn signature(&self) -> String {
        let params: Vec<&str> = self.params.iter().map(|p| p.canonical()).collect();
        format!("{}({})", self.name, params.join(","))
    }

    /// The 4-byte dispatch selector: `keccak256(signature)[..4]`.
    pub fn selector(&self) -> [u8; 4] {
        let digest = keccak256(self.signature().as_bytes());
        [digest[0], digest[1], digest[2], digest[3]]
    }

    /// Encodes a call to this function: selector followed by the standard
    /// head/tail argument encoding. Arguments are validated positionally
    /// against the declared parameter types; that is the only validation
    /// this layer performs.
    pub fn encode_call(&self, args: &[Token]) -> Result<Vec<u8>, AbiError> {
        if args.len() != self.params.len() {
            return Err(AbiError::ArgumentCount {
                name: self.name.clone(),
                expected: self.params.len(),
                actual: args.len(),
            });
        }
        for (index, (arg, &param)) in args.iter().zip(&self.params).enumerate() {
            if !arg.matches(param) {
                return Err(AbiError::ArgumentType {
                    name: self.name.clone(),
                    index,
                    expected: param,
                    actual: arg.type_name(),
                });
            }
        }

        let mut head: Vec<u8> = Vec::with_capacity(32 * args.len());
        let mut tail: Vec<u8> = Vec::new();
        let head_len = 32 * args.len();

        for arg in args {
            match arg {
                Token::Address(addr) => head.extend_from_slice(&left_pad(addr.as_bytes())),
                Token::Bool(b) => head.extend_from_slice(&left_pad(&[u8::from(*b)])),
                Token::Uint256(value) => {
                    head.extend_from_slice(&left_pad(&value.to_be_bytes()));
                }
                Token::Bytes32(bytes) => head.extend_from_slice(bytes),
                Token::Bytes(data) => {
                    head.extend_from_slice(&encode_offset(head_len + tail.len()));
                    tail.extend_from_slice(&encode_dynamic(data));
                }
                Token::String(s) => {
                    head.extend_from_slice(&encode_offset(head_len + tail.len()));
                    tail.extend_from_slice(&encode_dynamic(s.as_bytes()));
                }
            }
        }

        let mut out = Vec::with_capacity(4 + head.len() + tail.len());
        out.extend_from_slice(&self.selector());
        out.extend_from_slice(&head);
        out.extend_from_slice(&tail);
        Ok(out)
    }
}

/// Left-pads a value to a 32-byte word.
fn left_pad(value: &[u8]) -> [u8; 32] {
    debug_assert!(value.len() <= 32);
    let mut word = [0u8; 32];
    word[32 - value.len()..].copy_from_slice(value);
    word
}

/// Encodes a tail offset as a 32-byte word.
fn encode_offset(offset: usize) -> [u8; 32] {
    left_pad(&(offset as u64).to_be_bytes())
}

/// Encodes dynamic data: 32-byte length word, then the payload padded with
/// zeros to the next 32-byte boundary.
fn encode_dynamic(data: &[u8]) -> Vec<u8> {
    let padded_len = data.len().div_ceil(32) * 32;
    let mut out = Vec::with_capacity(32 + padded_len);
    out.extend_from_slice(&encode_offset(data.len()));
    out.extend_from_slice(data);
    out.resize(32 + padded_len, 0);
    out
}
