//! Cross-process command encoding.
//!
//! Plugins and build backends run as subprocesses of the front end. Their
//! display calls are serialized into opaque, line-safe tokens and written to
//! stdout, interleaved with whatever else the subprocess prints. The invoking
//! process scans each output line for [`COMMAND_TAG`], hex-decodes the
//! remainder, and replays the call on its own console; that decoder lives
//! with the consumer, not here.
//!
//! The payload can represent arbitrary structured data. A consumer must
//! treat it as coming from a cooperating process, not an untrusted network
//! peer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BinderyError, Result};

/// Tag prefixing every encoded command line. The `V1` versions the payload
/// shape: consumers seeing an unknown tag must fail explicitly rather than
/// guess.
pub const COMMAND_TAG: &str = "__BINDERY_V1__";

/// A single display/control method invocation destined for cross-process
/// replay: method name, positional arguments, keyword arguments.
///
/// Constructed per call, serialized immediately, never retained. The ordered
/// map gives deterministic serialization for identical keyword arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandToken {
    pub method: String,
    pub args: Vec<Value>,
    pub kwargs: BTreeMap<String, Value>,
}

/// Encode a method invocation as a single line of text.
///
/// The line is the fixed tag, a colon, and the JSON serialization of the
/// token rendered as two lowercase hex digits per byte. Hex guarantees no
/// embedded newline regardless of argument content, and the whole remainder
/// of the line after the first colon is exactly the payload, so the consumer
/// can split once and decode.
///
/// Arguments that cannot be serialized fail loudly here; nothing is guessed
/// or silently dropped.
pub fn encode(method: &str, args: Vec<Value>, kwargs: BTreeMap<String, Value>) -> Result<String> {
    let token = CommandToken {
        method: method.to_string(),
        args,
        kwargs,
    };
    let payload = serde_json::to_vec(&token).map_err(|err| BinderyError::EncodeError {
        method: method.to_string(),
        message: err.to_string(),
    })?;
    Ok(format!("{COMMAND_TAG}:{}", hex::encode(payload)))
}

/// Encode a method invocation and write it to stdout as exactly one line.
pub fn send_command(method: &str, args: Vec<Value>, kwargs: BTreeMap<String, Value>) -> Result<()> {
    println!("{}", encode(method, args, kwargs)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(line: &str) -> CommandToken {
        let (tag, payload) = line.split_once(':').unwrap();
        assert_eq!(tag, COMMAND_TAG);
        let bytes = hex::decode(payload).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn encode_round_trips() {
        let args = vec![json!("Building wheel"), json!(3), json!(true)];
        let mut kwargs = BTreeMap::new();
        kwargs.insert("level".to_string(), json!(2));
        kwargs.insert("tags".to_string(), json!(["sdist", "wheel"]));

        let line = encode("display_debug", args.clone(), kwargs.clone()).unwrap();
        let token = decode(&line);

        assert_eq!(token.method, "display_debug");
        assert_eq!(token.args, args);
        assert_eq!(token.kwargs, kwargs);
    }

    #[test]
    fn encode_round_trips_nested_values() {
        let args = vec![json!({
            "targets": ["wheel", {"name": "sdist", "strict": false}],
            "count": 2,
        })];
        let line = encode("display", args.clone(), BTreeMap::new()).unwrap();
        assert_eq!(decode(&line).args, args);
    }

    #[test]
    fn encoded_line_has_no_newline() {
        let args = vec![json!("first line\nsecond line\r\nthird")];
        let line = encode("display_info", args, BTreeMap::new()).unwrap();
        assert!(!line.contains('\n'));
        assert!(!line.contains('\r'));
    }

    #[test]
    fn payload_is_lowercase_hex_after_first_colon() {
        let line = encode("display", vec![json!("x:y:z")], BTreeMap::new()).unwrap();
        let (_, payload) = line.split_once(':').unwrap();
        assert!(payload
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn encoding_is_deterministic() {
        let mut kwargs = BTreeMap::new();
        kwargs.insert("b".to_string(), json!(2));
        kwargs.insert("a".to_string(), json!(1));

        let first = encode("abort", vec![], kwargs.clone()).unwrap();
        let second = encode("abort", vec![], kwargs).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_invocation_encodes() {
        let line = encode("display", vec![], BTreeMap::new()).unwrap();
        let token = decode(&line);
        assert_eq!(token.method, "display");
        assert!(token.args.is_empty());
        assert!(token.kwargs.is_empty());
    }
}
