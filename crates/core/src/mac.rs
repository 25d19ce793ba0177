//! Hardware address parsing.
//!
//! Accepts the usual IEEE 802 notations for 48-bit, 64-bit and 20-octet
//! InfiniBand addresses:
//! - `00:00:5e:00:53:01` / `00-00-5e-00-53-01`
//! - `0000.5e00.5301`

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::{Error, Result};

/// A parsed link-layer hardware address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MacAddress(Vec<u8>);

const VALID_LENGTHS: [usize; 3] = [6, 8, 20];

impl MacAddress {
    /// Parses a hardware address string.
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = if s.contains(':') {
            parse_octets(s, ':')?
        } else if s.contains('-') {
            parse_octets(s, '-')?
        } else if s.contains('.') {
            parse_dotted(s)?
        } else {
            return Err(invalid(s));
        };

        if !VALID_LENGTHS.contains(&bytes.len()) {
            return Err(invalid(s));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

fn invalid(s: &str) -> Error {
    Error::invalid_argument(format!("invalid MAC address: {:?}", s))
}

// from_str_radix tolerates a leading sign
fn is_hex(part: &str) -> bool {
    part.bytes().all(|b| b.is_ascii_hexdigit())
}

fn parse_octets(s: &str, sep: char) -> Result<Vec<u8>> {
    s.split(sep)
        .map(|part| {
            if part.len() != 2 || !is_hex(part) {
                return Err(invalid(s));
            }
            u8::from_str_radix(part, 16).map_err(|_| invalid(s))
        })
        .collect()
}

fn parse_dotted(s: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for group in s.split('.') {
        if group.len() != 4 || !is_hex(group) {
            return Err(invalid(s));
        }
        let word = u16::from_str_radix(group, 16).map_err(|_| invalid(s))?;
        bytes.extend_from_slice(&word.to_be_bytes());
    }
    Ok(bytes)
}

impl FromStr for MacAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|b| format!("{:02x}", b)).collect();
        f.write_str(&parts.join(":"))
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
