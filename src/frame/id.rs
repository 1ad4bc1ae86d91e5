use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::{CodeAddress, FunctionAddress};

/// Identity of a persisted stack frame: *(function entry, call site)*.
///
/// Two dynamic calls to the same function from different call sites are
/// modeled as distinct frames, because callee frame shape can depend on
/// caller-supplied context (calling-convention quirks visible only from one
/// call site). Identities order lexicographically on *(function, call site)*.
///
/// In serialized form the call site is exposed as `callerAddress`, matching
/// the interchange contract consumed by the translation backend.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FrameId {
    #[serde(rename = "functionAddress")]
    function: FunctionAddress,
    #[serde(rename = "callerAddress")]
    call_site: CodeAddress,
}

impl FrameId {
    /// Creates a frame identity from a function entry and the call site that
    /// reached it.
    #[must_use]
    pub const fn new(function: FunctionAddress, call_site: CodeAddress) -> Self {
        FrameId {
            function,
            call_site,
        }
    }

    /// Returns the entry address of the called function.
    #[must_use]
    pub const fn function(&self) -> FunctionAddress {
        self.function
    }

    /// Returns the instruction address the call was issued from.
    #[must_use]
    pub const fn call_site(&self) -> CodeAddress {
        self.call_site
    }
}

impl fmt::Debug for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FrameId(function: {}, call_site: {})",
            self.function, self.call_site
        )
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.function, self.call_site)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn id(function: u64, call_site: u64) -> FrameId {
        FrameId::new(FunctionAddress::new(function), CodeAddress::new(call_site))
    }

    #[test]
    fn test_accessors() {
        let frame_id = id(0x4000, 0x100);
        assert_eq!(frame_id.function().value(), 0x4000);
        assert_eq!(frame_id.call_site().value(), 0x100);
    }

    #[test]
    fn test_distinct_call_sites_are_distinct_ids() {
        assert_ne!(id(0x4000, 0x100), id(0x4000, 0x200));
        assert_eq!(id(0x4000, 0x100), id(0x4000, 0x100));
    }

    #[test]
    fn test_lexicographic_ordering() {
        assert!(id(0x4000, 0x200) < id(0x5000, 0x100));
        assert!(id(0x4000, 0x100) < id(0x4000, 0x200));
    }

    #[test]
    fn test_usable_as_map_key() {
        let mut map = BTreeMap::new();
        map.insert(id(0x4000, 0x100), 1);
        map.insert(id(0x4000, 0x200), 2);

        assert_eq!(map.get(&id(0x4000, 0x100)), Some(&1));
        assert_eq!(map.get(&id(0x4000, 0x200)), Some(&2));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", id(0x4000, 0x100)), "0x4000@0x100");
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(id(0x4000, 0x100)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "functionAddress": 0x4000, "callerAddress": 0x100 })
        );
    }

    #[test]
    fn test_deserialization() {
        let parsed: FrameId =
            serde_json::from_str(r#"{ "functionAddress": 16384, "callerAddress": 256 }"#).unwrap();
        assert_eq!(parsed, id(0x4000, 0x100));
    }
}
