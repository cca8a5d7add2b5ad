use std::collections::BTreeMap;

/// Opaque key → value bag carried verbatim from the raw model output.
///
/// Keys are kept sorted so serialization is byte-stable regardless of the
/// order in which a model emitted them.
pub type Metadata = BTreeMap<String, serde_json::Value>;
