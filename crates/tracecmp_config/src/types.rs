//! Configuration types deserialized from `tracecmp.toml`.

use serde::Deserialize;
use tracecmp_compare::CompareOptions;
use tracecmp_trace::ParseOptions;

/// The whole configuration file. Every table and key is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// The `[parse]` table.
    pub parse: ParseOptions,
    /// The `[compare]` table.
    pub compare: CompareOptions,
}
