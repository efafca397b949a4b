//! Grouping of per-bit signals into synthesized vector signals.
//!
//! Simulators often dump a bus one bit at a time (`cnt[0]`, `cnt[1]`, ...)
//! while another run of the same design dumps it whole (`cnt[3:0]`). Grouping
//! gives both the same canonical name so they can be compared.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracecmp_trace::Trace;
use tracing::warn;

static BIT_MEMBER: OnceLock<Regex> = OnceLock::new();

fn bit_member_pattern() -> &'static Regex {
    BIT_MEMBER.get_or_init(|| Regex::new(r"^(.+)\[(\d+)\]$").unwrap())
}

/// A bus synthesized from signals named `<prefix>[<index>]`.
///
/// Indices need not be contiguous; positions between the lowest and highest
/// index with no member are reconstructed as `x`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VectorGroup {
    /// Lower-cased name before the `[index]` suffix.
    pub prefix: String,
    /// Bit index to the member signal's lower-cased name.
    pub members: BTreeMap<u32, String>,
}

impl VectorGroup {
    /// The lowest observed bit index.
    pub fn min_index(&self) -> u32 {
        self.members.keys().next().copied().unwrap_or(0)
    }

    /// The highest observed bit index.
    pub fn max_index(&self) -> u32 {
        self.members.keys().next_back().copied().unwrap_or(0)
    }

    /// Width of the synthesized vector, `max - min + 1`.
    pub fn width(&self) -> u32 {
        (self.max_index() - self.min_index()).saturating_add(1)
    }

    /// `prefix[max:min]`, emitted even for single-bit or gapped groups.
    pub fn canonical_name(&self) -> String {
        format!("{}[{}:{}]", self.prefix, self.max_index(), self.min_index())
    }

    /// Indices in `min..=max` that no member covers.
    pub fn missing_indices(&self) -> Vec<u32> {
        (self.min_index()..=self.max_index())
            .filter(|i| !self.members.contains_key(i))
            .collect()
    }
}

/// What a canonical name stands for in one trace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum CanonicalSignal {
    /// A declared signal, by lower-cased name.
    Plain(String),
    /// A bus synthesized from per-bit members.
    Vector(VectorGroup),
}

/// The partition of one trace's names into plain signals and vector groups,
/// keyed and ordered by canonical name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignalGrouping {
    signals: BTreeMap<String, CanonicalSignal>,
}

impl SignalGrouping {
    /// Canonical names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.signals.keys().map(String::as_str)
    }

    /// Looks up a canonical name.
    pub fn get(&self, name: &str) -> Option<&CanonicalSignal> {
        self.signals.get(name)
    }

    /// Whether the canonical name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.signals.contains_key(name)
    }

    /// All entries in canonical-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CanonicalSignal)> {
        self.signals.iter().map(|(name, sig)| (name.as_str(), sig))
    }

    /// The vector groups only.
    pub fn vectors(&self) -> impl Iterator<Item = &VectorGroup> {
        self.signals.values().filter_map(|sig| match sig {
            CanonicalSignal::Vector(group) => Some(group),
            CanonicalSignal::Plain(_) => None,
        })
    }

    /// Number of canonical names.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Whether there are no names at all.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

/// Groups spanning more than this many positions per member are left as
/// plain names instead of being synthesized.
const MAX_SPAN_PER_MEMBER: u64 = 64;

/// Partitions declared signal names into plain signals and vector groups.
///
/// Names are lower-cased first. A name of the form `<prefix>[<index>]` joins
/// the group for `<prefix>`; everything else is plain. The result depends only
/// on the set of names given, not on their order or multiplicity.
pub fn group_names<'a, I>(names: I) -> SignalGrouping
where
    I: IntoIterator<Item = &'a str>,
{
    group_signals(names.into_iter().map(|name| (name, 1)))
}

/// Like [`group_names`], but for `(name, declared width)` pairs.
///
/// Only 1-bit signals can be bus members. A wider `<prefix>[<index>]`, such
/// as one word of a memory array, stays a plain name so none of its bits are
/// dropped. A group whose index range is far sparser than its member count
/// (more than 64 positions per member) is also left as plain names.
pub fn group_signals<'a, I>(signals: I) -> SignalGrouping
where
    I: IntoIterator<Item = (&'a str, u32)>,
{
    let pattern = bit_member_pattern();
    let mut plain: BTreeMap<String, CanonicalSignal> = BTreeMap::new();
    let mut groups: BTreeMap<String, VectorGroup> = BTreeMap::new();

    for (name, width) in signals {
        let key = name.to_lowercase();
        let member = (width == 1)
            .then(|| pattern.captures(&key))
            .flatten()
            .and_then(|caps| {
                let index = caps[2].parse::<u32>().ok()?;
                Some((caps[1].to_string(), index))
            });
        match member {
            Some((prefix, index)) => {
                groups
                    .entry(prefix.clone())
                    .or_insert_with(|| VectorGroup {
                        prefix,
                        members: BTreeMap::new(),
                    })
                    .members
                    .insert(index, key);
            }
            None => {
                plain.insert(key.clone(), CanonicalSignal::Plain(key));
            }
        }
    }

    let mut vectors = Vec::new();
    for group in groups.into_values() {
        let span = u64::from(group.max_index() - group.min_index()) + 1;
        if span > group.members.len() as u64 * MAX_SPAN_PER_MEMBER {
            warn!(
                prefix = %group.prefix,
                members = group.members.len(),
                span,
                "bit indices too sparse to rebuild as one bus; comparing bits individually"
            );
            for key in group.members.into_values() {
                plain.insert(key.clone(), CanonicalSignal::Plain(key));
            }
            continue;
        }
        vectors.push(group);
    }

    for group in vectors {
        let name = group.canonical_name();
        if plain.contains_key(&name) {
            warn!(
                signal = %name,
                members = group.members.len(),
                "bus declared both whole and per bit; comparing the whole declaration"
            );
            continue;
        }
        plain.insert(name, CanonicalSignal::Vector(group));
    }

    SignalGrouping { signals: plain }
}

/// Groups the distinct declared names of a trace by their declared widths.
pub fn group_trace(trace: &Trace) -> SignalGrouping {
    group_signals(
        trace
            .keys()
            .map(|key| (key, trace.signal(key).map_or(1, |signal| signal.width))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector<'g>(grouping: &'g SignalGrouping, name: &str) -> &'g VectorGroup {
        match grouping.get(name) {
            Some(CanonicalSignal::Vector(group)) => group,
            other => panic!("expected vector group for {name}, got {other:?}"),
        }
    }

    #[test]
    fn plain_names_are_their_own_canonical_name() {
        let grouping = group_names(["tb.clk", "tb.rst", "tb.data[7:0]"]);
        assert_eq!(
            grouping.names().collect::<Vec<_>>(),
            ["tb.clk", "tb.data[7:0]", "tb.rst"]
        );
        assert_eq!(
            grouping.get("tb.clk"),
            Some(&CanonicalSignal::Plain("tb.clk".into()))
        );
        assert_eq!(grouping.vectors().count(), 0);
    }

    #[test]
    fn bit_members_form_a_range() {
        let grouping = group_names(["tb.cnt[0]", "tb.cnt[1]", "tb.cnt[2]", "tb.cnt[3]"]);
        assert_eq!(grouping.names().collect::<Vec<_>>(), ["tb.cnt[3:0]"]);
        let group = vector(&grouping, "tb.cnt[3:0]");
        assert_eq!(group.prefix, "tb.cnt");
        assert_eq!(group.width(), 4);
        assert_eq!(group.members[&2], "tb.cnt[2]");
        assert!(group.missing_indices().is_empty());
    }

    #[test]
    fn gaps_are_kept_in_the_range_name() {
        let grouping = group_names(["bus[0]", "bus[2]", "bus[5]"]);
        let group = vector(&grouping, "bus[5:0]");
        assert_eq!(group.width(), 6);
        assert_eq!(group.missing_indices(), [1, 3, 4]);
    }

    #[test]
    fn single_member_still_gets_a_range() {
        let grouping = group_names(["flag[3]"]);
        assert!(grouping.contains("flag[3:3]"));
        assert_eq!(vector(&grouping, "flag[3:3]").width(), 1);
    }

    #[test]
    fn names_are_lower_cased() {
        let grouping = group_names(["Top.Clk", "Top.Bus[1]", "top.bus[0]"]);
        assert_eq!(
            grouping.names().collect::<Vec<_>>(),
            ["top.bus[1:0]", "top.clk"]
        );
    }

    #[test]
    fn grouping_is_deterministic() {
        let names = ["b[2]", "a", "b[0]", "c[10]", "c[9]", "d[1:0]"];
        let mut reversed = names;
        reversed.reverse();
        let first = group_names(names);
        assert_eq!(first, group_names(names));
        assert_eq!(first, group_names(reversed));
        assert_eq!(
            first.names().collect::<Vec<_>>(),
            ["a", "b[2:0]", "c[10:9]", "d[1:0]"]
        );
    }

    #[test]
    fn only_trailing_index_counts() {
        let grouping = group_names(["mem[3].q", "x[]", "y[-1]", "z[4294967296]", "[2]"]);
        assert_eq!(grouping.vectors().count(), 0);
        assert_eq!(grouping.len(), 5);
    }

    #[test]
    fn nested_indices_group_on_the_last_one() {
        let grouping = group_names(["mem[3][0]", "mem[3][1]"]);
        let group = vector(&grouping, "mem[3][1:0]");
        assert_eq!(group.prefix, "mem[3]");
    }

    #[test]
    fn wide_indexed_signals_stay_plain() {
        let grouping = group_signals([("mem[0]", 8), ("mem[1]", 8), ("q[0]", 1), ("q[1]", 1)]);
        assert_eq!(
            grouping.names().collect::<Vec<_>>(),
            ["mem[0]", "mem[1]", "q[1:0]"]
        );
        assert_eq!(
            grouping.get("mem[1]"),
            Some(&CanonicalSignal::Plain("mem[1]".into()))
        );
    }

    #[test]
    fn sparse_indices_are_not_synthesized() {
        let grouping = group_names(["b[0]", "b[4000000000]"]);
        assert_eq!(grouping.vectors().count(), 0);
        assert_eq!(
            grouping.names().collect::<Vec<_>>(),
            ["b[0]", "b[4000000000]"]
        );

        // two members may span up to 128 positions
        assert!(group_names(["c[0]", "c[127]"]).contains("c[127:0]"));
        assert!(!group_names(["c[0]", "c[128]"]).contains("c[128:0]"));
    }

    #[test]
    fn whole_declaration_wins_over_synthesized_range() {
        let grouping = group_names(["d[1:0]", "d[0]", "d[1]"]);
        assert_eq!(grouping.len(), 1);
        assert_eq!(
            grouping.get("d[1:0]"),
            Some(&CanonicalSignal::Plain("d[1:0]".into()))
        );
    }
}
