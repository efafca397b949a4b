//! Reassembly of a bus waveform from its per-bit member waveforms.

use std::collections::BTreeSet;

use tracecmp_common::{Logic, LogicVec};
use tracecmp_trace::{Trace, ValueChange};
use tracing::warn;

use crate::group::VectorGroup;

/// Synthesizes the change sequence a group would have had if it had been
/// dumped as a single vector.
///
/// The result has one change at every timestamp at which any member changes.
/// At each such time, index `i` of the bus holds the least-significant bit of
/// member `i`'s latest change at or before that time. Indices with no member,
/// and members that have not changed yet, read as `x`. Values are
/// `group.width()` wide, highest index leftmost.
pub fn reconstruct(group: &VectorGroup, trace: &Trace) -> Vec<ValueChange> {
    let min = group.min_index();
    let width = group.width();

    let members: Vec<(u32, &[ValueChange])> = group
        .members
        .iter()
        .map(|(&index, key)| {
            let changes: &[ValueChange] = match trace.signal(key) {
                Some(signal) => {
                    if signal.width != 1 {
                        warn!(
                            signal = %signal.name,
                            width = signal.width,
                            "bus member is wider than one bit; using its lowest bit"
                        );
                    }
                    trace.changes(signal)
                }
                None => &[],
            };
            (index - min, changes)
        })
        .collect();

    let times: BTreeSet<u64> = members
        .iter()
        .flat_map(|(_, changes)| changes.iter().map(|c| c.time))
        .collect();

    let mut cursors = vec![0usize; members.len()];
    let mut result = Vec::with_capacity(times.len());

    for time in times {
        let mut value = LogicVec::filled(width, Logic::X);
        for ((position, changes), cursor) in members.iter().zip(cursors.iter_mut()) {
            while *cursor < changes.len() && changes[*cursor].time <= time {
                *cursor += 1;
            }
            let latest = cursor.checked_sub(1).and_then(|i| changes[i].value.lsb());
            if let Some(bit) = latest {
                value.set(*position, bit);
            }
        }
        result.push(ValueChange::new(time, value));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{group_trace, CanonicalSignal};
    use tracecmp_trace::{parse_str, ParseOptions};

    fn rebuild(vcd: &str, name: &str) -> Vec<(u64, String)> {
        let trace = parse_str(vcd, &ParseOptions::default()).unwrap();
        let grouping = group_trace(&trace);
        let Some(CanonicalSignal::Vector(group)) = grouping.get(name) else {
            panic!("{name} is not a vector group");
        };
        reconstruct(group, &trace)
            .into_iter()
            .map(|c| (c.time, c.value.to_string()))
            .collect()
    }

    #[test]
    fn bits_are_assembled_msb_first() {
        let vcd = "\
$var wire 1 ! v[0] $end
$var wire 1 \" v[1] $end
$var wire 1 # v[2] $end
$enddefinitions $end
#0
1!
0\"
0#
#10
1#
";
        assert_eq!(
            rebuild(vcd, "v[2:0]"),
            vec![(0, "001".into()), (10, "101".into())]
        );
    }

    #[test]
    fn bits_without_history_are_unknown() {
        let vcd = "\
$var wire 1 ! v[0] $end
$var wire 1 \" v[1] $end
$enddefinitions $end
#0
1!
#7
1\"
#9
0!
";
        assert_eq!(
            rebuild(vcd, "v[1:0]"),
            vec![(0, "x1".into()), (7, "11".into()), (9, "10".into())]
        );
    }

    #[test]
    fn gaps_are_unknown_at_every_timestamp() {
        let vcd = "\
$var wire 1 ! bus[0] $end
$var wire 1 \" bus[2] $end
$var wire 1 # bus[5] $end
$enddefinitions $end
#0
0!
0\"
0#
#4
1!
#8
1\"
1#
";
        let values = rebuild(vcd, "bus[5:0]");
        assert_eq!(
            values,
            vec![(0, "0xx0x0".into()), (4, "0xx0x1".into()), (8, "1xx1x1".into())]
        );
        for (_, v) in &values {
            let bits: Vec<char> = v.chars().collect();
            // positions of indices 4, 3 and 1 in an MSB-first string of width 6
            assert_eq!((bits[1], bits[2], bits[4]), ('x', 'x', 'x'));
        }
    }

    #[test]
    fn offset_ranges_start_at_min_index() {
        let vcd = "\
$var wire 1 ! d[4] $end
$var wire 1 \" d[5] $end
$enddefinitions $end
#3
1!
0\"
";
        assert_eq!(rebuild(vcd, "d[5:4]"), vec![(3, "01".into())]);
    }

    #[test]
    fn timestamps_are_union_without_duplicates() {
        let vcd = "\
$var wire 1 ! q[0] $end
$var wire 1 \" q[1] $end
$enddefinitions $end
#0
0!
0\"
#5
1!
#5
1\"
#6
0\"
";
        let times: Vec<u64> = rebuild(vcd, "q[1:0]").into_iter().map(|(t, _)| t).collect();
        assert_eq!(times, [0, 5, 6]);
    }

    #[test]
    fn unknown_and_high_impedance_bits_pass_through() {
        let vcd = "\
$var wire 1 ! s[0] $end
$var wire 1 \" s[1] $end
$enddefinitions $end
#0
z!
x\"
";
        assert_eq!(rebuild(vcd, "s[1:0]"), vec![(0, "xz".into())]);
    }

    #[test]
    fn aliased_members_share_history() {
        let vcd = "\
$var wire 1 ! a[0] $end
$var wire 1 ! a[1] $end
$enddefinitions $end
#0
1!
#2
0!
";
        assert_eq!(
            rebuild(vcd, "a[1:0]"),
            vec![(0, "11".into()), (2, "00".into())]
        );
    }

    #[test]
    fn group_with_no_changes_is_empty() {
        let vcd = "\
$var wire 1 ! e[0] $end
$var wire 1 \" e[1] $end
$enddefinitions $end
";
        assert!(rebuild(vcd, "e[1:0]").is_empty());
    }
}
