//! Slot reconciliation.
//!
//! [`plan`] matches one enumeration against the slot array and decides which
//! slot each newly seen device goes to. It is pure: the manager performs the
//! connects afterwards. Three passes run in order:
//!
//! 1. **Reacquire**: a device whose id is retained by a slot goes back to that
//!    slot. If the slot is still connected nothing happens.
//! 2. **Fresh**: remaining devices take the first slot that has never been
//!    used this session, so a removed controller keeps its slot reserved.
//! 3. **Reuse**: devices still without a slot take any free slot.
//!
//! A slot is claimed at most once per plan and duplicate ids within one
//! enumeration are only considered once.

use tracing::debug;

/// What the planner needs to know about one slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlotView {
    pub connected: bool,
    pub last_unique_id: u32,
    pub ever_used: bool,
}

/// Which pass produced an assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignmentKind {
    Reacquire,
    Fresh,
    Reuse,
}

/// Connect enumerated device `device` into slot `slot`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub slot: usize,
    pub device: usize,
    pub kind: AssignmentKind,
}

/// Decide slot assignments for the devices in `discovered` (their unique ids,
/// in enumeration order).
pub fn plan(slots: &[SlotView], discovered: &[u32]) -> Vec<Assignment> {
    let mut handled = vec![false; discovered.len()];
    let mut claimed = vec![false; slots.len()];
    let mut assignments = Vec::new();

    for (device, &id) in discovered.iter().enumerate() {
        if id == 0 {
            debug!(device, "ignoring device with reserved id 0");
            handled[device] = true;
        } else if discovered[..device].contains(&id) {
            debug!(device, id, "ignoring duplicate device id");
            handled[device] = true;
        }
    }

    // Reacquire.
    for (device, &id) in discovered.iter().enumerate() {
        if handled[device] {
            continue;
        }
        let owner = slots
            .iter()
            .position(|s| s.ever_used && s.last_unique_id == id);
        if let Some(slot) = owner {
            handled[device] = true;
            if !slots[slot].connected && !claimed[slot] {
                claimed[slot] = true;
                assignments.push(Assignment {
                    slot,
                    device,
                    kind: AssignmentKind::Reacquire,
                });
            }
        }
    }

    // Fresh.
    for device in 0..discovered.len() {
        if handled[device] {
            continue;
        }
        let free = (0..slots.len()).find(|&i| !slots[i].ever_used && !slots[i].connected && !claimed[i]);
        if let Some(slot) = free {
            handled[device] = true;
            claimed[slot] = true;
            assignments.push(Assignment {
                slot,
                device,
                kind: AssignmentKind::Fresh,
            });
        }
    }

    // Reuse.
    for device in 0..discovered.len() {
        if handled[device] {
            continue;
        }
        let free = (0..slots.len()).find(|&i| !slots[i].connected && !claimed[i]);
        if let Some(slot) = free {
            handled[device] = true;
            claimed[slot] = true;
            assignments.push(Assignment {
                slot,
                device,
                kind: AssignmentKind::Reuse,
            });
        }
    }

    assignments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> Vec<SlotView> {
        vec![SlotView::default(); 4]
    }

    fn occupied(id: u32) -> SlotView {
        SlotView {
            connected: true,
            last_unique_id: id,
            ever_used: true,
        }
    }

    fn vacated(id: u32) -> SlotView {
        SlotView {
            connected: false,
            last_unique_id: id,
            ever_used: true,
        }
    }

    #[test]
    fn new_devices_fill_slots_in_order() {
        let plan = plan(&empty(), &[7, 8]);
        assert_eq!(
            plan,
            vec![
                Assignment {
                    slot: 0,
                    device: 0,
                    kind: AssignmentKind::Fresh
                },
                Assignment {
                    slot: 1,
                    device: 1,
                    kind: AssignmentKind::Fresh
                },
            ]
        );
    }

    #[test]
    fn connected_devices_are_left_alone() {
        let slots = vec![occupied(7), SlotView::default()];
        assert!(plan(&slots, &[7]).is_empty());
    }

    #[test]
    fn returning_device_gets_its_old_slot() {
        let slots = vec![occupied(5), vacated(7), SlotView::default(), SlotView::default()];
        let plan = plan(&slots, &[9, 7]);
        assert_eq!(
            plan,
            vec![
                Assignment {
                    slot: 1,
                    device: 1,
                    kind: AssignmentKind::Reacquire
                },
                Assignment {
                    slot: 2,
                    device: 0,
                    kind: AssignmentKind::Fresh
                },
            ]
        );
    }

    #[test]
    fn new_device_avoids_reserved_slot_while_unused_ones_remain() {
        let slots = vec![vacated(7), SlotView::default()];
        let plan = plan(&slots, &[9]);
        assert_eq!(plan[0].slot, 1);
        assert_eq!(plan[0].kind, AssignmentKind::Fresh);
    }

    #[test]
    fn reserved_slots_are_reused_when_nothing_else_is_free() {
        let slots = vec![occupied(1), vacated(7), occupied(3), vacated(4)];
        let plan = plan(&slots, &[9, 10, 11]);
        assert_eq!(
            plan,
            vec![
                Assignment {
                    slot: 1,
                    device: 0,
                    kind: AssignmentKind::Reuse
                },
                Assignment {
                    slot: 3,
                    device: 1,
                    kind: AssignmentKind::Reuse
                },
            ]
        );
    }

    #[test]
    fn zero_and_duplicate_ids_are_skipped() {
        let plan = plan(&empty(), &[0, 4, 4]);
        assert_eq!(
            plan,
            vec![Assignment {
                slot: 0,
                device: 1,
                kind: AssignmentKind::Fresh
            }]
        );
    }

    #[test]
    fn no_slot_is_claimed_twice() {
        let plan = plan(&empty(), &[1, 2, 3, 4, 5, 6]);
        let mut slots: Vec<usize> = plan.iter().map(|a| a.slot).collect();
        slots.sort_unstable();
        slots.dedup();
        assert_eq!(slots, vec![0, 1, 2, 3]);
    }
}
