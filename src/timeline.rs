use crate::eid::{ADD_EVENT_EID, EVENT_ERR_EID, START_SIM_EID};
use crate::error::{SimError, SimResult};
use crate::event::{EventCmd, Link, ParamKind, SimEvent, SubsystemId, EVT_CMD_NULL_IDX, REALTIME_END, SIM_IDLE_CMD};
use static_assertions::const_assert;
use tracing::{debug, warn};

/// Scenario array capacity.
pub const EVT_CMD_MAX: usize = 25;

// The null link must never address a real slot
const_assert!(EVT_CMD_NULL_IDX as usize >= EVT_CMD_MAX);

pub type ScenarioTable = [EventCmd; EVT_CMD_MAX];

/// Marker every unused slot carries so a runaway walk stops on it.
pub const END_MARKER: EventCmd = EventCmd::new(
    REALTIME_END,
    SubsystemId::Sim,
    SimEvent::StopSim as u8,
    ParamKind::None,
    None,
);

/// Time sorted, doubly linked list of event commands living in a fixed arena.
///
/// Links are indices into the arena, [`EVT_CMD_NULL_IDX`] meaning "none".
/// Entries are never removed; runtime insertions consume free slots at the
/// tail, tracked by the runtime cursor.
#[derive(Debug, Clone)]
pub struct Timeline {
    cmds: ScenarioTable,
    runtime_idx: u16,
    last: u16,
    next: u16,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            cmds: [END_MARKER; EVT_CMD_MAX],
            runtime_idx: EVT_CMD_NULL_IDX,
            last: EVT_CMD_NULL_IDX,
            next: EVT_CMD_NULL_IDX,
        }
    }

    /// Load a canned scenario and relink it for walking and runtime insertion.
    ///
    /// Slots after the first end marker become free capacity: time forced to
    /// [`REALTIME_END`], links isolated. Returns the number of free slots.
    pub fn activate(&mut self, scenario: &ScenarioTable) -> usize {
        self.cmds = *scenario;
        self.runtime_idx = EVT_CMD_NULL_IDX;
        self.last = EVT_CMD_NULL_IDX;
        self.next = 0;

        let max = EVT_CMD_MAX as u16;
        let mut end_found = false;

        self.cmds[0].link = Link { prev: EVT_CMD_NULL_IDX, next: 1 };
        for i in 1..max {
            let cmd = &mut self.cmds[usize::from(i)];
            cmd.link = Link { prev: i - 1, next: i + 1 };

            if end_found {
                cmd.time = REALTIME_END;
                cmd.link = Link::NULL;
            } else if i == max - 1 {
                cmd.link.next = EVT_CMD_NULL_IDX;
            } else if cmd.time == REALTIME_END {
                self.runtime_idx = i + 2;
                end_found = true;
            }
        }

        if self.runtime_idx >= max {
            self.runtime_idx = EVT_CMD_NULL_IDX;
        }

        for cmd in self.cmds.iter().filter(|c| c.time != REALTIME_END) {
            if let Err(err) = cmd.kind.validate(cmd.param) {
                warn!(
                    eid = EVENT_ERR_EID,
                    "{} cmd {} at time {}: {}",
                    cmd.subsystem.name(),
                    cmd.id,
                    cmd.time,
                    err
                );
            }
        }

        debug!(eid = START_SIM_EID, "Runtime cmd entries start at index {}", self.runtime_idx);
        self.free_slots()
    }

    /// Insert a runtime event before the first entry strictly later than it.
    ///
    /// The walk starts at the next-event cursor, so an event timed before the
    /// last dispatched entry is rejected. On failure nothing in the arena is
    /// modified; the caller is expected to abort the run.
    pub fn insert(&mut self, mut cmd: EventCmd) -> SimResult<u16> {
        let new_idx = self.runtime_idx;
        if new_idx == EVT_CMD_NULL_IDX {
            return Err(SimError::TimelineOverflow {
                subsystem: cmd.subsystem,
                id: cmd.id,
            });
        }

        let mut cursor = self.next;
        let found = loop {
            let Some(entry) = self.get(cursor) else {
                break None;
            };
            if entry.time > cmd.time {
                break Some(cursor);
            }
            if entry.link.next == EVT_CMD_NULL_IDX || entry.time == REALTIME_END {
                break None;
            }
            cursor = entry.link.next;
        };

        let Some(found) = found else {
            return Err(SimError::TimelineInsert {
                subsystem: cmd.subsystem,
                id: cmd.id,
                index: new_idx,
            });
        };

        // Entries behind the cursor have already run; the new one cannot precede them
        let pred = self.cmds[usize::from(found)].link.prev;
        if self.get(pred).is_some_and(|p| p.time > cmd.time) {
            return Err(SimError::TimelineInsert {
                subsystem: cmd.subsystem,
                id: cmd.id,
                index: new_idx,
            });
        }

        cmd.link = Link { prev: pred, next: found };
        self.cmds[usize::from(new_idx)] = cmd;
        self.cmds[usize::from(found)].link.prev = new_idx;
        if pred != EVT_CMD_NULL_IDX {
            self.cmds[usize::from(pred)].link.next = new_idx;
        }

        debug!(
            eid = ADD_EVENT_EID,
            "New {} cmd {} at time {} added at scenario index {}",
            cmd.subsystem.name(),
            cmd.id,
            cmd.time,
            new_idx
        );

        self.runtime_idx += 1;
        if usize::from(self.runtime_idx) == EVT_CMD_MAX {
            self.runtime_idx = EVT_CMD_NULL_IDX;
        }

        debug_assert!(self.is_time_ordered(), "Timeline order broken by insert at {new_idx}");
        Ok(new_idx)
    }

    /// True when the next event exists and its time has been reached.
    pub fn is_due(&self, sim_time: i32) -> bool {
        self.next != EVT_CMD_NULL_IDX && self.next_cmd().time <= sim_time
    }

    /// Move past the current next event, following its (possibly rewritten) link.
    pub fn advance(&mut self) {
        if self.next == EVT_CMD_NULL_IDX {
            return;
        }
        self.last = self.next;
        self.next = self.cmds[usize::from(self.next)].link.next;
    }

    pub fn reset_cursors(&mut self) {
        self.last = EVT_CMD_NULL_IDX;
        self.next = EVT_CMD_NULL_IDX;
    }

    pub fn get(&self, idx: u16) -> Option<&EventCmd> {
        self.cmds.get(usize::from(idx))
    }

    /// Last dispatched event, or the idle placeholder.
    pub fn last_cmd(&self) -> &EventCmd {
        self.get(self.last).unwrap_or(&SIM_IDLE_CMD)
    }

    /// Event the engine will dispatch next, or the idle placeholder.
    pub fn next_cmd(&self) -> &EventCmd {
        self.get(self.next).unwrap_or(&SIM_IDLE_CMD)
    }

    pub fn next_index(&self) -> u16 {
        self.next
    }

    pub fn last_index(&self) -> u16 {
        self.last
    }

    pub fn runtime_index(&self) -> u16 {
        self.runtime_idx
    }

    pub fn free_slots(&self) -> usize {
        if self.runtime_idx == EVT_CMD_NULL_IDX {
            0
        } else {
            EVT_CMD_MAX - usize::from(self.runtime_idx)
        }
    }

    pub fn entries(&self) -> &ScenarioTable {
        &self.cmds
    }

    /// Follow `next` links from `start` until the null link.
    pub fn walk_from(&self, start: u16) -> Walk<'_> {
        Walk {
            timeline: self,
            cursor: start,
            remaining: EVT_CMD_MAX,
        }
    }

    /// Times along any walk from the head never decrease.
    pub fn is_time_ordered(&self) -> bool {
        let mut prev_time = i32::MIN;
        for (_, cmd) in self.walk_from(0) {
            if cmd.time < prev_time {
                return false;
            }
            prev_time = cmd.time;
        }
        true
    }
}

/// Iterator over linked entries. Bounded by the arena size so a corrupt
/// cycle cannot spin forever.
pub struct Walk<'a> {
    timeline: &'a Timeline,
    cursor: u16,
    remaining: usize,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (u16, &'a EventCmd);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.cursor;
        let cmd = self.timeline.get(idx)?;
        self.remaining -= 1;
        self.cursor = cmd.link.next;
        Some((idx, cmd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn at(time: i32, id: u8) -> EventCmd {
        EventCmd::new(time, SubsystemId::Comm, id, ParamKind::None, None)
    }

    fn table(times: &[i32]) -> ScenarioTable {
        let mut cmds = [END_MARKER; EVT_CMD_MAX];
        for (slot, (i, time)) in cmds.iter_mut().zip(times.iter().enumerate()) {
            *slot = at(*time, i as u8);
        }
        cmds
    }

    #[test]
    fn test_activate_isolates_tail() {
        let mut timeline = Timeline::new();
        let free = timeline.activate(&table(&[1, 1, 50, 100]));

        // End marker at slot 4, runtime capacity starts two past it
        assert_eq!(timeline.runtime_index(), 6);
        assert_eq!(free, EVT_CMD_MAX - 6);
        assert_eq!(timeline.entries()[4].link, Link { prev: 3, next: 5 });
        assert_eq!(timeline.entries()[5].link, Link::NULL);
        assert_eq!(timeline.entries()[5].time, REALTIME_END);
        assert_eq!(timeline.next_index(), 0);
        assert_eq!(timeline.last_index(), EVT_CMD_NULL_IDX);
    }

    #[test]
    fn test_activate_full_table_has_no_capacity() {
        let times: Vec<i32> = (1..=EVT_CMD_MAX as i32).collect();
        let mut timeline = Timeline::new();
        assert_eq!(timeline.activate(&table(&times)), 0);
        assert_eq!(timeline.runtime_index(), EVT_CMD_NULL_IDX);
        assert_eq!(timeline.entries()[EVT_CMD_MAX - 1].link.next, EVT_CMD_NULL_IDX);
    }

    #[test]
    fn test_insert_keeps_order_and_arrival_for_ties() {
        let mut timeline = Timeline::new();
        timeline.activate(&table(&[1, 10, 20, 30]));

        let idx = timeline.insert(at(20, 99)).unwrap();
        assert_eq!(idx, 6);

        let walked: Vec<(i32, u8)> = timeline
            .walk_from(0)
            .map(|(_, c)| (c.time, c.id))
            .take(6)
            .collect();
        assert_eq!(walked, vec![(1, 0), (10, 1), (20, 2), (20, 99), (30, 3), (REALTIME_END, SimEvent::StopSim as u8)]);
        assert!(timeline.is_time_ordered());
        assert_eq!(timeline.runtime_index(), 7);
    }

    #[test]
    fn test_insert_before_cursor_head() {
        let mut timeline = Timeline::new();
        timeline.activate(&table(&[10, 20]));

        timeline.insert(at(5, 42)).unwrap();
        let head = timeline.entries()[0];
        assert_eq!(head.link.prev, 4);
        assert_eq!(timeline.entries()[4].link, Link { prev: EVT_CMD_NULL_IDX, next: 0 });
    }

    #[test]
    fn test_insert_at_end_time_fails_without_mutation() {
        let mut timeline = Timeline::new();
        timeline.activate(&table(&[1, 10]));
        let before = *timeline.entries();

        let err = timeline.insert(at(REALTIME_END, 7)).unwrap_err();
        assert!(matches!(err, SimError::TimelineInsert { index: 4, .. }));
        assert_eq!(timeline.entries(), &before);
        assert_eq!(timeline.runtime_index(), 4);
    }

    #[test]
    fn test_insert_behind_dispatched_entries_fails() {
        let mut timeline = Timeline::new();
        timeline.activate(&table(&[1, 10, 20, 30]));
        timeline.advance();
        timeline.advance();
        let before = *timeline.entries();

        let err = timeline.insert(at(5, 9)).unwrap_err();
        assert!(matches!(err, SimError::TimelineInsert { index: 6, .. }));
        assert_eq!(timeline.entries(), &before);
        assert_eq!(timeline.runtime_index(), 6);
        assert!(timeline.is_time_ordered());

        // Equal to the last dispatched time still fits after it
        assert_eq!(timeline.insert(at(10, 9)).unwrap(), 6);
        assert!(timeline.is_time_ordered());
    }

    #[test]
    fn test_insert_when_idle_fails() {
        let mut timeline = Timeline::new();
        timeline.activate(&table(&[1, 10]));
        timeline.reset_cursors();
        assert!(timeline.insert(at(5, 1)).is_err());
    }

    #[test]
    fn test_capacity_wraps_to_null() {
        let mut timeline = Timeline::new();
        let times: Vec<i32> = (1..=22).collect();
        timeline.activate(&table(&times));
        assert_eq!(timeline.runtime_index(), 24);

        timeline.insert(at(3, 1)).unwrap();
        assert_eq!(timeline.runtime_index(), EVT_CMD_NULL_IDX);

        let before = *timeline.entries();
        let err = timeline.insert(at(4, 2)).unwrap_err();
        assert!(matches!(err, SimError::TimelineOverflow { .. }));
        assert_eq!(timeline.entries(), &before);
    }

    #[test]
    fn test_advance_and_due() {
        let mut timeline = Timeline::new();
        timeline.activate(&table(&[1, 10]));
        assert!(timeline.is_due(1));
        timeline.advance();
        assert_eq!(timeline.last_cmd().time, 1);
        assert!(!timeline.is_due(9));
        assert!(timeline.is_due(10));

        timeline.reset_cursors();
        assert!(!timeline.is_due(i32::MAX));
        assert_eq!(timeline.next_cmd(), &SIM_IDLE_CMD);
    }
}
