use crate::types::{EventCursor, ServerEvent};
use palisade_core::Tick;
use std::collections::VecDeque;

/// Bounded event stream with cursor-based retrieval.
///
/// Events get monotonically increasing sequence numbers; once the buffer is
/// full the oldest are dropped, so a slow reader silently skips ahead to
/// the oldest event still available.
pub struct EventBuffer<E> {
    events: VecDeque<ServerEvent<E>>,
    capacity: usize,
    next_sequence: u64,
}

impl<E: Clone> EventBuffer<E> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            next_sequence: 0,
        }
    }

    pub fn push(&mut self, tick: Tick, event: E) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(ServerEvent {
            sequence,
            tick,
            event,
        });
    }

    /// Returns every buffered event at or past the cursor, plus the cursor
    /// to pass next time.
    pub fn get_from_cursor(&self, cursor: EventCursor) -> (Vec<ServerEvent<E>>, EventCursor) {
        let events: Vec<ServerEvent<E>> = self
            .events
            .iter()
            .filter(|e| e.sequence >= cursor.0)
            .cloned()
            .collect();
        (events, EventCursor(self.next_sequence))
    }

    pub fn current_sequence(&self) -> u64 {
        self.next_sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_retrieve_in_order() {
        let mut buffer: EventBuffer<i32> = EventBuffer::new(10);
        buffer.push(1, 100);
        buffer.push(2, 200);
        buffer.push(3, 300);

        let (events, cursor) = buffer.get_from_cursor(EventCursor(0));
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].sequence, 0);
        assert_eq!(events[0].tick, 1);
        assert_eq!(events[0].event, 100);
        assert_eq!(events[2].sequence, 2);
        assert_eq!(cursor.0, 3);
    }

    #[test]
    fn cursor_resumes_where_it_left_off() {
        let mut buffer: EventBuffer<i32> = EventBuffer::new(10);
        buffer.push(1, 100);
        buffer.push(2, 200);

        let (events, cursor) = buffer.get_from_cursor(EventCursor(0));
        assert_eq!(events.len(), 2);

        buffer.push(3, 300);
        buffer.push(4, 400);

        let (events, cursor) = buffer.get_from_cursor(cursor);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].sequence, 2);
        assert_eq!(events[1].sequence, 3);
        assert_eq!(cursor.0, 4);
    }

    #[test]
    fn overflow_drops_the_oldest_events() {
        let mut buffer: EventBuffer<i32> = EventBuffer::new(3);
        for i in 0..10 {
            buffer.push(i, i as i32 * 100);
        }

        let (events, cursor) = buffer.get_from_cursor(EventCursor(0));
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].sequence, 7);
        assert_eq!(events[0].event, 700);
        assert_eq!(cursor.0, 10);
    }

    #[test]
    fn empty_buffer_returns_nothing() {
        let buffer: EventBuffer<i32> = EventBuffer::new(10);
        let (events, cursor) = buffer.get_from_cursor(EventCursor(0));
        assert!(events.is_empty());
        assert_eq!(cursor.0, 0);
    }

    #[test]
    fn cursor_at_the_end_yields_nothing() {
        let mut buffer: EventBuffer<i32> = EventBuffer::new(10);
        buffer.push(1, 100);
        buffer.push(2, 200);

        let (events, _) = buffer.get_from_cursor(EventCursor(2));
        assert!(events.is_empty());
    }
}
