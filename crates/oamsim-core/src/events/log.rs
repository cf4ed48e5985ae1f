//! Append-only event log

use parking_lot::Mutex;

use crate::models::{admits, now_timestamp, Event, EventDraft, EventQuery};

struct EventBook {
    next_id: u64,
    events: Vec<Event>,
}

/// Global, append-only record of generated events
///
/// Every generation path (random events, scenarios, load tests, failover) appends
/// here, so ids form one strictly increasing sequence starting at 1.
pub struct EventLog {
    book: Mutex<EventBook>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            book: Mutex::new(EventBook {
                next_id: 1,
                events: Vec::new(),
            }),
        }
    }

    /// Assign the next id and a timestamp, then append
    pub fn append(&self, draft: EventDraft) -> Event {
        let event = {
            let mut book = self.book.lock();
            let event = Event {
                id: book.next_id,
                event_type: draft.event_type,
                target_node: draft.target_node,
                target_type: draft.target_type,
                target_nodes: draft.target_nodes,
                timestamp: now_timestamp(),
                details: draft.details,
            };
            book.next_id += 1;
            book.events.push(event.clone());
            event
        };

        metrics::counter!("oamsim_events_generated_total", "type" => event.event_type.as_str())
            .increment(1);

        event
    }

    /// Events matching every filter that is set, in append order
    ///
    /// The node filter matches `target_node` only, so load-test events (which
    /// carry a node list instead) are excluded by it.
    pub fn get_events(&self, query: &EventQuery) -> Vec<Event> {
        let cutoff = query.time_range.as_ref().map(|r| r.cutoff());

        self.book
            .lock()
            .events
            .iter()
            .filter(|e| query.event_type.map_or(true, |t| e.event_type == t))
            .filter(|e| {
                query
                    .node_id
                    .as_deref()
                    .map_or(true, |id| e.target_node.as_deref() == Some(id))
            })
            .filter(|e| admits(cutoff.as_deref(), &e.timestamp))
            .cloned()
            .collect()
    }

    pub fn get(&self, event_id: u64) -> Option<Event> {
        let book = self.book.lock();
        // ids are dense and start at 1
        let index = usize::try_from(event_id.checked_sub(1)?).ok()?;
        book.events.get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.book.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
