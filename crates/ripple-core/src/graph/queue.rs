//! Intrusive FIFO of ready nodes.
//!
//! The queue stores only head/tail indices; the per-node `prev`/`next` links
//! live in the node arena. Every operation is O(1) and allocation-free, and a
//! node is in the queue at most once. Debug builds re-walk the list after each
//! change to check it against `len`.

use super::node::{NodeData, QueueLink};

#[derive(Debug, Default)]
pub(crate) struct ReadyQueue {
    head: Option<u32>,
    tail: Option<u32>,
    len: usize,
}

fn link_mut(nodes: &mut [Option<NodeData>], idx: u32) -> Option<&mut QueueLink> {
    nodes
        .get_mut(idx as usize)
        .and_then(|n| n.as_mut())
        .map(|n| &mut n.link)
}

impl ReadyQueue {
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn contains(nodes: &[Option<NodeData>], idx: u32) -> bool {
        nodes
            .get(idx as usize)
            .and_then(|n| n.as_ref())
            .is_some_and(|n| n.link.queued)
    }

    /// Appends `idx` at the tail. Returns `false` if it was already queued.
    pub fn push_back(&mut self, nodes: &mut [Option<NodeData>], idx: u32) -> bool {
        let tail = self.tail;
        let Some(link) = link_mut(nodes, idx) else {
            return false;
        };
        if link.queued {
            return false;
        }
        link.queued = true;
        link.prev = tail;
        link.next = None;

        match tail {
            Some(t) => {
                if let Some(tail_link) = link_mut(nodes, t) {
                    tail_link.next = Some(idx);
                }
            }
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        self.len += 1;
        debug_assert!(self.is_consistent(nodes), "ready queue corrupted by push of {idx}");
        true
    }

    /// Detaches and returns the head node.
    pub fn pop_front(&mut self, nodes: &mut [Option<NodeData>]) -> Option<u32> {
        let head = self.head?;
        self.remove(nodes, head);
        Some(head)
    }

    /// Unlinks `idx` from anywhere in the queue. Returns `false` if it was not queued.
    pub fn remove(&mut self, nodes: &mut [Option<NodeData>], idx: u32) -> bool {
        let Some(link) = link_mut(nodes, idx) else {
            return false;
        };
        if !link.queued {
            return false;
        }
        let QueueLink { prev, next, .. } = *link;
        *link = QueueLink::default();

        match prev {
            Some(p) => {
                if let Some(prev_link) = link_mut(nodes, p) {
                    prev_link.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(next_link) = link_mut(nodes, n) {
                    next_link.prev = prev;
                }
            }
            None => self.tail = prev,
        }
        self.len -= 1;
        debug_assert!(self.is_consistent(nodes), "ready queue corrupted by removal of {idx}");
        true
    }

    /// Empties the queue, clearing every member's links.
    pub fn clear(&mut self, nodes: &mut [Option<NodeData>]) {
        while self.pop_front(nodes).is_some() {}
    }

    /// Walks the list from the head: `len` members, each queued, with
    /// `prev` links mirroring `next` and the last one at `tail`.
    fn is_consistent(&self, nodes: &[Option<NodeData>]) -> bool {
        let link = |idx: u32| {
            nodes
                .get(idx as usize)
                .and_then(|n| n.as_ref())
                .map(|n| n.link)
        };
        let mut count = 0;
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let Some(current) = link(idx) else {
                return false;
            };
            // More members than `len` means a cycle or a stale count.
            if !current.queued || current.prev != prev || count == self.len {
                return false;
            }
            count += 1;
            prev = Some(idx);
            cursor = current.next;
        }
        count == self.len && prev == self.tail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{FnProcessor, ProcessStatus};

    #[cfg(not(feature = "std"))]
    use alloc::{boxed::Box, vec::Vec};

    fn arena(n: usize) -> Vec<Option<NodeData>> {
        (0..n)
            .map(|_| {
                Some(NodeData::new(Box::new(FnProcessor::new(
                    |_io| Ok(ProcessStatus::NeedMoreInput),
                    |_io| Ok(ProcessStatus::NeedMoreInput),
                ))))
            })
            .collect()
    }

    #[test]
    fn fifo_order() {
        let mut nodes = arena(3);
        let mut queue = ReadyQueue::new();
        assert!(queue.push_back(&mut nodes, 2));
        assert!(queue.push_back(&mut nodes, 0));
        assert!(queue.push_back(&mut nodes, 1));
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.pop_front(&mut nodes), Some(2));
        assert_eq!(queue.pop_front(&mut nodes), Some(0));
        assert_eq!(queue.pop_front(&mut nodes), Some(1));
        assert_eq!(queue.pop_front(&mut nodes), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn double_insert_is_ignored() {
        let mut nodes = arena(2);
        let mut queue = ReadyQueue::new();
        assert!(queue.push_back(&mut nodes, 1));
        assert!(!queue.push_back(&mut nodes, 1));
        assert_eq!(queue.len(), 1);
        assert!(ReadyQueue::contains(&nodes, 1));
        assert!(!ReadyQueue::contains(&nodes, 0));
    }

    #[test]
    fn remove_from_middle() {
        let mut nodes = arena(3);
        let mut queue = ReadyQueue::new();
        queue.push_back(&mut nodes, 0);
        queue.push_back(&mut nodes, 1);
        queue.push_back(&mut nodes, 2);

        assert!(queue.remove(&mut nodes, 1));
        assert!(!queue.remove(&mut nodes, 1));
        assert!(!ReadyQueue::contains(&nodes, 1));

        assert_eq!(queue.pop_front(&mut nodes), Some(0));
        assert_eq!(queue.pop_front(&mut nodes), Some(2));
        assert!(queue.is_empty());
    }

    #[test]
    fn len_tracks_links_through_churn() {
        let mut nodes = arena(4);
        let mut queue = ReadyQueue::new();
        for i in 0..4 {
            queue.push_back(&mut nodes, i);
        }
        queue.remove(&mut nodes, 0);
        queue.remove(&mut nodes, 2);
        queue.push_back(&mut nodes, 0);
        assert!(!queue.remove(&mut nodes, 2));

        assert_eq!(queue.len(), 3);
        assert!(queue.is_consistent(&nodes));
        assert_eq!(queue.pop_front(&mut nodes), Some(1));
        assert_eq!(queue.pop_front(&mut nodes), Some(3));
        assert_eq!(queue.pop_front(&mut nodes), Some(0));
        assert_eq!(queue.len(), 0);
        assert!(queue.is_consistent(&nodes));
    }

    #[test]
    fn stale_len_is_detected() {
        let mut nodes = arena(2);
        let mut queue = ReadyQueue::new();
        queue.push_back(&mut nodes, 0);
        queue.push_back(&mut nodes, 1);
        queue.len = 1;
        assert!(!queue.is_consistent(&nodes));
    }

    #[test]
    fn remove_tail_then_append() {
        let mut nodes = arena(3);
        let mut queue = ReadyQueue::new();
        queue.push_back(&mut nodes, 0);
        queue.push_back(&mut nodes, 1);
        queue.remove(&mut nodes, 1);
        queue.push_back(&mut nodes, 2);

        assert_eq!(queue.pop_front(&mut nodes), Some(0));
        assert_eq!(queue.pop_front(&mut nodes), Some(2));
    }

    #[test]
    fn clear_resets_membership() {
        let mut nodes = arena(3);
        let mut queue = ReadyQueue::new();
        for i in 0..3 {
            queue.push_back(&mut nodes, i);
        }
        queue.clear(&mut nodes);
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert!((0..3).all(|i| !ReadyQueue::contains(&nodes, i)));
    }
}
