//! Crawl frontier
//!
//! A FIFO queue of pending URLs paired with a membership set of their
//! canonical forms, so a page is never queued twice while it is still
//! waiting to be fetched.

use crate::url::{normalize_url, CanonicalUrl};
use std::collections::{HashSet, VecDeque};

/// Breadth-first backlog of URLs awaiting a fetch attempt
#[derive(Debug, Default)]
pub struct Frontier {
    /// Pending URLs in discovery order, as first observed
    queue: VecDeque<String>,

    /// Canonical forms of everything currently in `queue`
    members: HashSet<CanonicalUrl>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a URL unless its canonical form is already queued
    ///
    /// # Returns
    ///
    /// `true` if the URL was enqueued
    pub fn push(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if !self.members.insert(normalize_url(&url)) {
            return false;
        }
        self.queue.push_back(url);
        true
    }

    /// Removes the oldest URL and releases its membership
    pub fn pop(&mut self) -> Option<String> {
        let url = self.queue.pop_front()?;
        self.members.remove(&normalize_url(&url));
        Some(url)
    }

    /// Returns true if the canonical form is currently queued
    pub fn contains(&self, canonical: &CanonicalUrl) -> bool {
        self.members.contains(canonical)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Iterates over pending URLs in the order they will be popped
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }
}
