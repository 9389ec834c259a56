//! Breadth-first traversal frontier with route admission.
//!
//! Owned by the traversal controller for one run and never persisted: a
//! restart re-traverses from the seeds.

use std::collections::{HashSet, VecDeque};

use crate::route::{host_in_domain, is_numeric_id_route, Route};

/// Outcome of offering a route to the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    /// Host is outside the allowed domain.
    OffDomain,
    /// Route matches `/0/<digits>` while numeric-ID skipping is on.
    NumericId,
    Visited,
    AlreadyQueued,
}

impl Admission {
    pub fn is_accepted(self) -> bool {
        self == Admission::Accepted
    }
}

/// Rules deciding whether a discovered route may enter the frontier.
#[derive(Debug, Clone)]
pub struct AdmissionPolicy {
    pub allowed_domain: String,
    pub skip_numeric_ids: bool,
}

impl AdmissionPolicy {
    pub fn new(allowed_domain: impl Into<String>, skip_numeric_ids: bool) -> Self {
        Self {
            allowed_domain: allowed_domain.into(),
            skip_numeric_ids,
        }
    }

    /// Domain and numeric-ID checks; visited/queued state is the frontier's job.
    pub fn check(&self, route: &Route) -> Admission {
        match route.host() {
            Some(host) if host_in_domain(&host, &self.allowed_domain) => {}
            _ => return Admission::OffDomain,
        }
        if self.skip_numeric_ids && is_numeric_id_route(route) {
            return Admission::NumericId;
        }
        Admission::Accepted
    }
}

/// FIFO queue of pending routes plus the visited set.
///
/// A route is queued at most once and visited at most once; enqueueing a
/// visited or queued route is a no-op.
#[derive(Debug)]
pub struct Frontier {
    policy: AdmissionPolicy,
    queue: VecDeque<Route>,
    queued: HashSet<Route>,
    visited: HashSet<Route>,
}

impl Frontier {
    pub fn new(policy: AdmissionPolicy) -> Self {
        Self {
            policy,
            queue: VecDeque::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
        }
    }

    /// Applies the admission policy in order (domain, numeric ID, visited,
    /// queued) and appends the route on acceptance.
    pub fn enqueue_if_admissible(&mut self, route: Route) -> Admission {
        let verdict = self.policy.check(&route);
        if !verdict.is_accepted() {
            return verdict;
        }
        if self.visited.contains(&route) {
            return Admission::Visited;
        }
        if self.queued.contains(&route) {
            return Admission::AlreadyQueued;
        }
        self.queued.insert(route.clone());
        self.queue.push_back(route);
        Admission::Accepted
    }

    /// Next route in breadth-first order.
    pub fn pop_next(&mut self) -> Option<Route> {
        let route = self.queue.pop_front()?;
        self.queued.remove(&route);
        Some(route)
    }

    /// Returns false if the route was already visited.
    pub fn mark_visited(&mut self, route: &Route) -> bool {
        self.visited.insert(route.clone())
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
