//! Registration order for resource routes.
//!
//! A first-match router hands a request to whichever overlapping pattern was
//! registered first, so a resource must register `/count` before `/:postId`,
//! and `/:postId` before `/`. [`Specificity`] captures how specific a pattern
//! is and [`order_by_specificity`] stable-sorts a set of routes by it, most
//! specific first. Routes of equal specificity keep their declaration order.

use std::cmp::{Ordering, Reverse};

use crate::router::parse_segments;

/// How specific a path pattern is.
///
/// Patterns compare by the number of literal segments before the first
/// parameter (more is more specific), then by total segment count (more is
/// more specific). A smaller `Specificity` sorts first.
///
/// # Example
///
/// ```rust
/// use resourceful_router::Specificity;
///
/// let count = Specificity::of("/count");
/// let by_id = Specificity::of("/:id");
/// let root = Specificity::of("/");
///
/// assert!(count < by_id);
/// assert!(by_id < root);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Specificity {
    static_prefix: usize,
    segments: usize,
}

impl Specificity {
    /// Computes the specificity of a path pattern.
    #[must_use]
    pub fn of(pattern: &str) -> Self {
        let segments = parse_segments(pattern);
        let static_prefix = segments
            .iter()
            .position(|s| s.is_param())
            .unwrap_or(segments.len());
        Self {
            static_prefix,
            segments: segments.len(),
        }
    }

    /// Number of literal segments before the first parameter.
    #[must_use]
    pub const fn static_prefix(&self) -> usize {
        self.static_prefix
    }

    /// Total number of segments.
    #[must_use]
    pub const fn segments(&self) -> usize {
        self.segments
    }

    fn key(self) -> (Reverse<usize>, Reverse<usize>) {
        (Reverse(self.static_prefix), Reverse(self.segments))
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Stable-sorts `items` so the most specific path pattern comes first.
///
/// # Example
///
/// ```rust
/// use resourceful_router::order_by_specificity;
///
/// let mut paths = vec!["/", "/:postId", "/count", "/one"];
/// order_by_specificity(&mut paths, |p| *p);
/// assert_eq!(paths, vec!["/count", "/one", "/:postId", "/"]);
/// ```
pub fn order_by_specificity<T, F>(items: &mut [T], path: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by_cached_key(|item| Specificity::of(path(item)));
}
