use std::hash::Hash;

use indexmap::IndexSet;
use serde::Serialize;

use crate::marker::{JoinState, MarkerCommand};
use crate::point::PointKey;

/// Keyed difference between two frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedJoin<K: Hash + Eq> {
    pub enter: IndexSet<K>,
    pub update: IndexSet<K>,
    pub exit: IndexSet<K>,
}

impl<K: Hash + Eq + Clone> KeyedJoin<K> {
    /// Match `next` against `previous` by key. Entering and updating keys keep
    /// the order of `next`; exiting keys keep the order of `previous`.
    pub fn diff(previous: &IndexSet<K>, next: &IndexSet<K>) -> Self {
        let (update, enter): (IndexSet<K>, IndexSet<K>) =
            next.iter().cloned().partition(|k| previous.contains(k));
        let exit = previous
            .iter()
            .filter(|k| !next.contains(*k))
            .cloned()
            .collect();
        Self {
            enter,
            update,
            exit,
        }
    }
}

/// Markers of one render pass, tagged against the pass before it
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkerFrame {
    /// Draw order
    pub markers: Vec<MarkerCommand>,
    /// Keys drawn last pass and absent from this one, to be removed
    pub exiting: Vec<PointKey>,
}

impl MarkerFrame {
    /// Tag each marker as entering or updating. Only updating markers
    /// transition; new ones appear in place.
    pub fn join(previous: &IndexSet<PointKey>, mut markers: Vec<MarkerCommand>, duration: f64) -> Self {
        let next: IndexSet<PointKey> = markers.iter().map(|m| m.key.clone()).collect();
        let join = KeyedJoin::diff(previous, &next);
        for marker in markers.iter_mut() {
            if join.update.contains(&marker.key) {
                marker.state = JoinState::Update;
                marker.duration = duration;
            } else {
                marker.state = JoinState::Enter;
                marker.duration = 0.0;
            }
        }
        Self {
            markers,
            exiting: join.exit.into_iter().collect(),
        }
    }

    pub fn keys(&self) -> IndexSet<PointKey> {
        self.markers.iter().map(|m| m.key.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::{MarkerGeometry, MarkerTransform};

    fn key(category: &str) -> PointKey {
        PointKey {
            category: category.to_string(),
            series: String::new(),
            occurrence: 0,
        }
    }

    fn marker(category: &str) -> MarkerCommand {
        MarkerCommand {
            key: key(category),
            geometry: MarkerGeometry::Path { d: String::new() },
            transform: MarkerTransform {
                translate: (0.0, 0.0),
                rotate: 0.0,
                origin: (0.0, 0.0),
            },
            fill: None,
            stroke: "#000000".to_string(),
            stroke_width: 1.0,
            opacity: 0.85,
            radius: 6.0,
            state: JoinState::Enter,
            duration: 0.0,
        }
    }

    #[test]
    fn test_diff() {
        let previous: IndexSet<&str> = ["a", "b", "c"].into_iter().collect();
        let next: IndexSet<&str> = ["d", "c", "a"].into_iter().collect();
        let join = KeyedJoin::diff(&previous, &next);
        assert_eq!(join.enter.into_iter().collect::<Vec<_>>(), vec!["d"]);
        assert_eq!(join.update.into_iter().collect::<Vec<_>>(), vec!["c", "a"]);
        assert_eq!(join.exit.into_iter().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_first_frame_enters_everything() {
        let frame = MarkerFrame::join(&IndexSet::new(), vec![marker("a"), marker("b")], 250.0);
        assert!(frame.markers.iter().all(|m| m.state == JoinState::Enter));
        assert!(frame.markers.iter().all(|m| m.duration == 0.0));
        assert!(frame.exiting.is_empty());
    }

    #[test]
    fn test_frame_join() {
        let previous: IndexSet<PointKey> = [key("a"), key("b")].into_iter().collect();
        let frame = MarkerFrame::join(&previous, vec![marker("b"), marker("c")], 250.0);

        assert_eq!(frame.markers[0].state, JoinState::Update);
        assert_eq!(frame.markers[0].duration, 250.0);
        assert_eq!(frame.markers[1].state, JoinState::Enter);
        assert_eq!(frame.markers[1].duration, 0.0);
        assert_eq!(frame.exiting, vec![key("a")]);
        assert_eq!(frame.keys().into_iter().collect::<Vec<_>>(), vec![key("b"), key("c")]);
    }
}
