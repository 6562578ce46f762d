use std::fmt;

use glam::Mat4;

/// Which of the two tracked controllers an event or pose belongs to.
///
/// Index 0 is the primary controller, index 1 the secondary one. The XR layer
/// maps hands onto these in subaction-path order (left = 0, right = 1).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ControllerIndex {
    Primary,
    Secondary,
}

impl ControllerIndex {
    pub const ALL: [ControllerIndex; 2] = [ControllerIndex::Primary, ControllerIndex::Secondary];

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Primary),
            1 => Some(Self::Secondary),
            _ => None,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
        }
    }
}

impl fmt::Display for ControllerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "controller {}", self.index() + 1)
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum Connectivity {
    #[default]
    Disconnected,
    Connected,
}

/// A tracked hand controller.
///
/// Never destroyed: losing the device only flips `connectivity`. The pose is
/// meaningful only while connected.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Controller {
    index: ControllerIndex,
    connectivity: Connectivity,
    pose: Mat4,
}

impl Controller {
    pub fn new(index: ControllerIndex) -> Self {
        Self {
            index,
            connectivity: Connectivity::Disconnected,
            pose: Mat4::IDENTITY,
        }
    }

    #[inline]
    pub fn index(&self) -> ControllerIndex {
        self.index
    }

    #[inline]
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.connectivity == Connectivity::Connected
    }

    /// Current world transform, or `None` while disconnected.
    pub fn pose(&self) -> Option<Mat4> {
        self.is_connected().then_some(self.pose)
    }
}

/// The controller pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Controllers {
    slots: [Controller; 2],
}

impl Default for Controllers {
    fn default() -> Self {
        Self {
            slots: ControllerIndex::ALL.map(Controller::new),
        }
    }
}

impl Controllers {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, index: ControllerIndex) -> &Controller {
        &self.slots[index.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Controller> {
        self.slots.iter()
    }

    pub fn any_connected(&self) -> bool {
        self.slots.iter().any(Controller::is_connected)
    }

    /// Marks a controller connected. Returns `true` if the state changed.
    pub fn connect(&mut self, index: ControllerIndex) -> bool {
        let slot = &mut self.slots[index.index()];
        let changed = slot.connectivity != Connectivity::Connected;
        slot.connectivity = Connectivity::Connected;
        changed
    }

    /// Marks a controller disconnected and forgets its pose. Returns `true`
    /// if the state changed.
    pub fn disconnect(&mut self, index: ControllerIndex) -> bool {
        let slot = &mut self.slots[index.index()];
        let changed = slot.connectivity != Connectivity::Disconnected;
        slot.connectivity = Connectivity::Disconnected;
        slot.pose = Mat4::IDENTITY;
        changed
    }

    /// Stores the latest polled pose. Ignored while the controller is disconnected.
    pub fn update_pose(&mut self, index: ControllerIndex, pose: Mat4) {
        let slot = &mut self.slots[index.index()];
        if slot.is_connected() {
            slot.pose = pose;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn index_round_trips() {
        for c in ControllerIndex::ALL {
            assert_eq!(ControllerIndex::from_index(c.index()), Some(c));
        }
        assert_eq!(ControllerIndex::from_index(2), None);
    }

    #[test]
    fn starts_disconnected_without_pose() {
        let pair = Controllers::new();
        assert!(!pair.any_connected());
        assert!(pair.get(ControllerIndex::Primary).pose().is_none());
    }

    #[test]
    fn connect_reports_changes_once() {
        let mut pair = Controllers::new();
        assert!(pair.connect(ControllerIndex::Secondary));
        assert!(!pair.connect(ControllerIndex::Secondary));
        assert!(pair.any_connected());
        assert!(!pair.get(ControllerIndex::Primary).is_connected());
    }

    #[test]
    fn pose_updates_only_while_connected() {
        let mut pair = Controllers::new();
        let moved = Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0));

        pair.update_pose(ControllerIndex::Primary, moved);
        pair.connect(ControllerIndex::Primary);
        assert_eq!(pair.get(ControllerIndex::Primary).pose(), Some(Mat4::IDENTITY));

        pair.update_pose(ControllerIndex::Primary, moved);
        assert_eq!(pair.get(ControllerIndex::Primary).pose(), Some(moved));

        assert!(pair.disconnect(ControllerIndex::Primary));
        assert!(pair.get(ControllerIndex::Primary).pose().is_none());

        pair.connect(ControllerIndex::Primary);
        assert_eq!(pair.get(ControllerIndex::Primary).pose(), Some(Mat4::IDENTITY));
    }

    #[test]
    fn display_is_one_based() {
        assert_eq!(ControllerIndex::Primary.to_string(), "controller 1");
    }
}
