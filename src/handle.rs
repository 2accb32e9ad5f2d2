use std::fmt::{Display, Formatter};

/// Reference to a node of a [`Robdd`][crate::robdd::Robdd].
///
/// Handles are only meaningful for the instance that produced them. `0` and `1` are the
/// terminals; every other handle is a decision node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Handle(u32);

impl Handle {
    /// Terminal false.
    pub const ZERO: Handle = Handle(0);
    /// Terminal true.
    pub const ONE: Handle = Handle(1);

    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn from_bool(value: bool) -> Self {
        if value {
            Self::ONE
        } else {
            Self::ZERO
        }
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_one(self) -> bool {
        self.0 == 1
    }

    pub const fn is_terminal(self) -> bool {
        self.0 <= 1
    }

    /// Value of a terminal handle.
    pub const fn as_bool(self) -> Option<bool> {
        match self.0 {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }
}

impl Display for Handle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0)
    }
}
