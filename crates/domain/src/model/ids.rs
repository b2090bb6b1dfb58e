//! Identifier handles and positions

use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub fn new(id: u32) -> Self {
                Self(id)
            }

            pub fn get(&self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Mission-wide group id (`groupId`)
    GroupId
);
id_type!(
    /// Mission-wide unit id (`unitId`)
    UnitId
);
id_type!(
    /// Mission-wide trigger zone id (`zoneId`)
    ZoneId
);

/// Map position in simulator coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(GroupId::new(12).to_string(), "12");
        assert_eq!(UnitId::new(3).get(), 3);
        assert!(ZoneId::new(1) < ZoneId::new(2));
    }
}
