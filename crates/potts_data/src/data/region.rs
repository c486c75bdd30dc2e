use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sub-cellular region tag stored alongside each voxel identity.
///
/// `Undefined` marks voxels that are empty or belong to a cell without
/// regions. `Default` is the bulk of a region-bearing cell; every tag above
/// it is a proper sub-region whose voxels must stay connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
#[repr(u8)]
pub enum Region {
    #[default]
    Undefined = 0,
    Default = 1,
    Nucleus = 2,
}

impl Region {
    pub const COUNT: usize = 3;

    pub const ALL: [Region; Region::COUNT] = [Region::Undefined, Region::Default, Region::Nucleus];

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// True for tags above `Default`.
    #[inline]
    #[must_use]
    pub fn is_sub_region(self) -> bool {
        self > Region::Default
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Region::Undefined => "undefined",
            Region::Default => "default",
            Region::Nucleus => "nucleus",
        }
    }
}

/// Error returned when a region name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRegionError(pub String);

impl fmt::Display for ParseRegionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown region '{}'", self.0)
    }
}

impl std::error::Error for ParseRegionError {}

impl FromStr for Region {
    type Err = ParseRegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "undefined" => Ok(Region::Undefined),
            "default" => Ok(Region::Default),
            "nucleus" => Ok(Region::Nucleus),
            _ => Err(ParseRegionError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Region {
    type Error = ParseRegionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.as_str().to_string()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-size map keyed by [`Region`].
///
/// Backed by one slot per tag, so lookups are a single array index.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionMap<T> {
    slots: [Option<T>; Region::COUNT],
}

impl<T> Default for RegionMap<T> {
    fn default() -> Self {
        Self {
            slots: [None, None, None],
        }
    }
}

impl<T> RegionMap<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, region: Region) -> Option<&T> {
        self.slots[region.index()].as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, region: Region) -> Option<&mut T> {
        self.slots[region.index()].as_mut()
    }

    pub fn insert(&mut self, region: Region, value: T) -> Option<T> {
        self.slots[region.index()].replace(value)
    }

    pub fn remove(&mut self, region: Region) -> Option<T> {
        self.slots[region.index()].take()
    }

    #[must_use]
    pub fn contains(&self, region: Region) -> bool {
        self.slots[region.index()].is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Iterates present entries in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (Region, &T)> {
        Region::ALL
            .iter()
            .zip(self.slots.iter())
            .filter_map(|(r, s)| s.as_ref().map(|v| (*r, v)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Region, &mut T)> {
        Region::ALL
            .iter()
            .zip(self.slots.iter_mut())
            .filter_map(|(r, s)| s.as_mut().map(|v| (*r, v)))
    }

    pub fn keys(&self) -> impl Iterator<Item = Region> + '_ {
        self.iter().map(|(r, _)| r)
    }
}

impl<T> FromIterator<(Region, T)> for RegionMap<T> {
    fn from_iter<I: IntoIterator<Item = (Region, T)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (region, value) in iter {
            map.insert(region, value);
        }
        map
    }
}
