use std::fmt;
use std::str::FromStr;

/// Upstream collections exposed by SWAPI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Films,
    People,
    Planets,
    Species,
    Starships,
    Vehicles,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Films,
        Resource::People,
        Resource::Planets,
        Resource::Species,
        Resource::Starships,
        Resource::Vehicles,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Films => "films",
            Self::People => "people",
            Self::Planets => "planets",
            Self::Species => "species",
            Self::Starships => "starships",
            Self::Vehicles => "vehicles",
        }
    }

    /// List endpoint path relative to the API root, e.g. `/films/`.
    pub fn path(self) -> &'static str {
        match self {
            Self::Films => "/films/",
            Self::People => "/people/",
            Self::Planets => "/planets/",
            Self::Species => "/species/",
            Self::Starships => "/starships/",
            Self::Vehicles => "/vehicles/",
        }
    }

    /// Path of a single item, e.g. `/films/1/`.
    pub fn item_path(self, id: u64) -> String {
        format!("{}{id}/", self.path())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_matches('/');
        Self::ALL
            .into_iter()
            .find(|resource| resource.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown resource '{s}'"))
    }
}
