//! Known institutional palettes and the reverse lookup from color to owner.
//!
//! The registry is built once from a static table and never mutated. Each of
//! the three roles gets its own color -> institution index; when two entries
//! share a color in the same role, the entry registered last owns it.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::color::Color;

/// One of the three brand-color slots an institution defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Primary,
    Secondary,
    Accent,
}

impl Role {
    /// All roles, in lookup order.
    pub const ALL: [Role; 3] = [Role::Primary, Role::Secondary, Role::Accent];

    pub fn label(self) -> &'static str {
        match self {
            Role::Primary => "Primary",
            Role::Secondary => "Secondary",
            Role::Accent => "Accent",
        }
    }

    fn index(self) -> usize {
        match self {
            Role::Primary => 0,
            Role::Secondary => 1,
            Role::Accent => 2,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stable registry key, e.g. `lapc`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstitutionId(String);

impl InstitutionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstitutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstitutionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A row of the static palette table, before validation.
#[derive(Debug, Clone, Copy)]
pub struct PaletteEntry {
    pub id: &'static str,
    pub display_name: &'static str,
    pub full_name: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
}

impl PaletteEntry {
    fn raw(&self, role: Role) -> &'static str {
        match role {
            Role::Primary => self.primary,
            Role::Secondary => self.secondary,
            Role::Accent => self.accent,
        }
    }
}

/// Los Angeles Community College District and its nine colleges.
pub const LACCD_PALETTES: &[PaletteEntry] = &[
    PaletteEntry {
        id: "laccd",
        display_name: "LACCD (District)",
        full_name: "Los Angeles Community College District",
        primary: "#005a95",
        secondary: "#00345f",
        accent: "#bb9e6d",
    },
    PaletteEntry {
        id: "elac",
        display_name: "ELAC (East LA)",
        full_name: "East Los Angeles College",
        primary: "#447D29",
        secondary: "#33511D",
        accent: "#FDB913",
    },
    PaletteEntry {
        id: "lacc",
        display_name: "LACC (LA City)",
        full_name: "Los Angeles City College",
        primary: "#C13C40",
        secondary: "#305589",
        accent: "#112844",
    },
    PaletteEntry {
        id: "lahc",
        display_name: "LAHC (LA Harbor)",
        full_name: "Los Angeles Harbor College",
        primary: "#5F7FE2",
        secondary: "#002663",
        accent: "#FFC72C",
    },
    PaletteEntry {
        id: "lamc",
        display_name: "LAMC (LA Mission)",
        full_name: "Los Angeles Mission College",
        primary: "#004590",
        secondary: "#FF611A",
        accent: "#718089",
    },
    PaletteEntry {
        id: "lapc",
        display_name: "LAPC (LA Pierce)",
        full_name: "Los Angeles Pierce College",
        primary: "#BF2116",
        secondary: "#1F1F1F",
        accent: "#FFFFFF",
    },
    PaletteEntry {
        id: "lasc",
        display_name: "LASC (LA Southwest)",
        full_name: "Los Angeles Southwest College",
        primary: "#C5B358",
        secondary: "#000000",
        accent: "#FFFFFF",
    },
    PaletteEntry {
        id: "lattc",
        display_name: "LATTC (LA Trade-Tech)",
        full_name: "Los Angeles Trade-Technical College",
        primary: "#562c82",
        secondary: "#1c1c1c",
        accent: "#aea4eb",
    },
    PaletteEntry {
        id: "lavc",
        display_name: "LAVC (LA Valley)",
        full_name: "Los Angeles Valley College",
        primary: "#00593F",
        secondary: "#FFC72C",
        accent: "#FFFFFF",
    },
    PaletteEntry {
        id: "wlac",
        display_name: "WLAC (West LA)",
        full_name: "West Los Angeles College",
        primary: "#4169E1",
        secondary: "#003594",
        accent: "#FFD700",
    },
];

/// The institution preselected when no target is configured.
const DEFAULT_TARGET: &str = "lapc";

/// A validated institution record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Institution {
    pub id: InstitutionId,
    pub display_name: String,
    pub full_name: String,
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
}

impl Institution {
    pub fn color(&self, role: Role) -> Color {
        match role {
            Role::Primary => self.primary,
            Role::Secondary => self.secondary,
            Role::Accent => self.accent,
        }
    }

    /// Whether `color` is any of this institution's three role colors.
    pub fn owns(&self, color: Color) -> bool {
        Role::ALL.iter().any(|&role| self.color(role) == color)
    }

    /// Short code, the first word of the display name (`LAPC`).
    pub fn short_name(&self) -> &str {
        self.display_name
            .split_whitespace()
            .next()
            .unwrap_or(&self.display_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("palette table is empty")]
    Empty,
    #[error("palette entry {id:?} has invalid {role} color {value:?}")]
    MalformedPaletteTable {
        id: String,
        role: Role,
        value: String,
    },
    #[error("palette entry {0:?} is declared more than once")]
    DuplicateId(String),
    #[error("unknown institution {0:?}")]
    NotFound(String),
}

/// Immutable palette table plus per-role reverse indices.
#[derive(Debug, Clone)]
pub struct PaletteRegistry {
    institutions: Vec<Institution>,
    by_id: HashMap<InstitutionId, usize>,
    by_role: [HashMap<Color, usize>; 3],
}

impl PaletteRegistry {
    /// Validate `table` and build the reverse indices in one pass.
    pub fn new(table: &[PaletteEntry]) -> Result<Self, RegistryError> {
        if table.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut institutions = Vec::with_capacity(table.len());
        let mut by_id = HashMap::with_capacity(table.len());
        let mut by_role: [HashMap<Color, usize>; 3] = Default::default();

        for (index, entry) in table.iter().enumerate() {
            let id = InstitutionId::new(entry.id);
            if by_id.insert(id.clone(), index).is_some() {
                return Err(RegistryError::DuplicateId(entry.id.to_string()));
            }

            let mut colors = [Color::new(0, 0, 0); 3];
            for role in Role::ALL {
                let raw = entry.raw(role);
                let color =
                    Color::from_hex(raw).map_err(|_| RegistryError::MalformedPaletteTable {
                        id: entry.id.to_string(),
                        role,
                        value: raw.to_string(),
                    })?;
                colors[role.index()] = color;
                // Later entries overwrite earlier ones that share the color.
                by_role[role.index()].insert(color, index);
            }

            institutions.push(Institution {
                id,
                display_name: entry.display_name.to_string(),
                full_name: entry.full_name.to_string(),
                primary: colors[0],
                secondary: colors[1],
                accent: colors[2],
            });
        }

        Ok(Self {
            institutions,
            by_id,
            by_role,
        })
    }

    /// The shipped LACCD table.
    pub fn laccd() -> Result<Self, RegistryError> {
        Self::new(LACCD_PALETTES)
    }

    /// Classify `color`: primary index first, then secondary, then accent.
    pub fn lookup_role(&self, color: Color) -> Option<(&Institution, Role)> {
        Role::ALL.iter().find_map(|&role| {
            self.by_role[role.index()]
                .get(&color)
                .map(|&index| (&self.institutions[index], role))
        })
    }

    pub fn palette_of(&self, id: &InstitutionId) -> Result<&Institution, RegistryError> {
        self.get(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    pub fn get(&self, id: &InstitutionId) -> Option<&Institution> {
        self.by_id.get(id).map(|&index| &self.institutions[index])
    }

    /// Institution ids in table order.
    pub fn all_institutions(&self) -> impl Iterator<Item = &InstitutionId> + '_ {
        self.institutions.iter().map(|inst| &inst.id)
    }

    pub fn institutions(&self) -> &[Institution] {
        &self.institutions
    }

    /// Find an institution by id, short code, display name or full name,
    /// ignoring case.
    pub fn resolve(&self, name: &str) -> Result<&Institution, RegistryError> {
        let name = name.trim();
        self.institutions
            .iter()
            .find(|inst| {
                inst.id.as_str().eq_ignore_ascii_case(name)
                    || inst.short_name().eq_ignore_ascii_case(name)
                    || inst.display_name.eq_ignore_ascii_case(name)
                    || inst.full_name.eq_ignore_ascii_case(name)
            })
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// The configured default target, falling back to the first entry.
    pub fn default_target(&self) -> &Institution {
        self.get(&InstitutionId::new(DEFAULT_TARGET))
            .unwrap_or(&self.institutions[0])
    }

    /// Every color registered under any role.
    pub fn known_colors(&self) -> BTreeSet<String> {
        self.by_role
            .iter()
            .flat_map(|index| index.keys())
            .map(|color| color.to_hex())
            .collect()
    }
}
