//! Hex color detection and remapping.
//!
//! Every `#rrggbb` token in the input is classified independently against the
//! [`PaletteRegistry`] and either kept or swapped for the target institution's
//! color. Tokens are visited left to right, which fixes the order of the
//! returned change log.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::Color;
use crate::registry::{Institution, InstitutionId, PaletteRegistry, Role};

/// Six hex digits after a `#`. No word boundary: `#1234567` matches `#123456`.
static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[0-9a-fA-F]{6}").expect("hex color pattern compiles"));

/// How aggressively colors are remapped.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Only remap colors that belong to some registered institution.
    #[default]
    KnownOnly,
    /// Remap every color the target does not own to the target's primary.
    ReplaceAll,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    #[error("unknown target institution {0:?}")]
    UnknownTargetInstitution(InstitutionId),
}

/// What a substitution was based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A registered color mapped role-for-role.
    Role(Role),
    /// Any other color forced to the target's primary.
    Generic,
}

/// The institution a replaced color was recognized as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub id: InstitutionId,
    pub display_name: String,
}

/// One substitution performed by [`Rewriter::rewrite`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub kind: ChangeKind,
    pub old: Color,
    pub source: Option<Owner>,
    pub new: Color,
}

impl fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, &self.source) {
            (ChangeKind::Role(role), Some(owner)) => write!(
                f,
                "{role}: {} ({}) -> {}",
                self.old, owner.display_name, self.new
            ),
            (ChangeKind::Role(role), None) => write!(f, "{role}: {} -> {}", self.old, self.new),
            (ChangeKind::Generic, _) => write!(f, "Color: {} -> {}", self.old, self.new),
        }
    }
}

/// Ordered substitutions, in scan order.
pub type ChangeLog = Vec<ChangeRecord>;

/// Rewritten text plus the substitutions that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub changes: ChangeLog,
}

impl Rewrite {
    pub fn is_changed(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// How a color token relates to the registry and the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenClass {
    /// Already one of the target's colors.
    Target(Role),
    /// Registered to another institution.
    Foreign { owner: InstitutionId, role: Role },
    /// Not in the registry.
    Unknown,
}

/// A color token found by [`Rewriter::scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorToken {
    /// Byte offset of the `#`.
    pub offset: usize,
    pub color: Color,
    pub class: TokenClass,
}

/// Stateless rewriter over a shared, read-only registry.
#[derive(Debug, Clone, Copy)]
pub struct Rewriter<'r> {
    registry: &'r PaletteRegistry,
}

impl<'r> Rewriter<'r> {
    pub fn new(registry: &'r PaletteRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r PaletteRegistry {
        self.registry
    }

    /// Rewrite every color token in `text` toward `target`'s palette.
    pub fn rewrite(
        &self,
        text: &str,
        target: &InstitutionId,
        mode: Mode,
    ) -> Result<Rewrite, RewriteError> {
        let target = self.target(target)?;
        Ok(self.rewrite_to(text, target, mode))
    }

    /// [`Rewriter::rewrite`] for an already resolved target.
    pub fn rewrite_to(&self, text: &str, target: &Institution, mode: Mode) -> Rewrite {
        let mut changes = ChangeLog::new();

        let rewritten = HEX_COLOR.replace_all(text, |caps: &Captures| {
            let token = &caps[0];
            match self.decide(token, target, mode) {
                Some(record) => {
                    let replacement = record.new.to_hex();
                    changes.push(record);
                    replacement
                }
                None => token.to_string(),
            }
        });

        Rewrite {
            text: rewritten.into_owned(),
            changes,
        }
    }

    /// Classify every color token in `text` without rewriting anything.
    pub fn scan(&self, text: &str, target: &InstitutionId) -> Result<Vec<ColorToken>, RewriteError> {
        let target = self.target(target)?;
        Ok(HEX_COLOR
            .find_iter(text)
            .filter_map(|m| {
                let color = Color::from_hex(m.as_str()).ok()?;
                Some(ColorToken {
                    offset: m.start(),
                    color,
                    class: self.classify(color, target),
                })
            })
            .collect())
    }

    /// Resolve a target id against the registry.
    pub fn target(&self, id: &InstitutionId) -> Result<&'r Institution, RewriteError> {
        self.registry
            .get(id)
            .ok_or_else(|| RewriteError::UnknownTargetInstitution(id.clone()))
    }

    fn classify(&self, color: Color, target: &Institution) -> TokenClass {
        if let Some(role) = Role::ALL.into_iter().find(|&role| target.color(role) == color) {
            return TokenClass::Target(role);
        }
        match self.registry.lookup_role(color) {
            Some((owner, role)) => TokenClass::Foreign {
                owner: owner.id.clone(),
                role,
            },
            None => TokenClass::Unknown,
        }
    }

    fn decide(&self, token: &str, target: &Institution, mode: Mode) -> Option<ChangeRecord> {
        let old = Color::from_hex(token).ok()?;
        if target.owns(old) {
            return None;
        }

        if mode == Mode::ReplaceAll {
            debug!(%old, new = %target.primary, "forcing color to target primary");
            return Some(ChangeRecord {
                kind: ChangeKind::Generic,
                old,
                source: None,
                new: target.primary,
            });
        }

        let (owner, role) = self.registry.lookup_role(old)?;
        if owner.id == target.id {
            return None;
        }
        let new = target.color(role);
        debug!(%old, %new, %role, source = %owner.id, "remapping registered color");
        Some(ChangeRecord {
            kind: ChangeKind::Role(role),
            old,
            source: Some(Owner {
                id: owner.id.clone(),
                display_name: owner.display_name.clone(),
            }),
            new,
        })
    }
}
