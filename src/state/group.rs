use crate::catalog::{Generation, Group, Member};

use super::settings::GroupSettings;

/// How to fill in groups and generations that a settings record omits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Use the catalog defaults (global mode).
    CatalogDefault,
    /// Treat as disabled (table-scoped mode).
    Disabled,
}

/// Runtime flag for one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationEntry {
    /// Catalog definition.
    pub generation: &'static Generation,
    /// Runtime flag.
    pub enabled: bool,
}

impl GenerationEntry {
    /// Generation name.
    pub fn name(&self) -> &'static str {
        self.generation.name
    }

    /// Catalog member list.
    pub fn members(&self) -> &'static [Member] {
        self.generation.members
    }

    fn contains(&self, fullname: &str) -> bool {
        self.generation.members.iter().any(|m| m.fullname == fullname)
    }
}

/// Runtime enablement for one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupEntry {
    /// Catalog definition.
    pub group: &'static Group,
    /// True iff at least one generation is enabled.
    pub enabled: bool,
    /// Fullnames opted out individually. Never holds duplicates.
    pub disabled_members: Vec<String>,
    /// Generation flags in catalog order.
    pub generations: Vec<GenerationEntry>,
}

impl GroupEntry {
    /// Entry carrying the catalog defaults.
    pub fn from_catalog(group: &'static Group) -> Self {
        Self {
            group,
            enabled: group.enabled,
            disabled_members: Vec::new(),
            generations: group
                .generations
                .iter()
                .map(|generation| GenerationEntry {
                    generation,
                    enabled: generation.enabled,
                })
                .collect(),
        }
    }

    /// Entry built from a stored record, filling gaps per `policy`.
    pub fn from_settings(
        group: &'static Group,
        saved: Option<&GroupSettings>,
        policy: MissingPolicy,
    ) -> Self {
        let Some(saved) = saved else {
            return match policy {
                MissingPolicy::CatalogDefault => Self::from_catalog(group),
                MissingPolicy::Disabled => Self::from_catalog(group).with_enabled(false),
            };
        };

        let mut generations: Vec<GenerationEntry> = group
            .generations
            .iter()
            .map(|generation| {
                let fallback = match policy {
                    MissingPolicy::CatalogDefault => generation.enabled,
                    MissingPolicy::Disabled => false,
                };
                GenerationEntry {
                    generation,
                    enabled: saved
                        .generations
                        .get(generation.name)
                        .copied()
                        .unwrap_or(fallback),
                }
            })
            .collect();

        // An explicitly disabled group keeps no enabled generations.
        if saved.enabled == Some(false) {
            for generation in &mut generations {
                generation.enabled = false;
            }
        }

        let mut disabled_members = Vec::with_capacity(saved.disabled_members.len());
        for name in &saved.disabled_members {
            if !disabled_members.contains(name) {
                disabled_members.push(name.clone());
            }
        }

        let mut entry = Self {
            group,
            enabled: false,
            disabled_members,
            generations,
        };
        entry.recompute();
        entry
    }

    /// Group id.
    pub fn id(&self) -> &'static str {
        self.group.id
    }

    /// Group display name.
    pub fn name(&self) -> &'static str {
        self.group.name
    }

    /// Looks up a generation flag by name.
    pub fn generation(&self, name: &str) -> Option<&GenerationEntry> {
        self.generations.iter().find(|g| g.name() == name)
    }

    /// Enabled generations in catalog order.
    pub fn enabled_generations(&self) -> impl Iterator<Item = &GenerationEntry> {
        self.generations.iter().filter(|g| g.enabled)
    }

    /// False only for individually opted-out members.
    pub fn is_member_enabled(&self, fullname: &str) -> bool {
        !self.disabled_members.iter().any(|n| n == fullname)
    }

    /// Members counted as active: enabled group, enabled generation, not opted out.
    pub fn count_enabled_members(&self) -> usize {
        if !self.enabled {
            return 0;
        }
        self.enabled_generations()
            .flat_map(|g| g.members())
            .filter(|m| self.is_member_enabled(m.fullname))
            .count()
    }

    /// Sets every generation to `enabled` and clears individual opt-outs.
    #[must_use]
    pub fn with_enabled(&self, enabled: bool) -> Self {
        let mut next = self.clone();
        next.disabled_members.clear();
        for generation in &mut next.generations {
            generation.enabled = enabled;
        }
        next.recompute();
        next
    }

    /// Sets one generation flag. Enabling also drops that generation's
    /// members from the opt-out list. Unknown names leave the entry unchanged.
    #[must_use]
    pub fn with_generation_enabled(&self, name: &str, enabled: bool) -> Self {
        let mut next = self.clone();
        let Some(idx) = next.generations.iter().position(|g| g.name() == name) else {
            return next;
        };

        next.generations[idx].enabled = enabled;
        if enabled {
            let generation = next.generations[idx].clone();
            next.disabled_members.retain(|n| !generation.contains(n));
        }
        next.recompute();
        next
    }

    /// Opts one member in or out, then cascades to the generation and group.
    ///
    /// Opting a member back in while its generation is disabled re-enables
    /// the generation with every other member of it opted out, so only this
    /// member becomes active. Unknown members leave the entry unchanged.
    #[must_use]
    pub fn with_member_enabled(&self, fullname: &str, enabled: bool) -> Self {
        let mut next = self.clone();
        let Some(idx) = next.generations.iter().position(|g| g.contains(fullname)) else {
            return next;
        };

        if enabled {
            next.disabled_members.retain(|n| n != fullname);
            if !next.generations[idx].enabled {
                next.generations[idx].enabled = true;
                for member in next.generations[idx].members() {
                    if member.fullname != fullname && next.is_member_enabled(member.fullname) {
                        next.disabled_members.push(member.fullname.to_string());
                    }
                }
            }
        } else if next.is_member_enabled(fullname) {
            next.disabled_members.push(fullname.to_string());
        }

        next.recompute();
        next
    }

    /// Stored form of this entry.
    pub fn to_settings(&self) -> GroupSettings {
        GroupSettings {
            enabled: Some(self.enabled),
            generations: self
                .generations
                .iter()
                .map(|g| (g.name().to_string(), g.enabled))
                .collect(),
            disabled_members: self.disabled_members.clone(),
        }
    }

    // Derived flags: an enabled generation whose members are all opted out
    // turns off and stops listing them; the group follows its generations.
    fn recompute(&mut self) {
        for i in 0..self.generations.len() {
            let generation = &self.generations[i];
            let members = generation.members();
            let all_opted_out = generation.enabled
                && !members.is_empty()
                && members.iter().all(|m| !self.is_member_enabled(m.fullname));
            if all_opted_out {
                self.generations[i].enabled = false;
                self.disabled_members
                    .retain(|n| !members.iter().any(|m| m.fullname == n));
            }
        }
        self.enabled = self.generations.iter().any(|g| g.enabled);
    }
}
