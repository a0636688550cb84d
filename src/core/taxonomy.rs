//! Category taxonomy and section classification.
//!
//! Static categories are compiled in, grouped under named parents. Custom
//! categories are created by the user and bound to a section at creation.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

pub type CategoryId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Fixed,
    Variable,
    Loans,
    Allocations,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Fixed,
        Section::Variable,
        Section::Loans,
        Section::Allocations,
    ];

    /// Consumption sections reduce spendable cash and count toward spend.
    pub fn is_consumption(&self) -> bool {
        !matches!(self, Section::Allocations)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Fixed => "fixed",
            Section::Variable => "variable",
            Section::Loans => "loans",
            Section::Allocations => "allocations",
        }
    }
}

impl Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(Section::Fixed),
            "variable" => Ok(Section::Variable),
            "loans" => Ok(Section::Loans),
            "allocations" => Ok(Section::Allocations),
            _ => Err(anyhow!("Invalid section: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub section: Section,
    #[serde(default)]
    pub parent_name: String,
}

impl Category {
    pub fn is_custom(&self) -> bool {
        is_custom_id(&self.id)
    }

    /// Parent and leaf name, as shown in listings.
    pub fn label(&self) -> String {
        if self.parent_name.is_empty() {
            self.name.clone()
        } else {
            format!("{} — {}", self.parent_name, self.name)
        }
    }
}

pub const CUSTOM_PREFIX: &str = "custom:";

pub fn is_custom_id(id: &str) -> bool {
    id.starts_with(CUSTOM_PREFIX)
}

pub struct Leaf {
    pub id: &'static str,
    pub name: &'static str,
    /// Allocations only: the transfer leaves the user's cash (e.g. investing).
    pub affects_cash: bool,
}

pub struct Group {
    pub id: &'static str,
    pub name: &'static str,
    pub section: Section,
    pub leaves: &'static [Leaf],
}

const fn leaf(id: &'static str, name: &'static str) -> Leaf {
    Leaf {
        id,
        name,
        affects_cash: false,
    }
}

static GROUPS: &[Group] = &[
    Group {
        id: "housing",
        name: "Housing",
        section: Section::Fixed,
        leaves: &[leaf("housing:mortgage_rent", "Mortgage/Rent")],
    },
    Group {
        id: "utilities",
        name: "Utilities",
        section: Section::Fixed,
        leaves: &[
            leaf("utilities:energy", "Electricity/Gas"),
            leaf("utilities:water", "Water"),
            leaf("utilities:internet", "Internet"),
            leaf("utilities:mobile", "Mobile"),
        ],
    },
    Group {
        id: "insurance",
        name: "Insurance",
        section: Section::Fixed,
        leaves: &[
            leaf("insurance:health", "Health insurance"),
            leaf("insurance:car", "Car insurance"),
            leaf("insurance:home", "Home insurance"),
            leaf("insurance:life", "Life insurance"),
            leaf("insurance:liability", "Liability insurance"),
        ],
    },
    Group {
        id: "subscriptions",
        name: "Subscriptions",
        section: Section::Fixed,
        leaves: &[
            leaf("subscriptions:streaming", "Streaming"),
            leaf("subscriptions:cloud", "Cloud storage"),
            leaf("subscriptions:security", "Home security"),
        ],
    },
    Group {
        id: "bank",
        name: "Banking",
        section: Section::Fixed,
        leaves: &[leaf("bank:fees", "Banking fees")],
    },
    Group {
        id: "devices",
        name: "Devices",
        section: Section::Fixed,
        leaves: &[leaf("devices:payments", "Device payments")],
    },
    Group {
        id: "living",
        name: "Living Expenses",
        section: Section::Variable,
        leaves: &[
            leaf("living:groceries", "Groceries"),
            leaf("living:transport", "Transport"),
            leaf("living:dining", "Dining out"),
            leaf("living:health_personal", "Health & personal"),
            leaf("living:entertainment", "Entertainment & shopping"),
        ],
    },
    Group {
        id: "special",
        name: "Special",
        section: Section::Variable,
        leaves: &[leaf("special:unexpected", "Yearly/Unexpected fund")],
    },
    Group {
        id: "loans",
        name: "Loans",
        section: Section::Loans,
        leaves: &[
            leaf("loans:car", "Car loan/lease"),
            leaf("loans:personal", "Personal loan"),
            leaf("loans:other", "Other loan"),
        ],
    },
    Group {
        id: "allocations",
        name: "Allocations",
        section: Section::Allocations,
        leaves: &[
            Leaf {
                id: "allocations:investment",
                name: "Investments",
                affects_cash: true,
            },
            leaf("allocations:emergency", "Emergency fund"),
            leaf("allocations:savings", "Savings transfer"),
        ],
    },
];

/// Ids that used to be static leaves and may still appear in old records,
/// with whether their group was a variable expense.
static RETIRED_LEAVES: &[(&str, bool)] = &[("special:investments", true)];

pub fn groups() -> &'static [Group] {
    GROUPS
}

pub fn group_by_id(id: &str) -> Option<&'static Group> {
    GROUPS.iter().find(|g| g.id == id)
}

/// Every static leaf as a [`Category`], in taxonomy order.
pub fn leaves() -> Vec<Category> {
    GROUPS
        .iter()
        .flat_map(|g| {
            g.leaves.iter().map(move |l| Category {
                id: l.id.to_string(),
                name: l.name.to_string(),
                section: g.section,
                parent_name: g.name.to_string(),
            })
        })
        .collect()
}

pub fn leaf_by_id(id: &str) -> Option<(&'static Group, &'static Leaf)> {
    GROUPS
        .iter()
        .find_map(|g| g.leaves.iter().find(|l| l.id == id).map(|l| (g, l)))
}

/// Listing label of a static leaf.
pub fn label_for(id: &str) -> Option<String> {
    leaf_by_id(id).map(|(g, l)| format!("{} — {}", g.name, l.name))
}

/// Id-based check for data created before every category carried a section.
pub fn is_variable_by_leaf_id(id: &str) -> bool {
    if let Some((group, _)) = leaf_by_id(id) {
        return group.section == Section::Variable;
    }
    RETIRED_LEAVES
        .iter()
        .any(|(retired, variable)| *retired == id && *variable)
}

/// Whether an allocation reduces spendable cash. Only static allocation
/// leaves can; custom allocations are treated as internal transfers.
pub fn allocation_affects_cash(id: &str) -> bool {
    leaf_by_id(id).is_some_and(|(g, l)| g.section == Section::Allocations && l.affects_cash)
}

/// Static leaves merged with the user's custom categories, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryMap(BTreeMap<CategoryId, Category>);

impl CategoryMap {
    pub fn merged(custom: &[Category]) -> Self {
        let mut map: BTreeMap<CategoryId, Category> =
            leaves().into_iter().map(|c| (c.id.clone(), c)).collect();
        for c in custom {
            let mut category = c.clone();
            if category.parent_name.is_empty() {
                category.parent_name = category.section.to_string();
            }
            map.insert(category.id.clone(), category);
        }
        Self(map)
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.0.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.0.values()
    }

    pub fn in_section(&self, section: Section) -> impl Iterator<Item = &Category> {
        self.0.values().filter(move |c| c.section == section)
    }

    pub fn section_of(&self, id: &str) -> Section {
        section_of(id, self)
    }

    /// Display name for an id, falling back to the id itself.
    pub fn name_of<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map_or(id, |c| c.name.as_str())
    }
}

/// Resolves the section of a category id. Unknown ids fall back to the
/// legacy id-based inference and never fail.
pub fn section_of(id: &str, categories: &CategoryMap) -> Section {
    if let Some(category) = categories.get(id) {
        return category.section;
    }
    if is_variable_by_leaf_id(id) {
        Section::Variable
    } else {
        Section::Fixed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(id: &str, name: &str, section: Section) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            section,
            parent_name: String::new(),
        }
    }

    #[test]
    fn test_static_sections() {
        let map = CategoryMap::merged(&[]);
        assert_eq!(map.section_of("living:groceries"), Section::Variable);
        assert_eq!(map.section_of("housing:mortgage_rent"), Section::Fixed);
        assert_eq!(map.section_of("loans:car"), Section::Loans);
        assert_eq!(map.section_of("allocations:investment"), Section::Allocations);
    }

    #[test]
    fn test_custom_category_uses_its_section() {
        let map = CategoryMap::merged(&[custom("custom:variable:1", "Pets", Section::Variable)]);
        assert_eq!(map.section_of("custom:variable:1"), Section::Variable);
        let pets = map.get("custom:variable:1").unwrap();
        assert_eq!(pets.parent_name, "variable");
        assert!(pets.is_custom());
    }

    #[test]
    fn test_unknown_ids_fall_back() {
        let map = CategoryMap::merged(&[]);
        assert_eq!(map.section_of("special:investments"), Section::Variable);
        assert_eq!(map.section_of("custom:fixed:99"), Section::Fixed);
        assert_eq!(map.section_of("no-such-id"), Section::Fixed);
    }

    #[test]
    fn test_fallback_without_static_leaves() {
        let empty = CategoryMap::default();
        assert_eq!(section_of("living:dining", &empty), Section::Variable);
        assert_eq!(section_of("loans:car", &empty), Section::Fixed);
    }

    #[test]
    fn test_allocation_affects_cash() {
        assert!(allocation_affects_cash("allocations:investment"));
        assert!(!allocation_affects_cash("allocations:savings"));
        assert!(!allocation_affects_cash("allocations:emergency"));
        assert!(!allocation_affects_cash("living:groceries"));
        assert!(!allocation_affects_cash("custom:allocations:1"));
    }

    #[test]
    fn test_static_ids_are_unique() {
        let all = leaves();
        let map = CategoryMap::merged(&[]);
        assert_eq!(all.len(), map.len());
        assert!(all.iter().all(|c| !c.is_custom()));
    }

    #[test]
    fn test_labels() {
        assert_eq!(
            label_for("living:groceries").as_deref(),
            Some("Living Expenses — Groceries")
        );
        assert!(label_for("nope").is_none());
        assert_eq!(group_by_id("loans").map(|g| g.section), Some(Section::Loans));
    }

    #[test]
    fn test_section_from_str() {
        assert_eq!("Variable".parse::<Section>().unwrap(), Section::Variable);
        assert!("savings".parse::<Section>().is_err());
        assert!(!Section::Allocations.is_consumption());
        assert!(Section::Loans.is_consumption());
    }
}
