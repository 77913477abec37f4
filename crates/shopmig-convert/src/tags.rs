//! Tag synthesis.
//!
//! The export links products to tag ids but carries no tag names, so a tag
//! name is produced by a [`TagNamer`]. Without a curated tag master every
//! association becomes a provisional placeholder derived from the product id.
//! Category leaf names are added as a second, independent tag source.

use std::collections::{BTreeMap, HashSet};

use shopmig_core::{ExportProfile, Tag, TagOrigin};

use crate::source::TagAssociation;

/// Turns a tag association into a named tag.
pub trait TagNamer: Send + Sync {
    fn name(&self, association: &TagAssociation) -> Tag;
}

/// Placeholder tag name for a product's tag associations.
#[must_use]
pub fn provisional_tag_name(product_id: &str) -> String {
    format!("provisional-tag:{product_id}")
}

/// Names every association with the provisional placeholder.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProvisionalTagNamer;

impl TagNamer for ProvisionalTagNamer {
    fn name(&self, association: &TagAssociation) -> Tag {
        Tag::new(
            provisional_tag_name(&association.product_id),
            TagOrigin::Provisional,
        )
    }
}

/// Looks tag ids up in a curated tag master, falling back to the provisional
/// placeholder for ids it does not know.
#[derive(Debug, Clone)]
pub struct MasterTagNamer {
    names: BTreeMap<String, String>,
}

impl MasterTagNamer {
    #[must_use]
    pub fn new(names: BTreeMap<String, String>) -> Self {
        Self { names }
    }
}

impl TagNamer for MasterTagNamer {
    fn name(&self, association: &TagAssociation) -> Tag {
        association
            .tag_id
            .as_ref()
            .and_then(|id| self.names.get(id))
            .map_or_else(
                || ProvisionalTagNamer.name(association),
                |name| Tag::new(name.clone(), TagOrigin::Master),
            )
    }
}

/// Picks the namer for a profile: the tag master when one is configured.
#[must_use]
pub fn namer_for_profile(profile: &ExportProfile) -> Box<dyn TagNamer> {
    if profile.tag_names.is_empty() {
        Box::new(ProvisionalTagNamer)
    } else {
        Box::new(MasterTagNamer::new(profile.tag_names.clone()))
    }
}

/// Unions association tags and category leaf tags.
///
/// Association tags come first, then one tag per category path leaf.
/// Duplicates are removed case-insensitively, keeping the first occurrence.
#[must_use]
pub fn synthesize_tags(
    associations: &[TagAssociation],
    category_paths: &[Vec<String>],
    namer: &dyn TagNamer,
) -> Vec<Tag> {
    let association_tags = associations.iter().map(|a| namer.name(a));
    let category_tags = category_paths
        .iter()
        .filter_map(|path| path.last())
        .map(|leaf| Tag::new(leaf.clone(), TagOrigin::Category));

    let mut seen = HashSet::new();
    association_tags
        .chain(category_tags)
        .filter(|tag| !tag.name.trim().is_empty())
        .filter(|tag| seen.insert(tag.name.to_lowercase()))
        .collect()
}
