//! Collections and the arena that links them into a tree
//!
//! Collections never point at each other directly. The `CollectionTree` owns
//! every node and stores parent/child links as `CollectionId` indices, so
//! setting a parent updates both sides in one place.

use crate::{Identity, Lazy, ModelError, Paper};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Retrieves the membership of a collection on demand
pub trait CollectionLoader {
    fn load_publications(&self, collection: &Identity) -> Result<Vec<Paper>, ModelError> {
        Err(ModelError::not_implemented(collection, "publications"))
    }
}

/// Handle to a collection inside a `CollectionTree`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionId(usize);

impl CollectionId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A named group of papers
#[derive(Clone)]
pub struct Collection {
    id: Identity,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    /// Smart/virtual collection computed by the source application
    pub is_virtual: bool,
    parent: Option<CollectionId>,
    children: Vec<CollectionId>,
    publications: Lazy<Vec<Paper>>,
    loader: Option<Rc<dyn CollectionLoader>>,
}

impl Collection {
    /// A collection whose members are fetched through `loader`
    pub fn new(id: Identity, name: impl Into<String>, loader: Rc<dyn CollectionLoader>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            created_at: None,
            is_virtual: false,
            parent: None,
            children: Vec::new(),
            publications: Lazy::pending(),
            loader: Some(loader),
        }
    }

    /// A collection with a fixed member list and no source behind it
    pub fn detached(id: Identity, name: impl Into<String>, publications: Vec<Paper>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            created_at: None,
            is_virtual: false,
            parent: None,
            children: Vec::new(),
            publications: Lazy::ready(publications),
            loader: None,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.trim().is_empty());
        self
    }

    pub fn with_created_at(mut self, created_at: Option<DateTime<Utc>>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn id(&self) -> &Identity {
        &self.id
    }

    pub fn parent(&self) -> Option<CollectionId> {
        self.parent
    }

    /// Children in the order they were attached
    pub fn children(&self) -> &[CollectionId] {
        &self.children
    }

    /// Member papers, queried on first access
    pub fn publications(&self) -> Result<&[Paper], ModelError> {
        self.publications
            .get_or_load(&self.id, || match &self.loader {
                Some(loader) => loader.load_publications(&self.id),
                None => Err(ModelError::not_implemented(&self.id, "publications")),
            })
            .map(Vec::as_slice)
    }

    pub fn publications_loaded(&self) -> bool {
        self.publications.is_populated()
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("publications", &self.publications.state())
            .finish()
    }
}

/// Every collection of a source, keyed by local key and linked into a tree
#[derive(Clone, Debug, Default)]
pub struct CollectionTree {
    nodes: Vec<Collection>,
    keys: HashMap<String, CollectionId>,
}

impl CollectionTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collection as a root. Local keys must be unique.
    pub fn insert(&mut self, mut collection: Collection) -> Result<CollectionId, ModelError> {
        let key = collection.id.local_key().to_string();
        if self.keys.contains_key(&key) {
            return Err(ModelError::DuplicateCollection(collection.id));
        }
        collection.parent = None;
        collection.children.clear();

        let id = CollectionId(self.nodes.len());
        self.nodes.push(collection);
        self.keys.insert(key, id);
        Ok(id)
    }

    pub fn get(&self, id: CollectionId) -> Option<&Collection> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: CollectionId) -> Option<&mut Collection> {
        self.nodes.get_mut(id.0)
    }

    /// Handle of the collection with this backend-local key
    pub fn by_key(&self, local_key: &str) -> Option<CollectionId> {
        self.keys.get(local_key).copied()
    }

    pub fn lookup(&self, local_key: &str) -> Option<&Collection> {
        self.by_key(local_key).and_then(|id| self.get(id))
    }

    fn node(&self, id: CollectionId) -> Result<&Collection, ModelError> {
        self.get(id)
            .ok_or_else(|| ModelError::UnknownCollection(format!("#{}", id.0)))
    }

    pub fn parent(&self, id: CollectionId) -> Option<CollectionId> {
        self.get(id).and_then(Collection::parent)
    }

    pub fn children(&self, id: CollectionId) -> &[CollectionId] {
        self.get(id).map(Collection::children).unwrap_or_default()
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: CollectionId) -> impl Iterator<Item = CollectionId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// Make `parent` the parent of `child`.
    ///
    /// `child` is detached from its previous parent first and appears in
    /// `parent`'s children exactly once. Links that would make a collection
    /// its own ancestor are rejected.
    pub fn set_parent(&mut self, child: CollectionId, parent: CollectionId) -> Result<(), ModelError> {
        self.node(child)?;
        self.node(parent)?;
        if child == parent || self.ancestors(parent).any(|a| a == child) {
            return Err(ModelError::CollectionCycle {
                child: self.nodes[child.0].id.clone(),
                parent: self.nodes[parent.0].id.clone(),
            });
        }

        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        let siblings = &mut self.nodes[parent.0].children;
        if !siblings.contains(&child) {
            siblings.push(child);
        }
        Ok(())
    }

    /// Turn `child` back into a root
    pub fn clear_parent(&mut self, child: CollectionId) -> Result<(), ModelError> {
        self.node(child)?;
        self.detach(child);
        Ok(())
    }

    fn detach(&mut self, child: CollectionId) {
        if let Some(old) = self.nodes[child.0].parent.take() {
            self.nodes[old.0].children.retain(|&c| c != child);
        }
    }

    /// Resolve `(child, parent local key)` pairs once every collection is in
    /// the tree. A parent key that is not in the tree leaves the child as a
    /// root.
    pub fn link_parents<I, K>(&mut self, links: I) -> Result<(), ModelError>
    where
        I: IntoIterator<Item = (CollectionId, K)>,
        K: AsRef<str>,
    {
        for (child, parent_key) in links {
            let parent_key = parent_key.as_ref();
            match self.by_key(parent_key) {
                Some(parent) => self.set_parent(child, parent)?,
                None => tracing::warn!(
                    collection = %self.node(child)?.id,
                    parent = parent_key,
                    "Parent collection not found, keeping as root"
                ),
            }
        }
        Ok(())
    }

    /// Collections without a parent, in insertion order
    pub fn roots(&self) -> impl Iterator<Item = CollectionId> + '_ {
        self.iter().filter(|(_, c)| c.parent.is_none()).map(|(id, _)| id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CollectionId, &Collection)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, collection)| (CollectionId(index), collection))
    }

    /// Names from the root down to `id`
    pub fn path(&self, id: CollectionId) -> Vec<&str> {
        let mut lineage: Vec<CollectionId> = self.ancestors(id).collect();
        lineage.reverse();
        lineage.push(id);
        lineage
            .into_iter()
            .filter_map(|c| self.get(c).map(|c| c.name.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
