//! Component ownership tree of a single car.
//!
//! Every component of a car lives in one [`SlotMap`] arena owned by the
//! [`Car`]. A component is either installed on exactly one parent or detached;
//! the root is always detached. Disassembly detaches components, it never
//! frees them.

use crate::id::{CarModelId, ComponentKey, ConditionId};
use slotmap::SlotMap;

/// Errors from tree operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComponentError {
    #[error("component '{component}' is already installed on '{parent}'")]
    AlreadyInstalled { component: String, parent: String },
    #[error("component '{component}' not found below '{searched}'")]
    NotFound { component: String, searched: String },
    #[error("component '{component}' cannot be installed below its own descendant '{parent}'")]
    Cycle { component: String, parent: String },
    #[error("component key does not belong to this car")]
    InvalidKey,
}

/// One node of the ownership tree.
#[derive(Debug, Clone)]
pub struct ComponentNode {
    pub component_type: String,
    pub parent: Option<ComponentKey>,
    pub children: Vec<ComponentKey>,
}

/// A car instance and the arena holding all of its components.
#[derive(Debug, Clone)]
pub struct Car {
    number: u32,
    condition: ConditionId,
    model: CarModelId,
    root: ComponentKey,
    nodes: SlotMap<ComponentKey, ComponentNode>,
}

impl Car {
    /// Create a car whose only component is the root of type `root_type`.
    pub fn new(number: u32, condition: ConditionId, model: CarModelId, root_type: &str) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(ComponentNode {
            component_type: root_type.to_string(),
            parent: None,
            children: Vec::new(),
        });
        Self {
            number,
            condition,
            model,
            root,
            nodes,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn condition(&self) -> ConditionId {
        self.condition
    }

    pub fn model(&self) -> CarModelId {
        self.model
    }

    pub fn root(&self) -> ComponentKey {
        self.root
    }

    pub fn get(&self, key: ComponentKey) -> Option<&ComponentNode> {
        self.nodes.get(key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Current identifier of a component: `{type}_{car number}`.
    pub fn id_of(&self, key: ComponentKey) -> Result<String, ComponentError> {
        let node = self.nodes.get(key).ok_or(ComponentError::InvalidKey)?;
        Ok(format!("{}_{}", node.component_type, self.number))
    }

    /// Create a detached component.
    pub fn create(&mut self, component_type: &str) -> ComponentKey {
        self.nodes.insert(ComponentNode {
            component_type: component_type.to_string(),
            parent: None,
            children: Vec::new(),
        })
    }

    /// Install `child` on `parent`. The child must be detached, must not be
    /// the root and must not be an ancestor of `parent`.
    pub fn install(
        &mut self,
        parent: ComponentKey,
        child: ComponentKey,
    ) -> Result<(), ComponentError> {
        if !self.nodes.contains_key(parent) {
            return Err(ComponentError::InvalidKey);
        }
        let node = self.nodes.get(child).ok_or(ComponentError::InvalidKey)?;
        if let Some(existing) = node.parent {
            return Err(ComponentError::AlreadyInstalled {
                component: self.id_of(child)?,
                parent: self.id_of(existing)?,
            });
        }
        if child == self.root || child == parent {
            return Err(ComponentError::AlreadyInstalled {
                component: self.id_of(child)?,
                parent: self.id_of(parent)?,
            });
        }
        let mut ancestor = self.nodes[parent].parent;
        while let Some(key) = ancestor {
            if key == child {
                return Err(ComponentError::Cycle {
                    component: self.id_of(child)?,
                    parent: self.id_of(parent)?,
                });
            }
            ancestor = self.nodes[key].parent;
        }
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        Ok(())
    }

    /// Detach the first component of `component_type` found below `from`,
    /// searching children in install order, depth-first.
    pub fn pop(
        &mut self,
        from: ComponentKey,
        component_type: &str,
    ) -> Result<ComponentKey, ComponentError> {
        let found = self.find_below(from, component_type)?.ok_or_else(|| {
            ComponentError::NotFound {
                component: component_type.to_string(),
                searched: self
                    .id_of(from)
                    .unwrap_or_else(|_| format!("{from:?}")),
            }
        })?;
        if let Some(parent) = self.nodes[found].parent.take() {
            self.nodes[parent].children.retain(|&c| c != found);
        }
        Ok(found)
    }

    fn find_below(
        &self,
        from: ComponentKey,
        component_type: &str,
    ) -> Result<Option<ComponentKey>, ComponentError> {
        let node = self.nodes.get(from).ok_or(ComponentError::InvalidKey)?;
        for &child in &node.children {
            if self.nodes[child].component_type == component_type {
                return Ok(Some(child));
            }
            if let Some(found) = self.find_below(child, component_type)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// The detached component of the given type, if any.
    pub fn find_detached(&self, component_type: &str) -> Option<ComponentKey> {
        self.nodes
            .iter()
            .find(|(_, n)| n.parent.is_none() && n.component_type == component_type)
            .map(|(k, _)| k)
    }

    /// Change a component's type. Its identifier changes with it.
    pub fn rename(&mut self, key: ComponentKey, new_type: &str) -> Result<(), ComponentError> {
        let node = self.nodes.get_mut(key).ok_or(ComponentError::InvalidKey)?;
        node.component_type = new_type.to_string();
        Ok(())
    }

    /// Number of components still installed below `key`, recursively.
    pub fn descendant_count(&self, key: ComponentKey) -> usize {
        self.nodes
            .get(key)
            .map(|n| {
                n.children
                    .iter()
                    .map(|&c| 1 + self.descendant_count(c))
                    .sum()
            })
            .unwrap_or(0)
    }
}
