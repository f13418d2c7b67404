use std::cmp::Ordering;

use serde::Serialize;

use crate::model::{Coordinate, CoordinateOrder, NodeId, Path};

/// Position of a structural unit inside a container.
///
/// `child` is the index of the owning node in the container's visible order,
/// `component` the sub-position inside a composite node (always 0 for
/// single-unit nodes). Addresses order by child first, then component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Address {
    pub child: usize,
    pub component: usize,
}

impl Address {
    pub fn new(child: usize, component: usize) -> Self {
        Self { child, component }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Unit {
    address: Address,
    path: Path,
}

/// Snapshot of a container's visible order, flattened into addressable units.
///
/// Built by [`Document::layout`](crate::Document::layout). Units are kept in
/// address order, so neighbouring units are neighbouring entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerLayout {
    container_id: NodeId,
    children: Vec<NodeId>,
    units: Vec<Unit>,
}

impl ContainerLayout {
    /// `children` pairs every visible child with the paths of its addressable
    /// components, in order
    pub(crate) fn new(container_id: NodeId, children: Vec<(NodeId, Vec<Path>)>) -> Self {
        let mut ids = Vec::with_capacity(children.len());
        let mut units = Vec::new();
        for (child, (id, paths)) in children.into_iter().enumerate() {
            ids.push(id);
            units.extend(paths.into_iter().enumerate().map(|(component, path)| Unit {
                address: Address::new(child, component),
                path,
            }));
        }
        Self {
            container_id,
            children: ids,
            units,
        }
    }

    pub fn container_id(&self) -> &NodeId {
        &self.container_id
    }

    /// Number of addressable units
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Address of the unit owning `path`
    pub fn address_of(&self, path: &Path) -> Option<Address> {
        self.units
            .iter()
            .find(|unit| &unit.path == path)
            .map(|unit| unit.address)
    }

    pub fn next_address(&self, address: Address) -> Option<Address> {
        let index = self.index_of(address)?;
        self.units.get(index + 1).map(|unit| unit.address)
    }

    pub fn previous_address(&self, address: Address) -> Option<Address> {
        let index = self.index_of(address)?;
        index
            .checked_sub(1)
            .and_then(|previous| self.units.get(previous))
            .map(|unit| unit.address)
    }

    /// Node owning the given child index
    pub fn child_at(&self, child: usize) -> Option<&NodeId> {
        self.children.get(child)
    }

    pub fn path_at(&self, address: Address) -> Option<&Path> {
        self.index_of(address).map(|index| &self.units[index].path)
    }

    pub fn first_address(&self) -> Option<Address> {
        self.units.first().map(|unit| unit.address)
    }

    pub fn last_address(&self) -> Option<Address> {
        self.units.last().map(|unit| unit.address)
    }

    /// Units from `start` to `end`, both inclusive
    pub fn units_between(
        &self,
        start: Address,
        end: Address,
    ) -> impl Iterator<Item = (Address, &Path)> + '_ {
        self.units
            .iter()
            .filter(move |unit| unit.address >= start && unit.address <= end)
            .map(|unit| (unit.address, &unit.path))
    }

    fn index_of(&self, address: Address) -> Option<usize> {
        self.units
            .binary_search_by(|unit| unit.address.cmp(&address))
            .ok()
    }
}

impl CoordinateOrder for ContainerLayout {
    fn compare(&self, a: &Coordinate, b: &Coordinate) -> Option<Ordering> {
        let a = (self.address_of(&a.path)?, a.offset);
        let b = (self.address_of(&b.path)?, b.offset);
        Some(a.cmp(&b))
    }
}
