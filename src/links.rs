//! Derived link geometry.
//!
//! [`LinkManager`] turns the links of a diagram plus the port positions in a
//! [`PortRegistry`] into renderable [`RenderedLink`]s. A link whose source or
//! target port has not been measured has no entry at all, so the rendering
//! surface never sees stale coordinates.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::diagram::{Link, LinkId, NodeId, PortDirection};
use crate::geometry::LogicalPoint;
use crate::registry::PortRegistry;
use crate::route::{route, CurveStyle, LinkPath};

/// Resolved endpoint coordinates of a link.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkEndpoints {
    pub source: LogicalPoint,
    pub target: LogicalPoint,
}

impl LinkEndpoints {
    /// Look up both ends of `link`; `None` if either is unmeasured.
    pub fn resolve(link: &Link, registry: &PortRegistry) -> Option<Self> {
        let (from, to) = (&link.source, &link.target);
        let source = registry.get_port(&from.node_id, PortDirection::Output, &from.port_name)?;
        let target = registry.get_port(&to.node_id, PortDirection::Input, &to.port_name)?;
        Some(Self { source, target })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderedLink {
    pub id: LinkId,
    pub endpoints: LinkEndpoints,
    pub stroke_width: f32,
    pub path: LinkPath,
    /// Changes whenever the geometry changes, so the surface can skip
    /// re-rendering links that did not move.
    pub render_id: u64,
}

pub struct LinkManager {
    rendered: IndexMap<LinkId, RenderedLink>,
    style: CurveStyle,
    default_stroke_width: f32,
    next_render_id: u64,
}

impl Default for LinkManager {
    fn default() -> Self {
        Self::new(CurveStyle::default(), 12.0)
    }
}

impl LinkManager {
    pub fn new(style: CurveStyle, default_stroke_width: f32) -> Self {
        Self {
            rendered: IndexMap::new(),
            style,
            default_stroke_width,
            next_render_id: 1,
        }
    }

    /// Recompute every link, dropping entries for links that no longer exist.
    ///
    /// Returns the ids whose rendering changed (added, moved or removed).
    pub fn update_all(&mut self, links: &[Link], registry: &PortRegistry) -> Vec<LinkId> {
        let live: HashSet<&LinkId> = links.iter().map(|l| &l.id).collect();
        let mut changed: Vec<LinkId> = self
            .rendered
            .keys()
            .filter(|id| !live.contains(id))
            .cloned()
            .collect();
        for id in &changed {
            self.rendered.shift_remove(id);
        }
        for link in links {
            if self.update_link(link, registry) {
                changed.push(link.id.clone());
            }
        }
        log::debug!("built {} of {} links", self.rendered.len(), links.len());
        changed
    }

    /// Recompute only the links touching one of `nodes`.
    pub fn refresh_for_nodes(
        &mut self,
        links: &[Link],
        registry: &PortRegistry,
        nodes: &HashSet<NodeId>,
    ) -> Vec<LinkId> {
        if nodes.is_empty() {
            return Vec::new();
        }
        links
            .iter()
            .filter(|link| {
                nodes.contains(&link.source.node_id) || nodes.contains(&link.target.node_id)
            })
            .filter_map(|link| self.update_link(link, registry).then(|| link.id.clone()))
            .collect()
    }

    /// Recompute one link. Returns `true` if its rendering changed.
    pub fn update_link(&mut self, link: &Link, registry: &PortRegistry) -> bool {
        let Some(endpoints) = LinkEndpoints::resolve(link, registry) else {
            if self.rendered.shift_remove(&link.id).is_some() {
                log::trace!("link {} lost an endpoint", link.id);
                return true;
            }
            return false;
        };
        let stroke_width = link.stroke_width.unwrap_or(self.default_stroke_width);
        if let Some(existing) = self.rendered.get(&link.id) {
            if existing.endpoints == endpoints && existing.stroke_width == stroke_width {
                return false;
            }
        }
        let render_id = self.next_render_id;
        self.next_render_id += 1;
        let rendered = RenderedLink {
            id: link.id.clone(),
            endpoints,
            stroke_width,
            path: route(endpoints.source, endpoints.target, stroke_width, &self.style),
            render_id,
        };
        self.rendered.insert(link.id.clone(), rendered);
        true
    }

    pub fn remove(&mut self, id: &LinkId) -> bool {
        self.rendered.shift_remove(id).is_some()
    }

    pub fn get(&self, id: &LinkId) -> Option<&RenderedLink> {
        self.rendered.get(id)
    }

    /// Renderable links in diagram order.
    pub fn iter(&self) -> impl Iterator<Item = &RenderedLink> {
        self.rendered.values()
    }

    pub fn len(&self) -> usize {
        self.rendered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }

    pub fn clear(&mut self) {
        self.rendered.clear();
        self.next_render_id = 1;
    }

    pub fn style(&self) -> &CurveStyle {
        &self.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::Connector;
    use crate::geometry::{logical_point, screen_point};
    use crate::registry::PortMeasurement;

    fn measure(registry: &mut PortRegistry, node: &str, ports: &[(PortDirection, &str, f32, f32)]) {
        registry.update_node_ports(
            &NodeId::from(node),
            ports
                .iter()
                .map(|&(direction, name, x, y)| PortMeasurement::new(direction, name, x, y)),
            screen_point(0.0, 0.0),
            1.0,
        );
    }

    fn setup() -> (Vec<Link>, PortRegistry) {
        let links = vec![Link::new("l1", Connector::new("a", "out"), Connector::new("b", "in"))];
        let mut registry = PortRegistry::new();
        measure(&mut registry, "a", &[(PortDirection::Output, "out", 100.0, 25.0)]);
        measure(&mut registry, "b", &[(PortDirection::Input, "in", 200.0, 125.0)]);
        (links, registry)
    }

    #[test]
    fn test_new_manager_is_empty() {
        let manager = LinkManager::default();
        assert!(manager.is_empty());
        assert_eq!(manager.len(), 0);
    }

    #[test]
    fn test_update_all_resolves_endpoints() {
        let (links, registry) = setup();
        let mut manager = LinkManager::default();
        let changed = manager.update_all(&links, &registry);
        assert_eq!(changed, vec![LinkId::from("l1")]);

        let rendered = manager.get(&"l1".into()).unwrap();
        assert_eq!(rendered.endpoints.source, logical_point(100.0, 25.0));
        assert_eq!(rendered.endpoints.target, logical_point(200.0, 125.0));
        assert_eq!(rendered.stroke_width, 12.0);
        assert!(rendered.path.to_svg().starts_with("M "));
    }

    #[test]
    fn test_unmeasured_source_has_no_path_until_measured() {
        let links = vec![Link::new("l1", Connector::new("a", "out"), Connector::new("b", "in"))];
        let mut registry = PortRegistry::new();
        measure(&mut registry, "b", &[(PortDirection::Input, "in", 200.0, 125.0)]);
        let mut manager = LinkManager::default();

        manager.update_all(&links, &registry);
        assert!(manager.get(&"l1".into()).is_none());

        measure(&mut registry, "a", &[(PortDirection::Output, "out", 0.0, 0.0)]);
        let dirty = registry.take_dirty();
        assert_eq!(manager.refresh_for_nodes(&links, &registry, &dirty), vec![LinkId::from("l1")]);
        assert!(manager.get(&"l1".into()).is_some());
    }

    #[test]
    fn test_port_on_wrong_side_is_unknown() {
        let links = vec![Link::new("l1", Connector::new("a", "out"), Connector::new("b", "in"))];
        let mut registry = PortRegistry::new();
        // "out" measured as an input port does not satisfy an output connector
        measure(&mut registry, "a", &[(PortDirection::Input, "out", 0.0, 0.0)]);
        measure(&mut registry, "b", &[(PortDirection::Input, "in", 200.0, 125.0)]);
        let mut manager = LinkManager::default();
        manager.update_all(&links, &registry);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_render_id_only_bumps_on_change() {
        let (links, mut registry) = setup();
        let mut manager = LinkManager::default();
        manager.update_all(&links, &registry);
        let first = manager.get(&"l1".into()).unwrap().render_id;

        // Remeasuring at the same place keeps the render id
        measure(&mut registry, "a", &[(PortDirection::Output, "out", 100.0, 25.0)]);
        let dirty = registry.take_dirty();
        assert!(manager.refresh_for_nodes(&links, &registry, &dirty).is_empty());
        assert_eq!(manager.get(&"l1".into()).unwrap().render_id, first);

        measure(&mut registry, "a", &[(PortDirection::Output, "out", 110.0, 25.0)]);
        let dirty = registry.take_dirty();
        manager.refresh_for_nodes(&links, &registry, &dirty);
        assert!(manager.get(&"l1".into()).unwrap().render_id > first);
    }

    #[test]
    fn test_refresh_ignores_unrelated_nodes() {
        let (links, mut registry) = setup();
        let mut manager = LinkManager::default();
        manager.update_all(&links, &registry);
        measure(&mut registry, "c", &[(PortDirection::Output, "out", 0.0, 0.0)]);
        let dirty = registry.take_dirty();
        assert!(manager.refresh_for_nodes(&links, &registry, &dirty).is_empty());
    }

    #[test]
    fn test_update_all_drops_removed_links() {
        let (links, registry) = setup();
        let mut manager = LinkManager::default();
        manager.update_all(&links, &registry);
        let changed = manager.update_all(&[], &registry);
        assert_eq!(changed, vec![LinkId::from("l1")]);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_losing_an_endpoint_removes_the_path() {
        let (links, mut registry) = setup();
        let mut manager = LinkManager::default();
        manager.update_all(&links, &registry);
        // b re-rendered without its input port
        measure(&mut registry, "b", &[]);
        let dirty = registry.take_dirty();
        assert_eq!(manager.refresh_for_nodes(&links, &registry, &dirty), vec![LinkId::from("l1")]);
        assert!(manager.get(&"l1".into()).is_none());
    }

    #[test]
    fn test_link_stroke_width_overrides_default() {
        let (mut links, registry) = setup();
        links[0].stroke_width = Some(4.0);
        let mut manager = LinkManager::default();
        manager.update_all(&links, &registry);
        let rendered = manager.get(&"l1".into()).unwrap();
        assert_eq!(rendered.stroke_width, 4.0);
        assert_eq!(rendered.path.transform(), euclid::vec2(98.0, 23.0));
    }
}
