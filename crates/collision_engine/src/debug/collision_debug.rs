//! Collision-specific debug visualization
//!
//! Turns grid occupancy, resolved shapes and contacts into [`DebugShape`]s.

use std::collections::HashSet;

use crate::debug::draw::{DebugDrawSystem, DebugShape};
use crate::ecs::EntityId;
use crate::foundation::math::{Rect, Vec4};
use crate::physics::broad_phase::CollisionPair;
use crate::physics::collision::{CollisionInfo, WorldSpaceShape};
use crate::physics::collision_system::CollisionWorld;
use crate::spatial::HashGrid;

/// Color scheme for collision visualization
#[derive(Clone, Debug)]
pub struct CollisionDebugColors {
    /// Grid cell holding a single entry
    pub cell_sparse: Vec4,

    /// Grid cell whose first block is full
    pub cell_dense: Vec4,

    /// Color for collision shapes (not colliding)
    pub shape_default: Vec4,

    /// Color for collision shapes (currently colliding)
    pub shape_colliding: Vec4,

    /// Contact points and normals
    pub contact: Vec4,

    /// Rectangle queries
    pub query: Vec4,
}

impl Default for CollisionDebugColors {
    fn default() -> Self {
        Self {
            cell_sparse: Vec4::new(0.5, 0.8, 1.0, 0.1),     // Light blue, transparent
            cell_dense: Vec4::new(1.0, 0.5, 0.0, 0.6),      // Orange
            shape_default: Vec4::new(0.0, 1.0, 0.0, 0.3),   // Green, semi-transparent
            shape_colliding: Vec4::new(1.0, 0.0, 0.0, 0.5), // Red, semi-transparent
            contact: Vec4::new(1.0, 1.0, 0.0, 1.0),         // Yellow
            query: Vec4::new(0.0, 1.0, 1.0, 0.2),           // Cyan, transparent
        }
    }
}

/// Collision-specific debug visualizer
///
/// Everything except queries is drawn for one frame (duration 0), so call
/// [`CollisionDebugVisualizer::update`] once per rendered frame.
pub struct CollisionDebugVisualizer {
    debug_draw: DebugDrawSystem,
    colors: CollisionDebugColors,

    /// Show occupied grid cells
    pub show_grid: bool,

    /// Show collision shapes
    pub show_shapes: bool,

    /// Show contact points and normals
    pub show_contacts: bool,
}

impl CollisionDebugVisualizer {
    /// Create a new collision debug visualizer
    pub fn new() -> Self {
        Self {
            debug_draw: DebugDrawSystem::new(),
            colors: CollisionDebugColors::default(),
            show_grid: true,
            show_shapes: true,
            show_contacts: false,
        }
    }

    /// Set custom color scheme
    pub fn with_colors(mut self, colors: CollisionDebugColors) -> Self {
        self.colors = colors;
        self
    }

    /// Cell color for `entries` stored against a block capacity
    pub fn density_color(&self, entries: usize, capacity: usize) -> Vec4 {
        let t = if capacity == 0 { 1.0 } else { (entries as f32 / capacity as f32).min(1.0) };
        self.colors.cell_sparse.lerp(&self.colors.cell_dense, t)
    }

    /// One rectangle per occupied cell, colored by how full it is
    pub fn draw_grid_occupancy<V: Copy + Default, const N: usize>(&mut self, grid: &HashGrid<V, N>) {
        if !self.show_grid {
            return;
        }

        let cell_size = grid.cell_size();
        for cell in grid.occupancy() {
            let rect = Rect::new(cell.cell_x as f32 * cell_size, cell.cell_y as f32 * cell_size, cell_size, cell_size);
            let color = self.density_color(cell.entries, grid.block_capacity());
            self.debug_draw.draw(DebugShape::Rect { rect, color, duration: 0.0, wireframe: cell.blocks == 1 });
        }
    }

    /// Visualize a collision shape
    pub fn draw_collision_shape(&mut self, shape: &WorldSpaceShape, is_colliding: bool) {
        if !self.show_shapes {
            return;
        }

        let color = if is_colliding { self.colors.shape_colliding } else { self.colors.shape_default };
        self.push_shape(shape, color);
    }

    fn push_shape(&mut self, shape: &WorldSpaceShape, color: Vec4) {
        match shape {
            WorldSpaceShape::Aabb(rect) => self.debug_draw.draw_rect(*rect, color, 0.0),
            WorldSpaceShape::Circle(circle) => self.debug_draw.draw_circle(circle.center, circle.radius, color, 0.0),
            WorldSpaceShape::Polygon(quad) => self.debug_draw.draw_polygon(*quad, color, 0.0),
            WorldSpaceShape::Capsule(capsule) => {
                for part in capsule.parts() {
                    self.push_shape(&part, color);
                }
            }
        }
    }

    /// Contact point plus the normal scaled by penetration depth
    pub fn draw_contact(&mut self, info: &CollisionInfo) {
        if !self.show_contacts || !info.is_colliding() {
            return;
        }

        let start = info.collision_point;
        let end = start + info.normal * info.penetration_depth;
        self.debug_draw.draw_point(start, self.colors.contact, 4.0, 0.0);
        self.debug_draw.draw_line(start, end, self.colors.contact, 0.0);
    }

    /// Grid, shapes and contacts for the last tick of `world`
    ///
    /// `pairs` is what [`CollisionWorld::detect_pairs`] returned for that tick.
    pub fn draw_world(&mut self, world: &CollisionWorld, pairs: &[CollisionPair]) {
        self.draw_grid_occupancy(world.grid());

        let colliding: HashSet<EntityId> = pairs.iter().flat_map(|pair| [pair.entity_a, pair.entity_b]).collect();
        for entity in world.resolved() {
            if !entity.inert {
                self.draw_collision_shape(&entity.shape, colliding.contains(&entity.id));
            }
        }

        for pair in pairs {
            self.draw_contact(&pair.info);
        }
    }

    /// Keep a query rectangle on screen until cleared
    pub fn draw_query(&mut self, entity: EntityId, rect: Rect) {
        let key = format!("query_{}", entity.id());
        self.debug_draw.draw_persistent(
            key,
            DebugShape::Rect {
                rect,
                color: self.colors.query,
                duration: f32::INFINITY,
                wireframe: true,
            },
        );
    }

    /// Clear a query rectangle for an entity
    pub fn clear_query(&mut self, entity: EntityId) {
        self.debug_draw.clear_persistent(&format!("query_{}", entity.id()));
    }

    /// Clear all visualization
    pub fn clear(&mut self) {
        self.debug_draw.clear();
    }

    /// Update debug system (expire temporary shapes)
    pub fn update(&mut self, delta_time: f32) {
        self.debug_draw.update(delta_time);
    }

    /// Get all debug shapes for rendering
    pub fn get_shapes(&self) -> Vec<&DebugShape> {
        self.debug_draw.get_shapes()
    }

    /// Enable/disable the entire debug system
    pub fn set_enabled(&mut self, enabled: bool) {
        self.debug_draw.enabled = enabled;
    }

    /// Check if debug system is enabled
    pub fn is_enabled(&self) -> bool {
        self.debug_draw.enabled
    }
}

impl Default for CollisionDebugVisualizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{CollisionConfig, SchedulerConfig};
    use crate::ecs::{ColliderComponent, CollisionEntity, EntityType, PositionComponent};
    use crate::foundation::math::Vec2;
    use approx::assert_relative_eq;

    #[test]
    fn test_query_visualization() {
        let mut viz = CollisionDebugVisualizer::new();
        let entity = EntityId::new(1);

        viz.draw_query(entity, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(viz.get_shapes().len(), 1);

        // Persistent shapes survive updates
        viz.update(10.0);
        assert_eq!(viz.get_shapes().len(), 1);

        viz.clear_query(entity);
        assert!(viz.get_shapes().is_empty());
    }

    #[test]
    fn test_capsule_draws_three_parts_for_one_frame() {
        let mut viz = CollisionDebugVisualizer::new();
        let position = PositionComponent::new(0.0, 0.0, EntityType(0));
        let shape = WorldSpaceShape::from_components(&position, &ColliderComponent::capsule(2.0, 10.0));

        viz.draw_collision_shape(&shape, false);
        assert_eq!(viz.get_shapes().len(), 3);

        viz.update(0.016);
        assert!(viz.get_shapes().is_empty());
    }

    #[test]
    fn test_density_color_is_clamped() {
        let viz = CollisionDebugVisualizer::new();
        let colors = CollisionDebugColors::default();
        assert_relative_eq!(viz.density_color(0, 14), colors.cell_sparse);
        assert_relative_eq!(viz.density_color(14, 14), colors.cell_dense);
        assert_relative_eq!(viz.density_color(40, 14), colors.cell_dense);
    }

    #[test]
    fn test_draw_world_marks_colliding_shapes() {
        let config = CollisionConfig::new().with_scheduler(SchedulerConfig::default().with_worker_threads(0));
        let mut world = CollisionWorld::new(config).unwrap();
        let entity = |id: u32, x: f32| {
            CollisionEntity::new(
                EntityId::new(id),
                PositionComponent::new(x, 0.0, EntityType(0)),
                ColliderComponent::rect(10.0, 10.0),
            )
        };
        let pairs = world.detect_pairs(&[entity(1, 0.0), entity(2, 5.0), entity(3, 500.0)]);
        assert_eq!(pairs.len(), 1);

        let mut viz = CollisionDebugVisualizer::new();
        viz.show_grid = false;
        viz.show_contacts = true;
        viz.draw_world(&world, &pairs);

        let shapes = viz.get_shapes();
        let colors = CollisionDebugColors::default();
        let red = shapes.iter().filter(|s| matches!(s, DebugShape::Rect { .. }) && s.color() == colors.shape_colliding).count();
        let green = shapes.iter().filter(|s| matches!(s, DebugShape::Rect { .. }) && s.color() == colors.shape_default).count();
        assert_eq!((red, green), (2, 1));
        assert!(shapes.iter().any(|s| matches!(s, DebugShape::Point { .. })));
        assert!(shapes.iter().any(|s| matches!(s, DebugShape::Line { start, .. } if *start != Vec2::zeros())));
    }

    #[test]
    fn test_grid_occupancy_one_rect_per_cell() {
        let mut grid: HashGrid<u32> = HashGrid::new(10.0);
        grid.insert(1, 5.0, 5.0, 10.0, 10.0);
        let mut viz = CollisionDebugVisualizer::new();
        viz.draw_grid_occupancy(&grid);
        assert_eq!(viz.get_shapes().len(), 4);
    }
}
