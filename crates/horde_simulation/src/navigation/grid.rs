//! Tile-grid path service (headless stand-in для navmesh plugin)
//!
//! A* по 8-связной сетке тайлов, без срезания углов у стен.
//! Waypoints: `[from, центры тайлов на поворотах..., to]`.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use bevy::math::Vec2;

use super::{NavMeshId, PathQueryService};

const STRAIGHT_COST: u32 = 10;
const DIAGONAL_COST: u32 = 14;

/// Прямоугольник в тайлах (column, row, width, height)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub column: usize,
    pub row: usize,
    pub width: usize,
    pub height: usize,
}

impl TileRect {
    pub const fn new(column: usize, row: usize, width: usize, height: usize) -> Self {
        Self { column, row, width, height }
    }
}

/// Внутренние стены тестовой комнаты (12x12 тайлов по 64px)
const TEST_LEVEL_WALLS: [TileRect; 9] = [
    TileRect::new(2, 2, 2, 1),
    TileRect::new(2, 3, 1, 8),
    TileRect::new(2, 10, 9, 1),
    TileRect::new(10, 8, 1, 3),
    TileRect::new(7, 8, 4, 1),
    TileRect::new(7, 5, 1, 4),
    TileRect::new(7, 5, 4, 1),
    TileRect::new(10, 2, 1, 4),
    TileRect::new(5, 2, 6, 1),
];

#[derive(Debug, Clone)]
pub struct GridNavigator {
    mesh: NavMeshId,
    columns: usize,
    rows: usize,
    tile_size: f32,
    walkable: Vec<bool>,
}

impl GridNavigator {
    /// Полностью проходимая сетка
    pub fn new(mesh: NavMeshId, columns: usize, rows: usize, tile_size: f32) -> Self {
        Self {
            mesh,
            columns,
            rows,
            tile_size,
            walkable: vec![true; columns * rows],
        }
    }

    /// Комната 768x768 из тестовой сцены
    pub fn test_level(mesh: NavMeshId) -> Self {
        Self::new(mesh, 12, 12, 64.0).with_blocked(&TEST_LEVEL_WALLS)
    }

    pub fn with_blocked(mut self, rects: &[TileRect]) -> Self {
        for rect in rects {
            self.block(*rect);
        }
        self
    }

    /// Помечает прямоугольник непроходимым (клипается по границам сетки)
    pub fn block(&mut self, rect: TileRect) {
        let column_end = (rect.column + rect.width).min(self.columns);
        let row_end = (rect.row + rect.height).min(self.rows);

        for row in rect.row..row_end {
            for column in rect.column..column_end {
                self.walkable[row * self.columns + column] = false;
            }
        }
    }

    pub fn mesh(&self) -> NavMeshId {
        self.mesh
    }

    pub fn is_walkable_at(&self, point: Vec2) -> bool {
        self.tile_index(point).is_some_and(|index| self.walkable[index])
    }

    fn tile_index(&self, point: Vec2) -> Option<usize> {
        if !point.is_finite() || point.x < 0.0 || point.y < 0.0 {
            return None;
        }

        let column = (point.x / self.tile_size) as usize;
        let row = (point.y / self.tile_size) as usize;

        (column < self.columns && row < self.rows).then_some(row * self.columns + column)
    }

    fn tile_center(&self, index: usize) -> Vec2 {
        let column = (index % self.columns) as f32;
        let row = (index / self.columns) as f32;
        Vec2::new(
            (column + 0.5) * self.tile_size,
            (row + 0.5) * self.tile_size,
        )
    }

    fn is_open(&self, column: isize, row: isize) -> bool {
        column >= 0
            && row >= 0
            && (column as usize) < self.columns
            && (row as usize) < self.rows
            && self.walkable[row as usize * self.columns + column as usize]
    }

    /// Octile distance
    fn heuristic(&self, from: usize, to: usize) -> u32 {
        let dx = (from % self.columns).abs_diff(to % self.columns) as u32;
        let dy = (from / self.columns).abs_diff(to / self.columns) as u32;
        STRAIGHT_COST * dx.max(dy) + (DIAGONAL_COST - STRAIGHT_COST) * dx.min(dy)
    }

    fn neighbours(&self, index: usize) -> impl Iterator<Item = (usize, u32)> + '_ {
        let column = (index % self.columns) as isize;
        let row = (index / self.columns) as isize;

        const OFFSETS: [(isize, isize); 8] = [
            (1, 0),
            (-1, 0),
            (0, 1),
            (0, -1),
            (1, 1),
            (1, -1),
            (-1, 1),
            (-1, -1),
        ];

        OFFSETS.into_iter().filter_map(move |(dx, dy)| {
            let (next_column, next_row) = (column + dx, row + dy);
            if !self.is_open(next_column, next_row) {
                return None;
            }

            let diagonal = dx != 0 && dy != 0;
            // Диагональ только если оба ортогональных соседа свободны
            if diagonal && !(self.is_open(column + dx, row) && self.is_open(column, row + dy)) {
                return None;
            }

            let cost = if diagonal { DIAGONAL_COST } else { STRAIGHT_COST };
            Some((next_row as usize * self.columns + next_column as usize, cost))
        })
    }

    /// A* по тайлам, возвращает цепочку индексов start..=goal
    fn search(&self, start: usize, goal: usize) -> Option<Vec<usize>> {
        let mut best_cost = vec![u32::MAX; self.walkable.len()];
        let mut came_from: Vec<Option<usize>> = vec![None; self.walkable.len()];
        let mut open = BinaryHeap::new();

        best_cost[start] = 0;
        open.push(Reverse((self.heuristic(start, goal), start)));

        while let Some(Reverse((_, current))) = open.pop() {
            if current == goal {
                let mut chain = vec![goal];
                let mut cursor = goal;
                while let Some(previous) = came_from[cursor] {
                    chain.push(previous);
                    cursor = previous;
                }
                chain.reverse();
                return Some(chain);
            }

            for (next, step_cost) in self.neighbours(current) {
                let cost = best_cost[current].saturating_add(step_cost);
                if cost < best_cost[next] {
                    best_cost[next] = cost;
                    came_from[next] = Some(current);
                    open.push(Reverse((cost + self.heuristic(next, goal), next)));
                }
            }
        }

        None
    }
}

impl PathQueryService for GridNavigator {
    fn find_path(&self, mesh: NavMeshId, from: Vec2, to: Vec2) -> Option<Vec<Vec2>> {
        if mesh != self.mesh {
            return None;
        }

        let start = self.tile_index(from).filter(|&index| self.walkable[index])?;
        let goal = self.tile_index(to).filter(|&index| self.walkable[index])?;

        let chain = self.search(start, goal)?;

        let mut waypoints = vec![from];
        // Оставляем только тайлы, где меняется направление
        for window in chain.windows(3) {
            let [previous, current, next] = [window[0], window[1], window[2]];
            let incoming = self.tile_center(current) - self.tile_center(previous);
            let outgoing = self.tile_center(next) - self.tile_center(current);
            if incoming != outgoing {
                waypoints.push(self.tile_center(current));
            }
        }
        waypoints.push(to);

        Some(waypoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESH: NavMeshId = NavMeshId(1);

    #[test]
    fn test_open_grid_straight_path_collapses_to_endpoints() {
        let nav = GridNavigator::new(MESH, 8, 8, 64.0);
        let path = nav
            .find_path(MESH, Vec2::new(32.0, 32.0), Vec2::new(416.0, 32.0))
            .expect("open grid is connected");

        assert_eq!(path, vec![Vec2::new(32.0, 32.0), Vec2::new(416.0, 32.0)]);
    }

    #[test]
    fn test_same_tile_path_has_two_points() {
        let nav = GridNavigator::new(MESH, 4, 4, 64.0);
        let from = Vec2::new(10.0, 10.0);
        let to = Vec2::new(50.0, 20.0);
        assert_eq!(nav.find_path(MESH, from, to), Some(vec![from, to]));
    }

    #[test]
    fn test_path_goes_around_wall() {
        // Колонка 1 закрыта в рядах 0-1, проход только по ряду 2
        let nav = GridNavigator::new(MESH, 3, 3, 64.0).with_blocked(&[TileRect::new(1, 0, 1, 2)]);
        let from = Vec2::new(32.0, 32.0);
        let to = Vec2::new(160.0, 32.0);

        let path = nav.find_path(MESH, from, to).expect("detour via bottom row");

        assert_eq!(path.first(), Some(&from));
        assert_eq!(path.last(), Some(&to));
        assert!(path.len() >= 4, "detour needs turning points: {:?}", path);
        for waypoint in &path {
            assert!(nav.is_walkable_at(*waypoint), "waypoint {:?} inside wall", waypoint);
        }
    }

    #[test]
    fn test_no_corner_cutting() {
        // Стены в (1,0) и (0,1): диагональ (0,0)→(1,1) запрещена, путь не существует
        let nav = GridNavigator::new(MESH, 2, 2, 64.0)
            .with_blocked(&[TileRect::new(1, 0, 1, 1), TileRect::new(0, 1, 1, 1)]);
        assert_eq!(
            nav.find_path(MESH, Vec2::new(32.0, 32.0), Vec2::new(96.0, 96.0)),
            None
        );
    }

    #[test]
    fn test_blocked_or_outside_endpoints_are_unreachable() {
        let nav = GridNavigator::test_level(MESH);
        let spawn = Vec2::new(384.0, 32.0);

        // Внутри стены room_wall_1
        assert_eq!(nav.find_path(MESH, spawn, Vec2::new(160.0, 160.0)), None);
        // За пределами комнаты
        assert_eq!(nav.find_path(MESH, spawn, Vec2::new(-10.0, 32.0)), None);
        assert_eq!(nav.find_path(MESH, spawn, Vec2::new(800.0, 32.0)), None);
    }

    #[test]
    fn test_foreign_mesh_handle_is_unreachable() {
        let nav = GridNavigator::new(MESH, 4, 4, 64.0);
        assert_eq!(nav.mesh(), MESH);
        assert_eq!(
            nav.find_path(NavMeshId(99), Vec2::new(32.0, 32.0), Vec2::new(96.0, 32.0)),
            None
        );
    }

    #[test]
    fn test_test_level_spawn_reaches_corner() {
        let nav = GridNavigator::test_level(MESH);
        let path = nav
            .find_path(MESH, Vec2::new(384.0, 32.0), Vec2::new(0.0, 0.0))
            .expect("top row of the room is open");
        assert_eq!(path.first(), Some(&Vec2::new(384.0, 32.0)));
        assert_eq!(path.last(), Some(&Vec2::ZERO));
    }

    #[test]
    fn test_test_level_inner_room_reachable_through_gap() {
        let nav = GridNavigator::test_level(MESH);
        // Тайл (4,4) внутри большой комнаты, вход через разрыв в верхней стене (4,2)
        let inside = Vec2::new(4.5 * 64.0, 4.5 * 64.0);
        let path = nav
            .find_path(MESH, Vec2::new(384.0, 32.0), inside)
            .expect("inner room has an opening");
        for waypoint in &path {
            assert!(nav.is_walkable_at(*waypoint));
        }
    }
}
