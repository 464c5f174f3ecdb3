//! Merges orthogonally contiguous, same-named furniture into clusters.
//!
//! Two entries belong to the same cluster when they share a name and their
//! rectangles share an edge of positive length (or overlap). Corner contact
//! alone never connects them. Each cluster lists its unit cells exactly once,
//! in row-major order, so the output does not depend on input order except
//! for the order the clusters themselves are emitted in.

use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::geometry::BoundingBox;
use crate::map::{GridPoint, LocatedCell, ObjectKind};

/// One placed object as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FurnitureEntry {
    pub x: i32,
    pub y: i32,
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub kind: ObjectKind,
}

impl FurnitureEntry {
    /// A 1×1 furniture entry.
    pub fn new(x: i32, y: i32, name: impl Into<String>) -> Self {
        Self {
            x,
            y,
            name: name.into(),
            width: 1,
            height: 1,
            kind: ObjectKind::Furniture,
        }
    }

    pub fn sized(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn kind(mut self, kind: ObjectKind) -> Self {
        self.kind = kind;
        self
    }

    /// Half-open rectangle `(left, top, right, bottom)` in widened
    /// coordinates. Missing or non-positive extents count as 1, and the far
    /// edge stops at the end of the `i32` range.
    fn rect(&self) -> (i64, i64, i64, i64) {
        let far = |origin: i32, extent: i32| {
            (i64::from(origin) + i64::from(extent.max(1))).min(i64::from(i32::MAX) + 1)
        };
        (
            i64::from(self.x),
            i64::from(self.y),
            far(self.x, self.width),
            far(self.y, self.height),
        )
    }

    fn unit_cells(&self) -> impl Iterator<Item = (i32, i32)> {
        let (left, top, right, bottom) = self.rect();
        let span = |from: i64, to: i64| (from..to).filter_map(|v| i32::try_from(v).ok());
        span(top, bottom).flat_map(move |y| span(left, right).map(move |x| (x, y)))
    }

    fn participates(&self) -> bool {
        self.kind == ObjectKind::Furniture && !self.name.is_empty()
    }
}

/// Build 1×1 entries from the located-cell feed.
pub fn entries_from_cells(cells: &[LocatedCell]) -> Vec<FurnitureEntry> {
    cells
        .iter()
        .filter_map(|cell| {
            let furniture = cell.furniture.as_ref()?;
            Some(FurnitureEntry::new(cell.x, cell.y, furniture.name.clone()).kind(furniture.kind))
        })
        .collect()
}

fn touches(a: &FurnitureEntry, b: &FurnitureEntry) -> bool {
    let (al, at, ar, ab) = a.rect();
    let (bl, bt, br, bb) = b.rect();
    let x_overlap = al < br && bl < ar;
    let y_overlap = at < bb && bt < ab;
    let side_by_side = (ar == bl || br == al) && y_overlap;
    let stacked = (ab == bt || bb == at) && x_overlap;
    side_by_side || stacked || (x_overlap && y_overlap)
}

/// A maximal group of touching, same-named furniture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FurnitureCluster {
    pub name: String,
    pub bounding_box: BoundingBox,
    /// Unit cells in row-major order, no duplicates.
    pub cells: Vec<GridPoint>,
}

impl FurnitureCluster {
    fn from_members<'a>(name: &str, members: impl Iterator<Item = &'a FurnitureEntry>) -> Self {
        let unique: BTreeSet<(i32, i32)> = members
            .flat_map(|entry| entry.unit_cells().map(|(x, y)| (y, x)))
            .collect();

        let mut cells = unique.into_iter().map(|(y, x)| GridPoint::new(x, y));
        // members is never empty and every entry covers at least one cell
        let first = cells.next().unwrap_or(GridPoint::new(0, 0));
        let mut bounding_box = BoundingBox::cell(first.x, first.y);
        let mut all = vec![first];
        for cell in cells {
            bounding_box.include(cell.x, cell.y);
            all.push(cell);
        }

        Self {
            name: name.to_string(),
            bounding_box,
            cells: all,
        }
    }

    pub const fn width(&self) -> i32 {
        self.bounding_box.width()
    }

    pub const fn height(&self) -> i32 {
        self.bounding_box.height()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.bounding_box.contains(x, y)
            && self
                .cells
                .binary_search_by(|cell| (cell.y, cell.x).cmp(&(y, x)))
                .is_ok()
    }

    /// True when the cells fill the bounding box with no gaps.
    pub fn is_rectangular(&self) -> bool {
        let b = &self.bounding_box;
        let w = (i64::from(b.max_x) - i64::from(b.min_x) + 1) as u64;
        let h = (i64::from(b.max_y) - i64::from(b.min_y) + 1) as u64;
        w.checked_mul(h)
            .is_some_and(|area| area == self.cells.len() as u64)
    }
}

/// Group entries into clusters. Entries that are not furniture or have no
/// name are ignored. Clusters are emitted in the order their first member
/// appears in `entries`.
pub fn unify_furniture(entries: &[FurnitureEntry]) -> Vec<FurnitureCluster> {
    let mut partitions: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, entry) in entries.iter().enumerate() {
        if entry.participates() {
            partitions.entry(entry.name.as_str()).or_default().push(idx);
        }
    }

    let mut visited = vec![false; entries.len()];
    let mut clusters = Vec::new();

    for (start, entry) in entries.iter().enumerate() {
        if visited[start] || !entry.participates() {
            continue;
        }
        let Some(partition) = partitions.get(entry.name.as_str()) else {
            continue;
        };

        visited[start] = true;
        let mut queue = VecDeque::from([start]);
        let mut members = Vec::new();
        while let Some(current) = queue.pop_front() {
            members.push(current);
            for &candidate in partition {
                if !visited[candidate] && touches(&entries[current], &entries[candidate]) {
                    visited[candidate] = true;
                    queue.push_back(candidate);
                }
            }
        }

        clusters.push(FurnitureCluster::from_members(
            &entry.name,
            members.iter().map(|&idx| &entries[idx]),
        ));
    }

    clusters
}

/// Linear scan for the cluster owning grid cell `(x, y)`.
pub fn find_cluster_containing(
    x: i32,
    y: i32,
    clusters: &[FurnitureCluster],
) -> Option<&FurnitureCluster> {
    clusters.iter().find(|cluster| cluster.contains(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::FurnitureInfo;

    fn points(cells: &[(i32, i32)]) -> Vec<GridPoint> {
        cells.iter().map(|&(x, y)| GridPoint::new(x, y)).collect()
    }

    #[test]
    fn adjacent_same_name_rectangles_merge() {
        let entries = vec![
            FurnitureEntry::new(0, 0, "A").sized(2, 1),
            FurnitureEntry::new(2, 0, "A"),
        ];
        let clusters = unify_furniture(&entries);
        assert_eq!(clusters.len(), 1);
        let cluster = &clusters[0];
        assert_eq!(cluster.name, "A");
        assert_eq!(
            cluster.bounding_box,
            BoundingBox {
                min_x: 0,
                min_y: 0,
                max_x: 2,
                max_y: 0
            }
        );
        assert_eq!(cluster.cells, points(&[(0, 0), (1, 0), (2, 0)]));
        assert_eq!(cluster.width(), 3);
        assert_eq!(cluster.height(), 1);
    }

    #[test]
    fn different_names_never_merge() {
        let entries = vec![
            FurnitureEntry::new(0, 0, "A").sized(2, 1),
            FurnitureEntry::new(2, 0, "B"),
        ];
        let clusters = unify_furniture(&entries);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].cells, points(&[(0, 0), (1, 0)]));
        assert_eq!(clusters[1].cells, points(&[(2, 0)]));
    }

    #[test]
    fn diagonal_contact_is_not_adjacency() {
        let entries = vec![FurnitureEntry::new(0, 0, "A"), FurnitureEntry::new(1, 1, "A")];
        let clusters = unify_furniture(&entries);
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn vertical_contact_requires_x_overlap() {
        let stacked = vec![
            FurnitureEntry::new(0, 0, "A").sized(2, 1),
            FurnitureEntry::new(1, 1, "A").sized(2, 1),
        ];
        assert_eq!(unify_furniture(&stacked).len(), 1);

        let offset = vec![
            FurnitureEntry::new(0, 0, "A").sized(2, 1),
            FurnitureEntry::new(2, 1, "A").sized(2, 1),
        ];
        assert_eq!(unify_furniture(&offset).len(), 2);
    }

    #[test]
    fn chains_merge_transitively() {
        let entries = vec![
            FurnitureEntry::new(0, 0, "Aisle"),
            FurnitureEntry::new(5, 5, "Aisle"),
            FurnitureEntry::new(0, 1, "Aisle"),
            FurnitureEntry::new(0, 2, "Aisle"),
            FurnitureEntry::new(1, 2, "Aisle"),
        ];
        let clusters = unify_furniture(&entries);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].cells.len(), 4);
        assert!(!clusters[0].is_rectangular());
        assert_eq!(clusters[1].cells, points(&[(5, 5)]));
    }

    #[test]
    fn non_furniture_and_unnamed_entries_are_ignored() {
        let entries = vec![
            FurnitureEntry::new(0, 0, "Wall").kind(ObjectKind::Wall),
            FurnitureEntry::new(1, 0, ""),
            FurnitureEntry::new(2, 0, "Shelf"),
        ];
        let clusters = unify_furniture(&entries);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].name, "Shelf");
    }

    #[test]
    fn empty_input_yields_no_clusters() {
        assert!(unify_furniture(&[]).is_empty());
    }

    #[test]
    fn overlapping_rectangles_collapse_duplicate_cells() {
        let entries = vec![
            FurnitureEntry::new(0, 0, "A").sized(2, 2),
            FurnitureEntry::new(1, 1, "A").sized(2, 2),
        ];
        let clusters = unify_furniture(&entries);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].cells.len(), 7);
        assert_eq!(clusters[0].bounding_box.width(), 3);
    }

    #[test]
    fn missing_extents_default_to_single_cell() {
        let entries = vec![FurnitureEntry::new(3, 4, "A").sized(0, -2)];
        let clusters = unify_furniture(&entries);
        assert_eq!(clusters[0].cells, points(&[(3, 4)]));
    }

    #[test]
    fn cluster_set_is_independent_of_input_order() {
        let entries = vec![
            FurnitureEntry::new(0, 0, "A"),
            FurnitureEntry::new(4, 0, "B").sized(1, 3),
            FurnitureEntry::new(1, 0, "A"),
            FurnitureEntry::new(4, 3, "B"),
            FurnitureEntry::new(7, 7, "A"),
        ];
        let mut reversed = entries.clone();
        reversed.reverse();

        let sort = |mut clusters: Vec<FurnitureCluster>| {
            clusters.sort_by(|a, b| {
                (&a.name, a.cells[0].y, a.cells[0].x).cmp(&(&b.name, b.cells[0].y, b.cells[0].x))
            });
            clusters
        };
        assert_eq!(sort(unify_furniture(&entries)), sort(unify_furniture(&reversed)));
    }

    #[test]
    fn entries_at_the_coordinate_limit_do_not_overflow() {
        let entries = vec![
            FurnitureEntry::new(i32::MAX, 0, "A"),
            FurnitureEntry::new(i32::MAX - 1, 0, "A"),
            FurnitureEntry::new(0, i32::MAX, "B").sized(4, 4),
        ];
        let clusters = unify_furniture(&entries);
        assert_eq!(clusters.len(), 2);
        assert_eq!(
            clusters[0].cells,
            vec![GridPoint::new(i32::MAX - 1, 0), GridPoint::new(i32::MAX, 0)]
        );
        assert!(clusters[0].is_rectangular());
        assert_eq!(clusters[1].cells.len(), 4);
        assert!(clusters[1].cells.iter().all(|cell| cell.y == i32::MAX));
        assert!(find_cluster_containing(i32::MAX, 0, &clusters).is_some());
    }

    #[test]
    fn discovery_order_follows_input() {
        let entries = vec![FurnitureEntry::new(9, 9, "Z"), FurnitureEntry::new(0, 0, "A")];
        let names: Vec<String> = unify_furniture(&entries).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Z".to_string(), "A".to_string()]);
    }

    #[test]
    fn regrouping_cluster_output_is_idempotent() {
        let entries = vec![
            FurnitureEntry::new(0, 0, "A").sized(3, 1),
            FurnitureEntry::new(2, 1, "A").sized(1, 2),
        ];
        let clusters = unify_furniture(&entries);
        assert_eq!(clusters.len(), 1);

        let regrouped_input: Vec<FurnitureEntry> = clusters[0]
            .cells
            .iter()
            .map(|cell| FurnitureEntry::new(cell.x, cell.y, "synthetic"))
            .collect();
        let regrouped = unify_furniture(&regrouped_input);
        assert_eq!(regrouped.len(), 1);
        assert_eq!(regrouped[0].cells, clusters[0].cells);
        assert_eq!(regrouped[0].bounding_box, clusters[0].bounding_box);
    }

    #[test]
    fn find_cluster_resolves_member_cells_only() {
        let entries = vec![
            FurnitureEntry::new(0, 0, "L"),
            FurnitureEntry::new(0, 1, "L"),
            FurnitureEntry::new(1, 1, "L"),
            FurnitureEntry::new(5, 5, "R"),
        ];
        let clusters = unify_furniture(&entries);
        assert_eq!(find_cluster_containing(1, 1, &clusters).map(|c| c.name.as_str()), Some("L"));
        assert_eq!(find_cluster_containing(5, 5, &clusters).map(|c| c.name.as_str()), Some("R"));
        // inside L's bounding box but not a member cell
        assert!(find_cluster_containing(1, 0, &clusters).is_none());
        assert!(find_cluster_containing(3, 3, &clusters).is_none());
    }

    #[test]
    fn entries_from_cells_keeps_furniture_only() {
        let shelf = LocatedCell {
            x: 2,
            y: 3,
            furniture: Some(FurnitureInfo {
                name: "Shelf".to_string(),
                rows: 1,
                columns: 1,
                walkable: false,
                kind: ObjectKind::Furniture,
            }),
            replenishment_point: None,
        };
        let entries = entries_from_cells(&[LocatedCell::floor(0, 0), shelf]);
        assert_eq!(entries, vec![FurnitureEntry::new(2, 3, "Shelf")]);
    }
}
