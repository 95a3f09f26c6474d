//! Vertical stacking of timeline rows.
//!
//! In tasks mode items are grouped under a header row per project (in the
//! authoritative project order, unassigned last), parents are followed by
//! their direct children, and child rows are shorter. In projects mode every
//! item gets one standard row. The layout is cached and only rebuilt when the
//! ordering inputs change.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use egui::Color32;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::{ProjectRecord, ScheduleItem};

/// Child rows are this fraction of the standard height.
pub const CHILD_ROW_SCALE: f32 = 0.7;

/// Whether bars represent tasks or whole projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Tasks,
    Projects,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Project(Uuid),
    Unassigned,
}

/// What a row is keyed by: a group header or an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKey {
    Header(GroupKey),
    Item(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    ProjectHeader,
    Parent,
    Child,
}

/// Summary shown in a project header row.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub key: GroupKey,
    /// 1-based position among project groups; `None` for unassigned.
    pub number: Option<usize>,
    pub name: String,
    pub color: Color32,
    /// Percent complete, 0–100.
    pub progress: f32,
    pub duration_days: i64,
    pub task_count: usize,
    pub period: Option<(NaiveDate, NaiveDate)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRow {
    pub key: RowKey,
    pub kind: RowKind,
    pub offset: f32,
    pub height: f32,
    /// Index into the item slice the layout was built from.
    pub item_index: Option<usize>,
    /// Index into [`ScheduleLayout::groups`] for header rows.
    pub group_index: Option<usize>,
}

/// Computed rows plus an id → row index.
#[derive(Debug, Clone, Default)]
pub struct ScheduleLayout {
    rows: Vec<LayoutRow>,
    groups: Vec<GroupSummary>,
    index: HashMap<RowKey, usize>,
    total_height: f32,
}

impl ScheduleLayout {
    /// Build the layout for `items`.
    ///
    /// `project_color` resolves a group's color; unassigned uses
    /// `unassigned_color`.
    pub fn build(
        items: &[ScheduleItem],
        projects: &[ProjectRecord],
        mode: DisplayMode,
        standard_height: f32,
        project_color: impl Fn(Uuid) -> Color32,
        unassigned_color: Color32,
    ) -> Self {
        let mut layout = Self::default();
        match mode {
            DisplayMode::Projects => {
                for (i, item) in items.iter().enumerate() {
                    layout.push(RowKey::Item(item.id), RowKind::Parent, standard_height, Some(i), None);
                }
            }
            DisplayMode::Tasks => {
                let child_height = standard_height * CHILD_ROW_SCALE;
                for (key, members) in group_items(items, projects) {
                    let summary = summarize(key, &members, items, projects, &project_color, unassigned_color, &layout.groups);
                    layout.groups.push(summary);
                    let group_index = layout.groups.len() - 1;
                    layout.push(RowKey::Header(key), RowKind::ProjectHeader, standard_height, None, Some(group_index));

                    for i in order_within_group(&members, items) {
                        let item = &items[i];
                        if item.is_child() {
                            layout.push(RowKey::Item(item.id), RowKind::Child, child_height, Some(i), None);
                        } else {
                            layout.push(RowKey::Item(item.id), RowKind::Parent, standard_height, Some(i), None);
                        }
                    }
                }
            }
        }
        layout
    }

    fn push(
        &mut self,
        key: RowKey,
        kind: RowKind,
        height: f32,
        item_index: Option<usize>,
        group_index: Option<usize>,
    ) {
        self.index.insert(key, self.rows.len());
        self.rows.push(LayoutRow {
            key,
            kind,
            offset: self.total_height,
            height,
            item_index,
            group_index,
        });
        self.total_height += height;
    }

    pub fn rows(&self) -> &[LayoutRow] {
        &self.rows
    }

    pub fn groups(&self) -> &[GroupSummary] {
        &self.groups
    }

    pub fn row(&self, key: RowKey) -> Option<&LayoutRow> {
        self.index.get(&key).map(|&i| &self.rows[i])
    }

    pub fn vertical_offset(&self, id: Uuid) -> Option<f32> {
        self.row(RowKey::Item(id)).map(|r| r.offset)
    }

    pub fn row_height(&self, id: Uuid) -> Option<f32> {
        self.row(RowKey::Item(id)).map(|r| r.height)
    }

    pub fn total_height(&self) -> f32 {
        self.total_height
    }

    /// Y of the bottom edge of every row, top to bottom.
    pub fn grid_line_offsets(&self) -> Vec<f32> {
        self.rows.iter().map(|r| r.offset + r.height).collect()
    }

    /// Row under a canvas-relative y coordinate.
    pub fn row_at(&self, y: f32) -> Option<&LayoutRow> {
        if y < 0.0 || y >= self.total_height {
            return None;
        }
        let i = self.rows.partition_point(|r| r.offset + r.height <= y);
        self.rows.get(i)
    }
}

/// Partition item indices by group, in display order.
fn group_items(items: &[ScheduleItem], projects: &[ProjectRecord]) -> Vec<(GroupKey, Vec<usize>)> {
    let known: HashSet<Uuid> = projects.iter().map(|p| p.id).collect();
    let mut by_project: HashMap<Uuid, Vec<usize>> = HashMap::new();
    let mut unassigned = Vec::new();

    for (i, item) in items.iter().enumerate() {
        match item.project_id {
            Some(pid) if known.contains(&pid) => by_project.entry(pid).or_default().push(i),
            _ => unassigned.push(i),
        }
    }

    let mut groups: Vec<(GroupKey, Vec<usize>)> = projects
        .iter()
        .filter_map(|p| by_project.remove(&p.id).map(|m| (GroupKey::Project(p.id), m)))
        .collect();
    if !unassigned.is_empty() {
        groups.push((GroupKey::Unassigned, unassigned));
    }
    groups
}

/// Parents in arrival order, each followed by its children; orphans last.
fn order_within_group(members: &[usize], items: &[ScheduleItem]) -> Vec<usize> {
    let parents: Vec<usize> = members.iter().copied().filter(|&i| !items[i].is_child()).collect();
    let parent_ids: HashSet<Uuid> = parents.iter().map(|&i| items[i].id).collect();

    let mut children: HashMap<Uuid, Vec<usize>> = HashMap::new();
    let mut orphans = Vec::new();
    for &i in members.iter().filter(|&&i| items[i].is_child()) {
        match items[i].parent_id {
            Some(pid) if parent_ids.contains(&pid) => children.entry(pid).or_default().push(i),
            _ => orphans.push(i),
        }
    }

    let mut ordered = Vec::with_capacity(members.len());
    for p in parents {
        ordered.push(p);
        if let Some(kids) = children.remove(&items[p].id) {
            ordered.extend(kids);
        }
    }
    ordered.extend(orphans);
    ordered
}

fn summarize(
    key: GroupKey,
    members: &[usize],
    items: &[ScheduleItem],
    projects: &[ProjectRecord],
    project_color: &impl Fn(Uuid) -> Color32,
    unassigned_color: Color32,
    previous: &[GroupSummary],
) -> GroupSummary {
    let mean_progress = if members.is_empty() {
        0.0
    } else {
        (members.iter().map(|&i| items[i].progress).sum::<f32>() / members.len() as f32).round()
    };
    let item_span = || {
        let start = members.iter().map(|&i| items[i].start).min()?;
        let end = members.iter().map(|&i| items[i].end).max()?;
        Some((start, end))
    };

    match key {
        GroupKey::Project(pid) => {
            let project = projects.iter().find(|p| p.id == pid);
            let period = project.and_then(ProjectRecord::period);
            let own_progress = project.and_then(|p| p.progress).unwrap_or(0.0);
            GroupSummary {
                key,
                number: Some(previous.iter().filter(|g| g.number.is_some()).count() + 1),
                name: project.map(|p| p.name.clone()).unwrap_or_default(),
                color: project_color(pid),
                progress: if own_progress > 0.0 { own_progress.min(100.0) } else { mean_progress },
                duration_days: period.map(|(s, e)| (e - s).num_days()).unwrap_or(0),
                task_count: members.len(),
                period,
            }
        }
        GroupKey::Unassigned => GroupSummary {
            key,
            number: None,
            name: "No project".to_string(),
            color: unassigned_color,
            progress: mean_progress,
            duration_days: item_span().map(|(s, e)| (e - s).num_days()).unwrap_or(0),
            task_count: members.len(),
            period: None,
        },
    }
}

/// Memoized [`ScheduleLayout`], rebuilt only when its ordering inputs change.
#[derive(Debug, Default)]
pub struct LayoutCache {
    fingerprint: Option<u64>,
    layout: ScheduleLayout,
}

impl LayoutCache {
    /// Make sure the cached layout matches the inputs; returns it.
    pub fn ensure(
        &mut self,
        items: &[ScheduleItem],
        projects: &[ProjectRecord],
        mode: DisplayMode,
        standard_height: f32,
        project_color: impl Fn(Uuid) -> Color32,
        unassigned_color: Color32,
    ) -> &ScheduleLayout {
        let fingerprint = fingerprint(items, projects, mode, standard_height);
        if self.fingerprint != Some(fingerprint) {
            tracing::debug!(rows = items.len(), ?mode, "rebuilding schedule layout");
            self.layout = ScheduleLayout::build(items, projects, mode, standard_height, project_color, unassigned_color);
            self.fingerprint = Some(fingerprint);
        }
        &self.layout
    }

    pub fn layout(&self) -> &ScheduleLayout {
        &self.layout
    }
}

fn fingerprint(items: &[ScheduleItem], projects: &[ProjectRecord], mode: DisplayMode, standard_height: f32) -> u64 {
    let mut hasher = DefaultHasher::new();
    mode.hash(&mut hasher);
    standard_height.to_bits().hash(&mut hasher);
    for p in projects {
        p.id.hash(&mut hasher);
        p.name.hash(&mut hasher);
        p.start_date.hash(&mut hasher);
        p.end_date.hash(&mut hasher);
        p.progress.map(f32::to_bits).hash(&mut hasher);
    }
    for item in items {
        item.id.hash(&mut hasher);
        item.parent_id.hash(&mut hasher);
        item.project_id.hash(&mut hasher);
        item.start.hash(&mut hasher);
        item.end.hash(&mut hasher);
        item.progress.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::{Priority, Status};

    const STANDARD: f32 = 60.0;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn item(project: Option<Uuid>, parent: Option<Uuid>) -> ScheduleItem {
        ScheduleItem {
            id: Uuid::new_v4(),
            name: "t".into(),
            start: d(2024, 1, 1),
            end: d(2024, 1, 5),
            progress: 50.0,
            color: Color32::GRAY,
            assignee: String::new(),
            priority: Priority::Medium,
            status: Status::Todo,
            parent_id: parent,
            project_id: project,
            dated: true,
        }
    }

    fn project(name: &str) -> ProjectRecord {
        ProjectRecord {
            id: Uuid::new_v4(),
            name: name.into(),
            start_date: Some("2024-01-01".into()),
            end_date: Some("2024-03-01".into()),
            progress: None,
            priority: Priority::Medium,
            status: Status::Planning,
            manager_name: None,
        }
    }

    fn build(items: &[ScheduleItem], projects: &[ProjectRecord]) -> ScheduleLayout {
        ScheduleLayout::build(items, projects, DisplayMode::Tasks, STANDARD, |_| Color32::BLUE, Color32::GRAY)
    }

    fn assert_contiguous(layout: &ScheduleLayout) {
        for pair in layout.rows().windows(2) {
            assert_eq!(pair[0].offset + pair[0].height, pair[1].offset);
        }
        let last = layout.rows().last().unwrap();
        assert_eq!(last.offset + last.height, layout.total_height());
    }

    #[test]
    fn parent_with_two_children_yields_four_rows() {
        let p = project("Alpha");
        let parent = item(Some(p.id), None);
        let a = item(Some(p.id), Some(parent.id));
        let b = item(Some(p.id), Some(parent.id));
        let layout = build(&[a.clone(), parent.clone(), b.clone()], &[p]);

        let heights: Vec<f32> = layout.rows().iter().map(|r| r.height).collect();
        assert_eq!(heights, vec![STANDARD, STANDARD, STANDARD * 0.7, STANDARD * 0.7]);
        let keys: Vec<RowKey> = layout.rows().iter().map(|r| r.key).collect();
        assert_eq!(keys[1], RowKey::Item(parent.id));
        assert_eq!(keys[2], RowKey::Item(a.id));
        assert_eq!(keys[3], RowKey::Item(b.id));
        assert_contiguous(&layout);
    }

    #[test]
    fn groups_follow_project_list_order_not_arrival() {
        let first = project("First");
        let second = project("Second");
        let late = item(Some(second.id), None);
        let early = item(Some(first.id), None);
        let stray = item(Some(Uuid::new_v4()), None);
        let loose = item(None, None);

        let layout = build(&[late.clone(), stray.clone(), early.clone(), loose.clone()], &[first.clone(), second.clone()]);
        let headers: Vec<GroupKey> = layout
            .rows()
            .iter()
            .filter_map(|r| match r.key {
                RowKey::Header(g) => Some(g),
                _ => None,
            })
            .collect();
        assert_eq!(
            headers,
            vec![GroupKey::Project(first.id), GroupKey::Project(second.id), GroupKey::Unassigned]
        );
        assert_eq!(layout.groups()[0].number, Some(1));
        assert_eq!(layout.groups()[1].number, Some(2));
        assert_eq!(layout.groups()[2].number, None);
        assert_eq!(layout.groups()[2].task_count, 2);
        assert!(layout.vertical_offset(early.id).unwrap() < layout.vertical_offset(late.id).unwrap());
        assert_contiguous(&layout);
    }

    #[test]
    fn orphaned_children_come_after_parents() {
        let p = project("P");
        let parent = item(Some(p.id), None);
        let orphan = item(Some(p.id), Some(Uuid::new_v4()));
        let other_parent = item(Some(p.id), None);
        let layout = build(&[orphan.clone(), parent.clone(), other_parent.clone()], &[p]);

        let order: Vec<RowKey> = layout.rows().iter().skip(1).map(|r| r.key).collect();
        assert_eq!(
            order,
            vec![RowKey::Item(parent.id), RowKey::Item(other_parent.id), RowKey::Item(orphan.id)]
        );
        assert_eq!(layout.row_height(orphan.id), Some(STANDARD * CHILD_ROW_SCALE));
    }

    #[test]
    fn projects_mode_is_flat() {
        let items = vec![item(None, None), item(None, Some(Uuid::new_v4()))];
        let layout = ScheduleLayout::build(&items, &[], DisplayMode::Projects, STANDARD, |_| Color32::BLUE, Color32::GRAY);
        assert_eq!(layout.rows().len(), 2);
        assert!(layout.rows().iter().all(|r| r.height == STANDARD));
        assert_eq!(layout.total_height(), 2.0 * STANDARD);
        assert!(layout.groups().is_empty());
    }

    #[test]
    fn grid_lines_and_row_lookup_agree_with_offsets() {
        let p = project("P");
        let parent = item(Some(p.id), None);
        let child = item(Some(p.id), Some(parent.id));
        let layout = build(&[parent, child.clone()], &[p]);

        assert_eq!(layout.grid_line_offsets(), vec![60.0, 120.0, 162.0]);
        assert_eq!(layout.row_at(130.0).map(|r| r.key), Some(RowKey::Item(child.id)));
        assert_eq!(layout.row_at(120.0).map(|r| r.key), Some(RowKey::Item(child.id)));
        assert!(layout.row_at(500.0).is_none());
    }

    #[test]
    fn group_progress_prefers_project_value() {
        let mut p = project("P");
        let members = vec![item(Some(p.id), None), item(Some(p.id), None)];
        let layout = build(&members, std::slice::from_ref(&p));
        assert_eq!(layout.groups()[0].progress, 50.0);
        assert_eq!(layout.groups()[0].duration_days, 60);

        p.progress = Some(80.0);
        let layout = build(&members, &[p]);
        assert_eq!(layout.groups()[0].progress, 80.0);
    }

    #[test]
    fn cache_rebuilds_only_on_change() {
        let p = project("P");
        let mut items = vec![item(Some(p.id), None)];
        let projects = vec![p];
        let mut cache = LayoutCache::default();

        let calls = std::cell::Cell::new(0);
        let color = |_: Uuid| {
            calls.set(calls.get() + 1);
            Color32::BLUE
        };
        cache.ensure(&items, &projects, DisplayMode::Tasks, STANDARD, color, Color32::GRAY);
        cache.ensure(&items, &projects, DisplayMode::Tasks, STANDARD, color, Color32::GRAY);
        assert_eq!(calls.get(), 1);

        items.push(item(None, None));
        let layout = cache.ensure(&items, &projects, DisplayMode::Tasks, STANDARD, color, Color32::GRAY);
        assert_eq!(calls.get(), 2);
        assert_eq!(layout.rows().len(), 4);
    }
}
