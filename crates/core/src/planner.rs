use crate::clock::FileClock;
use crate::media::{collect_media_files, MediaKind, ScanStats};
use crate::metadata::{truncate_to_second, CaptureRecord};
use crate::progress::ProgressReporter;
use crate::resolver::TimestampResolver;
use anyhow::Result;
use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

pub const TARGET_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    pub input: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenameEntry {
    pub original_path: PathBuf,
    pub target_path: PathBuf,
    pub original_instant: NaiveDateTime,
    pub assigned_instant: NaiveDateTime,
    pub collided: bool,
}

impl RenameEntry {
    pub fn changed(&self) -> bool {
        self.original_path != self.target_path
    }
}

/// Conflict-free assignment of target names for one batch, in processing
/// order (ascending instant, ties broken by original path).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RenamePlan {
    pub entries: Vec<RenameEntry>,
}

impl RenamePlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, original: &Path) -> Option<&RenameEntry> {
        self.entries.iter().find(|e| e.original_path == original)
    }

    pub fn collided(&self) -> usize {
        self.entries.iter().filter(|e| e.collided).count()
    }

    pub fn unchanged(&self) -> usize {
        self.entries.iter().filter(|e| !e.changed()).count()
    }
}

/// Images and videos are planned as independent batches.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MediaPlan {
    pub input: PathBuf,
    pub images: RenamePlan,
    pub videos: RenamePlan,
    pub stats: ScanStats,
}

impl MediaPlan {
    pub fn pending_renames(&self) -> usize {
        (self.images.len() - self.images.unchanged()) + (self.videos.len() - self.videos.unchanged())
    }
}

/// Assigns every file a unique instant, starting from its own capture instant
/// and moving forward one second at a time past instants already taken.
///
/// Instants are processed in ascending order with ties broken by path, so the
/// result does not depend on the iteration order of `captures`.
pub fn plan_renames<'a, I>(captures: I) -> RenamePlan
where
    I: IntoIterator<Item = (&'a PathBuf, &'a NaiveDateTime)>,
{
    let mut sorted: Vec<(NaiveDateTime, &PathBuf)> = captures
        .into_iter()
        .map(|(path, instant)| (truncate_to_second(*instant), path))
        .collect();
    sorted.sort();

    let step = TimeDelta::seconds(1);
    let mut assigned = HashSet::<NaiveDateTime>::with_capacity(sorted.len());
    let mut entries = Vec::with_capacity(sorted.len());

    for (original_instant, path) in sorted {
        let candidate = free_slot(&assigned, original_instant, step);
        assigned.insert(candidate);

        entries.push(RenameEntry {
            original_path: path.clone(),
            target_path: target_path_for(path, candidate),
            original_instant,
            assigned_instant: candidate,
            collided: candidate != original_instant,
        });
    }

    RenamePlan { entries }
}

/// First instant at or after `from` not yet taken. At the end of the
/// representable range the search turns back and takes the nearest free
/// instant before `from` instead.
fn free_slot(
    assigned: &HashSet<NaiveDateTime>,
    from: NaiveDateTime,
    step: TimeDelta,
) -> NaiveDateTime {
    let mut candidate = Some(from);
    while let Some(instant) = candidate {
        if !assigned.contains(&instant) {
            return instant;
        }
        candidate = instant.checked_add_signed(step);
    }

    let mut candidate = from;
    while assigned.contains(&candidate) {
        match candidate.checked_sub_signed(step) {
            Some(earlier) => candidate = earlier,
            None => break,
        }
    }
    candidate
}

/// `<parent>/<YYYY-MM-DD HH:MM:SS><.ext>`, keeping the extension's case.
pub fn target_path_for(original: &Path, instant: NaiveDateTime) -> PathBuf {
    let mut name = instant.format(TARGET_DATE_FORMAT).to_string();
    if let Some(ext) = original.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    match original.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

pub fn plan_records(records: &[CaptureRecord]) -> RenamePlan {
    plan_renames(records.iter().map(|r| (&r.path, &r.instant)))
}

/// Scans `options.input`, resolves images then videos, and plans each batch.
pub fn generate_plan<C: FileClock>(
    options: &PlanOptions,
    clock: C,
    progress: &dyn ProgressReporter,
) -> Result<MediaPlan> {
    let files = collect_media_files(&options.input)?;
    let queue: Vec<(PathBuf, MediaKind)> = files
        .images
        .iter()
        .map(|p| (p.clone(), MediaKind::Image))
        .chain(files.videos.iter().map(|p| (p.clone(), MediaKind::Video)))
        .collect();

    let records = TimestampResolver::new(clock).resolve_all(&queue, progress)?;
    let (images, videos): (Vec<CaptureRecord>, Vec<CaptureRecord>) = records
        .into_iter()
        .partition(|r| r.kind == MediaKind::Image);

    let plan = MediaPlan {
        input: options.input.clone(),
        images: plan_records(&images),
        videos: plan_records(&videos),
        stats: files.stats,
    };

    info!(
        images = plan.images.len(),
        videos = plan.videos.len(),
        collided = plan.images.collided() + plan.videos.collided(),
        pending = plan.pending_renames(),
        "rename plan ready"
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::{generate_plan, plan_renames, target_path_for, PlanOptions, RenamePlan};
    use crate::clock::tests::FakeClock;
    use crate::exif_reader::jpeg_with_capture_time;
    use crate::progress::SilentReporter;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::collections::{BTreeMap, HashMap, HashSet};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::tempdir;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").expect("valid instant")
    }

    fn names(plan: &RenamePlan) -> Vec<(String, String, bool)> {
        plan.entries
            .iter()
            .map(|e| {
                (
                    e.original_path.to_string_lossy().into_owned(),
                    e.target_path.to_string_lossy().into_owned(),
                    e.collided,
                )
            })
            .collect()
    }

    #[test]
    fn equal_instants_take_consecutive_seconds_in_path_order() {
        let when = at("2020-01-01 10:00:00");
        let mut captures = HashMap::new();
        captures.insert(PathBuf::from("c.jpg"), when);
        captures.insert(PathBuf::from("a.jpg"), when);
        captures.insert(PathBuf::from("b.jpg"), when);

        let plan = plan_renames(&captures);
        assert_eq!(
            names(&plan),
            vec![
                ("a.jpg".into(), "2020-01-01 10:00:00.jpg".into(), false),
                ("b.jpg".into(), "2020-01-01 10:00:01.jpg".into(), true),
                ("c.jpg".into(), "2020-01-01 10:00:02.jpg".into(), true),
            ]
        );
    }

    #[test]
    fn collision_at_the_last_representable_second_steps_back() {
        let mut captures = BTreeMap::new();
        captures.insert(PathBuf::from("a.jpg"), NaiveDateTime::MAX);
        captures.insert(PathBuf::from("b.jpg"), NaiveDateTime::MAX);
        captures.insert(PathBuf::from("c.jpg"), NaiveDateTime::MAX);

        let plan = plan_renames(&captures);
        let last = plan.entries[0].original_instant;
        let assigned: Vec<NaiveDateTime> =
            plan.entries.iter().map(|e| e.assigned_instant).collect();
        assert_eq!(
            assigned,
            vec![
                last,
                last - chrono::TimeDelta::seconds(1),
                last - chrono::TimeDelta::seconds(2),
            ]
        );
        assert_eq!(plan.collided(), 2);
        let targets: HashSet<&PathBuf> = plan.entries.iter().map(|e| &e.target_path).collect();
        assert_eq!(targets.len(), 3);
    }

    #[test]
    fn distinct_instants_pass_through_untouched() {
        let captures: BTreeMap<PathBuf, NaiveDateTime> = [
            ("dir/x.JPG", "2018-07-01 09:00:00"),
            ("dir/y.jpeg", "2018-07-01 09:00:01"),
            ("dir/z.jpg", "2017-01-01 00:00:00"),
        ]
        .into_iter()
        .map(|(p, t)| (PathBuf::from(p), at(t)))
        .collect();

        let plan = plan_renames(&captures);
        assert_eq!(plan.collided(), 0);
        for entry in &plan.entries {
            assert_eq!(entry.assigned_instant, entry.original_instant);
            assert_eq!(
                entry.target_path,
                target_path_for(&entry.original_path, entry.original_instant)
            );
        }
        assert_eq!(
            plan.get(Path::new("dir/x.JPG")).map(|e| e.target_path.clone()),
            Some(PathBuf::from("dir/2018-07-01 09:00:00.JPG"))
        );
    }

    #[test]
    fn displacement_cascades_onto_later_originals() {
        let captures: BTreeMap<PathBuf, NaiveDateTime> = [
            ("a.jpg", "2020-01-01 10:00:00"),
            ("b.jpg", "2020-01-01 10:00:00"),
            ("c.jpg", "2020-01-01 10:00:01"),
            ("d.jpg", "2020-01-01 10:00:05"),
        ]
        .into_iter()
        .map(|(p, t)| (PathBuf::from(p), at(t)))
        .collect();

        let plan = plan_renames(&captures);
        let assigned: Vec<(String, NaiveDateTime, bool)> = plan
            .entries
            .iter()
            .map(|e| {
                (
                    e.original_path.to_string_lossy().into_owned(),
                    e.assigned_instant,
                    e.collided,
                )
            })
            .collect();
        assert_eq!(
            assigned,
            vec![
                ("a.jpg".into(), at("2020-01-01 10:00:00"), false),
                ("b.jpg".into(), at("2020-01-01 10:00:01"), true),
                ("c.jpg".into(), at("2020-01-01 10:00:02"), true),
                ("d.jpg".into(), at("2020-01-01 10:00:05"), false),
            ]
        );
    }

    #[test]
    fn plan_is_unique_forward_only_and_order_independent() {
        let base = at("2022-02-02 22:22:22");
        let offsets = [0i64, 0, 1, 3, 3, 3, 2, 10, 0, 4];
        let forward: Vec<(PathBuf, NaiveDateTime)> = offsets
            .iter()
            .enumerate()
            .map(|(i, off)| {
                (
                    PathBuf::from(format!("f{i:02}.jpg")),
                    base + chrono::TimeDelta::seconds(*off),
                )
            })
            .collect();
        let mut backward = forward.clone();
        backward.reverse();

        let plan_a = plan_renames(forward.iter().map(|(p, t)| (p, t)));
        let plan_b = plan_renames(backward.iter().map(|(p, t)| (p, t)));
        assert_eq!(plan_a, plan_b);

        let targets: HashSet<_> = plan_a.entries.iter().map(|e| &e.target_path).collect();
        assert_eq!(targets.len(), offsets.len());
        for entry in &plan_a.entries {
            assert_eq!(entry.collided, entry.assigned_instant > entry.original_instant);
            assert!(entry.assigned_instant >= entry.original_instant);
        }
    }

    #[test]
    fn subsecond_differences_collide() {
        let whole = at("2020-01-01 10:00:00");
        let fraction = NaiveDate::from_ymd_opt(2020, 1, 1)
            .and_then(|d| d.and_hms_milli_opt(10, 0, 0, 400))
            .expect("valid instant");
        let captures: BTreeMap<PathBuf, NaiveDateTime> = [
            (PathBuf::from("a.mp4"), fraction),
            (PathBuf::from("b.mp4"), whole),
        ]
        .into_iter()
        .collect();

        let plan = plan_renames(&captures);
        assert_eq!(
            names(&plan),
            vec![
                ("a.mp4".into(), "2020-01-01 10:00:00.mp4".into(), false),
                ("b.mp4".into(), "2020-01-01 10:00:01.mp4".into(), true),
            ]
        );
    }

    #[test]
    fn empty_mapping_yields_empty_plan() {
        let captures = BTreeMap::<PathBuf, NaiveDateTime>::new();
        let plan = plan_renames(&captures);
        assert!(plan.is_empty());
        assert_eq!(plan.collided(), 0);
    }

    #[test]
    fn target_keeps_parent_and_extension_case() {
        let target = target_path_for(Path::new("/photos/IMG_1.JpG"), at("2020-01-01 10:00:00"));
        assert_eq!(target, PathBuf::from("/photos/2020-01-01 10:00:00.JpG"));

        let bare = target_path_for(Path::new("noext"), at("2020-01-01 10:00:00"));
        assert_eq!(bare, PathBuf::from("2020-01-01 10:00:00"));
    }

    #[test]
    fn generate_plan_keeps_image_and_video_batches_apart() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path();
        fs::write(root.join("a.jpg"), jpeg_with_capture_time("2020:01:01 10:00:00"))
            .expect("write a");
        fs::write(root.join("b.jpg"), jpeg_with_capture_time("2020:01:01 10:00:00"))
            .expect("write b");
        fs::write(root.join("clip.mp4"), b"").expect("write clip");
        fs::write(root.join("notes.txt"), b"").expect("write notes");

        let video_time = UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        let options = PlanOptions {
            input: root.to_path_buf(),
        };
        let plan = generate_plan(&options, FakeClock::modified_only(video_time), &SilentReporter)
            .expect("plan");

        assert_eq!(plan.stats.skipped_unclassified, 1);
        assert_eq!(plan.images.len(), 2);
        assert_eq!(plan.videos.len(), 1);
        assert_eq!(
            plan.images.get(&root.join("b.jpg")).map(|e| e.target_path.clone()),
            Some(root.join("2020-01-01 10:00:01.jpg"))
        );
        assert!(!plan.videos.entries[0].collided);
        assert_eq!(plan.pending_renames(), 3);
    }

    #[test]
    fn generate_plan_on_empty_directory_is_empty() {
        let temp = tempdir().expect("tempdir");
        let options = PlanOptions {
            input: temp.path().to_path_buf(),
        };
        let plan = generate_plan(
            &options,
            FakeClock::modified_only(UNIX_EPOCH),
            &SilentReporter,
        )
        .expect("plan");
        assert!(plan.images.is_empty());
        assert!(plan.videos.is_empty());
        assert_eq!(plan.pending_renames(), 0);
    }
}
