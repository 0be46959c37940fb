//! Groups scanned assets by fingerprint and picks a winner per group.

use super::scanner::ScanOutcome;
use super::types::{AssetGroup, OrganizePlan, ScannedAsset};
use crate::core::fingerprint::Fingerprint;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::PathBuf;

/// Builds organization plans
pub struct OrganizePlanner;

impl OrganizePlanner {
    /// Group `assets` in first-seen order.
    ///
    /// Input order matters: it is the tie-break for equal scores.
    pub fn group(assets: Vec<ScannedAsset>) -> Vec<AssetGroup> {
        let mut index: HashMap<Fingerprint, usize> = HashMap::new();
        let mut groups: Vec<AssetGroup> = Vec::new();

        for asset in assets {
            match index.entry(asset.fingerprint) {
                Entry::Occupied(slot) => groups[*slot.get()].push(asset),
                Entry::Vacant(slot) => {
                    slot.insert(groups.len());
                    groups.push(AssetGroup::new(asset));
                }
            }
        }

        groups
    }

    /// Turn a scan into a plan for `target`
    pub fn create_plan(target: PathBuf, outcome: ScanOutcome) -> OrganizePlan {
        let ScanOutcome {
            assets,
            skipped,
            others,
            total_files,
        } = outcome;

        let groups = Self::group(assets);

        let mut removals: Vec<PathBuf> = groups
            .iter()
            .flat_map(|g| g.duplicates().map(|a| a.path.clone()))
            .collect();
        removals.extend(skipped.iter().map(|s| s.path.clone()));
        removals.extend(others);
        removals.sort();

        OrganizePlan {
            target,
            groups,
            skipped,
            removals,
            total_files,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::organize::SkippedFile;
    use crate::core::quality::QualityScore;

    fn asset(name: &str, content: &[u8], resolution: u64, bytes: u64) -> ScannedAsset {
        ScannedAsset {
            path: PathBuf::from("/assets").join(name),
            fingerprint: Fingerprint::of_bytes(content),
            score: QualityScore::new(resolution, bytes),
        }
    }

    #[test]
    fn groups_by_fingerprint_in_first_seen_order() {
        let groups = OrganizePlanner::group(vec![
            asset("a.jpg", b"one", 100, 5),
            asset("b.jpg", b"two", 100, 5),
            asset("c.jpg", b"one", 100, 5),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].members().len(), 2);
        assert_eq!(groups[0].fingerprint(), Fingerprint::of_bytes(b"one"));
        assert_eq!(groups[1].members().len(), 1);
    }

    #[test]
    fn winner_has_highest_resolution() {
        let groups = OrganizePlanner::group(vec![
            asset("small.jpg", b"x", 100, 900),
            asset("large.jpg", b"x", 400, 10),
            asset("medium.jpg", b"x", 200, 500),
        ]);

        let group = &groups[0];
        assert!(group.winner().path.ends_with("large.jpg"));
        for member in group.members() {
            assert!(group.winner().score >= member.score);
        }
    }

    #[test]
    fn byte_size_breaks_ties() {
        let groups = OrganizePlanner::group(vec![
            asset("light.jpg", b"x", 100, 10),
            asset("heavy.jpg", b"x", 100, 20),
        ]);

        assert!(groups[0].winner().path.ends_with("heavy.jpg"));
    }

    #[test]
    fn full_ties_keep_first_seen() {
        let groups = OrganizePlanner::group(vec![
            asset("a.jpg", b"x", 100, 10),
            asset("b.jpg", b"x", 100, 10),
            asset("c.jpg", b"x", 100, 10),
        ]);

        assert!(groups[0].winner().path.ends_with("a.jpg"));
        let losers: Vec<_> = groups[0].duplicates().map(|a| a.path.clone()).collect();
        assert_eq!(
            losers,
            vec![PathBuf::from("/assets/b.jpg"), PathBuf::from("/assets/c.jpg")]
        );
    }

    #[test]
    fn plan_lists_everything_that_goes() {
        let outcome = ScanOutcome {
            assets: vec![
                asset("a.jpg", b"x", 100, 10),
                asset("b.jpg", b"x", 100, 10),
                asset("c.jpg", b"y", 400, 10),
            ],
            skipped: vec![SkippedFile {
                path: PathBuf::from("/assets/broken.jpg"),
                reason: "bad header".to_string(),
            }],
            others: vec![PathBuf::from("/assets/old")],
            total_files: 4,
        };

        let plan = OrganizePlanner::create_plan(PathBuf::from("/assets"), outcome);

        assert_eq!(plan.unique_count(), 2);
        assert_eq!(
            plan.removals,
            vec![
                PathBuf::from("/assets/b.jpg"),
                PathBuf::from("/assets/broken.jpg"),
                PathBuf::from("/assets/old"),
            ]
        );
        let winners: Vec<_> = plan.winners().map(|a| a.path.clone()).collect();
        assert_eq!(
            winners,
            vec![PathBuf::from("/assets/a.jpg"), PathBuf::from("/assets/c.jpg")]
        );
    }

    #[test]
    fn empty_scan_gives_empty_plan() {
        let plan = OrganizePlanner::create_plan(PathBuf::from("/assets"), ScanOutcome::default());
        assert_eq!(plan.unique_count(), 0);
        assert!(plan.removals.is_empty());
    }
}
