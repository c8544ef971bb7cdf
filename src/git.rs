//! # Git Module
//!
//! Resolves [`GitInfo`] for the working directory with gix before rendering,
//! so the git widgets only ever read already-collected data.

use crate::models::git::GitInfo;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Maximum number of commits to walk when calculating ahead/behind
const MAX_ANCESTOR_WALK: usize = 10_000;

/// `None` when `start_dir` is not inside a repository.
pub fn read_git_info(start_dir: &Path) -> Option<GitInfo> {
    let repo = match gix::discover(start_dir) {
        Ok(repo) => repo,
        Err(e) => {
            debug!(dir = %start_dir.display(), error = %e, "no git repository");
            return None;
        }
    };
    let mut info = GitInfo::default();

    let mut head = repo.head().ok()?;
    if let Some(name) = head.referent_name() {
        info.branch = Some(name.shorten().to_string());
    }
    let head_id = head.try_peel_to_id_in_place().ok().flatten();
    if let Some(id) = head_id.as_ref() {
        info.short_commit = Some(id.to_hex_with_len(7).to_string());
    }

    // untracked files do not count as dirty
    info.is_clean = repo.is_dirty().ok().map(|dirty| !dirty);

    if let (Some(branch), Some(head_id)) = (info.branch.as_deref(), head_id) {
        if let Some((ahead, behind)) = ahead_behind(&repo, branch, head_id) {
            info.ahead = Some(ahead);
            info.behind = Some(behind);
        }
    }
    Some(info)
}

/// Commit counts against `branch.<name>.remote` / `branch.<name>.merge`.
fn ahead_behind(repo: &gix::Repository, branch: &str, head_id: gix::Id<'_>) -> Option<(usize, usize)> {
    let cfg = repo.config_snapshot();
    let remote = cfg.string(format!("branch.{branch}.remote").as_str())?.to_string();
    let merge = cfg.string(format!("branch.{branch}.merge").as_str())?.to_string();
    let merge_short = merge.strip_prefix("refs/heads/").unwrap_or(&merge);

    let mut upstream = repo
        .find_reference(format!("refs/remotes/{remote}/{merge_short}").as_str())
        .ok()?;
    let up_id = upstream.peel_to_id_in_place().ok()?;

    let ours = ancestors(head_id);
    let theirs = ancestors(up_id);
    Some((ours.difference(&theirs).count(), theirs.difference(&ours).count()))
}

fn ancestors(id: gix::Id<'_>) -> HashSet<gix::ObjectId> {
    let mut seen = HashSet::new();
    if let Ok(walk) = id.ancestors().all() {
        for info in walk.flatten() {
            seen.insert(info.id);
            if seen.len() >= MAX_ANCESTOR_WALK {
                break;
            }
        }
    }
    seen
}
